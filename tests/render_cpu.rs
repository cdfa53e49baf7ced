use driftbox::{Canvas, DemoSession, Rgba8, SceneConfig};

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn digest_u64(bytes: &[u8]) -> u64 {
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    for chunk in bytes.chunks(8) {
        let mut v = 0u64;
        for (i, &b) in chunk.iter().enumerate() {
            v |= (b as u64) << (i * 8);
        }
        state = mix64(state ^ v);
    }
    state
}

fn test_scene() -> SceneConfig {
    SceneConfig {
        canvas: Canvas::new(96, 54),
        count: 20,
        overlay: None,
        seed: Some(1),
        ..SceneConfig::default()
    }
}

#[test]
fn cpu_render_is_deterministic() {
    let render = || {
        let mut session = DemoSession::new(test_scene(), None).unwrap();
        let mut digests = Vec::new();
        session
            .render_sequence(3, |_, frame| {
                digests.push(digest_u64(&frame.data));
                Ok(())
            })
            .unwrap();
        digests
    };

    let a = render();
    let b = render();
    assert_eq!(a.len(), 3);
    assert_eq!(a, b);
}

#[test]
fn frames_contain_shape_pixels() {
    let mut session = DemoSession::new(test_scene(), None).unwrap();
    session
        .render_sequence(1, |_, frame| {
            assert_eq!((frame.width, frame.height), (96, 54));
            let bg = Rgba8::WHITE.to_array();
            let non_background = frame.data.chunks_exact(4).filter(|px| *px != bg).count();
            assert!(non_background > 0, "no shape pixels made it to the frame");
            Ok(())
        })
        .unwrap();
}

#[test]
fn device_pixel_ratio_doubles_the_frame() {
    let scene = SceneConfig {
        device_pixel_ratio: 2.0,
        ..test_scene()
    };
    let mut session = DemoSession::new(scene, None).unwrap();
    assert_eq!(session.frame_size(), (192, 108));

    session
        .render_sequence(1, |_, frame| {
            assert_eq!((frame.width, frame.height), (192, 108));
            Ok(())
        })
        .unwrap();
}

#[test]
fn frames_are_opaque_over_the_background() {
    let mut session = DemoSession::new(test_scene(), None).unwrap();
    session
        .render_sequence(1, |_, frame| {
            // Opaque clear plus opaque fills: alpha must be 255 everywhere.
            assert!(frame.data.chunks_exact(4).all(|px| px[3] == 255));
            Ok(())
        })
        .unwrap();
}
