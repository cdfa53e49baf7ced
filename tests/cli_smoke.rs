use std::path::PathBuf;

use driftbox::{Canvas, SceneConfig};

fn driftbox_exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_driftbox")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "driftbox.exe"
            } else {
                "driftbox"
            });
            p
        })
}

#[test]
fn cli_frame_writes_png() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();

    let out_path = dir.join("frame.png");
    let _ = std::fs::remove_file(&out_path);

    let out_arg = out_path.to_string_lossy().to_string();
    let status = std::process::Command::new(driftbox_exe())
        .args([
            "frame",
            "--width",
            "64",
            "--height",
            "36",
            "--count",
            "3",
            "--seed",
            "7",
            "--no-overlay",
            "--out",
        ])
        .arg(out_arg.as_str())
        .status()
        .unwrap();

    assert!(status.success());
    assert!(out_path.exists());
}

#[test]
fn cli_frame_accepts_a_scene_config() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();

    let scene_path = dir.join("scene.json");
    let out_path = dir.join("from_config.png");
    let _ = std::fs::remove_file(&out_path);

    let scene = SceneConfig {
        canvas: Canvas::new(48, 48),
        count: 2,
        overlay: None,
        seed: Some(1),
        ..SceneConfig::default()
    };
    let f = std::fs::File::create(&scene_path).unwrap();
    serde_json::to_writer_pretty(f, &scene).unwrap();

    let scene_arg = scene_path.to_string_lossy().to_string();
    let out_arg = out_path.to_string_lossy().to_string();
    let status = std::process::Command::new(driftbox_exe())
        .args(["frame", "--config", scene_arg.as_str(), "--out"])
        .arg(out_arg.as_str())
        .status()
        .unwrap();

    assert!(status.success());
    assert!(out_path.exists());
}

#[test]
fn cli_fib_prints_value_and_time() {
    let output = std::process::Command::new(driftbox_exe())
        .args(["fib", "--n", "20"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("fib: 10946 -- "), "got '{stdout}'");
}

#[test]
fn cli_frame_without_font_rejects_overlay() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();
    let out_arg = dir.join("rejected.png").to_string_lossy().to_string();

    // Overlay is on by default and needs --font; the command must fail.
    let output = std::process::Command::new(driftbox_exe())
        .args(["frame", "--width", "64", "--height", "36", "--out"])
        .arg(out_arg.as_str())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("overlay"), "got '{stderr}'");
}
