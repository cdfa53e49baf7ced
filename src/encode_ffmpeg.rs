use std::{
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::{
    error::{DriftboxError, DriftboxResult},
    surface::FrameRgba,
};

/// Settings for one MP4 encode.
#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,  // physical frame width in px
    pub height: u32, // physical frame height in px
    pub fps: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
}

impl EncodeConfig {
    pub fn validate(&self) -> DriftboxResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(DriftboxError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if self.fps == 0 {
            return Err(DriftboxError::validation("encode fps must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // yuv420p subsamples chroma 2x2, so odd extents cannot be encoded.
            return Err(DriftboxError::validation(
                "encode width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }
}

/// Default MP4 settings: overwrite the output if it exists.
pub fn default_mp4_config(
    out_path: impl Into<PathBuf>,
    width: u32,
    height: u32,
    fps: u32,
) -> EncodeConfig {
    EncodeConfig {
        width,
        height,
        fps,
        out_path: out_path.into(),
        overwrite: true,
    }
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> DriftboxResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Streams straight-alpha RGBA8 frames into a spawned `ffmpeg` process.
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    bg_rgba: [u8; 4],
    child: Child,
    stdin: Option<ChildStdin>,
    scratch: Vec<u8>,
}

impl FfmpegEncoder {
    /// Spawn `ffmpeg` ready to receive frames. `bg_rgba` is the flatten
    /// background for any translucent pixels.
    pub fn new(cfg: EncodeConfig, bg_rgba: [u8; 4]) -> DriftboxResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(DriftboxError::validation(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(DriftboxError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if cfg.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&cfg.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            DriftboxError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DriftboxError::encode("failed to open ffmpeg stdin (unexpected)"))?;

        Ok(Self {
            scratch: vec![0u8; (cfg.width * cfg.height * 4) as usize],
            cfg,
            bg_rgba,
            child,
            stdin: Some(stdin),
        })
    }

    /// Write one frame to the encoder. Frames must match the configured size.
    pub fn encode_frame(&mut self, frame: &FrameRgba) -> DriftboxResult<()> {
        if frame.width != self.cfg.width || frame.height != self.cfg.height {
            return Err(DriftboxError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.cfg.width, self.cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(DriftboxError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_to_opaque_rgba8(&mut self.scratch, &frame.data, self.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(DriftboxError::encode("ffmpeg encoder is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            DriftboxError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;

        Ok(())
    }

    /// Close the pipe and wait for `ffmpeg` to finish writing the file.
    pub fn finish(mut self) -> DriftboxResult<()> {
        drop(self.stdin.take());

        let output = self.child.wait_with_output().map_err(|e| {
            DriftboxError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DriftboxError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// Composite straight-alpha RGBA8 over `bg_rgba` and force alpha to 255.
fn flatten_to_opaque_rgba8(dst: &mut [u8], src: &[u8], bg_rgba: [u8; 4]) -> DriftboxResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(DriftboxError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = u16::from(bg_rgba[0]);
    let bg_g = u16::from(bg_rgba[1]);
    let bg_b = u16::from(bg_rgba[2]);

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        let r = mul_div255(u16::from(s[0]), a) + mul_div255(bg_r, inv);
        let g = mul_div255(u16::from(s[1]), a) + mul_div255(bg_g, inv);
        let b = mul_div255(u16::from(s[2]), a) + mul_div255(bg_b, inv);

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_config() -> EncodeConfig {
        default_mp4_config("target/out.mp4", 320, 180, 60)
    }

    #[test]
    fn config_validation_catches_bad_values() {
        assert!(basic_config().validate().is_ok());

        let mut zero_width = basic_config();
        zero_width.width = 0;
        assert!(zero_width.validate().is_err());

        let mut odd_width = basic_config();
        odd_width.width = 321;
        assert!(odd_width.validate().is_err());

        let mut zero_fps = basic_config();
        zero_fps.fps = 0;
        assert!(zero_fps.validate().is_err());
    }

    #[test]
    fn flatten_opaque_pixels_pass_through() {
        let src = vec![17u8, 34, 51, 255];
        let mut dst = vec![0u8; 4];
        flatten_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn flatten_alpha_0_returns_bg() {
        let src = vec![99u8, 99, 99, 0];
        let mut dst = vec![0u8; 4];
        flatten_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
        assert_eq!(dst, vec![10, 20, 30, 255]);
    }

    #[test]
    fn flatten_half_alpha_over_black() {
        // Straight red at 50% alpha lands on 128,0,0 over black.
        let src = vec![255u8, 0, 0, 128];
        let mut dst = vec![0u8; 4];
        flatten_to_opaque_rgba8(&mut dst, &src, [0, 0, 0, 255]).unwrap();
        assert_eq!(dst, vec![128, 0, 0, 255]);
    }

    #[test]
    fn flatten_rejects_mismatched_buffers() {
        let src = vec![0u8; 8];
        let mut dst = vec![0u8; 4];
        assert!(flatten_to_opaque_rgba8(&mut dst, &src, [0, 0, 0, 255]).is_err());
    }
}
