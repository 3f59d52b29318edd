use std::{
    ffi::OsString,
    io::Write as _,
    path::PathBuf,
    process::{Child, ChildStdin, Command, Stdio},
};

use image::RgbImage;
use log::debug;

use crate::error::{FindError, Result};
use crate::record::FrameSink;

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
}

impl EncodeConfig {
    pub fn new(out_path: impl Into<PathBuf>, width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            fps,
            out_path: out_path.into(),
            overwrite: true,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FindError::config("video width/height must be non-zero"));
        }
        if self.fps == 0 {
            return Err(FindError::config("video fps must be non-zero"));
        }
        Ok(())
    }

    /// Validates and makes room for the output file
    fn prepare_output(&self) -> Result<()> {
        self.validate()?;
        if !self.overwrite && self.out_path.exists() {
            return Err(FindError::encode(format!(
                "output file '{}' already exists",
                self.out_path.display()
            )));
        }
        match self.out_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)?,
            _ => {}
        }
        Ok(())
    }

    /// Raw rgb24 frames on stdin, 4:4:4 x264 out, so odd frame sizes are kept as they are
    fn ffmpeg_args(&self) -> Vec<OsString> {
        let size = format!("{}x{}", self.width, self.height);
        let fps = self.fps.to_string();
        let mut args: Vec<OsString> = vec![if self.overwrite { "-y" } else { "-n" }.into()];
        args.extend(
            [
                "-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgb24", "-s", size.as_str(),
                "-r", fps.as_str(), "-i", "pipe:0", "-an", "-c:v", "libx264", "-pix_fmt", "yuv444p",
            ]
            .map(OsString::from),
        );
        args.push(self.out_path.clone().into_os_string());
        args
    }
}

/// First line of `ffmpeg -version`, `None` if there is no usable ffmpeg on PATH
pub fn ffmpeg_version() -> Option<String> {
    let output = Command::new("ffmpeg")
        .arg("-version")
        .stderr(Stdio::null())
        .output()
        .ok()
        .filter(|o| o.status.success())?;
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
}

/// Streams raw RGB frames into the system `ffmpeg` binary.
///
/// Frames are encoded with x264 in 4:4:4 so masks with odd dimensions keep their exact size.
pub struct FfmpegSink {
    cfg: EncodeConfig,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
}

impl FfmpegSink {
    pub fn new(cfg: EncodeConfig) -> Result<Self> {
        cfg.prepare_output()?;

        let Some(version) = ffmpeg_version() else {
            return Err(FindError::encode(
                "ffmpeg is required for video output, but was not found on PATH",
            ));
        };
        debug!("{version}");

        let mut child = Command::new("ffmpeg")
            .args(cfg.ffmpeg_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| FindError::encode(format!("failed to spawn ffmpeg: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| FindError::encode("failed to open ffmpeg stdin"))?;

        debug!("ffmpeg writing to '{}'", cfg.out_path.display());

        Ok(Self {
            cfg,
            child: Some(child),
            stdin: Some(stdin),
        })
    }
}

impl FrameSink for FfmpegSink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        if frame.width() != self.cfg.width || frame.height() != self.cfg.height {
            return Err(FindError::encode(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                self.cfg.width,
                self.cfg.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(FindError::encode("ffmpeg encoder is already finalized"));
        };

        stdin
            .write_all(frame.as_raw())
            .map_err(|e| FindError::encode(format!("failed to write frame to ffmpeg stdin: {e}")))
    }

    fn finish(&mut self) -> Result<()> {
        drop(self.stdin.take());

        let Some(child) = self.child.take() else {
            return Ok(());
        };

        let output = child
            .wait_with_output()
            .map_err(|e| FindError::encode(format!("failed to wait for ffmpeg to finish: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FindError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        debug!("ffmpeg finished '{}'", self.cfg.out_path.display());
        Ok(())
    }
}

/// Writes every frame as a numbered PNG into a directory
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
    written: usize,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            prefix: prefix.into(),
            written: 0,
        })
    }

    fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}_{:06}.png", self.prefix, index))
    }
}

impl FrameSink for PngSequenceSink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        let path = self.frame_path(self.written);
        frame
            .save(&path)
            .map_err(|e| FindError::encode(format!("failed to write '{}': {e}", path.display())))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        debug!("{} frames in '{}'", self.written, self.dir.display());
        Ok(())
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::record::{palette, FrameRecorder};

    #[test]
    fn config_validation_catches_bad_values() {
        assert!(EncodeConfig::new("out/a.mp4", 0, 10, 30).validate().is_err());
        assert!(EncodeConfig::new("out/a.mp4", 10, 10, 0).validate().is_err());
        // odd sizes are fine
        assert!(EncodeConfig::new("out/a.mp4", 11, 7, 30).validate().is_ok());
    }

    #[test]
    fn ffmpeg_args_keep_exact_frame_size() {
        let mut cfg = EncodeConfig::new("out/DFS_Visualization.mp4", 11, 7, 24);
        let args = cfg.ffmpeg_args();
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy()).collect();

        assert_eq!(args[0], "-y");
        assert_eq!(args[args.len() - 1], "out/DFS_Visualization.mp4");
        for pair in [["-s", "11x7"], ["-r", "24"], ["-i", "pipe:0"], ["-c:v", "libx264"]] {
            assert!(args.windows(2).any(|w| w[0] == pair[0] && w[1] == pair[1]), "{pair:?}");
        }
        let formats: Vec<_> = args
            .windows(2)
            .filter(|w| w[0] == "-pix_fmt")
            .map(|w| w[1].to_string())
            .collect();
        assert_eq!(formats, vec!["rgb24", "yuv444p"]);

        cfg.overwrite = false;
        assert_eq!(cfg.ffmpeg_args()[0], "-n");
    }

    #[test]
    fn prepare_output_respects_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("BFS_Visualization.mp4");
        let mut cfg = EncodeConfig::new(&out, 4, 4, 30);

        cfg.prepare_output().unwrap();
        assert!(dir.path().join("nested").is_dir());

        std::fs::write(&out, b"old").unwrap();
        assert!(cfg.prepare_output().is_ok());
        cfg.overwrite = false;
        assert!(matches!(cfg.prepare_output(), Err(FindError::Encode(_))));
    }

    #[test]
    fn png_sequence_writes_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let sink = PngSequenceSink::new(dir.path().join("frames"), "BFS").unwrap();

        let background = RgbImage::from_pixel(3, 2, palette::FREE);
        let mut recorder = FrameRecorder::new("png", background, sink, 2).unwrap();
        recorder.mark(0, 0, palette::VISITED).unwrap();
        recorder.mark(1, 0, palette::VISITED).unwrap();
        recorder.mark(2, 1, palette::PATH).unwrap();
        let recording = recorder.close().unwrap();
        assert_eq!(recording.summary.frames, 3);

        let frames = dir.path().join("frames");
        let last = image::open(frames.join("BFS_000002.png")).unwrap().to_rgb8();
        assert_eq!(*last.get_pixel(2, 1), palette::PATH);
        assert_eq!(*last.get_pixel(0, 0), palette::VISITED);
        assert!(!frames.join("BFS_000003.png").exists());
    }

    #[test]
    fn ffmpeg_round_trip() {
        if ffmpeg_version().is_none() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("AStar_Visualization.mp4");
        let sink = FfmpegSink::new(EncodeConfig::new(&out, 6, 4, 30)).unwrap();

        let background = RgbImage::from_pixel(6, 4, palette::FREE);
        let mut recorder = FrameRecorder::new("ffmpeg", background, sink, 1).unwrap();
        recorder.mark(5, 3, palette::PATH).unwrap();
        recorder.close().unwrap();

        assert!(std::fs::metadata(&out).unwrap().len() > 0);
    }
}
