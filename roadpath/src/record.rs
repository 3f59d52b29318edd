//! Rate-limited frame recording.
//!
//! A [`FrameRecorder`] keeps one live frame, applies single pixel changes to it and hands a copy
//! of the whole frame to its [`FrameSink`] every `throttle` changes. It knows nothing about path
//! finding.

use image::{Rgb, RgbImage};
use log::{debug, trace, warn};

use crate::error::{FindError, Result};

/// Fixed colours of the mask and of the visualization
pub mod palette {
    use image::Rgb;

    pub const FREE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const BLOCKED: Rgb<u8> = Rgb([0, 0, 0]);
    pub const VISITED: Rgb<u8> = Rgb([0, 255, 0]);
    pub const PATH: Rgb<u8> = Rgb([0, 0, 255]);
    pub const BLOCKED_OBSERVED: Rgb<u8> = Rgb([255, 0, 0]);
}

/// Somewhere to send finished frames
pub trait FrameSink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()>;

    /// Flush and release the output. Calling it more than once must be harmless.
    fn finish(&mut self) -> Result<()>;
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        (**self).write_frame(frame)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

/// Keeps every frame in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub frames: Vec<RgbImage>,
    finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for MemorySink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        if self.finished {
            return Err(FindError::encode("memory sink is already finished"));
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

/// Drops frames, only counting them
#[derive(Debug, Default)]
pub struct NullSink {
    pub frames: u64,
}

impl FrameSink for NullSink {
    fn write_frame(&mut self, _frame: &RgbImage) -> Result<()> {
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordingSummary {
    pub label: String,
    /// Pixel changes applied
    pub marks: u64,
    /// Frames handed to the sink, the seed frame included
    pub frames: u64,
}

#[derive(Debug)]
pub struct Recording<S> {
    pub summary: RecordingSummary,
    pub sink: S,
}

pub struct FrameRecorder<S: FrameSink> {
    label: String,
    frame: RgbImage,
    sink: Option<S>,
    throttle: u32,
    pending: u32,
    marks: u64,
    frames: u64,
}

impl<S: FrameSink> FrameRecorder<S> {
    /// Starts recording; the background is written out right away as the first frame.
    pub fn new(
        label: impl Into<String>,
        background: RgbImage,
        mut sink: S,
        throttle: u32,
    ) -> Result<Self> {
        if throttle == 0 {
            return Err(FindError::config("throttle must be at least 1"));
        }
        if background.width() == 0 || background.height() == 0 {
            return Err(FindError::config("background image is empty"));
        }

        let label = label.into();
        debug!(
            "{label}: recording {}x{} frames, one every {throttle} changes",
            background.width(),
            background.height()
        );
        sink.write_frame(&background)?;

        Ok(Self {
            label,
            frame: background,
            sink: Some(sink),
            throttle,
            pending: 0,
            marks: 0,
            frames: 1,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.frame.dimensions()
    }

    /// The live frame, including changes that have not been flushed yet
    pub fn frame(&self) -> &RgbImage {
        &self.frame
    }

    pub fn throttle(&self) -> u32 {
        self.throttle
    }

    /// Changes how many pixel changes go into one frame from now on
    pub fn set_throttle(&mut self, throttle: u32) -> Result<()> {
        if throttle == 0 {
            return Err(FindError::config("throttle must be at least 1"));
        }
        self.throttle = throttle;
        if self.pending >= self.throttle {
            self.flush()?;
        }
        Ok(())
    }

    pub fn marks(&self) -> u64 {
        self.marks
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn mark(&mut self, x: u32, y: u32, color: Rgb<u8>) -> Result<()> {
        let (width, height) = self.frame.dimensions();
        if x >= width || y >= height {
            return Err(FindError::encode(format!(
                "pixel ({x}, {y}) is outside the {width}x{height} frame"
            )));
        }

        trace!("{}: pixel ({x}, {y}) -> {:?}", self.label, color.0);
        self.frame.put_pixel(x, y, color);
        self.marks += 1;
        self.pending += 1;

        if self.pending >= self.throttle {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let sink = self
            .sink
            .as_mut()
            .ok_or_else(|| FindError::encode("recorder is already closed"))?;
        sink.write_frame(&self.frame)?;
        self.frames += 1;
        self.pending = 0;
        trace!("{}: frame {}", self.label, self.frames);
        Ok(())
    }

    /// Writes out any changes made since the last frame and finalizes the sink
    pub fn close(mut self) -> Result<Recording<S>> {
        if self.pending > 0 {
            self.flush()?;
        }

        let mut sink = self
            .sink
            .take()
            .ok_or_else(|| FindError::encode("recorder is already closed"))?;
        sink.finish()?;

        debug!(
            "{}: closed after {} changes in {} frames",
            self.label, self.marks, self.frames
        );

        Ok(Recording {
            summary: RecordingSummary {
                label: self.label.clone(),
                marks: self.marks,
                frames: self.frames,
            },
            sink,
        })
    }
}

impl<S: FrameSink> Drop for FrameRecorder<S> {
    fn drop(&mut self) {
        // a recorder that was never closed still releases its output
        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.finish() {
                warn!("{}: failed to finalize output: {e}", self.label);
            }
        }
    }
}
