//! Video recording with a lazily opened writer.
//!
//! Starting a recording only stores the target. The writer is opened on the
//! first frame for which a frame rate can be determined: the device's own
//! rate when it reports one, otherwise the session's estimate once enough
//! frames have been timed.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, info};
use thiserror::Error;

use crate::camera::Frame;
use crate::clock::SessionClock;
use crate::pipeline::PipelineError;

/// Frames to time before trusting the session's frame-rate estimate.
pub const WARMUP_FRAMES: u64 = 20;

/// A four-character video codec code such as `I420` or `MJPG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc([u8; 4]);

impl FourCc {
    pub const I420: FourCc = FourCc(*b"I420");
    pub const MJPG: FourCc = FourCc(*b"MJPG");

    pub fn new(code: [u8; 4]) -> Result<Self, RecordingError> {
        if code.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            Ok(FourCc(code))
        } else {
            Err(RecordingError::InvalidFourCc(
                String::from_utf8_lossy(&code).into_owned(),
            ))
        }
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        // constructed from ASCII only
        std::str::from_utf8(&self.0).unwrap_or("????")
    }
}

impl Default for FourCc {
    fn default() -> Self {
        Self::I420
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FourCc {
    type Err = RecordingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; 4] = s
            .as_bytes()
            .try_into()
            .map_err(|_| RecordingError::InvalidFourCc(s.to_string()))?;
        FourCc::new(bytes)
    }
}

#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("invalid FourCC '{0}': expected four ASCII characters")]
    InvalidFourCc(String),

    #[error("frame is {got_width}x{got_height} but the video was opened at {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },

    #[error("frame rate must be positive, got {0}")]
    InvalidFrameRate(f64),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Opens video writers. The production encoder drives FFmpeg.
pub trait VideoEncoder {
    fn open(
        &self,
        path: &Path,
        fourcc: FourCc,
        fps: f64,
        size: (u32, u32),
    ) -> Result<Box<dyn VideoWriter>, RecordingError>;
}

/// An open video file. Dropping the writer finalizes the file.
pub trait VideoWriter {
    fn write(&mut self, frame: &Frame) -> Result<(), RecordingError>;
}

/// Recording state: target, encoding and the writer once it exists.
///
/// Active exactly when a target path is set.
pub struct RecordingController {
    encoder: Box<dyn VideoEncoder>,
    target: Option<PathBuf>,
    fourcc: Option<FourCc>,
    writer: Option<Box<dyn VideoWriter>>,
}

impl RecordingController {
    pub fn new(encoder: Box<dyn VideoEncoder>) -> Self {
        Self {
            encoder,
            target: None,
            fourcc: None,
            writer: None,
        }
    }

    /// Set the output target. Nothing is opened until frames arrive.
    pub fn start(&mut self, path: impl Into<PathBuf>, fourcc: FourCc) {
        let path = path.into();
        info!("Recording to {} ({})", path.display(), fourcc);
        self.target = Some(path);
        self.fourcc = Some(fourcc);
    }

    /// Clear the target and drop the writer, finalizing the file.
    pub fn stop(&mut self) {
        if let Some(path) = self.target.take() {
            info!("Stopped recording {}", path.display());
        }
        self.fourcc = None;
        self.writer = None;
    }

    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }

    pub fn is_writer_open(&self) -> bool {
        self.writer.is_some()
    }

    pub fn target(&self) -> Option<&Path> {
        self.target.as_deref()
    }

    /// Hand one processed frame to the recording.
    ///
    /// Does nothing when inactive. When no writer is open yet, frames are
    /// dropped until a frame rate is known.
    pub fn write_frame(
        &mut self,
        frame: &Frame,
        device_fps: f64,
        clock: &SessionClock,
    ) -> Result<(), RecordingError> {
        let Some(path) = self.target.as_deref() else {
            return Ok(());
        };

        if self.writer.is_none() {
            let fps = if device_fps > 0.0 {
                device_fps
            } else if clock.frames_elapsed() < WARMUP_FRAMES {
                return Ok(());
            } else {
                match clock.fps_estimate() {
                    Some(estimate) => estimate,
                    None => {
                        debug!("Frame rate still unknown, dropping frame");
                        return Ok(());
                    }
                }
            };

            let fourcc = self.fourcc.unwrap_or_default();
            let size = (frame.width, frame.height);
            info!(
                "Opening video writer {} at {:.2} fps, {}x{}",
                path.display(),
                fps,
                size.0,
                size.1
            );
            self.writer = Some(self.encoder.open(path, fourcc, fps, size)?);
        }

        match self.writer.as_mut() {
            Some(writer) => writer.write(frame),
            None => Ok(()),
        }
    }
}
