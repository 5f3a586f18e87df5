//! Two-phase frame acquisition.

use super::types::{CameraError, Frame};

/// A device that hands out frames in two steps: `grab` reserves the next
/// frame cheaply, `retrieve` decodes the reserved frame.
pub trait FrameSource {
    /// Reserve the next frame. Returns `false` when no frame is available.
    fn grab(&mut self) -> bool;

    /// Decode the frame reserved by the last successful `grab`.
    ///
    /// Returns `Ok(None)` when nothing was grabbed or decoding produced no
    /// image.
    fn retrieve(&mut self) -> Result<Option<Frame>, CameraError>;

    /// Frame rate reported by the device. `0.0` means unknown.
    fn fps(&self) -> f64;
}
