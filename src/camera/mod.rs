//! Camera capture module for webcam access and frame acquisition.
//!
//! - Device enumeration via [`list_devices`]
//! - Two-phase capture via the [`FrameSource`] trait, backed by [`NokhwaSource`]
//! - Frame helpers [`mirror_horizontal`] and [`to_grayscale`]

mod capture;
mod device;
mod frame_utils;
mod source;
mod types;

pub use capture::NokhwaSource;
pub use device::list_devices;
pub use frame_utils::{mirror_horizontal, to_grayscale};
pub use source::FrameSource;
pub use types::{CameraError, CameraInfo, CameraSettings, Frame, FrameFormat, Resolution};
