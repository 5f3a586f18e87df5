//! nokhwa-backed frame source.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType,
};
use nokhwa::{Buffer, Camera};

use super::device::list_devices;
use super::frame_utils::convert_to_rgb;
use super::source::FrameSource;
use super::types::{CameraError, CameraSettings, Frame, Resolution};

/// Camera capture handle.
///
/// `grab` pulls the raw buffer off the stream; `retrieve` decodes it to RGB.
/// Decoding is the expensive step, so a grabbed buffer that is never
/// retrieved costs almost nothing.
pub struct NokhwaSource {
    camera: Camera,
    /// Raw buffer from the last successful grab
    pending: Option<Buffer>,
    settings: CameraSettings,
    resolution: Resolution,
    fps: u32,
}

impl std::fmt::Debug for NokhwaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NokhwaSource")
            .field("settings", &self.settings)
            .field("resolution", &self.resolution)
            .field("fps", &self.fps)
            .finish_non_exhaustive()
    }
}

impl NokhwaSource {
    /// Open a camera and start its stream.
    ///
    /// # Errors
    /// * `CameraError::DeviceNotFound` - If the device index doesn't exist
    /// * `CameraError::PermissionDenied` - If camera access is denied (macOS)
    /// * `CameraError::OpenFailed` - If no requested format could be opened
    /// * `CameraError::StreamFailed` - If the stream fails to start
    pub fn open(settings: CameraSettings) -> Result<Self, CameraError> {
        let devices = list_devices()?;
        if !devices.iter().any(|d| d.index == settings.device_index) {
            return Err(CameraError::DeviceNotFound(settings.device_index));
        }

        let index = CameraIndex::Index(settings.device_index);
        let mut camera = open_camera_with_fallback(&index, &settings)?;
        camera
            .open_stream()
            .map_err(|e| CameraError::StreamFailed(e.to_string()))?;

        let res = camera.resolution();
        let resolution = Resolution {
            width: res.width(),
            height: res.height(),
        };
        let fps = camera.frame_rate();
        log::info!(
            "Camera {} streaming at {}x{} ({} fps reported)",
            settings.device_index,
            resolution.width,
            resolution.height,
            fps
        );

        Ok(Self {
            camera,
            pending: None,
            settings,
            resolution,
            fps,
        })
    }

    /// Get the camera settings that were requested.
    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// The resolution the camera actually negotiated.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }
}

impl FrameSource for NokhwaSource {
    fn grab(&mut self) -> bool {
        match self.camera.frame() {
            Ok(buffer) => {
                self.pending = Some(buffer);
                true
            }
            Err(e) => {
                log::warn!("Camera grab failed: {}", e);
                self.pending = None;
                false
            }
        }
    }

    fn retrieve(&mut self) -> Result<Option<Frame>, CameraError> {
        let Some(buffer) = self.pending.take() else {
            return Ok(None);
        };
        let frame = convert_to_rgb(&buffer);
        if frame.is_none() {
            log::warn!("Dropping frame that could not be decoded to RGB");
        }
        Ok(frame)
    }

    fn fps(&self) -> f64 {
        self.fps as f64
    }
}

impl Drop for NokhwaSource {
    fn drop(&mut self) {
        let _ = self.camera.stop_stream();
    }
}

/// Try to open a camera with multiple format fallback strategies.
fn open_camera_with_fallback(
    index: &CameraIndex,
    settings: &CameraSettings,
) -> Result<Camera, CameraError> {
    let requested_resolution =
        nokhwa::utils::Resolution::new(settings.resolution.width, settings.resolution.height);

    // NV12 is native on macOS, MJPEG is the common denominator elsewhere,
    // and as a last resort the camera picks its own format.
    let format_attempts: Vec<RequestedFormat> = vec![
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            requested_resolution,
            NokhwaFrameFormat::NV12,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            requested_resolution,
            NokhwaFrameFormat::MJPEG,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution),
    ];

    let mut last_error = None;

    for requested in format_attempts {
        match Camera::new(index.clone(), requested) {
            Ok(cam) => return Ok(cam),
            Err(e) => {
                log::debug!("Camera format attempt failed: {}", e);
                last_error = Some(e);
            }
        }
    }

    let msg = last_error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "no format attempts".to_string());
    let lower = msg.to_lowercase();
    if lower.contains("permission")
        || lower.contains("denied")
        || lower.contains("authorization")
        || lower.contains("access")
    {
        Err(CameraError::PermissionDenied)
    } else {
        Err(CameraError::OpenFailed(msg))
    }
}
