//! Camera types and data structures.

use std::fmt;
use std::time::Instant;

/// Information about an available camera device.
#[derive(Debug, Clone)]
pub struct CameraInfo {
    /// Device index for selection
    pub index: u32,
    /// Human-readable device name
    pub name: String,
    /// Device description
    pub description: String,
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.index, self.name, self.description)
    }
}

/// Camera resolution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// 640x480, what most webcams deliver without negotiation.
    pub const VGA: Resolution = Resolution {
        width: 640,
        height: 480,
    };

    /// 1280x720
    pub const HD: Resolution = Resolution {
        width: 1280,
        height: 720,
    };
}

impl Default for Resolution {
    fn default() -> Self {
        Self::VGA
    }
}

/// Pixel layout of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// Three bytes per pixel, stored R, G, B
    Rgb,
    /// One intensity byte per pixel
    Gray,
}

impl FrameFormat {
    pub fn channels(self) -> usize {
        match self {
            FrameFormat::Rgb => 3,
            FrameFormat::Gray => 1,
        }
    }
}

/// A decoded camera frame, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Raw pixel data
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel format
    pub format: FrameFormat,
    /// Timestamp when frame was captured
    pub timestamp: Instant,
}

impl Frame {
    /// Build an RGB frame from interleaved bytes.
    ///
    /// Returns `None` if `data` does not hold exactly `width * height * 3` bytes.
    pub fn rgb(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        Self::with_format(width, height, FrameFormat::Rgb, data)
    }

    /// Build a single-channel frame.
    pub fn gray(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        Self::with_format(width, height, FrameFormat::Gray, data)
    }

    /// An RGB frame filled with one color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = (width * height) as usize;
        let mut data = Vec::with_capacity(pixels * 3);
        for _ in 0..pixels {
            data.extend_from_slice(&rgb);
        }
        Frame {
            data,
            width,
            height,
            format: FrameFormat::Rgb,
            timestamp: Instant::now(),
        }
    }

    fn with_format(width: u32, height: u32, format: FrameFormat, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize * format.channels() {
            return None;
        }
        Some(Frame {
            data,
            width,
            height,
            format,
            timestamp: Instant::now(),
        })
    }

    /// Get the number of bytes per pixel (3 for RGB, 1 for gray).
    pub fn bytes_per_pixel(&self) -> usize {
        self.format.channels()
    }

    pub fn is_gray(&self) -> bool {
        self.format == FrameFormat::Gray
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Byte offset of pixel (x, y).
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.bytes_per_pixel()
    }

    /// Bytes of pixel (x, y). Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let i = self.offset(x, y);
        &self.data[i..i + self.bytes_per_pixel()]
    }

    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
        let i = self.offset(x, y);
        let bpp = self.bytes_per_pixel();
        &mut self.data[i..i + bpp]
    }
}

/// Settings for camera capture.
#[derive(Debug, Clone)]
pub struct CameraSettings {
    /// Camera device index
    pub device_index: u32,
    /// Capture resolution
    pub resolution: Resolution,
    /// Requested FPS (actual may vary, or be unknown)
    pub fps: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device_index: 0,
            resolution: Resolution::default(),
            fps: 30,
        }
    }
}

/// Errors that can occur during camera operations.
#[derive(Debug)]
pub enum CameraError {
    /// Failed to query camera devices
    QueryFailed(String),
    /// Failed to open camera
    OpenFailed(String),
    /// Camera permission denied (macOS/iOS)
    PermissionDenied,
    /// Camera device not found at specified index
    DeviceNotFound(u32),
    /// Failed to start video stream
    StreamFailed(String),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::QueryFailed(msg) => write!(f, "Failed to query cameras: {}", msg),
            CameraError::OpenFailed(msg) => write!(f, "Failed to open camera: {}", msg),
            CameraError::PermissionDenied => {
                write!(
                    f,
                    "Camera permission denied. On macOS, grant access in System Settings > Privacy & Security > Camera"
                )
            }
            CameraError::DeviceNotFound(index) => {
                write!(
                    f,
                    "Camera device {} not found. Run 'cameo list-cameras' to see available devices",
                    index
                )
            }
            CameraError::StreamFailed(msg) => write!(f, "Failed to start camera stream: {}", msg),
        }
    }
}

impl std::error::Error for CameraError {}
