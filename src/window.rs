//! Preview window backed by minifb.
//!
//! minifb only processes input while the window is being updated, so
//! [`WindowManager::process_events`] pumps the window itself when no frame
//! was shown since the last poll.

use log::{debug, info};
use minifb::{Key, KeyRepeat, ScaleMode, Window, WindowOptions};
use thiserror::Error;

use crate::camera::Frame;
use crate::input::Keypress;
use crate::session::PreviewSink;

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("failed to create window: {0}")]
    Create(String),

    #[error("failed to update window: {0}")]
    Update(String),

    #[error("window has not been created")]
    NotCreated,
}

const LETTERS: [(Key, char); 26] = [
    (Key::A, 'a'),
    (Key::B, 'b'),
    (Key::C, 'c'),
    (Key::D, 'd'),
    (Key::E, 'e'),
    (Key::F, 'f'),
    (Key::G, 'g'),
    (Key::H, 'h'),
    (Key::I, 'i'),
    (Key::J, 'j'),
    (Key::K, 'k'),
    (Key::L, 'l'),
    (Key::M, 'm'),
    (Key::N, 'n'),
    (Key::O, 'o'),
    (Key::P, 'p'),
    (Key::Q, 'q'),
    (Key::R, 'r'),
    (Key::S, 's'),
    (Key::T, 't'),
    (Key::U, 'u'),
    (Key::V, 'v'),
    (Key::W, 'w'),
    (Key::X, 'x'),
    (Key::Y, 'y'),
    (Key::Z, 'z'),
];

/// Translate a minifb key into the keys the application reacts to.
pub fn keypress_from_key(key: Key) -> Option<Keypress> {
    match key {
        Key::Space => Some(Keypress::Space),
        Key::Tab => Some(Keypress::Tab),
        Key::Escape => Some(Keypress::Escape),
        other => LETTERS
            .iter()
            .find(|(k, _)| *k == other)
            .map(|(_, c)| Keypress::Char(*c)),
    }
}

/// Pack a frame into minifb's `0x00RRGGBB` pixels, reusing `out`.
pub fn pack_frame(frame: &Frame, out: &mut Vec<u32>) {
    out.clear();
    out.reserve(frame.pixel_count());
    if frame.is_gray() {
        out.extend(frame.data.iter().map(|&v| {
            let v = v as u32;
            (v << 16) | (v << 8) | v
        }));
    } else {
        out.extend(
            frame
                .data
                .chunks_exact(3)
                .map(|px| ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | px[2] as u32),
        );
    }
}

/// Window operations the application loop needs beyond showing frames.
pub trait WindowControl: PreviewSink {
    fn create_window(&mut self, width: u32, height: u32) -> Result<(), WindowError>;

    fn is_window_created(&self) -> bool;

    fn destroy_window(&mut self);

    /// Poll for one key pressed since the last call.
    fn process_events(&mut self) -> Option<Keypress>;

    fn set_status(&mut self, text: &str);
}

pub struct WindowManager {
    title: String,
    window: Option<Window>,
    buffer: Vec<u32>,
    shown_since_poll: bool,
    status: Option<String>,
}

impl WindowManager {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            window: None,
            buffer: Vec::new(),
            shown_since_poll: false,
            status: None,
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

impl WindowControl for WindowManager {
    fn create_window(&mut self, width: u32, height: u32) -> Result<(), WindowError> {
        let options = WindowOptions {
            resize: true,
            scale_mode: ScaleMode::AspectRatioStretch,
            ..WindowOptions::default()
        };
        let window = Window::new(&self.title, width as usize, height as usize, options)
            .map_err(|e| WindowError::Create(e.to_string()))?;
        info!("Opened window '{}' ({}x{})", self.title, width, height);
        self.window = Some(window);
        Ok(())
    }

    /// True while the window exists and the user has not closed it.
    fn is_window_created(&self) -> bool {
        self.window.as_ref().is_some_and(|w| w.is_open())
    }

    fn destroy_window(&mut self) {
        if self.window.take().is_some() {
            debug!("Closed window '{}'", self.title);
        }
    }

    fn process_events(&mut self) -> Option<Keypress> {
        let window = self.window.as_mut()?;
        if !self.shown_since_poll {
            window.update();
        }
        self.shown_since_poll = false;
        window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .find_map(keypress_from_key)
    }

    /// Show `text` in the title bar.
    fn set_status(&mut self, text: &str) {
        info!("{}", text);
        self.status = Some(text.to_string());
        if let Some(window) = self.window.as_mut() {
            window.set_title(&format!("{} [{}]", self.title, text));
        }
    }
}

impl PreviewSink for WindowManager {
    fn show(&mut self, frame: &Frame) -> Result<(), WindowError> {
        let window = self.window.as_mut().ok_or(WindowError::NotCreated)?;
        pack_frame(frame, &mut self.buffer);
        window
            .update_with_buffer(&self.buffer, frame.width as usize, frame.height as usize)
            .map_err(|e| WindowError::Update(e.to_string()))?;
        self.shown_since_poll = true;
        Ok(())
    }
}
