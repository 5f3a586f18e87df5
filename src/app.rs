//! The Cameo application: capture, filter, track, show, react to keys.

use std::path::PathBuf;

use log::{info, warn};
use thiserror::Error;

use crate::camera::{CameraError, FrameSource};
use crate::config::{Config, ConfigError};
use crate::curves::CurveError;
use crate::filters::{FilterChain, FilterError, SlotKind, StrokeEdges};
use crate::input::{command_for, Command, Keypress};
use crate::pipeline::ctrlc_received;
use crate::recording::{FourCc, RecordingError};
use crate::rects::swap_rects;
use crate::session::{FrameSession, SessionError};
use crate::status_bar::StatusBar;
use crate::tracker::FaceTracker;
use crate::window::{WindowControl, WindowError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build tone curves: {0}")]
    Curve(#[from] CurveError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Recording(#[from] RecordingError),

    #[error("failed to install Ctrl+C handler: {0}")]
    Ctrlc(#[from] ctrlc::Error),
}

/// Settings the running application reads, resolved from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub screenshot: PathBuf,
    pub screencast: PathBuf,
    pub fourcc: FourCc,
    pub extended: bool,
    pub debug_rects: bool,
    pub window_size: (u32, u32),
}

impl AppSettings {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            screenshot: config.output.screenshot.clone(),
            screencast: config.output.screencast.clone(),
            fourcc: config.output.fourcc.parse()?,
            extended: config.ui.extended,
            debug_rects: config.ui.debug_rects,
            window_size: (config.camera.width, config.camera.height),
        })
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            screenshot: PathBuf::from("screenshot.png"),
            screencast: PathBuf::from("screencast.avi"),
            fourcc: FourCc::default(),
            extended: false,
            debug_rects: true,
            window_size: (640, 480),
        }
    }
}

/// Build the filter chain with the stroke parameters from `config`.
pub fn build_chain(config: &Config) -> Result<FilterChain, AppError> {
    let stroke = StrokeEdges::new(config.filters.blur_ksize, config.filters.edge_ksize)?;
    Ok(FilterChain::with_stroke(stroke)?)
}

const HELP: &str = "Cameo\n\
    Tab to start/stop recording\n\
    Space to grab a screenshot\n\
    r to cycle through recolor filters <none>, CMV, RC, RGV\n\
    c to cycle through tone curves <none>, cross-process, portra, provia, velvia\n\
    k to cycle through convolution filters <none>, find edges, sharpen, blur, emboss\n\
    s to toggle the stroke edges filter\n\
    Esc to quit";

pub struct Cameo<S: FrameSource, W: WindowControl, T: FaceTracker> {
    session: FrameSession<S, W>,
    chain: FilterChain,
    tracker: T,
    status: StatusBar,
    settings: AppSettings,
    draw_debug_rects: bool,
}

impl<S: FrameSource, W: WindowControl, T: FaceTracker> Cameo<S, W, T> {
    /// The session must have been built with a window as its preview.
    pub fn new(
        session: FrameSession<S, W>,
        chain: FilterChain,
        tracker: T,
        settings: AppSettings,
    ) -> Self {
        Self {
            session,
            chain,
            tracker,
            status: StatusBar::new(settings.extended),
            draw_debug_rects: settings.debug_rects,
            settings,
        }
    }

    /// Open the window and loop until it is closed, Escape is pressed or
    /// Ctrl+C arrives. Recording is stopped on the way out.
    pub fn run(&mut self) -> Result<(), AppError> {
        let (width, height) = self.settings.window_size;
        if let Some(window) = self.session.preview_mut() {
            window.create_window(width, height)?;
        }
        self.update_status();
        info!("{}", HELP);
        if self.settings.extended {
            info!("x to toggle face rectangles");
        }

        let result = self.run_loop();

        self.session.stop_writing_video();
        if let Some(window) = self.session.preview_mut() {
            window.destroy_window();
        }
        result
    }

    fn run_loop(&mut self) -> Result<(), AppError> {
        while self.is_running() {
            match self.process_frame() {
                Ok(_) => {}
                Err(AppError::Session(SessionError::Image(e))) => {
                    warn!("Snapshot failed: {}", e);
                }
                Err(AppError::Session(SessionError::Recording(e))) => {
                    warn!("Recording failed, stopping: {}", e);
                    self.session.stop_writing_video();
                }
                Err(e) => return Err(e),
            }

            let key = self.session.preview_mut().and_then(|w| w.process_events());
            if let Some(key) = key {
                self.on_keypress(key);
            }
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        !ctrlc_received() && self.session.preview().is_some_and(|w| w.is_window_created())
    }

    /// One enter/process/exit cycle. Returns whether a frame was grabbed.
    pub fn process_frame(&mut self) -> Result<bool, AppError> {
        if !self.session.enter_frame()? {
            return Ok(false);
        }

        let processed = match self.session.frame() {
            Ok(Some(frame)) => {
                if self.settings.extended {
                    self.tracker.update(frame);
                    swap_rects(frame, self.tracker.faces());
                    self.chain.apply_all(frame);
                } else {
                    self.chain.apply_all(frame);
                    self.tracker.update(frame);
                }
                if self.draw_debug_rects {
                    self.tracker.draw_debug_rects(frame);
                }
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };

        let exited = self.session.exit_frame();
        processed?;
        exited?;
        Ok(true)
    }

    pub fn on_keypress(&mut self, key: Keypress) {
        match command_for(key, self.settings.extended) {
            Some(Command::Snapshot) => self.session.write_image(self.settings.screenshot.clone()),
            Some(Command::ToggleRecording) => {
                if self.session.is_writing_video() {
                    self.session.stop_writing_video();
                } else {
                    self.session.start_writing_video(
                        self.settings.screencast.clone(),
                        self.settings.fourcc,
                    );
                }
            }
            Some(Command::Quit) => {
                if let Some(window) = self.session.preview_mut() {
                    window.destroy_window();
                }
            }
            Some(Command::CycleToneCurve) => self.chain.cycle(SlotKind::ToneCurve),
            Some(Command::CycleRecolor) => self.chain.cycle(SlotKind::Recolor),
            Some(Command::CycleConvolution) => self.chain.cycle(SlotKind::Convolution),
            Some(Command::ToggleStroke) => self.chain.cycle(SlotKind::EdgeStroke),
            Some(Command::ToggleDebugRects) => self.draw_debug_rects = !self.draw_debug_rects,
            None => {}
        }
        self.update_status();
    }

    fn update_status(&mut self) {
        let text = self.status.format(&self.chain);
        log::debug!("{}", self.status.describe(&self.chain));
        if let Some(window) = self.session.preview_mut() {
            window.set_status(&text);
        }
    }

    pub fn chain(&self) -> &FilterChain {
        &self.chain
    }

    pub fn session(&self) -> &FrameSession<S, W> {
        &self.session
    }

    pub fn draws_debug_rects(&self) -> bool {
        self.draw_debug_rects
    }
}
