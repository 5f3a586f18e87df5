//! CLI argument parsing with clap.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

/// Webcam viewer with cycling film-look filters, snapshots and recording
#[derive(Parser, Debug)]
#[command(name = "cameo")]
#[command(version, about = "Live webcam filters with snapshot and recording", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Camera device index (from list-cameras)
    #[arg(long)]
    pub camera: Option<u32>,

    /// Requested capture width
    #[arg(long)]
    pub width: Option<u32>,

    /// Requested capture height
    #[arg(long)]
    pub height: Option<u32>,

    /// Show the preview unmirrored
    #[arg(long)]
    pub no_mirror: bool,

    /// Swap detected faces and enable the X key
    #[arg(long)]
    pub extended: bool,

    /// Snapshot path used by Space
    #[arg(long)]
    pub screenshot: Option<PathBuf>,

    /// Recording path used by Tab
    #[arg(long)]
    pub screencast: Option<PathBuf>,

    /// Four-character video codec code, e.g. I420 or MJPG
    #[arg(long)]
    pub fourcc: Option<String>,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available cameras
    ListCameras,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

impl Args {
    /// Overlay command-line flags on a loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(device) = self.camera {
            config.camera.device = device;
        }
        if let Some(width) = self.width {
            config.camera.width = width;
        }
        if let Some(height) = self.height {
            config.camera.height = height;
        }
        if self.no_mirror {
            config.camera.mirror = false;
        }
        if self.extended {
            config.ui.extended = true;
        }
        if let Some(path) = &self.screenshot {
            config.output.screenshot = path.clone();
        }
        if let Some(path) = &self.screencast {
            config.output.screencast = path.clone();
        }
        if let Some(fourcc) = &self.fourcc {
            config.output.fourcc = fourcc.clone();
        }
    }

    /// Log filter implied by `-v`.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
