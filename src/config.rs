//! Configuration file handling for cameo.
//!
//! Loads configuration from `<config dir>/cameo/config.toml` or a custom path.
//! Every field is optional; missing fields take their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file structure for cameo.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub device: u32,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Mirror the preview horizontally (selfie view)
    #[serde(default = "default_true")]
    pub mirror: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: 0,
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            mirror: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_screenshot")]
    pub screenshot: PathBuf,
    #[serde(default = "default_screencast")]
    pub screencast: PathBuf,
    #[serde(default = "default_fourcc")]
    pub fourcc: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            screenshot: default_screenshot(),
            screencast: default_screencast(),
            fourcc: default_fourcc(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FiltersConfig {
    /// Median blur aperture for edge stroking; below 3 disables the blur
    #[serde(default = "default_blur_ksize")]
    pub blur_ksize: usize,
    /// Laplacian aperture for edge stroking
    #[serde(default = "default_edge_ksize")]
    pub edge_ksize: usize,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            blur_ksize: default_blur_ksize(),
            edge_ksize: default_edge_ksize(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UiConfig {
    /// Swap face regions and allow toggling the face rectangles
    #[serde(default)]
    pub extended: bool,
    #[serde(default = "default_true")]
    pub debug_rects: bool,
    #[serde(default = "default_title")]
    pub window_title: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            extended: false,
            debug_rects: true,
            window_title: default_title(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    480
}

fn default_fps() -> u32 {
    30
}

fn default_screenshot() -> PathBuf {
    PathBuf::from("screenshot.png")
}

fn default_screencast() -> PathBuf {
    PathBuf::from("screencast.avi")
}

fn default_fourcc() -> String {
    "I420".to_string()
}

fn default_blur_ksize() -> usize {
    7
}

fn default_edge_ksize() -> usize {
    5
}

fn default_title() -> String {
    "Cameo".to_string()
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.clone(),
                source: e,
            })?;
            log::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the default configuration to `path`, creating parent
    /// directories. Refuses to overwrite an existing file.
    pub fn write_default(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let content = format!(
            "# cameo configuration\n\n{}",
            Config::default().to_toml()?
        );
        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Errors that can occur when loading or writing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cameo")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.camera.device, 0);
        assert_eq!(config.camera.width, 640);
        assert_eq!(config.camera.height, 480);
        assert!(config.camera.mirror);
        assert_eq!(config.output.screenshot, PathBuf::from("screenshot.png"));
        assert_eq!(config.output.screencast, PathBuf::from("screencast.avi"));
        assert_eq!(config.output.fourcc, "I420");
        assert_eq!(config.filters.blur_ksize, 7);
        assert_eq!(config.filters.edge_ksize, 5);
        assert!(!config.ui.extended);
        assert!(config.ui.debug_rects);
        assert_eq!(config.ui.window_title, "Cameo");
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[camera]\ndevice = 2\nmirror = false\n\n[output]\nfourcc = \"MJPG\"\n\n[ui]\nextended = true"
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.camera.device, 2);
        assert!(!config.camera.mirror);
        assert_eq!(config.camera.width, 640);
        assert_eq!(config.output.fourcc, "MJPG");
        assert_eq!(config.output.screenshot, PathBuf::from("screenshot.png"));
        assert!(config.ui.extended);
        assert!(config.ui.debug_rects);
        assert_eq!(config.filters, FiltersConfig::default());
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[camera\ndevice = ").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_toml_round_trip_of_defaults() {
        let text = Config::default().to_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_write_default_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cameo").join("config.toml");
        Config::write_default(&path).unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap(), Config::default());
        assert!(matches!(
            Config::write_default(&path),
            Err(ConfigError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_default_path_ends_with_cameo_config() {
        assert!(default_path().ends_with("cameo/config.toml"));
    }
}
