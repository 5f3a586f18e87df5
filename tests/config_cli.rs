//! Integration tests for configuration loading and command-line overrides.

use cameo::app::{build_chain, AppSettings};
use cameo::cli::{handle_config_action, Args, Command, ConfigAction};
use cameo::config::{Config, ConfigError};
use cameo::recording::FourCc;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[test]
fn test_flags_override_file() {
    let file = config_file(
        "[camera]\ndevice = 1\nwidth = 320\n\n\
         [output]\nscreenshot = \"a.png\"\nfourcc = \"MJPG\"\n",
    );
    let args = Args::parse_from([
        "cameo",
        "--config",
        file.path().to_str().unwrap(),
        "--camera",
        "3",
        "--screenshot",
        "b.jpg",
        "--no-mirror",
        "--extended",
    ]);

    let mut config = Config::load(args.config.as_deref()).unwrap();
    args.apply_to(&mut config);

    assert_eq!(config.camera.device, 3);
    assert_eq!(config.camera.width, 320);
    assert!(!config.camera.mirror);
    assert_eq!(config.output.screenshot, PathBuf::from("b.jpg"));

    let settings = AppSettings::from_config(&config).unwrap();
    assert_eq!(settings.fourcc, FourCc::MJPG);
    assert!(settings.extended);
    assert_eq!(settings.window_size, (320, 480));
}

#[test]
fn test_stroke_sizes_from_file_reach_chain() {
    let file = config_file("[filters]\nblur_ksize = 0\nedge_ksize = 3\n");
    let config = Config::load(Some(file.path())).unwrap();
    assert!(build_chain(&config).is_ok());

    let file = config_file("[filters]\nedge_ksize = 33\n");
    let config = Config::load(Some(file.path())).unwrap();
    assert!(build_chain(&config).is_err());
}

#[test]
fn test_unknown_fourcc_length_rejected() {
    let args = Args::parse_from(["cameo", "--fourcc", "XVIDX"]);
    let mut config = Config::default();
    args.apply_to(&mut config);
    assert!(AppSettings::from_config(&config).is_err());
}

#[test]
fn test_bad_file_reports_path() {
    let file = config_file("[ui]\nextended = \"yes\"\n");
    let err = Config::load(Some(file.path())).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err
        .to_string()
        .contains(&file.path().display().to_string()));
}

#[test]
fn test_subcommands_parse() {
    let args = Args::parse_from(["cameo", "list-cameras"]);
    assert!(matches!(args.command, Some(Command::ListCameras)));

    let args = Args::parse_from(["cameo", "config", "init"]);
    assert!(matches!(
        args.command,
        Some(Command::Config {
            action: ConfigAction::Init
        })
    ));
}

#[test]
fn test_config_init_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let config = Config::default();
    handle_config_action(ConfigAction::Init, &config, Some(&path)).unwrap();
    assert_eq!(Config::load(Some(&path)).unwrap(), config);
    assert!(handle_config_action(ConfigAction::Init, &config, Some(&path)).is_err());
}
