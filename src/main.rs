use clap::Parser;

use cameo::app::{build_chain, AppError, AppSettings, Cameo};
use cameo::camera::{CameraSettings, NokhwaSource, Resolution};
use cameo::cli::{handle_config_action, list_cameras, Args, Command};
use cameo::config::Config;
use cameo::pipeline::{setup_ctrlc_handler, FfmpegEncoder};
use cameo::session::{FrameSession, ImageFileSink};
use cameo::tracker::NoFaceTracker;
use cameo::window::WindowManager;

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .format_timestamp_millis()
        .init();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let mut config = Config::load(args.config.as_deref())?;
    args.apply_to(&mut config);

    match args.command {
        Some(Command::ListCameras) => {
            list_cameras()?;
            return Ok(());
        }
        Some(Command::Config { action }) => {
            handle_config_action(action, &config, args.config.as_deref())?;
            return Ok(());
        }
        None => {}
    }

    setup_ctrlc_handler()?;

    let settings = AppSettings::from_config(&config)?;
    let chain = build_chain(&config)?;

    let source = NokhwaSource::open(CameraSettings {
        device_index: config.camera.device,
        resolution: Resolution {
            width: config.camera.width,
            height: config.camera.height,
        },
        fps: config.camera.fps,
    })?;
    let negotiated = source.resolution();

    let session = FrameSession::new(
        source,
        Some(WindowManager::new(config.ui.window_title.clone())),
        config.camera.mirror,
        Box::new(ImageFileSink),
        Box::new(FfmpegEncoder),
    );

    let mut app = Cameo::new(
        session,
        chain,
        NoFaceTracker,
        AppSettings {
            window_size: (negotiated.width, negotiated.height),
            ..settings
        },
    );
    app.run()
}
