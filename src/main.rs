//! Snapcam CLI
//!
//! Terminal front-end for the camera widget: live half-block preview,
//! power toggle, one-key PNG snapshot export.

use clap::Parser;
use snapcam::capture::FileConfig;
use snapcam::export::DiskSink;
use snapcam::session::{MockSourceFactory, SourceFactory};
use snapcam::widget::CameraWidget;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "snapcam",
    version,
    about = "Camera snapshot widget with a live terminal preview"
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Camera device index
    #[arg(short, long)]
    device: Option<u32>,

    /// Requested frame width
    #[arg(long)]
    width: Option<u32>,

    /// Requested frame height
    #[arg(long)]
    height: Option<u32>,

    /// Directory snapshots are saved into
    #[arg(long)]
    photos_dir: Option<PathBuf>,

    /// Use the synthetic mock camera instead of real hardware
    #[arg(long)]
    mock: bool,
}

fn main() {
    // Initialize logging; stderr so the alternate screen stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    // CLI flags override file config
    if let Some(device) = cli.device {
        config.capture.device_id = device;
    }
    if let Some(width) = cli.width {
        config.capture.width = width;
    }
    if let Some(height) = cli.height {
        config.capture.height = height;
    }
    if let Some(dir) = cli.photos_dir {
        config.output.photos_dir = dir;
    }

    if let Err(e) = config.capture.validate() {
        eprintln!("Invalid capture configuration: {}", e);
        std::process::exit(1);
    }

    info!("Snapcam v{}", snapcam::VERSION);

    let factory: Arc<dyn SourceFactory> = if cli.mock {
        info!("Using mock camera source");
        Arc::new(MockSourceFactory)
    } else {
        #[cfg(feature = "camera")]
        {
            Arc::new(snapcam::session::NokhwaSourceFactory)
        }
        #[cfg(not(feature = "camera"))]
        {
            info!("Built without the `camera` feature; using mock camera source");
            Arc::new(MockSourceFactory)
        }
    };

    let widget = CameraWidget::new(factory, config.capture.clone());
    let sink = DiskSink::new(config.output.photos_dir.clone());

    if let Err(e) = snapcam::terminal::run(widget, sink) {
        eprintln!("Terminal UI error: {}", e);
        std::process::exit(1);
    }
}
