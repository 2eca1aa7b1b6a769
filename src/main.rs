use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use drape::{ClothConfig, ConfigError, ViewerOptions};

/// Interactive mass-spring cloth.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON config file. Command line options override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cells along x.
    #[arg(long)]
    cols: Option<usize>,

    /// Cells along z.
    #[arg(long)]
    rows: Option<usize>,

    /// Show point markers at startup.
    #[arg(long, default_value_t = false, action = clap::ArgAction::Set)]
    points: bool,

    /// Start fullscreen.
    #[arg(long)]
    fullscreen: bool,

    /// Physics steps allowed per frame. 1 disables catch-up.
    #[arg(long)]
    max_steps: Option<u32>,

    /// Device sampling rate in Hz.
    #[arg(long, default_value_t = 1000.0)]
    device_rate: f32,
}

fn load_config(args: &Args) -> Result<ClothConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => ClothConfig::load(path)?,
        None => ClothConfig::new(),
    };
    if args.cols.is_some() || args.rows.is_some() {
        let cols = args.cols.unwrap_or(config.cols);
        let rows = args.rows.unwrap_or(config.rows);
        config = config.with_grid(cols, rows);
    }
    if let Some(steps) = args.max_steps {
        config = config.with_max_steps_per_tick(steps);
    }
    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = ViewerOptions {
        show_points: args.points,
        fullscreen: args.fullscreen,
        device_rate_hz: args.device_rate,
    };

    match drape::run(config, options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
