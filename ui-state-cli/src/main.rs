//! UI State Replay CLI
//!
//! Command-line front end for the ui-state library. It replays a scripted
//! scenario of topic deliveries and user input through the UI state and
//! interaction tracker, then prints what the UI would have derived:
//! - Ignition, onroad/offroad and panda type
//! - Ambient light level
//! - Engagement status
//! - Interaction timeouts

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

mod config;
mod replay;
mod report;

use report::{OutputFormat, Report};

/// UI State Replay - Run a scenario through the UI state engine
#[derive(Parser, Debug)]
#[command(name = "ui-state-cli")]
#[command(about = "Replay topic scenarios through the UI state engine", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the scenario file (scenario.toml)
    #[arg(short, long, value_name = "FILE")]
    scenario: PathBuf,

    /// Path to a UI configuration file, overriding the scenario's [config]
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the nominal frame rate
    #[arg(long, value_name = "FPS", value_parser = clap::value_parser!(u32).range(1..))]
    fps: Option<u32>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Txt)]
    format: OutputFormat,

    /// Output file for the report (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("UI State Replay CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using ui-state library v{}", ui_state::VERSION);

    log::info!("Loading scenario from: {:?}", args.scenario);
    let scenario = config::load_scenario(&args.scenario)?;

    let mut ui_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => scenario.config.clone().unwrap_or_default(),
    };
    if let Some(fps) = args.fps {
        ui_config.fps = fps;
    }
    log::debug!("Effective configuration: {:?}", ui_config);

    let replay = replay::run(&scenario, ui_config.clone());

    let name = scenario
        .name
        .clone()
        .unwrap_or_else(|| args.scenario.display().to_string());
    let report = Report::new(name, ui_config, replay);
    let rendered = report.render(args.format)?;

    match &args.output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write report: {:?}", path))?;
            log::info!("Report written to {:?}", path);
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
