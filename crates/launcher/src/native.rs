use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use bevy::log::{Level, error, info};
use clap::{Parser, ValueEnum};
use root_motion::config::MotionConfig;

use crate::sim::{Scenario, create_sim_app, run_scenario, spawn_scenario};
use crate::world::WaterWorld;

#[derive(Parser)]
#[command(name = "launcher")]
#[command(version = "0.1")]
#[command(about = "Headless root motion playground")]
#[command(long_about = "
Headless root motion playground

EXAMPLES:
    cargo run --bin launcher -- dash                               # Dash on flat ground
    cargo run --bin launcher -- breach --ticks 900                 # Breach, leap and dive
    cargo run --bin launcher -- breach --config motion.json        # Override tunables
    cargo run --bin launcher -- dash --log-level debug             # Show registration traffic
")]
struct Cli {
    #[arg(value_enum)]
    scenario: ScenarioArg,

    #[arg(long, default_value_t = 600)]
    #[arg(help = "Fixed steps to simulate")]
    ticks: u32,

    #[arg(long)]
    #[arg(help = "JSON file overriding the motion tunables")]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum ScenarioArg {
    Dash,
    Breach,
}

impl From<ScenarioArg> for Scenario {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::Dash => Scenario::Dash,
            ScenarioArg::Breach => Scenario::Breach,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Reads a JSON config. Missing fields keep their defaults.
pub fn load_config(path: &Path) -> Result<MotionConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.config.as_deref().map(load_config).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            eprintln!("{err:#}");
            return ExitCode::FAILURE;
        }
    };

    let scenario = Scenario::from(cli.scenario);
    let world = match scenario {
        Scenario::Dash => WaterWorld {
            surface_height: -5000.0,
            floor_height: 0.0,
        },
        Scenario::Breach => WaterWorld::default(),
    };

    let mut app = create_sim_app(config, world, Some(cli.log_level.into()));
    let entity = spawn_scenario(&mut app, scenario);
    let report = run_scenario(&mut app, entity, cli.ticks);

    if report.completions.is_empty() {
        error!("No force completed within {} ticks", report.ticks);
        return ExitCode::FAILURE;
    }
    info!(
        "{:?} finished after {} ticks at {:?} moving {:?}",
        scenario, report.ticks, report.position, report.velocity
    );
    ExitCode::SUCCESS
}
