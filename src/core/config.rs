use std::io;
use std::path::PathBuf;

use clap::{ArgAction, Args, ValueHint};
use tracing_subscriber::EnvFilter;

use crate::core::ballistics::DEFAULT_SAMPLE_INTERVAL_S;
use crate::core::error::{AnalyzerError, Result};
use crate::core::export::DEFAULT_TRAJECTORY_FILE;
use crate::core::store::{DEFAULT_DATA_FILE, LoadPolicy};

pub const DEFAULT_FLIGHT_TIME_LIMIT_S: f64 = 5.0;

/// Options shared by the terminal and windowed front ends.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// CSV file holding every saved projectile
    #[arg(long, default_value = DEFAULT_DATA_FILE, value_hint = ValueHint::FilePath)]
    pub data_file: PathBuf,

    /// CSV file rewritten by trajectory analysis
    #[arg(long, default_value = DEFAULT_TRAJECTORY_FILE, value_hint = ValueHint::FilePath)]
    pub trajectory_file: PathBuf,

    /// Trajectory sampling interval (seconds)
    #[arg(long, default_value_t = DEFAULT_SAMPLE_INTERVAL_S)]
    pub interval: f64,

    /// Default flight-time threshold (seconds)
    #[arg(long, default_value_t = DEFAULT_FLIGHT_TIME_LIMIT_S)]
    pub limit: f64,

    /// Skip unreadable rows in the data file instead of refusing to start
    #[arg(long, action = ArgAction::SetTrue)]
    pub skip_corrupt: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_file: PathBuf,
    pub trajectory_file: PathBuf,
    pub sample_interval_s: f64,
    pub default_limit_s: f64,
    pub load_policy: LoadPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            trajectory_file: PathBuf::from(DEFAULT_TRAJECTORY_FILE),
            sample_interval_s: DEFAULT_SAMPLE_INTERVAL_S,
            default_limit_s: DEFAULT_FLIGHT_TIME_LIMIT_S,
            load_policy: LoadPolicy::Strict,
        }
    }
}

impl TryFrom<&ConfigArgs> for AppConfig {
    type Error = AnalyzerError;

    fn try_from(args: &ConfigArgs) -> Result<Self> {
        if !args.interval.is_finite() || args.interval <= 0.0 {
            return Err(AnalyzerError::invalid(format!(
                "--interval must be a positive number of seconds, got {}",
                args.interval
            )));
        }
        if !args.limit.is_finite() {
            return Err(AnalyzerError::invalid(format!(
                "--limit must be a finite number of seconds, got {}",
                args.limit
            )));
        }

        Ok(Self {
            data_file: args.data_file.clone(),
            trajectory_file: args.trajectory_file.clone(),
            sample_interval_s: args.interval,
            default_limit_s: args.limit,
            load_policy: if args.skip_corrupt {
                LoadPolicy::SkipCorrupt
            } else {
                LoadPolicy::Strict
            },
        })
    }
}

fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
