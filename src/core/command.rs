//! Menu actions as explicit commands, executed against a session that owns
//! the record store.

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::core::analytics::{self, AverageStats, ComparisonRow};
use crate::core::ballistics::{ProjectileSummary, Trajectory, compute_summary};
use crate::core::config::AppConfig;
use crate::core::error::{AnalyzerError, Result};
use crate::core::export::write_trajectory_csv;
use crate::core::store::RecordStore;

/// Fastest accepted launch. Keeps every derived statistic finite and
/// default-interval trajectories under the sample cap.
pub const MAX_LAUNCH_SPEED_MPS: f64 = 100_000.0;
/// Most projectiles accepted in one add.
pub const MAX_BATCH_SIZE: usize = 1_000;

/// A validated speed/angle pair collected by a shell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaunchInput {
    speed_mps: f64,
    angle_deg: f64,
}

impl LaunchInput {
    pub fn new(speed_mps: f64, angle_deg: f64) -> Result<Self> {
        if !speed_mps.is_finite() || speed_mps <= 0.0 {
            return Err(AnalyzerError::invalid(format!(
                "speed must be a positive number of m/s, got {speed_mps}"
            )));
        }
        if speed_mps > MAX_LAUNCH_SPEED_MPS {
            return Err(AnalyzerError::invalid(format!(
                "speed must be at most {MAX_LAUNCH_SPEED_MPS} m/s, got {speed_mps}"
            )));
        }
        if !angle_deg.is_finite() {
            return Err(AnalyzerError::invalid(format!(
                "angle must be a finite number of degrees, got {angle_deg}"
            )));
        }
        if !(0.0..=90.0).contains(&angle_deg) {
            warn!(angle_deg, "launch angle outside 0-90 degrees");
        }
        Ok(Self {
            speed_mps,
            angle_deg,
        })
    }

    pub fn speed_mps(&self) -> f64 {
        self.speed_mps
    }

    pub fn angle_deg(&self) -> f64 {
        self.angle_deg
    }

    pub fn summary(&self) -> ProjectileSummary {
        compute_summary(self.speed_mps, self.angle_deg)
    }
}

fn parse_f64(value: &str, label: &str) -> Result<f64> {
    value.trim().parse::<f64>().map_err(|_| {
        AnalyzerError::invalid(format!(
            "invalid {label}: '{}'. Expected a number.",
            value.trim()
        ))
    })
}

fn parse_usize(value: &str, label: &str) -> Result<usize> {
    value.trim().parse::<usize>().map_err(|_| {
        AnalyzerError::invalid(format!(
            "invalid {label}: '{}'. Expected a whole number.",
            value.trim()
        ))
    })
}

pub fn parse_count(value: &str) -> Result<usize> {
    match parse_usize(value, "projectile count")? {
        0 => Err(AnalyzerError::invalid("launch at least one projectile")),
        count if count > MAX_BATCH_SIZE => Err(AnalyzerError::invalid(format!(
            "launch at most {MAX_BATCH_SIZE} projectiles at a time"
        ))),
        count => Ok(count),
    }
}

pub fn parse_speed(value: &str) -> Result<f64> {
    parse_f64(value, "speed")
}

pub fn parse_angle(value: &str) -> Result<f64> {
    parse_f64(value, "angle")
}

pub fn parse_index(value: &str) -> Result<usize> {
    parse_usize(value, "projectile index")
}

pub fn parse_limit(value: &str) -> Result<f64> {
    let limit = parse_f64(value, "flight time limit")?;
    if !limit.is_finite() {
        return Err(AnalyzerError::invalid("flight time limit must be finite"));
    }
    Ok(limit)
}

/// Payload-free menu entries, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    AddProjectiles,
    Statistics,
    MaxRange,
    MaxHeight,
    FlightTimeAbove,
    TrajectoryAnalysis,
    Compare,
    PlotTrajectory,
    Exit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 9] = [
        MenuAction::AddProjectiles,
        MenuAction::Statistics,
        MenuAction::MaxRange,
        MenuAction::MaxHeight,
        MenuAction::FlightTimeAbove,
        MenuAction::TrajectoryAnalysis,
        MenuAction::Compare,
        MenuAction::PlotTrajectory,
        MenuAction::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuAction::AddProjectiles => "Add Projectile",
            MenuAction::Statistics => "Calculate Statistics",
            MenuAction::MaxRange => "Max Horizontal Distance",
            MenuAction::MaxHeight => "Highest Maximum Height",
            MenuAction::FlightTimeAbove => "Flight Time Exceeding Limit",
            MenuAction::TrajectoryAnalysis => "Trajectory Analysis",
            MenuAction::Compare => "Compare Projectiles",
            MenuAction::PlotTrajectory => "Plot Trajectory",
            MenuAction::Exit => "Exit",
        }
    }

    /// Actions that have nothing to say about an empty store.
    pub fn needs_records(self) -> bool {
        !matches!(self, MenuAction::AddProjectiles | MenuAction::Exit)
    }

    /// Maps a 1-based menu number to its action.
    pub fn from_number(number: usize) -> Option<Self> {
        number
            .checked_sub(1)
            .and_then(|idx| Self::ALL.get(idx).copied())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    AddProjectiles(Vec<LaunchInput>),
    Statistics,
    MaxRange,
    MaxHeight,
    FlightTimeAbove(f64),
    TrajectoryAnalysis(usize),
    Compare,
    PlotTrajectory(usize),
    Exit,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Added(Vec<ProjectileSummary>),
    Statistics {
        averages: AverageStats,
        shortest: (usize, ProjectileSummary),
        lowest: (usize, ProjectileSummary),
    },
    MaxRange {
        index: usize,
        record: ProjectileSummary,
    },
    MaxHeight {
        index: usize,
        record: ProjectileSummary,
    },
    FlightTimeAbove {
        limit_s: f64,
        records: Vec<ProjectileSummary>,
    },
    TrajectoryExported {
        index: usize,
        path: PathBuf,
        samples: usize,
    },
    Comparison(Vec<ComparisonRow>),
    /// Rendering is left to the shell.
    Plot {
        index: usize,
        trajectory: Trajectory,
    },
    Exit,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Added(records) => {
                write!(f, "{} projectile(s) added successfully!", records.len())?;
                for record in records {
                    write!(
                        f,
                        "\nSpeed: {}, Angle: {}, Flight Time: {:.2} s, Max Height: {:.2} m, Max Range: {:.2} m",
                        record.speed_mps,
                        record.angle_deg,
                        record.time_of_flight_s,
                        record.max_height_m,
                        record.max_range_m
                    )?;
                }
                Ok(())
            }
            Outcome::Statistics {
                averages,
                shortest: (shortest_index, shortest),
                lowest: (lowest_index, lowest),
            } => write!(
                f,
                "Average Max Height: {:.2} meters\nAverage Max Range: {:.2} meters\nAverage Flight Time: {:.2} seconds\nShortest Range: {:.2} meters (index {shortest_index})\nLowest Max Height: {:.2} meters (index {lowest_index})",
                averages.max_height_m,
                averages.max_range_m,
                averages.time_of_flight_s,
                shortest.max_range_m,
                lowest.max_height_m
            ),
            Outcome::MaxRange { index, record } => write!(
                f,
                "Launch with Maximum Horizontal Distance (index {index}):\nSpeed: {}, Angle: {}\nMax Horizontal Distance: {:.2} meters",
                record.speed_mps, record.angle_deg, record.max_range_m
            ),
            Outcome::MaxHeight { index, record } => write!(
                f,
                "Launch with Highest Maximum Height (index {index}):\nSpeed: {}, Angle: {}\nHighest Maximum Height: {:.2} meters",
                record.speed_mps, record.angle_deg, record.max_height_m
            ),
            Outcome::FlightTimeAbove { limit_s, records } => {
                write!(f, "Launches with Flight Time Exceeding {limit_s} seconds:")?;
                if records.is_empty() {
                    write!(f, "\n(none)")?;
                }
                for record in records {
                    write!(
                        f,
                        "\nSpeed: {}, Angle: {}, Flight Time: {:.2} seconds",
                        record.speed_mps, record.angle_deg, record.time_of_flight_s
                    )?;
                }
                Ok(())
            }
            Outcome::TrajectoryExported {
                index,
                path,
                samples,
            } => write!(
                f,
                "Trajectory data for projectile {index} ({samples} samples) saved to {}",
                path.display()
            ),
            Outcome::Comparison(rows) => {
                write!(f, "Comparing Projectiles:")?;
                for row in rows {
                    write!(
                        f,
                        "\nProjectile {}: Speed={}, Angle={}, Max Height={:.2}, Max Range={:.2}",
                        row.label,
                        row.record.speed_mps,
                        row.record.angle_deg,
                        row.record.max_height_m,
                        row.record.max_range_m
                    )?;
                }
                Ok(())
            }
            Outcome::Plot { index, trajectory } => write!(
                f,
                "Trajectory for projectile {index}: {} samples every {} s",
                trajectory.sample_count(),
                trajectory.interval_s()
            ),
            Outcome::Exit => write!(f, "Goodbye."),
        }
    }
}

/// Owns the record store for the lifetime of one shell.
#[derive(Debug)]
pub struct Session {
    config: AppConfig,
    store: RecordStore,
}

impl Session {
    pub fn open(config: AppConfig) -> Result<Self> {
        let store = RecordStore::open(&config.data_file, config.load_policy)?;
        Ok(Self { config, store })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn records(&self) -> &[ProjectileSummary] {
        self.store.records()
    }

    pub fn trajectory_for(&self, index: usize) -> Result<Trajectory> {
        let records = self.non_empty_records()?;
        let record = analytics::by_index(records, index)?;
        Trajectory::new(*record, self.config.sample_interval_s)
    }

    fn non_empty_records(&self) -> Result<&[ProjectileSummary]> {
        match self.store.records() {
            [] => Err(AnalyzerError::EmptyInput),
            records => Ok(records),
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<Outcome> {
        debug!(?command, "executing command");
        match command {
            Command::AddProjectiles(launches) => {
                if launches.is_empty() {
                    return Err(AnalyzerError::invalid("launch at least one projectile"));
                }
                if launches.len() > MAX_BATCH_SIZE {
                    return Err(AnalyzerError::invalid(format!(
                        "launch at most {MAX_BATCH_SIZE} projectiles at a time"
                    )));
                }
                let summaries: Vec<ProjectileSummary> =
                    launches.iter().map(LaunchInput::summary).collect();
                self.store.append(&summaries)?;
                Ok(Outcome::Added(summaries))
            }
            Command::Statistics => {
                let records = self.store.records();
                Ok(Outcome::Statistics {
                    averages: analytics::average_stats(records)?,
                    shortest: analytics::min_by_range(records)?,
                    lowest: analytics::min_by_height(records)?,
                })
            }
            Command::MaxRange => {
                let (index, record) = analytics::max_by_range(self.store.records())?;
                Ok(Outcome::MaxRange { index, record })
            }
            Command::MaxHeight => {
                let (index, record) = analytics::max_by_height(self.store.records())?;
                Ok(Outcome::MaxHeight { index, record })
            }
            Command::FlightTimeAbove(limit_s) => {
                let records = self.non_empty_records()?;
                Ok(Outcome::FlightTimeAbove {
                    limit_s,
                    records: analytics::filter_by_flight_time_above(records, limit_s),
                })
            }
            Command::TrajectoryAnalysis(index) => {
                let trajectory = self.trajectory_for(index)?;
                let path = self.config.trajectory_file.clone();
                let samples = write_trajectory_csv(&trajectory, &path)?;
                Ok(Outcome::TrajectoryExported {
                    index,
                    path,
                    samples,
                })
            }
            Command::Compare => Ok(Outcome::Comparison(analytics::compare(
                self.store.records(),
            )?)),
            Command::PlotTrajectory(index) => Ok(Outcome::Plot {
                index,
                trajectory: self.trajectory_for(index)?,
            }),
            Command::Exit => Ok(Outcome::Exit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        LaunchInput, MAX_BATCH_SIZE, MAX_LAUNCH_SPEED_MPS, MenuAction, Outcome, parse_angle,
        parse_count, parse_index, parse_limit, parse_speed,
    };
    use crate::core::analytics::AverageStats;
    use crate::core::ballistics::compute_summary;
    use crate::core::error::AnalyzerError;

    #[test]
    fn launch_input_rejects_bad_speed() {
        for speed in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                LaunchInput::new(speed, 45.0),
                Err(AnalyzerError::InvalidInput(_))
            ));
        }
        assert!(LaunchInput::new(10.0, f64::NAN).is_err());
    }

    #[test]
    fn launch_input_caps_speed() {
        for speed in [MAX_LAUNCH_SPEED_MPS * 1.01, 1e160, f64::MAX] {
            assert!(matches!(
                LaunchInput::new(speed, 45.0),
                Err(AnalyzerError::InvalidInput(_))
            ));
        }

        let fastest = LaunchInput::new(MAX_LAUNCH_SPEED_MPS, 45.0).expect("cap is inclusive");
        let summary = fastest.summary();
        assert!(summary.time_of_flight_s.is_finite());
        assert!(summary.max_height_m.is_finite());
        assert!(summary.max_range_m.is_finite());
    }

    #[test]
    fn launch_input_accepts_unusual_angles() {
        let input = LaunchInput::new(10.0, 120.0).expect("angle range is not enforced");
        assert_eq!(input.angle_deg(), 120.0);
        assert_eq!(input.speed_mps(), 10.0);
    }

    #[test]
    fn parses_shell_text() {
        assert_eq!(parse_count(" 3 ").expect("count"), 3);
        assert!(parse_count("0").is_err());
        assert!(parse_count("2.5").is_err());
        assert_eq!(parse_speed("12.5").expect("speed"), 12.5);
        assert_eq!(parse_angle("-3").expect("angle"), -3.0);
        assert!(parse_angle("north").is_err());
        assert_eq!(parse_index("0").expect("index"), 0);
        assert!(parse_index("-1").is_err());
        assert_eq!(parse_limit("5").expect("limit"), 5.0);
        assert!(parse_limit("inf").is_err());
    }

    #[test]
    fn batch_count_is_capped() {
        assert_eq!(parse_count(&MAX_BATCH_SIZE.to_string()).expect("count"), MAX_BATCH_SIZE);
        assert!(matches!(
            parse_count(&(MAX_BATCH_SIZE + 1).to_string()),
            Err(AnalyzerError::InvalidInput(_))
        ));
        assert!(parse_count("1000000000000000000").is_err());
    }

    #[test]
    fn menu_numbers_are_one_based() {
        assert_eq!(MenuAction::from_number(1), Some(MenuAction::AddProjectiles));
        assert_eq!(MenuAction::from_number(9), Some(MenuAction::Exit));
        assert_eq!(MenuAction::from_number(0), None);
        assert_eq!(MenuAction::from_number(10), None);
    }

    #[test]
    fn statistics_text_uses_two_decimals() {
        let low = compute_summary(10.0, 30.0);
        let text = Outcome::Statistics {
            averages: AverageStats {
                max_height_m: 10.2041,
                max_range_m: 40.8163,
                time_of_flight_s: 2.8857,
            },
            shortest: (1, low),
            lowest: (1, low),
        }
        .to_string();

        assert!(text.contains("Average Max Height: 10.20 meters"));
        assert!(text.contains("Average Max Range: 40.82 meters"));
        assert!(text.contains(&format!(
            "Shortest Range: {:.2} meters (index 1)",
            low.max_range_m
        )));
    }

    #[test]
    fn empty_filter_result_says_none() {
        let text = Outcome::FlightTimeAbove {
            limit_s: 5.0,
            records: Vec::new(),
        }
        .to_string();
        assert!(text.ends_with("(none)"));

        let text = Outcome::FlightTimeAbove {
            limit_s: 1.0,
            records: vec![compute_summary(20.0, 45.0)],
        }
        .to_string();
        assert!(text.contains("Flight Time: 2.89 seconds"));
    }
}
