use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand, ValueHint};
use tracing::info;

use projectile_analyzer::core::command::{
    Command, LaunchInput, MenuAction, Outcome, Session, parse_angle, parse_count, parse_index,
    parse_limit, parse_speed,
};
use projectile_analyzer::core::config::{AppConfig, ConfigArgs, init_tracing};
use projectile_analyzer::core::error::AnalyzerError;
use projectile_analyzer::core::plot::{default_plot_path, render_trajectory_chart};

#[derive(Parser, Debug)]
#[command(
    name = "projectile_analyzer",
    version,
    about = "Projectile flight statistics, comparisons and trajectory plots"
)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Run a single action and exit; without one the interactive menu starts
    #[command(subcommand)]
    action: Option<Action>,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Compute and save launches (pair each --speed with an --angle)
    Add {
        /// Launch speed (m/s)
        #[arg(short, long = "speed", required = true, allow_negative_numbers = true)]
        speeds: Vec<f64>,

        /// Launch angle (degrees)
        #[arg(short, long = "angle", required = true, allow_negative_numbers = true)]
        angles: Vec<f64>,
    },
    /// Average max height, max range and flight time
    Stats,
    /// Launch with the longest range
    MaxRange,
    /// Launch with the highest peak
    MaxHeight,
    /// Launches whose flight time exceeds a limit
    Exceeding {
        /// Flight time limit (seconds), defaults to --limit
        #[arg(allow_negative_numbers = true)]
        limit: Option<f64>,
    },
    /// Export the sampled trajectory of one launch (0-based index)
    Analyze { index: usize },
    /// List every launch side by side
    Compare,
    /// Render height/distance over time for one launch (0-based index)
    Plot {
        index: usize,

        /// Output .png or .svg path
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
}

impl Action {
    fn into_command(self, config: &AppConfig) -> Result<Command> {
        Ok(match self {
            Action::Add { speeds, angles } => {
                if speeds.len() != angles.len() {
                    bail!(
                        "got {} speed(s) but {} angle(s); give one angle per speed",
                        speeds.len(),
                        angles.len()
                    );
                }
                let launches = speeds
                    .into_iter()
                    .zip(angles)
                    .map(|(speed, angle)| LaunchInput::new(speed, angle))
                    .collect::<Result<Vec<_>, AnalyzerError>>()?;
                Command::AddProjectiles(launches)
            }
            Action::Stats => Command::Statistics,
            Action::MaxRange => Command::MaxRange,
            Action::MaxHeight => Command::MaxHeight,
            Action::Exceeding { limit } => {
                let limit = limit.unwrap_or(config.default_limit_s);
                if !limit.is_finite() {
                    bail!("flight time limit must be finite");
                }
                Command::FlightTimeAbove(limit)
            }
            Action::Analyze { index } => Command::TrajectoryAnalysis(index),
            Action::Compare => Command::Compare,
            Action::Plot { index, .. } => Command::PlotTrajectory(index),
        })
    }
}

/// Line-oriented prompts over any reader/writer pair. `None` means EOF.
struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn say(&mut self, message: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Re-asks until `parse` accepts the answer; an empty answer takes `default`.
    fn ask_until<T, F>(
        &mut self,
        prompt: &str,
        default: Option<T>,
        parse: F,
    ) -> io::Result<Option<T>>
    where
        T: Copy,
        F: Fn(&str) -> Result<T, AnalyzerError>,
    {
        loop {
            let Some(answer) = self.ask(prompt)? else {
                return Ok(None);
            };
            if let (true, Some(value)) = (answer.is_empty(), default) {
                return Ok(Some(value));
            }
            match parse(&answer) {
                Ok(value) => return Ok(Some(value)),
                Err(err) => self.say(err)?,
            }
        }
    }
}

fn print_menu<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>) -> io::Result<()> {
    prompter.say("")?;
    prompter.say("Projectile Analyzer")?;
    for (number, action) in MenuAction::ALL.iter().enumerate() {
        prompter.say(format!("  {}. {}", number + 1, action.label()))?;
    }
    Ok(())
}

fn collect_launches<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
) -> io::Result<Option<Vec<LaunchInput>>> {
    let Some(count) = prompter.ask_until(
        "Enter the number of projectiles to launch [1]: ",
        Some(1),
        parse_count,
    )?
    else {
        return Ok(None);
    };

    let mut launches = Vec::new();
    for n in 1..=count {
        loop {
            let Some(speed) =
                prompter.ask_until(&format!("Speed (m/s) for projectile {n}: "), None, parse_speed)?
            else {
                return Ok(None);
            };
            let Some(angle) = prompter.ask_until(
                &format!("Launch angle (degrees) for projectile {n}: "),
                None,
                parse_angle,
            )?
            else {
                return Ok(None);
            };
            match LaunchInput::new(speed, angle) {
                Ok(launch) => {
                    launches.push(launch);
                    break;
                }
                Err(err) => prompter.say(err)?,
            }
        }
    }
    Ok(Some(launches))
}

fn collect_command<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    action: MenuAction,
    config: &AppConfig,
) -> io::Result<Option<Command>> {
    let command = match action {
        MenuAction::AddProjectiles => collect_launches(prompter)?.map(Command::AddProjectiles),
        MenuAction::Statistics => Some(Command::Statistics),
        MenuAction::MaxRange => Some(Command::MaxRange),
        MenuAction::MaxHeight => Some(Command::MaxHeight),
        MenuAction::FlightTimeAbove => prompter
            .ask_until(
                &format!(
                    "Enter the flight time limit (in seconds) [{}]: ",
                    config.default_limit_s
                ),
                Some(config.default_limit_s),
                parse_limit,
            )?
            .map(Command::FlightTimeAbove),
        MenuAction::TrajectoryAnalysis => prompter
            .ask_until(
                "Enter the index of the projectile for trajectory analysis [0]: ",
                Some(0),
                parse_index,
            )?
            .map(Command::TrajectoryAnalysis),
        MenuAction::Compare => Some(Command::Compare),
        MenuAction::PlotTrajectory => prompter
            .ask_until(
                "Enter the index of the projectile for trajectory plot [0]: ",
                Some(0),
                parse_index,
            )?
            .map(Command::PlotTrajectory),
        MenuAction::Exit => Some(Command::Exit),
    };
    Ok(command)
}

/// Writes the outcome text; plots are rendered to `plot_path` or a timestamped default.
fn present<W: Write>(out: &mut W, outcome: &Outcome, plot_path: Option<&Path>) -> Result<()> {
    writeln!(out, "{outcome}")?;
    if let Outcome::Plot { index, trajectory } = outcome {
        let path = match plot_path {
            Some(path) => path.to_path_buf(),
            None => default_plot_path(*index, &Local::now()),
        };
        render_trajectory_chart(trajectory, *index, &path)?;
        writeln!(out, "Trajectory plot saved to {}", path.display())?;
    }
    Ok(())
}

fn run_menu<R: BufRead, W: Write>(session: &mut Session, input: R, output: W) -> Result<()> {
    let mut prompter = Prompter::new(input, output);
    prompter.say(format!(
        "Loaded {} projectile(s) from {}",
        session.records().len(),
        session.store().path().display()
    ))?;

    loop {
        print_menu(&mut prompter)?;
        let Some(choice) = prompter.ask("Choose an action: ")? else {
            break;
        };
        let Some(action) = choice
            .parse::<usize>()
            .ok()
            .and_then(MenuAction::from_number)
        else {
            prompter.say(format!(
                "Unknown choice '{choice}'. Enter a number from 1 to {}.",
                MenuAction::ALL.len()
            ))?;
            continue;
        };

        if action.needs_records() && session.records().is_empty() {
            prompter.say(AnalyzerError::EmptyInput)?;
            continue;
        }
        let Some(command) = collect_command(&mut prompter, action, session.config())? else {
            break;
        };

        match session.execute(command) {
            Ok(Outcome::Exit) => break,
            Ok(outcome) => {
                if let Err(err) = present(&mut prompter.output, &outcome, None) {
                    prompter.say(format!("Error: {err:#}"))?;
                }
            }
            Err(err) => prompter.say(format!("Error: {err}"))?,
        }
    }

    prompter.say(Outcome::Exit)?;
    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.config.verbose);

    let config = AppConfig::try_from(&cli.config)?;
    let mut session = Session::open(config).context("could not open the projectile data file")?;
    info!(records = session.records().len(), "session ready");

    match cli.action {
        None => {
            let stdin = io::stdin();
            run_menu(&mut session, stdin.lock(), io::stdout())
        }
        Some(action) => {
            let plot_path = match &action {
                Action::Plot { output, .. } => output.clone(),
                _ => None,
            };
            let command = action.into_command(session.config())?;
            let outcome = session.execute(command)?;
            present(&mut io::stdout().lock(), &outcome, plot_path.as_deref())
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Cursor;
    use std::path::PathBuf;

    use projectile_analyzer::core::command::Session;
    use projectile_analyzer::core::config::AppConfig;

    use super::run_menu;

    fn scratch_config(name: &str) -> AppConfig {
        let dir = std::env::temp_dir();
        let data_file = dir.join(format!("projectile_menu_{}_{name}.csv", std::process::id()));
        let trajectory_file =
            dir.join(format!("projectile_menu_{}_{name}_traj.csv", std::process::id()));
        let _ = fs::remove_file(&data_file);
        let _ = fs::remove_file(&trajectory_file);
        AppConfig {
            data_file,
            trajectory_file,
            ..AppConfig::default()
        }
    }

    fn drive(config: &AppConfig, script: &str) -> String {
        let mut session = Session::open(config.clone()).expect("open session");
        let mut output = Vec::new();
        run_menu(&mut session, Cursor::new(script.to_string()), &mut output).expect("menu run");
        String::from_utf8(output).expect("utf8 output")
    }

    fn cleanup(config: &AppConfig) {
        let paths: [&PathBuf; 2] = [&config.data_file, &config.trajectory_file];
        for path in paths {
            let _ = fs::remove_file(path);
        }
    }

    #[test]
    fn adds_batch_and_reports_statistics() {
        let config = scratch_config("batch");
        let output = drive(&config, "1\n2\n20\n45\n10\n30\n2\n9\n");

        assert!(output.contains("2 projectile(s) added successfully!"));
        assert!(output.contains("Average Max Range"));
        assert!(output.trim_end().ends_with("Goodbye."));

        let reopened = Session::open(config.clone()).expect("reopen");
        assert_eq!(reopened.records().len(), 2);
        cleanup(&config);
    }

    #[test]
    fn reasks_after_bad_numbers() {
        let config = scratch_config("reask");
        let output = drive(&config, "1\nabc\n1\nfast\n-3\n12\n40\n9\n");

        assert!(output.contains("invalid projectile count: 'abc'"));
        assert!(output.contains("invalid speed: 'fast'"));
        assert!(output.contains("speed must be a positive number"));
        assert!(output.contains("1 projectile(s) added successfully!"));
        cleanup(&config);
    }

    #[test]
    fn huge_batch_count_is_reasked() {
        let config = scratch_config("huge_batch");
        let output = drive(&config, "1\n1000000000000000000\n1\n15\n30\n9\n");

        assert!(output.contains("launch at most 1000 projectiles at a time"));
        assert!(output.contains("1 projectile(s) added successfully!"));
        cleanup(&config);
    }

    #[test]
    fn huge_speed_is_reasked_and_file_still_loads() {
        let config = scratch_config("huge_speed");
        let output = drive(&config, "1\n1\n1e160\n45\n20\n45\n9\n");

        assert!(output.contains("speed must be at most"));
        assert!(output.contains("1 projectile(s) added successfully!"));

        let reopened = Session::open(config.clone()).expect("data file stays loadable");
        assert_eq!(reopened.records().len(), 1);
        assert_eq!(reopened.records()[0].speed_mps, 20.0);
        cleanup(&config);
    }

    #[test]
    fn empty_store_guard_skips_prompts() {
        let config = scratch_config("empty");
        let output = drive(&config, "6\n7\n9\n");

        assert_eq!(output.matches("no projectiles added").count(), 2);
        assert!(!output.contains("Enter the index"));
        cleanup(&config);
    }

    #[test]
    fn analysis_exports_trajectory_with_default_index() {
        let config = scratch_config("analysis");
        let output = drive(&config, "1\n1\n20\n45\n6\n\n9\n");

        assert!(output.contains("saved to"));
        let text = fs::read_to_string(&config.trajectory_file).expect("trajectory export");
        assert!(text.starts_with("Time,Height,Distance"));
        cleanup(&config);
    }

    #[test]
    fn out_of_range_index_is_reported() {
        let config = scratch_config("bad_index");
        let output = drive(&config, "1\n1\n20\n45\n6\n4\n9\n");

        assert!(output.contains("Error: index 4 is out of range (have 1 projectiles)"));
        cleanup(&config);
    }

    #[test]
    fn unknown_choice_and_eof_end_cleanly() {
        let config = scratch_config("eof");
        let output = drive(&config, "42\n");

        assert!(output.contains("Unknown choice '42'"));
        assert!(output.trim_end().ends_with("Goodbye."));
        cleanup(&config);
    }
}
