use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::core::ballistics::Trajectory;
use crate::core::error::{AnalyzerError, Result};

pub const DEFAULT_TRAJECTORY_FILE: &str = "trajectory_data.csv";

/// Rewrites `path` with one `Time,Height,Distance` row per sample.
/// Returns the number of samples written.
pub fn write_trajectory_csv(trajectory: &Trajectory, path: &Path) -> Result<usize> {
    let file = File::create(path).map_err(|source| AnalyzerError::Export {
        path: path.to_path_buf(),
        source,
    })?;
    let written =
        write_trajectory_rows(trajectory, BufWriter::new(file)).map_err(|source| {
            AnalyzerError::Export {
                path: path.to_path_buf(),
                source,
            }
        })?;

    info!(path = %path.display(), samples = written, "exported trajectory");
    Ok(written)
}

pub fn write_trajectory_rows<W: Write>(trajectory: &Trajectory, out: W) -> io::Result<usize> {
    let mut writer = csv::Writer::from_writer(out);
    let mut written = 0;
    for sample in trajectory {
        writer.serialize(sample)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{write_trajectory_csv, write_trajectory_rows};
    use crate::core::ballistics::{Trajectory, compute_summary, trajectory};
    use crate::core::error::AnalyzerError;

    #[test]
    fn rows_start_with_header_and_launch_point() {
        let path = trajectory(compute_summary(20.0, 45.0)).expect("sampled");
        let mut buffer = Vec::new();
        let written = write_trajectory_rows(&path, &mut buffer).expect("in-memory write");

        let text = String::from_utf8(buffer).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(written, path.sample_count());
        assert_eq!(lines.len(), written + 1);
        assert_eq!(lines[0], "Time,Height,Distance");
        assert_eq!(lines[1], "0.0,0.0,0.0");
    }

    #[test]
    fn export_overwrites_previous_file() {
        let file = std::env::temp_dir().join(format!(
            "projectile_export_{}_overwrite.csv",
            std::process::id()
        ));

        let long = Trajectory::new(compute_summary(50.0, 70.0), 0.1).expect("valid interval");
        let short = Trajectory::new(compute_summary(5.0, 20.0), 0.1).expect("valid interval");
        write_trajectory_csv(&long, &file).expect("first export");
        let written = write_trajectory_csv(&short, &file).expect("second export");

        let text = fs::read_to_string(&file).expect("read back");
        assert_eq!(text.lines().count(), written + 1);
        let _ = fs::remove_file(&file);
    }

    #[test]
    fn unwritable_path_is_export_error() {
        let file = std::env::temp_dir()
            .join(format!("projectile_export_missing_{}", std::process::id()))
            .join("trajectory.csv");

        let path = trajectory(compute_summary(10.0, 45.0)).expect("sampled");
        let err = write_trajectory_csv(&path, &file).expect_err("parent directory is missing");
        assert!(matches!(err, AnalyzerError::Export { .. }));
    }
}
