//! Closed-form projectile kinematics on flat ground with no drag.
//!
//! Angles are stored in degrees everywhere and converted to radians at the
//! point of use, both for the summary and for trajectory sampling.

use serde::{Deserialize, Serialize};

use crate::core::error::{AnalyzerError, Result};

pub const EARTH_GRAVITY_MPS2: f64 = 9.8;
pub const DEFAULT_SAMPLE_INTERVAL_S: f64 = 0.1;
/// Upper bound on samples in one trajectory, launch sample included.
pub const MAX_TRAJECTORY_SAMPLES: usize = 1_000_000;

// Relative slack when time_of_flight / interval lands on a whole number.
const SAMPLE_COUNT_EPSILON: f64 = 1e-9;

/// Derived statistics for one launch. Field order and names match the record file.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSummary {
    #[serde(rename = "Speed")]
    pub speed_mps: f64,
    #[serde(rename = "Angle")]
    pub angle_deg: f64,
    #[serde(rename = "Time of Flight")]
    pub time_of_flight_s: f64,
    #[serde(rename = "Max Height")]
    pub max_height_m: f64,
    #[serde(rename = "Max Range")]
    pub max_range_m: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TrajectorySample {
    #[serde(rename = "Time")]
    pub time_s: f64,
    #[serde(rename = "Height")]
    pub height_m: f64,
    #[serde(rename = "Distance")]
    pub distance_m: f64,
}

pub fn velocity_components(speed_mps: f64, angle_deg: f64) -> (f64, f64) {
    let theta = angle_deg.to_radians();
    let vx = speed_mps * theta.cos();
    let vy = speed_mps * theta.sin();
    (vx, vy)
}

/// Computes flight time, peak height and range for a launch from ground level.
///
/// Inputs are not validated here. Angles at or below zero (or at or past 180
/// degrees) give a non-positive flight time, which is returned as-is.
pub fn compute_summary(speed_mps: f64, angle_deg: f64) -> ProjectileSummary {
    let (vx, vy) = velocity_components(speed_mps, angle_deg);
    let time_of_flight_s = (2.0 * vy) / EARTH_GRAVITY_MPS2;
    let max_height_m = (vy * vy) / (2.0 * EARTH_GRAVITY_MPS2);
    let max_range_m = vx * time_of_flight_s;

    ProjectileSummary {
        speed_mps,
        angle_deg,
        time_of_flight_s,
        max_height_m,
        max_range_m,
    }
}

pub fn trajectory_at_time(summary: &ProjectileSummary, time_s: f64) -> TrajectorySample {
    let (vx, vy) = velocity_components(summary.speed_mps, summary.angle_deg);
    TrajectorySample {
        time_s,
        height_m: (vy * time_s) - (0.5 * EARTH_GRAVITY_MPS2 * time_s * time_s),
        distance_m: vx * time_s,
    }
}

/// Lazily sampled flight path of one projectile.
///
/// Samples sit at `i * interval` for `i in 0..sample_count()`. The final
/// sample lands at or just past the flight time, so its height may dip
/// slightly below zero. A non-positive flight time yields the single
/// launch sample at `t = 0`. Paths needing more than
/// [`MAX_TRAJECTORY_SAMPLES`] samples are rejected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trajectory {
    summary: ProjectileSummary,
    interval_s: f64,
    sample_count: usize,
}

impl Trajectory {
    pub fn new(summary: ProjectileSummary, interval_s: f64) -> Result<Self> {
        if !interval_s.is_finite() || interval_s <= 0.0 {
            return Err(AnalyzerError::invalid(format!(
                "sampling interval must be a positive number, got {interval_s}"
            )));
        }

        Ok(Self {
            summary,
            interval_s,
            sample_count: sample_count(summary.time_of_flight_s, interval_s)?,
        })
    }

    /// Splits the flight into `samples` equal steps, for smooth drawing.
    /// The step count is clamped to `2..MAX_TRAJECTORY_SAMPLES`.
    pub fn with_samples(summary: ProjectileSummary, samples: usize) -> Result<Self> {
        let steps = samples.clamp(2, MAX_TRAJECTORY_SAMPLES - 1);
        let interval_s = summary.time_of_flight_s / steps as f64;
        if interval_s.is_finite() && interval_s > 0.0 {
            Ok(Self {
                summary,
                interval_s,
                sample_count: steps + 1,
            })
        } else {
            trajectory(summary)
        }
    }

    pub fn summary(&self) -> &ProjectileSummary {
        &self.summary
    }

    pub fn interval_s(&self) -> f64 {
        self.interval_s
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn iter(&self) -> TrajectoryIter {
        TrajectoryIter {
            trajectory: *self,
            next: 0,
        }
    }
}

/// Samples a summary at the default 0.1 s interval.
pub fn trajectory(summary: ProjectileSummary) -> Result<Trajectory> {
    Trajectory::new(summary, DEFAULT_SAMPLE_INTERVAL_S)
}

fn sample_count(time_of_flight_s: f64, interval_s: f64) -> Result<usize> {
    let steps = time_of_flight_s / interval_s;
    // Also catches NaN.
    if !(steps > 0.0) {
        return Ok(1);
    }

    let nearest = steps.round();
    let whole_steps = if (steps - nearest).abs() <= SAMPLE_COUNT_EPSILON * nearest.max(1.0) {
        nearest
    } else {
        steps.ceil()
    };
    // Infinite steps fail here too, before any cast.
    if whole_steps >= MAX_TRAJECTORY_SAMPLES as f64 {
        return Err(AnalyzerError::invalid(format!(
            "a {time_of_flight_s} s flight sampled every {interval_s} s needs more than \
             {MAX_TRAJECTORY_SAMPLES} samples"
        )));
    }
    Ok(whole_steps as usize + 1)
}

#[derive(Clone, Debug)]
pub struct TrajectoryIter {
    trajectory: Trajectory,
    next: usize,
}

impl Iterator for TrajectoryIter {
    type Item = TrajectorySample;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.trajectory.sample_count {
            return None;
        }
        let time_s = self.next as f64 * self.trajectory.interval_s;
        self.next += 1;
        Some(trajectory_at_time(&self.trajectory.summary, time_s))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.trajectory.sample_count.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TrajectoryIter {}

impl IntoIterator for Trajectory {
    type Item = TrajectorySample;
    type IntoIter = TrajectoryIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &Trajectory {
    type Item = TrajectorySample;
    type IntoIter = TrajectoryIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}


#[cfg(test)]
mod proptests {
    use super::compute_summary;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn upward_launches_have_positive_statistics(
            speed in 0.1f64..2_000.0,
            angle in 0.01f64..89.99,
        ) {
            let summary = compute_summary(speed, angle);
            prop_assert!(summary.time_of_flight_s > 0.0);
            prop_assert!(summary.max_height_m > 0.0);
            prop_assert!(summary.max_range_m > 0.0);
        }

        #[test]
        fn complementary_angles_share_range(
            speed in 0.1f64..2_000.0,
            angle in 0.01f64..89.99,
        ) {
            let a = compute_summary(speed, angle).max_range_m;
            let b = compute_summary(speed, 90.0 - angle).max_range_m;
            prop_assert!((a - b).abs() <= 1e-9 * a.abs().max(1.0));
        }
    }
}
