//! Linear scans over the in-memory record list.
//!
//! Max/min selection keeps the first record in insertion order on ties.

use crate::core::ballistics::ProjectileSummary;
use crate::core::error::{AnalyzerError, Result};

pub const MIN_RECORDS_TO_COMPARE: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AverageStats {
    pub max_height_m: f64,
    pub max_range_m: f64,
    pub time_of_flight_s: f64,
}

/// One line of a side-by-side comparison; `label` is 1-based.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComparisonRow {
    pub label: usize,
    pub record: ProjectileSummary,
}

fn select_by<F>(
    records: &[ProjectileSummary],
    key: F,
    prefer_larger: bool,
) -> Result<(usize, ProjectileSummary)>
where
    F: Fn(&ProjectileSummary) -> f64,
{
    let (first, rest) = records.split_first().ok_or(AnalyzerError::EmptyInput)?;
    let mut best = (0, *first);
    for (offset, record) in rest.iter().enumerate() {
        let candidate = key(record);
        let current = key(&best.1);
        let better = if prefer_larger {
            candidate > current
        } else {
            candidate < current
        };
        if better {
            best = (offset + 1, *record);
        }
    }
    Ok(best)
}

pub fn max_by_range(records: &[ProjectileSummary]) -> Result<(usize, ProjectileSummary)> {
    select_by(records, |r| r.max_range_m, true)
}

pub fn max_by_height(records: &[ProjectileSummary]) -> Result<(usize, ProjectileSummary)> {
    select_by(records, |r| r.max_height_m, true)
}

pub fn min_by_range(records: &[ProjectileSummary]) -> Result<(usize, ProjectileSummary)> {
    select_by(records, |r| r.max_range_m, false)
}

pub fn min_by_height(records: &[ProjectileSummary]) -> Result<(usize, ProjectileSummary)> {
    select_by(records, |r| r.max_height_m, false)
}

/// Records with a flight time strictly above `limit_s`, in insertion order.
pub fn filter_by_flight_time_above(
    records: &[ProjectileSummary],
    limit_s: f64,
) -> Vec<ProjectileSummary> {
    records
        .iter()
        .filter(|r| r.time_of_flight_s > limit_s)
        .copied()
        .collect()
}

pub fn average_stats(records: &[ProjectileSummary]) -> Result<AverageStats> {
    if records.is_empty() {
        return Err(AnalyzerError::EmptyInput);
    }

    let count = records.len() as f64;
    let (height_sum, range_sum, flight_sum) =
        records.iter().fold((0.0, 0.0, 0.0), |(h, r, t), record| {
            (
                h + record.max_height_m,
                r + record.max_range_m,
                t + record.time_of_flight_s,
            )
        });

    Ok(AverageStats {
        max_height_m: height_sum / count,
        max_range_m: range_sum / count,
        time_of_flight_s: flight_sum / count,
    })
}

pub fn by_index(records: &[ProjectileSummary], index: usize) -> Result<&ProjectileSummary> {
    records.get(index).ok_or(AnalyzerError::IndexOutOfRange {
        index,
        len: records.len(),
    })
}

pub fn compare(records: &[ProjectileSummary]) -> Result<Vec<ComparisonRow>> {
    if records.len() < MIN_RECORDS_TO_COMPARE {
        return Err(AnalyzerError::InsufficientRecords {
            required: MIN_RECORDS_TO_COMPARE,
            found: records.len(),
        });
    }

    Ok(records
        .iter()
        .enumerate()
        .map(|(idx, record)| ComparisonRow {
            label: idx + 1,
            record: *record,
        })
        .collect())
}


#[cfg(test)]
mod proptests {
    use super::filter_by_flight_time_above;
    use crate::core::ballistics::compute_summary;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn filter_is_ordered_partition(
            launches in prop::collection::vec((0.1f64..200.0, -10.0f64..100.0), 0..40),
            limit in -1.0f64..20.0,
        ) {
            let records: Vec<_> = launches
                .iter()
                .map(|&(speed, angle)| compute_summary(speed, angle))
                .collect();
            let kept = filter_by_flight_time_above(&records, limit);

            prop_assert!(kept.iter().all(|r| r.time_of_flight_s > limit));
            let mut cursor = records.iter();
            for record in &kept {
                prop_assert!(cursor.any(|candidate| candidate == record));
            }
            let excluded = records.iter().filter(|r| r.time_of_flight_s <= limit).count();
            prop_assert_eq!(kept.len() + excluded, records.len());
            prop_assert!(records
                .iter()
                .filter(|r| !kept.contains(r))
                .all(|r| r.time_of_flight_s <= limit));
        }
    }
}
