//! Append-only CSV persistence for projectile summaries.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim, WriterBuilder};
use tracing::{debug, info, warn};

use crate::core::ballistics::ProjectileSummary;
use crate::core::error::{AnalyzerError, Result};

pub const DEFAULT_DATA_FILE: &str = "projectiles_data.csv";

/// What to do with a row that does not parse into five finite numbers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    #[default]
    Strict,
    SkipCorrupt,
}

/// In-memory record list mirrored by an append-only file.
///
/// Memory and disk change together: `append` only extends the list after the
/// rows have been written.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    policy: LoadPolicy,
    records: Vec<ProjectileSummary>,
}

impl RecordStore {
    pub fn open(path: impl Into<PathBuf>, policy: LoadPolicy) -> Result<Self> {
        let mut store = Self {
            path: path.into(),
            policy,
            records: Vec::new(),
        };
        store.load()?;
        Ok(store)
    }

    /// Re-reads the whole file, replacing the in-memory list.
    pub fn load(&mut self) -> Result<&[ProjectileSummary]> {
        self.records = read_records(&self.path, self.policy)?;
        info!(
            path = %self.path.display(),
            count = self.records.len(),
            "loaded projectile records"
        );
        Ok(&self.records)
    }

    pub fn append(&mut self, records: &[ProjectileSummary]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        // Anything load() would reject must never reach the file.
        for record in records {
            check_finite(record).map_err(|reason| {
                AnalyzerError::invalid(format!("refusing to save projectile: {reason}"))
            })?;
        }

        append_records(&self.path, records).map_err(|source| AnalyzerError::StorageWrite {
            path: self.path.clone(),
            source,
        })?;
        self.records.extend_from_slice(records);
        info!(
            path = %self.path.display(),
            added = records.len(),
            total = self.records.len(),
            "appended projectile records"
        );
        Ok(())
    }

    pub fn records(&self) -> &[ProjectileSummary] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn read_records(path: &Path, policy: LoadPolicy) -> Result<Vec<ProjectileSummary>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no record file yet, starting empty");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(AnalyzerError::StorageRead {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(BufReader::new(file));
    let headers = reader
        .headers()
        .map_err(|err| read_error(path, err))?
        .clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let parsed = match row {
            Ok(row) => {
                let line = row.position().map(|pos| pos.line()).unwrap_or(0);
                row.deserialize::<ProjectileSummary>(Some(&headers))
                    .map_err(|err| err.to_string())
                    .and_then(|record| check_finite(&record).map(|()| record))
                    .map_err(|reason| (line, reason))
            }
            Err(err) if matches!(err.kind(), csv::ErrorKind::Io(_)) => {
                return Err(read_error(path, err));
            }
            Err(err) => {
                let line = err.position().map(|pos| pos.line()).unwrap_or(0);
                Err((line, err.to_string()))
            }
        };

        match parsed {
            Ok(record) => records.push(record),
            Err((line, reason)) => match policy {
                LoadPolicy::Strict => {
                    return Err(AnalyzerError::StorageCorrupt {
                        path: path.to_path_buf(),
                        line,
                        reason,
                    });
                }
                LoadPolicy::SkipCorrupt => {
                    warn!(path = %path.display(), line, %reason, "skipping corrupt record");
                }
            },
        }
    }

    Ok(records)
}

fn read_error(path: &Path, err: csv::Error) -> AnalyzerError {
    AnalyzerError::StorageRead {
        path: path.to_path_buf(),
        source: io::Error::from(err),
    }
}

fn check_finite(record: &ProjectileSummary) -> std::result::Result<(), String> {
    let fields = [
        ("Speed", record.speed_mps),
        ("Angle", record.angle_deg),
        ("Time of Flight", record.time_of_flight_s),
        ("Max Height", record.max_height_m),
        ("Max Range", record.max_range_m),
    ];
    match fields.iter().find(|(_, value)| !value.is_finite()) {
        Some((name, value)) => Err(format!("field '{name}' is not a finite number ({value})")),
        None => Ok(()),
    }
}

fn append_records(path: &Path, records: &[ProjectileSummary]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)?;

    let existing_len = file.metadata()?.len();
    let mut rows = Vec::new();
    if existing_len > 0 && !ends_with_newline(&mut file)? {
        rows.push(b'\n');
    }
    rows.extend(encode_rows(records, existing_len == 0)?);

    file.write_all(&rows)?;
    file.flush()
}

fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn encode_rows(records: &[ProjectileSummary], with_header: bool) -> io::Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .has_headers(with_header)
        .from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    writer.into_inner().map_err(|err| err.into_error())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{LoadPolicy, RecordStore, read_records};
    use crate::core::ballistics::{ProjectileSummary, compute_summary};
    use crate::core::error::AnalyzerError;

    static NEXT_FILE: AtomicUsize = AtomicUsize::new(0);

    fn scratch_path(name: &str) -> PathBuf {
        let id = NEXT_FILE.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "projectile_store_{}_{id}_{name}.csv",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn missing_file_loads_empty() {
        let path = scratch_path("missing");
        let store = RecordStore::open(&path, LoadPolicy::Strict).expect("open should succeed");

        assert!(store.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn appended_record_round_trips() {
        let path = scratch_path("round_trip");
        let record = compute_summary(23.7, 38.25);

        let mut store = RecordStore::open(&path, LoadPolicy::Strict).expect("open");
        store.append(&[record]).expect("append");

        let reloaded = RecordStore::open(&path, LoadPolicy::Strict).expect("reopen");
        assert_eq!(reloaded.records().last(), Some(&record));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn header_is_written_once_across_appends() {
        let path = scratch_path("header_once");
        let mut store = RecordStore::open(&path, LoadPolicy::Strict).expect("open");
        store.append(&[compute_summary(10.0, 30.0)]).expect("first append");
        store
            .append(&[compute_summary(20.0, 45.0), compute_summary(30.0, 60.0)])
            .expect("second append");

        let text = fs::read_to_string(&path).expect("read back");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Speed,Angle,Time of Flight,Max Height,Max Range");
        assert_eq!(lines.len(), 4);
        assert_eq!(text.matches("Speed").count(), 1);

        let mut reloaded = RecordStore::open(&path, LoadPolicy::Strict).expect("reopen");
        assert_eq!(reloaded.load().expect("load").len(), 3);
        assert_eq!(reloaded.records(), store.records());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn empty_append_is_noop() {
        let path = scratch_path("empty_append");
        let mut store = RecordStore::open(&path, LoadPolicy::Strict).expect("open");
        store.append(&[]).expect("empty append");

        assert!(!path.exists());
        assert!(store.is_empty());
    }

    #[test]
    fn strict_load_reports_corrupt_line() {
        let path = scratch_path("corrupt_strict");
        fs::write(
            &path,
            "Speed,Angle,Time of Flight,Max Height,Max Range\n\
             20,45,2.886,10.204,40.816\n\
             20,abc,2.886,10.204,40.816\n",
        )
        .expect("seed file");

        let err = RecordStore::open(&path, LoadPolicy::Strict).expect_err("should be corrupt");
        match err {
            AnalyzerError::StorageCorrupt { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other:?}"),
        }
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn short_row_is_corrupt() {
        let path = scratch_path("short_row");
        fs::write(
            &path,
            "Speed,Angle,Time of Flight,Max Height,Max Range\n20,45,2.886\n",
        )
        .expect("seed file");

        let err = read_records(&path, LoadPolicy::Strict).expect_err("should be corrupt");
        assert!(matches!(err, AnalyzerError::StorageCorrupt { line: 2, .. }));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn non_finite_values_are_corrupt() {
        let path = scratch_path("non_finite");
        fs::write(
            &path,
            "Speed,Angle,Time of Flight,Max Height,Max Range\n20,45,NaN,10.2,40.8\n",
        )
        .expect("seed file");

        let err = read_records(&path, LoadPolicy::Strict).expect_err("should be corrupt");
        match err {
            AnalyzerError::StorageCorrupt { line, reason, .. } => {
                assert_eq!(line, 2);
                assert!(reason.contains("Time of Flight"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn skip_policy_keeps_good_rows_in_order() {
        let path = scratch_path("corrupt_skip");
        fs::write(
            &path,
            "Speed,Angle,Time of Flight,Max Height,Max Range\n\
             10, 30, 1.0, 2.0, 3.0\n\
             oops,30,1.0,2.0,3.0\n\
             11,31,1.5,2.5,3.5\n",
        )
        .expect("seed file");

        let records = read_records(&path, LoadPolicy::SkipCorrupt).expect("lenient load");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].speed_mps, 10.0);
        assert_eq!(records[1].max_range_m, 3.5);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn append_repairs_missing_trailing_newline() {
        let path = scratch_path("no_newline");
        fs::write(
            &path,
            "Speed,Angle,Time of Flight,Max Height,Max Range\n10,30,1,2,3",
        )
        .expect("seed file");

        let mut store = RecordStore::open(&path, LoadPolicy::Strict).expect("open");
        store.append(&[compute_summary(12.0, 40.0)]).expect("append");

        let reloaded = read_records(&path, LoadPolicy::Strict).expect("reload");
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded[1].speed_mps, 12.0);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let path = std::env::temp_dir()
            .join(format!("projectile_store_missing_dir_{}", std::process::id()))
            .join("nested")
            .join("data.csv");
        let mut store = RecordStore::open(&path, LoadPolicy::Strict).expect("open");

        let err = store
            .append(&[compute_summary(10.0, 45.0)])
            .expect_err("directory does not exist");
        assert!(matches!(err, AnalyzerError::StorageWrite { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn non_finite_record_is_refused_before_writing() {
        let path = scratch_path("overflowed");
        let mut store = RecordStore::open(&path, LoadPolicy::Strict).expect("open");
        store.append(&[compute_summary(20.0, 45.0)]).expect("append");

        let overflowed = compute_summary(1e160, 45.0);
        assert!(overflowed.max_height_m.is_infinite());
        let err = store
            .append(&[compute_summary(30.0, 45.0), overflowed])
            .expect_err("infinite height is refused");
        assert!(matches!(err, AnalyzerError::InvalidInput(_)));
        assert_eq!(store.records().len(), 1);

        let reloaded = read_records(&path, LoadPolicy::Strict).expect("file still loads");
        assert_eq!(reloaded, vec![compute_summary(20.0, 45.0)]);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn reads_hand_written_integers() {
        let path = scratch_path("integers");
        fs::write(
            &path,
            "Speed,Angle,Time of Flight,Max Height,Max Range\n20,45,3,10,40\n",
        )
        .expect("seed file");

        let records = read_records(&path, LoadPolicy::Strict).expect("load");
        assert_eq!(
            records,
            vec![ProjectileSummary {
                speed_mps: 20.0,
                angle_deg: 45.0,
                time_of_flight_s: 3.0,
                max_height_m: 10.0,
                max_range_m: 40.0,
            }]
        );
        let _ = fs::remove_file(&path);
    }
}
