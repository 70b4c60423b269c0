use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no projectiles added, add projectiles first")]
    EmptyInput,
    #[error("need at least {required} projectiles, found {found}")]
    InsufficientRecords { required: usize, found: usize },
    #[error("index {index} is out of range (have {len} projectiles)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("corrupt record in {} at line {line}: {reason}", path.display())]
    StorageCorrupt {
        path: PathBuf,
        line: u64,
        reason: String,
    },
    #[error("failed to read {}", path.display())]
    StorageRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}", path.display())]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to export trajectory to {}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("plotting error: {0}")]
    Plot(String),
}

impl AnalyzerError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
