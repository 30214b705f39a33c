use crate::schedule::ScheduleDocument;
use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("schedule file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("invalid JSON in schedule file {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Backing storage for the schedule document.
///
/// There is no empty default: once a schedule is expected, a missing or
/// unreadable document is an error for the caller to treat as fatal.
pub trait ScheduleStore {
    fn save_schedule(&self, schedule: &ScheduleDocument) -> PersistenceResult<()>;
    fn load_schedule(&self) -> PersistenceResult<ScheduleDocument>;
}

pub mod file;

pub use file::{JsonScheduleStore, load_schedule_from_json, save_schedule_to_json};
