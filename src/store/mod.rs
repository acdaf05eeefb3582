//! Storage capability shared by every record collection.
//!
//! Services never talk to SQLite or the in-memory lists directly; they go
//! through [`Collection`], and the application holds a `Box<dyn Backend>`
//! picked from the configuration at startup.

pub mod memory;
pub mod seed;
pub mod sqlite;

use thiserror::Error;

use crate::config::{BackendKind, Config};
use crate::models::{Budget, Expense, Note, Record, Task, TimeBlock};

pub use memory::MemoryBackend;
pub use sqlite::Database;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
    #[error("Database path contains invalid UTF-8")]
    InvalidPath,
}

/// One record collection inside a backend
pub trait Collection<R: Record> {
    /// All records, in insertion order
    fn list(&self) -> Result<Vec<R>, StoreError>;

    fn get(&self, id: i64) -> Result<Option<R>, StoreError>;

    /// Store a new record under a freshly assigned id and return it.
    /// Whatever id the record carried is ignored.
    fn insert(&mut self, record: R) -> Result<R, StoreError>;

    /// Overwrite the stored record with the same id.
    /// Returns false when no such record exists.
    fn replace(&mut self, record: &R) -> Result<bool, StoreError>;

    /// Returns false when no such record exists
    fn remove(&mut self, id: i64) -> Result<bool, StoreError>;
}

/// Every collection the dashboard needs, behind one object
pub trait Backend:
    Collection<Task> + Collection<TimeBlock> + Collection<Note> + Collection<Expense> + Collection<Budget>
{
    /// Short name for logs and the settings line in the status bar
    fn name(&self) -> &'static str;
}

/// Open the backend selected in the configuration
pub fn open_backend(config: &Config) -> Result<Box<dyn Backend>, StoreError> {
    match config.backend {
        BackendKind::Sqlite => {
            let path = config.get_database_path();
            let path = path.to_str().ok_or(StoreError::InvalidPath)?;
            tracing::info!(path, "opening sqlite backend");
            Ok(Box::new(Database::new(path)?))
        }
        BackendKind::Memory => {
            tracing::info!(seeded = config.seed_demo_data, "opening in-memory backend");
            if config.seed_demo_data {
                Ok(Box::new(seed::demo_backend(chrono::Local::now().naive_local())))
            } else {
                Ok(Box::new(MemoryBackend::new()))
            }
        }
    }
}
