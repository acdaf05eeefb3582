//! Per-entity services. Each one owns the rules for its collection (defaults,
//! validation, uniqueness) and forwards storage to whatever [`Collection`]
//! the backend provides.
//!
//! ```ignore
//! let mut backend = store::open_backend(&config)?;
//! let task = TaskService::new(backend.as_mut()).create(TaskDraft { title: "Ship".into(), ..Default::default() })?;
//! ```

pub mod budgets;
pub mod expenses;
pub mod notes;
pub mod tasks;
pub mod time_blocks;

use std::marker::PhantomData;

use thiserror::Error;

use crate::models::{Budget, EntityKind, Expense, Note, Record, Task, TimeBlock};
use crate::store::{Collection, StoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("No {kind} with id {id}")]
    NotFound { kind: EntityKind, id: i64 },
    #[error("Invalid {kind} id: '{raw}'")]
    InvalidId { kind: EntityKind, raw: String },
    #[error("A budget for '{0}' already exists")]
    DuplicateCategory(String),
    #[error("{0}")]
    Invalid(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Anything a caller may hand over as a record id.
/// Text must be a positive integer after trimming.
pub trait IntoRecordId {
    fn into_record_id(self, kind: EntityKind) -> Result<i64, ServiceError>;
}

impl IntoRecordId for i64 {
    fn into_record_id(self, kind: EntityKind) -> Result<i64, ServiceError> {
        if self > 0 {
            Ok(self)
        } else {
            Err(ServiceError::InvalidId { kind, raw: self.to_string() })
        }
    }
}

impl IntoRecordId for &str {
    fn into_record_id(self, kind: EntityKind) -> Result<i64, ServiceError> {
        match self.trim().parse::<i64>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(ServiceError::InvalidId { kind, raw: self.to_string() }),
        }
    }
}

impl IntoRecordId for &String {
    fn into_record_id(self, kind: EntityKind) -> Result<i64, ServiceError> {
        self.as_str().into_record_id(kind)
    }
}

/// CRUD over one collection. Entity-specific create/update live in the
/// submodules as extra `impl` blocks.
pub struct Service<'a, R, B: ?Sized> {
    backend: &'a mut B,
    _record: PhantomData<R>,
}

pub type TaskService<'a, B> = Service<'a, Task, B>;
pub type TimeBlockService<'a, B> = Service<'a, TimeBlock, B>;
pub type NoteService<'a, B> = Service<'a, Note, B>;
pub type ExpenseService<'a, B> = Service<'a, Expense, B>;
pub type BudgetService<'a, B> = Service<'a, Budget, B>;

impl<'a, R, B> Service<'a, R, B>
where
    R: Record,
    B: Collection<R> + ?Sized,
{
    pub fn new(backend: &'a mut B) -> Self {
        Self { backend, _record: PhantomData }
    }

    pub fn get_all(&self) -> Result<Vec<R>, ServiceError> {
        let records = self.backend.list()?;
        tracing::debug!(kind = %R::KIND, count = records.len(), "listed records");
        Ok(records)
    }

    pub fn get_by_id(&self, id: impl IntoRecordId) -> Result<R, ServiceError> {
        let id = id.into_record_id(R::KIND)?;
        self.backend
            .get(id)?
            .ok_or(ServiceError::NotFound { kind: R::KIND, id })
    }

    /// Removes the record. A missing id is reported as `NotFound`, so a
    /// successful call always returns `true`.
    pub fn delete(&mut self, id: impl IntoRecordId) -> Result<bool, ServiceError> {
        let id = id.into_record_id(R::KIND)?;
        if !self.backend.remove(id)? {
            return Err(ServiceError::NotFound { kind: R::KIND, id });
        }
        tracing::info!(kind = %R::KIND, id, "deleted record");
        Ok(true)
    }

    fn insert(&mut self, record: R) -> Result<R, ServiceError> {
        let created = self.backend.insert(record)?;
        tracing::info!(kind = %R::KIND, id = created.id(), "created record");
        Ok(created)
    }

    /// Load, let `change` edit the record, then write it back
    fn modify<F>(&mut self, id: impl IntoRecordId, change: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut R) -> Result<(), ServiceError>,
    {
        let mut record = self.get_by_id(id)?;
        change(&mut record)?;
        self.write_back(record)
    }

    fn write_back(&mut self, record: R) -> Result<R, ServiceError> {
        if !self.backend.replace(&record)? {
            return Err(ServiceError::NotFound { kind: R::KIND, id: record.id() });
        }
        tracing::info!(kind = %R::KIND, id = record.id(), "updated record");
        Ok(record)
    }
}

fn require_title(kind: EntityKind, title: &str) -> Result<String, ServiceError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ServiceError::Invalid(format!("A {} needs a title", kind)));
    }
    Ok(title.to_string())
}

fn require_non_negative(field: &str, value: f64) -> Result<f64, ServiceError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ServiceError::Invalid(format!("{} must be a non-negative number, got {}", field, value)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;

    #[test]
    fn text_ids_must_be_positive_integers() {
        assert_eq!(" 12 ".into_record_id(EntityKind::Task).unwrap(), 12);
        for raw in ["", "abc", "0", "-3", "1.5"] {
            assert!(matches!(
                raw.into_record_id(EntityKind::Task),
                Err(ServiceError::InvalidId { .. })
            ));
        }
        assert!(0i64.into_record_id(EntityKind::Note).is_err());
    }

    #[test]
    fn missing_records_are_not_found() {
        let mut backend = MemoryBackend::new();
        let mut service = TaskService::new(&mut backend);
        assert!(matches!(
            service.get_by_id(5_i64),
            Err(ServiceError::NotFound { kind: EntityKind::Task, id: 5 })
        ));
        assert!(matches!(service.delete("5"), Err(ServiceError::NotFound { .. })));
    }

    #[test]
    fn works_through_a_boxed_backend() {
        let mut backend: Box<dyn crate::store::Backend> = Box::new(MemoryBackend::new());
        let service = NoteService::new(backend.as_mut());
        assert!(service.get_all().unwrap().is_empty());
    }
}
