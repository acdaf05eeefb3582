use crate::models::{Budget, Expense, Note, Record, Task, TimeBlock};
use crate::store::{Backend, Collection, StoreError};

/// Ordered rows plus the next id to hand out.
/// Ids are never reused, even after the highest one is deleted.
#[derive(Debug, Clone)]
struct Table<R> {
    rows: Vec<R>,
    next_id: i64,
}

impl<R: Record> Table<R> {
    fn from_rows(rows: Vec<R>) -> Self {
        let next_id = rows.iter().map(Record::id).max().unwrap_or(0) + 1;
        Self { rows, next_id }
    }

    fn position(&self, id: i64) -> Option<usize> {
        self.rows.iter().position(|row| row.id() == id)
    }

    fn list(&self) -> Vec<R> {
        self.rows.clone()
    }

    fn get(&self, id: i64) -> Option<R> {
        self.position(id).map(|index| self.rows[index].clone())
    }

    fn insert(&mut self, mut record: R) -> R {
        record.set_id(self.next_id);
        self.next_id += 1;
        self.rows.push(record.clone());
        record
    }

    fn replace(&mut self, record: &R) -> bool {
        match self.position(record.id()) {
            Some(index) => {
                self.rows[index] = record.clone();
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: i64) -> bool {
        match self.position(id) {
            Some(index) => {
                self.rows.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Process-local backend. Nothing survives a restart.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    tasks: Table<Task>,
    time_blocks: Table<TimeBlock>,
    notes: Table<Note>,
    expenses: Table<Expense>,
    budgets: Table<Budget>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_records(Vec::new(), Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }

    /// Start from existing rows; their ids are kept as-is
    pub fn with_records(
        tasks: Vec<Task>,
        time_blocks: Vec<TimeBlock>,
        notes: Vec<Note>,
        expenses: Vec<Expense>,
        budgets: Vec<Budget>,
    ) -> Self {
        Self {
            tasks: Table::from_rows(tasks),
            time_blocks: Table::from_rows(time_blocks),
            notes: Table::from_rows(notes),
            expenses: Table::from_rows(expenses),
            budgets: Table::from_rows(budgets),
        }
    }
}

macro_rules! memory_collection {
    ($ty:ty, $field:ident) => {
        impl Collection<$ty> for MemoryBackend {
            fn list(&self) -> Result<Vec<$ty>, StoreError> {
                Ok(self.$field.list())
            }

            fn get(&self, id: i64) -> Result<Option<$ty>, StoreError> {
                Ok(self.$field.get(id))
            }

            fn insert(&mut self, record: $ty) -> Result<$ty, StoreError> {
                Ok(self.$field.insert(record))
            }

            fn replace(&mut self, record: &$ty) -> Result<bool, StoreError> {
                Ok(self.$field.replace(record))
            }

            fn remove(&mut self, id: i64) -> Result<bool, StoreError> {
                Ok(self.$field.remove(id))
            }
        }
    };
}

memory_collection!(Task, tasks);
memory_collection!(TimeBlock, time_blocks);
memory_collection!(Note, notes);
memory_collection!(Expense, expenses);
memory_collection!(Budget, budgets);

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(title: &str) -> Task {
        Task {
            title: title.to_string(),
            ..Task::default()
        }
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let mut backend = MemoryBackend::new();
        let first = Collection::<Task>::insert(&mut backend, task("a")).unwrap();
        let second = Collection::<Task>::insert(&mut backend, task("b")).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[test]
    fn ids_continue_after_seeded_rows_and_are_not_reused() {
        let seeded = Task { id: 7, ..task("seed") };
        let mut backend = MemoryBackend::with_records(vec![seeded], vec![], vec![], vec![], vec![]);

        let created = Collection::<Task>::insert(&mut backend, task("new")).unwrap();
        assert_eq!(created.id, 8);

        assert!(Collection::<Task>::remove(&mut backend, 8).unwrap());
        let again = Collection::<Task>::insert(&mut backend, task("again")).unwrap();
        assert_eq!(again.id, 9);
    }

    #[test]
    fn replace_and_remove_report_missing_rows() {
        let mut backend = MemoryBackend::new();
        let ghost = Task { id: 42, ..task("ghost") };
        assert!(!Collection::<Task>::replace(&mut backend, &ghost).unwrap());
        assert!(!Collection::<Task>::remove(&mut backend, 42).unwrap());
    }

    #[test]
    fn list_preserves_insertion_order() {
        let mut backend = MemoryBackend::new();
        for title in ["one", "two", "three"] {
            Collection::<Task>::insert(&mut backend, task(title)).unwrap();
        }
        let titles: Vec<String> = Collection::<Task>::list(&backend)
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["one", "two", "three"]);
    }
}
