use rusqlite::{Connection, OptionalExtension};
use std::path::PathBuf;

use crate::models::{Budget, Expense, Note, Task, TimeBlock};
use crate::store::{Backend, Collection, StoreError};
use crate::utils::{format_date, format_datetime, parse_date, parse_datetime};

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create a new database connection and initialize the schema
    pub fn new(path: &str) -> Result<Self, StoreError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;

        let db = Database { conn };
        db.initialize_schema()?;

        Ok(db)
    }

    /// Throwaway database, used by tests
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let db = Database { conn: Connection::open_in_memory()? };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Initialize the database schema (tables and indexes)
    fn initialize_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                description     TEXT NOT NULL DEFAULT '',
                priority        TEXT NOT NULL DEFAULT 'Medium',
                status          TEXT NOT NULL DEFAULT 'To Do',
                due_date        TEXT
            );

            CREATE TABLE IF NOT EXISTS time_blocks (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                start_time      TEXT NOT NULL,
                end_time        TEXT NOT NULL,
                category        TEXT NOT NULL,
                color           TEXT NOT NULL,
                reminder        INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS notes (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                content         TEXT NOT NULL DEFAULT '',
                tags            TEXT NOT NULL DEFAULT '[]',
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS expenses (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                amount          REAL NOT NULL,
                category        TEXT NOT NULL,
                description     TEXT NOT NULL DEFAULT '',
                date            TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS budgets (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                category        TEXT NOT NULL UNIQUE,
                daily_limit     REAL NOT NULL DEFAULT 0,
                monthly_limit   REAL NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date);
            CREATE INDEX IF NOT EXISTS idx_time_blocks_start ON time_blocks(start_time);
            CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);
            CREATE INDEX IF NOT EXISTS idx_notes_updated_at ON notes(updated_at);",
        )?;

        Ok(())
    }

    /// Run a single-statement write inside a transaction and report whether a row changed
    fn write(&self, sql: &str, params: impl rusqlite::Params) -> Result<bool, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(sql, params)?;
        tx.commit()?;
        Ok(changed > 0)
    }
}

fn conversion_error<E>(index: usize, error: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(error))
}

/// Read a TEXT column and parse it with `FromStr`
fn get_parsed<T>(row: &rusqlite::Row, index: usize) -> Result<T, rusqlite::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(index)?;
    raw.parse::<T>().map_err(|e| conversion_error(index, e))
}

const TASK_COLUMNS: &str = "id, title, description, priority, status, due_date";

/// Helper function to map a row to a Task
fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
    let due_date: Option<String> = row.get(5)?;
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        priority: get_parsed(row, 3)?,
        status: get_parsed(row, 4)?,
        due_date: due_date
            .map(|raw| parse_date(&raw).map_err(|e| conversion_error(5, e)))
            .transpose()?,
    })
}

const TIME_BLOCK_COLUMNS: &str = "id, title, start_time, end_time, category, color, reminder";

fn row_to_time_block(row: &rusqlite::Row) -> Result<TimeBlock, rusqlite::Error> {
    let start: String = row.get(2)?;
    let end: String = row.get(3)?;
    Ok(TimeBlock {
        id: row.get(0)?,
        title: row.get(1)?,
        start_time: parse_datetime(&start).map_err(|e| conversion_error(2, e))?,
        end_time: parse_datetime(&end).map_err(|e| conversion_error(3, e))?,
        category: row.get(4)?,
        color: row.get(5)?,
        reminder: row.get::<_, i64>(6)? != 0,
    })
}

const NOTE_COLUMNS: &str = "id, title, content, tags, created_at, updated_at";

fn row_to_note(row: &rusqlite::Row) -> Result<Note, rusqlite::Error> {
    let tags: String = row.get(3)?;
    Ok(Note {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        tags: serde_json::from_str(&tags).map_err(|e| conversion_error(3, e))?,
        created_at: get_parsed(row, 4)?,
        updated_at: get_parsed(row, 5)?,
    })
}

const EXPENSE_COLUMNS: &str = "id, amount, category, description, date";

fn row_to_expense(row: &rusqlite::Row) -> Result<Expense, rusqlite::Error> {
    let date: String = row.get(4)?;
    Ok(Expense {
        id: row.get(0)?,
        amount: row.get(1)?,
        category: row.get(2)?,
        description: row.get(3)?,
        date: parse_date(&date).map_err(|e| conversion_error(4, e))?,
    })
}

const BUDGET_COLUMNS: &str = "id, category, daily_limit, monthly_limit";

fn row_to_budget(row: &rusqlite::Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        category: row.get(1)?,
        daily_limit: row.get(2)?,
        monthly_limit: row.get(3)?,
    })
}

fn encode_tags(note: &Note) -> String {
    serde_json::to_string(&note.tags).unwrap_or_else(|_| "[]".to_string())
}

/// Shared list/get implementation for every table
macro_rules! select_impl {
    ($table:literal, $columns:expr, $mapper:ident, $ty:ty) => {
        fn list(&self) -> Result<Vec<$ty>, StoreError> {
            let sql = format!("SELECT {} FROM {} ORDER BY id ASC", $columns, $table);
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map([], $mapper)?.collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        }

        fn get(&self, id: i64) -> Result<Option<$ty>, StoreError> {
            let sql = format!("SELECT {} FROM {} WHERE id = ?1", $columns, $table);
            let mut stmt = self.conn.prepare(&sql)?;
            Ok(stmt.query_row(rusqlite::params![id], $mapper).optional()?)
        }

        fn remove(&mut self, id: i64) -> Result<bool, StoreError> {
            let sql = format!("DELETE FROM {} WHERE id = ?1", $table);
            self.write(&sql, rusqlite::params![id])
        }
    };
}

impl Collection<Task> for Database {
    select_impl!("tasks", TASK_COLUMNS, row_to_task, Task);

    fn insert(&mut self, mut task: Task) -> Result<Task, StoreError> {
        self.conn.execute(
            "INSERT INTO tasks (title, description, priority, status, due_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                task.title,
                task.description,
                task.priority.as_str(),
                task.status.as_str(),
                task.due_date.map(format_date),
            ],
        )?;
        task.id = self.conn.last_insert_rowid();
        Ok(task)
    }

    fn replace(&mut self, task: &Task) -> Result<bool, StoreError> {
        self.write(
            "UPDATE tasks SET title = ?1, description = ?2, priority = ?3, status = ?4, due_date = ?5
             WHERE id = ?6",
            rusqlite::params![
                task.title,
                task.description,
                task.priority.as_str(),
                task.status.as_str(),
                task.due_date.map(format_date),
                task.id
            ],
        )
    }
}

impl Collection<TimeBlock> for Database {
    select_impl!("time_blocks", TIME_BLOCK_COLUMNS, row_to_time_block, TimeBlock);

    fn insert(&mut self, mut block: TimeBlock) -> Result<TimeBlock, StoreError> {
        self.conn.execute(
            "INSERT INTO time_blocks (title, start_time, end_time, category, color, reminder)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                block.title,
                format_datetime(block.start_time),
                format_datetime(block.end_time),
                block.category,
                block.color,
                if block.reminder { 1 } else { 0 },
            ],
        )?;
        block.id = self.conn.last_insert_rowid();
        Ok(block)
    }

    fn replace(&mut self, block: &TimeBlock) -> Result<bool, StoreError> {
        self.write(
            "UPDATE time_blocks SET title = ?1, start_time = ?2, end_time = ?3, category = ?4,
             color = ?5, reminder = ?6 WHERE id = ?7",
            rusqlite::params![
                block.title,
                format_datetime(block.start_time),
                format_datetime(block.end_time),
                block.category,
                block.color,
                if block.reminder { 1 } else { 0 },
                block.id
            ],
        )
    }
}

impl Collection<Note> for Database {
    select_impl!("notes", NOTE_COLUMNS, row_to_note, Note);

    fn insert(&mut self, mut note: Note) -> Result<Note, StoreError> {
        self.conn.execute(
            "INSERT INTO notes (title, content, tags, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                note.title,
                note.content,
                encode_tags(&note),
                note.created_at.to_rfc3339(),
                note.updated_at.to_rfc3339(),
            ],
        )?;
        note.id = self.conn.last_insert_rowid();
        Ok(note)
    }

    fn replace(&mut self, note: &Note) -> Result<bool, StoreError> {
        self.write(
            "UPDATE notes SET title = ?1, content = ?2, tags = ?3, created_at = ?4, updated_at = ?5
             WHERE id = ?6",
            rusqlite::params![
                note.title,
                note.content,
                encode_tags(note),
                note.created_at.to_rfc3339(),
                note.updated_at.to_rfc3339(),
                note.id
            ],
        )
    }
}

impl Collection<Expense> for Database {
    select_impl!("expenses", EXPENSE_COLUMNS, row_to_expense, Expense);

    fn insert(&mut self, mut expense: Expense) -> Result<Expense, StoreError> {
        self.conn.execute(
            "INSERT INTO expenses (amount, category, description, date) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                expense.amount,
                expense.category,
                expense.description,
                format_date(expense.date),
            ],
        )?;
        expense.id = self.conn.last_insert_rowid();
        Ok(expense)
    }

    fn replace(&mut self, expense: &Expense) -> Result<bool, StoreError> {
        self.write(
            "UPDATE expenses SET amount = ?1, category = ?2, description = ?3, date = ?4 WHERE id = ?5",
            rusqlite::params![
                expense.amount,
                expense.category,
                expense.description,
                format_date(expense.date),
                expense.id
            ],
        )
    }
}

impl Collection<Budget> for Database {
    select_impl!("budgets", BUDGET_COLUMNS, row_to_budget, Budget);

    fn insert(&mut self, mut budget: Budget) -> Result<Budget, StoreError> {
        self.conn.execute(
            "INSERT INTO budgets (category, daily_limit, monthly_limit) VALUES (?1, ?2, ?3)",
            rusqlite::params![budget.category, budget.daily_limit, budget.monthly_limit],
        )?;
        budget.id = self.conn.last_insert_rowid();
        Ok(budget)
    }

    fn replace(&mut self, budget: &Budget) -> Result<bool, StoreError> {
        self.write(
            "UPDATE budgets SET category = ?1, daily_limit = ?2, monthly_limit = ?3 WHERE id = ?4",
            rusqlite::params![budget.category, budget.daily_limit, budget.monthly_limit, budget.id],
        )
    }
}

impl Backend for Database {
    fn name(&self) -> &'static str {
        "sqlite"
    }
}
