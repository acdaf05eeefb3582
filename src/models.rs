use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Categories offered by forms and listed on the budget page
pub const DEFAULT_CATEGORIES: &[&str] = &["Work", "Personal", "Health", "Learning", "Leisure", "Finance"];

/// Default time block color for a category. Unknown categories get Work's color.
pub fn default_category_color(category: &str) -> &'static str {
    match category {
        "Personal" => "#4ECDC4",
        "Health" => "#FF6B6B",
        "Learning" => "#FFD93D",
        "Leisure" => "#4DA6FF",
        _ => "#5B4CDB",
    }
}

/// The five record collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Task,
    TimeBlock,
    Note,
    Expense,
    Budget,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Task => "task",
            EntityKind::TimeBlock => "time block",
            EntityKind::Note => "note",
            EntityKind::Expense => "expense",
            EntityKind::Budget => "budget",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "task" | "tasks" => Ok(EntityKind::Task),
            "block" | "blocks" | "timeblock" | "time-block" | "time block" => Ok(EntityKind::TimeBlock),
            "note" | "notes" => Ok(EntityKind::Note),
            "expense" | "expenses" => Ok(EntityKind::Expense),
            "budget" | "budgets" => Ok(EntityKind::Budget),
            _ => Err(ParseEnumError { kind: "record kind", value: s.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// A record owned by one of the collections, identified by a positive integer
pub trait Record: Clone + fmt::Debug {
    const KIND: EntityKind;

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "med" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(ParseEnumError { kind: "priority", value: s.to_string() }),
        }
    }
}

/// Task status. Each value is also a kanban column id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do")]
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

impl TaskStatus {
    /// Board order, left to right
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    pub fn column_index(&self) -> usize {
        match self {
            TaskStatus::Todo => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Done => 2,
        }
    }

    pub fn from_column_index(index: usize) -> Option<TaskStatus> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        match normalized.as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "inprogress" | "doing" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            _ => Err(ParseEnumError { kind: "task status", value: s.to_string() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>, // YYYY-MM-DD
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBlock {
    pub id: i64,
    pub title: String,
    pub start_time: NaiveDateTime, // local wall clock
    pub end_time: NaiveDateTime,
    pub category: String,
    pub color: String,
    pub reminder: bool,
}

impl TimeBlock {
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Closed interval check: both endpoints count as inside
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start_time <= instant && instant <= self.end_time
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub category: String,
    pub daily_limit: f64,
    pub monthly_limit: f64,
}

macro_rules! impl_record {
    ($ty:ty, $kind:expr) => {
        impl Record for $ty {
            const KIND: EntityKind = $kind;

            fn id(&self) -> i64 {
                self.id
            }

            fn set_id(&mut self, id: i64) {
                self.id = id;
            }
        }
    };
}

impl_record!(Task, EntityKind::Task);
impl_record!(TimeBlock, EntityKind::TimeBlock);
impl_record!(Note, EntityKind::Note);
impl_record!(Expense, EntityKind::Expense);
impl_record!(Budget, EntityKind::Budget);

// Creation inputs. Optional fields fall back to the service defaults.

#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct TimeBlockDraft {
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub category: String,
    pub color: Option<String>,
    pub reminder: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub tags: BTreeSet<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct ExpenseDraft {
    pub amount: f64,
    pub category: Option<String>,
    pub description: String,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct BudgetDraft {
    pub category: String,
    pub daily_limit: f64,
    pub monthly_limit: f64,
}

// Partial updates: `None` leaves the stored value untouched.

#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimeBlockPatch {
    pub title: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub reminder: Option<bool>,
}

impl TimeBlockPatch {
    pub fn apply(self, block: &mut TimeBlock) {
        if let Some(title) = self.title {
            block.title = title;
        }
        if let Some(start_time) = self.start_time {
            block.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            block.end_time = end_time;
        }
        if let Some(category) = self.category {
            block.category = category;
        }
        if let Some(color) = self.color {
            block.color = color;
        }
        if let Some(reminder) = self.reminder {
            block.reminder = reminder;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<BTreeSet<String>>,
}

impl NotePatch {
    /// Applies the changed fields. `updated_at` is stamped by the caller.
    pub fn apply(self, note: &mut Note) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(content) = self.content {
            note.content = content;
        }
        if let Some(tags) = self.tags {
            note.tags = tags;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

impl ExpensePatch {
    pub fn apply(self, expense: &mut Expense) {
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(category) = self.category {
            expense.category = category;
        }
        if let Some(description) = self.description {
            expense.description = description;
        }
        if let Some(date) = self.date {
            expense.date = date;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BudgetPatch {
    pub category: Option<String>,
    pub daily_limit: Option<f64>,
    pub monthly_limit: Option<f64>,
}

impl BudgetPatch {
    pub fn apply(self, budget: &mut Budget) {
        if let Some(category) = self.category {
            budget.category = category;
        }
        if let Some(daily_limit) = self.daily_limit {
            budget.daily_limit = daily_limit;
        }
        if let Some(monthly_limit) = self.monthly_limit {
            budget.monthly_limit = monthly_limit;
        }
    }
}

/// Split a comma-separated tag string into a tag set, dropping blanks
pub fn parse_tags(input: &str) -> BTreeSet<String> {
    input
        .split(',')
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn format_tags(tags: &BTreeSet<String>) -> String {
    tags.iter().cloned().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_loose_spellings() {
        assert_eq!("To Do".parse::<TaskStatus>().unwrap(), TaskStatus::Todo);
        assert_eq!("todo".parse::<TaskStatus>().unwrap(), TaskStatus::Todo);
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("DONE".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert!("later".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn status_serializes_as_column_id() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
    }

    #[test]
    fn column_index_round_trips_through_board_order() {
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::from_column_index(status.column_index()), Some(status));
        }
        assert_eq!(TaskStatus::from_column_index(3), None);
    }

    #[test]
    fn unknown_category_uses_work_color() {
        assert_eq!(default_category_color("Health"), "#FF6B6B");
        assert_eq!(default_category_color("Gardening"), default_category_color("Work"));
    }

    #[test]
    fn tags_are_trimmed_and_deduplicated() {
        let tags = parse_tags(" rust, ideas ,, rust");
        assert_eq!(tags.len(), 2);
        assert_eq!(format_tags(&tags), "ideas, rust");
    }

    #[test]
    fn task_patch_only_touches_given_fields() {
        let mut task = Task {
            id: 4,
            title: "Write report".to_string(),
            description: "Q3 numbers".to_string(),
            priority: Priority::High,
            status: TaskStatus::Todo,
            due_date: NaiveDate::from_ymd_opt(2024, 5, 1),
        };
        let before = task.clone();
        TaskPatch::status(TaskStatus::Done).apply(&mut task);
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(Task { status: TaskStatus::Todo, ..task }, before);
    }
}
