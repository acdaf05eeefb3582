use chrono::{Duration, NaiveDate};
use tempfile::TempDir;

use dayboard::models::{
    BudgetDraft, BudgetPatch, EntityKind, ExpenseDraft, NoteDraft, NotePatch, TaskDraft, TaskStatus, TimeBlockDraft,
    parse_tags,
};
use dayboard::services::{BudgetService, ExpenseService, NoteService, TaskService, TimeBlockService};
use dayboard::store::{Backend, Database, MemoryBackend};
use dayboard::views::budget::BudgetSummary;
use dayboard::ServiceError;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
}

fn sqlite_backend() -> (TempDir, Database) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data").join("dayboard.db");
    let db = Database::new(path.to_str().unwrap()).unwrap();
    (dir, db)
}

/// Runs the same scenario against both storage adapters
fn on_each_backend(scenario: impl Fn(&mut dyn Backend)) {
    let mut memory = MemoryBackend::new();
    scenario(&mut memory);
    let (_dir, mut sqlite) = sqlite_backend();
    scenario(&mut sqlite);
}

#[test]
fn task_round_trip_through_columns() {
    on_each_backend(|backend| {
        let mut tasks = TaskService::new(backend);
        let task = tasks
            .create(TaskDraft { title: "Write report".to_string(), due_date: Some(day(2)), ..TaskDraft::default() })
            .unwrap();
        assert_eq!(task.status, TaskStatus::Todo);

        tasks.move_to(task.id, TaskStatus::Done).unwrap();
        tasks.move_to(task.id, TaskStatus::Todo).unwrap();
        assert_eq!(tasks.get_by_id(task.id).unwrap(), task);
        assert!(tasks.move_to(task.id, TaskStatus::Todo).unwrap().is_none());
    });
}

#[test]
fn ids_are_validated_and_missing_records_reported() {
    on_each_backend(|backend| {
        let mut notes = NoteService::new(backend);
        assert!(matches!(notes.get_by_id("abc"), Err(ServiceError::InvalidId { kind: EntityKind::Note, .. })));
        assert!(matches!(notes.get_by_id(-4i64), Err(ServiceError::InvalidId { .. })));
        assert!(matches!(notes.delete(42i64), Err(ServiceError::NotFound { id: 42, .. })));
        assert!(matches!(
            notes.update("42", NotePatch::default()),
            Err(ServiceError::NotFound { .. })
        ));

        let note = notes.create(NoteDraft { title: "Ideas".to_string(), ..NoteDraft::default() }).unwrap();
        let raw = format!(" {} ", note.id);
        assert!(notes.delete(raw.as_str()).unwrap());
        assert!(notes.get_all().unwrap().is_empty());
    });
}

#[test]
fn note_tags_survive_storage() {
    on_each_backend(|backend| {
        let mut notes = NoteService::new(backend);
        let note = notes
            .create(NoteDraft {
                title: "Trip".to_string(),
                content: "- passport\n- tickets".to_string(),
                tags: parse_tags("travel, home"),
                ..NoteDraft::default()
            })
            .unwrap();
        let stored = notes.get_by_id(note.id).unwrap();
        assert_eq!(stored.tags, parse_tags("home,travel"));
        assert_eq!(stored.content, "- passport\n- tickets");
    });
}

#[test]
fn rescheduling_keeps_block_length() {
    on_each_backend(|backend| {
        let mut blocks = TimeBlockService::new(backend);
        let start = day(2).and_hms_opt(9, 15, 0).unwrap();
        let block = blocks
            .create(TimeBlockDraft {
                title: "Deep work".to_string(),
                start_time: start,
                end_time: start + Duration::minutes(135),
                category: "Work".to_string(),
                color: None,
                reminder: None,
            })
            .unwrap();
        assert_eq!(block.color, "#5B4CDB");

        let moved = blocks.reschedule(block.id, day(4), 14).unwrap();
        assert_eq!(moved.start_time, day(4).and_hms_opt(14, 0, 0).unwrap());
        assert_eq!(moved.duration(), Duration::minutes(135));
        assert_eq!(blocks.get_by_id(block.id).unwrap(), moved);

        assert!(matches!(blocks.reschedule(block.id, day(4), 24), Err(ServiceError::Invalid(_))));
    });
}

#[test]
fn both_backends_agree_on_sub_second_blocks() {
    on_each_backend(|backend| {
        let mut blocks = TimeBlockService::new(backend);
        let start = day(2).and_hms_milli_opt(9, 0, 0, 400).unwrap();
        let block = blocks
            .create(TimeBlockDraft {
                title: "Standup".to_string(),
                start_time: start,
                end_time: start + Duration::minutes(15) + Duration::milliseconds(300),
                category: "Work".to_string(),
                color: None,
                reminder: None,
            })
            .unwrap();
        let stored = blocks.get_by_id(block.id).unwrap();
        assert_eq!(stored, block);
        assert_eq!(stored.duration(), Duration::minutes(15));
    });
}

#[test]
fn budgets_stay_unique_per_category() {
    on_each_backend(|backend| {
        let mut budgets = BudgetService::new(backend);
        let work = budgets
            .create(BudgetDraft { category: "Work".to_string(), daily_limit: 20.0, monthly_limit: 400.0 })
            .unwrap();
        let personal = budgets
            .create(BudgetDraft { category: "Personal".to_string(), daily_limit: 15.0, monthly_limit: 300.0 })
            .unwrap();

        assert!(matches!(
            budgets.create(BudgetDraft { category: "Work".to_string(), ..BudgetDraft::default() }),
            Err(ServiceError::DuplicateCategory(_))
        ));
        assert!(matches!(
            budgets.update(personal.id, BudgetPatch { category: Some("Work".to_string()), ..BudgetPatch::default() }),
            Err(ServiceError::DuplicateCategory(_))
        ));

        let updated = budgets.set_limits("Work", 30.0, 600.0).unwrap();
        assert_eq!(updated.id, work.id);
        assert_eq!(budgets.get_all().unwrap().len(), 2);
    });
}

#[test]
fn budget_summary_from_stored_records() {
    on_each_backend(|backend| {
        let today = day(2);
        for (amount, category) in [(10.0, "Work"), (5.0, "Work"), (20.0, "Personal")] {
            ExpenseService::new(&mut *backend)
                .create(ExpenseDraft {
                    amount,
                    category: Some(category.to_string()),
                    description: String::new(),
                    date: Some(today),
                })
                .unwrap();
        }
        ExpenseService::new(&mut *backend)
            .create(ExpenseDraft { amount: 99.0, date: Some(day(1)), ..ExpenseDraft::default() })
            .unwrap();
        BudgetService::new(&mut *backend).set_limits("Work", 20.0, 400.0).unwrap();
        BudgetService::new(&mut *backend).set_limits("Personal", 15.0, 300.0).unwrap();

        let expenses = ExpenseService::new(&mut *backend).get_all().unwrap();
        let budgets = BudgetService::new(&mut *backend).get_all().unwrap();
        let summary = BudgetSummary::calculate(&expenses, &budgets, today, 80.0);

        assert_eq!(summary.today_spending, 35.0);
        assert_eq!(summary.total_daily_limit, 35.0);
        assert_eq!(summary.progress_percentage, 100.0);
        let breakdown: Vec<(&str, f64)> = summary.breakdown.iter().map(|c| (c.category.as_str(), c.amount)).collect();
        assert_eq!(breakdown, vec![("Personal", 20.0), ("Work", 15.0)]);
        assert_eq!(summary.month_spending, 134.0);
    });
}

#[test]
fn sqlite_data_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dayboard.db");
    let path = path.to_str().unwrap();

    let id = {
        let mut db = Database::new(path).unwrap();
        TaskService::new(&mut db)
            .create(TaskDraft { title: "Persist me".to_string(), ..TaskDraft::default() })
            .unwrap()
            .id
    };

    let mut db = Database::new(path).unwrap();
    let task = TaskService::new(&mut db).get_by_id(id).unwrap();
    assert_eq!(task.title, "Persist me");
}

#[test]
fn memory_ids_are_not_reused() {
    let mut backend = MemoryBackend::new();
    let mut tasks = TaskService::new(&mut backend);
    let first = tasks.create(TaskDraft { title: "a".to_string(), ..TaskDraft::default() }).unwrap();
    let second = tasks.create(TaskDraft { title: "b".to_string(), ..TaskDraft::default() }).unwrap();
    tasks.delete(second.id).unwrap();
    let third = tasks.create(TaskDraft { title: "c".to_string(), ..TaskDraft::default() }).unwrap();
    assert!(third.id > second.id);
    assert!(second.id > first.id);
}
