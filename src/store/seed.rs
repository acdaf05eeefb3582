//! Sample records for the in-memory backend, placed around a given moment so
//! the Today tab always has something current to show.

use chrono::{Duration, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::models::{
    Budget, Expense, Note, Priority, Task, TaskStatus, TimeBlock, default_category_color, parse_tags,
};
use crate::store::MemoryBackend;

fn block(id: i64, title: &str, start: NaiveDateTime, hours: i64, category: &str, reminder: bool) -> TimeBlock {
    TimeBlock {
        id,
        title: title.to_string(),
        start_time: start,
        end_time: start + Duration::hours(hours),
        category: category.to_string(),
        color: default_category_color(category).to_string(),
        reminder,
    }
}

pub fn demo_backend(now: NaiveDateTime) -> MemoryBackend {
    let today = now.date();
    let hour_start = today.and_hms_opt(now.hour(), 0, 0).unwrap_or(now);
    let now_utc = Utc.from_utc_datetime(&now);

    let tasks = vec![
        Task {
            id: 1,
            title: "Review pull requests".to_string(),
            description: "Go through the open reviews before standup".to_string(),
            priority: Priority::High,
            status: TaskStatus::Todo,
            due_date: Some(today),
        },
        Task {
            id: 2,
            title: "Write weekly report".to_string(),
            description: String::new(),
            priority: Priority::Medium,
            status: TaskStatus::InProgress,
            due_date: Some(today),
        },
        Task {
            id: 3,
            title: "Book dentist appointment".to_string(),
            description: String::new(),
            priority: Priority::Low,
            status: TaskStatus::Done,
            due_date: Some(today),
        },
        Task {
            id: 4,
            title: "Plan next sprint".to_string(),
            description: "Collect estimates from the team".to_string(),
            priority: Priority::Medium,
            status: TaskStatus::Todo,
            due_date: Some(today + Duration::days(3)),
        },
    ];

    let time_blocks = vec![
        block(1, "Deep work", hour_start, 2, "Work", false),
        block(2, "Gym", hour_start + Duration::hours(3), 1, "Health", true),
        block(3, "Rust course", hour_start + Duration::days(1), 1, "Learning", false),
        block(4, "Dinner with friends", hour_start - Duration::days(1), 2, "Leisure", true),
    ];

    let notes = vec![
        Note {
            id: 1,
            title: "Meeting notes".to_string(),
            content: "## Standup\n\n- ship the calendar view\n- **blocked** on review".to_string(),
            tags: parse_tags("work, meetings"),
            created_at: now_utc - Duration::days(2),
            updated_at: now_utc - Duration::hours(1),
        },
        Note {
            id: 2,
            title: "Reading list".to_string(),
            content: "1. The Rust Programming Language\n2. Designing Data-Intensive Applications".to_string(),
            tags: parse_tags("books, learning"),
            created_at: now_utc - Duration::days(7),
            updated_at: now_utc - Duration::days(3),
        },
        Note {
            id: 3,
            title: "Groceries".to_string(),
            content: "<p>milk, eggs, <b>coffee</b></p>".to_string(),
            tags: parse_tags("personal"),
            created_at: now_utc - Duration::hours(5),
            updated_at: now_utc - Duration::hours(5),
        },
    ];

    let expenses = vec![
        Expense {
            id: 1,
            amount: 12.5,
            category: "Work".to_string(),
            description: "Team lunch".to_string(),
            date: today,
        },
        Expense {
            id: 2,
            amount: 4.2,
            category: "Personal".to_string(),
            description: "Coffee".to_string(),
            date: today,
        },
        Expense {
            id: 3,
            amount: 30.0,
            category: "Health".to_string(),
            description: "Gym membership".to_string(),
            date: today - Duration::days(1),
        },
    ];

    let budgets = vec![
        Budget { id: 1, category: "Work".to_string(), daily_limit: 20.0, monthly_limit: 400.0 },
        Budget { id: 2, category: "Personal".to_string(), daily_limit: 15.0, monthly_limit: 300.0 },
        Budget { id: 3, category: "Health".to_string(), daily_limit: 10.0, monthly_limit: 100.0 },
    ];

    MemoryBackend::with_records(tasks, time_blocks, notes, expenses, budgets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Collection;
    use chrono::NaiveDate;

    #[test]
    fn current_block_surrounds_now() {
        let now = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap().and_hms_opt(10, 15, 0).unwrap();
        let backend = demo_backend(now);
        let blocks = Collection::<TimeBlock>::list(&backend).unwrap();
        assert!(blocks.iter().any(|b| b.contains(now)));
    }

    #[test]
    fn seeded_budgets_have_unique_categories() {
        let now = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap().and_hms_opt(10, 0, 0).unwrap();
        let backend = demo_backend(now);
        let budgets = Collection::<Budget>::list(&backend).unwrap();
        let mut categories: Vec<_> = budgets.iter().map(|b| b.category.clone()).collect();
        categories.dedup();
        assert_eq!(categories.len(), budgets.len());
    }
}
