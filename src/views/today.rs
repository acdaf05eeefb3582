use chrono::NaiveDateTime;

use crate::models::{Note, Task, TaskStatus, TimeBlock};

/// First block (in collection order) whose closed interval contains `now`
pub fn current_block(blocks: &[TimeBlock], now: NaiveDateTime) -> Option<&TimeBlock> {
    blocks.iter().find(|block| block.contains(now))
}

/// Earliest block starting strictly after `now`
pub fn next_block(blocks: &[TimeBlock], now: NaiveDateTime) -> Option<&TimeBlock> {
    blocks
        .iter()
        .filter(|block| block.start_time > now)
        .min_by_key(|block| block.start_time)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub done: usize,
    pub in_progress: usize,
    pub todo: usize,
}

impl TaskStats {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(TaskStats::default(), |mut stats, task| {
            stats.total += 1;
            match task.status {
                TaskStatus::Done => stats.done += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Todo => stats.todo += 1,
            }
            stats
        })
    }

    pub fn completion_percentage(&self) -> f64 {
        if self.total == 0 { 0.0 } else { self.done as f64 / self.total as f64 * 100.0 }
    }
}

/// Snapshot for the Today tab
#[derive(Debug, Clone)]
pub struct TodayOverview {
    pub now: NaiveDateTime,
    /// Tasks due today
    pub tasks: Vec<Task>,
    pub stats: TaskStats,
    /// Blocks starting today, earliest first
    pub blocks: Vec<TimeBlock>,
    pub current_block: Option<TimeBlock>,
    pub next_block: Option<TimeBlock>,
    /// Most recently updated notes
    pub recent_notes: Vec<Note>,
}

impl TodayOverview {
    pub const RECENT_NOTES: usize = 3;

    pub fn build(tasks: &[Task], blocks: &[TimeBlock], notes: &[Note], now: NaiveDateTime) -> Self {
        let today = now.date();

        let tasks: Vec<Task> = tasks
            .iter()
            .filter(|task| task.due_date == Some(today))
            .cloned()
            .collect();
        let stats = TaskStats::from_tasks(&tasks);

        let mut todays_blocks: Vec<TimeBlock> = blocks
            .iter()
            .filter(|block| block.start_time.date() == today)
            .cloned()
            .collect();
        // Resolve against collection order before sorting for display
        let current = current_block(&todays_blocks, now).cloned();
        let next = next_block(&todays_blocks, now).cloned();
        todays_blocks.sort_by_key(|block| block.start_time);

        Self {
            now,
            tasks,
            stats,
            blocks: todays_blocks,
            current_block: current,
            next_block: next,
            recent_notes: recent_notes(notes, Self::RECENT_NOTES),
        }
    }
}

pub fn recent_notes(notes: &[Note], count: usize) -> Vec<Note> {
    let mut sorted = notes.to_vec();
    sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    sorted.truncate(count);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, day).unwrap().and_hms_opt(hour, minute, 0).unwrap()
    }

    fn block(id: i64, start: NaiveDateTime, minutes: i64) -> TimeBlock {
        TimeBlock {
            id,
            title: format!("block {}", id),
            start_time: start,
            end_time: start + Duration::minutes(minutes),
            category: "Work".to_string(),
            color: "#5B4CDB".to_string(),
            reminder: false,
        }
    }

    #[test]
    fn current_block_includes_both_endpoints() {
        let blocks = vec![block(1, at(2, 9, 0), 60)];
        assert_eq!(current_block(&blocks, at(2, 9, 0)).map(|b| b.id), Some(1));
        assert_eq!(current_block(&blocks, at(2, 10, 0)).map(|b| b.id), Some(1));
        assert!(current_block(&blocks, at(2, 10, 1)).is_none());
    }

    #[test]
    fn overlapping_blocks_resolve_to_first_match() {
        let blocks = vec![block(1, at(2, 9, 0), 120), block(2, at(2, 8, 0), 240)];
        assert_eq!(current_block(&blocks, at(2, 10, 0)).map(|b| b.id), Some(1));
    }

    #[test]
    fn next_block_is_earliest_future_start() {
        let blocks = vec![
            block(1, at(2, 15, 0), 30),
            block(2, at(2, 11, 0), 30),
            block(3, at(2, 10, 0), 30),
        ];
        assert_eq!(next_block(&blocks, at(2, 10, 0)).map(|b| b.id), Some(2));
        assert!(next_block(&blocks, at(2, 16, 0)).is_none());
    }

    #[test]
    fn overview_keeps_only_today() {
        let now = at(2, 9, 30);
        let tasks = vec![
            Task { id: 1, due_date: Some(now.date()), status: TaskStatus::Done, ..Task::default() },
            Task { id: 2, due_date: Some(now.date()), ..Task::default() },
            Task { id: 3, due_date: None, ..Task::default() },
        ];
        let blocks = vec![block(1, at(3, 9, 0), 60), block(2, at(2, 9, 0), 60)];
        let base = Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap();
        let notes: Vec<Note> = (1..=4)
            .map(|id| Note {
                id,
                title: format!("n{}", id),
                content: String::new(),
                tags: Default::default(),
                created_at: base,
                updated_at: base + Duration::hours(id),
            })
            .collect();

        let overview = TodayOverview::build(&tasks, &blocks, &notes, now);

        assert_eq!(overview.stats, TaskStats { total: 2, done: 1, in_progress: 0, todo: 1 });
        assert_eq!(overview.stats.completion_percentage(), 50.0);
        assert_eq!(overview.blocks.len(), 1);
        assert_eq!(overview.current_block.map(|b| b.id), Some(2));
        let note_ids: Vec<i64> = overview.recent_notes.iter().map(|n| n.id).collect();
        assert_eq!(note_ids, vec![4, 3, 2]);
    }
}
