use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::models::{Record, TimeBlock, TimeBlockDraft, TimeBlockPatch, default_category_color};
use crate::services::{IntoRecordId, Service, ServiceError, require_title};
use crate::store::Collection;
use crate::views::calendar;

/// Storage keeps whole seconds, so fractions are dropped before either backend sees them
fn whole_seconds(instant: NaiveDateTime) -> NaiveDateTime {
    instant.with_nanosecond(0).unwrap_or(instant)
}

impl<B> Service<'_, TimeBlock, B>
where
    B: Collection<TimeBlock> + ?Sized,
{
    /// Color falls back to the category's palette entry, reminder to off.
    /// An end before the start is stored as given.
    pub fn create(&mut self, draft: TimeBlockDraft) -> Result<TimeBlock, ServiceError> {
        let category = draft.category.trim().to_string();
        let color = draft
            .color
            .filter(|color| !color.trim().is_empty())
            .unwrap_or_else(|| default_category_color(&category).to_string());
        let block = TimeBlock {
            id: 0,
            title: require_title(TimeBlock::KIND, &draft.title)?,
            start_time: whole_seconds(draft.start_time),
            end_time: whole_seconds(draft.end_time),
            category,
            color,
            reminder: draft.reminder.unwrap_or(false),
        };
        if block.end_time <= block.start_time {
            tracing::warn!(title = %block.title, "time block does not end after it starts");
        }
        self.insert(block)
    }

    pub fn update(&mut self, id: impl IntoRecordId, patch: TimeBlockPatch) -> Result<TimeBlock, ServiceError> {
        if let Some(title) = &patch.title {
            require_title(TimeBlock::KIND, title)?;
        }
        self.modify(id, |block| {
            patch.apply(block);
            block.title = block.title.trim().to_string();
            block.start_time = whole_seconds(block.start_time);
            block.end_time = whole_seconds(block.end_time);
            Ok(())
        })
    }

    /// Drop a block onto the calendar cell (`day`, `hour`), keeping its length
    pub fn reschedule(&mut self, id: impl IntoRecordId, day: NaiveDate, hour: u32) -> Result<TimeBlock, ServiceError> {
        let block = self.get_by_id(id)?;
        let moved = calendar::reschedule_block(&block, day, hour)
            .ok_or_else(|| ServiceError::Invalid(format!("Hour must be between 0 and 23, got {}", hour)))?;
        tracing::info!(id = block.id, from = %block.start_time, to = %moved.start_time, "rescheduling time block");
        self.write_back(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::TimeBlockService;
    use crate::store::MemoryBackend;
    use chrono::{Duration, NaiveDateTime};

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, day).unwrap().and_hms_opt(hour, minute, 0).unwrap()
    }

    fn draft(category: &str) -> TimeBlockDraft {
        TimeBlockDraft {
            title: "Focus".to_string(),
            start_time: at(2, 9, 15),
            end_time: at(2, 10, 45),
            category: category.to_string(),
            color: None,
            reminder: None,
        }
    }

    #[test]
    fn create_takes_color_from_category() {
        let mut backend = MemoryBackend::new();
        let block = TimeBlockService::new(&mut backend).create(draft("Health")).unwrap();
        assert_eq!(block.color, "#FF6B6B");
        assert!(!block.reminder);
    }

    #[test]
    fn explicit_color_wins() {
        let mut backend = MemoryBackend::new();
        let block = TimeBlockService::new(&mut backend)
            .create(TimeBlockDraft { color: Some("#000000".to_string()), ..draft("Health") })
            .unwrap();
        assert_eq!(block.color, "#000000");
    }

    #[test]
    fn reschedule_keeps_duration_and_zeroes_minutes() {
        let mut backend = MemoryBackend::new();
        let mut service = TimeBlockService::new(&mut backend);
        let block = service.create(draft("Work")).unwrap();

        let target = NaiveDate::from_ymd_opt(2024, 4, 4).unwrap();
        let moved = service.reschedule(block.id, target, 14).unwrap();

        assert_eq!(moved.start_time, at(4, 14, 0));
        assert_eq!(moved.duration(), Duration::minutes(90));
        assert_eq!(service.get_by_id(block.id).unwrap(), moved);
    }

    #[test]
    fn sub_second_times_are_trimmed() {
        let mut backend = MemoryBackend::new();
        let mut service = TimeBlockService::new(&mut backend);
        let block = service
            .create(TimeBlockDraft {
                start_time: at(2, 9, 15) + Duration::milliseconds(250),
                end_time: at(2, 10, 45) + Duration::milliseconds(900),
                ..draft("Work")
            })
            .unwrap();
        assert_eq!(block.start_time, at(2, 9, 15));
        assert_eq!(block.duration(), Duration::minutes(90));

        let patch = TimeBlockPatch { end_time: Some(at(2, 11, 0) + Duration::microseconds(5)), ..TimeBlockPatch::default() };
        let updated = service.update(block.id, patch).unwrap();
        assert_eq!(updated.end_time, at(2, 11, 0));
    }

    #[test]
    fn reschedule_rejects_bad_hour() {
        let mut backend = MemoryBackend::new();
        let mut service = TimeBlockService::new(&mut backend);
        let block = service.create(draft("Work")).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 4, 4).unwrap();
        assert!(matches!(service.reschedule(block.id, day, 24), Err(ServiceError::Invalid(_))));
    }
}
