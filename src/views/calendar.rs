use chrono::{Datelike, Duration, NaiveDate, Timelike};

use crate::models::TimeBlock;

pub const HOURS_PER_DAY: u32 = 24;

/// Sunday on or before `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// The seven days of the week containing `date`, Sunday first
pub fn week_days(date: NaiveDate) -> [NaiveDate; 7] {
    let start = week_start(date);
    std::array::from_fn(|offset| start + Duration::days(offset as i64))
}

/// Start of the week `weeks` weeks away from the one containing `date`
pub fn shift_week(date: NaiveDate, weeks: i64) -> NaiveDate {
    week_start(date) + Duration::weeks(weeks)
}

/// Blocks that start on `day`, earliest first
pub fn blocks_on(blocks: &[TimeBlock], day: NaiveDate) -> Vec<&TimeBlock> {
    let mut found: Vec<&TimeBlock> = blocks.iter().filter(|b| b.start_time.date() == day).collect();
    found.sort_by_key(|b| b.start_time);
    found
}

/// Blocks drawn in the (`day`, `hour`) cell: those starting within that hour
pub fn blocks_at(blocks: &[TimeBlock], day: NaiveDate, hour: u32) -> Vec<&TimeBlock> {
    blocks_on(blocks, day)
        .into_iter()
        .filter(|b| b.start_time.hour() == hour)
        .collect()
}

/// Drop `block` onto the (`day`, `hour`) cell. The new start is on the hour
/// (minutes and seconds zeroed) and the duration is carried over unchanged.
/// Returns `None` for an hour outside 0..24.
pub fn reschedule_block(block: &TimeBlock, day: NaiveDate, hour: u32) -> Option<TimeBlock> {
    let start_time = day.and_hms_opt(hour, 0, 0)?;
    let duration = block.duration();
    Some(TimeBlock {
        start_time,
        end_time: start_time + duration,
        ..block.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, Weekday};

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn at(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
        day.and_hms_opt(hour, minute, 0).unwrap()
    }

    fn block(id: i64, start: NaiveDateTime, end: NaiveDateTime) -> TimeBlock {
        TimeBlock {
            id,
            title: "Sync".to_string(),
            start_time: start,
            end_time: end,
            category: "Work".to_string(),
            color: "#5B4CDB".to_string(),
            reminder: true,
        }
    }

    #[test]
    fn weeks_start_on_sunday() {
        // 2024-04-03 is a Wednesday
        assert_eq!(week_start(date(4, 3)), date(3, 31));
        assert_eq!(week_start(date(3, 31)), date(3, 31));
        let days = week_days(date(4, 3));
        assert_eq!(days[0].weekday(), Weekday::Sun);
        assert_eq!(days[6], date(4, 6));
    }

    #[test]
    fn shift_week_moves_by_seven_days() {
        assert_eq!(shift_week(date(4, 3), 1), date(4, 7));
        assert_eq!(shift_week(date(4, 3), -1), date(3, 24));
    }

    #[test]
    fn blocks_sit_in_their_start_hour() {
        let day = date(4, 2);
        let blocks = vec![
            block(1, at(day, 9, 30), at(day, 11, 0)),
            block(2, at(day, 9, 0), at(day, 9, 15)),
            block(3, at(date(4, 3), 9, 0), at(date(4, 3), 10, 0)),
        ];
        let cell: Vec<i64> = blocks_at(&blocks, day, 9).iter().map(|b| b.id).collect();
        assert_eq!(cell, vec![2, 1]);
        assert!(blocks_at(&blocks, day, 10).is_empty());
    }

    #[test]
    fn reschedule_preserves_duration_across_midnight() {
        let day = date(4, 2);
        let original = block(7, at(day, 22, 45), at(date(4, 3), 1, 5));

        let moved = reschedule_block(&original, date(4, 5), 23).unwrap();

        assert_eq!(moved.start_time, at(date(4, 5), 23, 0));
        assert_eq!(moved.duration(), original.duration());
        assert_eq!(moved.id, original.id);
        assert!(moved.reminder);
        assert!(reschedule_block(&original, day, 24).is_none());
    }
}
