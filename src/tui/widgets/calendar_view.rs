use chrono::{Duration, NaiveDate, Timelike};
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

use crate::config::Config;
use crate::models::TimeBlock;
use crate::tui::app::CalendarState;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::truncate;
use crate::views::calendar::{self, HOURS_PER_DAY};

const HOUR_GUTTER: u16 = 6;

/// First hour to draw so that `cursor_hour` stays inside a window of `rows` hours
pub fn first_visible_hour(cursor_hour: u32, rows: u32) -> u32 {
    if rows >= HOURS_PER_DAY {
        return 0;
    }
    cursor_hour.saturating_sub(rows / 2).min(HOURS_PER_DAY - rows)
}

/// Block starting on `day` that is running during any part of `hour`
fn covering_block<'a>(blocks: &[&'a TimeBlock], day: NaiveDate, hour: u32) -> Option<&'a TimeBlock> {
    let slot_start = day.and_hms_opt(hour, 0, 0)?;
    let slot_end = slot_start + Duration::hours(1);
    blocks
        .iter()
        .find(|b| b.start_time < slot_end && b.end_time > slot_start)
        .copied()
}

pub fn render_calendar(
    f: &mut Frame,
    area: Rect,
    days: &[NaiveDate; 7],
    blocks: &[TimeBlock],
    state: &CalendarState,
    today: NaiveDate,
    config: &Config,
) {
    let theme = config.get_active_theme();
    let base = Style::default().fg(parse_color(&theme.fg));
    let highlight_bg = parse_color(&theme.highlight_bg);
    let cursor_style = Style::default()
        .bg(highlight_bg)
        .fg(get_contrast_text_color(highlight_bg))
        .add_modifier(Modifier::BOLD);

    let title = format!(
        "Week of {} - {}",
        days[0].format("%b %-d"),
        days[6].format("%b %-d, %Y")
    );
    let outer = Block::default().borders(Borders::ALL).title(title).style(base);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let rows_available = inner.height.saturating_sub(1) as u32;
    let first_hour = first_visible_hour(state.hour, rows_available);
    let last_hour = (first_hour + rows_available).min(HOURS_PER_DAY);
    let column_width = inner.width.saturating_sub(HOUR_GUTTER) as usize / 7;

    let grabbed = state.grabbed.and_then(|id| blocks.iter().find(|b| b.id == id));

    let header_cells = std::iter::once(Cell::from("")).chain(days.iter().enumerate().map(|(index, day)| {
        let label = day.format("%a %-m/%-d").to_string();
        let mut style = base.add_modifier(Modifier::BOLD);
        if *day == today {
            style = style.fg(highlight_bg);
        }
        if index == state.day {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        Cell::from(label).style(style)
    }));

    let day_blocks: Vec<Vec<&TimeBlock>> = days.iter().map(|day| calendar::blocks_on(blocks, *day)).collect();

    let rows: Vec<Row> = (first_hour..last_hour)
        .map(|hour| {
            let gutter = Cell::from(format!("{:02}:00", hour)).style(base.add_modifier(Modifier::DIM));
            let cells = days.iter().enumerate().map(|(index, day)| {
                let is_cursor = index == state.day && hour == state.hour;
                if is_cursor {
                    if let Some(block) = grabbed {
                        return Cell::from(truncate(&format!("» {}", block.title), column_width)).style(cursor_style);
                    }
                }

                let Some(block) = covering_block(&day_blocks[index], *day, hour) else {
                    let style = if is_cursor { cursor_style } else { base };
                    return Cell::from(if is_cursor { "·" } else { "" }).style(style);
                };

                let color = parse_color(&block.color);
                let mut style = Style::default().bg(color).fg(get_contrast_text_color(color));
                if is_cursor {
                    style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
                }
                if Some(block.id) == state.grabbed {
                    style = style.add_modifier(Modifier::DIM);
                }

                let starts_here = block.start_time.date() == *day && block.start_time.hour() == hour;
                let text = if starts_here {
                    let extra = calendar::blocks_at(blocks, *day, hour).len().saturating_sub(1);
                    let mut label = block.title.clone();
                    if block.reminder {
                        label.push_str(" ⏰");
                    }
                    if extra > 0 {
                        label.push_str(&format!(" +{}", extra));
                    }
                    truncate(&label, column_width)
                } else {
                    String::new()
                };
                Cell::from(Line::from(text)).style(style)
            });
            Row::new(std::iter::once(gutter).chain(cells))
        })
        .collect();

    let mut widths = vec![Constraint::Length(HOUR_GUTTER)];
    widths.extend(vec![Constraint::Ratio(1, 7); 7]);

    let table = Table::new(rows, widths)
        .header(Row::new(header_cells))
        .column_spacing(0)
        .style(base);
    f.render_widget(table, inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_keeps_cursor_visible() {
        assert_eq!(first_visible_hour(9, 30), 0);
        assert_eq!(first_visible_hour(9, 10), 4);
        assert_eq!(first_visible_hour(1, 10), 0);
        assert_eq!(first_visible_hour(23, 10), 14);
    }

    #[test]
    fn long_blocks_cover_later_hours() {
        let day = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        let block = TimeBlock {
            id: 1,
            title: "Offsite".to_string(),
            start_time: day.and_hms_opt(9, 30, 0).unwrap(),
            end_time: day.and_hms_opt(11, 0, 0).unwrap(),
            category: "Work".to_string(),
            color: "#5B4CDB".to_string(),
            reminder: false,
        };
        let blocks = vec![&block];
        assert!(covering_block(&blocks, day, 9).is_some());
        assert!(covering_block(&blocks, day, 10).is_some());
        assert!(covering_block(&blocks, day, 11).is_none());
        assert!(covering_block(&blocks, day, 8).is_none());
    }
}
