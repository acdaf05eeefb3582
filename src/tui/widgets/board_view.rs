use chrono::NaiveDate;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use ratatui::Frame;

use crate::config::{Config, Theme};
use crate::models::{Priority, Task};
use crate::tui::app::BoardState;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::truncate;
use crate::utils::format_date;
use crate::views::board::Column;

fn priority_color(priority: Priority, theme: &Theme) -> Color {
    match priority {
        Priority::High => parse_color(&theme.danger),
        Priority::Medium => parse_color(&theme.warning),
        Priority::Low => parse_color(&theme.success),
    }
}

/// Due date text; overdue open tasks are flagged
fn due_text(task: &Task, today: NaiveDate) -> Option<String> {
    let due = task.due_date?;
    if due < today && task.status != crate::models::TaskStatus::Done {
        Some(format!("due {} (overdue)", format_date(due)))
    } else if due == today {
        Some("due today".to_string())
    } else {
        Some(format!("due {}", format_date(due)))
    }
}

fn task_card<'a>(task: &Task, today: NaiveDate, width: usize, theme: &Theme, base: Style) -> ListItem<'a> {
    let mut lines = vec![Line::from(vec![
        Span::styled("● ", Style::default().fg(priority_color(task.priority, theme))),
        Span::styled(truncate(&task.title, width.saturating_sub(2)), base.add_modifier(Modifier::BOLD)),
    ])];
    let mut meta = task.priority.to_string();
    if let Some(due) = due_text(task, today) {
        meta.push_str(" · ");
        meta.push_str(&due);
    }
    lines.push(Line::from(Span::styled(truncate(&meta, width), base.add_modifier(Modifier::DIM))));
    lines.push(Line::default());
    ListItem::new(lines)
}

pub fn render_board(f: &mut Frame, area: Rect, columns: &[Column], state: &BoardState, today: NaiveDate, config: &Config) {
    let theme = config.get_active_theme();
    let base = Style::default().fg(parse_color(&theme.fg));
    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight = Style::default().bg(highlight_bg).fg(get_contrast_text_color(highlight_bg));

    let lanes = Layout::horizontal(vec![Constraint::Ratio(1, columns.len().max(1) as u32); columns.len()]).split(area);

    for (index, (column, lane)) in columns.iter().zip(lanes.iter()).enumerate() {
        let active = index == state.column;
        let width = lane.width.saturating_sub(2) as usize;
        let items: Vec<ListItem> = column
            .tasks
            .iter()
            .map(|task| task_card(task, today, width, &theme, base))
            .collect();

        let title = format!("{} ({})", column.status, column.tasks.len());
        let border_style = if active { Style::default().fg(highlight_bg) } else { base };
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title).border_style(border_style))
            .style(base)
            .highlight_style(if active { highlight } else { base });

        let mut list_state = ListState::default();
        if active && !column.tasks.is_empty() {
            list_state.select(Some(state.row));
        }
        f.render_stateful_widget(list, *lane, &mut list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;

    #[test]
    fn overdue_only_applies_to_open_tasks() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        let mut task = Task {
            id: 1,
            title: "Report".to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 4, 1),
            ..Task::default()
        };
        assert_eq!(due_text(&task, today).as_deref(), Some("due 2024-04-01 (overdue)"));
        task.status = TaskStatus::Done;
        assert_eq!(due_text(&task, today).as_deref(), Some("due 2024-04-01"));
        task.due_date = Some(today);
        assert_eq!(due_text(&task, today).as_deref(), Some("due today"));
        task.due_date = None;
        assert_eq!(due_text(&task, today), None);
    }
}
