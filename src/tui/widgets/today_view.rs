use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph};
use ratatui::Frame;

use crate::config::Config;
use crate::models::{TaskStatus, TimeBlock};
use crate::tui::widgets::budget_view::{gauge_ratio, render_spending_gauge};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::truncate;
use crate::views::{BudgetSummary, TodayOverview, notes};

fn time_range(block: &TimeBlock) -> String {
    format!("{}-{}", block.start_time.format("%H:%M"), block.end_time.format("%H:%M"))
}

fn status_marker(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "[ ]",
        TaskStatus::InProgress => "[~]",
        TaskStatus::Done => "[x]",
    }
}

pub fn render_today(f: &mut Frame, area: Rect, overview: &TodayOverview, summary: &BudgetSummary, config: &Config) {
    let theme = config.get_active_theme();
    let fg_color = parse_color(&theme.fg);
    let base = Style::default().fg(fg_color);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(6), Constraint::Length(7)])
        .split(area);
    let top = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(rows[0]);
    let middle = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(rows[1]);
    let bottom = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(rows[2]);

    // Now / Up next
    let now_title = format!("Now · {}", overview.now.format("%a %b %-d, %H:%M"));
    render_block_card(f, top[0], &now_title, overview.current_block.as_ref(), "Nothing scheduled right now", config);
    render_block_card(f, top[1], "Up Next", overview.next_block.as_ref(), "Nothing else today", config);

    // Due today with completion gauge
    let task_area = Layout::vertical([Constraint::Min(1), Constraint::Length(3)]).split(middle[0]);
    let task_items: Vec<ListItem> = if overview.tasks.is_empty() {
        vec![ListItem::new("No tasks due today")]
    } else {
        overview
            .tasks
            .iter()
            .map(|task| {
                let style = if task.status == TaskStatus::Done {
                    base.add_modifier(Modifier::CROSSED_OUT | Modifier::DIM)
                } else {
                    base
                };
                ListItem::new(Line::from(Span::styled(
                    format!("{} {} ({})", status_marker(task.status), task.title, task.priority),
                    style,
                )))
            })
            .collect()
    };
    f.render_widget(
        List::new(task_items).block(Block::default().borders(Borders::ALL).title("Due Today")).style(base),
        task_area[0],
    );

    let stats = overview.stats;
    let highlight_bg = parse_color(&theme.highlight_bg);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(highlight_bg).bg(parse_color(&theme.bg)))
        .ratio(gauge_ratio(stats.completion_percentage()))
        .label(format!(
            "{}/{} done · {} in progress · {} to do",
            stats.done, stats.total, stats.in_progress, stats.todo
        ));
    f.render_widget(gauge, task_area[1]);

    // Schedule
    let current_id = overview.current_block.as_ref().map(|b| b.id);
    let schedule: Vec<ListItem> = if overview.blocks.is_empty() {
        vec![ListItem::new("No blocks today")]
    } else {
        overview
            .blocks
            .iter()
            .map(|block| {
                let color = parse_color(&block.color);
                let mut spans = vec![
                    Span::styled("█ ", Style::default().fg(color)),
                    Span::styled(format!("{} ", time_range(block)), base),
                    Span::styled(block.title.clone(), base),
                ];
                if block.reminder {
                    spans.push(Span::styled(" ⏰", base));
                }
                let mut line = Line::from(spans);
                if Some(block.id) == current_id {
                    line = line.style(Style::default().bg(highlight_bg).fg(get_contrast_text_color(highlight_bg)));
                }
                ListItem::new(line)
            })
            .collect()
    };
    f.render_widget(
        List::new(schedule).block(Block::default().borders(Borders::ALL).title("Schedule")).style(base),
        middle[1],
    );

    render_spending_gauge(f, bottom[0], summary, config);

    // Recent notes
    let width = bottom[1].width.saturating_sub(4) as usize;
    let note_lines: Vec<ListItem> = if overview.recent_notes.is_empty() {
        vec![ListItem::new("No notes yet")]
    } else {
        overview
            .recent_notes
            .iter()
            .map(|note| {
                let preview = notes::preview(&note.content).replace('\n', " ");
                ListItem::new(vec![
                    Line::from(Span::styled(truncate(&note.title, width), base.add_modifier(Modifier::BOLD))),
                    Line::from(Span::styled(truncate(&preview, width), base.add_modifier(Modifier::DIM))),
                ])
            })
            .collect()
    };
    f.render_widget(
        List::new(note_lines).block(Block::default().borders(Borders::ALL).title("Recent Notes")).style(base),
        bottom[1],
    );
}

fn render_block_card(f: &mut Frame, area: Rect, title: &str, block: Option<&TimeBlock>, empty: &str, config: &Config) {
    let theme = config.get_active_theme();
    let base = Style::default().fg(parse_color(&theme.fg));
    let lines = match block {
        Some(block) => vec![
            Line::from(vec![
                Span::styled("█ ", Style::default().fg(parse_color(&block.color))),
                Span::styled(block.title.clone(), base.add_modifier(Modifier::BOLD)),
            ]),
            Line::from(Span::styled(format!("{} · {}", time_range(block), block.category), base)),
        ],
        None => vec![Line::from(Span::styled(empty.to_string(), base.add_modifier(Modifier::DIM)))],
    };
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title.to_string())),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn time_range_uses_wall_clock() {
        let day = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        let block = TimeBlock {
            id: 1,
            title: "Gym".to_string(),
            start_time: day.and_hms_opt(7, 5, 0).unwrap(),
            end_time: day.and_hms_opt(8, 0, 0).unwrap(),
            category: "Health".to_string(),
            color: "#FF6B6B".to_string(),
            reminder: false,
        };
        assert_eq!(time_range(&block), "07:05-08:00");
        assert_eq!(status_marker(TaskStatus::InProgress), "[~]");
    }
}
