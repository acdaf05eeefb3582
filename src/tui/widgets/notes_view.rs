use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap};
use ratatui::Frame;
use ratskin::RatSkin;
use std::cmp;
use termimad::minimad::Text as MinimadText;

use crate::config::Config;
use crate::models::{Note, format_tags};
use crate::tui::app::NotesState;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::truncate;
use crate::views::notes::plain_text;

/// Markdown shown in the content pane
pub fn note_markdown(note: &Note) -> String {
    let mut content = format!("# {}\n\n", note.title);
    if !note.tags.is_empty() {
        let tags: Vec<String> = note.tags.iter().map(|t| format!("#{}", t)).collect();
        content.push_str(&format!("*{}*\n\n", tags.join(" ")));
    }
    content.push_str(&plain_text(&note.content));
    content.push('\n');
    content
}

fn markdown_lines(markdown: &str, width: u16) -> Vec<Line<'static>> {
    RatSkin::default()
        .parse(MinimadText::from(markdown), width)
        .into_iter()
        .map(|line| {
            let spans: Vec<Span> = line
                .spans
                .into_iter()
                .map(|span| Span::styled(span.content.to_string(), span.style))
                .collect();
            Line::from(spans)
        })
        .collect()
}

pub fn render_notes(
    f: &mut Frame,
    area: Rect,
    notes: &[&Note],
    state: &mut NotesState,
    query: &str,
    searching: bool,
    config: &Config,
) {
    let theme = config.get_active_theme();
    let base = Style::default().fg(parse_color(&theme.fg));
    let highlight_bg = parse_color(&theme.highlight_bg);

    let show_search = searching || !query.is_empty();
    let vertical = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(if show_search { 3 } else { 0 }), Constraint::Min(3)])
        .split(area);
    let columns = RatLayout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)]).split(vertical[1]);

    if show_search {
        let cursor = if searching { "_" } else { "" };
        let search = Paragraph::new(format!("{}{}", query, cursor))
            .block(Block::default().borders(Borders::ALL).title("Search"))
            .style(base);
        f.render_widget(search, vertical[0]);
    }

    // Note list
    let width = columns[0].width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = notes
        .iter()
        .map(|note| {
            let mut lines = vec![Line::from(Span::styled(
                truncate(&note.title, width),
                base.add_modifier(Modifier::BOLD),
            ))];
            let mut meta = note.updated_at.format("%Y-%m-%d").to_string();
            if !note.tags.is_empty() {
                meta.push_str(" · ");
                meta.push_str(&format_tags(&note.tags));
            }
            lines.push(Line::from(Span::styled(truncate(&meta, width), base.add_modifier(Modifier::DIM))));
            ListItem::new(lines)
        })
        .collect();
    let list_title = match &state.tag_filter {
        Some(tag) => format!("Notes #{} ({})", tag, notes.len()),
        None => format!("Notes ({})", notes.len()),
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(list_title))
        .style(base)
        .highlight_style(Style::default().bg(highlight_bg).fg(get_contrast_text_color(highlight_bg)));
    f.render_stateful_widget(list, columns[0], &mut state.list_state);

    // Content
    let Some(note) = notes.get(state.selected) else {
        let empty = if query.is_empty() && state.tag_filter.is_none() {
            "No notes yet"
        } else {
            "No notes match"
        };
        f.render_widget(
            Paragraph::new(empty).block(Block::default().borders(Borders::ALL).title("Content")).style(base),
            columns[1],
        );
        return;
    };
    render_note_content(f, columns[1], note, state, config);
}

fn render_note_content(f: &mut Frame, area: Rect, note: &Note, state: &mut NotesState, config: &Config) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let horizontal = RatLayout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    let content_area = horizontal[0];
    let scrollbar_area = horizontal[1];

    let viewport_height = area.height.saturating_sub(2) as usize;
    let text_width: u16 = content_area.width.saturating_sub(2);
    let lines = markdown_lines(&note_markdown(note), text_width);
    let total_lines = lines.len();

    let max_scroll = total_lines.saturating_sub(viewport_height);
    state.content_scroll = cmp::min(state.content_scroll, max_scroll);
    let start = state.content_scroll;
    let end = cmp::min(start + viewport_height, total_lines);
    let visible = if start < total_lines { Text::from(lines[start..end].to_vec()) } else { Text::default() };

    let base_style = Style::default().fg(parse_color(&config.get_active_theme().fg));
    let paragraph = Paragraph::new(visible)
        .block(Block::default().borders(Borders::ALL).title("Content"))
        .style(base_style)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, content_area);

    if total_lines > viewport_height {
        let scrollbar_inner_area = Rect::new(
            scrollbar_area.x,
            content_area.y + 1,
            scrollbar_area.width,
            content_area.height.saturating_sub(2),
        );
        let mut scrollbar_state = ScrollbarState::new(total_lines)
            .viewport_content_length(viewport_height)
            .position(state.content_scroll);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");
        f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_tags;
    use chrono::Utc;

    fn note(content: &str) -> Note {
        Note {
            id: 1,
            title: "Plan".to_string(),
            content: content.to_string(),
            tags: parse_tags("work, q2"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn markdown_keeps_plain_content() {
        let markdown = note_markdown(&note("- a < b\n- **bold**"));
        assert!(markdown.starts_with("# Plan\n\n*#q2 #work*\n\n"));
        assert!(markdown.contains("- a < b"));
    }

    #[test]
    fn legacy_html_is_stripped() {
        let markdown = note_markdown(&note("<p>Hello <b>team</b></p>"));
        assert!(markdown.contains("Hello team"));
        assert!(!markdown.contains("<p>"));
    }
}
