use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::config::Config;
use crate::tui::forms::{FieldInput, ItemForm};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};

/// Rows given to each single-line field (text plus borders)
const SINGLE_LINE_HEIGHT: u16 = 3;
const MIN_MULTI_LINE_HEIGHT: u16 = 5;

/// One constraint per field: fixed boxes for single-line fields,
/// the remaining height shared by multi-line ones
pub fn field_constraints(form: &ItemForm) -> Vec<Constraint> {
    form.fields
        .iter()
        .map(|field| {
            if field.is_multi_line() {
                Constraint::Min(MIN_MULTI_LINE_HEIGHT)
            } else {
                Constraint::Length(SINGLE_LINE_HEIGHT)
            }
        })
        .collect()
}

pub fn render_form(f: &mut Frame, area: Rect, form: &mut ItemForm, config: &Config) {
    if area.width < 4 || area.height < 4 {
        return;
    }

    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_style = Style::default().bg(highlight_bg).fg(get_contrast_text_color(highlight_bg));
    let inactive_field_style = Style::default().fg(fg_color).add_modifier(Modifier::DIM);

    let outer = Block::default()
        .borders(Borders::ALL)
        .title(form.title())
        .style(Style::default().fg(fg_color));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let field_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(field_constraints(form))
        .split(inner);

    let current = form.current;
    let mut cursor = None;

    for (index, (field, field_area)) in form.fields.iter_mut().zip(field_areas.iter()).enumerate() {
        let is_active = index == current;
        let style = if is_active { highlight_style } else { inactive_field_style };
        let block = Block::default().borders(Borders::ALL).title(field.key.label());

        match &mut field.input {
            FieldInput::Text { editor, .. } => {
                let height = field_area.height.saturating_sub(2) as usize;
                let width = field_area.width as usize;
                if is_active {
                    editor.update_scroll(height, width);
                    cursor = editor.cursor_screen_pos(*field_area);
                }
                let lines: Vec<Line> = editor
                    .visible_lines(height, width)
                    .into_iter()
                    .map(|line| Line::from(Span::styled(line, style)))
                    .collect();
                f.render_widget(Paragraph::new(lines).style(style).block(block), *field_area);
            }
            FieldInput::Choice { options, selected } => {
                let value = options.get(*selected).map(String::as_str).unwrap_or("");
                let text = if is_active { format!("◀ {} ▶", value) } else { value.to_string() };
                f.render_widget(Paragraph::new(text).style(style).block(block), *field_area);
            }
        }
    }

    if let Some((x, y)) = cursor {
        f.set_cursor_position((x, y));
    }
}
