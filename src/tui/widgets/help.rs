use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::config::Config;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::popup_area;
use crate::utils::format_key_binding_for_display as key;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    let popup_area = popup_area(area, 60, 80);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

pub fn build_help_text(config: &Config) -> String {
    let kb = &config.key_bindings;
    let mut text = String::new();

    text.push_str("Navigation:\n");
    text.push_str(&format!("  {} / {}: Switch tabs\n", key(&kb.tab_left), key(&kb.tab_right)));
    text.push_str(&format!(
        "  {} .. {}: Jump to tab\n",
        key(&kb.tab_1),
        key(&kb.tab_5)
    ));
    text.push_str(&format!("  {} / {}: Move up/down\n", key(&kb.list_up), key(&kb.list_down)));
    text.push_str(&format!(
        "  {} / {}: Move left/right (column, day)\n",
        key(&kb.column_left),
        key(&kb.column_right)
    ));
    text.push('\n');

    text.push_str("Actions:\n");
    text.push_str(&format!("  {}: New item\n", key(&kb.new)));
    text.push_str(&format!("  {}: Edit selected item\n", key(&kb.edit)));
    text.push_str(&format!("  {}: Delete selected item\n", key(&kb.delete)));
    text.push('\n');

    text.push_str("Tasks:\n");
    text.push_str(&format!(
        "  {} / {}: Move task to previous/next column\n",
        key(&kb.move_left),
        key(&kb.move_right)
    ));
    text.push('\n');

    text.push_str("Calendar:\n");
    text.push_str(&format!("  {}: Pick up / drop time block\n", key(&kb.grab)));
    text.push_str(&format!("  {} / {}: Previous/next week\n", key(&kb.week_prev), key(&kb.week_next)));
    text.push_str(&format!("  {}: Jump to now\n", key(&kb.jump_today)));
    text.push_str("  Esc: Cancel move\n");
    text.push('\n');

    text.push_str("Notes:\n");
    text.push_str(&format!("  {}: Search title and content\n", key(&kb.search)));
    text.push_str(&format!("  {}: Cycle tag filter\n", key(&kb.tag_filter)));
    text.push_str(&format!("  {}: Copy note to clipboard\n", key(&kb.copy)));
    text.push_str("  PageUp/PageDown: Scroll content\n");
    text.push('\n');

    text.push_str("Budget:\n");
    text.push_str(&format!("  {}: Set budget for category\n", key(&kb.set_budget)));
    text.push_str(&format!("  {}: Switch categories/expenses\n", key(&kb.select)));
    text.push('\n');

    text.push_str("Forms:\n");
    text.push_str(&format!("  {}: Save\n", key(&kb.save)));
    text.push_str("  Tab / Shift+Tab: Next/previous field\n");
    text.push_str("  ←/→ on a choice: Change value\n");
    text.push_str("  Esc: Cancel\n");
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Quit\n", key(&kb.quit)));
    text.push_str(&format!("  {}: Show/hide help\n", key(&kb.help)));

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_follows_configured_bindings() {
        let mut config = Config::default();
        config.key_bindings.grab = "g".to_string();
        let text = build_help_text(&config);
        assert!(text.contains("g: Pick up / drop time block"));
        assert!(text.contains(&format!("{}: Save", key("Ctrl+s"))));
    }
}
