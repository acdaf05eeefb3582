use ratatui::layout::Alignment;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear};
use ratatui::Frame;

use crate::tui::app::{BudgetPane, Mode, Tab};
use crate::tui::widgets::{
    board_view::render_board,
    budget_view::render_budget,
    calendar_view::render_calendar,
    color::parse_color,
    confirm_delete::render_confirm_delete,
    form::render_form,
    help::render_help,
    notes_view::render_notes,
    popup_area,
    status_bar::render_status_bar,
    tabs::render_tabs,
    today_view::render_today,
};
use crate::tui::{App, Layout};
use crate::utils::{self, format_key_binding_for_display as key};
use crate::views::{board, notes};

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("Dayboard")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    render_tabs(f, layout.tabs_area, app.current_tab, &app.config);

    let main = layout.main_area;
    let today = utils::today();
    match app.current_tab {
        Tab::Today => {
            let overview = app.today_overview();
            let summary = app.budget_summary();
            render_today(f, main, &overview, &summary, &app.config);
        }
        Tab::Tasks => {
            let columns = board::columns(&app.tasks);
            render_board(f, main, &columns, &app.board, today, &app.config);
        }
        Tab::Calendar => {
            let days = app.calendar_days();
            render_calendar(f, main, &days, &app.blocks, &app.calendar, today, &app.config);
        }
        Tab::Notes => {
            let filtered = notes::filter_notes(&app.notes, &app.search.query, app.notes_view.tag_filter.as_deref());
            render_notes(
                f,
                main,
                &filtered,
                &mut app.notes_view,
                &app.search.query,
                app.mode == Mode::Search,
                &app.config,
            );
        }
        Tab::Budget => {
            let summary = app.budget_summary();
            let rows = app.budget_rows();
            let expenses = app.sorted_expenses();
            render_budget(f, main, &summary, &rows, &expenses, &app.budget_view, &app.config);
        }
    }

    if app.mode == Mode::Form {
        if let Some(form) = app.form.form.as_mut() {
            let area = popup_area(main, 80, 90);
            f.render_widget(Clear, area);
            render_form(f, area, form, &app.config);
        }
    }

    if app.mode == Mode::Help {
        render_help(f, f.area(), &app.config);
    }

    if let Some(ref item) = app.modals.delete_confirmation {
        render_confirm_delete(f, f.area(), item, app.modals.delete_modal_selection, &app.config);
    }

    let key_hints = get_key_hints(app);
    render_status_bar(f, layout.status_area, app.status.message.as_ref(), &key_hints, &app.config);
}

pub fn get_key_hints(app: &App) -> Vec<String> {
    let kb = &app.config.key_bindings;
    if app.modals.delete_confirmation.is_some() {
        return vec!["↑/↓: Choose".to_string(), "Enter: Confirm".to_string(), "Esc: Cancel".to_string()];
    }
    match app.mode {
        Mode::Help => vec![format!("Esc or {}: Exit help", key(&kb.help))],
        Mode::Search => vec![
            "Type to filter".to_string(),
            "Enter: Keep filter".to_string(),
            "Esc: Clear search".to_string(),
        ],
        Mode::Form => vec![
            "Tab/Shift+Tab: Next/previous field".to_string(),
            "←/→: Change choice".to_string(),
            format!("{}: Save", key(&kb.save)),
            "Esc: Cancel".to_string(),
        ],
        Mode::View => {
            let mut hints = vec![format!("{}: Quit", key(&kb.quit)), format!("{}: New", key(&kb.new))];
            match app.current_tab {
                Tab::Today => {}
                Tab::Tasks => {
                    hints.push(format!("{}: Edit", key(&kb.edit)));
                    hints.push(format!("{}: Delete", key(&kb.delete)));
                    hints.push(format!("{}/{}: Move task", key(&kb.move_left), key(&kb.move_right)));
                }
                Tab::Calendar => {
                    if app.calendar.grabbed.is_some() {
                        hints.push(format!("{}: Drop here", key(&kb.grab)));
                        hints.push("Esc: Cancel move".to_string());
                    } else {
                        hints.push(format!("{}: Pick up", key(&kb.grab)));
                        hints.push(format!("{}: Edit", key(&kb.edit)));
                        hints.push(format!("{}: Delete", key(&kb.delete)));
                    }
                    hints.push(format!("{}/{}: Week", key(&kb.week_prev), key(&kb.week_next)));
                    hints.push(format!("{}: Now", key(&kb.jump_today)));
                }
                Tab::Notes => {
                    hints.push(format!("{}: Edit", key(&kb.edit)));
                    hints.push(format!("{}: Delete", key(&kb.delete)));
                    hints.push(format!("{}: Search", key(&kb.search)));
                    hints.push(format!("{}: Tag", key(&kb.tag_filter)));
                    hints.push(format!("{}: Copy", key(&kb.copy)));
                }
                Tab::Budget => {
                    hints.push(format!("{}: Edit", key(&kb.edit)));
                    hints.push(format!("{}: Delete", key(&kb.delete)));
                    if app.budget_view.pane == BudgetPane::Categories {
                        hints.push(format!("{}: Set budget", key(&kb.set_budget)));
                    }
                    hints.push(format!("{}: Switch pane", key(&kb.select)));
                }
            }
            hints.push(format!("{}: Help", key(&kb.help)));
            hints
        }
    }
}
