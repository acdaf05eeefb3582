use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size as terminal_size,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;
use std::time::Duration;

use crate::tui::app::{Mode, Tab};
use crate::tui::error::TuiError;
use crate::tui::forms::FieldInput;
use crate::tui::layout::Layout;
use crate::tui::App;
use crate::utils::{has_primary_modifier, parse_key_binding};

/// Guard that ensures terminal state is restored even on panic
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Manually restore terminal state (called on normal exit).
    /// After calling this, the guard will do nothing on drop.
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Errors are ignored here, we are already cleaning up
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check before entering the alternate screen so the message stays visible
    let (width, height) = terminal_size()?;
    let min_width_with_border = Layout::MIN_WIDTH + 2;
    let min_height_with_border = Layout::MIN_HEIGHT + 2;
    if width < min_width_with_border || height < min_height_with_border {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width_with_border, min_height_with_border
        )));
    }

    let mut guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    tracing::info!("terminal ui started");

    loop {
        app.check_status_message_timeout();

        let terminal_size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, terminal_size.width, terminal_size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(terminal_rect);
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        // Only Press events, Windows also reports releases
        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press && handle_key_event(&mut app, key_event)? {
                    break;
                }
            }
        }
    }

    guard.restore()?;
    tracing::info!("terminal ui stopped");
    Ok(())
}

fn matches(binding: &str, key_event: &KeyEvent) -> Result<bool, TuiError> {
    let parsed = parse_key_binding(binding).map_err(TuiError::KeyBindingError)?;
    Ok(parsed.matches(key_event))
}

/// Handle one key press. Returns true when the app should quit.
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if app.modals.delete_confirmation.is_some() {
        handle_delete_confirmation_modal(app, key_event);
        return Ok(false);
    }
    match app.mode {
        Mode::Help => handle_help_mode(app, key_event),
        Mode::Form => handle_form_mode(app, key_event),
        Mode::Search => {
            handle_search_mode(app, key_event);
            Ok(false)
        }
        Mode::View => handle_view_mode(app, key_event),
    }
}

fn handle_delete_confirmation_modal(app: &mut App, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
            app.toggle_delete_selection();
        }
        KeyCode::Enter => app.confirm_delete(),
        KeyCode::Esc => app.cancel_delete(),
        _ => {}
    }
}

fn handle_help_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if key_event.code == KeyCode::Esc || matches(&app.config.key_bindings.help, &key_event)? {
        app.exit_help_mode();
    }
    Ok(false)
}

fn handle_search_mode(app: &mut App, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Esc => app.cancel_search(),
        KeyCode::Enter => app.confirm_search(),
        KeyCode::Backspace => app.remove_from_search(),
        KeyCode::Up => app.notes_move_selection(-1),
        KeyCode::Down => app.notes_move_selection(1),
        KeyCode::Char(c) if !has_primary_modifier(key_event.modifiers) => app.add_to_search(c),
        _ => {}
    }
}

fn handle_form_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if key_event.code == KeyCode::Esc {
        app.close_form();
        return Ok(false);
    }
    if matches(&app.config.key_bindings.save, &key_event)? {
        app.save_form();
        return Ok(false);
    }

    let Some(form) = app.form.form.as_mut() else {
        app.mode = Mode::View;
        return Ok(false);
    };

    match key_event.code {
        KeyCode::Tab => {
            form.next_field();
            return Ok(false);
        }
        KeyCode::BackTab => {
            form.previous_field();
            return Ok(false);
        }
        _ => {}
    }

    let (is_choice, multi_line) = match form.current_field().map(|f| &f.input) {
        Some(FieldInput::Choice { .. }) => (true, false),
        Some(FieldInput::Text { multi_line, .. }) => (false, *multi_line),
        None => return Ok(false),
    };

    if is_choice {
        match key_event.code {
            KeyCode::Left => form.cycle_choice(false),
            KeyCode::Right | KeyCode::Char(' ') => form.cycle_choice(true),
            KeyCode::Up => form.previous_field(),
            KeyCode::Down | KeyCode::Enter => form.next_field(),
            _ => {}
        }
        return Ok(false);
    }

    match key_event.code {
        KeyCode::Enter if !multi_line => form.next_field(),
        KeyCode::Up if !multi_line => form.previous_field(),
        KeyCode::Down if !multi_line => form.next_field(),
        _ => {
            let Some(editor) = form.current_editor() else {
                return Ok(false);
            };
            match key_event.code {
                KeyCode::Enter => editor.insert_newline(),
                KeyCode::Up => editor.move_cursor_up(),
                KeyCode::Down => editor.move_cursor_down(),
                KeyCode::Left => editor.move_cursor_left(),
                KeyCode::Right => editor.move_cursor_right(),
                KeyCode::Home => editor.move_cursor_home(),
                KeyCode::End => editor.move_cursor_end(),
                KeyCode::Backspace => editor.delete_char(),
                KeyCode::Delete => editor.delete_forward(),
                KeyCode::Char(c) if !has_primary_modifier(key_event.modifiers) => editor.insert_char(c),
                _ => {}
            }
        }
    }
    Ok(false)
}

fn handle_view_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let kb = app.config.key_bindings.clone();

    if matches(&kb.quit, &key_event)? {
        return Ok(true);
    }
    if matches(&kb.help, &key_event)? {
        app.enter_help_mode();
        return Ok(false);
    }
    if matches(&kb.tab_left, &key_event)? {
        app.switch_tab(app.current_tab.previous());
        return Ok(false);
    }
    if matches(&kb.tab_right, &key_event)? {
        app.switch_tab(app.current_tab.next());
        return Ok(false);
    }
    for (binding, tab) in [&kb.tab_1, &kb.tab_2, &kb.tab_3, &kb.tab_4, &kb.tab_5].into_iter().zip(Tab::ALL) {
        if matches(binding, &key_event)? {
            app.switch_tab(tab);
            return Ok(false);
        }
    }

    let handled = match app.current_tab {
        Tab::Today => false,
        Tab::Tasks => handle_tasks_keys(app, &key_event)?,
        Tab::Calendar => handle_calendar_keys(app, &key_event)?,
        Tab::Notes => handle_notes_keys(app, &key_event)?,
        Tab::Budget => handle_budget_keys(app, &key_event)?,
    };
    if handled {
        return Ok(false);
    }

    if matches(&kb.new, &key_event)? {
        app.open_create_form();
    } else if matches(&kb.edit, &key_event)? {
        app.open_edit_form();
    } else if matches(&kb.delete, &key_event)? {
        app.request_delete();
    }
    Ok(false)
}

fn is_up(app: &App, key_event: &KeyEvent) -> Result<bool, TuiError> {
    Ok(key_event.code == KeyCode::Up || matches(&app.config.key_bindings.list_up, key_event)?)
}

fn is_down(app: &App, key_event: &KeyEvent) -> Result<bool, TuiError> {
    Ok(key_event.code == KeyCode::Down || matches(&app.config.key_bindings.list_down, key_event)?)
}

fn handle_tasks_keys(app: &mut App, key_event: &KeyEvent) -> Result<bool, TuiError> {
    let kb = &app.config.key_bindings;
    let (left, right) = (matches(&kb.column_left, key_event)?, matches(&kb.column_right, key_event)?);
    let (move_left, move_right) = (matches(&kb.move_left, key_event)?, matches(&kb.move_right, key_event)?);
    let select = matches(&kb.select, key_event)?;

    if is_up(app, key_event)? {
        app.board_move_row(-1);
    } else if is_down(app, key_event)? {
        app.board_move_row(1);
    } else if left {
        app.board_move_column(-1);
    } else if right {
        app.board_move_column(1);
    } else if move_left {
        app.move_selected_task(-1);
    } else if move_right {
        app.move_selected_task(1);
    } else if select {
        app.open_edit_form();
    } else {
        return Ok(false);
    }
    Ok(true)
}

fn handle_calendar_keys(app: &mut App, key_event: &KeyEvent) -> Result<bool, TuiError> {
    let kb = &app.config.key_bindings;
    let (left, right) = (matches(&kb.column_left, key_event)?, matches(&kb.column_right, key_event)?);
    let grab = matches(&kb.grab, key_event)?;
    let (week_prev, week_next) = (matches(&kb.week_prev, key_event)?, matches(&kb.week_next, key_event)?);
    let jump_today = matches(&kb.jump_today, key_event)?;
    let select = matches(&kb.select, key_event)?;

    if is_up(app, key_event)? {
        app.calendar_move_hour(-1);
    } else if is_down(app, key_event)? {
        app.calendar_move_hour(1);
    } else if left {
        app.calendar_move_day(-1);
    } else if right {
        app.calendar_move_day(1);
    } else if grab {
        app.toggle_grab();
    } else if key_event.code == KeyCode::Esc {
        app.cancel_grab();
    } else if week_prev {
        app.shift_calendar_week(-1);
    } else if week_next {
        app.shift_calendar_week(1);
    } else if jump_today {
        app.jump_to_today();
    } else if select {
        if app.calendar.grabbed.is_some() {
            app.toggle_grab();
        } else {
            app.open_edit_form();
        }
    } else {
        return Ok(false);
    }
    Ok(true)
}

fn handle_notes_keys(app: &mut App, key_event: &KeyEvent) -> Result<bool, TuiError> {
    let kb = &app.config.key_bindings;
    let search = matches(&kb.search, key_event)?;
    let tag_filter = matches(&kb.tag_filter, key_event)?;
    let copy = matches(&kb.copy, key_event)?;
    let select = matches(&kb.select, key_event)?;

    if is_up(app, key_event)? {
        app.notes_move_selection(-1);
    } else if is_down(app, key_event)? {
        app.notes_move_selection(1);
    } else if search {
        app.enter_search_mode();
    } else if tag_filter {
        app.cycle_tag_filter();
    } else if copy {
        app.copy_selected_note();
    } else if select {
        app.open_edit_form();
    } else if key_event.code == KeyCode::PageUp {
        app.scroll_note_content(-10);
    } else if key_event.code == KeyCode::PageDown {
        app.scroll_note_content(10);
    } else if key_event.code == KeyCode::Esc && !app.search.query.is_empty() {
        app.cancel_search();
    } else {
        return Ok(false);
    }
    Ok(true)
}

fn handle_budget_keys(app: &mut App, key_event: &KeyEvent) -> Result<bool, TuiError> {
    let kb = &app.config.key_bindings;
    let set_budget = matches(&kb.set_budget, key_event)?;
    let switch_pane = matches(&kb.select, key_event)?
        || matches(&kb.column_left, key_event)?
        || matches(&kb.column_right, key_event)?;

    if is_up(app, key_event)? {
        app.budget_move_selection(-1);
    } else if is_down(app, key_event)? {
        app.budget_move_selection(1);
    } else if switch_pane {
        app.toggle_budget_pane();
    } else if set_budget {
        app.open_budget_form();
    } else {
        return Ok(false);
    }
    Ok(true)
}
