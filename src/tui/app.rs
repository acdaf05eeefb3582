use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use ratatui::widgets::ListState;
use std::cmp;
use std::time::Instant;

use crate::config::Config;
use crate::models::{Budget, EntityKind, Expense, Note, Task, TaskStatus, TimeBlock};
use crate::services::{BudgetService, ExpenseService, NoteService, ServiceError, TaskService, TimeBlockService};
use crate::store::Backend;
use crate::tui::forms::{FormSubmission, ItemForm};
use crate::utils;
use crate::views::{BudgetSummary, CategorySpending, TodayOverview, board, budget, calendar, notes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Today,
    Tasks,
    Calendar,
    Notes,
    Budget,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Today, Tab::Tasks, Tab::Calendar, Tab::Notes, Tab::Budget];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Today => "Today",
            Tab::Tasks => "Tasks",
            Tab::Calendar => "Calendar",
            Tab::Notes => "Notes",
            Tab::Budget => "Budget",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Tab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Tab {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Search,
    Help,
    Form,
}

/// A record picked for an action (delete confirmation)
#[derive(Debug, Clone)]
pub enum SelectedItem {
    Task(Task),
    TimeBlock(TimeBlock),
    Note(Note),
    Expense(Expense),
    Budget(Budget),
}

impl SelectedItem {
    pub fn kind(&self) -> EntityKind {
        match self {
            SelectedItem::Task(_) => EntityKind::Task,
            SelectedItem::TimeBlock(_) => EntityKind::TimeBlock,
            SelectedItem::Note(_) => EntityKind::Note,
            SelectedItem::Expense(_) => EntityKind::Expense,
            SelectedItem::Budget(_) => EntityKind::Budget,
        }
    }

    pub fn label(&self) -> String {
        match self {
            SelectedItem::Task(task) => task.title.clone(),
            SelectedItem::TimeBlock(block) => block.title.clone(),
            SelectedItem::Note(note) => note.title.clone(),
            SelectedItem::Expense(expense) => {
                if expense.description.is_empty() {
                    format!("{:.2} ({})", expense.amount, expense.category)
                } else {
                    format!("{} ({:.2})", expense.description, expense.amount)
                }
            }
            SelectedItem::Budget(budget) => format!("{} budget", budget.category),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModalState {
    pub delete_confirmation: Option<SelectedItem>,
    /// 0 = Delete, 1 = Cancel
    pub delete_modal_selection: usize,
}

/// Cursor on the kanban board: lane index and row inside that lane
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    pub column: usize,
    pub row: usize,
}

#[derive(Debug, Clone)]
pub struct CalendarState {
    /// Any day inside the displayed week
    pub week_of: NaiveDate,
    /// Cursor day, 0 = Sunday
    pub day: usize,
    pub hour: u32,
    /// Block picked up with the grab key, waiting to be dropped on a slot
    pub grabbed: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct NotesState {
    pub selected: usize,
    pub list_state: ListState,
    pub tag_filter: Option<String>,
    pub content_scroll: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BudgetPane {
    #[default]
    Categories,
    Expenses,
}

#[derive(Debug, Clone, Default)]
pub struct BudgetState {
    pub pane: BudgetPane,
    pub category_index: usize,
    pub expense_index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
}

#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub form: Option<ItemForm>,
}

pub struct App {
    pub config: Config,
    pub backend: Box<dyn Backend>,

    pub tasks: Vec<Task>,
    pub blocks: Vec<TimeBlock>,
    pub notes: Vec<Note>,
    pub expenses: Vec<Expense>,
    pub budgets: Vec<Budget>,

    pub current_tab: Tab,
    pub mode: Mode,
    pub board: BoardState,
    pub calendar: CalendarState,
    pub notes_view: NotesState,
    pub budget_view: BudgetState,
    pub modals: ModalState,
    pub status: StatusState,
    pub search: SearchState,
    pub form: FormState,
}

fn clamp_index(index: usize, len: usize) -> usize {
    cmp::min(index, len.saturating_sub(1))
}

/// What "copy" puts on the clipboard: title heading plus the note body
fn clipboard_text(note: &Note) -> String {
    format!("# {}\n\n{}", note.title, notes::plain_text(&note.content))
}

fn step(index: usize, delta: isize, len: usize) -> usize {
    clamp_index(index.saturating_add_signed(delta), len)
}

impl App {
    pub fn new(config: Config, backend: Box<dyn Backend>) -> Result<Self, ServiceError> {
        let now = utils::now_local();
        let mut app = Self {
            config,
            backend,
            tasks: Vec::new(),
            blocks: Vec::new(),
            notes: Vec::new(),
            expenses: Vec::new(),
            budgets: Vec::new(),
            current_tab: Tab::Today,
            mode: Mode::View,
            board: BoardState::default(),
            calendar: CalendarState {
                week_of: now.date(),
                day: now.date().weekday().num_days_from_sunday() as usize,
                hour: now.hour(),
                grabbed: None,
            },
            notes_view: NotesState::default(),
            budget_view: BudgetState::default(),
            modals: ModalState::default(),
            status: StatusState::default(),
            search: SearchState::default(),
            form: FormState::default(),
        };
        app.load_data()?;
        Ok(app)
    }

    /// Re-read every collection from the backend
    pub fn load_data(&mut self) -> Result<(), ServiceError> {
        let tasks = TaskService::new(self.backend.as_mut()).get_all()?;
        let blocks = TimeBlockService::new(self.backend.as_mut()).get_all()?;
        let notes = NoteService::new(self.backend.as_mut()).get_all()?;
        let expenses = ExpenseService::new(self.backend.as_mut()).get_all()?;
        let budgets = BudgetService::new(self.backend.as_mut()).get_all()?;
        self.tasks = tasks;
        self.blocks = blocks;
        self.notes = notes;
        self.expenses = expenses;
        self.budgets = budgets;
        self.adjust_selections();
        Ok(())
    }

    /// Keep every cursor inside its (possibly shrunk) list
    pub fn adjust_selections(&mut self) {
        let lane_len = self.board_lane_len(self.board.column);
        self.board.row = clamp_index(self.board.row, lane_len);

        let note_count = self.filtered_notes().len();
        self.notes_view.selected = clamp_index(self.notes_view.selected, note_count);
        self.notes_view
            .list_state
            .select(if note_count == 0 { None } else { Some(self.notes_view.selected) });

        let row_count = self.budget_rows().len();
        self.budget_view.category_index = clamp_index(self.budget_view.category_index, row_count);
        self.budget_view.expense_index = clamp_index(self.budget_view.expense_index, self.expenses.len());
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        if self.current_tab == tab {
            return;
        }
        self.calendar.grabbed = None;
        self.current_tab = tab;
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    /// Check if status message should be auto-cleared (after 3 seconds)
    pub fn check_status_message_timeout(&mut self) {
        const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 3;
        if let Some(time) = self.status.message_time {
            if time.elapsed().as_secs() >= STATUS_MESSAGE_TIMEOUT_SECS {
                self.clear_status_message();
            }
        }
    }

    fn report_failure(&mut self, action: &str, error: ServiceError) {
        tracing::warn!(error = %error, action, "operation failed");
        self.set_status_message(format!("Failed to {}: {}", action, error));
    }

    fn reload(&mut self) {
        if let Err(e) = self.load_data() {
            self.report_failure("reload data", e);
        }
    }

    pub fn enter_help_mode(&mut self) {
        self.mode = Mode::Help;
    }

    pub fn exit_help_mode(&mut self) {
        self.mode = Mode::View;
    }

    // Today

    pub fn today_overview(&self) -> TodayOverview {
        TodayOverview::build(&self.tasks, &self.blocks, &self.notes, utils::now_local())
    }

    pub fn budget_summary(&self) -> BudgetSummary {
        BudgetSummary::calculate(
            &self.expenses,
            &self.budgets,
            utils::today(),
            self.config.warning_threshold_percent,
        )
    }

    // Tasks board

    fn board_lane_len(&self, column: usize) -> usize {
        TaskStatus::from_column_index(column)
            .map(|status| self.tasks.iter().filter(|t| t.status == status).count())
            .unwrap_or(0)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let status = TaskStatus::from_column_index(self.board.column)?;
        self.tasks.iter().filter(|t| t.status == status).nth(self.board.row)
    }

    pub fn board_move_row(&mut self, delta: isize) {
        let len = self.board_lane_len(self.board.column);
        self.board.row = step(self.board.row, delta, len);
    }

    pub fn board_move_column(&mut self, delta: isize) {
        self.board.column = step(self.board.column, delta, TaskStatus::ALL.len());
        self.board.row = clamp_index(self.board.row, self.board_lane_len(self.board.column));
    }

    /// Move the selected task into the neighbouring lane
    pub fn move_selected_task(&mut self, offset: isize) {
        let Some(task) = self.selected_task() else {
            self.set_status_message("No task selected".to_string());
            return;
        };
        let id = task.id;
        if let Some(target) = board::neighbor(task.status, offset) {
            self.drop_task(id, target);
        }
    }

    /// Drop a task on a lane. The local list changes first so the board
    /// redraws at once; the write follows and a failure is only reported.
    pub fn drop_task(&mut self, id: i64, target: TaskStatus) {
        let Some(moved) = board::move_task(&mut self.tasks, id, target) else {
            return;
        };
        self.board.column = target.column_index();
        self.board.row = self
            .tasks
            .iter()
            .filter(|t| t.status == target)
            .position(|t| t.id == id)
            .unwrap_or(0);

        match TaskService::new(self.backend.as_mut()).move_to(id, target) {
            Ok(_) => self.set_status_message(format!("Moved '{}' to {}", moved.title, target)),
            Err(e) => self.report_failure("save task move", e),
        }
    }

    // Calendar

    pub fn calendar_days(&self) -> [NaiveDate; 7] {
        calendar::week_days(self.calendar.week_of)
    }

    pub fn cursor_day(&self) -> NaiveDate {
        self.calendar_days()[cmp::min(self.calendar.day, 6)]
    }

    pub fn cursor_slot_start(&self) -> NaiveDateTime {
        let time = NaiveTime::from_hms_opt(self.calendar.hour, 0, 0).unwrap_or_default();
        self.cursor_day().and_time(time)
    }

    /// Move the cursor by days, rolling over into the neighbouring week
    pub fn calendar_move_day(&mut self, delta: i64) {
        let day = self.calendar.day as i64 + delta;
        if day < 0 {
            self.calendar.week_of = calendar::shift_week(self.calendar.week_of, -1);
            self.calendar.day = 6;
        } else if day > 6 {
            self.calendar.week_of = calendar::shift_week(self.calendar.week_of, 1);
            self.calendar.day = 0;
        } else {
            self.calendar.day = day as usize;
        }
    }

    pub fn calendar_move_hour(&mut self, delta: i64) {
        let last = calendar::HOURS_PER_DAY as i64 - 1;
        self.calendar.hour = (self.calendar.hour as i64 + delta).clamp(0, last) as u32;
    }

    pub fn shift_calendar_week(&mut self, weeks: i64) {
        self.calendar.week_of = calendar::shift_week(self.calendar.week_of, weeks);
    }

    pub fn jump_to_today(&mut self) {
        let now = utils::now_local();
        self.calendar.week_of = now.date();
        self.calendar.day = now.date().weekday().num_days_from_sunday() as usize;
        self.calendar.hour = now.hour();
    }

    pub fn blocks_at_cursor(&self) -> Vec<&TimeBlock> {
        calendar::blocks_at(&self.blocks, self.cursor_day(), self.calendar.hour)
    }

    pub fn selected_block(&self) -> Option<&TimeBlock> {
        self.blocks_at_cursor().into_iter().next()
    }

    pub fn grabbed_block(&self) -> Option<&TimeBlock> {
        let id = self.calendar.grabbed?;
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Pick up the block under the cursor, or drop the one already held
    pub fn toggle_grab(&mut self) {
        if let Some(id) = self.calendar.grabbed.take() {
            let (day, hour) = (self.cursor_day(), self.calendar.hour);
            self.drop_block(id, day, hour);
            return;
        }
        match self.selected_block().map(|b| (b.id, b.title.clone())) {
            Some((id, title)) => {
                self.calendar.grabbed = Some(id);
                let key = utils::format_key_binding_for_display(&self.config.key_bindings.grab);
                self.set_status_message(format!("Picked up '{}'. Move to a slot and press {} to drop", title, key));
            }
            None => self.set_status_message("No block in this slot".to_string()),
        }
    }

    pub fn cancel_grab(&mut self) {
        if self.calendar.grabbed.take().is_some() {
            self.set_status_message("Move cancelled".to_string());
        }
    }

    /// Reschedule a block onto the (`day`, `hour`) slot, locally first, then in storage
    pub fn drop_block(&mut self, id: i64, day: NaiveDate, hour: u32) {
        let Some(index) = self.blocks.iter().position(|b| b.id == id) else {
            return;
        };
        let Some(moved) = calendar::reschedule_block(&self.blocks[index], day, hour) else {
            return;
        };
        let title = moved.title.clone();
        self.blocks[index] = moved;

        match TimeBlockService::new(self.backend.as_mut()).reschedule(id, day, hour) {
            Ok(block) => self.set_status_message(format!(
                "Moved '{}' to {}",
                title,
                block.start_time.format("%a %b %-d, %H:%M")
            )),
            Err(e) => self.report_failure("save block move", e),
        }
    }

    // Notes

    pub fn filtered_notes(&self) -> Vec<&Note> {
        notes::filter_notes(&self.notes, &self.search.query, self.notes_view.tag_filter.as_deref())
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.filtered_notes().get(self.notes_view.selected).copied()
    }

    pub fn notes_move_selection(&mut self, delta: isize) {
        let len = self.filtered_notes().len();
        self.notes_view.selected = step(self.notes_view.selected, delta, len);
        self.notes_view.content_scroll = 0;
        self.notes_view
            .list_state
            .select(if len == 0 { None } else { Some(self.notes_view.selected) });
    }

    pub fn scroll_note_content(&mut self, delta: isize) {
        self.notes_view.content_scroll = self.notes_view.content_scroll.saturating_add_signed(delta);
    }

    /// Step through every tag in use, then back to "all notes"
    pub fn cycle_tag_filter(&mut self) {
        let tags = notes::all_tags(&self.notes);
        let next = match &self.notes_view.tag_filter {
            None => tags.first().cloned(),
            Some(current) => tags
                .iter()
                .position(|t| t == current)
                .and_then(|i| tags.get(i + 1))
                .cloned(),
        };
        let message = match &next {
            Some(tag) => format!("Showing notes tagged #{}", tag),
            None => "Showing all notes".to_string(),
        };
        self.notes_view.tag_filter = next;
        self.notes_view.selected = 0;
        self.notes_move_selection(0);
        self.set_status_message(message);
    }

    pub fn enter_search_mode(&mut self) {
        self.mode = Mode::Search;
    }

    /// Leave search mode, keeping the query as the active filter
    pub fn confirm_search(&mut self) {
        self.mode = Mode::View;
    }

    pub fn cancel_search(&mut self) {
        self.mode = Mode::View;
        self.search.query.clear();
        self.notes_move_selection(0);
    }

    pub fn add_to_search(&mut self, ch: char) {
        self.search.query.push(ch);
        self.notes_view.selected = 0;
        self.notes_move_selection(0);
    }

    pub fn remove_from_search(&mut self) {
        self.search.query.pop();
        self.notes_move_selection(0);
    }

    pub fn copy_selected_note(&mut self) {
        let Some(note) = self.selected_note() else {
            self.set_status_message("No note selected".to_string());
            return;
        };
        let text = clipboard_text(note);
        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
            Ok(()) => self.set_status_message("Copied to clipboard".to_string()),
            Err(e) => self.set_status_message(format!("Failed to copy to clipboard: {}", e)),
        }
    }

    // Budget

    pub fn budget_rows(&self) -> Vec<CategorySpending> {
        budget::category_table(
            &self.config.categories,
            &self.expenses,
            &self.budgets,
            utils::today(),
            self.config.warning_threshold_percent,
        )
    }

    pub fn sorted_expenses(&self) -> Vec<&Expense> {
        budget::recent_expenses(&self.expenses, self.expenses.len())
    }

    pub fn selected_category(&self) -> Option<String> {
        self.budget_rows()
            .into_iter()
            .nth(self.budget_view.category_index)
            .map(|row| row.category)
    }

    pub fn selected_expense(&self) -> Option<&Expense> {
        self.sorted_expenses().get(self.budget_view.expense_index).copied()
    }

    pub fn budget_for(&self, category: &str) -> Option<&Budget> {
        self.budgets.iter().find(|b| b.category == category)
    }

    pub fn toggle_budget_pane(&mut self) {
        self.budget_view.pane = match self.budget_view.pane {
            BudgetPane::Categories => BudgetPane::Expenses,
            BudgetPane::Expenses => BudgetPane::Categories,
        };
    }

    pub fn budget_move_selection(&mut self, delta: isize) {
        match self.budget_view.pane {
            BudgetPane::Categories => {
                let len = self.budget_rows().len();
                self.budget_view.category_index = step(self.budget_view.category_index, delta, len);
            }
            BudgetPane::Expenses => {
                let len = self.expenses.len();
                self.budget_view.expense_index = step(self.budget_view.expense_index, delta, len);
            }
        }
    }

    /// Open the limits form for the highlighted category
    pub fn open_budget_form(&mut self) {
        let Some(category) = self.selected_category() else {
            self.set_status_message("No category selected".to_string());
            return;
        };
        let form = ItemForm::budget(self.budget_for(&category), &category, &self.config);
        self.open_form(form);
    }

    // Forms

    fn open_form(&mut self, form: ItemForm) {
        self.form.form = Some(form);
        self.mode = Mode::Form;
    }

    pub fn close_form(&mut self) {
        self.form.form = None;
        self.mode = Mode::View;
    }

    pub fn open_create_form(&mut self) {
        let form = match self.current_tab {
            Tab::Today => ItemForm::task(None, TaskStatus::Todo),
            Tab::Tasks => {
                let status = TaskStatus::from_column_index(self.board.column).unwrap_or_default();
                ItemForm::task(None, status)
            }
            Tab::Calendar => ItemForm::time_block(None, self.cursor_slot_start(), &self.config),
            Tab::Notes => ItemForm::note(None),
            Tab::Budget => ItemForm::expense(None, &self.config),
        };
        self.open_form(form);
    }

    pub fn open_edit_form(&mut self) {
        let form = match self.current_tab {
            Tab::Today => None,
            Tab::Tasks => self.selected_task().map(|t| ItemForm::task(Some(t), t.status)),
            Tab::Calendar => self
                .selected_block()
                .map(|b| ItemForm::time_block(Some(b), b.start_time, &self.config)),
            Tab::Notes => self.selected_note().map(|n| ItemForm::note(Some(n))),
            Tab::Budget => match self.budget_view.pane {
                BudgetPane::Categories => {
                    self.open_budget_form();
                    return;
                }
                BudgetPane::Expenses => self.selected_expense().map(|e| ItemForm::expense(Some(e), &self.config)),
            },
        };
        match form {
            Some(form) => self.open_form(form),
            None => self.set_status_message("Nothing selected to edit".to_string()),
        }
    }

    /// Validate and submit the open form. Validation problems keep the form open.
    pub fn save_form(&mut self) {
        let Some(form) = self.form.form.as_ref() else {
            return;
        };
        let submission = match form.submission(&self.config) {
            Ok(submission) => submission,
            Err(message) => {
                self.set_status_message(message);
                return;
            }
        };
        match self.apply_submission(submission) {
            Ok(message) => {
                self.close_form();
                self.reload();
                self.set_status_message(message);
            }
            Err(e) => self.report_failure("save", e),
        }
    }

    fn apply_submission(&mut self, submission: FormSubmission) -> Result<String, ServiceError> {
        let backend = self.backend.as_mut();
        Ok(match submission {
            FormSubmission::CreateTask(draft) => {
                format!("Created task '{}'", TaskService::new(backend).create(draft)?.title)
            }
            FormSubmission::UpdateTask(id, patch) => {
                format!("Updated task '{}'", TaskService::new(backend).update(id, patch)?.title)
            }
            FormSubmission::CreateTimeBlock(draft) => {
                format!("Created block '{}'", TimeBlockService::new(backend).create(draft)?.title)
            }
            FormSubmission::UpdateTimeBlock(id, patch) => {
                format!("Updated block '{}'", TimeBlockService::new(backend).update(id, patch)?.title)
            }
            FormSubmission::CreateNote(draft) => {
                format!("Created note '{}'", NoteService::new(backend).create(draft)?.title)
            }
            FormSubmission::UpdateNote(id, patch) => {
                format!("Updated note '{}'", NoteService::new(backend).update(id, patch)?.title)
            }
            FormSubmission::CreateExpense(draft) => {
                let expense = ExpenseService::new(backend).create(draft)?;
                format!("Added {:.2} to {}", expense.amount, expense.category)
            }
            FormSubmission::UpdateExpense(id, patch) => {
                let expense = ExpenseService::new(backend).update(id, patch)?;
                format!("Updated {} expense", expense.category)
            }
            FormSubmission::CreateBudget(draft) => {
                format!("Set budget for {}", BudgetService::new(backend).create(draft)?.category)
            }
            FormSubmission::UpdateBudget(id, patch) => {
                format!("Updated budget for {}", BudgetService::new(backend).update(id, patch)?.category)
            }
        })
    }

    // Delete confirmation

    pub fn selected_item(&self) -> Option<SelectedItem> {
        match self.current_tab {
            Tab::Today => None,
            Tab::Tasks => self.selected_task().cloned().map(SelectedItem::Task),
            Tab::Calendar => self.selected_block().cloned().map(SelectedItem::TimeBlock),
            Tab::Notes => self.selected_note().cloned().map(SelectedItem::Note),
            Tab::Budget => match self.budget_view.pane {
                BudgetPane::Categories => self
                    .selected_category()
                    .and_then(|category| self.budget_for(&category).cloned())
                    .map(SelectedItem::Budget),
                BudgetPane::Expenses => self.selected_expense().cloned().map(SelectedItem::Expense),
            },
        }
    }

    pub fn request_delete(&mut self) {
        match self.selected_item() {
            Some(item) => {
                self.modals.delete_confirmation = Some(item);
                self.modals.delete_modal_selection = 0;
            }
            None => self.set_status_message("Nothing selected to delete".to_string()),
        }
    }

    pub fn toggle_delete_selection(&mut self) {
        self.modals.delete_modal_selection = 1 - cmp::min(self.modals.delete_modal_selection, 1);
    }

    pub fn cancel_delete(&mut self) {
        self.modals.delete_confirmation = None;
    }

    /// Run the option highlighted in the delete modal
    pub fn confirm_delete(&mut self) {
        let Some(item) = self.modals.delete_confirmation.take() else {
            return;
        };
        if self.modals.delete_modal_selection != 0 {
            return;
        }
        match self.delete_record(&item) {
            Ok(_) => {
                self.reload();
                self.set_status_message(format!("Deleted {} '{}'", item.kind(), item.label()));
            }
            Err(e) => self.report_failure("delete", e),
        }
    }

    fn delete_record(&mut self, item: &SelectedItem) -> Result<bool, ServiceError> {
        let backend = self.backend.as_mut();
        match item {
            SelectedItem::Task(task) => TaskService::new(backend).delete(task.id),
            SelectedItem::TimeBlock(block) => TimeBlockService::new(backend).delete(block.id),
            SelectedItem::Note(note) => NoteService::new(backend).delete(note.id),
            SelectedItem::Expense(expense) => ExpenseService::new(backend).delete(expense.id),
            SelectedItem::Budget(budget) => BudgetService::new(backend).delete(budget.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NoteDraft, TaskDraft, TimeBlockDraft, parse_tags};
    use crate::store::MemoryBackend;
    use crate::tui::forms::FieldKey;
    use crate::tui::widgets::editor::Editor;

    fn app_with(backend: MemoryBackend) -> App {
        App::new(Config::default(), Box::new(backend)).unwrap()
    }

    fn backend_with_tasks() -> MemoryBackend {
        let mut backend = MemoryBackend::new();
        let mut service = TaskService::new(&mut backend);
        for title in ["Write", "Review"] {
            service
                .create(TaskDraft { title: title.to_string(), ..TaskDraft::default() })
                .unwrap();
        }
        backend
    }

    #[test]
    fn tabs_wrap_around() {
        assert_eq!(Tab::Today.previous(), Tab::Budget);
        assert_eq!(Tab::Budget.next(), Tab::Today);
        assert_eq!(Tab::Calendar.index(), 2);
    }

    #[test]
    fn moving_a_task_updates_board_and_storage() {
        let mut app = app_with(backend_with_tasks());
        app.switch_tab(Tab::Tasks);
        app.board_move_row(1);
        let id = app.selected_task().unwrap().id;

        app.move_selected_task(1);

        assert_eq!(app.board.column, 1);
        assert_eq!(app.selected_task().unwrap().id, id);
        let stored = TaskService::new(app.backend.as_mut()).get_by_id(id).unwrap();
        assert_eq!(stored.status, TaskStatus::InProgress);
    }

    #[test]
    fn moving_past_the_last_lane_does_nothing() {
        let mut app = app_with(backend_with_tasks());
        app.move_selected_task(-1);
        assert!(app.tasks.iter().all(|t| t.status == TaskStatus::Todo));
    }

    #[test]
    fn grab_and_drop_reschedules_a_block() {
        let day = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        let mut backend = MemoryBackend::new();
        let block = TimeBlockService::new(&mut backend)
            .create(TimeBlockDraft {
                title: "Focus".to_string(),
                start_time: day.and_hms_opt(9, 30, 0).unwrap(),
                end_time: day.and_hms_opt(10, 45, 0).unwrap(),
                category: "Work".to_string(),
                color: None,
                reminder: None,
            })
            .unwrap();
        let mut app = app_with(backend);
        app.calendar.week_of = day;
        app.calendar.day = day.weekday().num_days_from_sunday() as usize;
        app.calendar.hour = 9;

        app.toggle_grab();
        assert_eq!(app.calendar.grabbed, Some(block.id));
        app.calendar_move_day(1);
        app.calendar_move_hour(5);
        app.toggle_grab();

        assert_eq!(app.calendar.grabbed, None);
        let stored = TimeBlockService::new(app.backend.as_mut()).get_by_id(block.id).unwrap();
        let next_day = day.succ_opt().unwrap();
        assert_eq!(stored.start_time, next_day.and_hms_opt(14, 0, 0).unwrap());
        assert_eq!(stored.end_time, next_day.and_hms_opt(15, 15, 0).unwrap());
        assert_eq!(app.blocks[0].start_time, stored.start_time);
    }

    #[test]
    fn calendar_cursor_rolls_into_next_week() {
        let mut app = app_with(MemoryBackend::new());
        let saturday = NaiveDate::from_ymd_opt(2024, 4, 6).unwrap();
        app.calendar.week_of = saturday;
        app.calendar.day = 6;
        app.calendar_move_day(1);
        assert_eq!(app.cursor_day(), NaiveDate::from_ymd_opt(2024, 4, 7).unwrap());
        app.calendar_move_hour(100);
        assert_eq!(app.calendar.hour, 23);
    }

    #[test]
    fn invalid_form_stays_open() {
        let mut app = app_with(MemoryBackend::new());
        app.switch_tab(Tab::Notes);
        app.open_create_form();
        app.save_form();
        assert_eq!(app.mode, Mode::Form);
        assert!(app.status.message.as_deref().unwrap().contains("Title"));
    }

    #[test]
    fn saving_a_form_creates_the_record() {
        let mut app = app_with(MemoryBackend::new());
        app.switch_tab(Tab::Notes);
        app.open_create_form();
        let form = app.form.form.as_mut().unwrap();
        form.current = form.fields.iter().position(|f| f.key == FieldKey::Title).unwrap();
        *form.current_editor().unwrap() = Editor::from_string("Standup");
        app.save_form();

        assert_eq!(app.mode, Mode::View);
        assert_eq!(app.notes.len(), 1);
        assert_eq!(app.selected_note().unwrap().title, "Standup");
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut backend = MemoryBackend::new();
        NoteService::new(&mut backend)
            .create(NoteDraft { title: "Old".to_string(), ..NoteDraft::default() })
            .unwrap();
        let mut app = app_with(backend);
        app.switch_tab(Tab::Notes);

        app.request_delete();
        app.toggle_delete_selection();
        app.confirm_delete();
        assert_eq!(app.notes.len(), 1);

        app.request_delete();
        app.confirm_delete();
        assert!(app.notes.is_empty());
        assert!(app.modals.delete_confirmation.is_none());
    }

    #[test]
    fn tag_filter_cycles_back_to_all() {
        let mut backend = MemoryBackend::new();
        let mut service = NoteService::new(&mut backend);
        for (title, tags) in [("a", "work"), ("b", "home, work")] {
            service
                .create(NoteDraft { title: title.to_string(), tags: parse_tags(tags), ..NoteDraft::default() })
                .unwrap();
        }
        let mut app = app_with(backend);

        app.cycle_tag_filter();
        assert_eq!(app.notes_view.tag_filter.as_deref(), Some("home"));
        assert_eq!(app.filtered_notes().len(), 1);
        app.cycle_tag_filter();
        assert_eq!(app.notes_view.tag_filter.as_deref(), Some("work"));
        app.cycle_tag_filter();
        assert_eq!(app.notes_view.tag_filter, None);
        assert_eq!(app.filtered_notes().len(), 2);
    }

    #[test]
    fn search_narrows_and_cancel_restores() {
        let mut backend = MemoryBackend::new();
        let mut service = NoteService::new(&mut backend);
        for title in ["Rust", "Groceries"] {
            service
                .create(NoteDraft { title: title.to_string(), ..NoteDraft::default() })
                .unwrap();
        }
        let mut app = app_with(backend);
        app.enter_search_mode();
        for ch in "gro".chars() {
            app.add_to_search(ch);
        }
        assert_eq!(app.selected_note().unwrap().title, "Groceries");
        app.cancel_search();
        assert_eq!(app.filtered_notes().len(), 2);
    }

    #[test]
    fn budget_form_targets_selected_category() {
        let mut app = app_with(MemoryBackend::new());
        app.switch_tab(Tab::Budget);
        app.budget_move_selection(1);
        assert_eq!(app.selected_category().as_deref(), Some("Personal"));

        app.open_budget_form();
        let form = app.form.form.as_mut().unwrap();
        for (key, value) in [(FieldKey::DailyLimit, "15"), (FieldKey::MonthlyLimit, "300")] {
            form.current = form.fields.iter().position(|f| f.key == key).unwrap();
            *form.current_editor().unwrap() = Editor::from_string(value);
        }
        app.save_form();

        let budget = app.budget_for("Personal").unwrap();
        assert_eq!(budget.daily_limit, 15.0);
        assert_eq!(budget.monthly_limit, 300.0);
    }

    #[test]
    fn copied_markdown_keeps_angle_brackets() {
        let now = chrono::Utc::now();
        let mut note = Note {
            id: 1,
            title: "Runbook".to_string(),
            content: "Remember: x < 3 retries, then escalate".to_string(),
            tags: parse_tags(""),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(clipboard_text(&note), "# Runbook\n\nRemember: x < 3 retries, then escalate");

        note.content = "<p>Legacy <b>note</b></p>".to_string();
        assert_eq!(clipboard_text(&note), "# Runbook\n\nLegacy note");
    }
}
