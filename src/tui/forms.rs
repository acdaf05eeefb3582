//! Create/edit forms. A form is a list of fields; submitting it validates the
//! input and produces the draft or patch the matching service expects.

use chrono::{Duration, NaiveDateTime};

use crate::config::Config;
use crate::models::{
    Budget, BudgetDraft, BudgetPatch, EntityKind, Expense, ExpenseDraft, ExpensePatch, Note, NoteDraft,
    NotePatch, Priority, Task, TaskDraft, TaskPatch, TaskStatus, TimeBlock, TimeBlockDraft, TimeBlockPatch,
    format_tags, parse_tags,
};
use crate::services::expenses::DEFAULT_EXPENSE_CATEGORY;
use crate::tui::widgets::editor::Editor;
use crate::utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey {
    Title,
    Description,
    Priority,
    Status,
    DueDate,
    Start,
    End,
    Category,
    Color,
    Reminder,
    Tags,
    Content,
    Amount,
    Date,
    DailyLimit,
    MonthlyLimit,
}

impl FieldKey {
    pub fn label(&self) -> &'static str {
        match self {
            FieldKey::Title => "Title",
            FieldKey::Description => "Description",
            FieldKey::Priority => "Priority",
            FieldKey::Status => "Status",
            FieldKey::DueDate => "Due Date (YYYY-MM-DD)",
            FieldKey::Start => "Start (YYYY-MM-DD HH:MM)",
            FieldKey::End => "End (YYYY-MM-DD HH:MM)",
            FieldKey::Category => "Category",
            FieldKey::Color => "Color (empty = category color)",
            FieldKey::Reminder => "Reminder",
            FieldKey::Tags => "Tags (comma separated)",
            FieldKey::Content => "Content (markdown)",
            FieldKey::Amount => "Amount",
            FieldKey::Date => "Date (YYYY-MM-DD)",
            FieldKey::DailyLimit => "Daily Limit",
            FieldKey::MonthlyLimit => "Monthly Limit",
        }
    }
}

#[derive(Debug, Clone)]
pub enum FieldInput {
    Text { editor: Editor, multi_line: bool },
    Choice { options: Vec<String>, selected: usize },
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub key: FieldKey,
    pub input: FieldInput,
}

impl FormField {
    fn text(key: FieldKey, value: &str) -> Self {
        Self { key, input: FieldInput::Text { editor: Editor::from_string(value), multi_line: false } }
    }

    fn multi_line(key: FieldKey, value: &str) -> Self {
        Self { key, input: FieldInput::Text { editor: Editor::from_string(value), multi_line: true } }
    }

    fn choice(key: FieldKey, options: Vec<String>, current: &str) -> Self {
        let selected = options.iter().position(|o| o == current).unwrap_or(0);
        Self { key, input: FieldInput::Choice { options, selected } }
    }

    pub fn is_multi_line(&self) -> bool {
        matches!(self.input, FieldInput::Text { multi_line: true, .. })
    }

    /// Text content, or the selected option for a choice field
    pub fn value(&self) -> String {
        match &self.input {
            FieldInput::Text { editor, .. } => editor.text(),
            FieldInput::Choice { options, selected } => options.get(*selected).cloned().unwrap_or_default(),
        }
    }
}

/// What saving a form asks the services to do
#[derive(Debug, Clone)]
pub enum FormSubmission {
    CreateTask(TaskDraft),
    UpdateTask(i64, TaskPatch),
    CreateTimeBlock(TimeBlockDraft),
    UpdateTimeBlock(i64, TimeBlockPatch),
    CreateNote(NoteDraft),
    UpdateNote(i64, NotePatch),
    CreateExpense(ExpenseDraft),
    UpdateExpense(i64, ExpensePatch),
    CreateBudget(BudgetDraft),
    UpdateBudget(i64, BudgetPatch),
}

#[derive(Debug, Clone)]
pub struct ItemForm {
    pub kind: EntityKind,
    /// `None` while creating
    pub editing_id: Option<i64>,
    pub fields: Vec<FormField>,
    pub current: usize,
}

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

fn with_current(categories: &[String], current: &str) -> Vec<String> {
    let mut options = categories.to_vec();
    if !current.is_empty() && !options.iter().any(|c| c == current) {
        options.push(current.to_string());
    }
    options
}

impl ItemForm {
    fn new(kind: EntityKind, editing_id: Option<i64>, fields: Vec<FormField>) -> Self {
        Self { kind, editing_id, fields, current: 0 }
    }

    pub fn title(&self) -> String {
        let verb = if self.editing_id.is_some() { "Edit" } else { "New" };
        let kind = self.kind.as_str();
        let mut chars = kind.chars();
        let capitalized: String = chars
            .next()
            .map(|c| c.to_uppercase().chain(chars).collect())
            .unwrap_or_default();
        format!("{} {}", verb, capitalized)
    }

    pub fn task(existing: Option<&Task>, default_status: TaskStatus) -> Self {
        let task = existing.cloned().unwrap_or(Task { status: default_status, ..Task::default() });
        let priorities = Priority::ALL.iter().map(|p| p.to_string()).collect();
        let statuses = TaskStatus::ALL.iter().map(|s| s.to_string()).collect();
        Self::new(
            EntityKind::Task,
            existing.map(|t| t.id),
            vec![
                FormField::text(FieldKey::Title, &task.title),
                FormField::multi_line(FieldKey::Description, &task.description),
                FormField::choice(FieldKey::Priority, priorities, task.priority.as_str()),
                FormField::choice(FieldKey::Status, statuses, task.status.as_str()),
                FormField::text(FieldKey::DueDate, &task.due_date.map(utils::format_date).unwrap_or_default()),
            ],
        )
    }

    /// New blocks default to one hour starting at `start`
    pub fn time_block(existing: Option<&TimeBlock>, start: NaiveDateTime, config: &Config) -> Self {
        let (title, start, end, category, color, reminder) = match existing {
            Some(b) => (b.title.clone(), b.start_time, b.end_time, b.category.clone(), b.color.clone(), b.reminder),
            None => {
                let category = config.categories.first().cloned().unwrap_or_else(|| "Work".to_string());
                (String::new(), start, start + Duration::hours(1), category, String::new(), false)
            }
        };
        let minutes = |t: NaiveDateTime| t.format("%Y-%m-%d %H:%M").to_string();
        Self::new(
            EntityKind::TimeBlock,
            existing.map(|b| b.id),
            vec![
                FormField::text(FieldKey::Title, &title),
                FormField::text(FieldKey::Start, &minutes(start)),
                FormField::text(FieldKey::End, &minutes(end)),
                FormField::choice(FieldKey::Category, with_current(&config.categories, &category), &category),
                FormField::text(FieldKey::Color, &color),
                FormField::choice(FieldKey::Reminder, vec!["No".to_string(), "Yes".to_string()], yes_no(reminder)),
            ],
        )
    }

    pub fn note(existing: Option<&Note>) -> Self {
        let (title, tags, content) = match existing {
            Some(n) => (n.title.clone(), format_tags(&n.tags), n.content.clone()),
            None => Default::default(),
        };
        Self::new(
            EntityKind::Note,
            existing.map(|n| n.id),
            vec![
                FormField::text(FieldKey::Title, &title),
                FormField::text(FieldKey::Tags, &tags),
                FormField::multi_line(FieldKey::Content, &content),
            ],
        )
    }

    pub fn expense(existing: Option<&Expense>, config: &Config) -> Self {
        let (amount, category, description, date) = match existing {
            Some(e) => (format!("{:.2}", e.amount), e.category.clone(), e.description.clone(), utils::format_date(e.date)),
            None => (
                String::new(),
                DEFAULT_EXPENSE_CATEGORY.to_string(),
                String::new(),
                utils::format_date(utils::today()),
            ),
        };
        Self::new(
            EntityKind::Expense,
            existing.map(|e| e.id),
            vec![
                FormField::text(FieldKey::Amount, &amount),
                FormField::choice(FieldKey::Category, with_current(&config.categories, &category), &category),
                FormField::text(FieldKey::Description, &description),
                FormField::text(FieldKey::Date, &date),
            ],
        )
    }

    /// Budget form for `category`; edits the existing budget when there is one
    pub fn budget(existing: Option<&Budget>, category: &str, config: &Config) -> Self {
        let (category, daily, monthly) = match existing {
            Some(b) => (b.category.clone(), format!("{:.2}", b.daily_limit), format!("{:.2}", b.monthly_limit)),
            None => (category.to_string(), String::new(), String::new()),
        };
        Self::new(
            EntityKind::Budget,
            existing.map(|b| b.id),
            vec![
                FormField::choice(FieldKey::Category, with_current(&config.categories, &category), &category),
                FormField::text(FieldKey::DailyLimit, &daily),
                FormField::text(FieldKey::MonthlyLimit, &monthly),
            ],
        )
    }

    pub fn current_field(&self) -> Option<&FormField> {
        self.fields.get(self.current)
    }

    pub fn current_editor(&mut self) -> Option<&mut Editor> {
        match self.fields.get_mut(self.current).map(|f| &mut f.input) {
            Some(FieldInput::Text { editor, .. }) => Some(editor),
            _ => None,
        }
    }

    pub fn next_field(&mut self) {
        self.current = (self.current + 1) % self.fields.len().max(1);
    }

    pub fn previous_field(&mut self) {
        let len = self.fields.len().max(1);
        self.current = (self.current + len - 1) % len;
    }

    /// Step the current choice field; text fields ignore this
    pub fn cycle_choice(&mut self, forward: bool) {
        if let Some(FieldInput::Choice { options, selected }) = self.fields.get_mut(self.current).map(|f| &mut f.input) {
            let len = options.len().max(1);
            *selected = if forward { (*selected + 1) % len } else { (*selected + len - 1) % len };
        }
    }

    fn value(&self, key: FieldKey) -> String {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(FormField::value)
            .unwrap_or_default()
    }

    fn trimmed(&self, key: FieldKey) -> String {
        self.value(key).trim().to_string()
    }

    fn required(&self, key: FieldKey) -> Result<String, String> {
        let value = self.trimmed(key);
        if value.is_empty() {
            return Err(format!("{} is required", key.label()));
        }
        Ok(value)
    }

    fn amount(&self, key: FieldKey) -> Result<f64, String> {
        let raw = self.required(key)?;
        let amount: f64 = raw
            .trim_start_matches('$')
            .parse()
            .map_err(|_| format!("{} must be a number, got '{}'", key.label(), raw))?;
        if amount < 0.0 {
            return Err(format!("{} cannot be negative", key.label()));
        }
        Ok(amount)
    }

    fn date(&self, key: FieldKey) -> Result<Option<chrono::NaiveDate>, String> {
        let raw = self.trimmed(key);
        if raw.is_empty() {
            return Ok(None);
        }
        utils::parse_date(&raw)
            .map(Some)
            .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", raw))
    }

    fn datetime(&self, key: FieldKey) -> Result<NaiveDateTime, String> {
        let raw = self.required(key)?;
        utils::parse_datetime(&raw).map_err(|_| format!("Invalid time '{}', expected YYYY-MM-DD HH:MM", raw))
    }

    /// Validate every field and build the service call
    pub fn submission(&self, config: &Config) -> Result<FormSubmission, String> {
        match self.kind {
            EntityKind::Task => {
                let title = self.required(FieldKey::Title)?;
                let description = self.value(FieldKey::Description);
                let priority: Priority = self.value(FieldKey::Priority).parse().map_err(|e| format!("{}", e))?;
                let status: TaskStatus = self.value(FieldKey::Status).parse().map_err(|e| format!("{}", e))?;
                let due_date = self.date(FieldKey::DueDate)?;
                Ok(match self.editing_id {
                    Some(id) => FormSubmission::UpdateTask(
                        id,
                        TaskPatch {
                            title: Some(title),
                            description: Some(description),
                            priority: Some(priority),
                            status: Some(status),
                            due_date: Some(due_date),
                        },
                    ),
                    None => FormSubmission::CreateTask(TaskDraft {
                        title,
                        description,
                        priority: Some(priority),
                        status: Some(status),
                        due_date,
                    }),
                })
            }
            EntityKind::TimeBlock => {
                let title = self.required(FieldKey::Title)?;
                let start_time = self.datetime(FieldKey::Start)?;
                let end_time = self.datetime(FieldKey::End)?;
                if end_time <= start_time {
                    return Err("End must be after start".to_string());
                }
                let category = self.required(FieldKey::Category)?;
                let color = match self.trimmed(FieldKey::Color) {
                    color if color.is_empty() => config.category_color(&category),
                    color => color,
                };
                let reminder = self.value(FieldKey::Reminder) == "Yes";
                Ok(match self.editing_id {
                    Some(id) => FormSubmission::UpdateTimeBlock(
                        id,
                        TimeBlockPatch {
                            title: Some(title),
                            start_time: Some(start_time),
                            end_time: Some(end_time),
                            category: Some(category),
                            color: Some(color),
                            reminder: Some(reminder),
                        },
                    ),
                    None => FormSubmission::CreateTimeBlock(TimeBlockDraft {
                        title,
                        start_time,
                        end_time,
                        category,
                        color: Some(color),
                        reminder: Some(reminder),
                    }),
                })
            }
            EntityKind::Note => {
                let title = self.required(FieldKey::Title)?;
                let tags = parse_tags(&self.value(FieldKey::Tags));
                let content = self.value(FieldKey::Content);
                Ok(match self.editing_id {
                    Some(id) => FormSubmission::UpdateNote(
                        id,
                        NotePatch { title: Some(title), content: Some(content), tags: Some(tags) },
                    ),
                    None => FormSubmission::CreateNote(NoteDraft { title, content, tags, ..NoteDraft::default() }),
                })
            }
            EntityKind::Expense => {
                let amount = self.amount(FieldKey::Amount)?;
                let category = self.required(FieldKey::Category)?;
                let description = self.trimmed(FieldKey::Description);
                let date = self.date(FieldKey::Date)?;
                Ok(match self.editing_id {
                    Some(id) => FormSubmission::UpdateExpense(
                        id,
                        ExpensePatch {
                            amount: Some(amount),
                            category: Some(category),
                            description: Some(description),
                            date,
                        },
                    ),
                    None => FormSubmission::CreateExpense(ExpenseDraft {
                        amount,
                        category: Some(category),
                        description,
                        date,
                    }),
                })
            }
            EntityKind::Budget => {
                let category = self.required(FieldKey::Category)?;
                let daily_limit = self.amount(FieldKey::DailyLimit)?;
                let monthly_limit = self.amount(FieldKey::MonthlyLimit)?;
                Ok(match self.editing_id {
                    Some(id) => FormSubmission::UpdateBudget(
                        id,
                        BudgetPatch {
                            category: Some(category),
                            daily_limit: Some(daily_limit),
                            monthly_limit: Some(monthly_limit),
                        },
                    ),
                    None => FormSubmission::CreateBudget(BudgetDraft { category, daily_limit, monthly_limit }),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn type_into(form: &mut ItemForm, key: FieldKey, text: &str) {
        form.current = form.fields.iter().position(|f| f.key == key).unwrap();
        let editor = form.current_editor().unwrap();
        *editor = Editor::from_string(text);
    }

    #[test]
    fn task_form_requires_title() {
        let form = ItemForm::task(None, TaskStatus::Todo);
        assert_eq!(form.title(), "New Task");
        assert!(form.submission(&Config::default()).unwrap_err().contains("Title"));
    }

    #[test]
    fn task_form_builds_draft() {
        let mut form = ItemForm::task(None, TaskStatus::InProgress);
        type_into(&mut form, FieldKey::Title, "Ship it");
        type_into(&mut form, FieldKey::DueDate, "2024-04-02");
        match form.submission(&Config::default()).unwrap() {
            FormSubmission::CreateTask(draft) => {
                assert_eq!(draft.title, "Ship it");
                assert_eq!(draft.status, Some(TaskStatus::InProgress));
                assert_eq!(draft.priority, Some(Priority::Medium));
                assert_eq!(draft.due_date, NaiveDate::from_ymd_opt(2024, 4, 2));
            }
            other => panic!("unexpected submission {:?}", other),
        }
    }

    #[test]
    fn bad_date_is_reported() {
        let mut form = ItemForm::task(None, TaskStatus::Todo);
        type_into(&mut form, FieldKey::Title, "x");
        type_into(&mut form, FieldKey::DueDate, "tomorrow");
        assert!(form.submission(&Config::default()).unwrap_err().contains("tomorrow"));
    }

    #[test]
    fn block_form_fills_color_from_category() {
        let start = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap().and_hms_opt(9, 0, 0).unwrap();
        let config = Config::default();
        let mut form = ItemForm::time_block(None, start, &config);
        type_into(&mut form, FieldKey::Title, "Run");
        form.current = form.fields.iter().position(|f| f.key == FieldKey::Category).unwrap();
        while form.current_field().unwrap().value() != "Health" {
            form.cycle_choice(true);
        }
        match form.submission(&config).unwrap() {
            FormSubmission::CreateTimeBlock(draft) => {
                assert_eq!(draft.color.as_deref(), Some("#FF6B6B"));
                assert_eq!(draft.end_time - draft.start_time, Duration::hours(1));
            }
            other => panic!("unexpected submission {:?}", other),
        }
    }

    #[test]
    fn negative_amount_is_rejected() {
        let config = Config::default();
        let mut form = ItemForm::expense(None, &config);
        type_into(&mut form, FieldKey::Amount, "-4");
        assert!(form.submission(&config).is_err());
        type_into(&mut form, FieldKey::Amount, "4.50");
        assert!(matches!(form.submission(&config), Ok(FormSubmission::CreateExpense(d)) if d.amount == 4.5));
    }

    #[test]
    fn editing_produces_a_patch() {
        let budget = Budget { id: 3, category: "Work".to_string(), daily_limit: 20.0, monthly_limit: 400.0 };
        let form = ItemForm::budget(Some(&budget), "Work", &Config::default());
        assert_eq!(form.title(), "Edit Budget");
        match form.submission(&Config::default()).unwrap() {
            FormSubmission::UpdateBudget(id, patch) => {
                assert_eq!(id, 3);
                assert_eq!(patch.daily_limit, Some(20.0));
            }
            other => panic!("unexpected submission {:?}", other),
        }
    }
}
