use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::Config;
use crate::models::{
    EntityKind, ExpenseDraft, NoteDraft, Priority, TaskDraft, TaskStatus, TimeBlockDraft, parse_tags,
};
use crate::services::{BudgetService, ExpenseService, NoteService, ServiceError, TaskService, TimeBlockService};
use crate::store::Backend;
use crate::utils::{self, format_datetime, format_money, parse_date, parse_datetime};
use crate::views::budget::BudgetSummary;
use crate::views::today::TodayOverview;

#[derive(Parser)]
#[command(name = "dayboard")]
#[command(about = "Dayboard - tasks, time blocks, notes and a budget in one terminal dashboard")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Add a task to the board
    AddTask {
        /// Task title
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Low, Medium or High
        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// Schedule a time block
    AddBlock {
        /// Block title
        title: String,
        /// Start (YYYY-MM-DD HH:MM)
        #[arg(long)]
        start: String,
        /// End (YYYY-MM-DD HH:MM)
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "Work")]
        category: String,
        /// Hex color, defaults to the category color
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        reminder: bool,
    },
    /// Quickly add a new note
    AddNote {
        /// Note title
        title: String,
        /// Note content (markdown)
        #[arg(long)]
        content: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Record an expense
    AddExpense {
        amount: f64,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Create or update a category budget
    SetBudget {
        category: String,
        #[arg(long)]
        daily: f64,
        #[arg(long)]
        monthly: f64,
    },
    /// Move a task to another board column
    MoveTask {
        id: String,
        /// "To Do", "In Progress" or "Done"
        #[arg(value_parser = parse_status)]
        status: TaskStatus,
    },
    /// Move a time block to another day and hour, keeping its length
    MoveBlock {
        id: String,
        /// Target day (YYYY-MM-DD)
        #[arg(long)]
        day: String,
        /// Target hour (0-23)
        #[arg(long)]
        hour: u32,
    },
    /// Delete a record: task, block, note, expense or budget
    Delete {
        #[arg(value_parser = parse_kind)]
        kind: EntityKind,
        id: String,
    },
    /// Print today's tasks, blocks and notes
    Today,
    /// Print today's spending against the budgets
    Budget,
}

fn parse_priority(input: &str) -> Result<Priority, String> {
    input.parse().map_err(|e: crate::models::ParseEnumError| e.to_string())
}

fn parse_status(input: &str) -> Result<TaskStatus, String> {
    input.parse().map_err(|e: crate::models::ParseEnumError| e.to_string())
}

fn parse_kind(input: &str) -> Result<EntityKind, String> {
    input.parse().map_err(|e: crate::models::ParseEnumError| e.to_string())
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
}

fn date_arg(input: &str) -> Result<NaiveDate, CliError> {
    parse_date(input).map_err(|e| CliError::DateParseError(format!("Invalid date format '{}': {}", input, e)))
}

fn datetime_arg(input: &str) -> Result<NaiveDateTime, CliError> {
    parse_datetime(input).map_err(|e| CliError::DateParseError(format!("Invalid date and time '{}': {}", input, e)))
}

/// Run a non-interactive command against the backend. `Tui` is handled by the caller.
pub fn run_command(command: Commands, backend: &mut dyn Backend, config: &Config) -> Result<(), CliError> {
    match command {
        Commands::Tui => Ok(()),
        Commands::AddTask { title, description, priority, due } => {
            handle_add_task(title, description, priority, due, backend)
        }
        Commands::AddBlock { title, start, end, category, color, reminder } => {
            handle_add_block(title, &start, &end, category, color, reminder, backend, config)
        }
        Commands::AddNote { title, content, tags } => handle_add_note(title, content, tags, backend),
        Commands::AddExpense { amount, category, description, date } => {
            handle_add_expense(amount, category, description, date, backend, config)
        }
        Commands::SetBudget { category, daily, monthly } => handle_set_budget(&category, daily, monthly, backend, config),
        Commands::MoveTask { id, status } => handle_move_task(&id, status, backend),
        Commands::MoveBlock { id, day, hour } => handle_move_block(&id, &day, hour, backend),
        Commands::Delete { kind, id } => handle_delete(kind, &id, backend),
        Commands::Today => {
            print!("{}", handle_today(backend)?);
            Ok(())
        }
        Commands::Budget => {
            print!("{}", handle_budget(backend, config)?);
            Ok(())
        }
    }
}

pub fn handle_add_task(
    title: String,
    description: Option<String>,
    priority: Option<Priority>,
    due: Option<String>,
    backend: &mut dyn Backend,
) -> Result<(), CliError> {
    let due_date = due.as_deref().map(date_arg).transpose()?;
    let task = TaskService::new(backend).create(TaskDraft {
        title,
        description: description.unwrap_or_default(),
        priority,
        status: None,
        due_date,
    })?;
    println!("Task created successfully (ID: {})", task.id);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn handle_add_block(
    title: String,
    start: &str,
    end: &str,
    category: String,
    color: Option<String>,
    reminder: bool,
    backend: &mut dyn Backend,
    config: &Config,
) -> Result<(), CliError> {
    let start_time = datetime_arg(start)?;
    let end_time = datetime_arg(end)?;
    if end_time <= start_time {
        return Err(ServiceError::Invalid("End must be after start".to_string()).into());
    }
    let color = color.or_else(|| Some(config.category_color(category.trim())));
    let block = TimeBlockService::new(backend).create(TimeBlockDraft {
        title,
        start_time,
        end_time,
        category,
        color,
        reminder: Some(reminder),
    })?;
    println!("Time block created successfully (ID: {})", block.id);
    Ok(())
}

pub fn handle_add_note(
    title: String,
    content: Option<String>,
    tags: Option<String>,
    backend: &mut dyn Backend,
) -> Result<(), CliError> {
    let note = NoteService::new(backend).create(NoteDraft {
        title,
        content: content.unwrap_or_default(),
        tags: tags.as_deref().map(parse_tags).unwrap_or_default(),
        ..NoteDraft::default()
    })?;
    println!("Note created successfully (ID: {})", note.id);
    Ok(())
}

pub fn handle_add_expense(
    amount: f64,
    category: Option<String>,
    description: Option<String>,
    date: Option<String>,
    backend: &mut dyn Backend,
    config: &Config,
) -> Result<(), CliError> {
    let date = date.as_deref().map(date_arg).transpose()?;
    let expense = ExpenseService::new(backend).create(ExpenseDraft {
        amount,
        category,
        description: description.unwrap_or_default(),
        date,
    })?;
    println!(
        "Expense recorded (ID: {}): {} in {}",
        expense.id,
        format_money(&config.currency_symbol, expense.amount),
        expense.category
    );
    Ok(())
}

pub fn handle_set_budget(
    category: &str,
    daily: f64,
    monthly: f64,
    backend: &mut dyn Backend,
    config: &Config,
) -> Result<(), CliError> {
    let budget = BudgetService::new(backend).set_limits(category, daily, monthly)?;
    println!(
        "Budget for {} set to {} per day, {} per month",
        budget.category,
        format_money(&config.currency_symbol, budget.daily_limit),
        format_money(&config.currency_symbol, budget.monthly_limit)
    );
    Ok(())
}

pub fn handle_move_task(id: &str, status: TaskStatus, backend: &mut dyn Backend) -> Result<(), CliError> {
    match TaskService::new(backend).move_to(id, status)? {
        Some(task) => println!("Moved '{}' to {}", task.title, task.status),
        None => println!("Task {} is already in {}", id.trim(), status),
    }
    Ok(())
}

pub fn handle_move_block(id: &str, day: &str, hour: u32, backend: &mut dyn Backend) -> Result<(), CliError> {
    let day = date_arg(day)?;
    let block = TimeBlockService::new(backend).reschedule(id, day, hour)?;
    println!(
        "Moved '{}' to {} - {}",
        block.title,
        format_datetime(block.start_time),
        format_datetime(block.end_time)
    );
    Ok(())
}

pub fn handle_delete(kind: EntityKind, id: &str, backend: &mut dyn Backend) -> Result<(), CliError> {
    match kind {
        EntityKind::Task => TaskService::new(backend).delete(id)?,
        EntityKind::TimeBlock => TimeBlockService::new(backend).delete(id)?,
        EntityKind::Note => NoteService::new(backend).delete(id)?,
        EntityKind::Expense => ExpenseService::new(backend).delete(id)?,
        EntityKind::Budget => BudgetService::new(backend).delete(id)?,
    };
    println!("Deleted {} {}", kind, id.trim());
    Ok(())
}

/// Plain-text rendition of the Today tab
pub fn handle_today(backend: &mut dyn Backend) -> Result<String, CliError> {
    let tasks = TaskService::new(&mut *backend).get_all()?;
    let blocks = TimeBlockService::new(&mut *backend).get_all()?;
    let notes = NoteService::new(&mut *backend).get_all()?;
    Ok(format_today(&TodayOverview::build(&tasks, &blocks, &notes, utils::now_local())))
}

pub fn format_today(overview: &TodayOverview) -> String {
    let mut out = format!("Today: {}\n", overview.now.format("%A, %B %-d, %Y"));

    match &overview.current_block {
        Some(block) => out.push_str(&format!("Now: {} (until {})\n", block.title, block.end_time.format("%H:%M"))),
        None => out.push_str("Now: free\n"),
    }
    if let Some(block) = &overview.next_block {
        out.push_str(&format!("Next: {} at {}\n", block.title, block.start_time.format("%H:%M")));
    }

    out.push_str(&format!(
        "\nTasks due today ({}/{} done, {:.0}%)\n",
        overview.stats.done,
        overview.stats.total,
        overview.stats.completion_percentage()
    ));
    if overview.tasks.is_empty() {
        out.push_str("  none\n");
    }
    for task in &overview.tasks {
        let mark = if task.status == TaskStatus::Done { "x" } else { " " };
        out.push_str(&format!("  [{}] {} ({})\n", mark, task.title, task.priority));
    }

    out.push_str("\nSchedule\n");
    if overview.blocks.is_empty() {
        out.push_str("  nothing scheduled\n");
    }
    for block in &overview.blocks {
        out.push_str(&format!(
            "  {}-{}  {} [{}]\n",
            block.start_time.format("%H:%M"),
            block.end_time.format("%H:%M"),
            block.title,
            block.category
        ));
    }

    if !overview.recent_notes.is_empty() {
        out.push_str("\nRecent notes\n");
        for note in &overview.recent_notes {
            out.push_str(&format!("  {}\n", note.title));
        }
    }
    out
}

/// Plain-text rendition of the budget summary
pub fn handle_budget(backend: &mut dyn Backend, config: &Config) -> Result<String, CliError> {
    let expenses = ExpenseService::new(&mut *backend).get_all()?;
    let budgets = BudgetService::new(&mut *backend).get_all()?;
    let summary = BudgetSummary::calculate(&expenses, &budgets, utils::today(), config.warning_threshold_percent);
    Ok(format_budget(&summary, config))
}

pub fn format_budget(summary: &BudgetSummary, config: &Config) -> String {
    let money = |amount: f64| format_money(&config.currency_symbol, amount);
    let mut out = format!(
        "Today: {} of {} ({:.1}%, {})\n",
        money(summary.today_spending),
        money(summary.total_daily_limit),
        summary.progress_percentage,
        summary.band.label()
    );
    match summary.over_by() {
        Some(over) => out.push_str(&format!("Over budget by {}\n", money(over))),
        None => out.push_str(&format!("Remaining: {}\n", money(summary.remaining()))),
    }
    out.push_str(&format!(
        "Month to date: {} of {} ({:.1}%, {})\n",
        money(summary.month_spending),
        money(summary.total_monthly_limit),
        summary.month_percentage,
        summary.month_band.label()
    ));
    if !summary.breakdown.is_empty() {
        out.push_str("\nBy category\n");
        for row in &summary.breakdown {
            out.push_str(&format!(
                "  {:<12} {:>10}  {:>6.1}%  {}\n",
                row.category,
                money(row.amount),
                row.percentage,
                row.band.label()
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Expense;
    use crate::store::MemoryBackend;

    #[test]
    fn subcommands_parse() {
        let cli = Cli::try_parse_from(["dayboard", "move-task", "3", "in progress"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::MoveTask { status: TaskStatus::InProgress, .. })));

        let cli = Cli::try_parse_from(["dayboard", "--dev", "delete", "block", "7"]).unwrap();
        assert!(cli.dev);
        assert!(matches!(cli.command, Some(Commands::Delete { kind: EntityKind::TimeBlock, .. })));

        assert!(Cli::try_parse_from(["dayboard", "move-task", "3", "later"]).is_err());
        assert!(Cli::try_parse_from(["dayboard"]).unwrap().command.is_none());
    }

    #[test]
    fn bad_ids_are_rejected_before_touching_storage() {
        let mut backend = MemoryBackend::new();
        let err = handle_move_task("abc", TaskStatus::Done, &mut backend).unwrap_err();
        assert!(matches!(err, CliError::Service(ServiceError::InvalidId { .. })));
        let err = handle_delete(EntityKind::Note, "0", &mut backend).unwrap_err();
        assert!(matches!(err, CliError::Service(ServiceError::InvalidId { .. })));
        let err = handle_delete(EntityKind::Note, "9", &mut backend).unwrap_err();
        assert!(matches!(err, CliError::Service(ServiceError::NotFound { .. })));
    }

    #[test]
    fn add_block_rejects_inverted_range() {
        let mut backend = MemoryBackend::new();
        let config = Config::default();
        let err = handle_add_block(
            "Standup".to_string(),
            "2024-04-02 10:00",
            "2024-04-02 09:00",
            "Work".to_string(),
            None,
            false,
            &mut backend,
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Service(ServiceError::Invalid(_))));
        assert!(matches!(
            handle_add_block("x".into(), "soon", "later", "Work".into(), None, false, &mut backend, &config),
            Err(CliError::DateParseError(_))
        ));
    }

    #[test]
    fn set_budget_updates_existing_category() {
        let mut backend = MemoryBackend::new();
        let config = Config::default();
        handle_set_budget("Work", 20.0, 400.0, &mut backend, &config).unwrap();
        handle_set_budget("Work", 25.0, 500.0, &mut backend, &config).unwrap();
        let budgets = BudgetService::new(&mut backend).get_all().unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].daily_limit, 25.0);
    }

    #[test]
    fn budget_report_flags_overspend() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        let expenses = vec![Expense {
            id: 1,
            amount: 30.0,
            category: "Work".to_string(),
            description: String::new(),
            date: today,
        }];
        let budgets = vec![crate::models::Budget {
            id: 1,
            category: "Work".to_string(),
            daily_limit: 20.0,
            monthly_limit: 400.0,
        }];
        let config = Config::default();
        let summary = BudgetSummary::calculate(&expenses, &budgets, today, config.warning_threshold_percent);
        let report = format_budget(&summary, &config);
        assert!(report.starts_with("Today: $30.00 of $20.00 (150.0%"));
        assert!(report.contains("Over budget by $10.00"));
    }

    #[test]
    fn budget_report_without_limits_is_not_over() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        let expenses = vec![Expense {
            id: 1,
            amount: 35.0,
            category: "Work".to_string(),
            description: String::new(),
            date: today,
        }];
        let config = Config::default();
        let summary = BudgetSummary::calculate(&expenses, &[], today, config.warning_threshold_percent);
        let report = format_budget(&summary, &config);
        assert!(report.starts_with("Today: $35.00 of $0.00 (0.0%, on track)"));
        assert!(!report.contains("Over budget"));
        assert!(!report.contains("$-0.00"));
    }
}
