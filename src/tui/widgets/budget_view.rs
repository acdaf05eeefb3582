use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Gauge, List, ListItem, ListState, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use crate::config::Config;
use crate::models::Expense;
use crate::tui::app::{BudgetPane, BudgetState};
use crate::tui::widgets::color::{band_color, get_contrast_text_color, parse_color};
use crate::utils::{format_date, format_money};
use crate::views::{BudgetSummary, CategorySpending};

/// Gauge ratio for a percentage; overspend pins the bar at full
pub fn gauge_ratio(percentage: f64) -> f64 {
    if percentage.is_finite() {
        (percentage / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Today's total against the summed daily limits, with month-to-date and
/// the biggest categories underneath
pub fn render_spending_gauge(f: &mut Frame, area: Rect, summary: &BudgetSummary, config: &Config) {
    let theme = config.get_active_theme();
    let base = Style::default().fg(parse_color(&theme.fg));
    let symbol = config.currency_symbol.as_str();

    let outer = Block::default().borders(Borders::ALL).title("Spending Today");
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let parts = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(inner);

    let bar_color = band_color(summary.band, &theme);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(bar_color).bg(parse_color(&theme.bg)))
        .ratio(gauge_ratio(summary.progress_percentage))
        .label(format!(
            "{} / {} ({:.0}%)",
            format_money(symbol, summary.today_spending),
            format_money(symbol, summary.total_daily_limit),
            summary.progress_percentage
        ));
    f.render_widget(gauge, parts[0]);

    let mut lines = Vec::new();
    match summary.over_by() {
        Some(over) => lines.push(Line::from(Span::styled(
            format!("Over budget by {}", format_money(symbol, over)),
            Style::default().fg(band_color(summary.band, &theme)).add_modifier(Modifier::BOLD),
        ))),
        None => lines.push(Line::from(Span::styled(
            format!("{} left today · {}", format_money(symbol, summary.remaining()), summary.band.label()),
            base,
        ))),
    }
    lines.push(Line::from(vec![
        Span::styled("Month: ", base),
        Span::styled(
            format!(
                "{} / {} ({:.0}%)",
                format_money(symbol, summary.month_spending),
                format_money(symbol, summary.total_monthly_limit),
                summary.month_percentage
            ),
            Style::default().fg(band_color(summary.month_band, &theme)),
        ),
    ]));
    for category in summary.top_categories(3) {
        lines.push(Line::from(vec![
            Span::styled("● ", Style::default().fg(band_color(category.band, &theme))),
            Span::styled(
                format!("{} {}", category.category, format_money(symbol, category.amount)),
                base,
            ),
        ]));
    }
    f.render_widget(Paragraph::new(lines), parts[1]);
}

fn limit_text(symbol: &str, row: &CategorySpending) -> String {
    if row.limit > 0.0 { format_money(symbol, row.limit) } else { "-".to_string() }
}

pub fn render_budget(
    f: &mut Frame,
    area: Rect,
    summary: &BudgetSummary,
    rows: &[CategorySpending],
    expenses: &[&Expense],
    state: &BudgetState,
    config: &Config,
) {
    let theme = config.get_active_theme();
    let base = Style::default().fg(parse_color(&theme.fg));
    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight = Style::default()
        .bg(highlight_bg)
        .fg(get_contrast_text_color(highlight_bg))
        .add_modifier(Modifier::BOLD);
    let symbol = config.currency_symbol.as_str();

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(5)])
        .split(area);
    let body = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).split(vertical[1]);

    render_spending_gauge(f, vertical[0], summary, config);

    // Category table
    let table_rows: Vec<Row> = rows
        .iter()
        .map(|row| {
            let band_style = Style::default().fg(band_color(row.band, &theme));
            Row::new(vec![
                Cell::from(row.category.clone()),
                Cell::from(format_money(symbol, row.amount)),
                Cell::from(limit_text(symbol, row)),
                Cell::from(format!("{:.0}%", row.percentage)).style(band_style),
                Cell::from(row.band.label()).style(band_style),
            ])
        })
        .collect();
    let categories_active = state.pane == BudgetPane::Categories;
    let table = Table::new(
        table_rows,
        [
            Constraint::Min(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(12),
        ],
    )
    .header(Row::new(vec!["Category", "Today", "Limit", "%", "Status"]).style(base.add_modifier(Modifier::BOLD)))
    .block(Block::default().borders(Borders::ALL).title(if categories_active { "» Categories" } else { "Categories" }))
    .style(base)
    .row_highlight_style(if categories_active { highlight } else { base.add_modifier(Modifier::REVERSED) });
    let mut table_state = TableState::default();
    if !rows.is_empty() {
        table_state.select(Some(state.category_index));
    }
    f.render_stateful_widget(table, body[0], &mut table_state);

    // Expense list
    let items: Vec<ListItem> = if expenses.is_empty() {
        vec![ListItem::new("No expenses yet")]
    } else {
        expenses
            .iter()
            .map(|expense| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{} ", format_date(expense.date)), base.add_modifier(Modifier::DIM)),
                    Span::styled(format!("{:>9} ", format_money(symbol, expense.amount)), base),
                    Span::styled(format!("{} ", expense.category), Style::default().fg(parse_color(&config.category_color(&expense.category)))),
                    Span::styled(expense.description.clone(), base),
                ]))
            })
            .collect()
    };
    let expenses_active = state.pane == BudgetPane::Expenses;
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(if expenses_active { "» Expenses" } else { "Expenses" }))
        .style(base)
        .highlight_style(if expenses_active { highlight } else { base });
    let mut list_state = ListState::default();
    if !expenses.is_empty() {
        list_state.select(Some(state.expense_index));
    }
    f.render_stateful_widget(list, body[1], &mut list_state);
}
