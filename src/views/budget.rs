use chrono::{Datelike, NaiveDate};

use crate::models::{Budget, Expense};

/// Spending share above which a limit counts as "almost used up"
pub const DEFAULT_WARNING_PERCENT: f64 = 80.0;

/// How close spending is to its limit. Display only; spending is never blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendingBand {
    Normal,
    Warning,
    OverBudget,
}

impl SpendingBand {
    pub fn classify(percentage: f64, warning_threshold: f64) -> Self {
        if percentage > 100.0 {
            SpendingBand::OverBudget
        } else if percentage > warning_threshold {
            SpendingBand::Warning
        } else {
            SpendingBand::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SpendingBand::Normal => "on track",
            SpendingBand::Warning => "warning",
            SpendingBand::OverBudget => "over budget",
        }
    }
}

/// `spent / limit * 100`, or 0 when there is no limit
pub fn percentage_of(spent: f64, limit: f64) -> f64 {
    if limit > 0.0 { spent / limit * 100.0 } else { 0.0 }
}

pub fn today_spending(expenses: &[Expense], today: NaiveDate) -> f64 {
    expenses.iter().filter(|e| e.date == today).fold(0.0, |total, e| total + e.amount)
}

pub fn total_daily_limit(budgets: &[Budget]) -> f64 {
    budgets.iter().fold(0.0, |total, b| total + b.daily_limit)
}

pub fn total_monthly_limit(budgets: &[Budget]) -> f64 {
    budgets.iter().fold(0.0, |total, b| total + b.monthly_limit)
}

/// Spending from the first of `today`'s month up to and including `today`
pub fn month_to_date_spending(expenses: &[Expense], today: NaiveDate) -> f64 {
    expenses
        .iter()
        .filter(|e| e.date.year() == today.year() && e.date.month() == today.month() && e.date <= today)
        .fold(0.0, |total, e| total + e.amount)
}

pub fn daily_limit_for(budgets: &[Budget], category: &str) -> f64 {
    budgets
        .iter()
        .find(|b| b.category == category)
        .map(|b| b.daily_limit)
        .unwrap_or(0.0)
}

/// Today's spend per category, largest first. Ties keep first-seen order.
pub fn category_totals(expenses: &[Expense], today: NaiveDate) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    for expense in expenses.iter().filter(|e| e.date == today) {
        match totals.iter_mut().find(|(category, _)| *category == expense.category) {
            Some((_, amount)) => *amount += expense.amount,
            None => totals.push((expense.category.clone(), expense.amount)),
        }
    }
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    totals
}

/// One category's spend measured against its daily limit
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySpending {
    pub category: String,
    pub amount: f64,
    pub limit: f64,
    pub percentage: f64,
    pub band: SpendingBand,
}

impl CategorySpending {
    fn new(category: String, amount: f64, limit: f64, warning_threshold: f64) -> Self {
        let percentage = percentage_of(amount, limit);
        Self {
            category,
            amount,
            limit,
            percentage,
            band: SpendingBand::classify(percentage, warning_threshold),
        }
    }
}

/// Everything the budget widgets show, computed in one pass from the full collections
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetSummary {
    pub today_spending: f64,
    pub total_daily_limit: f64,
    pub progress_percentage: f64,
    pub band: SpendingBand,
    /// Categories with spend today, largest first
    pub breakdown: Vec<CategorySpending>,
    pub month_spending: f64,
    pub total_monthly_limit: f64,
    pub month_percentage: f64,
    pub month_band: SpendingBand,
}

impl BudgetSummary {
    pub fn calculate(expenses: &[Expense], budgets: &[Budget], today: NaiveDate, warning_threshold: f64) -> Self {
        let today_spending = today_spending(expenses, today);
        let total_daily_limit = total_daily_limit(budgets);
        let progress_percentage = percentage_of(today_spending, total_daily_limit);

        let breakdown = category_totals(expenses, today)
            .into_iter()
            .map(|(category, amount)| {
                let limit = daily_limit_for(budgets, &category);
                CategorySpending::new(category, amount, limit, warning_threshold)
            })
            .collect();

        let month_spending = month_to_date_spending(expenses, today);
        let total_monthly_limit = total_monthly_limit(budgets);
        let month_percentage = percentage_of(month_spending, total_monthly_limit);

        Self {
            today_spending,
            total_daily_limit,
            progress_percentage,
            band: SpendingBand::classify(progress_percentage, warning_threshold),
            breakdown,
            month_spending,
            total_monthly_limit,
            month_percentage,
            month_band: SpendingBand::classify(month_percentage, warning_threshold),
        }
    }

    /// Left to spend today; negative once the limit is passed
    pub fn remaining(&self) -> f64 {
        self.total_daily_limit - self.today_spending
    }

    /// Only set in the over-budget band, so spending without any limit is never "over"
    pub fn over_by(&self) -> Option<f64> {
        (self.band == SpendingBand::OverBudget).then(|| self.today_spending - self.total_daily_limit)
    }

    pub fn top_categories(&self, count: usize) -> &[CategorySpending] {
        &self.breakdown[..self.breakdown.len().min(count)]
    }
}

/// Per-category rows for the budget page: every configured category (spend or not),
/// followed by any other category that has a budget or spend today.
pub fn category_table(
    categories: &[String],
    expenses: &[Expense],
    budgets: &[Budget],
    today: NaiveDate,
    warning_threshold: f64,
) -> Vec<CategorySpending> {
    let totals = category_totals(expenses, today);
    let mut names: Vec<String> = categories.to_vec();
    let extra = budgets
        .iter()
        .map(|b| b.category.clone())
        .chain(totals.iter().map(|(category, _)| category.clone()));
    for name in extra {
        if !names.contains(&name) {
            names.push(name);
        }
    }

    names
        .into_iter()
        .map(|category| {
            let amount = totals
                .iter()
                .find(|(name, _)| *name == category)
                .map(|(_, amount)| *amount)
                .unwrap_or(0.0);
            let limit = daily_limit_for(budgets, &category);
            CategorySpending::new(category, amount, limit, warning_threshold)
        })
        .collect()
}

/// Newest expenses first (by date, then by id)
pub fn recent_expenses(expenses: &[Expense], count: usize) -> Vec<&Expense> {
    let mut recent: Vec<&Expense> = expenses.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    recent.truncate(count);
    recent
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 2).unwrap()
    }

    fn expense(id: i64, amount: f64, category: &str, date: NaiveDate) -> Expense {
        Expense {
            id,
            amount,
            category: category.to_string(),
            description: String::new(),
            date,
        }
    }

    fn budget(id: i64, category: &str, daily: f64) -> Budget {
        Budget {
            id,
            category: category.to_string(),
            daily_limit: daily,
            monthly_limit: daily * 30.0,
        }
    }

    fn sample() -> (Vec<Expense>, Vec<Budget>) {
        let expenses = vec![
            expense(1, 10.0, "Work", day()),
            expense(2, 5.0, "Work", day()),
            expense(3, 20.0, "Personal", day()),
        ];
        let budgets = vec![budget(1, "Work", 20.0), budget(2, "Personal", 15.0)];
        (expenses, budgets)
    }

    #[test]
    fn worked_example() {
        let (expenses, budgets) = sample();
        let summary = BudgetSummary::calculate(&expenses, &budgets, day(), DEFAULT_WARNING_PERCENT);

        assert_eq!(summary.today_spending, 35.0);
        assert_eq!(summary.total_daily_limit, 35.0);
        assert_eq!(summary.progress_percentage, 100.0);

        let pairs: Vec<(&str, f64)> = summary
            .breakdown
            .iter()
            .map(|c| (c.category.as_str(), c.amount))
            .collect();
        assert_eq!(pairs, vec![("Personal", 20.0), ("Work", 15.0)]);

        let personal = &summary.breakdown[0];
        assert!((personal.percentage - 133.333).abs() < 0.01);
        assert_eq!(personal.band, SpendingBand::OverBudget);
        assert_eq!(summary.breakdown[1].band, SpendingBand::Normal);
    }

    #[test]
    fn yesterday_does_not_count_today() {
        let (mut expenses, budgets) = sample();
        let before = BudgetSummary::calculate(&expenses, &budgets, day(), DEFAULT_WARNING_PERCENT);
        expenses.push(expense(4, 99.0, "Work", day() - Duration::days(1)));
        let after = BudgetSummary::calculate(&expenses, &budgets, day(), DEFAULT_WARNING_PERCENT);
        assert_eq!(before.today_spending, after.today_spending);
        assert_eq!(after.month_spending, 134.0);
    }

    #[test]
    fn breakdown_sums_to_today_spending() {
        let (mut expenses, budgets) = sample();
        expenses.push(expense(4, 2.25, "Health", day()));
        let summary = BudgetSummary::calculate(&expenses, &budgets, day(), DEFAULT_WARNING_PERCENT);
        let total: f64 = summary.breakdown.iter().map(|c| c.amount).sum();
        assert!((total - summary.today_spending).abs() < 1e-9);
        assert_eq!(summary.breakdown[2].limit, 0.0);
        assert_eq!(summary.breakdown[2].percentage, 0.0);
    }

    #[test]
    fn no_limits_means_zero_progress() {
        let (expenses, _) = sample();
        let summary = BudgetSummary::calculate(&expenses, &[], day(), DEFAULT_WARNING_PERCENT);
        assert_eq!(summary.progress_percentage, 0.0);
        assert_eq!(summary.band, SpendingBand::Normal);
        assert_eq!(summary.over_by(), None);
        assert!(summary.total_daily_limit.is_sign_positive());
        assert!(summary.total_monthly_limit.is_sign_positive());
    }

    #[test]
    fn over_by_follows_the_band() {
        let (mut expenses, budgets) = sample();
        let summary = BudgetSummary::calculate(&expenses, &budgets, day(), DEFAULT_WARNING_PERCENT);
        assert_eq!(summary.over_by(), None);

        expenses.push(expense(4, 10.0, "Work", day()));
        let summary = BudgetSummary::calculate(&expenses, &budgets, day(), DEFAULT_WARNING_PERCENT);
        assert_eq!(summary.band, SpendingBand::OverBudget);
        assert_eq!(summary.over_by(), Some(10.0));
    }

    #[test]
    fn bands_use_strict_thresholds() {
        assert_eq!(SpendingBand::classify(80.0, 80.0), SpendingBand::Normal);
        assert_eq!(SpendingBand::classify(80.1, 80.0), SpendingBand::Warning);
        assert_eq!(SpendingBand::classify(100.0, 80.0), SpendingBand::Warning);
        assert_eq!(SpendingBand::classify(100.1, 80.0), SpendingBand::OverBudget);
    }

    #[test]
    fn top_categories_caps_at_count() {
        let (expenses, budgets) = sample();
        let summary = BudgetSummary::calculate(&expenses, &budgets, day(), DEFAULT_WARNING_PERCENT);
        assert_eq!(summary.top_categories(3).len(), 2);
        assert_eq!(summary.top_categories(1)[0].category, "Personal");
    }

    #[test]
    fn category_table_lists_configured_categories_without_spend() {
        let (expenses, budgets) = sample();
        let categories = vec!["Health".to_string(), "Work".to_string()];
        let rows = category_table(&categories, &expenses, &budgets, day(), DEFAULT_WARNING_PERCENT);
        let names: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, vec!["Health", "Work", "Personal"]);
        assert_eq!(rows[0].amount, 0.0);
        assert_eq!(rows[1].amount, 15.0);
    }

    #[test]
    fn recent_expenses_are_newest_first() {
        let expenses = vec![
            expense(1, 1.0, "Work", day() - Duration::days(2)),
            expense(2, 1.0, "Work", day()),
            expense(3, 1.0, "Work", day()),
        ];
        let ids: Vec<i64> = recent_expenses(&expenses, 2).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }
}
