//! Pure aggregates computed from full collections on every render.
//! Nothing here touches storage; callers pass "today" / "now" in.

pub mod board;
pub mod budget;
pub mod calendar;
pub mod notes;
pub mod today;

pub use budget::{BudgetSummary, CategorySpending, SpendingBand};
pub use today::{TaskStats, TodayOverview};
