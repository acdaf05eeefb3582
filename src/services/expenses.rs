use crate::models::{Expense, ExpenseDraft, ExpensePatch};
use crate::services::{IntoRecordId, Service, ServiceError, require_non_negative};
use crate::store::Collection;
use crate::utils;

/// Category used when an expense is logged without one
pub const DEFAULT_EXPENSE_CATEGORY: &str = "Personal";

impl<B> Service<'_, Expense, B>
where
    B: Collection<Expense> + ?Sized,
{
    /// Date defaults to today, category to Personal
    pub fn create(&mut self, draft: ExpenseDraft) -> Result<Expense, ServiceError> {
        let category = draft
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_EXPENSE_CATEGORY.to_string());
        let expense = Expense {
            id: 0,
            amount: require_non_negative("Amount", draft.amount)?,
            category,
            description: draft.description.trim().to_string(),
            date: draft.date.unwrap_or_else(utils::today),
        };
        self.insert(expense)
    }

    pub fn update(&mut self, id: impl IntoRecordId, patch: ExpensePatch) -> Result<Expense, ServiceError> {
        if let Some(amount) = patch.amount {
            require_non_negative("Amount", amount)?;
        }
        self.modify(id, |expense| {
            patch.apply(expense);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ExpenseService;
    use crate::store::MemoryBackend;
    use chrono::NaiveDate;

    #[test]
    fn create_defaults_category_and_date() {
        let mut backend = MemoryBackend::new();
        let expense = ExpenseService::new(&mut backend)
            .create(ExpenseDraft { amount: 9.5, ..ExpenseDraft::default() })
            .unwrap();
        assert_eq!(expense.category, "Personal");
        assert_eq!(expense.date, utils::today());
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let mut backend = MemoryBackend::new();
        let mut service = ExpenseService::new(&mut backend);
        assert!(matches!(
            service.create(ExpenseDraft { amount: -1.0, ..ExpenseDraft::default() }),
            Err(ServiceError::Invalid(_))
        ));

        let expense = service
            .create(ExpenseDraft {
                amount: 3.0,
                date: NaiveDate::from_ymd_opt(2024, 4, 2),
                ..ExpenseDraft::default()
            })
            .unwrap();
        let result = service.update(expense.id, ExpensePatch { amount: Some(f64::NAN), ..ExpensePatch::default() });
        assert!(matches!(result, Err(ServiceError::Invalid(_))));
        assert_eq!(service.get_by_id(expense.id).unwrap().amount, 3.0);
    }
}
