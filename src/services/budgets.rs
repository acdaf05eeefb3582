use crate::models::{Budget, BudgetDraft, BudgetPatch};
use crate::services::{IntoRecordId, Service, ServiceError, require_non_negative};
use crate::store::Collection;

impl<B> Service<'_, Budget, B>
where
    B: Collection<Budget> + ?Sized,
{
    pub fn find_by_category(&self, category: &str) -> Result<Option<Budget>, ServiceError> {
        let category = category.trim();
        Ok(self.get_all()?.into_iter().find(|b| b.category == category))
    }

    /// At most one budget per category
    pub fn create(&mut self, draft: BudgetDraft) -> Result<Budget, ServiceError> {
        let category = require_category(&draft.category)?;
        if self.find_by_category(&category)?.is_some() {
            tracing::warn!(%category, "rejected duplicate budget");
            return Err(ServiceError::DuplicateCategory(category));
        }
        let budget = Budget {
            id: 0,
            category,
            daily_limit: require_non_negative("Daily limit", draft.daily_limit)?,
            monthly_limit: require_non_negative("Monthly limit", draft.monthly_limit)?,
        };
        self.insert(budget)
    }

    /// Renaming onto a category another budget already owns is rejected
    pub fn update(&mut self, id: impl IntoRecordId, patch: BudgetPatch) -> Result<Budget, ServiceError> {
        if let Some(limit) = patch.daily_limit {
            require_non_negative("Daily limit", limit)?;
        }
        if let Some(limit) = patch.monthly_limit {
            require_non_negative("Monthly limit", limit)?;
        }
        let mut budget = self.get_by_id(id)?;
        if let Some(category) = &patch.category {
            let category = require_category(category)?;
            if let Some(owner) = self.find_by_category(&category)? {
                if owner.id != budget.id {
                    tracing::warn!(%category, "rejected duplicate budget");
                    return Err(ServiceError::DuplicateCategory(category));
                }
            }
        }
        patch.apply(&mut budget);
        budget.category = budget.category.trim().to_string();
        self.write_back(budget)
    }

    /// Create the category's budget, or overwrite its limits when one exists
    pub fn set_limits(&mut self, category: &str, daily_limit: f64, monthly_limit: f64) -> Result<Budget, ServiceError> {
        match self.find_by_category(category)? {
            Some(existing) => self.update(
                existing.id,
                BudgetPatch {
                    category: None,
                    daily_limit: Some(daily_limit),
                    monthly_limit: Some(monthly_limit),
                },
            ),
            None => self.create(BudgetDraft {
                category: category.to_string(),
                daily_limit,
                monthly_limit,
            }),
        }
    }
}

fn require_category(category: &str) -> Result<String, ServiceError> {
    let category = category.trim();
    if category.is_empty() {
        return Err(ServiceError::Invalid("A budget needs a category".to_string()));
    }
    Ok(category.to_string())
}
