use crate::models::{Record, Task, TaskDraft, TaskPatch, TaskStatus};
use crate::services::{IntoRecordId, Service, ServiceError, require_title};
use crate::store::Collection;

impl<B> Service<'_, Task, B>
where
    B: Collection<Task> + ?Sized,
{
    /// New tasks start in To Do with Medium priority unless the draft says otherwise
    pub fn create(&mut self, draft: TaskDraft) -> Result<Task, ServiceError> {
        let task = Task {
            id: 0,
            title: require_title(Task::KIND, &draft.title)?,
            description: draft.description,
            priority: draft.priority.unwrap_or_default(),
            status: draft.status.unwrap_or_default(),
            due_date: draft.due_date,
        };
        self.insert(task)
    }

    pub fn update(&mut self, id: impl IntoRecordId, patch: TaskPatch) -> Result<Task, ServiceError> {
        if let Some(title) = &patch.title {
            require_title(Task::KIND, title)?;
        }
        self.modify(id, |task| {
            patch.apply(task);
            task.title = task.title.trim().to_string();
            Ok(())
        })
    }

    /// Drop a task onto a board column. Returns `None`, without touching
    /// storage, when the task already sits in that column.
    pub fn move_to(&mut self, id: impl IntoRecordId, status: TaskStatus) -> Result<Option<Task>, ServiceError> {
        let mut task = self.get_by_id(id)?;
        if task.status == status {
            tracing::debug!(id = task.id, %status, "task already in column");
            return Ok(None);
        }
        tracing::info!(id = task.id, from = %task.status, to = %status, "moving task");
        task.status = status;
        self.write_back(task).map(Some)
    }
}
