use crate::models::{Task, TaskStatus};

/// One kanban lane. The lane id is the status itself.
#[derive(Debug, Clone)]
pub struct Column<'a> {
    pub status: TaskStatus,
    pub tasks: Vec<&'a Task>,
}

/// Split tasks into the three lanes, keeping collection order inside each
pub fn columns(tasks: &[Task]) -> Vec<Column<'_>> {
    TaskStatus::ALL
        .iter()
        .map(|&status| Column {
            status,
            tasks: tasks.iter().filter(|task| task.status == status).collect(),
        })
        .collect()
}

/// The lane `offset` steps away from `status`, if there is one
pub fn neighbor(status: TaskStatus, offset: isize) -> Option<TaskStatus> {
    let index = status.column_index() as isize + offset;
    if index < 0 {
        return None;
    }
    TaskStatus::from_column_index(index as usize)
}

/// Local (optimistic) half of a drop: set the task's status in place.
/// Returns the changed task, or `None` when the id is unknown or the task
/// already has that status, in which case nothing needs persisting.
pub fn move_task(tasks: &mut [Task], id: i64, target: TaskStatus) -> Option<Task> {
    let task = tasks.iter_mut().find(|task| task.id == id)?;
    if task.status == target {
        return None;
    }
    task.status = target;
    Some(task.clone())
}
