use crate::error::AppError;
use crate::model::task::Task;

pub const MESSAGE_DUPLICATE_TASK: &str = "This task already exists in the to-do list";
pub const MESSAGE_ALREADY_DONE: &str = "This task has already been completed";

/// Ordered task collection. No two tasks may be the same task as defined by
/// [`Task::is_same_task_as`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToDoList {
    tasks: Vec<Task>,
}

impl ToDoList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self, AppError> {
        let mut list = Self::new();
        for task in tasks {
            list.add(task)?;
        }
        Ok(list)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, task: &Task) -> bool {
        self.tasks.iter().any(|existing| existing.is_same_task_as(task))
    }

    pub(crate) fn add(&mut self, task: Task) -> Result<(), AppError> {
        if self.contains(&task) {
            return Err(AppError::duplicate(MESSAGE_DUPLICATE_TASK));
        }
        self.tasks.push(task);
        Ok(())
    }

    pub(crate) fn remove(&mut self, index: usize) -> Result<Task, AppError> {
        self.check_index(index)?;
        Ok(self.tasks.remove(index))
    }

    /// Replaces the task at `index`, keeping its position in the list.
    pub(crate) fn update(&mut self, index: usize, task: Task) -> Result<(), AppError> {
        self.check_index(index)?;
        let clashes = self
            .tasks
            .iter()
            .enumerate()
            .any(|(position, existing)| position != index && existing.is_same_task_as(&task));
        if clashes {
            return Err(AppError::duplicate(MESSAGE_DUPLICATE_TASK));
        }
        self.tasks[index] = task;
        Ok(())
    }

    pub(crate) fn mark_done(&mut self, index: usize) -> Result<&Task, AppError> {
        self.check_index(index)?;
        let task = &mut self.tasks[index];
        if task.is_done() {
            return Err(AppError::validation(MESSAGE_ALREADY_DONE));
        }
        task.set_done(true);
        Ok(task)
    }

    pub(crate) fn clear(&mut self) {
        self.tasks.clear();
    }

    // Indices reaching this point were resolved against the same list, so a
    // miss means the resolution step is broken, not that the user erred.
    fn check_index(&self, index: usize) -> Result<(), AppError> {
        if index >= self.tasks.len() {
            return Err(AppError::internal(format!(
                "no task at internal position {index} (list holds {})",
                self.tasks.len()
            )));
        }
        Ok(())
    }
}
