pub mod fields;
pub mod filter;
pub mod task;
pub mod task_list;

pub use fields::{Description, Name, Priority, Tag};
pub use filter::{StatusFilter, TaskFilter};
pub use task::{Task, TaskType};
pub use task_list::ToDoList;

use crate::error::AppError;
use crate::history::History;
use std::fmt;

pub const MESSAGE_INVALID_INDEX: &str = "The task index provided is invalid";

/// A user-facing index such as `d2`: a type character and a 1-based position
/// within that type's section of the filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskIndex {
    pub type_char: char,
    pub position: usize,
}

impl TaskIndex {
    pub fn task_type(&self) -> Option<TaskType> {
        TaskType::from_char(self.type_char)
    }
}

impl fmt::Display for TaskIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.type_char, self.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayedTask<'a> {
    pub index: TaskIndex,
    pub task: &'a Task,
}

/// In-memory state behind the command loop: the task list, its undo history
/// and the current filter.
///
/// Mutations are crate-private; outside code reads through the accessors.
#[derive(Debug, Clone, Default)]
pub struct Model {
    to_do_list: ToDoList,
    history: History,
    filter: TaskFilter,
}

impl Model {
    pub fn new(to_do_list: ToDoList) -> Self {
        Self {
            to_do_list,
            history: History::new(),
            filter: TaskFilter::default(),
        }
    }

    pub fn to_do_list(&self) -> &ToDoList {
        &self.to_do_list
    }

    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn filtered_tasks(&self) -> Vec<&Task> {
        self.to_do_list
            .tasks()
            .iter()
            .filter(|task| self.filter.matches(task))
            .collect()
    }

    /// The filtered view grouped by type (events, deadlines, todos), each
    /// task tagged with the index the user types to address it.
    pub fn displayed_tasks(&self) -> Vec<DisplayedTask<'_>> {
        let tasks = self.to_do_list.tasks();
        let mut displayed = Vec::with_capacity(tasks.len());
        for task_type in TaskType::ALL {
            for (offset, internal) in self.section(task_type).into_iter().enumerate() {
                displayed.push(DisplayedTask {
                    index: TaskIndex {
                        type_char: task_type.as_char(),
                        position: offset + 1,
                    },
                    task: &tasks[internal],
                });
            }
        }
        displayed
    }

    /// Internal positions of the filtered tasks of one type, in display
    /// order: unfinished tasks first, each group in list order.
    fn section(&self, task_type: TaskType) -> Vec<usize> {
        let mut section: Vec<usize> = self
            .to_do_list
            .tasks()
            .iter()
            .enumerate()
            .filter(|(_, task)| self.filter.matches(task) && task.task_type() == task_type)
            .map(|(internal, _)| internal)
            .collect();
        section.sort_by_key(|internal| self.to_do_list.tasks()[*internal].is_done());
        section
    }

    pub(crate) fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    /// Maps a displayed index to an internal position: displayed index,
    /// then position in the type's section of the filtered view, then
    /// position in the unfiltered list. `undone_only` keeps just the
    /// unfinished tasks, which always lead their section.
    pub(crate) fn resolve_index(
        &self,
        target: TaskIndex,
        undone_only: bool,
    ) -> Result<usize, AppError> {
        let task_type = target
            .task_type()
            .ok_or_else(|| AppError::not_found(MESSAGE_INVALID_INDEX))?;

        let tasks = self.to_do_list.tasks();
        let subset: Vec<usize> = self
            .section(task_type)
            .into_iter()
            .filter(|internal| !(undone_only && tasks[*internal].is_done()))
            .collect();

        target
            .position
            .checked_sub(1)
            .and_then(|offset| subset.get(offset).copied())
            .ok_or_else(|| AppError::not_found(MESSAGE_INVALID_INDEX))
    }

    pub(crate) fn add_task(&mut self, task: Task, label: String) -> Result<(), AppError> {
        self.commit(label, |list| list.add(task))
    }

    pub(crate) fn update_task(
        &mut self,
        index: usize,
        task: Task,
        label: String,
    ) -> Result<(), AppError> {
        self.commit(label, |list| list.update(index, task))
    }

    pub(crate) fn delete_task(&mut self, index: usize, label: String) -> Result<Task, AppError> {
        self.commit(label, |list| list.remove(index))
    }

    pub(crate) fn done_task(&mut self, index: usize, label: String) -> Result<Task, AppError> {
        self.commit(label, |list| list.mark_done(index).cloned())
    }

    pub(crate) fn clear(&mut self, label: String) {
        let snapshot = self.to_do_list.clone();
        self.to_do_list.clear();
        self.history.push(snapshot, label);
    }

    /// Restores the list as it was before the last undoable command and
    /// returns that command's label.
    pub(crate) fn undo(&mut self) -> Result<String, AppError> {
        let (snapshot, label) = self.history.pop()?.into_parts();
        self.to_do_list = snapshot;
        Ok(label)
    }

    // History is only recorded when the change succeeds; a failed change
    // leaves the list exactly as it was.
    fn commit<T>(
        &mut self,
        label: String,
        change: impl FnOnce(&mut ToDoList) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let snapshot = self.to_do_list.clone();
        match change(&mut self.to_do_list) {
            Ok(value) => {
                self.history.push(snapshot, label);
                Ok(value)
            }
            Err(err) => {
                self.to_do_list = snapshot;
                Err(err)
            }
        }
    }
}
