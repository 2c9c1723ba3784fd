use crate::datetime::DateTimeParser;
use crate::error::AppError;
use crate::model::{
    Description, Model, Name, Priority, StatusFilter, Tag, Task, TaskFilter, TaskIndex,
};
use std::collections::BTreeSet;
use time::macros::time;
use time::{PrimitiveDateTime, Time};

pub const ADD_WORD: &str = "add";
pub const EDIT_WORD: &str = "edit";
pub const DONE_WORD: &str = "done";
pub const DELETE_WORD: &str = "delete";
pub const UNDO_WORD: &str = "undo";
pub const CLEAR_WORD: &str = "clear";
pub const FIND_WORD: &str = "find";
pub const LIST_WORD: &str = "list";
pub const HELP_WORD: &str = "help";

pub const ADD_USAGE: &str = "add: Adds a task to the to-do list.\n\
Parameters: NAME [s/START] [d/DATE] [t/TIME] [p/PRIORITY] [i/DESCRIPTION] [tag/TAG]...\n\
Example: add Buy milk t/6pm d/tomorrow p/high tag/errand";
pub const EDIT_USAGE: &str = "edit: Edits the task identified by its index. Blank s/ or d/ removes the date.\n\
Parameters: INDEX [NAME] [s/START] [d/DATE] [t/TIME] [p/PRIORITY] [i/DESCRIPTION] [tag/TAG]...\n\
Example: edit d1 Buy oat milk p/low";
pub const DONE_USAGE: &str = "done: Marks the task identified by its index as completed.\n\
Parameters: INDEX (type letter e, d or t followed by a positive number)\n\
Example: done e1";
pub const DELETE_USAGE: &str = "delete: Deletes the task identified by its index.\n\
Parameters: INDEX (type letter e, d or t followed by a positive number)\n\
Example: delete t2";
pub const UNDO_USAGE: &str = "undo: Reverts the most recent command that changed the to-do list.\n\
Example: undo";
pub const CLEAR_USAGE: &str = "clear: Removes every task.\n\
Example: clear";
pub const FIND_USAGE: &str = "find: Lists tasks whose name, description or tags contain any keyword.\n\
Parameters: KEYWORD [MORE_KEYWORDS]...\n\
Example: find milk report";
pub const LIST_USAGE: &str = "list: Lists undone tasks, completed tasks or every task.\n\
Parameters: [done|all]\n\
Example: list done";
pub const HELP_USAGE: &str = "help: Shows how to use every command.\n\
Example: help";

pub const MESSAGE_ADD_SUCCESS: &str = "New task added";
pub const MESSAGE_EDIT_SUCCESS: &str = "Edited task";
pub const MESSAGE_DONE_SUCCESS: &str = "Completed task";
pub const MESSAGE_DELETE_SUCCESS: &str = "Deleted task";
pub const MESSAGE_CLEAR_SUCCESS: &str = "To-do list has been cleared!";
pub const MESSAGE_UNDO_SUCCESS: &str = "Undo successful";
pub const MESSAGE_NOTHING_TO_EDIT: &str = "At least one field to edit must be provided";

const START_DEFAULT_TIME: Time = Time::MIDNIGHT;
const END_DEFAULT_TIME: Time = time!(23:59);

pub fn all_usages() -> String {
    [
        ADD_USAGE,
        EDIT_USAGE,
        DONE_USAGE,
        DELETE_USAGE,
        UNDO_USAGE,
        CLEAR_USAGE,
        FIND_USAGE,
        LIST_USAGE,
        HELP_USAGE,
    ]
    .join("\n\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub feedback: String,
    /// Whether the task list changed, i.e. whether it needs saving.
    pub changed: bool,
    /// Whether the command changed what is shown, i.e. `find` and `list`.
    pub view_changed: bool,
}

impl CommandResult {
    fn changed(feedback: String) -> Self {
        Self {
            feedback,
            changed: true,
            view_changed: false,
        }
    }

    fn unchanged(feedback: String) -> Self {
        Self {
            feedback,
            changed: false,
            view_changed: false,
        }
    }

    fn filtered(feedback: String) -> Self {
        Self {
            feedback,
            changed: false,
            view_changed: true,
        }
    }
}

/// Raw field values as typed after each prefix. `None` means the prefix was
/// absent; `Some("")` means it was given with a blank value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldArgs {
    pub start: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub priority: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl FieldArgs {
    fn is_empty(&self) -> bool {
        self.start.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.priority.is_none()
            && self.description.is_none()
            && self.tags.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddArgs {
    pub name: String,
    pub fields: FieldArgs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditArgs {
    pub target: TaskIndex,
    pub name: Option<String>,
    pub fields: FieldArgs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(AddArgs),
    Edit(EditArgs),
    Done(TaskIndex),
    Delete(TaskIndex),
    Undo,
    Clear,
    Find(Vec<String>),
    List(StatusFilter),
    Help,
    /// Input that could not be turned into a command; carries the message
    /// to show, usually including a usage string.
    Incorrect(String),
}

impl Command {
    pub fn word(&self) -> &'static str {
        match self {
            Self::Add(_) => ADD_WORD,
            Self::Edit(_) => EDIT_WORD,
            Self::Done(_) => DONE_WORD,
            Self::Delete(_) => DELETE_WORD,
            Self::Undo => UNDO_WORD,
            Self::Clear => CLEAR_WORD,
            Self::Find(_) => FIND_WORD,
            Self::List(_) => LIST_WORD,
            Self::Help => HELP_WORD,
            Self::Incorrect(_) => "incorrect",
        }
    }

    pub fn execute(
        self,
        model: &mut Model,
        now: PrimitiveDateTime,
    ) -> Result<CommandResult, AppError> {
        let dates = DateTimeParser::new(now.date());
        match self {
            Self::Add(args) => execute_add(model, &dates, args),
            Self::Edit(args) => execute_edit(model, &dates, args),
            Self::Done(target) => {
                let index = model.resolve_index(target, true)?;
                let name = model.to_do_list().tasks()[index].name().to_string();
                let task = model.done_task(index, format!("{DONE_WORD} {name}"))?;
                Ok(CommandResult::changed(format!("{MESSAGE_DONE_SUCCESS}: {task}")))
            }
            Self::Delete(target) => {
                let index = model.resolve_index(target, false)?;
                let name = model.to_do_list().tasks()[index].name().to_string();
                let task = model.delete_task(index, format!("{DELETE_WORD} {name}"))?;
                Ok(CommandResult::changed(format!("{MESSAGE_DELETE_SUCCESS}: {task}")))
            }
            Self::Undo => {
                let label = model.undo()?;
                Ok(CommandResult::changed(format!("{MESSAGE_UNDO_SUCCESS}: {label}")))
            }
            Self::Clear => {
                model.clear(CLEAR_WORD.to_string());
                Ok(CommandResult::changed(MESSAGE_CLEAR_SUCCESS.to_string()))
            }
            Self::Find(keywords) => {
                let status = model.filter().status;
                model.set_filter(TaskFilter { status, keywords });
                let count = model.filtered_tasks().len();
                Ok(CommandResult::filtered(format!("{count} tasks listed!")))
            }
            Self::List(status) => {
                model.set_filter(TaskFilter {
                    status,
                    keywords: Vec::new(),
                });
                Ok(CommandResult::filtered(format!("Listed {} tasks", status.label())))
            }
            Self::Help => Ok(CommandResult::unchanged(all_usages())),
            Self::Incorrect(message) => Err(AppError::parse(message)),
        }
    }
}

fn execute_add(
    model: &mut Model,
    dates: &DateTimeParser,
    args: AddArgs,
) -> Result<CommandResult, AppError> {
    let fields = args.fields;
    let name = Name::parse(&args.name)?;
    let start = match non_blank(fields.start.as_deref()) {
        Some(raw) => {
            let default = PrimitiveDateTime::new(dates.today(), START_DEFAULT_TIME);
            Some(dates.parse(raw, default)?)
        }
        None => None,
    };
    let end_input = join_end_input(fields.date.as_deref(), fields.time.as_deref());
    let end = match end_input {
        Some(raw) => {
            let default_date = start.map_or(dates.today(), |start| start.date());
            Some(dates.parse(&raw, PrimitiveDateTime::new(default_date, END_DEFAULT_TIME))?)
        }
        None => None,
    };
    let description = Description::new(fields.description.as_deref().unwrap_or_default());
    let priority = Priority::parse(fields.priority.as_deref().unwrap_or_default())?;
    let tags = parse_tags(fields.tags.as_deref().unwrap_or_default())?;

    let task = Task::new(name, start, end, description, priority, tags)?;
    let feedback = format!("{MESSAGE_ADD_SUCCESS}: {task}");
    let label = format!("{ADD_WORD} {}", task.name());
    model.add_task(task, label)?;
    Ok(CommandResult::changed(feedback))
}

fn execute_edit(
    model: &mut Model,
    dates: &DateTimeParser,
    args: EditArgs,
) -> Result<CommandResult, AppError> {
    if args.name.is_none() && args.fields.is_empty() {
        return Err(AppError::parse(format!(
            "{MESSAGE_NOTHING_TO_EDIT}\n{EDIT_USAGE}"
        )));
    }

    let index = model.resolve_index(args.target, false)?;
    let current = model.to_do_list().tasks()[index].clone();
    let fields = args.fields;

    let name = match args.name.as_deref() {
        Some(raw) => Name::parse(raw)?,
        None => current.name().clone(),
    };

    let start = match fields.start.as_deref() {
        None => current.start(),
        Some(raw) if raw.trim().is_empty() => None,
        Some(raw) => {
            let default = current
                .start()
                .unwrap_or(PrimitiveDateTime::new(dates.today(), START_DEFAULT_TIME));
            Some(dates.parse(raw, default)?)
        }
    };

    // A blank t/ on its own leaves the end alone; only a blank d/ clears it.
    let end = if fields.date.is_none() && non_blank(fields.time.as_deref()).is_none() {
        current.end()
    } else {
        match join_end_input(fields.date.as_deref(), fields.time.as_deref()) {
            None => None,
            Some(raw) => {
                let default = current.end().unwrap_or_else(|| {
                    let date = start.map_or(dates.today(), |start| start.date());
                    PrimitiveDateTime::new(date, END_DEFAULT_TIME)
                });
                Some(dates.parse(&raw, default)?)
            }
        }
    };

    let description = match fields.description.as_deref() {
        Some(raw) => Description::new(raw),
        None => current.description().clone(),
    };
    let priority = match fields.priority.as_deref() {
        Some(raw) => Priority::parse(raw)?,
        None => current.priority(),
    };
    let tags = match fields.tags.as_deref() {
        Some(raw) => parse_tags(raw)?,
        None => current.tags().clone(),
    };

    let mut edited = Task::new(name, start, end, description, priority, tags)?;
    edited.set_done(current.is_done());
    let feedback = format!("{MESSAGE_EDIT_SUCCESS}: {edited}");
    let label = format!("{EDIT_WORD} {}", current.name());
    model.update_task(index, edited, label)?;
    Ok(CommandResult::changed(feedback))
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

/// `d/` and `t/` together describe the end; either may be missing.
fn join_end_input(date: Option<&str>, time: Option<&str>) -> Option<String> {
    match (non_blank(date), non_blank(time)) {
        (Some(date), Some(time)) => Some(format!("{date} {time}")),
        (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
        (None, None) => None,
    }
}

fn parse_tags(raw: &[String]) -> Result<BTreeSet<Tag>, AppError> {
    raw.iter()
        .filter(|value| !value.trim().is_empty())
        .map(|value| Tag::parse(value))
        .collect()
}
