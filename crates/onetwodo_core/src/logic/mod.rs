pub mod commands;
pub mod parser;

pub use commands::{Command, CommandResult};
pub use parser::parse_command;

use crate::datetime::now_local;
use crate::error::AppError;
use crate::model::{DisplayedTask, Model, TaskFilter, ToDoList};
use log::{error, info};
use std::collections::HashMap;
use time::PrimitiveDateTime;

pub trait Clock {
    fn now(&self) -> PrimitiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> PrimitiveDateTime {
        now_local()
    }
}

/// Always reports the same instant. Used where relative dates must be
/// reproducible.
pub struct FixedClock(pub PrimitiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> PrimitiveDateTime {
        self.0
    }
}

/// Parses and runs commands one at a time against the model it owns.
pub struct Logic {
    model: Model,
    aliases: HashMap<String, String>,
    clock: Box<dyn Clock>,
}

impl Logic {
    pub fn new(to_do_list: ToDoList) -> Self {
        Self {
            model: Model::new(to_do_list),
            aliases: HashMap::new(),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_aliases(mut self, aliases: HashMap<String, String>) -> Self {
        self.aliases = aliases
            .into_iter()
            .map(|(alias, target)| (alias.trim().to_ascii_lowercase(), target))
            .collect();
        self
    }

    pub fn execute(&mut self, command_text: &str) -> Result<CommandResult, AppError> {
        info!("event=command_received text={:?}", command_text.trim());
        let command = parse_command(command_text, &self.aliases);
        let word = command.word();
        let outcome = command.execute(&mut self.model, self.clock.now());

        match &outcome {
            Ok(result) => info!(
                "event=command_done command={word} status=ok changed={} tasks={}",
                result.changed,
                self.model.to_do_list().len()
            ),
            Err(err) if err.is_user_error() => info!(
                "event=command_done command={word} status=rejected code={}",
                err.code()
            ),
            Err(err) => error!(
                "event=command_done command={word} status=failed code={} message={:?}",
                err.code(),
                err.message()
            ),
        }

        outcome
    }

    pub fn to_do_list(&self) -> &ToDoList {
        self.model.to_do_list()
    }

    pub fn filter(&self) -> &TaskFilter {
        self.model.filter()
    }

    pub fn displayed_tasks(&self) -> Vec<DisplayedTask<'_>> {
        self.model.displayed_tasks()
    }
}
