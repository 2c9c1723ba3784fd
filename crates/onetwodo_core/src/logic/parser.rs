//! Turns command text into a [`Command`].
//!
//! Grammar: `COMMAND_WORD [preamble] [PREFIX value]...`. A prefix only counts
//! at the start of the arguments or right after whitespace, so `12/05` inside
//! a date never opens a new argument.

use crate::logic::commands::{
    ADD_USAGE, ADD_WORD, AddArgs, CLEAR_WORD, Command, DELETE_USAGE, DELETE_WORD, DONE_USAGE,
    DONE_WORD, EDIT_USAGE, EDIT_WORD, EditArgs, FIND_USAGE, FIND_WORD, FieldArgs, HELP_WORD,
    LIST_USAGE, LIST_WORD, UNDO_WORD,
};
use crate::model::{StatusFilter, TaskIndex};
use std::collections::HashMap;

pub const MESSAGE_INVALID_FORMAT: &str = "Invalid command format!";
pub const MESSAGE_UNKNOWN_COMMAND: &str = "Unknown command; type 'help' to see every command";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Prefix(&'static str);

impl Prefix {
    pub fn as_str(self) -> &'static str {
        self.0
    }
}

pub const PREFIX_START: Prefix = Prefix("s/");
pub const PREFIX_DATE: Prefix = Prefix("d/");
pub const PREFIX_TIME: Prefix = Prefix("t/");
pub const PREFIX_PRIORITY: Prefix = Prefix("p/");
pub const PREFIX_DESCRIPTION: Prefix = Prefix("i/");
pub const PREFIX_TAG: Prefix = Prefix("tag/");

const FIELD_PREFIXES: [Prefix; 6] = [
    PREFIX_START,
    PREFIX_DATE,
    PREFIX_TIME,
    PREFIX_PRIORITY,
    PREFIX_DESCRIPTION,
    PREFIX_TAG,
];

/// Values found after each prefix, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentMultimap {
    preamble: String,
    values: HashMap<Prefix, Vec<String>>,
}

impl ArgumentMultimap {
    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    /// The last value given for `prefix`.
    pub fn value(&self, prefix: Prefix) -> Option<&str> {
        self.values
            .get(&prefix)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    pub fn all_values(&self, prefix: Prefix) -> Option<&[String]> {
        self.values.get(&prefix).map(Vec::as_slice)
    }
}

pub fn tokenize(args: &str, prefixes: &[Prefix]) -> ArgumentMultimap {
    let mut positions: Vec<(usize, Prefix)> = Vec::new();
    for prefix in prefixes {
        let marker = prefix.as_str();
        let mut search_from = 0;
        while let Some(found) = args[search_from..].find(marker) {
            let at = search_from + found;
            if at == 0 || args[..at].ends_with(char::is_whitespace) {
                positions.push((at, *prefix));
            }
            search_from = at + marker.len();
        }
    }
    // Longest prefix wins when two start at the same offset.
    positions.sort_by(|left, right| {
        left.0
            .cmp(&right.0)
            .then(right.1.as_str().len().cmp(&left.1.as_str().len()))
    });
    positions.dedup_by_key(|(at, _)| *at);

    let preamble_end = positions.first().map_or(args.len(), |(at, _)| *at);
    let mut map = ArgumentMultimap {
        preamble: args[..preamble_end].trim().to_string(),
        values: HashMap::new(),
    };
    for (slot, (at, prefix)) in positions.iter().enumerate() {
        let value_start = at + prefix.as_str().len();
        let value_end = positions.get(slot + 1).map_or(args.len(), |(next, _)| *next);
        map.values
            .entry(*prefix)
            .or_default()
            .push(args[value_start..value_end].trim().to_string());
    }
    map
}

/// Parses a full line of user input. Never fails: anything unusable becomes
/// [`Command::Incorrect`] carrying the message to show.
///
/// `aliases` maps a lowercase word to the text it stands for, e.g.
/// `"ls" -> "list all"`. Expansion happens once.
pub fn parse_command(input: &str, aliases: &HashMap<String, String>) -> Command {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Command::Incorrect(format!("{MESSAGE_INVALID_FORMAT}\n{MESSAGE_UNKNOWN_COMMAND}"));
    }

    let (word, args) = split_word(trimmed);
    let expanded;
    let (word, args) = match aliases.get(&word.to_ascii_lowercase()) {
        Some(replacement) => {
            expanded = format!("{} {}", replacement.trim(), args);
            split_word(expanded.trim())
        }
        None => (word, args),
    };

    match word.to_ascii_lowercase().as_str() {
        ADD_WORD => parse_add(args),
        EDIT_WORD => parse_edit(args),
        DONE_WORD => {
            parse_single_index(args, DONE_USAGE).map_or_else(Command::Incorrect, Command::Done)
        }
        DELETE_WORD => {
            parse_single_index(args, DELETE_USAGE).map_or_else(Command::Incorrect, Command::Delete)
        }
        UNDO_WORD => Command::Undo,
        CLEAR_WORD => Command::Clear,
        FIND_WORD => parse_find(args),
        LIST_WORD => match StatusFilter::parse(args) {
            Some(status) => Command::List(status),
            None => Command::Incorrect(invalid_format(LIST_USAGE)),
        },
        HELP_WORD => Command::Help,
        _ => Command::Incorrect(MESSAGE_UNKNOWN_COMMAND.to_string()),
    }
}

fn split_word(input: &str) -> (&str, &str) {
    input.split_once(char::is_whitespace).unwrap_or((input, ""))
}

fn invalid_format(usage: &str) -> String {
    format!("{MESSAGE_INVALID_FORMAT}\n{usage}")
}

fn parse_add(args: &str) -> Command {
    let map = tokenize(args, &FIELD_PREFIXES);
    if map.preamble().is_empty() {
        return Command::Incorrect(invalid_format(ADD_USAGE));
    }
    Command::Add(AddArgs {
        name: map.preamble().to_string(),
        fields: field_args(&map),
    })
}

fn parse_edit(args: &str) -> Command {
    let map = tokenize(args, &FIELD_PREFIXES);
    let (index_token, name) = split_word(map.preamble());
    let target = match parse_index(index_token) {
        Some(target) => target,
        None => return Command::Incorrect(invalid_format(EDIT_USAGE)),
    };
    let name = Some(name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    Command::Edit(EditArgs {
        target,
        name,
        fields: field_args(&map),
    })
}

fn parse_find(args: &str) -> Command {
    let keywords: Vec<String> = args.split_whitespace().map(str::to_string).collect();
    if keywords.is_empty() {
        return Command::Incorrect(invalid_format(FIND_USAGE));
    }
    Command::Find(keywords)
}

fn parse_single_index(args: &str, usage: &str) -> Result<TaskIndex, String> {
    let trimmed = args.trim();
    if trimmed.contains(char::is_whitespace) {
        return Err(invalid_format(usage));
    }
    parse_index(trimmed).ok_or_else(|| invalid_format(usage))
}

/// `<type char><positive number>`. The type char is not checked here; an
/// unknown one is reported as an invalid index when the command runs.
fn parse_index(token: &str) -> Option<TaskIndex> {
    let mut chars = token.chars();
    let type_char = chars.next()?.to_ascii_lowercase();
    let number = chars.as_str();
    if number.is_empty() || !number.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    let position: usize = number.parse().ok().filter(|position| *position > 0)?;
    Some(TaskIndex {
        type_char,
        position,
    })
}

fn field_args(map: &ArgumentMultimap) -> FieldArgs {
    FieldArgs {
        start: map.value(PREFIX_START).map(str::to_string),
        date: map.value(PREFIX_DATE).map(str::to_string),
        time: map.value(PREFIX_TIME).map(str::to_string),
        priority: map.value(PREFIX_PRIORITY).map(str::to_string),
        description: map.value(PREFIX_DESCRIPTION).map(str::to_string),
        tags: map.all_values(PREFIX_TAG).map(<[String]>::to_vec),
    }
}
