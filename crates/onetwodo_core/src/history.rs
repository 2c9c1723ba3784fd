use crate::error::AppError;
use crate::model::ToDoList;

pub const MESSAGE_EMPTY_HISTORY: &str = "Nothing to undo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    snapshot: ToDoList,
    label: String,
}

impl HistoryEntry {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn into_parts(self) -> (ToDoList, String) {
        (self.snapshot, self.label)
    }
}

/// Stack of pre-mutation snapshots. Each entry is a full copy of the list as
/// it was before the command named by `label` ran.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<L: Into<String>>(&mut self, snapshot: ToDoList, label: L) {
        self.entries.push(HistoryEntry {
            snapshot,
            label: label.into(),
        });
    }

    pub fn pop(&mut self) -> Result<HistoryEntry, AppError> {
        self.entries
            .pop()
            .ok_or_else(|| AppError::empty_history(MESSAGE_EMPTY_HISTORY))
    }

    pub fn peek_label(&self) -> Option<&str> {
        self.entries.last().map(HistoryEntry::label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
