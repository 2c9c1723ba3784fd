use crate::model::task::Task;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    Undone,
    Done,
    All,
}

impl StatusFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "undone" => Some(Self::Undone),
            "done" => Some(Self::Done),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Undone => "undone",
            Self::Done => "completed",
            Self::All => "all",
        }
    }

    fn admits(self, task: &Task) -> bool {
        match self {
            Self::Undone => !task.is_done(),
            Self::Done => task.is_done(),
            Self::All => true,
        }
    }
}

/// What the user currently sees. An empty keyword list means no keyword
/// restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: StatusFilter,
    pub keywords: Vec<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.admits(task)
            && (self.keywords.is_empty() || task.matches_any_keyword(&self.keywords))
    }
}
