use crate::datetime::format_timestamp;
use crate::error::AppError;
use crate::model::fields::{Description, Name, Priority, Tag};
use std::collections::BTreeSet;
use std::fmt;
use time::PrimitiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    Event,
    Deadline,
    Todo,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [TaskType::Event, TaskType::Deadline, TaskType::Todo];

    pub fn from_char(value: char) -> Option<Self> {
        match value.to_ascii_lowercase() {
            'e' => Some(Self::Event),
            'd' => Some(Self::Deadline),
            't' => Some(Self::Todo),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Event => 'e',
            Self::Deadline => 'd',
            Self::Todo => 't',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Deadline => "deadline",
            Self::Todo => "todo",
        }
    }
}

/// A validated task. Fields are only reachable through accessors; changes go
/// through [`crate::model::ToDoList`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    name: Name,
    start: Option<PrimitiveDateTime>,
    end: Option<PrimitiveDateTime>,
    description: Description,
    priority: Option<Priority>,
    tags: BTreeSet<Tag>,
    done: bool,
}

impl Task {
    pub const START_WITHOUT_END: &'static str = "An event needs an end date as well as a start date";
    pub const START_AFTER_END: &'static str = "Start date must not be later than end date";

    pub fn new(
        name: Name,
        start: Option<PrimitiveDateTime>,
        end: Option<PrimitiveDateTime>,
        description: Description,
        priority: Option<Priority>,
        tags: BTreeSet<Tag>,
    ) -> Result<Self, AppError> {
        match (start, end) {
            (Some(_), None) => return Err(AppError::validation(Self::START_WITHOUT_END)),
            (Some(start), Some(end)) if start > end => {
                return Err(AppError::validation(Self::START_AFTER_END));
            }
            _ => {}
        }

        Ok(Self {
            name,
            start,
            end,
            description,
            priority,
            tags,
            done: false,
        })
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn start(&self) -> Option<PrimitiveDateTime> {
        self.start
    }

    pub fn end(&self) -> Option<PrimitiveDateTime> {
        self.end
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.tags
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn task_type(&self) -> TaskType {
        match (self.start, self.end) {
            (Some(_), Some(_)) => TaskType::Event,
            (None, Some(_)) => TaskType::Deadline,
            _ => TaskType::Todo,
        }
    }

    pub(crate) fn set_done(&mut self, done: bool) {
        self.done = done;
    }

    /// Duplicate rule: same name, dates and description. Priority, tags and
    /// completion do not make two tasks different.
    pub fn is_same_task_as(&self, other: &Task) -> bool {
        self.name == other.name
            && self.start == other.start
            && self.end == other.end
            && self.description == other.description
    }

    /// Case-insensitive substring match of any keyword against the name,
    /// description or tags.
    pub fn matches_any_keyword(&self, keywords: &[String]) -> bool {
        let name = self.name.as_str().to_lowercase();
        let description = self.description.as_str().to_lowercase();
        keywords.iter().any(|keyword| {
            let keyword = keyword.to_lowercase();
            name.contains(&keyword)
                || description.contains(&keyword)
                || self
                    .tags
                    .iter()
                    .any(|tag| tag.as_str().to_lowercase().contains(&keyword))
        })
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(start) = self.start {
            let start = format_timestamp(start).map_err(|_| fmt::Error)?;
            write!(f, " start: {start}")?;
        }
        if let Some(end) = self.end {
            let end = format_timestamp(end).map_err(|_| fmt::Error)?;
            write!(f, " end: {end}")?;
        }
        if let Some(priority) = self.priority {
            write!(f, " priority: {priority}")?;
        }
        if !self.description.is_empty() {
            write!(f, " description: {}", self.description)?;
        }
        if !self.tags.is_empty() {
            write!(f, " tags: ")?;
            for tag in &self.tags {
                write!(f, "{tag}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskType};
    use crate::model::fields::{Description, Name, Priority, Tag};
    use std::collections::BTreeSet;
    use time::macros::datetime;

    fn name(raw: &str) -> Name {
        Name::parse(raw).unwrap()
    }

    #[test]
    fn task_type_follows_dates() {
        let todo = Task::new(name("a"), None, None, Description::default(), None, BTreeSet::new())
            .unwrap();
        let deadline = Task::new(
            name("b"),
            None,
            Some(datetime!(2026-10-20 18:00)),
            Description::default(),
            None,
            BTreeSet::new(),
        )
        .unwrap();
        let event = Task::new(
            name("c"),
            Some(datetime!(2026-10-20 09:00)),
            Some(datetime!(2026-10-20 10:00)),
            Description::default(),
            None,
            BTreeSet::new(),
        )
        .unwrap();

        assert_eq!(todo.task_type(), TaskType::Todo);
        assert_eq!(deadline.task_type(), TaskType::Deadline);
        assert_eq!(event.task_type(), TaskType::Event);
    }

    #[test]
    fn rejects_start_without_end_and_inverted_range() {
        let err = Task::new(
            name("a"),
            Some(datetime!(2026-10-20 09:00)),
            None,
            Description::default(),
            None,
            BTreeSet::new(),
        )
        .unwrap_err();
        assert_eq!(err.message(), Task::START_WITHOUT_END);

        let err = Task::new(
            name("a"),
            Some(datetime!(2026-10-21 09:00)),
            Some(datetime!(2026-10-20 09:00)),
            Description::default(),
            None,
            BTreeSet::new(),
        )
        .unwrap_err();
        assert_eq!(err.message(), Task::START_AFTER_END);
    }

    #[test]
    fn same_task_ignores_priority_tags_and_completion() {
        let plain = Task::new(
            name("Buy milk"),
            None,
            None,
            Description::default(),
            None,
            BTreeSet::new(),
        )
        .unwrap();
        let mut decorated = Task::new(
            name("Buy milk"),
            None,
            None,
            Description::default(),
            Some(Priority::High),
            [Tag::parse("home").unwrap()].into_iter().collect(),
        )
        .unwrap();
        decorated.set_done(true);

        assert!(plain.is_same_task_as(&decorated));
        assert_ne!(plain, decorated);
    }

    #[test]
    fn display_string_lists_present_fields() {
        let task = Task::new(
            name("Buy milk"),
            None,
            Some(datetime!(2026-10-20 18:00)),
            Description::new("skim"),
            Some(Priority::Low),
            [Tag::parse("home").unwrap(), Tag::parse("errand").unwrap()]
                .into_iter()
                .collect(),
        )
        .unwrap();

        assert_eq!(
            task.to_string(),
            "Buy milk end: 2026-10-20 18:00 priority: LOW description: skim tags: [errand][home]"
        );
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let task = Task::new(
            name("Read Book"),
            None,
            None,
            Description::new("chapter two"),
            None,
            [Tag::parse("Leisure").unwrap()].into_iter().collect(),
        )
        .unwrap();

        assert!(task.matches_any_keyword(&["book".to_string()]));
        assert!(task.matches_any_keyword(&["CHAPTER".to_string()]));
        assert!(task.matches_any_keyword(&["zzz".to_string(), "leis".to_string()]));
        assert!(!task.matches_any_keyword(&["milk".to_string()]));
    }
}
