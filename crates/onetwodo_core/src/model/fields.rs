use crate::error::AppError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    pub const CONSTRAINTS: &'static str = "Task name should not be blank";

    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation(Self::CONSTRAINTS));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Description(String);

impl Description {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const CONSTRAINTS: &'static str = "Priority can only be high, medium or low";

    /// Only the first letter counts, so `h`, `High` and `hurry` all mean high.
    pub fn is_valid_priority(test: char) -> bool {
        matches!(test.to_ascii_uppercase(), 'H' | 'M' | 'L')
    }

    /// Blank input means the task has no priority.
    pub fn parse(raw: &str) -> Result<Option<Self>, AppError> {
        let first = match raw.trim().chars().next() {
            Some(first) => first,
            None => return Ok(None),
        };
        if !Self::is_valid_priority(first) {
            return Err(AppError::validation(Self::CONSTRAINTS));
        }
        let priority = match first.to_ascii_uppercase() {
            'H' => Self::High,
            'M' => Self::Medium,
            _ => Self::Low,
        };
        Ok(Some(priority))
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
    pub const CONSTRAINTS: &'static str = "Tags names should be alphanumeric";

    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        let valid = !trimmed.is_empty()
            && trimmed
                .chars()
                .all(|ch| ch.is_alphanumeric() || ch == '-' || ch == '_');
        if !valid {
            return Err(AppError::validation(format!(
                "{} (got '{trimmed}')",
                Self::CONSTRAINTS
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}
