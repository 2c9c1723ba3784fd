use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("validation_error - {0}")]
    Validation(String),
    #[error("invalid_command - {0}")]
    Parse(String),
    #[error("not_found - {0}")]
    NotFound(String),
    #[error("empty_history - {0}")]
    EmptyHistory(String),
    #[error("duplicate_task - {0}")]
    Duplicate(String),
    #[error("invalid_data - {0}")]
    InvalidData(String),
    #[error("io_error - {0}")]
    Io(String),
    #[error("internal_error - {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation<M: Into<String>>(message: M) -> Self {
        Self::Validation(message.into())
    }

    pub fn parse<M: Into<String>>(message: M) -> Self {
        Self::Parse(message.into())
    }

    pub fn not_found<M: Into<String>>(message: M) -> Self {
        Self::NotFound(message.into())
    }

    pub fn empty_history<M: Into<String>>(message: M) -> Self {
        Self::EmptyHistory(message.into())
    }

    pub fn duplicate<M: Into<String>>(message: M) -> Self {
        Self::Duplicate(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Parse(_) => "invalid_command",
            Self::NotFound(_) => "not_found",
            Self::EmptyHistory(_) => "empty_history",
            Self::Duplicate(_) => "duplicate_task",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// The text shown to the user, without the error code.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::Parse(message)
            | Self::NotFound(message)
            | Self::EmptyHistory(message)
            | Self::Duplicate(message)
            | Self::InvalidData(message)
            | Self::Io(message)
            | Self::Internal(message) => message,
        }
    }

    /// Whether the error comes from user input rather than from the
    /// environment or a broken invariant.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Parse(_)
                | Self::NotFound(_)
                | Self::EmptyHistory(_)
                | Self::Duplicate(_)
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}
