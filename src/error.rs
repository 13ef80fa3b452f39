use chrono::Weekday;

/// Failures raised by the tracking domain and the services built on it.
///
/// Handlers turn these into user feedback; only `Database` is worth
/// logging at error level.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Unknown priority '{0}'. Use low, medium, high or urgent")]
    InvalidPriority(String),

    #[error("Unknown status '{0}'. Use done, partial, cancel or postpone")]
    InvalidStatus(String),

    #[error("Unknown day '{0}'. Use 1-7 or mon..sun")]
    InvalidDay(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Task is not scheduled on {0}")]
    DayNotScheduled(Weekday),

    #[error("Task #{0} is archived, reopen it first")]
    TaskArchived(i64),

    #[error("Task #{0} not found")]
    TaskNotFound(i64),

    #[error("{entity} #{id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Stored record is corrupt: {0}")]
    CorruptRecord(String),

    #[error("Database query failed")]
    Database {
        #[from]
        source: sqlx::Error,
    },
}

/// Shorthand used by the domain and service layers.
pub type TrackerResult<T> = Result<T, TrackerError>;

impl TrackerError {
    /// Whether the message is safe and useful to show to the chat as-is.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Database { .. } | Self::CorruptRecord(_))
    }
}
