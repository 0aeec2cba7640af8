//! Unified error type for the tracker.
//!
//! Validation failures are returned to the caller and shown to the user. Row-level
//! parse failures never escape reconciliation; they are logged and counted instead.

use thiserror::Error;

/// Every failure the tracker can surface.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The store rejected a query or write
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The store could not be reached at all
    #[error("Could not connect to the store: {message} (hint: {hint})")]
    Connection {
        /// Raw message from the driver
        message: String,
        /// Operator-facing hint
        hint: &'static str,
    },

    /// A goal id did not match any goal in the cycle
    #[error("Goal '{id}' not found")]
    GoalNotFound {
        /// Goal id that was looked up
        id: String,
    },

    /// A tactic id did not match any tactic in the goal
    #[error("Tactic '{tactic_id}' not found in goal '{goal_id}'")]
    TacticNotFound {
        /// Owning goal id
        goal_id: String,
        /// Tactic id that was looked up
        tactic_id: String,
    },

    /// A metric id did not match any metric in the goal
    #[error("Metric '{metric_id}' not found in goal '{goal_id}'")]
    MetricNotFound {
        /// Owning goal id
        goal_id: String,
        /// Metric id that was looked up
        metric_id: String,
    },

    /// An id is already taken within its owner
    #[error("{kind} id '{id}' already exists")]
    DuplicateId {
        /// Entity kind, e.g. "Tactic"
        kind: &'static str,
        /// Colliding id
        id: String,
    },

    /// Week numbers run from 1 to 13
    #[error("Week {week} is outside the cycle (expected 1-13)")]
    InvalidWeek {
        /// Offending week number
        week: i64,
    },

    /// Times must be `HH:MM` on a 24-hour clock
    #[error("Invalid time '{value}': expected HH:MM")]
    InvalidTime {
        /// Offending input
        value: String,
    },

    /// A free-form input failed validation
    #[error("Invalid input: {message}")]
    Validation {
        /// What was wrong with it
        message: String,
    },

    /// A single stored row could not be parsed
    #[error("Bad row {row} in {table}: {message}")]
    RowParse {
        /// Table the row came from
        table: &'static str,
        /// Zero-based row index
        row: usize,
        /// Parse failure
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Formatting a reply failed
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
