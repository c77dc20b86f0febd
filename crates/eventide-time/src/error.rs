use thiserror::Error;

/// Errors raised while resolving zones or expanding repeat rules.
#[derive(Error, Debug)]
pub enum TimeError {
    /// Unknown or invalid timezone identifier.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// The rule-expansion capability rejected a repeat rule.
    #[error("Invalid repeat rule {rule:?}: {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error(transparent)]
    CoreError(#[from] eventide_core::error::CoreError),
}

pub type TimeResult<T> = std::result::Result<T, TimeError>;
