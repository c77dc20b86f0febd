use thiserror::Error;

/// Engine errors.
///
/// Malformed definitions never surface here; they expand to nothing. Only
/// failures of the collaborators the engine calls into (the rule engine and
/// the record store) are reported.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    TimeError(#[from] eventide_time::TimeError),

    #[error(transparent)]
    CoreError(#[from] eventide_core::error::CoreError),

    #[error("Store error: {0}")]
    StoreError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl EngineError {
    /// Wraps an error raised by a record store.
    #[must_use]
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::StoreError(Box::new(err))
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
