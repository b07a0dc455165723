/// Convenience result type used across cueline.
pub type CuelineResult<T> = Result<T, CuelineError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum CuelineError {
    /// Invalid user-provided or layout data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while declaring or querying schedule windows.
    #[error("schedule error: {0}")]
    Schedule(String),

    /// Errors while partitioning scene blocks.
    #[error("split error: {0}")]
    Split(String),

    /// Errors from the bulk completion driver; surfaced as a degraded frame.
    #[error("process error: {0}")]
    Process(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CuelineError {
    /// Build a [`CuelineError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CuelineError::Schedule`] value.
    pub fn schedule(msg: impl Into<String>) -> Self {
        Self::Schedule(msg.into())
    }

    /// Build a [`CuelineError::Split`] value.
    pub fn split(msg: impl Into<String>) -> Self {
        Self::Split(msg.into())
    }

    /// Build a [`CuelineError::Process`] value.
    pub fn process(msg: impl Into<String>) -> Self {
        Self::Process(msg.into())
    }
}
