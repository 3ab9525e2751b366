/// Convenience result type used across Wayline.
pub type WaylineResult<T> = Result<T, WaylineError>;

/// Top-level error taxonomy used by the library APIs.
#[derive(thiserror::Error, Debug)]
pub enum WaylineError {
    /// Invalid user-provided configuration data.
    #[error("config error: {0}")]
    Config(String),

    /// Font discovery or registration failures.
    #[error("font error: {0}")]
    Font(String),

    /// Faults while rasterizing or encoding the card.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WaylineError {
    /// Build a [`WaylineError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`WaylineError::Font`] value.
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`WaylineError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
