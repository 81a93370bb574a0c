/// Convenience result type used across swathscale.
pub type SwathResult<T> = Result<T, SwathError>;

/// Top-level error taxonomy used by the processing pipeline.
#[derive(thiserror::Error, Debug)]
pub enum SwathError {
    /// Missing or malformed topic configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A filename did not conform to its pattern, or a pattern could not be composed.
    #[error("pattern error: {0}")]
    Pattern(String),

    /// Raster decode, encode, or geometry failures.
    #[error("raster error: {0}")]
    Raster(String),

    /// Overlay rendering failures.
    #[error("overlay error: {0}")]
    Overlay(String),

    /// Malformed inbound notification.
    #[error("notification error: {0}")]
    Notification(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SwathError {
    /// Build a [`SwathError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`SwathError::Pattern`] value.
    pub fn pattern(msg: impl Into<String>) -> Self {
        Self::Pattern(msg.into())
    }

    /// Build a [`SwathError::Raster`] value.
    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster(msg.into())
    }

    /// Build a [`SwathError::Overlay`] value.
    pub fn overlay(msg: impl Into<String>) -> Self {
        Self::Overlay(msg.into())
    }

    /// Build a [`SwathError::Notification`] value.
    pub fn notification(msg: impl Into<String>) -> Self {
        Self::Notification(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
