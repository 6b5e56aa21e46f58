/// Result alias that carries the custom [`LipSyncError`] type.
pub type Result<T> = std::result::Result<T, LipSyncError>;

/// Common error type for the core crate.
///
/// Steady-state operation never fails: `tick()` always returns a
/// renderable shape. Errors only surface at the `init` boundary (bad
/// buffer geometry, unusable sample rate) or from host-side IO.
#[derive(Debug, thiserror::Error)]
pub enum LipSyncError {
    /// Free-form error raised by higher level plumbing.
    #[error("{0}")]
    Message(String),
    /// Contract violation rejected at the engine boundary.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl LipSyncError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for LipSyncError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for LipSyncError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
