//! Error types for `chore_tracker`.
//!
//! Expected conditions (a missing task, a move past the end of the list) are
//! not errors: store operations report them as `Ok(None)` or `Ok(false)`.

/// Reasons a suggestion provider could not produce candidates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The provider is not configured or its backing command is missing.
    #[error("suggestions unavailable: {0}")]
    Unavailable(String),

    /// The provider ran but reported failure.
    #[error("suggestion provider failed (exit code {exit_code}): {message}")]
    Failed {
        /// Exit code of the provider process.
        exit_code: i32,
        /// Diagnostic output from the provider.
        message: String,
    },

    /// The provider did not answer in time.
    #[error("suggestion provider timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout in seconds.
        timeout_secs: u64,
    },
}

/// Errors that can occur in the chore tracker.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON serialization error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `SQLite` storage error occurred. The failing operation was rolled back.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Caller-supplied input was rejected.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The suggestion provider failed before anything was merged.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A template error occurred.
    #[error("Template error: {0}")]
    Template(String),
}

impl Error {
    /// Build a validation error from any displayable message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error came from the storage layer.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
