// ================================================================
// File: kudos-common/src/error.rs
// ================================================================

use thiserror::Error;
use crate::models::platform::Platform;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found error: {0}")]
    NotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The store rejected or failed a write.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A platform was picked that is not in the form's available pool.
    #[error("Invalid platform selection: {0}")]
    InvalidPlatform(Platform),

    /// Nothing left in the pool to pick from.
    #[error("No platform available")]
    NoPlatformAvailable,

    #[error("Unknown link field: #{0}")]
    UnknownField(u64),

    #[error("Invalid vote delta: {0} (expected +1 or -1)")]
    InvalidVote(i64),

    /// The vote widget's background task is gone.
    #[error("Vote widget closed")]
    WidgetClosed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Programmer/state errors: a UI desync rather than bad user input.
    pub fn is_invalid_platform(&self) -> bool {
        matches!(
            self,
            Error::InvalidPlatform(_) | Error::NoPlatformAvailable | Error::UnknownField(_)
        )
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Parse(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Parse(s.to_string())
    }
}
