//! Error types for the cache-first worker.

/// Worker errors.
#[derive(Debug, thiserror::Error)]
pub enum PrecacheError {
    /// Network fetch failed before a response was received.
    #[error("network error: {message}")]
    Network { message: String },

    /// A seed resource could not be pre-cached; the install batch failed.
    #[error("install failed at {url}: {reason}")]
    Install { url: String, reason: String },

    /// Cache store error (open, read, write, delete).
    #[error("cache error: {message}")]
    Cache { message: String },

    /// Stored body does not match the digest recorded at write time.
    #[error("cache integrity check failed for {url}: expected {expected}, got {actual}")]
    Integrity {
        url: String,
        expected: String,
        actual: String,
    },

    /// URL could not be parsed or resolved against the origin.
    #[error("invalid url: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl PrecacheError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            // Config issues
            Self::Config { .. } => 1,
            Self::InvalidUrl { .. } => 1,

            // Install batch rejected
            Self::Install { .. } => 3,

            // Store corruption
            Self::Integrity { .. } => 4,

            // Network
            Self::Network { .. } => 5,

            // Other
            Self::Cache { .. } => 6,
        }
    }
}

impl From<reqwest::Error> for PrecacheError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for worker operations.
pub type PrecacheResult<T> = Result<T, PrecacheError>;
