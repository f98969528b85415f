//! Error types for Persona operations.
//!
//! [`FetchError`] is the only domain failure: the upstream content API could
//! not be read, or returned something that is not a profile. [`Error`] wraps
//! it together with the plumbing failures (I/O, configuration, serialization)
//! that the CLI and server surface.

use thiserror::Error;

/// Failure reading profile content from a content source.
///
/// `Clone` so that the revalidation cache can hand the last error out to
/// every reader of a key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The upstream could not be reached (connect, DNS, timeout).
    #[error("upstream unreachable: {0}")]
    Unreachable(String),

    /// The upstream answered with a non-success status.
    #[error("upstream returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },

    /// The upstream answered, but the body is not a valid profile.
    #[error("malformed upstream content: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Create an unreachable error.
    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::Unreachable(msg.into())
    }

    /// Create a malformed-content error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Whether a retry has a chance of succeeding.
    ///
    /// Unreachable upstreams, rate limiting and server errors are transient;
    /// client errors and malformed bodies are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unreachable(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Malformed(_) => false,
        }
    }
}

/// Errors that can occur in Persona operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Content could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error tied to a specific path.
    #[error("I/O error at {path}: {source}")]
    IoWithPath {
        /// The path being read or written.
        path: std::path::PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Attach a path to an I/O error.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<std::path::Path>) -> Self {
        Self::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Result type alias using Persona's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_retryable() {
        assert!(FetchError::unreachable("refused").is_retryable());
        assert!(FetchError::Status { status: 503, body: String::new() }.is_retryable());
        assert!(FetchError::Status { status: 429, body: String::new() }.is_retryable());
        assert!(!FetchError::Status { status: 404, body: String::new() }.is_retryable());
        assert!(!FetchError::malformed("not json").is_retryable());
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status {
            status: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "upstream returned 502: bad gateway");
    }

    #[test]
    fn test_error_from_fetch_is_transparent() {
        let err: Error = FetchError::unreachable("timed out").into();
        assert_eq!(err.to_string(), "upstream unreachable: timed out");
    }

    #[test]
    fn test_io_with_path_display() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = Error::io_with_path(io, "/tmp/page.html");
        assert!(err.to_string().contains("/tmp/page.html"));
    }
}
