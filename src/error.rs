use thiserror::Error;

/// Unified error type for four-keys operations
#[derive(Error, Debug)]
pub enum FourKeysError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("No newer commit to traverse to")]
    NoNewerCommit,

    #[error("Commit {older} is not an ancestor of {newer}")]
    IllegalCommitOrder { older: String, newer: String },

    #[error("Repository log is unavailable: {0}")]
    LogUnavailable(String),

    #[error("Repository has {count} root commits reachable from {from}")]
    AmbiguousRoot { from: String, count: usize },

    #[error("Invalid {filter}: {source}")]
    InvalidFilterPattern {
        filter: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("Interval '{interval}' is too short for a range of {hours} hours")]
    IntervalTooShort { interval: String, hours: i64 },

    #[error("Unavailable interval \"{0}\". Interval should be one of day, week, month")]
    UnknownInterval(String),

    #[error("Invalid range: since {since} is after until {until}")]
    InvalidRange { since: String, until: String },

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in four-keys
pub type Result<T> = std::result::Result<T, FourKeysError>;

impl FourKeysError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        FourKeysError::Config(msg.into())
    }

    /// Create a backend error with context
    pub fn backend(msg: impl Into<String>) -> Self {
        FourKeysError::Backend(msg.into())
    }

    /// Create a log-unavailable error with context
    pub fn log_unavailable(msg: impl Into<String>) -> Self {
        FourKeysError::LogUnavailable(msg.into())
    }

    /// True for errors raised while walking a single release window.
    ///
    /// These are absorbed into "no data" defaults instead of failing the query.
    pub fn is_traversal(&self) -> bool {
        matches!(
            self,
            FourKeysError::NoNewerCommit
                | FourKeysError::IllegalCommitOrder { .. }
                | FourKeysError::LogUnavailable(_)
                | FourKeysError::AmbiguousRoot { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FourKeysError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FourKeysError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_invalid_filter_names_the_filter() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = FourKeysError::InvalidFilterPattern {
            filter: "ignorePattern",
            source,
        };
        assert!(err.to_string().starts_with("Invalid ignorePattern"));
    }

    #[test]
    fn test_traversal_errors_are_recoverable() {
        let recoverable = vec![
            FourKeysError::NoNewerCommit,
            FourKeysError::IllegalCommitOrder {
                older: "a".to_string(),
                newer: "b".to_string(),
            },
            FourKeysError::log_unavailable("missing object"),
            FourKeysError::AmbiguousRoot {
                from: "a".to_string(),
                count: 2,
            },
        ];
        for err in recoverable {
            assert!(err.is_traversal(), "{} should be recoverable", err);
        }

        assert!(!FourKeysError::config("x").is_traversal());
        assert!(!FourKeysError::UnknownInterval("year".to_string()).is_traversal());
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (FourKeysError::config("x"), "Configuration error"),
            (FourKeysError::backend("x"), "Backend error"),
            (FourKeysError::log_unavailable("x"), "Repository log is unavailable"),
            (
                FourKeysError::IntervalTooShort {
                    interval: "week".to_string(),
                    hours: 24,
                },
                "Interval 'week' is too short",
            ),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
