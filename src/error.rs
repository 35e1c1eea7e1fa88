//! Error types for scrollchat.

use thiserror::Error;

/// Common error type for scrollchat.
#[derive(Error, Debug)]
pub enum ChatError {
    /// I/O error (bind, accept, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A history index outside `[0, len)` was requested.
    #[error("history index {index} out of range (length {len})")]
    OutOfRange {
        /// The requested index.
        index: usize,
        /// History length at the time of the request.
        len: usize,
    },
}

/// Result type alias for scrollchat operations.
pub type Result<T> = std::result::Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_display() {
        let err = ChatError::OutOfRange { index: 7, len: 3 };
        assert_eq!(err.to_string(), "history index 7 out of range (length 3)");
    }

    #[test]
    fn test_config_error_display() {
        let err = ChatError::Config("bad port".to_string());
        assert_eq!(err.to_string(), "configuration error: bad port");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "peer gone");
        let err: ChatError = io_err.into();
        assert!(matches!(err, ChatError::Io(_)));
        assert!(err.to_string().contains("peer gone"));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(ChatError::Config("test".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
