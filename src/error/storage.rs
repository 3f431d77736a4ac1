// Storage error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Storage error code constants
///
/// Error code range: 5001-5003
pub struct StorageErrorCodes {}

impl StorageErrorCodes {
    /// Reading or writing the backing store failed
    pub const IO: i32 = 5001;

    /// Leaderboard could not be encoded
    pub const ENCODE: i32 = 5002;

    /// Store mutex was poisoned
    pub const LOCK_POISONED: i32 = 5003;
}

/// Log a storage error with structured context
pub fn log_storage_error(err: &StorageError, context: &str) {
    error!(
        "Storage error in {}: code={}, component=ScoreStore, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Key-value persistence errors
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// Backend read/write failure
    Io { details: String },

    /// Serialization failure
    Encode { details: String },

    /// Mutex protecting an in-memory store was poisoned
    LockPoisoned,
}

impl ErrorCode for StorageError {
    fn code(&self) -> i32 {
        match self {
            StorageError::Io { .. } => StorageErrorCodes::IO,
            StorageError::Encode { .. } => StorageErrorCodes::ENCODE,
            StorageError::LockPoisoned => StorageErrorCodes::LOCK_POISONED,
        }
    }

    fn message(&self) -> String {
        match self {
            StorageError::Io { details } => format!("Storage I/O error: {}", details),
            StorageError::Encode { details } => {
                format!("Failed to encode leaderboard: {}", details)
            }
            StorageError::LockPoisoned => "Store lock poisoned".to_string(),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io {
            details: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Encode {
            details: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_codes() {
        assert_eq!(
            StorageError::Io {
                details: "x".to_string()
            }
            .code(),
            5001
        );
        assert_eq!(
            StorageError::Encode {
                details: "x".to_string()
            }
            .code(),
            5002
        );
        assert_eq!(StorageError::LockPoisoned.code(), 5003);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::other("disk full");
        let err: StorageError = io_err.into();
        match err {
            StorageError::Io { details } => assert!(details.contains("disk full")),
            _ => panic!("Expected Io variant"),
        }
    }
}
