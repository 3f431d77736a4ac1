// Error types for the fun meter engine
//
// This module defines custom error types for round lifecycle, classifier and
// storage operations. Every error carries a stable numeric code so UI layers
// can react to the class of failure without parsing messages.

mod classifier;
mod round;
mod storage;

pub use classifier::{log_classifier_error, ClassifierError, ClassifierErrorCodes};
pub use round::{log_round_error, RoundError, RoundErrorCodes};
pub use storage::{log_storage_error, StorageError, StorageErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the UI boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
