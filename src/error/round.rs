// Round lifecycle error types and constants

use crate::error::{ErrorCode, StorageError};
use crate::platform::SensorKind;
use log::error;
use std::fmt;

/// Round error code constants
///
/// Error code range: 3001-3006
pub struct RoundErrorCodes {}

impl RoundErrorCodes {
    /// Microphone or motion access was refused by the user or platform
    pub const PERMISSION_DENIED: i32 = 3001;

    /// Invalid player name or insecure context
    pub const PRECONDITION_FAILED: i32 = 3002;

    /// Classifier could not be loaded from any endpoint
    pub const SERVICE_UNAVAILABLE: i32 = 3003;

    /// Sensor exists but could not be opened
    pub const SENSOR_UNAVAILABLE: i32 = 3004;

    /// Round state mutex was poisoned
    pub const LOCK_POISONED: i32 = 3005;

    /// Leaderboard could not be written
    pub const STORAGE: i32 = 3006;
}

/// Log a round error with structured context
///
/// Prints the error code, the owning component and the message so abort
/// paths can be traced from logs alone.
pub fn log_round_error(err: &RoundError, context: &str) {
    error!(
        "Round error in {}: code={}, component=RoundController, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Round-level errors
///
/// Every variant except `Storage` aborts round start and leaves the
/// controller idle with no sensor resources held.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundError {
    /// Sensor access refused
    PermissionDenied { sensor: SensorKind },

    /// A gate checked before any sensor access failed
    PreconditionFailed { reason: String },

    /// The classifier service could not be initialized
    ServiceUnavailable { reason: String },

    /// The sensor failed to open for a reason other than denial
    SensorUnavailable { sensor: SensorKind, reason: String },

    /// Round slot mutex was poisoned
    LockPoisoned,

    /// Persisting the final score failed
    Storage(StorageError),
}

impl ErrorCode for RoundError {
    fn code(&self) -> i32 {
        match self {
            RoundError::PermissionDenied { .. } => RoundErrorCodes::PERMISSION_DENIED,
            RoundError::PreconditionFailed { .. } => RoundErrorCodes::PRECONDITION_FAILED,
            RoundError::ServiceUnavailable { .. } => RoundErrorCodes::SERVICE_UNAVAILABLE,
            RoundError::SensorUnavailable { .. } => RoundErrorCodes::SENSOR_UNAVAILABLE,
            RoundError::LockPoisoned => RoundErrorCodes::LOCK_POISONED,
            RoundError::Storage(_) => RoundErrorCodes::STORAGE,
        }
    }

    fn message(&self) -> String {
        match self {
            RoundError::PermissionDenied { sensor } => {
                format!("{} permission denied", sensor.display_name())
            }
            RoundError::PreconditionFailed { reason } => {
                format!("Precondition failed: {}", reason)
            }
            RoundError::ServiceUnavailable { reason } => {
                format!("Classifier unavailable: {}", reason)
            }
            RoundError::SensorUnavailable { sensor, reason } => {
                format!("{} unavailable: {}", sensor.display_name(), reason)
            }
            RoundError::LockPoisoned => "Round state lock poisoned".to_string(),
            RoundError::Storage(err) => format!("Failed to save score: {}", err.message()),
        }
    }
}

impl fmt::Display for RoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoundError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for RoundError {}

impl From<StorageError> for RoundError {
    fn from(err: StorageError) -> Self {
        RoundError::Storage(err)
    }
}
