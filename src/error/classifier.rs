// Classifier error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Classifier error code constants
///
/// Error code range: 4001-4004
pub struct ClassifierErrorCodes {}

impl ClassifierErrorCodes {
    /// No classifier endpoints were configured
    pub const NO_ENDPOINTS: i32 = 4001;

    /// A single endpoint failed to load
    pub const LOAD_FAILED: i32 = 4002;

    /// Every configured endpoint failed to load
    pub const ALL_ENDPOINTS_FAILED: i32 = 4003;

    /// A single classification call failed
    pub const CLASSIFICATION_FAILED: i32 = 4004;
}

/// Log a classifier error with structured context
pub fn log_classifier_error(err: &ClassifierError, context: &str) {
    error!(
        "Classifier error in {}: code={}, component=Classifier, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Classifier-related errors
///
/// Load failures are fatal for round start. `ClassificationFailed` is
/// transient: the tick that hit it scores zero laughter and the round goes on.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierError {
    /// Endpoint list is empty
    NoEndpoints,

    /// Loading from one endpoint failed
    LoadFailed { endpoint: String, reason: String },

    /// Every endpoint was tried and failed
    AllEndpointsFailed { attempts: Vec<String> },

    /// One classification call failed
    ClassificationFailed { reason: String },
}

impl ClassifierError {
    /// Whether the failure only affects the current tick
    pub fn is_transient(&self) -> bool {
        matches!(self, ClassifierError::ClassificationFailed { .. })
    }
}

impl ErrorCode for ClassifierError {
    fn code(&self) -> i32 {
        match self {
            ClassifierError::NoEndpoints => ClassifierErrorCodes::NO_ENDPOINTS,
            ClassifierError::LoadFailed { .. } => ClassifierErrorCodes::LOAD_FAILED,
            ClassifierError::AllEndpointsFailed { .. } => {
                ClassifierErrorCodes::ALL_ENDPOINTS_FAILED
            }
            ClassifierError::ClassificationFailed { .. } => {
                ClassifierErrorCodes::CLASSIFICATION_FAILED
            }
        }
    }

    fn message(&self) -> String {
        match self {
            ClassifierError::NoEndpoints => "No classifier endpoints configured".to_string(),
            ClassifierError::LoadFailed { endpoint, reason } => {
                format!("Failed to load classifier from {}: {}", endpoint, reason)
            }
            ClassifierError::AllEndpointsFailed { attempts } => {
                format!(
                    "Classifier failed to load from all {} endpoints: {}",
                    attempts.len(),
                    attempts.join("; ")
                )
            }
            ClassifierError::ClassificationFailed { reason } => {
                format!("Classification failed: {}", reason)
            }
        }
    }
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClassifierError (code {}): {}",
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ClassifierError {}
