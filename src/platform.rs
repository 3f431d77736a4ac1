//! Host platform facts the round controllers gate on.

use serde::{Deserialize, Serialize};

/// Physical sensor a round subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorKind {
    Microphone,
    Motion,
}

impl SensorKind {
    /// Get human-readable name for display
    pub fn display_name(&self) -> &'static str {
        match self {
            SensorKind::Microphone => "Microphone",
            SensorKind::Motion => "Motion sensor",
        }
    }
}

/// Facts about the embedding environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformInfo {
    /// Whether the page was served from a secure origin (HTTPS or localhost).
    /// Microphone capture is refused outside a secure context.
    pub secure_context: bool,
}

impl Default for PlatformInfo {
    fn default() -> Self {
        Self {
            secure_context: true,
        }
    }
}
