// RoundEvent - everything the UI needs to render a round
//
// Controllers never touch a UI. They publish these values on a broadcast
// channel and whoever renders subscribes.

use serde::Serialize;

use crate::scoring::MeterReading;
use crate::storage::GameMode;

/// Round lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    Idle,
    /// Measuring the ambient baseline (laugh only)
    Calibrating,
    Active,
    Finished,
}

/// Severity of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishCause {
    /// Ran the full duration
    Completed,
    /// Stopped early by the player; scored 0
    Stopped,
}

/// Final result of a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub mode: GameMode,
    pub player: String,
    pub score: u32,
    pub personal_best: bool,
    /// 1-based leaderboard position, `None` outside the top entries
    pub rank: Option<usize>,
    /// False when the leaderboard write failed
    pub persisted: bool,
    pub cause: FinishCause,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundEvent {
    Phase {
        mode: GameMode,
        phase: RoundPhase,
    },
    Meter {
        mode: GameMode,
        reading: MeterReading,
    },
    Score {
        mode: GameMode,
        score: u32,
        elapsed_ms: u64,
    },
    Status {
        mode: GameMode,
        level: StatusLevel,
        message: String,
    },
    Controls {
        mode: GameMode,
        start_enabled: bool,
        stop_enabled: bool,
    },
    Finished(RoundSummary),
}

impl RoundEvent {
    pub fn mode(&self) -> GameMode {
        match self {
            RoundEvent::Phase { mode, .. }
            | RoundEvent::Meter { mode, .. }
            | RoundEvent::Score { mode, .. }
            | RoundEvent::Status { mode, .. }
            | RoundEvent::Controls { mode, .. } => *mode,
            RoundEvent::Finished(summary) => summary.mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = RoundEvent::Status {
            mode: GameMode::Shake,
            level: StatusLevel::Warning,
            message: "No motion data detected".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "status");
        assert_eq!(json["mode"], "shake");
        assert_eq!(json["level"], "warning");
    }

    #[test]
    fn test_finished_event_carries_summary() {
        let event = RoundEvent::Finished(RoundSummary {
            mode: GameMode::Laugh,
            player: "Ann".to_string(),
            score: 56,
            personal_best: true,
            rank: Some(1),
            persisted: true,
            cause: FinishCause::Completed,
        });
        assert_eq!(event.mode(), GameMode::Laugh);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "finished");
        assert_eq!(json["score"], 56);
        assert_eq!(json["cause"], "completed");
    }
}
