// ShakeRoundController - Idle -> Active -> Finished -> Idle
//
// No calibration and no secure-context gate. start() asks for motion
// permission when the platform wants it, subscribes to motion events and
// spawns a ~60 Hz frame loop that finalizes after 10 s of frames.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use crate::config::MotionRoundConfig;
use crate::engine::events::{FinishCause, RoundEvent, RoundPhase, RoundSummary, StatusLevel};
use crate::engine::player::PlayerName;
use crate::engine::round::{RoundCore, ScoredRound};
use crate::error::{log_round_error, RoundError};
use crate::motion::MotionSensor;
use crate::pipeline::MotionScoringPipeline;
use crate::storage::{GameMode, ScoreStore};

/// Status text shown when the device sends no motion events
pub const NO_MOTION_MESSAGE: &str = "No motion data detected";

impl ScoredRound for MotionScoringPipeline {
    fn score(&self) -> u32 {
        MotionScoringPipeline::score(self)
    }
}

pub struct ShakeRoundController {
    core: Arc<RoundCore<MotionScoringPipeline>>,
    config: MotionRoundConfig,
    sensor: Arc<dyn MotionSensor>,
}

impl ShakeRoundController {
    pub fn new(
        config: MotionRoundConfig,
        sensor: Arc<dyn MotionSensor>,
        scores: Arc<ScoreStore>,
        events: broadcast::Sender<RoundEvent>,
    ) -> Self {
        Self {
            core: Arc::new(RoundCore::new(GameMode::Shake, scores, events)),
            config,
            sensor,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.core.phase()
    }

    /// Start a shake round for `name`
    ///
    /// # Errors
    /// - `PreconditionFailed` - invalid name
    /// - `PermissionDenied` / `SensorUnavailable` - motion access failed
    pub async fn start(&self, name: &str) -> Result<(), RoundError> {
        const CONTEXT: &str = "ShakeRoundController::start";

        self.core
            .teardown()
            .map_err(|err| self.core.abort_start(err, CONTEXT))?;

        let player =
            PlayerName::parse(name).map_err(|err| self.core.abort_start(err, CONTEXT))?;

        if self.sensor.requires_permission() {
            tracing::info!("[ShakeRound] Requesting motion permission");
            self.sensor
                .request_permission()
                .await
                .map_err(|err| self.core.abort_start(err, CONTEXT))?;
        }

        let events = self
            .sensor
            .subscribe(self.config.event_queue_capacity)
            .map_err(|err| self.core.abort_start(err, CONTEXT))?;

        let pipeline = MotionScoringPipeline::new(events, &self.config);
        let id = self
            .core
            .begin(player.clone(), RoundPhase::Active, pipeline)
            .map_err(|err| self.core.abort_start(err, CONTEXT))?;

        tracing::info!("[ShakeRound] Round {} started for {}", id, player);
        self.core.emit_controls(false, true);
        self.core.emit_status(StatusLevel::Info, "Shake!");

        let task = tokio::spawn(run_round(self.core.clone(), id, self.config.clone()));
        self.core.attach_task(id, task);
        Ok(())
    }

    /// Stop the current round early; it is recorded with score 0
    pub fn stop(&self) -> Result<Option<RoundSummary>, RoundError> {
        let summary = self.core.finalize(None, FinishCause::Stopped)?;
        if summary.is_some() {
            tracing::info!("[ShakeRound] Round stopped by player");
        }
        Ok(summary)
    }
}

impl Drop for ShakeRoundController {
    fn drop(&mut self) {
        let _ = self.core.teardown();
    }
}

async fn run_round(core: Arc<RoundCore<MotionScoringPipeline>>, id: u64, config: MotionRoundConfig) {
    let mut ticker = tokio::time::interval(config.frame_period());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let (report, complete) = match core.with_round(id, |round| {
            let report = round.state.frame();
            (report, round.state.is_complete())
        }) {
            Ok(Some(step)) => step,
            _ => return,
        };

        if report.silence_detected {
            tracing::warn!(
                "[ShakeRound] No motion events within {} ms",
                config.silence_timeout_ms
            );
            core.emit_status(StatusLevel::Warning, NO_MOTION_MESSAGE);
        }

        core.emit(RoundEvent::Meter {
            mode: GameMode::Shake,
            reading: report.meter,
        });
        core.emit(RoundEvent::Score {
            mode: GameMode::Shake,
            score: report.score,
            elapsed_ms: report.elapsed_ms.round() as u64,
        });

        if complete {
            tracing::debug!("[ShakeRound] Round {} ran {} frames", id, report.frame);
            if let Err(err) = core.finalize(Some(id), FinishCause::Completed) {
                log_round_error(&err, "ShakeRound::run_round");
            }
            return;
        }
    }
}
