// LaughRoundController - Idle -> Calibrating -> Active -> Finished -> Idle
//
// start():
//   1. tear down any previous round
//   2. validate the player name, require a secure context
//   3. connect the classifier (cached after the first success)
//   4. open the microphone
//   5. install the round and spawn its task
//
// The task calibrates for 2 s, then ticks every 250 ms until 10 s of ticks
// have elapsed and finalizes with the pipeline's score. stop() finalizes
// with 0 from any phase.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio::time::MissedTickBehavior;

use crate::analysis::{
    connect_first, ClassifierLoader, ClassifierService, ConnectedClassifier, LaughterLexicon,
};
use crate::audio::Microphone;
use crate::calibration::{CalibrationStage, LevelReading};
use crate::config::{AudioRoundConfig, ClassifierConfig};
use crate::engine::events::{FinishCause, RoundEvent, RoundPhase, RoundSummary, StatusLevel};
use crate::engine::player::PlayerName;
use crate::engine::round::{RoundCore, ScoredRound};
use crate::error::{log_classifier_error, log_round_error, ErrorCode, RoundError};
use crate::pipeline::AudioScoringPipeline;
use crate::platform::PlatformInfo;
use crate::storage::{GameMode, ScoreStore};

impl ScoredRound for AudioScoringPipeline {
    fn score(&self) -> u32 {
        AudioScoringPipeline::score(self)
    }
}

pub struct LaughRoundController {
    core: Arc<RoundCore<AudioScoringPipeline>>,
    config: AudioRoundConfig,
    classifier_config: ClassifierConfig,
    lexicon: LaughterLexicon,
    platform: PlatformInfo,
    microphone: Arc<dyn Microphone>,
    loader: Arc<dyn ClassifierLoader>,
    classifier: Mutex<Option<ConnectedClassifier>>,
}

impl LaughRoundController {
    pub fn new(
        config: AudioRoundConfig,
        classifier_config: ClassifierConfig,
        platform: PlatformInfo,
        microphone: Arc<dyn Microphone>,
        loader: Arc<dyn ClassifierLoader>,
        scores: Arc<ScoreStore>,
        events: broadcast::Sender<RoundEvent>,
    ) -> Self {
        Self {
            core: Arc::new(RoundCore::new(GameMode::Laugh, scores, events)),
            lexicon: LaughterLexicon::new(&classifier_config.laughter_lexicon),
            config,
            classifier_config,
            platform,
            microphone,
            loader,
            classifier: Mutex::new(None),
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.core.phase()
    }

    /// Start a laugh round for `name`
    ///
    /// Returns once the round is installed and calibrating. The round then
    /// runs on its own task.
    ///
    /// # Errors
    /// - `PreconditionFailed` - invalid name or insecure context
    /// - `ServiceUnavailable` - no classifier endpoint could be loaded
    /// - `PermissionDenied` / `SensorUnavailable` - microphone could not be opened
    pub async fn start(&self, name: &str) -> Result<(), RoundError> {
        self.core
            .teardown()
            .map_err(|err| self.core.abort_start(err, "LaughRoundController::start"))?;

        let player = PlayerName::parse(name)
            .map_err(|err| self.core.abort_start(err, "LaughRoundController::start"))?;

        if !self.platform.secure_context {
            let err = RoundError::PreconditionFailed {
                reason: "microphone capture requires a secure context (HTTPS)".to_string(),
            };
            return Err(self.core.abort_start(err, "LaughRoundController::start"));
        }

        let classifier = self
            .ensure_classifier()
            .await
            .map_err(|err| self.core.abort_start(err, "LaughRoundController::start"))?;

        let capture = self
            .microphone
            .open(self.config.sample_rate, self.config.capture_capacity)
            .await
            .map_err(|err| self.core.abort_start(err, "LaughRoundController::start"))?;

        let pipeline = AudioScoringPipeline::new(capture, &self.config, self.lexicon.clone());
        let id = self
            .core
            .begin(player.clone(), RoundPhase::Calibrating, pipeline)
            .map_err(|err| self.core.abort_start(err, "LaughRoundController::start"))?;

        tracing::info!("[LaughRound] Round {} started for {}", id, player);
        self.core.emit_controls(false, true);
        self.core
            .emit_status(StatusLevel::Info, "Calibrating, stay quiet for a moment");

        let task = tokio::spawn(run_round(
            self.core.clone(),
            id,
            classifier,
            self.config.clone(),
        ));
        self.core.attach_task(id, task);
        Ok(())
    }

    /// Stop the current round early; it is recorded with score 0
    ///
    /// # Returns
    /// * `Ok(Some(summary))` - A round was stopped
    /// * `Ok(None)` - No round was running
    pub fn stop(&self) -> Result<Option<RoundSummary>, RoundError> {
        let summary = self.core.finalize(None, FinishCause::Stopped)?;
        if summary.is_some() {
            tracing::info!("[LaughRound] Round stopped by player");
        }
        Ok(summary)
    }

    /// Classifier for the next round, loading it on first use
    async fn ensure_classifier(&self) -> Result<Arc<dyn ClassifierService>, RoundError> {
        let mut cached = self.classifier.lock().await;
        if let Some(connected) = cached.as_ref() {
            return Ok(connected.service.clone());
        }

        self.core
            .emit_status(StatusLevel::Info, "Loading laughter classifier");
        match connect_first(self.loader.as_ref(), &self.classifier_config.endpoints).await {
            Ok(connected) => {
                let service = connected.service.clone();
                *cached = Some(connected);
                Ok(service)
            }
            Err(err) => {
                log_classifier_error(&err, "LaughRoundController::ensure_classifier");
                Err(RoundError::ServiceUnavailable {
                    reason: err.message(),
                })
            }
        }
    }
}

impl Drop for LaughRoundController {
    fn drop(&mut self) {
        let _ = self.core.teardown();
    }
}

async fn run_round(
    core: Arc<RoundCore<AudioScoringPipeline>>,
    id: u64,
    classifier: Arc<dyn ClassifierService>,
    config: AudioRoundConfig,
) {
    let calibration = CalibrationStage::measure(
        config.calibration_duration(),
        config.calibration_poll(),
        || match core.with_round(id, |round| round.state.calibration_reading()) {
            Ok(Some(reading)) => reading,
            _ => LevelReading::Released,
        },
    )
    .await;
    let Some(calibration) = calibration else {
        return;
    };

    if calibration.is_fallback() {
        tracing::warn!("[LaughRound] No audio during calibration; using fallback baseline");
        core.emit_status(
            StatusLevel::Warning,
            "No audio received during calibration, using a default baseline",
        );
    }

    if !matches!(
        core.with_round(id, |round| round.state.set_baseline(calibration)),
        Ok(Some(()))
    ) {
        return;
    }
    if !matches!(core.set_phase(id, RoundPhase::Active), Ok(true)) {
        return;
    }
    core.emit_status(StatusLevel::Info, "Laugh!");

    let mut ticker = tokio::time::interval(config.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let window = match core.with_round(id, |round| round.state.begin_tick()) {
            Ok(Some(window)) => window,
            _ => return,
        };

        let outcome = classifier
            .classify(&window.samples, window.sample_rate)
            .await;

        let report = match core.with_round(id, |round| round.state.complete_tick(&window, outcome)) {
            Ok(Some(report)) => report,
            _ => return,
        };

        if let Some(err) = &report.classifier_error {
            tracing::warn!(
                "[LaughRound] Tick {} classification failed, counting p = 0: {}",
                report.tick,
                err
            );
        }
        tracing::debug!(
            "[LaughRound] Tick {} @ {} ms: rms={:.4} penalty={:.4} p={:.3} score={}",
            report.tick,
            report.elapsed_ms,
            report.rms,
            report.penalty,
            report.probability,
            report.score
        );

        core.emit(RoundEvent::Meter {
            mode: GameMode::Laugh,
            reading: report.meter,
        });
        core.emit(RoundEvent::Score {
            mode: GameMode::Laugh,
            score: report.score,
            elapsed_ms: report.elapsed_ms,
        });

        if report.elapsed_ms >= config.round_duration_ms {
            if let Err(err) = core.finalize(Some(id), FinishCause::Completed) {
                log_round_error(&err, "LaughRound::run_round");
            }
            return;
        }
    }
}
