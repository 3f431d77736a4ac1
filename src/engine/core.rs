//! EngineHandle: one laugh controller, one shake controller, one leaderboard.
//!
//! The embedding supplies sensors, the classifier loader, a key-value store
//! and platform facts through [`Collaborators`]. Everything else is built
//! from [`AppConfig`].

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::analysis::ClassifierLoader;
use crate::audio::Microphone;
use crate::config::AppConfig;
use crate::engine::events::{RoundEvent, RoundPhase, RoundSummary};
use crate::engine::laugh::LaughRoundController;
use crate::engine::shake::ShakeRoundController;
use crate::error::RoundError;
use crate::managers::BroadcastChannelManager;
use crate::motion::MotionSensor;
use crate::platform::PlatformInfo;
use crate::storage::{GameMode, KeyValueStore, Leaderboard, ScoreStore};

/// Platform-provided dependencies
#[derive(Clone)]
pub struct Collaborators {
    pub microphone: Arc<dyn Microphone>,
    pub motion: Arc<dyn MotionSensor>,
    pub classifier_loader: Arc<dyn ClassifierLoader>,
    pub storage: Arc<dyn KeyValueStore>,
    pub platform: PlatformInfo,
}

/// Entry point for UI layers and the CLI.
pub struct EngineHandle {
    config: AppConfig,
    broadcasts: BroadcastChannelManager,
    scores: Arc<ScoreStore>,
    laugh: LaughRoundController,
    shake: ShakeRoundController,
}

impl EngineHandle {
    pub fn new(config: AppConfig, collaborators: Collaborators) -> Self {
        let broadcasts = BroadcastChannelManager::new();
        let scores = Arc::new(ScoreStore::new(collaborators.storage, &config.storage));

        let laugh = LaughRoundController::new(
            config.audio.clone(),
            config.classifier.clone(),
            collaborators.platform,
            collaborators.microphone,
            collaborators.classifier_loader,
            scores.clone(),
            broadcasts.round_sender(),
        );
        let shake = ShakeRoundController::new(
            config.motion.clone(),
            collaborators.motion,
            scores.clone(),
            broadcasts.round_sender(),
        );

        Self {
            config,
            broadcasts,
            scores,
            laugh,
            shake,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn laugh(&self) -> &LaughRoundController {
        &self.laugh
    }

    pub fn shake(&self) -> &ShakeRoundController {
        &self.shake
    }

    /// Round events for both modes
    pub fn subscribe(&self) -> broadcast::Receiver<RoundEvent> {
        self.broadcasts.subscribe_round_events()
    }

    pub async fn start(&self, mode: GameMode, name: &str) -> Result<(), RoundError> {
        match mode {
            GameMode::Laugh => self.laugh.start(name).await,
            GameMode::Shake => self.shake.start(name).await,
        }
    }

    pub fn stop(&self, mode: GameMode) -> Result<Option<RoundSummary>, RoundError> {
        match mode {
            GameMode::Laugh => self.laugh.stop(),
            GameMode::Shake => self.shake.stop(),
        }
    }

    pub fn phase(&self, mode: GameMode) -> RoundPhase {
        match mode {
            GameMode::Laugh => self.laugh.phase(),
            GameMode::Shake => self.shake.phase(),
        }
    }

    pub fn leaderboard(&self, mode: GameMode) -> Leaderboard {
        self.scores.load(mode)
    }
}
