//! Shared fixtures for the round integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use fun_meter::analysis::ClassifierLoader;
use fun_meter::audio::Microphone;
use fun_meter::engine::{Collaborators, EngineHandle, RoundEvent, RoundSummary};
use fun_meter::motion::MotionSensor;
use fun_meter::storage::{KeyValueStore, MemoryStore};
use fun_meter::testing::{ScriptedClassifier, ScriptedLoader, SyntheticMicrophone, SyntheticMotion};
use fun_meter::{AppConfig, PlatformInfo};
use tokio::sync::broadcast::{self, error::RecvError};

/// Builder over the collaborators with quiet, well-behaved defaults
pub struct Rig {
    pub microphone: Arc<dyn Microphone>,
    pub motion: Arc<dyn MotionSensor>,
    pub loader: Arc<dyn ClassifierLoader>,
    pub storage: Arc<dyn KeyValueStore>,
    pub platform: PlatformInfo,
    pub config: AppConfig,
}

impl Rig {
    pub fn new() -> Self {
        Self {
            microphone: Arc::new(SyntheticMicrophone::tone(440.0, 0.05)),
            motion: Arc::new(SyntheticMotion::new()),
            loader: Arc::new(ScriptedLoader::new(Arc::new(ScriptedClassifier::constant(
                0.7,
            )))),
            storage: Arc::new(MemoryStore::new()),
            platform: PlatformInfo::default(),
            config: AppConfig::default(),
        }
    }

    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn microphone(mut self, microphone: Arc<dyn Microphone>) -> Self {
        self.microphone = microphone;
        self
    }

    pub fn motion(mut self, motion: Arc<dyn MotionSensor>) -> Self {
        self.motion = motion;
        self
    }

    pub fn loader(mut self, loader: Arc<dyn ClassifierLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = storage;
        self
    }

    pub fn insecure(mut self) -> Self {
        self.platform = PlatformInfo {
            secure_context: false,
        };
        self
    }

    pub fn engine(self) -> EngineHandle {
        EngineHandle::new(
            self.config,
            Collaborators {
                microphone: self.microphone,
                motion: self.motion,
                classifier_loader: self.loader,
                storage: self.storage,
                platform: self.platform,
            },
        )
    }
}

/// Receive events until the round summary arrives
///
/// Lagged receivers skip ahead; the summary is always the newest event.
pub async fn until_finished(rx: &mut broadcast::Receiver<RoundEvent>) -> (Vec<RoundEvent>, RoundSummary) {
    let mut seen = Vec::new();
    let result = tokio::time::timeout(Duration::from_secs(60), async {
        loop {
            match rx.recv().await {
                Ok(RoundEvent::Finished(summary)) => return summary,
                Ok(event) => seen.push(event),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => panic!("event channel closed before the round finished"),
            }
        }
    })
    .await;
    match result {
        Ok(summary) => (seen, summary),
        Err(_) => panic!("round did not finish within 60 s"),
    }
}

/// Drain whatever is queued without waiting
pub fn drain(rx: &mut broadcast::Receiver<RoundEvent>) -> Vec<RoundEvent> {
    let mut seen = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => seen.push(event),
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => return seen,
        }
    }
}
