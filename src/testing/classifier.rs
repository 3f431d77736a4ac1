//! Classifier doubles: scripted results, an energy heuristic and a loader
//! whose endpoints can be made to fail.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::analysis::{Category, ClassifierLoader, ClassifierService};
use crate::audio::rms;
use crate::error::ClassifierError;

/// Replays queued results, then a fixed fallback
pub struct ScriptedClassifier {
    script: Mutex<VecDeque<Result<Vec<Category>, ClassifierError>>>,
    fallback: Vec<Category>,
    latency: Duration,
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn new(fallback: Vec<Category>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always report `Laughter` at probability `p`
    pub fn constant(p: f32) -> Self {
        Self::new(vec![Category::new("Laughter", p), Category::new("Speech", 0.1)])
    }

    /// Delay every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue a result for an upcoming call
    pub fn push(&self, result: Result<Vec<Category>, ClassifierError>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(result);
        }
    }

    /// Queue a transient failure for an upcoming call
    pub fn push_failure(&self, reason: &str) {
        self.push(Err(ClassifierError::ClassificationFailed {
            reason: reason.to_string(),
        }));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClassifierService for ScriptedClassifier {
    async fn classify(
        &self,
        _samples: &[f32],
        _sample_rate: u32,
    ) -> Result<Vec<Category>, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let next = self
            .script
            .lock()
            .map_err(|_| ClassifierError::ClassificationFailed {
                reason: "script lock poisoned".to_string(),
            })?
            .pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

/// Treats loud audio as laughter; good enough for demos without a model
pub struct EnergyClassifier {
    full_scale_rms: f32,
}

impl EnergyClassifier {
    /// `full_scale_rms` is the window RMS reported as certain laughter
    pub fn new(full_scale_rms: f32) -> Self {
        Self {
            full_scale_rms: full_scale_rms.max(f32::EPSILON),
        }
    }
}

impl Default for EnergyClassifier {
    fn default() -> Self {
        Self::new(0.25)
    }
}

#[async_trait]
impl ClassifierService for EnergyClassifier {
    async fn classify(
        &self,
        samples: &[f32],
        _sample_rate: u32,
    ) -> Result<Vec<Category>, ClassifierError> {
        if samples.is_empty() {
            return Err(ClassifierError::ClassificationFailed {
                reason: "empty window".to_string(),
            });
        }
        let p = (rms(samples) / self.full_scale_rms).clamp(0.0, 1.0);
        Ok(vec![
            Category::new("Laughter", p),
            Category::new("Silence", 1.0 - p),
        ])
    }
}

/// Loader that hands out one service and can fail chosen endpoints
pub struct ScriptedLoader {
    service: Arc<dyn ClassifierService>,
    failing: Vec<String>,
    fail_all: bool,
    attempts: Mutex<Vec<String>>,
}

impl ScriptedLoader {
    pub fn new(service: Arc<dyn ClassifierService>) -> Self {
        Self {
            service,
            failing: Vec::new(),
            fail_all: false,
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// Every endpoint fails to load
    pub fn unavailable() -> Self {
        let mut loader = Self::new(Arc::new(ScriptedClassifier::constant(0.0)));
        loader.fail_all = true;
        loader
    }

    /// Make `endpoint` fail to load
    pub fn failing(mut self, endpoint: impl Into<String>) -> Self {
        self.failing.push(endpoint.into());
        self
    }

    /// Endpoints tried so far, in order
    pub fn attempts(&self) -> Vec<String> {
        self.attempts
            .lock()
            .map(|attempts| attempts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ClassifierLoader for ScriptedLoader {
    async fn load(&self, endpoint: &str) -> Result<Arc<dyn ClassifierService>, ClassifierError> {
        if let Ok(mut attempts) = self.attempts.lock() {
            attempts.push(endpoint.to_string());
        }
        if self.fail_all || self.failing.iter().any(|e| e == endpoint) {
            return Err(ClassifierError::LoadFailed {
                endpoint: endpoint.to_string(),
                reason: "model could not be fetched".to_string(),
            });
        }
        Ok(self.service.clone())
    }
}
