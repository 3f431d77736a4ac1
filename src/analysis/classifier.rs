// Classifier - opaque audio-event classification service
//
// The laugh round hands one second of mono audio to a classification
// service and gets back scored category labels. The service itself (an
// on-device model, a remote endpoint) is a black box behind
// `ClassifierService`. Loading is separated into `ClassifierLoader` so the
// engine can walk an ordered list of candidate endpoints and keep the first
// one that initializes.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, ErrorCode};

/// One scored label from a classification frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Label as reported by the model (e.g. "Laughter", "Baby laughter")
    pub name: String,
    /// Confidence in [0, 1]
    pub score: f32,
}

impl Category {
    pub fn new(name: impl Into<String>, score: f32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// A loaded classifier
///
/// `classify` receives exactly one window of samples at `sample_rate` and
/// returns the categories of zero or more classification frames, flattened.
/// A failed call only affects the tick that made it.
#[async_trait]
pub trait ClassifierService: Send + Sync {
    async fn classify(
        &self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<Vec<Category>, ClassifierError>;
}

/// Creates classifier services from endpoint descriptors
#[async_trait]
pub trait ClassifierLoader: Send + Sync {
    async fn load(&self, endpoint: &str) -> Result<Arc<dyn ClassifierService>, ClassifierError>;
}

/// A classifier together with the endpoint it was loaded from
#[derive(Clone)]
pub struct ConnectedClassifier {
    pub endpoint: String,
    pub service: Arc<dyn ClassifierService>,
}

/// Try each endpoint in order and keep the first that loads
///
/// # Returns
/// * `Ok(ConnectedClassifier)` - First endpoint that loaded
/// * `Err(ClassifierError::NoEndpoints)` - Empty endpoint list
/// * `Err(ClassifierError::AllEndpointsFailed)` - Every endpoint failed,
///   with one `endpoint: reason` entry per attempt
pub async fn connect_first(
    loader: &dyn ClassifierLoader,
    endpoints: &[String],
) -> Result<ConnectedClassifier, ClassifierError> {
    if endpoints.is_empty() {
        return Err(ClassifierError::NoEndpoints);
    }

    let mut attempts = Vec::with_capacity(endpoints.len());
    for endpoint in endpoints {
        match loader.load(endpoint).await {
            Ok(service) => {
                tracing::info!("[Classifier] Loaded classifier from {}", endpoint);
                return Ok(ConnectedClassifier {
                    endpoint: endpoint.clone(),
                    service,
                });
            }
            Err(err) => {
                tracing::warn!("[Classifier] Endpoint {} failed: {}", endpoint, err);
                attempts.push(format!("{}: {}", endpoint, failure_detail(&err)));
            }
        }
    }

    Err(ClassifierError::AllEndpointsFailed { attempts })
}

fn failure_detail(err: &ClassifierError) -> String {
    match err {
        ClassifierError::LoadFailed { reason, .. } => reason.clone(),
        other => other.message(),
    }
}
