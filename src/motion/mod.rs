// Motion module - device-motion events and the sensor seam
//
// Motion events are delivered over a bounded tokio mpsc channel. The frame
// loop drains it in arrival order; dropping the receiver closes the channel,
// which is how sensor implementations learn the round released them.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::RoundError;

pub mod event;

pub use event::{MotionEvent, RotationRate, Vector3};

/// Device-motion access, implemented by the embedding platform
#[async_trait]
pub trait MotionSensor: Send + Sync {
    /// Whether the platform needs an explicit grant before events flow
    fn requires_permission(&self) -> bool;

    /// Ask for motion access
    ///
    /// Only called when [`MotionSensor::requires_permission`] is true. A
    /// refusal maps to [`RoundError::PermissionDenied`], any other failure to
    /// [`RoundError::SensorUnavailable`].
    async fn request_permission(&self) -> Result<(), RoundError>;

    /// Start delivering events into a channel of the given capacity
    fn subscribe(&self, capacity: usize) -> Result<mpsc::Receiver<MotionEvent>, RoundError>;
}
