// BroadcastChannelManager: round event fan-out
// Single Responsibility: Broadcast channel lifecycle and subscription

use tokio::sync::broadcast;

use crate::engine::RoundEvent;

/// Default buffer for the round event channel
///
/// A shake round publishes two events per 60 Hz frame; 512 messages give a
/// slow subscriber about four seconds before it starts lagging.
pub const DEFAULT_EVENT_CAPACITY: usize = 512;

/// Owns the round event broadcast channel
///
/// Both controllers publish into the same channel, so one subscription sees
/// every mode. Each event carries its `GameMode`.
///
/// # Notes
/// - Multiple subscribers supported via broadcast pattern
/// - Old messages dropped if buffer fills (lagged subscribers)
/// - Publishing with no subscribers is not an error
pub struct BroadcastChannelManager {
    round_events: broadcast::Sender<RoundEvent>,
}

impl BroadcastChannelManager {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// # Arguments
    /// * `capacity` - Messages retained for lagging subscribers (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let (round_events, _) = broadcast::channel(capacity.max(1));
        Self { round_events }
    }

    // ========================================================================
    // ROUND EVENTS CHANNEL
    // ========================================================================

    /// Sender handed to round controllers
    pub fn round_sender(&self) -> broadcast::Sender<RoundEvent> {
        self.round_events.clone()
    }

    /// Subscribe to round events
    ///
    /// The receiver sees events published after this call only.
    pub fn subscribe_round_events(&self) -> broadcast::Receiver<RoundEvent> {
        self.round_events.subscribe()
    }

    /// Current number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.round_events.receiver_count()
    }
}

impl Default for BroadcastChannelManager {
    fn default() -> Self {
        Self::new()
    }
}
