// Managers module - focused helpers owned by the EngineHandle
//
// - broadcast_manager: round event fan-out to UI subscribers

pub mod broadcast_manager;

pub use broadcast_manager::{BroadcastChannelManager, DEFAULT_EVENT_CAPACITY};
