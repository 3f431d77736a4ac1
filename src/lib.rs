// Fun Meter Core - laugh and shake round engine
// Sensor ingestion, per-tick scoring, round lifecycle and leaderboards

// Module declarations
pub mod analysis;
pub mod audio;
pub mod calibration;
pub mod config;
pub mod engine;
pub mod error;
pub mod managers;
pub mod motion;
pub mod pipeline;
pub mod platform;
pub mod scoring;
pub mod storage;
pub mod testing;

// Re-exports for convenience
pub use config::AppConfig;
pub use engine::{Collaborators, EngineHandle, RoundEvent, RoundPhase, RoundSummary};
pub use error::{ClassifierError, ErrorCode, RoundError, StorageError};
pub use platform::PlatformInfo;
pub use storage::{GameMode, Leaderboard, ScoreEntry};
