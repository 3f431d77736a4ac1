//! Engine module housing the round lifecycle.
//!
//! `round` holds the state machine both modes share, `laugh` and `shake`
//! drive their pipelines on Tokio tasks, and `core` bundles them behind
//! the `EngineHandle` facade.

pub mod core;
pub mod events;
pub mod laugh;
pub mod player;
pub mod round;
pub mod shake;

pub use self::core::{Collaborators, EngineHandle};
pub use events::{FinishCause, RoundEvent, RoundPhase, RoundSummary, StatusLevel};
pub use laugh::LaughRoundController;
pub use player::{PlayerName, MAX_NAME_LEN};
pub use round::{ActiveRound, RoundCore, ScoredRound};
pub use shake::{ShakeRoundController, NO_MOTION_MESSAGE};
