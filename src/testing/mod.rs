//! Deterministic stand-ins for the platform collaborators.
//!
//! Integration tests and the CLI drive real rounds through these instead of
//! live hardware. Each double exposes counters (live streams, subscriptions,
//! classifier calls, load attempts) so tests can assert on resource release.

pub mod classifier;
pub mod microphone;
pub mod motion;
pub mod wav;

pub use classifier::{EnergyClassifier, ScriptedClassifier, ScriptedLoader};
pub use microphone::{SyntheticMicrophone, SyntheticSignal};
pub use motion::{ShakePattern, SyntheticMotion};
pub use wav::read_wav;
