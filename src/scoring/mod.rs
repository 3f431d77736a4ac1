// Scoring module - pure accumulators and score formulas
//
// Nothing in here touches sensors, clocks or tasks. The pipelines feed these
// types one tick or one motion event at a time.

pub mod laugh;
pub mod meter;
pub mod shake;

pub use laugh::{laugh_score, LaughScorer, LaughTally};
pub use meter::{MeterReading, SignalMeter};
pub use shake::{effective_dt, shake_score, IntegrationStep, MotionIntegrator, ShakeTally};
