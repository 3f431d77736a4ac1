// Calibration module - ambient baseline measurement
//
// Only the laugh round calibrates: it measures the room's RMS level for a
// fixed window before scoring so the loudness penalty is relative to the
// player's environment. The shake round has no calibration stage.

pub mod stage;

pub use stage::{CalibrationResult, CalibrationStage, LevelReading, FALLBACK_BASELINE_RMS};
