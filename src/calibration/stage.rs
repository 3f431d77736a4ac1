// CalibrationStage - ambient loudness baseline for the laugh round
//
// Before scoring starts the player stays quiet while the stage samples the
// live RMS level at a fixed cadence for a fixed duration. The baseline is
// the mean of every reading taken. A starved stream (no readings at all)
// falls back to a conservative constant instead of dividing by zero.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Baseline used when calibration collected no readings
pub const FALLBACK_BASELINE_RMS: f32 = 0.01;

/// Outcome of one calibration poll
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelReading {
    /// Fresh audio arrived and produced this RMS level
    Level(f32),
    /// No new audio since the previous poll
    Starved,
    /// The round was torn down; stop measuring
    Released,
}

/// Measured ambient baseline, fixed for the rest of the round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Mean RMS over the calibration window
    pub baseline_rms: f32,
    /// Readings that contributed to the mean
    pub readings: usize,
}

impl CalibrationResult {
    /// Whether the fallback constant was used
    pub fn is_fallback(&self) -> bool {
        self.readings == 0
    }
}

/// Accumulates RMS readings into a baseline
#[derive(Debug, Default)]
pub struct CalibrationStage {
    sum: f64,
    readings: usize,
}

impl CalibrationStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one RMS reading; non-finite values are ignored
    pub fn record(&mut self, rms: f32) {
        if rms.is_finite() {
            self.sum += rms as f64;
            self.readings += 1;
        }
    }

    pub fn readings(&self) -> usize {
        self.readings
    }

    /// Average of all readings, or [`FALLBACK_BASELINE_RMS`] when there were none
    pub fn finish(&self) -> CalibrationResult {
        if self.readings == 0 {
            return CalibrationResult {
                baseline_rms: FALLBACK_BASELINE_RMS,
                readings: 0,
            };
        }
        CalibrationResult {
            baseline_rms: (self.sum / self.readings as f64) as f32,
            readings: self.readings,
        }
    }

    /// Poll `sample` every `cadence` until `duration` has elapsed
    ///
    /// This is the one deliberately blocking phase of a round: the caller
    /// does not progress to scoring until it returns.
    ///
    /// # Returns
    /// * `Some(CalibrationResult)` - Calibration ran to completion
    /// * `None` - `sample` reported the round was released
    pub async fn measure<F>(
        duration: Duration,
        cadence: Duration,
        mut sample: F,
    ) -> Option<CalibrationResult>
    where
        F: FnMut() -> LevelReading,
    {
        let mut stage = CalibrationStage::new();
        let started = tokio::time::Instant::now();
        let cadence = cadence.max(Duration::from_millis(1));

        loop {
            tokio::time::sleep(cadence).await;
            match sample() {
                LevelReading::Level(rms) => stage.record(rms),
                LevelReading::Starved => {}
                LevelReading::Released => return None,
            }
            if started.elapsed() >= duration {
                break;
            }
        }

        let result = stage.finish();
        tracing::info!(
            "[Calibration] Baseline RMS {:.4} from {} readings",
            result.baseline_rms,
            result.readings
        );
        Some(result)
    }
}
