// SignalMeter - smoothed live meter for UI feedback
//
// Exponential moving average followed by a bounded 0-100 projection. Both
// round modes drive one meter each: the laugh round feeds the per-tick
// laughter probability, the shake round feeds the per-frame acceleration
// magnitude. The meter is display-only; scores never read it.

use serde::{Deserialize, Serialize};

/// One meter update as shown to the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    /// Smoothed value projected onto 0-100
    pub percent: f64,
    /// EMA output in the input's own units
    pub smoothed: f64,
    /// Unsmoothed input
    pub raw: f64,
    /// Raw value formatted for display
    pub text: String,
}

/// EMA smoother with a full-scale projection
#[derive(Debug, Clone)]
pub struct SignalMeter {
    alpha: f64,
    full_scale: f64,
    unit: &'static str,
    smoothed: Option<f64>,
}

impl SignalMeter {
    /// # Arguments
    /// * `alpha` - Weight of the newest sample, clamped to (0, 1]
    /// * `full_scale` - Smoothed value that maps to 100 %
    /// * `unit` - Suffix for the raw text ("" for unitless)
    pub fn new(alpha: f64, full_scale: f64, unit: &'static str) -> Self {
        let alpha = if alpha.is_finite() {
            alpha.clamp(f64::EPSILON, 1.0)
        } else {
            1.0
        };
        Self {
            alpha,
            full_scale: if full_scale > 0.0 { full_scale } else { 1.0 },
            unit,
            smoothed: None,
        }
    }

    /// Meter for a probability in [0, 1]
    pub fn probability(alpha: f64) -> Self {
        Self::new(alpha, 1.0, "")
    }

    /// Feed one raw value
    ///
    /// The first value seeds the average directly. Non-finite input is
    /// treated as zero.
    pub fn update(&mut self, raw: f64) -> MeterReading {
        let raw = if raw.is_finite() { raw } else { 0.0 };
        let smoothed = match self.smoothed {
            Some(previous) => previous + self.alpha * (raw - previous),
            None => raw,
        };
        self.smoothed = Some(smoothed);

        MeterReading {
            percent: self.percent_of(smoothed),
            smoothed,
            raw,
            text: self.format_raw(raw),
        }
    }

    pub fn smoothed(&self) -> f64 {
        self.smoothed.unwrap_or(0.0)
    }

    pub fn reset(&mut self) {
        self.smoothed = None;
    }

    fn percent_of(&self, value: f64) -> f64 {
        (value / self.full_scale * 100.0).clamp(0.0, 100.0)
    }

    fn format_raw(&self, raw: f64) -> String {
        if self.unit.is_empty() {
            format!("{:.2}", raw)
        } else {
            format!("{:.2} {}", raw, self.unit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_seeds_average() {
        let mut meter = SignalMeter::probability(0.2);
        let reading = meter.update(0.5);
        assert_eq!(reading.smoothed, 0.5);
        assert_eq!(reading.percent, 50.0);
        assert_eq!(reading.text, "0.50");
    }

    #[test]
    fn test_ema_step() {
        let mut meter = SignalMeter::probability(0.2);
        meter.update(0.0);
        let reading = meter.update(1.0);
        assert!((reading.smoothed - 0.2).abs() < 1e-12);
        assert!((reading.percent - 20.0).abs() < 1e-9);
        assert_eq!(reading.raw, 1.0);
    }

    #[test]
    fn test_percent_is_bounded() {
        let mut meter = SignalMeter::new(1.0, 30.0, "m/s²");
        assert_eq!(meter.update(90.0).percent, 100.0);
        assert_eq!(meter.update(-5.0).percent, 0.0);
        assert_eq!(meter.update(15.0).text, "15.00 m/s²");
    }

    #[test]
    fn test_non_finite_input_reads_zero() {
        let mut meter = SignalMeter::probability(0.5);
        let reading = meter.update(f64::NAN);
        assert_eq!(reading.raw, 0.0);
        assert_eq!(reading.percent, 0.0);
    }

    #[test]
    fn test_reset_forgets_history() {
        let mut meter = SignalMeter::probability(0.2);
        meter.update(1.0);
        meter.reset();
        assert_eq!(meter.smoothed(), 0.0);
        assert_eq!(meter.update(0.25).smoothed, 0.25);
    }
}
