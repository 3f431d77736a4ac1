// MotionIntegrator - kinetic-energy proxies for the shake round
//
// Every motion event adds `|a|² * dt` to the acceleration energy and
// `|ω|² * dt` to the rotation energy (forward Euler, acceptable at typical
// 60-100 Hz event rates). Event timing is irregular in practice: a gap that
// is non-positive or longer than `max_gap_s` is replaced by a nominal
// frame-length dt so a single stalled event cannot blow up the integral.
//
// score = round(6 * accEnergy + 2 * rotEnergy)
//
// Both energies only grow, so the score is cumulative over the round.

use serde::{Deserialize, Serialize};

use crate::config::MotionRoundConfig;
use crate::motion::MotionEvent;

const ACC_WEIGHT: f64 = 6.0;
const ROT_WEIGHT: f64 = 2.0;

/// Shake score from the two integrated energies
pub fn shake_score(acc_energy: f64, rot_energy: f64) -> u32 {
    (ACC_WEIGHT * acc_energy + ROT_WEIGHT * rot_energy)
        .max(0.0)
        .round() as u32
}

/// Accept `raw_dt` when it lies in `(0, max_gap_s]`, otherwise use `nominal_dt`
///
/// # Returns
/// `(dt, substituted)`
pub fn effective_dt(raw_dt: Option<f64>, max_gap_s: f64, nominal_dt: f64) -> (f64, bool) {
    match raw_dt {
        Some(dt) if dt > 0.0 && dt <= max_gap_s => (dt, false),
        _ => (nominal_dt, true),
    }
}

/// What one event contributed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationStep {
    pub dt: f64,
    pub substituted_dt: bool,
    pub acc_magnitude: f64,
    pub rot_magnitude: f64,
}

/// Snapshot of the motion accumulators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShakeTally {
    pub events: u64,
    pub acc_energy: f64,
    pub rot_energy: f64,
    pub score: u32,
}

/// Integrates motion events into acceleration and rotation energy
#[derive(Debug, Clone)]
pub struct MotionIntegrator {
    gravity: f64,
    max_gap_s: f64,
    nominal_dt: f64,

    acc_energy: f64,
    rot_energy: f64,
    last_timestamp_ms: Option<f64>,
    events: u64,
}

impl MotionIntegrator {
    pub fn new(config: &MotionRoundConfig) -> Self {
        Self {
            gravity: config.gravity,
            max_gap_s: config.max_event_gap_s,
            nominal_dt: config.nominal_dt(),
            acc_energy: 0.0,
            rot_energy: 0.0,
            last_timestamp_ms: None,
            events: 0,
        }
    }

    /// Integrate one event
    ///
    /// The first event of a round has no predecessor and integrates over
    /// the nominal dt.
    pub fn ingest(&mut self, event: &MotionEvent) -> IntegrationStep {
        let raw_dt = self
            .last_timestamp_ms
            .map(|last| (event.timestamp_ms - last) / 1000.0);
        let (dt, substituted_dt) = effective_dt(raw_dt, self.max_gap_s, self.nominal_dt);
        self.last_timestamp_ms = Some(event.timestamp_ms);

        let acc_magnitude = event.linear_acceleration_magnitude(self.gravity);
        let rot_magnitude = event.rotation_magnitude_rad();
        if acc_magnitude.is_finite() {
            self.acc_energy += acc_magnitude * acc_magnitude * dt;
        }
        if rot_magnitude.is_finite() {
            self.rot_energy += rot_magnitude * rot_magnitude * dt;
        }
        self.events += 1;

        IntegrationStep {
            dt,
            substituted_dt,
            acc_magnitude,
            rot_magnitude,
        }
    }

    pub fn events(&self) -> u64 {
        self.events
    }

    pub fn score(&self) -> u32 {
        shake_score(self.acc_energy, self.rot_energy)
    }

    pub fn tally(&self) -> ShakeTally {
        ShakeTally {
            events: self.events,
            acc_energy: self.acc_energy,
            rot_energy: self.rot_energy,
            score: self.score(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::{RotationRate, Vector3};

    fn accel_event(timestamp_ms: f64, magnitude: f64) -> MotionEvent {
        MotionEvent {
            acceleration: Some(Vector3::new(magnitude, 0.0, 0.0)),
            timestamp_ms,
            ..Default::default()
        }
    }

    #[test]
    fn test_formula_reference_values() {
        assert_eq!(shake_score(10.0, 5.0), 70);
        assert_eq!(shake_score(0.0, 0.0), 0);
        assert_eq!(shake_score(0.25, 0.0), 2);
    }

    #[test]
    fn test_effective_dt_bounds() {
        let nominal = 1.0 / 60.0;
        assert_eq!(effective_dt(Some(0.02), 0.25, nominal), (0.02, false));
        assert_eq!(effective_dt(Some(0.25), 0.25, nominal), (0.25, false));
        assert_eq!(effective_dt(Some(0.0), 0.25, nominal), (nominal, true));
        assert_eq!(effective_dt(Some(-0.01), 0.25, nominal), (nominal, true));
        assert_eq!(effective_dt(Some(2.0), 0.25, nominal), (nominal, true));
        assert_eq!(effective_dt(None, 0.25, nominal), (nominal, true));
    }

    #[test]
    fn test_implausible_gap_uses_nominal_dt() {
        let mut integrator = MotionIntegrator::new(&MotionRoundConfig::default());
        integrator.ingest(&accel_event(0.0, 1.0));
        let regular = integrator.ingest(&accel_event(20.0, 1.0));
        let stalled = integrator.ingest(&accel_event(2020.0, 1.0));

        assert!((regular.dt - 0.02).abs() < 1e-12);
        assert!(!regular.substituted_dt);
        assert!((stalled.dt - 1.0 / 60.0).abs() < 1e-12);
        assert!(stalled.substituted_dt);

        // first event (nominal) + 0.02 + nominal, each with |a|² = 1
        let expected = 1.0 / 60.0 + 0.02 + 1.0 / 60.0;
        assert!((integrator.tally().acc_energy - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_energy_in_radians() {
        let mut integrator = MotionIntegrator::new(&MotionRoundConfig::default());
        let event = MotionEvent {
            rotation_rate: Some(RotationRate::new(180.0, 0.0, 0.0)),
            timestamp_ms: 0.0,
            ..Default::default()
        };
        integrator.ingest(&event);
        let expected = std::f64::consts::PI.powi(2) / 60.0;
        assert!((integrator.tally().rot_energy - expected).abs() < 1e-9);
    }

    #[test]
    fn test_energy_never_decreases() {
        let mut integrator = MotionIntegrator::new(&MotionRoundConfig::default());
        let mut last_score = 0;
        for i in 0..120 {
            let magnitude = if i % 10 == 0 { 15.0 } else { 0.0 };
            integrator.ingest(&accel_event(i as f64 * 16.0, magnitude));
            let score = integrator.score();
            assert!(score >= last_score);
            last_score = score;
        }
        assert_eq!(integrator.events(), 120);
    }

    #[test]
    fn test_gravity_fallback_at_rest_scores_zero() {
        let mut integrator = MotionIntegrator::new(&MotionRoundConfig::default());
        for i in 0..60 {
            integrator.ingest(&MotionEvent {
                acceleration_including_gravity: Some(Vector3::new(0.0, 0.0, 9.81)),
                timestamp_ms: i as f64 * 16.0,
                ..Default::default()
            });
        }
        assert_eq!(integrator.score(), 0);
    }
}
