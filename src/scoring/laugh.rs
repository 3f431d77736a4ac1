// LaughScorer - per-tick accumulators and the laugh score formula
//
// Each 250 ms tick contributes three things:
// - a loudness penalty when the live RMS exceeds `baseline + margin`,
//   capped per tick so sustained shouting cannot dominate
// - one laughter probability sample toward the cumulative mean
// - streak progress: every `streak_ticks` consecutive ticks at or above the
//   streak threshold earn one bonus point
//
// score = round(max(0, 100 * mean(p) - 15 * penalty + 2 * bonus))

use serde::{Deserialize, Serialize};

use crate::config::AudioRoundConfig;

const MEAN_WEIGHT: f64 = 100.0;
const PENALTY_WEIGHT: f64 = 15.0;
const STREAK_WEIGHT: f64 = 2.0;

/// Laugh score from its three components
pub fn laugh_score(mean_probability: f64, loud_penalty: f64, streak_bonus: u32) -> u32 {
    let raw = MEAN_WEIGHT * mean_probability - PENALTY_WEIGHT * loud_penalty
        + STREAK_WEIGHT * streak_bonus as f64;
    raw.max(0.0).round() as u32
}

/// Snapshot of the laugh accumulators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaughTally {
    pub ticks: u32,
    pub mean_probability: f64,
    pub loud_penalty: f64,
    pub streak: u32,
    pub streak_bonus: u32,
    pub score: u32,
}

/// Accumulates loudness penalties, laughter probabilities and streaks
#[derive(Debug, Clone)]
pub struct LaughScorer {
    loud_threshold: f32,
    max_penalty_per_tick: f32,
    streak_threshold: f32,
    streak_ticks: u32,

    loud_penalty: f64,
    probability_sum: f64,
    ticks: u32,
    streak: u32,
    streak_bonus: u32,
}

impl LaughScorer {
    /// Create a scorer relative to a calibrated baseline
    pub fn new(config: &AudioRoundConfig, baseline_rms: f32) -> Self {
        Self {
            loud_threshold: baseline_rms + config.loudness_margin,
            max_penalty_per_tick: config.max_penalty_per_tick,
            streak_threshold: config.streak_threshold,
            streak_ticks: config.streak_ticks.max(1),
            loud_penalty: 0.0,
            probability_sum: 0.0,
            ticks: 0,
            streak: 0,
            streak_bonus: 0,
        }
    }

    /// RMS above which a tick is penalized
    pub fn loud_threshold(&self) -> f32 {
        self.loud_threshold
    }

    /// Penalize this tick's loudness
    ///
    /// # Returns
    /// Penalty added for this tick (0.0 when under the threshold)
    pub fn apply_loudness(&mut self, rms: f32) -> f32 {
        if !(rms > self.loud_threshold) {
            return 0.0;
        }
        let penalty = (rms - self.loud_threshold).min(self.max_penalty_per_tick);
        self.loud_penalty += penalty as f64;
        penalty
    }

    /// Record this tick's laughter probability
    ///
    /// # Returns
    /// `true` if the tick completed a streak block and earned a bonus
    pub fn apply_probability(&mut self, probability: f32) -> bool {
        let p = if probability.is_finite() {
            probability.clamp(0.0, 1.0)
        } else {
            0.0
        };

        self.probability_sum += p as f64;
        self.ticks += 1;

        if p >= self.streak_threshold {
            self.streak += 1;
            if self.streak % self.streak_ticks == 0 {
                self.streak_bonus += 1;
                return true;
            }
        } else {
            self.streak = 0;
        }
        false
    }

    /// Cumulative mean probability, 0.0 before the first tick
    pub fn mean_probability(&self) -> f64 {
        if self.ticks == 0 {
            0.0
        } else {
            self.probability_sum / self.ticks as f64
        }
    }

    /// Authoritative score for the ticks so far
    pub fn score(&self) -> u32 {
        laugh_score(self.mean_probability(), self.loud_penalty, self.streak_bonus)
    }

    pub fn tally(&self) -> LaughTally {
        LaughTally {
            ticks: self.ticks,
            mean_probability: self.mean_probability(),
            loud_penalty: self.loud_penalty,
            streak: self.streak,
            streak_bonus: self.streak_bonus,
            score: self.score(),
        }
    }
}
