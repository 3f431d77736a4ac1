//! Configuration management for round tuning
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling fast iteration without recompilation. Round timing, loudness
//! penalty thresholds, motion integration guards and classifier endpoints
//! can all be adjusted via the config file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub audio: AudioRoundConfig,
    #[serde(default)]
    pub motion: MotionRoundConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Laugh round parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioRoundConfig {
    /// Capture sample rate in Hz; the ring buffer holds one second at this rate
    pub sample_rate: u32,
    /// Length of the scoring phase
    pub round_duration_ms: u64,
    /// Scoring tick period (250 ms = 4 Hz)
    pub tick_interval_ms: u64,
    /// Ambient baseline measurement length
    pub calibration_duration_ms: u64,
    /// Delay between calibration RMS readings
    pub calibration_poll_ms: u64,
    /// Samples covered by the live RMS analysis window
    pub analysis_window: usize,
    /// RMS above `baseline + loudness_margin` is penalized
    pub loudness_margin: f32,
    /// Largest penalty a single tick may add
    pub max_penalty_per_tick: f32,
    /// Laughter probability that keeps a streak alive
    pub streak_threshold: f32,
    /// Consecutive qualifying ticks that earn one streak bonus
    pub streak_ticks: u32,
    /// EMA factor for the displayed laugh meter
    pub meter_alpha: f64,
    /// Capacity of the sample queue between microphone and pipeline
    pub capture_capacity: usize,
}

impl Default for AudioRoundConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            round_duration_ms: 10_000,
            tick_interval_ms: 250,
            calibration_duration_ms: 2_000,
            calibration_poll_ms: 50,
            analysis_window: 2048,
            loudness_margin: 0.10,
            max_penalty_per_tick: 0.03,
            streak_threshold: 0.6,
            streak_ticks: 4,
            meter_alpha: 0.2,
            // Two seconds of headroom so a delayed tick never overflows the queue
            capture_capacity: 32_000,
        }
    }
}

impl AudioRoundConfig {
    /// Tick length in milliseconds, never zero
    pub fn tick_ms(&self) -> u64 {
        self.tick_interval_ms.max(1)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms())
    }

    pub fn calibration_duration(&self) -> Duration {
        Duration::from_millis(self.calibration_duration_ms)
    }

    pub fn calibration_poll(&self) -> Duration {
        Duration::from_millis(self.calibration_poll_ms.max(1))
    }

    /// Samples in the one-second classification window
    pub fn window_len(&self) -> usize {
        self.sample_rate as usize
    }
}

/// Shake round parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionRoundConfig {
    /// Length of the scoring phase
    pub round_duration_ms: u64,
    /// Score recomputation rate of the frame loop
    pub frame_rate_hz: u32,
    /// Event gaps above this many seconds are treated as stale
    pub max_event_gap_s: f64,
    /// Subtracted from the vertical axis when only a gravity-inclusive reading exists
    pub gravity: f64,
    /// Warn when no motion event arrived within this long of round start
    pub silence_timeout_ms: u64,
    /// Bounded queue between the motion sensor and the frame loop
    pub event_queue_capacity: usize,
    /// EMA factor for the displayed shake meter
    pub meter_alpha: f64,
    /// Acceleration magnitude (m/s²) that fills the meter
    pub meter_full_scale: f64,
}

impl Default for MotionRoundConfig {
    fn default() -> Self {
        Self {
            round_duration_ms: 10_000,
            frame_rate_hz: 60,
            max_event_gap_s: 0.25,
            gravity: 9.81,
            silence_timeout_ms: 2_000,
            event_queue_capacity: 1024,
            meter_alpha: 0.2,
            meter_full_scale: 30.0,
        }
    }
}

impl MotionRoundConfig {
    /// Frame period in milliseconds (16.67 ms at 60 Hz)
    pub fn frame_period_ms(&self) -> f64 {
        1000.0 / self.frame_rate_hz.max(1) as f64
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(self.frame_period_ms() / 1000.0)
    }

    /// Nominal delta-time substituted for stale or invalid event gaps
    pub fn nominal_dt(&self) -> f64 {
        1.0 / self.frame_rate_hz.max(1) as f64
    }
}

/// Classifier service parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Candidate classifier locations, tried in order until one loads
    pub endpoints: Vec<String>,
    /// Category-name substrings counted as laughter
    pub laughter_lexicon: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![
                "https://storage.googleapis.com/mediapipe-models/audio_classifier/yamnet/float32/1/yamnet.tflite"
                    .to_string(),
                "models/yamnet.tflite".to_string(),
            ],
            laughter_lexicon: ["laugh", "giggle", "chuckle", "chortle", "snicker"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Leaderboard persistence parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Key prefix; the mode name is appended (`<prefix>.laugh`)
    pub key_prefix: String,
    /// Entries kept per leaderboard
    pub capacity: usize,
    /// Directory used by the file-backed store
    pub directory: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key_prefix: "fun_meter.leaderboard".to_string(),
            capacity: 10,
            directory: PathBuf::from(".fun_meter"),
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or defaults if the file is missing or invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the default asset location
    pub fn load() -> Self {
        Self::load_from_file("assets/fun_meter.json")
    }
}
