// AudioScoringPipeline - per-tick laugh scoring over a live microphone stream
//
// The pipeline is synchronous: the round task owns it and drives it in two
// halves per tick so the classifier call can be awaited in between without
// holding any lock.
//
//   begin_tick()     drain capture -> loudness penalty -> 1 s window
//   (await classifier with the window)
//   complete_tick()  laughter p -> streak / mean -> score -> meter
//
// Before scoring, `calibration_reading()` serves the CalibrationStage with
// RMS readings from the same capture.

use crate::analysis::{Category, LaughterLexicon};
use crate::audio::{rms, AudioCapture, RingBuffer};
use crate::calibration::{CalibrationResult, LevelReading, FALLBACK_BASELINE_RMS};
use crate::config::AudioRoundConfig;
use crate::error::ClassifierError;
use crate::scoring::{LaughScorer, LaughTally, MeterReading, SignalMeter};

/// Audio handed to the classifier for one tick
#[derive(Debug, Clone)]
pub struct TickWindow {
    /// Most recent second of audio in chronological order
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Live RMS over the analysis window
    pub rms: f32,
    /// Loudness penalty this tick added
    pub penalty: f32,
}

/// Result of one completed tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: u32,
    pub elapsed_ms: u64,
    pub rms: f32,
    pub penalty: f32,
    pub probability: f32,
    pub bonus_earned: bool,
    pub score: u32,
    pub meter: MeterReading,
    /// Set when classification failed and the tick counted as p = 0
    pub classifier_error: Option<ClassifierError>,
}

pub struct AudioScoringPipeline {
    capture: AudioCapture,
    ring: RingBuffer,
    config: AudioRoundConfig,
    lexicon: LaughterLexicon,
    scorer: LaughScorer,
    meter: SignalMeter,
    baseline: Option<CalibrationResult>,
    elapsed_ms: u64,
}

impl AudioScoringPipeline {
    /// # Arguments
    /// * `capture` - Open microphone stream, owned for the round's lifetime
    /// * `config` - Laugh round tuning
    /// * `lexicon` - Category terms counted as laughter
    pub fn new(capture: AudioCapture, config: &AudioRoundConfig, lexicon: LaughterLexicon) -> Self {
        Self {
            ring: RingBuffer::new(config.window_len().max(1)),
            scorer: LaughScorer::new(config, FALLBACK_BASELINE_RMS),
            meter: SignalMeter::probability(config.meter_alpha),
            config: config.clone(),
            capture,
            lexicon,
            baseline: None,
            elapsed_ms: 0,
        }
    }

    /// One calibration poll
    ///
    /// Yields a level only when new audio arrived since the previous poll,
    /// so a starved stream produces no readings.
    pub fn calibration_reading(&mut self) -> LevelReading {
        if self.capture.drain_into(&mut self.ring) == 0 {
            return LevelReading::Starved;
        }
        LevelReading::Level(self.live_rms())
    }

    /// Fix the baseline for the rest of the round
    pub fn set_baseline(&mut self, result: CalibrationResult) {
        self.scorer = LaughScorer::new(&self.config, result.baseline_rms);
        self.baseline = Some(result);
    }

    pub fn baseline(&self) -> Option<CalibrationResult> {
        self.baseline
    }

    /// First half of a tick: ingest audio, penalize loudness, cut the window
    pub fn begin_tick(&mut self) -> TickWindow {
        self.capture.drain_into(&mut self.ring);
        let rms = self.live_rms();
        let penalty = self.scorer.apply_loudness(rms);
        TickWindow {
            samples: self.ring.snapshot(),
            sample_rate: self.capture.sample_rate(),
            rms,
            penalty,
        }
    }

    /// Second half of a tick: fold in the classification outcome
    ///
    /// A classifier error is not fatal; the tick contributes p = 0 and the
    /// error is returned in the report for logging.
    pub fn complete_tick(
        &mut self,
        window: &TickWindow,
        outcome: Result<Vec<Category>, ClassifierError>,
    ) -> TickReport {
        let (probability, classifier_error) = match outcome {
            Ok(categories) => (self.lexicon.probability(&categories), None),
            Err(err) => (0.0, Some(err)),
        };

        let bonus_earned = self.scorer.apply_probability(probability);
        self.elapsed_ms += self.config.tick_ms();
        let tally = self.scorer.tally();
        let meter = self.meter.update(probability as f64);

        TickReport {
            tick: tally.ticks,
            elapsed_ms: self.elapsed_ms,
            rms: window.rms,
            penalty: window.penalty,
            probability,
            bonus_earned,
            score: tally.score,
            meter,
            classifier_error,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Whether the round has run its full duration
    pub fn is_complete(&self) -> bool {
        self.elapsed_ms >= self.config.round_duration_ms
    }

    pub fn score(&self) -> u32 {
        self.scorer.score()
    }

    pub fn tally(&self) -> LaughTally {
        self.scorer.tally()
    }

    fn live_rms(&self) -> f32 {
        rms(&self.ring.latest(self.config.analysis_window))
    }
}
