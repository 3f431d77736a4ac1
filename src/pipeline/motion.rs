// MotionScoringPipeline - fixed-rate shake scoring over motion events
//
// Events arrive on a bounded channel at whatever rate the device produces
// them. Each frame of the ~60 Hz loop drains everything queued so far into
// the MotionIntegrator, then recomputes the cumulative score. Elapsed time
// is frames * period, never the wall clock.

use tokio::sync::mpsc::{self, error::TryRecvError};

use crate::config::MotionRoundConfig;
use crate::motion::MotionEvent;
use crate::scoring::{MeterReading, MotionIntegrator, ShakeTally, SignalMeter};

/// Result of one frame
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub frame: u64,
    pub elapsed_ms: f64,
    /// Events integrated during this frame
    pub events: usize,
    pub score: u32,
    pub meter: MeterReading,
    /// True on the one frame that first noticed the silence timeout
    pub silence_detected: bool,
}

pub struct MotionScoringPipeline {
    events: mpsc::Receiver<MotionEvent>,
    integrator: MotionIntegrator,
    meter: SignalMeter,
    frame_rate_hz: u32,
    round_duration_ms: u64,
    silence_timeout_ms: u64,
    frames: u64,
    silence_reported: bool,
    source_closed: bool,
}

impl MotionScoringPipeline {
    pub fn new(events: mpsc::Receiver<MotionEvent>, config: &MotionRoundConfig) -> Self {
        Self {
            events,
            integrator: MotionIntegrator::new(config),
            meter: SignalMeter::new(config.meter_alpha, config.meter_full_scale, "m/s²"),
            frame_rate_hz: config.frame_rate_hz.max(1),
            round_duration_ms: config.round_duration_ms,
            silence_timeout_ms: config.silence_timeout_ms,
            frames: 0,
            silence_reported: false,
            source_closed: false,
        }
    }

    /// Advance one frame
    pub fn frame(&mut self) -> FrameReport {
        let mut ingested = 0;
        let mut peak_acc: f64 = 0.0;

        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    let step = self.integrator.ingest(&event);
                    if step.acc_magnitude.is_finite() {
                        peak_acc = peak_acc.max(step.acc_magnitude);
                    }
                    ingested += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.source_closed {
                        tracing::debug!("[MotionPipeline] Motion source closed its channel");
                    }
                    self.source_closed = true;
                    break;
                }
            }
        }

        self.frames += 1;
        let elapsed_ms = self.elapsed_ms();

        let silence_detected = !self.silence_reported
            && self.integrator.events() == 0
            && elapsed_ms >= self.silence_timeout_ms as f64;
        if silence_detected {
            self.silence_reported = true;
        }

        FrameReport {
            frame: self.frames,
            elapsed_ms,
            events: ingested,
            score: self.integrator.score(),
            meter: self.meter.update(peak_acc),
            silence_detected,
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.frames as f64 * 1000.0 / self.frame_rate_hz as f64
    }

    /// Whether the round has run its full duration
    pub fn is_complete(&self) -> bool {
        self.elapsed_ms() >= self.round_duration_ms as f64
    }

    /// Whether the sensor dropped its sender
    pub fn is_source_closed(&self) -> bool {
        self.source_closed
    }

    pub fn score(&self) -> u32 {
        self.integrator.score()
    }

    pub fn tally(&self) -> ShakeTally {
        self.integrator.tally()
    }
}
