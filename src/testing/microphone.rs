//! Synthetic microphone: deterministic PCM pushed on a Tokio timer.
//!
//! Every `open` spawns a pump task that writes one chunk per period into the
//! stream's SPSC queue until the consumer side is dropped. The producers are
//! kept in a shared list so tests can count live streams at any instant.

use std::f32::consts::PI;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rtrb::Producer;
use tokio::time::MissedTickBehavior;

use crate::audio::{AudioCapture, Microphone};
use crate::error::RoundError;
use crate::platform::SensorKind;
use crate::testing::wav::read_wav;

/// What the synthetic microphone plays
#[derive(Debug, Clone)]
pub enum SyntheticSignal {
    /// Stream opens but never delivers a sample
    Starved,
    /// Sine tone plus uniform noise
    Tone {
        frequency_hz: f32,
        amplitude: f32,
        noise: f32,
    },
    /// Recorded clip at its own sample rate, resampled on the fly
    Clip {
        samples: Arc<Vec<f32>>,
        sample_rate: u32,
        looped: bool,
    },
}

struct SignalGenerator {
    signal: SyntheticSignal,
    sample_rate: u32,
    phase: f32,
    cursor: f32,
    rng: StdRng,
}

impl SignalGenerator {
    fn new(signal: SyntheticSignal, sample_rate: u32) -> Self {
        Self {
            signal,
            sample_rate: sample_rate.max(1),
            phase: 0.0,
            cursor: 0.0,
            rng: StdRng::seed_from_u64(0x1A06_5EED),
        }
    }

    /// Fill `buffer`; returns how many samples were produced
    fn fill(&mut self, buffer: &mut [f32]) -> usize {
        match &self.signal {
            SyntheticSignal::Starved => 0,
            SyntheticSignal::Tone {
                frequency_hz,
                amplitude,
                noise,
            } => {
                let step = frequency_hz / self.sample_rate as f32;
                let (amplitude, noise) = (*amplitude, *noise);
                for sample in buffer.iter_mut() {
                    let jitter = if noise > 0.0 {
                        self.rng.gen_range(-noise..noise)
                    } else {
                        0.0
                    };
                    *sample = (2.0 * PI * self.phase).sin() * amplitude + jitter;
                    self.phase = (self.phase + step).fract();
                }
                buffer.len()
            }
            SyntheticSignal::Clip {
                samples,
                sample_rate,
                looped,
            } => {
                if samples.is_empty() {
                    return 0;
                }
                let ratio = *sample_rate as f32 / self.sample_rate as f32;
                let mut written = 0;
                while written < buffer.len() {
                    let mut idx = self.cursor.floor() as usize;
                    if idx >= samples.len() {
                        if !*looped {
                            break;
                        }
                        // clips shorter than one resample step wrap more than once
                        self.cursor %= samples.len() as f32;
                        idx = (self.cursor.floor() as usize).min(samples.len() - 1);
                    }
                    let frac = self.cursor - idx as f32;
                    let next = (idx + 1).min(samples.len() - 1);
                    buffer[written] = (1.0 - frac) * samples[idx] + frac * samples[next];
                    written += 1;
                    self.cursor += ratio;
                }
                written
            }
        }
    }
}

/// Microphone double with a live-stream counter
pub struct SyntheticMicrophone {
    signal: SyntheticSignal,
    chunk_period: Duration,
    deny: AtomicBool,
    opens: AtomicUsize,
    streams: Arc<Mutex<Vec<Arc<Mutex<Producer<f32>>>>>>,
}

impl SyntheticMicrophone {
    pub fn new(signal: SyntheticSignal) -> Self {
        Self {
            signal,
            chunk_period: Duration::from_millis(20),
            deny: AtomicBool::new(false),
            opens: AtomicUsize::new(0),
            streams: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A quiet tone with a little noise
    pub fn tone(frequency_hz: f32, amplitude: f32) -> Self {
        Self::new(SyntheticSignal::Tone {
            frequency_hz,
            amplitude,
            noise: amplitude * 0.1,
        })
    }

    pub fn starved() -> Self {
        Self::new(SyntheticSignal::Starved)
    }

    /// Play a WAV file, looping it for as long as the stream is open
    pub fn from_wav(path: &Path) -> Result<Self, RoundError> {
        let (samples, sample_rate) = read_wav(path)?;
        Ok(Self::new(SyntheticSignal::Clip {
            samples: Arc::new(samples),
            sample_rate,
            looped: true,
        }))
    }

    /// Refuse the next and all later `open` calls
    pub fn deny_permission(&self) {
        self.deny.store(true, Ordering::SeqCst);
    }

    /// Successful `open` calls so far
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Streams whose consumer side is still alive
    pub fn active_streams(&self) -> usize {
        let Ok(streams) = self.streams.lock() else {
            return 0;
        };
        streams
            .iter()
            .filter(|producer| {
                producer
                    .lock()
                    .map(|producer| !producer.is_abandoned())
                    .unwrap_or(false)
            })
            .count()
    }
}

#[async_trait]
impl Microphone for SyntheticMicrophone {
    async fn open(&self, sample_rate: u32, capacity: usize) -> Result<AudioCapture, RoundError> {
        if self.deny.load(Ordering::SeqCst) {
            return Err(RoundError::PermissionDenied {
                sensor: SensorKind::Microphone,
            });
        }

        let (producer, capture) = AudioCapture::channel(sample_rate, capacity);
        let producer = Arc::new(Mutex::new(producer));
        {
            let mut streams = self.streams.lock().map_err(|_| RoundError::LockPoisoned)?;
            streams.retain(|p| p.lock().map(|p| !p.is_abandoned()).unwrap_or(false));
            streams.push(producer.clone());
        }
        self.opens.fetch_add(1, Ordering::SeqCst);

        let chunk_len =
            ((sample_rate as u128 * self.chunk_period.as_millis()) / 1000).max(1) as usize;
        tokio::spawn(pump(
            producer,
            SignalGenerator::new(self.signal.clone(), sample_rate),
            chunk_len,
            self.chunk_period,
        ));
        Ok(capture)
    }
}

async fn pump(
    producer: Arc<Mutex<Producer<f32>>>,
    mut generator: SignalGenerator,
    chunk_len: usize,
    period: Duration,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut chunk = vec![0.0f32; chunk_len];

    loop {
        ticker.tick().await;
        let produced = generator.fill(&mut chunk);
        {
            let Ok(mut producer) = producer.lock() else {
                return;
            };
            if producer.is_abandoned() {
                return;
            }
            for &sample in &chunk[..produced] {
                // a full queue drops the newest audio, like a real device overrun
                if producer.push(sample).is_err() {
                    break;
                }
            }
        }
    }
}
