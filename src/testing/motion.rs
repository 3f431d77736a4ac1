//! Synthetic motion sensor with an optional built-in shaker.

use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::error::RoundError;
use crate::motion::{MotionEvent, MotionSensor, RotationRate, Vector3};
use crate::platform::SensorKind;

/// Periodic shaking generated for every subscription
#[derive(Debug, Clone, Copy)]
pub struct ShakePattern {
    /// Event rate of the simulated device
    pub rate_hz: f64,
    /// Peak linear acceleration in m/s²
    pub acceleration: f64,
    /// Shake frequency in Hz
    pub frequency_hz: f64,
    /// Constant rotation rate in deg/s on the alpha axis
    pub rotation_dps: f64,
    /// Report only gravity-inclusive acceleration
    pub gravity_only: bool,
}

impl ShakePattern {
    /// Vigorous shaking at a typical 60 Hz event rate
    pub fn vigorous() -> Self {
        Self {
            rate_hz: 60.0,
            acceleration: 15.0,
            frequency_hz: 3.0,
            rotation_dps: 90.0,
            gravity_only: false,
        }
    }

    fn event_at(&self, index: u64) -> MotionEvent {
        let t = index as f64 / self.rate_hz;
        let a = self.acceleration * (2.0 * PI * self.frequency_hz * t).sin();
        let rotation_rate = Some(RotationRate::new(self.rotation_dps, 0.0, 0.0));
        let timestamp_ms = t * 1000.0;
        if self.gravity_only {
            MotionEvent {
                acceleration_including_gravity: Some(Vector3::new(a, 0.0, 9.81)),
                rotation_rate,
                timestamp_ms,
                ..Default::default()
            }
        } else {
            MotionEvent {
                acceleration: Some(Vector3::new(a, 0.0, 0.0)),
                acceleration_including_gravity: Some(Vector3::new(a, 0.0, 9.81)),
                rotation_rate,
                timestamp_ms,
            }
        }
    }
}

/// Motion sensor double
///
/// Without a pattern, events only flow through [`SyntheticMotion::emit`].
pub struct SyntheticMotion {
    requires_permission: bool,
    grant: AtomicBool,
    pattern: Option<ShakePattern>,
    permission_requests: AtomicUsize,
    subscribers: Mutex<Vec<mpsc::Sender<MotionEvent>>>,
}

impl SyntheticMotion {
    /// A device that needs no permission and stays still
    pub fn new() -> Self {
        Self {
            requires_permission: false,
            grant: AtomicBool::new(true),
            pattern: None,
            permission_requests: AtomicUsize::new(0),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// A device that is shaken for as long as it is subscribed
    pub fn shaking(pattern: ShakePattern) -> Self {
        Self {
            pattern: Some(pattern),
            ..Self::new()
        }
    }

    /// Require an explicit grant, answered with `granted`
    pub fn with_permission_prompt(mut self, granted: bool) -> Self {
        self.requires_permission = true;
        self.grant = AtomicBool::new(granted);
        self
    }

    pub fn permission_requests(&self) -> usize {
        self.permission_requests.load(Ordering::SeqCst)
    }

    /// Subscriptions whose receiver is still alive
    pub fn active_subscriptions(&self) -> usize {
        self.subscribers
            .lock()
            .map(|subs| subs.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }

    /// Deliver one event to every live subscriber
    ///
    /// # Returns
    /// Number of subscribers that accepted it
    pub fn emit(&self, event: MotionEvent) -> usize {
        let Ok(subs) = self.subscribers.lock() else {
            return 0;
        };
        subs.iter().filter(|tx| tx.try_send(event).is_ok()).count()
    }
}

impl Default for SyntheticMotion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MotionSensor for SyntheticMotion {
    fn requires_permission(&self) -> bool {
        self.requires_permission
    }

    async fn request_permission(&self) -> Result<(), RoundError> {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        if self.grant.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RoundError::PermissionDenied {
                sensor: SensorKind::Motion,
            })
        }
    }

    fn subscribe(&self, capacity: usize) -> Result<mpsc::Receiver<MotionEvent>, RoundError> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        {
            let mut subs = self.subscribers.lock().map_err(|_| RoundError::LockPoisoned)?;
            subs.retain(|tx| !tx.is_closed());
            subs.push(tx.clone());
        }
        if let Some(pattern) = self.pattern {
            tokio::spawn(shake(tx, pattern));
        }
        Ok(rx)
    }
}

async fn shake(tx: mpsc::Sender<MotionEvent>, pattern: ShakePattern) {
    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / pattern.rate_hz.max(1.0)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut index = 0u64;
    loop {
        ticker.tick().await;
        if tx.send(pattern.event_at(index)).await.is_err() {
            return;
        }
        index += 1;
    }
}
