// RoundCore - lifecycle shared by the laugh and shake controllers
//
// A controller owns one RoundCore. The core keeps at most one round in a
// mutex-guarded slot together with the round task's JoinHandle and the
// mode-specific pipeline state.
//
// Ending a round always starts by taking it out of the slot under the lock.
// Natural completion and stop() race for that take; only the winner
// finalizes, so a round is persisted exactly once. Taking the round drops
// its pipeline right there, which closes the sensor queues before the
// caller returns.
//
// The slot lock is never held across an await. Round tasks borrow their
// state through `with_round` for one synchronous step at a time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::engine::events::{FinishCause, RoundEvent, RoundPhase, RoundSummary, StatusLevel};
use crate::engine::player::PlayerName;
use crate::error::{log_round_error, ErrorCode, RoundError};
use crate::storage::{GameMode, ScoreEntry, ScoreStore};

/// Pipeline state a round carries
pub trait ScoredRound: Send + 'static {
    /// Score the round would finish with right now
    fn score(&self) -> u32;
}

/// The round currently held by a controller
pub struct ActiveRound<S> {
    pub id: u64,
    pub player: PlayerName,
    pub phase: RoundPhase,
    pub state: S,
    task: Option<JoinHandle<()>>,
}

pub struct RoundCore<S> {
    mode: GameMode,
    slot: Mutex<Option<ActiveRound<S>>>,
    next_id: AtomicU64,
    scores: Arc<ScoreStore>,
    events: broadcast::Sender<RoundEvent>,
}

impl<S: ScoredRound> RoundCore<S> {
    pub fn new(
        mode: GameMode,
        scores: Arc<ScoreStore>,
        events: broadcast::Sender<RoundEvent>,
    ) -> Self {
        Self {
            mode,
            slot: Mutex::new(None),
            next_id: AtomicU64::new(1),
            scores,
            events,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    fn lock_slot(&self) -> Result<MutexGuard<'_, Option<ActiveRound<S>>>, RoundError> {
        self.slot.lock().map_err(|_| RoundError::LockPoisoned)
    }

    /// Publish an event; having no subscribers is not an error
    pub fn emit(&self, event: RoundEvent) {
        let _ = self.events.send(event);
    }

    pub fn emit_status(&self, level: StatusLevel, message: impl Into<String>) {
        self.emit(RoundEvent::Status {
            mode: self.mode,
            level,
            message: message.into(),
        });
    }

    pub fn emit_controls(&self, start_enabled: bool, stop_enabled: bool) {
        self.emit(RoundEvent::Controls {
            mode: self.mode,
            start_enabled,
            stop_enabled,
        });
    }

    fn emit_phase(&self, phase: RoundPhase) {
        self.emit(RoundEvent::Phase {
            mode: self.mode,
            phase,
        });
    }

    /// Phase of the held round, `Idle` when there is none
    ///
    /// Never `Finished`: `finalize` empties the slot before announcing the
    /// finish, so that phase only ever appears as a `RoundEvent::Phase`.
    pub fn phase(&self) -> RoundPhase {
        match self.slot.lock() {
            Ok(slot) => slot.as_ref().map_or(RoundPhase::Idle, |round| round.phase),
            Err(_) => RoundPhase::Idle,
        }
    }

    /// Report a failed start and re-enable the start control
    ///
    /// # Returns
    /// The same error, for `return Err(core.abort_start(err, ..))`
    pub fn abort_start(&self, err: RoundError, context: &str) -> RoundError {
        log_round_error(&err, context);
        self.emit_status(StatusLevel::Error, err.message());
        self.emit_controls(true, false);
        self.emit_phase(RoundPhase::Idle);
        err
    }

    /// Install a new round
    ///
    /// The caller must have torn down any previous round first.
    pub fn begin(&self, player: PlayerName, phase: RoundPhase, state: S) -> Result<u64, RoundError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut slot = self.lock_slot()?;
            if let Some(stale) = slot.take() {
                tracing::warn!(
                    "[RoundCore] {} round {} was still installed; releasing it",
                    self.mode,
                    stale.id
                );
                release(stale);
            }
            *slot = Some(ActiveRound {
                id,
                player,
                phase,
                state,
                task: None,
            });
        }
        self.emit_phase(phase);
        Ok(id)
    }

    /// Hand the round its driving task
    ///
    /// If the round already ended, the task is aborted instead.
    pub fn attach_task(&self, id: u64, task: JoinHandle<()>) {
        match self.lock_slot() {
            Ok(mut slot) => match slot.as_mut() {
                Some(round) if round.id == id => round.task = Some(task),
                _ => task.abort(),
            },
            Err(_) => task.abort(),
        }
    }

    /// Run one synchronous step against the round's state
    ///
    /// # Returns
    /// * `Ok(Some(R))` - The round is still current
    /// * `Ok(None)` - Round `id` has ended or been replaced
    pub fn with_round<R>(
        &self,
        id: u64,
        f: impl FnOnce(&mut ActiveRound<S>) -> R,
    ) -> Result<Option<R>, RoundError> {
        let mut slot = self.lock_slot()?;
        Ok(match slot.as_mut() {
            Some(round) if round.id == id => Some(f(round)),
            _ => None,
        })
    }

    /// Move round `id` to `phase`; false if the round is gone
    pub fn set_phase(&self, id: u64, phase: RoundPhase) -> Result<bool, RoundError> {
        let changed = self
            .with_round(id, |round| round.phase = phase)?
            .is_some();
        if changed {
            self.emit_phase(phase);
        }
        Ok(changed)
    }

    /// End a round and persist its score
    ///
    /// `id` selects a specific round (natural completion); `None` ends
    /// whatever round is held (manual stop). A stopped round scores 0.
    ///
    /// # Returns
    /// * `Ok(Some(summary))` - This call finalized the round
    /// * `Ok(None)` - Nothing to finalize; another caller got there first
    pub fn finalize(
        &self,
        id: Option<u64>,
        cause: FinishCause,
    ) -> Result<Option<RoundSummary>, RoundError> {
        let round = {
            let mut slot = self.lock_slot()?;
            let current = slot.as_ref().map(|round| round.id);
            match (current, id) {
                (Some(current), Some(wanted)) if current != wanted => None,
                (Some(_), _) => slot.take(),
                (None, _) => None,
            }
        };
        let Some(mut round) = round else {
            return Ok(None);
        };

        let score = match cause {
            FinishCause::Completed => round.state.score(),
            FinishCause::Stopped => 0,
        };
        let player = round.player.clone();
        let round_id = round.id;

        // natural completion runs on the task itself, so only a stop aborts it
        let task = round.task.take();
        drop(round);
        if cause == FinishCause::Stopped {
            if let Some(task) = task {
                task.abort();
            }
        }

        tracing::info!(
            "[RoundCore] {} round {} for {} finished ({:?}) with score {}",
            self.mode,
            round_id,
            player,
            cause,
            score
        );
        self.emit_phase(RoundPhase::Finished);

        let entry = ScoreEntry::now(player.as_str(), score);
        let summary = match self.scores.record(self.mode, entry) {
            Ok(outcome) => RoundSummary {
                mode: self.mode,
                player: player.to_string(),
                score,
                personal_best: outcome.personal_best,
                rank: outcome.rank,
                persisted: true,
                cause,
            },
            Err(err) => {
                let err = RoundError::from(err);
                log_round_error(&err, "RoundCore::finalize");
                self.emit_status(StatusLevel::Error, err.message());
                RoundSummary {
                    mode: self.mode,
                    player: player.to_string(),
                    score,
                    personal_best: false,
                    rank: None,
                    persisted: false,
                    cause,
                }
            }
        };

        self.emit(RoundEvent::Finished(summary.clone()));
        self.emit_phase(RoundPhase::Idle);
        self.emit_controls(true, false);
        Ok(Some(summary))
    }

    /// Release the held round without scoring it
    ///
    /// # Returns
    /// Whether a round was torn down
    pub fn teardown(&self) -> Result<bool, RoundError> {
        let round = self.lock_slot()?.take();
        match round {
            Some(round) => {
                tracing::info!(
                    "[RoundCore] Tearing down {} round {} without scoring",
                    self.mode,
                    round.id
                );
                release(round);
                self.emit_phase(RoundPhase::Idle);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn release<S>(mut round: ActiveRound<S>) {
    if let Some(task) = round.task.take() {
        task.abort();
    }
    drop(round);
}
