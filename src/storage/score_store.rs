// ScoreStore - load-modify-store leaderboard persistence
//
// Each mode's leaderboard lives under `<key_prefix>.<mode>` as a JSON array.
// Reads never fail: a missing key, unreadable backend or corrupt JSON all
// yield an empty board. Writes replace the whole board in one `set`.

use std::sync::Arc;

use crate::config::StorageConfig;
use crate::error::{log_storage_error, StorageError};
use crate::storage::kv::KeyValueStore;
use crate::storage::leaderboard::{GameMode, Leaderboard, ScoreEntry};

/// What recording a score changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOutcome {
    /// Beat the previous top entry (or the board was empty)
    pub personal_best: bool,
    /// 1-based rank, `None` if the score did not make the board
    pub rank: Option<usize>,
}

pub struct ScoreStore {
    store: Arc<dyn KeyValueStore>,
    key_prefix: String,
    capacity: usize,
}

impl ScoreStore {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &StorageConfig) -> Self {
        Self {
            store,
            key_prefix: config.key_prefix.clone(),
            capacity: config.capacity.max(1),
        }
    }

    pub fn key(&self, mode: GameMode) -> String {
        format!("{}.{}", self.key_prefix, mode.key())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current leaderboard for `mode`, empty when nothing valid is stored
    pub fn load(&self, mode: GameMode) -> Leaderboard {
        let key = self.key(mode);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Leaderboard::new(),
            Err(err) => {
                log_storage_error(&err, "ScoreStore::load");
                return Leaderboard::new();
            }
        };

        match serde_json::from_str::<Vec<ScoreEntry>>(&raw) {
            Ok(entries) => Leaderboard::from_entries(entries, self.capacity),
            Err(err) => {
                tracing::warn!(
                    "[ScoreStore] Discarding corrupt leaderboard under {}: {}",
                    key,
                    err
                );
                Leaderboard::new()
            }
        }
    }

    /// Add an entry to the mode's leaderboard and write it back
    ///
    /// Personal best is decided against the board as it was before the
    /// insert.
    pub fn record(&self, mode: GameMode, entry: ScoreEntry) -> Result<RecordOutcome, StorageError> {
        let mut board = self.load(mode);
        let personal_best = board.is_personal_best(entry.score);
        let score = entry.score;
        let rank = board.insert(entry, self.capacity);

        let encoded = serde_json::to_string(&board).map_err(|err| StorageError::Encode {
            details: err.to_string(),
        })?;
        self.store.set(&self.key(mode), &encoded)?;

        tracing::info!(
            "[ScoreStore] Recorded {} score {} (rank {:?}, personal best: {})",
            mode,
            score,
            rank,
            personal_best
        );
        Ok(RecordOutcome {
            personal_best,
            rank,
        })
    }
}
