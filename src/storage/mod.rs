// Storage module - leaderboards and their persistence
//
// - leaderboard: GameMode, ScoreEntry, Leaderboard (sorted, capped)
// - kv: KeyValueStore seam with in-memory and file-backed stores
// - score_store: ScoreStore, the only owner of leaderboard reads and writes

pub mod kv;
pub mod leaderboard;
pub mod score_store;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use leaderboard::{GameMode, Leaderboard, ScoreEntry};
pub use score_store::{RecordOutcome, ScoreStore};
