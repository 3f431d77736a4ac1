// Leaderboard - top-N score entries per game mode
//
// Entries are kept sorted by descending score. Ties keep insertion order, so
// an earlier entry stays ahead of a later one with the same score. Every
// write truncates to the configured capacity.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Which round a leaderboard belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Laugh,
    Shake,
}

impl GameMode {
    /// Storage key suffix
    pub fn key(&self) -> &'static str {
        match self {
            GameMode::Laugh => "laugh",
            GameMode::Shake => "shake",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One finished round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

impl ScoreEntry {
    pub fn new(name: impl Into<String>, score: u32, timestamp_ms: u64) -> Self {
        Self {
            name: name.into(),
            score,
            timestamp_ms,
        }
    }

    /// Entry stamped with the current wall-clock time
    pub fn now(name: impl Into<String>, score: u32) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self::new(name, score, timestamp_ms)
    }
}

/// Ordered, bounded list of entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<ScoreEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort and truncate arbitrary entries into a valid leaderboard
    pub fn from_entries(mut entries: Vec<ScoreEntry>, capacity: usize) -> Self {
        // stable: ties keep their stored order
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(capacity);
        Self { entries }
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top(&self) -> Option<&ScoreEntry> {
        self.entries.first()
    }

    /// Strictly greater than the current top, or anything on an empty board
    pub fn is_personal_best(&self, score: u32) -> bool {
        self.top().map_or(true, |top| score > top.score)
    }

    /// Insert an entry and drop whatever falls past `capacity`
    ///
    /// # Returns
    /// 1-based rank of the new entry, or `None` if it did not make the cut
    pub fn insert(&mut self, entry: ScoreEntry, capacity: usize) -> Option<usize> {
        let position = self.entries.partition_point(|e| e.score >= entry.score);
        self.entries.insert(position, entry);
        self.entries.truncate(capacity);
        if position < self.entries.len() {
            Some(position + 1)
        } else {
            None
        }
    }

    pub fn into_entries(self) -> Vec<ScoreEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: u32) -> ScoreEntry {
        ScoreEntry::new(name, score, 0)
    }

    fn is_sorted_descending(board: &Leaderboard) -> bool {
        board
            .entries()
            .windows(2)
            .all(|pair| pair[0].score >= pair[1].score)
    }

    #[test]
    fn test_insert_keeps_descending_order() {
        let mut board = Leaderboard::new();
        assert_eq!(board.insert(entry("a", 10), 10), Some(1));
        assert_eq!(board.insert(entry("b", 30), 10), Some(1));
        assert_eq!(board.insert(entry("c", 20), 10), Some(2));

        let scores: Vec<u32> = board.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![30, 20, 10]);
    }

    #[test]
    fn test_ties_keep_earlier_entry_ahead() {
        let mut board = Leaderboard::new();
        board.insert(entry("first", 50), 10);
        assert_eq!(board.insert(entry("second", 50), 10), Some(2));
        assert_eq!(board.entries()[0].name, "first");
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut board = Leaderboard::new();
        for score in 0..25 {
            board.insert(entry("p", score), 10);
            assert!(board.len() <= 10);
            assert!(is_sorted_descending(&board));
        }
        assert_eq!(board.top().unwrap().score, 24);
        assert_eq!(board.entries().last().unwrap().score, 15);
    }

    #[test]
    fn test_low_score_misses_full_board() {
        let mut board = Leaderboard::new();
        for score in 10..20 {
            board.insert(entry("p", score), 10);
        }
        assert_eq!(board.insert(entry("late", 3), 10), None);
        assert_eq!(board.len(), 10);
        assert!(board.entries().iter().all(|e| e.name != "late"));
    }

    #[test]
    fn test_personal_best_is_strict() {
        let mut board = Leaderboard::new();
        assert!(board.is_personal_best(0));
        board.insert(entry("a", 40), 10);
        assert!(!board.is_personal_best(40));
        assert!(!board.is_personal_best(12));
        assert!(board.is_personal_best(41));
    }

    #[test]
    fn test_from_entries_normalizes() {
        let entries = (0..15).map(|i| entry("p", i * 7 % 13)).collect();
        let board = Leaderboard::from_entries(entries, 10);
        assert_eq!(board.len(), 10);
        assert!(is_sorted_descending(&board));
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let mut board = Leaderboard::new();
        board.insert(ScoreEntry::new("Ann", 56, 1_700_000_000_000), 10);
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(
            json,
            r#"[{"name":"Ann","score":56,"timestamp_ms":1700000000000}]"#
        );
    }

    #[test]
    fn test_mode_keys() {
        assert_eq!(GameMode::Laugh.key(), "laugh");
        assert_eq!(GameMode::Shake.to_string(), "shake");
    }
}
