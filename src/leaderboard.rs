//! Local leaderboard: top-10 scores, sorted descending, persisted as TOML.
//!
//! A score is only written when it would actually place ([`Leaderboard::would_place`]
//! is checked by the game-over flow before submitting).

use crate::constants::LEADERBOARD_CAP;
use crate::difficulty::Difficulty;
use crate::storage;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

const SAVE_FILE: &str = "leaderboard.toml";

/// One recorded run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    pub wave: u32,
    pub kills: u32,
    pub max_combo: u32,
    pub difficulty: Difficulty,
    /// Unix seconds at submission.
    pub timestamp: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SavedLeaderboard {
    entries: Vec<LeaderboardEntry>,
}

/// The top-score table.
#[derive(Resource, Debug, Default)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
    autosave: bool,
}

impl Leaderboard {
    pub fn load() -> Self {
        let saved: SavedLeaderboard = storage::load_or_default(SAVE_FILE);
        let mut board = Self {
            entries: saved.entries,
            autosave: true,
        };
        board.normalize();
        board
    }

    fn save(&self) {
        if !self.autosave {
            return;
        }
        let saved = SavedLeaderboard {
            entries: self.entries.clone(),
        };
        storage::save_or_log(SAVE_FILE, &saved);
    }

    /// Keep the invariant: sorted descending by score, at most the cap.
    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(LEADERBOARD_CAP);
    }

    /// Would `score` enter the table?  Always true while the table is short.
    pub fn would_place(&self, score: u32) -> bool {
        if self.entries.len() < LEADERBOARD_CAP {
            return true;
        }
        self.entries
            .last()
            .map(|entry| score > entry.score)
            .unwrap_or(true)
    }

    /// Record a run.  Returns the 1-based rank it landed at, or `None` when
    /// it fell off the table.
    #[allow(clippy::too_many_arguments)]
    pub fn submit(
        &mut self,
        name: &str,
        score: u32,
        wave: u32,
        kills: u32,
        max_combo: u32,
        difficulty: Difficulty,
        timestamp: u64,
    ) -> Option<usize> {
        let display_name = if name.trim().is_empty() {
            "Anonymous"
        } else {
            name.trim()
        };

        self.entries.push(LeaderboardEntry {
            name: display_name.to_string(),
            score,
            wave,
            kills,
            max_combo,
            difficulty,
            timestamp,
        });
        self.normalize();
        self.save();

        self.entries
            .iter()
            .position(|entry| entry.timestamp == timestamp && entry.score == score)
            .map(|rank| rank + 1)
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn top_score(&self) -> u32 {
        self.entries.first().map(|entry| entry.score).unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(scores: &[u32]) -> Leaderboard {
        let mut board = Leaderboard::default();
        for (i, score) in scores.iter().enumerate() {
            board.submit("p", *score, 1, 0, 0, Difficulty::Normal, i as u64);
        }
        board
    }

    #[test]
    fn entries_stay_sorted_descending() {
        let board = board_with(&[50, 200, 125]);
        let scores: Vec<u32> = board.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![200, 125, 50]);
    }

    #[test]
    fn table_is_capped_at_ten() {
        let board = board_with(&[10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110]);
        assert_eq!(board.entries().len(), LEADERBOARD_CAP);
        // The lowest score fell off.
        assert!(board.entries().iter().all(|e| e.score >= 20));
    }

    #[test]
    fn placement_gate_matches_the_cap() {
        let mut board = board_with(&[10, 20, 30]);
        assert!(board.would_place(1), "short table accepts anything");

        for score in [40, 50, 60, 70, 80, 90, 100] {
            board.submit("p", score, 1, 0, 0, Difficulty::Normal, score as u64);
        }
        assert!(!board.would_place(10), "equal to the floor does not place");
        assert!(!board.would_place(5));
        assert!(board.would_place(11));
    }

    #[test]
    fn submit_reports_the_landing_rank() {
        let mut board = board_with(&[100, 50]);
        let rank = board.submit("p", 75, 3, 9, 4, Difficulty::Hard, 999);
        assert_eq!(rank, Some(2));
    }

    #[test]
    fn blank_names_become_anonymous() {
        let mut board = Leaderboard::default();
        board.submit("   ", 10, 1, 0, 0, Difficulty::Easy, 0);
        assert_eq!(board.entries()[0].name, "Anonymous");
    }
}
