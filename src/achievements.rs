//! Achievements: fixed definition table, edge-triggered unlock checks,
//! cumulative stat tracking, and the unlocked-reward bundle.
//!
//! `check_*` calls are no-ops for already-unlocked achievements; an unlock
//! records the timestamp, queues a notification, and persists immediately.
//! [`AchievementLog::active_rewards`] is the pure aggregator consumed once
//! per session start.

use crate::difficulty::Difficulty;
use crate::rewards::{RewardBundle, RewardEffect, RewardKind};
use crate::storage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use bevy::prelude::*;

const SAVE_FILE: &str = "achievements.toml";

// ── Definitions ───────────────────────────────────────────────────────────────

/// What unlocks an achievement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Requirement {
    /// Single-game score threshold.
    Score(u32),
    /// Wave-number threshold.
    Wave(u32),
    /// Combo-length threshold.
    Combo(u32),
    /// Lifetime kills across all games.
    CumulativeKills(u32),
    /// Lifetime boss kills.
    CumulativeBossKills(u32),
    /// Lifetime completed vowel reviews.
    LearningScreens(u32),
    /// Lifetime pronounced words.
    WordsClicked(u32),
    /// Complete `wave` on `difficulty` or higher (ordinal comparison).
    Milestone { wave: u32, difficulty: Difficulty },
    /// Boolean signal checked at wave end (perfect wave, accuracy, speed).
    Flag,
}

/// One achievement definition.
#[derive(Debug, Clone, Copy)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub requirement: Requirement,
    pub reward: RewardEffect,
}

/// The full fixed table.
pub fn definitions() -> &'static [AchievementDef] {
    use Requirement::*;

    const DEFS: [AchievementDef; 21] = [
        // Score
        AchievementDef {
            id: "first_score",
            name: "First Points",
            description: "Score your first 100 points",
            requirement: Score(100),
            reward: RewardEffect::none(),
        },
        AchievementDef {
            id: "score_master",
            name: "Score Master",
            description: "Reach 5,000 points in a single game",
            requirement: Score(5000),
            reward: RewardEffect::permanent(RewardKind::Damage, 1.1),
        },
        AchievementDef {
            id: "score_legend",
            name: "Score Legend",
            description: "Reach 10,000 points",
            requirement: Score(10000),
            reward: RewardEffect::permanent(RewardKind::Damage, 1.2),
        },
        // Waves
        AchievementDef {
            id: "wave_warrior",
            name: "Wave Warrior",
            description: "Complete wave 10",
            requirement: Wave(10),
            reward: RewardEffect::permanent(RewardKind::Health, 10.0),
        },
        AchievementDef {
            id: "wave_master",
            name: "Wave Master",
            description: "Complete wave 20",
            requirement: Wave(20),
            reward: RewardEffect::permanent(RewardKind::Health, 20.0),
        },
        // Kills (lifetime)
        AchievementDef {
            id: "alien_hunter",
            name: "Alien Hunter",
            description: "Defeat 100 aliens (cumulative)",
            requirement: CumulativeKills(100),
            reward: RewardEffect::permanent(RewardKind::Damage, 1.05),
        },
        AchievementDef {
            id: "alien_slayer",
            name: "Alien Slayer",
            description: "Defeat 500 aliens (cumulative)",
            requirement: CumulativeKills(500),
            reward: RewardEffect::permanent(RewardKind::Speed, 1.1),
        },
        AchievementDef {
            id: "alien_destroyer",
            name: "Alien Destroyer",
            description: "Defeat 1,000 aliens (cumulative)",
            requirement: CumulativeKills(1000),
            reward: RewardEffect::permanent(RewardKind::Damage, 1.15),
        },
        // Combos
        AchievementDef {
            id: "combo_starter",
            name: "Combo Starter",
            description: "Reach a 10x combo",
            requirement: Combo(10),
            reward: RewardEffect::none(),
        },
        AchievementDef {
            id: "combo_master",
            name: "Combo Master",
            description: "Reach a 25x combo",
            requirement: Combo(25),
            reward: RewardEffect::permanent(RewardKind::FireRate, 0.9),
        },
        AchievementDef {
            id: "combo_god",
            name: "Combo God",
            description: "Reach a 50x combo",
            requirement: Combo(50),
            reward: RewardEffect::permanent(RewardKind::FireRate, 0.8),
        },
        // Bosses (lifetime)
        AchievementDef {
            id: "boss_slayer",
            name: "Boss Slayer",
            description: "Defeat your first boss",
            requirement: CumulativeBossKills(1),
            reward: RewardEffect::permanent(RewardKind::BossDamage, 1.1),
        },
        AchievementDef {
            id: "boss_hunter",
            name: "Boss Hunter",
            description: "Defeat 5 bosses (cumulative)",
            requirement: CumulativeBossKills(5),
            reward: RewardEffect::permanent(RewardKind::Health, 15.0),
        },
        AchievementDef {
            id: "boss_destroyer",
            name: "Boss Destroyer",
            description: "Defeat 10 bosses (cumulative)",
            requirement: CumulativeBossKills(10),
            reward: RewardEffect::permanent(RewardKind::BossDamage, 1.25),
        },
        // Learning
        AchievementDef {
            id: "vowel_learner",
            name: "Vowel Learner",
            description: "Complete 5 vowel reviews",
            requirement: LearningScreens(5),
            reward: RewardEffect::permanent(RewardKind::Score, 1.05),
        },
        AchievementDef {
            id: "vowel_scholar",
            name: "Vowel Scholar",
            description: "Complete 20 vowel reviews",
            requirement: LearningScreens(20),
            reward: RewardEffect::permanent(RewardKind::Score, 1.1),
        },
        AchievementDef {
            id: "pronunciation_expert",
            name: "Pronunciation Expert",
            description: "Hear 50 word pronunciations",
            requirement: WordsClicked(50),
            reward: RewardEffect::permanent(RewardKind::Score, 1.15),
        },
        // Difficulty milestones
        AchievementDef {
            id: "survivor",
            name: "Survivor",
            description: "Complete wave 5 on Normal or higher",
            requirement: Milestone {
                wave: 5,
                difficulty: Difficulty::Normal,
            },
            reward: RewardEffect::none(),
        },
        AchievementDef {
            id: "champion",
            name: "Champion",
            description: "Complete wave 10 on Hard",
            requirement: Milestone {
                wave: 10,
                difficulty: Difficulty::Hard,
            },
            reward: RewardEffect::permanent(RewardKind::Health, 25.0),
        },
        AchievementDef {
            id: "legendary",
            name: "Legendary",
            description: "Complete wave 15 on Hard",
            requirement: Milestone {
                wave: 15,
                difficulty: Difficulty::Hard,
            },
            reward: RewardEffect::permanent(RewardKind::AllStats, 1.2),
        },
        // Special wave-end signals
        AchievementDef {
            id: "perfect_wave",
            name: "Perfect Wave",
            description: "Complete a wave without taking damage",
            requirement: Flag,
            reward: RewardEffect::permanent(RewardKind::Health, 10.0),
        },
    ];
    &DEFS
}

/// Wave-end flag achievements live in the same table but two of them carry
/// separate rewards; see `sharpshooter` / `speed_demon` below.
pub fn flag_definitions() -> &'static [AchievementDef] {
    const FLAG_DEFS: [AchievementDef; 2] = [
        AchievementDef {
            id: "sharpshooter",
            name: "Sharpshooter",
            description: "Achieve 90% accuracy in a wave",
            requirement: Requirement::Flag,
            reward: RewardEffect::permanent(RewardKind::Damage, 1.15),
        },
        AchievementDef {
            id: "speed_demon",
            name: "Speed Demon",
            description: "Complete a wave in under 30 seconds",
            requirement: Requirement::Flag,
            reward: RewardEffect::permanent(RewardKind::Speed, 1.15),
        },
    ];
    &FLAG_DEFS
}

fn find_def(id: &str) -> Option<&'static AchievementDef> {
    definitions()
        .iter()
        .chain(flag_definitions().iter())
        .find(|def| def.id == id)
}

// ── Persisted state ───────────────────────────────────────────────────────────

/// Lifetime counters shared across runs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CumulativeStats {
    pub total_kills: u64,
    pub total_boss_kills: u64,
    pub learning_screens: u64,
    pub words_clicked: u64,
    pub games_played: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SavedAchievements {
    /// id → unlock timestamp (unix seconds).
    unlocked: BTreeMap<String, u64>,
    stats: CumulativeStats,
}

/// Runtime achievement state.
///
/// `Default` yields an in-memory log (used by tests); [`AchievementLog::load`]
/// attaches disk persistence.
#[derive(Resource, Debug, Default)]
pub struct AchievementLog {
    unlocked: BTreeMap<String, u64>,
    pub stats: CumulativeStats,
    pending_notifications: Vec<&'static str>,
    autosave: bool,
}

impl AchievementLog {
    /// Load persisted progress, falling back to a fresh log.
    pub fn load() -> Self {
        let saved: SavedAchievements = storage::load_or_default(SAVE_FILE);
        Self {
            unlocked: saved.unlocked,
            stats: saved.stats,
            pending_notifications: Vec::new(),
            autosave: true,
        }
    }

    fn save(&self) {
        if !self.autosave {
            return;
        }
        let saved = SavedAchievements {
            unlocked: self.unlocked.clone(),
            stats: self.stats,
        };
        storage::save_or_log(SAVE_FILE, &saved);
    }

    #[inline]
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains_key(id)
    }

    fn unlock(&mut self, id: &'static str) {
        if self.is_unlocked(id) {
            return;
        }
        self.unlocked.insert(id.to_string(), storage::unix_now());
        self.pending_notifications.push(id);
        info!("Achievement unlocked: {id}");
        self.save();
    }

    /// Edge-triggered numeric check (score / wave / combo / lifetime stats).
    /// No-op when unknown or already unlocked.
    pub fn check_value(&mut self, id: &'static str, value: u32) {
        if self.is_unlocked(id) {
            return;
        }
        let Some(def) = find_def(id) else {
            debug_assert!(false, "unknown achievement id '{id}'");
            return;
        };
        let met = match def.requirement {
            Requirement::Score(n) | Requirement::Wave(n) | Requirement::Combo(n) => value >= n,
            Requirement::CumulativeKills(n) => self.stats.total_kills >= n as u64,
            Requirement::CumulativeBossKills(n) => self.stats.total_boss_kills >= n as u64,
            Requirement::LearningScreens(n) => self.stats.learning_screens >= n as u64,
            Requirement::WordsClicked(n) => self.stats.words_clicked >= n as u64,
            Requirement::Milestone { .. } | Requirement::Flag => false,
        };
        if met {
            self.unlock(id);
        }
    }

    /// Edge-triggered boolean check (perfect wave, accuracy, speed).
    pub fn check_flag(&mut self, id: &'static str, value: bool) {
        if !value || self.is_unlocked(id) {
            return;
        }
        let Some(def) = find_def(id) else {
            debug_assert!(false, "unknown achievement id '{id}'");
            return;
        };
        if def.requirement == Requirement::Flag {
            self.unlock(id);
        }
    }

    /// Edge-triggered milestone check with ordinal difficulty comparison.
    pub fn check_milestone(&mut self, id: &'static str, wave: u32, difficulty: Difficulty) {
        if self.is_unlocked(id) {
            return;
        }
        let Some(def) = find_def(id) else {
            debug_assert!(false, "unknown achievement id '{id}'");
            return;
        };
        if let Requirement::Milestone {
            wave: req_wave,
            difficulty: req_difficulty,
        } = def.requirement
        {
            if wave >= req_wave && difficulty.meets(req_difficulty) {
                self.unlock(id);
            }
        }
    }

    // ── Cumulative stat tracking ──────────────────────────────────────────────

    pub fn add_kills(&mut self, count: u32) {
        self.stats.total_kills += count as u64;
        self.check_value("alien_hunter", 0);
        self.check_value("alien_slayer", 0);
        self.check_value("alien_destroyer", 0);
        self.save();
    }

    pub fn add_boss_kill(&mut self) {
        self.stats.total_boss_kills += 1;
        self.check_value("boss_slayer", 0);
        self.check_value("boss_hunter", 0);
        self.check_value("boss_destroyer", 0);
        self.save();
    }

    pub fn add_learning_screen(&mut self) {
        self.stats.learning_screens += 1;
        self.check_value("vowel_learner", 0);
        self.check_value("vowel_scholar", 0);
        self.save();
    }

    pub fn add_word_clicked(&mut self) {
        self.stats.words_clicked += 1;
        self.check_value("pronunciation_expert", 0);
        self.save();
    }

    // ── Aggregation ───────────────────────────────────────────────────────────

    /// Fold every unlocked reward into one bundle.  Pure with respect to the
    /// unlock set; consumed once at session start.
    pub fn active_rewards(&self) -> RewardBundle {
        let mut bundle = RewardBundle::default();
        for def in definitions().iter().chain(flag_definitions().iter()) {
            if self.is_unlocked(def.id) {
                bundle.apply(&def.reward);
            }
        }
        bundle
    }

    /// Drain queued unlock notifications for the HUD.
    pub fn take_notifications(&mut self) -> Vec<&'static str> {
        std::mem::take(&mut self.pending_notifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlock_is_edge_triggered_and_idempotent() {
        let mut log = AchievementLog::default();
        assert!(!log.is_unlocked("first_score"));

        log.check_value("first_score", 99);
        assert!(!log.is_unlocked("first_score"));

        log.check_value("first_score", 100);
        assert!(log.is_unlocked("first_score"));
        assert_eq!(log.take_notifications(), vec!["first_score"]);

        // Re-checking an unlocked achievement queues nothing new.
        log.check_value("first_score", 100_000);
        assert!(log.take_notifications().is_empty());
    }

    #[test]
    fn cumulative_kills_unlock_through_stat_tracking() {
        let mut log = AchievementLog::default();
        log.add_kills(60);
        assert!(!log.is_unlocked("alien_hunter"));
        log.add_kills(40);
        assert!(log.is_unlocked("alien_hunter"));
        assert!(!log.is_unlocked("alien_slayer"));
    }

    #[test]
    fn milestones_use_ordinal_difficulty_comparison() {
        let mut log = AchievementLog::default();

        log.check_milestone("survivor", 5, Difficulty::Easy);
        assert!(!log.is_unlocked("survivor"));

        log.check_milestone("survivor", 5, Difficulty::Hard);
        assert!(log.is_unlocked("survivor"), "Hard satisfies 'Normal or higher'");

        log.check_milestone("champion", 12, Difficulty::Normal);
        assert!(!log.is_unlocked("champion"));
        log.check_milestone("champion", 10, Difficulty::Hard);
        assert!(log.is_unlocked("champion"));
    }

    #[test]
    fn flag_checks_ignore_false() {
        let mut log = AchievementLog::default();
        log.check_flag("perfect_wave", false);
        assert!(!log.is_unlocked("perfect_wave"));
        log.check_flag("perfect_wave", true);
        assert!(log.is_unlocked("perfect_wave"));
    }

    #[test]
    fn reward_bundle_folds_only_unlocked_rewards() {
        let mut log = AchievementLog::default();
        assert_eq!(log.active_rewards(), RewardBundle::default());

        log.check_value("score_master", 5000); // +10% damage
        log.check_flag("perfect_wave", true); // +10 health
        let bundle = log.active_rewards();
        assert!((bundle.damage_multiplier - 1.1).abs() < 1e-6);
        assert_eq!(bundle.health_bonus, 10.0);
        assert_eq!(bundle.score_multiplier, 1.0);
    }

    #[test]
    fn every_definition_id_is_unique() {
        let mut seen = std::collections::HashSet::new();
        for def in definitions().iter().chain(flag_definitions().iter()) {
            assert!(seen.insert(def.id), "duplicate achievement id {}", def.id);
        }
    }
}
