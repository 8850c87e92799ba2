//! Daily challenges and special events.
//!
//! Three challenges are drawn from the pool each day (rolling 24 h from the
//! last reset), one per tier.  Progress is monotonic (`max(existing, new)`);
//! completion fires exactly once and activates a 24 h buff described by a
//! structured [`RewardEffect`].  Special events are wall-clock windows that
//! produce an [`EventModifiers`] bundle (score, boss frequency, speed, combo
//! decay, learning).

use crate::rewards::{RewardBundle, RewardEffect, RewardKind};
use crate::session::GameStats;
use crate::storage;
use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

const SAVE_FILE: &str = "challenges.toml";
const DAY_SECS: u64 = 24 * 60 * 60;

// ── Challenge pool ────────────────────────────────────────────────────────────

/// Which run statistic a challenge tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeType {
    Score,
    Wave,
    Combo,
    Kills,
    Boss,
    Learning,
    Speed,
    Survival,
    Perfect,
}

/// One tier of a challenge: a target and its structured reward.
#[derive(Debug, Clone, Copy)]
pub struct ChallengeTier {
    pub target: u32,
    pub reward_name: &'static str,
    pub reward: RewardEffect,
}

/// One pool entry with its three tier variants.
#[derive(Debug, Clone, Copy)]
pub struct ChallengeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: ChallengeType,
    pub tiers: [ChallengeTier; 3],
}

macro_rules! tier {
    ($target:expr, $name:expr, $kind:ident, $value:expr) => {
        ChallengeTier {
            target: $target,
            reward_name: $name,
            reward: RewardEffect::timed(RewardKind::$kind, $value, DAY_SECS),
        }
    };
}

/// The nine-type challenge pool.
pub fn pool() -> &'static [ChallengeDef] {
    const POOL: [ChallengeDef; 9] = [
        ChallengeDef {
            id: "score_challenge",
            name: "Score Master",
            kind: ChallengeType::Score,
            tiers: [
                tier!(3000, "Fast Hands", FireRate, 0.85),
                tier!(7500, "Power Shot", Damage, 1.2),
                tier!(15000, "Speed Demon", Speed, 1.2),
            ],
        },
        ChallengeDef {
            id: "wave_challenge",
            name: "Wave Warrior",
            kind: ChallengeType::Wave,
            tiers: [
                tier!(8, "Shield Boost", Health, 30.0),
                tier!(15, "Endurance", Health, 50.0),
                tier!(25, "Titan", Health, 75.0),
            ],
        },
        ChallengeDef {
            id: "combo_challenge",
            name: "Combo King",
            kind: ChallengeType::Combo,
            tiers: [
                tier!(20, "Rapid Fire", FireRate, 0.85),
                tier!(40, "Quick Shot", FireRate, 0.75),
                tier!(75, "Blazing Speed", FireRate, 0.6),
            ],
        },
        ChallengeDef {
            id: "kills_challenge",
            name: "Alien Hunter",
            kind: ChallengeType::Kills,
            tiers: [
                tier!(50, "Sharp Shooter", Damage, 1.15),
                tier!(100, "Marksman", Damage, 1.25),
                tier!(200, "Destroyer", Damage, 1.4),
            ],
        },
        ChallengeDef {
            id: "boss_challenge",
            name: "Boss Slayer",
            kind: ChallengeType::Boss,
            tiers: [
                tier!(2, "Boss Hunter", BossDamage, 1.3),
                tier!(4, "Boss Destroyer", BossDamage, 1.5),
                tier!(6, "Boss Annihilator", BossDamage, 1.75),
            ],
        },
        ChallengeDef {
            id: "learning_challenge",
            name: "Vowel Scholar",
            kind: ChallengeType::Learning,
            tiers: [
                tier!(5, "Student", Score, 1.1),
                tier!(10, "Scholar", Score, 1.2),
                tier!(15, "Professor", Score, 1.3),
            ],
        },
        ChallengeDef {
            id: "speed_challenge",
            name: "Speed Runner",
            kind: ChallengeType::Speed,
            tiers: [
                tier!(5, "Quick Feet", Speed, 1.15),
                tier!(10, "Sprint", Speed, 1.25),
                tier!(15, "Lightning", Speed, 1.4),
            ],
        },
        ChallengeDef {
            id: "survival_challenge",
            name: "Survivor",
            kind: ChallengeType::Survival,
            tiers: [
                tier!(5, "Tough", Health, 25.0),
                tier!(10, "Resilient", Health, 40.0),
                tier!(15, "Invincible", Health, 60.0),
            ],
        },
        ChallengeDef {
            id: "perfect_challenge",
            name: "Perfectionist",
            kind: ChallengeType::Perfect,
            tiers: [
                tier!(3, "Focused", Damage, 1.2),
                tier!(5, "Perfect", Damage, 1.3),
                tier!(8, "Flawless", Damage, 1.5),
            ],
        },
    ];
    &POOL
}

fn def_by_id(id: &str) -> Option<&'static ChallengeDef> {
    pool().iter().find(|def| def.id == id)
}

// ── Persisted state ───────────────────────────────────────────────────────────

/// Progress of one daily slot (tier index == slot index).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TierProgress {
    pub completed: bool,
    pub just_completed: bool,
    pub progress: u32,
}

/// A granted, time-limited buff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveBuff {
    pub name: String,
    pub effect: RewardEffect,
    pub activated_at: u64,
    pub expires_at: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SavedChallenges {
    /// Challenge ids for the easy/medium/hard slots.
    slots: Vec<String>,
    progress: Vec<TierProgress>,
    last_reset: u64,
    buffs: Vec<ActiveBuff>,
}

/// Daily challenge state.
///
/// `Default` is an unseeded in-memory instance (tests); [`DailyChallenges::load`]
/// restores from disk and performs the daily reset when due.
#[derive(Resource, Debug, Default)]
pub struct DailyChallenges {
    slots: Vec<String>,
    progress: Vec<TierProgress>,
    last_reset: u64,
    buffs: Vec<ActiveBuff>,
    autosave: bool,
}

impl DailyChallenges {
    pub fn load(now: u64) -> Self {
        let saved: SavedChallenges = storage::load_or_default(SAVE_FILE);
        let mut challenges = Self {
            slots: saved.slots,
            progress: saved.progress,
            last_reset: saved.last_reset,
            buffs: saved.buffs,
            autosave: true,
        };
        challenges.ensure_fresh(now);
        challenges.cleanup_expired(now);
        challenges
    }

    fn save(&self) {
        if !self.autosave {
            return;
        }
        let saved = SavedChallenges {
            slots: self.slots.clone(),
            progress: self.progress.clone(),
            last_reset: self.last_reset,
            buffs: self.buffs.clone(),
        };
        storage::save_or_log(SAVE_FILE, &saved);
    }

    /// Re-draw the daily set when the rolling 24 h window has elapsed (or the
    /// state is empty).
    pub fn ensure_fresh(&mut self, now: u64) {
        if !self.slots.is_empty() && now.saturating_sub(self.last_reset) < DAY_SECS {
            return;
        }
        let mut rng = rand::thread_rng();
        self.slots = (0..3)
            .map(|_| pool()[rng.gen_range(0..pool().len())].id.to_string())
            .collect();
        self.progress = vec![TierProgress::default(); 3];
        self.last_reset = now;
        self.save();
    }

    pub fn cleanup_expired(&mut self, now: u64) {
        let before = self.buffs.len();
        self.buffs.retain(|buff| buff.expires_at > now);
        if self.buffs.len() != before {
            self.save();
        }
    }

    /// Monotonic progress update for every slot tracking `kind`.
    /// Completion marks the slot exactly once and activates its buff.
    pub fn update_progress(&mut self, kind: ChallengeType, value: u32, now: u64) {
        let mut changed = false;
        let slots = self.slots.clone();

        for (slot_index, slot) in slots.iter().enumerate() {
            let Some(progress) = self.progress.get_mut(slot_index) else {
                continue;
            };
            if progress.completed {
                continue;
            }
            let Some(def) = def_by_id(slot) else {
                continue;
            };
            if def.kind != kind {
                continue;
            }

            // Monotonic: progress never decreases.
            progress.progress = progress.progress.max(value);
            changed = true;

            let tier = &def.tiers[slot_index.min(2)];
            if progress.progress >= tier.target {
                progress.completed = true;
                progress.just_completed = true;
                self.buffs.push(ActiveBuff {
                    name: tier.reward_name.to_string(),
                    effect: tier.reward,
                    activated_at: now,
                    expires_at: now + tier.reward.duration_secs.unwrap_or(DAY_SECS),
                });
                info!("Daily challenge complete: {} ({})", def.name, tier.reward_name);
            }
        }

        if changed {
            self.save();
        }
    }

    /// Feed an end-of-run stats bundle into every challenge type.
    pub fn track_game_session(&mut self, stats: &GameStats, now: u64) {
        self.ensure_fresh(now);
        self.update_progress(ChallengeType::Score, stats.score, now);
        self.update_progress(ChallengeType::Wave, stats.wave, now);
        self.update_progress(ChallengeType::Combo, stats.max_combo, now);
        self.update_progress(ChallengeType::Kills, stats.kills, now);
        self.update_progress(ChallengeType::Boss, stats.boss_kills, now);
        self.update_progress(ChallengeType::Learning, stats.learning_screens, now);
        self.update_progress(ChallengeType::Speed, stats.speed_waves, now);
        self.update_progress(ChallengeType::Survival, stats.survival_waves, now);
        self.update_progress(ChallengeType::Perfect, stats.perfect_waves, now);
        self.cleanup_expired(now);
    }

    /// Fold unexpired buffs into a bundle.  Pure; expiry is a separate
    /// mutation ([`Self::cleanup_expired`]).
    pub fn active_buffs(&self, now: u64) -> RewardBundle {
        let mut bundle = RewardBundle::default();
        for buff in &self.buffs {
            if buff.expires_at > now {
                bundle.apply(&buff.effect);
            }
        }
        bundle
    }

    /// Take the just-completed flags for notification display.
    pub fn take_just_completed(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        for (slot, progress) in self.slots.iter().zip(self.progress.iter_mut()) {
            if progress.just_completed {
                progress.just_completed = false;
                out.push(slot.clone());
            }
        }
        if !out.is_empty() {
            self.save();
        }
        out
    }

    /// Current daily slots with progress, for display.
    pub fn current(&self) -> impl Iterator<Item = (&str, &TierProgress)> {
        self.slots
            .iter()
            .map(|s| s.as_str())
            .zip(self.progress.iter())
    }

    /// Wall-clock event modifiers for the current moment.
    pub fn event_modifiers_now(&self) -> EventModifiers {
        let now = storage::unix_now();
        // Unix epoch was a Thursday; weekday 0 = Sunday.
        let weekday = ((now / DAY_SECS) + 4) % 7;
        let hour = (now % DAY_SECS) / 3600;
        event_modifiers_at(weekday as u8, hour as u8)
    }
}

// ── Special events ────────────────────────────────────────────────────────────

/// Merged modifiers from all currently active special events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventModifiers {
    pub score_multiplier: f32,
    pub boss_every_n_waves: u32,
    pub boss_reward_multiplier: f32,
    pub speed_multiplier: f32,
    pub learning_multiplier: f32,
    pub combo_decay_multiplier: f32,
}

impl Default for EventModifiers {
    fn default() -> Self {
        Self {
            score_multiplier: 1.0,
            boss_every_n_waves: 5,
            boss_reward_multiplier: 1.0,
            speed_multiplier: 1.0,
            learning_multiplier: 1.0,
            combo_decay_multiplier: 1.0,
        }
    }
}

/// Event table, keyed by weekday (0 = Sunday) and hour of day:
///
/// | Event                | Window          | Effect                          |
/// |----------------------|-----------------|---------------------------------|
/// | Double Score Weekend | Sat + Sun       | score ×2                        |
/// | Boss Rush Hour       | 20:00–22:00     | boss every 3rd wave, rewards ×3 |
/// | Speed Frenzy         | 12:00–13:00     | enemy/player speed ×1.5         |
/// | Learning Hour        | 18:00–19:00     | learning rewards ×3             |
/// | Combo Madness        | 21:00–22:00     | combo decay window ×2           |
pub fn event_modifiers_at(weekday: u8, hour: u8) -> EventModifiers {
    let mut mods = EventModifiers::default();

    if weekday == 0 || weekday == 6 {
        mods.score_multiplier *= 2.0;
    }
    if (20..22).contains(&hour) {
        mods.boss_every_n_waves = 3;
        mods.boss_reward_multiplier *= 3.0;
    }
    if hour == 12 {
        mods.speed_multiplier *= 1.5;
    }
    if hour == 18 {
        mods.learning_multiplier *= 3.0;
    }
    if hour == 21 {
        mods.combo_decay_multiplier *= 2.0;
    }

    mods
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(now: u64) -> DailyChallenges {
        let mut challenges = DailyChallenges::default();
        challenges.slots = vec![
            "score_challenge".to_string(),
            "wave_challenge".to_string(),
            "combo_challenge".to_string(),
        ];
        challenges.progress = vec![TierProgress::default(); 3];
        challenges.last_reset = now;
        challenges
    }

    #[test]
    fn progress_is_monotonic() {
        let mut challenges = seeded(1000);
        challenges.update_progress(ChallengeType::Score, 2000, 1000);
        assert_eq!(challenges.progress[0].progress, 2000);

        // A worse later run cannot reduce recorded progress.
        challenges.update_progress(ChallengeType::Score, 500, 1000);
        assert_eq!(challenges.progress[0].progress, 2000);
    }

    #[test]
    fn completion_fires_exactly_once_and_grants_a_buff() {
        let mut challenges = seeded(1000);
        challenges.update_progress(ChallengeType::Score, 3000, 1000);

        assert!(challenges.progress[0].completed);
        assert_eq!(challenges.buffs.len(), 1);
        assert_eq!(challenges.take_just_completed(), vec!["score_challenge"]);

        // Exceeding the target again must not re-complete or re-grant.
        challenges.update_progress(ChallengeType::Score, 9000, 1000);
        assert_eq!(challenges.buffs.len(), 1);
        assert!(challenges.take_just_completed().is_empty());
    }

    #[test]
    fn tier_targets_follow_the_slot_position() {
        // combo_challenge sits in the hard slot (index 2): target 75.
        let mut challenges = seeded(1000);
        challenges.update_progress(ChallengeType::Combo, 40, 1000);
        assert!(!challenges.progress[2].completed);
        challenges.update_progress(ChallengeType::Combo, 75, 1000);
        assert!(challenges.progress[2].completed);
    }

    #[test]
    fn buffs_expire_after_their_window() {
        let mut challenges = seeded(1000);
        challenges.update_progress(ChallengeType::Score, 3000, 1000);

        let active = challenges.active_buffs(1000 + DAY_SECS - 1);
        assert!(active.fire_rate_multiplier < 1.0);

        let expired = challenges.active_buffs(1000 + DAY_SECS + 1);
        assert_eq!(expired, RewardBundle::default());

        challenges.cleanup_expired(1000 + DAY_SECS + 1);
        assert!(challenges.buffs.is_empty());
    }

    #[test]
    fn daily_reset_redraws_after_24_hours() {
        let mut challenges = seeded(1000);
        challenges.progress[0].progress = 999;

        challenges.ensure_fresh(1000 + DAY_SECS - 10);
        assert_eq!(challenges.progress[0].progress, 999, "window not elapsed");

        challenges.ensure_fresh(1000 + DAY_SECS + 10);
        assert_eq!(challenges.progress[0].progress, 0, "window elapsed: redraw");
        assert_eq!(challenges.slots.len(), 3);
    }

    #[test]
    fn quiet_tuesday_morning_has_no_modifiers() {
        assert_eq!(event_modifiers_at(2, 9), EventModifiers::default());
    }

    #[test]
    fn weekend_doubles_score_and_boss_rush_shortens_the_cycle() {
        let weekend = event_modifiers_at(6, 9);
        assert_eq!(weekend.score_multiplier, 2.0);
        assert_eq!(weekend.boss_every_n_waves, 5);

        let rush = event_modifiers_at(2, 20);
        assert_eq!(rush.boss_every_n_waves, 3);
        assert_eq!(rush.boss_reward_multiplier, 3.0);

        // 21:00 overlaps boss rush and combo madness.
        let overlap = event_modifiers_at(2, 21);
        assert_eq!(overlap.boss_every_n_waves, 3);
        assert_eq!(overlap.combo_decay_multiplier, 2.0);
    }
}
