//! Battle pass: seasons, 100-tier track, XP accumulation with tier walking,
//! and the active-boost bundle.
//!
//! XP earned at game end walks the tier counter: the current tier's
//! requirement is subtracted repeatedly while enough XP remains, capped at
//! tier 100, auto-claiming free-track rewards at every tier-up.  Premium
//! purchases retroactively claim the premium track for already-unlocked
//! tiers.

use crate::rewards::{RewardBundle, RewardEffect, RewardKind};
use crate::session::GameStats;
use crate::storage;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

const SAVE_FILE: &str = "battlepass.toml";
const MAX_TIER: u32 = 100;
const DAY_SECS: u64 = 24 * 60 * 60;

// ── Seasons ───────────────────────────────────────────────────────────────────

/// One battle pass season window (unix seconds, UTC).
#[derive(Debug, Clone, Copy)]
pub struct Season {
    pub id: u32,
    pub name: &'static str,
    pub starts_at: u64,
    pub ends_at: u64,
    pub xp_multiplier: f32,
}

/// The season calendar.  Out-of-calendar dates fall back to the first entry.
pub fn seasons() -> &'static [Season] {
    const SEASONS: [Season; 4] = [
        Season {
            id: 1,
            name: "Cosmic Awakening",
            starts_at: 1_767_225_600, // 2026-01-01
            ends_at: 1_775_001_600,   // 2026-04-01
            xp_multiplier: 1.0,
        },
        Season {
            id: 2,
            name: "Stellar Warriors",
            starts_at: 1_775_001_600,
            ends_at: 1_782_864_000, // 2026-07-01
            xp_multiplier: 1.0,
        },
        Season {
            id: 3,
            name: "Galaxy Scholars",
            starts_at: 1_782_864_000,
            ends_at: 1_790_812_800, // 2026-10-01
            xp_multiplier: 1.0,
        },
        Season {
            id: 4,
            name: "Nebula Champions",
            starts_at: 1_790_812_800,
            ends_at: 1_798_761_600, // 2027-01-01
            xp_multiplier: 1.0,
        },
    ];
    &SEASONS
}

/// Season active at `now`, defaulting to the first.
pub fn season_for(now: u64) -> Season {
    seasons()
        .iter()
        .copied()
        .find(|s| now >= s.starts_at && now < s.ends_at)
        .unwrap_or(seasons()[0])
}

// ── Reward track ──────────────────────────────────────────────────────────────

/// One claimable reward on either track.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackReward {
    /// Display title; no stat effect.
    Title(&'static str),
    /// Cosmetic unlock; no stat effect.
    Cosmetic(&'static str),
    /// Stat boost; `duration_secs` None means permanent.
    Boost {
        effects: Vec<RewardEffect>,
        duration_secs: Option<u64>,
    },
}

fn title_for_tier(tier: u32) -> &'static str {
    match tier {
        25 => "Stargazer",
        50 => "Cosmic Voyager",
        75 => "Galaxy Guardian",
        100 => "Universe Master",
        _ => "Space Cadet",
    }
}

fn cosmetic_for_tier(tier: u32) -> &'static str {
    const COSMETICS: [&str; 10] = [
        "Stardust Trail",
        "Nebula Aura",
        "Comet Effect",
        "Galaxy Burst",
        "Supernova Glow",
        "Meteor Shower",
        "Aurora Effect",
        "Constellation Frame",
        "Cosmic Rings",
        "Stellar Crown",
    ];
    COSMETICS[((tier / 10).saturating_sub(1) as usize) % COSMETICS.len()]
}

/// Free-track reward for `tier`, if the tier has one (every 5th, plus 1).
pub fn free_reward(tier: u32) -> Option<TrackReward> {
    if tier != 1 && tier % 5 != 0 {
        return None;
    }
    Some(if tier % 25 == 0 {
        TrackReward::Title(title_for_tier(tier))
    } else if tier % 10 == 0 {
        TrackReward::Boost {
            effects: vec![RewardEffect::timed(RewardKind::Xp, 1.1, 3 * DAY_SECS)],
            duration_secs: Some(3 * DAY_SECS),
        }
    } else {
        TrackReward::Boost {
            effects: vec![RewardEffect::timed(RewardKind::Score, 1.05, DAY_SECS)],
            duration_secs: Some(DAY_SECS),
        }
    })
}

/// Premium-track reward for `tier` (every tier has one).
pub fn premium_reward(tier: u32) -> TrackReward {
    if tier == MAX_TIER {
        TrackReward::Boost {
            effects: vec![
                RewardEffect::permanent(RewardKind::Damage, 1.5),
                RewardEffect::permanent(RewardKind::Health, 100.0),
                RewardEffect::permanent(RewardKind::Speed, 1.3),
                RewardEffect::permanent(RewardKind::FireRate, 0.7),
                RewardEffect::permanent(RewardKind::Score, 1.5),
            ],
            duration_secs: None,
        }
    } else if tier % 20 == 0 {
        TrackReward::Boost {
            effects: vec![
                RewardEffect::permanent(RewardKind::Damage, 1.1),
                RewardEffect::permanent(RewardKind::Health, 20.0),
                RewardEffect::permanent(RewardKind::Speed, 1.05),
            ],
            duration_secs: None,
        }
    } else if tier % 10 == 0 {
        TrackReward::Cosmetic(cosmetic_for_tier(tier))
    } else if tier % 5 == 0 {
        TrackReward::Boost {
            effects: vec![
                RewardEffect::timed(RewardKind::Damage, 1.15, 7 * DAY_SECS),
                RewardEffect::timed(RewardKind::Health, 30.0, 7 * DAY_SECS),
            ],
            duration_secs: Some(7 * DAY_SECS),
        }
    } else {
        match tier % 3 {
            0 => TrackReward::Boost {
                effects: vec![RewardEffect::timed(RewardKind::Xp, 1.05, DAY_SECS)],
                duration_secs: Some(DAY_SECS),
            },
            1 => TrackReward::Boost {
                effects: vec![RewardEffect::timed(RewardKind::Score, 1.1, DAY_SECS)],
                duration_secs: Some(DAY_SECS),
            },
            _ => TrackReward::Boost {
                effects: vec![RewardEffect::timed(RewardKind::Health, 15.0, DAY_SECS)],
                duration_secs: Some(DAY_SECS),
            },
        }
    }
}

// ── State ─────────────────────────────────────────────────────────────────────

/// A claimed stat boost; `expires_at` None means permanent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredBoost {
    pub tier: u32,
    pub effects: Vec<RewardEffect>,
    pub expires_at: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SavedBattlePass {
    season_id: u32,
    tier: u32,
    xp: u32,
    unlocked_tiers: Vec<u32>,
    has_premium: bool,
    boosts: Vec<StoredBoost>,
    titles: Vec<String>,
}

/// Outcome of one XP grant.
#[derive(Debug, Clone, Default)]
pub struct XpResult {
    pub xp_gained: u32,
    pub tier_ups: Vec<u32>,
}

/// Battle pass progression state.
#[derive(Resource, Debug)]
pub struct BattlePass {
    pub season_id: u32,
    /// Current tier, 1-based, capped at [`MAX_TIER`].
    pub tier: u32,
    /// XP accumulated toward the next tier.
    pub xp: u32,
    pub unlocked_tiers: Vec<u32>,
    pub has_premium: bool,
    pub boosts: Vec<StoredBoost>,
    pub titles: Vec<String>,
    autosave: bool,
}

impl Default for BattlePass {
    fn default() -> Self {
        Self {
            season_id: seasons()[0].id,
            tier: 1,
            xp: 0,
            unlocked_tiers: Vec::new(),
            has_premium: false,
            boosts: Vec::new(),
            titles: Vec::new(),
            autosave: false,
        }
    }
}

impl BattlePass {
    /// Load persisted progress, rolling into a new season if the calendar
    /// moved on (permanent boosts, titles, and premium carry over).
    pub fn load(now: u64) -> Self {
        let saved: SavedBattlePass = storage::load_or_default(SAVE_FILE);
        let mut pass = Self {
            season_id: saved.season_id,
            tier: saved.tier.clamp(1, MAX_TIER),
            xp: saved.xp,
            unlocked_tiers: saved.unlocked_tiers,
            has_premium: saved.has_premium,
            boosts: saved.boosts,
            titles: saved.titles,
            autosave: true,
        };

        let season = season_for(now);
        if pass.season_id != season.id {
            info!("Battle pass season rollover → {}", season.name);
            pass.season_id = season.id;
            pass.tier = 1;
            pass.xp = 0;
            pass.unlocked_tiers.clear();
            // Timed boosts lapse with the season; permanent ones persist.
            pass.boosts.retain(|boost| boost.expires_at.is_none());
            pass.save();
        }

        pass.cleanup_expired(now);
        pass
    }

    fn save(&self) {
        if !self.autosave {
            return;
        }
        let saved = SavedBattlePass {
            season_id: self.season_id,
            tier: self.tier,
            xp: self.xp,
            unlocked_tiers: self.unlocked_tiers.clone(),
            has_premium: self.has_premium,
            boosts: self.boosts.clone(),
            titles: self.titles.clone(),
        };
        storage::save_or_log(SAVE_FILE, &saved);
    }

    pub fn cleanup_expired(&mut self, now: u64) {
        let before = self.boosts.len();
        self.boosts
            .retain(|boost| boost.expires_at.map_or(true, |at| at > now));
        if self.boosts.len() != before {
            self.save();
        }
    }

    /// XP required to move past `tier`: 1000 scaled up 10% per tier.
    pub fn xp_for_tier(tier: u32) -> u32 {
        (1000.0 * (1.0 + (tier.saturating_sub(1)) as f32 * 0.1)) as u32
    }

    /// Base XP from one run's stats.
    pub fn xp_from_game(stats: &GameStats) -> u32 {
        let mut xp = 0.0_f32;
        xp += stats.score as f32 * 0.5;
        xp += stats.wave as f32 * 50.0;
        xp += stats.kills as f32 * 10.0;
        xp += stats.boss_kills as f32 * 100.0;
        xp += stats.max_combo as f32 * 5.0;
        xp += stats.learning_screens as f32 * 30.0;
        xp += stats.perfect_waves as f32 * 50.0;
        xp += stats.speed_waves as f32 * 40.0;
        xp as u32
    }

    /// Current XP multiplier from the season and any active XP boosts.
    fn xp_multiplier(&self, now: u64) -> f32 {
        let mut mult = season_for(now).xp_multiplier;
        for boost in &self.boosts {
            if boost.expires_at.map_or(true, |at| at > now) {
                for effect in &boost.effects {
                    if effect.kind == RewardKind::Xp {
                        mult *= effect.value;
                    }
                }
            }
        }
        mult
    }

    /// Grant XP and walk tiers while the requirement is met, auto-claiming
    /// free rewards at every tier-up.  Capped at tier 100.
    pub fn add_xp(&mut self, amount: u32, now: u64) -> XpResult {
        let gained = (amount as f32 * self.xp_multiplier(now)) as u32;
        self.xp += gained;

        let mut tier_ups = Vec::new();
        while self.tier < MAX_TIER {
            let needed = Self::xp_for_tier(self.tier);
            if self.xp < needed {
                break;
            }
            self.xp -= needed;
            self.tier += 1;
            self.unlocked_tiers.push(self.tier);
            tier_ups.push(self.tier);

            if free_reward(self.tier).is_some() {
                self.claim(self.tier, Track::Free, now);
            }
        }

        self.save();
        XpResult {
            xp_gained: gained,
            tier_ups,
        }
    }

    /// Claim a track reward for `tier`.  Premium claims require premium.
    pub fn claim(&mut self, tier: u32, track: Track, now: u64) -> Option<TrackReward> {
        let reward = match track {
            Track::Free => free_reward(tier)?,
            Track::Premium => {
                if !self.has_premium {
                    return None;
                }
                premium_reward(tier)
            }
        };

        match &reward {
            TrackReward::Title(title) => {
                if !self.titles.iter().any(|t| t == title) {
                    self.titles.push(title.to_string());
                }
            }
            TrackReward::Cosmetic(_) => {}
            TrackReward::Boost {
                effects,
                duration_secs,
            } => {
                self.boosts.push(StoredBoost {
                    tier,
                    effects: effects.clone(),
                    expires_at: duration_secs.map(|d| now + d),
                });
            }
        }

        self.save();
        Some(reward)
    }

    /// Unlock premium and retroactively claim every unlocked tier's premium
    /// reward.  Returns the number of rewards granted.
    pub fn unlock_premium(&mut self, now: u64) -> usize {
        self.has_premium = true;
        let tiers = self.unlocked_tiers.clone();
        let mut granted = 0;
        for tier in tiers {
            if self.claim(tier, Track::Premium, now).is_some() {
                granted += 1;
            }
        }
        self.save();
        granted
    }

    /// Fold active boosts into a bundle (XP boosts are consumed by
    /// [`Self::add_xp`] instead and skipped by the bundle fold).
    pub fn active_boosts(&self, now: u64) -> RewardBundle {
        let mut bundle = RewardBundle::default();
        for boost in &self.boosts {
            if boost.expires_at.map_or(true, |at| at > now) {
                for effect in &boost.effects {
                    bundle.apply(effect);
                }
            }
        }
        bundle
    }
}

/// Which reward track a claim targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    Free,
    Premium,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(score: u32, wave: u32, kills: u32) -> GameStats {
        GameStats {
            score,
            wave,
            kills,
            boss_kills: 0,
            max_combo: 0,
            learning_screens: 0,
            speed_waves: 0,
            survival_waves: 0,
            perfect_waves: 0,
            accuracy: 0.0,
        }
    }

    #[test]
    fn xp_formula_matches_the_stat_weights() {
        let xp = BattlePass::xp_from_game(&stats(1000, 4, 30));
        // 500 + 200 + 300
        assert_eq!(xp, 1000);
    }

    #[test]
    fn tier_requirement_scales_ten_percent_per_tier() {
        assert_eq!(BattlePass::xp_for_tier(1), 1000);
        assert_eq!(BattlePass::xp_for_tier(2), 1100);
        assert_eq!(BattlePass::xp_for_tier(11), 2000);
    }

    #[test]
    fn xp_walks_multiple_tiers_and_keeps_the_remainder() {
        let mut pass = BattlePass::default();
        // 1000 (tier 1) + 1100 (tier 2) + 150 spare.
        let result = pass.add_xp(2250, 0);
        assert_eq!(result.tier_ups, vec![2, 3]);
        assert_eq!(pass.tier, 3);
        assert_eq!(pass.xp, 150);
    }

    #[test]
    fn tier_walk_caps_at_one_hundred() {
        let mut pass = BattlePass::default();
        pass.add_xp(100_000_000, 0);
        assert_eq!(pass.tier, MAX_TIER);
        // Leftover XP is retained but no further tier-ups occur.
        let result = pass.add_xp(10_000, 0);
        assert!(result.tier_ups.is_empty());
        assert_eq!(pass.tier, MAX_TIER);
    }

    #[test]
    fn free_rewards_auto_claim_on_tier_up() {
        let mut pass = BattlePass::default();
        // Walk to tier 5 exactly: 1000+1100+1200+1300.
        pass.add_xp(4600, 0);
        assert_eq!(pass.tier, 5);
        // Tier 5's free score boost was auto-claimed.
        assert!(pass
            .boosts
            .iter()
            .any(|b| b.tier == 5 && b.expires_at.is_some()));
    }

    #[test]
    fn premium_claims_are_gated_and_retroactive() {
        let mut pass = BattlePass::default();
        pass.add_xp(4600, 0); // unlock tiers 2..=5

        assert!(pass.claim(5, Track::Premium, 0).is_none(), "not premium yet");

        let granted = pass.unlock_premium(0);
        assert_eq!(granted, pass.unlocked_tiers.len());
        // Tier 5's premium 7-day boost landed.
        assert!(pass
            .boosts
            .iter()
            .any(|b| b.tier == 5 && b.expires_at == Some(7 * DAY_SECS)));
    }

    #[test]
    fn boost_bundle_ignores_expired_entries() {
        let mut pass = BattlePass::default();
        pass.boosts.push(StoredBoost {
            tier: 5,
            effects: vec![RewardEffect::timed(RewardKind::Damage, 1.15, 100)],
            expires_at: Some(100),
        });

        assert!((pass.active_boosts(50).damage_multiplier - 1.15).abs() < 1e-6);
        assert_eq!(pass.active_boosts(150), RewardBundle::default());

        pass.cleanup_expired(150);
        assert!(pass.boosts.is_empty());
    }

    #[test]
    fn season_calendar_falls_back_to_the_first_entry() {
        assert_eq!(season_for(1_770_000_000).id, 1);
        assert_eq!(season_for(1_780_000_000).id, 2);
        assert_eq!(season_for(0).id, 1, "pre-calendar dates use season 1");
    }
}
