//! Clans: locally simulated clan membership, level curve, perks, and the
//! stat-bonus bundle contributed to session start.
//!
//! There is no server; the catalog of joinable clans is fixed starter data
//! and clan XP accrues from the local player's runs.  Perks unlock at fixed
//! clan levels and convert into a [`RewardBundle`] like every other
//! aggregator.

use crate::rewards::{RewardBundle, RewardEffect, RewardKind};
use crate::session::GameStats;
use crate::storage;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

const SAVE_FILE: &str = "clan.toml";
const MAX_CLAN_LEVEL: u32 = 50;

// ── Perks ─────────────────────────────────────────────────────────────────────

/// What a clan perk improves.  Values are percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClanPerk {
    XpBoost,
    HealthBoost,
    ScoreBoost,
    LearningRewards,
    DamageBoost,
    AllStats,
}

/// Perk unlock table: (clan level, perk, percent value).
pub const CLAN_PERKS: [(u32, ClanPerk, f32); 6] = [
    (1, ClanPerk::XpBoost, 5.0),
    (5, ClanPerk::HealthBoost, 10.0),
    (10, ClanPerk::ScoreBoost, 10.0),
    (15, ClanPerk::LearningRewards, 20.0),
    (20, ClanPerk::DamageBoost, 15.0),
    (25, ClanPerk::AllStats, 10.0),
];

// ── Clan data ─────────────────────────────────────────────────────────────────

/// Aggregate lifetime stats for a clan.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ClanStats {
    pub total_score: u64,
    pub total_kills: u64,
    pub total_waves: u64,
    pub events_won: u32,
}

/// One clan, either from the starter catalog or player-created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clan {
    pub id: String,
    pub name: String,
    pub tag: String,
    pub description: String,
    pub level: u32,
    pub xp: u64,
    pub member_count: u32,
    pub max_members: u32,
    pub min_level: u32,
    pub min_score: u32,
    pub stats: ClanStats,
    pub public_join: bool,
}

/// Fixed catalog of joinable starter clans.
pub fn starter_clans() -> Vec<Clan> {
    let entry = |id: &str,
                 name: &str,
                 tag: &str,
                 description: &str,
                 level: u32,
                 xp: u64,
                 member_count: u32,
                 max_members: u32,
                 min_level: u32,
                 min_score: u32,
                 stats: ClanStats,
                 public_join: bool| Clan {
        id: id.to_string(),
        name: name.to_string(),
        tag: tag.to_string(),
        description: description.to_string(),
        level,
        xp,
        member_count,
        max_members,
        min_level,
        min_score,
        stats,
        public_join,
    };

    vec![
        entry(
            "starter_1",
            "Vowel Voyagers",
            "VVOY",
            "We journey through space learning vowels together!",
            12,
            45_000,
            15,
            50,
            5,
            1000,
            ClanStats {
                total_score: 1_250_000,
                total_kills: 8_500,
                total_waves: 450,
                events_won: 8,
            },
            true,
        ),
        entry(
            "starter_2",
            "Cosmic Scholars",
            "CSCH",
            "Learning is our superpower! Join us!",
            18,
            82_000,
            28,
            50,
            10,
            5000,
            ClanStats {
                total_score: 2_400_000,
                total_kills: 15_000,
                total_waves: 820,
                events_won: 15,
            },
            false,
        ),
        entry(
            "starter_3",
            "Alphabet Alliance",
            "ALPH",
            "A-E-I-O-U... and sometimes Y!",
            8,
            28_000,
            8,
            30,
            1,
            0,
            ClanStats {
                total_score: 580_000,
                total_kills: 3_200,
                total_waves: 180,
                events_won: 3,
            },
            true,
        ),
        entry(
            "starter_4",
            "Star Learners",
            "STAR",
            "Reach for the stars while learning!",
            22,
            125_000,
            42,
            50,
            15,
            10_000,
            ClanStats {
                total_score: 3_850_000,
                total_kills: 22_000,
                total_waves: 1200,
                events_won: 24,
            },
            false,
        ),
        entry(
            "starter_5",
            "Galaxy Guardians",
            "GUAR",
            "Elite clan for the best learners!",
            25,
            180_000,
            50,
            50,
            20,
            25_000,
            ClanStats {
                total_score: 5_200_000,
                total_kills: 32_000,
                total_waves: 1800,
                events_won: 35,
            },
            false,
        ),
    ]
}

/// Clan level for a lifetime XP total: 5000 XP to start, requirement
/// growing 50% every 5 levels, capped at 50.
pub fn clan_level_for_xp(xp: u64) -> u32 {
    let mut level = 1u32;
    let mut required = 5000u64;
    let mut total_required = 0u64;

    while xp >= total_required + required && level < MAX_CLAN_LEVEL {
        total_required += required;
        level += 1;
        if level % 5 == 0 {
            required = required * 3 / 2;
        }
    }

    level
}

// ── Membership state ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SavedClan {
    current: Option<Clan>,
}

/// The local player's clan membership.
#[derive(Resource, Debug, Default)]
pub struct ClanMembership {
    pub current: Option<Clan>,
    autosave: bool,
}

impl ClanMembership {
    pub fn load() -> Self {
        let saved: SavedClan = storage::load_or_default(SAVE_FILE);
        Self {
            current: saved.current,
            autosave: true,
        }
    }

    fn save(&self) {
        if !self.autosave {
            return;
        }
        let saved = SavedClan {
            current: self.current.clone(),
        };
        storage::save_or_log(SAVE_FILE, &saved);
    }

    /// Join a clan from the catalog.  Fails while already in one.
    pub fn join(&mut self, clan: Clan) -> Result<(), String> {
        if self.current.is_some() {
            return Err("already in a clan".to_string());
        }
        info!("Joined clan [{}] {}", clan.tag, clan.name);
        self.current = Some(clan);
        self.save();
        Ok(())
    }

    pub fn leave(&mut self) {
        self.current = None;
        self.save();
    }

    /// Contribute one run's results to the clan: stats, XP, and level-ups.
    pub fn contribute(&mut self, stats: &GameStats) {
        let Some(clan) = self.current.as_mut() else {
            return;
        };

        let contribution = (stats.score / 10) + stats.kills * 5 + stats.wave * 20
            + stats.learning_screens * 50;

        clan.stats.total_score += stats.score as u64;
        clan.stats.total_kills += stats.kills as u64;
        clan.stats.total_waves += stats.wave as u64;
        clan.xp += contribution as u64;

        let old_level = clan.level;
        clan.level = clan_level_for_xp(clan.xp);
        if clan.level > old_level {
            info!("Clan leveled up: {} → {}", old_level, clan.level);
        }

        self.save();
    }

    /// Percent value of one perk category, 0 when locked or clanless.
    fn perk_percent(&self, wanted: ClanPerk) -> f32 {
        let Some(clan) = self.current.as_ref() else {
            return 0.0;
        };
        CLAN_PERKS
            .iter()
            .filter(|(level, perk, _)| clan.level >= *level && *perk == wanted)
            .map(|(_, _, value)| *value)
            .sum()
    }

    /// Battle pass XP percent bonus (consumed by the XP grant, not the
    /// stat bundle).
    pub fn xp_percent_bonus(&self) -> f32 {
        self.perk_percent(ClanPerk::XpBoost)
    }

    /// Learning-reward percent bonus for the review step.
    pub fn learning_percent_bonus(&self) -> f32 {
        self.perk_percent(ClanPerk::LearningRewards)
    }

    /// Convert unlocked perks into the shared aggregator bundle.
    pub fn clan_bonuses(&self) -> RewardBundle {
        let mut bundle = RewardBundle::default();
        if self.current.is_none() {
            return bundle;
        }

        let health = self.perk_percent(ClanPerk::HealthBoost);
        if health > 0.0 {
            bundle.apply(&RewardEffect::permanent(RewardKind::Health, health));
        }
        let score = self.perk_percent(ClanPerk::ScoreBoost);
        if score > 0.0 {
            bundle.apply(&RewardEffect::permanent(
                RewardKind::Score,
                1.0 + score / 100.0,
            ));
        }
        let damage = self.perk_percent(ClanPerk::DamageBoost);
        if damage > 0.0 {
            bundle.apply(&RewardEffect::permanent(
                RewardKind::Damage,
                1.0 + damage / 100.0,
            ));
        }
        let all = self.perk_percent(ClanPerk::AllStats);
        if all > 0.0 {
            bundle.apply(&RewardEffect::permanent(
                RewardKind::AllStats,
                1.0 + all / 100.0,
            ));
        }

        bundle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(score: u32, kills: u32, wave: u32) -> GameStats {
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
    fn level_curve_starts_at_one_and_caps_at_fifty() {
        assert_eq!(clan_level_for_xp(0), 1);
        assert_eq!(clan_level_for_xp(4999), 1);
        assert_eq!(clan_level_for_xp(5000), 2);
        assert_eq!(clan_level_for_xp(u64::MAX), MAX_CLAN_LEVEL);
    }

    #[test]
    fn level_curve_is_monotonic() {
        let mut last = 0;
        for xp in (0..1_000_000).step_by(25_000) {
            let level = clan_level_for_xp(xp);
            assert!(level >= last);
            last = level;
        }
    }

    #[test]
    fn clanless_player_gets_the_identity_bundle() {
        let membership = ClanMembership::default();
        assert_eq!(membership.clan_bonuses(), RewardBundle::default());
        assert_eq!(membership.xp_percent_bonus(), 0.0);
    }

    #[test]
    fn perks_accumulate_with_clan_level() {
        let mut membership = ClanMembership::default();
        let mut clan = starter_clans().remove(0);
        clan.level = 12; // xp, health, score unlocked
        membership.current = Some(clan);

        let bundle = membership.clan_bonuses();
        assert_eq!(bundle.health_bonus, 10.0);
        assert!((bundle.score_multiplier - 1.1).abs() < 1e-6);
        assert_eq!(bundle.damage_multiplier, 1.0, "damage unlocks at 20");
        assert_eq!(membership.xp_percent_bonus(), 5.0);
    }

    #[test]
    fn top_level_clan_gets_all_stats() {
        let mut membership = ClanMembership::default();
        let mut clan = starter_clans().remove(4);
        clan.level = 25;
        membership.current = Some(clan);

        let bundle = membership.clan_bonuses();
        // damage: 1.15 from DamageBoost × 1.10 from AllStats.
        assert!((bundle.damage_multiplier - 1.265).abs() < 1e-3);
        assert!((bundle.speed_multiplier - 1.1).abs() < 1e-6);
    }

    #[test]
    fn contribution_formula_feeds_clan_xp() {
        let mut membership = ClanMembership::default();
        membership.current = Some(starter_clans().remove(2));
        let before = membership.current.as_ref().unwrap().xp;

        membership.contribute(&stats(1000, 20, 5));
        let clan = membership.current.as_ref().unwrap();
        // 100 + 100 + 100
        assert_eq!(clan.xp, before + 300);
        assert_eq!(clan.stats.total_kills, 3_200 + 20);
    }

    #[test]
    fn cannot_join_two_clans() {
        let mut membership = ClanMembership::default();
        assert!(membership.join(starter_clans().remove(0)).is_ok());
        assert!(membership.join(starter_clans().remove(1)).is_err());
        membership.leave();
        assert!(membership.current.is_none());
    }
}
