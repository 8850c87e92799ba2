//! Shared reward descriptors for the progression aggregators.
//!
//! Achievements, daily challenges, the battle pass, and clans all express
//! their payoffs as structured [`RewardEffect`] values and fold them into one
//! [`RewardBundle`] shape.  The bundle is composed multiplicatively
//! (multipliers) / additively (flat bonuses) exactly once per session start.

use serde::{Deserialize, Serialize};

/// What a single unlock/buff/boost changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RewardKind {
    /// Multiplies outgoing bullet damage.
    Damage,
    /// Multiplies damage dealt to bosses only.
    BossDamage,
    /// Flat addition to maximum health.
    Health,
    /// Multiplies movement speed.
    Speed,
    /// Multiplies the fire interval (values below 1.0 shoot faster).
    FireRate,
    /// Multiplies score awarded per kill.
    Score,
    /// Multiplies battle pass XP earned.
    Xp,
    /// Applies its value as a multiplier to damage, speed, and fire rate.
    AllStats,
    /// Cosmetic or informational; no stat effect.
    None,
}

/// One structured reward: kind + magnitude + optional lifetime.
///
/// `value` is a multiplier for multiplicative kinds (1.1 = +10%) and a flat
/// amount for `Health`.  `duration_secs` is `None` for permanent effects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardEffect {
    pub kind: RewardKind,
    pub value: f32,
    pub duration_secs: Option<u64>,
}

impl RewardEffect {
    pub const fn permanent(kind: RewardKind, value: f32) -> Self {
        Self {
            kind,
            value,
            duration_secs: None,
        }
    }

    pub const fn timed(kind: RewardKind, value: f32, duration_secs: u64) -> Self {
        Self {
            kind,
            value,
            duration_secs: Some(duration_secs),
        }
    }

    pub const fn none() -> Self {
        Self {
            kind: RewardKind::None,
            value: 0.0,
            duration_secs: None,
        }
    }
}

/// Aggregated stat modifiers from one progression source.
///
/// Identity element: all multipliers 1.0, `health_bonus` 0.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardBundle {
    pub damage_multiplier: f32,
    pub health_bonus: f32,
    pub speed_multiplier: f32,
    pub fire_rate_multiplier: f32,
    pub score_multiplier: f32,
    pub boss_damage_multiplier: f32,
}

impl Default for RewardBundle {
    fn default() -> Self {
        Self {
            damage_multiplier: 1.0,
            health_bonus: 0.0,
            speed_multiplier: 1.0,
            fire_rate_multiplier: 1.0,
            score_multiplier: 1.0,
            boss_damage_multiplier: 1.0,
        }
    }
}

impl RewardBundle {
    /// Fold one effect into this bundle.  `None`, `Xp`, and zero-duration
    /// leftovers are ignored here; XP multipliers are consumed by the battle
    /// pass directly.
    pub fn apply(&mut self, effect: &RewardEffect) {
        match effect.kind {
            RewardKind::Damage => self.damage_multiplier *= effect.value,
            RewardKind::BossDamage => self.boss_damage_multiplier *= effect.value,
            RewardKind::Health => self.health_bonus += effect.value,
            RewardKind::Speed => self.speed_multiplier *= effect.value,
            RewardKind::FireRate => self.fire_rate_multiplier *= effect.value,
            RewardKind::Score => self.score_multiplier *= effect.value,
            RewardKind::AllStats => {
                self.damage_multiplier *= effect.value;
                self.speed_multiplier *= effect.value;
                self.fire_rate_multiplier *= effect.value;
            }
            RewardKind::Xp | RewardKind::None => {}
        }
    }

    /// Compose with another bundle: multipliers multiply, bonuses add.
    pub fn compose(&self, other: &RewardBundle) -> RewardBundle {
        RewardBundle {
            damage_multiplier: self.damage_multiplier * other.damage_multiplier,
            health_bonus: self.health_bonus + other.health_bonus,
            speed_multiplier: self.speed_multiplier * other.speed_multiplier,
            fire_rate_multiplier: self.fire_rate_multiplier * other.fire_rate_multiplier,
            score_multiplier: self.score_multiplier * other.score_multiplier,
            boss_damage_multiplier: self.boss_damage_multiplier * other.boss_damage_multiplier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_bundle_changes_nothing_under_compose() {
        let mut a = RewardBundle::default();
        a.apply(&RewardEffect::permanent(RewardKind::Damage, 1.2));
        a.apply(&RewardEffect::permanent(RewardKind::Health, 25.0));

        let composed = a.compose(&RewardBundle::default());
        assert_eq!(composed, a);
    }

    #[test]
    fn all_stats_touches_damage_speed_and_fire_rate_only() {
        let mut b = RewardBundle::default();
        b.apply(&RewardEffect::permanent(RewardKind::AllStats, 1.2));

        assert_eq!(b.damage_multiplier, 1.2);
        assert_eq!(b.speed_multiplier, 1.2);
        assert_eq!(b.fire_rate_multiplier, 1.2);
        assert_eq!(b.score_multiplier, 1.0);
        assert_eq!(b.boss_damage_multiplier, 1.0);
        assert_eq!(b.health_bonus, 0.0);
    }

    #[test]
    fn compose_multiplies_multipliers_and_adds_bonuses() {
        let mut a = RewardBundle::default();
        a.apply(&RewardEffect::permanent(RewardKind::Score, 1.1));
        a.apply(&RewardEffect::permanent(RewardKind::Health, 10.0));

        let mut b = RewardBundle::default();
        b.apply(&RewardEffect::permanent(RewardKind::Score, 2.0));
        b.apply(&RewardEffect::permanent(RewardKind::Health, 15.0));

        let c = a.compose(&b);
        assert!((c.score_multiplier - 2.2).abs() < 1e-6);
        assert_eq!(c.health_bonus, 25.0);
    }
}
