//! Difficulty table: static per-difficulty gameplay parameters.
//!
//! Every numeric knob that distinguishes Tutorial/Easy/Normal/Hard lives in
//! one [`DifficultyProfile`] per variant. The table is fixed data — a missing
//! or inconsistent entry would be a programming defect, not a runtime
//! condition, so lookups are infallible.

use serde::{Deserialize, Serialize};

/// Selectable game difficulty. Ordering is meaningful: achievement
/// requirements compare difficulties ordinally (`Normal` or higher, etc.).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Difficulty {
    /// Guided introduction; generous stats, no score.
    Tutorial,
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// Stable label used in persisted data and the HUD badge.
    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Tutorial => "TUTORIAL",
            Difficulty::Easy => "EASY",
            Difficulty::Normal => "NORMAL",
            Difficulty::Hard => "HARD",
        }
    }

    /// Ordinal comparison used by milestone achievements:
    /// "complete wave N on `required` or higher".
    #[inline]
    pub fn meets(self, required: Difficulty) -> bool {
        self >= required
    }
}

/// Numeric parameters for one difficulty setting.
///
/// Speeds are world units per second; intervals are seconds.
#[derive(Debug, Clone, Copy)]
pub struct DifficultyProfile {
    pub player_health: f32,
    pub player_speed: f32,
    pub player_damage: f32,
    pub enemy_health: f32,
    pub enemy_speed: f32,
    pub enemy_damage: f32,
    /// Base enemy count for wave 1; later waves add `floor((wave-1) * 0.5)`.
    pub enemies_per_wave: u32,
    /// Minimum interval between player shots.
    pub fire_interval: f32,
    pub dash_cooldown: f32,
    /// Score multiplier; Tutorial scores nothing.
    pub score_multiplier: u32,
}

impl Difficulty {
    /// Look up the static parameter profile for this difficulty.
    pub fn profile(self) -> DifficultyProfile {
        match self {
            Difficulty::Tutorial => DifficultyProfile {
                player_health: 200.0,
                player_speed: 360.0,
                player_damage: 100.0,
                enemy_health: 50.0,
                enemy_speed: 30.0,
                enemy_damage: 5.0,
                enemies_per_wave: 2,
                fire_interval: 0.2,
                dash_cooldown: 2.0,
                score_multiplier: 0,
            },
            Difficulty::Easy => DifficultyProfile {
                player_health: 150.0,
                player_speed: 360.0,
                player_damage: 75.0,
                enemy_health: 75.0,
                enemy_speed: 48.0,
                enemy_damage: 10.0,
                enemies_per_wave: 3,
                fire_interval: 0.25,
                dash_cooldown: 3.0,
                score_multiplier: 1,
            },
            Difficulty::Normal => DifficultyProfile {
                player_health: 100.0,
                player_speed: 300.0,
                player_damage: 50.0,
                enemy_health: 100.0,
                enemy_speed: 60.0,
                enemy_damage: 15.0,
                enemies_per_wave: 5,
                fire_interval: 0.3,
                dash_cooldown: 4.0,
                score_multiplier: 2,
            },
            Difficulty::Hard => DifficultyProfile {
                player_health: 75.0,
                player_speed: 300.0,
                player_damage: 40.0,
                enemy_health: 150.0,
                enemy_speed: 72.0,
                enemy_damage: 20.0,
                enemies_per_wave: 7,
                fire_interval: 0.35,
                dash_cooldown: 5.0,
                score_multiplier: 5,
            },
        }
    }
}
