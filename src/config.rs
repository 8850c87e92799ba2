//! Runtime gameplay configuration loaded from `assets/game.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] that mirrors the constants in
//! [`crate::constants`].  At startup, [`load_game_config`] reads
//! `assets/game.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a
//! minimal TOML can override just the knobs you care about.
//!
//! Add `config: Res<GameConfig>` to any system parameter list and read values
//! with `config.combo_decay_window`, `config.arena_width`, etc.

use crate::constants::*;
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable gameplay configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset by setting the value in
/// `assets/game.toml`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Arena ─────────────────────────────────────────────────────────────────
    pub arena_width: f32,
    pub arena_height: f32,
    pub spawn_edge_margin: f32,
    pub player_edge_margin: f32,

    // ── Player ────────────────────────────────────────────────────────────────
    pub player_radius: f32,
    pub player_dash_speed: f32,
    pub player_dash_duration: f32,

    // ── Bullets ───────────────────────────────────────────────────────────────
    pub bullet_speed: f32,
    pub bullet_radius: f32,
    pub bullet_lifetime: f32,

    // ── Waves ─────────────────────────────────────────────────────────────────
    pub wave_spawn_stagger: f32,
    pub boss_spawn_delay: f32,
    pub wave_intermission: f32,
    pub post_review_delay: f32,

    // ── Combo & scoring ───────────────────────────────────────────────────────
    pub combo_decay_window: f32,
    pub combo_score_step: f32,
    pub wave_clear_bonus: u32,

    // ── Enemies ───────────────────────────────────────────────────────────────
    pub enemy_attack_interval: f32,

    // ── Power-ups ─────────────────────────────────────────────────────────────
    pub powerup_base_chance: f32,
    pub powerup_combo_chance: f32,
    pub powerup_lifetime: f32,

    // ── Identity ──────────────────────────────────────────────────────────────
    /// Name submitted with qualifying leaderboard scores.
    pub player_name: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // Arena
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            spawn_edge_margin: SPAWN_EDGE_MARGIN,
            player_edge_margin: PLAYER_EDGE_MARGIN,
            // Player
            player_radius: PLAYER_RADIUS,
            player_dash_speed: PLAYER_DASH_SPEED,
            player_dash_duration: PLAYER_DASH_DURATION,
            // Bullets
            bullet_speed: BULLET_SPEED,
            bullet_radius: BULLET_RADIUS,
            bullet_lifetime: BULLET_LIFETIME,
            // Waves
            wave_spawn_stagger: WAVE_SPAWN_STAGGER,
            boss_spawn_delay: BOSS_SPAWN_DELAY,
            wave_intermission: WAVE_INTERMISSION,
            post_review_delay: POST_REVIEW_DELAY,
            // Combo & scoring
            combo_decay_window: COMBO_DECAY_WINDOW,
            combo_score_step: COMBO_SCORE_STEP,
            wave_clear_bonus: WAVE_CLEAR_BONUS,
            // Enemies
            enemy_attack_interval: ENEMY_ATTACK_INTERVAL,
            // Power-ups
            powerup_base_chance: POWERUP_BASE_CHANCE,
            powerup_combo_chance: POWERUP_COMBO_CHANCE,
            powerup_lifetime: POWERUP_LIFETIME,
            // Identity
            player_name: "Hunter".to_string(),
        }
    }
}

/// Startup system: attempt to load `assets/game.toml` and overwrite the
/// `GameConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  TOML parse errors are logged
/// but do not abort the game.  A missing file is not an error (defaults are
/// already in place from `insert_resource`).
pub fn load_game_config(mut config: ResMut<GameConfig>) {
    let path = "assets/game.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<GameConfig>(&contents) {
            Ok(loaded) => {
                *config = loaded;
                info!("Loaded game config from {path}");
            }
            Err(e) => {
                warn!("Failed to parse {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            // File not present — defaults are already in place; not an error.
            info!("No {path} found; using compiled defaults");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let loaded: GameConfig =
            toml::from_str("combo_decay_window = 3.5\nplayer_name = \"Ada\"").unwrap();
        assert_eq!(loaded.combo_decay_window, 3.5);
        assert_eq!(loaded.player_name, "Ada");
        assert_eq!(loaded.arena_width, ARENA_WIDTH);
        assert_eq!(loaded.wave_clear_bonus, WAVE_CLEAR_BONUS);
    }
}
