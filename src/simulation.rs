//! Simulation plugin: the ordered per-tick pipeline and the session
//! enter/exit transitions.
//!
//! Every system that mutates gameplay state during a frame is registered
//! here, in one explicitly chained sequence, so the resolution order the
//! combat rules depend on is auditable in a single place:
//!
//! 1. session clock
//! 2. player movement / dash / firing, bullet aging
//! 3. wave director spawn-queue drain
//! 4. bullet × enemy resolution (before enemies move)
//! 5. enemy movement + contact attacks, boss abilities, hazard updates
//! 6. hazard × player resolution
//! 7. power-up aging / pickup / effect expiry
//! 8. combo decay
//! 9. wave completion check, intermission, vowel review
//!
//! Chaining also gives Bevy the sync points that apply entity despawns
//! between stages, so a kill in step 4 is visible to the completion check in
//! step 9 within the same tick.

use crate::boss::{BossProjectile, BossShockwave};
use crate::enemy::Enemy;
use crate::menu::{simulation_active, GameState};
use crate::particles::Particle;
use crate::player::{combat as player_combat, control, state as player_state, Bullet};
use crate::powerup::PowerUp;
use crate::{boss, combat, powerup, session, vowels, wave};
use bevy::prelude::*;

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<vowels::VowelReview>();
        app.add_systems(
            Update,
            (
                (
                    session::tick_session_clock,
                    control::player_move_system,
                    control::dash_system,
                    player_combat::player_fire_system,
                    player_combat::bullet_update_system,
                    wave::drain_spawn_queue,
                    combat::bullet_enemy_collision_system,
                    crate::enemy::enemy_movement_system,
                    boss::boss_ability_system,
                    boss::shockwave_update_system,
                )
                    .chain(),
                (
                    boss::boss_projectile_update_system,
                    combat::hazard_player_collision_system,
                    powerup::powerup_update_system,
                    powerup::powerup_pickup_system,
                    powerup::effect_expiry_system,
                    session::combo_decay_system,
                    wave::wave_completion_system,
                    wave::intermission_system,
                    vowels::vowel_review_system,
                )
                    .chain(),
            )
                .chain()
                .run_if(simulation_active),
        )
        .add_systems(
            OnEnter(GameState::Playing),
            (
                despawn_gameplay_entities,
                session::bootstrap_session,
                powerup::reset_effects,
                player_state::spawn_player,
                wave::wave_kickoff,
            )
                .chain(),
        )
        .add_systems(
            OnEnter(GameState::Tutorial),
            (
                despawn_gameplay_entities,
                session::bootstrap_session,
                powerup::reset_effects,
                player_state::spawn_player,
                wave::wave_kickoff,
            )
                .chain(),
        )
        .add_systems(
            OnEnter(GameState::GameOver),
            (
                wave::clear_pending_on_game_over,
                session::finalize_run,
                despawn_gameplay_entities,
                player_state::despawn_player,
            )
                .chain(),
        );
    }
}

/// Remove every run-scoped gameplay entity (enemies, bullets, pickups,
/// hazards, particles).  Used when a run ends and before a new one begins.
#[allow(clippy::type_complexity)]
pub fn despawn_gameplay_entities(
    mut commands: Commands,
    q_enemies: Query<Entity, With<Enemy>>,
    q_bullets: Query<Entity, With<Bullet>>,
    q_powerups: Query<Entity, With<PowerUp>>,
    q_shockwaves: Query<Entity, With<BossShockwave>>,
    q_projectiles: Query<Entity, With<BossProjectile>>,
    q_particles: Query<Entity, With<Particle>>,
) {
    for entity in q_enemies
        .iter()
        .chain(q_bullets.iter())
        .chain(q_powerups.iter())
        .chain(q_shockwaves.iter())
        .chain(q_projectiles.iter())
        .chain(q_particles.iter())
    {
        commands.entity(entity).despawn();
    }
}
