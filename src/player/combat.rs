//! Player firing and bullet lifetime management.
//!
//! Bullet ↔ enemy resolution lives in [`crate::combat`]; this module only
//! creates bullets and retires them when they expire or leave the arena.

use super::state::{Bullet, Player, PlayerIntent, Weapon};
use crate::audio::{PlaySfx, SfxKind};
use crate::config::GameConfig;
use crate::constants::POWERUP_RAPID_FIRE_MULT;
use crate::particles::spawn_muzzle_particles;
use crate::powerup::{ActiveEffects, EffectKind};
use crate::session::GameSession;
use bevy::prelude::*;

/// Fire toward the aim point while the fire intent is held, subject to the
/// weapon's fire interval (halved under Rapid Fire).
pub fn player_fire_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GameConfig>,
    intent: Res<PlayerIntent>,
    effects: Res<ActiveEffects>,
    mut session: ResMut<GameSession>,
    mut sfx: MessageWriter<PlaySfx>,
    mut query: Query<(&Transform, &mut Weapon), With<Player>>,
) {
    let Ok((transform, mut weapon)) = query.single_mut() else {
        return;
    };

    weapon.cooldown = (weapon.cooldown - time.delta_secs()).max(0.0);

    if !intent.fire || weapon.cooldown > 0.0 {
        return;
    }

    let interval = if effects.is_active(EffectKind::RapidFire) {
        weapon.fire_interval * POWERUP_RAPID_FIRE_MULT
    } else {
        weapon.fire_interval
    };
    weapon.cooldown = interval;

    session.wave_stats.shots_fired += 1;
    session.total_shots_fired += 1;

    let origin = transform.translation.truncate();
    let direction = (intent.aim_target - origin).normalize_or_zero();
    let direction = if direction == Vec2::ZERO {
        Vec2::X
    } else {
        direction
    };

    commands.spawn((
        Bullet {
            direction,
            speed: config.bullet_speed,
            radius: config.bullet_radius,
            damage: weapon.damage,
            piercing: weapon.piercing,
            age: 0.0,
            lifetime: config.bullet_lifetime,
        },
        Transform::from_translation(origin.extend(0.5)),
        Visibility::default(),
    ));

    sfx.write(PlaySfx::new(SfxKind::Shoot));
    spawn_muzzle_particles(&mut commands, origin + direction * 20.0, direction);
}

/// Advance bullets and despawn those that expire or leave the arena.
pub fn bullet_update_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GameConfig>,
    mut query: Query<(Entity, &mut Transform, &mut Bullet)>,
) {
    let dt = time.delta_secs();
    let half_w = config.arena_width / 2.0 + config.spawn_edge_margin;
    let half_h = config.arena_height / 2.0 + config.spawn_edge_margin;

    for (entity, mut transform, mut bullet) in query.iter_mut() {
        bullet.age += dt;
        transform.translation.x += bullet.direction.x * bullet.speed * dt;
        transform.translation.y += bullet.direction.y * bullet.speed * dt;

        let pos = transform.translation;
        let out_of_bounds = pos.x.abs() > half_w || pos.y.abs() > half_h;
        if bullet.age >= bullet.lifetime || out_of_bounds {
            commands.entity(entity).despawn();
        }
    }
}
