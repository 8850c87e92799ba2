//! Input intent capture, player movement, and the dash.

use super::state::{Dash, Movement, Player, PlayerIntent, Trail};
use crate::audio::{PlaySfx, SfxKind};
use crate::config::GameConfig;
use crate::particles::spawn_dash_particles;
use crate::powerup::{ActiveEffects, EffectKind};
use crate::session::GameSession;
use bevy::prelude::*;

/// Translate raw keyboard/mouse state into the frame's [`PlayerIntent`].
///
/// This is the only system that touches input devices; everything downstream
/// (movement, dash, firing) consumes the normalized intent, so tests can
/// drive the player by writing the resource directly.
pub fn gather_player_intent(
    keys: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    mut intent: ResMut<PlayerIntent>,
) {
    let right = keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight);
    let left = keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft);
    let down = keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown);
    let up = keys.pressed(KeyCode::KeyW) || keys.pressed(KeyCode::ArrowUp);

    intent.move_dir = Vec2::new(
        (right as i32 - left as i32) as f32,
        (up as i32 - down as i32) as f32,
    );
    intent.fire = mouse_buttons.pressed(MouseButton::Left);
    intent.dash = keys.just_pressed(KeyCode::Space);

    // Cursor position in window space → world space (camera is at origin).
    if let Ok(window) = windows.single() {
        if let Some(cursor) = window.cursor_position() {
            intent.aim_target = Vec2::new(
                cursor.x - window.width() / 2.0,
                -(cursor.y - window.height() / 2.0),
            );
        }
    }
}

/// Move the player from intent, clamp to the arena, and feed the trail.
pub fn player_move_system(
    time: Res<Time>,
    config: Res<GameConfig>,
    intent: Res<PlayerIntent>,
    effects: Res<ActiveEffects>,
    mut query: Query<(&mut Transform, &Movement, &Dash, &mut Trail), With<Player>>,
) {
    let Ok((mut transform, movement, dash, mut trail)) = query.single_mut() else {
        return;
    };

    let dt = time.delta_secs();
    let dir = intent.move_dir;

    if dir != Vec2::ZERO {
        let speed = if dash.is_dashing() {
            config.player_dash_speed
        } else if effects.is_active(EffectKind::Speed) {
            movement.speed * crate::constants::POWERUP_SPEED_MULT
        } else {
            movement.speed
        };

        let step = dir.normalize_or_zero() * speed * dt;
        transform.translation.x += step.x;
        transform.translation.y += step.y;

        // Keep the player inside the arena with a small margin.
        let half_w = config.arena_width / 2.0 - config.player_radius - config.player_edge_margin;
        let half_h = config.arena_height / 2.0 - config.player_radius - config.player_edge_margin;
        transform.translation.x = transform.translation.x.clamp(-half_w, half_w);
        transform.translation.y = transform.translation.y.clamp(-half_h, half_h);

        trail.push(transform.translation.truncate());
    } else if !trail.positions.is_empty() {
        trail.fade();
    }
}

/// Tick dash timers and trigger a dash on request.
pub fn dash_system(
    mut commands: Commands,
    time: Res<Time>,
    intent: Res<PlayerIntent>,
    mut session: ResMut<GameSession>,
    mut sfx: MessageWriter<PlaySfx>,
    mut query: Query<(&Transform, &mut Dash), With<Player>>,
) {
    let Ok((transform, mut dash)) = query.single_mut() else {
        return;
    };

    let dt = time.delta_secs();
    dash.cooldown = (dash.cooldown - dt).max(0.0);

    if dash.is_dashing() {
        dash.active_remaining = (dash.active_remaining - dt).max(0.0);
        // Sparks while the burst lasts.
        spawn_dash_particles(&mut commands, transform.translation.truncate(), 1);
        return;
    }

    if intent.dash && dash.is_ready() {
        dash.active_remaining = dash.duration;
        dash.cooldown = dash.max_cooldown;
        session.wave_stats.used_dash = true;
        sfx.write(PlaySfx::new(SfxKind::Dash));
        spawn_dash_particles(&mut commands, transform.translation.truncate(), 20);
    }
}
