//! Player components and resources.
//!
//! All ECS components and resources that describe player state live here.
//! Systems that mutate this state are in the sibling modules:
//! - [`super::control`] — intent capture + movement + dash
//! - [`super::combat`] — firing + bullet lifetime

use crate::constants::{PLAYER_DASH_DURATION, PLAYER_TRAIL_CAPACITY};
use crate::menu::SelectedDifficulty;
use crate::session::{ActiveEventModifiers, SessionBonuses};
use bevy::prelude::*;
use std::collections::VecDeque;

// ── Components ────────────────────────────────────────────────────────────────

/// Marker component for the player entity.
#[derive(Component)]
pub struct Player;

/// Current and maximum hit points.  All mutation goes through
/// [`PlayerHealth::apply_damage`] / [`PlayerHealth::heal`], which clamp to
/// `[0, max_hp]`.
#[derive(Component, Debug, Clone, Copy)]
pub struct PlayerHealth {
    pub hp: f32,
    pub max_hp: f32,
}

impl PlayerHealth {
    pub fn new(max_hp: f32) -> Self {
        Self { hp: max_hp, max_hp }
    }

    /// Apply damage, clamped at zero.  Returns `true` when this hit was
    /// lethal (health crossed to zero on *this* application).
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        if self.hp <= 0.0 {
            return false;
        }
        self.hp = (self.hp - amount).max(0.0);
        self.hp <= 0.0
    }

    /// Heal, clamped at `max_hp`.
    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    /// Raise the maximum and grant the difference immediately.
    pub fn raise_max(&mut self, amount: f32) {
        self.max_hp += amount;
        self.heal(amount);
    }
}

/// Base movement speed (world units/s); power-ups scale it at read time.
#[derive(Component, Debug, Clone, Copy)]
pub struct Movement {
    pub speed: f32,
}

/// Dash state: a short invulnerable burst on a cooldown.
#[derive(Component, Debug, Clone, Copy)]
pub struct Dash {
    /// Remaining cooldown (s); 0 means ready.
    pub cooldown: f32,
    pub max_cooldown: f32,
    /// Remaining active dash time; > 0 while dashing.
    pub active_remaining: f32,
    pub duration: f32,
}

impl Dash {
    pub fn new(max_cooldown: f32) -> Self {
        Self {
            cooldown: 0.0,
            max_cooldown,
            active_remaining: 0.0,
            duration: PLAYER_DASH_DURATION,
        }
    }

    #[inline]
    pub fn is_dashing(&self) -> bool {
        self.active_remaining > 0.0
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.cooldown <= 0.0 && !self.is_dashing()
    }
}

/// Weapon parameters.  `damage` and `fire_interval` already include the
/// session bonus multipliers applied at spawn; upgrades mutate them directly.
#[derive(Component, Debug, Clone, Copy)]
pub struct Weapon {
    pub damage: f32,
    /// Minimum interval between shots (s).
    pub fire_interval: f32,
    /// Remaining time until the next shot is allowed.
    pub cooldown: f32,
    /// Extra enemies each bullet may pass through.
    pub piercing: u32,
}

/// Bounded FIFO of recent positions, used only by the trail renderer.
#[derive(Component, Debug, Default)]
pub struct Trail {
    pub positions: VecDeque<Vec2>,
    pub capacity: usize,
}

impl Trail {
    pub fn push(&mut self, pos: Vec2) {
        self.positions.push_back(pos);
        while self.positions.len() > self.capacity {
            self.positions.pop_front();
        }
    }

    /// Gradually shorten the trail while the player stands still.
    pub fn fade(&mut self) {
        self.positions.pop_front();
    }
}

/// A fired round: direction, damage, remaining piercing charges, lifetime.
#[derive(Component, Debug, Clone, Copy)]
pub struct Bullet {
    pub direction: Vec2,
    pub speed: f32,
    pub radius: f32,
    pub damage: f32,
    /// Remaining pass-through charges; the bullet despawns on the hit that
    /// finds this at zero.
    pub piercing: u32,
    pub age: f32,
    pub lifetime: f32,
}

// ── Resources ─────────────────────────────────────────────────────────────────

/// Aggregated player intent for the current frame, derived from all input
/// sources.  The input system writes this each frame; movement and firing
/// read it.  Tests can populate it directly to drive behaviour without a
/// real input device.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerIntent {
    /// Requested movement direction; not necessarily normalized.
    pub move_dir: Vec2,
    /// World-space point the player is aiming at.
    pub aim_target: Vec2,
    /// Fire is held this frame.
    pub fire: bool,
    /// Dash was requested this frame.
    pub dash: bool,
}

// ── Lifecycle systems ─────────────────────────────────────────────────────────

/// Spawn the player at the arena centre with difficulty-table stats and the
/// composed session bonuses applied exactly once.
pub fn spawn_player(
    mut commands: Commands,
    selected: Res<SelectedDifficulty>,
    bonuses: Res<SessionBonuses>,
    event_mods: Res<ActiveEventModifiers>,
    existing: Query<Entity, With<Player>>,
) {
    // Restart path: a previous run's player may still exist.
    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    let profile = selected.0.profile();
    let b = bonuses.0;

    let max_hp = profile.player_health + b.health_bonus;
    let speed = profile.player_speed * b.speed_multiplier * event_mods.0.speed_multiplier;
    let damage = profile.player_damage * b.damage_multiplier;
    let fire_interval = profile.fire_interval * b.fire_rate_multiplier;

    commands.spawn((
        Player,
        PlayerHealth::new(max_hp),
        Movement { speed },
        Dash::new(profile.dash_cooldown),
        Weapon {
            damage,
            fire_interval,
            cooldown: 0.0,
            piercing: 0,
        },
        Trail {
            positions: VecDeque::new(),
            capacity: PLAYER_TRAIL_CAPACITY,
        },
        Transform::from_translation(Vec3::ZERO),
        Visibility::default(),
    ));

    info!(
        "Player spawned: {} hp, {:.0} u/s, {:.0} dmg",
        max_hp, speed, damage
    );
}

pub fn despawn_player(mut commands: Commands, query: Query<Entity, With<Player>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}
