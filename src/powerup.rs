//! Power-ups: drops, pickup collision, and timed-effect management.
//!
//! Instant kinds (Health, Star) apply on pickup.  Timed kinds (Speed,
//! Shield, RapidFire) register an entry in [`ActiveEffects`] keyed by expiry
//! time on the session clock; [`effect_expiry_system`] reverts each exactly
//! once when its time passes.  Consumers (movement, firing, contact damage)
//! read effect presence at use time, so expiry is simply entry removal.

use crate::audio::{PlaySfx, SfxKind};
use crate::config::GameConfig;
use crate::constants::{
    POWERUP_HEAL_AMOUNT, POWERUP_RADIUS, POWERUP_RAPID_FIRE_DURATION, POWERUP_SHIELD_DURATION,
    POWERUP_SPEED_DURATION, POWERUP_STAR_SCORE,
};
use crate::player::{Player, PlayerHealth};
use crate::session::GameSession;
use bevy::prelude::*;
use rand::Rng;
use std::collections::HashMap;

// ── Types ─────────────────────────────────────────────────────────────────────

/// What a power-up does when collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    /// Instant +30 health, clamped at max.
    Health,
    /// 1.5x movement speed for 10 s.
    Speed,
    /// Blocks enemy contact and hazards for 8 s.
    Shield,
    /// Halves the fire interval for 7 s.
    RapidFire,
    /// Instant +50 score.
    Star,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::Health,
        PowerUpKind::Speed,
        PowerUpKind::Shield,
        PowerUpKind::RapidFire,
        PowerUpKind::Star,
    ];

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// The timed effect this kind registers, if any.
    pub fn timed_effect(self) -> Option<(EffectKind, f32)> {
        match self {
            PowerUpKind::Speed => Some((EffectKind::Speed, POWERUP_SPEED_DURATION)),
            PowerUpKind::Shield => Some((EffectKind::Shield, POWERUP_SHIELD_DURATION)),
            PowerUpKind::RapidFire => Some((EffectKind::RapidFire, POWERUP_RAPID_FIRE_DURATION)),
            PowerUpKind::Health | PowerUpKind::Star => None,
        }
    }

    pub fn color(self) -> Color {
        match self {
            PowerUpKind::Health => Color::srgb(1.0, 0.42, 0.62),
            PowerUpKind::Speed => Color::srgb(1.0, 0.84, 0.0),
            PowerUpKind::Shield => Color::srgb(0.29, 0.56, 0.89),
            PowerUpKind::RapidFire => Color::srgb(1.0, 0.39, 0.28),
            PowerUpKind::Star => Color::srgb(1.0, 0.92, 0.65),
        }
    }
}

/// Timed effect categories tracked in [`ActiveEffects`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Speed,
    Shield,
    RapidFire,
}

/// An uncollected pickup in the arena.
#[derive(Component, Debug, Clone, Copy)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub radius: f32,
    pub age: f32,
    pub lifetime: f32,
    pub collected: bool,
}

/// Map from timed-effect kind to its expiry on the session clock.
#[derive(Resource, Debug, Default)]
pub struct ActiveEffects {
    expiries: HashMap<EffectKind, f32>,
}

impl ActiveEffects {
    pub fn activate(&mut self, kind: EffectKind, until: f32) {
        self.expiries.insert(kind, until);
    }

    #[inline]
    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.expiries.contains_key(&kind)
    }

    /// Remove and return the kinds whose expiry has passed.
    pub fn drain_expired(&mut self, now: f32) -> Vec<EffectKind> {
        let expired: Vec<EffectKind> = self
            .expiries
            .iter()
            .filter(|(_, until)| now >= **until)
            .map(|(kind, _)| *kind)
            .collect();
        for kind in &expired {
            self.expiries.remove(kind);
        }
        expired
    }

    pub fn clear(&mut self) {
        self.expiries.clear();
    }
}

// ── Spawning ──────────────────────────────────────────────────────────────────

/// Drop a random power-up at `pos` (called from the kill pipeline).
pub fn spawn_powerup(commands: &mut Commands, pos: Vec2, config: &GameConfig, rng: &mut impl Rng) {
    commands.spawn((
        PowerUp {
            kind: PowerUpKind::random(rng),
            radius: POWERUP_RADIUS,
            age: 0.0,
            lifetime: config.powerup_lifetime,
            collected: false,
        },
        Transform::from_translation(pos.extend(0.15)),
        Visibility::default(),
    ));
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Age pickups and despawn the ones nobody collected in time.
pub fn powerup_update_system(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut PowerUp)>,
) {
    let dt = time.delta_secs();
    for (entity, mut powerup) in query.iter_mut() {
        powerup.age += dt;
        if powerup.age >= powerup.lifetime {
            commands.entity(entity).despawn();
        }
    }
}

/// Collect pickups the player touches and apply their effects.
pub fn powerup_pickup_system(
    mut commands: Commands,
    mut session: ResMut<GameSession>,
    mut effects: ResMut<ActiveEffects>,
    mut q_player: Query<(&Transform, &mut PlayerHealth), With<Player>>,
    mut q_powerups: Query<(Entity, &Transform, &mut PowerUp), Without<Player>>,
    config: Res<GameConfig>,
    mut sfx: MessageWriter<PlaySfx>,
) {
    let Ok((player_transform, mut health)) = q_player.single_mut() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();

    for (entity, transform, mut powerup) in q_powerups.iter_mut() {
        if powerup.collected {
            continue;
        }
        let dist = player_pos.distance(transform.translation.truncate());
        if dist >= powerup.radius + config.player_radius {
            continue;
        }

        powerup.collected = true;
        sfx.write(PlaySfx::new(SfxKind::PowerUp));

        match powerup.kind {
            PowerUpKind::Health => health.heal(POWERUP_HEAL_AMOUNT),
            PowerUpKind::Star => session.score += POWERUP_STAR_SCORE,
            timed => {
                if let Some((kind, duration)) = timed.timed_effect() {
                    effects.activate(kind, session.elapsed + duration);
                }
            }
        }

        commands.entity(entity).despawn();
    }
}

/// Revert timed effects whose window has passed.
pub fn effect_expiry_system(mut effects: ResMut<ActiveEffects>, session: Res<GameSession>) {
    for kind in effects.drain_expired(session.elapsed) {
        debug!("Power-up effect expired: {:?}", kind);
    }
}

/// `OnEnter(Playing | Tutorial)`: no effects carry across runs.
pub fn reset_effects(mut effects: ResMut<ActiveEffects>) {
    effects.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Dash;
    use bevy::ecs::message::Messages;
    use std::collections::VecDeque;

    fn pickup_world() -> World {
        let mut world = World::new();
        world.insert_resource(GameConfig::default());
        world.insert_resource(GameSession::default());
        world.insert_resource(ActiveEffects::default());
        world.init_resource::<Messages<PlaySfx>>();
        world.spawn((
            Player,
            PlayerHealth {
                hp: 50.0,
                max_hp: 100.0,
            },
            Dash::new(4.0),
            crate::player::Trail {
                positions: VecDeque::new(),
                capacity: 15,
            },
            Transform::default(),
        ));
        world
    }

    fn spawn_pickup(world: &mut World, kind: PowerUpKind) -> Entity {
        world
            .spawn((
                PowerUp {
                    kind,
                    radius: POWERUP_RADIUS,
                    age: 0.0,
                    lifetime: 5.0,
                    collected: false,
                },
                Transform::default(),
            ))
            .id()
    }

    fn run_pickup(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(powerup_pickup_system);
        schedule.run(world);
    }

    #[test]
    fn health_pickup_heals_with_clamp() {
        let mut world = pickup_world();
        let pickup = spawn_pickup(&mut world, PowerUpKind::Health);

        run_pickup(&mut world);

        assert!(world.get_entity(pickup).is_err());
        let mut q = world.query::<&PlayerHealth>();
        assert_eq!(q.single(&world).unwrap().hp, 80.0);

        // A second heal cannot exceed max.
        spawn_pickup(&mut world, PowerUpKind::Health);
        run_pickup(&mut world);
        let mut q = world.query::<&PlayerHealth>();
        assert_eq!(q.single(&world).unwrap().hp, 100.0);
    }

    #[test]
    fn star_pickup_awards_flat_score() {
        let mut world = pickup_world();
        spawn_pickup(&mut world, PowerUpKind::Star);
        run_pickup(&mut world);
        assert_eq!(world.resource::<GameSession>().score, POWERUP_STAR_SCORE);
    }

    #[test]
    fn timed_pickup_registers_and_expires_exactly_once() {
        let mut world = pickup_world();
        world.resource_mut::<GameSession>().elapsed = 100.0;
        spawn_pickup(&mut world, PowerUpKind::Shield);
        run_pickup(&mut world);

        let effects = world.resource::<ActiveEffects>();
        assert!(effects.is_active(EffectKind::Shield));

        // Before expiry: still active.
        world.resource_mut::<GameSession>().elapsed = 100.0 + POWERUP_SHIELD_DURATION - 0.1;
        let mut schedule = Schedule::default();
        schedule.add_systems(effect_expiry_system);
        schedule.run(&mut world);
        assert!(world.resource::<ActiveEffects>().is_active(EffectKind::Shield));

        // Past expiry: reverted.
        world.resource_mut::<GameSession>().elapsed = 100.0 + POWERUP_SHIELD_DURATION + 0.1;
        schedule.run(&mut world);
        assert!(!world.resource::<ActiveEffects>().is_active(EffectKind::Shield));

        // Idempotent: nothing further expires.
        schedule.run(&mut world);
        assert!(world
            .resource_mut::<ActiveEffects>()
            .drain_expired(1000.0)
            .is_empty());
    }

    #[test]
    fn distant_pickup_is_not_collected() {
        let mut world = pickup_world();
        let pickup = world
            .spawn((
                PowerUp {
                    kind: PowerUpKind::Star,
                    radius: POWERUP_RADIUS,
                    age: 0.0,
                    lifetime: 5.0,
                    collected: false,
                },
                Transform::from_xyz(500.0, 0.0, 0.0),
            ))
            .id();
        run_pickup(&mut world);
        assert!(world.get_entity(pickup).is_ok());
        assert_eq!(world.resource::<GameSession>().score, 0);
    }
}
