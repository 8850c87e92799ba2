//! Enemy entities: archetype table, behavior state machine, movement, and
//! contact attacks.
//!
//! Each non-boss enemy is assigned one [`Archetype`] at spawn, which fixes
//! its stat multipliers, shape, and [`Behavior`] variant for life.  The
//! behavior drives a single `advance` step per tick; contact damage is
//! resolved inside the movement system, gated by the per-enemy attack
//! cooldown and suppressed while the player dashes or holds a Shield.

use crate::audio::{PlaySfx, SfxKind};
use crate::config::GameConfig;
use crate::constants::{
    ENEMY_BASE_SCORE, ENEMY_HEALTH_PER_WAVE, ENEMY_SPEED_GROWTH_CAP, ENEMY_SPEED_PER_WAVE,
};
use crate::difficulty::Difficulty;
use crate::particles::spawn_teleport_particles;
use crate::player::{Dash, Player, PlayerHealth};
use crate::powerup::{ActiveEffects, EffectKind};
use crate::session::PlayerDied;
use crate::vowels::Vowel;
use bevy::prelude::*;
use rand::Rng;

// ── Archetypes ────────────────────────────────────────────────────────────────

/// Visual outline used by the shape renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Circle,
    Triangle,
    Square,
    Diamond,
    Hexagon,
    Octagon,
    Star,
}

/// Fixed enemy archetype; selected once at spawn from the difficulty pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Archetype {
    /// Straightforward chaser.
    Basic,
    /// Quick, advances in a zigzag pattern.
    Zigzagger,
    /// Circles the player at a preferred distance.
    Orbiter,
    /// Bulky; periodically lunges at high speed.
    Dasher,
    /// Relocates closer to the player on a cooldown.
    Teleporter,
    /// Slow but very tanky chaser.
    Tank,
}

/// Static per-archetype stat block.
#[derive(Debug, Clone, Copy)]
pub struct ArchetypeStats {
    pub name: &'static str,
    pub radius: f32,
    pub health_mult: f32,
    pub speed_mult: f32,
    pub score_mult: f32,
    pub shape: Shape,
    pub color: Color,
}

impl Archetype {
    pub fn stats(self) -> ArchetypeStats {
        match self {
            Archetype::Basic => ArchetypeStats {
                name: "Basic Chaser",
                radius: 30.0,
                health_mult: 1.0,
                speed_mult: 1.0,
                score_mult: 1.0,
                shape: Shape::Circle,
                color: Color::srgb(0.18, 0.84, 0.45),
            },
            Archetype::Zigzagger => ArchetypeStats {
                name: "Zigzagger",
                radius: 27.5,
                health_mult: 0.8,
                speed_mult: 1.2,
                score_mult: 1.2,
                shape: Shape::Triangle,
                color: Color::srgb(0.45, 0.73, 1.0),
            },
            Archetype::Orbiter => ArchetypeStats {
                name: "Orbiter",
                radius: 25.0,
                health_mult: 1.2,
                speed_mult: 1.5,
                score_mult: 1.5,
                shape: Shape::Square,
                color: Color::srgb(0.64, 0.61, 1.0),
            },
            Archetype::Dasher => ArchetypeStats {
                name: "Dasher",
                radius: 32.5,
                health_mult: 1.5,
                speed_mult: 0.8,
                score_mult: 1.8,
                shape: Shape::Diamond,
                color: Color::srgb(1.0, 0.62, 0.95),
            },
            Archetype::Teleporter => ArchetypeStats {
                name: "Teleporter",
                radius: 27.5,
                health_mult: 0.9,
                speed_mult: 1.0,
                score_mult: 2.0,
                shape: Shape::Hexagon,
                color: Color::srgb(1.0, 0.42, 0.62),
            },
            Archetype::Tank => ArchetypeStats {
                name: "Tank",
                radius: 40.0,
                health_mult: 3.0,
                speed_mult: 0.6,
                score_mult: 2.5,
                shape: Shape::Octagon,
                color: Color::srgb(1.0, 0.28, 0.34),
            },
        }
    }

    /// Initial behavior state for this archetype.
    pub fn behavior(self, rng: &mut impl Rng) -> Behavior {
        match self {
            Archetype::Basic | Archetype::Tank => Behavior::Chase,
            Archetype::Zigzagger => Behavior::Zigzag {
                phase: 0.0,
                dir: 1.0,
                next_flip: 2.0,
            },
            Archetype::Orbiter => Behavior::Orbit {
                angle: rng.gen_range(0.0..std::f32::consts::TAU),
                radius: 150.0 + rng.gen_range(0.0..100.0),
            },
            Archetype::Dasher => Behavior::Dash {
                cooldown: 0.0,
                lunge_remaining: 0.0,
            },
            // Cooldown starts elapsed: a fresh teleporter blinks inward the
            // moment it arrives from the arena edge.
            Archetype::Teleporter => Behavior::Teleport { cooldown: 0.0 },
        }
    }
}

/// Weighted random archetype for the given difficulty and wave, matching the
/// escalating pools: harder settings and later waves mix in trickier types.
pub fn random_archetype(difficulty: Difficulty, wave: u32, rng: &mut impl Rng) -> Archetype {
    use Archetype::*;

    let mut pool: Vec<Archetype> = match difficulty {
        Difficulty::Tutorial | Difficulty::Easy => vec![Basic, Basic, Zigzagger],
        Difficulty::Normal => vec![Basic, Zigzagger, Zigzagger, Orbiter, Dasher],
        Difficulty::Hard => vec![
            Zigzagger, Orbiter, Orbiter, Dasher, Dasher, Teleporter, Tank,
        ],
    };

    match difficulty {
        Difficulty::Tutorial | Difficulty::Easy => {
            if wave >= 5 {
                pool.extend([Zigzagger, Zigzagger]);
            }
        }
        Difficulty::Normal => {
            if wave >= 5 {
                pool.extend([Orbiter, Dasher]);
            }
            if wave >= 10 {
                pool.push(Teleporter);
            }
        }
        Difficulty::Hard => {
            if wave >= 5 {
                pool.extend([Teleporter, Teleporter, Tank]);
            }
            if wave >= 10 {
                pool.extend([Tank, Tank]);
            }
        }
    }

    pool[rng.gen_range(0..pool.len())]
}

// ── Components ────────────────────────────────────────────────────────────────

/// Core enemy attributes shared by all variants including bosses.
#[derive(Component, Debug, Clone)]
pub struct Enemy {
    pub name: &'static str,
    pub radius: f32,
    /// Movement speed (world units/s); bosses overwrite this per phase.
    pub speed: f32,
    pub contact_damage: f32,
    pub score_value: u32,
    /// Remaining time before the next contact hit is allowed.
    pub attack_cooldown: f32,
    /// Short-vowel tag for the learning side feature.
    pub vowel: Vowel,
    pub shape: Shape,
    pub color: Color,
}

/// Enemy hit points.
#[derive(Component, Debug, Clone, Copy)]
pub struct EnemyHealth {
    pub hp: f32,
    pub max_hp: f32,
}

impl EnemyHealth {
    pub fn new(max_hp: f32) -> Self {
        Self { hp: max_hp, max_hp }
    }

    /// Apply damage; returns `true` when this reduced health to zero.
    pub fn hit(&mut self, damage: f32) -> bool {
        self.hp -= damage;
        self.hp <= 0.0
    }

    #[inline]
    pub fn percent(&self) -> f32 {
        (self.hp / self.max_hp * 100.0).max(0.0)
    }
}

/// Marks enemies summoned by a boss; they never count toward wave completion.
#[derive(Component, Debug, Clone, Copy)]
pub struct Minion;

// ── Behavior state machine ────────────────────────────────────────────────────

/// Per-enemy movement mode, fixed at creation from the archetype.
#[derive(Component, Debug, Clone)]
pub enum Behavior {
    /// Move directly toward the player.
    Chase,
    /// Advance along the to-player vector plus a perpendicular oscillation
    /// whose sign flips on a fixed phase period.
    Zigzag { phase: f32, dir: f32, next_flip: f32 },
    /// Approach until within `radius`, then follow a circular path around
    /// the player at increasing angular offset.
    Orbit { angle: f32, radius: f32 },
    /// Slow chase with a short high-speed lunge gated by a cooldown;
    /// the lunge triggers only within proximity.
    Dash { cooldown: f32, lunge_remaining: f32 },
    /// Chase normally, but on cooldown expiry while far away, relocate to a
    /// jittered point at half the current distance.
    Teleport { cooldown: f32 },
}

/// Result of one behavior step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorStep {
    /// Displacement to apply this tick (absolute jump for teleports).
    pub displacement: Vec2,
    /// True when the step was an instantaneous relocation.
    pub teleported: bool,
}

impl Behavior {
    /// Advance one tick: returns the displacement toward/around the player.
    ///
    /// `dt` is the frame delta in seconds; `speed` the enemy's current speed.
    pub fn advance(
        &mut self,
        pos: Vec2,
        player_pos: Vec2,
        speed: f32,
        dt: f32,
        rng: &mut impl Rng,
    ) -> BehaviorStep {
        let to_player = player_pos - pos;
        let dist = to_player.length();
        let toward = to_player.normalize_or_zero();

        let displacement = match self {
            Behavior::Chase => toward * speed * dt,

            Behavior::Zigzag {
                phase,
                dir,
                next_flip,
            } => {
                *phase += 6.0 * dt;
                if *phase >= *next_flip {
                    *dir = -*dir;
                    *next_flip += 2.0;
                }
                let perp = Vec2::new(-toward.y, toward.x);
                (toward * 0.7 + perp * 0.5 * *dir) * speed * dt
            }

            Behavior::Orbit { angle, radius } => {
                if dist > *radius {
                    toward * speed * dt
                } else {
                    *angle += 1.8 * dt;
                    let target = player_pos + Vec2::new(angle.cos(), angle.sin()) * *radius;
                    let to_target = target - pos;
                    if to_target.length() > 5.0 {
                        to_target.normalize_or_zero() * speed * dt
                    } else {
                        Vec2::ZERO
                    }
                }
            }

            Behavior::Dash {
                cooldown,
                lunge_remaining,
            } => {
                *cooldown -= dt;
                if *lunge_remaining > 0.0 {
                    *lunge_remaining -= dt;
                    if *lunge_remaining <= 0.0 {
                        *cooldown = 2.0;
                    }
                    toward * speed * 4.0 * dt
                } else {
                    if *cooldown <= 0.0 && dist < 400.0 {
                        *lunge_remaining = 0.33;
                    }
                    toward * speed * dt
                }
            }

            Behavior::Teleport { cooldown } => {
                *cooldown -= dt;
                if *cooldown <= 0.0 && dist > 200.0 {
                    *cooldown = 3.0;
                    let jitter = rng.gen_range(-0.5_f32..0.5_f32) * std::f32::consts::FRAC_PI_2;
                    let angle = (-to_player.y).atan2(-to_player.x) + jitter;
                    let target = player_pos + Vec2::new(angle.cos(), angle.sin()) * (dist * 0.5);
                    return BehaviorStep {
                        displacement: target - pos,
                        teleported: true,
                    };
                }
                toward * speed * dt
            }
        };

        BehaviorStep {
            displacement,
            teleported: false,
        }
    }
}

// ── Spawning ──────────────────────────────────────────────────────────────────

/// Build the component bundle for one non-boss enemy with
/// wave/difficulty-scaled stats.
pub fn make_enemy(
    pos: Vec2,
    wave: u32,
    difficulty: Difficulty,
    archetype: Archetype,
    rng: &mut impl Rng,
) -> (Enemy, EnemyHealth, Behavior, Transform, Visibility) {
    let profile = difficulty.profile();
    let stats = archetype.stats();

    let wave_bonus = ENEMY_HEALTH_PER_WAVE * (wave - 1) as f32;
    let hp = (profile.enemy_health + wave_bonus) * stats.health_mult;
    let speed_growth = (ENEMY_SPEED_PER_WAVE * (wave - 1) as f32).min(ENEMY_SPEED_GROWTH_CAP);
    let speed = (profile.enemy_speed + speed_growth) * stats.speed_mult;
    let score_value =
        (ENEMY_BASE_SCORE * profile.score_multiplier as f32 * stats.score_mult) as u32;

    (
        Enemy {
            name: stats.name,
            radius: stats.radius,
            speed,
            contact_damage: profile.enemy_damage,
            score_value,
            attack_cooldown: 0.0,
            vowel: Vowel::random(rng),
            shape: stats.shape,
            color: stats.color,
        },
        EnemyHealth::new(hp),
        archetype.behavior(rng),
        Transform::from_translation(pos.extend(0.2)),
        Visibility::default(),
    )
}

/// Spawn one non-boss enemy; minions are flagged so wave-completion
/// accounting skips them.
pub fn spawn_enemy(
    commands: &mut Commands,
    pos: Vec2,
    wave: u32,
    difficulty: Difficulty,
    archetype: Archetype,
    is_minion: bool,
    rng: &mut impl Rng,
) -> Entity {
    let mut entity = commands.spawn(make_enemy(pos, wave, difficulty, archetype, rng));
    if is_minion {
        entity.insert(Minion);
    }
    entity.id()
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Advance every enemy's behavior and resolve contact attacks.
///
/// Contact damage requires: within combined radii, attack cooldown elapsed,
/// player not dashing, and no Shield active.  A lethal contact writes
/// [`PlayerDied`].
#[allow(clippy::too_many_arguments)]
pub fn enemy_movement_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GameConfig>,
    effects: Res<ActiveEffects>,
    mut q_player: Query<(&Transform, &Dash, &mut PlayerHealth), With<Player>>,
    mut q_enemies: Query<
        (&mut Transform, &mut Enemy, &mut Behavior),
        (With<EnemyHealth>, Without<Player>),
    >,
    mut sfx: MessageWriter<PlaySfx>,
    mut deaths: MessageWriter<PlayerDied>,
) {
    let Ok((player_transform, dash, mut player_health)) = q_player.single_mut() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();
    let player_radius = config.player_radius;
    let dt = time.delta_secs();
    let mut rng = rand::thread_rng();

    for (mut transform, mut enemy, mut behavior) in q_enemies.iter_mut() {
        enemy.attack_cooldown = (enemy.attack_cooldown - dt).max(0.0);

        let pos = transform.translation.truncate();
        let dist = pos.distance(player_pos);

        if dist > player_radius + enemy.radius {
            let step = behavior.advance(pos, player_pos, enemy.speed, dt, &mut rng);
            if step.teleported {
                spawn_teleport_particles(&mut commands, pos, pos + step.displacement);
                sfx.write(PlaySfx::new(SfxKind::Teleport));
            }
            transform.translation.x += step.displacement.x;
            transform.translation.y += step.displacement.y;
            continue;
        }

        // In contact: attack unless suppressed.
        if dash.is_dashing() || effects.is_active(EffectKind::Shield) {
            continue;
        }
        if enemy.attack_cooldown > 0.0 {
            continue;
        }
        enemy.attack_cooldown = config.enemy_attack_interval;

        let lethal = player_health.apply_damage(enemy.contact_damage);
        sfx.write(PlaySfx::new(SfxKind::PlayerHurt));
        if lethal {
            deaths.write(PlayerDied);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn step_rng() -> StepRng {
        StepRng::new(42, 13)
    }

    #[test]
    fn chase_moves_straight_toward_the_player() {
        let mut behavior = Behavior::Chase;
        let step = behavior.advance(
            Vec2::new(100.0, 0.0),
            Vec2::ZERO,
            60.0,
            1.0,
            &mut step_rng(),
        );
        assert!(!step.teleported);
        assert!((step.displacement - Vec2::new(-60.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn zigzag_keeps_a_forward_component_and_flips_sides() {
        let mut behavior = Behavior::Zigzag {
            phase: 0.0,
            dir: 1.0,
            next_flip: 2.0,
        };
        let pos = Vec2::new(200.0, 0.0);

        let first = behavior
            .advance(pos, Vec2::ZERO, 60.0, 0.1, &mut step_rng())
            .displacement;
        assert!(first.x < 0.0, "must always advance toward the player");
        let first_side = first.y;

        // Push the phase past the flip boundary.
        for _ in 0..4 {
            behavior.advance(pos, Vec2::ZERO, 60.0, 0.1, &mut step_rng());
        }
        let later = behavior
            .advance(pos, Vec2::ZERO, 60.0, 0.1, &mut step_rng())
            .displacement;
        assert!(
            first_side.signum() != later.y.signum(),
            "perpendicular component must flip sign"
        );
    }

    #[test]
    fn orbiter_approaches_then_circles() {
        let mut behavior = Behavior::Orbit {
            angle: 0.0,
            radius: 150.0,
        };

        // Far away: approach.
        let far = behavior
            .advance(Vec2::new(500.0, 0.0), Vec2::ZERO, 60.0, 0.1, &mut step_rng())
            .displacement;
        assert!(far.x < 0.0);

        // Inside orbit distance: motion tracks the circle target, advancing
        // the orbit angle rather than closing in.
        let before = match behavior {
            Behavior::Orbit { angle, .. } => angle,
            _ => unreachable!(),
        };
        behavior.advance(Vec2::new(100.0, 0.0), Vec2::ZERO, 60.0, 0.1, &mut step_rng());
        let after = match behavior {
            Behavior::Orbit { angle, .. } => angle,
            _ => unreachable!(),
        };
        assert!(after > before);
    }

    #[test]
    fn dasher_lunges_only_in_proximity_and_then_cools_down() {
        let mut behavior = Behavior::Dash {
            cooldown: 0.0,
            lunge_remaining: 0.0,
        };

        // Beyond lunge range: plain chase speed.
        let slow = behavior
            .advance(Vec2::new(600.0, 0.0), Vec2::ZERO, 60.0, 0.1, &mut step_rng())
            .displacement;
        assert!((slow.length() - 6.0).abs() < 1e-3);

        // Within range: the lunge arms on this step and fires on the next.
        let arming = behavior
            .advance(Vec2::new(300.0, 0.0), Vec2::ZERO, 60.0, 0.1, &mut step_rng())
            .displacement;
        assert!((arming.length() - 6.0).abs() < 1e-3);
        let fast = behavior
            .advance(Vec2::new(300.0, 0.0), Vec2::ZERO, 60.0, 0.1, &mut step_rng())
            .displacement;
        assert!((fast.length() - 24.0).abs() < 1e-3);

        // Exhaust the lunge; the cooldown must engage.
        for _ in 0..6 {
            behavior.advance(Vec2::new(300.0, 0.0), Vec2::ZERO, 60.0, 0.1, &mut step_rng());
        }
        match behavior {
            Behavior::Dash {
                cooldown,
                lunge_remaining,
            } => {
                assert!(lunge_remaining <= 0.0);
                assert!(cooldown > 0.0);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn teleporter_halves_the_distance_and_resets_its_cooldown() {
        let mut behavior = Behavior::Teleport { cooldown: 0.0 };
        let pos = Vec2::new(600.0, 0.0);

        let step = behavior.advance(pos, Vec2::ZERO, 60.0, 0.1, &mut step_rng());
        assert!(step.teleported);

        let landing = pos + step.displacement;
        assert!(
            (landing.length() - 300.0).abs() < 1.0,
            "teleport must land at half the previous distance, got {}",
            landing.length()
        );
        match behavior {
            Behavior::Teleport { cooldown } => assert!(cooldown > 0.0),
            _ => unreachable!(),
        }
    }

    #[test]
    fn teleporter_chases_when_too_close() {
        let mut behavior = Behavior::Teleport { cooldown: 0.0 };
        let step = behavior.advance(Vec2::new(150.0, 0.0), Vec2::ZERO, 60.0, 0.1, &mut step_rng());
        assert!(!step.teleported);
        assert!(step.displacement.x < 0.0);
    }

    #[test]
    fn enemy_stats_scale_with_wave() {
        let mut world = World::new();
        let mut rng = step_rng();

        let mut spawn = |wave: u32| -> (f32, f32) {
            let entity = world
                .spawn(make_enemy(
                    Vec2::ZERO,
                    wave,
                    Difficulty::Normal,
                    Archetype::Basic,
                    &mut rng,
                ))
                .id();
            let hp = world.get::<EnemyHealth>(entity).unwrap().max_hp;
            let speed = world.get::<Enemy>(entity).unwrap().speed;
            (hp, speed)
        };

        let (hp1, speed1) = spawn(1);
        let (hp5, speed5) = spawn(5);
        assert!(hp5 > hp1);
        assert!(speed5 > speed1);
        // Wave 1 normal basic: 100 hp, 60 u/s.
        assert_eq!(hp1, 100.0);
        assert_eq!(speed1, 60.0);
    }

    #[test]
    fn hard_pool_excludes_the_basic_chaser() {
        let mut rng = rand::thread_rng();
        for _ in 0..64 {
            let archetype = random_archetype(Difficulty::Hard, 12, &mut rng);
            assert_ne!(archetype, Archetype::Basic);
        }
    }
}
