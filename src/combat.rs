//! Combat Resolver: all circle-circle collision passes for one tick, in a
//! fixed order, plus the kill outcome pipeline (damage, death, scoring,
//! combo, power-up drops).
//!
//! Ordering per tick (enforced by the simulation chain):
//! 1. bullet × enemy — resolved *before* enemies move, so hits land against
//!    the positions the player saw last frame;
//! 2. enemy contact × player — inside the enemy movement step;
//! 3. hazard (shockwave / boss projectile) × player.
//!
//! Within a tick a single bullet stops at its first successful hit unless it
//! still has piercing charges, in which case one charge is spent and the
//! same bullet continues down the enemy list.

use crate::achievements::AchievementLog;
use crate::audio::{PlaySfx, SfxKind};
use crate::boss::{Boss, BossProjectile, BossShockwave};
use crate::config::GameConfig;
use crate::constants::{SHOCKWAVE_MIN_RADIUS, SHOCKWAVE_RING_WIDTH};
use crate::enemy::{Enemy, EnemyHealth};
use crate::particles::spawn_kill_particles;
use crate::player::{Bullet, Dash, Player, PlayerHealth};
use crate::powerup::{spawn_powerup, ActiveEffects, EffectKind};
use crate::session::{ActiveEventModifiers, GameSession, PlayerDied, SessionBonuses};
use crate::vowels::VowelTracker;
use bevy::prelude::*;
use rand::Rng;

/// Resolve every bullet against every live enemy.
///
/// Kill side effects: kill counters, cumulative achievement tracking, combo
/// extension, combo-scaled score, power-up drop roll, vowel recording, and
/// enemy removal.  Non-lethal hits only emit a hit sound.
#[allow(clippy::too_many_arguments)]
pub fn bullet_enemy_collision_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    bonuses: Res<SessionBonuses>,
    event_mods: Res<ActiveEventModifiers>,
    mut session: ResMut<GameSession>,
    mut achievements: ResMut<AchievementLog>,
    mut vowels: ResMut<VowelTracker>,
    mut q_bullets: Query<(Entity, &Transform, &mut Bullet)>,
    mut q_enemies: Query<
        (Entity, &Transform, &Enemy, &mut EnemyHealth, Option<&Boss>),
        Without<Bullet>,
    >,
    mut sfx: MessageWriter<PlaySfx>,
) {
    let mut rng = rand::thread_rng();

    for (bullet_entity, bullet_transform, mut bullet) in q_bullets.iter_mut() {
        let bullet_pos = bullet_transform.translation.truncate();

        for (enemy_entity, enemy_transform, enemy, mut health, boss) in q_enemies.iter_mut() {
            // Enemies killed earlier this tick are despawned via commands,
            // which is deferred; skip them by health.
            if health.hp <= 0.0 {
                continue;
            }

            let enemy_pos = enemy_transform.translation.truncate();
            if bullet_pos.distance(enemy_pos) >= bullet.radius + enemy.radius {
                continue;
            }

            let is_boss = boss.is_some();
            let damage = if is_boss {
                bullet.damage * bonuses.0.boss_damage_multiplier
            } else {
                bullet.damage
            };

            if health.hit(damage) {
                resolve_kill(
                    &mut commands,
                    &config,
                    &bonuses,
                    &event_mods,
                    &mut session,
                    &mut achievements,
                    &mut vowels,
                    &mut sfx,
                    enemy_entity,
                    enemy_pos,
                    enemy,
                    is_boss,
                    &mut rng,
                );
            } else {
                sfx.write(PlaySfx::new(SfxKind::EnemyHit));
            }

            // One hit per enemy; the bullet survives only on piercing.
            if bullet.piercing == 0 {
                commands.entity(bullet_entity).despawn();
                break;
            }
            bullet.piercing -= 1;
        }
    }
}

/// Everything that happens when an enemy's health reaches zero.
#[allow(clippy::too_many_arguments)]
fn resolve_kill(
    commands: &mut Commands,
    config: &GameConfig,
    bonuses: &SessionBonuses,
    event_mods: &ActiveEventModifiers,
    session: &mut GameSession,
    achievements: &mut AchievementLog,
    vowels: &mut VowelTracker,
    sfx: &mut MessageWriter<PlaySfx>,
    enemy_entity: Entity,
    enemy_pos: Vec2,
    enemy: &Enemy,
    is_boss: bool,
    rng: &mut impl Rng,
) {
    sfx.write(PlaySfx::new(SfxKind::EnemyDeath));
    sfx.write(PlaySfx::new(SfxKind::ScorePoint));

    vowels.record(enemy.vowel);

    session.kills += 1;
    session.wave_stats.shots_hit += 1;
    session.total_shots_hit += 1;
    achievements.add_kills(1);

    if is_boss {
        session.boss_kills += 1;
        achievements.add_boss_kill();
    }

    session.bump_combo();
    let combo = session.combo;
    achievements.check_value("combo_starter", combo);
    achievements.check_value("combo_master", combo);
    achievements.check_value("combo_god", combo);

    let combo_mult = session.combo_multiplier(config.combo_score_step);
    let mut total_mult = bonuses.0.score_multiplier * event_mods.0.score_multiplier;
    if is_boss {
        total_mult *= event_mods.0.boss_reward_multiplier;
    }
    let award = (enemy.score_value as f32 * combo_mult * total_mult) as u32;
    session.score += award;

    achievements.check_value("first_score", session.score);
    achievements.check_value("score_master", session.score);
    achievements.check_value("score_legend", session.score);

    spawn_kill_particles(commands, enemy_pos, enemy.color, combo);

    // Drop chance climbs with the active combo.
    let chance = config.powerup_base_chance + combo as f32 * config.powerup_combo_chance;
    if rng.gen::<f32>() < chance {
        spawn_powerup(commands, enemy_pos, config, rng);
    }

    commands.entity(enemy_entity).despawn();
}

/// Resolve boss hazards against the player.
///
/// Shockwaves use an annulus test around the expanding ring edge and a
/// single-trigger `hit` flag; Shield suppresses them.  Projectiles use a
/// plain circle test and are suppressed by Shield or an active dash.
#[allow(clippy::too_many_arguments)]
pub fn hazard_player_collision_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    effects: Res<ActiveEffects>,
    mut q_player: Query<(&Transform, &Dash, &mut PlayerHealth), With<Player>>,
    mut q_shockwaves: Query<(&Transform, &mut BossShockwave), Without<Player>>,
    q_projectiles: Query<(Entity, &Transform, &BossProjectile), Without<Player>>,
    mut sfx: MessageWriter<PlaySfx>,
    mut deaths: MessageWriter<PlayerDied>,
) {
    let Ok((player_transform, dash, mut health)) = q_player.single_mut() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();
    let shielded = effects.is_active(EffectKind::Shield);

    for (transform, mut wave) in q_shockwaves.iter_mut() {
        if wave.hit || shielded {
            continue;
        }
        let dist = player_pos.distance(transform.translation.truncate());
        let crossing =
            (dist - wave.radius).abs() < SHOCKWAVE_RING_WIDTH && wave.radius > SHOCKWAVE_MIN_RADIUS;
        if !crossing {
            continue;
        }
        wave.hit = true;
        sfx.write(PlaySfx::new(SfxKind::PlayerHurt));
        if health.apply_damage(wave.damage) {
            deaths.write(PlayerDied);
        }
    }

    if shielded || dash.is_dashing() {
        return;
    }

    for (entity, transform, projectile) in q_projectiles.iter() {
        let dist = player_pos.distance(transform.translation.truncate());
        if dist >= projectile.radius + config.player_radius {
            continue;
        }
        commands.entity(entity).despawn();
        sfx.write(PlaySfx::new(SfxKind::PlayerHurt));
        if health.apply_damage(projectile.damage) {
            deaths.write(PlayerDied);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::{Behavior, Shape};
    use crate::vowels::Vowel;
    use bevy::ecs::message::Messages;
    use std::collections::VecDeque;

    fn test_enemy(hp: f32, score_value: u32) -> (Enemy, EnemyHealth, Behavior) {
        (
            Enemy {
                name: "Test Chaser",
                radius: 30.0,
                speed: 60.0,
                contact_damage: 15.0,
                score_value,
                attack_cooldown: 0.0,
                vowel: Vowel::A,
                shape: Shape::Circle,
                color: Color::WHITE,
            },
            EnemyHealth::new(hp),
            Behavior::Chase,
        )
    }

    fn test_bullet(piercing: u32, damage: f32) -> Bullet {
        Bullet {
            direction: Vec2::X,
            speed: 0.0,
            radius: 4.0,
            damage,
            piercing,
            age: 0.0,
            lifetime: 10.0,
        }
    }

    fn combat_world() -> World {
        let mut world = World::new();
        world.insert_resource(GameConfig::default());
        world.insert_resource(SessionBonuses::default());
        world.insert_resource(ActiveEventModifiers::default());
        world.insert_resource(GameSession::default());
        world.insert_resource(AchievementLog::default());
        world.insert_resource(VowelTracker::default());
        world.init_resource::<Messages<PlaySfx>>();
        world.init_resource::<Messages<PlayerDied>>();
        world
    }

    fn run_bullet_pass(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(bullet_enemy_collision_system);
        schedule.run(world);
    }

    #[test]
    fn plain_bullet_kills_one_enemy_and_is_consumed() {
        let mut world = combat_world();
        let enemy = world
            .spawn((test_enemy(1.0, 10), Transform::default()))
            .id();
        let other = world
            .spawn((test_enemy(1.0, 10), Transform::default()))
            .id();
        let bullet = world
            .spawn((test_bullet(0, 50.0), Transform::default()))
            .id();

        run_bullet_pass(&mut world);

        assert!(world.get_entity(bullet).is_err(), "bullet must be consumed");
        let alive = [enemy, other]
            .iter()
            .filter(|e| world.get_entity(**e).is_ok())
            .count();
        assert_eq!(alive, 1, "exactly one enemy dies to a non-piercing bullet");

        let session = world.resource::<GameSession>();
        assert_eq!(session.kills, 1);
        assert_eq!(session.combo, 1);
        assert_eq!(session.score, 10);
    }

    #[test]
    fn piercing_two_clears_a_cluster_of_three_then_dies() {
        let mut world = combat_world();
        let enemies: Vec<Entity> = (0..3)
            .map(|_| {
                world
                    .spawn((test_enemy(1.0, 10), Transform::default()))
                    .id()
            })
            .collect();
        let bullet = world
            .spawn((test_bullet(2, 50.0), Transform::default()))
            .id();

        run_bullet_pass(&mut world);

        for enemy in &enemies {
            assert!(
                world.get_entity(*enemy).is_err(),
                "all three clustered enemies must die in one tick"
            );
        }
        assert!(
            world.get_entity(bullet).is_err(),
            "bullet is removed after its third hit"
        );
        assert_eq!(world.resource::<GameSession>().kills, 3);
        assert_eq!(world.resource::<GameSession>().combo, 3);
    }

    #[test]
    fn piercing_k_hits_at_most_k_plus_one_enemies() {
        let mut world = combat_world();
        let enemies: Vec<Entity> = (0..5)
            .map(|_| {
                world
                    .spawn((test_enemy(1.0, 10), Transform::default()))
                    .id()
            })
            .collect();
        world.spawn((test_bullet(2, 50.0), Transform::default()));

        run_bullet_pass(&mut world);

        let alive = enemies
            .iter()
            .filter(|e| world.get_entity(**e).is_ok())
            .count();
        assert_eq!(alive, 2, "piercing 2 may kill at most 3 of the 5");
    }

    #[test]
    fn non_lethal_hit_keeps_the_enemy_and_consumes_the_bullet() {
        let mut world = combat_world();
        let enemy = world
            .spawn((test_enemy(100.0, 10), Transform::default()))
            .id();
        let bullet = world
            .spawn((test_bullet(0, 30.0), Transform::default()))
            .id();

        run_bullet_pass(&mut world);

        assert!(world.get_entity(enemy).is_ok());
        assert_eq!(world.get::<EnemyHealth>(enemy).unwrap().hp, 70.0);
        assert!(world.get_entity(bullet).is_err());
        assert_eq!(world.resource::<GameSession>().kills, 0);
        assert_eq!(world.resource::<GameSession>().combo, 0);
    }

    #[test]
    fn combo_scales_the_score_award() {
        let mut world = combat_world();
        for _ in 0..3 {
            world.spawn((test_enemy(1.0, 100), Transform::default()));
        }
        world.spawn((test_bullet(2, 50.0), Transform::default()));

        run_bullet_pass(&mut world);

        // Kills at combo 1, 2, 3: 100 + 110 + 120.
        assert_eq!(world.resource::<GameSession>().score, 330);
    }

    #[test]
    fn distant_enemies_are_not_hit() {
        let mut world = combat_world();
        let enemy = world
            .spawn((test_enemy(1.0, 10), Transform::from_xyz(500.0, 0.0, 0.0)))
            .id();
        let bullet = world
            .spawn((test_bullet(0, 50.0), Transform::default()))
            .id();

        run_bullet_pass(&mut world);

        assert!(world.get_entity(enemy).is_ok());
        assert!(world.get_entity(bullet).is_ok());
    }

    fn hazard_world() -> World {
        let mut world = combat_world();
        world.insert_resource(ActiveEffects::default());
        world.spawn((
            Player,
            PlayerHealth::new(100.0),
            Dash::new(4.0),
            crate::player::Trail {
                positions: VecDeque::new(),
                capacity: 15,
            },
            Transform::default(),
        ));
        world
    }

    fn run_hazard_pass(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(hazard_player_collision_system);
        schedule.run(world);
    }

    #[test]
    fn shockwave_damages_once_per_ring() {
        let mut world = hazard_world();
        // Ring edge exactly at the player's distance.
        world.spawn((
            BossShockwave {
                radius: 100.0,
                max_radius: 300.0,
                growth: 0.0,
                damage: 15.0,
                hit: false,
                color: Color::WHITE,
            },
            Transform::from_xyz(100.0, 0.0, 0.0),
        ));

        run_hazard_pass(&mut world);
        run_hazard_pass(&mut world);

        let mut q = world.query::<&PlayerHealth>();
        let health = q.single(&world).unwrap();
        assert_eq!(health.hp, 85.0, "a ring may damage the player only once");
    }

    #[test]
    fn charging_shockwave_below_min_radius_is_harmless() {
        let mut world = hazard_world();
        world.spawn((
            BossShockwave {
                radius: 10.0,
                max_radius: 300.0,
                growth: 0.0,
                damage: 15.0,
                hit: false,
                color: Color::WHITE,
            },
            Transform::from_xyz(10.0, 0.0, 0.0),
        ));

        run_hazard_pass(&mut world);

        let mut q = world.query::<&PlayerHealth>();
        assert_eq!(q.single(&world).unwrap().hp, 100.0);
    }

    #[test]
    fn boss_projectile_hits_and_is_consumed() {
        let mut world = hazard_world();
        let projectile = world
            .spawn((
                BossProjectile {
                    velocity: Vec2::ZERO,
                    radius: 8.0,
                    damage: 10.0,
                    age: 0.0,
                    lifetime: 3.3,
                    color: Color::WHITE,
                },
                Transform::default(),
            ))
            .id();

        run_hazard_pass(&mut world);

        assert!(world.get_entity(projectile).is_err());
        let mut q = world.query::<&PlayerHealth>();
        assert_eq!(q.single(&world).unwrap().hp, 90.0);
    }

    #[test]
    fn dash_suppresses_projectiles_but_not_shockwaves() {
        let mut world = hazard_world();
        {
            let mut q = world.query::<&mut Dash>();
            q.single_mut(&mut world).unwrap().active_remaining = 0.2;
        }
        world.spawn((
            BossProjectile {
                velocity: Vec2::ZERO,
                radius: 8.0,
                damage: 10.0,
                age: 0.0,
                lifetime: 3.3,
                color: Color::WHITE,
            },
            Transform::default(),
        ));
        world.spawn((
            BossShockwave {
                radius: 100.0,
                max_radius: 300.0,
                growth: 0.0,
                damage: 15.0,
                hit: false,
                color: Color::WHITE,
            },
            Transform::from_xyz(100.0, 0.0, 0.0),
        ));

        run_hazard_pass(&mut world);

        let mut q = world.query::<&PlayerHealth>();
        assert_eq!(
            q.single(&world).unwrap().hp,
            85.0,
            "shockwave lands through a dash; the projectile does not"
        );
    }
}
