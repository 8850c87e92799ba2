//! Boss enemies: tier table, health-driven phase machine, abilities, and the
//! transient hazards they emit.
//!
//! Boss waves arrive every Nth wave (default 5, event-modifiable).  The tier
//! is keyed by wave milestone — 5, 10, 15, then always the top tier from 20
//! on — as fixed data, not a formula.  Each tier carries a descending
//! health-percent phase table; phases set the boss speed and the intervals of
//! up to three abilities (summon-minion, shockwave, aimed projectile), each
//! on its own independent cooldown.

use crate::audio::{PlaySfx, SfxKind};
use crate::constants::{
    BOSS_CONTACT_DAMAGE, BOSS_PROJECTILE_DAMAGE, BOSS_PROJECTILE_LIFETIME,
    BOSS_PROJECTILE_RADIUS, BOSS_PROJECTILE_RANGE, BOSS_PROJECTILE_SPEED, ENEMY_HEALTH_PER_WAVE,
    MINION_SUMMON_RADIUS, SHOCKWAVE_DAMAGE, SHOCKWAVE_GROWTH_RATE, SHOCKWAVE_MAX_RADIUS,
};
use crate::difficulty::Difficulty;
use crate::enemy::{random_archetype, spawn_enemy, Behavior, Enemy, EnemyHealth, Shape};
use crate::menu::SelectedDifficulty;
use crate::player::Player;
use crate::session::GameSession;
use crate::vowels::Vowel;
use bevy::prelude::*;
use rand::Rng;

// ── Tier & phase tables ───────────────────────────────────────────────────────

/// One row of a boss phase table.
///
/// A phase applies while the boss's health percentage is at or below
/// `health_percent` (tables are scanned highest-threshold-last, so the
/// deepest matching row wins).  `None` intervals mean the phase lacks that
/// ability.
#[derive(Debug, Clone, Copy)]
pub struct BossPhase {
    pub health_percent: f32,
    pub speed: f32,
    pub summon_interval: Option<f32>,
    pub shockwave_interval: Option<f32>,
    pub projectile_interval: Option<f32>,
}

/// The four boss tiers, keyed by wave milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossTier {
    /// Wave 5 — summons minions, two phases.
    VowelQueen,
    /// Wave 10 — shockwave attacks, three phases.
    AlphabetTitan,
    /// Wave 15 — aimed projectiles, three phases.
    CosmicScholar,
    /// Wave 20 and beyond — every ability, three phases.
    OmegaVowel,
}

/// Static per-tier stat block.
#[derive(Debug, Clone, Copy)]
pub struct BossStats {
    pub name: &'static str,
    pub radius: f32,
    pub health_mult: f32,
    pub score_value: u32,
    pub color: Color,
    pub phases: &'static [BossPhase],
}

const QUEEN_PHASES: [BossPhase; 2] = [
    BossPhase {
        health_percent: 100.0,
        speed: 42.0,
        summon_interval: Some(5.0),
        shockwave_interval: None,
        projectile_interval: None,
    },
    BossPhase {
        health_percent: 50.0,
        speed: 54.0,
        summon_interval: Some(3.3),
        shockwave_interval: None,
        projectile_interval: None,
    },
];

const TITAN_PHASES: [BossPhase; 3] = [
    BossPhase {
        health_percent: 100.0,
        speed: 30.0,
        summon_interval: None,
        shockwave_interval: Some(4.0),
        projectile_interval: None,
    },
    BossPhase {
        health_percent: 66.0,
        speed: 36.0,
        summon_interval: None,
        shockwave_interval: Some(3.0),
        projectile_interval: None,
    },
    BossPhase {
        health_percent: 33.0,
        speed: 48.0,
        summon_interval: None,
        shockwave_interval: Some(2.0),
        projectile_interval: None,
    },
];

const SCHOLAR_PHASES: [BossPhase; 3] = [
    BossPhase {
        health_percent: 100.0,
        speed: 48.0,
        summon_interval: None,
        shockwave_interval: None,
        projectile_interval: Some(2.0),
    },
    BossPhase {
        health_percent: 60.0,
        speed: 60.0,
        summon_interval: None,
        shockwave_interval: None,
        projectile_interval: Some(1.5),
    },
    BossPhase {
        health_percent: 30.0,
        speed: 72.0,
        summon_interval: None,
        shockwave_interval: None,
        projectile_interval: Some(1.0),
    },
];

const OMEGA_PHASES: [BossPhase; 3] = [
    BossPhase {
        health_percent: 100.0,
        speed: 54.0,
        summon_interval: Some(4.0),
        shockwave_interval: Some(3.0),
        projectile_interval: None,
    },
    BossPhase {
        health_percent: 66.0,
        speed: 60.0,
        summon_interval: Some(3.0),
        shockwave_interval: Some(2.0),
        projectile_interval: None,
    },
    BossPhase {
        health_percent: 33.0,
        speed: 72.0,
        summon_interval: Some(2.0),
        shockwave_interval: Some(1.5),
        projectile_interval: Some(1.0),
    },
];

impl BossTier {
    pub fn stats(self) -> BossStats {
        match self {
            BossTier::VowelQueen => BossStats {
                name: "Vowel Queen",
                radius: 60.0,
                health_mult: 5.0,
                score_value: 500,
                color: Color::srgb(1.0, 0.42, 0.62),
                phases: &QUEEN_PHASES,
            },
            BossTier::AlphabetTitan => BossStats {
                name: "Alphabet Titan",
                radius: 75.0,
                health_mult: 8.0,
                score_value: 1000,
                color: Color::srgb(0.64, 0.61, 1.0),
                phases: &TITAN_PHASES,
            },
            BossTier::CosmicScholar => BossStats {
                name: "Cosmic Scholar",
                radius: 65.0,
                health_mult: 12.0,
                score_value: 1500,
                color: Color::srgb(1.0, 0.84, 0.0),
                phases: &SCHOLAR_PHASES,
            },
            BossTier::OmegaVowel => BossStats {
                name: "Omega Vowel",
                radius: 80.0,
                health_mult: 15.0,
                score_value: 2500,
                color: Color::srgb(1.0, 0.28, 0.34),
                phases: &OMEGA_PHASES,
            },
        }
    }
}

/// Boss tier for a given wave, `None` when the wave is not a milestone.
///
/// The 20+ rule is intentional fixed data: every milestone past 15 spawns the
/// top tier.
pub fn boss_for_wave(wave: u32, boss_every_n: u32) -> Option<BossTier> {
    if boss_every_n == 0 || wave % boss_every_n != 0 {
        return None;
    }
    Some(match wave {
        0..=5 => BossTier::VowelQueen,
        6..=10 => BossTier::AlphabetTitan,
        11..=15 => BossTier::CosmicScholar,
        _ => BossTier::OmegaVowel,
    })
}

/// Scan the phase table for the deepest phase whose threshold covers the
/// current health percentage.
pub fn phase_index_for(phases: &[BossPhase], health_percent: f32) -> usize {
    for i in (0..phases.len()).rev() {
        if health_percent <= phases[i].health_percent {
            return i;
        }
    }
    0
}

// ── Components ────────────────────────────────────────────────────────────────

/// Marks an enemy as a boss and tracks its active phase.
#[derive(Component, Debug, Clone, Copy)]
pub struct Boss {
    pub tier: BossTier,
    pub phase_index: usize,
}

/// Independent countdowns for the three boss abilities.
///
/// All start at zero so a freshly spawned boss opens with its signature
/// ability immediately.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AbilityCooldowns {
    pub summon: f32,
    pub shockwave: f32,
    pub projectile: f32,
}

/// Expanding shockwave ring; damages the player once as the ring crosses.
#[derive(Component, Debug, Clone, Copy)]
pub struct BossShockwave {
    pub radius: f32,
    pub max_radius: f32,
    pub growth: f32,
    pub damage: f32,
    /// Single-trigger flag: one ring damages at most once.
    pub hit: bool,
    pub color: Color,
}

/// Aimed boss projectile travelling in a straight line.
#[derive(Component, Debug, Clone, Copy)]
pub struct BossProjectile {
    pub velocity: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub age: f32,
    pub lifetime: f32,
    pub color: Color,
}

// ── Spawning ──────────────────────────────────────────────────────────────────

/// Spawn the boss for `wave` at `pos`.  Boss health scales with the same
/// per-wave bonus as regular enemies, multiplied by the tier factor.
pub fn spawn_boss(
    commands: &mut Commands,
    pos: Vec2,
    wave: u32,
    difficulty: Difficulty,
    tier: BossTier,
    rng: &mut impl Rng,
) -> Entity {
    let profile = difficulty.profile();
    let stats = tier.stats();

    let wave_bonus = ENEMY_HEALTH_PER_WAVE * (wave - 1) as f32;
    let hp = (profile.enemy_health + wave_bonus) * stats.health_mult;

    commands
        .spawn((
            Enemy {
                name: stats.name,
                radius: stats.radius,
                speed: stats.phases[0].speed,
                contact_damage: BOSS_CONTACT_DAMAGE,
                score_value: stats.score_value,
                attack_cooldown: 0.0,
                vowel: Vowel::random(rng),
                shape: Shape::Star,
                color: stats.color,
            },
            EnemyHealth::new(hp),
            Behavior::Chase,
            Boss {
                tier,
                phase_index: 0,
            },
            AbilityCooldowns::default(),
            Transform::from_translation(pos.extend(0.2)),
            Visibility::default(),
        ))
        .id()
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Drive boss phases and fire abilities whose cooldowns have elapsed.
///
/// The phase index is re-derived from current health every tick; each ability
/// cooldown counts down independently and resets to the active phase's
/// interval when it fires.  Projectiles additionally require the player
/// within range.
#[allow(clippy::too_many_arguments)]
pub fn boss_ability_system(
    mut commands: Commands,
    time: Res<Time>,
    selected: Res<SelectedDifficulty>,
    session: Res<GameSession>,
    q_player: Query<&Transform, With<Player>>,
    mut q_bosses: Query<
        (
            &Transform,
            &mut Enemy,
            &EnemyHealth,
            &mut Boss,
            &mut AbilityCooldowns,
        ),
        Without<Player>,
    >,
    mut sfx: MessageWriter<PlaySfx>,
) {
    let Ok(player_transform) = q_player.single() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();
    let dt = time.delta_secs();
    let mut rng = rand::thread_rng();

    for (transform, mut enemy, health, mut boss, mut cooldowns) in q_bosses.iter_mut() {
        let stats = boss.tier.stats();
        boss.phase_index = phase_index_for(stats.phases, health.percent());
        let phase = &stats.phases[boss.phase_index];
        enemy.speed = phase.speed;

        cooldowns.summon -= dt;
        cooldowns.shockwave -= dt;
        cooldowns.projectile -= dt;

        let pos = transform.translation.truncate();

        if let Some(interval) = phase.summon_interval {
            if cooldowns.summon <= 0.0 {
                cooldowns.summon = interval;
                let angle = rng.gen_range(0.0..std::f32::consts::TAU);
                let offset = Vec2::new(angle.cos(), angle.sin()) * MINION_SUMMON_RADIUS;
                let archetype = random_archetype(selected.0, 1, &mut rng);
                let minion =
                    spawn_enemy(&mut commands, pos + offset, 1, selected.0, archetype, true, &mut rng);
                debug!("Boss summoned minion {:?} at wave {}", minion, session.wave);
                sfx.write(PlaySfx::new(SfxKind::EnemyDeath));
            }
        }

        if let Some(interval) = phase.shockwave_interval {
            if cooldowns.shockwave <= 0.0 {
                cooldowns.shockwave = interval;
                commands.spawn((
                    BossShockwave {
                        radius: 0.0,
                        max_radius: SHOCKWAVE_MAX_RADIUS,
                        growth: SHOCKWAVE_GROWTH_RATE,
                        damage: SHOCKWAVE_DAMAGE,
                        hit: false,
                        color: stats.color,
                    },
                    Transform::from_translation(pos.extend(0.1)),
                    Visibility::default(),
                ));
                sfx.write(PlaySfx::new(SfxKind::Dash));
            }
        }

        if let Some(interval) = phase.projectile_interval {
            let dist = pos.distance(player_pos);
            if cooldowns.projectile <= 0.0 && dist < BOSS_PROJECTILE_RANGE {
                cooldowns.projectile = interval;
                let direction = (player_pos - pos).normalize_or_zero();
                commands.spawn((
                    BossProjectile {
                        velocity: direction * BOSS_PROJECTILE_SPEED,
                        radius: BOSS_PROJECTILE_RADIUS,
                        damage: BOSS_PROJECTILE_DAMAGE,
                        age: 0.0,
                        lifetime: BOSS_PROJECTILE_LIFETIME,
                        color: stats.color,
                    },
                    Transform::from_translation(pos.extend(0.3)),
                    Visibility::default(),
                ));
                sfx.write(PlaySfx::new(SfxKind::Shoot));
            }
        }
    }
}

/// Expand shockwave rings; despawn them past their maximum radius.
pub fn shockwave_update_system(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut BossShockwave)>,
) {
    let dt = time.delta_secs();
    for (entity, mut wave) in query.iter_mut() {
        wave.radius += wave.growth * dt;
        if wave.radius >= wave.max_radius {
            commands.entity(entity).despawn();
        }
    }
}

/// Advance boss projectiles; despawn on lifetime expiry.
pub fn boss_projectile_update_system(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut BossProjectile)>,
) {
    let dt = time.delta_secs();
    for (entity, mut transform, mut projectile) in query.iter_mut() {
        projectile.age += dt;
        transform.translation.x += projectile.velocity.x * dt;
        transform.translation.y += projectile.velocity.y * dt;
        if projectile.age >= projectile.lifetime {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestones_map_to_fixed_tiers() {
        assert_eq!(boss_for_wave(5, 5), Some(BossTier::VowelQueen));
        assert_eq!(boss_for_wave(10, 5), Some(BossTier::AlphabetTitan));
        assert_eq!(boss_for_wave(15, 5), Some(BossTier::CosmicScholar));
        assert_eq!(boss_for_wave(20, 5), Some(BossTier::OmegaVowel));
        // Beyond 20 it is always the top tier.
        assert_eq!(boss_for_wave(25, 5), Some(BossTier::OmegaVowel));
        assert_eq!(boss_for_wave(100, 5), Some(BossTier::OmegaVowel));
    }

    #[test]
    fn non_milestone_waves_have_no_boss() {
        for wave in [1, 2, 3, 4, 6, 7, 11, 21] {
            assert_eq!(boss_for_wave(wave, 5), None);
        }
    }

    #[test]
    fn event_modifier_changes_the_milestone_period() {
        // Boss-rush event: every 3rd wave.
        assert!(boss_for_wave(3, 3).is_some());
        assert!(boss_for_wave(5, 3).is_none());
        assert!(boss_for_wave(6, 3).is_some());
    }

    #[test]
    fn phase_scan_picks_the_deepest_matching_row() {
        let phases = BossTier::AlphabetTitan.stats().phases;
        assert_eq!(phase_index_for(phases, 100.0), 0);
        assert_eq!(phase_index_for(phases, 80.0), 0);
        assert_eq!(phase_index_for(phases, 66.0), 1);
        assert_eq!(phase_index_for(phases, 40.0), 1);
        assert_eq!(phase_index_for(phases, 33.0), 2);
        assert_eq!(phase_index_for(phases, 5.0), 2);
    }

    #[test]
    fn phases_escalate_speed_as_health_drops() {
        for tier in [
            BossTier::VowelQueen,
            BossTier::AlphabetTitan,
            BossTier::CosmicScholar,
            BossTier::OmegaVowel,
        ] {
            let phases = tier.stats().phases;
            for pair in phases.windows(2) {
                assert!(
                    pair[1].speed >= pair[0].speed,
                    "{:?} slows down between phases",
                    tier
                );
                assert!(pair[1].health_percent < pair[0].health_percent);
            }
        }
    }

    #[test]
    fn omega_final_phase_has_every_ability() {
        let last = OMEGA_PHASES.last().unwrap();
        assert!(last.summon_interval.is_some());
        assert!(last.shockwave_interval.is_some());
        assert!(last.projectile_interval.is_some());
    }
}
