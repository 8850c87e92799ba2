//! Wave Director: wave composition, staggered spawning through an explicit
//! scheduled-event queue, completion detection, and the intermission flow.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ──start_wave──▶ Spawning ──all spawned──▶ AwaitingCompletion
//!                          │                            │
//!                          └────── last non-minion dies ┴──▶ Intermission
//!                                                                 │
//!                                    timer (held by review/offer) ┴─▶ next wave
//! ```
//!
//! Invariants:
//! * at most one wave is ever `Spawning`; re-entrant `start_wave` calls are
//!   rejected as no-ops while a wave is in progress;
//! * completion side effects run exactly once per wave — the lifecycle is
//!   frozen to `Intermission` *before* any side effect executes;
//! * queued spawn events re-validate the lifecycle when they come due, so a
//!   death or reset between scheduling and firing silently cancels them.

use crate::achievements::AchievementLog;
use crate::audio::{PlaySfx, SfxKind};
use crate::boss::{boss_for_wave, spawn_boss, BossTier};
use crate::config::GameConfig;
use crate::constants::{ACCURACY_MIN_SHOTS, SPEED_WAVE_THRESHOLD};
use crate::difficulty::Difficulty;
use crate::enemy::{random_archetype, spawn_enemy, Enemy, Minion};
use crate::menu::{GameState, SelectedDifficulty};
use crate::player::{Player, PlayerHealth};
use crate::session::{ActiveEventModifiers, GameSession};
use crate::tutorial::TutorialState;
use crate::vowels::VowelTracker;
use bevy::prelude::*;
use rand::Rng;

// ── Types ─────────────────────────────────────────────────────────────────────

/// Where the current wave sits in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaveLifecycle {
    /// No wave active (pre-game, or after a reset).
    #[default]
    Idle,
    /// Spawn events are still queued or firing.
    Spawning,
    /// Everything spawned; waiting for the arena to clear.
    AwaitingCompletion,
    /// Wave confirmed complete; counting down to the next one.
    Intermission,
}

/// What a due scheduled event materialises.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnKind {
    /// One regular enemy at a random perimeter point; archetype rolled at
    /// materialisation time.
    Enemy,
    /// The wave's boss, entering from the top edge.
    Boss(BossTier),
}

/// One deferred spawn, keyed by absolute session-clock time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledSpawn {
    pub due: f32,
    pub kind: SpawnKind,
}

/// HUD banner announcement ("Wave 3", boss titles, ...).
#[derive(Message, Debug, Clone)]
pub struct WaveBanner {
    pub text: String,
}

/// Wave Director state.
#[derive(Resource, Debug, Default)]
pub struct WaveDirector {
    pub lifecycle: WaveLifecycle,
    pub expected_enemies: u32,
    pub spawned_enemies: u32,
    /// Deferred spawn queue, drained each tick against the session clock.
    pub pending: Vec<ScheduledSpawn>,
    pub intermission_timer: f32,
    /// Set at completion when an upgrade draft should open; holds the
    /// intermission until the pick is made.
    pub upgrade_pending: bool,
    /// Set at completion when defeated vowels warrant a review step; holds
    /// the intermission until dismissed.
    pub review_pending: bool,
}

impl WaveDirector {
    /// Reset to a pristine pre-wave state, dropping any queued spawns.
    pub fn reset(&mut self) {
        *self = WaveDirector::default();
    }

    /// True while a wave is in progress (spawning or fighting).
    #[inline]
    pub fn wave_in_progress(&self) -> bool {
        matches!(
            self.lifecycle,
            WaveLifecycle::Spawning | WaveLifecycle::AwaitingCompletion
        )
    }

    /// Begin `wave`: decide composition and enqueue the staggered spawns.
    ///
    /// Rejected (returns `false`, state untouched) while a wave is already in
    /// progress — the re-entrancy guard the completion logic relies on.
    ///
    /// `tutorial_step` is `Some` during the tutorial, whose early steps spawn
    /// a single enemy; `allow_boss` is false there as well.
    #[allow(clippy::too_many_arguments)]
    pub fn start_wave(
        &mut self,
        wave: u32,
        difficulty: Difficulty,
        tutorial_step: Option<u32>,
        allow_boss: bool,
        boss_every_n: u32,
        now: f32,
        config: &GameConfig,
    ) -> bool {
        if self.wave_in_progress() {
            warn!("start_wave({wave}) ignored: wave already in progress");
            return false;
        }

        self.lifecycle = WaveLifecycle::Spawning;
        self.spawned_enemies = 0;
        self.pending.clear();
        self.upgrade_pending = false;
        self.review_pending = false;

        if allow_boss {
            if let Some(tier) = boss_for_wave(wave, boss_every_n) {
                self.expected_enemies = 1;
                self.pending.push(ScheduledSpawn {
                    due: now + config.boss_spawn_delay,
                    kind: SpawnKind::Boss(tier),
                });
                info!("Wave {wave}: boss wave ({:?})", tier);
                return true;
            }
        }

        let profile = difficulty.profile();
        let base = match tutorial_step {
            Some(step) if step < 5 => 1,
            _ => profile.enemies_per_wave,
        };
        let num_enemies = base + (wave - 1) / 2;
        self.expected_enemies = num_enemies;

        for i in 0..num_enemies {
            self.pending.push(ScheduledSpawn {
                due: now + i as f32 * config.wave_spawn_stagger,
                kind: SpawnKind::Enemy,
            });
        }

        info!("Wave {wave}: {num_enemies} enemies queued");
        true
    }
}

/// Uniformly random point just outside one of the four arena edges.
pub fn random_perimeter_position(config: &GameConfig, rng: &mut impl Rng) -> Vec2 {
    let half_w = config.arena_width / 2.0;
    let half_h = config.arena_height / 2.0;
    let m = config.spawn_edge_margin;

    match rng.gen_range(0..4) {
        0 => Vec2::new(rng.gen_range(-half_w..half_w), half_h + m), // top
        1 => Vec2::new(half_w + m, rng.gen_range(-half_h..half_h)), // right
        2 => Vec2::new(rng.gen_range(-half_w..half_w), -half_h - m), // bottom
        _ => Vec2::new(-half_w - m, rng.gen_range(-half_h..half_h)), // left
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// `OnEnter(Playing | Tutorial)`: reset the director and start wave 1.
pub fn wave_kickoff(
    mut director: ResMut<WaveDirector>,
    mut session: ResMut<GameSession>,
    selected: Res<SelectedDifficulty>,
    event_mods: Res<ActiveEventModifiers>,
    tutorial: Res<TutorialState>,
    state: Res<State<GameState>>,
    config: Res<GameConfig>,
    q_player: Query<&PlayerHealth, With<Player>>,
    mut banners: MessageWriter<WaveBanner>,
) {
    director.reset();

    let in_tutorial = *state.get() == GameState::Tutorial;
    let tutorial_step = in_tutorial.then_some(tutorial.step);
    let now = session.elapsed;

    if let Ok(health) = q_player.single() {
        session.begin_wave_tracking(health.hp);
    }

    director.start_wave(
        session.wave,
        selected.0,
        tutorial_step,
        !in_tutorial,
        event_mods.0.boss_every_n_waves,
        now,
        &config,
    );
    banners.write(WaveBanner {
        text: format!("Wave {}", session.wave),
    });
}

/// Drain due spawn events against the session clock.
///
/// Every dequeued event re-validates the lifecycle before materialising — a
/// queued spawn whose wave was reset or completed in the meantime is dropped
/// silently rather than resurrecting enemies.
pub fn drain_spawn_queue(
    mut commands: Commands,
    mut director: ResMut<WaveDirector>,
    session: Res<GameSession>,
    selected: Res<SelectedDifficulty>,
    config: Res<GameConfig>,
    mut banners: MessageWriter<WaveBanner>,
) {
    let now = session.elapsed;
    let mut rng = rand::thread_rng();

    let queued = std::mem::take(&mut director.pending);
    let (due, keep): (Vec<_>, Vec<_>) = queued.into_iter().partition(|s| s.due <= now);
    director.pending = keep;

    for spawn in due {
        // Stale-event guard: the wave may have been reset between scheduling
        // and firing.
        if director.lifecycle != WaveLifecycle::Spawning {
            debug!("Dropped stale spawn event: {:?}", spawn.kind);
            continue;
        }

        match spawn.kind {
            SpawnKind::Enemy => {
                let pos = random_perimeter_position(&config, &mut rng);
                let archetype = random_archetype(selected.0, session.wave, &mut rng);
                spawn_enemy(
                    &mut commands,
                    pos,
                    session.wave,
                    selected.0,
                    archetype,
                    false,
                    &mut rng,
                );
                director.spawned_enemies += 1;
            }
            SpawnKind::Boss(tier) => {
                let pos = Vec2::new(0.0, config.arena_height / 2.0 + 100.0);
                spawn_boss(&mut commands, pos, session.wave, selected.0, tier, &mut rng);
                director.spawned_enemies += 1;
                banners.write(WaveBanner {
                    text: format!("BOSS: {}", tier.stats().name),
                });
            }
        }
    }

    if director.lifecycle == WaveLifecycle::Spawning
        && director.pending.is_empty()
        && director.spawned_enemies >= director.expected_enemies
    {
        director.lifecycle = WaveLifecycle::AwaitingCompletion;
    }
}

/// Detect wave completion and run the once-per-wave side effects.
///
/// The lifecycle freeze to `Intermission` happens before any side effect —
/// this ordering is what makes the effects exactly-once even if the check
/// runs again in the same tick.
#[allow(clippy::too_many_arguments)]
pub fn wave_completion_system(
    mut director: ResMut<WaveDirector>,
    mut session: ResMut<GameSession>,
    mut achievements: ResMut<AchievementLog>,
    selected: Res<SelectedDifficulty>,
    state: Res<State<GameState>>,
    config: Res<GameConfig>,
    vowels: Res<VowelTracker>,
    q_live: Query<(), (With<Enemy>, Without<Minion>)>,
    mut q_player: Query<&mut PlayerHealth, With<Player>>,
    mut sfx: MessageWriter<PlaySfx>,
    mut banners: MessageWriter<WaveBanner>,
) {
    if !director.wave_in_progress() {
        return;
    }
    if director.spawned_enemies < director.expected_enemies {
        return;
    }
    if !q_live.is_empty() {
        return;
    }

    // Freeze FIRST: everything below must run exactly once per wave even if
    // this system is re-invoked in the same tick.
    director.lifecycle = WaveLifecycle::Intermission;
    director.intermission_timer = config.wave_intermission;

    let wave = session.wave;
    let playing = *state.get() == GameState::Playing;

    achievements.check_value("wave_warrior", wave);
    achievements.check_value("wave_master", wave);
    if playing {
        achievements.check_milestone("survivor", wave, selected.0);
        achievements.check_milestone("champion", wave, selected.0);
        achievements.check_milestone("legendary", wave, selected.0);
    }

    let stats = session.wave_stats;
    let duration = session.elapsed - stats.start_time;
    let accuracy = if stats.shots_fired > 0 {
        stats.shots_hit as f32 / stats.shots_fired as f32
    } else {
        0.0
    };

    if let Ok(mut health) = q_player.single_mut() {
        if playing && health.hp == stats.start_health {
            achievements.check_flag("perfect_wave", true);
            session.perfect_waves += 1;
        }
        // Full heal between waves.
        health.hp = health.max_hp;
    }
    if accuracy >= 0.9 && stats.shots_fired > ACCURACY_MIN_SHOTS {
        achievements.check_flag("sharpshooter", true);
    }
    if duration < SPEED_WAVE_THRESHOLD && wave > 1 {
        achievements.check_flag("speed_demon", true);
        session.speed_waves += 1;
    }
    if !stats.used_dash && wave > 1 {
        session.survival_waves += 1;
    }

    sfx.write(PlaySfx::new(SfxKind::WaveComplete));
    let bonus = config.wave_clear_bonus * selected.0.profile().score_multiplier;
    if bonus > 0 {
        session.score += bonus;
        banners.write(WaveBanner {
            text: format!("Wave Complete! +{bonus}"),
        });
    } else {
        banners.write(WaveBanner {
            text: "Wave Complete!".to_string(),
        });
    }

    director.review_pending = playing && vowels.has_vowels();
    director.upgrade_pending = playing && wave % 3 == 0;

    info!("Wave {wave} complete in {duration:.1}s (accuracy {:.0}%)", accuracy * 100.0);
}

/// Count down the intermission (held open by a pending review or upgrade
/// draft) and start the next wave.
#[allow(clippy::too_many_arguments)]
pub fn intermission_system(
    time: Res<Time>,
    mut director: ResMut<WaveDirector>,
    mut session: ResMut<GameSession>,
    mut selected: ResMut<SelectedDifficulty>,
    event_mods: Res<ActiveEventModifiers>,
    mut tutorial: ResMut<TutorialState>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
    config: Res<GameConfig>,
    q_player: Query<&PlayerHealth, With<Player>>,
    mut banners: MessageWriter<WaveBanner>,
) {
    if director.lifecycle != WaveLifecycle::Intermission {
        return;
    }
    if director.review_pending || director.upgrade_pending {
        return;
    }

    director.intermission_timer -= time.delta_secs();
    if director.intermission_timer > 0.0 {
        return;
    }

    let in_tutorial = *state.get() == GameState::Tutorial;
    if in_tutorial && tutorial.advance() {
        // Final tutorial step finished: graduate to an Easy run.  The
        // Playing transition re-bootstraps the session and starts wave 1.
        selected.0 = Difficulty::Easy;
        next_state.set(GameState::Playing);
        return;
    }

    session.wave += 1;
    let now = session.elapsed;
    if let Ok(health) = q_player.single() {
        session.begin_wave_tracking(health.hp);
    }

    director.lifecycle = WaveLifecycle::Idle;
    director.start_wave(
        session.wave,
        selected.0,
        in_tutorial.then_some(tutorial.step),
        !in_tutorial,
        event_mods.0.boss_every_n_waves,
        now,
        &config,
    );
    banners.write(WaveBanner {
        text: format!("Wave {}", session.wave),
    });
}

/// `OnEnter(GameOver)`: drop queued spawns so nothing fires into a dead run.
pub fn clear_pending_on_game_over(mut director: ResMut<WaveDirector>) {
    director.reset();
}
