//! Per-run session state: score, kills, combo, wave tracking, and the
//! start-of-run / end-of-run flows that tie the simulation to the
//! progression aggregators.
//!
//! ## Lifecycle
//!
//! * `OnEnter(Playing | Tutorial)`: [`bootstrap_session`] resets
//!   [`GameSession`], composes the four aggregator bundles into
//!   [`SessionBonuses`], and refreshes [`ActiveEventModifiers`]
//!   (`SimulationPlugin` chains it after the entity cleanup).
//! * every tick: [`tick_session_clock`] advances the session clock and
//!   [`combo_decay_system`] expires stale combos.
//! * `OnEnter(GameOver)`: [`finalize_run`] produces the end-of-run stats
//!   bundle, feeds challenges and battle-pass XP, and submits a qualifying
//!   score to the leaderboard.

use crate::achievements::AchievementLog;
use crate::audio::{PlaySfx, SfxKind};
use crate::battlepass::BattlePass;
use crate::challenges::{DailyChallenges, EventModifiers};
use crate::clans::ClanMembership;
use crate::config::GameConfig;
use crate::menu::{GameState, SelectedDifficulty};
use crate::rewards::RewardBundle;
use crate::storage;
use crate::vowels::VowelTracker;
use bevy::prelude::*;

// ── Resources ─────────────────────────────────────────────────────────────────

/// Snapshot of per-wave tracking values, reset at each wave start and read at
/// wave end to derive achievement / challenge signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaveStats {
    /// Player health when the wave began (perfect-wave detection).
    pub start_health: f32,
    /// Session-clock time when the wave began (speed-wave detection).
    pub start_time: f32,
    pub shots_fired: u32,
    pub shots_hit: u32,
    pub used_dash: bool,
}

/// The authoritative mutable state for one playthrough.
#[derive(Resource, Debug, Clone)]
pub struct GameSession {
    /// Current wave number; increments only at confirmed wave completion.
    pub wave: u32,
    pub score: u32,
    pub kills: u32,
    /// Consecutive-kill streak; decays after [`GameConfig::combo_decay_window`].
    pub combo: u32,
    pub max_combo: u32,
    /// Session-clock time of the most recent kill; `None` = no active combo.
    pub last_kill_at: Option<f32>,
    /// Monotonic session clock (seconds); advances only while simulating.
    pub elapsed: f32,
    pub wave_stats: WaveStats,
    // Cumulative per-run counters consumed by challenges / battle pass.
    pub boss_kills: u32,
    pub learning_screens: u32,
    pub speed_waves: u32,
    pub survival_waves: u32,
    pub perfect_waves: u32,
    pub total_shots_fired: u32,
    pub total_shots_hit: u32,
}

impl Default for GameSession {
    fn default() -> Self {
        Self {
            wave: 1,
            score: 0,
            kills: 0,
            combo: 0,
            max_combo: 0,
            last_kill_at: None,
            elapsed: 0.0,
            wave_stats: WaveStats::default(),
            boss_kills: 0,
            learning_screens: 0,
            speed_waves: 0,
            survival_waves: 0,
            perfect_waves: 0,
            total_shots_fired: 0,
            total_shots_hit: 0,
        }
    }
}

impl GameSession {
    /// Score multiplier contributed by the current combo:
    /// `1 + (combo - 1) * step`, 1.0 when no combo is active.
    pub fn combo_multiplier(&self, step: f32) -> f32 {
        if self.combo == 0 {
            1.0
        } else {
            1.0 + (self.combo - 1) as f32 * step
        }
    }

    /// Register a kill for combo purposes: extend the streak and reset the
    /// decay deadline.
    pub fn bump_combo(&mut self) {
        self.combo += 1;
        self.last_kill_at = Some(self.elapsed);
        if self.combo > self.max_combo {
            self.max_combo = self.combo;
        }
    }

    /// Begin per-wave tracking with the player's current health.
    pub fn begin_wave_tracking(&mut self, player_health: f32) {
        self.wave_stats = WaveStats {
            start_health: player_health,
            start_time: self.elapsed,
            shots_fired: 0,
            shots_hit: 0,
            used_dash: false,
        };
    }

    /// Shot accuracy across the whole run, 0.0 when nothing was fired.
    pub fn run_accuracy(&self) -> f32 {
        if self.total_shots_fired == 0 {
            0.0
        } else {
            self.total_shots_hit as f32 / self.total_shots_fired as f32
        }
    }
}

/// The four aggregator bundles composed once at session start.
///
/// Kills consult only `score_multiplier` and `boss_damage_multiplier` from
/// here; everything else was already applied to player stat initialization.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SessionBonuses(pub RewardBundle);

/// Wall-clock special-event modifiers, refreshed at session and wave start.
#[derive(Resource, Debug, Clone, Copy)]
pub struct ActiveEventModifiers(pub EventModifiers);

impl Default for ActiveEventModifiers {
    fn default() -> Self {
        Self(EventModifiers::default())
    }
}

/// End-of-run stats bundle handed to the progression collaborators.
#[derive(Debug, Clone, Copy)]
pub struct GameStats {
    pub score: u32,
    pub wave: u32,
    pub kills: u32,
    pub boss_kills: u32,
    pub max_combo: u32,
    pub learning_screens: u32,
    pub speed_waves: u32,
    pub survival_waves: u32,
    pub perfect_waves: u32,
    pub accuracy: f32,
}

/// Written when player health reaches zero; drives the GameOver transition.
#[derive(Message, Debug, Clone, Copy)]
pub struct PlayerDied;

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        // bootstrap_session / finalize_run are scheduled by
        // `SimulationPlugin`, which owns all enter/exit ordering.
        app.init_resource::<GameSession>()
            .init_resource::<SessionBonuses>()
            .init_resource::<ActiveEventModifiers>()
            .init_resource::<VowelTracker>()
            .add_message::<PlayerDied>()
            .add_systems(Update, game_over_transition_system);
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Advance the session clock. Runs first in the simulation chain.
pub fn tick_session_clock(time: Res<Time>, mut session: ResMut<GameSession>) {
    session.elapsed += time.delta_secs();
}

/// Reset the session and compose the aggregator bundles for a fresh run.
pub fn bootstrap_session(
    mut session: ResMut<GameSession>,
    mut bonuses: ResMut<SessionBonuses>,
    mut event_mods: ResMut<ActiveEventModifiers>,
    mut vowels: ResMut<VowelTracker>,
    achievements: Res<AchievementLog>,
    challenges: Res<DailyChallenges>,
    battlepass: Res<BattlePass>,
    clan: Res<ClanMembership>,
) {
    *session = GameSession::default();
    vowels.reset();

    let composed = achievements
        .active_rewards()
        .compose(&challenges.active_buffs(storage::unix_now()))
        .compose(&battlepass.active_boosts(storage::unix_now()))
        .compose(&clan.clan_bonuses());
    bonuses.0 = composed;
    event_mods.0 = challenges.event_modifiers_now();

    info!(
        "Session start: damage x{:.2}, health +{:.0}, score x{:.2}",
        composed.damage_multiplier, composed.health_bonus, composed.score_multiplier
    );
}

/// Expire the combo when no kill landed within the decay window.
///
/// The window is scaled by the active combo event modifier, matching the
/// per-tick check the original performed.
pub fn combo_decay_system(
    config: Res<GameConfig>,
    event_mods: Res<ActiveEventModifiers>,
    mut session: ResMut<GameSession>,
) {
    let Some(last_kill) = session.last_kill_at else {
        return;
    };
    if session.combo == 0 {
        return;
    }

    let window = config.combo_decay_window * event_mods.0.combo_decay_multiplier;
    if session.elapsed - last_kill >= window {
        debug!("Combo ended at {}x", session.combo);
        session.combo = 0;
        session.last_kill_at = None;
    }
}

/// Transition to GameOver exactly once when a death message arrives.
///
/// The message may be written by several damage sites in one tick; setting
/// `NextState` repeatedly is idempotent and `OnEnter(GameOver)` side effects
/// run once.
pub fn game_over_transition_system(
    mut deaths: MessageReader<PlayerDied>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
    mut sfx: MessageWriter<PlaySfx>,
) {
    if deaths.read().next().is_none() {
        return;
    }
    if matches!(state.get(), GameState::Playing | GameState::Tutorial) {
        sfx.write(PlaySfx::new(SfxKind::GameOver));
        next_state.set(GameState::GameOver);
    }
}

/// End-of-run bookkeeping: feed the progression systems and the leaderboard.
pub fn finalize_run(
    session: Res<GameSession>,
    selected: Res<SelectedDifficulty>,
    mut challenges: ResMut<DailyChallenges>,
    mut battlepass: ResMut<BattlePass>,
    mut clan: ResMut<ClanMembership>,
    mut leaderboard: ResMut<crate::leaderboard::Leaderboard>,
    config: Res<GameConfig>,
) {
    let stats = GameStats {
        score: session.score,
        wave: session.wave,
        kills: session.kills,
        boss_kills: session.boss_kills,
        max_combo: session.max_combo,
        learning_screens: session.learning_screens,
        speed_waves: session.speed_waves,
        survival_waves: session.survival_waves,
        perfect_waves: session.perfect_waves,
        accuracy: session.run_accuracy(),
    };

    challenges.track_game_session(&stats, storage::unix_now());

    let base_xp = BattlePass::xp_from_game(&stats);
    let clan_xp_mult = 1.0 + clan.xp_percent_bonus() / 100.0;
    let result = battlepass.add_xp((base_xp as f32 * clan_xp_mult) as u32, storage::unix_now());
    if !result.tier_ups.is_empty() {
        info!(
            "Battle pass: +{} XP, reached tier {}",
            result.xp_gained,
            result.tier_ups.last().copied().unwrap_or_default()
        );
    }

    clan.contribute(&stats);

    if leaderboard.would_place(stats.score) {
        leaderboard.submit(
            &config.player_name,
            stats.score,
            stats.wave,
            stats.kills,
            stats.max_combo,
            selected.0,
            storage::unix_now(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combo_multiplier_scales_from_one() {
        let mut session = GameSession::default();
        assert_eq!(session.combo_multiplier(0.1), 1.0);

        session.bump_combo();
        assert_eq!(session.combo_multiplier(0.1), 1.0);

        session.bump_combo();
        session.bump_combo();
        // combo == 3 → 1 + 2 * 0.1
        assert!((session.combo_multiplier(0.1) - 1.2).abs() < 1e-6);
    }

    #[test]
    fn combo_decays_only_past_the_window() {
        let mut world = World::new();
        world.insert_resource(GameConfig::default());
        world.insert_resource(ActiveEventModifiers::default());

        let mut session = GameSession::default();
        session.elapsed = 10.0;
        session.bump_combo();
        session.bump_combo();
        world.insert_resource(session);

        let mut schedule = Schedule::default();
        schedule.add_systems(combo_decay_system);

        // Inside the window: combo survives.
        world.resource_mut::<GameSession>().elapsed = 11.5;
        schedule.run(&mut world);
        assert_eq!(world.resource::<GameSession>().combo, 2);

        // Past the window: combo resets to zero.
        world.resource_mut::<GameSession>().elapsed = 12.1;
        schedule.run(&mut world);
        let session = world.resource::<GameSession>();
        assert_eq!(session.combo, 0);
        assert!(session.last_kill_at.is_none());
        // Max combo is retained for the run stats.
        assert_eq!(session.max_combo, 2);
    }

    #[test]
    fn kills_inside_the_window_stack_monotonically() {
        let mut session = GameSession::default();
        for i in 0..5 {
            session.elapsed = i as f32 * 0.5;
            session.bump_combo();
        }
        assert_eq!(session.combo, 5);
        assert_eq!(session.max_combo, 5);
    }

    #[test]
    fn wave_tracking_snapshot_resets() {
        let mut session = GameSession::default();
        session.wave_stats.shots_fired = 9;
        session.wave_stats.used_dash = true;
        session.elapsed = 42.0;

        session.begin_wave_tracking(87.0);
        assert_eq!(session.wave_stats.shots_fired, 0);
        assert!(!session.wave_stats.used_dash);
        assert_eq!(session.wave_stats.start_health, 87.0);
        assert_eq!(session.wave_stats.start_time, 42.0);
    }
}
