//! Headless unit tests for the [`GameState`] state machine.
//!
//! These tests use [`MinimalPlugins`] — no window, no rendering — so they
//! run fast and deterministically in CI.
//!
//! Covered scenarios:
//! 1. Default initial state is `StartScreen`.
//! 2. A `NextState` request transitions `StartScreen` → `Playing`.
//! 3. `Playing` persists across frames with no new transition request.
//! 4. `insert_state` can force-start directly in `Playing`.
//! 5. `Playing` → `GameOver` → `StartScreen` round trip.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use vowel_hunter::menu::GameState;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a minimal headless app with just the state registered via
/// `init_state`.  `StatesPlugin` adds the `StateTransition` schedule.
fn app_with_default_state() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.init_state::<GameState>();
    app
}

fn app_with_state(state: GameState) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.insert_state(state);
    app
}

fn current_state(app: &App) -> GameState {
    app.world().resource::<State<GameState>>().get().clone()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn default_state_is_start_screen() {
    let mut app = app_with_default_state();
    app.update(); // run one frame so StateTransition fires
    assert_eq!(
        current_state(&app),
        GameState::StartScreen,
        "initial state must be StartScreen"
    );
}

#[test]
fn transition_start_screen_to_playing() {
    let mut app = app_with_default_state();
    app.update(); // settle into StartScreen

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Playing);
    app.update(); // StateTransition fires; state becomes Playing

    assert_eq!(current_state(&app), GameState::Playing);
}

#[test]
fn playing_state_persists_across_frames() {
    let mut app = app_with_default_state();
    app.update();

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Playing);
    app.update();

    for _ in 0..5 {
        app.update();
    }

    assert_eq!(
        current_state(&app),
        GameState::Playing,
        "Playing must remain stable without a new transition"
    );
}

#[test]
fn insert_state_starts_in_playing() {
    let mut app = app_with_state(GameState::Playing);
    app.update();
    assert_eq!(current_state(&app), GameState::Playing);
}

#[test]
fn game_over_round_trip_back_to_menu() {
    let mut app = app_with_state(GameState::Playing);
    app.update();

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::GameOver);
    app.update();
    assert_eq!(current_state(&app), GameState::GameOver);

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::StartScreen);
    app.update();
    assert_eq!(current_state(&app), GameState::StartScreen);
}

#[test]
fn tutorial_is_reachable_from_start_screen() {
    let mut app = app_with_default_state();
    app.update();

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Tutorial);
    app.update();
    assert_eq!(current_state(&app), GameState::Tutorial);
}
