//! Top-level `GameState` definition plus the start and game-over screens.
//!
//! ## States
//!
//! | State         | Description                                    |
//! |---------------|------------------------------------------------|
//! | `StartScreen` | Initial state; difficulty select shown         |
//! | `Tutorial`    | Guided intro; simulation runs with easy stats  |
//! | `Playing`     | Active run; all game systems active            |
//! | `GameOver`    | Run ended; final stats + leaderboard shown     |
//!
//! Every simulation system runs under `.run_if(simulation_active)`, so the
//! whole core is inert on the menu and game-over screens.

use crate::difficulty::Difficulty;
use crate::leaderboard::Leaderboard;
use crate::session::GameSession;
use bevy::prelude::*;

// ── Game state ────────────────────────────────────────────────────────────────

/// Top-level application state machine.
#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    /// Difficulty-select splash; shown on startup.
    #[default]
    StartScreen,
    /// Scripted introduction on the Tutorial difficulty.
    Tutorial,
    /// Active gameplay.
    Playing,
    /// Player health reached zero; terminal for the session.
    GameOver,
}

/// Run condition: true while the simulation should advance.
pub fn simulation_active(state: Res<State<GameState>>) -> bool {
    matches!(state.get(), GameState::Playing | GameState::Tutorial)
}

/// Difficulty chosen on the start screen; read by the session bootstrap.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SelectedDifficulty(pub Difficulty);

// ── Component markers ─────────────────────────────────────────────────────────

/// Root node of the start-screen UI; despawned on `OnExit(StartScreen)`.
#[derive(Component)]
pub struct StartScreenRoot;

/// Tags a difficulty-select button with its target difficulty.
#[derive(Component, Clone, Copy)]
pub struct DifficultyButton(pub Difficulty);

/// Root node of the game-over UI.
#[derive(Component)]
pub struct GameOverRoot;

/// Tags the "Play Again" button.
#[derive(Component)]
pub struct PlayAgainButton;

/// Tags the "Main Menu" button.
#[derive(Component)]
pub struct MainMenuButton;

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Registers `GameState`, both overlay screens, and their button handlers.
///
/// Must be added before any plugin that calls
/// `.run_if(in_state(GameState::...))` so the state is registered first.
pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .init_resource::<SelectedDifficulty>()
            .add_systems(OnEnter(GameState::StartScreen), setup_start_screen)
            .add_systems(OnExit(GameState::StartScreen), cleanup_start_screen)
            .add_systems(OnEnter(GameState::GameOver), setup_game_over_screen)
            .add_systems(OnExit(GameState::GameOver), cleanup_game_over_screen)
            .add_systems(
                Update,
                difficulty_button_system.run_if(in_state(GameState::StartScreen)),
            )
            .add_systems(
                Update,
                game_over_button_system.run_if(in_state(GameState::GameOver)),
            );
    }
}

// ── Colour helpers ────────────────────────────────────────────────────────────

fn button_bg(difficulty: Difficulty) -> Color {
    match difficulty {
        Difficulty::Tutorial => Color::srgb(0.10, 0.24, 0.38),
        Difficulty::Easy => Color::srgb(0.08, 0.36, 0.14),
        Difficulty::Normal => Color::srgb(0.40, 0.28, 0.05),
        Difficulty::Hard => Color::srgb(0.28, 0.06, 0.06),
    }
}

fn title_color() -> Color {
    Color::srgb(0.95, 0.88, 0.45)
}
fn subtitle_color() -> Color {
    Color::srgb(0.55, 0.55, 0.65)
}
fn stat_color() -> Color {
    Color::srgb(0.75, 0.85, 0.95)
}

// ── OnEnter(StartScreen): spawn UI ────────────────────────────────────────────

/// Spawn the full-screen difficulty-select overlay.
pub fn setup_start_screen(mut commands: Commands) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(Color::srgb(0.02, 0.02, 0.08)),
            StartScreenRoot,
        ))
        .with_children(|root| {
            root.spawn((
                Text::new("VOWEL HUNTER"),
                TextFont {
                    font_size: 56.0,
                    ..default()
                },
                TextColor(title_color()),
            ));

            spacer(root, 10.0);

            root.spawn((
                Text::new("Survive the waves. Learn your vowels."),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(subtitle_color()),
            ));

            spacer(root, 40.0);

            for difficulty in [
                Difficulty::Tutorial,
                Difficulty::Easy,
                Difficulty::Normal,
                Difficulty::Hard,
            ] {
                root.spawn((
                    Button,
                    Node {
                        width: Val::Px(220.0),
                        height: Val::Px(48.0),
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        border: UiRect::all(Val::Px(2.0)),
                        margin: UiRect::bottom(Val::Px(12.0)),
                        ..default()
                    },
                    BackgroundColor(button_bg(difficulty)),
                    BorderColor::all(Color::srgb(0.6, 0.6, 0.7)),
                    DifficultyButton(difficulty),
                ))
                .with_children(|btn| {
                    btn.spawn((
                        Text::new(difficulty.label()),
                        TextFont {
                            font_size: 18.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                    ));
                });
            }
        });
}

/// Spawn a fixed-height invisible spacer node.
fn spacer(parent: &mut ChildSpawnerCommands<'_>, px: f32) {
    parent.spawn(Node {
        height: Val::Px(px),
        ..default()
    });
}

pub fn cleanup_start_screen(mut commands: Commands, query: Query<Entity, With<StartScreenRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

// ── Update (StartScreen only): difficulty buttons ─────────────────────────────

/// Handle difficulty-select presses: record the choice and enter gameplay.
pub fn difficulty_button_system(
    query: Query<(&Interaction, &DifficultyButton), Changed<Interaction>>,
    mut selected: ResMut<SelectedDifficulty>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for (interaction, button) in query.iter() {
        if *interaction != Interaction::Pressed {
            continue;
        }
        selected.0 = button.0;
        if button.0 == Difficulty::Tutorial {
            next_state.set(GameState::Tutorial);
        } else {
            next_state.set(GameState::Playing);
        }
    }
}

// ── Game-over screen ──────────────────────────────────────────────────────────

/// Spawn the game-over overlay: final stats, top scores, and restart buttons.
pub fn setup_game_over_screen(
    mut commands: Commands,
    session: Res<GameSession>,
    selected: Res<SelectedDifficulty>,
    leaderboard: Res<Leaderboard>,
) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.85)),
            GameOverRoot,
        ))
        .with_children(|root| {
            root.spawn((
                Text::new("GAME OVER"),
                TextFont {
                    font_size: 48.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.25, 0.25)),
            ));

            spacer(root, 16.0);

            root.spawn((
                Text::new(format!(
                    "{}  ·  Wave {}  ·  {} kills  ·  {}x combo  ·  {} points",
                    selected.0.label(),
                    session.wave,
                    session.kills,
                    session.max_combo,
                    session.score
                )),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(stat_color()),
            ));

            spacer(root, 24.0);

            root.spawn((
                Text::new("TOP SCORES"),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(title_color()),
            ));

            for (rank, entry) in leaderboard.entries().iter().enumerate() {
                root.spawn((
                    Text::new(format!(
                        "#{}  {}  {}  (wave {}, {})",
                        rank + 1,
                        entry.name,
                        entry.score,
                        entry.wave,
                        entry.difficulty.label()
                    )),
                    TextFont {
                        font_size: 16.0,
                        ..default()
                    },
                    TextColor(subtitle_color()),
                ));
            }

            spacer(root, 24.0);

            root.spawn((
                Button,
                Node {
                    width: Val::Px(220.0),
                    height: Val::Px(48.0),
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    border: UiRect::all(Val::Px(2.0)),
                    margin: UiRect::bottom(Val::Px(12.0)),
                    ..default()
                },
                BackgroundColor(Color::srgb(0.08, 0.36, 0.14)),
                BorderColor::all(Color::srgb(0.18, 0.72, 0.28)),
                PlayAgainButton,
            ))
            .with_children(|btn| {
                btn.spawn((
                    Text::new("PLAY AGAIN"),
                    TextFont {
                        font_size: 18.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                ));
            });

            root.spawn((
                Button,
                Node {
                    width: Val::Px(220.0),
                    height: Val::Px(48.0),
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    border: UiRect::all(Val::Px(2.0)),
                    ..default()
                },
                BackgroundColor(Color::srgb(0.15, 0.15, 0.25)),
                BorderColor::all(Color::srgb(0.4, 0.4, 0.55)),
                MainMenuButton,
            ))
            .with_children(|btn| {
                btn.spawn((
                    Text::new("MAIN MENU"),
                    TextFont {
                        font_size: 18.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                ));
            });
        });
}

pub fn cleanup_game_over_screen(mut commands: Commands, query: Query<Entity, With<GameOverRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

/// Handle restart / menu presses on the game-over screen.
pub fn game_over_button_system(
    play_again: Query<&Interaction, (Changed<Interaction>, With<PlayAgainButton>)>,
    main_menu: Query<&Interaction, (Changed<Interaction>, With<MainMenuButton>)>,
    selected: Res<SelectedDifficulty>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for interaction in play_again.iter() {
        if *interaction == Interaction::Pressed {
            // Restart with the same difficulty.
            if selected.0 == Difficulty::Tutorial {
                next_state.set(GameState::Tutorial);
            } else {
                next_state.set(GameState::Playing);
            }
        }
    }
    for interaction in main_menu.iter() {
        if *interaction == Interaction::Pressed {
            next_state.set(GameState::StartScreen);
        }
    }
}
