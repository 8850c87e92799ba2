//! In-game HUD: health / wave / score / combo readouts, the dash meter, and
//! the fading banner line used for wave announcements, achievement unlocks,
//! and upgrade prompts.

use crate::achievements::AchievementLog;
use crate::menu::{simulation_active, GameState};
use crate::player::{Dash, Player, PlayerHealth};
use crate::session::GameSession;
use crate::wave::WaveBanner;
use bevy::prelude::*;

/// How long a banner stays on screen (s).
const BANNER_HOLD: f32 = 2.0;

// ── Markers & resources ───────────────────────────────────────────────────────

#[derive(Component)]
pub struct HudRoot;

#[derive(Component)]
pub struct HealthText;

#[derive(Component)]
pub struct WaveText;

#[derive(Component)]
pub struct ScoreText;

#[derive(Component)]
pub struct ComboText;

#[derive(Component)]
pub struct DashText;

#[derive(Component)]
pub struct BannerText;

/// Remaining display time for the current banner.
#[derive(Resource, Default)]
pub struct BannerTimer(pub f32);

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BannerTimer>()
            .add_systems(OnEnter(GameState::Playing), setup_hud)
            .add_systems(OnEnter(GameState::Tutorial), setup_hud)
            .add_systems(OnExit(GameState::Playing), cleanup_hud)
            .add_systems(OnExit(GameState::Tutorial), cleanup_hud)
            .add_systems(
                Update,
                (update_hud_system, banner_system).run_if(simulation_active),
            );
    }
}

// ── Setup / teardown ──────────────────────────────────────────────────────────

fn setup_hud(mut commands: Commands, existing: Query<Entity, With<HudRoot>>) {
    // Tutorial → Playing re-entry can race the exit cleanup.
    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::SpaceBetween,
                padding: UiRect::all(Val::Px(12.0)),
                ..default()
            },
            HudRoot,
        ))
        .with_children(|root| {
            root.spawn(Node {
                flex_direction: FlexDirection::Row,
                column_gap: Val::Px(24.0),
                ..default()
            })
            .with_children(|row| {
                let readout = |size| TextFont {
                    font_size: size,
                    ..default()
                };
                row.spawn((
                    Text::new("HP"),
                    readout(20.0),
                    TextColor(Color::srgb(0.9, 0.35, 0.35)),
                    HealthText,
                ));
                row.spawn((
                    Text::new("Wave 1"),
                    readout(20.0),
                    TextColor(Color::srgb(0.75, 0.85, 0.95)),
                    WaveText,
                ));
                row.spawn((
                    Text::new("Score 0"),
                    readout(20.0),
                    TextColor(Color::srgb(0.95, 0.88, 0.45)),
                    ScoreText,
                ));
                row.spawn((
                    Text::new(""),
                    readout(20.0),
                    TextColor(Color::srgb(1.0, 0.6, 0.1)),
                    ComboText,
                ));
            });

            root.spawn((
                Text::new(""),
                TextFont {
                    font_size: 30.0,
                    ..default()
                },
                TextColor(Color::srgb(0.95, 0.88, 0.45)),
                Node {
                    align_self: AlignSelf::Center,
                    ..default()
                },
                BannerText,
            ));

            root.spawn((
                Text::new("DASH READY"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.29, 0.56, 0.89)),
                DashText,
            ));
        });
}

fn cleanup_hud(mut commands: Commands, query: Query<Entity, With<HudRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

// ── Update ────────────────────────────────────────────────────────────────────

/// Refresh the stat readouts from the session and player state.
#[allow(clippy::type_complexity)]
pub fn update_hud_system(
    session: Res<GameSession>,
    q_player: Query<(&PlayerHealth, &Dash), With<Player>>,
    mut texts: ParamSet<(
        Query<&mut Text, With<HealthText>>,
        Query<&mut Text, With<WaveText>>,
        Query<&mut Text, With<ScoreText>>,
        Query<&mut Text, With<ComboText>>,
        Query<&mut Text, With<DashText>>,
    )>,
) {
    let Ok((health, dash)) = q_player.single() else {
        return;
    };

    if let Ok(mut text) = texts.p0().single_mut() {
        *text = Text::new(format!(
            "HP {} / {}",
            health.hp.max(0.0).floor() as i32,
            health.max_hp as i32
        ));
    }
    if let Ok(mut text) = texts.p1().single_mut() {
        *text = Text::new(format!("Wave {}", session.wave));
    }
    if let Ok(mut text) = texts.p2().single_mut() {
        *text = Text::new(format!("Score {}   Kills {}", session.score, session.kills));
    }
    if let Ok(mut text) = texts.p3().single_mut() {
        *text = Text::new(if session.combo >= 2 {
            format!("{}x COMBO", session.combo)
        } else {
            String::new()
        });
    }
    if let Ok(mut text) = texts.p4().single_mut() {
        *text = Text::new(if dash.is_ready() {
            "DASH READY".to_string()
        } else if dash.is_dashing() {
            "DASHING".to_string()
        } else {
            format!("DASH {:.1}s", dash.cooldown)
        });
    }
}

/// Show the newest banner message and fade it out after a short hold.
pub fn banner_system(
    time: Res<Time>,
    mut banners: MessageReader<WaveBanner>,
    mut achievements: ResMut<AchievementLog>,
    mut timer: ResMut<BannerTimer>,
    mut q_banner: Query<&mut Text, With<BannerText>>,
) {
    let Ok(mut text) = q_banner.single_mut() else {
        return;
    };

    // Achievement unlocks share the banner line.
    for id in achievements.take_notifications() {
        *text = Text::new(format!("Achievement unlocked: {id}"));
        timer.0 = BANNER_HOLD;
    }

    for banner in banners.read() {
        *text = Text::new(banner.text.clone());
        timer.0 = BANNER_HOLD;
    }

    if timer.0 > 0.0 {
        timer.0 -= time.delta_secs();
        if timer.0 <= 0.0 {
            *text = Text::new("");
        }
    }
}
