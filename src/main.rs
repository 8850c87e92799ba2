use bevy::prelude::*;
use bevy::window::WindowResolution;

use vowel_hunter::achievements::AchievementLog;
use vowel_hunter::audio::AudioPlugin;
use vowel_hunter::battlepass::BattlePass;
use vowel_hunter::challenges::DailyChallenges;
use vowel_hunter::clans::ClanMembership;
use vowel_hunter::config::{self, GameConfig};
use vowel_hunter::graphics;
use vowel_hunter::hud::HudPlugin;
use vowel_hunter::leaderboard::Leaderboard;
use vowel_hunter::menu::MenuPlugin;
use vowel_hunter::particles::ParticlesPlugin;
use vowel_hunter::player::PlayerPlugin;
use vowel_hunter::powerup::ActiveEffects;
use vowel_hunter::session::SessionPlugin;
use vowel_hunter::shapes::ShapesPlugin;
use vowel_hunter::simulation::SimulationPlugin;
use vowel_hunter::storage;
use vowel_hunter::tutorial::TutorialPlugin;
use vowel_hunter::upgrades::UpgradePlugin;
use vowel_hunter::wave::{WaveBanner, WaveDirector};

fn main() {
    let now = storage::unix_now();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Vowel Hunter".into(),
                resolution: WindowResolution::new(1280, 720),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.04, 0.02, 0.10)))
        // Compiled defaults first; load_game_config overwrites them from
        // assets/game.toml (if present) in the Startup schedule.
        .insert_resource(GameConfig::default())
        // Persistent progression state, restored from saves/.
        .insert_resource(AchievementLog::load())
        .insert_resource(DailyChallenges::load(now))
        .insert_resource(BattlePass::load(now))
        .insert_resource(ClanMembership::load())
        .insert_resource(Leaderboard::load())
        .init_resource::<ActiveEffects>()
        .init_resource::<WaveDirector>()
        .add_message::<WaveBanner>()
        .add_plugins(MenuPlugin)
        .add_plugins((
            SessionPlugin,
            PlayerPlugin,
            SimulationPlugin,
            UpgradePlugin,
            TutorialPlugin,
            ParticlesPlugin,
            ShapesPlugin,
            HudPlugin,
            AudioPlugin,
        ))
        .add_systems(
            Startup,
            (
                // Load config first so every other startup system sees the
                // final values.
                config::load_game_config,
                graphics::setup_camera.after(config::load_game_config),
            ),
        )
        .run();
}
