//! Player systems: components, input intent, movement/dash, and firing.

pub mod combat;
pub mod control;
pub mod state;

pub use state::{Bullet, Dash, Movement, Player, PlayerHealth, PlayerIntent, Trail, Weapon};

use bevy::prelude::*;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        // spawn_player / despawn_player are scheduled by `SimulationPlugin`
        // alongside the rest of the enter/exit ordering.
        app.init_resource::<PlayerIntent>().add_systems(
            Update,
            control::gather_player_intent.run_if(crate::menu::simulation_active),
        );
    }
}
