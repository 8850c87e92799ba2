//! Camera setup.

use bevy::prelude::*;

/// Spawn the 2D camera looking at the arena origin.
pub fn setup_camera(mut commands: Commands) {
    // Default Camera2d with default scale shows roughly the full window area
    commands.spawn(Camera2d);
}
