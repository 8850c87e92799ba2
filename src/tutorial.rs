//! Scripted five-step tutorial.
//!
//! The tutorial runs the normal simulation on the Tutorial difficulty with
//! single-enemy waves.  Each cleared wave advances one step; after the last
//! step the session graduates into a fresh Easy run.

use crate::menu::GameState;
use crate::wave::WaveBanner;
use bevy::prelude::*;

/// The guidance text shown at each step.
pub fn steps() -> &'static [&'static str] {
    &[
        "Welcome, Hunter! Use WASD or the arrow keys to move.",
        "Move the mouse to aim, and click to fire at the alien!",
        "The most important skill: press SPACE to dash. You are untouchable while dashing!",
        "Aliens can't hurt you mid-dash. Use it to escape when surrounded. Clear this wave!",
        "You're ready! Watch your health, mind the dash cooldown, and good luck, Hunter!",
    ]
}

/// Current tutorial progress.
#[derive(Resource, Debug, Default)]
pub struct TutorialState {
    /// 0-based index into [`steps`].
    pub step: u32,
}

impl TutorialState {
    /// Move to the next step.  Returns `true` when the final step was just
    /// completed (the caller graduates the player out of the tutorial).
    pub fn advance(&mut self) -> bool {
        self.step += 1;
        if self.step as usize >= steps().len() {
            self.step = 0;
            return true;
        }
        false
    }

    pub fn current_text(&self) -> &'static str {
        steps()
            .get(self.step as usize)
            .copied()
            .unwrap_or_default()
    }
}

pub struct TutorialPlugin;

impl Plugin for TutorialPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TutorialState>()
            .add_systems(OnEnter(GameState::Tutorial), reset_tutorial)
            .add_systems(
                Update,
                tutorial_banner_system.run_if(in_state(GameState::Tutorial)),
            );
    }
}

fn reset_tutorial(mut tutorial: ResMut<TutorialState>) {
    tutorial.step = 0;
}

/// Surface the current step's guidance whenever the step changes.
fn tutorial_banner_system(tutorial: Res<TutorialState>, mut banners: MessageWriter<WaveBanner>) {
    if tutorial.is_changed() {
        banners.write(WaveBanner {
            text: tutorial.current_text().to_string(),
        });
    }
}
