//! Fire-and-forget sound-effect signalling.
//!
//! Gameplay systems announce audible moments by writing a [`PlaySfx`]
//! message; nothing waits on the result.  There is no audio backend here —
//! the sink drains the channel and logs at debug level, and a playback layer
//! can subscribe to the same messages without touching gameplay code.

use bevy::prelude::*;

/// Which effect to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SfxKind {
    Shoot,
    EnemyHit,
    EnemyDeath,
    PlayerHurt,
    Dash,
    ScorePoint,
    WaveComplete,
    PowerUp,
    Upgrade,
    Teleport,
    GameOver,
}

/// Request to play one sound effect.
#[derive(Message, Debug, Clone, Copy)]
pub struct PlaySfx {
    pub kind: SfxKind,
}

impl PlaySfx {
    pub fn new(kind: SfxKind) -> Self {
        Self { kind }
    }
}

pub struct AudioPlugin;

impl Plugin for AudioPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<PlaySfx>()
            .add_systems(Update, drain_sfx_messages);
    }
}

/// Drain pending effects so the channel never accumulates unbounded.
fn drain_sfx_messages(mut sfx: MessageReader<PlaySfx>) {
    for message in sfx.read() {
        debug!("sfx: {:?}", message.kind);
    }
}
