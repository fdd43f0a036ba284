//! Game state machine

use bevy::prelude::*;

/// Main game states. No menu: the client connects on launch and retries
/// from `Connecting` whenever the link drops.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    #[default]
    Connecting,
    Playing,
}
