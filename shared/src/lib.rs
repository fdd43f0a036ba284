//! Shared game logic for the Tidebreak arena.
//!
//! Everything the server and client must agree on lives here: replicated
//! components, the network protocol, the deterministic arena layout, and the
//! pure beam math (geometry, falloff, aim validation) that the server drives
//! authoritatively and the client reuses for previews.

pub mod arena;
pub mod components;
pub mod dummy;
pub mod movement;
pub mod obstacles;
pub mod player;
pub mod protocol;
pub mod stream;

pub use components::*;
pub use dummy::{dummy_max_health, DUMMY_HEIGHT, DUMMY_RADIUS, DUMMY_REBUILD_TIME};
pub use movement::apply_movement;
pub use obstacles::{Blocker, BlockerGrid};
pub use player::{PLAYER_HEIGHT, PLAYER_RADIUS, PLAYER_SPEED};
pub use protocol::{
    tick_duration, CancelStreamRequest, CastFailReason, CastFailed, CastStreamRequest,
    DamageReceived, InputChannel, PlayerInput, ProtocolPlugin, ReliableChannel, StreamHit,
    FIXED_TIMESTEP_HZ, PRIVATE_KEY, PROTOCOL_ID, SERVER_ADDR, SERVER_PORT,
};
pub use stream::{StreamStats, StreamType};
