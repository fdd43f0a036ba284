//! Lightyear network protocol definition
//!
//! One-way authority: clients send inputs and cast requests, the server
//! replicates world state and pushes combat feedback. Built for Lightyear
//! 0.25's merged entity model.

use bevy::prelude::*;
use lightyear::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::components::{
    Dummy, DummyPosition, Health, Player, PlayerPosition, PlayerRotation, StreamEmission,
    StreamPosition, StreamRotation, WaterStream,
};
use crate::stream::StreamType;

// --- Input (for server-authoritative movement) ---

/// Player input sent from client to server each tick
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct PlayerInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Facing direction (yaw, radians); the caster faces the cursor
    pub yaw: f32,
}

// --- Messages ---

/// Client -> Server: begin channeling a stream spell at an aim point.
///
/// The aim point is raw; the server re-validates range and line of sight and
/// answers with `CastFailed` if the client's local check was stale or forged.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct CastStreamRequest {
    pub stream_type: StreamType,
    /// Ground-plane point the player clicked
    pub aim_point: Vec3,
}

/// Client -> Server: stop channeling early. Harmless if nothing is active.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct CancelStreamRequest;

/// Why the server refused a cast attempt
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum CastFailReason {
    /// Aim point farther than the spell's cast length
    OutOfRange,
    /// Line of sight to the aim point is blocked
    Obstructed,
    /// The caster is already channeling a stream
    AlreadyChanneling,
}

/// Server -> Client: the cast attempt was rejected (user-facing feedback)
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct CastFailed {
    pub reason: CastFailReason,
}

/// Server -> Client: your stream damaged a target this tick
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct StreamHit {
    /// Entity bits of the target that was hit
    pub target_id: u64,
    /// Damage dealt after falloff
    pub damage: f32,
    /// Did this hit destroy the target
    pub kill: bool,
}

/// Server -> Client: you were caught in someone's stream
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct DamageReceived {
    /// Direction damage came from (for a hit indicator)
    pub direction: Vec3,
    /// Damage amount
    pub damage: f32,
    /// Current health after damage
    pub health_remaining: f32,
}

// --- Channels ---
// In Lightyear 0.25, Channel trait is auto-implemented for all Send + Sync + 'static types

/// Reliable channel for casts, results, and combat feedback
pub struct ReliableChannel;

/// Unreliable channel for frequent input (lowest latency)
pub struct InputChannel;

// --- Protocol Plugin ---

pub struct ProtocolPlugin;

impl Plugin for ProtocolPlugin {
    fn build(&self, app: &mut App) {
        // === PLAYER COMPONENTS ===

        app.register_component::<Player>()
            .add_prediction();

        app.register_component::<PlayerPosition>()
            .add_prediction();

        app.register_component::<PlayerRotation>()
            .add_prediction();

        // === DUMMY COMPONENTS ===

        app.register_component::<Dummy>()
            .add_prediction();

        app.register_component::<DummyPosition>()
            .add_prediction();

        // === COMBAT COMPONENTS ===

        app.register_component::<Health>()
            .add_prediction();

        // === STREAM EFFECT COMPONENTS ===
        // Observer projection only; channel state never leaves the server.

        app.register_component::<WaterStream>()
            .add_prediction();

        app.register_component::<StreamPosition>()
            .add_prediction();

        app.register_component::<StreamRotation>()
            .add_prediction();

        app.register_component::<StreamEmission>()
            .add_prediction();

        // === MESSAGES ===

        // Client -> Server
        app.register_message::<PlayerInput>()
            .add_direction(NetworkDirection::ClientToServer);
        app.register_message::<CastStreamRequest>()
            .add_direction(NetworkDirection::ClientToServer);
        app.register_message::<CancelStreamRequest>()
            .add_direction(NetworkDirection::ClientToServer);

        // Server -> Client
        app.register_message::<CastFailed>()
            .add_direction(NetworkDirection::ServerToClient);
        app.register_message::<StreamHit>()
            .add_direction(NetworkDirection::ServerToClient);
        app.register_message::<DamageReceived>()
            .add_direction(NetworkDirection::ServerToClient);

        // === CHANNELS ===

        app.add_channel::<ReliableChannel>(ChannelSettings {
            mode: ChannelMode::OrderedReliable(ReliableSettings::default()),
            ..default()
        })
        // Casts, rejections, hit feedback
        .add_direction(NetworkDirection::Bidirectional);

        app.add_channel::<InputChannel>(ChannelSettings {
            mode: ChannelMode::UnorderedUnreliable,
            ..default()
        })
        // High-frequency input: client -> server only
        .add_direction(NetworkDirection::ClientToServer);
    }
}

// --- Network Configuration ---

pub const SERVER_PORT: u16 = 5800;
pub const SERVER_ADDR: &str = "127.0.0.1";
pub const PROTOCOL_ID: u64 = 0x7B1D_E5EA_0C0F_FEE5;

/// Get the address the server should bind to.
pub fn get_server_bind_addr() -> &'static str {
    "0.0.0.0"
}

/// Shared private key for local development (use proper key management in production!)
pub const PRIVATE_KEY: [u8; 32] = [
    0x2c, 0x9f, 0x11, 0x68, 0x3d, 0x40, 0xa7, 0x05,
    0x5b, 0xe2, 0x99, 0x0e, 0x4f, 0x6a, 0xd1, 0x38,
    0x81, 0x57, 0xc4, 0x23, 0xb0, 0x9d, 0x72, 0xe6,
    0x1f, 0x8a, 0x35, 0xcd, 0x60, 0x04, 0xbb, 0x49,
];

/// Fixed timestep for game logic (60 Hz)
pub const FIXED_TIMESTEP_HZ: f64 = 60.0;

/// Tick duration for lightyear plugins
pub fn tick_duration() -> Duration {
    Duration::from_secs_f64(1.0 / FIXED_TIMESTEP_HZ)
}
