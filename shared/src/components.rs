//! Shared ECS components used by both server and client

use bevy::prelude::*;
use lightyear::prelude::PeerId;
use serde::{Deserialize, Serialize};

use crate::stream::StreamType;

// =============================================================================
// PLAYERS
// =============================================================================

/// Marker component for player entities
#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Player {
    pub client_id: PeerId,
}

/// Player position component - replicated across network
#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct PlayerPosition(pub Vec3);

/// Player rotation (yaw only, radians) - replicated across network
#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct PlayerRotation(pub f32);

/// Marker for the local player (client-side only)
#[derive(Component)]
pub struct LocalPlayer;

// =============================================================================
// TRAINING DUMMIES
// =============================================================================

/// Which dummy variant to render and how much punishment it takes.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum DummyKind {
    #[default]
    Straw,
    Wooden,
    IronBound,
}

/// Marker component for training dummies (server authoritative, replicated)
#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Dummy {
    pub id: u64,
    pub kind: DummyKind,
}

/// Dummy position component - replicated across network
#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct DummyPosition(pub Vec3);

// =============================================================================
// HEALTH
// =============================================================================

/// Health component for damageable entities
#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self {
            current: 100.0,
            max: 100.0,
        }
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.current = (self.current - amount).max(0.0);
        self.current <= 0.0
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    pub fn percentage(&self) -> f32 {
        self.current / self.max
    }
}

// =============================================================================
// STREAM EFFECT (observer projection)
// =============================================================================
//
// The effect entity carries only what observers need to render it. All
// channel state - direction, elapsed time, tick accumulator - lives in a
// server-only component; clients can't advance a stream even by accident.

/// Marker component for an active stream effect, replicated to all clients
#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WaterStream {
    /// Owning caster's client id (u64 form, for display/attribution)
    pub owner_id: u64,
    pub stream_type: StreamType,
}

/// Stream anchor position - follows the caster, replicated
#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct StreamPosition(pub Vec3);

/// Stream yaw (radians), fixed at cast time - replicated
#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct StreamRotation(pub f32);

/// Particle emission rate, recomputed by the server every damage tick.
///
/// Value broadcast, not shared mutation: the server writes it, clients only
/// read it to drive their local particle spawners. Late or duplicate updates
/// are harmless - last write wins, nothing accumulates.
#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct StreamEmission(pub f32);
