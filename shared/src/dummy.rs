//! Training-dummy constants and helpers.

use crate::components::DummyKind;
use crate::player::{PLAYER_HEIGHT, PLAYER_RADIUS};

// =============================================================================
// DUMMY GEOMETRY
// =============================================================================

/// Dummy post height (same humanoid scale as players).
pub const DUMMY_HEIGHT: f32 = PLAYER_HEIGHT;

/// Dummy post radius.
pub const DUMMY_RADIUS: f32 = PLAYER_RADIUS * 1.4;

/// Seconds before a destroyed dummy is rebuilt in place.
pub const DUMMY_REBUILD_TIME: f32 = 8.0;

// =============================================================================
// DUMMY HEALTH
// =============================================================================

/// Returns the maximum health for a dummy based on kind.
pub fn dummy_max_health(kind: DummyKind) -> f32 {
    match kind {
        DummyKind::Straw => 60.0,
        DummyKind::Wooden => 120.0,
        DummyKind::IronBound => 240.0,
    }
}
