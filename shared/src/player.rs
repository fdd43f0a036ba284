//! Player-related constants

/// Player movement speed (units per second)
pub const PLAYER_SPEED: f32 = 8.0;

/// Player height (for capsule rendering)
pub const PLAYER_HEIGHT: f32 = 1.8;

/// Player radius (for capsule rendering)
pub const PLAYER_RADIUS: f32 = 0.3;
