//! Authoritative movement logic.
//!
//! Top-down scheme: WASD moves along the world axes, yaw comes from where
//! the cursor points (the caster faces the aim). Flat arena, no gravity.

use bevy::prelude::*;

use crate::arena::ARENA_RADIUS;
use crate::protocol::PlayerInput;
use crate::{PlayerPosition, PlayerRotation, PLAYER_SPEED};

/// Apply one fixed tick of movement input.
pub fn apply_movement(
    input: &PlayerInput,
    position: &mut PlayerPosition,
    rotation: &mut PlayerRotation,
    delta_seconds: f32,
) {
    // Face the cursor, not the travel direction
    rotation.0 = input.yaw;

    let mut direction = Vec3::ZERO;
    if input.forward {
        direction.z -= 1.0;
    }
    if input.backward {
        direction.z += 1.0;
    }
    if input.right {
        direction.x += 1.0;
    }
    if input.left {
        direction.x -= 1.0;
    }

    if direction.length_squared() > 0.0 {
        direction = direction.normalize();
        position.0 += direction * PLAYER_SPEED * delta_seconds;
    }

    // Clamp to the arena disc
    let planar = Vec2::new(position.0.x, position.0.z);
    if planar.length() > ARENA_RADIUS {
        let clamped = planar.normalize() * ARENA_RADIUS;
        position.0.x = clamped.x;
        position.0.z = clamped.y;
    }
    position.0.y = 0.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_forward() -> PlayerInput {
        PlayerInput {
            forward: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_forward_moves_negative_z() {
        let mut pos = PlayerPosition(Vec3::ZERO);
        let mut rot = PlayerRotation(0.0);
        apply_movement(&input_forward(), &mut pos, &mut rot, 1.0);
        assert!((pos.0.z + PLAYER_SPEED).abs() < 1e-5);
        assert_eq!(pos.0.x, 0.0);
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let input = PlayerInput {
            forward: true,
            right: true,
            ..Default::default()
        };
        let mut pos = PlayerPosition(Vec3::ZERO);
        let mut rot = PlayerRotation(0.0);
        apply_movement(&input, &mut pos, &mut rot, 1.0);
        assert!((pos.0.length() - PLAYER_SPEED).abs() < 1e-4);
    }

    #[test]
    fn test_clamped_to_arena() {
        let mut pos = PlayerPosition(Vec3::new(0.0, 0.0, -ARENA_RADIUS));
        let mut rot = PlayerRotation(0.0);
        for _ in 0..120 {
            apply_movement(&input_forward(), &mut pos, &mut rot, 1.0 / 60.0);
        }
        assert!(pos.0.length() <= ARENA_RADIUS + 1e-4);
    }

    #[test]
    fn test_yaw_follows_input() {
        let input = PlayerInput {
            yaw: 1.25,
            ..Default::default()
        };
        let mut pos = PlayerPosition(Vec3::ZERO);
        let mut rot = PlayerRotation(0.0);
        apply_movement(&input, &mut pos, &mut rot, 1.0 / 60.0);
        assert_eq!(rot.0, 1.25);
    }
}
