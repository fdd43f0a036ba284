//! Deterministic arena layout shared by server and client.
//!
//! The server builds its authoritative blocker grid from this layout; the
//! client builds an identical one for local cast previews and renders the
//! same crates. No assets, no sync - both sides derive the world from code.

use bevy::prelude::*;

use crate::obstacles::{Blocker, BlockerGrid};

/// Playable radius; movement is clamped inside this circle.
pub const ARENA_RADIUS: f32 = 28.0;

/// Crate footprints scattered around the middle of the arena. Positions are
/// (x, z, rotation) with a uniform 1x1 m half-extent and render height 1.6.
const CRATE_FOOTPRINTS: &[(f32, f32, f32)] = &[
    (6.0, 4.0, 0.0),
    (-7.5, 6.0, 0.6),
    (2.0, -9.0, 0.3),
    (-4.0, -5.0, 0.0),
    (10.0, -2.0, 1.1),
    (-11.0, -8.0, 0.8),
    (0.0, 12.0, 0.2),
];

/// A longer wall segment splitting the northern half.
const WALL: (f32, f32, f32, f32, f32) = (-2.0, 8.0, 4.0, 0.6, 0.25);

pub fn blockers() -> Vec<Blocker> {
    let mut all: Vec<Blocker> = CRATE_FOOTPRINTS
        .iter()
        .map(|&(x, z, rotation)| Blocker {
            center: Vec2::new(x, z),
            half_extents: Vec2::splat(1.0),
            rotation,
            height: 1.6,
        })
        .collect();

    let (x, z, hx, hz, rotation) = WALL;
    all.push(Blocker {
        center: Vec2::new(x, z),
        half_extents: Vec2::new(hx, hz),
        rotation,
        height: 2.2,
    });

    all
}

/// Build the full blocker grid for the arena.
pub fn build_blocker_grid() -> BlockerGrid {
    let mut grid = BlockerGrid::new();
    for blocker in blockers() {
        grid.insert(blocker);
    }
    grid
}

/// Spawn spot for the nth connecting player: evenly spaced on a ring well
/// inside the arena edge.
pub fn spawn_position(index: usize) -> Vec3 {
    let angle = index as f32 * std::f32::consts::TAU / 8.0;
    let ring = ARENA_RADIUS * 0.6;
    Vec3::new(angle.cos() * ring, 0.0, angle.sin() * ring)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_contains_all_blockers() {
        let grid = build_blocker_grid();
        assert_eq!(grid.len(), blockers().len());
    }

    #[test]
    fn test_spawns_inside_arena() {
        for i in 0..16 {
            let pos = spawn_position(i);
            assert!(pos.length() < ARENA_RADIUS);
            // Spawn spots must not be inside a crate
            assert!(!build_blocker_grid().point_blocked(Vec2::new(pos.x, pos.z)));
        }
    }
}
