//! Spatial hashing for static blockers and line-of-sight queries.
//!
//! Cast validation asks "is the line from caster to aim point clear?" every
//! time someone tries to channel, and the client asks it every frame to
//! color the aim cone. A spatial hash keeps both O(cells crossed) instead
//! of O(blockers).

use bevy::prelude::*;
use std::collections::HashMap;

/// Size of each spatial grid cell in world units.
/// Should be roughly the size of your largest blocker footprint.
pub const BLOCKER_CELL_SIZE: f32 = 8.0;

/// Sampling step for line-of-sight walks, in world units. Smaller than the
/// thinnest blocker so a segment can't step over one.
const LOS_STEP: f32 = 0.25;

/// A single static blocker footprint: a rotated rectangle in the XZ plane.
#[derive(Clone, Copy, Debug)]
pub struct Blocker {
    /// Center position in world XZ coords.
    pub center: Vec2,
    /// Half-extents of the footprint.
    pub half_extents: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    /// Render height hint for the client; irrelevant to queries.
    pub height: f32,
}

impl Blocker {
    /// Check if a point is inside this blocker's rotated footprint.
    pub fn contains_point(&self, point: Vec2) -> bool {
        let local = point - self.center;
        let cos_r = (-self.rotation).cos();
        let sin_r = (-self.rotation).sin();
        let rotated = Vec2::new(
            local.x * cos_r - local.y * sin_r,
            local.x * sin_r + local.y * cos_r,
        );

        rotated.x.abs() <= self.half_extents.x && rotated.y.abs() <= self.half_extents.y
    }

    /// Axis-aligned bounds containing the rotated footprint.
    fn aabb(&self) -> (Vec2, Vec2) {
        let cos_r = self.rotation.cos();
        let sin_r = self.rotation.sin();
        let extent_x = (self.half_extents.x * cos_r.abs()) + (self.half_extents.y * sin_r.abs());
        let extent_y = (self.half_extents.x * sin_r.abs()) + (self.half_extents.y * cos_r.abs());

        (
            Vec2::new(self.center.x - extent_x, self.center.y - extent_y),
            Vec2::new(self.center.x + extent_x, self.center.y + extent_y),
        )
    }
}

/// Spatial hash grid over all static blockers in the arena.
///
/// Built once at startup on both server and client from the shared arena
/// layout, then only queried.
#[derive(Resource, Default, Debug)]
pub struct BlockerGrid {
    /// Map from grid cell (x, z) to blockers overlapping that cell.
    cells: HashMap<(i32, i32), Vec<usize>>,
    blockers: Vec<Blocker>,
}

impl BlockerGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert world position to grid cell coordinates.
    #[inline]
    fn world_to_cell(pos: Vec2) -> (i32, i32) {
        (
            (pos.x / BLOCKER_CELL_SIZE).floor() as i32,
            (pos.y / BLOCKER_CELL_SIZE).floor() as i32,
        )
    }

    /// Add a blocker to the grid.
    pub fn insert(&mut self, blocker: Blocker) {
        let (min, max) = blocker.aabb();
        let min_cell = Self::world_to_cell(min);
        let max_cell = Self::world_to_cell(max);

        let idx = self.blockers.len();
        self.blockers.push(blocker);

        for cx in min_cell.0..=max_cell.0 {
            for cz in min_cell.1..=max_cell.1 {
                self.cells.entry((cx, cz)).or_default().push(idx);
            }
        }
    }

    /// Check if a point is inside any blocker.
    #[inline]
    pub fn point_blocked(&self, point: Vec2) -> bool {
        let cell = Self::world_to_cell(point);

        if let Some(indices) = self.cells.get(&cell) {
            for &idx in indices {
                if self.blockers[idx].contains_point(point) {
                    return true;
                }
            }
        }

        false
    }

    /// Line-of-sight query: true when the XZ segment from `from` to `to`
    /// crosses no blocker. Heights are ignored; beams hug the ground.
    pub fn segment_clear(&self, from: Vec3, to: Vec3) -> bool {
        let a = Vec2::new(from.x, from.z);
        let b = Vec2::new(to.x, to.z);

        let delta = b - a;
        let length = delta.length();
        if length <= f32::EPSILON {
            return !self.point_blocked(a);
        }

        let steps = (length / LOS_STEP).ceil() as u32;
        let dir = delta / length;
        for i in 0..=steps {
            let t = (i as f32 * LOS_STEP).min(length);
            if self.point_blocked(a + dir * t) {
                return false;
            }
        }

        true
    }

    /// Iterate all blockers, e.g. for the client to render them.
    pub fn iter(&self) -> impl Iterator<Item = &Blocker> {
        self.blockers.iter()
    }

    pub fn len(&self) -> usize {
        self.blockers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blockers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crate_at(x: f32, z: f32) -> Blocker {
        Blocker {
            center: Vec2::new(x, z),
            half_extents: Vec2::splat(1.0),
            rotation: 0.0,
            height: 1.5,
        }
    }

    #[test]
    fn test_point_queries() {
        let mut grid = BlockerGrid::new();
        grid.insert(crate_at(0.0, 0.0));

        assert!(grid.point_blocked(Vec2::new(0.5, 0.5)));
        assert!(!grid.point_blocked(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn test_rotated_blocker() {
        let mut grid = BlockerGrid::new();
        grid.insert(Blocker {
            center: Vec2::ZERO,
            half_extents: Vec2::new(2.0, 0.5),
            rotation: std::f32::consts::FRAC_PI_2,
            height: 1.5,
        });

        // After 90 degrees, the long axis lies along Z
        assert!(grid.point_blocked(Vec2::new(0.0, 1.5)));
        assert!(!grid.point_blocked(Vec2::new(1.5, 0.0)));
    }

    #[test]
    fn test_segment_through_blocker_is_obstructed() {
        let mut grid = BlockerGrid::new();
        grid.insert(crate_at(0.0, 5.0));

        assert!(!grid.segment_clear(Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0)));
    }

    #[test]
    fn test_segment_past_blocker_is_clear() {
        let mut grid = BlockerGrid::new();
        grid.insert(crate_at(0.0, 5.0));

        assert!(grid.segment_clear(Vec3::new(4.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 10.0)));
    }

    #[test]
    fn test_segment_in_empty_grid_is_clear() {
        let grid = BlockerGrid::new();
        assert!(grid.segment_clear(Vec3::ZERO, Vec3::new(30.0, 0.0, 30.0)));
    }

    #[test]
    fn test_degenerate_segment_checks_the_point() {
        let mut grid = BlockerGrid::new();
        grid.insert(crate_at(0.0, 0.0));

        assert!(!grid.segment_clear(Vec3::ZERO, Vec3::ZERO));
        assert!(grid.segment_clear(Vec3::new(5.0, 0.0, 5.0), Vec3::new(5.0, 0.0, 5.0)));
    }
}
