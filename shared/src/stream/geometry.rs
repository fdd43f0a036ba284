//! Beam cone geometry
//!
//! The beam is a ground-plane cone: a triangle fanning out from the caster
//! toward the aim direction. All tests here work in the XZ plane; the
//! vertical component of target positions is intentionally ignored.

use bevy::prelude::*;

/// The shape of one cast, frozen for the beam's whole lifetime.
#[derive(Clone, Copy, Debug)]
pub struct CastShape {
    /// Caster position at the current tick (the beam follows the caster)
    pub origin: Vec3,
    /// Unit direction in the XZ plane
    pub direction: Vec3,
    /// Reach of the beam in meters
    pub length: f32,
    /// Width of the beam at full reach, meters
    pub width: f32,
}

/// A damageable actor found near the caster this tick.
///
/// Rebuilt from the live world every tick; never cached across ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Opaque actor handle (entity bits on the server)
    pub id: u64,
    pub position: Vec3,
}

/// A candidate accepted into the cone, keyed for falloff ordering.
#[derive(Clone, Copy, Debug)]
pub struct RankedTarget {
    pub candidate: Candidate,
    /// Distance along the beam axis: dot(to_target, direction)
    pub axial: f32,
}

/// Resolve a raw aim point into a unit cast direction on the XZ plane.
///
/// Returns `None` when the aim point sits on the caster - "no valid
/// direction yet", which callers treat the same as a pending aim.
pub fn resolve_direction(origin: Vec3, aim_point: Vec3) -> Option<Vec3> {
    let mut to_aim = aim_point - origin;
    to_aim.y = 0.0;
    let dir = to_aim.try_normalize()?;
    Some(dir)
}

/// Yaw (radians around +Y) that faces `direction`, for orienting the effect.
pub fn direction_yaw(direction: Vec3) -> f32 {
    (-direction.x).atan2(-direction.z)
}

impl CastShape {
    pub fn new(origin: Vec3, direction: Vec3, length: f32, width: f32) -> Self {
        Self {
            origin,
            direction,
            length,
            width,
        }
    }

    /// Half-angle of the cone in degrees: atan((width/2) / length).
    /// Always in (0, 90) for positive width and length.
    pub fn half_angle_deg(&self) -> f32 {
        ((self.width * 0.5) / self.length).atan().to_degrees()
    }

    /// Center of the beam's far end.
    pub fn end_point(&self) -> Vec3 {
        self.origin + self.direction * self.length
    }

    /// Horizontal perpendicular to the beam axis.
    fn perpendicular(&self) -> Vec3 {
        Vec3::new(-self.direction.z, 0.0, self.direction.x).normalize_or_zero()
    }

    /// Far-end corner to the left of the beam axis.
    pub fn left_edge(&self) -> Vec3 {
        self.end_point() - self.perpendicular() * (self.width * 0.5)
    }

    /// Far-end corner to the right of the beam axis.
    pub fn right_edge(&self) -> Vec3 {
        self.end_point() + self.perpendicular() * (self.width * 0.5)
    }

    /// The four ordered vertices of the closed cone outline, lifted `lift`
    /// above the ground so the line doesn't z-fight with the floor.
    pub fn outline(&self, lift: f32) -> [Vec3; 4] {
        let up = Vec3::Y * lift;
        [
            self.origin + up,
            self.left_edge() + up,
            self.right_edge() + up,
            self.origin + up,
        ]
    }

    /// Test a point against the cone. Returns its axial projection when the
    /// point is inside: within reach, not coincident with the origin, and
    /// within the angular half-width of the beam axis.
    pub fn axial_projection(&self, point: Vec3) -> Option<f32> {
        let mut to_target = point - self.origin;
        to_target.y = 0.0;

        let distance = to_target.length();
        if distance > self.length || distance <= 0.0 {
            return None;
        }

        let angle = self
            .direction
            .angle_between(to_target / distance)
            .to_degrees();
        if angle > self.half_angle_deg() {
            return None;
        }

        Some(to_target.dot(self.direction))
    }
}

/// Filter candidates down to those inside the cone and order them by axial
/// projection, nearest along the beam first.
///
/// The sort is stable, so candidates with equal projections keep their
/// discovery order - deterministic falloff for identical inputs.
pub fn rank_targets(shape: &CastShape, candidates: impl IntoIterator<Item = Candidate>) -> Vec<RankedTarget> {
    let mut ranked: Vec<RankedTarget> = candidates
        .into_iter()
        .filter_map(|candidate| {
            shape
                .axial_projection(candidate.position)
                .map(|axial| RankedTarget { candidate, axial })
        })
        .collect();

    ranked.sort_by(|a, b| a.axial.partial_cmp(&b.axial).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape_down_z() -> CastShape {
        CastShape::new(Vec3::ZERO, Vec3::Z, 10.0, 4.0)
    }

    #[test]
    fn test_half_angle() {
        // length 10, width 4 => atan(2/10) ~ 11.31 degrees
        let shape = shape_down_z();
        assert!((shape.half_angle_deg() - 11.309932).abs() < 1e-4);
    }

    #[test]
    fn test_on_axis_target_included() {
        let shape = shape_down_z();
        let axial = shape.axial_projection(Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(axial, Some(5.0));
    }

    #[test]
    fn test_wide_target_excluded() {
        // angle atan(3/5) ~ 30.96 degrees > 11.31
        let shape = shape_down_z();
        assert_eq!(shape.axial_projection(Vec3::new(3.0, 0.0, 5.0)), None);
    }

    #[test]
    fn test_out_of_range_excluded() {
        let shape = shape_down_z();
        assert_eq!(shape.axial_projection(Vec3::new(0.0, 0.0, 11.0)), None);
    }

    #[test]
    fn test_origin_coincident_excluded() {
        let shape = shape_down_z();
        assert_eq!(shape.axial_projection(Vec3::ZERO), None);
    }

    #[test]
    fn test_height_ignored() {
        // A flying target directly over the beam still counts: ground-plane test
        let shape = shape_down_z();
        assert_eq!(shape.axial_projection(Vec3::new(0.0, 3.0, 5.0)), Some(5.0));
    }

    #[test]
    fn test_ranking_sorted_by_axial() {
        let shape = shape_down_z();
        let candidates = vec![
            Candidate { id: 1, position: Vec3::new(0.0, 0.0, 8.0) },
            Candidate { id: 2, position: Vec3::new(0.0, 0.0, 2.0) },
            Candidate { id: 3, position: Vec3::new(0.0, 0.0, 5.0) },
        ];

        let ranked = rank_targets(&shape, candidates);
        let order: Vec<u64> = ranked.iter().map(|r| r.candidate.id).collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert!(ranked.windows(2).all(|w| w[0].axial <= w[1].axial));
    }

    #[test]
    fn test_ranking_ties_keep_discovery_order() {
        let shape = shape_down_z();
        // Same axial projection, mirrored across the axis
        let candidates = vec![
            Candidate { id: 7, position: Vec3::new(0.5, 0.0, 6.0) },
            Candidate { id: 8, position: Vec3::new(-0.5, 0.0, 6.0) },
        ];

        let ranked = rank_targets(&shape, candidates);
        let order: Vec<u64> = ranked.iter().map(|r| r.candidate.id).collect();
        assert_eq!(order, vec![7, 8]);
    }

    #[test]
    fn test_ranking_drops_rejected_candidates() {
        let shape = shape_down_z();
        let candidates = vec![
            Candidate { id: 1, position: Vec3::new(0.0, 0.0, 5.0) },
            Candidate { id: 2, position: Vec3::new(3.0, 0.0, 5.0) },  // too wide
            Candidate { id: 3, position: Vec3::new(0.0, 0.0, 11.0) }, // too far
        ];

        let ranked = rank_targets(&shape, candidates);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].candidate.id, 1);
    }

    #[test]
    fn test_resolve_direction() {
        let dir = resolve_direction(Vec3::ZERO, Vec3::new(3.0, 0.5, 4.0)).unwrap();
        // Flattened to the XZ plane and normalized
        assert!((dir - Vec3::new(0.6, 0.0, 0.8)).length() < 1e-5);
    }

    #[test]
    fn test_resolve_direction_degenerate() {
        assert_eq!(resolve_direction(Vec3::ONE, Vec3::ONE), None);
        // Aim point directly above the caster has no horizontal component
        assert_eq!(resolve_direction(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0)), None);
    }

    #[test]
    fn test_outline_is_closed_and_lifted() {
        let shape = shape_down_z();
        let outline = shape.outline(0.1);
        assert_eq!(outline[0], outline[3]);
        assert!(outline.iter().all(|v| (v.y - 0.1).abs() < 1e-6));
        // Left and right edges straddle the end point
        // direction +Z => perpendicular (-1, 0, 0), so left lands at +X
        let end = shape.end_point();
        assert!((outline[1].x - (end.x + 2.0)).abs() < 1e-5);
        assert!((outline[2].x - (end.x - 2.0)).abs() < 1e-5);
    }
}
