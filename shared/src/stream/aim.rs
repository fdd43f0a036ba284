//! Aim target resolution
//!
//! Turns a raw aim point into a validated cast target. The resolver holds at
//! most one pending point; the owning cast flow polls it once per update
//! until something other than `Pending` comes back. Both sides run the same
//! code: the client to gate the cast button, the server to re-validate the
//! request it actually trusts.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Why an aim point is not (yet) castable
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AimError {
    /// No aim point supplied yet - keep polling, not a failure
    Pending,
    /// Target point farther from the caster than the cast length
    OutOfRange,
    /// Line of sight to the target point is blocked
    Obstructed,
}

/// Holds the raw aim point for one cast attempt.
#[derive(Clone, Copy, Debug, Default)]
pub struct AimResolver {
    point: Option<Vec3>,
}

impl AimResolver {
    /// Take the first of the supplied target points. Later points are
    /// ignored; a stream cast aims at exactly one spot.
    pub fn load_target(&mut self, points: &[Vec3]) {
        if let Some(first) = points.first() {
            self.point = Some(*first);
        }
    }

    /// Reset to pending, dropping any stored point.
    pub fn clear(&mut self) {
        self.point = None;
    }

    pub fn point(&self) -> Option<Vec3> {
        self.point
    }

    /// Validate the stored point against the caster's position.
    ///
    /// `line_clear` is the obstruction query supplied by the caller (the
    /// blocker grid on both sides); it sees the caster position and the aim
    /// point and answers whether the line between them is unobstructed.
    pub fn resolve<F>(&self, caster: Vec3, cast_length: f32, line_clear: F) -> Result<Vec3, AimError>
    where
        F: FnOnce(Vec3, Vec3) -> bool,
    {
        let point = self.point.ok_or(AimError::Pending)?;

        let mut to_point = point - caster;
        to_point.y = 0.0;
        if to_point.length() > cast_length {
            return Err(AimError::OutOfRange);
        }

        if !line_clear(caster, point) {
            return Err(AimError::Obstructed);
        }

        Ok(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_resolver_is_pending() {
        let resolver = AimResolver::default();
        let result = resolver.resolve(Vec3::ZERO, 10.0, |_, _| true);
        assert_eq!(result, Err(AimError::Pending));
    }

    #[test]
    fn test_first_point_wins() {
        let mut resolver = AimResolver::default();
        resolver.load_target(&[Vec3::new(1.0, 0.0, 2.0), Vec3::new(9.0, 0.0, 9.0)]);
        assert_eq!(resolver.point(), Some(Vec3::new(1.0, 0.0, 2.0)));
    }

    #[test]
    fn test_load_with_no_points_stays_pending() {
        let mut resolver = AimResolver::default();
        resolver.load_target(&[]);
        assert_eq!(resolver.point(), None);
    }

    #[test]
    fn test_in_range_clear_line_resolves() {
        let mut resolver = AimResolver::default();
        resolver.load_target(&[Vec3::new(0.0, 0.0, 8.0)]);
        let result = resolver.resolve(Vec3::ZERO, 10.0, |_, _| true);
        assert_eq!(result, Ok(Vec3::new(0.0, 0.0, 8.0)));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut resolver = AimResolver::default();
        resolver.load_target(&[Vec3::new(0.0, 0.0, 11.0)]);
        let result = resolver.resolve(Vec3::ZERO, 10.0, |_, _| true);
        assert_eq!(result, Err(AimError::OutOfRange));
    }

    #[test]
    fn test_range_check_ignores_height() {
        // Caster stands at chest height; the aim point is on the floor.
        let mut resolver = AimResolver::default();
        resolver.load_target(&[Vec3::new(0.0, 0.0, 10.0)]);
        let result = resolver.resolve(Vec3::new(0.0, 0.9, 0.0), 10.0, |_, _| true);
        assert!(result.is_ok());
    }

    #[test]
    fn test_obstructed_rejected() {
        let mut resolver = AimResolver::default();
        resolver.load_target(&[Vec3::new(0.0, 0.0, 5.0)]);
        let result = resolver.resolve(Vec3::ZERO, 10.0, |_, _| false);
        assert_eq!(result, Err(AimError::Obstructed));
    }

    #[test]
    fn test_clear_returns_to_pending() {
        let mut resolver = AimResolver::default();
        resolver.load_target(&[Vec3::ONE]);
        resolver.clear();
        let result = resolver.resolve(Vec3::ZERO, 10.0, |_, _| true);
        assert_eq!(result, Err(AimError::Pending));
    }
}
