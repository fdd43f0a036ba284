//! Falloff damage sweep
//!
//! Walks a ranked target list front to back, dealing geometrically-decaying
//! damage and dimming the particle emission by the same factor, so what the
//! beam looks like and what it does stay in lockstep.

use serde::{Deserialize, Serialize};

use super::geometry::RankedTarget;
use super::StreamStats;

/// Damage school, carried on every damage event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageKind {
    Physical,
    Magical,
}

/// One fire-and-forget damage application
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DamageEvent {
    pub amount: f32,
    pub kind: DamageKind,
}

/// One target hit during a sweep
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepHit {
    /// Opaque actor handle, as discovered
    pub target: u64,
    pub damage: DamageEvent,
}

/// Result of one tick's falloff sweep
#[derive(Clone, Debug, PartialEq)]
pub struct Sweep {
    /// Hits in beam order, nearest first
    pub hits: Vec<SweepHit>,
    /// Emission rate to publish for this tick: base * factor^hits.len().
    /// Starts from the base every tick - the stream flares back to full
    /// intensity and only dims by what it burned through this tick.
    pub emission_rate: f32,
}

/// Apply the falloff rule to a ranked target list.
///
/// The nearest target takes the full per-tick damage; each subsequent target
/// takes the previous amount times the decay factor. The walk stops early
/// only when the running damage is <= 0 (a hard cutoff, not a floor), which
/// geometric decay alone never reaches - it takes a zero or negative base.
pub fn sweep(ranked: &[RankedTarget], stats: &StreamStats) -> Sweep {
    let mut current_damage = stats.damage_per_tick;
    let mut current_rate = stats.base_emission_rate;
    let mut hits = Vec::new();

    for target in ranked {
        if current_damage <= 0.0 {
            break;
        }

        hits.push(SweepHit {
            target: target.candidate.id,
            damage: DamageEvent {
                amount: current_damage,
                kind: DamageKind::Magical,
            },
        });

        current_damage *= stats.decay_factor;
        current_rate *= stats.decay_factor;
    }

    Sweep {
        hits,
        emission_rate: current_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::geometry::{Candidate, RankedTarget};
    use crate::stream::StreamType;
    use bevy::prelude::Vec3;

    fn ranked(n: u64) -> Vec<RankedTarget> {
        (0..n)
            .map(|i| RankedTarget {
                candidate: Candidate {
                    id: i + 1,
                    position: Vec3::new(0.0, 0.0, (i + 1) as f32),
                },
                axial: (i + 1) as f32,
            })
            .collect()
    }

    #[test]
    fn test_falloff_sequence_exact() {
        // base 20, factor 0.67, 3 targets => [20.0, 13.4, 8.978]
        let stats = StreamType::WaterJet.stats();
        let result = sweep(&ranked(3), &stats);

        assert_eq!(result.hits.len(), 3);
        assert!((result.hits[0].damage.amount - 20.0).abs() < 1e-5);
        assert!((result.hits[1].damage.amount - 13.4).abs() < 1e-5);
        assert!((result.hits[2].damage.amount - 8.978).abs() < 1e-4);
        assert!(result.hits.iter().all(|h| h.damage.kind == DamageKind::Magical));
    }

    #[test]
    fn test_hits_follow_rank_order() {
        let stats = StreamType::WaterJet.stats();
        let result = sweep(&ranked(3), &stats);
        let order: Vec<u64> = result.hits.iter().map(|h| h.target).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_emission_decays_with_hit_count() {
        let stats = StreamType::WaterJet.stats();
        let result = sweep(&ranked(3), &stats);
        let expected = stats.base_emission_rate * stats.decay_factor.powi(3);
        assert!((result.emission_rate - expected).abs() < 1e-4);
    }

    #[test]
    fn test_empty_tick_publishes_base_rate() {
        let stats = StreamType::WaterJet.stats();
        let result = sweep(&[], &stats);
        assert!(result.hits.is_empty());
        assert_eq!(result.emission_rate, stats.base_emission_rate);
    }

    #[test]
    fn test_decay_never_reaches_zero_by_multiplication() {
        // base 1, factor 0.67 => [1.0, 0.67, 0.4489], all still > 0
        let mut stats = StreamType::WaterJet.stats();
        stats.damage_per_tick = 1.0;

        let result = sweep(&ranked(3), &stats);
        assert_eq!(result.hits.len(), 3);
        assert!(result.hits.iter().all(|h| h.damage.amount > 0.0));
        assert!((result.hits[2].damage.amount - 0.4489).abs() < 1e-5);
    }

    #[test]
    fn test_nonpositive_base_damage_stops_before_first_hit() {
        let mut stats = StreamType::WaterJet.stats();
        stats.damage_per_tick = 0.0;

        let result = sweep(&ranked(3), &stats);
        assert!(result.hits.is_empty());
        // No hits consumed, so the published rate is the base
        assert_eq!(result.emission_rate, stats.base_emission_rate);
    }
}
