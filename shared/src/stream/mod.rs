//! Channeled stream spells - types, stats, and registry

pub mod aim;
pub mod falloff;
pub mod geometry;

use serde::{Deserialize, Serialize};

/// Available channeled stream spells
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum StreamType {
    /// Long, narrow pressurized jet
    #[default]
    WaterJet,
    /// Short, wide burst that ticks faster but fades harder per target
    Geyser,
}

/// Complete tuning for a stream spell
#[derive(Clone, Debug)]
pub struct StreamStats {
    /// Reach of the beam from the caster (also the aim range), meters
    pub cast_length: f32,
    /// Width of the beam at full reach, meters
    pub cast_width: f32,
    /// Damage dealt to the nearest target each damage tick
    pub damage_per_tick: f32,
    /// Seconds between damage ticks
    pub tick_interval: f32,
    /// Total channel duration in seconds
    pub duration: f32,
    /// Multiplier applied to damage AND emission per target hit, front to back.
    /// Must stay in (0, 1) so the beam always weakens as it punches through.
    pub decay_factor: f32,
    /// Particle emission rate (particles/sec) before any decay
    pub base_emission_rate: f32,
}

impl StreamType {
    /// Get the tuning for this stream spell
    pub fn stats(&self) -> StreamStats {
        match self {
            StreamType::WaterJet => StreamStats {
                cast_length: 10.0,
                cast_width: 4.0,
                damage_per_tick: 20.0,
                tick_interval: 0.4,
                duration: 2.0,
                decay_factor: 0.67,
                base_emission_rate: 100.0,
            },
            StreamType::Geyser => StreamStats {
                cast_length: 6.0,
                cast_width: 5.0,
                damage_per_tick: 11.0,
                tick_interval: 0.25,
                duration: 1.5,
                decay_factor: 0.55,
                base_emission_rate: 140.0,
            },
        }
    }
}

impl Default for StreamStats {
    fn default() -> Self {
        StreamType::WaterJet.stats()
    }
}
