//! Client-side game systems
//!
//! Organized into submodules for maintainability.

pub mod arena;
pub mod cone_preview;
pub mod connection;
pub mod feedback;
pub mod player;
pub mod stream_vfx;
