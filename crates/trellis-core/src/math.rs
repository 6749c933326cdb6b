//! Math re-exports for Trellis.
//!
//! This module re-exports the [`glam`] vector types used throughout the
//! framework. `Vec2` carries pointer positions and coordinate offsets.
//!
//! [`glam`]: https://docs.rs/glam

pub use glam::*;
