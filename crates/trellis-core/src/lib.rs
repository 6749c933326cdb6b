//! Trellis Core
//!
//! Foundation utilities shared by the Trellis UI framework crates.

pub mod alloc;
pub mod color;
pub mod geometry;
pub mod logging;
pub mod math;
