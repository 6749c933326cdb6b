//! Optimized collection types for Trellis.
//!
//! Re-exports hash collections backed by AHash, which is measurably faster
//! than SipHash for the small integer keys the widget tree uses.

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};
