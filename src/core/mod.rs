//! Core primitives.
//!
//! Geometry, seeded randomness and state hashing shared by every
//! simulation system.

pub mod constants;
pub mod vec2;
pub mod rng;
pub mod hash;

// Re-export core types
pub use vec2::{Vec2, Rect};
pub use rng::DeterministicRng;
pub use hash::{compute_state_hash, StateHash};
