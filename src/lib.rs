//! # Zone Duel
//!
//! Deterministic simulation core for a two-combatant zone-control arena.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ZONE DUEL                                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── vec2.rs     - 2D vector and rectangle                   │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  ├── hash.rs     - State hashing for verification            │
//! │  └── constants.rs- Tuning constants (per 60 Hz tick)         │
//! │                                                              │
//! │  config.rs       - Match settings (JSON, clamped)            │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── input.rs    - Controller latching, input recording      │
//! │  ├── state.rs    - Match, combatant and entity state         │
//! │  ├── map.rs      - Arena layouts                             │
//! │  ├── physics.rs  - Movement integration                      │
//! │  ├── collision.rs- Platform resolution, hit tests            │
//! │  ├── combat.rs   - Shots, damage, death and respawn          │
//! │  ├── powerup.rs  - Power-up spawning and collection          │
//! │  ├── zone.rs     - Zone capture and domination scoring       │
//! │  ├── tick.rs     - Authoritative simulation loop             │
//! │  └── clock.rs    - Fixed-step frame clock                    │
//! │                                                              │
//! │  replay/         - Verification                              │
//! │  └── transcript.rs - Transcript recording and replay         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Given the same seed, settings, layout and two input streams, the
//! simulation produces identical state on every run:
//! - Fixed 60 Hz ticks; wall-clock time only enters through `FrameClock`
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - Side A is always processed before side B
//! - All randomness from seeded Xorshift128+

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod config;
pub mod game;
pub mod replay;

// Re-export commonly used types
pub use core::vec2::{Vec2, Rect};
pub use core::rng::DeterministicRng;
pub use config::{MatchSettings, SettingsError};
pub use game::input::{Controller, InputFrame, InputRecording, InputSource};
pub use game::state::{MatchState, Combatant, Side};
pub use game::tick::{tick, TickResult};
pub use replay::{MatchTranscript, TranscriptError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
