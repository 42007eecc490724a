//! Game Logic Module
//!
//! All match simulation code. Deterministic for a given seed and input
//! stream.
//!
//! ## Module Structure
//!
//! - `input`: Key latching, direction arbitration, input recording
//! - `state`: Match state, combatants, zones, projectiles, power-ups
//! - `map`: Arena layouts
//! - `physics`: Per-tick movement integration
//! - `collision`: Platform resolution and hit tests
//! - `combat`: Shooting, damage, death and respawn
//! - `powerup`: Power-up spawning and collection
//! - `zone`: Zone capture and domination scoring
//! - `tick`: Authoritative simulation loop
//! - `clock`: Wall-clock to fixed-tick conversion
//! - `events`: Game events for renderers and replay inspection

pub mod input;
pub mod state;
pub mod map;
pub mod physics;
pub mod collision;
pub mod combat;
pub mod powerup;
pub mod zone;
pub mod tick;
pub mod clock;
pub mod events;

// Re-export key types
pub use input::{Controller, InputFrame, InputRecording, InputSource, Key};
pub use state::{
    BuffKind, Combatant, DecidedBy, EndReason, LifeState, MatchOutcome, MatchState, Side, Tick,
};
pub use map::ArenaLayout;
pub use tick::{tick, TickResult};
pub use clock::FrameClock;
pub use events::{GameEvent, GameEventData};
