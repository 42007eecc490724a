//! Simulation Tuning Constants
//!
//! Per-tick values are tuned for the fixed 60 Hz step.
//! Durations are stored in ticks; use `ms_to_ticks` for anything authored in milliseconds.

use crate::TICK_RATE;

/// Duration of one simulation tick in milliseconds.
pub const TICK_MS: f64 = 1000.0 / TICK_RATE as f64;

/// Convert a millisecond duration to whole ticks (rounded to nearest).
#[inline]
pub const fn ms_to_ticks(ms: u32) -> u32 {
    (ms * TICK_RATE + 500) / 1000
}

/// Convert whole seconds to ticks.
#[inline]
pub const fn secs_to_ticks(secs: u32) -> u32 {
    secs * TICK_RATE
}

// =============================================================================
// ARENA
// =============================================================================

/// Arena width
pub const ARENA_WIDTH: f64 = 1200.0;

/// Arena height
pub const ARENA_HEIGHT: f64 = 600.0;

// =============================================================================
// COMBATANT BODY
// =============================================================================

/// Combatant hitbox width
pub const COMBATANT_WIDTH: f64 = 30.0;

/// Combatant hitbox height
pub const COMBATANT_HEIGHT: f64 = 50.0;

/// Horizontal acceleration per tick
pub const ACCELERATION: f64 = 0.6;

/// Velocity multiplier when reversing direction
pub const REVERSAL_DAMPING: f64 = 0.35;

/// Horizontal friction while grounded
pub const GROUND_FRICTION: f64 = 0.8;

/// Horizontal friction while airborne
pub const AIR_FRICTION: f64 = 0.95;

/// Horizontal speeds below this snap to zero
pub const VELOCITY_EPSILON: f64 = 0.1;

/// Facing may flip while |vx| is below this even against momentum
pub const FACING_FLIP_SPEED: f64 = 0.5;

/// Gravity per tick
pub const GRAVITY: f64 = 0.5;

/// Maximum downward speed
pub const TERMINAL_VELOCITY: f64 = 15.0;

/// Initial vertical velocity of a jump
pub const JUMP_FORCE: f64 = -12.0;

/// Speed buff multiplier
pub const SPEED_BOOST: f64 = 1.5;

/// Jump buff multiplier
pub const JUMP_BOOST: f64 = 1.4;

// =============================================================================
// COLLISION
// =============================================================================

/// Side penetration below this keeps horizontal velocity (edge grazing)
pub const GRAZE_THRESHOLD: f64 = 2.0;

/// Vertical tolerance for the standing-on-zone test
pub const STANDING_TOLERANCE: f64 = 8.0;

/// Feet this close to a platform top count as resting on it
pub const CONTACT_EPSILON: f64 = 1e-6;

// =============================================================================
// COMBAT
// =============================================================================

/// Shot cooldown (500 ms)
pub const SHOOT_COOLDOWN_TICKS: u32 = ms_to_ticks(500);

/// Rapid-fire cooldown divisor
pub const RAPID_FIRE_DIVISOR: u32 = 3;

/// Standard projectile radius
pub const PROJECTILE_RADIUS: f64 = 10.0;

/// Mega projectile radius
pub const MEGA_PROJECTILE_RADIUS: f64 = 15.0;

/// Standard projectile damage
pub const PROJECTILE_DAMAGE: i32 = 15;

/// Mega shot speed multiplier
pub const MEGA_SPEED_MULT: f64 = 1.25;

/// Mega shot damage and knockback multiplier
pub const MEGA_POWER_MULT: i32 = 2;

/// Base knockback impulse
pub const KNOCKBACK_FORCE: f64 = 8.0;

/// Fraction of the impulse added on top of stronger existing velocity
pub const KNOCKBACK_STACK_FACTOR: f64 = 0.5;

/// Maximum horizontal speed after stacked knockback
pub const KNOCKBACK_MAX_SPEED: f64 = 20.0;

/// Upward velocity applied on hit
pub const HIT_POP_VELOCITY: f64 = -5.0;

/// Hit flash duration for renderers (300 ms)
pub const HIT_FLASH_TICKS: u32 = ms_to_ticks(300);

/// Upward launch on death
pub const DEATH_LAUNCH_VELOCITY: f64 = -8.0;

/// Death spin range: horizontal velocity in [-DEATH_SPIN, DEATH_SPIN)
pub const DEATH_SPIN: f64 = 2.0;

/// Time spent in the Dead state before the respawn countdown (1500 ms)
pub const DEATH_DELAY_TICKS: u32 = ms_to_ticks(1500);

/// Respawning bodies drop in from this height
pub const RESPAWN_DROP_Y: f64 = -100.0;

// =============================================================================
// ZONES
// =============================================================================

/// Capture progress per 100 ms at multiplier 1.0 (5 s to capture)
pub const BASE_CAPTURE_SPEED: f64 = 2.0;

/// Neutral progress decay per 100 ms
pub const NEUTRAL_DECAY_SPEED: f64 = 0.2;

/// Full capture
pub const MAX_CAPTURE_PROGRESS: f64 = 100.0;

/// Progress within this distance of a bound snaps to it
pub const CAPTURE_EPSILON: f64 = 1e-9;

/// Domination scoring interval (100 ms)
pub const SCORE_INTERVAL_TICKS: u32 = ms_to_ticks(100);

// =============================================================================
// POWER-UPS
// =============================================================================

/// Power-up box size
pub const POWER_UP_SIZE: f64 = 25.0;

/// Drop-in animation before an instance becomes collectible (800 ms)
pub const POWER_UP_SPAWN_TICKS: u32 = ms_to_ticks(800);

/// Collectible lifetime (20 s)
pub const POWER_UP_LIFETIME_TICKS: u32 = secs_to_ticks(20);

/// Terminal instances linger this long for cosmetic completion (2 s)
pub const POWER_UP_GRACE_TICKS: u32 = secs_to_ticks(2);

/// Candidate locations closer than this on both axes to a live instance are skipped
pub const POWER_UP_MIN_SEPARATION: f64 = 50.0;

/// Drop-in starts this far above the anchor
pub const POWER_UP_DROP_HEIGHT: f64 = 150.0;

/// Bob amplitude
pub const POWER_UP_BOB_AMPLITUDE: f64 = 3.0;

/// Bob angular speed per millisecond
pub const POWER_UP_BOB_SPEED: f64 = 0.03;
