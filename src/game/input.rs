//! Input Capture and Normalization
//!
//! Turns key presses and releases into per-tick intent frames, and records
//! those frames compactly for replay.
//!
//! Jump and shoot are latched once per physical press: holding a key
//! does not re-trigger it. Shoot additionally stays latched until the
//! consumer acknowledges the shot, so a press during cooldown is not lost.

use serde::{Serialize, Deserialize};
use crate::game::state::{Side, Tick};

// =============================================================================
// INPUT TYPES
// =============================================================================

/// Intent for a single tick.
///
/// NO tick field - tick is stored separately for compression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputFrame {
    /// Action flags (packed bits):
    /// - Bit 0: Move left
    /// - Bit 1: Move right
    /// - Bit 2: Jump held (latched per press)
    /// - Bit 3: Shoot pending
    /// - Bit 4-7: Reserved
    pub flags: u8,
}

impl InputFrame {
    /// Left flag bit
    pub const FLAG_LEFT: u8 = 0x01;

    /// Right flag bit
    pub const FLAG_RIGHT: u8 = 0x02;

    /// Jump flag bit
    pub const FLAG_JUMP: u8 = 0x04;

    /// Shoot flag bit
    pub const FLAG_SHOOT: u8 = 0x08;

    /// Create a new empty input frame.
    pub const fn new() -> Self {
        Self { flags: 0 }
    }

    /// Create a frame from individual intents.
    pub const fn from_intents(left: bool, right: bool, jump: bool, shoot: bool) -> Self {
        let mut flags = 0;
        if left {
            flags |= Self::FLAG_LEFT;
        }
        if right {
            flags |= Self::FLAG_RIGHT;
        }
        if jump {
            flags |= Self::FLAG_JUMP;
        }
        if shoot {
            flags |= Self::FLAG_SHOOT;
        }
        Self { flags }
    }

    /// Moving left?
    #[inline]
    pub fn left(&self) -> bool {
        self.flags & Self::FLAG_LEFT != 0
    }

    /// Moving right?
    #[inline]
    pub fn right(&self) -> bool {
        self.flags & Self::FLAG_RIGHT != 0
    }

    /// Jump held?
    #[inline]
    pub fn jump(&self) -> bool {
        self.flags & Self::FLAG_JUMP != 0
    }

    /// Shot pending?
    #[inline]
    pub fn shoot(&self) -> bool {
        self.flags & Self::FLAG_SHOOT != 0
    }

    /// Desired horizontal direction: -1, 0 or 1. Left wins if both are set.
    #[inline]
    pub fn direction(&self) -> f64 {
        if self.left() {
            -1.0
        } else if self.right() {
            1.0
        } else {
            0.0
        }
    }

    /// Check if this is an idle frame (no input).
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.flags == 0
    }
}

/// Source of per-tick intent for one combatant.
pub trait InputSource {
    /// Intent for the coming tick.
    fn poll(&mut self) -> InputFrame;

    /// Called after a shot was actually fired, so the latched shoot clears.
    fn acknowledge_shot(&mut self) {}
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Logical key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Move left
    Left,
    /// Move right
    Right,
    /// Jump
    Jump,
    /// Shoot
    Shoot,
}

/// Horizontal direction key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Left key
    Left,
    /// Right key
    Right,
}

impl Direction {
    fn other(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Most-recently-pressed direction tracker.
///
/// States: Idle, or Last(dir, at). Pressing a direction makes it the
/// latest. Releasing the latest while the other is still held promotes
/// the other. Releasing with nothing held returns to Idle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionArbiter {
    last: Option<(Direction, u64)>,
}

impl DirectionArbiter {
    /// Record a press.
    pub fn press(&mut self, dir: Direction, at: u64) {
        self.last = Some((dir, at));
    }

    /// Record a release given which directions are still held.
    pub fn release(&mut self, dir: Direction, at: u64, left_held: bool, right_held: bool) {
        let other_held = match dir {
            Direction::Left => right_held,
            Direction::Right => left_held,
        };

        if let Some((last, _)) = self.last {
            if last == dir && other_held {
                self.last = Some((dir.other(), at));
            }
        }

        if !left_held && !right_held {
            self.last = None;
        }
    }

    /// Latest direction and when it became latest.
    pub fn latest(&self) -> Option<(Direction, u64)> {
        self.last
    }

    /// Resolve held keys to at most one direction.
    pub fn resolve(&self, left_held: bool, right_held: bool) -> (bool, bool) {
        match (left_held, right_held, self.last) {
            (true, true, Some((Direction::Left, _))) => (true, false),
            (true, true, Some((Direction::Right, _))) => (false, true),
            (left, right, _) => (left, right),
        }
    }
}

/// Keyboard-style controller for one combatant.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Controller {
    left_held: bool,
    right_held: bool,
    jump: bool,
    shoot: bool,
    jump_down: bool,
    shoot_down: bool,
    arbiter: DirectionArbiter,
}

impl Controller {
    /// Create a controller with nothing held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Key went down. `at` is a monotonic timestamp from the host.
    ///
    /// Auto-repeat presses of a key already down are ignored.
    pub fn press(&mut self, key: Key, at: u64) {
        match key {
            Key::Left => {
                self.left_held = true;
                self.arbiter.press(Direction::Left, at);
            }
            Key::Right => {
                self.right_held = true;
                self.arbiter.press(Direction::Right, at);
            }
            Key::Jump => {
                if !self.jump_down {
                    self.jump = true;
                    self.jump_down = true;
                }
            }
            Key::Shoot => {
                if !self.shoot_down {
                    self.shoot = true;
                    self.shoot_down = true;
                }
            }
        }
    }

    /// Key went up.
    pub fn release(&mut self, key: Key, at: u64) {
        match key {
            Key::Left => {
                self.left_held = false;
                self.arbiter.release(Direction::Left, at, self.left_held, self.right_held);
            }
            Key::Right => {
                self.right_held = false;
                self.arbiter.release(Direction::Right, at, self.left_held, self.right_held);
            }
            Key::Jump => {
                self.jump = false;
                self.jump_down = false;
            }
            Key::Shoot => {
                self.shoot = false;
                self.shoot_down = false;
            }
        }
    }

    /// Clear the pending shot after it was fired.
    pub fn reset_shoot(&mut self) {
        self.shoot = false;
    }

    /// Release everything (focus lost, tab hidden).
    pub fn reset_all(&mut self) {
        *self = Self::default();
    }

    /// Current intent with opposing directions arbitrated.
    pub fn frame(&self) -> InputFrame {
        let (left, right) = self.arbiter.resolve(self.left_held, self.right_held);
        InputFrame::from_intents(left, right, self.jump, self.shoot)
    }

    /// Direction arbiter state.
    pub fn arbiter(&self) -> &DirectionArbiter {
        &self.arbiter
    }
}

impl InputSource for Controller {
    fn poll(&mut self) -> InputFrame {
        self.frame()
    }

    fn acknowledge_shot(&mut self) {
        self.reset_shoot();
    }
}

// =============================================================================
// INPUT RECORDING
// =============================================================================

/// Delta-compressed input for replay.
///
/// Only stored when input CHANGES (not every tick).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDelta {
    /// Tick when this input state began
    pub tick: Tick,
    /// The new input state
    pub frame: InputFrame,
}

impl InputDelta {
    /// Create new delta entry.
    pub fn new(tick: Tick, frame: InputFrame) -> Self {
        Self { tick, frame }
    }
}

/// Complete input recording for one combatant in one round.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputRecording {
    /// Combatant this recording drives
    pub side: Side,

    /// Last recorded tick
    pub end_tick: Tick,

    /// Delta-compressed input data.
    /// Only stores ticks where input CHANGED.
    deltas: Vec<InputDelta>,

    /// Last recorded input (for delta comparison)
    #[serde(skip)]
    last_frame: InputFrame,
}

impl InputRecording {
    /// Create an empty recording.
    pub fn new(side: Side) -> Self {
        Self {
            side,
            end_tick: 0,
            deltas: Vec::with_capacity(256),
            last_frame: InputFrame::new(),
        }
    }

    /// Record input for a tick.
    ///
    /// Only stores if input changed from previous frame.
    pub fn record(&mut self, tick: Tick, frame: InputFrame) {
        self.end_tick = tick;

        if frame != self.last_frame {
            self.deltas.push(InputDelta::new(tick, frame));
            self.last_frame = frame;
        }
    }

    /// Get input at a specific tick.
    pub fn input_at(&self, tick: Tick) -> InputFrame {
        // Last delta at or before this tick
        let idx = self.deltas.partition_point(|d| d.tick <= tick);

        if idx == 0 {
            InputFrame::new()
        } else {
            self.deltas[idx - 1].frame
        }
    }

    /// Number of delta entries.
    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    /// Finalize the recording (call at match end).
    pub fn finalize(&mut self, end_tick: Tick) {
        self.end_tick = end_tick;
    }
}

// =============================================================================
// TESTS
// =============================================================================
