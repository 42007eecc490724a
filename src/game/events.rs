//! Game Events
//!
//! Events generated during simulation for renderers, audio and replay
//! inspection. The simulation never reads them back.

use serde::{Serialize, Deserialize};
use crate::core::vec2::Vec2;
use crate::game::state::{BuffKind, DecidedBy, EndReason, Side, Tick};

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Deaths processed first
    Kill = 0,
    /// Then hits and blocked shots
    Impact = 1,
    /// Then life-state changes
    LifeCycle = 2,
    /// Then zone ownership changes
    Zone = 3,
    /// Then pickups
    PowerUp = 4,
    /// Then new shots
    Shot = 5,
    /// Lowest priority
    Other = 255,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// A projectile left the shooter
    ShotFired {
        /// Side that fired
        shooter: Side,
        /// Fired under the mega buff
        mega: bool,
        /// Spawn point of the projectile
        position: Vec2,
    },

    /// A projectile damaged its target
    ProjectileHit {
        /// Side that was hit
        target: Side,
        /// Damage dealt
        damage: i32,
        /// Target health after the hit
        health_after: i32,
        /// Impact point
        position: Vec2,
    },

    /// A projectile hit a shielded target; no damage, impact still shown
    ShotBlocked {
        /// Shielded side
        target: Side,
        /// Impact point
        position: Vec2,
    },

    /// A hit brought the target to zero health
    CombatantKilled {
        /// Side that died
        victim: Side,
        /// Side credited with the kill
        killer: Side,
    },

    /// Death delay elapsed, body dropping back in
    RespawnStarted {
        /// Respawning side
        side: Side,
    },

    /// Respawn countdown finished
    Respawned {
        /// Side back in play
        side: Side,
    },

    /// A power-up began dropping in
    PowerUpSpawned {
        /// Power-up ID
        id: u32,
        /// Buff it grants
        kind: BuffKind,
        /// Resting position
        anchor: Vec2,
    },

    /// A power-up was picked up
    PowerUpCollected {
        /// Power-up ID
        id: u32,
        /// Buff granted
        kind: BuffKind,
        /// Side that picked it up
        collector: Side,
    },

    /// A power-up expired uncollected
    PowerUpDespawned {
        /// Power-up ID
        id: u32,
        /// Buff it would have granted
        kind: BuffKind,
    },

    /// A zone reached full progress
    ZoneCaptured {
        /// Platform index of the zone
        zone: usize,
        /// Zone label
        label: char,
        /// New owner
        side: Side,
    },

    /// An owned zone started draining and lost its owner
    ZoneNeutralised {
        /// Platform index of the zone
        zone: usize,
        /// Zone label
        label: char,
        /// Side that lost it
        previous_owner: Side,
    },

    /// Match decided
    MatchEnded {
        /// Winning side
        winner: Side,
        /// Why play stopped
        reason: EndReason,
        /// Tiebreak step that picked the winner
        decided_by: DecidedBy,
        /// Ticks played
        duration_ticks: Tick,
    },
}

/// A game event with timing and priority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: Tick,

    /// Processing priority
    pub priority: EventPriority,

    /// Combatant involved (for tie-breaking)
    pub side: Option<Side>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: Tick, priority: EventPriority, data: GameEventData) -> Self {
        let side = match &data {
            GameEventData::ShotFired { shooter, .. } => Some(*shooter),
            GameEventData::ProjectileHit { target, .. } => Some(*target),
            GameEventData::ShotBlocked { target, .. } => Some(*target),
            GameEventData::CombatantKilled { victim, .. } => Some(*victim),
            GameEventData::RespawnStarted { side } => Some(*side),
            GameEventData::Respawned { side } => Some(*side),
            GameEventData::PowerUpCollected { collector, .. } => Some(*collector),
            GameEventData::ZoneCaptured { side, .. } => Some(*side),
            GameEventData::MatchEnded { winner, .. } => Some(*winner),
            _ => None,
        };

        Self {
            tick,
            priority,
            side,
            data,
        }
    }

    /// Create shot fired event.
    pub fn shot_fired(tick: Tick, shooter: Side, mega: bool, position: Vec2) -> Self {
        Self::new(tick, EventPriority::Shot, GameEventData::ShotFired { shooter, mega, position })
    }

    /// Create projectile hit event.
    pub fn projectile_hit(tick: Tick, target: Side, damage: i32, health_after: i32, position: Vec2) -> Self {
        Self::new(
            tick,
            EventPriority::Impact,
            GameEventData::ProjectileHit {
                target,
                damage,
                health_after,
                position,
            },
        )
    }

    /// Create shot blocked event.
    pub fn shot_blocked(tick: Tick, target: Side, position: Vec2) -> Self {
        Self::new(tick, EventPriority::Impact, GameEventData::ShotBlocked { target, position })
    }

    /// Create combatant killed event.
    pub fn combatant_killed(tick: Tick, victim: Side, killer: Side) -> Self {
        Self::new(tick, EventPriority::Kill, GameEventData::CombatantKilled { victim, killer })
    }

    /// Create respawn started event.
    pub fn respawn_started(tick: Tick, side: Side) -> Self {
        Self::new(tick, EventPriority::LifeCycle, GameEventData::RespawnStarted { side })
    }

    /// Create respawned event.
    pub fn respawned(tick: Tick, side: Side) -> Self {
        Self::new(tick, EventPriority::LifeCycle, GameEventData::Respawned { side })
    }

    /// Create power-up spawned event.
    pub fn power_up_spawned(tick: Tick, id: u32, kind: BuffKind, anchor: Vec2) -> Self {
        Self::new(tick, EventPriority::PowerUp, GameEventData::PowerUpSpawned { id, kind, anchor })
    }

    /// Create power-up collected event.
    pub fn power_up_collected(tick: Tick, id: u32, kind: BuffKind, collector: Side) -> Self {
        Self::new(
            tick,
            EventPriority::PowerUp,
            GameEventData::PowerUpCollected { id, kind, collector },
        )
    }

    /// Create power-up despawned event.
    pub fn power_up_despawned(tick: Tick, id: u32, kind: BuffKind) -> Self {
        Self::new(tick, EventPriority::PowerUp, GameEventData::PowerUpDespawned { id, kind })
    }

    /// Create zone captured event.
    pub fn zone_captured(tick: Tick, zone: usize, label: char, side: Side) -> Self {
        Self::new(tick, EventPriority::Zone, GameEventData::ZoneCaptured { zone, label, side })
    }

    /// Create zone neutralised event.
    pub fn zone_neutralised(tick: Tick, zone: usize, label: char, previous_owner: Side) -> Self {
        Self::new(
            tick,
            EventPriority::Zone,
            GameEventData::ZoneNeutralised {
                zone,
                label,
                previous_owner,
            },
        )
    }

    /// Create match ended event.
    pub fn match_ended(tick: Tick, winner: Side, reason: EndReason, decided_by: DecidedBy) -> Self {
        Self::new(
            tick,
            EventPriority::Other,
            GameEventData::MatchEnded {
                winner,
                reason,
                decided_by,
                duration_ticks: tick,
            },
        )
    }
}

impl PartialEq for GameEvent {
    fn eq(&self, other: &Self) -> bool {
        self.tick == other.tick
            && self.priority == other.priority
            && self.side == other.side
            && self.data == other.data
    }
}

impl PartialOrd for GameEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        // Sort by: tick, then priority, then side
        let ordering = self.tick
            .cmp(&other.tick)
            .then(self.priority.cmp(&other.priority))
            .then(self.side.cmp(&other.side));

        match ordering {
            std::cmp::Ordering::Equal if self.data != other.data => None,
            ordering => Some(ordering),
        }
    }
}
