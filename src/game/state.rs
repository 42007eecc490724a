//! Game State Definitions
//!
//! All state types for match simulation. `MatchState` is the simulation
//! context: it exclusively owns every entity store and only hands out
//! shared references to callers outside the crate.
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::config::MatchSettings;
use crate::core::constants::{
    COMBATANT_WIDTH, COMBATANT_HEIGHT, HIT_FLASH_TICKS, MAX_CAPTURE_PROGRESS,
    POWER_UP_SIZE, POWER_UP_DROP_HEIGHT, POWER_UP_SPAWN_TICKS,
    POWER_UP_BOB_AMPLITUDE, POWER_UP_BOB_SPEED, TICK_MS,
    secs_to_ticks,
};
use crate::core::vec2::{Vec2, Rect};
use crate::core::rng::{DeterministicRng, derive_match_seed};
use crate::core::hash::{StateHash, StateHasher, compute_state_hash};
use crate::game::events::GameEvent;
use crate::game::map::ArenaLayout;
use crate::TICK_RATE;

/// Simulation timestamp, in ticks since the start of the round.
pub type Tick = u32;

// =============================================================================
// SIDE
// =============================================================================

/// One of the two combatants.
///
/// Implements Ord so A is always evaluated before B.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    /// First combatant (left spawn)
    A = 0,
    /// Second combatant (right spawn)
    B = 1,
}

impl Side {
    /// Both sides in evaluation order.
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    /// Index into per-side arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The other combatant.
    #[inline]
    pub const fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// Horizontal facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    /// Facing -X
    Left,
    /// Facing +X
    Right,
}

impl Facing {
    /// -1.0 for left, 1.0 for right.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

// =============================================================================
// LIFE STATE
// =============================================================================

/// Mutually exclusive combatant status.
///
/// Transitions are polled once per tick against the stored timestamps:
/// Alive -> Dead (on lethal damage) -> Respawning (after the death delay)
/// -> Alive (after the respawn countdown).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeState {
    /// Playing normally
    Alive,
    /// Launched by a lethal hit, not yet counting down
    Dead {
        /// Tick of death
        since: Tick,
    },
    /// Dropping back in from above the arena
    Respawning {
        /// Tick of death; the respawn countdown runs from here
        since: Tick,
    },
}

impl LifeState {
    /// Stable tag for hashing.
    fn tag(self) -> u8 {
        match self {
            LifeState::Alive => 0,
            LifeState::Dead { .. } => 1,
            LifeState::Respawning { .. } => 2,
        }
    }

    /// Tick the current non-alive phase started.
    fn since(self) -> Option<Tick> {
        match self {
            LifeState::Alive => None,
            LifeState::Dead { since } | LifeState::Respawning { since } => Some(since),
        }
    }
}

// =============================================================================
// BUFFS
// =============================================================================

/// Timed capability modifier granted by a power-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BuffKind {
    /// Run speed and acceleration x1.5
    Speed = 0,
    /// Jump force x1.4
    Jump = 1,
    /// Shot cooldown divided by 3
    RapidFire = 2,
    /// Blocks damage and knockback
    Shield = 3,
    /// Larger, faster, harder-hitting shots
    Mega = 4,
}

impl BuffKind {
    /// Every kind, in spawn-table order.
    pub const ALL: [BuffKind; 5] = [
        BuffKind::Speed,
        BuffKind::Jump,
        BuffKind::RapidFire,
        BuffKind::Shield,
        BuffKind::Mega,
    ];

    /// How long the buff lasts once collected.
    pub const fn duration_ticks(self) -> u32 {
        match self {
            BuffKind::Speed => secs_to_ticks(5),
            BuffKind::Jump => secs_to_ticks(5),
            BuffKind::RapidFire => secs_to_ticks(7),
            BuffKind::Shield => secs_to_ticks(8),
            BuffKind::Mega => secs_to_ticks(6),
        }
    }

    /// Display name for HUDs.
    pub const fn label(self) -> &'static str {
        match self {
            BuffKind::Speed => "Speed Boost",
            BuffKind::Jump => "Super Jump",
            BuffKind::RapidFire => "Rapid Fire",
            BuffKind::Shield => "Shield",
            BuffKind::Mega => "Mega Shot",
        }
    }
}

/// A buff as reported to a HUD.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveBuff {
    /// Which buff
    pub kind: BuffKind,
    /// Seconds until it expires
    pub remaining_secs: f64,
}

/// Type-keyed buff expiry map.
///
/// A buff is active while `now < expiry`. Expired entries are evicted
/// lazily on query and in bulk at the start of every tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BuffLedger {
    expiries: BTreeMap<BuffKind, Tick>,
}

impl BuffLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant or refresh a buff. Refreshing overwrites the expiry.
    pub fn grant(&mut self, kind: BuffKind, now: Tick) {
        self.expiries.insert(kind, now.saturating_add(kind.duration_ticks()));
    }

    /// Query a buff, evicting it if expired.
    pub fn is_active(&mut self, kind: BuffKind, now: Tick) -> bool {
        match self.expiries.get(&kind) {
            Some(&expiry) if now < expiry => true,
            Some(_) => {
                self.expiries.remove(&kind);
                false
            }
            None => false,
        }
    }

    /// Query a buff without evicting.
    pub fn peek(&self, kind: BuffKind, now: Tick) -> bool {
        self.expiries.get(&kind).is_some_and(|&expiry| now < expiry)
    }

    /// Drop every expired entry.
    pub fn evict_expired(&mut self, now: Tick) {
        self.expiries.retain(|_, expiry| now < *expiry);
    }

    /// Remove all buffs.
    pub fn clear(&mut self) {
        self.expiries.clear();
    }

    /// Expiry tick of a buff, if present.
    pub fn expiry(&self, kind: BuffKind) -> Option<Tick> {
        self.expiries.get(&kind).copied()
    }

    /// Active buffs with remaining time, in kind order.
    pub fn active(&self, now: Tick) -> Vec<ActiveBuff> {
        self.expiries
            .iter()
            .filter(|(_, &expiry)| now < expiry)
            .map(|(&kind, &expiry)| ActiveBuff {
                kind,
                remaining_secs: (expiry - now) as f64 / TICK_RATE as f64,
            })
            .collect()
    }

    /// Number of stored entries (including not-yet-evicted expired ones).
    pub fn len(&self) -> usize {
        self.expiries.len()
    }

    /// True if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty()
    }

    fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.expiries.len() as u32);
        for (kind, expiry) in &self.expiries {
            hasher.update_u8(*kind as u8);
            hasher.update_u32(*expiry);
        }
    }
}

// =============================================================================
// COMBATANT
// =============================================================================

/// State of one combatant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Combatant {
    /// Which side this is
    pub side: Side,

    /// Top-left corner of the hitbox
    pub position: Vec2,

    /// Velocity per tick
    pub velocity: Vec2,

    /// Facing direction (shots leave from this side)
    pub facing: Facing,

    /// Resting on the floor or a platform top
    pub grounded: bool,

    /// Grounded state before this tick's collision pass
    pub was_grounded_last_tick: bool,

    /// Jump input seen on the previous tick
    pub was_jumping_last_tick: bool,

    /// Current health, 0 unless Alive
    pub health: i32,

    /// Health restored on respawn
    pub max_health: i32,

    /// Life state
    pub life: LifeState,

    /// Timed buffs
    pub buffs: BuffLedger,

    /// Opponents killed
    pub kills: u32,

    /// Times killed
    pub deaths: u32,

    /// Zone-ownership time accumulated, in zone-ticks
    pub domination_ticks: u64,

    /// Tick of the last shot
    pub last_shot: Option<Tick>,

    /// Tick of the last damaging hit
    pub last_hit: Option<Tick>,

    /// Where the combatant respawns
    pub spawn_point: Vec2,
}

impl Combatant {
    /// Create a combatant standing at its spawn point.
    pub fn new(side: Side, spawn_point: Vec2, max_health: i32) -> Self {
        Self {
            side,
            position: spawn_point,
            velocity: Vec2::ZERO,
            facing: match side {
                Side::A => Facing::Right,
                Side::B => Facing::Left,
            },
            grounded: false,
            was_grounded_last_tick: false,
            was_jumping_last_tick: false,
            health: max_health,
            max_health,
            life: LifeState::Alive,
            buffs: BuffLedger::new(),
            kills: 0,
            deaths: 0,
            domination_ticks: 0,
            last_shot: None,
            last_hit: None,
            spawn_point,
        }
    }

    /// Hitbox.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::at(self.position, COMBATANT_WIDTH, COMBATANT_HEIGHT)
    }

    /// Alive and not respawning: may move, shoot, capture, collect and be hit.
    #[inline]
    pub fn can_act(&self) -> bool {
        self.life == LifeState::Alive
    }

    /// Query a buff (lazy eviction).
    #[inline]
    pub fn has_buff(&mut self, kind: BuffKind, now: Tick) -> bool {
        self.buffs.is_active(kind, now)
    }

    /// Domination score in seconds of zone ownership.
    pub fn domination_score(&self) -> f64 {
        self.domination_ticks as f64 / TICK_RATE as f64
    }

    /// kills / max(1, deaths), for display.
    pub fn kill_death_ratio(&self) -> f64 {
        self.kills as f64 / self.deaths.max(1) as f64
    }

    /// True while the hit flash should be drawn.
    pub fn is_flashing(&self, now: Tick) -> bool {
        self.last_hit
            .is_some_and(|hit| now.saturating_sub(hit) < HIT_FLASH_TICKS)
    }

    /// Seconds left on the respawn countdown, if respawning.
    pub fn respawn_secs_left(&self, now: Tick, respawn_ticks: u32) -> Option<f64> {
        match self.life {
            LifeState::Respawning { since } => {
                let left = respawn_ticks.saturating_sub(now.saturating_sub(since));
                Some(left as f64 / TICK_RATE as f64)
            }
            _ => None,
        }
    }

    /// Hash this combatant's state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u8(self.side as u8);
        hasher.update_vec2(self.position);
        hasher.update_vec2(self.velocity);
        hasher.update_bool(self.facing == Facing::Right);
        hasher.update_bool(self.grounded);
        hasher.update_bool(self.was_grounded_last_tick);
        hasher.update_bool(self.was_jumping_last_tick);
        hasher.update_i32(self.health);
        hasher.update_i32(self.max_health);
        hasher.update_u8(self.life.tag());
        hasher.update_opt_u32(self.life.since());
        self.buffs.hash_into(hasher);
        hasher.update_u32(self.kills);
        hasher.update_u32(self.deaths);
        hasher.update_u64(self.domination_ticks);
        hasher.update_opt_u32(self.last_shot);
        hasher.update_opt_u32(self.last_hit);
    }
}

// =============================================================================
// PLATFORMS AND ZONES
// =============================================================================

/// What a zone is doing this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureStatus {
    /// Nobody standing on it
    Idle,
    /// One side standing on it alone
    Capturing(Side),
    /// Both sides standing on it
    Contested,
}

/// Capture state of a zone platform.
///
/// `owner` is only set at full progress. `claimant` is the side whose
/// partial progress the bar currently shows; a zone must drain back to
/// zero before it can be claimed by the other side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneState {
    /// Zone label
    pub label: char,
    /// Fully captured by
    pub owner: Option<Side>,
    /// Side the current progress belongs to
    pub claimant: Option<Side>,
    /// Capture progress in [0, 100]
    pub progress: f64,
    /// Occupancy this tick
    pub status: CaptureStatus,
}

impl ZoneState {
    /// A neutral, empty zone.
    pub fn new(label: char) -> Self {
        Self {
            label,
            owner: None,
            claimant: None,
            progress: 0.0,
            status: CaptureStatus::Idle,
        }
    }

    /// Fraction of the bar filled, in [0, 1].
    pub fn fill(&self) -> f64 {
        self.progress / MAX_CAPTURE_PROGRESS
    }
}

/// A static platform, optionally a capturable zone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    /// Collision rectangle
    pub rect: Rect,
    /// Capture state if this platform is a zone
    pub zone: Option<ZoneState>,
}

impl Platform {
    /// Is this platform capturable?
    #[inline]
    pub fn is_zone(&self) -> bool {
        self.zone.is_some()
    }
}

// =============================================================================
// PROJECTILES
// =============================================================================

/// A shot in flight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Shooter (never hits its own side)
    pub owner: Side,
    /// Center
    pub position: Vec2,
    /// Horizontal speed per tick, signed
    pub velocity_x: f64,
    /// Hit radius
    pub radius: f64,
    /// Damage on hit
    pub damage: i32,
    /// Knockback multiplier
    pub knockback: f64,
    /// Fired under the Mega buff
    pub mega: bool,
    /// Cleared exactly once, on hit or leaving the arena
    pub active: bool,
}

impl Projectile {
    /// +1.0 if travelling right, -1.0 otherwise.
    #[inline]
    pub fn direction(&self) -> f64 {
        if self.velocity_x > 0.0 { 1.0 } else { -1.0 }
    }
}

// =============================================================================
// POWER-UPS
// =============================================================================

/// Power-up lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpState {
    /// Dropping in, not collectible
    Spawning,
    /// Collectible
    Active,
    /// Picked up (terminal)
    Collected {
        /// Collector
        by: Side,
    },
    /// Expired uncollected (terminal)
    Despawned,
}

impl PowerUpState {
    fn tag(self) -> u8 {
        match self {
            PowerUpState::Spawning => 0,
            PowerUpState::Active => 1,
            PowerUpState::Collected { by } => 2 + by as u8,
            PowerUpState::Despawned => 4,
        }
    }
}

/// A pickup instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    /// Unique instance ID (monotonic counter)
    pub id: u32,
    /// Buff granted on collection
    pub kind: BuffKind,
    /// Resting top-left corner
    pub anchor: Vec2,
    /// Lifecycle state
    pub state: PowerUpState,
    /// Tick the drop-in began
    pub spawned_at: Tick,
    /// Tick it became collectible
    pub active_since: Option<Tick>,
    /// Tick it reached a terminal state
    pub ended_at: Option<Tick>,
}

impl PowerUp {
    /// Create a power-up that starts dropping in at `now`.
    pub fn new(id: u32, kind: BuffKind, anchor: Vec2, now: Tick) -> Self {
        Self {
            id,
            kind,
            anchor,
            state: PowerUpState::Spawning,
            spawned_at: now,
            active_since: None,
            ended_at: None,
        }
    }

    /// Collision box at the anchor.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::at(self.anchor, POWER_UP_SIZE, POWER_UP_SIZE)
    }

    /// Spawning or Active.
    #[inline]
    pub fn is_live(&self) -> bool {
        matches!(self.state, PowerUpState::Spawning | PowerUpState::Active)
    }

    /// Drop-in progress in [0, 1].
    pub fn drop_progress(&self, now: Tick) -> f64 {
        match self.state {
            PowerUpState::Spawning => {
                (now.saturating_sub(self.spawned_at) as f64 / POWER_UP_SPAWN_TICKS as f64).min(1.0)
            }
            _ => 1.0,
        }
    }

    /// Vertical bob while Active.
    pub fn bob_offset(&self, now: Tick) -> f64 {
        match self.state {
            PowerUpState::Active => {
                let ms = now as f64 * TICK_MS;
                (ms * POWER_UP_BOB_SPEED).sin() * POWER_UP_BOB_AMPLITUDE
            }
            _ => 0.0,
        }
    }

    /// Where a renderer should draw the box.
    pub fn draw_position(&self, now: Tick) -> Vec2 {
        let lift = POWER_UP_DROP_HEIGHT * (1.0 - self.drop_progress(now));
        Vec2::new(self.anchor.x, self.anchor.y - lift + self.bob_offset(now))
    }

    fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.id);
        hasher.update_u8(self.kind as u8);
        hasher.update_vec2(self.anchor);
        hasher.update_u8(self.state.tag());
        hasher.update_u32(self.spawned_at);
        hasher.update_opt_u32(self.active_since);
        hasher.update_opt_u32(self.ended_at);
    }
}

// =============================================================================
// MATCH OUTCOME
// =============================================================================

/// Why the match ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// A domination score reached the win threshold
    ScoreThreshold,
    /// The clock ran out
    TimeExpired,
}

/// Which comparison produced the winner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecidedBy {
    /// Higher domination score
    DominationScore,
    /// Equal scores, more zones owned
    ZonesOwned,
    /// Equal zones, higher kills/max(1, deaths)
    KillDeathRatio,
    /// Everything equal, side A by convention
    Fallback,
}

/// Resolved result of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Winner
    pub winner: Side,
    /// Why the match ended
    pub reason: EndReason,
    /// Which comparison decided it
    pub decided_by: DecidedBy,
    /// Tick the match ended
    pub tick: Tick,
}

// =============================================================================
// MATCH STATE
// =============================================================================

/// Complete state of a match.
///
/// Owns every entity store. Simulation systems in this crate mutate it
/// through `pub(crate)` fields; everything else reads through accessors.
#[derive(Clone, Debug)]
pub struct MatchState {
    /// Match identifier
    pub(crate) match_id: [u8; 16],

    /// Restart counter (0 for the first round)
    pub(crate) round: u32,

    /// RNG seed of the current round
    pub(crate) rng_seed: u64,

    /// Deterministic RNG state
    pub(crate) rng: DeterministicRng,

    /// Settings applied at the last (re)start
    pub(crate) settings: MatchSettings,

    /// Static arena description
    pub(crate) layout: ArenaLayout,

    /// Current tick
    pub(crate) tick: Tick,

    /// Both combatants, indexed by `Side::index`
    pub(crate) combatants: [Combatant; 2],

    /// Platforms in layout order
    pub(crate) platforms: Vec<Platform>,

    /// Shots in flight
    pub(crate) projectiles: Vec<Projectile>,

    /// Power-ups (BTreeMap for deterministic iteration)
    pub(crate) power_ups: BTreeMap<u32, PowerUp>,

    /// Next power-up ID (monotonic counter)
    pub(crate) next_power_up_id: u32,

    /// Tick of the last spawn attempt
    pub(crate) last_power_up_attempt: Tick,

    /// Tick domination score was last awarded
    pub(crate) last_score_tick: Tick,

    /// Set once the match is decided
    pub(crate) outcome: Option<MatchOutcome>,

    /// Events generated this tick (cleared each tick)
    pub(crate) pending_events: Vec<GameEvent>,
}

impl MatchState {
    /// Create a new match. Settings are clamped before use.
    pub fn new(match_id: [u8; 16], rng_seed: u64, settings: MatchSettings, layout: ArenaLayout) -> Self {
        let settings = settings.clamped();
        let combatants = Self::fresh_combatants(&layout, &settings);
        let platforms = layout.build_platforms();

        tracing::info!(
            match_id = %hex::encode(match_id),
            rng_seed,
            duration_secs = settings.match_duration_secs,
            zones = layout.zone_count(),
            "Match created"
        );

        Self {
            match_id,
            round: 0,
            rng_seed,
            rng: DeterministicRng::new(rng_seed),
            settings,
            layout,
            tick: 0,
            combatants,
            platforms,
            projectiles: Vec::new(),
            power_ups: BTreeMap::new(),
            next_power_up_id: 0,
            last_power_up_attempt: 0,
            last_score_tick: 0,
            outcome: None,
            pending_events: Vec::new(),
        }
    }

    /// Create a match on the classic arena.
    pub fn classic(match_id: [u8; 16], rng_seed: u64, settings: MatchSettings) -> Self {
        Self::new(match_id, rng_seed, settings, ArenaLayout::classic())
    }

    /// Start a new round with new settings.
    ///
    /// Must be called between ticks. Projectiles and power-ups are
    /// discarded; combatants and zones are rebuilt from the layout.
    /// The next round's seed is derived from the match ID and round number.
    pub fn restart(&mut self, settings: MatchSettings) {
        self.round += 1;
        self.rng_seed = derive_match_seed(&self.match_id, self.round);
        self.rng = DeterministicRng::new(self.rng_seed);
        self.settings = settings.clamped();
        self.tick = 0;
        self.combatants = Self::fresh_combatants(&self.layout, &self.settings);
        self.platforms = self.layout.build_platforms();
        self.projectiles.clear();
        self.power_ups.clear();
        self.next_power_up_id = 0;
        self.last_power_up_attempt = 0;
        self.last_score_tick = 0;
        self.outcome = None;
        self.pending_events.clear();

        tracing::info!(round = self.round, rng_seed = self.rng_seed, "Match restarted");
    }

    fn fresh_combatants(layout: &ArenaLayout, settings: &MatchSettings) -> [Combatant; 2] {
        Side::BOTH.map(|side| Combatant::new(side, layout.spawn_point(side), settings.starting_health))
    }

    // ===== Read access =====

    /// Match identifier.
    pub fn match_id(&self) -> [u8; 16] {
        self.match_id
    }

    /// Restart counter.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Seed of the current round.
    pub fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// Current tick.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Active settings.
    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    /// Arena layout.
    pub fn layout(&self) -> &ArenaLayout {
        &self.layout
    }

    /// One combatant.
    pub fn combatant(&self, side: Side) -> &Combatant {
        &self.combatants[side.index()]
    }

    /// Both combatants.
    pub fn combatants(&self) -> &[Combatant; 2] {
        &self.combatants
    }

    pub(crate) fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        &mut self.combatants[side.index()]
    }

    /// All platforms, zones included.
    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    /// Zones with their platform index.
    pub fn zones(&self) -> impl Iterator<Item = (usize, &Platform, &ZoneState)> {
        self.platforms
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.zone.as_ref().map(|z| (i, p, z)))
    }

    /// Number of zones fully owned by `side`.
    pub fn zones_owned(&self, side: Side) -> u32 {
        self.zones().filter(|(_, _, z)| z.owner == Some(side)).count() as u32
    }

    /// Shots in flight.
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Power-ups in ID order, terminal ones included until their grace ends.
    pub fn power_ups(&self) -> impl Iterator<Item = &PowerUp> {
        self.power_ups.values()
    }

    /// Power-ups that are Spawning or Active.
    pub fn live_power_up_count(&self) -> usize {
        self.power_ups.values().filter(|p| p.is_live()).count()
    }

    /// Match result once decided.
    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.outcome.as_ref()
    }

    /// Has the match ended?
    pub fn is_ended(&self) -> bool {
        self.outcome.is_some()
    }

    /// Ticks until the clock runs out.
    pub fn remaining_ticks(&self) -> u32 {
        self.settings.match_duration_ticks().saturating_sub(self.tick)
    }

    /// Seconds until the clock runs out.
    pub fn remaining_secs(&self) -> f64 {
        self.remaining_ticks() as f64 / TICK_RATE as f64
    }

    /// HUD buff list for one combatant.
    pub fn active_buffs(&self, side: Side) -> Vec<ActiveBuff> {
        self.combatant(side).buffs.active(self.tick)
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.rng_seed, |hasher| {
            let [s0, s1] = self.rng.state();
            hasher.update_u64(s0);
            hasher.update_u64(s1);

            for combatant in &self.combatants {
                combatant.hash_into(hasher);
            }

            for (i, platform, zone) in self.zones() {
                hasher.update_u32(i as u32);
                hasher.update_rect(&platform.rect);
                hasher.update_u8(zone.owner.map_or(0, |s| s as u8 + 1));
                hasher.update_u8(zone.claimant.map_or(0, |s| s as u8 + 1));
                hasher.update_f64(zone.progress);
            }

            hasher.update_u32(self.projectiles.len() as u32);
            for p in &self.projectiles {
                hasher.update_u8(p.owner as u8);
                hasher.update_vec2(p.position);
                hasher.update_f64(p.velocity_x);
                hasher.update_bool(p.mega);
            }

            hasher.update_u32(self.power_ups.len() as u32);
            for power_up in self.power_ups.values() {
                power_up.hash_into(hasher);
            }

            hasher.update_u32(self.last_power_up_attempt);
            hasher.update_u32(self.last_score_tick);
            hasher.update_bool(self.outcome.is_some());
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

// =============================================================================
// TESTS
// =============================================================================
