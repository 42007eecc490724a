//! Projectile Combat
//!
//! Shooting, projectile flight and hits, damage with knockback, death and
//! the two-stage respawn.
//!
//! ## Life cycle
//!
//! ```text
//! Alive --(health <= 0)--> Dead --(DEATH_DELAY)--> Respawning --(respawn_secs)--> Alive
//! ```
//!
//! Both delays are counted from the tick of death.
//!
//! Only Alive combatants move under input, shoot, capture, collect and
//! take hits.

use crate::core::constants::{
    COMBATANT_WIDTH, COMBATANT_HEIGHT, SHOOT_COOLDOWN_TICKS, RAPID_FIRE_DIVISOR,
    PROJECTILE_RADIUS, MEGA_PROJECTILE_RADIUS, PROJECTILE_DAMAGE, MEGA_SPEED_MULT,
    MEGA_POWER_MULT, KNOCKBACK_FORCE, KNOCKBACK_STACK_FACTOR, KNOCKBACK_MAX_SPEED,
    HIT_POP_VELOCITY, DEATH_LAUNCH_VELOCITY, DEATH_SPIN, DEATH_DELAY_TICKS,
    RESPAWN_DROP_Y,
};
use crate::core::rng::DeterministicRng;
use crate::core::vec2::{Vec2, Rect};
use crate::game::collision::circle_hits_rect;
use crate::game::events::GameEvent;
use crate::game::input::InputFrame;
use crate::game::state::{BuffKind, Combatant, LifeState, MatchState, Projectile, Side, Tick};

/// Result of applying damage to a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Target could not be hit (dead or respawning)
    Ignored,
    /// Shield absorbed the hit; no damage, no knockback
    Blocked,
    /// Damage and knockback applied
    Applied {
        /// Health dropped to zero or below
        killed: bool,
    },
}

/// Life-state change produced by `poll_life_state`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifeTransition {
    /// Dead -> Respawning
    RespawnStarted,
    /// Respawning -> Alive
    Respawned,
}

// =============================================================================
// SHOOTING
// =============================================================================

/// Shot cooldown for this combatant right now.
pub fn shot_cooldown(body: &mut Combatant, now: Tick) -> u32 {
    if body.has_buff(BuffKind::RapidFire, now) {
        SHOOT_COOLDOWN_TICKS / RAPID_FIRE_DIVISOR
    } else {
        SHOOT_COOLDOWN_TICKS
    }
}

/// Is the cooldown satisfied?
pub fn can_shoot(body: &mut Combatant, now: Tick) -> bool {
    let cooldown = shot_cooldown(body, now);
    body.last_shot
        .map_or(true, |last| now.saturating_sub(last) >= cooldown)
}

/// Build a projectile leaving the shooter's facing side at mid-height.
///
/// A Mega buff widens the shot, doubles damage and knockback and makes it
/// faster.
pub fn make_projectile(body: &mut Combatant, speed: f64, now: Tick) -> Projectile {
    let mega = body.has_buff(BuffKind::Mega, now);
    let direction = body.facing.sign();

    let x = if direction > 0.0 {
        body.position.x + COMBATANT_WIDTH
    } else {
        body.position.x
    };
    let y = body.position.y + COMBATANT_HEIGHT / 2.0;

    let (radius, damage, knockback, speed) = if mega {
        (
            MEGA_PROJECTILE_RADIUS,
            PROJECTILE_DAMAGE * MEGA_POWER_MULT,
            MEGA_POWER_MULT as f64,
            speed * MEGA_SPEED_MULT,
        )
    } else {
        (PROJECTILE_RADIUS, PROJECTILE_DAMAGE, 1.0, speed)
    };

    Projectile {
        owner: body.side,
        position: Vec2::new(x, y),
        velocity_x: direction * speed,
        radius,
        damage,
        knockback,
        mega,
        active: true,
    }
}

/// Fire a shot for `side` if it can act and its cooldown allows.
pub fn try_shoot(state: &mut MatchState, side: Side) -> bool {
    let now = state.tick;
    let speed = state.settings.projectile_speed;

    let shooter = state.combatant_mut(side);
    if !shooter.can_act() || !can_shoot(shooter, now) {
        return false;
    }

    let projectile = make_projectile(shooter, speed, now);
    shooter.last_shot = Some(now);

    tracing::debug!(tick = now, ?side, mega = projectile.mega, "Shot fired");
    state.push_event(GameEvent::shot_fired(now, side, projectile.mega, projectile.position));
    state.projectiles.push(projectile);
    true
}

/// Handle shoot intents for both sides, A first.
pub fn process_shots(state: &mut MatchState, inputs: &[InputFrame; 2]) -> [bool; 2] {
    let mut fired = [false; 2];
    for side in Side::BOTH {
        if inputs[side.index()].shoot() {
            fired[side.index()] = try_shoot(state, side);
        }
    }
    fired
}

// =============================================================================
// DAMAGE AND DEATH
// =============================================================================

/// Apply a hit.
///
/// `knockback` scales the base impulse; `direction` is the projectile's
/// travel sign. Knockback replaces weaker horizontal velocity and stacks
/// at half strength onto stronger velocity, capped at
/// `KNOCKBACK_MAX_SPEED`.
pub fn take_damage(
    body: &mut Combatant,
    damage: i32,
    knockback: f64,
    direction: f64,
    now: Tick,
    rng: &mut DeterministicRng,
) -> DamageOutcome {
    if !body.can_act() {
        return DamageOutcome::Ignored;
    }
    if body.has_buff(BuffKind::Shield, now) {
        return DamageOutcome::Blocked;
    }

    body.health -= damage;

    let impulse = direction * knockback * KNOCKBACK_FORCE;
    if body.velocity.x.abs() < impulse.abs() {
        body.velocity.x = impulse;
    } else {
        body.velocity.x = (body.velocity.x + impulse * KNOCKBACK_STACK_FACTOR)
            .clamp(-KNOCKBACK_MAX_SPEED, KNOCKBACK_MAX_SPEED);
    }

    if body.grounded || body.velocity.y > 0.0 {
        body.velocity.y = HIT_POP_VELOCITY;
    }
    body.last_hit = Some(now);

    let killed = body.health <= 0;
    if killed {
        die(body, now, rng);
    }

    DamageOutcome::Applied { killed }
}

/// Enter the Dead state with a launch and a random horizontal spin.
pub fn die(body: &mut Combatant, now: Tick, rng: &mut DeterministicRng) {
    body.life = LifeState::Dead { since: now };
    body.deaths += 1;
    body.health = 0;
    body.velocity = Vec2::new(rng.next_f64_range(-DEATH_SPIN, DEATH_SPIN), DEATH_LAUNCH_VELOCITY);
    body.grounded = false;
    body.buffs.clear();
}

/// Advance the Dead -> Respawning -> Alive timers.
///
/// The respawn countdown runs from the moment of death, so a body is back
/// after `respawn_ticks` or one tick past the death delay, whichever is
/// later.
pub fn poll_life_state(body: &mut Combatant, now: Tick, respawn_ticks: u32) -> Option<LifeTransition> {
    match body.life {
        LifeState::Alive => None,
        LifeState::Dead { since } if now.saturating_sub(since) >= DEATH_DELAY_TICKS => {
            body.life = LifeState::Respawning { since };
            body.position = Vec2::new(body.spawn_point.x, RESPAWN_DROP_Y);
            body.velocity = Vec2::ZERO;
            body.grounded = false;
            Some(LifeTransition::RespawnStarted)
        }
        LifeState::Respawning { since } if now.saturating_sub(since) >= respawn_ticks => {
            body.life = LifeState::Alive;
            body.health = body.max_health;
            body.position = body.spawn_point;
            body.velocity = Vec2::ZERO;
            body.grounded = false;
            body.was_grounded_last_tick = false;
            Some(LifeTransition::Respawned)
        }
        LifeState::Dead { .. } | LifeState::Respawning { .. } => None,
    }
}

// =============================================================================
// PROJECTILES
// =============================================================================

fn out_of_bounds(projectile: &Projectile, bounds: &Rect) -> bool {
    let p = projectile.position;
    let r = projectile.radius;
    p.x - r < bounds.left() || p.x + r > bounds.right() || p.y - r < bounds.top() || p.y + r > bounds.bottom()
}

/// Move every projectile, resolve hits against the opponent and drop
/// spent shots.
///
/// A projectile never hits its owner and is consumed by any hit, blocked
/// or not.
pub fn advance_projectiles(state: &mut MatchState) {
    let now = state.tick;
    let bounds = state.layout.bounds();

    for projectile in state.projectiles.iter_mut() {
        projectile.position.x += projectile.velocity_x;

        if out_of_bounds(projectile, &bounds) {
            projectile.active = false;
            continue;
        }

        let target_side = projectile.owner.opponent();
        let target = &mut state.combatants[target_side.index()];
        if !target.can_act() || !circle_hits_rect(projectile.position, projectile.radius, &target.rect()) {
            continue;
        }

        projectile.active = false;
        let outcome = take_damage(
            target,
            projectile.damage,
            projectile.knockback,
            projectile.direction(),
            now,
            &mut state.rng,
        );

        match outcome {
            DamageOutcome::Ignored => {}
            DamageOutcome::Blocked => {
                state.pending_events.push(GameEvent::shot_blocked(now, target_side, projectile.position));
            }
            DamageOutcome::Applied { killed } => {
                let health_after = target.health;
                state.pending_events.push(GameEvent::projectile_hit(
                    now,
                    target_side,
                    projectile.damage,
                    health_after,
                    projectile.position,
                ));

                if killed {
                    state.combatants[projectile.owner.index()].kills += 1;
                    tracing::info!(tick = now, victim = ?target_side, killer = ?projectile.owner, "Combatant killed");
                    state.pending_events.push(GameEvent::combatant_killed(now, target_side, projectile.owner));
                }
            }
        }
    }

    state.projectiles.retain(|p| p.active);
}

// =============================================================================
// TESTS
// =============================================================================
