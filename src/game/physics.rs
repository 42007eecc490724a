//! Movement Integrator
//!
//! Advances one combatant's velocity and position for a tick. Alive
//! bodies run the full platformer step; dead and respawning bodies only
//! fall.

use crate::core::constants::{
    ACCELERATION, REVERSAL_DAMPING, GROUND_FRICTION, AIR_FRICTION,
    VELOCITY_EPSILON, FACING_FLIP_SPEED, GRAVITY, TERMINAL_VELOCITY,
    JUMP_FORCE, SPEED_BOOST, JUMP_BOOST,
};
use crate::core::vec2::Rect;
use crate::game::collision::resolve_platforms;
use crate::game::input::InputFrame;
use crate::game::state::{BuffKind, Combatant, Facing, Platform, Tick};

/// Sign that maps zero to zero.
#[inline]
fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Full movement step for an acting combatant.
///
/// Order: horizontal intent, friction, speed clamp, jump, gravity,
/// translation, arena clamps, platform resolution. `grounded` is
/// re-derived every tick by the clamps and the collision pass.
pub fn step_alive(
    body: &mut Combatant,
    input: InputFrame,
    bounds: &Rect,
    platforms: &[Platform],
    max_speed: f64,
    now: Tick,
) {
    let speed_boost = if body.has_buff(BuffKind::Speed, now) { SPEED_BOOST } else { 1.0 };
    let jump_boost = if body.has_buff(BuffKind::Jump, now) { JUMP_BOOST } else { 1.0 };

    // ===== Horizontal =====
    let desired = input.direction();
    if desired != 0.0 {
        if body.velocity.x != 0.0 && sign(body.velocity.x) == -desired {
            body.velocity.x *= REVERSAL_DAMPING;
        }
        body.velocity.x += desired * ACCELERATION * speed_boost;

        // Don't flip while momentum still carries the other way
        if sign(body.velocity.x) == desired || body.velocity.x.abs() < FACING_FLIP_SPEED {
            body.facing = if desired > 0.0 { Facing::Right } else { Facing::Left };
        }
    }

    body.velocity.x *= if body.grounded { GROUND_FRICTION } else { AIR_FRICTION };

    let limit = max_speed * speed_boost;
    body.velocity.x = body.velocity.x.clamp(-limit, limit);
    if body.velocity.x.abs() < VELOCITY_EPSILON {
        body.velocity.x = 0.0;
    }

    // ===== Jump =====
    // Needs a fresh press, or a landing since the previous tick
    if input.jump()
        && body.grounded
        && body.velocity.y >= 0.0
        && (!body.was_jumping_last_tick || !body.was_grounded_last_tick)
    {
        body.velocity.y = JUMP_FORCE * jump_boost;
        body.grounded = false;
    }
    body.was_jumping_last_tick = input.jump();

    // ===== Vertical =====
    if !body.grounded {
        body.velocity.y += GRAVITY;
    }
    body.velocity.y = body.velocity.y.min(TERMINAL_VELOCITY);

    body.position = body.position + body.velocity;

    body.was_grounded_last_tick = body.grounded;
    body.grounded = false;

    clamp_to_arena(body, bounds);
    resolve_platforms(body, platforms);
}

/// Dead body: launched, then falls freely. No collision.
pub fn step_dead(body: &mut Combatant, bounds: &Rect) {
    body.grounded = false;
    body.velocity.y = (body.velocity.y + GRAVITY).min(TERMINAL_VELOCITY);
    body.position = body.position + body.velocity;

    let width = body.rect().width;
    body.position.x = body.position.x.clamp(bounds.left(), bounds.right() - width);
}

/// Respawning body: drops in from above the arena, passing through
/// platforms, and rests on the arena floor until the countdown ends.
pub fn step_respawning(body: &mut Combatant, bounds: &Rect) {
    body.grounded = false;
    body.velocity.y = (body.velocity.y + GRAVITY).min(TERMINAL_VELOCITY);
    body.position.y += body.velocity.y;

    let height = body.rect().height;
    if body.position.y + height >= bounds.bottom() {
        body.position.y = bounds.bottom() - height;
        body.velocity.y = 0.0;
    }
}

/// Hard clamps at the arena walls, floor and ceiling.
fn clamp_to_arena(body: &mut Combatant, bounds: &Rect) {
    let rect = body.rect();

    if rect.left() < bounds.left() {
        body.position.x = bounds.left();
        body.velocity.x = 0.0;
    }
    if rect.right() > bounds.right() {
        body.position.x = bounds.right() - rect.width;
        body.velocity.x = 0.0;
    }
    if rect.bottom() >= bounds.bottom() {
        body.position.y = bounds.bottom() - rect.height;
        body.velocity.y = 0.0;
        body.grounded = true;
    }
    if rect.top() < bounds.top() {
        body.position.y = bounds.top();
        body.velocity.y = 0.0;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{ARENA_WIDTH, ARENA_HEIGHT, COMBATANT_HEIGHT};
    use crate::core::vec2::Vec2;
    use crate::game::state::Side;

    const BOUNDS: Rect = Rect::new(0.0, 0.0, ARENA_WIDTH, ARENA_HEIGHT);
    const FLOOR_Y: f64 = ARENA_HEIGHT - COMBATANT_HEIGHT;

    fn idle() -> InputFrame {
        InputFrame::new()
    }

    fn right() -> InputFrame {
        InputFrame::from_intents(false, true, false, false)
    }

    fn left() -> InputFrame {
        InputFrame::from_intents(true, false, false, false)
    }

    fn jump() -> InputFrame {
        InputFrame::from_intents(false, false, true, false)
    }

    fn on_floor() -> Combatant {
        let mut c = Combatant::new(Side::A, Vec2::new(500.0, FLOOR_Y), 100);
        c.grounded = true;
        c.was_grounded_last_tick = true;
        c
    }

    fn step(c: &mut Combatant, input: InputFrame, now: Tick) {
        step_alive(c, input, &BOUNDS, &[], 5.0, now);
    }

    #[test]
    fn test_falls_and_lands_on_floor() {
        let mut c = Combatant::new(Side::A, Vec2::new(500.0, 100.0), 100);

        for tick in 0..200 {
            step(&mut c, idle(), tick);
            assert!(c.velocity.y <= TERMINAL_VELOCITY);
        }

        assert_eq!(c.position.y, FLOOR_Y);
        assert!(c.grounded);
        assert_eq!(c.velocity.y, 0.0);
    }

    #[test]
    fn test_grounded_is_stable_at_rest() {
        let mut c = on_floor();
        for tick in 0..10 {
            step(&mut c, idle(), tick);
            assert!(c.grounded);
            assert_eq!(c.position.y, FLOOR_Y);
        }
    }

    #[test]
    fn test_speed_clamped_and_snaps_to_zero() {
        let mut c = on_floor();
        for tick in 0..100 {
            step(&mut c, right(), tick);
            assert!(c.velocity.x <= 5.0);
        }
        assert!(c.velocity.x > 0.0);

        for tick in 100..200 {
            step(&mut c, idle(), tick);
        }
        assert_eq!(c.velocity.x, 0.0);
    }

    #[test]
    fn test_speed_buff_raises_limit() {
        let mut c = on_floor();
        c.buffs.grant(BuffKind::Speed, 0);

        for tick in 0..100 {
            step(&mut c, right(), tick);
            assert!(c.velocity.x <= 5.0 * SPEED_BOOST);
        }
    }

    #[test]
    fn test_reversal_damping_and_facing() {
        let mut c = on_floor();
        c.velocity.x = 4.0;
        c.facing = Facing::Right;

        step(&mut c, left(), 0);
        // 4 * 0.35 - 0.6 = 0.8, then friction 0.64
        assert!((c.velocity.x - 0.64).abs() < 1e-9);
        // Still moving right faster than the flip speed
        assert_eq!(c.facing, Facing::Right);

        step(&mut c, left(), 1);
        assert_eq!(c.facing, Facing::Left);
    }

    #[test]
    fn test_jump_needs_fresh_press() {
        let mut c = on_floor();
        step(&mut c, jump(), 0);
        assert!(c.velocity.y < 0.0);
        assert!(!c.grounded);

        // Land while still holding jump
        let mut tick = 1;
        while !c.grounded {
            step(&mut c, jump(), tick);
            tick += 1;
        }

        // The landing tick allows one more jump (landing edge)
        step(&mut c, jump(), tick);
        assert!(c.velocity.y < 0.0);
    }

    #[test]
    fn test_held_jump_does_not_rebounce_at_rest() {
        let mut c = on_floor();
        c.was_jumping_last_tick = true;

        step(&mut c, jump(), 0);
        assert!(c.grounded);
        assert_eq!(c.velocity.y, 0.0);
    }

    #[test]
    fn test_jump_buff_height() {
        let mut plain = on_floor();
        let mut boosted = on_floor();
        boosted.buffs.grant(BuffKind::Jump, 0);

        step(&mut plain, jump(), 0);
        step(&mut boosted, jump(), 0);

        assert!((plain.velocity.y - (JUMP_FORCE + GRAVITY)).abs() < 1e-9);
        assert!((boosted.velocity.y - (JUMP_FORCE * JUMP_BOOST + GRAVITY)).abs() < 1e-9);
    }

    #[test]
    fn test_walls_zero_velocity() {
        let mut c = on_floor();
        c.position.x = 1.0;
        c.velocity.x = -5.0;

        step(&mut c, left(), 0);
        assert_eq!(c.position.x, 0.0);
        assert_eq!(c.velocity.x, 0.0);
    }

    #[test]
    fn test_lands_on_platform() {
        let platforms = vec![Platform { rect: Rect::new(450.0, 400.0, 200.0, 20.0), zone: None }];
        let mut c = Combatant::new(Side::A, Vec2::new(500.0, 200.0), 100);

        for tick in 0..120 {
            step_alive(&mut c, idle(), &BOUNDS, &platforms, 5.0, tick);
        }

        assert_eq!(c.position.y, 350.0);
        assert!(c.grounded);
    }

    #[test]
    fn test_respawning_body_passes_platforms_and_rests_on_floor() {
        let mut c = Combatant::new(Side::A, Vec2::new(500.0, -100.0), 100);

        for _ in 0..300 {
            step_respawning(&mut c, &BOUNDS);
        }

        assert_eq!(c.position.y, FLOOR_Y);
        assert!(!c.grounded);
    }
}
