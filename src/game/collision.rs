//! Collision Detection
//!
//! Combatant-vs-platform resolution, the lenient standing-on test used
//! for zone occupancy, and circle-vs-rectangle hit tests for projectiles.

use crate::core::constants::{GRAZE_THRESHOLD, STANDING_TOLERANCE, CONTACT_EPSILON};
use crate::core::vec2::{Vec2, Rect};
use crate::game::state::{Combatant, Platform};

/// How a platform collision was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    /// Pushed up onto the platform top
    Landed,
    /// Pushed down below the platform
    HitCeiling,
    /// Pushed out to the platform's left
    HitLeftSide,
    /// Pushed out to the platform's right
    HitRightSide,
}

/// Check if a circle overlaps a rectangle.
///
/// Uses the closest point on the rectangle; touching does not count.
#[inline]
pub fn circle_hits_rect(center: Vec2, radius: f64, rect: &Rect) -> bool {
    let closest = rect.closest_point(center);
    center.distance_squared(closest) < radius * radius
}

/// Resolve one combatant against one platform.
///
/// Picks the axis of minimum penetration, gated by the velocity sign on
/// that axis so corners do not snag. Returns None if nothing was resolved.
pub fn resolve_platform(body: &mut Combatant, platform: &Rect) -> Option<Contact> {
    let rect = body.rect();
    if !rect.overlaps(platform) {
        return None;
    }

    let into_left = rect.right() - platform.left();
    let into_right = platform.right() - rect.left();
    let into_top = rect.bottom() - platform.top();
    let into_bottom = platform.bottom() - rect.top();

    let min = into_left.min(into_right).min(into_top).min(into_bottom);

    if min == into_top && body.velocity.y >= 0.0 {
        land_on(body, platform);
        Some(Contact::Landed)
    } else if min == into_bottom && body.velocity.y < 0.0 {
        body.position.y = platform.bottom();
        body.velocity.y = 0.0;
        Some(Contact::HitCeiling)
    } else if min == into_left && body.velocity.x > 0.0 {
        body.position.x = platform.left() - rect.width;
        // Grazing an edge keeps momentum
        if into_left > GRAZE_THRESHOLD {
            body.velocity.x = body.velocity.x.min(0.0);
        }
        Some(Contact::HitLeftSide)
    } else if min == into_right && body.velocity.x < 0.0 {
        body.position.x = platform.right();
        if into_right > GRAZE_THRESHOLD {
            body.velocity.x = body.velocity.x.max(0.0);
        }
        Some(Contact::HitRightSide)
    } else if min == into_top {
        // Near-zero velocity overlap: treat as landing
        land_on(body, platform);
        Some(Contact::Landed)
    } else {
        None
    }
}

/// Feet exactly on a platform top while not rising.
///
/// Resolution leaves a resting body touching, not overlapping, so this
/// keeps it grounded on the following ticks.
#[inline]
pub fn is_resting_on(body: &Combatant, platform: &Rect) -> bool {
    let rect = body.rect();
    body.velocity.y >= 0.0
        && (rect.bottom() - platform.top()).abs() <= CONTACT_EPSILON
        && rect.overlaps_horizontally(platform)
}

/// Resolve a combatant against every platform in order.
pub fn resolve_platforms(body: &mut Combatant, platforms: &[Platform]) {
    for platform in platforms {
        if resolve_platform(body, &platform.rect).is_none() && is_resting_on(body, &platform.rect) {
            body.velocity.y = 0.0;
            body.grounded = true;
        }
    }
}

/// Lenient "standing on top" test for zone occupancy.
///
/// Not the same predicate as collision resolution: feet within
/// `STANDING_TOLERANCE` of the top, horizontal overlap, and grounded.
pub fn stands_on(body: &Combatant, platform: &Rect) -> bool {
    let rect = body.rect();
    body.grounded
        && (rect.bottom() - platform.top()).abs() < STANDING_TOLERANCE
        && rect.overlaps_horizontally(platform)
}

fn land_on(body: &mut Combatant, platform: &Rect) {
    body.position.y = platform.top() - body.rect().height;
    body.velocity.y = 0.0;
    body.grounded = true;
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::Side;

    fn body_at(x: f64, y: f64, vx: f64, vy: f64) -> Combatant {
        let mut c = Combatant::new(Side::A, Vec2::new(x, y), 100);
        c.velocity = Vec2::new(vx, vy);
        c
    }

    const LEDGE: Rect = Rect::new(100.0, 300.0, 120.0, 20.0);

    #[test]
    fn test_circle_hits_rect() {
        let rect = Rect::new(0.0, 0.0, 30.0, 50.0);

        assert!(circle_hits_rect(Vec2::new(35.0, 25.0), 10.0, &rect));
        assert!(!circle_hits_rect(Vec2::new(40.0, 25.0), 10.0, &rect));
        // Corner distance is sqrt(50) > 7
        assert!(!circle_hits_rect(Vec2::new(35.0, 55.0), 7.0, &rect));
        assert!(circle_hits_rect(Vec2::new(35.0, 55.0), 8.0, &rect));
    }

    #[test]
    fn test_landing_from_above() {
        // Feet 5 units into the top while falling
        let mut body = body_at(150.0, 255.0, 0.0, 6.0);

        assert_eq!(resolve_platform(&mut body, &LEDGE), Some(Contact::Landed));
        assert_eq!(body.position.y, 250.0);
        assert_eq!(body.velocity.y, 0.0);
        assert!(body.grounded);
    }

    #[test]
    fn test_head_bump_from_below() {
        let mut body = body_at(150.0, 317.0, 0.0, -8.0);

        assert_eq!(resolve_platform(&mut body, &LEDGE), Some(Contact::HitCeiling));
        assert_eq!(body.position.y, 320.0);
        assert_eq!(body.velocity.y, 0.0);
        assert!(!body.grounded);
    }

    #[test]
    fn test_side_hit_zeroes_velocity() {
        // 4 units into the left side, moving right
        let mut body = body_at(74.0, 290.0, 5.0, 0.0);

        assert_eq!(resolve_platform(&mut body, &LEDGE), Some(Contact::HitLeftSide));
        assert_eq!(body.position.x, 70.0);
        assert_eq!(body.velocity.x, 0.0);
    }

    #[test]
    fn test_side_graze_keeps_velocity() {
        // 1 unit into the right side, moving left
        let mut body = body_at(219.0, 290.0, -3.0, 0.0);

        assert_eq!(resolve_platform(&mut body, &LEDGE), Some(Contact::HitRightSide));
        assert_eq!(body.position.x, 220.0);
        assert_eq!(body.velocity.x, -3.0);
    }

    #[test]
    fn test_rising_through_top_edge_is_not_snapped() {
        // Minimum overlap is the top, but the body is rising and not moving sideways
        let mut body = body_at(150.0, 252.0, 0.0, -3.0);

        assert_eq!(resolve_platform(&mut body, &LEDGE), Some(Contact::Landed));
        assert!(body.grounded);
    }

    #[test]
    fn test_resting_contact_keeps_grounded() {
        let platforms = vec![Platform { rect: LEDGE, zone: None }];
        let mut body = body_at(150.0, 250.0, 0.0, 0.0);

        resolve_platforms(&mut body, &platforms);
        assert!(body.grounded);

        // Off the edge: no contact
        let mut body = body_at(221.0, 250.0, 0.0, 0.0);
        resolve_platforms(&mut body, &platforms);
        assert!(!body.grounded);
    }

    #[test]
    fn test_stands_on_is_lenient_but_needs_grounded() {
        let mut body = body_at(150.0, 245.0, 0.0, 0.0);
        body.grounded = true;
        assert!(stands_on(&body, &LEDGE));

        body.grounded = false;
        assert!(!stands_on(&body, &LEDGE));

        let mut far = body_at(150.0, 240.0, 0.0, 0.0);
        far.grounded = true;
        assert!(!stands_on(&far, &LEDGE));
    }
}
