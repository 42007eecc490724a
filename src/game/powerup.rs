//! Power-Up Spawning and Collection
//!
//! Deterministic spawning from the match RNG, the drop-in/active/terminal
//! lifecycle, and exclusive collection.

use crate::core::constants::{
    POWER_UP_SPAWN_TICKS, POWER_UP_LIFETIME_TICKS, POWER_UP_GRACE_TICKS,
    POWER_UP_MIN_SEPARATION,
};
use crate::core::vec2::Vec2;
use crate::game::events::GameEvent;
use crate::game::state::{BuffKind, MatchState, PowerUp, PowerUpState, Side};

/// Run the whole power-up step: lifecycle, collection, cleanup, spawn.
pub fn update_power_ups(state: &mut MatchState) {
    advance_lifecycle(state);
    collect_power_ups(state);
    remove_finished(state);
    maybe_spawn(state);
}

/// Spawning -> Active after the drop-in, Active -> Despawned after the
/// lifetime.
pub fn advance_lifecycle(state: &mut MatchState) {
    let now = state.tick;

    for power_up in state.power_ups.values_mut() {
        match power_up.state {
            PowerUpState::Spawning if now.saturating_sub(power_up.spawned_at) >= POWER_UP_SPAWN_TICKS => {
                power_up.state = PowerUpState::Active;
                power_up.active_since = Some(now);
            }
            PowerUpState::Active => {
                let since = power_up.active_since.unwrap_or(power_up.spawned_at);
                if now.saturating_sub(since) >= POWER_UP_LIFETIME_TICKS {
                    power_up.state = PowerUpState::Despawned;
                    power_up.ended_at = Some(now);
                    tracing::debug!(tick = now, id = power_up.id, "Power-up despawned");
                    state.pending_events.push(GameEvent::power_up_despawned(now, power_up.id, power_up.kind));
                }
            }
            _ => {}
        }
    }
}

/// Hand each Active power-up to the first overlapping combatant.
///
/// Instances are visited in ID order and A is checked before B, so a
/// power-up is collected at most once even when both overlap it.
pub fn collect_power_ups(state: &mut MatchState) {
    let now = state.tick;

    for power_up in state.power_ups.values_mut() {
        if power_up.state != PowerUpState::Active {
            continue;
        }

        let rect = power_up.rect();
        let collector = Side::BOTH.into_iter().find(|side| {
            let c = &state.combatants[side.index()];
            c.can_act() && c.rect().overlaps(&rect)
        });

        if let Some(side) = collector {
            power_up.state = PowerUpState::Collected { by: side };
            power_up.ended_at = Some(now);
            state.combatants[side.index()].buffs.grant(power_up.kind, now);

            tracing::debug!(tick = now, id = power_up.id, kind = power_up.kind.label(), ?side, "Power-up collected");
            state.pending_events.push(GameEvent::power_up_collected(now, power_up.id, power_up.kind, side));
        }
    }
}

/// Drop terminal instances whose grace period has elapsed.
pub fn remove_finished(state: &mut MatchState) {
    let now = state.tick;
    state.power_ups.retain(|_, p| {
        p.ended_at
            .map_or(true, |ended| now.saturating_sub(ended) < POWER_UP_GRACE_TICKS)
    });
}

/// Attempt a spawn once the spawn interval has passed since the last
/// attempt. The attempt time advances even when nothing spawns.
pub fn maybe_spawn(state: &mut MatchState) -> Option<u32> {
    let now = state.tick;
    if now.saturating_sub(state.last_power_up_attempt) <= state.settings.spawn_interval_ticks() {
        return None;
    }

    state.last_power_up_attempt = now;
    try_spawn(state)
}

/// Spawn one power-up now if the cap and free locations allow.
///
/// Draws the type first, then a location among the candidates not
/// crowded by a live instance. Returns the new instance ID.
pub fn try_spawn(state: &mut MatchState) -> Option<u32> {
    let now = state.tick;

    if state.live_power_up_count() >= state.settings.max_power_ups as usize {
        return None;
    }

    let kind = *state.rng.choose(&BuffKind::ALL)?;

    let candidates: Vec<Vec2> = state
        .layout
        .power_up_locations()
        .iter()
        .copied()
        .filter(|&location| !is_crowded(state, location))
        .collect();
    let anchor = *state.rng.choose(&candidates)?;

    let id = state.next_power_up_id;
    state.next_power_up_id += 1;
    state.power_ups.insert(id, PowerUp::new(id, kind, anchor, now));

    tracing::debug!(tick = now, id, kind = kind.label(), x = anchor.x, y = anchor.y, "Power-up spawned");
    state.push_event(GameEvent::power_up_spawned(now, id, kind, anchor));

    Some(id)
}

fn is_crowded(state: &MatchState, location: Vec2) -> bool {
    state.power_ups.values().filter(|p| p.is_live()).any(|p| {
        (p.anchor.x - location.x).abs() < POWER_UP_MIN_SEPARATION
            && (p.anchor.y - location.y).abs() < POWER_UP_MIN_SEPARATION
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchSettings;
    use crate::game::map::ArenaLayout;
    use crate::game::state::LifeState;

    fn arena(locations: Vec<Vec2>) -> MatchState {
        let layout = ArenaLayout::empty().with_power_up_locations(locations);
        MatchState::new([1u8; 16], 99, MatchSettings::default(), layout)
    }

    fn place(state: &mut MatchState, kind: BuffKind, anchor: Vec2) -> u32 {
        let id = state.next_power_up_id;
        state.next_power_up_id += 1;
        state.power_ups.insert(id, PowerUp::new(id, kind, anchor, state.tick));
        id
    }

    fn run_until(state: &mut MatchState, tick: u32) {
        while state.tick < tick {
            state.tick += 1;
            advance_lifecycle(state);
            remove_finished(state);
        }
    }

    #[test]
    fn test_lifecycle_and_grace() {
        let mut state = arena(vec![]);
        let id = place(&mut state, BuffKind::Speed, Vec2::new(600.0, 100.0));

        run_until(&mut state, POWER_UP_SPAWN_TICKS - 1);
        assert_eq!(state.power_ups[&id].state, PowerUpState::Spawning);

        run_until(&mut state, POWER_UP_SPAWN_TICKS);
        assert_eq!(state.power_ups[&id].state, PowerUpState::Active);
        assert_eq!(state.power_ups[&id].active_since, Some(POWER_UP_SPAWN_TICKS));

        let despawn_at = POWER_UP_SPAWN_TICKS + POWER_UP_LIFETIME_TICKS;
        run_until(&mut state, despawn_at - 1);
        assert_eq!(state.power_ups[&id].state, PowerUpState::Active);

        run_until(&mut state, despawn_at);
        assert_eq!(state.power_ups[&id].state, PowerUpState::Despawned);
        assert_eq!(state.live_power_up_count(), 0);

        run_until(&mut state, despawn_at + POWER_UP_GRACE_TICKS - 1);
        assert!(state.power_ups.contains_key(&id));

        run_until(&mut state, despawn_at + POWER_UP_GRACE_TICKS);
        assert!(state.power_ups.is_empty());
    }

    #[test]
    fn test_spawning_is_not_collectible() {
        let mut state = arena(vec![]);
        let anchor = state.combatants[0].position;
        let id = place(&mut state, BuffKind::Shield, anchor);

        collect_power_ups(&mut state);
        assert_eq!(state.power_ups[&id].state, PowerUpState::Spawning);
    }

    #[test]
    fn test_collection_is_exclusive_and_a_first() {
        let mut state = arena(vec![]);
        let anchor = state.combatants[0].position;
        state.combatants[1].position = anchor;
        let id = place(&mut state, BuffKind::Mega, anchor);
        state.power_ups.get_mut(&id).unwrap().state = PowerUpState::Active;

        collect_power_ups(&mut state);

        assert_eq!(state.power_ups[&id].state, PowerUpState::Collected { by: Side::A });
        assert!(state.combatants[0].buffs.peek(BuffKind::Mega, state.tick));
        assert!(!state.combatants[1].buffs.peek(BuffKind::Mega, state.tick));

        // Already collected: nothing more happens
        collect_power_ups(&mut state);
        assert_eq!(state.take_events().len(), 1);
    }

    #[test]
    fn test_dead_combatant_cannot_collect() {
        let mut state = arena(vec![]);
        let anchor = state.combatants[0].position;
        state.combatants[0].life = LifeState::Dead { since: 0 };
        let id = place(&mut state, BuffKind::Jump, anchor);
        state.power_ups.get_mut(&id).unwrap().state = PowerUpState::Active;

        collect_power_ups(&mut state);
        assert_eq!(state.power_ups[&id].state, PowerUpState::Active);
    }

    #[test]
    fn test_spawn_interval_is_strict() {
        let mut state = arena(vec![Vec2::new(600.0, 300.0)]);
        let interval = state.settings.spawn_interval_ticks();

        state.tick = interval;
        assert_eq!(maybe_spawn(&mut state), None);
        assert_eq!(state.last_power_up_attempt, 0);

        state.tick = interval + 1;
        assert_eq!(maybe_spawn(&mut state), Some(0));
        assert_eq!(state.last_power_up_attempt, interval + 1);
        assert_eq!(state.power_ups[&0].anchor, Vec2::new(600.0, 300.0));
    }

    #[test]
    fn test_spawn_respects_cap() {
        let mut state = arena(vec![Vec2::new(100.0, 100.0), Vec2::new(400.0, 100.0)]);
        let cap = state.settings.max_power_ups;
        for i in 0..cap {
            place(&mut state, BuffKind::Speed, Vec2::new(800.0 + i as f64 * 60.0, 100.0));
        }

        assert_eq!(try_spawn(&mut state), None);
        assert_eq!(state.live_power_up_count(), cap as usize);
    }

    #[test]
    fn test_spawn_skips_crowded_locations() {
        let mut state = arena(vec![Vec2::new(100.0, 100.0), Vec2::new(130.0, 120.0)]);

        assert!(try_spawn(&mut state).is_some());
        assert_eq!(try_spawn(&mut state), None);
        assert_eq!(state.power_ups.len(), 1);
    }

    #[test]
    fn test_spawn_without_locations_does_nothing() {
        let mut state = arena(vec![]);
        assert_eq!(try_spawn(&mut state), None);
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_spawn_is_deterministic() {
        let locations: Vec<Vec2> = (0..6).map(|i| Vec2::new(100.0 + i as f64 * 150.0, 200.0)).collect();
        let mut a = arena(locations.clone());
        let mut b = arena(locations);

        for _ in 0..3 {
            let ia = try_spawn(&mut a);
            let ib = try_spawn(&mut b);
            assert_eq!(ia, ib);
        }
        assert_eq!(
            a.power_ups().collect::<Vec<_>>(),
            b.power_ups().collect::<Vec<_>>()
        );
    }
}
