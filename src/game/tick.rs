//! Authoritative Simulation Tick
//!
//! The per-tick orchestrator. Every system runs in a fixed order so a seed
//! plus the two input streams reproduce a match exactly.
//!
//! ## Order
//!
//! 1. Combatants (A then B): buff eviction, life-state timers, movement
//! 2. Shots
//! 3. Projectiles and hits
//! 4. Power-ups: lifecycle, collection, cleanup, spawn
//! 5. Zones
//! 6. Domination scoring
//! 7. Clock advance and win check

use std::cmp::Ordering;

use crate::game::combat::{advance_projectiles, poll_life_state, process_shots, LifeTransition};
use crate::game::events::GameEvent;
use crate::game::input::{InputFrame, InputRecording};
use crate::game::physics::{step_alive, step_dead, step_respawning};
use crate::game::powerup::update_power_ups;
use crate::game::state::{
    DecidedBy, EndReason, LifeState, MatchOutcome, MatchState, Side, Tick,
};
use crate::game::zone::{award_domination, update_zones};
use crate::TICK_RATE;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Tick that was simulated
    pub tick: Tick,
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// Which sides actually fired (hosts clear latched shoot input on these)
    pub shots_fired: [bool; 2],
    /// Whether the match has ended
    pub ended: bool,
    /// Result, once decided
    pub outcome: Option<MatchOutcome>,
}

/// Run one simulation tick.
///
/// # Arguments
///
/// * `state` - The match state (will be mutated)
/// * `inputs` - Intent for each side, indexed by `Side::index`
///
/// Once the match has ended this is a no-op.
pub fn tick(state: &mut MatchState, inputs: [InputFrame; 2]) -> TickResult {
    if let Some(outcome) = state.outcome {
        return TickResult {
            tick: state.tick,
            ended: true,
            outcome: Some(outcome),
            ..TickResult::default()
        };
    }

    let now = state.tick;

    // 1. Movement and life state
    step_combatants(state, &inputs);

    // 2. Shots
    let shots_fired = process_shots(state, &inputs);

    // 3. Projectiles
    advance_projectiles(state);

    // 4. Power-ups
    update_power_ups(state);

    // 5. Zones
    update_zones(state);

    // 6. Scoring
    award_domination(state);

    // 7. Clock and win check
    state.tick += 1;
    check_end_conditions(state);

    #[cfg(feature = "debug-tracing")]
    tracing::trace!(
        tick = now,
        a = ?state.combatants[0].position,
        b = ?state.combatants[1].position,
        projectiles = state.projectiles.len(),
        "Tick complete"
    );

    TickResult {
        tick: now,
        events: state.take_events(),
        shots_fired,
        ended: state.is_ended(),
        outcome: state.outcome,
    }
}

fn step_combatants(state: &mut MatchState, inputs: &[InputFrame; 2]) {
    let now = state.tick;
    let bounds = state.layout.bounds();
    let max_speed = state.settings.player_speed;
    let respawn_ticks = state.settings.respawn_ticks();

    for side in Side::BOTH {
        let body = &mut state.combatants[side.index()];
        body.buffs.evict_expired(now);

        match poll_life_state(body, now, respawn_ticks) {
            Some(LifeTransition::RespawnStarted) => {
                tracing::debug!(tick = now, ?side, "Respawn started");
                state.pending_events.push(GameEvent::respawn_started(now, side));
            }
            Some(LifeTransition::Respawned) => {
                tracing::info!(tick = now, ?side, "Combatant respawned");
                state.pending_events.push(GameEvent::respawned(now, side));
            }
            None => {}
        }

        match body.life {
            LifeState::Alive => {
                step_alive(body, inputs[side.index()], &bounds, &state.platforms, max_speed, now);
            }
            LifeState::Dead { .. } => step_dead(body, &bounds),
            LifeState::Respawning { .. } => step_respawning(body, &bounds),
        }
    }
}

/// Check if match should end: score threshold first, then the clock.
fn check_end_conditions(state: &mut MatchState) {
    let threshold = state.settings.win_score_threshold as u64 * TICK_RATE as u64;
    let reason = if state.combatants.iter().any(|c| c.domination_ticks >= threshold) {
        EndReason::ScoreThreshold
    } else if state.tick >= state.settings.match_duration_ticks() {
        EndReason::TimeExpired
    } else {
        return;
    };

    let (winner, decided_by) = resolve_winner(state);
    let outcome = MatchOutcome {
        winner,
        reason,
        decided_by,
        tick: state.tick,
    };
    state.outcome = Some(outcome);

    let [a, b] = &state.combatants;
    tracing::info!(
        tick = state.tick,
        ?winner,
        ?reason,
        ?decided_by,
        score_a = a.domination_score(),
        score_b = b.domination_score(),
        "Match ended"
    );
    state.push_event(GameEvent::match_ended(state.tick, winner, reason, decided_by));
}

/// Decide the winner.
///
/// Domination score, then zones owned, then kills/max(1, deaths). The
/// ratio is compared by cross-multiplying so it stays exact. A full tie
/// goes to side A.
pub fn resolve_winner(state: &MatchState) -> (Side, DecidedBy) {
    let [a, b] = &state.combatants;

    let ladder = [
        (a.domination_ticks.cmp(&b.domination_ticks), DecidedBy::DominationScore),
        (state.zones_owned(Side::A).cmp(&state.zones_owned(Side::B)), DecidedBy::ZonesOwned),
        (
            (a.kills as u64 * b.deaths.max(1) as u64).cmp(&(b.kills as u64 * a.deaths.max(1) as u64)),
            DecidedBy::KillDeathRatio,
        ),
    ];

    for (ordering, decided_by) in ladder {
        match ordering {
            Ordering::Greater => return (Side::A, decided_by),
            Ordering::Less => return (Side::B, decided_by),
            Ordering::Equal => {}
        }
    }

    (Side::A, DecidedBy::Fallback)
}

/// Replay a match from recorded inputs.
///
/// Runs at most `tick_count` ticks, stopping early when the match ends.
/// Returns the final state and every event produced.
pub fn replay_match(
    initial_state: MatchState,
    recordings: &[InputRecording; 2],
    tick_count: u32,
) -> (MatchState, Vec<GameEvent>) {
    let mut state = initial_state;
    let mut all_events = Vec::new();

    for _ in 0..tick_count {
        let now = state.tick;
        let inputs = [recordings[0].input_at(now), recordings[1].input_at(now)];

        let result = tick(&mut state, inputs);
        all_events.extend(result.events);

        if result.ended {
            break;
        }
    }

    (state, all_events)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchSettings;
    use crate::core::vec2::Rect;
    use crate::game::combat::die;
    use crate::game::events::GameEventData;
    use crate::game::map::ArenaLayout;
    use crate::game::state::CaptureStatus;
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    const IDLE: [InputFrame; 2] = [InputFrame::new(), InputFrame::new()];

    fn classic(seed: u64) -> MatchState {
        MatchState::classic([0; 16], seed, MatchSettings::default())
    }

    fn short_settings() -> MatchSettings {
        MatchSettings {
            match_duration_secs: 10,
            ..MatchSettings::default()
        }
    }

    /// Floor plus one zone directly under A's spawn.
    fn single_zone_layout() -> ArenaLayout {
        ArenaLayout::empty()
            .with_platform(Rect::new(0.0, 570.0, 1200.0, 30.0))
            .with_zone('A', Rect::new(100.0, 480.0, 150.0, 35.0))
    }

    fn random_frame(rng: &mut StdRng) -> InputFrame {
        InputFrame { flags: rng.gen_range(0..16) }
    }

    #[test]
    fn test_tick_determinism() {
        let mut state1 = classic(12345);
        let mut state2 = classic(12345);
        let mut script = StdRng::seed_from_u64(7);

        for _ in 0..1200 {
            let inputs = [random_frame(&mut script), random_frame(&mut script)];
            let r1 = tick(&mut state1, inputs);
            let r2 = tick(&mut state2, inputs);
            assert_eq!(r1.events, r2.events);
            assert_eq!(state1.compute_hash(), state2.compute_hash());
        }

        assert_eq!(state1.tick(), 1200);
    }

    #[test]
    fn test_different_seeds_diverge_only_through_rng() {
        let mut state1 = classic(1);
        let mut state2 = classic(2);

        for _ in 0..10 {
            tick(&mut state1, IDLE);
            tick(&mut state2, IDLE);
        }

        // No random draw has happened yet, only the seed differs
        assert_eq!(state1.combatant(Side::A).position, state2.combatant(Side::A).position);
        assert_ne!(state1.compute_hash(), state2.compute_hash());
    }

    #[test]
    fn test_single_zone_match_end_to_end() {
        let mut state = MatchState::new([3; 16], 42, short_settings(), single_zone_layout());
        let mut captured_at = None;

        while !state.is_ended() {
            let result = tick(&mut state, IDLE);
            for event in &result.events {
                if let GameEventData::ZoneCaptured { side, .. } = event.data {
                    assert_eq!(side, Side::A);
                    captured_at = Some(event.tick);
                }
            }
        }

        // Captured within 5 s of landing on the zone
        let captured_at = captured_at.expect("zone should be captured");
        assert!(captured_at <= 60 + 5 * TICK_RATE, "captured at {captured_at}");

        let a = state.combatant(Side::A).domination_score();
        let b = state.combatant(Side::B).domination_score();
        assert!((4.0..=5.0).contains(&a), "score {a}");
        assert_eq!(b, 0.0);

        let outcome = state.outcome().copied().expect("match should be decided");
        assert_eq!(outcome.winner, Side::A);
        assert_eq!(outcome.reason, EndReason::TimeExpired);
        assert_eq!(outcome.decided_by, DecidedBy::DominationScore);
        assert_eq!(outcome.tick, 10 * TICK_RATE);
        assert_eq!(state.zones_owned(Side::A), 1);
    }

    #[test]
    fn test_ended_match_is_noop() {
        let mut state = MatchState::new([3; 16], 42, short_settings(), single_zone_layout());
        while !tick(&mut state, IDLE).ended {}

        let hash = state.compute_hash();
        let result = tick(&mut state, IDLE);

        assert!(result.ended);
        assert!(result.events.is_empty());
        assert_eq!(result.tick, 10 * TICK_RATE);
        assert_eq!(state.compute_hash(), hash);
    }

    #[test]
    fn test_match_ended_event_emitted_once() {
        let mut state = MatchState::new([3; 16], 42, short_settings(), single_zone_layout());
        let mut ended_events = 0;

        for _ in 0..(10 * TICK_RATE + 30) {
            ended_events += tick(&mut state, IDLE)
                .events
                .iter()
                .filter(|e| matches!(e.data, GameEventData::MatchEnded { .. }))
                .count();
        }

        assert_eq!(ended_events, 1);
    }

    #[test]
    fn test_score_threshold_ends_early() {
        let mut state = classic(9);
        let threshold = state.settings().win_score_threshold as u64 * TICK_RATE as u64;
        state.combatants[1].domination_ticks = threshold;

        let result = tick(&mut state, IDLE);

        assert!(result.ended);
        let outcome = result.outcome.expect("decided");
        assert_eq!(outcome.winner, Side::B);
        assert_eq!(outcome.reason, EndReason::ScoreThreshold);
        assert_eq!(outcome.tick, 1);
    }

    #[test]
    fn test_resolve_winner_ladder() {
        let mut state = classic(5);
        assert_eq!(resolve_winner(&state), (Side::A, DecidedBy::Fallback));

        // Kill/death ratio: A 2/1 beats B 3/2
        state.combatants[0].kills = 2;
        state.combatants[1].kills = 3;
        state.combatants[1].deaths = 2;
        assert_eq!(resolve_winner(&state), (Side::A, DecidedBy::KillDeathRatio));

        // Zones beat K/D
        let zone = state.platforms.iter_mut().find_map(|p| p.zone.as_mut()).expect("classic has zones");
        zone.owner = Some(Side::B);
        zone.claimant = Some(Side::B);
        zone.progress = 100.0;
        assert_eq!(resolve_winner(&state), (Side::B, DecidedBy::ZonesOwned));

        // Score beats everything
        state.combatants[0].domination_ticks = 61;
        state.combatants[1].domination_ticks = 60;
        assert_eq!(resolve_winner(&state), (Side::A, DecidedBy::DominationScore));
    }

    #[test]
    fn test_kill_death_ratio_is_exact() {
        let mut state = classic(5);
        // 1/3 vs 2/6: equal, falls through
        state.combatants[0].kills = 1;
        state.combatants[0].deaths = 3;
        state.combatants[1].kills = 2;
        state.combatants[1].deaths = 6;
        assert_eq!(resolve_winner(&state), (Side::A, DecidedBy::Fallback));

        // 0 deaths counts as 1
        state.combatants[0].deaths = 0;
        assert_eq!(resolve_winner(&state), (Side::A, DecidedBy::KillDeathRatio));
    }

    #[test]
    fn test_shots_fired_reported() {
        let mut state = classic(11);
        let shoot_a = [InputFrame::from_intents(false, false, false, true), InputFrame::new()];

        let first = tick(&mut state, shoot_a);
        assert_eq!(first.shots_fired, [true, false]);
        assert_eq!(state.projectiles().len(), 1);

        // Still cooling down
        let second = tick(&mut state, shoot_a);
        assert_eq!(second.shots_fired, [false, false]);
    }

    #[test]
    fn test_dead_combatant_ignores_input() {
        let mut state = classic(11);
        die(&mut state.combatants[1], 0, &mut state.rng);

        let inputs = [InputFrame::new(), InputFrame::from_intents(true, false, true, true)];
        let result = tick(&mut state, inputs);

        assert_eq!(result.shots_fired, [false, false]);
        assert!(state.projectiles().is_empty());
    }

    #[test]
    fn test_respawn_cycle_through_tick() {
        // (respawn_secs, tick B is Alive again), both counted from death
        for (respawn_secs, back_at) in [(1, 91), (3, 180), (5, 300)] {
            let settings = MatchSettings { respawn_secs, ..MatchSettings::default() };
            let mut state = MatchState::classic([0; 16], 11, settings);
            die(&mut state.combatants[1], 0, &mut state.rng);

            let mut started = None;
            let mut respawned = None;
            for _ in 0..400 {
                for event in tick(&mut state, IDLE).events {
                    match event.data {
                        GameEventData::RespawnStarted { side: Side::B } => started = Some(event.tick),
                        GameEventData::Respawned { side: Side::B } => respawned = Some(event.tick),
                        _ => {}
                    }
                }
            }

            assert_eq!(started, Some(90));
            assert_eq!(respawned, Some(back_at), "respawn_secs = {respawn_secs}");
            assert!(state.combatant(Side::B).can_act());
            assert_eq!(state.combatant(Side::B).health, state.combatant(Side::B).max_health);
        }
    }

    #[test]
    fn test_respawning_combatant_does_not_capture() {
        let mut state = MatchState::new([3; 16], 42, short_settings(), single_zone_layout());
        for _ in 0..60 {
            tick(&mut state, IDLE);
        }
        assert!(matches!(
            state.zones().next().map(|(_, _, z)| z.status),
            Some(CaptureStatus::Capturing(Side::A))
        ));

        state.combatants[0].life = LifeState::Respawning { since: state.tick };
        state.combatants[0].health = 0;
        let progress = state.zones().next().map(|(_, _, z)| z.progress);

        tick(&mut state, IDLE);
        let zone = state.zones().next().map(|(_, _, z)| z.clone()).expect("zone");
        assert_eq!(zone.status, CaptureStatus::Idle);
        assert!(Some(zone.progress) < progress);
    }

    #[test]
    fn test_replay_matches_live() {
        let mut live = classic(777);
        let mut recordings = [InputRecording::new(Side::A), InputRecording::new(Side::B)];
        let mut script = StdRng::seed_from_u64(99);

        let ticks = 900;
        for _ in 0..ticks {
            let now = live.tick();
            let inputs = [random_frame(&mut script), random_frame(&mut script)];
            recordings[0].record(now, inputs[0]);
            recordings[1].record(now, inputs[1]);
            tick(&mut live, inputs);
        }

        let (replayed, _) = replay_match(classic(777), &recordings, ticks);
        assert_eq!(replayed.tick(), live.tick());
        assert_eq!(replayed.compute_hash(), live.compute_hash());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_invariants_hold_every_tick(
            seed in any::<u64>(),
            script in prop::collection::vec((0u8..16, 0u8..16), 1..600),
        ) {
            let mut state = classic(seed);

            for (a, b) in script {
                let before = state.tick();
                tick(&mut state, [InputFrame { flags: a }, InputFrame { flags: b }]);
                prop_assert_eq!(state.tick(), before + 1);

                for (_, _, zone) in state.zones() {
                    prop_assert!((0.0..=100.0).contains(&zone.progress));
                    prop_assert_eq!(zone.owner.is_some(), zone.progress == 100.0);
                }

                for c in state.combatants() {
                    prop_assert!(c.health <= c.max_health);
                    prop_assert_eq!(c.health > 0, c.can_act());
                    if !c.can_act() {
                        prop_assert_eq!(c.health, 0);
                    }
                }

                prop_assert!(state.projectiles().iter().all(|p| p.active));
                prop_assert!(state.live_power_up_count() <= state.settings().max_power_ups as usize);
            }
        }
    }
}
