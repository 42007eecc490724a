//! Zone Duel Simulator
//!
//! Headless demo: runs one match between two patrol bots through the
//! fixed-step frame clock, records a transcript and verifies it by replay.
//!
//! Usage: `zone-duel-sim [settings.json]`

use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use zone_duel::{
    TICK_RATE, VERSION,
    config::MatchSettings,
    core::rng::derive_match_seed,
    game::{
        clock::FrameClock,
        events::GameEventData,
        input::{Controller, InputFrame, InputSource, Key},
        state::{MatchState, Side},
        tick::tick,
    },
    replay::MatchTranscript,
};

/// Walks back and forth, hops and fires on a fixed rhythm.
struct PatrolBot {
    controller: Controller,
    heading: Key,
    turn_every: u64,
    ticks: u64,
}

impl PatrolBot {
    fn new(heading: Key, turn_every: u64) -> Self {
        let mut controller = Controller::new();
        controller.press(heading, 0);
        Self {
            controller,
            heading,
            turn_every,
            ticks: 0,
        }
    }
}

impl InputSource for PatrolBot {
    fn poll(&mut self) -> InputFrame {
        self.ticks += 1;
        let t = self.ticks;

        if t % self.turn_every == 0 {
            let next = if self.heading == Key::Left { Key::Right } else { Key::Left };
            self.controller.press(next, t);
            self.controller.release(self.heading, t);
            self.heading = next;
        }

        match t % 90 {
            0 => self.controller.press(Key::Jump, t),
            10 => self.controller.release(Key::Jump, t),
            _ => {}
        }
        match t % 20 {
            0 => self.controller.press(Key::Shoot, t),
            5 => self.controller.release(Key::Shoot, t),
            _ => {}
        }

        self.controller.poll()
    }

    fn acknowledge_shot(&mut self) {
        self.controller.acknowledge_shot();
    }
}

fn load_settings() -> Result<MatchSettings> {
    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        return Ok(MatchSettings::default());
    };

    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    MatchSettings::from_json_str(&json)
        .with_context(|| format!("parsing settings from {}", path.display()))
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("installing tracing subscriber")?;

    info!("Zone Duel Simulator v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let settings = load_settings()?;
    let match_id = [1u8; 16];
    let rng_seed = derive_match_seed(&match_id, 0);

    let mut state = MatchState::classic(match_id, rng_seed, settings);
    let mut transcript = MatchTranscript::begin(&state);
    let mut bots = [PatrolBot::new(Key::Right, 150), PatrolBot::new(Key::Left, 110)];
    let mut clock = FrameClock::default();

    info!(
        "Running up to {} ticks ({} seconds)",
        state.settings().match_duration_ticks(),
        state.settings().match_duration_secs
    );

    // Simulated frame times with a little jitter around 60 fps
    let mut frame_ms = 0.0;
    let mut frame: u64 = 0;
    while !state.is_ended() {
        frame_ms += 16.0 + (frame % 3) as f64;
        frame += 1;

        for _ in 0..clock.advance(frame_ms) {
            let now = state.tick();
            let inputs = [bots[0].poll(), bots[1].poll()];
            transcript.record_inputs(now, inputs);

            let result = tick(&mut state, inputs);
            for side in Side::BOTH {
                if result.shots_fired[side.index()] {
                    bots[side.index()].acknowledge_shot();
                }
            }
            transcript.maybe_checkpoint(&state);

            for event in &result.events {
                match &event.data {
                    GameEventData::CombatantKilled { victim, killer } => {
                        info!("Tick {}: {:?} killed {:?}", event.tick, killer, victim);
                    }
                    GameEventData::ZoneCaptured { label, side, .. } => {
                        info!("Tick {}: zone {} captured by {:?}", event.tick, label, side);
                    }
                    _ => {}
                }
            }

            if result.ended {
                break;
            }
        }
    }

    // Print final results
    info!("=== Match Results ===");
    let hash = state.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));

    for side in Side::BOTH {
        let c = state.combatant(side);
        info!(
            "{:?}: score {:.1}s, zones {}, kills {}, deaths {}",
            side,
            c.domination_score(),
            state.zones_owned(side),
            c.kills,
            c.deaths
        );
    }
    if let Some(outcome) = state.outcome() {
        info!("Winner: {:?} ({:?}, decided by {:?})", outcome.winner, outcome.reason, outcome.decided_by);
    }

    // Verify determinism by replaying the transcript
    info!("=== Verifying Determinism ===");
    transcript.finalize(&state);
    let bytes = transcript.to_bytes()?;
    info!("Transcript: {} bytes, {} input deltas", bytes.len(), transcript.delta_count());

    let replayed = MatchTranscript::from_bytes(&bytes)?.verify()?;
    let replay_hash = replayed.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    ensure!(hash == replay_hash, "determinism failure: hashes differ");
    info!("DETERMINISM VERIFIED: Hashes match!");

    Ok(())
}
