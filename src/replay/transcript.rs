//! Match Transcript Recording
//!
//! Records all data needed to deterministically verify a match outcome.
//! Inputs are stored delta-compressed, so an idle stretch costs nothing.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::config::MatchSettings;
use crate::core::hash::StateHash;
use crate::game::input::{InputFrame, InputRecording};
use crate::game::map::ArenaLayout;
use crate::game::state::{MatchOutcome, MatchState, Side, Tick};
use crate::game::tick::tick;

/// Current transcript version.
pub const TRANSCRIPT_VERSION: u8 = 1;

/// Checkpoint interval in ticks (every 10 seconds = 600 ticks at 60Hz).
pub const CHECKPOINT_INTERVAL: u32 = 600;

/// Errors that can occur with transcripts.
#[derive(Debug, Error)]
pub enum TranscriptError {
    /// Bytes did not decode as a transcript
    #[error("transcript decode failed: {0}")]
    Decode(#[source] bincode::Error),

    /// Transcript could not be encoded
    #[error("transcript encode failed: {0}")]
    Encode(#[source] bincode::Error),

    /// Written by an incompatible version
    #[error("version mismatch: expected {expected}, got {got}")]
    VersionMismatch {
        /// Supported version
        expected: u8,
        /// Version found
        got: u8,
    },

    /// `finalize` was never called
    #[error("transcript is incomplete")]
    Incomplete,

    /// Stored settings do not match their recorded hash
    #[error("settings hash mismatch")]
    SettingsMismatch,

    /// Replay diverged at a checkpoint
    #[error("state hash mismatch at tick {tick}")]
    CheckpointMismatch {
        /// Checkpoint tick
        tick: Tick,
    },

    /// Replay diverged by the last tick
    #[error("final state hash mismatch")]
    FinalHashMismatch,

    /// Replay produced a different result
    #[error("match outcome mismatch")]
    OutcomeMismatch,
}

/// State checkpoint for partial verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCheckpoint {
    /// Tick number (state after this many ticks)
    pub tick: Tick,

    /// State hash at this tick
    pub state_hash: StateHash,
}

/// Complete match transcript for replay verification.
///
/// Covers one round: begin at tick 0, record every tick's inputs, then
/// finalize when the round ends.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchTranscript {
    /// Version for forward compatibility
    pub version: u8,

    /// Match identifier
    pub match_id: [u8; 16],

    /// RNG seed of the recorded round
    pub rng_seed: u64,

    /// Settings in force (already clamped)
    pub settings: MatchSettings,

    /// Hash of `settings`
    pub settings_hash: StateHash,

    /// Arena the round was played on
    pub layout: ArenaLayout,

    /// Input streams, indexed by `Side::index`
    pub recordings: [InputRecording; 2],

    /// State hash checkpoints (every `CHECKPOINT_INTERVAL` ticks)
    pub checkpoints: Vec<StateCheckpoint>,

    /// Ticks simulated when the transcript was finalized
    pub end_tick: Tick,

    /// Final state hash
    pub final_hash: Option<StateHash>,

    /// Result, if the round was decided
    pub outcome: Option<MatchOutcome>,
}

impl MatchTranscript {
    /// Start a transcript for a round that has not ticked yet.
    pub fn begin(state: &MatchState) -> Self {
        let settings = state.settings().clone();
        Self {
            version: TRANSCRIPT_VERSION,
            match_id: state.match_id(),
            rng_seed: state.rng_seed(),
            settings_hash: settings.compute_hash(),
            settings,
            layout: state.layout().clone(),
            recordings: [InputRecording::new(Side::A), InputRecording::new(Side::B)],
            checkpoints: Vec::new(),
            end_tick: 0,
            final_hash: None,
            outcome: None,
        }
    }

    /// Record both sides' input for a tick, before it is simulated.
    pub fn record_inputs(&mut self, tick: Tick, inputs: [InputFrame; 2]) {
        for side in Side::BOTH {
            self.recordings[side.index()].record(tick, inputs[side.index()]);
        }
    }

    /// Record a checkpoint if the state sits on a checkpoint boundary.
    pub fn maybe_checkpoint(&mut self, state: &MatchState) {
        let now = state.tick();
        if now > 0 && now % CHECKPOINT_INTERVAL == 0 {
            self.checkpoints.push(StateCheckpoint {
                tick: now,
                state_hash: state.compute_hash(),
            });
        }
    }

    /// Finalize the transcript with the state reached.
    pub fn finalize(&mut self, state: &MatchState) {
        self.end_tick = state.tick();
        for recording in &mut self.recordings {
            recording.finalize(state.tick().saturating_sub(1));
        }
        self.final_hash = Some(state.compute_hash());
        self.outcome = state.outcome().copied();
    }

    /// Check if transcript is complete.
    pub fn is_complete(&self) -> bool {
        self.final_hash.is_some()
    }

    /// Total stored input deltas across both sides.
    pub fn delta_count(&self) -> usize {
        self.recordings.iter().map(InputRecording::delta_count).sum()
    }

    /// Serialize to bytes using bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TranscriptError> {
        bincode::serialize(self).map_err(TranscriptError::Encode)
    }

    /// Deserialize from bytes, rejecting other versions.
    pub fn from_bytes(data: &[u8]) -> Result<Self, TranscriptError> {
        let transcript: Self = bincode::deserialize(data).map_err(TranscriptError::Decode)?;
        if transcript.version != TRANSCRIPT_VERSION {
            return Err(TranscriptError::VersionMismatch {
                expected: TRANSCRIPT_VERSION,
                got: transcript.version,
            });
        }
        Ok(transcript)
    }

    /// Fresh match state at tick 0 of the recorded round.
    pub fn initial_state(&self) -> MatchState {
        MatchState::new(self.match_id, self.rng_seed, self.settings.clone(), self.layout.clone())
    }

    /// Verify by full replay.
    ///
    /// Replays every recorded tick, comparing state hashes at each
    /// checkpoint, then the final hash and outcome. Returns the replayed
    /// final state.
    pub fn verify(&self) -> Result<MatchState, TranscriptError> {
        let final_hash = self.final_hash.ok_or(TranscriptError::Incomplete)?;

        if self.settings.compute_hash() != self.settings_hash {
            return Err(TranscriptError::SettingsMismatch);
        }

        let mut state = self.initial_state();
        let mut checkpoints = self.checkpoints.iter().peekable();

        while state.tick() < self.end_tick && !state.is_ended() {
            let now = state.tick();
            let inputs = Side::BOTH.map(|side| self.recordings[side.index()].input_at(now));
            tick(&mut state, inputs);

            if let Some(checkpoint) = checkpoints.next_if(|c| c.tick == state.tick()) {
                if checkpoint.state_hash != state.compute_hash() {
                    tracing::warn!(tick = checkpoint.tick, "Replay diverged at checkpoint");
                    return Err(TranscriptError::CheckpointMismatch { tick: checkpoint.tick });
                }
            }
        }

        if let Some(unreached) = checkpoints.next() {
            return Err(TranscriptError::CheckpointMismatch { tick: unreached.tick });
        }
        if state.compute_hash() != final_hash {
            return Err(TranscriptError::FinalHashMismatch);
        }
        if state.outcome().copied() != self.outcome {
            return Err(TranscriptError::OutcomeMismatch);
        }

        tracing::info!(
            match_id = %hex::encode(self.match_id),
            ticks = state.tick(),
            checkpoints = self.checkpoints.len(),
            "Transcript verified"
        );
        Ok(state)
    }
}

// =============================================================================
// TESTS
// =============================================================================
