//! Replay Verification
//!
//! Records everything needed to reproduce a match (seed, settings,
//! layout, both input streams) plus state-hash checkpoints, and verifies
//! a recording by deterministic replay.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    REPLAY                                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  transcript.rs   - Transcript recording, bincode codec,     │
//! │                    checkpointed verification by replay      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod transcript;

// Re-export key types
pub use transcript::{
    MatchTranscript, StateCheckpoint, TranscriptError,
    TRANSCRIPT_VERSION, CHECKPOINT_INTERVAL,
};
