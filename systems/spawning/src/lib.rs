#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave sequencing: timed spawn sequences and the scheduler that runs them.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod scheduler;
mod sequence;

pub use scheduler::{QueuedInstruction, SchedulerPhase, WaveScheduler};
pub use sequence::{SequenceState, SpawnSequence};

/// Default number of instructions a composed wave must reach before it runs.
pub const DEFAULT_ROSTER_SIZE: usize = 15;

/// Default bounds on composed waves per episode, upper bound exclusive.
pub const DEFAULT_SEQUENCE_RANGE: Range<u32> = 2..5;

/// Origin of the waves an episode dispatches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveMode {
    /// The attacker composes waves by buying units.
    Composed,
    /// A generator supplies every wave when spawning starts.
    Randomized,
}

/// Reasons an instruction cannot be queued.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// The sequence already holds its full roster.
    #[error("sequence is full ({capacity} instructions)")]
    SequenceFull {
        /// Roster capacity of the sequence.
        capacity: usize,
    },
    /// The sequence already dispatched every instruction.
    #[error("sequence already completed")]
    SequenceClosed,
    /// Every allowed sequence this episode is full.
    #[error("all {max_sequences} waves of this episode are composed")]
    RosterExhausted {
        /// Sequence budget of the episode.
        max_sequences: usize,
    },
    /// Every wave was dispatched; later purchases could never run.
    #[error("all waves of this episode were already dispatched")]
    WavesFinished,
    /// Waves are produced by the generator, not by purchases.
    #[error("waves are generated, purchases cannot be queued")]
    GeneratedWaves,
}

/// Configuration parameters required to construct the wave scheduler.
#[derive(Clone, Debug)]
pub struct Config {
    roster_size: usize,
    mode: WaveMode,
    sequence_range: Range<u32>,
    seed: u64,
}

impl Config {
    /// Creates a new configuration.
    #[must_use]
    pub const fn new(
        roster_size: usize,
        mode: WaveMode,
        sequence_range: Range<u32>,
        seed: u64,
    ) -> Self {
        Self {
            roster_size,
            mode,
            sequence_range,
            seed,
        }
    }

    /// Instructions per composed wave.
    #[must_use]
    pub const fn roster_size(&self) -> usize {
        self.roster_size
    }

    /// Origin of the waves.
    #[must_use]
    pub const fn mode(&self) -> WaveMode {
        self.mode
    }

    /// Bounds the per-episode sequence budget is drawn from.
    #[must_use]
    pub fn sequence_range(&self) -> Range<u32> {
        self.sequence_range.clone()
    }

    /// Global seed the budget draws derive from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            DEFAULT_ROSTER_SIZE,
            WaveMode::Composed,
            DEFAULT_SEQUENCE_RANGE,
            0,
        )
    }
}
