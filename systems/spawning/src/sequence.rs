//! Timed dispatch of a single wave.

use std::time::Duration;

use tower_duel_core::{Command, SpawnInstruction, Timer};
use tracing::{debug, warn};

use crate::QueueError;

/// Lifecycle of a [`SpawnSequence`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceState {
    /// Composed or waiting for activation.
    Idle,
    /// Spawning instructions as its timer expires.
    Active,
    /// Every instruction was dispatched.
    Completed,
}

/// Ordered batch of timed spawn instructions.
///
/// An active sequence spawns the instruction under its cursor whenever the
/// timer expires. Instructions with a zero delay spawn in the same tick as
/// their predecessor, without limit.
#[derive(Clone, Debug)]
pub struct SpawnSequence {
    instructions: Vec<SpawnInstruction>,
    cursor: usize,
    timer: Timer,
    capacity: usize,
    state: SequenceState,
}

impl SpawnSequence {
    /// Creates an empty sequence accepting up to `capacity` instructions.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            instructions: Vec::with_capacity(capacity),
            cursor: 0,
            timer: Timer::new(),
            capacity,
            state: SequenceState::Idle,
        }
    }

    /// Creates a full sequence from pre-composed instructions.
    #[must_use]
    pub fn from_instructions(instructions: Vec<SpawnInstruction>) -> Self {
        let capacity = instructions.len();
        Self {
            instructions,
            cursor: 0,
            timer: Timer::new(),
            capacity,
            state: SequenceState::Idle,
        }
    }

    /// Appends an instruction to a sequence that has not completed.
    pub fn push(&mut self, instruction: SpawnInstruction) -> Result<usize, QueueError> {
        if self.state == SequenceState::Completed {
            return Err(QueueError::SequenceClosed);
        }
        if self.is_full() {
            return Err(QueueError::SequenceFull {
                capacity: self.capacity,
            });
        }
        self.instructions.push(instruction);
        Ok(self.instructions.len())
    }

    /// Starts dispatching, arming the timer with the first delay.
    ///
    /// Returns `false` when the sequence had nothing to dispatch; such a
    /// sequence is marked completed immediately.
    pub fn init(&mut self) -> bool {
        if self.state != SequenceState::Idle {
            warn!(state = ?self.state, "sequence initialised twice");
            return self.state == SequenceState::Active;
        }
        let Some(first) = self.instructions.first() else {
            warn!("empty spawn sequence completes without spawning");
            self.state = SequenceState::Completed;
            return false;
        };
        self.cursor = 0;
        self.timer.arm(first.delay());
        self.state = SequenceState::Active;
        true
    }

    /// Advances the spawn timer and emits spawn commands for due instructions.
    ///
    /// Returns `true` exactly once, on the tick the final instruction spawns.
    pub fn tick(&mut self, dt: Duration, out: &mut Vec<Command>) -> bool {
        if self.state != SequenceState::Active || !self.timer.tick(dt) {
            return false;
        }
        loop {
            let Some(instruction) = self.instructions.get(self.cursor) else {
                return self.complete();
            };
            out.push(Command::SpawnUnit {
                kind: instruction.unit(),
                node: instruction.node(),
            });
            self.cursor += 1;

            let Some(next) = self.instructions.get(self.cursor) else {
                return self.complete();
            };
            if !next.delay().is_zero() {
                self.timer.rearm(next.delay());
                return false;
            }
        }
    }

    fn complete(&mut self) -> bool {
        debug!(spawned = self.instructions.len(), "spawn sequence completed");
        self.state = SequenceState::Completed;
        self.cursor = 0;
        self.timer.cancel();
        true
    }

    /// Stops the spawn timer without completing.
    pub fn cancel(&mut self) {
        self.timer.cancel();
        if self.state == SequenceState::Active {
            self.state = SequenceState::Idle;
        }
    }

    /// Fraction of instructions dispatched in the current activation.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.instructions.is_empty() {
            return 0.0;
        }
        (self.cursor as f32 / self.instructions.len() as f32).clamp(0.0, 1.0)
    }

    /// Reports whether the roster reached its capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.instructions.len() >= self.capacity
    }

    /// Number of instructions composed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Reports whether nothing was composed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Maximum number of instructions.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SequenceState {
        self.state
    }

    /// Index of the next instruction to spawn.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Time left until the next spawn; zero when no spawn is pending.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.timer.remaining()
    }

    /// Composed instructions in dispatch order.
    #[must_use]
    pub fn instructions(&self) -> &[SpawnInstruction] {
        &self.instructions
    }
}
