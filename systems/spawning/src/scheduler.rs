//! Strict FIFO activation of spawn sequences across an episode.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tower_duel_core::{
    seed::derive_seed, Catalog, Command, Event, SpawnInstruction, UnitKindId, WaveGenerator,
};
use tracing::{debug, info, warn};

use crate::{
    sequence::{SequenceState, SpawnSequence},
    Config, QueueError, WaveMode,
};

const MAX_SEQUENCES_STREAM: &str = "max-sequences";

/// Where the scheduler is in its episode lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// Waves are being composed; nothing was started yet.
    Dormant,
    /// The sequence at `index` is dispatching.
    Running {
        /// Position of the running sequence.
        index: usize,
    },
    /// Waiting until the sequence at `next` holds a full roster.
    AwaitingNext {
        /// Position of the sequence that activates next.
        next: usize,
    },
    /// Every sequence was dispatched; waiting for the battlefield to empty.
    Draining,
    /// Spawning completion was signalled.
    Completed,
}

/// Where a queued instruction landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueuedInstruction {
    /// One-based number of the composing wave.
    pub wave: usize,
    /// Instructions in that wave after the append.
    pub len: usize,
    /// Whether the append completed the roster.
    pub filled: bool,
}

/// Coordinates spawn sequences through rendezvous and terminal waits.
#[derive(Debug)]
pub struct WaveScheduler {
    config: Config,
    sequences: Vec<SpawnSequence>,
    phase: SchedulerPhase,
    current_index: usize,
    max_sequences: usize,
}

impl WaveScheduler {
    /// Creates a scheduler ready for the first episode.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let max_sequences = sample_max_sequences(&config, 0);
        Self {
            config,
            sequences: Vec::new(),
            phase: SchedulerPhase::Dormant,
            current_index: 0,
            max_sequences,
        }
    }

    /// Configuration the scheduler was built with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    /// Upper bound on composed sequences this episode.
    #[must_use]
    pub const fn max_sequences(&self) -> usize {
        self.max_sequences
    }

    /// Reports whether [`WaveScheduler::start_all`] already ran this episode.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.phase != SchedulerPhase::Dormant
    }

    /// Reports whether the first composed roster is ready to run.
    #[must_use]
    pub fn first_roster_full(&self) -> bool {
        self.sequences.first().is_some_and(SpawnSequence::is_full)
    }

    /// One-based number of the current wave.
    #[must_use]
    pub const fn wave_number(&self) -> usize {
        self.current_index + 1
    }

    /// Number of sequences known this episode.
    #[must_use]
    pub fn total_waves(&self) -> usize {
        self.sequences.len()
    }

    /// Dispatch progress of the current wave.
    #[must_use]
    pub fn wave_progress(&self) -> f32 {
        self.sequences
            .get(self.current_index)
            .map_or(0.0, SpawnSequence::progress)
    }

    /// Read-only access to the sequences in activation order.
    #[must_use]
    pub fn sequences(&self) -> &[SpawnSequence] {
        &self.sequences
    }

    /// Checks whether [`WaveScheduler::queue_instruction`] would accept an
    /// instruction right now, without changing anything.
    pub fn can_queue(&self) -> Result<(), QueueError> {
        if self.config.mode == WaveMode::Randomized {
            return Err(QueueError::GeneratedWaves);
        }
        if matches!(
            self.phase,
            SchedulerPhase::Draining | SchedulerPhase::Completed
        ) {
            return Err(QueueError::WavesFinished);
        }
        if self.needs_new_sequence() && self.sequences.len() >= self.max_sequences {
            return Err(QueueError::RosterExhausted {
                max_sequences: self.max_sequences,
            });
        }
        Ok(())
    }

    /// Appends a bought unit to the composing sequence.
    ///
    /// A new composing sequence is opened when none exists or the last one is
    /// full, as long as the episode's sequence budget allows it.
    pub fn queue_instruction(
        &mut self,
        instruction: SpawnInstruction,
    ) -> Result<QueuedInstruction, QueueError> {
        self.can_queue()?;
        if self.needs_new_sequence() {
            self.sequences
                .push(SpawnSequence::new(self.config.roster_size));
            debug!(wave = self.sequences.len(), "opened composing wave");
        }
        let wave = self.sequences.len();
        let Some(sequence) = self.sequences.last_mut() else {
            return Err(QueueError::RosterExhausted {
                max_sequences: self.max_sequences,
            });
        };
        let len = sequence.push(instruction)?;
        Ok(QueuedInstruction {
            wave,
            len,
            filled: sequence.is_full(),
        })
    }

    /// Begins dispatching waves.
    ///
    /// In randomized mode the generator supplies the sequences first. With no
    /// sequences at all the scheduler goes straight to the terminal wait, which
    /// resolves immediately when no unit is alive.
    pub fn start_all(
        &mut self,
        generator: Option<&mut dyn WaveGenerator>,
        catalog: &Catalog,
        episode: u64,
        live_units: u32,
        events: &mut Vec<Event>,
    ) -> bool {
        if self.phase != SchedulerPhase::Dormant {
            warn!(phase = ?self.phase, "waves already started this episode");
            return false;
        }
        if self.config.mode == WaveMode::Randomized {
            match generator {
                Some(generator) => {
                    self.sequences = generator
                        .generate(catalog, self.config.roster_size, episode)
                        .into_iter()
                        .map(SpawnSequence::from_instructions)
                        .collect();
                }
                None => warn!("randomized waves configured without a generator"),
            }
        }

        info!(waves = self.sequences.len(), "starting waves");
        if self.sequences.is_empty() {
            warn!("no waves to dispatch; waiting for the battlefield to clear");
            self.phase = SchedulerPhase::Draining;
        } else {
            self.activate(0, events);
        }
        self.poll(live_units, events)
    }

    /// Advances the running sequence's timer.
    pub fn tick(&mut self, dt: Duration, out: &mut Vec<Command>, events: &mut Vec<Event>) {
        let SchedulerPhase::Running { index } = self.phase else {
            return;
        };
        let Some(sequence) = self.sequences.get_mut(index) else {
            warn!(index, total = self.sequences.len(), "running wave index out of bounds");
            self.phase = SchedulerPhase::Draining;
            return;
        };
        if sequence.tick(dt, out) {
            events.push(Event::WaveCompleted {
                wave: wave_label(index),
            });
            self.advance(index);
        }
    }

    /// Re-evaluates the rendezvous and terminal guards.
    ///
    /// Returns `true` on the call that signals spawning completion.
    pub fn poll(&mut self, live_units: u32, events: &mut Vec<Event>) -> bool {
        loop {
            match self.phase {
                SchedulerPhase::AwaitingNext { next } => {
                    let ready = self.sequences.get(next).is_some_and(SpawnSequence::is_full);
                    if !ready {
                        return false;
                    }
                    self.activate(next, events);
                }
                SchedulerPhase::Draining => {
                    if live_units > 0 {
                        return false;
                    }
                    info!("all waves dispatched and battlefield clear");
                    self.phase = SchedulerPhase::Completed;
                    events.push(Event::SpawningCompleted);
                    return true;
                }
                SchedulerPhase::Dormant
                | SchedulerPhase::Running { .. }
                | SchedulerPhase::Completed => return false,
            }
        }
    }

    /// Cancels every wait and timer, destroys all sequences and resamples the
    /// sequence budget for `episode`.
    pub fn reset(&mut self, episode: u64) {
        for sequence in &mut self.sequences {
            sequence.cancel();
        }
        self.sequences.clear();
        self.phase = SchedulerPhase::Dormant;
        self.current_index = 0;
        self.max_sequences = sample_max_sequences(&self.config, episode);
        debug!(episode, max_sequences = self.max_sequences, "wave scheduler reset");
    }

    fn needs_new_sequence(&self) -> bool {
        self.sequences
            .last()
            .map_or(true, |last| last.is_full() || last.state() != SequenceState::Idle)
    }

    fn activate(&mut self, index: usize, events: &mut Vec<Event>) {
        let Some(sequence) = self.sequences.get_mut(index) else {
            warn!(index, total = self.sequences.len(), "wave index out of bounds");
            self.phase = SchedulerPhase::Draining;
            return;
        };
        self.current_index = index;
        let units: Vec<UnitKindId> = sequence
            .instructions()
            .iter()
            .map(SpawnInstruction::unit)
            .collect();
        events.push(Event::WaveQueued {
            wave: wave_label(index),
            units,
        });
        if sequence.init() {
            self.phase = SchedulerPhase::Running { index };
        } else {
            events.push(Event::WaveCompleted {
                wave: wave_label(index),
            });
            self.advance(index);
        }
    }

    fn advance(&mut self, completed: usize) {
        let next = completed + 1;
        self.phase = if next < self.sequences.len() {
            SchedulerPhase::AwaitingNext { next }
        } else {
            SchedulerPhase::Draining
        };
        debug!(completed = completed + 1, phase = ?self.phase, "wave finished");
    }
}

fn wave_label(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

fn sample_max_sequences(config: &Config, episode: u64) -> usize {
    let range = config.sequence_range();
    if range.is_empty() {
        return range.start as usize;
    }
    let seed = derive_seed(config.seed(), MAX_SEQUENCES_STREAM, episode);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.gen_range(range) as usize
}
