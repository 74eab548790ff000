#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level-wide phase tracking.
//!
//! The machine moves strictly forward through
//! `Intro → Building → SpawningEnemies → AllEnemiesSpawned → {Win | Lose}`,
//! with `Lose` reachable from every non-terminal state. Once terminal it
//! ignores every input until [`LevelStateMachine::reset`].

use tower_duel_core::{Event, LevelState, Observers, SubscriptionId};
use tracing::{debug, error, info};

/// A single `(old, new)` state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelTransition {
    /// State before the change.
    pub from: LevelState,
    /// State after the change.
    pub to: LevelState,
}

impl LevelTransition {
    /// Event form of the transition.
    #[must_use]
    pub const fn event(&self) -> Event {
        Event::LevelStateChanged {
            from: self.from,
            to: self.to,
        }
    }
}

/// Forward-only level phase machine with ordered transition observers.
#[derive(Debug)]
pub struct LevelStateMachine {
    state: LevelState,
    has_intro: bool,
    observers: Observers<LevelTransition>,
}

impl LevelStateMachine {
    /// Creates a machine in `Intro`. Call [`LevelStateMachine::start`] to
    /// fall through to `Building` when no intro is configured.
    #[must_use]
    pub fn new(has_intro: bool) -> Self {
        Self {
            state: LevelState::Intro,
            has_intro,
            observers: Observers::new(),
        }
    }

    /// Current level state.
    #[must_use]
    pub const fn state(&self) -> LevelState {
        self.state
    }

    /// Reports whether the episode reached `Win` or `Lose`.
    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.state.is_terminal()
    }

    /// Registers a callback invoked with every transition, in subscription order.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&LevelTransition) + 'static,
    {
        self.observers.subscribe(callback)
    }

    /// Removes a transition callback.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Enters `Building` right away when the level has no intro.
    pub fn start(&mut self) -> Vec<LevelTransition> {
        let mut transitions = Vec::new();
        if self.state == LevelState::Intro && !self.has_intro {
            self.transition(LevelState::Building, &mut transitions);
        }
        transitions
    }

    /// Signals that the intro sequence finished.
    pub fn intro_completed(&mut self) -> Vec<LevelTransition> {
        self.advance_from(LevelState::Intro, LevelState::Building)
    }

    /// Declares the building phase complete.
    pub fn building_completed(&mut self) -> Vec<LevelTransition> {
        self.advance_from(LevelState::Building, LevelState::SpawningEnemies)
    }

    /// Signals that every wave was dispatched and the battlefield emptied.
    ///
    /// Enters `AllEnemiesSpawned`, and `Win` at once when `live_units` is zero.
    pub fn spawning_completed(&mut self, live_units: u32) -> Vec<LevelTransition> {
        let mut transitions =
            self.advance_from(LevelState::SpawningEnemies, LevelState::AllEnemiesSpawned);
        if self.state == LevelState::AllEnemiesSpawned && live_units == 0 {
            self.transition(LevelState::Win, &mut transitions);
        }
        transitions
    }

    /// Reports the live unit count after it changed.
    pub fn population_changed(&mut self, live_units: u32) -> Vec<LevelTransition> {
        let mut transitions = Vec::new();
        if self.state == LevelState::AllEnemiesSpawned && live_units == 0 {
            self.transition(LevelState::Win, &mut transitions);
        }
        transitions
    }

    /// Signals that every home base fell; enters `Lose` from any non-terminal state.
    pub fn home_bases_destroyed(&mut self) -> Vec<LevelTransition> {
        let mut transitions = Vec::new();
        self.transition(LevelState::Lose, &mut transitions);
        transitions
    }

    /// Returns to `Intro` without broadcasting, then starts the next episode.
    pub fn reset(&mut self) -> Vec<LevelTransition> {
        debug!(from = ?self.state, "level reset");
        self.state = LevelState::Intro;
        self.start()
    }

    fn advance_from(&mut self, expected: LevelState, to: LevelState) -> Vec<LevelTransition> {
        let mut transitions = Vec::new();
        if self.state != expected {
            debug!(state = ?self.state, requested = ?to, "level signal ignored");
            return transitions;
        }
        self.transition(to, &mut transitions);
        transitions
    }

    fn transition(&mut self, to: LevelState, out: &mut Vec<LevelTransition>) {
        let from = self.state;
        if from == to {
            return;
        }
        if from.is_terminal() {
            debug!(state = ?from, requested = ?to, "level is over; transition ignored");
            return;
        }
        if to.ordinal() < from.ordinal() {
            error!(state = ?from, requested = ?to, "backward level transition rejected");
            return;
        }
        self.state = to;
        let transition = LevelTransition { from, to };
        if to.is_terminal() {
            info!(from = ?from, to = ?to, "level finished");
        } else {
            debug!(from = ?from, to = ?to, "level state changed");
        }
        self.observers.notify(&transition);
        out.push(transition);
    }
}
