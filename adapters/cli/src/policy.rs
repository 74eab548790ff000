//! Random decision makers standing in for trained agents.

use std::time::Duration;

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tower_duel_core::{seed::derive_seed, Catalog, Team, Timer};
use tower_duel_simulation::TeamSnapshot;
use tower_duel_system_builder::AgentAction;

/// Picks an affordable item at a fixed decision cadence.
#[derive(Debug)]
pub(crate) struct RandomPolicy {
    team: Team,
    rng: ChaCha8Rng,
    interval: Duration,
    timer: Timer,
}

impl RandomPolicy {
    /// Creates a policy for `team` deciding every `interval`.
    pub(crate) fn new(team: Team, seed: u64, interval: Duration) -> Self {
        let mut timer = Timer::new();
        timer.arm(interval);
        Self {
            team,
            rng: ChaCha8Rng::seed_from_u64(derive_seed(seed, team.label(), 0)),
            interval,
            timer,
        }
    }

    /// Advances the decision timer and returns a decision when one is due.
    ///
    /// Items the team cannot afford are never picked; with nothing affordable
    /// the decision is skipped.
    pub(crate) fn decide(
        &mut self,
        dt: Duration,
        snapshot: &TeamSnapshot,
        catalog: &Catalog,
    ) -> Option<AgentAction> {
        if !self.timer.tick(dt) {
            return None;
        }
        self.timer.rearm(self.interval);

        match self.team {
            Team::Attacker => {
                let affordable: Vec<u32> = catalog
                    .units()
                    .filter(|(_, unit)| unit.cost() <= snapshot.balance)
                    .map(|(kind, _)| kind.get())
                    .collect();
                let selector = *affordable.choose(&mut self.rng)?;
                Some(AgentAction::Attacker { selector })
            }
            Team::Defender => {
                let affordable: Vec<u32> = catalog
                    .towers()
                    .filter(|(_, tower)| tower.cost() <= snapshot.balance)
                    .map(|(kind, _)| kind.get())
                    .collect();
                let selector = *affordable.choose(&mut self.rng)?;
                Some(AgentAction::Defender {
                    selector,
                    x: self.rng.gen_range(0.0..1.0),
                    y: self.rng.gen_range(0.0..1.0),
                })
            }
        }
    }
}
