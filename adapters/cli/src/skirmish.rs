//! Stand-in battle model that reports combat outcomes to the simulation.
//!
//! The simulation never moves units or fires towers itself. This model fills
//! that gap for headless runs: units walk a fixed-length lane, towers shoot
//! the unit furthest along, and units that reach the end hit a home base.

use std::collections::BTreeMap;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tower_duel_core::{
    seed::derive_seed, Command, Event, HomeBaseId, TowerId, TowerKindId, UnitId, UnitKindId,
};

const SKIRMISH_STREAM: &str = "skirmish";

/// Seconds the fastest unit needs to walk the lane.
const BASE_TRAVEL_SECS: f32 = 6.0;
/// Extra lane seconds per unit kind index.
const TRAVEL_SECS_PER_KIND: f32 = 2.0;
/// Tower damage per second per tower kind index plus one.
const TOWER_DPS_STEP: f32 = 3.0;
/// Home-base damage per unit kind index plus one.
const BASE_DAMAGE_STEP: f32 = 10.0;
/// Chance per second that a unit hits a tower.
const TOWER_HIT_RATE: f64 = 0.2;
const TOWER_HIT_DAMAGE: f32 = 5.0;

#[derive(Clone, Copy, Debug)]
struct Walker {
    kind: UnitKindId,
    progress: f32,
    arrived: bool,
}

/// Tracks the battlefield through events and produces collaborator reports.
#[derive(Debug)]
pub(crate) struct Skirmish {
    seed: u64,
    rng: ChaCha8Rng,
    home_bases: u32,
    units: BTreeMap<UnitId, Walker>,
    towers: BTreeMap<TowerId, TowerKindId>,
}

impl Skirmish {
    /// Creates a model for a level with `home_bases` bases.
    pub(crate) fn new(seed: u64, home_bases: u32) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(derive_seed(seed, SKIRMISH_STREAM, 0)),
            home_bases,
            units: BTreeMap::new(),
            towers: BTreeMap::new(),
        }
    }

    /// Follows spawns, placements and removals reported by the simulation.
    pub(crate) fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::RoundStarted { game } => {
                    self.units.clear();
                    self.towers.clear();
                    self.rng = ChaCha8Rng::seed_from_u64(derive_seed(
                        self.seed,
                        SKIRMISH_STREAM,
                        *game,
                    ));
                }
                Event::UnitSpawned { unit, kind, .. } => {
                    let _ = self.units.insert(
                        *unit,
                        Walker {
                            kind: *kind,
                            progress: 0.0,
                            arrived: false,
                        },
                    );
                }
                Event::UnitDestroyed { unit, .. } | Event::UnitRemoved { unit, .. } => {
                    let _ = self.units.remove(unit);
                }
                Event::TowerPlaced { tower, kind, .. } => {
                    let _ = self.towers.insert(*tower, *kind);
                }
                Event::TowerDestroyed { tower, .. } => {
                    let _ = self.towers.remove(tower);
                }
                _ => {}
            }
        }
    }

    /// Advances the battle by `dt` and returns the resulting reports.
    pub(crate) fn step(&mut self, dt: Duration) -> Vec<Command> {
        let secs = dt.as_secs_f32();
        let mut commands = Vec::new();

        for (id, walker) in &mut self.units {
            if walker.arrived {
                continue;
            }
            walker.progress += secs / travel_secs(walker.kind);
            if walker.progress >= 1.0 {
                walker.arrived = true;
                let base = if self.home_bases > 1 {
                    self.rng.gen_range(0..self.home_bases)
                } else {
                    0
                };
                commands.push(Command::DamageHomeBase {
                    base: HomeBaseId::new(base),
                    amount: BASE_DAMAGE_STEP * (walker.kind.get() + 1) as f32,
                    unit: Some(*id),
                });
                commands.push(Command::RemoveUnit { unit: *id });
            }
        }

        if let Some(target) = self.leading_unit() {
            for (tower, kind) in &self.towers {
                commands.push(Command::DamageUnit {
                    unit: target,
                    amount: TOWER_DPS_STEP * (kind.get() + 1) as f32 * secs,
                    tower: Some(*tower),
                });
            }
        }

        let hit_chance = (TOWER_HIT_RATE * dt.as_secs_f64()).clamp(0.0, 1.0);
        if !self.towers.is_empty() {
            let walking = self.units.values().filter(|walker| !walker.arrived).count();
            for _ in 0..walking {
                if !self.rng.gen_bool(hit_chance) {
                    continue;
                }
                let pick = self.rng.gen_range(0..self.towers.len());
                if let Some(tower) = self.towers.keys().nth(pick) {
                    commands.push(Command::DamageTower {
                        tower: *tower,
                        amount: TOWER_HIT_DAMAGE,
                    });
                }
            }
        }
        commands
    }

    fn leading_unit(&self) -> Option<UnitId> {
        self.units
            .iter()
            .filter(|(_, walker)| !walker.arrived)
            .max_by(|(a_id, a), (b_id, b)| {
                a.progress
                    .total_cmp(&b.progress)
                    .then_with(|| b_id.cmp(a_id))
            })
            .map(|(id, _)| *id)
    }
}

fn travel_secs(kind: UnitKindId) -> f32 {
    BASE_TRAVEL_SECS + TRAVEL_SECS_PER_KIND * kind.get() as f32
}

#[cfg(test)]
mod tests {
    use tower_duel_core::{GridCoord, SpawnNodeId};

    use super::*;

    fn spawned(unit: u32, kind: u32) -> Event {
        Event::UnitSpawned {
            unit: UnitId::new(unit),
            kind: UnitKindId::new(kind),
            node: SpawnNodeId::new(0),
            live_units: 1,
        }
    }

    #[test]
    fn towers_focus_the_unit_furthest_along() {
        let mut skirmish = Skirmish::new(1, 1);
        skirmish.observe(&[
            spawned(0, 0),
            Event::TowerPlaced {
                tower: TowerId::new(0),
                kind: TowerKindId::new(1),
                cell: GridCoord::new(0, 0),
            },
        ]);
        let _ = skirmish.step(Duration::from_secs(1));
        skirmish.observe(&[spawned(1, 0)]);

        let commands = skirmish.step(Duration::from_secs(1));

        let shots: Vec<&Command> = commands
            .iter()
            .filter(|command| matches!(command, Command::DamageUnit { .. }))
            .collect();
        assert_eq!(
            shots,
            vec![&Command::DamageUnit {
                unit: UnitId::new(0),
                amount: 6.0,
                tower: Some(TowerId::new(0)),
            }],
            "older unit leads the lane"
        );
    }

    #[test]
    fn arriving_units_hit_the_base_once_and_leave() {
        let mut skirmish = Skirmish::new(1, 1);
        skirmish.observe(&[spawned(4, 2)]);

        let commands = skirmish.step(Duration::from_secs(10));
        assert_eq!(
            commands,
            vec![
                Command::DamageHomeBase {
                    base: HomeBaseId::new(0),
                    amount: 30.0,
                    unit: Some(UnitId::new(4)),
                },
                Command::RemoveUnit {
                    unit: UnitId::new(4),
                },
            ]
        );
        assert!(
            skirmish.step(Duration::from_secs(10)).is_empty(),
            "arrived units wait for their removal"
        );
    }

    #[test]
    fn new_rounds_forget_the_battlefield() {
        let mut skirmish = Skirmish::new(1, 1);
        skirmish.observe(&[spawned(0, 0), Event::RoundStarted { game: 2 }]);

        assert!(skirmish.step(Duration::from_secs(10)).is_empty());
    }
}
