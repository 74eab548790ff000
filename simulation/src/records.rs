//! Conversion of simulation events into gameplay log records.

use std::collections::HashMap;

use tower_duel_core::{Catalog, Event, EventRecord, EventSink, TowerId, TowerKindId, UnitKindId};

const UNKNOWN: &str = "Unknown";

/// Turns events into named records, tracking what a record needs beyond
/// the event itself.
#[derive(Debug)]
pub struct EventRecorder {
    tower_kinds: HashMap<TowerId, TowerKindId>,
    spawn_count: u64,
}

impl Default for EventRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRecorder {
    /// Creates a recorder for the first game.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tower_kinds: HashMap::new(),
            spawn_count: 1,
        }
    }

    /// Builds the record of `event`, or `None` for events the log omits.
    pub fn record(
        &mut self,
        event: &Event,
        timestamp: f64,
        catalog: &Catalog,
    ) -> Option<EventRecord> {
        let record = match event {
            Event::RoundStarted { game } => {
                self.tower_kinds.clear();
                self.spawn_count = 1;
                EventRecord::new(timestamp, "RoundStart").with("gameCount", *game)
            }
            Event::UnitSpawned { kind, .. } => {
                let record = EventRecord::new(timestamp, "UnitSpawn")
                    .with("unitSpawned", unit_name(catalog, *kind))
                    .with("unitCount", self.spawn_count);
                self.spawn_count += 1;
                record
            }
            Event::WaveQueued { wave, units } => EventRecord::new(timestamp, "WaveQueued")
                .with(
                    "waveUnits",
                    units
                        .iter()
                        .map(|kind| unit_name(catalog, *kind))
                        .collect::<Vec<_>>(),
                )
                .with("waveNumber", *wave),
            Event::UnitPurchased { kind, income, .. } => {
                EventRecord::new(timestamp, "UnitBuying")
                    .with("unitBought", unit_name(catalog, *kind))
                    .with("currentIncome", *income)
            }
            Event::UnitDamaged {
                kind,
                amount,
                health,
                tower,
                ..
            } => EventRecord::new(timestamp, "UnitDamage")
                .with("unit", unit_name(catalog, *kind))
                .with("damage", *amount)
                .with("hp", *health)
                .with("attacker", self.tower_name(catalog, *tower)),
            Event::UnitDestroyed {
                kind,
                overkill,
                tower,
                ..
            } => EventRecord::new(timestamp, "UnitDeath")
                .with("unit", unit_name(catalog, *kind))
                .with("overkillDamage", *overkill)
                .with("killTower", self.tower_name(catalog, *tower)),
            Event::TowerPlaced { tower, kind, cell } => {
                let _ = self.tower_kinds.insert(*tower, *kind);
                EventRecord::new(timestamp, "TowerBuilding")
                    .with("tower", tower_name(catalog, *kind))
                    .with("X", cell.x())
                    .with("Y", cell.y())
            }
            Event::TowerDamaged {
                kind,
                cell,
                amount,
                health,
                ..
            } => EventRecord::new(timestamp, "TowerDamaged")
                .with("damagedTower", tower_name(catalog, *kind))
                .with("X", cell.x())
                .with("Y", cell.y())
                .with("towerDamage", *amount)
                .with("hp", *health),
            Event::TowerDestroyed { kind, cell, .. } => {
                EventRecord::new(timestamp, "TowerDestroyed")
                    .with("destroyedTower", tower_name(catalog, *kind))
                    .with("X", cell.x())
                    .with("Y", cell.y())
            }
            Event::HomeBaseDamaged {
                amount, unit_kind, ..
            } => EventRecord::new(timestamp, "BaseDamage")
                .with("damage", *amount)
                .with(
                    "unitDamaged",
                    unit_kind.map_or_else(|| UNKNOWN.to_owned(), |kind| unit_name(catalog, kind)),
                ),
            Event::EconomyReported {
                team,
                balance,
                income,
            } => EventRecord::new(timestamp, "Economy")
                .with("team", team.label())
                .with("currency", *balance)
                .with("income", *income),
            Event::EpisodeEnded { game, winner, .. } => EventRecord::new(timestamp, "GameEnd")
                .with("winner", winner.label())
                .with("gameCount", *game),
            _ => return None,
        };
        Some(record)
    }

    fn tower_name(&self, catalog: &Catalog, tower: Option<TowerId>) -> String {
        tower
            .and_then(|id| self.tower_kinds.get(&id))
            .map_or_else(|| UNKNOWN.to_owned(), |kind| tower_name(catalog, *kind))
    }
}

fn unit_name(catalog: &Catalog, kind: UnitKindId) -> String {
    catalog
        .unit(kind)
        .map_or_else(|| UNKNOWN.to_owned(), |unit| unit.name().to_owned())
}

fn tower_name(catalog: &Catalog, kind: TowerKindId) -> String {
    catalog
        .tower(kind)
        .map_or_else(|| UNKNOWN.to_owned(), |tower| tower.name().to_owned())
}

/// Keeps the records of the running game alongside those of every game.
#[derive(Debug, Default)]
pub struct EventStore {
    game: Vec<EventRecord>,
    all: Vec<EventRecord>,
}

impl EventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records of the running game.
    #[must_use]
    pub fn game_records(&self) -> &[EventRecord] {
        &self.game
    }

    /// Records of every game so far.
    #[must_use]
    pub fn all_records(&self) -> &[EventRecord] {
        &self.all
    }

    /// Renders the running game as a JSON array.
    pub fn game_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.game)
    }

    /// Renders every game as a JSON array.
    pub fn all_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.all)
    }

    /// Hands out the running game's records and starts an empty buffer.
    pub fn take_game(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.game)
    }

    /// Drops the running game from both buffers and returns its records.
    ///
    /// Used for games cut short without an outcome, which belong to no log.
    pub fn discard_game(&mut self) -> Vec<EventRecord> {
        let game = std::mem::take(&mut self.game);
        let keep = self.all.len().saturating_sub(game.len());
        self.all.truncate(keep);
        game
    }

    /// Drops the all-games buffer.
    pub fn clear_all(&mut self) {
        self.all.clear();
    }
}

impl EventSink for EventStore {
    fn log_event(&mut self, record: EventRecord) {
        self.all.push(record.clone());
        self.game.push(record);
    }
}
