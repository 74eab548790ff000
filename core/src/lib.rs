#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tower Duel engine.
//!
//! This crate defines the message surface that connects the simulation
//! context, the authoritative world, and the pure systems. Collaborators and
//! agents submit [`Command`] values describing desired mutations, the world
//! and the systems execute them, and every observable outcome is broadcast as
//! an [`Event`]. Systems consume event streams, query immutable snapshots, and
//! respond with new command batches.

pub mod observer;
pub mod record;
pub mod seed;
pub mod timer;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use observer::{Observers, SubscriptionId};
pub use record::{EventRecord, EventSink, RecordValue};
pub use timer::Timer;

/// The two competing roles of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    /// Buys units that are spawned in waves toward the home bases.
    Attacker,
    /// Buys and places towers that protect the home bases.
    Defender,
}

impl Team {
    /// Both teams in their canonical order.
    pub const ALL: [Team; 2] = [Team::Attacker, Team::Defender];

    /// Human readable label used in structured logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Attacker => "Attacker",
            Self::Defender => "Defender",
        }
    }
}

/// Coarse phase of a match.
///
/// `Win` and `Lose` are named from the defending side: `Win` means the home
/// bases held, `Lose` means every home base fell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelState {
    /// Optional introduction sequence before building starts.
    Intro,
    /// Purchase and placement phase before enemies are released.
    Building,
    /// Waves are being dispatched.
    SpawningEnemies,
    /// Every wave was dispatched and the battlefield was observed empty.
    AllEnemiesSpawned,
    /// The defender held the level.
    Win,
    /// Every home base was destroyed.
    Lose,
}

impl LevelState {
    /// Reports whether the state ends the episode.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Win | Self::Lose)
    }

    /// Team credited with the outcome of a terminal state.
    #[must_use]
    pub const fn winner(self) -> Option<Team> {
        match self {
            Self::Win => Some(Team::Defender),
            Self::Lose => Some(Team::Attacker),
            _ => None,
        }
    }

    /// Position along the forward chain; used to reject backward edges.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Intro => 0,
            Self::Building => 1,
            Self::SpawningEnemies => 2,
            Self::AllEnemiesSpawned => 3,
            Self::Win | Self::Lose => 4,
        }
    }
}

macro_rules! small_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> u32 {
                self.0
            }

            /// Index form of the identifier for slice lookups.
            #[must_use]
            pub const fn index(&self) -> usize {
                self.0 as usize
            }
        }
    };
}

small_id!(
    /// Stable handle of a live unit inside the world arena.
    UnitId
);
small_id!(
    /// Stable handle of a placed tower inside the world arena.
    TowerId
);
small_id!(
    /// Canonical catalog index of a unit definition.
    UnitKindId
);
small_id!(
    /// Canonical catalog index of a tower definition.
    TowerKindId
);
small_id!(
    /// Identifier of a spawn node units enter the path from.
    SpawnNodeId
);
small_id!(
    /// Index of a home base the defender protects.
    HomeBaseId
);

/// Location of a single placement-grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    x: u32,
    y: u32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }
}

/// Dimensions of the tower placement grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    /// Creates a new grid size descriptor.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of placement tiles.
    #[must_use]
    pub const fn tile_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: GridCoord) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// Row-major tile number of the cell, if it lies inside the grid.
    #[must_use]
    pub fn tile_index(&self, cell: GridCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let x = usize::try_from(cell.x).ok()?;
        let y = usize::try_from(cell.y).ok()?;
        Some(y * width + x)
    }
}

/// Purchasable unit description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    name: String,
    cost: u32,
    extra_income: u32,
    health: f32,
    spawn_delay: Duration,
    spawn_node: SpawnNodeId,
}

impl UnitDefinition {
    /// Creates a unit definition.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        cost: u32,
        extra_income: u32,
        health: f32,
        spawn_delay: Duration,
        spawn_node: SpawnNodeId,
    ) -> Self {
        Self {
            name: name.into(),
            cost,
            extra_income,
            health,
            spawn_delay,
            spawn_node,
        }
    }

    /// Display name used by the event log.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Purchase price in attacker currency.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Flat income added to the attacker's income tick when bought.
    #[must_use]
    pub const fn extra_income(&self) -> u32 {
        self.extra_income
    }

    /// Health the unit spawns with.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Delay preceding the unit's spawn inside a wave.
    #[must_use]
    pub const fn spawn_delay(&self) -> Duration {
        self.spawn_delay
    }

    /// Node the unit enters the path from.
    #[must_use]
    pub const fn spawn_node(&self) -> SpawnNodeId {
        self.spawn_node
    }
}

/// Purchasable tower description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerDefinition {
    name: String,
    cost: u32,
    health: f32,
}

impl TowerDefinition {
    /// Creates a tower definition.
    #[must_use]
    pub fn new(name: impl Into<String>, cost: u32, health: f32) -> Self {
        Self {
            name: name.into(),
            cost,
            health,
        }
    }

    /// Display name used by the event log.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Purchase price in defender currency.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Health the tower is built with.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }
}

/// Canonical table of unit and tower definitions.
///
/// Kind identifiers are positions in this table, so the action decoder, the
/// observation encoder, and the event log all agree on numbering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    units: Vec<UnitDefinition>,
    towers: Vec<TowerDefinition>,
}

impl Catalog {
    /// Creates a catalog from ordered definitions.
    #[must_use]
    pub fn new(units: Vec<UnitDefinition>, towers: Vec<TowerDefinition>) -> Self {
        Self { units, towers }
    }

    /// Looks up a unit definition.
    #[must_use]
    pub fn unit(&self, kind: UnitKindId) -> Option<&UnitDefinition> {
        self.units.get(kind.index())
    }

    /// Looks up a tower definition.
    #[must_use]
    pub fn tower(&self, kind: TowerKindId) -> Option<&TowerDefinition> {
        self.towers.get(kind.index())
    }

    /// Iterates unit definitions in canonical order.
    pub fn units(&self) -> impl Iterator<Item = (UnitKindId, &UnitDefinition)> {
        self.units
            .iter()
            .enumerate()
            .map(|(index, unit)| (UnitKindId::new(index as u32), unit))
    }

    /// Iterates tower definitions in canonical order.
    pub fn towers(&self) -> impl Iterator<Item = (TowerKindId, &TowerDefinition)> {
        self.towers
            .iter()
            .enumerate()
            .map(|(index, tower)| (TowerKindId::new(index as u32), tower))
    }

    /// Number of unit kinds.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Number of tower kinds.
    #[must_use]
    pub fn tower_count(&self) -> usize {
        self.towers.len()
    }

    /// Builds the spawn instruction a purchase of `kind` produces.
    #[must_use]
    pub fn instruction_for(&self, kind: UnitKindId) -> Option<SpawnInstruction> {
        self.unit(kind).map(|unit| {
            SpawnInstruction::new(kind, unit.spawn_node(), unit.spawn_delay())
        })
    }

    /// Highest unit price; observation encoders scale unit costs by it.
    #[must_use]
    pub fn max_unit_cost(&self) -> u32 {
        self.units.iter().map(UnitDefinition::cost).max().unwrap_or(0)
    }

    /// Highest tower price; observation encoders scale tower costs by it.
    #[must_use]
    pub fn max_tower_cost(&self) -> u32 {
        self.towers.iter().map(TowerDefinition::cost).max().unwrap_or(0)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let node = SpawnNodeId::new(0);
        Self::new(
            vec![
                UnitDefinition::new("Hoverbuggy", 10, 1, 20.0, Duration::from_secs(1), node),
                UnitDefinition::new(
                    "Hovercopter",
                    20,
                    2,
                    35.0,
                    Duration::from_millis(1_500),
                    node,
                ),
                UnitDefinition::new("Hovertank", 30, 3, 60.0, Duration::from_secs(2), node),
            ],
            vec![
                TowerDefinition::new("Assault Cannon", 5, 50.0),
                TowerDefinition::new("Rocket Platform", 10, 60.0),
                TowerDefinition::new("Plasma Lance", 15, 80.0),
            ],
        )
    }
}

/// Immutable description of one timed spawn inside a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnInstruction {
    unit: UnitKindId,
    node: SpawnNodeId,
    delay: Duration,
}

impl SpawnInstruction {
    /// Creates a spawn instruction.
    #[must_use]
    pub const fn new(unit: UnitKindId, node: SpawnNodeId, delay: Duration) -> Self {
        Self { unit, node, delay }
    }

    /// Unit kind to spawn.
    #[must_use]
    pub const fn unit(&self) -> UnitKindId {
        self.unit
    }

    /// Node the unit enters from.
    #[must_use]
    pub const fn node(&self) -> SpawnNodeId {
        self.node
    }

    /// Delay measured from the previous spawn in the same wave.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

/// Source of pre-composed waves used when the level randomizes its waves.
pub trait WaveGenerator {
    /// Produces the ordered instruction lists of every wave for an episode.
    fn generate(
        &mut self,
        catalog: &Catalog,
        roster_size: usize,
        episode: u64,
    ) -> Vec<Vec<SpawnInstruction>>;
}

/// Reasons a purchase may be rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PurchaseError {
    /// Prices must be strictly positive.
    #[error("purchase cost must be positive")]
    InvalidCost,
    /// The balance does not cover the price.
    #[error("insufficient funds: balance {balance} < cost {cost}")]
    InsufficientFunds {
        /// Balance at the time of the request.
        balance: u32,
        /// Requested price.
        cost: u32,
    },
    /// The requested item is missing from the catalog.
    #[error("item is not registered in the catalog")]
    UnknownItem,
    /// No composing wave can take another unit.
    #[error("no wave roster can accept another unit")]
    RosterUnavailable,
    /// The level phase does not accept purchases.
    #[error("purchases are closed in the current level state")]
    InvalidPhase,
}

/// Reasons a tower placement request may be rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The cell lies outside the placement grid.
    #[error("cell lies outside the placement grid")]
    OutOfBounds,
    /// Another tower already occupies the cell this episode.
    #[error("cell is already occupied")]
    Occupied,
    /// The tower kind is missing from the catalog.
    #[error("tower kind is not registered in the catalog")]
    UnknownTower,
    /// The defender cannot afford the tower.
    #[error("insufficient funds")]
    InsufficientFunds,
    /// The level phase does not accept placements.
    #[error("placements are closed in the current level state")]
    InvalidPhase,
}

/// Commands that express all permissible mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a unit enters the battlefield at a spawn node.
    SpawnUnit {
        /// Kind of unit to spawn.
        kind: UnitKindId,
        /// Node the unit enters from.
        node: SpawnNodeId,
    },
    /// Reports damage dealt to a live unit.
    DamageUnit {
        /// Unit that took damage.
        unit: UnitId,
        /// Amount of health removed.
        amount: f32,
        /// Tower responsible for the damage, if known.
        tower: Option<TowerId>,
    },
    /// Removes a unit without a kill, e.g. after it reached a home base.
    RemoveUnit {
        /// Unit leaving the battlefield.
        unit: UnitId,
    },
    /// Requests placement of a tower on a grid cell.
    PlaceTower {
        /// Kind of tower to construct.
        kind: TowerKindId,
        /// Cell the tower occupies.
        cell: GridCoord,
    },
    /// Reports damage dealt to a placed tower.
    DamageTower {
        /// Tower that took damage.
        tower: TowerId,
        /// Amount of health removed.
        amount: f32,
    },
    /// Reports damage dealt to a home base.
    DamageHomeBase {
        /// Home base that took damage.
        base: HomeBaseId,
        /// Amount of health removed.
        amount: f32,
        /// Unit responsible for the damage, if known.
        unit: Option<UnitId>,
    },
    /// Attacker request to buy a unit into the composing wave.
    BuyUnit {
        /// Kind of unit to buy.
        kind: UnitKindId,
    },
    /// Signals that the configured intro sequence finished.
    CompleteIntro,
    /// Declares the building phase complete.
    CompleteBuilding,
}

/// Events broadcast after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// A new episode started.
    RoundStarted {
        /// One-based game counter of the starting episode.
        game: u64,
    },
    /// The level state machine moved between phases.
    LevelStateChanged {
        /// State before the transition.
        from: LevelState,
        /// State after the transition.
        to: LevelState,
    },
    /// The attacker bought a unit into the composing wave.
    UnitPurchased {
        /// Kind of unit bought.
        kind: UnitKindId,
        /// Attacker balance after the purchase.
        balance: u32,
        /// Flat income per tick after the purchase.
        income: u32,
    },
    /// The attacker's purchase was rejected without side effects.
    UnitPurchaseRejected {
        /// Kind of unit requested.
        kind: UnitKindId,
        /// Reason for the rejection.
        reason: PurchaseError,
    },
    /// A wave was activated and its roster dispatched to the spawn timer.
    WaveQueued {
        /// One-based wave number.
        wave: u32,
        /// Units in spawn order.
        units: Vec<UnitKindId>,
    },
    /// A wave dispatched its final instruction.
    WaveCompleted {
        /// One-based wave number.
        wave: u32,
    },
    /// A unit entered the battlefield.
    UnitSpawned {
        /// Identifier assigned to the unit.
        unit: UnitId,
        /// Kind of the unit.
        kind: UnitKindId,
        /// Node the unit entered from.
        node: SpawnNodeId,
        /// Live units after the spawn.
        live_units: u32,
    },
    /// A unit took damage and survived.
    UnitDamaged {
        /// Unit that took damage.
        unit: UnitId,
        /// Kind of the unit.
        kind: UnitKindId,
        /// Damage dealt.
        amount: f32,
        /// Health remaining.
        health: f32,
        /// Tower responsible, if known.
        tower: Option<TowerId>,
    },
    /// A unit was killed.
    UnitDestroyed {
        /// Unit that died.
        unit: UnitId,
        /// Kind of the unit.
        kind: UnitKindId,
        /// Damage exceeding the remaining health.
        overkill: f32,
        /// Tower responsible, if known.
        tower: Option<TowerId>,
    },
    /// A unit left the battlefield without being killed.
    UnitRemoved {
        /// Unit that left.
        unit: UnitId,
        /// Kind of the unit.
        kind: UnitKindId,
    },
    /// A tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Kind of tower.
        kind: TowerKindId,
        /// Occupied cell.
        cell: GridCoord,
    },
    /// A tower placement was rejected without side effects.
    TowerPlacementRejected {
        /// Kind of tower requested.
        kind: TowerKindId,
        /// Requested cell.
        cell: GridCoord,
        /// Reason for the rejection.
        reason: PlacementError,
    },
    /// A tower took damage and survived.
    TowerDamaged {
        /// Tower that took damage.
        tower: TowerId,
        /// Kind of tower.
        kind: TowerKindId,
        /// Occupied cell.
        cell: GridCoord,
        /// Damage dealt.
        amount: f32,
        /// Health remaining.
        health: f32,
    },
    /// A tower was destroyed and its cell freed.
    TowerDestroyed {
        /// Tower that was destroyed.
        tower: TowerId,
        /// Kind of tower.
        kind: TowerKindId,
        /// Previously occupied cell.
        cell: GridCoord,
    },
    /// A home base took damage.
    HomeBaseDamaged {
        /// Home base that took damage.
        base: HomeBaseId,
        /// Damage dealt.
        amount: f32,
        /// Health remaining.
        health: f32,
        /// Kind of the unit responsible, if known.
        unit_kind: Option<UnitKindId>,
    },
    /// A home base reached zero health.
    HomeBaseDestroyed {
        /// Home base that fell.
        base: HomeBaseId,
    },
    /// Passive income was granted.
    IncomeGranted {
        /// Team receiving the income.
        team: Team,
        /// Amount granted.
        amount: u32,
        /// Balance after the grant.
        balance: u32,
    },
    /// Periodic economy report for the event log.
    EconomyReported {
        /// Reported team.
        team: Team,
        /// Current balance.
        balance: u32,
        /// Flat income per tick.
        income: u32,
    },
    /// All waves were dispatched and the battlefield emptied.
    SpawningCompleted,
    /// An episode reached a terminal state and rewards were settled.
    EpisodeEnded {
        /// Game counter of the finished episode.
        game: u64,
        /// Winning team.
        winner: Team,
        /// Group reward assigned to the attacker.
        attacker_reward: f32,
        /// Group reward assigned to the defender.
        defender_reward: f32,
    },
    /// An episode was truncated without rewards.
    EpisodeInterrupted {
        /// Game counter of the truncated episode.
        game: u64,
    },
}

/// Immutable representation of a live unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitSnapshot {
    /// Arena handle of the unit.
    pub id: UnitId,
    /// Kind of the unit.
    pub kind: UnitKindId,
    /// Remaining health.
    pub health: f32,
}

/// Read-only snapshot describing every live unit.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Number of live units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the battlefield is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a placed tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Arena handle of the tower.
    pub id: TowerId,
    /// Kind of the tower.
    pub kind: TowerKindId,
    /// Occupied cell.
    pub cell: GridCoord,
    /// Remaining health.
    pub health: f32,
}

/// Read-only snapshot describing every placed tower.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of placed towers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no tower is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a home base.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HomeBaseSnapshot {
    /// Index of the base.
    pub id: HomeBaseId,
    /// Remaining health.
    pub health: f32,
    /// Health restored on reset.
    pub max_health: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_index_is_row_major() {
        let grid = GridSize::new(6, 7);
        assert_eq!(grid.tile_count(), 42);
        assert_eq!(grid.tile_index(GridCoord::new(0, 0)), Some(0));
        assert_eq!(grid.tile_index(GridCoord::new(5, 0)), Some(5));
        assert_eq!(grid.tile_index(GridCoord::new(0, 1)), Some(6));
        assert_eq!(grid.tile_index(GridCoord::new(5, 6)), Some(41));
        assert_eq!(grid.tile_index(GridCoord::new(6, 0)), None);
    }

    #[test]
    fn terminal_states_name_their_winner() {
        assert_eq!(LevelState::Win.winner(), Some(Team::Defender));
        assert_eq!(LevelState::Lose.winner(), Some(Team::Attacker));
        assert_eq!(LevelState::Building.winner(), None);
        assert!(!LevelState::AllEnemiesSpawned.is_terminal());
    }

    #[test]
    fn default_catalog_uses_positional_kinds() {
        let catalog = Catalog::default();
        let names: Vec<_> = catalog.towers().map(|(_, tower)| tower.name()).collect();
        assert_eq!(names, ["Assault Cannon", "Rocket Platform", "Plasma Lance"]);
        assert_eq!(catalog.max_tower_cost(), 15);
        assert_eq!(catalog.max_unit_cost(), 30);

        let instruction = catalog
            .instruction_for(UnitKindId::new(2))
            .expect("hovertank instruction");
        assert_eq!(instruction.unit(), UnitKindId::new(2));
        assert_eq!(instruction.delay(), Duration::from_secs(2));
        assert!(catalog.instruction_for(UnitKindId::new(3)).is_none());
    }

    #[test]
    fn unit_view_sorts_by_identifier() {
        let view = UnitView::from_snapshots(vec![
            UnitSnapshot {
                id: UnitId::new(2),
                kind: UnitKindId::new(1),
                health: 1.0,
            },
            UnitSnapshot {
                id: UnitId::new(1),
                kind: UnitKindId::new(1),
                health: 1.0,
            },
            UnitSnapshot {
                id: UnitId::new(3),
                kind: UnitKindId::new(9),
                health: 1.0,
            },
        ]);
        assert_eq!(view.iter().next().map(|unit| unit.id), Some(UnitId::new(1)));
    }
}
