#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battlefield state for Tower Duel.
//!
//! The world owns the home bases, the live-unit arena and the placed-tower
//! arena. It is mutated exclusively through [`apply`] and observed through the
//! read-only functions in [`query`].

mod towers;
mod units;

use tower_duel_core::{Catalog, Command, Event, GridCoord, GridSize, PlacementError, TowerKindId};
use tracing::{debug, warn};

use crate::{towers::TowerRegistry, units::UnitArena};

const DEFAULT_GRID_WIDTH: u32 = 6;
const DEFAULT_GRID_HEIGHT: u32 = 7;
const DEFAULT_HOME_BASES: u32 = 1;
const DEFAULT_BASE_HEALTH: f32 = 100.0;

/// Static layout of the battlefield.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    grid: GridSize,
    home_bases: u32,
    base_health: f32,
}

impl Layout {
    /// Creates a layout descriptor.
    #[must_use]
    pub const fn new(grid: GridSize, home_bases: u32, base_health: f32) -> Self {
        Self {
            grid,
            home_bases,
            base_health,
        }
    }

    /// Dimensions of the tower placement grid.
    #[must_use]
    pub const fn grid(&self) -> GridSize {
        self.grid
    }

    /// Number of home bases the defender protects.
    #[must_use]
    pub const fn home_bases(&self) -> u32 {
        self.home_bases
    }

    /// Maximum health of every home base.
    #[must_use]
    pub const fn base_health(&self) -> f32 {
        self.base_health
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(
            GridSize::new(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT),
            DEFAULT_HOME_BASES,
            DEFAULT_BASE_HEALTH,
        )
    }
}

#[derive(Clone, Debug)]
struct HomeBase {
    health: f32,
    max_health: f32,
}

impl HomeBase {
    fn new(max_health: f32) -> Self {
        Self {
            health: max_health,
            max_health,
        }
    }

    fn is_destroyed(&self) -> bool {
        self.health <= 0.0
    }
}

/// Represents the authoritative Tower Duel battlefield.
#[derive(Debug)]
pub struct World {
    layout: Layout,
    catalog: Catalog,
    home_bases: Vec<HomeBase>,
    units: UnitArena,
    towers: TowerRegistry,
    tick_index: u64,
}

impl World {
    /// Creates a fresh battlefield with every home base at full health.
    #[must_use]
    pub fn new(layout: Layout, catalog: Catalog) -> Self {
        let home_bases = (0..layout.home_bases)
            .map(|_| HomeBase::new(layout.base_health))
            .collect();
        Self {
            layout,
            catalog,
            home_bases,
            units: UnitArena::new(),
            towers: TowerRegistry::new(),
            tick_index: 0,
        }
    }

    fn validate_placement(&self, kind: TowerKindId, cell: GridCoord) -> Result<f32, PlacementError> {
        let definition = self.catalog.tower(kind).ok_or(PlacementError::UnknownTower)?;
        if !self.layout.grid.contains(cell) {
            return Err(PlacementError::OutOfBounds);
        }
        if self.towers.is_claimed(cell) {
            return Err(PlacementError::Occupied);
        }
        Ok(definition.health())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Layout::default(), Catalog::default())
    }
}

/// Clears units and towers and restores every home base to full health.
pub fn reset(world: &mut World) {
    world.units.clear();
    world.towers.clear();
    for base in &mut world.home_bases {
        base.health = base.max_health;
    }
    world.tick_index = 0;
    debug!("world reset");
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands that reference unknown handles or catalog entries are logged and
/// ignored. Commands addressed to other components are ignored silently.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnUnit { kind, node } => {
            let Some(definition) = world.catalog.unit(kind) else {
                warn!(kind = kind.get(), "spawn requested for unknown unit kind");
                return;
            };
            let unit = world.units.spawn(kind, definition.health());
            out_events.push(Event::UnitSpawned {
                unit,
                kind,
                node,
                live_units: live_count(world),
            });
        }
        Command::DamageUnit {
            unit,
            amount,
            tower,
        } => {
            let Some(state) = world.units.get_mut(unit) else {
                debug!(unit = unit.get(), "damage reported for a unit that is not alive");
                return;
            };
            state.health -= amount.max(0.0);
            let kind = state.kind;
            if state.health > 0.0 {
                out_events.push(Event::UnitDamaged {
                    unit,
                    kind,
                    amount,
                    health: state.health,
                    tower,
                });
                return;
            }
            let overkill = -state.health;
            let _ = world.units.remove(unit);
            out_events.push(Event::UnitDestroyed {
                unit,
                kind,
                overkill,
                tower,
            });
        }
        Command::RemoveUnit { unit } => match world.units.remove(unit) {
            Some(state) => out_events.push(Event::UnitRemoved {
                unit,
                kind: state.kind,
            }),
            None => debug!(unit = unit.get(), "removal reported for a unit that is not alive"),
        },
        Command::PlaceTower { kind, cell } => match world.validate_placement(kind, cell) {
            Ok(health) => {
                let tower = world.towers.insert(kind, cell, health);
                out_events.push(Event::TowerPlaced { tower, kind, cell });
            }
            Err(reason) => {
                warn!(%reason, x = cell.x(), y = cell.y(), "tower placement rejected");
                out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
            }
        },
        Command::DamageTower { tower, amount } => {
            let Some(state) = world.towers.get_mut(tower) else {
                warn!(tower = tower.get(), "damage reported for unknown tower");
                return;
            };
            state.health -= amount.max(0.0);
            let (kind, cell) = (state.kind, state.cell);
            if state.health > 0.0 {
                out_events.push(Event::TowerDamaged {
                    tower,
                    kind,
                    cell,
                    amount,
                    health: state.health,
                });
                return;
            }
            let _ = world.towers.remove(tower);
            out_events.push(Event::TowerDestroyed { tower, kind, cell });
        }
        Command::DamageHomeBase { base, amount, unit } => {
            let unit_kind = unit.and_then(|id| world.units.get(id)).map(|state| state.kind);
            let Some(home) = world.home_bases.get_mut(base.index()) else {
                warn!(base = base.get(), "damage reported for unknown home base");
                return;
            };
            if home.is_destroyed() {
                return;
            }
            home.health = (home.health - amount.max(0.0)).max(0.0);
            out_events.push(Event::HomeBaseDamaged {
                base,
                amount,
                health: home.health,
                unit_kind,
            });
            if home.is_destroyed() {
                out_events.push(Event::HomeBaseDestroyed { base });
            }
        }
        Command::BuyUnit { .. } | Command::CompleteIntro | Command::CompleteBuilding => {}
    }
}

fn live_count(world: &World) -> u32 {
    u32::try_from(world.units.len()).unwrap_or(u32::MAX)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tower_duel_core::{
        Catalog, GridCoord, GridSize, HomeBaseId, HomeBaseSnapshot, PlacementError, TowerKindId,
        TowerView, UnitView,
    };

    use super::World;

    /// Catalog the world resolves kinds against.
    #[must_use]
    pub fn catalog(world: &World) -> &Catalog {
        &world.catalog
    }

    /// Dimensions of the tower placement grid.
    #[must_use]
    pub fn grid(world: &World) -> GridSize {
        world.layout.grid
    }

    /// Number of units currently alive on the battlefield.
    #[must_use]
    pub fn live_unit_count(world: &World) -> u32 {
        super::live_count(world)
    }

    /// Number of ticks applied since the last reset.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Number of towers currently standing.
    #[must_use]
    pub fn tower_count(world: &World) -> usize {
        world.towers.len()
    }

    /// Captures a read-only view of the live units.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(world.units.iter().map(|unit| unit.snapshot()).collect())
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Snapshots of every home base in index order.
    #[must_use]
    pub fn home_bases(world: &World) -> Vec<HomeBaseSnapshot> {
        world
            .home_bases
            .iter()
            .enumerate()
            .map(|(index, base)| HomeBaseSnapshot {
                id: HomeBaseId::new(u32::try_from(index).unwrap_or(u32::MAX)),
                health: base.health,
                max_health: base.max_health,
            })
            .collect()
    }

    /// Reports whether every home base has fallen.
    ///
    /// A layout without home bases never counts as destroyed.
    #[must_use]
    pub fn all_home_bases_destroyed(world: &World) -> bool {
        !world.home_bases.is_empty() && world.home_bases.iter().all(|base| base.is_destroyed())
    }

    /// Combined health of all home bases as a fraction of their maximum.
    #[must_use]
    pub fn home_base_health_ratio(world: &World) -> f32 {
        let (health, max) = world
            .home_bases
            .iter()
            .fold((0.0_f32, 0.0_f32), |(health, max), base| {
                (health + base.health, max + base.max_health)
            });
        if max <= 0.0 {
            return 0.0;
        }
        (health / max).clamp(0.0, 1.0)
    }

    /// Checks whether a tower of `kind` may be placed on `cell` right now.
    pub fn placement_check(
        world: &World,
        kind: TowerKindId,
        cell: GridCoord,
    ) -> Result<(), PlacementError> {
        world.validate_placement(kind, cell).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use tower_duel_core::HomeBaseId;

    use super::*;

    #[test]
    fn default_world_matches_training_layout() {
        let world = World::default();
        assert_eq!(query::grid(&world).tile_count(), 42);
        assert_eq!(query::home_bases(&world).len(), 1);
        assert_eq!(query::live_unit_count(&world), 0);
        assert!(!query::all_home_bases_destroyed(&world));
    }

    #[test]
    fn empty_layout_never_reports_destroyed_bases() {
        let world = World::new(Layout::new(GridSize::new(2, 2), 0, 10.0), Catalog::default());
        assert!(!query::all_home_bases_destroyed(&world));
        assert_eq!(query::home_base_health_ratio(&world), 0.0);
    }

    #[test]
    fn out_of_range_base_damage_is_ignored() {
        let mut world = World::default();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::DamageHomeBase {
                base: HomeBaseId::new(4),
                amount: 10.0,
                unit: None,
            },
            &mut events,
        );
        assert!(events.is_empty());
    }
}
