//! Authoritative tower state management utilities.

use std::collections::{BTreeMap, HashMap};

use tower_duel_core::{GridCoord, TowerId, TowerKindId, TowerSnapshot};

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Catalog kind of the tower.
    pub(crate) kind: TowerKindId,
    /// Cell occupied by the tower.
    pub(crate) cell: GridCoord,
    /// Remaining health.
    pub(crate) health: f32,
}

impl TowerState {
    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            health: self.health,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
///
/// Claimed cells stay reserved until [`TowerRegistry::clear`], so a cell is
/// built on at most once per episode even after its tower is destroyed.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    claimed: HashMap<GridCoord, TowerId>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            claimed: HashMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    pub(crate) fn is_claimed(&self, cell: GridCoord) -> bool {
        self.claimed.contains_key(&cell)
    }

    /// Stores a new tower on an unclaimed cell.
    pub(crate) fn insert(&mut self, kind: TowerKindId, cell: GridCoord, health: f32) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self.claimed.insert(cell, id);
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                kind,
                cell,
                health,
            },
        );
        id
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    /// Removes a destroyed tower while keeping its cell claimed.
    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drops every tower and cell claim; identifiers are never reused.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.claimed.clear();
    }
}
