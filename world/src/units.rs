//! Live-unit arena keyed by stable handles.

use std::collections::BTreeMap;

use tower_duel_core::{UnitId, UnitKindId, UnitSnapshot};

#[derive(Clone, Debug)]
pub(crate) struct UnitState {
    pub(crate) id: UnitId,
    pub(crate) kind: UnitKindId,
    pub(crate) health: f32,
}

impl UnitState {
    pub(crate) fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            kind: self.kind,
            health: self.health,
        }
    }
}

#[derive(Debug)]
pub(crate) struct UnitArena {
    entries: BTreeMap<UnitId, UnitState>,
    next_unit_id: UnitId,
}

impl UnitArena {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_unit_id: UnitId::new(0),
        }
    }

    pub(crate) fn spawn(&mut self, kind: UnitKindId, health: f32) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id = UnitId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            UnitState {
                id,
                kind,
                health,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: UnitId) -> Option<&UnitState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: UnitId) -> Option<&mut UnitState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: UnitId) -> Option<UnitState> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &UnitState> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drops every unit; identifiers keep counting so stale handles stay dead.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
