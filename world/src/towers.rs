//! Authoritative tower state management utilities.

use std::collections::BTreeMap;

use grid_defence_core::{CellCoord, TowerId, TowerKind, TowerSnapshot};

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TowerState {
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Cell occupied by the tower.
    pub(crate) cell: CellCoord,
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Records a tower and allocates its identifier.
    pub(crate) fn insert(&mut self, kind: TowerKind, cell: CellCoord) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(id, TowerState { kind, cell });
        id
    }

    /// Removes a tower, returning its last known state.
    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        self.entries.remove(&id)
    }

    /// Identifier of the tower standing on `cell`, if any.
    pub(crate) fn tower_at(&self, cell: CellCoord) -> Option<TowerId> {
        self.entries
            .iter()
            .find(|(_, state)| state.cell == cell)
            .map(|(id, _)| *id)
    }

    /// Snapshots of every tower in identifier order.
    pub(crate) fn snapshots(&self) -> Vec<TowerSnapshot> {
        self.entries
            .iter()
            .map(|(id, state)| TowerSnapshot {
                id: *id,
                kind: state.kind,
                cell: state.cell,
            })
            .collect()
    }
}
