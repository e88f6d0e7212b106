//! # RepUpdate
//!
//! The closed set of graph mutation commands.
//!
//! External layers mutate a graph only by constructing `RepUpdate` values
//! and applying them, so edit history, undo/redo and replication all observe
//! one event stream. Updates are plain data: they serialize to JSON and can
//! be replayed against any `RepStruct`.
//!
//! ## Error policy
//!
//! Every variant that names a cell absent from the graph fails with
//! `RepError::CellNotFound`. There are no silent no-ops: a replayed log that
//! references a missing cell is a bug worth surfacing.

use crate::{Cell, Identifier, RepError, RepStruct, Value, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One atomic graph mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepUpdate {
    /// Insert a cell, replacing any cell with the same id.
    AddCell {
        id: Identifier,
        #[serde(default)]
        data: BTreeMap<String, Value>,
        #[serde(default)]
        ports: BTreeMap<String, Identifier>,
    },
    /// Remove a cell and every port targeting it.
    RemoveCell { id: Identifier },
    /// Set a single metadata key.
    UpdateData {
        id: Identifier,
        key: String,
        value: Value,
    },
    /// Replace the whole metadata payload.
    ReplaceData {
        id: Identifier,
        data: BTreeMap<String, Value>,
    },
    /// Set the display label.
    RenameCell { id: Identifier, name: String },
    /// Add or retarget a named port.
    Connect {
        id: Identifier,
        port: String,
        target: Identifier,
    },
    /// Remove a named port.
    Disconnect { id: Identifier, port: String },
    /// Replace position and velocity.
    SetMotion {
        id: Identifier,
        position: Vec2,
        velocity: Vec2,
    },
}

impl RepUpdate {
    /// Apply this update, producing a new graph. `rep` is never modified.
    pub fn apply(&self, rep: &RepStruct) -> Result<RepStruct, RepError> {
        tracing::trace!(update = self.kind(), cell = %self.cell_id(), "applying update");
        match self {
            Self::AddCell { id, data, ports } => {
                let cell = Cell {
                    data: data.clone(),
                    ports: ports.clone(),
                    ..Cell::new(*id)
                };
                Ok(rep.adding(cell))
            }
            Self::RemoveCell { id } => rep.removing(*id),
            Self::UpdateData { id, key, value } => {
                rep.setting_value(*id, key.clone(), value.clone())
            }
            Self::ReplaceData { id, data } => rep.updating_data(*id, data.clone()),
            Self::RenameCell { id, name } => rep.renaming(*id, name.clone()),
            Self::Connect { id, port, target } => rep.connecting(*id, port.clone(), *target),
            Self::Disconnect { id, port } => rep.disconnecting(*id, port),
            Self::SetMotion {
                id,
                position,
                velocity,
            } => rep.moving(*id, *position, *velocity),
        }
    }

    /// The cell this update is addressed to.
    #[must_use]
    pub const fn cell_id(&self) -> Identifier {
        match self {
            Self::AddCell { id, .. }
            | Self::RemoveCell { id }
            | Self::UpdateData { id, .. }
            | Self::ReplaceData { id, .. }
            | Self::RenameCell { id, .. }
            | Self::Connect { id, .. }
            | Self::Disconnect { id, .. }
            | Self::SetMotion { id, .. } => *id,
        }
    }

    /// Every cell this update reads or writes, including port targets.
    #[must_use]
    pub fn target_ids(&self) -> BTreeSet<Identifier> {
        let mut ids = BTreeSet::new();
        ids.insert(self.cell_id());
        match self {
            Self::AddCell { ports, .. } => ids.extend(ports.values().copied()),
            Self::Connect { target, .. } => {
                ids.insert(*target);
            }
            _ => {}
        }
        ids
    }

    /// Short variant name, used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AddCell { .. } => "add_cell",
            Self::RemoveCell { .. } => "remove_cell",
            Self::UpdateData { .. } => "update_data",
            Self::ReplaceData { .. } => "replace_data",
            Self::RenameCell { .. } => "rename_cell",
            Self::Connect { .. } => "connect",
            Self::Disconnect { .. } => "disconnect",
            Self::SetMotion { .. } => "set_motion",
        }
    }
}

// =============================================================================
// DIFF
// =============================================================================

/// Compute an update stream turning `before`'s cells into `after`'s cells.
///
/// Order: removals (id order), then additions, then per-cell edits. Ports
/// that a removal scrubs implicitly are not disconnected again. The graph
/// id and name are not part of the diff.
#[must_use]
pub fn diff(before: &RepStruct, after: &RepStruct) -> Vec<RepUpdate> {
    let mut updates = Vec::new();

    let removed: BTreeSet<Identifier> = before
        .cell_ids()
        .filter(|id| !after.contains(*id))
        .collect();
    updates.extend(removed.iter().map(|&id| RepUpdate::RemoveCell { id }));

    for cell in after.cells() {
        match before.cell(cell.id) {
            None => push_addition(&mut updates, cell),
            Some(old) => push_edits(&mut updates, old, cell, &removed),
        }
    }

    tracing::debug!(
        before = %before.id(),
        after = %after.id(),
        updates = updates.len(),
        "computed graph diff"
    );
    updates
}

fn push_addition(updates: &mut Vec<RepUpdate>, cell: &Cell) {
    updates.push(RepUpdate::AddCell {
        id: cell.id,
        data: cell.data.clone(),
        ports: cell.ports.clone(),
    });
    if !cell.position.is_zero() || !cell.velocity.is_zero() {
        updates.push(RepUpdate::SetMotion {
            id: cell.id,
            position: cell.position,
            velocity: cell.velocity,
        });
    }
}

fn push_edits(
    updates: &mut Vec<RepUpdate>,
    old: &Cell,
    new: &Cell,
    removed: &BTreeSet<Identifier>,
) {
    let id = new.id;

    if old.data != new.data {
        updates.push(RepUpdate::ReplaceData {
            id,
            data: new.data.clone(),
        });
    }

    // ports still present once removals have scrubbed their targets
    let surviving: BTreeMap<&String, &Identifier> = old
        .ports
        .iter()
        .filter(|(_, target)| !removed.contains(*target))
        .collect();

    for port in surviving.keys() {
        if !new.ports.contains_key(*port) {
            updates.push(RepUpdate::Disconnect {
                id,
                port: (*port).clone(),
            });
        }
    }
    for (port, target) in &new.ports {
        if surviving.get(port) != Some(&target) {
            updates.push(RepUpdate::Connect {
                id,
                port: port.clone(),
                target: *target,
            });
        }
    }

    if old.position != new.position || old.velocity != new.velocity {
        updates.push(RepUpdate::SetMotion {
            id,
            position: new.position,
            velocity: new.velocity,
        });
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> Identifier {
        Identifier::from_u128(n)
    }

    fn base() -> RepStruct {
        RepStruct::with_id(id(100), "base")
            .adding(Cell::new(id(1)).with_port("out", id(2)))
            .adding(Cell::new(id(2)).with_data("n", 1))
    }

    #[test]
    fn add_cell_inserts_with_zero_motion() {
        let update = RepUpdate::AddCell {
            id: id(3),
            data: BTreeMap::new(),
            ports: [("p".to_string(), id(1))].into_iter().collect(),
        };
        let graph = base().applying(&update).expect("apply");
        let cell = graph.cell(id(3)).expect("cell");
        assert_eq!(cell.port("p"), Some(id(1)));
        assert!(cell.position.is_zero());
    }

    #[test]
    fn every_addressed_variant_rejects_missing_cell() {
        let missing = id(99);
        let updates = vec![
            RepUpdate::RemoveCell { id: missing },
            RepUpdate::UpdateData {
                id: missing,
                key: "k".to_string(),
                value: Value::Int(1),
            },
            RepUpdate::ReplaceData {
                id: missing,
                data: BTreeMap::new(),
            },
            RepUpdate::RenameCell {
                id: missing,
                name: "x".to_string(),
            },
            RepUpdate::Connect {
                id: missing,
                port: "p".to_string(),
                target: id(1),
            },
            RepUpdate::Disconnect {
                id: missing,
                port: "p".to_string(),
            },
            RepUpdate::SetMotion {
                id: missing,
                position: Vec2::ZERO,
                velocity: Vec2::ZERO,
            },
        ];

        for update in &updates {
            assert_eq!(
                base().applying(update),
                Err(RepError::CellNotFound(missing)),
                "{} should fail",
                update.kind()
            );
        }
    }

    #[test]
    fn update_data_merges_single_key() {
        let graph = base()
            .applying(&RepUpdate::UpdateData {
                id: id(2),
                key: "m".to_string(),
                value: Value::Bool(true),
            })
            .expect("apply");
        let data = &graph.cell(id(2)).expect("cell").data;
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn remove_twice_fails_identically() {
        let update = RepUpdate::RemoveCell { id: id(2) };
        let once = base().applying(&update).expect("first");
        let again = once.applying(&update);
        assert_eq!(again, Err(RepError::CellNotFound(id(2))));
    }

    #[test]
    fn updates_serialize_as_tagged_json() {
        let update = RepUpdate::RemoveCell { id: id(1) };
        let json = serde_json::to_string(&update).expect("encode");
        assert!(json.starts_with(r#"{"remove_cell":"#));

        let back: RepUpdate = serde_json::from_str(&json).expect("decode");
        assert_eq!(back, update);
    }

    #[test]
    fn target_ids_include_port_targets() {
        let update = RepUpdate::Connect {
            id: id(1),
            port: "p".to_string(),
            target: id(5),
        };
        let ids: Vec<_> = update.target_ids().into_iter().collect();
        assert_eq!(ids, vec![id(1), id(5)]);
    }

    #[test]
    fn diff_of_identical_graphs_is_empty() {
        assert!(diff(&base(), &base()).is_empty());
    }

    #[test]
    fn diff_replays_to_target() {
        let before = base();
        let after = before
            .removing(id(2))
            .expect("remove")
            .adding(Cell::new(id(3)).with_position(Vec2::new(1.0, 1.0)))
            .connecting(id(1), "next", id(3))
            .expect("connect")
            .renaming(id(1), "head")
            .expect("rename");

        let updates = diff(&before, &after);
        assert!(matches!(updates.first(), Some(RepUpdate::RemoveCell { .. })));

        let replayed = before.applying_all(&updates).expect("replay");
        assert_eq!(replayed.cells().collect::<Vec<_>>(), after.cells().collect::<Vec<_>>());
    }

    #[test]
    fn diff_does_not_disconnect_scrubbed_ports() {
        let before = base();
        let after = before.removing(id(2)).expect("remove");

        let updates = diff(&before, &after);
        assert_eq!(updates, vec![RepUpdate::RemoveCell { id: id(2) }]);
    }

    #[test]
    fn diff_retargets_port_with_connect() {
        let before = base().adding(Cell::new(id(3)));
        let after = before.connecting(id(1), "out", id(3)).expect("connect");

        let updates = diff(&before, &after);
        assert_eq!(
            updates,
            vec![RepUpdate::Connect {
                id: id(1),
                port: "out".to_string(),
                target: id(3)
            }]
        );
    }
}
