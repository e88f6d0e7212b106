//! # RepStruct
//!
//! The graph container: an identity, a display name and the map of cells.
//!
//! Every edit is value-returning. The receiver is never modified, so a
//! `RepStruct` can be kept as a history snapshot or handed to readers on
//! other threads while a writer keeps producing new versions. Cells are
//! held behind `Arc`: an edit copies the map of pointers and replaces only
//! the touched cells, everything else is shared with the previous version.

use crate::primitives::LABEL_KEY;
use crate::{Cell, Identifier, RepError, RepUpdate, Value, Vec2};
use std::collections::BTreeMap;
use std::sync::Arc;

/// An immutable-per-version directed graph of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RepStruct {
    id: Identifier,
    name: String,
    cells: BTreeMap<Identifier, Arc<Cell>>,
}

impl RepStruct {
    /// Create an empty graph with a fresh identifier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Identifier::generate(), name)
    }

    /// Create an empty graph with a caller-chosen identifier.
    #[must_use]
    pub fn with_id(id: Identifier, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    /// Rebuild a graph from already-keyed parts (deserialization).
    pub(crate) fn from_parts(
        id: Identifier,
        name: String,
        cells: BTreeMap<Identifier, Arc<Cell>>,
    ) -> Self {
        Self { id, name, cells }
    }

    #[must_use]
    pub const fn id(&self) -> Identifier {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the display name in place.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Copy of this graph under a different display name.
    #[must_use]
    pub fn named(&self, name: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.set_name(name);
        next
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    #[must_use]
    pub fn cell(&self, id: Identifier) -> Option<&Cell> {
        self.cells.get(&id).map(Arc::as_ref)
    }

    /// Shared handle to a cell, for building derived graphs without copying.
    pub(crate) fn cell_arc(&self, id: Identifier) -> Option<&Arc<Cell>> {
        self.cells.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: Identifier) -> bool {
        self.cells.contains_key(&id)
    }

    /// All cells in identifier order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values().map(Arc::as_ref)
    }

    /// All cell identifiers in order.
    pub fn cell_ids(&self) -> impl Iterator<Item = Identifier> + '_ {
        self.cells.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Total number of ports across every cell.
    #[must_use]
    pub fn port_count(&self) -> usize {
        self.cells.values().map(|c| c.ports.len()).sum()
    }

    /// Every `(source, port, target)` triple, ordered by source id then port name.
    pub fn edges(&self) -> impl Iterator<Item = (Identifier, &str, Identifier)> + '_ {
        self.cells.values().flat_map(|cell| {
            cell.ports
                .iter()
                .map(move |(port, target)| (cell.id, port.as_str(), *target))
        })
    }

    /// Whether two graphs hold the very same cell allocation for `id`.
    ///
    /// Used to observe structural sharing between versions.
    #[must_use]
    pub fn shares_cell(&self, other: &Self, id: Identifier) -> bool {
        match (self.cells.get(&id), other.cells.get(&id)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    // =========================================================================
    // COPY-PRODUCING EDITS
    // =========================================================================

    /// Insert or replace the cell keyed by its id. Always succeeds.
    #[must_use]
    pub fn adding(&self, cell: Cell) -> Self {
        let mut next = self.clone();
        next.cells.insert(cell.id, Arc::new(cell));
        next
    }

    /// Remove a cell and scrub every port that targeted it.
    ///
    /// There is no reverse-edge index: the scrub scans every surviving cell.
    /// Cells without an incoming port from `id` keep their shared allocation.
    pub fn removing(&self, id: Identifier) -> Result<Self, RepError> {
        if !self.contains(id) {
            return Err(RepError::CellNotFound(id));
        }

        let mut next = self.clone();
        next.cells.remove(&id);
        for slot in next.cells.values_mut() {
            if slot.targets_cell(id) {
                Arc::make_mut(slot).ports.retain(|_, target| *target != id);
            }
        }
        Ok(next)
    }

    /// Set the display label of a cell.
    pub fn renaming(&self, id: Identifier, to: impl Into<String>) -> Result<Self, RepError> {
        let label = Value::String(to.into());
        self.editing(id, |cell| {
            cell.data.insert(LABEL_KEY.to_string(), label);
            Ok(())
        })
    }

    /// Replace the whole metadata payload of a cell (no merge).
    pub fn updating_data(
        &self,
        id: Identifier,
        data: BTreeMap<String, Value>,
    ) -> Result<Self, RepError> {
        self.editing(id, |cell| {
            cell.data = data;
            Ok(())
        })
    }

    /// Set a single metadata key, keeping the rest of the payload.
    pub fn setting_value(
        &self,
        id: Identifier,
        key: impl Into<String>,
        value: Value,
    ) -> Result<Self, RepError> {
        let key = key.into();
        self.editing(id, |cell| {
            cell.data.insert(key, value);
            Ok(())
        })
    }

    /// Add or retarget a named port.
    ///
    /// The target is not required to exist: batched edits may pass through
    /// dangling states, which `RepValidator` reports afterwards.
    pub fn connecting(
        &self,
        id: Identifier,
        port: impl Into<String>,
        to: Identifier,
    ) -> Result<Self, RepError> {
        let port = port.into();
        self.editing(id, |cell| {
            cell.ports.insert(port, to);
            Ok(())
        })
    }

    /// Remove a named port.
    pub fn disconnecting(&self, id: Identifier, port: &str) -> Result<Self, RepError> {
        self.editing(id, |cell| match cell.ports.remove(port) {
            Some(_) => Ok(()),
            None => Err(RepError::PortNotFound {
                cell: id,
                port: port.to_string(),
            }),
        })
    }

    /// Replace the motion state of a cell.
    pub fn moving(
        &self,
        id: Identifier,
        position: Vec2,
        velocity: Vec2,
    ) -> Result<Self, RepError> {
        self.editing(id, |cell| {
            cell.position = position;
            cell.velocity = velocity;
            Ok(())
        })
    }

    /// Apply one mutation command.
    pub fn applying(&self, update: &RepUpdate) -> Result<Self, RepError> {
        update.apply(self)
    }

    /// Apply a batch of commands, all or nothing.
    ///
    /// The first failing command aborts the batch and its error is returned;
    /// `self` is unchanged either way.
    pub fn applying_all<'a, I>(&self, updates: I) -> Result<Self, RepError>
    where
        I: IntoIterator<Item = &'a RepUpdate>,
    {
        let mut current = self.clone();
        let mut applied = 0usize;
        for update in updates {
            current = update.apply(&current)?;
            applied = applied.saturating_add(1);
        }
        tracing::debug!(graph = %self.id, applied, "applied update batch");
        Ok(current)
    }

    /// Copy-on-write edit of a single existing cell.
    fn editing<F>(&self, id: Identifier, edit: F) -> Result<Self, RepError>
    where
        F: FnOnce(&mut Cell) -> Result<(), RepError>,
    {
        let current = self.cells.get(&id).ok_or(RepError::CellNotFound(id))?;
        let mut cell = Cell::clone(current);
        edit(&mut cell)?;

        let mut next = self.clone();
        next.cells.insert(id, Arc::new(cell));
        Ok(next)
    }
}

// =============================================================================
// TESTS
// =============================================================================
