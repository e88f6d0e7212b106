//! # Cell
//!
//! A single node of the Rep graph: an immutable identity, named output
//! ports, a metadata map and optional spatial state.
//!
//! A lone cell never validates its port targets. Dangling ports are a
//! graph-level concern handled by `RepValidator`.

use crate::primitives::LABEL_KEY;
use crate::{Identifier, Value, Vec2};
use std::collections::BTreeMap;

/// A graph node.
///
/// Equality is structural over every field. The wire form lives in
/// `serializer`, which fixes the key order.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Identity; never reassigned after construction.
    pub id: Identifier,
    /// Port name -> target cell. Names are unique per cell.
    pub ports: BTreeMap<String, Identifier>,
    /// Metadata payload.
    pub data: BTreeMap<String, Value>,
    pub position: Vec2,
    pub velocity: Vec2,
}

impl Cell {
    /// Create an empty cell: no ports, no data, zero motion.
    #[must_use]
    pub fn new(id: Identifier) -> Self {
        Self {
            id,
            ports: BTreeMap::new(),
            data: BTreeMap::new(),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
        }
    }

    #[must_use]
    pub fn with_port(mut self, name: impl Into<String>, target: Identifier) -> Self {
        self.ports.insert(name.into(), target);
        self
    }

    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_label(self, label: impl Into<String>) -> Self {
        self.with_data(LABEL_KEY, Value::String(label.into()))
    }

    #[must_use]
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// The display label, if one has been set.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.data.get(LABEL_KEY).and_then(Value::as_str)
    }

    /// Target of the named port.
    #[must_use]
    pub fn port(&self, name: &str) -> Option<Identifier> {
        self.ports.get(name).copied()
    }

    /// Port targets in port-name order. A target appears once per port.
    pub fn targets(&self) -> impl Iterator<Item = Identifier> + '_ {
        self.ports.values().copied()
    }

    /// Whether any port of this cell points at `target`.
    #[must_use]
    pub fn targets_cell(&self, target: Identifier) -> bool {
        self.ports.values().any(|t| *t == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cell_is_empty() {
        let cell = Cell::new(Identifier::from_u128(1));
        assert!(cell.ports.is_empty());
        assert!(cell.data.is_empty());
        assert!(cell.position.is_zero());
        assert!(cell.velocity.is_zero());
        assert_eq!(cell.label(), None);
    }

    #[test]
    fn targets_follow_port_name_order() {
        let a = Identifier::from_u128(1);
        let b = Identifier::from_u128(2);
        let cell = Cell::new(Identifier::from_u128(9))
            .with_port("z", a)
            .with_port("a", b);

        let targets: Vec<_> = cell.targets().collect();
        assert_eq!(targets, vec![b, a]);
        assert!(cell.targets_cell(a));
        assert_eq!(cell.port("z"), Some(a));
    }

    #[test]
    fn several_ports_may_share_a_target() {
        let target = Identifier::from_u128(5);
        let cell = Cell::new(Identifier::from_u128(1))
            .with_port("left", target)
            .with_port("right", target);
        assert_eq!(cell.targets().count(), 2);
    }

    #[test]
    fn label_lives_in_data() {
        let cell = Cell::new(Identifier::from_u128(1)).with_label("root");
        assert_eq!(cell.label(), Some("root"));
        assert_eq!(cell.data.get(LABEL_KEY), Some(&Value::from("root")));
    }

    #[test]
    fn equality_is_structural() {
        let id = Identifier::from_u128(1);
        let a = Cell::new(id).with_data("count", 3);
        let b = Cell::new(id).with_data("count", 3);
        let c = Cell::new(id).with_data("count", 3.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
