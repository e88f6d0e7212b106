//! # Archetypes
//!
//! Groups cells whose metadata carries the same set of keys. Useful for
//! spotting families of similar cells in a large graph.

use crate::{Identifier, RepStruct};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Cells sharing one data-key signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Archetype {
    pub signature: BTreeSet<String>,
    pub members: Vec<Identifier>,
}

impl Archetype {
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Group every cell of `rep` by its data keys.
///
/// Archetypes are ordered by signature, members by id. Cells without
/// metadata form the archetype with the empty signature.
#[must_use]
pub fn archetypes(rep: &RepStruct) -> Vec<Archetype> {
    let mut groups: BTreeMap<BTreeSet<String>, Vec<Identifier>> = BTreeMap::new();
    for cell in rep.cells() {
        let signature = cell.data.keys().cloned().collect();
        groups.entry(signature).or_default().push(cell.id);
    }
    groups
        .into_iter()
        .map(|(signature, members)| Archetype { signature, members })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;

    #[test]
    fn groups_by_key_set() {
        let id = Identifier::from_u128;
        let rep = RepStruct::new("a")
            .adding(Cell::new(id(1)).with_data("hp", 3).with_data("label", "x"))
            .adding(Cell::new(id(2)))
            .adding(Cell::new(id(3)).with_data("label", "y").with_data("hp", 9))
            .adding(Cell::new(id(4)).with_data("hp", 1));

        let found = archetypes(&rep);
        let signatures: Vec<Vec<&str>> = found
            .iter()
            .map(|a| a.signature.iter().map(String::as_str).collect())
            .collect();

        assert_eq!(signatures, vec![vec![], vec!["hp"], vec!["hp", "label"]]);
        assert_eq!(found[2].members, vec![id(1), id(3)]);
        assert_eq!(found[0].len(), 1);
    }

    #[test]
    fn empty_graph_has_no_archetypes() {
        assert!(archetypes(&RepStruct::new("e")).is_empty());
    }
}
