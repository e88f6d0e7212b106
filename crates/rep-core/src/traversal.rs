//! # Traversal
//!
//! Deterministic walks over the cell/port structure and partitioning of a
//! graph into independent subgraphs.
//!
//! Walks are lazy iterators: a consumer that stops early simply drops the
//! iterator. Each call starts a fresh walk; a walk cannot be resumed across
//! calls. Neighbours are visited in port-name order and ports whose target
//! is absent are skipped.

use crate::{Cell, Identifier, RepError, RepStruct};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

// =============================================================================
// ITERATORS
// =============================================================================

/// Breadth-first walk. The start cell is yielded first.
#[derive(Debug, Clone)]
pub struct BreadthFirst<'a> {
    rep: &'a RepStruct,
    queue: VecDeque<Identifier>,
    seen: BTreeSet<Identifier>,
}

impl<'a> Iterator for BreadthFirst<'a> {
    type Item = &'a Cell;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.queue.pop_front()?;
        let cell = self.rep.cell(current)?;
        for target in cell.targets() {
            if self.rep.contains(target) && self.seen.insert(target) {
                self.queue.push_back(target);
            }
        }
        Some(cell)
    }
}

/// Pre-order depth-first walk, in the order a recursive visit would produce.
#[derive(Debug, Clone)]
pub struct DepthFirst<'a> {
    rep: &'a RepStruct,
    stack: Vec<Identifier>,
    seen: BTreeSet<Identifier>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = &'a Cell;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let current = self.stack.pop()?;
            if !self.seen.insert(current) {
                continue;
            }
            let cell = self.rep.cell(current)?;
            let pending: Vec<Identifier> = cell
                .targets()
                .filter(|t| self.rep.contains(*t) && !self.seen.contains(t))
                .collect();
            // reversed so the first port is explored first
            self.stack.extend(pending.into_iter().rev());
            return Some(cell);
        }
    }
}

// =============================================================================
// GRAPH QUERIES
// =============================================================================

impl RepStruct {
    /// Breadth-first walk from `from`.
    pub fn breadth_first(&self, from: Identifier) -> Result<BreadthFirst<'_>, RepError> {
        if !self.contains(from) {
            return Err(RepError::CellNotFound(from));
        }
        Ok(BreadthFirst {
            rep: self,
            queue: VecDeque::from([from]),
            seen: BTreeSet::from([from]),
        })
    }

    /// Depth-first (pre-order) walk from `from`.
    pub fn depth_first(&self, from: Identifier) -> Result<DepthFirst<'_>, RepError> {
        if !self.contains(from) {
            return Err(RepError::CellNotFound(from));
        }
        Ok(DepthFirst {
            rep: self,
            stack: vec![from],
            seen: BTreeSet::new(),
        })
    }

    /// Every port pointing at `id`, as `(source cell, port name)`.
    #[must_use]
    pub fn incoming(&self, id: Identifier) -> Vec<(Identifier, String)> {
        self.edges()
            .filter(|(_, _, target)| *target == id)
            .map(|(source, port, _)| (source, port.to_string()))
            .collect()
    }

    /// Partition by outgoing reachability.
    ///
    /// Cells are taken in id order; each cell not yet assigned seeds a BFS
    /// that follows outgoing ports to cells not yet assigned. Every cell ends
    /// up in exactly one subgraph and ports internal to a subgraph are kept;
    /// ports between subgraphs are dropped. Edge direction matters: a cell
    /// whose only link is an incoming port from a later seed forms its own
    /// subgraph. Use `connected_components` for direction-blind grouping.
    #[must_use]
    pub fn decompose_subgraphs(&self) -> Vec<RepStruct> {
        let groups = self.partition(|rep, id| {
            rep.cell(id)
                .map(|cell| cell.targets().collect())
                .unwrap_or_default()
        });
        self.build_subgraphs(groups)
    }

    /// Weakly connected components: ports count in both directions.
    #[must_use]
    pub fn connected_components(&self) -> Vec<RepStruct> {
        let mut adjacency: BTreeMap<Identifier, BTreeSet<Identifier>> = BTreeMap::new();
        for (source, _, target) in self.edges() {
            if self.contains(target) {
                adjacency.entry(source).or_default().insert(target);
                adjacency.entry(target).or_default().insert(source);
            }
        }
        let groups = self.partition(|_, id| {
            adjacency
                .get(&id)
                .map(|n| n.iter().copied().collect())
                .unwrap_or_default()
        });
        self.build_subgraphs(groups)
    }

    /// Seed a BFS from every unassigned cell in id order.
    fn partition<F>(&self, neighbours: F) -> Vec<Vec<Identifier>>
    where
        F: Fn(&RepStruct, Identifier) -> Vec<Identifier>,
    {
        let mut assigned = BTreeSet::new();
        let mut groups = Vec::new();

        for seed in self.cell_ids() {
            if !assigned.insert(seed) {
                continue;
            }
            let mut group = Vec::new();
            let mut queue = VecDeque::from([seed]);
            while let Some(current) = queue.pop_front() {
                group.push(current);
                for next in neighbours(self, current) {
                    if self.contains(next) && assigned.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
            groups.push(group);
        }
        groups
    }

    fn build_subgraphs(&self, groups: Vec<Vec<Identifier>>) -> Vec<RepStruct> {
        let subgraphs: Vec<RepStruct> = groups
            .into_iter()
            .enumerate()
            .map(|(index, group)| {
                let members: BTreeSet<Identifier> = group.iter().copied().collect();
                let mut cells = BTreeMap::new();
                for id in group {
                    let Some(shared) = self.cell_arc(id) else {
                        continue;
                    };
                    let cell = if shared.targets().all(|t| members.contains(&t)) {
                        Arc::clone(shared)
                    } else {
                        let mut trimmed = Cell::clone(shared);
                        trimmed.ports.retain(|_, target| members.contains(target));
                        Arc::new(trimmed)
                    };
                    cells.insert(id, cell);
                }
                RepStruct::from_parts(
                    Identifier::generate(),
                    format!("{}-sub{}", self.name(), index),
                    cells,
                )
            })
            .collect();

        tracing::debug!(
            graph = %self.id(),
            subgraphs = subgraphs.len(),
            "decomposed graph"
        );
        subgraphs
    }
}

// =============================================================================
// TESTS
// =============================================================================
