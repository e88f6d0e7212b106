//! # Constraint Solver
//!
//! Topological ordering with Kahn's algorithm over any hashable vertex type.
//!
//! ## Determinism
//!
//! The in-degree table is an `IndexMap` filled in first-appearance order
//! (explicit vertices first, then each edge's `from` before its `to`). The
//! initial queue is seeded in that order and successors are released in edge
//! order, so ties always break the same way for the same input.

use crate::{Identifier, RepError, RepStruct};
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::fmt;
use std::hash::Hash;

/// The edge set has at least one cycle.
///
/// `remaining` holds every vertex Kahn's algorithm could not release, in
/// first-appearance order: the cycles plus everything downstream of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError<V> {
    pub remaining: Vec<V>,
}

impl<V> fmt::Display for CycleError<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cycle detected: {} vertices could not be ordered",
            self.remaining.len()
        )
    }
}

impl<V: fmt::Debug> std::error::Error for CycleError<V> {}

/// Dependency ordering.
pub struct ConstraintSolver;

impl ConstraintSolver {
    /// Order the vertices mentioned in `edges` so every `(u, v)` has `u` before `v`.
    pub fn topological_sort<V>(edges: &[(V, V)]) -> Result<Vec<V>, CycleError<V>>
    where
        V: Clone + Eq + Hash,
    {
        Self::topological_order(std::iter::empty(), edges)
    }

    /// Like `topological_sort`, with extra vertices (possibly isolated) that
    /// are seeded ahead of the ones first seen in `edges`.
    pub fn topological_order<V, I>(vertices: I, edges: &[(V, V)]) -> Result<Vec<V>, CycleError<V>>
    where
        V: Clone + Eq + Hash,
        I: IntoIterator<Item = V>,
    {
        let mut in_degree: IndexMap<V, usize> = IndexMap::new();
        for vertex in vertices {
            in_degree.entry(vertex).or_insert(0);
        }
        for (from, to) in edges {
            in_degree.entry(from.clone()).or_insert(0);
            let degree = in_degree.entry(to.clone()).or_insert(0);
            *degree = degree.saturating_add(1);
        }

        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); in_degree.len()];
        for (from, to) in edges {
            if let (Some(f), Some(t)) = (in_degree.get_index_of(from), in_degree.get_index_of(to))
            {
                successors[f].push(t);
            }
        }

        let mut degrees: Vec<usize> = in_degree.values().copied().collect();
        let mut queue: VecDeque<usize> = degrees
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0)
            .map(|(i, _)| i)
            .collect();

        let mut order: Vec<usize> = Vec::with_capacity(degrees.len());
        while let Some(current) = queue.pop_front() {
            order.push(current);
            for &next in &successors[current] {
                degrees[next] = degrees[next].saturating_sub(1);
                if degrees[next] == 0 {
                    queue.push_back(next);
                }
            }
        }

        let vertices: Vec<V> = in_degree.into_keys().collect();
        if order.len() < vertices.len() {
            let mut released = vec![false; vertices.len()];
            for &i in &order {
                released[i] = true;
            }
            let remaining = vertices
                .into_iter()
                .zip(released)
                .filter(|(_, done)| !done)
                .map(|(v, _)| v)
                .collect();
            return Err(CycleError { remaining });
        }

        Ok(order.into_iter().map(|i| vertices[i].clone()).collect())
    }

    /// Dependency order of every cell: a cell comes before the cells its
    /// ports point at. Isolated cells are included; dangling ports ignored.
    pub fn order_cells(rep: &RepStruct) -> Result<Vec<Identifier>, RepError> {
        let edges: Vec<(Identifier, Identifier)> = rep
            .edges()
            .filter(|(_, _, target)| rep.contains(*target))
            .map(|(source, _, target)| (source, target))
            .collect();

        Self::topological_order(rep.cell_ids(), &edges)
            .map_err(|err| RepError::CycleDetected(err.remaining))
    }
}
