//! # Integrity Checker
//!
//! Cycle detection over the cell/port graph, plus an opt-in pass that finds
//! cells unreachable from any root.
//!
//! Acyclicity is a conditional invariant: physics-style graphs may carry
//! cycles, dependency-ordered consumers must not. Callers decide which by
//! invoking the checker (or not) and by choosing `IntegrityOptions`.
//!
//! Ports whose target is absent are ignored here; `RepValidator` owns that
//! defect.

use crate::{Identifier, RepError, RepStruct};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// What `RepIntegrityChecker::check_with` enforces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntegrityOptions {
    /// Skip cycle detection.
    pub allow_cycles: bool,
    /// Fail when some cell is unreachable from every root.
    pub detect_unreachable: bool,
}

/// DFS visit state. Absent from the map means unvisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// On the current path.
    Exploring,
    /// All outgoing ports explored.
    Done,
}

/// Cycle and reachability checks.
pub struct RepIntegrityChecker;

impl RepIntegrityChecker {
    /// Fail with `CycleDetected` if any cycle exists.
    ///
    /// Every cell is tried as a DFS root in id order, so disconnected
    /// components are all covered. The reported path starts at the first
    /// node of the cycle found on the current DFS path and repeats it at the
    /// end.
    pub fn check(rep: &RepStruct) -> Result<(), RepError> {
        let mut marks: BTreeMap<Identifier, Mark> = BTreeMap::new();

        for root in rep.cell_ids() {
            if marks.contains_key(&root) {
                continue;
            }
            if let Some(cycle) = Self::explore(rep, root, &mut marks) {
                tracing::debug!(graph = %rep.id(), length = cycle.len(), "cycle detected");
                return Err(RepError::CycleDetected(cycle));
            }
        }
        Ok(())
    }

    /// Run the checks selected by `options`.
    pub fn check_with(rep: &RepStruct, options: IntegrityOptions) -> Result<(), RepError> {
        if !options.allow_cycles {
            Self::check(rep)?;
        }
        if options.detect_unreachable {
            let unreachable = Self::unreachable(rep);
            if !unreachable.is_empty() {
                return Err(RepError::UnreachableCells(unreachable));
            }
        }
        Ok(())
    }

    /// Cells not reachable from any root, in id order.
    ///
    /// Roots are the cells no live port points at. A graph without such a
    /// cell (only pure cycles) roots every still-unvisited cell in id order
    /// instead, so each ring counts as reached.
    #[must_use]
    pub fn unreachable(rep: &RepStruct) -> Vec<Identifier> {
        let has_incoming: BTreeSet<Identifier> = rep
            .edges()
            .map(|(_, _, target)| target)
            .filter(|target| rep.contains(*target))
            .collect();

        let roots: Vec<Identifier> = rep
            .cell_ids()
            .filter(|id| !has_incoming.contains(id))
            .collect();
        if !roots.is_empty() {
            let reached = Self::reachable_from(rep, roots);
            return rep.cell_ids().filter(|id| !reached.contains(id)).collect();
        }

        let mut reached = BTreeSet::new();
        for root in rep.cell_ids() {
            if !reached.contains(&root) {
                reached.extend(Self::reachable_from(rep, [root]));
            }
        }
        rep.cell_ids().filter(|id| !reached.contains(id)).collect()
    }

    /// Forward closure of `roots` along live ports.
    #[must_use]
    pub fn reachable_from(
        rep: &RepStruct,
        roots: impl IntoIterator<Item = Identifier>,
    ) -> BTreeSet<Identifier> {
        let mut reached = BTreeSet::new();
        let mut stack: Vec<Identifier> = roots.into_iter().filter(|r| rep.contains(*r)).collect();

        while let Some(current) = stack.pop() {
            if !reached.insert(current) {
                continue;
            }
            stack.extend(
                Self::live_targets(rep, current).filter(|next| !reached.contains(next)),
            );
        }
        reached
    }

    /// Iterative DFS from `root` with an explicit path stack.
    fn explore(
        rep: &RepStruct,
        root: Identifier,
        marks: &mut BTreeMap<Identifier, Mark>,
    ) -> Option<Vec<Identifier>> {
        let mut path = vec![root];
        let mut pending = vec![Self::live_targets(rep, root)];
        marks.insert(root, Mark::Exploring);

        while let Some(frontier) = pending.last_mut() {
            match frontier.next() {
                Some(next) => match marks.get(&next) {
                    Some(Mark::Exploring) => {
                        let start = path.iter().position(|n| *n == next).unwrap_or(0);
                        let mut cycle = path.split_off(start);
                        cycle.push(next);
                        return Some(cycle);
                    }
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(next, Mark::Exploring);
                        path.push(next);
                        pending.push(Self::live_targets(rep, next));
                    }
                },
                None => {
                    pending.pop();
                    if let Some(done) = path.pop() {
                        marks.insert(done, Mark::Done);
                    }
                }
            }
        }
        None
    }

    fn live_targets(rep: &RepStruct, id: Identifier) -> std::vec::IntoIter<Identifier> {
        rep.cell(id)
            .map(|cell| cell.targets().filter(|t| rep.contains(*t)).collect::<Vec<_>>())
            .unwrap_or_default()
            .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;

    fn id(n: u128) -> Identifier {
        Identifier::from_u128(n)
    }

    fn graph(edges: &[(u128, u128)], cells: &[u128]) -> RepStruct {
        let mut rep = RepStruct::new("g");
        for &c in cells {
            rep = rep.adding(Cell::new(id(c)));
        }
        for (i, &(from, to)) in edges.iter().enumerate() {
            rep = rep
                .connecting(id(from), format!("p{}", i), id(to))
                .expect("connect");
        }
        rep
    }

    #[test]
    fn acyclic_graph_passes() {
        let rep = graph(&[(1, 2), (2, 3), (1, 3)], &[1, 2, 3]);
        assert!(RepIntegrityChecker::check(&rep).is_ok());
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let rep = graph(&[(1, 1)], &[1]);
        assert_eq!(
            RepIntegrityChecker::check(&rep),
            Err(RepError::CycleDetected(vec![id(1), id(1)]))
        );
    }

    #[test]
    fn cycle_path_excludes_lead_in() {
        // 1 -> 2 -> 3 -> 2
        let rep = graph(&[(1, 2), (2, 3), (3, 2)], &[1, 2, 3]);
        assert_eq!(
            RepIntegrityChecker::check(&rep),
            Err(RepError::CycleDetected(vec![id(2), id(3), id(2)]))
        );
    }

    #[test]
    fn cycle_in_later_component_is_found() {
        let rep = graph(&[(1, 2), (5, 6), (6, 5)], &[1, 2, 5, 6]);
        assert!(matches!(
            RepIntegrityChecker::check(&rep),
            Err(RepError::CycleDetected(_))
        ));
    }

    #[test]
    fn shared_descendant_is_not_a_cycle() {
        // diamond: visiting 4 twice via 2 and 3 must not be mistaken for a cycle
        let rep = graph(&[(1, 2), (1, 3), (2, 4), (3, 4)], &[1, 2, 3, 4]);
        assert!(RepIntegrityChecker::check(&rep).is_ok());
    }

    #[test]
    fn dangling_ports_are_ignored() {
        let rep = graph(&[(1, 9)], &[1]);
        assert!(RepIntegrityChecker::check(&rep).is_ok());
        assert!(RepIntegrityChecker::unreachable(&rep).is_empty());
    }

    #[test]
    fn unreachable_finds_orphan_cycle() {
        // 1 -> 2 is rooted; 5 <-> 6 has no root
        let rep = graph(&[(1, 2), (5, 6), (6, 5)], &[1, 2, 5, 6]);
        assert_eq!(RepIntegrityChecker::unreachable(&rep), vec![id(5), id(6)]);
    }

    #[test]
    fn disjoint_rings_are_all_reachable() {
        let rep = graph(&[(1, 2), (2, 1), (3, 4), (4, 3)], &[1, 2, 3, 4]);
        assert!(RepIntegrityChecker::unreachable(&rep).is_empty());

        let ring = graph(&[(1, 2), (2, 1)], &[1, 2]);
        assert!(RepIntegrityChecker::unreachable(&ring).is_empty());
    }

    #[test]
    fn sourceless_ring_beside_rooted_part_is_unreachable() {
        let rep = graph(&[(1, 2), (3, 4), (4, 3)], &[1, 2, 3, 4]);
        assert_eq!(RepIntegrityChecker::unreachable(&rep), vec![id(3), id(4)]);
    }

    #[test]
    fn check_with_respects_options() {
        let rep = graph(&[(1, 2), (5, 6), (6, 5)], &[1, 2, 5, 6]);

        let cycles_allowed = IntegrityOptions {
            allow_cycles: true,
            detect_unreachable: false,
        };
        assert!(RepIntegrityChecker::check_with(&rep, cycles_allowed).is_ok());

        let strict_reach = IntegrityOptions {
            allow_cycles: true,
            detect_unreachable: true,
        };
        assert_eq!(
            RepIntegrityChecker::check_with(&rep, strict_reach),
            Err(RepError::UnreachableCells(vec![id(5), id(6)]))
        );

        assert!(RepIntegrityChecker::check_with(&rep, IntegrityOptions::default()).is_err());
    }
}
