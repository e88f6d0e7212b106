//! # Validator
//!
//! Structural validation: every port must target a live cell of the same
//! graph. Run this before persisting, replicating or rendering a graph and
//! treat any report as "reject or repair before proceeding".

use crate::{Identifier, RepStruct};
use thiserror::Error;

/// A structural defect found by `RepValidator`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A port targets a cell that is not in the graph.
    #[error("Dangling port '{port}' on cell {cell} -> missing {target}")]
    DanglingPort {
        cell: Identifier,
        port: String,
        target: Identifier,
    },
}

/// Graph-level structural validator.
pub struct RepValidator;

impl RepValidator {
    /// First dangling port in (cell id, port name) order, or `None`.
    ///
    /// Single pass, O(total port count), stops at the first defect.
    #[must_use]
    pub fn validate(rep: &RepStruct) -> Option<ValidationError> {
        Self::dangling(rep).next()
    }

    /// Every dangling port, in the same order `validate` would find them.
    #[must_use]
    pub fn validate_all(rep: &RepStruct) -> Vec<ValidationError> {
        Self::dangling(rep).collect()
    }

    /// `Ok` when the graph has no dangling port, otherwise the first one.
    pub fn ensure_valid(rep: &RepStruct) -> Result<(), ValidationError> {
        match Self::validate(rep) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn dangling(rep: &RepStruct) -> impl Iterator<Item = ValidationError> + '_ {
        rep.edges()
            .filter(|(_, _, target)| !rep.contains(*target))
            .map(|(cell, port, target)| ValidationError::DanglingPort {
                cell,
                port: port.to_string(),
                target,
            })
    }
}
