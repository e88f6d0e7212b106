//! # rep-core
//!
//! The Rep graph engine: a versioned, copy-on-write graph of cells joined by
//! named directed ports.
//!
//! ## Shape
//!
//! - `RepStruct` is the document. Every edit returns a new value and leaves
//!   the receiver untouched; unchanged cells are shared between versions.
//! - `RepUpdate` is the mutation protocol. A stream of updates replays
//!   deterministically and can be derived from two versions with `diff`.
//! - `RepValidator` reports dangling ports, `RepIntegrityChecker` reports
//!   cycles and unreachable cells, `ConstraintSolver` orders cells by their
//!   dependencies.
//! - `RepSerializer` produces canonical JSON (sorted keys) and binary
//!   snapshots.
//!
//! ## Constraints
//!
//! - Deterministic: every map is ordered, every walk and tie-break is fixed.
//! - Synchronous and pure: no I/O, no async, no global state.
//! - Logs through `tracing` at debug/trace level only; installing a
//!   subscriber is the caller's job.

// =============================================================================
// MODULES
// =============================================================================

pub mod archetype;
pub mod cell;
pub mod formats;
pub mod history;
pub mod integrity;
pub mod primitives;
pub mod rep;
pub mod serializer;
pub mod solver;
pub mod traversal;
pub mod types;
pub mod update;
pub mod validator;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{Identifier, RepError, Value, Vec2};

// =============================================================================
// RE-EXPORTS: Graph Model
// =============================================================================

pub use cell::Cell;
pub use history::EditHistory;
pub use rep::RepStruct;
pub use traversal::{BreadthFirst, DepthFirst};
pub use update::{RepUpdate, diff};

// =============================================================================
// RE-EXPORTS: Analysis
// =============================================================================

pub use archetype::{Archetype, archetypes};
pub use integrity::{IntegrityOptions, RepIntegrityChecker};
pub use solver::{ConstraintSolver, CycleError};
pub use validator::{RepValidator, ValidationError};

// =============================================================================
// RE-EXPORTS: Formats
// =============================================================================

pub use formats::{snapshot_from_bytes, snapshot_to_bytes};
pub use serializer::RepSerializer;
