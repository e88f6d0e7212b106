//! # rep
//!
//! Command-line front end for `rep-core`: graph files in, reports and graph
//! files out. This crate is the only layer that touches the filesystem.

pub mod cli;
pub mod config;
pub mod logging;
