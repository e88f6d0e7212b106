//! # Rep CLI Module
//!
//! This module implements the CLI interface for Rep.
//!
//! ## Available Commands
//!
//! - `new` - Write an empty graph
//! - `validate` - Report dangling ports
//! - `check` - Cycle and reachability check
//! - `order` - Dependency order of cells
//! - `apply` - Replay an update stream onto a graph
//! - `diff` - Update stream between two graphs
//! - `walk` - BFS/DFS visit order
//! - `decompose` - Split a graph into subgraph files
//! - `stats` - Counts, archetypes and checksums
//! - `convert` - JSON to binary snapshot and back
//!
//! Graph files ending in `.rep` are binary snapshots; anything else is JSON.

mod commands;

use crate::config::{OutputConfig, RepConfig};
use clap::{Parser, Subcommand, ValueEnum};
use rep_core::{IntegrityOptions, RepError};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Rep - graph document tool
///
/// Validates, checks, orders, diffs and replays cell/port graphs.
#[derive(Parser, Debug)]
#[command(name = "rep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Path to the configuration file (optional)
    #[arg(short, long, global = true, default_value = "rep.toml")]
    pub config: PathBuf,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write an empty graph
    New {
        /// Graph name
        #[arg(short, long)]
        name: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Report dangling ports
    Validate {
        /// Graph file
        file: PathBuf,

        /// Report every dangling port instead of the first
        #[arg(long)]
        all: bool,
    },

    /// Check for cycles and, optionally, unreachable cells
    Check {
        /// Graph file
        file: PathBuf,

        /// Do not fail on cycles
        #[arg(long)]
        allow_cycles: bool,

        /// Fail when some cell is unreachable from the roots
        #[arg(long)]
        unreachable: bool,
    },

    /// Print the dependency order of cells
    Order {
        /// Graph file
        file: PathBuf,
    },

    /// Replay a JSON array of updates onto a graph
    Apply {
        /// Graph file
        file: PathBuf,

        /// Update stream (JSON array)
        #[arg(short, long)]
        updates: PathBuf,

        /// Output file (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write even if the result has dangling ports
        #[arg(long)]
        no_validate: bool,
    },

    /// Print the update stream turning one graph into another
    Diff {
        /// Starting graph
        before: PathBuf,

        /// Target graph
        after: PathBuf,
    },

    /// Print traversal order from a cell
    Walk {
        /// Graph file
        file: PathBuf,

        /// Start cell id
        #[arg(short, long)]
        start: String,

        /// Traversal strategy
        #[arg(short, long, value_enum, default_value_t = WalkMode::Bfs)]
        mode: WalkMode,
    },

    /// Write each independent subgraph to its own file
    Decompose {
        /// Graph file
        file: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Group by weakly connected components instead of reachability
        #[arg(long)]
        undirected: bool,
    },

    /// Show counts, archetypes and checksums
    Stats {
        /// Graph file
        file: PathBuf,
    },

    /// Re-encode a graph; the output extension picks the format
    Convert {
        /// Input graph file
        file: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Traversal strategy for `walk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WalkMode {
    Bfs,
    Dfs,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli, config: &RepConfig) -> Result<(), RepError> {
    let json_mode = cli.json_mode;
    let output = config.output;

    match cli.command {
        Commands::New { name, output: path } => cmd_new(&name, &path, output),
        Commands::Validate { file, all } => cmd_validate(&file, all, json_mode),
        Commands::Check {
            file,
            allow_cycles,
            unreachable,
        } => {
            let options = IntegrityOptions {
                allow_cycles: allow_cycles || config.integrity.allow_cycles,
                detect_unreachable: unreachable || config.integrity.detect_unreachable,
            };
            cmd_check(&file, options, json_mode)
        }
        Commands::Order { file } => cmd_order(&file, json_mode),
        Commands::Apply {
            file,
            updates,
            output: target,
            no_validate,
        } => {
            let settings = OutputConfig {
                validate_on_write: output.validate_on_write && !no_validate,
                ..output
            };
            cmd_apply(&file, &updates, target.as_deref(), settings, json_mode)
        }
        Commands::Diff { before, after } => cmd_diff(&before, &after, output.pretty),
        Commands::Walk { file, start, mode } => cmd_walk(&file, &start, mode, json_mode),
        Commands::Decompose {
            file,
            output: dir,
            undirected,
        } => cmd_decompose(&file, &dir, undirected, output, json_mode),
        Commands::Stats { file } => cmd_stats(&file, json_mode),
        Commands::Convert { file, output: path } => cmd_convert(&file, &path, output),
    }
}
