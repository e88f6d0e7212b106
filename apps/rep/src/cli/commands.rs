//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::WalkMode;
use crate::config::OutputConfig;
use rep_core::{
    ConstraintSolver, Identifier, IntegrityOptions, RepError, RepIntegrityChecker, RepSerializer,
    RepStruct, RepUpdate, RepValidator, archetypes, diff,
    primitives::{MAX_JSON_INPUT_SIZE, MAX_SNAPSHOT_SIZE},
};
use std::path::{Path, PathBuf};

/// Extension marking a binary snapshot.
pub const SNAPSHOT_EXTENSION: &str = "rep";

// =============================================================================
// PATH VALIDATION
// =============================================================================

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: usize) -> Result<(), RepError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| RepError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size as u64 {
        return Err(RepError::Decoding(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path: symlinks and ".." are resolved, and the target
/// must be an existing regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, RepError> {
    let canonical = path
        .canonicalize()
        .map_err(|e| RepError::Io(format!("Invalid file path '{}': {}", path.display(), e)))?;

    if !canonical.is_file() {
        return Err(RepError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path: the parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, RepError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let canonical_parent = parent.canonicalize().map_err(|e| {
        RepError::Io(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(RepError::Io(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| RepError::Io("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// GRAPH FILES
// =============================================================================

/// Whether `path` names a binary snapshot (`.rep`).
pub fn is_snapshot_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SNAPSHOT_EXTENSION))
}

/// Read a graph file, picking the format from the extension.
pub fn load_rep(path: &Path) -> Result<RepStruct, RepError> {
    let validated = validate_file_path(path)?;

    if is_snapshot_path(&validated) {
        validate_file_size(&validated, MAX_SNAPSHOT_SIZE)?;
        let bytes = std::fs::read(&validated)
            .map_err(|e| RepError::Io(format!("Read file: {}", e)))?;
        RepSerializer::from_bytes(&bytes)
    } else {
        validate_file_size(&validated, MAX_JSON_INPUT_SIZE)?;
        let text = std::fs::read_to_string(&validated)
            .map_err(|e| RepError::Io(format!("Read file: {}", e)))?;
        RepSerializer::from_json(&text)
    }
}

/// Write a graph file, picking the format from the extension.
///
/// With `validate_on_write` a graph with dangling ports is refused and
/// nothing is written. Returns the number of bytes written.
pub fn save_rep(rep: &RepStruct, path: &Path, output: OutputConfig) -> Result<usize, RepError> {
    if output.validate_on_write {
        RepValidator::ensure_valid(rep)?;
    }
    let validated = validate_output_path(path)?;

    let data = if is_snapshot_path(&validated) {
        RepSerializer::to_bytes(rep)?
    } else if output.pretty {
        RepSerializer::to_json_pretty(rep)?.into_bytes()
    } else {
        RepSerializer::to_json(rep)?.into_bytes()
    };

    std::fs::write(&validated, &data).map_err(|e| RepError::Io(format!("Write file: {}", e)))?;
    tracing::debug!(path = %validated.display(), bytes = data.len(), "wrote graph");
    Ok(data.len())
}

/// Read a JSON array of updates.
pub fn load_updates(path: &Path) -> Result<Vec<RepUpdate>, RepError> {
    let validated = validate_file_path(path)?;
    validate_file_size(&validated, MAX_JSON_INPUT_SIZE)?;

    let text = std::fs::read_to_string(&validated)
        .map_err(|e| RepError::Io(format!("Read file: {}", e)))?;
    serde_json::from_str(&text).map_err(|e| RepError::Decoding(format!("Invalid updates: {}", e)))
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn describe(rep: &RepStruct, id: Identifier) -> String {
    match rep.cell(id).and_then(|cell| cell.label()) {
        Some(label) => format!("{} ({})", id, label),
        None => id.to_string(),
    }
}

// =============================================================================
// NEW COMMAND
// =============================================================================

/// Write an empty graph.
pub fn cmd_new(name: &str, output: &Path, settings: OutputConfig) -> Result<(), RepError> {
    let rep = RepStruct::new(name);
    save_rep(&rep, output, settings)?;

    tracing::info!(graph = %rep.id(), "created graph");
    println!("Created graph '{}' ({}) at {:?}", rep.name(), rep.id(), output);
    Ok(())
}

// =============================================================================
// VALIDATE COMMAND
// =============================================================================

/// Report dangling ports. Fails with the first one found.
pub fn cmd_validate(file: &Path, all: bool, json_mode: bool) -> Result<(), RepError> {
    let rep = load_rep(file)?;

    let errors = if all {
        RepValidator::validate_all(&rep)
    } else {
        RepValidator::validate(&rep).into_iter().collect()
    };

    if json_mode {
        let output = serde_json::json!({
            "valid": errors.is_empty(),
            "errors": errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
        });
        print_json(&output);
    } else if errors.is_empty() {
        println!("Valid: {} cells, {} ports", rep.len(), rep.port_count());
    } else {
        for error in &errors {
            println!("{}", error);
        }
    }

    match errors.into_iter().next() {
        Some(first) => Err(first.into()),
        None => Ok(()),
    }
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Integrity check.
pub fn cmd_check(file: &Path, options: IntegrityOptions, json_mode: bool) -> Result<(), RepError> {
    let rep = load_rep(file)?;
    RepIntegrityChecker::check_with(&rep, options)?;

    if json_mode {
        let output = serde_json::json!({
            "ok": true,
            "cells": rep.len(),
            "allow_cycles": options.allow_cycles,
            "detect_unreachable": options.detect_unreachable,
        });
        print_json(&output);
    } else {
        println!("Integrity OK: {} cells", rep.len());
    }
    Ok(())
}

// =============================================================================
// ORDER COMMAND
// =============================================================================

/// Print the dependency order of cells.
pub fn cmd_order(file: &Path, json_mode: bool) -> Result<(), RepError> {
    let rep = load_rep(file)?;
    let order = ConstraintSolver::order_cells(&rep)?;

    if json_mode {
        print_json(&serde_json::json!({ "order": order }));
    } else {
        for (position, id) in order.iter().enumerate() {
            println!("{:>4}  {}", position, describe(&rep, *id));
        }
    }
    Ok(())
}

// =============================================================================
// APPLY COMMAND
// =============================================================================

/// Replay an update stream and write the result.
///
/// The batch is all or nothing: on the first failing update nothing is
/// written.
pub fn cmd_apply(
    file: &Path,
    updates: &Path,
    output: Option<&Path>,
    settings: OutputConfig,
    json_mode: bool,
) -> Result<(), RepError> {
    let rep = load_rep(file)?;
    let stream = load_updates(updates)?;

    let next = rep.applying_all(&stream)?;
    let target = output.unwrap_or(file);
    let written = save_rep(&next, target, settings)?;

    tracing::info!(updates = stream.len(), cells = next.len(), "applied updates");
    if json_mode {
        let output = serde_json::json!({
            "applied": stream.len(),
            "cells": next.len(),
            "bytes": written,
            "output": target.to_string_lossy(),
        });
        print_json(&output);
    } else {
        println!(
            "Applied {} updates: {} cells, {} bytes written to {:?}",
            stream.len(),
            next.len(),
            written,
            target
        );
    }
    Ok(())
}

// =============================================================================
// DIFF COMMAND
// =============================================================================

/// Print the update stream from `before` to `after` as JSON.
pub fn cmd_diff(before: &Path, after: &Path, pretty: bool) -> Result<(), RepError> {
    let from = load_rep(before)?;
    let to = load_rep(after)?;
    let updates = diff(&from, &to);

    let text = if pretty {
        serde_json::to_string_pretty(&updates)
    } else {
        serde_json::to_string(&updates)
    }
    .map_err(|e| RepError::Encoding(e.to_string()))?;

    println!("{}", text);
    Ok(())
}

// =============================================================================
// WALK COMMAND
// =============================================================================

/// Visit order from `start`.
pub fn walk_order(
    rep: &RepStruct,
    start: Identifier,
    mode: WalkMode,
) -> Result<Vec<Identifier>, RepError> {
    let order: Vec<Identifier> = match mode {
        WalkMode::Bfs => rep.breadth_first(start)?.map(|cell| cell.id).collect(),
        WalkMode::Dfs => rep.depth_first(start)?.map(|cell| cell.id).collect(),
    };
    Ok(order)
}

/// Print traversal order.
pub fn cmd_walk(file: &Path, start: &str, mode: WalkMode, json_mode: bool) -> Result<(), RepError> {
    let rep = load_rep(file)?;
    let start: Identifier = start.parse()?;
    let order = walk_order(&rep, start, mode)?;

    if json_mode {
        print_json(&serde_json::json!({ "visited": order }));
    } else {
        for id in &order {
            println!("{}", describe(&rep, *id));
        }
    }
    Ok(())
}

// =============================================================================
// DECOMPOSE COMMAND
// =============================================================================

/// File name for a subgraph: its name with path-hostile characters replaced.
pub fn subgraph_file_name(part: &RepStruct, snapshot: bool) -> String {
    let stem: String = part
        .name()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let extension = if snapshot { SNAPSHOT_EXTENSION } else { "json" };
    format!("{}.{}", stem, extension)
}

/// Write each subgraph of `file` into `dir`, keeping the input's format.
pub fn cmd_decompose(
    file: &Path,
    dir: &Path,
    undirected: bool,
    settings: OutputConfig,
    json_mode: bool,
) -> Result<(), RepError> {
    let rep = load_rep(file)?;
    let parts = if undirected {
        rep.connected_components()
    } else {
        rep.decompose_subgraphs()
    };

    std::fs::create_dir_all(dir)
        .map_err(|e| RepError::Io(format!("Create directory {:?}: {}", dir, e)))?;

    let snapshot = is_snapshot_path(file);
    let mut written = Vec::with_capacity(parts.len());
    for part in &parts {
        let path = dir.join(subgraph_file_name(part, snapshot));
        save_rep(part, &path, settings)?;
        written.push((path, part.len()));
    }

    tracing::info!(subgraphs = parts.len(), "decomposed graph");
    if json_mode {
        let files: Vec<serde_json::Value> = written
            .iter()
            .map(|(path, cells)| serde_json::json!({ "file": path.to_string_lossy(), "cells": cells }))
            .collect();
        print_json(&serde_json::json!({ "subgraphs": files }));
    } else {
        for (path, cells) in &written {
            println!("{:?}: {} cells", path, cells);
        }
    }
    Ok(())
}

// =============================================================================
// STATS COMMAND
// =============================================================================

/// Show counts, archetypes and checksums.
pub fn cmd_stats(file: &Path, json_mode: bool) -> Result<(), RepError> {
    let rep = load_rep(file)?;
    let dangling = RepValidator::validate_all(&rep).len();
    let groups = archetypes(&rep);
    let checksum = RepSerializer::checksum(&rep)?;
    let hash = RepSerializer::content_hash(&rep)?;

    if json_mode {
        let output = serde_json::json!({
            "id": rep.id(),
            "name": rep.name(),
            "cells": rep.len(),
            "ports": rep.port_count(),
            "dangling_ports": dangling,
            "archetypes": groups,
            "checksum": format!("{:016x}", checksum),
            "blake3": hash,
        });
        print_json(&output);
        return Ok(());
    }

    println!("Rep Graph Stats");
    println!("===============");
    println!("Name:     {}", rep.name());
    println!("Id:       {}", rep.id());
    println!();
    println!("Cells:    {}", rep.len());
    println!("Ports:    {}", rep.port_count());
    println!("Dangling: {}", dangling);
    println!();
    println!("Archetypes:");
    for group in &groups {
        let keys: Vec<&str> = group.signature.iter().map(String::as_str).collect();
        println!("  [{}]: {} cells", keys.join(", "), group.len());
    }
    println!();
    println!("Checksum: {:016x}", checksum);
    println!("BLAKE3:   {}", hash);
    Ok(())
}

// =============================================================================
// CONVERT COMMAND
// =============================================================================

/// Re-encode a graph in the format named by `output`'s extension.
pub fn cmd_convert(file: &Path, output: &Path, settings: OutputConfig) -> Result<(), RepError> {
    let rep = load_rep(file)?;
    let written = save_rep(&rep, output, settings)?;

    println!("Converted {:?} -> {:?} ({} bytes)", file, output, written);
    Ok(())
}
