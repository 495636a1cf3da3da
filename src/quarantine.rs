use crate::{config::AppConfig, error::Error, registry::Registry};
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

#[derive(Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    Moved(usize),
    AlreadyDisabled,
    AlreadyEnabled,
}

/// Moves every file the mod owns out of the live tree into its quarantine
/// subtree, keeping paths relative to their root, then rewrites the record.
/// Files are moved before the registry is saved; an interruption in between
/// leaves the record pointing at the old locations.
pub fn disable(config: &AppConfig, registry: &mut Registry, name: &str) -> Result<ToggleOutcome> {
    let Some(record) = registry.get(name) else {
        return Err(Error::ModNotFound(name.to_string()).into());
    };
    if record.disabled {
        return Ok(ToggleOutcome::AlreadyDisabled);
    }
    let owned = record.owned_paths.clone();

    let quarantine = config.quarantine_dir(name);
    let moved = relocate(name, &owned, &config.game_root, &quarantine)?;
    let count = moved.len();

    let record = registry
        .get_mut(name)
        .ok_or_else(|| Error::ModNotFound(name.to_string()))?;
    record.owned_paths = moved;
    record.disabled = true;
    registry.save(&config.game_root)?;
    info!(name, files = count, "disabled");
    Ok(ToggleOutcome::Moved(count))
}

/// Inverse of [`disable`]: moves the quarantined files back under the live
/// tree and clears the flag.
pub fn enable(config: &AppConfig, registry: &mut Registry, name: &str) -> Result<ToggleOutcome> {
    let Some(record) = registry.get(name) else {
        return Err(Error::ModNotFound(name.to_string()).into());
    };
    if !record.disabled {
        return Ok(ToggleOutcome::AlreadyEnabled);
    }
    let owned = record.owned_paths.clone();

    let quarantine = config.quarantine_dir(name);
    let moved = relocate(name, &owned, &quarantine, &config.game_root)?;
    let count = moved.len();

    let record = registry
        .get_mut(name)
        .ok_or_else(|| Error::ModNotFound(name.to_string()))?;
    record.owned_paths = moved;
    record.disabled = false;
    registry.save(&config.game_root)?;
    info!(name, files = count, "enabled");
    Ok(ToggleOutcome::Moved(count))
}

/// Moves each path from under `from_root` to the mirrored location under
/// `to_root` and returns the rewritten list. Any path outside `from_root` is
/// rejected up front, before a single file moves; mixed-root records come
/// from interrupted toggles and are not safe to guess about.
fn relocate(
    name: &str,
    paths: &[PathBuf],
    from_root: &Path,
    to_root: &Path,
) -> Result<Vec<PathBuf>> {
    let mut planned = Vec::with_capacity(paths.len());
    for path in paths {
        let relative = path.strip_prefix(from_root).map_err(|_| Error::StrayOwnedPath {
            name: name.to_string(),
            path: path.clone(),
            expected: from_root.to_path_buf(),
        })?;
        planned.push((path.clone(), to_root.join(relative)));
    }

    let mut moved = Vec::with_capacity(planned.len());
    for (source, dest) in planned {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        move_file(&source, &dest)?;
        moved.push(dest);
    }
    Ok(moved)
}

// Rename where possible, copy+delete across filesystems. A retried
// half-finished toggle converges: an existing destination is overwritten, a
// source already sitting at the destination counts as moved, and a file gone
// from both sides is noted and carried along as its rewritten path.
fn move_file(source: &Path, dest: &Path) -> Result<()> {
    if !source.exists() {
        if dest.is_file() {
            debug!(path = %dest.display(), "already moved, skipping");
        } else {
            warn!(path = %source.display(), "file missing on both sides, skipping");
        }
        return Ok(());
    }
    if dest.is_file() {
        fs::remove_file(dest).with_context(|| format!("clear {}", dest.display()))?;
    }
    fs::rename(source, dest)
        .or_else(|_| fs::copy(source, dest).and_then(|_| fs::remove_file(source)))
        .with_context(|| format!("move {} -> {}", source.display(), dest.display()))
}
