use crate::{
    config::AppConfig,
    error::Error,
    game::{self, GamePaths},
    prompt::Prompter,
};
use anyhow::{Context, Result};
use filetime::FileTime;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMeta {
    pub backup_creation_date: i64,
    pub executable_last_write_time: i64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored(usize),
    DeclinedDrift,
}

/// Mirrors the whole game tree into the backup root the first time the tool
/// runs. Later calls see the metadata file and do nothing, so the backup
/// always reflects the tree before any mod touched it.
pub fn ensure_backup(config: &AppConfig, paths: &GamePaths) -> Result<bool> {
    let meta_path = config.backup_meta_path();
    if meta_path.exists() {
        return Ok(false);
    }

    let backup_root = config.backup_dir();
    fs::create_dir_all(&backup_root).context("create backup dir")?;
    let copied = mirror_tree(&paths.game_root, &backup_root)?;

    let meta = BackupMeta {
        backup_creation_date: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64,
        executable_last_write_time: game::executable_mtime(paths)?,
    };
    let meta_json = serde_json::to_string_pretty(&meta).context("serialize backup meta")?;
    fs::write(&meta_path, meta_json).context("write backup meta")?;
    info!(files = copied, "created pristine backup");
    Ok(true)
}

pub fn load_meta(config: &AppConfig) -> Result<BackupMeta> {
    let meta_path = config.backup_meta_path();
    if !meta_path.exists() {
        return Err(Error::MetadataMissing.into());
    }
    let raw = fs::read_to_string(&meta_path).context("read backup meta")?;
    let meta = serde_json::from_str(&raw).context("parse backup meta")?;
    Ok(meta)
}

/// Wipes the live tree and copies the pristine backup over it. When the
/// sentinel executable changed since the backup was taken (a game update,
/// usually), the caller has to confirm first: restoring rolls that back.
pub fn restore(
    config: &AppConfig,
    paths: &GamePaths,
    prompter: &mut dyn Prompter,
) -> Result<RestoreOutcome> {
    let meta = load_meta(config)?;
    let current = game::executable_mtime(paths)?;
    if current != meta.executable_last_write_time {
        warn!(
            recorded = meta.executable_last_write_time,
            current, "executable changed since backup"
        );
        if !prompter.confirm_drifted_restore() {
            return Ok(RestoreOutcome::DeclinedDrift);
        }
    }

    clear_tree(&paths.game_root)?;
    let restored = mirror_tree(&config.backup_dir(), &paths.game_root)?;
    info!(files = restored, "restored game tree from backup");
    Ok(RestoreOutcome::Restored(restored))
}

/// Copies every directory and file under `source` to the same relative spot
/// under `dest`, overwriting what is already there. File mtimes carry over so
/// the executable timestamp survives a restore round trip.
fn mirror_tree(source: &Path, dest: &Path) -> Result<usize> {
    let mut copied = 0usize;
    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.context("walk tree")?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .context("strip tree root")?;
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("create {}", target.display()))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        fs::copy(entry.path(), &target)
            .with_context(|| format!("copy {}", entry.path().display()))?;
        if let Ok(metadata) = entry.metadata() {
            let _ =
                filetime::set_file_mtime(&target, FileTime::from_last_modification_time(&metadata));
        }
        copied += 1;
    }
    Ok(copied)
}

fn clear_tree(root: &Path) -> Result<()> {
    for entry in fs::read_dir(root).context("read game dir")? {
        let entry = entry.context("read game dir entry")?;
        let path = entry.path();
        if entry.file_type().context("stat game dir entry")?.is_dir() {
            fs::remove_dir_all(&path).with_context(|| format!("remove {}", path.display()))?;
        } else {
            fs::remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
        }
    }
    Ok(())
}
