use crate::{error::Error, game::GamePaths};
use anyhow::{Context, Result};
use std::{fs, io::Cursor};
use tracing::{debug, info};
use zip::ZipArchive;

/// Mod-unlocker payload bundled into the binary at build time. Applying and
/// removing it never touches the registry; patch state is just the presence
/// of these files under the target directory.
static PATCH_ZIP: &[u8] = include_bytes!("../resources/patch_files.zip");

fn open_payload() -> Result<ZipArchive<Cursor<&'static [u8]>>> {
    ZipArchive::new(Cursor::new(PATCH_ZIP)).map_err(|_| Error::ResourceMissing.into())
}

/// Extracts the payload into the patch target, overwriting whatever is there.
pub fn apply(paths: &GamePaths) -> Result<usize> {
    fs::create_dir_all(&paths.patch_target).context("create patch target")?;
    let mut archive = open_payload()?;
    let mut written = 0usize;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).context("read patch entry")?;
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let dest = paths.patch_target.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&dest).with_context(|| format!("create {}", dest.display()))?;
            continue;
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let mut out =
            fs::File::create(&dest).with_context(|| format!("write {}", dest.display()))?;
        std::io::copy(&mut entry, &mut out)
            .with_context(|| format!("extract {}", dest.display()))?;
        debug!(path = %dest.display(), "patch file written");
        written += 1;
    }
    info!(files = written, "patch applied");
    Ok(written)
}

/// Deletes the payload's files from the patch target. Directories stay; only
/// files the payload would have written are removed, so nothing a mod put
/// next to them is touched.
pub fn remove(paths: &GamePaths) -> Result<usize> {
    let mut archive = open_payload()?;
    let mut removed = 0usize;
    for index in 0..archive.len() {
        let entry = archive.by_index(index).context("read patch entry")?;
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        if entry.is_dir() {
            continue;
        }
        let target = paths.patch_target.join(relative);
        if target.is_file() {
            fs::remove_file(&target).with_context(|| format!("remove {}", target.display()))?;
            removed += 1;
        }
    }
    info!(files = removed, "patch removed");
    Ok(removed)
}
