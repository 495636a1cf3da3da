use crate::{
    archive::{Addon, ModArchive, PayloadEntry},
    config::AppConfig,
    conflict::{self, Conflict},
    error::Error,
    prompt::Prompter,
    registry::{ModRecord, OwnedComponent, Registry},
    version::{self, VersionOutcome},
};
use anyhow::{Context, Result};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum InstallOutcome {
    Installed(InstallReport),
    DeclinedReinstall,
    DeclinedConflicts(Vec<Conflict>),
}

#[derive(Debug, Default)]
pub struct InstallReport {
    pub name: String,
    pub version: String,
    pub files_written: usize,
    pub components_accepted: Vec<String>,
    pub replaced_version: Option<String>,
}

#[derive(Debug, Default)]
pub struct UninstallReport {
    pub name: String,
    pub files_removed: usize,
    pub files_missing: usize,
}

/// Installs one archive. On a version replace the existing record is fully
/// uninstalled before anything is extracted, so no file of the old version
/// survives. The registry is persisted only after extraction finishes; a
/// crash mid-extraction leaves orphan files no record claims.
pub fn install(
    config: &AppConfig,
    registry: &mut Registry,
    archive_path: &Path,
    prompter: &mut dyn Prompter,
) -> Result<InstallOutcome> {
    let mut archive = ModArchive::open(archive_path)?;
    let manifest = archive.manifest()?;
    info!(
        name = %manifest.mod_name,
        author = %manifest.mod_author,
        version = %manifest.mod_version,
        "identified mod"
    );

    let existing = registry.get(&manifest.mod_name).cloned();
    match version::resolve(
        &manifest.mod_version,
        existing.as_ref().map(|record| record.version.as_str()),
    ) {
        VersionOutcome::Fresh => {}
        VersionOutcome::Identical => {
            if !prompter.confirm_reinstall(&manifest.mod_name, &manifest.mod_version) {
                return Ok(InstallOutcome::DeclinedReinstall);
            }
        }
        VersionOutcome::Upgrade => info!(
            from = %existing.as_ref().map(|record| record.version.as_str()).unwrap_or_default(),
            to = %manifest.mod_version,
            "upgrading '{}'",
            manifest.mod_name
        ),
        VersionOutcome::Downgrade => info!(
            from = %existing.as_ref().map(|record| record.version.as_str()).unwrap_or_default(),
            to = %manifest.mod_version,
            "downgrading '{}'",
            manifest.mod_name
        ),
    }

    let mut replaced_version = None;
    if let Some(existing) = &existing {
        replaced_version = Some(existing.version.clone());
        uninstall(config, registry, &existing.name)?;
    }

    let entries = archive.payload_entries()?;
    let prospective: Vec<PathBuf> = entries
        .iter()
        .filter(|entry| !entry.is_dir)
        .map(|entry| config.game_root.join(&entry.relative_path))
        .collect();
    let conflicts = conflict::find_conflicts(registry, &manifest.mod_name, &prospective);
    if !conflicts.is_empty() {
        warn!(count = conflicts.len(), "files already owned by other mods");
        if !prompter.confirm_conflicts(&conflicts) {
            return Ok(InstallOutcome::DeclinedConflicts(conflicts));
        }
    }

    // Components carried over from the replaced record are not re-asked; the
    // selection holds only directories accepted this run.
    let retained: HashSet<&str> = existing
        .as_ref()
        .map(|record| {
            record
                .optional_components
                .iter()
                .map(|component| component.relative_directory.as_str())
                .collect()
        })
        .unwrap_or_default();
    let mut selection: Vec<Addon> = Vec::new();
    for addon in &manifest.optional_addons {
        if retained.contains(addon.directory.as_str()) {
            continue;
        }
        if prompter.accept_component(&addon.addon_name, &addon.directory) {
            selection.push(addon.clone());
        }
    }

    let mut record = ModRecord {
        name: manifest.mod_name.clone(),
        author: manifest.mod_author.clone(),
        version: manifest.mod_version.clone(),
        optional_components: selection
            .iter()
            .map(|addon| OwnedComponent {
                component_name: addon.addon_name.clone(),
                relative_directory: addon.directory.clone(),
            })
            .collect(),
        owned_paths: Vec::new(),
        disabled: false,
    };

    let mut files_written = 0usize;
    for entry in &entries {
        if !should_install(entry, &manifest.optional_addons, &selection) {
            continue;
        }
        let dest = config.game_root.join(&entry.relative_path);
        if entry.is_dir {
            fs::create_dir_all(&dest)
                .with_context(|| format!("create {}", dest.display()))?;
            continue;
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        archive.extract_entry(&entry.raw_name, &dest)?;
        debug!(path = %dest.display(), "installed file");
        record.owned_paths.push(dest);
        files_written += 1;
    }

    registry.upsert(record);
    registry.save(&config.game_root)?;
    info!(name = %manifest.mod_name, files = files_written, "install complete");

    Ok(InstallOutcome::Installed(InstallReport {
        name: manifest.mod_name,
        version: manifest.mod_version,
        files_written,
        components_accepted: selection
            .into_iter()
            .map(|addon| addon.addon_name)
            .collect(),
        replaced_version,
    }))
}

/// Removes every file the registry attributes to the mod, the record itself,
/// and any quarantine subtree left from a disabled state. Missing files are
/// skipped, not errors.
pub fn uninstall(
    config: &AppConfig,
    registry: &mut Registry,
    name: &str,
) -> Result<UninstallReport> {
    let Some(record) = registry.remove(name) else {
        return Err(Error::ModNotFound(name.to_string()).into());
    };

    let mut report = UninstallReport {
        name: record.name.clone(),
        ..Default::default()
    };
    for path in &record.owned_paths {
        if path.exists() {
            fs::remove_file(path).with_context(|| format!("remove {}", path.display()))?;
            report.files_removed += 1;
        } else {
            warn!(path = %path.display(), "file already missing, skipping");
            report.files_missing += 1;
        }
    }

    let quarantine = config.quarantine_dir(&record.name);
    if quarantine.exists() {
        fs::remove_dir_all(&quarantine).context("remove quarantine dir")?;
    }

    registry.save(&config.game_root)?;
    info!(name = %report.name, files = report.files_removed, "uninstalled");
    Ok(report)
}

/// Entry filter pairing the addon membership test (prefix on the raw archive
/// name, case-sensitive) with the selection test (same prefix, ASCII
/// case-insensitive). Entries outside every declared addon always install.
fn should_install(entry: &PayloadEntry, declared: &[Addon], selection: &[Addon]) -> bool {
    let belongs = declared
        .iter()
        .any(|addon| entry.raw_name.starts_with(&addon.directory));
    if !belongs {
        return true;
    }
    selection
        .iter()
        .any(|addon| starts_with_ignore_ascii_case(&entry.raw_name, &addon.directory))
}

fn starts_with_ignore_ascii_case(name: &str, prefix: &str) -> bool {
    name.get(..prefix.len())
        .map(|head| head.eq_ignore_ascii_case(prefix))
        .unwrap_or(false)
}
