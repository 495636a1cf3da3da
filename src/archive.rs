use crate::error::Error;
use anyhow::{Context, Result};
use filetime::{set_file_mtime, FileTime};
use serde::Deserialize;
use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};
use time::{Date, Month, PrimitiveDateTime, Time as TimeOfDay};

pub const MANIFEST_ENTRY: &str = "manifest.cog";
const MANIFEST_SUFFIX: &str = ".cog";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub mod_name: String,
    pub mod_author: String,
    pub mod_version: String,
    #[serde(default)]
    pub optional_addons: Vec<Addon>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Addon {
    pub addon_name: String,
    pub directory: String,
}

/// Payload entry metadata. `raw_name` keeps the archive's own spelling for
/// addon prefix matching; `relative_path` is the sanitized extraction path.
#[derive(Debug, Clone)]
pub struct PayloadEntry {
    pub raw_name: String,
    pub relative_path: PathBuf,
    pub is_dir: bool,
}

pub struct ModArchive {
    archive: zip::ZipArchive<File>,
    path: PathBuf,
}

impl ModArchive {
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("open archive {}", path.display()))?;
        let archive = zip::ZipArchive::new(file)
            .map_err(|_| Error::ArchiveInvalid(path.to_path_buf()))?;
        Ok(Self {
            archive,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn manifest(&mut self) -> Result<Manifest> {
        let mut entry = match self.archive.by_name(MANIFEST_ENTRY) {
            Ok(entry) => entry,
            Err(_) => return Err(Error::ManifestMissing.into()),
        };
        let mut raw = String::new();
        entry
            .read_to_string(&mut raw)
            .context("read manifest entry")?;
        let manifest = serde_json::from_str(&raw).map_err(Error::ManifestInvalid)?;
        Ok(manifest)
    }

    /// Everything except manifest-suffixed entries. Entries without a safe
    /// relative name (absolute or `..`-escaping) are dropped. A trailing
    /// slash marks a directory entry.
    pub fn payload_entries(&mut self) -> Result<Vec<PayloadEntry>> {
        let mut entries = Vec::new();
        for index in 0..self.archive.len() {
            let entry = self.archive.by_index(index).context("read archive entry")?;
            let raw_name = entry.name().to_string();
            if raw_name.ends_with(MANIFEST_SUFFIX) {
                continue;
            }
            let Some(relative_path) = entry.enclosed_name() else {
                continue;
            };
            entries.push(PayloadEntry {
                is_dir: raw_name.ends_with('/'),
                relative_path,
                raw_name,
            });
        }
        Ok(entries)
    }

    pub fn extract_entry(&mut self, raw_name: &str, dest: &Path) -> Result<()> {
        let mut entry = self
            .archive
            .by_name(raw_name)
            .with_context(|| format!("reopen archive entry {raw_name}"))?;
        let mut out =
            File::create(dest).with_context(|| format!("write {}", dest.display()))?;
        std::io::copy(&mut entry, &mut out).context("extract archive entry")?;
        if let Some(dt) = entry.last_modified() {
            if let Some(mtime) = zip_time_to_unix(dt) {
                let _ = set_file_mtime(dest, FileTime::from_unix_time(mtime, 0));
            }
        }
        Ok(())
    }
}

fn zip_time_to_unix(dt: zip::DateTime) -> Option<i64> {
    let month = Month::try_from(dt.month()).ok()?;
    let date = Date::from_calendar_date(dt.year() as i32, month, dt.day()).ok()?;
    let time = TimeOfDay::from_hms(dt.hour(), dt.minute(), dt.second()).ok()?;
    let datetime = PrimitiveDateTime::new(date, time).assume_utc();
    Some(datetime.unix_timestamp())
}
