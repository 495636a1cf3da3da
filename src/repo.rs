use crate::{archive::ModArchive, config::AppConfig, error::Error};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs::{self, File},
    io,
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tracing::info;

const LISTING_FILE: &str = "ModList.json";
const ARCHIVE_PREFIX: &str = "ModRepo/";
const USER_AGENT: &str = concat!("cogwright/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryListing {
    #[serde(default)]
    pub repository_mods: Vec<RepositoryMod>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryMod {
    pub file_name: String,
    pub mod_name: String,
    #[serde(default)]
    pub mod_description: String,
}

pub fn is_http_url(raw: &str) -> bool {
    raw.starts_with("http://") || raw.starts_with("https://")
}

/// Fetches the hosted mod index. The listing URL is the repository base with
/// the index name appended, so the configured base must end with a slash.
pub fn fetch_listing(config: &AppConfig) -> Result<RepositoryListing> {
    let url = format!("{}{}", config.repository_url, LISTING_FILE);
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(5))
        .timeout_read(Duration::from_secs(10))
        .timeout_write(Duration::from_secs(10))
        .build();
    let response = agent
        .get(&url)
        .set("User-Agent", USER_AGENT)
        .call()
        .map_err(|err| Error::NetworkFailure(err.to_string()))?;
    let listing: RepositoryListing = response
        .into_json()
        .context("decode repository listing")?;
    info!(mods = listing.repository_mods.len(), "fetched repository listing");
    Ok(listing)
}

/// Downloads a listed archive by its repository file name into the staging
/// directory and returns the local path.
pub fn fetch_repo_archive(config: &AppConfig, file_name: &str) -> Result<PathBuf> {
    let url = format!("{}{}{}", config.repository_url, ARCHIVE_PREFIX, file_name);
    fetch_archive_url(config, &url)
}

/// Downloads a mod archive from an arbitrary URL into the staging directory.
pub fn fetch_archive_url(config: &AppConfig, url: &str) -> Result<PathBuf> {
    let dest = staged_download_path(config)?;
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(5))
        .timeout_read(Duration::from_secs(60))
        .timeout_write(Duration::from_secs(60))
        .build();
    let response = agent
        .get(url)
        .set("User-Agent", USER_AGENT)
        .call()
        .map_err(|err| Error::NetworkFailure(err.to_string()))?;
    let mut reader = response.into_reader();
    let mut file = File::create(&dest).context("create download file")?;
    io::copy(&mut reader, &mut file).context("write download file")?;
    // A truncated or mislabeled download should fail here, not mid-install.
    ModArchive::open(&dest)?;
    info!(url, path = %dest.display(), "downloaded archive");
    Ok(dest)
}

/// Maps a user-supplied query onto a listed archive: an entry whose mod name
/// or file name matches (ASCII case-insensitive) wins, otherwise the query is
/// taken as a literal repository file name.
pub fn resolve_file_name(listing: &RepositoryListing, query: &str) -> String {
    listing
        .repository_mods
        .iter()
        .find(|entry| {
            entry.mod_name.eq_ignore_ascii_case(query)
                || entry.file_name.eq_ignore_ascii_case(query)
        })
        .map(|entry| entry.file_name.clone())
        .unwrap_or_else(|| query.to_string())
}

fn staged_download_path(config: &AppConfig) -> Result<PathBuf> {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let tmp = config.tmp_dir();
    fs::create_dir_all(&tmp).context("create download dir")?;
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let count = COUNTER.fetch_add(1, Ordering::SeqCst);
    Ok(tmp.join(format!("download-{stamp}-{count}.zip")))
}
