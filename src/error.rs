use std::path::PathBuf;
use thiserror::Error;

/// Classified failures surfaced to the operator. Anything else travels as a
/// plain `anyhow` chain with context strings.
#[derive(Debug, Error)]
pub enum Error {
    #[error("game directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("game executable missing: {}", .0.display())]
    ExecutableMissing(PathBuf),
    #[error("manifest entry missing from archive")]
    ManifestMissing,
    #[error("manifest entry is not valid JSON")]
    ManifestInvalid(#[source] serde_json::Error),
    #[error("mod not installed: {0}")]
    ModNotFound(String),
    #[error("embedded patch payload unreadable")]
    ResourceMissing,
    #[error("no backup recorded yet")]
    MetadataMissing,
    #[error("network request failed: {0}")]
    NetworkFailure(String),
    #[error("not a valid mod archive: {}", .0.display())]
    ArchiveInvalid(PathBuf),
    #[error(
        "mod '{name}' owns a path outside its current root: {} (expected under {})",
        .path.display(),
        .expected.display()
    )]
    StrayOwnedPath {
        name: String,
        path: PathBuf,
        expected: PathBuf,
    },
}
