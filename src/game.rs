use crate::error::Error;
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
    time::UNIX_EPOCH,
};

pub const GAME_NAME: &str = "Slackers - Carts of Glory";
pub const EXECUTABLE_NAME: &str = "CartOfGlory.exe";

#[derive(Debug, Clone)]
pub struct GamePaths {
    pub game_root: PathBuf,
    pub executable: PathBuf,
    pub patch_target: PathBuf,
}

/// Validates the configured game root before any tree-mutating operation.
pub fn resolve_paths(game_root: &Path) -> Result<GamePaths> {
    if !game_root.is_dir() {
        return Err(Error::DirectoryNotFound(game_root.to_path_buf()).into());
    }
    let executable = game_root.join(EXECUTABLE_NAME);
    if !executable.is_file() {
        return Err(Error::ExecutableMissing(executable).into());
    }
    Ok(GamePaths {
        game_root: game_root.to_path_buf(),
        patch_target: game_root.join("CartOfGlory").join("Binaries").join("Win64"),
        executable,
    })
}

pub fn looks_like_game_root(path: &Path) -> bool {
    path.join(EXECUTABLE_NAME).is_file()
}

/// Sentinel timestamp for backup drift detection, unix seconds.
pub fn executable_mtime(paths: &GamePaths) -> Result<i64> {
    let meta = fs::metadata(&paths.executable).context("read executable metadata")?;
    let modified = meta.modified().context("read executable mtime")?;
    let epoch = modified
        .duration_since(UNIX_EPOCH)
        .context("executable mtime before epoch")?
        .as_secs() as i64;
    Ok(epoch)
}

pub fn locate_game_root() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(home) = dirs_home() {
        candidates.push(home.join(".local/share/Steam"));
        candidates.push(home.join(".steam/steam"));
    }

    let mut libraries = Vec::new();
    for base in candidates {
        let vdf = base.join("steamapps/libraryfolders.vdf");
        if vdf.exists() {
            if let Ok(paths) = parse_steam_library_paths(&vdf) {
                libraries.extend(paths);
            }
        }
        libraries.push(base);
    }

    for lib in libraries {
        let candidate = lib.join("steamapps/common").join(GAME_NAME);
        if looks_like_game_root(&candidate) {
            return Some(candidate);
        }
    }

    None
}

fn parse_steam_library_paths(path: &Path) -> Result<Vec<PathBuf>> {
    let raw = fs::read_to_string(path).context("read libraryfolders.vdf")?;
    let mut paths = Vec::new();

    for line in raw.lines() {
        let line = line.trim();
        if !line.contains("\"path\"") {
            continue;
        }

        let parts: Vec<&str> = line.split('"').collect();
        if parts.len() >= 4 {
            let path = parts[3].replace("\\\\", "\\");
            paths.push(PathBuf::from(path));
        }
    }

    Ok(paths)
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}
