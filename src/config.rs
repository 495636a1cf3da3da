use crate::game;
use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub game_root: PathBuf,
    #[serde(default = "default_repository_url")]
    pub repository_url: String,
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn load_or_create() -> Result<Self> {
        let data_dir = base_data_dir()?;
        fs::create_dir_all(&data_dir).context("create app data dir")?;
        let path = data_dir.join("config.json");
        if path.exists() {
            let raw = fs::read_to_string(&path).context("read app config")?;
            let mut config: AppConfig = serde_json::from_str(&raw).context("parse app config")?;
            config.data_dir = data_dir;
            if config.game_root.as_os_str().is_empty() {
                if let Some(root) = game::locate_game_root() {
                    config.game_root = root;
                    config.save()?;
                }
            }
            return Ok(config);
        }

        let config = AppConfig {
            game_root: game::locate_game_root().unwrap_or_default(),
            repository_url: default_repository_url(),
            data_dir,
        };
        config.save()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).context("create app data dir")?;
        let path = self.data_dir.join("config.json");
        let raw = serde_json::to_string_pretty(self).context("serialize app config")?;
        fs::write(path, raw).context("write app config")?;
        Ok(())
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.data_dir.join("backup")
    }

    pub fn backup_meta_path(&self) -> PathBuf {
        self.data_dir.join("backup_meta.json")
    }

    pub fn quarantine_root(&self) -> PathBuf {
        self.data_dir.join("disabled")
    }

    pub fn quarantine_dir(&self, mod_name: &str) -> PathBuf {
        self.quarantine_root().join(sanitize_dir_label(mod_name))
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.data_dir.join("tmp")
    }
}

fn default_repository_url() -> String {
    "https://cogmm.netlify.app/".to_string()
}

fn base_data_dir() -> Result<PathBuf> {
    let base = BaseDirs::new().context("resolve home dir")?;
    Ok(base.data_local_dir().join("cogwright"))
}

fn sanitize_dir_label(value: &str) -> String {
    value
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarantine_dir_sanitizes_mod_names() {
        let config = AppConfig {
            game_root: PathBuf::from("/game"),
            repository_url: default_repository_url(),
            data_dir: PathBuf::from("/data"),
        };
        assert_eq!(
            config.quarantine_dir("Cart Tweaks: Deluxe"),
            PathBuf::from("/data/disabled/Cart_Tweaks__Deluxe")
        );
    }
}
