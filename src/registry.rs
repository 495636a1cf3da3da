use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// Lives in the game root. The `.cog` suffix keeps it out of payload
/// extraction, which skips manifest-suffixed entries.
pub const REGISTRY_FILE: &str = "cogwright_data.cog";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedComponent {
    pub component_name: String,
    pub relative_directory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModRecord {
    pub name: String,
    pub author: String,
    pub version: String,
    #[serde(default)]
    pub optional_components: Vec<OwnedComponent>,
    #[serde(default)]
    pub owned_paths: Vec<PathBuf>,
    #[serde(default)]
    pub disabled: bool,
}

/// Name-keyed map of installed mods, loaded fully and rewritten fully.
/// Saving is the commit point for every mutating operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    pub mods: BTreeMap<String, ModRecord>,
}

impl Registry {
    pub fn load_or_default(game_root: &Path) -> Result<Self> {
        let path = Self::registry_path(game_root);
        if !path.exists() {
            return Ok(Registry::default());
        }
        let raw = fs::read_to_string(&path).context("read mod registry")?;
        let registry = serde_json::from_str(&raw).context("parse mod registry")?;
        Ok(registry)
    }

    pub fn save(&self, game_root: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self).context("serialize mod registry")?;
        fs::write(Self::registry_path(game_root), raw).context("write mod registry")?;
        Ok(())
    }

    pub fn registry_path(game_root: &Path) -> PathBuf {
        game_root.join(REGISTRY_FILE)
    }

    pub fn get(&self, name: &str) -> Option<&ModRecord> {
        self.mods.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ModRecord> {
        self.mods.get_mut(name)
    }

    pub fn upsert(&mut self, record: ModRecord) {
        self.mods.insert(record.name.clone(), record);
    }

    pub fn remove(&mut self, name: &str) -> Option<ModRecord> {
        self.mods.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModRecord> {
        self.mods.values()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_the_documented_wire_names() {
        let record = ModRecord {
            name: "Foo".to_string(),
            author: "someone".to_string(),
            version: "1.0".to_string(),
            optional_components: vec![OwnedComponent {
                component_name: "Extras".to_string(),
                relative_directory: "extras/".to_string(),
            }],
            owned_paths: vec![PathBuf::from("/game/a.txt")],
            disabled: false,
        };
        let mut registry = Registry::default();
        registry.upsert(record);

        let raw = serde_json::to_string(&registry).unwrap();
        assert!(raw.starts_with("{\"Foo\":"));
        assert!(raw.contains("\"optionalComponents\""));
        assert!(raw.contains("\"componentName\""));
        assert!(raw.contains("\"relativeDirectory\""));
        assert!(raw.contains("\"ownedPaths\""));
        assert!(raw.contains("\"disabled\":false"));

        let back: Registry = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.get("Foo").unwrap().owned_paths.len(), 1);
    }

    #[test]
    fn missing_optional_fields_default() {
        let raw = r#"{"Foo":{"name":"Foo","author":"a","version":"1.0"}}"#;
        let registry: Registry = serde_json::from_str(raw).unwrap();
        let record = registry.get("Foo").unwrap();
        assert!(record.optional_components.is_empty());
        assert!(record.owned_paths.is_empty());
        assert!(!record.disabled);
    }
}
