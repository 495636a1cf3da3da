#![allow(dead_code)]

use cogwright::{config::AppConfig, conflict::Conflict, prompt::Prompter};
use std::{collections::VecDeque, fs, io::Write, path::Path};
use tempfile::TempDir;
use zip::{write::SimpleFileOptions, ZipWriter};

/// Builds a throwaway game directory with the sentinel executable in place
/// and an app config rooted inside the same tempdir.
pub fn setup_test_env() -> (TempDir, AppConfig) {
    let tmp = tempfile::tempdir().unwrap();
    let game_root = tmp.path().join("game");
    fs::create_dir_all(game_root.join("Content")).unwrap();
    fs::write(game_root.join("CartOfGlory.exe"), b"original executable").unwrap();
    fs::write(game_root.join("Content/base.pak"), b"base game data").unwrap();

    let config = AppConfig {
        game_root,
        repository_url: "https://cogmm.netlify.app/".to_string(),
        data_dir: tmp.path().join("data"),
    };
    fs::create_dir_all(&config.data_dir).unwrap();
    (tmp, config)
}

pub fn manifest_json(name: &str, version: &str, addons: &[(&str, &str)]) -> String {
    let addons_json: Vec<String> = addons
        .iter()
        .map(|(addon_name, directory)| {
            format!(r#"{{"addonName": "{addon_name}", "directory": "{directory}"}}"#)
        })
        .collect();
    format!(
        r#"{{"modName": "{name}", "modAuthor": "Test Author", "modVersion": "{version}", "optionalAddons": [{}]}}"#,
        addons_json.join(", ")
    )
}

/// Writes a mod archive: the manifest entry plus the given payload entries.
/// Entry names ending in `/` become directory entries.
pub fn write_mod_zip(path: &Path, manifest: &str, entries: &[(&str, &str)]) {
    write_zip(path, Some(manifest), entries);
}

/// Same, but without a manifest entry.
pub fn write_plain_zip(path: &Path, entries: &[(&str, &str)]) {
    write_zip(path, None, entries);
}

fn write_zip(path: &Path, manifest: Option<&str>, entries: &[(&str, &str)]) {
    let file = fs::File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    if let Some(manifest) = manifest {
        zip.start_file("manifest.cog", options).unwrap();
        zip.write_all(manifest.as_bytes()).unwrap();
    }
    for (name, contents) in entries {
        if let Some(dir) = name.strip_suffix('/') {
            zip.add_directory(dir, options).unwrap();
        } else {
            zip.start_file(*name, options).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        }
    }
    zip.finish().unwrap();
}

/// Prompter with canned answers. `answers` are consumed in order; once they
/// run out every question gets `fallback`. Conflict reports are captured for
/// assertions.
pub struct ScriptedPrompter {
    answers: VecDeque<bool>,
    fallback: bool,
    pub questions_asked: usize,
    pub conflicts_seen: Vec<Conflict>,
}

impl ScriptedPrompter {
    pub fn accepting() -> Self {
        Self {
            answers: VecDeque::new(),
            fallback: true,
            questions_asked: 0,
            conflicts_seen: Vec::new(),
        }
    }

    pub fn declining() -> Self {
        Self {
            answers: VecDeque::new(),
            fallback: false,
            questions_asked: 0,
            conflicts_seen: Vec::new(),
        }
    }

    pub fn scripted(answers: &[bool], fallback: bool) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            fallback,
            questions_asked: 0,
            conflicts_seen: Vec::new(),
        }
    }

    fn next_answer(&mut self) -> bool {
        self.questions_asked += 1;
        self.answers.pop_front().unwrap_or(self.fallback)
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm_reinstall(&mut self, _name: &str, _version: &str) -> bool {
        self.next_answer()
    }

    fn confirm_conflicts(&mut self, conflicts: &[Conflict]) -> bool {
        self.conflicts_seen.extend(conflicts.iter().cloned());
        self.next_answer()
    }

    fn accept_component(&mut self, _name: &str, _directory: &str) -> bool {
        self.next_answer()
    }

    fn confirm_drifted_restore(&mut self) -> bool {
        self.next_answer()
    }
}
