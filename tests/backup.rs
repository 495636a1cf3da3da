mod common;

use common::{manifest_json, setup_test_env, write_mod_zip, ScriptedPrompter};
use cogwright::{
    backup::{self, RestoreOutcome},
    game, install,
    registry::Registry,
    Error,
};
use filetime::FileTime;
use std::fs;

#[test]
fn first_run_backup_mirrors_the_game_tree() {
    let (_tmp, config) = setup_test_env();
    let paths = game::resolve_paths(&config.game_root).unwrap();

    assert!(backup::ensure_backup(&config, &paths).unwrap());
    let backup_root = config.backup_dir();
    assert!(backup_root.join("CartOfGlory.exe").exists());
    assert_eq!(
        fs::read_to_string(backup_root.join("Content/base.pak")).unwrap(),
        "base game data"
    );

    let meta = backup::load_meta(&config).unwrap();
    assert!(meta.backup_creation_date > 0);
    assert_eq!(
        meta.executable_last_write_time,
        game::executable_mtime(&paths).unwrap()
    );
    let raw_meta = fs::read_to_string(config.backup_meta_path()).unwrap();
    assert!(raw_meta.contains("\"backupCreationDate\""));
    assert!(raw_meta.contains("\"executableLastWriteTime\""));

    // Second run does nothing: a file added later never reaches the backup.
    fs::write(config.game_root.join("later.txt"), "not backed up").unwrap();
    assert!(!backup::ensure_backup(&config, &paths).unwrap());
    assert!(!backup_root.join("later.txt").exists());
}

#[test]
fn restore_reverts_the_tree_to_backup_state() {
    let (tmp, config) = setup_test_env();
    let paths = game::resolve_paths(&config.game_root).unwrap();
    backup::ensure_backup(&config, &paths).unwrap();

    // Mutate the tree: install a mod and scribble over a base file.
    let zip_path = tmp.path().join("mod.zip");
    write_mod_zip(
        &zip_path,
        &manifest_json("Cart Tweaks", "1.0", &[]),
        &[("data/skin.txt", "mod file")],
    );
    let mut registry = Registry::load_or_default(&config.game_root).unwrap();
    let mut prompter = ScriptedPrompter::accepting();
    install::install(&config, &mut registry, &zip_path, &mut prompter).unwrap();
    fs::write(config.game_root.join("Content/base.pak"), "scribbled").unwrap();

    let outcome = backup::restore(&config, &paths, &mut prompter).unwrap();
    assert!(matches!(outcome, RestoreOutcome::Restored(_)));

    assert!(!config.game_root.join("data/skin.txt").exists());
    assert_eq!(
        fs::read_to_string(config.game_root.join("Content/base.pak")).unwrap(),
        "base game data"
    );
    // The registry lives inside the tree, so it reverts along with it.
    assert!(Registry::load_or_default(&config.game_root)
        .unwrap()
        .is_empty());
    // Mirroring preserves timestamps, so the sentinel still matches the
    // recorded value and a follow-up restore would not warn.
    let meta = backup::load_meta(&config).unwrap();
    assert_eq!(
        game::executable_mtime(&paths).unwrap(),
        meta.executable_last_write_time
    );
}

#[test]
fn drifted_executable_requires_confirmation() {
    let (_tmp, config) = setup_test_env();
    let paths = game::resolve_paths(&config.game_root).unwrap();
    backup::ensure_backup(&config, &paths).unwrap();

    fs::write(config.game_root.join("extra.txt"), "mod leftovers").unwrap();
    // Simulate a game update by shifting the executable timestamp.
    filetime::set_file_mtime(&paths.executable, FileTime::from_unix_time(1_500_000_000, 0))
        .unwrap();

    let mut declining = ScriptedPrompter::declining();
    let outcome = backup::restore(&config, &paths, &mut declining).unwrap();
    assert_eq!(outcome, RestoreOutcome::DeclinedDrift);
    assert_eq!(declining.questions_asked, 1);
    assert!(
        config.game_root.join("extra.txt").exists(),
        "a declined restore must leave the tree alone"
    );

    let mut accepting = ScriptedPrompter::accepting();
    let outcome = backup::restore(&config, &paths, &mut accepting).unwrap();
    assert!(matches!(outcome, RestoreOutcome::Restored(_)));
    assert!(!config.game_root.join("extra.txt").exists());
}

#[test]
fn restore_without_backup_reports_missing_metadata() {
    let (_tmp, config) = setup_test_env();
    let paths = game::resolve_paths(&config.game_root).unwrap();
    let mut prompter = ScriptedPrompter::accepting();
    let err = backup::restore(&config, &paths, &mut prompter).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::MetadataMissing)
    ));
}
