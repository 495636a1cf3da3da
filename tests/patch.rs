mod common;

use common::setup_test_env;
use cogwright::{game, patch};
use std::fs;

#[test]
fn patch_extracts_the_bundled_payload() {
    let (_tmp, config) = setup_test_env();
    let paths = game::resolve_paths(&config.game_root).unwrap();

    let written = patch::apply(&paths).unwrap();
    assert_eq!(written, 3);
    assert!(paths.patch_target.join("dsound.dll").exists());
    assert!(fs::read_to_string(paths.patch_target.join("dsound.ini"))
        .unwrap()
        .contains("[Loader]"));
    assert!(paths.patch_target.join("Mods").is_dir());
    assert!(paths.patch_target.join("Mods/readme.txt").exists());
}

#[test]
fn reapplying_overwrites_local_edits() {
    let (_tmp, config) = setup_test_env();
    let paths = game::resolve_paths(&config.game_root).unwrap();
    patch::apply(&paths).unwrap();

    fs::write(paths.patch_target.join("dsound.ini"), "broken").unwrap();
    patch::apply(&paths).unwrap();
    assert!(fs::read_to_string(paths.patch_target.join("dsound.ini"))
        .unwrap()
        .contains("[Loader]"));
}

#[test]
fn unpatch_removes_payload_but_keeps_user_files() {
    let (_tmp, config) = setup_test_env();
    let paths = game::resolve_paths(&config.game_root).unwrap();
    patch::apply(&paths).unwrap();
    fs::write(paths.patch_target.join("Mods/custom.pak"), "user mod").unwrap();

    let removed = patch::remove(&paths).unwrap();
    assert_eq!(removed, 3);
    assert!(!paths.patch_target.join("dsound.dll").exists());
    assert!(!paths.patch_target.join("dsound.ini").exists());
    assert!(!paths.patch_target.join("Mods/readme.txt").exists());
    // Directories stay, and so does anything the user put in them.
    assert!(paths.patch_target.join("Mods/custom.pak").exists());
}

#[test]
fn unpatch_before_patch_is_a_noop() {
    let (_tmp, config) = setup_test_env();
    let paths = game::resolve_paths(&config.game_root).unwrap();
    assert_eq!(patch::remove(&paths).unwrap(), 0);
}
