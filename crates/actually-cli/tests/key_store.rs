use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_key_save_then_show_masks() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("actually")
        .env("ACTUALLY_HOME", dir.path())
        .args(["key", "save", "sk-proj-abcdefghijklmnop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved API key"));

    let stored = fs::read_to_string(dir.path().join("storage.toml")).unwrap();
    assert!(stored.contains("api_key = \"sk-proj-abcdefghijklmnop\""));

    cargo_bin_cmd!("actually")
        .env("ACTUALLY_HOME", dir.path())
        .args(["key", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sk-p…mnop"))
        .stdout(predicate::str::contains("abcdefgh").not());

    cargo_bin_cmd!("actually")
        .env("ACTUALLY_HOME", dir.path())
        .args(["key", "show", "--reveal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sk-proj-abcdefghijklmnop"));
}

#[test]
fn test_show_preference_reveals_key() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("storage.toml"),
        "api_key = \"sk-proj-abcdefghijklmnop\"\nshow_api_key = \"true\"\n",
    )
    .unwrap();

    cargo_bin_cmd!("actually")
        .env("ACTUALLY_HOME", dir.path())
        .args(["key", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sk-proj-abcdefghijklmnop"));
}

#[test]
fn test_key_clear_removes_key() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("actually")
        .env("ACTUALLY_HOME", dir.path())
        .args(["key", "save", "sk-test"])
        .assert()
        .success();

    cargo_bin_cmd!("actually")
        .env("ACTUALLY_HOME", dir.path())
        .args(["key", "clear"])
        .assert()
        .success();

    cargo_bin_cmd!("actually")
        .env("ACTUALLY_HOME", dir.path())
        .args(["key", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No API key saved"));
}

#[test]
fn test_blank_key_is_rejected() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("actually")
        .env("ACTUALLY_HOME", dir.path())
        .args(["key", "save", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key is empty"));
}
