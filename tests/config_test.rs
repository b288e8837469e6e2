//! Integration tests for Settings loading.
//!
//! Precedence: defaults, global file, explicit file, `TREEORDER_*` env vars.
//!
//! Note: env tests set `TREEORDER_*` process-wide. Only they assert on
//! `self_target` through `Settings::load`, and no test expects
//! `verify_after_move` to be false after `Settings::load`.

use std::env;
use std::fs;

use tempfile::TempDir;

use treeorder::config::Settings;
use treeorder::{ApplicationError, OrderingError, OutlineBuilder, SelfTargetPolicy};

// ============================================================
// Settings::from_file()
// ============================================================

#[test]
fn given_file_with_both_fields_when_from_file_then_uses_them() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("treeorder.toml");
    fs::write(&path, "self_target = \"reject\"\nverify_after_move = true\n").unwrap();

    let settings = Settings::from_file(&path).expect("load settings");

    assert_eq!(settings.self_target, SelfTargetPolicy::Reject);
    assert!(settings.verify_after_move);
}

#[test]
fn given_partial_file_when_from_file_then_missing_fields_default() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("treeorder.toml");
    fs::write(&path, "verify_after_move = true\n").unwrap();

    let settings = Settings::from_file(&path).unwrap();

    assert_eq!(settings.self_target, SelfTargetPolicy::Ignore);
    assert!(settings.verify_after_move);
}

#[test]
fn given_unknown_policy_when_from_file_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("treeorder.toml");
    fs::write(&path, "self_target = \"sometimes\"\n").unwrap();

    let result = Settings::from_file(&path);

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_written_template_when_from_file_then_equals_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("treeorder.toml");
    fs::write(&path, Settings::template()).unwrap();

    assert_eq!(Settings::from_file(&path).unwrap(), Settings::default());
}

// ============================================================
// Settings::load()
// ============================================================

#[test]
fn given_local_file_when_load_then_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("local.toml");
    fs::write(&path, "verify_after_move = true\n").unwrap();

    let settings = Settings::load(Some(&path)).expect("load settings");

    assert!(settings.verify_after_move);
}

#[test]
fn given_missing_local_file_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    let err = Settings::load(Some(&path)).unwrap_err();

    match err {
        ApplicationError::Config { message } => assert!(message.contains("does-not-exist.toml")),
        other => panic!("expected Config error, got {:?}", other),
    }
}

#[test]
fn given_env_override_when_load_then_env_wins_over_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("local.toml");
    fs::write(&path, "self_target = \"ignore\"\n").unwrap();

    env::set_var("TREEORDER_SELF_TARGET", "reject");
    let result = Settings::load(Some(&path));
    env::remove_var("TREEORDER_SELF_TARGET");

    assert_eq!(result.unwrap().self_target, SelfTargetPolicy::Reject);
}

#[test]
fn given_single_underscore_env_var_when_load_then_applies_verify_flag() {
    env::set_var("TREEORDER_VERIFY_AFTER_MOVE", "true");
    let result = Settings::load(None);
    env::remove_var("TREEORDER_VERIFY_AFTER_MOVE");

    assert!(result.unwrap().verify_after_move);
}

// ============================================================
// Settings reach the engine
// ============================================================

#[test]
fn given_reject_policy_from_file_when_moving_onto_self_then_invalid_target() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("treeorder.toml");
    fs::write(&path, "self_target = \"reject\"\n").unwrap();
    let settings = Settings::from_file(&path).unwrap();

    let mut outline = OutlineBuilder::new()
        .with_settings(settings)
        .build("- a\n- b")
        .unwrap();
    let b = outline.id("b").unwrap();

    assert_eq!(outline.tree.engine().settings().self_target, SelfTargetPolicy::Reject);
    outline.tree.engine_mut().move_to_top(b).unwrap();
    assert!(matches!(
        outline.tree.engine_mut().move_below(b, b),
        Err(OrderingError::InvalidTarget { .. })
    ));
}
