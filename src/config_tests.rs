#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::path::PathBuf;

use super::*;

fn resolve_with(vars: &[(&str, &str)]) -> AppConfig {
    let env: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::resolve(
        |key| env.get(key).cloned(),
        || Ok(PathBuf::from("/default/data")),
    )
    .unwrap()
}

#[test]
fn test_defaults() {
    let c = resolve_with(&[]);
    assert_eq!(c.data_dir, PathBuf::from("/default/data"));
    assert_eq!(c.db_path, PathBuf::from("/default/data/budgetbuddy.db"));
    assert_eq!(c.log_path, PathBuf::from("/default/data/budgetbuddy.log"));
    assert_eq!(c.log_filter, "info");
    assert_eq!(c.storage, StorageBackend::Sqlite);
}

#[test]
fn test_data_dir_override() {
    let c = resolve_with(&[(DATA_DIR_VAR, "/tmp/bb")]);
    assert_eq!(c.db_path, PathBuf::from("/tmp/bb/budgetbuddy.db"));
}

#[test]
fn test_blank_override_ignored() {
    let c = resolve_with(&[(DATA_DIR_VAR, "  "), (LOG_VAR, "")]);
    assert_eq!(c.data_dir, PathBuf::from("/default/data"));
    assert_eq!(c.log_filter, "info");
}

#[test]
fn test_log_filter_precedence() {
    let c = resolve_with(&[("RUST_LOG", "warn")]);
    assert_eq!(c.log_filter, "warn");
    let c = resolve_with(&[("RUST_LOG", "warn"), (LOG_VAR, "debug")]);
    assert_eq!(c.log_filter, "debug");
}

#[test]
fn test_storage_selection() {
    assert_eq!(
        resolve_with(&[(STORAGE_VAR, "MEMORY")]).storage,
        StorageBackend::Memory
    );
    assert_eq!(
        resolve_with(&[(STORAGE_VAR, "sqlite")]).storage,
        StorageBackend::Sqlite
    );
    assert_eq!(
        resolve_with(&[(STORAGE_VAR, "floppy")]).storage,
        StorageBackend::Sqlite
    );
}

#[test]
fn test_default_dir_error_propagates() {
    let result = AppConfig::resolve(|_| None, || anyhow::bail!("no home"));
    assert!(result.is_err());
}

#[test]
fn test_shellexpand_plain_path() {
    assert_eq!(shellexpand("/abs/file.csv"), "/abs/file.csv");
    assert_eq!(shellexpand("relative.csv"), "relative.csv");
}
