// ABOUTME: Integration tests for the file-based migration runner's disk-only paths
// ABOUTME: Database-backed paths (up/rollback/fresh) require a live MySQL pool and are not exercised here
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use altus4_server::migrations::status;
use std::fs;

fn write(dir: &std::path::Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).expect("write fixture");
}

#[tokio::test]
async fn status_without_a_pool_lists_every_file_as_unapplied() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "1_create_users.up.sql", "SELECT 1;");
    write(dir.path(), "1_create_users.down.sql", "SELECT 1;");
    write(dir.path(), "2_create_keys.up.sql", "SELECT 1;");
    write(dir.path(), "2_create_keys.down.sql", "SELECT 1;");

    let statuses = status(None, dir.path()).await.expect("status");

    assert_eq!(statuses.len(), 2);
    assert!(statuses.iter().all(|s| s.applied.is_none()));
    assert_eq!(statuses[0].name, "1_create_users");
    assert_eq!(statuses[1].name, "2_create_keys");
}

#[tokio::test]
async fn status_on_an_empty_directory_is_an_empty_list() {
    let dir = tempfile::tempdir().expect("tempdir");
    let statuses = status(None, dir.path()).await.expect("status");
    assert!(statuses.is_empty());
}
