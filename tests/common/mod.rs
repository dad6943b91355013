//! Shared test utilities for integration tests

#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use tempfile::TempDir;

use growquest::domain::UserId;
use growquest::progression::ProgressionEngine;
use growquest::store::Store;
use growquest::tracker::{RetryPolicy, Tracker};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

pub fn user(id: &str) -> UserId {
    UserId::parse(id).expect("valid test user id")
}

/// Creates a temporary directory that holds a fresh database
pub fn temp_data_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// Opens a tracker on `<dir>/progress.db` with a generous retry budget
pub fn open_tracker(dir: &Path) -> Tracker {
    let store = Store::open(&dir.join("progress.db")).expect("Failed to open store");
    Tracker::new(
        store,
        ProgressionEngine::default(),
        RetryPolicy::new(100, Duration::from_millis(1)),
    )
}
