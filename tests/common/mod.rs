#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use planner_core::{
    config::Config,
    core::{ManualClock, Planner},
    storage::JsonFileStore,
};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Creates an isolated store directory for one test.
pub fn temp_store_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().join("store");
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Opens a planner over a JSON store in `dir` at noon of `today`.
pub fn open_planner(dir: &Path, clock: Arc<ManualClock>) -> Planner {
    let store = JsonFileStore::new(dir.to_path_buf()).expect("create json store");
    Planner::open(Arc::new(store), clock, Config::default()).expect("open planner")
}

/// Fresh planner plus the clock and directory needed to reopen it later.
pub fn setup_planner(today: NaiveDate) -> (Planner, Arc<ManualClock>, PathBuf) {
    let dir = temp_store_dir();
    let clock = Arc::new(ManualClock::at_date(today));
    let planner = open_planner(&dir, clock.clone());
    (planner, clock, dir)
}
