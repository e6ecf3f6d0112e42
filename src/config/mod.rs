use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::core::utils::{app_data_dir, config_dir_in, config_file_in, ensure_dir, store_dir_in};
use crate::errors::{PlannerError, Result};

const TMP_SUFFIX: &str = "tmp";

/// User-tunable planner settings persisted as `config/config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory for the collection store. Defaults to `<base>/store`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "Config::default_log_filter")]
    pub log_filter: String,
    /// A paid bill keeps surfacing in the upcoming list for this many days.
    #[serde(default = "Config::default_recent_paid_days")]
    pub recent_paid_days: i64,
    #[serde(default = "Config::default_upcoming_horizon_days")]
    pub upcoming_horizon_days: i64,
    /// Category names seeded into a year the first time it is opened.
    #[serde(default = "Config::default_categories")]
    pub default_categories: Vec<String>,
    /// Seconds past midnight at which the rollover timer fires.
    #[serde(default = "Config::default_rollover_buffer_secs")]
    pub rollover_buffer_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_filter: Self::default_log_filter(),
            recent_paid_days: Self::default_recent_paid_days(),
            upcoming_horizon_days: Self::default_upcoming_horizon_days(),
            default_categories: Self::default_categories(),
            rollover_buffer_secs: Self::default_rollover_buffer_secs(),
        }
    }
}

impl Config {
    fn default_log_filter() -> String {
        "planner_core=info".into()
    }

    fn default_recent_paid_days() -> i64 {
        2
    }

    fn default_upcoming_horizon_days() -> i64 {
        30
    }

    fn default_categories() -> Vec<String> {
        [
            "Rent",
            "Utilities",
            "Food",
            "Transport",
            "Health",
            "Leisure",
            "Other",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    fn default_rollover_buffer_secs() -> u64 {
        2
    }

    /// Resolves the store directory relative to `base` when none is configured.
    pub fn store_dir(&self, base: &Path) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| store_dir_in(base))
    }

    pub fn validate(&self) -> Result<()> {
        if self.recent_paid_days < 0 {
            return Err(PlannerError::Config(
                "recentPaidDays must not be negative".into(),
            ));
        }
        if self.upcoming_horizon_days < 0 {
            return Err(PlannerError::Config(
                "upcomingHorizonDays must not be negative".into(),
            ));
        }
        if self
            .default_categories
            .iter()
            .any(|name| name.trim().is_empty())
        {
            return Err(PlannerError::Config(
                "defaultCategories must not contain blank names".into(),
            ));
        }
        Ok(())
    }
}

/// Handles persistence for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        ensure_dir(&config_dir_in(&base))?;
        let path = config_file_in(&base);
        Ok(Self { base, path })
    }

    pub fn load(&self) -> Result<Config> {
        let config = if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data)?
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
