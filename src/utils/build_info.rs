//! Version stamp printed by `planner_cli version` and logged at startup.

use std::fmt;

/// Package version plus the commit and date `build.rs` recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildStamp {
    pub version: &'static str,
    /// Short hash, suffixed `-dirty` when the tree had local changes.
    pub commit: &'static str,
    pub built_on: &'static str,
}

pub const STAMP: BuildStamp = BuildStamp {
    version: env!("CARGO_PKG_VERSION"),
    commit: or_unknown(option_env!("PLANNER_COMMIT")),
    built_on: or_unknown(option_env!("PLANNER_BUILD_DATE")),
};

const fn or_unknown(value: Option<&'static str>) -> &'static str {
    match value {
        Some(value) => value,
        None => "unknown",
    }
}

impl fmt::Display for BuildStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "planner_core {} ({}, built {})",
            self.version, self.commit, self.built_on
        )
    }
}
