//! Stamps the commit and build date that `planner_cli version` prints.

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let commit = match git(&["rev-parse", "--short", "HEAD"]).filter(|hash| !hash.is_empty()) {
        Some(hash) if has_local_changes() => format!("{hash}-dirty"),
        Some(hash) => hash,
        None => "unknown".to_string(),
    };
    println!("cargo:rustc-env=PLANNER_COMMIT={commit}");

    let built_on = chrono::Utc::now().date_naive();
    println!("cargo:rustc-env=PLANNER_BUILD_DATE={built_on}");
}

fn has_local_changes() -> bool {
    git(&["status", "--porcelain"]).is_some_and(|changes| !changes.is_empty())
}

/// Trimmed stdout of a git command that succeeded.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|text| text.trim().to_string())
}
