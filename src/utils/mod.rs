pub mod build_info;

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Default directive when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "planner_core=info";

/// Initializes the global tracing subscriber. `RUST_LOG` wins over the
/// configured `filter`; an unparseable filter falls back to the default.
pub fn init_tracing(filter: &str) {
    TRACING_INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| configured_filter(filter));
        // A subscriber installed by the host (e.g. a test harness) takes precedence.
        let _ = fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

fn configured_filter(filter: &str) -> EnvFilter {
    EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter `{filter}` ({err}); using {DEFAULT_LOG_FILTER}");
        EnvFilter::new(DEFAULT_LOG_FILTER)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_filter_falls_back() {
        assert_eq!(configured_filter("planner_core=loud").to_string(), DEFAULT_LOG_FILTER);
        assert_eq!(
            configured_filter("planner_core=debug").to_string(),
            "planner_core=debug"
        );
        init_tracing("planner_core=debug");
    }
}
