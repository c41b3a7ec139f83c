// 📝 Logging setup (tracing + RUST_LOG)

use tracing_subscriber::{
    fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const APP_TARGETS: [&str; 4] = ["estate_tracker", "estate_server", "estate", "tower_http"];

/// Directives used when `RUST_LOG` is unset: our targets at `info`
/// (`debug` when verbose), everything else at `warn`
fn default_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    let mut directives = vec!["warn".to_string()];
    directives.extend(APP_TARGETS.iter().map(|target| format!("{}={}", target, level)));
    directives.join(",")
}

/// `RUST_LOG` replaces the defaults entirely; an unparsable value falls back to them
fn build_filter(verbose: bool, rust_log: Option<String>) -> EnvFilter {
    rust_log
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directives(verbose)))
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init_logging(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok().filter(|v| !v.trim().is_empty());

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(build_filter(verbose, rust_log))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_verbose() {
        let quiet = build_filter(false, None).to_string();
        assert!(quiet.contains("estate_tracker=info"));
        assert!(quiet.contains("warn"));

        let loud = build_filter(true, None).to_string();
        assert!(loud.contains("estate_tracker=debug"));
        assert!(loud.contains("tower_http=debug"));
    }

    #[test]
    fn test_rust_log_replaces_defaults() {
        let filter = build_filter(false, Some("estate_tracker=trace".to_string())).to_string();
        assert!(filter.contains("estate_tracker=trace"));
        assert!(!filter.contains("estate_tracker=info"));
    }
}
