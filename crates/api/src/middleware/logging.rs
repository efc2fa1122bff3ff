//! Tracing subscriber setup.
//!
//! Output format follows configuration: structured JSON for deployments,
//! pretty output for local work. A `RUST_LOG` environment variable takes
//! precedence over the configured level.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Fallback filter built from the configured level. The chattiest
/// dependencies are pinned to warn so alert traffic stays readable at
/// debug levels.
fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "{level},sqlx=warn,hyper=warn,reqwest=warn,h2=warn"
    ))
}

/// Initializes the tracing subscriber once at startup.
pub fn init_logging(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(&config.level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.format == "json" {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_current_span(true)
                    .with_target(true),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(true),
            )
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_quiets_noisy_dependencies() {
        let rendered = default_filter("debug").to_string();
        assert!(rendered.contains("debug"));
        assert!(rendered.contains("sqlx=warn"));
        assert!(rendered.contains("reqwest=warn"));
    }
}
