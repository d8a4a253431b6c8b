//! Tracing subscriber bootstrap.

use anyhow::anyhow;
use bookshelf_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` overrides the configured filter.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = filter_for(settings)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    installed.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    tracing::info!(
        target: "bookshelf-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );
    Ok(())
}

fn filter_for(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    resolve_filter(from_env.as_deref(), &settings.filter)
}

/// `RUST_LOG` wins when it parses; otherwise the configured filter must.
fn resolve_filter(from_env: Option<&str>, configured: &str) -> anyhow::Result<EnvFilter> {
    if let Some(filter) = from_env.and_then(|directives| EnvFilter::try_new(directives).ok()) {
        return Ok(filter);
    }
    EnvFilter::try_new(configured).map_err(|e| anyhow!("invalid log filter '{configured}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    const BAD_FILTER: &str = "info,bookshelf=loudest";

    #[test]
    fn default_filter_parses() {
        let filter = resolve_filter(None, &TelemetrySettings::default().filter).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn bad_configured_filter_is_rejected() {
        let err = resolve_filter(None, BAD_FILTER).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("invalid log filter 'info,bookshelf=loudest'"));
    }

    #[test]
    fn rust_log_overrides_configured_filter() {
        let filter = resolve_filter(Some("debug"), BAD_FILTER).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn unparseable_rust_log_falls_back_to_configured_filter() {
        let filter = resolve_filter(Some("bookshelf=loudest"), "warn").unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }
}
