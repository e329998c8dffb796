use tracing::warn;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
/// If a subscriber is already installed it is kept and the failure is logged
/// through it.
pub fn init_logging(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let subscriber = tracing_subscriber::registry().with(filter);

    if settings.format == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true);
        if let Err(err) = subscriber.with(fmt_layer).try_init() {
            warn!(error = %err, "logging already initialized");
        }
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(false)
            .with_line_number(false);
        if let Err(err) = subscriber.with(fmt_layer).try_init() {
            warn!(error = %err, "logging already initialized");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_keeps_first_subscriber() {
        let settings = LoggingSettings::default();
        init_logging(&settings);
        init_logging(&LoggingSettings {
            format: "json".to_string(),
            ..settings
        });
        tracing::info!("still logging");
    }
}
