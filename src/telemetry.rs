use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::{LogFormat, LoggingSettings};

/// Initialize structured logging for the run.
///
/// `RUST_LOG` takes precedence over the configured level when set.
pub fn init_telemetry(settings: &LoggingSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))?;

    let registry = tracing_subscriber::registry().with(filter);
    match settings.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()?,
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()?,
    }

    tracing::debug!("Janitor telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking the records of one run
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering a whole janitor invocation
pub fn create_run_span(correlation_id: &str) -> tracing::Span {
    tracing::info_span!("janitor_run", correlation.id = correlation_id)
}

/// Span for the decommissioning of one StatefulSet
pub fn create_workload_span(namespace: &str, name: &str) -> tracing::Span {
    tracing::info_span!("decommission_workload", namespace = namespace, workload = name)
}
