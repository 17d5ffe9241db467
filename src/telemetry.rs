use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Error raised while installing the tracing subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{value}'")]
    Filter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("tracing subscriber could not be installed: {0}")]
    Install(Box<dyn std::error::Error + Send + Sync>),
}

/// Filter directives for the configured level. The HTTP client stack logs
/// every request at debug, which would drown out scoring-call diagnostics;
/// keep it at warn unless the operator opts in through RUST_LOG.
fn filter_directives(level: &str) -> String {
    format!("{level},hyper=warn,reqwest=warn")
}

/// Install the global subscriber; RUST_LOG wins over the configured level.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directives = filter_directives(&config.log_level);
            EnvFilter::try_new(&directives).map_err(|source| TelemetryError::Filter {
                value: directives,
                source,
            })?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Install)
}
