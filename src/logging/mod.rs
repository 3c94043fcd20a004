pub mod config;
mod filters;
mod formatter;
pub mod handle;

pub use config::{LogFormat, LoggingConfig};
pub use filters::build_filter_from_config;
pub use formatter::build_formatter_from_config;
pub use handle::LoggingHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes console logging from `config`.
///
/// Installs the global subscriber; fails if one is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<LoggingHandle, Box<dyn std::error::Error>> {
    config.validate()?;

    let env_filter = filters::build_filter_from_config(&config);

    let (layer, guard) = if config.non_blocking {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
        (formatter::build_formatter_from_config(&config, writer), Some(guard))
    } else {
        (formatter::build_formatter_from_config(&config, std::io::stdout), None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = %config.level,
        format = %config.format,
        non_blocking = config.non_blocking,
        "Logging system initialized"
    );

    Ok(LoggingHandle::new(guard))
}
