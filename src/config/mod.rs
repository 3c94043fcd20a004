mod settings;

pub use settings::DispatcherConfig;

/// Prefix of every environment variable read by the configuration loaders.
pub const ENV_PREFIX: &str = "EVDISPATCH";
