use std::path::Path;

use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use super::ENV_PREFIX;

/// Runtime knobs of an [`EventDispatcher`](crate::EventDispatcher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Label attached to every invocation span.
    #[serde(default = "default_name")]
    pub name: String,
    /// Wrap each handler invocation in a `debug` span.
    #[serde(default = "default_true")]
    pub trace_invocations: bool,
    /// Log a warning when a failed invocation's handle was dropped unawaited.
    #[serde(default = "default_true")]
    pub warn_unobserved: bool,
}

impl DispatcherConfig {
    /// Loads the configuration from defaults overridden by `EVDISPATCH_*`
    /// environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }

    /// Same as [`Self::load`], with a configuration file layered between the
    /// defaults and the environment.
    pub fn load_with_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::from(path.as_ref()).required(true))
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("name", default_name())?
            .set_default("trace_invocations", true)?
            .set_default("warn_unobserved", true)
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            trace_invocations: true,
            warn_unobserved: true,
        }
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX).try_parsing(true)
}

fn default_name() -> String {
    "dispatcher".to_string()
}

fn default_true() -> bool {
    true
}
