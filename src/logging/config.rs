use std::{fmt, str::FromStr};

use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

use crate::config::ENV_PREFIX;

/// Output format of the console layer.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    #[default]
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default level (`trace`, `debug`, `info`, `warn`, `error`).
    #[serde(default = "default_level")]
    pub level: String,
    /// Extra `EnvFilter` directives appended after the level, e.g.
    /// `"eventdispatch=trace"`.
    #[serde(default)]
    pub directives: Option<String>,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default = "default_true")]
    pub with_ansi: bool,
    #[serde(default = "default_true")]
    pub with_target: bool,
    #[serde(default)]
    pub with_thread_ids: bool,
    /// Write through a background worker (`tracing-appender`).
    #[serde(default = "default_true")]
    pub non_blocking: bool,
}

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl LoggingConfig {
    /// Defaults overridden by `EVDISPATCH_LOG_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let cfg = Config::builder()
            .set_default("level", default_level())?
            .set_default("format", "compact")?
            .add_source(
                Environment::with_prefix(&format!("{ENV_PREFIX}_LOG")).try_parsing(true),
            )
            .build()?;

        cfg.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        let level = self.level.to_ascii_lowercase();
        if !LEVELS.contains(&level.as_str()) {
            return Err(format!(
                "invalid log level '{}', expected one of {}",
                self.level,
                LEVELS.join(", ")
            ));
        }
        Ok(())
    }

    /// Directive string handed to `EnvFilter` when `RUST_LOG` is not set.
    pub fn build_filter_directive(&self) -> String {
        let level = self.level.to_ascii_lowercase();
        match self.directives.as_deref().map(str::trim) {
            Some(extra) if !extra.is_empty() => format!("{level},{extra}"),
            _ => level,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            directives: None,
            format: LogFormat::default(),
            with_ansi: true,
            with_target: true,
            with_thread_ids: false,
            non_blocking: true,
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        };
        f.write_str(s)
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
