use std::{fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use bon::Builder;
use config::{Config, Environment, File, Map};
use serde::{de, Deserialize, Deserializer};
use thiserror::Error;

use crate::Target;

/// Prefix of the environment variables read by [`WaitCfg::load`], e.g. `DB_HOST`.
pub const ENV_PREFIX: &str = "DB";

/// Names an optional configuration file layered below the environment.
pub const CONFIG_FILE_VAR: &str = "WAIT_FOR_DB_CONFIG_FILE";

#[derive(Deserialize, Clone, Debug, PartialEq, Builder)]
pub struct WaitCfg {
    #[builder(into)]
    pub host: String,
    #[serde(deserialize_with = "strict_number")]
    pub port: u16,
    #[serde(
        default = "default_connect_timeout_ms",
        deserialize_with = "strict_number"
    )]
    #[builder(default = default_connect_timeout_ms())]
    pub connect_timeout_ms: u64,
    #[serde(
        default = "default_retry_interval_ms",
        deserialize_with = "strict_number"
    )]
    #[builder(default = default_retry_interval_ms())]
    pub retry_interval_ms: u64,
}

pub fn default_connect_timeout_ms() -> u64 {
    2_000
}

pub fn default_retry_interval_ms() -> u64 {
    500
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(u64),
    Text(String),
}

/// Integers from files, decimal strings from the environment. Boolean-like
/// strings such as "yes" or "on" are rejected rather than read as 1.
fn strict_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64> + FromStr,
    <T as FromStr>::Err: Display,
{
    match RawNumber::deserialize(deserializer)? {
        RawNumber::Int(n) => {
            T::try_from(n).map_err(|_| de::Error::custom(format!("{n} is out of range")))
        }
        RawNumber::Text(s) => s
            .trim()
            .parse()
            .map_err(|e| de::Error::custom(format!("{s:?} is not a valid number: {e}"))),
    }
}

impl WaitCfg {
    /// Loads the configuration from `file` (if any) and the process environment.
    pub fn load(file: Option<PathBuf>) -> Result<WaitCfg, ConfigError> {
        Self::load_with_env(file, None)
    }

    /// Same as [`WaitCfg::load`], with `env` standing in for the process
    /// environment when given.
    pub fn load_with_env(
        file: Option<PathBuf>,
        env: Option<Map<String, String>>,
    ) -> Result<WaitCfg, ConfigError> {
        let mut config_builder = Config::builder();
        if let Some(path) = file {
            config_builder = config_builder.add_source(File::from(path));
        }

        let cfg: WaitCfg = config_builder
            .add_source(Environment::with_prefix(ENV_PREFIX).source(env))
            .build()?
            .try_deserialize()?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::ZeroDuration("connect_timeout_ms"));
        }
        if self.retry_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration("retry_interval_ms"));
        }
        Ok(())
    }

    pub fn target(&self) -> Target {
        Target::new(self.host.trim(), self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("DB_HOST must not be empty")]
    EmptyHost,
    #[error("DB_PORT must be between 1 and 65535")]
    InvalidPort,
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}
