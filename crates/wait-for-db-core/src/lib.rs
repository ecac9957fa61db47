mod config;
pub mod poller;
pub mod probe;
mod target;

pub use crate::config::{
    default_connect_timeout_ms, default_retry_interval_ms, ConfigError, WaitCfg,
    CONFIG_FILE_VAR, ENV_PREFIX,
};
pub use poller::{Poller, WaitOutcome};
pub use probe::{Probe, ProbeError, TcpProbe};
pub use target::Target;
