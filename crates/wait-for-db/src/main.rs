use std::path::PathBuf;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wait_for_db_core::{Poller, WaitCfg, CONFIG_FILE_VAR};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_file = std::env::var(CONFIG_FILE_VAR).ok().map(PathBuf::from);
    let cfg = WaitCfg::load(config_file).context("invalid configuration")?;

    let outcome = Poller::from_config(&cfg).wait().await;
    info!("Ready after {} attempt(s)", outcome.attempts);

    Ok(())
}

fn env_filter() -> EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("{}=info,wait_for_db_core=info", env!("CARGO_CRATE_NAME")).into()
    })
}
