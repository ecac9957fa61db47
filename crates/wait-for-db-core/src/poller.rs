use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::{Probe, TcpProbe, Target, WaitCfg};

/// Polls a [`Target`] until a [`Probe`] succeeds against it.
///
/// Attempts run one at a time: each is bounded by the connect timeout and
/// followed, on failure, by a fixed retry interval. There is no attempt limit
/// and no overall deadline.
pub struct Poller<P: Probe> {
    target: Target,
    probe: P,
    connect_timeout: Duration,
    retry_interval: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaitOutcome {
    pub attempts: u64,
    pub elapsed: Duration,
}

impl Poller<TcpProbe> {
    pub fn from_config(cfg: &WaitCfg) -> Self {
        Poller::new(cfg.target(), TcpProbe)
            .with_connect_timeout(cfg.connect_timeout())
            .with_retry_interval(cfg.retry_interval())
    }
}

impl<P: Probe> Poller<P> {
    pub fn new(target: Target, probe: P) -> Self {
        Self {
            target,
            probe,
            connect_timeout: Duration::from_millis(crate::default_connect_timeout_ms()),
            retry_interval: Duration::from_millis(crate::default_retry_interval_ms()),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub async fn wait(&self) -> WaitOutcome {
        info!("Waiting for database at {}...", self.target);

        let started = Instant::now();
        let mut attempts = 0;
        loop {
            attempts += 1;

            match self.probe.probe(&self.target, self.connect_timeout).await {
                Ok(()) => {
                    let outcome = WaitOutcome {
                        attempts,
                        elapsed: started.elapsed(),
                    };
                    info!(
                        attempts = outcome.attempts,
                        elapsed = ?outcome.elapsed,
                        "Database at {} is up",
                        self.target
                    );
                    return outcome;
                }
                Err(e) => debug!(attempt = attempts, "{} not ready: {}", self.target, e),
            }

            sleep(self.retry_interval).await;
        }
    }
}
