use std::{io, net::SocketAddr, time::Duration};

use async_trait::async_trait;
use thiserror::Error;
use tokio::net::{lookup_host, TcpStream};
use tracing::trace;

use crate::Target;

#[cfg(test)]
use mockall::automock;

/// A single readiness check against a [`Target`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, target: &Target, timeout: Duration) -> Result<(), ProbeError>;
}

/// Checks that the target accepts a TCP connection. The connection is closed
/// as soon as it is established.
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpProbe;

#[async_trait]
impl Probe for TcpProbe {
    async fn probe(&self, target: &Target, timeout: Duration) -> Result<(), ProbeError> {
        let addrs = lookup_host((target.host.as_str(), target.port))
            .await
            .map_err(|source| ProbeError::Resolve {
                target: target.to_string(),
                source,
            })?;

        let mut last_error = None;
        for addr in addrs {
            match connect(addr, timeout).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    trace!("Connection to {} failed: {}", addr, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ProbeError::NoAddress(target.to_string())))
    }
}

async fn connect(addr: SocketAddr, timeout: Duration) -> Result<(), ProbeError> {
    let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| ProbeError::Timeout { addr, timeout })?
        .map_err(|source| ProbeError::Connect { addr, source })?;

    drop(stream);
    Ok(())
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to resolve {target}: {source}")]
    Resolve {
        target: String,
        #[source]
        source: io::Error,
    },
    #[error("no address found for {0}")]
    NoAddress(String),
    #[error("connection to {addr} failed: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("connection to {addr} timed out after {timeout:?}")]
    Timeout { addr: SocketAddr, timeout: Duration },
}
