//! Kept in its own test binary so no concurrently running test opens
//! descriptors while they are being counted.
#![cfg(target_os = "linux")]

use std::{net::Ipv4Addr, time::Duration};

use tokio::net::TcpListener;
use wait_for_db_core::{Probe, Target, TcpProbe};

const ATTEMPTS: usize = 50;
const TIMEOUT: Duration = Duration::from_secs(2);

fn open_descriptors() -> usize {
    std::fs::read_dir("/proc/self/fd").unwrap().count()
}

#[tokio::test]
async fn attempts_release_their_sockets() {
    let closed = {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        Target::new("127.0.0.1", listener.local_addr().unwrap().port())
    };
    // pending connections stay in the backlog and never become descriptors here
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let open = Target::new("127.0.0.1", listener.local_addr().unwrap().port());

    let before = open_descriptors();

    for _ in 0..ATTEMPTS {
        assert!(TcpProbe.probe(&closed, TIMEOUT).await.is_err());
    }
    for _ in 0..ATTEMPTS {
        assert!(TcpProbe.probe(&open, TIMEOUT).await.is_ok());
    }

    assert_eq!(open_descriptors(), before);
}
