//! Shared helpers for the self-exec integration tests.
//!
//! Each test binary is built with `harness = false`, so its `main` runs both
//! as the test driver and, relaunched, as the program under test.

#![allow(dead_code)]

use std::future::Future;
use std::time::Duration;

use eyre::{Result, bail};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

/// Log to stderr; stdout is shared between parent and child.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stderr)
        .try_init();
}

/// A cancellation future and the sender that fires it
pub fn cancellation() -> (oneshot::Sender<()>, impl Future<Output = ()> + Send + 'static) {
    let (tx, rx) = oneshot::channel::<()>();
    let cancelled = async move {
        let _ = rx.await;
    };
    (tx, cancelled)
}

/// Poll `port` on localhost until a TCP connection succeeds
pub async fn wait_for_port(port: u16, retries: u32, interval: Duration) -> Result<()> {
    for attempt in 0..=retries {
        match TcpStream::connect(("127.0.0.1", port)).await {
            Ok(_) => return Ok(()),
            Err(e) => log::debug!("Port {} not ready (attempt {}): {}", port, attempt, e),
        }
        if attempt < retries {
            tokio::time::sleep(interval).await;
        }
    }
    bail!("Port {} not reachable after {} retries", port, retries)
}

/// Run a named check and print a libtest-like status line
pub async fn check<F>(name: &str, test: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    match test.await {
        Ok(()) => {
            println!("test {} ... ok", name);
            Ok(())
        }
        Err(e) => {
            println!("test {} ... FAILED", name);
            Err(e)
        }
    }
}
