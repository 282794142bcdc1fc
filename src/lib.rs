//! spawn - end-to-end testing by re-executing the test binary
//!
//! An integration test built with `harness = false` hands its program's main
//! logic to a [`Spawner`]. On the first run the spawner relaunches the test
//! binary as a child, and in that child the same call runs the main logic
//! instead of the tests. The parent talks to the child over its normal
//! interface, then cancels it with SIGINT and waits for a clean exit.
//!
//! ```no_run
//! use spawn::Spawner;
//! use tokio::sync::oneshot;
//!
//! fn server_main() {
//!     // the program under test
//! }
//!
//! # async fn run() -> spawn::Result<()> {
//! let mut spawner = Spawner::new(server_main, Vec::<String>::new());
//! let (cancel, cancelled) = oneshot::channel::<()>();
//! spawner.start(async move {
//!     let _ = cancelled.await;
//! }).await?;
//!
//! // ... exercise the server ...
//!
//! let _ = cancel.send(());
//! spawner.wait().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Only the spawner signals its child; there is no public way to interrupt
//! an arbitrary pid:
//!
//! ```compile_fail
//! spawn::signal::send_interrupt(1);
//! ```
//!
//! ```compile_fail
//! let _ = spawn::token::ENV_PREFIX;
//! ```

pub mod config;
pub mod error;
mod signal;
pub mod spawner;
pub mod token;

pub use config::SpawnConfig;
pub use error::{Result, SpawnError};
pub use spawner::Spawner;
pub use token::IdentityToken;
