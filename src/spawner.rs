//! Self-exec spawner
//!
//! A [`Spawner`] runs twice for one logical test session. In the test process
//! it relaunches the current executable with an identity token in the
//! environment and supervises it. In that relaunched process, the same call
//! sees the token, runs the entry point, and exits without returning.

use std::future::Future;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use nix::errno::Errno;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::config::SpawnConfig;
use crate::error::{Result, SpawnError};
use crate::signal;
use crate::token::{self, IdentityToken};

/// Exit status of a child whose entry point panicked
pub const PANIC_EXIT_CODE: i32 = 101;

type EntryPoint = Arc<dyn Fn() + Send + Sync + 'static>;

/// Runs an entry point either in-process or in a supervised copy of the current executable
pub struct Spawner {
    entry: EntryPoint,
    program: PathBuf,
    args: Vec<String>,
    token: IdentityToken,
    config: SpawnConfig,
    started: bool,
    child: Option<Child>,
    signal_task: Option<JoinHandle<()>>,
    signal_err: Arc<Mutex<Option<Errno>>>,
}

impl Spawner {
    /// Bind `entry` to a relaunch of the current executable with `args`.
    ///
    /// Pass the program's `main` logic as `entry`.
    pub fn new<F, I, S>(entry: F, args: I) -> Self
    where
        F: Fn() + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_config(entry, args, SpawnConfig::default())
    }

    /// Like [`Spawner::new`], with explicit configuration
    pub fn with_config<F, I, S>(entry: F, args: I, config: SpawnConfig) -> Self
    where
        F: Fn() + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let program = config.program.clone().unwrap_or_else(current_program);
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let token = IdentityToken::derive(&program, args.as_slice());

        Self {
            entry: Arc::new(entry),
            program,
            args,
            token,
            config,
            started: false,
            child: None,
            signal_task: None,
            signal_err: Arc::new(Mutex::new(None)),
        }
    }

    /// Identity token this spawner injects into its child
    pub fn token(&self) -> &IdentityToken {
        &self.token
    }

    /// Start the child without waiting for it to finish.
    ///
    /// If this process carries the spawner's token, the entry point runs here
    /// and the process exits; this call never returns in that case. If the
    /// process carries some other spawner's token, nothing is launched.
    ///
    /// Once `cancel` completes, SIGINT is sent to the child. Any delivery
    /// failure is reported by [`Spawner::wait`]. `cancel` must not complete
    /// before `start` has returned.
    pub async fn start<C>(&mut self, cancel: C) -> Result<()>
    where
        C: Future<Output = ()> + Send + 'static,
    {
        if self.token.is_present() {
            self.run_entry_point();
        }

        if token::is_spawned_child() {
            log::debug!(
                "Running inside another spawner's child, not launching {}",
                self.program.display()
            );
            return Ok(());
        }

        if self.started {
            return Err(SpawnError::AlreadyStarted);
        }

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        if !self.config.inherit_env {
            cmd.env_clear();
        }
        let (key, value) = self.token.env_pair();
        cmd.env(key, value);

        let child = cmd.spawn().map_err(SpawnError::Launch)?;
        self.started = true;

        match child.id() {
            Some(pid) => {
                log::info!("Started {} as pid {}", self.program.display(), pid);
                let slot = Arc::clone(&self.signal_err);
                self.signal_task = Some(tokio::spawn(async move {
                    cancel.await;
                    let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
                    if let Err(errno) = signal::send_interrupt(pid) {
                        log::warn!("Failed to interrupt child {}: {}", pid, errno);
                        *slot = Some(errno);
                    }
                }));
            }
            None => log::warn!(
                "Child {} exited before it could be supervised",
                self.program.display()
            ),
        }

        self.child = Some(child);
        Ok(())
    }

    /// Wait for the child to exit and release it.
    ///
    /// Returns an error if the child could not be waited on, exited non-zero
    /// or was killed by a signal. Otherwise returns any interrupt delivery
    /// error recorded after cancellation.
    ///
    /// Cancel safe: if the returned future is dropped before the child exits,
    /// the child stays supervised and `wait` can be called again.
    pub async fn wait(&mut self) -> Result<()> {
        let limit = self.config.wait_timeout();
        let child = self.child.as_mut().ok_or(SpawnError::NotStarted)?;

        let status = match limit {
            Some(limit) => match wait_with_timeout(child, limit).await {
                Ok(status) => status,
                Err(_) => {
                    log::warn!("Child did not exit within {:?}, killing it", limit);
                    let killed = child.kill().await;
                    self.child = None;
                    self.stop_signal_task();
                    killed.map_err(SpawnError::Wait)?;
                    return Err(SpawnError::Timeout(limit));
                }
            },
            None => child.wait().await,
        };

        // The pid is reaped now and may be reused.
        self.child = None;
        self.stop_signal_task();

        let status = status.map_err(SpawnError::Wait)?;
        log::info!("Child {} exited: {}", self.program.display(), status);
        if !status.success() {
            return Err(SpawnError::AbnormalExit(status));
        }

        let mut slot = self.signal_err.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.take() {
            Some(errno) => Err(SpawnError::Signal(errno.to_string())),
            None => Ok(()),
        }
    }

    fn run_entry_point(&self) -> ! {
        log::debug!("{} is set, running entry point", self.token.name());

        let entry = Arc::clone(&self.entry);
        let handle = std::thread::Builder::new()
            .name("spawn-entry".to_string())
            .spawn(move || entry());

        let code = match handle.map(|h| h.join()) {
            Ok(Ok(())) => 0,
            Ok(Err(_)) => {
                log::error!("Entry point panicked");
                PANIC_EXIT_CODE
            }
            Err(e) => {
                log::error!("Failed to start entry point thread: {}", e);
                1
            }
        };
        std::process::exit(code)
    }

    fn stop_signal_task(&mut self) {
        if let Some(task) = self.signal_task.take() {
            task.abort();
        }
    }
}

impl Drop for Spawner {
    fn drop(&mut self) {
        self.stop_signal_task();
    }
}

async fn wait_with_timeout(
    child: &mut Child,
    limit: Duration,
) -> std::result::Result<std::io::Result<ExitStatus>, tokio::time::error::Elapsed> {
    tokio::time::timeout(limit, child.wait()).await
}

fn current_program() -> PathBuf {
    std::env::current_exe()
        .ok()
        .or_else(|| std::env::args_os().next().map(PathBuf::from))
        .unwrap_or_default()
}
