use std::path::PathBuf;
use std::time::Duration;

/// Optional knobs for a [`Spawner`](crate::Spawner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnConfig {
    /// Executable to launch instead of the current one
    pub program: Option<PathBuf>,
    /// Pass the parent's environment through to the child
    pub inherit_env: bool,
    /// Kill the child if it has not exited this long into `wait`
    pub wait_timeout_ms: Option<u64>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            program: None,
            inherit_env: true,
            wait_timeout_ms: None,
        }
    }
}

impl SpawnConfig {
    /// Run `program` instead of the current executable
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Set whether the child inherits the parent's environment
    pub fn with_inherit_env(mut self, inherit: bool) -> Self {
        self.inherit_env = inherit;
        self
    }

    /// Bound how long `wait` may block.
    ///
    /// Durations beyond `u64::MAX` milliseconds saturate.
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_ms.map(Duration::from_millis)
    }
}
