//! Service definitions: what to run and what to do when it dies.

use std::fmt;

/// What the supervisor does when a service exits on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartPolicy {
    /// Death is terminal: the service is removed from the live set and
    /// never respawned.
    #[default]
    Never,
    /// Respawn after a failed exit, with full-jitter exponential backoff,
    /// up to `max_attempts` times.
    OnFailure {
        /// Maximum respawn attempts before giving up.
        max_attempts: u32,
        /// Base backoff delay in milliseconds.
        backoff_base_ms: u64,
        /// Backoff cap in milliseconds.
        backoff_max_ms: u64,
    },
}

/// Lifecycle of one supervised service.
///
/// `NotStarted → Running → (Exited | Terminating → Terminated)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceState {
    /// Configured but not yet spawned.
    #[default]
    NotStarted,
    /// Child process is alive.
    Running,
    /// Child exited on its own, with the captured exit code when available.
    Exited(Option<i32>),
    /// Graceful terminate sent; waiting for the child to leave.
    Terminating,
    /// Child reaped during shutdown.
    Terminated,
}

impl ServiceState {
    /// Whether the child process may still be alive in this state.
    #[must_use]
    pub fn is_live(self) -> bool {
        matches!(self, Self::Running | Self::Terminating)
    }
}

/// One configured service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    /// Short name used as the log prefix (`api`, `bot`, `keepalive`).
    pub name: String,
    /// Program to execute.
    pub program: String,
    /// Program arguments.
    pub args: Vec<String>,
    /// What to do when the child dies.
    pub restart: RestartPolicy,
}

impl ServiceSpec {
    /// Build a spec from a shell-ish command line, split on whitespace.
    ///
    /// Returns `None` for an empty command line.
    #[must_use]
    pub fn from_command_line(name: &str, command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next()?.to_string();
        Some(Self {
            name: name.to_string(),
            program,
            args: parts.map(str::to_string).collect(),
            restart: RestartPolicy::default(),
        })
    }

    /// The full command line, for logs.
    #[must_use]
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl fmt::Display for ServiceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.command_line())
    }
}
