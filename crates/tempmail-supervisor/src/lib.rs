//! TempMail process supervisor.
//!
//! Launches the temp-mail API, the Telegram bot, and (optionally) the
//! keep-alive server as sibling child processes, relays their output lines
//! tagged with the service name, and watches for exits. Death is terminal
//! per service unless that service opts into an explicit restart policy;
//! when the last child is gone, the supervisor exits.
//!
//! On SIGINT/SIGTERM every live child gets a graceful terminate, a bounded
//! wait, and a forced kill if it overstays. The supervisor does not exit
//! until every child has been reaped.

mod backoff;

pub mod config;
pub mod error;
pub mod service;
pub mod supervisor;

pub use config::{Cli, SupervisorConfig};
pub use error::{SupervisorError, SupervisorResult};
pub use service::{RestartPolicy, ServiceSpec, ServiceState};
pub use supervisor::Supervisor;
