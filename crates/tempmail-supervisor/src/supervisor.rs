//! Child-process supervision: spawn, relay output, poll for exits,
//! escalate on shutdown.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::backoff::Backoff;
use crate::error::{SupervisorError, SupervisorResult};
use crate::service::{RestartPolicy, ServiceSpec, ServiceState};

/// How often live children are polled for exit.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How long a child gets between graceful terminate and forced kill.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// How long to wait for a dead child's output relay to drain.
const RELAY_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// One live (or reaped) child process.
struct RunningService {
    spec: ServiceSpec,
    child: Child,
    state: ServiceState,
    /// Respawn attempts consumed so far.
    attempts: u32,
    /// Backoff state carried across respawns of this service.
    backoff: Option<Backoff>,
    /// Task draining the child's stdout/stderr into the log.
    relay: JoinHandle<()>,
}

/// Supervises the configured services until they are all gone or a
/// termination signal arrives.
pub struct Supervisor {
    specs: Vec<ServiceSpec>,
    services: Vec<RunningService>,
    poll_interval: Duration,
    shutdown_timeout: Duration,
    restarts: u32,
    shutdown_tx: broadcast::Sender<()>,
}

impl Supervisor {
    /// Create a supervisor for the given services. Nothing is spawned
    /// until [`start`](Self::start) or [`run`](Self::run).
    #[must_use]
    pub fn new(specs: Vec<ServiceSpec>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            specs,
            services: Vec::new(),
            poll_interval: POLL_INTERVAL,
            shutdown_timeout: SHUTDOWN_TIMEOUT,
            restarts: 0,
            shutdown_tx,
        }
    }

    /// Override the poll interval and shutdown timeout.
    #[must_use]
    pub fn with_timeouts(mut self, poll_interval: Duration, shutdown_timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.shutdown_timeout = shutdown_timeout;
        self
    }

    /// Spawn every configured service.
    ///
    /// A service that fails to spawn is logged and skipped so its siblings
    /// still come up.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::Config`] if no service could be spawned.
    pub async fn start(&mut self) -> SupervisorResult<()> {
        for spec in self.specs.clone() {
            match spawn_service(spec) {
                Ok(service) => self.services.push(service),
                Err(e) => warn!("{e}"),
            }
        }

        if self.services.is_empty() {
            return Err(SupervisorError::Config(
                "no services could be started".to_owned(),
            ));
        }
        Ok(())
    }

    /// Run until every child is gone or a termination signal arrives
    /// (SIGINT, SIGTERM, or a send on the [`shutdown_handle`](Self::shutdown_handle)).
    ///
    /// # Errors
    ///
    /// Returns an error if no service could be spawned at startup.
    pub async fn run(&mut self) -> SupervisorResult<()> {
        self.start().await?;

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut interval = tokio::time::interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Received interrupt");
                    break;
                }
                () = terminate_signal() => {
                    info!("Received terminate signal");
                    break;
                }
                _ = shutdown_rx.recv() => {
                    info!("Received shutdown command");
                    break;
                }
                _ = interval.tick() => {
                    self.reap_exited().await;
                    if self.live_count() == 0 {
                        info!("All services have stopped");
                        return Ok(());
                    }
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Sender half of the shutdown channel. Sending on it makes
    /// [`run`](Self::run) stop as if a termination signal had arrived.
    #[must_use]
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Number of children that may still be alive.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.services
            .iter()
            .filter(|s| s.state.is_live())
            .count()
    }

    /// Current state per service, for monitoring.
    #[must_use]
    pub fn states(&self) -> Vec<(String, ServiceState)> {
        self.services
            .iter()
            .map(|s| (s.spec.name.clone(), s.state))
            .collect()
    }

    /// OS pids of the live children.
    #[must_use]
    pub fn pids(&self) -> Vec<u32> {
        self.services
            .iter()
            .filter(|s| s.state.is_live())
            .filter_map(|s| s.child.id())
            .collect()
    }

    /// Remove children that exited on their own, applying each service's
    /// restart policy.
    async fn reap_exited(&mut self) {
        let mut live = Vec::new();
        let mut exited = Vec::new();

        for mut service in std::mem::take(&mut self.services) {
            match service.child.try_wait() {
                Ok(Some(status)) => {
                    service.state = ServiceState::Exited(status.code());
                    exited.push((service, status));
                },
                Ok(None) => live.push(service),
                Err(e) => {
                    warn!(service = %service.spec.name, "Failed to poll service: {e}");
                    live.push(service);
                },
            }
        }
        self.services = live;

        for (mut service, status) in exited {
            warn!(
                service = %service.spec.name,
                exit_code = ?status.code(),
                "Service exited unexpectedly"
            );
            let _ = timeout(RELAY_DRAIN_TIMEOUT, &mut service.relay).await;
            self.apply_restart_policy(service, status.success()).await;
        }
    }

    /// Respawn a dead service when its policy allows it.
    async fn apply_restart_policy(&mut self, service: RunningService, exited_cleanly: bool) {
        let RestartPolicy::OnFailure {
            max_attempts,
            backoff_base_ms,
            backoff_max_ms,
        } = service.spec.restart
        else {
            return;
        };

        if exited_cleanly {
            return;
        }
        if service.attempts >= max_attempts {
            warn!(
                service = %service.spec.name,
                attempts = service.attempts,
                "Restart attempts exhausted"
            );
            return;
        }

        let mut backoff = service
            .backoff
            .unwrap_or_else(|| Backoff::new(backoff_base_ms, backoff_max_ms));
        let delay = backoff.next_delay();
        info!(service = %service.spec.name, delay = ?delay, "Restarting after backoff");
        tokio::time::sleep(delay).await;

        match spawn_service(service.spec) {
            Ok(mut respawned) => {
                respawned.attempts = service.attempts.saturating_add(1);
                respawned.backoff = Some(backoff);
                self.restarts = self.restarts.saturating_add(1);
                self.services.push(respawned);
            },
            Err(e) => warn!("Respawn failed: {e}"),
        }
    }

    /// Terminate every live child: graceful terminate, bounded wait, then
    /// forced kill. Returns only after all children have been reaped.
    pub async fn shutdown(&mut self) {
        if self.live_count() == 0 {
            return;
        }
        info!("Shutting down all services...");

        for service in &mut self.services {
            if !service.state.is_live() {
                continue;
            }
            service.state = ServiceState::Terminating;
            info!(service = %service.spec.name, "Sending graceful terminate");
            send_terminate(&mut service.child);
        }

        for service in &mut self.services {
            if service.state != ServiceState::Terminating {
                continue;
            }
            let name = service.spec.name.clone();
            match timeout(self.shutdown_timeout, service.child.wait()).await {
                Ok(Ok(status)) => {
                    info!(service = %name, exit_code = ?status.code(), "Service stopped gracefully");
                },
                Ok(Err(e)) => {
                    warn!(service = %name, "Failed to wait for service: {e}");
                },
                Err(_) => {
                    warn!(service = %name, "Termination timeout — force killing");
                    if let Err(e) = service.child.kill().await {
                        warn!(service = %name, "Failed to kill service: {e}");
                    }
                },
            }
            service.state = ServiceState::Terminated;
            let _ = timeout(RELAY_DRAIN_TIMEOUT, &mut service.relay).await;
        }
    }
}

/// Spawn one service with piped output and a line-relay task.
fn spawn_service(spec: ServiceSpec) -> SupervisorResult<RunningService> {
    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|source| SupervisorError::Spawn {
        service: spec.name.clone(),
        source,
    })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let relay = tokio::spawn(relay_output(spec.name.clone(), stdout, stderr));

    info!(service = %spec.name, pid = ?child.id(), "Service started");
    Ok(RunningService {
        spec,
        child,
        state: ServiceState::Running,
        attempts: 0,
        backoff: None,
        relay,
    })
}

/// Drain both output streams of a child, logging each line tagged with the
/// service name. Keeping the pipes drained prevents the child from
/// blocking on a full buffer; stream EOF marks process exit.
async fn relay_output(name: String, stdout: Option<ChildStdout>, stderr: Option<ChildStderr>) {
    let out = async {
        if let Some(stream) = stdout {
            relay_stream(&name, stream).await;
        }
    };
    let err = async {
        if let Some(stream) = stderr {
            relay_stream(&name, stream).await;
        }
    };
    tokio::join!(out, err);
    debug!(service = %name, "Output streams closed");
}

/// Relay one stream line-by-line until EOF.
async fn relay_stream<R: AsyncRead + Unpin>(name: &str, stream: R) {
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim_end();
                if !line.is_empty() {
                    info!(service = %name, "{line}");
                }
            },
            Ok(None) => break,
            Err(e) => {
                warn!(service = %name, "Output relay error: {e}");
                break;
            },
        }
    }
}

/// Send the platform's graceful-terminate signal to a child.
#[cfg(unix)]
fn send_terminate(child: &mut Child) {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    if let Some(id) = child.id()
        && let Ok(pid) = i32::try_from(id)
    {
        if let Err(e) = kill(Pid::from_raw(pid), Signal::SIGTERM) {
            warn!("Failed to send SIGTERM to pid {pid}: {e}");
        }
    }
}

/// Windows has no SIGTERM equivalent for arbitrary processes; go straight
/// to the forced kill.
#[cfg(not(unix))]
fn send_terminate(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        warn!("Failed to kill child: {e}");
    }
}

/// Resolve when the process receives SIGTERM. Pends forever where that
/// signal does not exist.
async fn terminate_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            },
        }
    }
    #[cfg(not(unix))]
    std::future::pending::<()>().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn spec(name: &str, program: &str, args: &[&str]) -> ServiceSpec {
        ServiceSpec {
            name: name.to_string(),
            program: program.to_string(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
            restart: RestartPolicy::Never,
        }
    }

    fn sh(name: &str, script: &str) -> ServiceSpec {
        spec(name, "sh", &["-c", script])
    }

    /// Poll `reap_exited` until no live children remain or `max` iterations
    /// have elapsed.
    async fn reap_until_empty(sup: &mut Supervisor, max: u32) {
        for _ in 0..max {
            sup.reap_exited().await;
            if sup.live_count() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("services never drained: {:?}", sup.states());
    }

    #[tokio::test]
    async fn start_spawns_all_services() {
        let mut sup = Supervisor::new(vec![
            sh("a", "sleep 5"),
            sh("b", "sleep 5"),
        ])
        .with_timeouts(Duration::from_millis(50), Duration::from_secs(5));

        sup.start().await.unwrap();
        assert_eq!(sup.live_count(), 2);
        assert_eq!(sup.pids().len(), 2);
        assert!(sup.states().iter().all(|(_, s)| *s == ServiceState::Running));

        sup.shutdown().await;
    }

    #[tokio::test]
    async fn exited_service_is_detected_and_removed() {
        let mut sup = Supervisor::new(vec![sh("oneshot", "exit 3")])
            .with_timeouts(Duration::from_millis(50), Duration::from_secs(5));

        sup.start().await.unwrap();
        reap_until_empty(&mut sup, 100).await;
        assert!(sup.states().is_empty());
        assert_eq!(sup.restarts, 0);
    }

    #[tokio::test]
    async fn failed_spawn_is_skipped() {
        let mut sup = Supervisor::new(vec![
            spec("ghost", "tempmail-no-such-binary", &[]),
            sh("real", "sleep 5"),
        ])
        .with_timeouts(Duration::from_millis(50), Duration::from_secs(5));

        sup.start().await.unwrap();
        assert_eq!(sup.live_count(), 1);

        sup.shutdown().await;
    }

    #[tokio::test]
    async fn all_spawns_failing_is_fatal() {
        let mut sup = Supervisor::new(vec![spec("ghost", "tempmail-no-such-binary", &[])]);
        let err = sup.start().await.unwrap_err();
        assert!(matches!(err, SupervisorError::Config(_)));
    }

    #[tokio::test]
    async fn graceful_shutdown_is_prompt() {
        let mut sup = Supervisor::new(vec![sh("sleeper", "sleep 30")])
            .with_timeouts(Duration::from_millis(50), Duration::from_secs(5));

        sup.start().await.unwrap();
        let started = Instant::now();
        sup.shutdown().await;

        // `sleep` dies on SIGTERM, well before the 5 s escalation.
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(sup.live_count(), 0);
        assert!(
            sup.states()
                .iter()
                .all(|(_, s)| *s == ServiceState::Terminated)
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stubborn_child_is_force_killed_after_timeout() {
        let mut sup = Supervisor::new(vec![sh(
            "stubborn",
            "trap '' TERM; while :; do sleep 0.2; done",
        )])
        .with_timeouts(Duration::from_millis(50), Duration::from_millis(300));

        sup.start().await.unwrap();
        let pids = sup.pids();
        assert_eq!(pids.len(), 1);

        let started = Instant::now();
        sup.shutdown().await;
        let elapsed = started.elapsed();

        // The graceful wait must run its full course before the kill.
        assert!(elapsed >= Duration::from_millis(300));
        assert_eq!(sup.live_count(), 0);

        // The child must actually be gone (reaped, not just signalled).
        let pid = nix::unistd::Pid::from_raw(i32::try_from(pids[0]).unwrap());
        assert!(nix::sys::signal::kill(pid, None).is_err());
    }

    #[tokio::test]
    async fn restart_policy_respawns_failed_service() {
        let mut failing = sh("flaky", "exit 1");
        failing.restart = RestartPolicy::OnFailure {
            max_attempts: 2,
            backoff_base_ms: 0,
            backoff_max_ms: 0,
        };
        let mut sup = Supervisor::new(vec![failing])
            .with_timeouts(Duration::from_millis(50), Duration::from_secs(5));

        sup.start().await.unwrap();
        reap_until_empty(&mut sup, 200).await;

        // Initial spawn plus two restart attempts, then the policy gives up.
        assert_eq!(sup.restarts, 2);
    }

    #[tokio::test]
    async fn restart_policy_never_does_not_respawn() {
        let mut sup = Supervisor::new(vec![sh("oneshot", "exit 1")])
            .with_timeouts(Duration::from_millis(50), Duration::from_secs(5));

        sup.start().await.unwrap();
        reap_until_empty(&mut sup, 100).await;
        assert_eq!(sup.restarts, 0);
    }

    #[tokio::test]
    async fn clean_exit_is_not_restarted_by_on_failure() {
        let mut clean = sh("clean", "exit 0");
        clean.restart = RestartPolicy::OnFailure {
            max_attempts: 5,
            backoff_base_ms: 0,
            backoff_max_ms: 0,
        };
        let mut sup = Supervisor::new(vec![clean])
            .with_timeouts(Duration::from_millis(50), Duration::from_secs(5));

        sup.start().await.unwrap();
        reap_until_empty(&mut sup, 100).await;
        assert_eq!(sup.restarts, 0);
    }

    #[tokio::test]
    async fn shutdown_handle_ends_run() {
        let mut sup = Supervisor::new(vec![sh("sleeper", "sleep 30")])
            .with_timeouts(Duration::from_millis(50), Duration::from_secs(5));
        let handle = sup.shutdown_handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            let _ = handle.send(());
        });

        let result = timeout(Duration::from_secs(10), sup.run()).await;
        assert!(result.expect("run timed out").is_ok());
        assert_eq!(sup.live_count(), 0);
    }

    #[tokio::test]
    async fn run_returns_when_all_services_die() {
        let mut sup = Supervisor::new(vec![sh("oneshot", "exit 0")])
            .with_timeouts(Duration::from_millis(50), Duration::from_secs(5));

        let result = timeout(Duration::from_secs(10), sup.run()).await;
        assert!(result.expect("run timed out").is_ok());
    }
}
