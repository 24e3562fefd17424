//! Process termination service.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::adapters::{SystemConnections, SystemProcesses};
use crate::domain::{
    KillFailure, KillOutcome, KillSignal, Liveness, ProcessDescriptor, TerminationPath,
};
use crate::error::ProbeError;
use crate::ports::{ConnectionSource, ProcessTable};

/// Grace period after SIGTERM before escalating.
const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(3);

/// Wait after SIGKILL before giving up.
const FORCED_TIMEOUT: Duration = Duration::from_secs(2);

/// How often liveness is re-checked while waiting.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Timing of the two-phase termination protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminationPolicy {
    /// How long to wait after the first signal.
    pub graceful_timeout: Duration,
    /// How long to wait after escalating to SIGKILL.
    pub forced_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self {
            graceful_timeout: GRACEFUL_TIMEOUT,
            forced_timeout: FORCED_TIMEOUT,
            poll_interval: POLL_INTERVAL,
        }
    }
}

/// Application service that terminates processes by PID.
///
/// Strategy:
/// 1. Resolve the process; refuse invalid or unknown PIDs
/// 2. Send SIGTERM (or SIGKILL when forced) and wait up to 3 seconds
/// 3. If a graceful request timed out, send SIGKILL and wait up to 2 more
///
/// Exit is observed, not assumed: a process only counts as terminated
/// once it is gone or defunct.
pub struct ProcessTerminator<P: ProcessTable, C: ConnectionSource> {
    processes: P,
    connections: C,
    policy: TerminationPolicy,
}

impl ProcessTerminator<SystemProcesses, SystemConnections> {
    /// Terminator acting on the live OS.
    pub fn system() -> Self {
        Self::new(SystemProcesses::new(), SystemConnections::new())
    }
}

impl<P: ProcessTable, C: ConnectionSource> ProcessTerminator<P, C> {
    pub fn new(processes: P, connections: C) -> Self {
        Self {
            processes,
            connections,
            policy: TerminationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: TerminationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> TerminationPolicy {
        self.policy
    }

    /// Whether `pid` exists and has not exited.
    pub fn is_running(&self, pid: u32) -> bool {
        self.processes.liveness(pid).is_running()
    }

    /// Details about `pid`, or `None` if it does not exist or cannot be read.
    pub async fn describe(&self, pid: u32) -> Option<ProcessDescriptor> {
        let mut descriptor = match self.processes.describe(pid) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                debug!(pid = pid, error = %e, "Could not describe process");
                return None;
            }
        };

        descriptor.open_connections = match self.connections.connections_of(pid).await {
            Ok(connections) => connections.len(),
            Err(e) => {
                debug!(pid = pid, error = %e, "Could not count open connections");
                0
            }
        };

        Some(descriptor)
    }

    /// Terminate `pid`, gracefully unless `force` is set.
    ///
    /// Takes a signed PID so callers can pass user input through and get
    /// `Error` with "Invalid PID" for values that cannot name a process.
    pub async fn terminate(&self, pid: i64, force: bool) -> KillOutcome {
        let Some(pid) = u32::try_from(pid).ok().filter(|p| *p > 0) else {
            debug!(pid = pid, "Refusing to signal invalid PID");
            return KillOutcome::Error {
                pid,
                process_name: None,
                reason: KillFailure::InvalidPid,
            };
        };

        let process_name = match self.processes.name(pid) {
            Ok(name) => name,
            Err(e) => return classify(pid, None, e),
        };

        if self.processes.liveness(pid) != Liveness::Running {
            debug!(pid = pid, "Process is not running");
            return KillOutcome::AlreadyDead { pid, process_name };
        }

        let first = if force {
            KillSignal::Kill
        } else {
            KillSignal::Terminate
        };
        if let Err(e) = self.processes.signal(pid, first) {
            return classify(pid, Some(process_name), e);
        }
        info!(pid = pid, process = %process_name, signal = first.name(), "Signal sent");

        if self.wait_for_exit(pid, self.policy.graceful_timeout).await {
            let path = if force {
                TerminationPath::Killed
            } else {
                TerminationPath::Terminated
            };
            info!(pid = pid, "Process exited");
            return KillOutcome::Success {
                pid,
                process_name,
                path,
            };
        }

        if force {
            warn!(pid = pid, "Process survived SIGKILL");
            return survived(pid, process_name);
        }

        warn!(pid = pid, "Process ignored SIGTERM, escalating to SIGKILL");
        match self.processes.signal(pid, KillSignal::Kill) {
            Ok(()) => {}
            // Exited between the last poll and the escalation
            Err(ProbeError::NoSuchProcess(_)) => {
                return KillOutcome::Success {
                    pid,
                    process_name,
                    path: TerminationPath::Terminated,
                };
            }
            Err(e) => return classify(pid, Some(process_name), e),
        }

        if self.wait_for_exit(pid, self.policy.forced_timeout).await {
            info!(pid = pid, "Process exited after SIGKILL");
            KillOutcome::Success {
                pid,
                process_name,
                path: TerminationPath::KilledAfterTimeout,
            }
        } else {
            warn!(pid = pid, "Process survived SIGKILL");
            survived(pid, process_name)
        }
    }

    /// Poll liveness until the process exits or `limit` elapses.
    async fn wait_for_exit(&self, pid: u32, limit: Duration) -> bool {
        let deadline = Instant::now() + limit;
        loop {
            if !self.processes.liveness(pid).is_running() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            sleep(self.policy.poll_interval.min(deadline - now)).await;
        }
    }
}

fn classify(pid: u32, process_name: Option<String>, error: ProbeError) -> KillOutcome {
    match error {
        ProbeError::NoSuchProcess(_) => KillOutcome::NotFound { pid },
        ProbeError::AccessDenied(_) => KillOutcome::AccessDenied { pid },
        ProbeError::Unavailable(detail) | ProbeError::Other(detail) => KillOutcome::Error {
            pid: i64::from(pid),
            process_name,
            reason: KillFailure::Unexpected(detail),
        },
    }
}

fn survived(pid: u32, process_name: String) -> KillOutcome {
    KillOutcome::Error {
        pid: i64::from(pid),
        process_name: Some(process_name),
        reason: KillFailure::Survived,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{
        raw, FakeConnections, FakeProcess, FakeProcesses, Reaction,
    };
    use crate::domain::{ConnectionState, KillResultKind};

    fn terminator(
        processes: &FakeProcesses,
    ) -> ProcessTerminator<FakeProcesses, FakeConnections> {
        ProcessTerminator::new(processes.clone(), FakeConnections::new(Vec::new()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_graceful_termination() {
        let processes = FakeProcesses::default().with(100, FakeProcess::named("node"));
        let started = Instant::now();

        let outcome = terminator(&processes).terminate(100, false).await;

        assert_eq!(
            outcome,
            KillOutcome::Success {
                pid: 100,
                process_name: "node".into(),
                path: TerminationPath::Terminated,
            }
        );
        assert_eq!(processes.signals(), vec![(100, KillSignal::Terminate)]);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_forced_kill() {
        let processes = FakeProcesses::default().with(100, FakeProcess::named("node"));

        let outcome = terminator(&processes).terminate(100, true).await;

        assert_eq!(outcome.kind(), KillResultKind::Success);
        assert!(outcome.message().contains("killed (SIGKILL)"));
        assert_eq!(processes.signals(), vec![(100, KillSignal::Kill)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_escalates_after_timeout() {
        let processes = FakeProcesses::default().with(
            200,
            FakeProcess::named("stubborn")
                .on_terminate(Reaction::Ignore)
                .on_kill(Reaction::ExitAfter(Duration::from_millis(500))),
        );
        let started = Instant::now();

        let outcome = terminator(&processes).terminate(200, false).await;

        assert_eq!(
            outcome,
            KillOutcome::Success {
                pid: 200,
                process_name: "stubborn".into(),
                path: TerminationPath::KilledAfterTimeout,
            }
        );
        assert_eq!(
            processes.signals(),
            vec![(200, KillSignal::Terminate), (200, KillSignal::Kill)]
        );
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_survives_both_signals() {
        let processes = FakeProcesses::default().with(
            300,
            FakeProcess::named("immortal")
                .on_terminate(Reaction::Ignore)
                .on_kill(Reaction::Ignore),
        );
        let started = Instant::now();

        let outcome = terminator(&processes).terminate(300, false).await;

        assert_eq!(outcome.kind(), KillResultKind::Error);
        assert_eq!(
            outcome.message(),
            "Process immortal (PID: 300) could not be killed"
        );
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_forced_kill_survived() {
        let processes = FakeProcesses::default().with(
            310,
            FakeProcess::named("unkillable").on_kill(Reaction::Ignore),
        );
        let started = Instant::now();

        let outcome = terminator(&processes).terminate(310, true).await;

        assert_eq!(
            outcome,
            KillOutcome::Error {
                pid: 310,
                process_name: Some("unkillable".into()),
                reason: KillFailure::Survived,
            }
        );
        // A forced kill does not escalate or wait a second time
        assert_eq!(processes.signals(), vec![(310, KillSignal::Kill)]);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_at_deadline_counts_as_graceful() {
        let processes = FakeProcesses::default().with(
            320,
            FakeProcess::named("slowpoke").on_terminate(Reaction::ExitAfter(GRACEFUL_TIMEOUT)),
        );

        let outcome = terminator(&processes).terminate(320, false).await;

        assert_eq!(
            outcome,
            KillOutcome::Success {
                pid: 320,
                process_name: "slowpoke".into(),
                path: TerminationPath::Terminated,
            }
        );
        assert_eq!(processes.signals(), vec![(320, KillSignal::Terminate)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_before_escalation_reports_sigterm() {
        let processes = FakeProcesses::default().with(
            330,
            FakeProcess::named("racer")
                .on_terminate(Reaction::Ignore)
                .refuse_kill(ProbeError::NoSuchProcess(330)),
        );

        let outcome = terminator(&processes).terminate(330, false).await;

        assert_eq!(
            outcome,
            KillOutcome::Success {
                pid: 330,
                process_name: "racer".into(),
                path: TerminationPath::Terminated,
            }
        );
        assert!(outcome.message().contains("SIGTERM"));
        assert_eq!(
            processes.signals(),
            vec![(330, KillSignal::Terminate), (330, KillSignal::Kill)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_pid() {
        let processes = FakeProcesses::default();
        let outcome = terminator(&processes).terminate(999_999, false).await;

        assert_eq!(outcome, KillOutcome::NotFound { pid: 999_999 });
        assert_eq!(outcome.message(), "Process with PID 999999 not found");
        assert!(processes.signals().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_pids_send_nothing() {
        let processes = FakeProcesses::default().with(1, FakeProcess::named("init"));
        let terminator = terminator(&processes);

        for pid in [0, -1, i64::from(u32::MAX) + 1] {
            let outcome = terminator.terminate(pid, true).await;
            assert_eq!(outcome.kind(), KillResultKind::Error);
            assert_eq!(outcome.message(), "Invalid PID");
            assert_eq!(outcome.pid(), pid);
        }
        assert!(processes.signals().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_access_denied() {
        let processes = FakeProcesses::default().with(
            1,
            FakeProcess::named("launchd").refuse_signals(ProbeError::AccessDenied(1)),
        );

        let outcome = terminator(&processes).terminate(1, false).await;

        assert_eq!(outcome, KillOutcome::AccessDenied { pid: 1 });
        assert!(outcome.message().contains("sudo"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_defunct_process_is_already_dead() {
        let processes =
            FakeProcesses::default().with(50, FakeProcess::named("zombie").defunct());

        let outcome = terminator(&processes).terminate(50, false).await;

        assert_eq!(outcome.kind(), KillResultKind::AlreadyDead);
        assert!(!outcome.is_error());
        assert!(processes.signals().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unexpected_signal_failure() {
        let processes = FakeProcesses::default().with(
            60,
            FakeProcess::named("odd").refuse_signals(ProbeError::Other("EINVAL".into())),
        );

        let outcome = terminator(&processes).terminate(60, false).await;

        assert_eq!(outcome.message(), "Error killing process 60: EINVAL");
    }

    #[tokio::test(start_paused = true)]
    async fn test_describe_counts_connections() {
        let processes = FakeProcesses::default().with(70, FakeProcess::named("redis-server"));
        let connections = FakeConnections::new(Vec::new()).with_process(
            70,
            Ok(vec![
                raw(Some(70), 6379, ConnectionState::Listen),
                raw(Some(70), 6379, ConnectionState::Established),
            ]),
        );
        let terminator = ProcessTerminator::new(processes, connections);

        let descriptor = terminator.describe(70).await.unwrap();
        assert_eq!(descriptor.name, "redis-server");
        assert_eq!(descriptor.open_connections, 2);

        assert!(terminator.describe(71).await.is_none());
        assert!(terminator.is_running(70));
        assert!(!terminator.is_running(71));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_policy() {
        let processes = FakeProcesses::default().with(
            80,
            FakeProcess::named("slow").on_terminate(Reaction::ExitAfter(Duration::from_secs(2))),
        );
        let policy = TerminationPolicy {
            graceful_timeout: Duration::from_secs(1),
            forced_timeout: Duration::from_secs(1),
            poll_interval: Duration::from_millis(50),
        };

        let outcome = terminator(&processes)
            .with_policy(policy)
            .terminate(80, false)
            .await;

        assert!(outcome.message().contains("SIGKILL after SIGTERM timeout"));
    }
}
