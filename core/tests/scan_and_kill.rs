//! End-to-end behavior of the public API against an in-memory OS.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use portify_core::domain::{KillSignal, Liveness, ResourceUsage};
use portify_core::error::{ProbeError, ScanError};
use portify_core::ports::{ConnectionSource, ProcessTable, RawConnection};
use portify_core::{
    ConnectionState, Endpoint, KillOutcome, KillResultKind, PortEnumerator, PortFilter,
    ProcessDescriptor, ProcessTerminator, Protocol,
};
use tokio::time::Instant;

// ============================================================================
// In-memory OS
// ============================================================================

#[derive(Clone)]
struct Proc {
    name: String,
    ignores_term: bool,
    exit_at: Option<Instant>,
}

#[derive(Clone, Default)]
struct Os {
    procs: Arc<Mutex<HashMap<u32, Proc>>>,
    sockets: Arc<Mutex<Vec<RawConnection>>>,
    signals: Arc<Mutex<Vec<(u32, KillSignal)>>>,
}

impl Os {
    fn spawn(&self, pid: u32, name: &str, ignores_term: bool) {
        self.procs.lock().insert(
            pid,
            Proc {
                name: name.to_string(),
                ignores_term,
                exit_at: None,
            },
        );
    }

    fn bind(&self, pid: Option<u32>, protocol: Protocol, port: u16, state: ConnectionState) {
        self.sockets.lock().push(RawConnection {
            pid,
            protocol,
            state,
            local: Some(Endpoint::new("0.0.0.0", port)),
            remote: None,
        });
    }

    fn alive(&self, pid: u32) -> bool {
        self.procs
            .lock()
            .get(&pid)
            .is_some_and(|p| p.exit_at.map_or(true, |at| Instant::now() < at))
    }
}

impl ConnectionSource for Os {
    async fn connections(&self) -> Result<Vec<RawConnection>, ScanError> {
        Ok(self.sockets.lock().clone())
    }

    async fn connections_of(&self, pid: u32) -> Result<Vec<RawConnection>, ProbeError> {
        Ok(self
            .sockets
            .lock()
            .iter()
            .filter(|c| c.pid == Some(pid))
            .cloned()
            .collect())
    }
}

impl ProcessTable for Os {
    fn pids(&self) -> Vec<u32> {
        self.procs.lock().keys().copied().collect()
    }

    fn name(&self, pid: u32) -> Result<String, ProbeError> {
        if !self.alive(pid) {
            return Err(ProbeError::NoSuchProcess(pid));
        }
        Ok(self.procs.lock()[&pid].name.clone())
    }

    fn usage(&self, pid: u32) -> Result<ResourceUsage, ProbeError> {
        self.name(pid).map(|_| ResourceUsage {
            cpu_percent: 0.0,
            memory_mb: 64.0,
        })
    }

    fn liveness(&self, pid: u32) -> Liveness {
        if self.alive(pid) {
            Liveness::Running
        } else {
            Liveness::Gone
        }
    }

    fn describe(&self, pid: u32) -> Result<ProcessDescriptor, ProbeError> {
        let name = self.name(pid)?;
        Ok(ProcessDescriptor {
            pid,
            name,
            status: "Sleep".into(),
            cpu_percent: 0.0,
            memory_mb: 64.0,
            start_time: 0,
            command_line: String::new(),
            user: Some("dev".into()),
            open_connections: 0,
        })
    }

    fn signal(&self, pid: u32, signal: KillSignal) -> Result<(), ProbeError> {
        self.signals.lock().push((pid, signal));
        if !self.alive(pid) {
            return Err(ProbeError::NoSuchProcess(pid));
        }
        let mut procs = self.procs.lock();
        let proc = procs
            .get_mut(&pid)
            .ok_or(ProbeError::NoSuchProcess(pid))?;
        match signal {
            KillSignal::Terminate if proc.ignores_term => {}
            KillSignal::Terminate => {
                proc.exit_at = Some(Instant::now() + Duration::from_millis(300))
            }
            KillSignal::Kill => proc.exit_at = Some(Instant::now() + Duration::from_millis(800)),
        }
        Ok(())
    }
}

fn dev_machine() -> Os {
    let os = Os::default();
    os.spawn(1234, "node", false);
    os.spawn(2000, "postgres", false);
    os.spawn(3000, "stubborn-daemon", true);
    os.bind(Some(2000), Protocol::Tcp, 5432, ConnectionState::Listen);
    os.bind(Some(1234), Protocol::Tcp, 3000, ConnectionState::Listen);
    os.bind(Some(1234), Protocol::Tcp, 3000, ConnectionState::Established);
    os.bind(Some(3000), Protocol::Udp, 9999, ConnectionState::None);
    os.bind(None, Protocol::Tcp, 443, ConnectionState::TimeWait);
    os
}

// ============================================================================
// Enumeration
// ============================================================================

#[tokio::test]
async fn snapshot_is_sorted_and_filters_are_subsets() {
    let os = dev_machine();
    let enumerator = PortEnumerator::new(os.clone(), os);

    let snapshot = enumerator.scan(false).await.unwrap();

    let ports: Vec<u16> = snapshot.iter().map(|r| r.port).collect();
    let mut sorted = ports.clone();
    sorted.sort();
    assert_eq!(ports, sorted);

    for record in snapshot.by_port(3000) {
        assert_eq!(record.port, 3000);
        assert!(snapshot.records().contains(&record));
    }
    assert!(snapshot.listening().iter().all(|r| r.is_listening()));
    assert!(snapshot
        .by_process_name("NODE")
        .iter()
        .all(|r| r.process_name.to_lowercase().contains("node")));
}

#[tokio::test]
async fn unowned_sockets_belong_to_system() {
    let os = dev_machine();
    let snapshot = PortEnumerator::new(os.clone(), os)
        .scan(false)
        .await
        .unwrap();

    let https = &snapshot.by_port(443)[0];
    assert_eq!(https.pid, 0);
    assert_eq!(https.process_name, "System");
    assert!(!https.has_owner());
}

#[tokio::test]
async fn system_info_only_when_requested() {
    let os = dev_machine();
    let enumerator = PortEnumerator::new(os.clone(), os);

    let bare = enumerator.scan(false).await.unwrap();
    assert!(bare.iter().all(|r| r.memory_mb.is_none()));

    let detailed = enumerator.scan(true).await.unwrap();
    let node = &detailed.by_process_name("node")[0];
    assert_eq!(node.memory_mb, Some(64.0));
    assert_eq!(node.cpu_percent, Some(0.0));
}

#[tokio::test]
async fn combined_filter_composes() {
    let os = dev_machine();
    let snapshot = PortEnumerator::new(os.clone(), os)
        .scan(false)
        .await
        .unwrap();

    let filter = PortFilter::new().with_port(3000).with_listening_only(true);
    let hits = snapshot.filter(&filter);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].state, ConnectionState::Listen);
}

// ============================================================================
// Termination
// ============================================================================

#[tokio::test(start_paused = true)]
async fn graceful_kill_then_rescan() {
    let os = dev_machine();
    let terminator = ProcessTerminator::new(os.clone(), os.clone());
    let enumerator = PortEnumerator::new(os.clone(), os.clone());

    let outcome = terminator.terminate(1234, false).await;
    assert_eq!(
        outcome.message(),
        "Process node (PID: 1234) terminated (SIGTERM)"
    );
    assert!(!terminator.is_running(1234));

    // The sockets linger in the table, but the owner no longer resolves
    let snapshot = enumerator.scan(false).await.unwrap();
    assert!(snapshot
        .by_port(3000)
        .iter()
        .all(|r| r.process_name == "PID-1234"));
}

#[tokio::test(start_paused = true)]
async fn ignored_sigterm_escalates_within_bound() {
    let os = dev_machine();
    let terminator = ProcessTerminator::new(os.clone(), os.clone());
    let started = Instant::now();

    let outcome = terminator.terminate(3000, false).await;

    assert_eq!(outcome.kind(), KillResultKind::Success);
    assert!(outcome.message().ends_with("killed (SIGKILL after SIGTERM timeout)"));
    assert_eq!(
        *os.signals.lock(),
        vec![(3000, KillSignal::Terminate), (3000, KillSignal::Kill)]
    );
    assert!(started.elapsed() <= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn missing_pid_is_not_found() {
    let os = dev_machine();
    let terminator = ProcessTerminator::new(os.clone(), os.clone());

    let outcome = terminator.terminate(999_999, false).await;

    assert_eq!(outcome, KillOutcome::NotFound { pid: 999_999 });
    assert!(os.signals.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn non_positive_pid_makes_no_calls() {
    let os = dev_machine();
    let terminator = ProcessTerminator::new(os.clone(), os.clone());

    for pid in [0, -1] {
        let outcome = terminator.terminate(pid, false).await;
        assert_eq!(outcome.kind(), KillResultKind::Error);
        assert_eq!(outcome.message(), "Invalid PID");
    }
    assert!(os.signals.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn describe_reports_open_connections() {
    let os = dev_machine();
    let terminator = ProcessTerminator::new(os.clone(), os);

    let descriptor = terminator.describe(1234).await.unwrap();
    assert_eq!(descriptor.name, "node");
    assert_eq!(descriptor.open_connections, 2);
    assert!(terminator.describe(4321).await.is_none());
}
