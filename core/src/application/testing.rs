//! In-memory port implementations for service tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::domain::{
    ConnectionState, Endpoint, KillSignal, Liveness, ProcessDescriptor, Protocol, ResourceUsage,
};
use crate::error::{ProbeError, ScanError};
use crate::ports::{ConnectionSource, ProcessTable, RawConnection};

pub fn raw(pid: Option<u32>, port: u16, state: ConnectionState) -> RawConnection {
    RawConnection {
        pid,
        protocol: Protocol::Tcp,
        state,
        local: Some(Endpoint::new("127.0.0.1", port)),
        remote: None,
    }
}

// ============================================================================
// FakeConnections
// ============================================================================

#[derive(Debug, Clone)]
pub enum Bulk {
    Ok(Vec<RawConnection>),
    Denied,
    Broken(String),
}

#[derive(Debug, Clone)]
pub struct FakeConnections {
    bulk: Bulk,
    per_process: HashMap<u32, Result<Vec<RawConnection>, ProbeError>>,
}

impl FakeConnections {
    pub fn new(bulk: Vec<RawConnection>) -> Self {
        Self {
            bulk: Bulk::Ok(bulk),
            per_process: HashMap::new(),
        }
    }

    pub fn denied() -> Self {
        Self {
            bulk: Bulk::Denied,
            per_process: HashMap::new(),
        }
    }

    pub fn broken(reason: &str) -> Self {
        Self {
            bulk: Bulk::Broken(reason.to_string()),
            per_process: HashMap::new(),
        }
    }

    pub fn with_process(
        mut self,
        pid: u32,
        connections: Result<Vec<RawConnection>, ProbeError>,
    ) -> Self {
        self.per_process.insert(pid, connections);
        self
    }
}

impl ConnectionSource for FakeConnections {
    async fn connections(&self) -> Result<Vec<RawConnection>, ScanError> {
        match &self.bulk {
            Bulk::Ok(connections) => Ok(connections.clone()),
            Bulk::Denied => Err(ScanError::PermissionDenied("fake".into())),
            Bulk::Broken(reason) => Err(ScanError::CommandFailed(reason.clone())),
        }
    }

    async fn connections_of(&self, pid: u32) -> Result<Vec<RawConnection>, ProbeError> {
        self.per_process.get(&pid).cloned().unwrap_or(Ok(Vec::new()))
    }
}

// ============================================================================
// FakeProcesses
// ============================================================================

/// How a fake process responds to a signal.
#[derive(Debug, Clone, Copy)]
pub enum Reaction {
    ExitAfter(Duration),
    Ignore,
}

#[derive(Debug, Clone)]
pub struct FakeProcess {
    name: Result<String, ProbeError>,
    usage: Result<ResourceUsage, ProbeError>,
    defunct: bool,
    on_terminate: Reaction,
    on_kill: Reaction,
    signal_error: Option<ProbeError>,
    kill_error: Option<ProbeError>,
    exit_at: Option<Instant>,
}

impl FakeProcess {
    pub fn named(name: &str) -> Self {
        Self {
            name: Ok(name.to_string()),
            usage: Ok(ResourceUsage {
                cpu_percent: 1.5,
                memory_mb: 12.0,
            }),
            defunct: false,
            on_terminate: Reaction::ExitAfter(Duration::from_millis(200)),
            on_kill: Reaction::ExitAfter(Duration::ZERO),
            signal_error: None,
            kill_error: None,
            exit_at: None,
        }
    }

    pub fn unresolvable(error: ProbeError) -> Self {
        Self {
            name: Err(error),
            ..Self::named("")
        }
    }

    pub fn usage_error(mut self, error: ProbeError) -> Self {
        self.usage = Err(error);
        self
    }

    pub fn defunct(mut self) -> Self {
        self.defunct = true;
        self
    }

    pub fn on_terminate(mut self, reaction: Reaction) -> Self {
        self.on_terminate = reaction;
        self
    }

    pub fn on_kill(mut self, reaction: Reaction) -> Self {
        self.on_kill = reaction;
        self
    }

    pub fn refuse_signals(mut self, error: ProbeError) -> Self {
        self.signal_error = Some(error);
        self
    }

    /// Fail only SIGKILL delivery, e.g. ESRCH from a process that exited
    /// between the last poll and the escalation.
    pub fn refuse_kill(mut self, error: ProbeError) -> Self {
        self.kill_error = Some(error);
        self
    }
}

#[derive(Debug, Default)]
struct FakeState {
    processes: HashMap<u32, FakeProcess>,
    signals: Vec<(u32, KillSignal)>,
}

/// Shared handle: clones observe the same processes and signal log.
#[derive(Debug, Clone, Default)]
pub struct FakeProcesses {
    state: Arc<Mutex<FakeState>>,
}

impl FakeProcesses {
    pub fn with(self, pid: u32, process: FakeProcess) -> Self {
        self.state.lock().processes.insert(pid, process);
        self
    }

    pub fn signals(&self) -> Vec<(u32, KillSignal)> {
        self.state.lock().signals.clone()
    }

    fn exited(process: &FakeProcess) -> bool {
        process.exit_at.is_some_and(|at| Instant::now() >= at)
    }
}

impl ProcessTable for FakeProcesses {
    fn pids(&self) -> Vec<u32> {
        let mut pids: Vec<u32> = self.state.lock().processes.keys().copied().collect();
        pids.sort_unstable();
        pids
    }

    fn name(&self, pid: u32) -> Result<String, ProbeError> {
        let state = self.state.lock();
        match state.processes.get(&pid) {
            Some(p) if !Self::exited(p) => p.name.clone(),
            _ => Err(ProbeError::NoSuchProcess(pid)),
        }
    }

    fn usage(&self, pid: u32) -> Result<ResourceUsage, ProbeError> {
        let state = self.state.lock();
        match state.processes.get(&pid) {
            Some(p) if !Self::exited(p) => p.usage.clone(),
            _ => Err(ProbeError::NoSuchProcess(pid)),
        }
    }

    fn liveness(&self, pid: u32) -> Liveness {
        let state = self.state.lock();
        match state.processes.get(&pid) {
            None => Liveness::Gone,
            Some(p) if Self::exited(p) => Liveness::Gone,
            Some(p) if p.defunct => Liveness::Defunct,
            Some(_) => Liveness::Running,
        }
    }

    fn describe(&self, pid: u32) -> Result<ProcessDescriptor, ProbeError> {
        let name = self.name(pid)?;
        Ok(ProcessDescriptor {
            pid,
            name,
            status: "Run".into(),
            cpu_percent: 0.0,
            memory_mb: 1.0,
            start_time: 1_700_000_000,
            command_line: String::new(),
            user: None,
            open_connections: 0,
        })
    }

    fn signal(&self, pid: u32, signal: KillSignal) -> Result<(), ProbeError> {
        let mut state = self.state.lock();
        state.signals.push((pid, signal));
        let Some(process) = state.processes.get_mut(&pid) else {
            return Err(ProbeError::NoSuchProcess(pid));
        };
        if let Some(error) = &process.signal_error {
            return Err(error.clone());
        }
        if let (KillSignal::Kill, Some(error)) = (signal, &process.kill_error) {
            return Err(error.clone());
        }
        if Self::exited(process) {
            return Err(ProbeError::NoSuchProcess(pid));
        }

        let reaction = match signal {
            KillSignal::Terminate => process.on_terminate,
            KillSignal::Kill => process.on_kill,
        };
        if let Reaction::ExitAfter(delay) = reaction {
            let at = Instant::now() + delay;
            process.exit_at = Some(process.exit_at.map_or(at, |current| current.min(at)));
        }
        Ok(())
    }
}
