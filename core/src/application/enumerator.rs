//! Port enumeration service.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::adapters::{SystemConnections, SystemProcesses};
use crate::domain::{PortRecord, PortSnapshot, ResourceUsage, SYSTEM_PROCESS_NAME};
use crate::error::{ProbeError, Result, ScanError};
use crate::ports::{ConnectionSource, ProcessTable, RawConnection};

/// Application service that turns the OS connection table into a
/// `PortSnapshot`.
///
/// Per-process failures never abort a scan: a PID whose name cannot be
/// read is labelled `PID-<n>`, and a failed usage sample just leaves the
/// optional fields empty. Only failures of the connection query itself
/// are reported to the caller.
pub struct PortEnumerator<C: ConnectionSource, P: ProcessTable> {
    connections: C,
    processes: P,
    last: RwLock<Option<PortSnapshot>>,
}

impl PortEnumerator<SystemConnections, SystemProcesses> {
    /// Enumerator over the live OS.
    pub fn system() -> Self {
        Self::new(SystemConnections::new(), SystemProcesses::new())
    }
}

impl<C: ConnectionSource, P: ProcessTable> PortEnumerator<C, P> {
    pub fn new(connections: C, processes: P) -> Self {
        Self {
            connections,
            processes,
            last: RwLock::new(None),
        }
    }

    /// Take a fresh snapshot of every internet socket with a local port.
    ///
    /// With `include_system_info`, each record whose owner resolved also
    /// carries a CPU and memory sample.
    pub async fn scan(&self, include_system_info: bool) -> Result<PortSnapshot> {
        let connections = self.collect_connections().await?;
        debug!(
            count = connections.len(),
            include_system_info = include_system_info,
            "Collected raw connections"
        );

        let mut owners: HashMap<u32, Owner> = HashMap::new();
        let records = connections
            .into_iter()
            .filter_map(|conn| self.assemble(conn, include_system_info, &mut owners))
            .collect();

        let snapshot = PortSnapshot::new(records);
        *self.last.write() = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// The most recent successful snapshot, if any.
    pub fn last_snapshot(&self) -> Option<PortSnapshot> {
        self.last.read().clone()
    }

    async fn collect_connections(&self) -> std::result::Result<Vec<RawConnection>, ScanError> {
        match self.connections.connections().await {
            Err(ScanError::PermissionDenied(reason)) => {
                warn!(reason = %reason, "Bulk connection query denied, walking processes");
                self.walk_processes().await
            }
            other => other,
        }
    }

    /// Fallback used when the OS refuses the bulk query: ask each process
    /// for its own sockets, skipping the ones we may not inspect.
    async fn walk_processes(&self) -> std::result::Result<Vec<RawConnection>, ScanError> {
        let mut collected = Vec::new();

        for pid in self.processes.pids() {
            match self.connections.connections_of(pid).await {
                Ok(connections) => {
                    collected.extend(connections.into_iter().map(|mut conn| {
                        conn.pid = Some(pid);
                        conn
                    }));
                }
                Err(ProbeError::Unavailable(reason)) => {
                    return Err(ScanError::ToolUnavailable(reason));
                }
                Err(e) => {
                    debug!(pid = pid, error = %e, "Skipping process");
                }
            }
        }

        Ok(collected)
    }

    fn assemble(
        &self,
        conn: RawConnection,
        include_system_info: bool,
        owners: &mut HashMap<u32, Owner>,
    ) -> Option<PortRecord> {
        let local = conn.local.filter(|endpoint| endpoint.port != 0)?;
        let pid = conn.pid.filter(|pid| *pid > 0);

        let owner = match pid {
            Some(pid) => owners
                .entry(pid)
                .or_insert_with(|| self.resolve_owner(pid, include_system_info))
                .clone(),
            None => Owner {
                name: SYSTEM_PROCESS_NAME.to_string(),
                usage: None,
            },
        };

        Some(PortRecord {
            pid: pid.unwrap_or(0),
            process_name: owner.name,
            port: local.port,
            protocol: conn.protocol,
            state: conn.state,
            local_address: local.to_string(),
            remote_address: conn.remote.map(|remote| remote.to_string()),
            cpu_percent: owner.usage.map(|u| u.cpu_percent),
            memory_mb: owner.usage.map(|u| u.memory_mb),
        })
    }

    fn resolve_owner(&self, pid: u32, include_system_info: bool) -> Owner {
        let name = match self.processes.name(pid) {
            Ok(name) => name,
            Err(e) => {
                debug!(pid = pid, error = %e, "Could not resolve process name");
                return Owner {
                    name: PortRecord::unresolved_name(pid),
                    usage: None,
                };
            }
        };

        let usage = if include_system_info {
            match self.processes.usage(pid) {
                Ok(usage) => Some(usage),
                Err(e) => {
                    debug!(pid = pid, error = %e, "Could not sample process usage");
                    None
                }
            }
        } else {
            None
        };

        Owner { name, usage }
    }
}

/// Resolved owner of a socket, cached per scan.
#[derive(Debug, Clone)]
struct Owner {
    name: String,
    usage: Option<ResourceUsage>,
}
