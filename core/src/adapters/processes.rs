//! Process table adapter backed by `sysinfo`, with `nix` signals on Unix.

use std::ffi::OsStr;
use std::path::Path;

use parking_lot::Mutex;
use sysinfo::{
    Pid, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System, UpdateKind, Users,
};
use tracing::debug;

use crate::domain::{bytes_to_mb, KillSignal, Liveness, ProcessDescriptor, ResourceUsage};
use crate::error::ProbeError;
use crate::ports::ProcessTable;

/// The live OS process table.
///
/// Holds one `sysinfo::System` so CPU usage is measured between
/// consecutive refreshes of the same process.
pub struct SystemProcesses {
    system: Mutex<System>,
}

impl SystemProcesses {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }

    /// Refresh a single PID and run `f` against it.
    fn with_process<T>(
        &self,
        pid: u32,
        kind: ProcessRefreshKind,
        f: impl FnOnce(&sysinfo::Process) -> T,
    ) -> Result<T, ProbeError> {
        let target = Pid::from_u32(pid);
        let mut system = self.system.lock();
        system.refresh_processes_specifics(ProcessesToUpdate::Some(&[target]), true, kind);
        system
            .process(target)
            .map(f)
            .ok_or(ProbeError::NoSuchProcess(pid))
    }
}

/// Longest name the Linux kernel keeps in `comm`.
const COMM_LEN: usize = 15;

/// Best display name for a process.
///
/// Linux truncates `comm` to 15 bytes, so a name of that length is
/// replaced by the executable or `argv[0]` file name it is a prefix of.
fn display_name(comm: &str, exe: Option<&Path>, argv0: Option<&OsStr>) -> String {
    if comm.len() < COMM_LEN {
        return comm.to_string();
    }

    let candidates = [
        exe.and_then(Path::file_name),
        argv0.and_then(|arg| Path::new(arg).file_name()),
    ];
    candidates
        .into_iter()
        .flatten()
        .map(|name| name.to_string_lossy())
        .find(|name| name.len() > comm.len() && name.starts_with(comm))
        .map(|name| name.into_owned())
        .unwrap_or_else(|| comm.to_string())
}

fn process_name(process: &sysinfo::Process) -> String {
    display_name(
        &process.name().to_string_lossy(),
        process.exe(),
        process.cmd().first().map(|arg| arg.as_os_str()),
    )
}

impl Default for SystemProcesses {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable for SystemProcesses {
    fn pids(&self) -> Vec<u32> {
        let mut system = self.system.lock();
        system.refresh_processes_specifics(ProcessesToUpdate::All, true, ProcessRefreshKind::new());
        system.processes().keys().map(|pid| pid.as_u32()).collect()
    }

    fn name(&self, pid: u32) -> Result<String, ProbeError> {
        let kind = ProcessRefreshKind::new()
            .with_exe(UpdateKind::OnlyIfNotSet)
            .with_cmd(UpdateKind::OnlyIfNotSet);
        self.with_process(pid, kind, process_name)
    }

    fn usage(&self, pid: u32) -> Result<ResourceUsage, ProbeError> {
        self.with_process(
            pid,
            ProcessRefreshKind::new().with_cpu().with_memory(),
            |process| ResourceUsage {
                cpu_percent: process.cpu_usage(),
                memory_mb: bytes_to_mb(process.memory()),
            },
        )
    }

    fn liveness(&self, pid: u32) -> Liveness {
        match self.with_process(pid, ProcessRefreshKind::new(), |process| process.status()) {
            Ok(ProcessStatus::Zombie) | Ok(ProcessStatus::Dead) => Liveness::Defunct,
            Ok(_) => Liveness::Running,
            Err(_) => Liveness::Gone,
        }
    }

    fn describe(&self, pid: u32) -> Result<ProcessDescriptor, ProbeError> {
        let (descriptor, user_id) =
            self.with_process(pid, ProcessRefreshKind::everything(), |process| {
                let command_line = process
                    .cmd()
                    .iter()
                    .map(|arg| arg.to_string_lossy())
                    .collect::<Vec<_>>()
                    .join(" ");

                let descriptor = ProcessDescriptor {
                    pid,
                    name: process_name(process),
                    status: process.status().to_string(),
                    cpu_percent: process.cpu_usage(),
                    memory_mb: bytes_to_mb(process.memory()),
                    start_time: process.start_time(),
                    command_line,
                    user: None,
                    open_connections: 0,
                };
                (descriptor, process.user_id().cloned())
            })?;

        let user = user_id.and_then(|uid| {
            let users = Users::new_with_refreshed_list();
            users.get_user_by_id(&uid).map(|u| u.name().to_string())
        });

        Ok(ProcessDescriptor { user, ..descriptor })
    }

    fn signal(&self, pid: u32, signal: KillSignal) -> Result<(), ProbeError> {
        debug!(pid = pid, signal = signal.name(), "Sending signal to process");
        send_signal(self, pid, signal)
    }
}

#[cfg(unix)]
fn send_signal(_table: &SystemProcesses, pid: u32, signal: KillSignal) -> Result<(), ProbeError> {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid as UnixPid;

    let raw = i32::try_from(pid).map_err(|_| ProbeError::NoSuchProcess(pid))?;
    let sig = match signal {
        KillSignal::Terminate => Signal::SIGTERM,
        KillSignal::Kill => Signal::SIGKILL,
    };

    match kill(UnixPid::from_raw(raw), sig) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => Err(ProbeError::NoSuchProcess(pid)),
        Err(Errno::EPERM) => Err(ProbeError::AccessDenied(pid)),
        Err(e) => Err(ProbeError::Other(format!("{} failed: {}", signal.name(), e))),
    }
}

#[cfg(not(unix))]
fn send_signal(table: &SystemProcesses, pid: u32, signal: KillSignal) -> Result<(), ProbeError> {
    let sig = match signal {
        KillSignal::Terminate => sysinfo::Signal::Term,
        KillSignal::Kill => sysinfo::Signal::Kill,
    };

    // Windows has no SIGTERM; sysinfo reports it unsupported and we fall
    // back to TerminateProcess. A refused delivery is almost always ACL.
    let delivered = table.with_process(pid, ProcessRefreshKind::new(), |process| {
        process.kill_with(sig).unwrap_or_else(|| process.kill())
    })?;

    if delivered {
        Ok(())
    } else {
        Err(ProbeError::AccessDenied(pid))
    }
}
