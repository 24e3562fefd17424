//! Process table port (interface).

use crate::domain::{KillSignal, Liveness, ProcessDescriptor, ResourceUsage};
use crate::error::ProbeError;

/// Port for looking up, sampling and signalling processes.
///
/// All calls are point-in-time: a PID valid for one call may be gone by
/// the next.
pub trait ProcessTable: Send + Sync {
    /// All PIDs currently known to the OS.
    fn pids(&self) -> Vec<u32>;

    /// Resolve the process name.
    fn name(&self, pid: u32) -> Result<String, ProbeError>;

    /// Sample CPU percentage and resident memory.
    fn usage(&self, pid: u32) -> Result<ResourceUsage, ProbeError>;

    /// Whether the process exists and is still running.
    fn liveness(&self, pid: u32) -> Liveness;

    /// Collect descriptive details. `open_connections` is left at zero;
    /// the caller fills it from a `ConnectionSource`.
    fn describe(&self, pid: u32) -> Result<ProcessDescriptor, ProbeError>;

    /// Deliver a termination signal.
    fn signal(&self, pid: u32, signal: KillSignal) -> Result<(), ProbeError>;
}

impl<T: ProcessTable> ProcessTable for std::sync::Arc<T> {
    fn pids(&self) -> Vec<u32> {
        (**self).pids()
    }

    fn name(&self, pid: u32) -> Result<String, ProbeError> {
        (**self).name(pid)
    }

    fn usage(&self, pid: u32) -> Result<ResourceUsage, ProbeError> {
        (**self).usage(pid)
    }

    fn liveness(&self, pid: u32) -> Liveness {
        (**self).liveness(pid)
    }

    fn describe(&self, pid: u32) -> Result<ProcessDescriptor, ProbeError> {
        (**self).describe(pid)
    }

    fn signal(&self, pid: u32, signal: KillSignal) -> Result<(), ProbeError> {
        (**self).signal(pid, signal)
    }
}
