//! Process termination and inspection models.

use serde::{Deserialize, Serialize};

// ============================================================================
// Signals and liveness
// ============================================================================

/// Termination request sent to a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KillSignal {
    /// Graceful request (SIGTERM).
    Terminate,
    /// Immediate kill (SIGKILL).
    Kill,
}

impl KillSignal {
    pub fn name(&self) -> &'static str {
        match self {
            KillSignal::Terminate => "SIGTERM",
            KillSignal::Kill => "SIGKILL",
        }
    }
}

/// Observed state of a PID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// Present and not defunct.
    Running,
    /// Present in the table but exited (zombie/defunct).
    Defunct,
    /// No such process.
    Gone,
}

impl Liveness {
    pub fn is_running(&self) -> bool {
        matches!(self, Liveness::Running)
    }
}

/// CPU and memory sample for one process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceUsage {
    pub cpu_percent: f32,
    pub memory_mb: f64,
}

/// Convert a byte count into megabytes.
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

// ============================================================================
// ProcessDescriptor
// ============================================================================

/// Details about a process, used to confirm identity before acting on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessDescriptor {
    pub pid: u32,
    pub name: String,
    /// OS-reported status (e.g. "Run", "Sleep", "Zombie").
    pub status: String,
    pub cpu_percent: f32,
    pub memory_mb: f64,
    /// Start time in seconds since the Unix epoch.
    pub start_time: u64,
    /// Full command line, empty when unavailable.
    pub command_line: String,
    /// Owning user, when it can be resolved.
    pub user: Option<String>,
    /// Number of open internet sockets.
    pub open_connections: usize,
}

// ============================================================================
// KillOutcome
// ============================================================================

/// Which signal ended a successful termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationPath {
    /// The graceful signal was enough.
    Terminated,
    /// A forced kill was requested and worked.
    Killed,
    /// The graceful signal timed out and the forced kill worked.
    KilledAfterTimeout,
}

impl TerminationPath {
    pub fn describe(&self) -> &'static str {
        match self {
            TerminationPath::Terminated => "terminated (SIGTERM)",
            TerminationPath::Killed => "killed (SIGKILL)",
            TerminationPath::KilledAfterTimeout => "killed (SIGKILL after SIGTERM timeout)",
        }
    }
}

/// Result of one termination attempt. Exactly one variant per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillOutcome {
    /// The process was observed to exit.
    Success {
        pid: u32,
        process_name: String,
        path: TerminationPath,
    },
    /// No process with that PID.
    NotFound { pid: u32 },
    /// The OS refused the lookup or the signal.
    AccessDenied { pid: u32 },
    /// The process exists but is no longer running.
    AlreadyDead { pid: u32, process_name: String },
    /// Invalid input, a process that survived both signals, or an
    /// unexpected failure.
    Error {
        pid: i64,
        process_name: Option<String>,
        reason: KillFailure,
    },
}

/// Why a termination attempt ended in `KillOutcome::Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillFailure {
    InvalidPid,
    Survived,
    Unexpected(String),
}

/// Flat classification of a `KillOutcome`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KillResultKind {
    Success,
    NotFound,
    AccessDenied,
    AlreadyDead,
    Error,
}

impl KillOutcome {
    pub fn kind(&self) -> KillResultKind {
        match self {
            KillOutcome::Success { .. } => KillResultKind::Success,
            KillOutcome::NotFound { .. } => KillResultKind::NotFound,
            KillOutcome::AccessDenied { .. } => KillResultKind::AccessDenied,
            KillOutcome::AlreadyDead { .. } => KillResultKind::AlreadyDead,
            KillOutcome::Error { .. } => KillResultKind::Error,
        }
    }

    pub fn pid(&self) -> i64 {
        match self {
            KillOutcome::Success { pid, .. }
            | KillOutcome::NotFound { pid }
            | KillOutcome::AccessDenied { pid }
            | KillOutcome::AlreadyDead { pid, .. } => i64::from(*pid),
            KillOutcome::Error { pid, .. } => *pid,
        }
    }

    pub fn process_name(&self) -> Option<&str> {
        match self {
            KillOutcome::Success { process_name, .. }
            | KillOutcome::AlreadyDead { process_name, .. } => Some(process_name),
            KillOutcome::Error { process_name, .. } => process_name.as_deref(),
            KillOutcome::NotFound { .. } | KillOutcome::AccessDenied { .. } => None,
        }
    }

    /// Whether callers should treat this outcome as a failure.
    ///
    /// `AlreadyDead` is not an error even though nothing was done.
    pub fn is_error(&self) -> bool {
        matches!(
            self.kind(),
            KillResultKind::NotFound | KillResultKind::AccessDenied | KillResultKind::Error
        )
    }

    /// Human-readable message.
    pub fn message(&self) -> String {
        match self {
            KillOutcome::Success {
                pid,
                process_name,
                path,
            } => format!(
                "Process {} (PID: {}) {}",
                process_name,
                pid,
                path.describe()
            ),
            KillOutcome::NotFound { pid } => format!("Process with PID {} not found", pid),
            KillOutcome::AccessDenied { pid } => format!(
                "Access denied when trying to kill PID {}. Try running with sudo.",
                pid
            ),
            KillOutcome::AlreadyDead { pid, process_name } => {
                format!("Process {} (PID: {}) is not running", process_name, pid)
            }
            KillOutcome::Error {
                pid,
                process_name,
                reason,
            } => match reason {
                KillFailure::InvalidPid => "Invalid PID".to_string(),
                KillFailure::Survived => format!(
                    "Process {} (PID: {}) could not be killed",
                    process_name.as_deref().unwrap_or("?"),
                    pid
                ),
                KillFailure::Unexpected(detail) => {
                    format!("Error killing process {}: {}", pid, detail)
                }
            },
        }
    }

    /// Serializable view of this outcome.
    pub fn to_report(&self) -> KillReport {
        KillReport {
            result: self.kind(),
            pid: self.pid(),
            process_name: self.process_name().map(str::to_string),
            message: self.message(),
        }
    }
}

impl std::fmt::Display for KillOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Flat, serializable form of a `KillOutcome`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillReport {
    pub result: KillResultKind,
    pub pid: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
    pub message: String,
}
