//! Connection table adapters.
//!
//! Platform-specific implementations of socket enumeration. The parsers
//! are plain functions over tool output and are compiled everywhere; only
//! the choice of tool depends on the target.

pub mod lsof;
pub mod netstat;
pub mod ss;
mod utils;

pub use utils::{parse_endpoint, parse_remote};

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{ProbeError, ScanError};
use crate::ports::{ConnectionSource, RawConnection};

/// Reads the OS connection table through the platform's native tool:
/// `ss` on Linux, `lsof` on other Unix systems, `netstat` on Windows.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConnections;

impl SystemConnections {
    /// Create a new connection source for the current platform.
    pub fn new() -> Self {
        Self
    }
}

impl ConnectionSource for SystemConnections {
    async fn connections(&self) -> Result<Vec<RawConnection>, ScanError> {
        #[cfg(target_os = "linux")]
        {
            let output = run_tool("ss", &["-Htuanp"]).await?;
            Ok(ss::parse_ss_output(&output))
        }

        #[cfg(all(unix, not(target_os = "linux")))]
        {
            let output = run_tool(LSOF, &["-i", "-P", "-n", "+c", "0"]).await?;
            Ok(lsof::parse_lsof_output(&output))
        }

        #[cfg(windows)]
        {
            let output = run_tool("netstat", &["-ano"]).await?;
            Ok(netstat::parse_netstat_output(&output))
        }

        #[cfg(not(any(unix, windows)))]
        {
            Err(ScanError::PlatformNotSupported)
        }
    }

    async fn connections_of(&self, pid: u32) -> Result<Vec<RawConnection>, ProbeError> {
        #[cfg(unix)]
        {
            let pid_arg = pid.to_string();
            let output = run_tool(LSOF, &["-a", "-p", &pid_arg, "-i", "-P", "-n", "+c", "0"])
                .await
                .map_err(|e| probe_error(pid, e))?;
            Ok(lsof::parse_lsof_output(&output))
        }

        #[cfg(windows)]
        {
            let output = run_tool("netstat", &["-ano"])
                .await
                .map_err(|e| probe_error(pid, e))?;
            Ok(netstat::parse_netstat_output(&output)
                .into_iter()
                .filter(|c| c.pid == Some(pid))
                .collect())
        }

        #[cfg(not(any(unix, windows)))]
        {
            let _ = pid;
            Err(ProbeError::Unavailable(
                ScanError::PlatformNotSupported.to_string(),
            ))
        }
    }
}

#[cfg(target_os = "macos")]
const LSOF: &str = "/usr/sbin/lsof";

#[cfg(all(unix, not(target_os = "macos")))]
const LSOF: &str = "lsof";

/// Run a query tool and return its stdout.
///
/// A non-zero exit with empty stderr is not an error: `lsof` exits with 1
/// when nothing matched. A tool that cannot be spawned is reported as
/// `ToolUnavailable`, distinct from one that ran and complained.
#[cfg(any(unix, windows))]
async fn run_tool(program: &str, args: &[&str]) -> Result<String, ScanError> {
    debug!(program = program, args = ?args, "Querying connection table");

    let output = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| ScanError::ToolUnavailable(format!("Failed to run {}: {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();

        if is_permission_error(stderr) {
            return Err(ScanError::PermissionDenied(format!("{}: {}", program, stderr)));
        }

        if !stderr.is_empty() && output.stdout.is_empty() {
            return Err(ScanError::CommandFailed(format!(
                "{} exited with {}: {}",
                program, output.status, stderr
            )));
        }

        debug!(program = program, status = %output.status, "Tool exited non-zero, using its output");
    }

    String::from_utf8(output.stdout)
        .map_err(|e| ScanError::ParseError(format!("Invalid UTF-8 in {} output: {}", program, e)))
}

#[cfg(any(unix, windows))]
fn is_permission_error(stderr: &str) -> bool {
    let lowered = stderr.to_lowercase();
    lowered.contains("permission denied")
        || lowered.contains("operation not permitted")
        || lowered.contains("access is denied")
}

#[cfg(any(unix, windows))]
fn probe_error(pid: u32, error: ScanError) -> ProbeError {
    match error {
        ScanError::PermissionDenied(_) => ProbeError::AccessDenied(pid),
        ScanError::ToolUnavailable(reason) => ProbeError::Unavailable(reason),
        other => ProbeError::Other(other.to_string()),
    }
}
