//! Port record domain model.

use serde::{Deserialize, Serialize};

// ============================================================================
// Protocol
// ============================================================================

/// Transport protocol of a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    /// Stream sockets.
    Tcp,
    /// Datagram sockets.
    Udp,
}

impl Protocol {
    /// Parse a transport label as printed by `ss`, `lsof` or `netstat`.
    ///
    /// Matches prefixes, so `tcp6`, `UDP`, `udp4` are all accepted.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.to_ascii_lowercase();
        if label.starts_with("tcp") {
            Some(Protocol::Tcp)
        } else if label.starts_with("udp") {
            Some(Protocol::Udp)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ConnectionState
// ============================================================================

/// Socket state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    Listen,
    Established,
    SynSent,
    SynRecv,
    FinWait1,
    FinWait2,
    TimeWait,
    Closed,
    CloseWait,
    LastAck,
    Closing,
    /// Connectionless socket (UDP) with no state.
    None,
    #[default]
    Unknown,
}

impl ConnectionState {
    /// Normalize a state label from any of the supported tools.
    ///
    /// Handles `ss` (`ESTAB`, `TIME-WAIT`, `UNCONN`), `lsof`
    /// (`ESTABLISHED`, `FIN_WAIT_1`) and `netstat` (`LISTENING`) spellings.
    pub fn parse(label: &str) -> Self {
        let normalized: String = label
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')')
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_uppercase();

        match normalized.as_str() {
            "LISTEN" | "LISTENING" => ConnectionState::Listen,
            "ESTAB" | "ESTABLISHED" => ConnectionState::Established,
            "SYNSENT" => ConnectionState::SynSent,
            "SYNRECV" | "SYNRECEIVED" => ConnectionState::SynRecv,
            "FINWAIT1" => ConnectionState::FinWait1,
            "FINWAIT2" => ConnectionState::FinWait2,
            "TIMEWAIT" => ConnectionState::TimeWait,
            "CLOSE" | "CLOSED" => ConnectionState::Closed,
            "CLOSEWAIT" => ConnectionState::CloseWait,
            "LASTACK" => ConnectionState::LastAck,
            "CLOSING" => ConnectionState::Closing,
            "UNCONN" | "NONE" | "" => ConnectionState::None,
            _ => ConnectionState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Listen => "LISTEN",
            ConnectionState::Established => "ESTABLISHED",
            ConnectionState::SynSent => "SYN_SENT",
            ConnectionState::SynRecv => "SYN_RECV",
            ConnectionState::FinWait1 => "FIN_WAIT1",
            ConnectionState::FinWait2 => "FIN_WAIT2",
            ConnectionState::TimeWait => "TIME_WAIT",
            ConnectionState::Closed => "CLOSED",
            ConnectionState::CloseWait => "CLOSE_WAIT",
            ConnectionState::LastAck => "LAST_ACK",
            ConnectionState::Closing => "CLOSING",
            ConnectionState::None => "NONE",
            ConnectionState::Unknown => "UNKNOWN",
        }
    }

    pub fn is_listening(&self) -> bool {
        matches!(self, ConnectionState::Listen)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Endpoint
// ============================================================================

/// One side of a socket: an address and a port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Address as printed by the OS tool (`127.0.0.1`, `*`, `[::1]`).
    pub ip: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip: ip.into(),
            port,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

// ============================================================================
// PortRecord
// ============================================================================

/// Name used for sockets without an owning process.
pub const SYSTEM_PROCESS_NAME: &str = "System";

/// One observed local socket binding.
///
/// Records are recomputed on every scan and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortRecord {
    /// Owning process, `0` when owned by the kernel or unknown.
    pub pid: u32,
    /// Best-effort display name.
    pub process_name: String,
    /// Local port number.
    pub port: u16,
    pub protocol: Protocol,
    #[serde(rename = "status")]
    pub state: ConnectionState,
    /// Local `ip:port`.
    pub local_address: String,
    /// Remote `ip:port`, if connected.
    pub remote_address: Option<String>,
    /// Present only when system info was requested and sampling succeeded.
    pub cpu_percent: Option<f32>,
    /// Resident memory in megabytes, same availability as `cpu_percent`.
    pub memory_mb: Option<f64>,
}

impl PortRecord {
    /// Placeholder name for a PID whose process could not be resolved.
    pub fn unresolved_name(pid: u32) -> String {
        format!("PID-{}", pid)
    }

    /// Whether the socket has an owning process.
    pub fn has_owner(&self) -> bool {
        self.pid > 0
    }

    pub fn is_listening(&self) -> bool {
        self.state.is_listening()
    }

    /// Case-insensitive substring match against the process name.
    pub fn matches_process_name(&self, query: &str) -> bool {
        self.process_name
            .to_lowercase()
            .contains(&query.to_lowercase())
    }
}

impl std::fmt::Display for PortRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} (PID: {}, Process: {})",
            self.protocol, self.local_address, self.state, self.pid, self.process_name
        )
    }
}
