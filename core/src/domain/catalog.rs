//! Static descriptive tables: well-known ports and status severity.

use serde::{Deserialize, Serialize};

use super::ConnectionState;

const WELL_KNOWN_PORTS: &[(u16, &str)] = &[
    (20, "FTP Data"),
    (21, "FTP Control"),
    (22, "SSH"),
    (23, "Telnet"),
    (25, "SMTP"),
    (53, "DNS"),
    (80, "HTTP"),
    (110, "POP3"),
    (143, "IMAP"),
    (443, "HTTPS"),
    (993, "IMAPS"),
    (995, "POP3S"),
    (3000, "Development Server"),
    (3001, "Development Server"),
    (4000, "Development Server"),
    (5000, "Development Server"),
    (5432, "PostgreSQL"),
    (5672, "RabbitMQ"),
    (6379, "Redis"),
    (8000, "Development Server"),
    (8080, "HTTP Alternate"),
    (8443, "HTTPS Alternate"),
    (9000, "Development Server"),
    (27017, "MongoDB"),
];

/// Label for a well-known port, if any.
pub fn well_known_service(port: u16) -> Option<&'static str> {
    WELL_KNOWN_PORTS
        .iter()
        .find(|(p, _)| *p == port)
        .map(|(_, name)| *name)
}

/// Ports below 1024 need elevated privileges to bind on Unix.
pub fn is_privileged_port(port: u16) -> bool {
    port < 1024
}

/// How a connection state should be highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusSeverity {
    /// Listening.
    Healthy,
    /// Established.
    Active,
    /// TIME_WAIT.
    Waiting,
    /// CLOSE_WAIT: the peer closed, we did not.
    Lingering,
    /// Shutting down.
    Closing,
    Closed,
    Neutral,
}

impl StatusSeverity {
    pub fn of(state: ConnectionState) -> Self {
        match state {
            ConnectionState::Listen => StatusSeverity::Healthy,
            ConnectionState::Established => StatusSeverity::Active,
            ConnectionState::TimeWait => StatusSeverity::Waiting,
            ConnectionState::CloseWait => StatusSeverity::Lingering,
            ConnectionState::FinWait1 | ConnectionState::FinWait2 | ConnectionState::Closing => {
                StatusSeverity::Closing
            }
            ConnectionState::Closed => StatusSeverity::Closed,
            _ => StatusSeverity::Neutral,
        }
    }
}
