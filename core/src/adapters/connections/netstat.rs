//! Parser for `netstat -ano` (Windows).

use crate::domain::{ConnectionState, Protocol};
use crate::ports::RawConnection;

use super::utils::{parse_endpoint, parse_remote};

/// Parse the output of `netstat -ano`.
///
/// Example output:
/// ```text
/// Active Connections
///
///   Proto  Local Address          Foreign Address        State           PID
///   TCP    0.0.0.0:135            0.0.0.0:0              LISTENING       1020
///   TCP    [::]:445               [::]:0                 LISTENING       4
///   UDP    0.0.0.0:5353           *:*                                    2212
/// ```
///
/// PID 0 (the idle process) is reported as unowned.
pub fn parse_netstat_output(output: &str) -> Vec<RawConnection> {
    let mut connections = Vec::new();

    for line in output.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(protocol) = parts.first().and_then(|p| match *p {
            "TCP" | "UDP" => Protocol::parse(p),
            _ => None,
        }) else {
            continue;
        };

        // TCP rows carry a state column, UDP rows do not.
        let (state, pid_field) = match (protocol, parts.len()) {
            (Protocol::Tcp, 5) => (ConnectionState::parse(parts[3]), parts[4]),
            (Protocol::Udp, 4) => (ConnectionState::None, parts[3]),
            _ => continue,
        };

        let pid = match pid_field.parse::<u32>() {
            Ok(0) => None,
            Ok(pid) => Some(pid),
            Err(_) => continue,
        };

        connections.push(RawConnection {
            pid,
            protocol,
            state,
            local: parse_endpoint(parts[1]),
            remote: parse_remote(parts[2]),
        });
    }

    connections
}
