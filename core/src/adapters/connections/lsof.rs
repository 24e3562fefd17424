//! Parser for `lsof -i -P -n +c 0` (macOS and other Unix systems).

use std::collections::HashSet;

use crate::domain::{ConnectionState, Protocol};
use crate::ports::RawConnection;

use super::utils::{parse_endpoint, parse_remote};

/// Parse lsof output into raw connections.
///
/// Example output:
/// ```text
/// COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
/// node     34805  code   19u  IPv6 0x3d8015e195af1f3f      0t0  TCP [::1]:3000 (LISTEN)
/// Safari    4431  code   31u  IPv4 0x5a2c7d1b9e0f2a11      0t0  TCP 10.0.0.4:50122->17.1.2.3:443 (ESTABLISHED)
/// ```
///
/// The same socket appears once per descriptor that refers to it; exact
/// duplicates are dropped.
pub fn parse_lsof_output(output: &str) -> Vec<RawConnection> {
    let mut connections = Vec::new();
    let mut seen: HashSet<(u32, String)> = HashSet::new();

    for line in output.lines() {
        if line.is_empty() || line.starts_with("COMMAND") {
            continue;
        }

        let components: Vec<&str> = line.split_whitespace().collect();
        if components.len() < 9 {
            continue;
        }

        let pid: u32 = match components[1].parse() {
            Ok(p) => p,
            Err(_) => continue,
        };

        let Some(node_idx) = components
            .iter()
            .skip(4)
            .position(|c| *c == "TCP" || *c == "UDP")
            .map(|idx| idx + 4)
        else {
            continue;
        };

        let Some(protocol) = Protocol::parse(components[node_idx]) else {
            continue;
        };
        let Some(name) = components.get(node_idx + 1) else {
            continue;
        };

        let state = match components.get(node_idx + 2) {
            Some(label) if label.starts_with('(') => ConnectionState::parse(label),
            _ if protocol == Protocol::Udp => ConnectionState::None,
            _ => ConnectionState::Unknown,
        };

        if !seen.insert((pid, format!("{} {} {}", protocol, name, state))) {
            continue;
        }

        let (local, remote) = match name.split_once("->") {
            Some((local, remote)) => (parse_endpoint(local), parse_remote(remote)),
            None => (parse_endpoint(name), None),
        };

        connections.push(RawConnection {
            pid: Some(pid),
            protocol,
            state,
            local,
            remote,
        });
    }

    connections
}
