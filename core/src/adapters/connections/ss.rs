//! Parser for `ss -Htuanp` (Linux).

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{ConnectionState, Protocol};
use crate::ports::RawConnection;

use super::utils::{parse_endpoint, parse_remote};

fn owner_regex() -> &'static Regex {
    static OWNER: OnceLock<Regex> = OnceLock::new();
    OWNER.get_or_init(|| Regex::new(r"pid=(\d+)").expect("owner pattern is valid"))
}

/// Parse `ss` output without a header line.
///
/// Each line reads `netid state recv-q send-q local peer [users:((...))]`.
/// The owner column is absent for sockets of other users when not run
/// as root; those sockets are reported without a PID. When several
/// processes share a socket, the first listed owner wins.
pub fn parse_ss_output(output: &str) -> Vec<RawConnection> {
    let mut connections = Vec::new();

    for line in output.lines() {
        let components: Vec<&str> = line.split_whitespace().collect();
        if components.len() < 6 {
            continue;
        }

        let Some(protocol) = Protocol::parse(components[0]) else {
            continue;
        };

        let state = match protocol {
            Protocol::Udp => ConnectionState::None,
            Protocol::Tcp => ConnectionState::parse(components[1]),
        };

        let pid = components
            .get(6..)
            .map(|rest| rest.join(" "))
            .and_then(|users| {
                owner_regex()
                    .captures(&users)
                    .and_then(|caps| caps[1].parse::<u32>().ok())
            });

        connections.push(RawConnection {
            pid,
            protocol,
            state,
            local: parse_endpoint(components[4]),
            remote: parse_remote(components[5]),
        });
    }

    connections
}
