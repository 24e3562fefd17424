//! Address parsing shared by the tool parsers.

use crate::domain::Endpoint;

/// Parse an `address:port` string as printed by `ss`, `lsof` or `netstat`.
///
/// Handles multiple address formats:
/// - IPv4: "127.0.0.1:3000" or "*:8080"
/// - IPv6: "\[::1]:3000" or "\[fe80::1%eth0]:8080"
/// - Interface-scoped: "127.0.0.53%lo:53"
///
/// Returns `None` when the port is missing or is a wildcard (`*`).
pub fn parse_endpoint(address: &str) -> Option<Endpoint> {
    if address.starts_with('[') {
        let bracket_end = address.find(']')?;
        if bracket_end + 1 >= address.len() || address.as_bytes()[bracket_end + 1] != b':' {
            return None;
        }
        let inner = strip_scope(&address[1..bracket_end]);
        let port: u16 = address[bracket_end + 2..].parse().ok()?;
        Some(Endpoint::new(format!("[{}]", inner), port))
    } else {
        let last_colon = address.rfind(':')?;
        let addr = strip_scope(&address[..last_colon]);
        let port: u16 = address[last_colon + 1..].parse().ok()?;
        let addr = if addr.is_empty() { "*" } else { addr };
        Some(Endpoint::new(addr, port))
    }
}

/// Parse the peer side of a socket. Unconnected peers (`*:*`, `0.0.0.0:0`,
/// `[::]:0`) yield `None`.
pub fn parse_remote(address: &str) -> Option<Endpoint> {
    parse_endpoint(address).filter(|endpoint| endpoint.port != 0)
}

fn strip_scope(addr: &str) -> &str {
    match addr.find('%') {
        Some(idx) => &addr[..idx],
        None => addr,
    }
}
