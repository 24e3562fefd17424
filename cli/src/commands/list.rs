//! List command - show all active ports.

use std::process::ExitCode;

use anyhow::{Context, Result};
use portify_core::{is_privileged_port, HostInfo, PortEnumerator, PortFilter, PortRecord};

use crate::render;

#[derive(Debug, Default)]
pub struct ListOptions {
    pub system: bool,
    pub filter: Option<String>,
    pub port: Option<u16>,
    pub listening: bool,
}

impl ListOptions {
    fn to_filter(&self) -> PortFilter {
        PortFilter {
            process_name: self.filter.clone(),
            port: self.port,
            listening_only: self.listening,
        }
    }
}

pub async fn run(options: ListOptions, json: bool) -> Result<ExitCode> {
    let enumerator = PortEnumerator::system();
    let snapshot = enumerator
        .scan(options.system)
        .await
        .context("Failed to scan ports")?;

    let filter = options.to_filter();
    let records = if filter.is_active() {
        snapshot.filter(&filter)
    } else {
        snapshot.into_records()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(ExitCode::SUCCESS);
    }

    if records.is_empty() && filter.is_active() {
        match empty_filter_message(&filter) {
            EmptyResult::Info(message) => render::info(&message),
            EmptyResult::Warning(message) => render::warning(&message),
        }
        return Ok(ExitCode::SUCCESS);
    }

    render::ports_table(&records, options.system);

    if options.system {
        render::info("System information included (CPU/Memory usage)");
    }
    if hides_privileged_owners(&records, HostInfo::collect().is_root) {
        render::warning(render::PRIVILEGE_HINT);
    }

    Ok(ExitCode::SUCCESS)
}

/// Without root, sockets on privileged ports usually come back with no
/// visible owner.
fn hides_privileged_owners(records: &[PortRecord], is_root: bool) -> bool {
    !is_root
        && records
            .iter()
            .any(|record| !record.has_owner() && is_privileged_port(record.port))
}

#[derive(Debug, PartialEq, Eq)]
enum EmptyResult {
    Info(String),
    Warning(String),
}

/// What to say when an active filter matched nothing.
fn empty_filter_message(filter: &PortFilter) -> EmptyResult {
    let mut criteria = Vec::new();
    if let Some(name) = &filter.process_name {
        criteria.push(format!("matching '{}'", name));
    }
    if let Some(port) = filter.port {
        criteria.push(format!("using port {}", port));
    }

    if criteria.is_empty() {
        return EmptyResult::Info("No listening ports found".to_string());
    }

    let mut message = format!("No processes found {}", criteria.join(" and "));
    if filter.listening_only {
        message.push_str(" in LISTEN state");
    }
    EmptyResult::Warning(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use portify_core::{ConnectionState, Protocol};

    fn record(pid: u32, port: u16) -> PortRecord {
        PortRecord {
            pid,
            process_name: if pid == 0 { "System".into() } else { "nginx".into() },
            port,
            protocol: Protocol::Tcp,
            state: ConnectionState::Listen,
            local_address: format!("0.0.0.0:{}", port),
            remote_address: None,
            cpu_percent: None,
            memory_mb: None,
        }
    }

    #[test]
    fn test_privilege_hint_for_ownerless_privileged_port() {
        let hidden = [record(0, 80), record(42, 3000)];
        assert!(hides_privileged_owners(&hidden, false));
        assert!(!hides_privileged_owners(&hidden, true));

        let visible = [record(42, 80), record(0, 5353)];
        assert!(!hides_privileged_owners(&visible, false));
    }

    #[test]
    fn test_to_filter() {
        let options = ListOptions {
            filter: Some("node".into()),
            port: Some(3000),
            ..Default::default()
        };
        let filter = options.to_filter();
        assert!(filter.is_active());
        assert_eq!(filter.port, Some(3000));
        assert!(!filter.listening_only);

        assert!(!ListOptions::default().to_filter().is_active());
    }

    #[test]
    fn test_empty_filter_messages() {
        assert_eq!(
            empty_filter_message(&PortFilter::new().with_process_name("node")),
            EmptyResult::Warning("No processes found matching 'node'".into())
        );
        assert_eq!(
            empty_filter_message(&PortFilter::new().with_port(8080)),
            EmptyResult::Warning("No processes found using port 8080".into())
        );
        assert_eq!(
            empty_filter_message(&PortFilter::new().with_listening_only(true)),
            EmptyResult::Info("No listening ports found".into())
        );
        assert_eq!(
            empty_filter_message(
                &PortFilter::new()
                    .with_process_name("redis")
                    .with_port(6379)
                    .with_listening_only(true)
            ),
            EmptyResult::Warning(
                "No processes found matching 'redis' and using port 6379 in LISTEN state".into()
            )
        );
    }
}
