//! Scan results and filtering.

use serde::{Deserialize, Serialize};

use super::PortRecord;

// ============================================================================
// PortSnapshot
// ============================================================================

/// The result of one scan: records ordered ascending by port.
///
/// Filtering never mutates the snapshot and never triggers a new scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortSnapshot {
    records: Vec<PortRecord>,
}

impl PortSnapshot {
    /// Build a snapshot, sorting by port.
    ///
    /// The sort is stable, so records sharing a port keep discovery order.
    pub fn new(mut records: Vec<PortRecord>) -> Self {
        records.sort_by_key(|r| r.port);
        Self { records }
    }

    pub fn records(&self) -> &[PortRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PortRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PortRecord> {
        self.records.iter()
    }

    /// Records whose process name contains `query` (case-insensitive).
    pub fn by_process_name(&self, query: &str) -> Vec<PortRecord> {
        self.select(|r| r.matches_process_name(query))
    }

    /// Records bound to exactly `port`.
    pub fn by_port(&self, port: u16) -> Vec<PortRecord> {
        self.select(|r| r.port == port)
    }

    /// Records in the LISTEN state.
    pub fn listening(&self) -> Vec<PortRecord> {
        self.select(PortRecord::is_listening)
    }

    /// Number of records in the LISTEN state.
    pub fn listening_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_listening()).count()
    }

    /// Apply every criterion of `filter`.
    pub fn filter(&self, filter: &PortFilter) -> Vec<PortRecord> {
        self.select(|r| filter.matches(r))
    }

    fn select(&self, predicate: impl Fn(&PortRecord) -> bool) -> Vec<PortRecord> {
        self.records
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }
}

impl<'a> IntoIterator for &'a PortSnapshot {
    type Item = &'a PortRecord;
    type IntoIter = std::slice::Iter<'a, PortRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ============================================================================
// PortFilter
// ============================================================================

/// Filter criteria for port listings. Criteria compose with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortFilter {
    /// Substring of the process name.
    #[serde(default)]
    pub process_name: Option<String>,
    /// Exact port number.
    #[serde(default)]
    pub port: Option<u16>,
    /// Only LISTEN-state records.
    #[serde(default)]
    pub listening_only: bool,
}

impl PortFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the filter has any active conditions.
    pub fn is_active(&self) -> bool {
        self.process_name.is_some() || self.port.is_some() || self.listening_only
    }

    pub fn matches(&self, record: &PortRecord) -> bool {
        if let Some(name) = &self.process_name {
            if !record.matches_process_name(name) {
                return false;
            }
        }
        if let Some(port) = self.port {
            if record.port != port {
                return false;
            }
        }
        if self.listening_only && !record.is_listening() {
            return false;
        }
        true
    }

    pub fn with_process_name(mut self, name: impl Into<String>) -> Self {
        self.process_name = Some(name.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_listening_only(mut self, enabled: bool) -> Self {
        self.listening_only = enabled;
        self
    }
}
