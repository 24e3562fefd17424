//! Portify Core Library
//!
//! Cross-platform library for inspecting active network ports and the
//! processes that own them.
//! Provides functionality to:
//! - Enumerate TCP and UDP sockets with their owning process
//! - Filter a snapshot by process name, port or LISTEN state
//! - Terminate processes by PID (gracefully, escalating when ignored)
//! - Persist user configuration for the monitor and menu-bar surfaces
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure data models and lookup tables
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: OS implementations
//! - `application`: Use case services
//!
//! # Platform Support
//! - Linux: `ss` for the connection table
//! - macOS and other Unix: `lsof`
//! - Windows: `netstat`
//!
//! Process names, usage and signals go through `sysinfo` (plus `nix`
//! signals on Unix).

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod error;
pub mod host;

// Re-export domain types (primary API)
pub use domain::{
    is_privileged_port, well_known_service, ConnectionState, Endpoint, KillFailure, KillOutcome,
    KillReport, KillResultKind, PortFilter, PortRecord, PortSnapshot, ProcessDescriptor,
    Protocol, StatusSeverity,
};

// Re-export other commonly used types
pub use adapters::{SystemConnections, SystemProcesses};
pub use application::{PortEnumerator, ProcessTerminator, TerminationPolicy};
pub use config::{Config, ConfigStore};
pub use error::{Error, Result};
pub use host::HostInfo;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
