//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Each adapter handles communication with the operating system.

pub mod connections;
mod processes;

// Re-export main types for convenience
pub use connections::SystemConnections;
pub use processes::SystemProcesses;
