//! Domain layer - Pure data models.
//!
//! This module contains the types exchanged between the enumerator, the
//! terminator and the presentation layer. They have no I/O dependencies
//! and can be tested in isolation.

mod catalog;
mod outcome;
mod record;
mod snapshot;

pub use catalog::{is_privileged_port, well_known_service, StatusSeverity};
pub use outcome::{
    bytes_to_mb, KillFailure, KillOutcome, KillReport, KillResultKind, KillSignal, Liveness,
    ProcessDescriptor, ResourceUsage, TerminationPath,
};
pub use record::{ConnectionState, Endpoint, PortRecord, Protocol, SYSTEM_PROCESS_NAME};
pub use snapshot::{PortFilter, PortSnapshot};
