//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to talk to the operating system. Implementations live in `adapters`.

mod connections;
mod processes;

pub use connections::{ConnectionSource, RawConnection};
pub use processes::ProcessTable;
