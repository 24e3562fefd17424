//! Application layer - Use case services.
//!
//! This module contains application services that orchestrate
//! domain logic and adapter interactions.
//!
//! Services are designed to be thin orchestrators that:
//! - Use ports (traits) for OS access
//! - Absorb per-process failures into degraded records or outcomes
//! - Return domain types as outputs

mod enumerator;
mod terminator;

#[cfg(test)]
pub(crate) mod testing;

pub use enumerator::PortEnumerator;
pub use terminator::{ProcessTerminator, TerminationPolicy};
