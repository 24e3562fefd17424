//! Subcommand implementations.

pub mod config;
pub mod info;
pub mod kill;
pub mod list;
pub mod menubar;
pub mod monitor;
pub mod version;
