//! Version command.

use std::process::ExitCode;

use anyhow::Result;
use crossterm::style::Stylize;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
    core_version: &'static str,
    authors: &'static str,
    description: &'static str,
}

impl VersionInfo {
    fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            core_version: portify_core::VERSION,
            authors: env!("CARGO_PKG_AUTHORS"),
            description: env!("CARGO_PKG_DESCRIPTION"),
        }
    }
}

pub fn run(json: bool) -> Result<ExitCode> {
    let info = VersionInfo::current();

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", format!("Portify v{}", info.version).blue().bold());
        println!("Created by {}", info.authors);
        println!("{}", info.description.dim());
    }

    Ok(ExitCode::SUCCESS)
}
