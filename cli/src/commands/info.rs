//! Info command - host platform and privilege level.

use std::process::ExitCode;

use anyhow::Result;
use portify_core::HostInfo;

use crate::render;

pub fn run(json: bool) -> Result<ExitCode> {
    let host = HostInfo::collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&host)?);
        return Ok(ExitCode::SUCCESS);
    }

    render::host_info(&host);
    if !host.is_root {
        render::warning(render::PRIVILEGE_HINT);
    }

    Ok(ExitCode::SUCCESS)
}
