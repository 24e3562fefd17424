//! Kill command - terminate a process by PID.

use std::process::ExitCode;

use anyhow::{Context, Result};
use dialoguer::Confirm;
use portify_core::{
    KillFailure, KillOutcome, KillResultKind, ProcessDescriptor, ProcessTerminator,
};

use crate::render;

pub async fn run(pid: i64, force: bool, yes: bool, json: bool) -> Result<ExitCode> {
    let Some(target) = u32::try_from(pid).ok().filter(|p| *p > 0) else {
        let outcome = KillOutcome::Error {
            pid,
            process_name: None,
            reason: KillFailure::InvalidPid,
        };
        return reject(&outcome, "Invalid PID. PID must be a positive integer.", json);
    };

    let terminator = ProcessTerminator::system();

    let Some(descriptor) = terminator.describe(target).await else {
        let outcome = KillOutcome::NotFound { pid: target };
        let text = format!("Process with PID {} not found or access denied", target);
        return reject(&outcome, &text, json);
    };

    if !yes {
        render::descriptor(&descriptor);
        if !confirm(&descriptor)? {
            render::info("Operation cancelled");
            return Ok(ExitCode::SUCCESS);
        }
    }

    let outcome = terminator.terminate(pid, force).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.to_report())?);
    } else {
        render::outcome(&outcome);
        if outcome.kind() == KillResultKind::AccessDenied {
            render::warning(render::PRIVILEGE_HINT);
        }
    }

    Ok(if outcome.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Report a kill refused before any signal was sent.
fn reject(outcome: &KillOutcome, text: &str, json: bool) -> Result<ExitCode> {
    if json {
        println!("{}", rejection_json(outcome)?);
    } else {
        render::error(text);
    }
    Ok(ExitCode::FAILURE)
}

fn rejection_json(outcome: &KillOutcome) -> Result<String> {
    Ok(serde_json::to_string_pretty(&outcome.to_report())?)
}

fn confirm(descriptor: &ProcessDescriptor) -> Result<bool> {
    Confirm::new()
        .with_prompt(format!(
            "Are you sure you want to kill process '{}' (PID: {})?",
            descriptor.name, descriptor.pid
        ))
        .default(false)
        .interact()
        .context("Confirmation prompt failed (use --yes when not on a terminal)")
}
