//! Monitor command - refresh the port table on an interval.

use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::{cursor::MoveTo, execute, terminal::Clear, terminal::ClearType};
use portify_core::{ConfigStore, PortEnumerator};

use crate::{render, tui};

pub async fn run(interval: Option<u64>, system: bool, no_tui: bool) -> Result<ExitCode> {
    let config = ConfigStore::new()?.load().await?.monitor;

    let interval = interval.unwrap_or(config.interval_secs);
    if interval == 0 {
        bail!("Refresh interval must be at least 1 second");
    }
    let interval = Duration::from_secs(interval);
    let system = system || config.include_system_info;

    if no_tui || !atty::is(atty::Stream::Stdout) {
        plain_loop(interval, system).await?;
    } else {
        tui::run(interval, system).await?;
    }

    Ok(ExitCode::SUCCESS)
}

/// Clear, redraw and sleep until Ctrl+C.
async fn plain_loop(interval: Duration, system: bool) -> Result<()> {
    render::info(&format!(
        "Starting port monitor (refresh every {}s). Press Ctrl+C to stop.",
        interval.as_secs()
    ));

    let enumerator = PortEnumerator::system();
    let mut stdout = std::io::stdout();

    loop {
        let snapshot = enumerator
            .scan(system)
            .await
            .context("Error during monitoring")?;

        execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
        render::banner();
        render::ports_table(snapshot.records(), system);
        render::separator();
        render::info(&format!(
            "Last updated: {} | Next refresh in {}s",
            chrono::Local::now().format("%H:%M:%S"),
            interval.as_secs()
        ));
        stdout.flush()?;

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                render::info("Monitoring stopped by user");
                return Ok(());
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
