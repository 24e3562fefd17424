//! Config command - show, change or reset the configuration.

use std::process::ExitCode;

use anyhow::Result;
use crossterm::style::Stylize;
use portify_core::{Config, ConfigStore};
use tracing::info;

use crate::render;

/// Write `key = value` to the config file.
pub async fn set(key: &str, value: &str) -> Result<ExitCode> {
    let store = ConfigStore::new()?;
    store.update(|config| config.set(key, value)).await?;

    info!(key = key, value = value, "Config updated");
    render::success(&format!("Set {} = {}", key, value));
    Ok(ExitCode::SUCCESS)
}

/// Replace the config file with defaults.
pub async fn reset() -> Result<ExitCode> {
    let store = ConfigStore::new()?;
    store.save(&Config::default()).await?;

    render::success(&format!("Configuration reset ({})", store.path().display()));
    Ok(ExitCode::SUCCESS)
}

pub async fn show(json: bool) -> Result<ExitCode> {
    let store = ConfigStore::new()?;
    let config = store.load().await?;

    if json {
        let output = serde_json::json!({
            "path": store.path(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", "Configuration".blue().bold());
    println!("  File: {}", store.path().display());
    println!();
    println!("{}", "Monitor".bold());
    println!("  Refresh interval:    {}s", config.monitor.interval_secs);
    println!(
        "  Include system info: {}",
        config.monitor.include_system_info
    );
    println!();
    println!("{}", "Menu bar".bold());
    println!("  Ports shown:         {}", config.menubar.max_ports_shown);
    println!(
        "  Refresh interval:    {}s",
        config.menubar.refresh_interval_secs
    );
    println!("  Notifications:       {}", config.menubar.show_notifications);
    println!("  Auto-refresh:        {}", config.menubar.auto_refresh);

    Ok(ExitCode::SUCCESS)
}
