//! Menubar command - run the tray companion.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Result};
use portify_core::config::MenubarConfig;
use portify_core::ConfigStore;
use tracing::info;

use crate::render;
use crate::tray::{self, NotificationCenter, TrayOptions};

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct MenubarOverrides {
    pub max_ports: Option<usize>,
    pub interval: Option<u64>,
    pub no_notifications: bool,
    pub no_auto_refresh: bool,
}

/// Effective settings once overrides are applied.
#[derive(Debug, PartialEq)]
struct Settings {
    max_ports: usize,
    interval_secs: u64,
    notifications: bool,
    auto_refresh: bool,
}

fn merge(config: &MenubarConfig, overrides: &MenubarOverrides) -> Settings {
    Settings {
        max_ports: overrides.max_ports.unwrap_or(config.max_ports_shown),
        interval_secs: overrides.interval.unwrap_or(config.refresh_interval_secs),
        notifications: config.show_notifications && !overrides.no_notifications,
        auto_refresh: config.auto_refresh && !overrides.no_auto_refresh,
    }
}

pub async fn run(overrides: MenubarOverrides) -> Result<ExitCode> {
    let config = ConfigStore::new()?.load().await?.menubar;
    let settings = merge(&config, &overrides);

    if settings.interval_secs == 0 {
        bail!("Refresh interval must be at least 1 second");
    }
    if settings.max_ports == 0 {
        bail!("Maximum ports shown must be at least 1");
    }

    let options = TrayOptions {
        max_ports_shown: settings.max_ports,
        refresh_interval: Duration::from_secs(settings.interval_secs),
        auto_refresh: settings.auto_refresh,
    };

    let notifications = NotificationCenter::detect(settings.notifications);
    info!(
        enabled = notifications.is_enabled(),
        provider = notifications.primary().unwrap_or("none"),
        "Notifications configured"
    );

    render::info("Starting Portify menu bar app...");
    run_tray(options, notifications).await?;
    render::info("Portify menu bar app stopped");

    Ok(ExitCode::SUCCESS)
}

#[cfg(feature = "desktop")]
async fn run_tray(options: TrayOptions, notifications: NotificationCenter) -> Result<()> {
    tray::desktop::run(options, notifications)
}

#[cfg(not(feature = "desktop"))]
async fn run_tray(options: TrayOptions, notifications: NotificationCenter) -> Result<()> {
    tray::terminal::run(options, notifications).await
}
