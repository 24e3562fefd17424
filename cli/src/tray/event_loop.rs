//! The tray event loop.
//!
//! A single task owns the current snapshot. Menu clicks arrive as
//! `TrayEvent`s on a channel, auto-refresh arrives as timer ticks, and
//! every handled input ends with the menu being rebuilt and rendered.

use std::time::Duration;

use anyhow::Result;
use portify_core::ports::{ConnectionSource, ProcessTable};
use portify_core::{KillResultKind, PortEnumerator, PortRecord, ProcessTerminator};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::menu::{build_menu, Menu, TrayStatus};
use super::notify::NotificationCenter;
use super::TrayEvent;

/// Draws a menu somewhere (terminal, native tray).
pub trait MenuRenderer {
    fn render(&mut self, menu: &Menu, status: TrayStatus) -> Result<()>;
}

#[derive(Debug, Clone, Copy)]
pub struct TrayOptions {
    pub max_ports_shown: usize,
    pub refresh_interval: Duration,
    pub auto_refresh: bool,
}

pub struct TrayApp<C, P, R>
where
    C: ConnectionSource,
    P: ProcessTable,
{
    enumerator: PortEnumerator<C, P>,
    terminator: ProcessTerminator<P, C>,
    notifications: NotificationCenter,
    renderer: R,
    options: TrayOptions,
    records: Vec<PortRecord>,
}

impl<C, P, R> TrayApp<C, P, R>
where
    C: ConnectionSource + Clone,
    P: ProcessTable + Clone,
    R: MenuRenderer,
{
    pub fn new(
        connections: C,
        processes: P,
        notifications: NotificationCenter,
        renderer: R,
        options: TrayOptions,
    ) -> Self {
        Self {
            enumerator: PortEnumerator::new(connections.clone(), processes.clone()),
            terminator: ProcessTerminator::new(processes, connections),
            notifications,
            renderer,
            options,
            records: Vec::new(),
        }
    }

    /// Run until `Quit` arrives or every sender is dropped.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<TrayEvent>) -> Result<()> {
        info!(
            refresh_secs = self.options.refresh_interval.as_secs(),
            auto_refresh = self.options.auto_refresh,
            "Tray started"
        );

        self.refresh().await;
        self.render()?;

        let mut ticker = tokio::time::interval(self.options.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the initial scan covered it
        ticker.tick().await;

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    if !self.handle(event, &mut ticker).await {
                        break;
                    }
                }
                _ = ticker.tick(), if self.options.auto_refresh => {
                    self.refresh().await;
                }
            }
            self.render()?;
        }

        info!("Tray stopped");
        Ok(())
    }

    /// Returns `false` when the loop should stop.
    async fn handle(&mut self, event: TrayEvent, ticker: &mut tokio::time::Interval) -> bool {
        debug!(event = ?event, "Tray event");
        match event {
            TrayEvent::Refresh => self.refresh().await,
            TrayEvent::Kill { pid, name } => self.kill(pid, &name).await,
            TrayEvent::ToggleAutoRefresh => {
                self.options.auto_refresh = !self.options.auto_refresh;
                if self.options.auto_refresh {
                    ticker.reset();
                }
                info!(auto_refresh = self.options.auto_refresh, "Auto-refresh toggled");
            }
            TrayEvent::OpenCli => {
                if let Err(e) = open_cli() {
                    warn!(error = %e, "Failed to open CLI");
                }
            }
            TrayEvent::Quit => return false,
        }
        true
    }

    async fn kill(&mut self, pid: u32, name: &str) {
        self.notifications.notify(
            "Portify",
            &format!("Killing process {} (PID: {})", name, pid),
        );

        let outcome = self.terminator.terminate(i64::from(pid), false).await;
        if outcome.kind() == KillResultKind::Success {
            self.notifications.notify(
                "Portify - Success",
                &format!("Process {} killed successfully", name),
            );
        } else {
            self.notifications
                .notify("Portify - Error", &outcome.message());
        }

        self.refresh().await;
    }

    async fn refresh(&mut self) {
        match self.enumerator.scan(false).await {
            Ok(snapshot) => self.records = snapshot.into_records(),
            Err(e) => {
                warn!(error = %e, "Error refreshing ports");
                self.records.clear();
            }
        }
    }

    fn render(&mut self) -> Result<()> {
        let menu = build_menu(
            &self.records,
            self.options.max_ports_shown,
            self.options.auto_refresh,
        );
        self.renderer.render(&menu, TrayStatus::of(&self.records))
    }
}

/// Open a terminal window running `portify list`.
fn open_cli() -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    let mut command = {
        let mut command = std::process::Command::new("osascript");
        command.args([
            "-e",
            "tell application \"Terminal\" to do script \"portify list\"",
        ]);
        command
    };

    #[cfg(target_os = "windows")]
    let mut command = {
        let mut command = std::process::Command::new("cmd");
        command.args(["/C", "start", "cmd", "/K", "portify list"]);
        command
    };

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = {
        let mut command = std::process::Command::new("x-terminal-emulator");
        command.args(["-e", "sh", "-c", "portify list; exec $SHELL"]);
        command
    };

    command.spawn().map(|_| ())
}
