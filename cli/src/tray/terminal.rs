//! Terminal stand-in for the tray.
//!
//! Prints the menu with numbered actions and reads commands from stdin.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use crossterm::style::Stylize;
use parking_lot::Mutex;
use portify_core::{PortRecord, SystemConnections, SystemProcesses};
use tokio::sync::mpsc;
use tracing::debug;

use super::event_loop::{MenuRenderer, TrayApp, TrayOptions};
use super::menu::{Menu, MenuItem, TrayStatus};
use super::notify::NotificationCenter;
use super::TrayEvent;

const PROMPT: &str = "Enter a number, r (refresh), a (auto-refresh), o (open CLI), k <pid> or q";

/// Actions of the last rendered menu, in the order they were numbered.
type SharedActions = Arc<Mutex<Vec<TrayEvent>>>;

struct TerminalRenderer<W: Write> {
    out: W,
    actions: SharedActions,
}

impl<W: Write> TerminalRenderer<W> {
    fn new(out: W, actions: SharedActions) -> Self {
        Self { out, actions }
    }
}

impl<W: Write> MenuRenderer for TerminalRenderer<W> {
    fn render(&mut self, menu: &Menu, status: TrayStatus) -> Result<()> {
        let out = &mut self.out;
        let mut number = 0;

        writeln!(out)?;
        if let Some(header) = menu.header() {
            writeln!(out, "{} [{}]", header.bold(), status.as_str())?;
        }
        for item in menu.items.iter().skip(1) {
            match item {
                MenuItem::Label(text) => writeln!(out, "  {}", text)?,
                MenuItem::Separator => writeln!(out, "  {}", "─".repeat(25).dark_grey())?,
                MenuItem::Port(entry) => {
                    if entry.kill.enabled {
                        number += 1;
                        writeln!(out, "  [{}] {}  {}", number, entry.label, entry.kill.label)?;
                    } else {
                        writeln!(out, "      {}", entry.label)?;
                    }
                    writeln!(out, "      {}", entry.details.join(" | ").dark_grey())?;
                }
                MenuItem::Action(action) => {
                    number += 1;
                    writeln!(out, "  [{}] {}", number, action.label)?;
                }
            }
        }
        writeln!(out, "{}", PROMPT.dark_grey())?;
        out.flush()?;

        *self.actions.lock() = menu
            .actions()
            .into_iter()
            .map(|action| action.event.clone())
            .collect();
        Ok(())
    }
}

/// Map a line of input to an event.
///
/// Numbers refer to the last rendered menu. `k <pid>` kills any PID,
/// using the menu's name for it when one is shown.
pub fn parse_command(line: &str, actions: &[TrayEvent]) -> Option<TrayEvent> {
    let mut words = line.split_whitespace();
    let first = words.next()?;

    match first {
        "r" | "refresh" => Some(TrayEvent::Refresh),
        "a" | "auto" => Some(TrayEvent::ToggleAutoRefresh),
        "o" | "open" => Some(TrayEvent::OpenCli),
        "q" | "quit" => Some(TrayEvent::Quit),
        "k" | "kill" => {
            let pid: u32 = words.next()?.parse().ok().filter(|p| *p > 0)?;
            let name = actions
                .iter()
                .find_map(|event| match event {
                    TrayEvent::Kill { pid: p, name } if *p == pid => Some(name.clone()),
                    _ => None,
                })
                .unwrap_or_else(|| PortRecord::unresolved_name(pid));
            Some(TrayEvent::Kill { pid, name })
        }
        number => {
            let index: usize = number.parse().ok()?;
            index
                .checked_sub(1)
                .and_then(|i| actions.get(i))
                .cloned()
        }
    }
}

/// Read stdin on a plain thread so a pending read never holds up exit.
fn spawn_reader(actions: SharedActions, events: mpsc::UnboundedSender<TrayEvent>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }

            let parsed = parse_command(&line, &actions.lock());
            match parsed {
                Some(event) => {
                    let quit = event == TrayEvent::Quit;
                    if events.send(event).is_err() || quit {
                        return;
                    }
                }
                None => println!("Unknown command: {}", line.trim()),
            }
        }
        debug!("stdin closed");
        let _ = events.send(TrayEvent::Quit);
    });
}

pub async fn run(options: TrayOptions, notifications: NotificationCenter) -> Result<()> {
    let actions = SharedActions::default();
    let renderer = TerminalRenderer::new(std::io::stdout(), actions.clone());
    let (tx, rx) = mpsc::unbounded_channel();

    spawn_reader(actions, tx.clone());
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(TrayEvent::Quit);
        }
    });

    let app = TrayApp::new(
        SystemConnections::new(),
        Arc::new(SystemProcesses::new()),
        notifications,
        renderer,
        options,
    );
    let result = app.run(rx).await;
    interrupt.abort();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tray::menu::build_menu;
    use portify_core::{ConnectionState, Protocol};

    fn records() -> Vec<PortRecord> {
        [(0, "System", 68), (10, "node", 3000)]
            .into_iter()
            .map(|(pid, name, port)| PortRecord {
                pid,
                process_name: name.to_string(),
                port,
                protocol: Protocol::Udp,
                state: ConnectionState::None,
                local_address: format!("0.0.0.0:{}", port),
                remote_address: None,
                cpu_percent: None,
                memory_mb: None,
            })
            .collect()
    }

    #[test]
    fn test_render_numbers_enabled_actions() {
        let actions = SharedActions::default();
        let mut renderer = TerminalRenderer::new(Vec::new(), actions.clone());
        let records = records();

        renderer
            .render(&build_menu(&records, 7, true), TrayStatus::of(&records))
            .unwrap();

        let output = String::from_utf8(renderer.out.clone()).unwrap();
        assert!(output.contains("[normal]"));
        assert!(output.contains("      ⚪ System (68)"));
        assert!(output.contains("[1] ⚪ node (3000)  Kill Process (PID: 10)"));
        assert!(output.contains("[2] Refresh Now"));
        assert!(output.contains("[5] Quit Portify"));

        let actions = actions.lock();
        assert_eq!(actions.len(), 5);
        assert_eq!(actions[4], TrayEvent::Quit);
    }

    #[test]
    fn test_parse_command() {
        let actions = vec![
            TrayEvent::Kill {
                pid: 10,
                name: "node".into(),
            },
            TrayEvent::Refresh,
        ];

        assert_eq!(parse_command("1", &actions), Some(actions[0].clone()));
        assert_eq!(parse_command(" 2 ", &actions), Some(TrayEvent::Refresh));
        assert_eq!(parse_command("3", &actions), None);
        assert_eq!(parse_command("0", &actions), None);
        assert_eq!(parse_command("q", &actions), Some(TrayEvent::Quit));
        assert_eq!(parse_command("a", &actions), Some(TrayEvent::ToggleAutoRefresh));
        assert_eq!(parse_command("o", &actions), Some(TrayEvent::OpenCli));
        assert_eq!(parse_command("bogus", &actions), None);
    }

    #[test]
    fn test_parse_kill_by_pid() {
        let actions = vec![TrayEvent::Kill {
            pid: 10,
            name: "node".into(),
        }];

        assert_eq!(
            parse_command("k 10", &actions),
            Some(TrayEvent::Kill {
                pid: 10,
                name: "node".into()
            })
        );
        assert_eq!(
            parse_command("kill 77", &actions),
            Some(TrayEvent::Kill {
                pid: 77,
                name: "PID-77".into()
            })
        );
        assert_eq!(parse_command("k 0", &actions), None);
        assert_eq!(parse_command("k", &actions), None);
    }
}
