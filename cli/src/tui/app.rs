//! Monitor TUI state and key handling.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use portify_core::PortRecord;

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Refresh,
    Kill { pid: u32, name: String, force: bool },
}

pub struct App {
    records: Vec<PortRecord>,
    pub selected: usize,
    pub include_system_info: bool,
    pub interval: Duration,
    status: Option<String>,
    last_refresh: Option<Instant>,
}

impl App {
    pub fn new(interval: Duration, include_system_info: bool) -> Self {
        Self {
            records: Vec::new(),
            selected: 0,
            include_system_info,
            interval,
            status: None,
            last_refresh: None,
        }
    }

    pub fn records(&self) -> &[PortRecord] {
        &self.records
    }

    pub fn listening_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_listening()).count()
    }

    pub fn selected_record(&self) -> Option<&PortRecord> {
        self.records.get(self.selected)
    }

    /// Replace the table contents, keeping the cursor in range.
    pub fn set_records(&mut self, records: Vec<PortRecord>) {
        self.records = records;
        self.selected = self.selected.min(self.records.len().saturating_sub(1));
        self.last_refresh = Some(Instant::now());
    }

    pub fn last_refresh(&self) -> Option<Instant> {
        self.last_refresh
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn refresh_due(&self, now: Instant) -> bool {
        self.last_refresh
            .map_or(true, |last| now.duration_since(last) >= self.interval)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        match (key.modifiers, key.code) {
            (_, KeyCode::Char('q')) | (_, KeyCode::Esc) => Action::Quit,
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => Action::Quit,
            (_, KeyCode::Char('r')) => Action::Refresh,
            (_, KeyCode::Char('j')) | (_, KeyCode::Down) => {
                self.next();
                Action::None
            }
            (_, KeyCode::Char('k')) | (_, KeyCode::Up) => {
                self.previous();
                Action::None
            }
            (_, KeyCode::Char('s')) => {
                self.include_system_info = !self.include_system_info;
                self.set_status(format!(
                    "System info {}",
                    if self.include_system_info { "on" } else { "off" }
                ));
                Action::Refresh
            }
            (_, KeyCode::Char('x')) => self.kill_selected(false),
            (_, KeyCode::Char('X')) => self.kill_selected(true),
            _ => Action::None,
        }
    }

    fn next(&mut self) {
        if self.selected + 1 < self.records.len() {
            self.selected += 1;
        }
    }

    fn previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn kill_selected(&mut self, force: bool) -> Action {
        let Some(record) = self.selected_record() else {
            return Action::None;
        };
        if !record.has_owner() {
            self.set_status("Cannot kill a socket without an owning process");
            return Action::None;
        }
        Action::Kill {
            pid: record.pid,
            name: record.process_name.clone(),
            force,
        }
    }
}
