//! Menu model for the tray surface.
//!
//! Pure data: building a menu never touches the OS, so both renderers
//! (terminal and native tray) draw from the same structure.

use portify_core::{ConnectionState, PortRecord};

use super::TrayEvent;

const NAME_LIMIT: usize = 15;
const NAME_KEEP: usize = 12;

/// Coarse health indicator used to pick the tray icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayStatus {
    /// Nothing bound at all.
    Inactive,
    Normal,
    Active,
    /// Unusually many sockets.
    Warning,
}

impl TrayStatus {
    pub fn of(records: &[PortRecord]) -> Self {
        if records.is_empty() {
            return TrayStatus::Inactive;
        }

        let listening = records.iter().filter(|r| r.is_listening()).count();
        if listening > 10 {
            TrayStatus::Warning
        } else if listening > 0 {
            TrayStatus::Active
        } else if records.len() > 20 {
            TrayStatus::Warning
        } else {
            TrayStatus::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrayStatus::Inactive => "inactive",
            TrayStatus::Normal => "normal",
            TrayStatus::Active => "active",
            TrayStatus::Warning => "warning",
        }
    }
}

/// A clickable entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuAction {
    pub label: String,
    pub event: TrayEvent,
    pub enabled: bool,
}

/// One socket, with its kill action and read-only details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortEntry {
    pub label: String,
    pub kill: MenuAction,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    /// Disabled text line.
    Label(String),
    Separator,
    Port(PortEntry),
    Action(MenuAction),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    pub items: Vec<MenuItem>,
}

impl Menu {
    /// Every enabled action in display order, port kill actions included.
    pub fn actions(&self) -> Vec<&MenuAction> {
        self.items
            .iter()
            .filter_map(|item| match item {
                MenuItem::Port(entry) => Some(&entry.kill),
                MenuItem::Action(action) => Some(action),
                _ => None,
            })
            .filter(|action| action.enabled)
            .collect()
    }

    pub fn header(&self) -> Option<&str> {
        match self.items.first() {
            Some(MenuItem::Label(text)) => Some(text),
            _ => None,
        }
    }
}

/// Marker shown in front of each port entry.
pub fn status_marker(state: ConnectionState) -> &'static str {
    match state {
        ConnectionState::Listen => "🟢",
        ConnectionState::Established => "🔵",
        ConnectionState::TimeWait => "🟡",
        ConnectionState::CloseWait => "🟠",
        ConnectionState::Closed => "⚫",
        _ => "⚪",
    }
}

fn short_name(name: &str) -> String {
    if name.chars().count() > NAME_LIMIT {
        let kept: String = name.chars().take(NAME_KEEP).collect();
        format!("{}...", kept)
    } else {
        name.to_string()
    }
}

fn port_entry(record: &PortRecord) -> PortEntry {
    PortEntry {
        label: format!(
            "{} {} ({})",
            status_marker(record.state),
            short_name(&record.process_name),
            record.port
        ),
        kill: MenuAction {
            label: format!("Kill Process (PID: {})", record.pid),
            event: TrayEvent::Kill {
                pid: record.pid,
                name: record.process_name.clone(),
            },
            enabled: record.has_owner(),
        },
        details: vec![
            format!("Protocol: {}", record.protocol),
            format!("Status: {}", record.state),
            format!("Address: {}", record.local_address),
        ],
    }
}

fn action(label: impl Into<String>, event: TrayEvent) -> MenuItem {
    MenuItem::Action(MenuAction {
        label: label.into(),
        event,
        enabled: true,
    })
}

/// Build the menu for a snapshot.
///
/// Listening sockets come first, then the rest, each group ordered by
/// port. At most `max_shown` sockets get an entry.
pub fn build_menu(records: &[PortRecord], max_shown: usize, auto_refresh: bool) -> Menu {
    let mut items = vec![
        MenuItem::Label(format!("Portify ({} connections)", records.len())),
        MenuItem::Separator,
    ];

    if records.is_empty() {
        items.push(MenuItem::Label("No active ports".to_string()));
    } else {
        let (mut listening, mut others): (Vec<&PortRecord>, Vec<&PortRecord>) =
            records.iter().partition(|r| r.is_listening());
        listening.sort_by_key(|r| r.port);
        others.sort_by_key(|r| r.port);

        items.push(MenuItem::Label(format!(
            "{} listening, {} total",
            listening.len(),
            records.len()
        )));
        items.push(MenuItem::Separator);

        items.extend(
            listening
                .into_iter()
                .chain(others)
                .take(max_shown)
                .map(|r| MenuItem::Port(port_entry(r))),
        );

        if records.len() > max_shown {
            items.push(MenuItem::Label(format!(
                "... and {} more",
                records.len() - max_shown
            )));
        }
    }

    items.push(MenuItem::Separator);
    items.push(action("Refresh Now", TrayEvent::Refresh));
    items.push(action("Open CLI", TrayEvent::OpenCli));
    items.push(action(
        format!("Auto-refresh: {}", if auto_refresh { "ON" } else { "OFF" }),
        TrayEvent::ToggleAutoRefresh,
    ));
    items.push(MenuItem::Separator);
    items.push(action("Quit Portify", TrayEvent::Quit));

    Menu { items }
}
