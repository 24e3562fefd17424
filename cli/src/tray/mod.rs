//! Menu-bar companion.
//!
//! `event_loop` owns the snapshot and reacts to `TrayEvent`s; `menu`
//! turns a snapshot into a renderer-neutral menu. Two renderers exist:
//! the terminal one (always built) and the native tray icon behind the
//! `desktop` feature.

#[cfg(feature = "desktop")]
pub mod desktop;
mod event_loop;
mod menu;
mod notify;
pub mod terminal;

pub use event_loop::TrayOptions;
pub use notify::NotificationCenter;

/// Something the user asked the tray to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayEvent {
    Refresh,
    Kill { pid: u32, name: String },
    ToggleAutoRefresh,
    OpenCli,
    Quit,
}
