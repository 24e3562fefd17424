//! Native tray icon (`desktop` feature).
//!
//! The icon and its event polling stay on the calling thread, which must
//! be the main thread on macOS and Windows. The `TrayApp` runs on its own
//! thread with a private runtime and ships each rendered menu back over
//! a channel.

use std::collections::HashMap;
use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use portify_core::{SystemConnections, SystemProcesses};
use tokio::sync::mpsc as async_mpsc;
use tracing::{debug, info};
use tray_icon::menu::{
    Menu as NativeMenu, MenuEvent, MenuId, MenuItem as NativeItem, PredefinedMenuItem, Submenu,
};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

use super::event_loop::{MenuRenderer, TrayApp, TrayOptions};
use super::menu::{Menu, MenuItem, TrayStatus};
use super::notify::NotificationCenter;
use super::TrayEvent;

const ICON_SIZE: u32 = 16;
const POLL: Duration = Duration::from_millis(50);

/// Hands menus to the tray thread.
struct ChannelRenderer(mpsc::Sender<(Menu, TrayStatus)>);

impl MenuRenderer for ChannelRenderer {
    fn render(&mut self, menu: &Menu, status: TrayStatus) -> Result<()> {
        self.0
            .send((menu.clone(), status))
            .map_err(|_| anyhow!("Tray icon is gone"))
    }
}

/// Blocks until the menu's Quit action is chosen.
pub fn run(options: TrayOptions, notifications: NotificationCenter) -> Result<()> {
    let (menu_tx, menu_rx) = mpsc::channel();
    let (event_tx, event_rx) = async_mpsc::unbounded_channel();

    let worker = std::thread::Builder::new()
        .name("portify-tray".into())
        .spawn(move || -> Result<()> {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let app = TrayApp::new(
                SystemConnections::new(),
                Arc::new(SystemProcesses::new()),
                notifications,
                ChannelRenderer(menu_tx),
                options,
            );
            runtime.block_on(app.run(event_rx))
        })?;

    let tray = TrayIconBuilder::new()
        .with_tooltip("Portify")
        .with_icon(status_icon(TrayStatus::Inactive)?)
        .build()
        .context("Failed to create system tray icon")?;
    info!("System tray active");

    let mut targets: HashMap<MenuId, TrayEvent> = HashMap::new();
    loop {
        match menu_rx.try_recv() {
            Ok((menu, status)) => {
                targets = install(&tray, &menu, status)?;
            }
            Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        if let Ok(click) = MenuEvent::receiver().try_recv() {
            if let Some(event) = targets.get(&click.id) {
                debug!(event = ?event, "Tray menu click");
                if event_tx.send(event.clone()).is_err() {
                    break;
                }
            }
        }

        std::thread::sleep(POLL);
    }

    worker
        .join()
        .map_err(|_| anyhow!("Tray worker panicked"))?
}

/// Swap in a freshly built native menu and icon.
fn install(tray: &TrayIcon, menu: &Menu, status: TrayStatus) -> Result<HashMap<MenuId, TrayEvent>> {
    let (native, targets) = native_menu(menu)?;
    tray.set_menu(Some(Box::new(native)));
    tray.set_icon(Some(status_icon(status)?))?;
    tray.set_tooltip(menu.header())?;
    Ok(targets)
}

fn native_menu(menu: &Menu) -> Result<(NativeMenu, HashMap<MenuId, TrayEvent>)> {
    let native = NativeMenu::new();
    let mut targets = HashMap::new();

    for item in &menu.items {
        match item {
            MenuItem::Label(text) => native.append(&NativeItem::new(text, false, None))?,
            MenuItem::Separator => native.append(&PredefinedMenuItem::separator())?,
            MenuItem::Port(entry) => {
                let submenu = Submenu::new(&entry.label, true);
                let kill = NativeItem::new(&entry.kill.label, entry.kill.enabled, None);
                targets.insert(kill.id().clone(), entry.kill.event.clone());
                submenu.append(&kill)?;
                for detail in &entry.details {
                    submenu.append(&NativeItem::new(detail, false, None))?;
                }
                native.append(&submenu)?;
            }
            MenuItem::Action(action) => {
                let native_item = NativeItem::new(&action.label, action.enabled, None);
                targets.insert(native_item.id().clone(), action.event.clone());
                native.append(&native_item)?;
            }
        }
    }

    Ok((native, targets))
}

fn status_rgb(status: TrayStatus) -> [u8; 3] {
    match status {
        TrayStatus::Inactive => [0x8E, 0x8E, 0x93],
        TrayStatus::Normal => [0x0A, 0x84, 0xFF],
        TrayStatus::Active => [0x30, 0xD1, 0x58],
        TrayStatus::Warning => [0xFF, 0x9F, 0x0A],
    }
}

/// RGBA pixels for a filled circle in the status color.
fn status_pixels(status: TrayStatus) -> Vec<u8> {
    let [r, g, b] = status_rgb(status);
    let center = (ICON_SIZE as f32 - 1.0) / 2.0;
    let radius = ICON_SIZE as f32 / 2.0 - 1.0;

    (0..ICON_SIZE * ICON_SIZE)
        .flat_map(|i| {
            let dx = (i % ICON_SIZE) as f32 - center;
            let dy = (i / ICON_SIZE) as f32 - center;
            let alpha = if dx * dx + dy * dy <= radius * radius {
                0xFF
            } else {
                0x00
            };
            [r, g, b, alpha]
        })
        .collect()
}

fn status_icon(status: TrayStatus) -> Result<Icon> {
    Icon::from_rgba(status_pixels(status), ICON_SIZE, ICON_SIZE)
        .context("Failed to build tray icon")
}
