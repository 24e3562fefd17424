//! Desktop notifications.
//!
//! Providers are probed once when the `NotificationCenter` is built and
//! then tried in priority order for every message. The console provider
//! is always present, so a message is never silently lost while
//! notifications are enabled.

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

pub trait Notifier: Send {
    fn name(&self) -> &'static str;

    /// Whether this provider can work on the current machine.
    fn is_available(&self) -> bool;

    /// Show a notification. Returns `false` when delivery failed.
    fn notify(&self, title: &str, message: &str) -> bool;
}

fn on_path(program: &str) -> bool {
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}

fn run_quietly(command: &mut Command) -> bool {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// AppleScript `display notification` (macOS).
pub struct Osascript;

const OSASCRIPT: &str = "/usr/bin/osascript";

impl Notifier for Osascript {
    fn name(&self) -> &'static str {
        "osascript"
    }

    fn is_available(&self) -> bool {
        cfg!(target_os = "macos") && Path::new(OSASCRIPT).exists()
    }

    fn notify(&self, title: &str, message: &str) -> bool {
        let script = format!(
            "display notification \"{}\" with title \"{}\"",
            applescript_escape(message),
            applescript_escape(title)
        );
        run_quietly(Command::new(OSASCRIPT).args(["-e", &script]))
    }
}

fn applescript_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// freedesktop `notify-send` (Linux).
pub struct NotifySend;

impl Notifier for NotifySend {
    fn name(&self) -> &'static str {
        "notify-send"
    }

    fn is_available(&self) -> bool {
        cfg!(target_os = "linux") && on_path("notify-send")
    }

    fn notify(&self, title: &str, message: &str) -> bool {
        run_quietly(Command::new("notify-send").args([
            "--app-name=Portify",
            "--expire-time=3000",
            title,
            message,
        ]))
    }
}

/// Print to stdout. Always available.
pub struct Console;

impl Notifier for Console {
    fn name(&self) -> &'static str {
        "console"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn notify(&self, title: &str, message: &str) -> bool {
        println!("📢 {}: {}", title, message);
        true
    }
}

pub struct NotificationCenter {
    providers: Vec<Box<dyn Notifier>>,
    enabled: bool,
}

impl NotificationCenter {
    /// Probe the platform providers, falling back to the console.
    pub fn detect(enabled: bool) -> Self {
        let candidates: Vec<Box<dyn Notifier>> =
            vec![Box::new(Osascript), Box::new(NotifySend), Box::new(Console)];
        Self::with_providers(candidates, enabled)
    }

    /// Keep the available providers out of `candidates`, in order.
    pub fn with_providers(candidates: Vec<Box<dyn Notifier>>, enabled: bool) -> Self {
        let providers: Vec<_> = candidates
            .into_iter()
            .filter(|provider| provider.is_available())
            .collect();
        debug!(
            providers = ?providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            enabled = enabled,
            "Notification providers"
        );
        Self { providers, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Name of the provider tried first.
    pub fn primary(&self) -> Option<&'static str> {
        self.providers.first().map(|p| p.name())
    }

    /// Deliver through the first provider that succeeds.
    pub fn notify(&self, title: &str, message: &str) -> bool {
        if !self.enabled {
            return false;
        }

        for provider in &self.providers {
            if provider.notify(title, message) {
                return true;
            }
            debug!(provider = provider.name(), "Notification provider failed");
        }
        false
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every delivered notification.
    #[derive(Clone, Default)]
    pub struct Recorder {
        pub sent: Arc<Mutex<Vec<(String, String)>>>,
        pub failing: bool,
        pub available: bool,
    }

    impl Recorder {
        pub fn working() -> Self {
            Self {
                available: true,
                ..Default::default()
            }
        }

        pub fn messages(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|(_, message)| message.clone())
                .collect()
        }
    }

    impl Notifier for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn notify(&self, title: &str, message: &str) -> bool {
            if self.failing {
                return false;
            }
            self.sent
                .lock()
                .unwrap()
                .push((title.to_string(), message.to_string()));
            true
        }
    }
}
