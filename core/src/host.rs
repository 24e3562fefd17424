//! Facts about the machine Portify is running on.

use serde::{Deserialize, Serialize};
use sysinfo::System;

/// Host platform and privilege information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    /// OS family, e.g. "Darwin", "Ubuntu", "Windows".
    pub platform: String,
    pub os_version: String,
    pub kernel_version: String,
    pub architecture: String,
    pub hostname: String,
    pub user: String,
    /// Running with root/administrator privileges.
    pub is_root: bool,
}

impl HostInfo {
    pub fn collect() -> Self {
        let unknown = || "unknown".to_string();

        Self {
            platform: System::name().unwrap_or_else(unknown),
            os_version: System::long_os_version().unwrap_or_else(unknown),
            kernel_version: System::kernel_version().unwrap_or_else(unknown),
            architecture: std::env::consts::ARCH.to_string(),
            hostname: System::host_name().unwrap_or_else(unknown),
            user: current_user().unwrap_or_else(unknown),
            is_root: is_elevated(),
        }
    }

    /// Label used by `portify info`.
    pub fn privilege_label(&self) -> &'static str {
        if self.is_root {
            "root"
        } else {
            "user"
        }
    }
}

fn current_user() -> Option<String> {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|u| !u.is_empty())
}

#[cfg(unix)]
fn is_elevated() -> bool {
    nix::unistd::Uid::effective().is_root()
}

#[cfg(not(unix))]
fn is_elevated() -> bool {
    false
}
