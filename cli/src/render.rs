//! Terminal output: tables, outcome messages and status lines.

use crossterm::style::{Color, Stylize};
use portify_core::{
    well_known_service, HostInfo, KillOutcome, KillResultKind, PortRecord, ProcessDescriptor,
    StatusSeverity,
};

/// Shown whenever an action may need elevated privileges.
pub const PRIVILEGE_HINT: &str = "Some operations may require root privileges (sudo)";

const NAME_WIDTH: usize = 18;

pub fn info(message: &str) {
    println!("{}", format!("ℹ {}", message).blue());
}

pub fn success(message: &str) {
    println!("{}", format!("✔ {}", message).green());
}

pub fn warning(message: &str) {
    println!("{}", format!("⚠ Warning: {}", message).yellow());
}

pub fn error(message: &str) {
    eprintln!("{}", format!("✖ Error: {}", message).red().bold());
}

pub fn banner() {
    println!("{}", "PORTIFY".blue().bold());
    println!("{}", "Port and Process Manager for Developers".dim());
    println!();
}

pub fn separator() {
    let width = crossterm::terminal::size()
        .map(|(w, _)| w as usize)
        .unwrap_or(80);
    println!("{}", "─".repeat(width).dim());
}

/// Truncate to `max` characters, marking the cut with "...".
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}

pub fn severity_color(severity: StatusSeverity) -> Color {
    match severity {
        StatusSeverity::Healthy => Color::Green,
        StatusSeverity::Active => Color::Blue,
        StatusSeverity::Waiting => Color::Yellow,
        StatusSeverity::Lingering => Color::DarkYellow,
        StatusSeverity::Closing => Color::Red,
        StatusSeverity::Closed => Color::DarkGrey,
        StatusSeverity::Neutral => Color::White,
    }
}

/// PID column text: owned sockets show the PID, others "System".
pub fn pid_label(record: &PortRecord) -> String {
    if record.has_owner() {
        record.pid.to_string()
    } else {
        "System".to_string()
    }
}

pub fn cpu_label(record: &PortRecord) -> String {
    record
        .cpu_percent
        .map(|cpu| format!("{:.1}%", cpu))
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn memory_label(record: &PortRecord) -> String {
    record
        .memory_mb
        .map(|mb| format!("{:.1}MB", mb))
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn description(port: u16) -> &'static str {
    well_known_service(port).unwrap_or("Unknown")
}

// ============================================================================
// Ports table
// ============================================================================

pub fn ports_table(records: &[PortRecord], show_system_info: bool) {
    if records.is_empty() {
        println!("{}", "No active ports found".yellow());
        return;
    }

    println!("{}", "Active Ports".blue().bold());

    let mut header = format!(
        "{:<8} {:<21} {:<6} {:<8} {:<12} {:<24} {:<18}",
        "PID", "Process", "Port", "Protocol", "Status", "Local Address", "Description"
    );
    if show_system_info {
        header.push_str(&format!(" {:<8} {:<10}", "CPU %", "Memory"));
    }
    println!("{}", header.as_str().blue().bold());
    println!("{}", "-".repeat(header.chars().count()).dim());

    for record in records {
        let status = format!("{:<12}", record.state.as_str())
            .with(severity_color(StatusSeverity::of(record.state)));

        let mut line = format!(
            "{} {} {} {:<8} {} {} {}",
            format!("{:<8}", pid_label(record)).cyan(),
            format!("{:<21}", truncate(&record.process_name, NAME_WIDTH)).green(),
            format!("{:<6}", record.port).magenta(),
            record.protocol.as_str(),
            status,
            format!("{:<24}", record.local_address).dim(),
            format!("{:<18}", description(record.port)).dim(),
        );
        if show_system_info {
            line.push_str(&format!(
                " {} {}",
                format!("{:<8}", cpu_label(record)).yellow(),
                format!("{:<10}", memory_label(record)).red(),
            ));
        }
        println!("{}", line);
    }

    println!();
    println!("Total: {} active connections", records.len());
}

// ============================================================================
// Process details and outcomes
// ============================================================================

pub fn descriptor(descriptor: &ProcessDescriptor) {
    println!("{}", "Process".blue().bold());
    println!("  Name:        {}", descriptor.name);
    println!("  PID:         {}", descriptor.pid);
    println!("  Status:      {}", descriptor.status);
    println!(
        "  User:        {}",
        descriptor.user.as_deref().unwrap_or("unknown")
    );
    println!("  Memory:      {:.1}MB", descriptor.memory_mb);
    println!("  Connections: {}", descriptor.open_connections);
    if !descriptor.command_line.is_empty() {
        println!("  Command:     {}", truncate(&descriptor.command_line, 80));
    }
}

pub fn outcome(outcome: &KillOutcome) {
    let message = outcome.message();
    match outcome.kind() {
        KillResultKind::Success => success(&message),
        KillResultKind::NotFound => println!("{}", format!("✖ {}", message).red()),
        KillResultKind::AccessDenied => println!("{}", format!("🔒 {}", message).yellow()),
        KillResultKind::AlreadyDead => println!("{}", format!("💀 {}", message).dim()),
        KillResultKind::Error => println!("{}", format!("⚠ {}", message).red()),
    }
}

pub fn host_info(host: &HostInfo) {
    println!("{}", "System Information".blue().bold());
    println!("  Platform:     {} ({})", host.platform, host.architecture);
    println!("  OS Version:   {}", host.os_version);
    println!("  Kernel:       {}", host.kernel_version);
    println!("  Hostname:     {}", host.hostname);
    println!("  User:         {} ({})", host.user, host.privilege_label());
}
