//! Portify CLI - Inspect active ports and kill the processes behind them
//!
//! A command-line tool for listing sockets, terminating processes,
//! monitoring ports live and running a menu-bar companion.

mod commands;
mod logging;
mod render;
mod tray;
mod tui;

use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "portify")]
#[command(author, version, about = "Port and process manager for developers")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List all active ports and their processes
    #[command(alias = "ls")]
    List(ListArgs),

    /// Kill a process by its PID
    Kill {
        /// Process ID to kill
        #[arg(allow_negative_numbers = true)]
        pid: i64,

        /// Use SIGKILL instead of SIGTERM
        #[arg(short, long)]
        force: bool,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Monitor ports in real time
    Monitor {
        /// Refresh interval in seconds
        #[arg(short, long)]
        interval: Option<u64>,

        /// Include CPU and memory usage information
        #[arg(short, long)]
        system: bool,

        /// Print plain refreshing tables instead of the interactive view
        #[arg(long)]
        no_tui: bool,
    },

    /// Show system information
    Info,

    /// Show Portify version
    Version,

    /// Show or change the configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Run Portify as a menu bar application
    Menubar(MenubarArgs),
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set a value, e.g. `menubar.auto_refresh false`
    Set { key: String, value: String },
    /// Restore the default configuration
    Reset,
}

#[derive(Args, Default)]
struct ListArgs {
    /// Include CPU and memory usage information
    #[arg(short, long)]
    system: bool,

    /// Filter by process name
    #[arg(short, long)]
    filter: Option<String>,

    /// Filter by specific port number
    #[arg(short, long)]
    port: Option<u16>,

    /// Show only listening ports
    #[arg(short, long)]
    listening: bool,
}

#[derive(Args)]
struct MenubarArgs {
    /// Maximum number of ports to show in menu
    #[arg(short, long)]
    max_ports: Option<usize>,

    /// Refresh interval in seconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// Disable system notifications
    #[arg(long)]
    no_notifications: bool,

    /// Disable auto-refresh
    #[arg(long)]
    no_auto_refresh: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            render::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Some(Commands::List(args)) => {
            commands::list::run(
                commands::list::ListOptions {
                    system: args.system,
                    filter: args.filter,
                    port: args.port,
                    listening: args.listening,
                },
                cli.json,
            )
            .await
        }
        Some(Commands::Kill { pid, force, yes }) => {
            commands::kill::run(pid, force, yes, cli.json).await
        }
        Some(Commands::Monitor {
            interval,
            system,
            no_tui,
        }) => commands::monitor::run(interval, system, no_tui).await,
        Some(Commands::Info) => commands::info::run(cli.json),
        Some(Commands::Version) => commands::version::run(cli.json),
        Some(Commands::Config { action }) => match action {
            None | Some(ConfigAction::Show) => commands::config::show(cli.json).await,
            Some(ConfigAction::Set { key, value }) => commands::config::set(&key, &value).await,
            Some(ConfigAction::Reset) => commands::config::reset().await,
        },
        Some(Commands::Menubar(args)) => {
            commands::menubar::run(commands::menubar::MenubarOverrides {
                max_ports: args.max_ports,
                interval: args.interval,
                no_notifications: args.no_notifications,
                no_auto_refresh: args.no_auto_refresh,
            })
            .await
        }
        None => {
            // Default: interactive monitor on a terminal, plain listing otherwise
            if cli.json || !atty::is(atty::Stream::Stdout) {
                commands::list::run(Default::default(), cli.json).await
            } else {
                commands::monitor::run(None, false, false).await
            }
        }
    }
}
