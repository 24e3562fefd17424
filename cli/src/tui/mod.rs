//! Interactive monitor built on ratatui.

mod app;
mod ui;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use portify_core::{
    PortEnumerator, ProcessTerminator, SystemConnections, SystemProcesses,
};
use ratatui::DefaultTerminal;

use app::{Action, App};

type Enumerator = PortEnumerator<SystemConnections, Arc<SystemProcesses>>;
type Terminator = ProcessTerminator<Arc<SystemProcesses>, SystemConnections>;

/// Key polling timeout; also bounds how late a scheduled refresh runs.
const POLL_TIMEOUT: Duration = Duration::from_millis(200);

pub async fn run(interval: Duration, include_system_info: bool) -> Result<()> {
    let processes = Arc::new(SystemProcesses::new());
    let enumerator = PortEnumerator::new(SystemConnections::new(), processes.clone());
    let terminator = ProcessTerminator::new(processes, SystemConnections::new());
    let mut app = App::new(interval, include_system_info);

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut app, &enumerator, &terminator).await;
    ratatui::restore();
    result
}

async fn event_loop(
    terminal: &mut DefaultTerminal,
    app: &mut App,
    enumerator: &Enumerator,
    terminator: &Terminator,
) -> Result<()> {
    loop {
        if app.refresh_due(Instant::now()) {
            refresh(app, enumerator).await;
        }

        terminal.draw(|frame| ui::draw(frame, app))?;

        if !event::poll(POLL_TIMEOUT)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.handle_key(key) {
            Action::None => {}
            Action::Quit => return Ok(()),
            Action::Refresh => refresh(app, enumerator).await,
            Action::Kill { pid, name, force } => {
                app.set_status(format!("Killing {} (PID: {})...", name, pid));
                terminal.draw(|frame| ui::draw(frame, app))?;

                let outcome = terminator.terminate(i64::from(pid), force).await;
                app.set_status(outcome.message());
                refresh(app, enumerator).await;
            }
        }
    }
}

async fn refresh(app: &mut App, enumerator: &Enumerator) {
    match enumerator.scan(app.include_system_info).await {
        Ok(snapshot) => app.set_records(snapshot.into_records()),
        Err(e) => {
            tracing::debug!(error = %e, "Monitor scan failed");
            app.set_status(format!("Scan failed: {}", e));
        }
    }
}
