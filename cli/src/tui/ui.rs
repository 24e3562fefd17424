//! TUI rendering.

use portify_core::{PortRecord, StatusSeverity};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use super::app::App;
use crate::render::{cpu_label, description, memory_label, pid_label, truncate};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Table
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_table(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let updated = app
        .last_refresh()
        .map(|_| chrono::Local::now().format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "scanning...".to_string());

    let title = format!(
        "Portify | {} connections, {} listening | every {}s | {}",
        app.records().len(),
        app.listening_count(),
        app.interval.as_secs(),
        updated
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).bold())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    f.render_widget(header, area);
}

fn severity_color(severity: StatusSeverity) -> Color {
    match severity {
        StatusSeverity::Healthy => Color::Green,
        StatusSeverity::Active => Color::Blue,
        StatusSeverity::Waiting => Color::Yellow,
        StatusSeverity::Lingering => Color::LightRed,
        StatusSeverity::Closing => Color::Red,
        StatusSeverity::Closed => Color::DarkGray,
        StatusSeverity::Neutral => Color::White,
    }
}

fn row_cells(record: &PortRecord, show_system_info: bool) -> Vec<Cell<'static>> {
    let status_color = severity_color(StatusSeverity::of(record.state));

    let mut cells = vec![
        Cell::from(pid_label(record)).style(Style::default().fg(Color::Cyan)),
        Cell::from(truncate(&record.process_name, 18)).style(Style::default().fg(Color::Green)),
        Cell::from(record.port.to_string()).style(Style::default().fg(Color::Magenta)),
        Cell::from(record.protocol.as_str()),
        Cell::from(record.state.as_str()).style(Style::default().fg(status_color)),
        Cell::from(record.local_address.clone()),
        Cell::from(description(record.port)).style(Style::default().fg(Color::DarkGray)),
    ];

    if show_system_info {
        cells.push(Cell::from(cpu_label(record)).style(Style::default().fg(Color::Yellow)));
        cells.push(Cell::from(memory_label(record)).style(Style::default().fg(Color::Red)));
    }

    cells
}

fn draw_table(f: &mut Frame, app: &App, area: Rect) {
    let mut titles = vec![
        "PID",
        "PROCESS",
        "PORT",
        "PROTO",
        "STATUS",
        "LOCAL ADDRESS",
        "DESCRIPTION",
    ];
    let mut widths = vec![
        Constraint::Length(8),
        Constraint::Length(21),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(12),
        Constraint::Length(24),
        Constraint::Min(10),
    ];
    if app.include_system_info {
        titles.extend(["CPU %", "MEMORY"]);
        widths.extend([Constraint::Length(8), Constraint::Length(10)]);
    }

    let header_cells = titles
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).bold()));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows = app.records().iter().enumerate().map(|(i, record)| {
        let style = if i == app.selected {
            Style::default().bg(Color::DarkGray).fg(Color::White)
        } else {
            Style::default()
        };

        Row::new(row_cells(record, app.include_system_info)).style(style)
    });

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Active Ports "),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD));

    let mut state = TableState::default();
    if !app.records().is_empty() {
        state.select(Some(app.selected));
    }

    f.render_stateful_widget(table, area, &mut state);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let help =
        "j/k: navigate | x: kill | X: force kill | s: system info | r: refresh | q: quit";

    let footer_text = match app.status() {
        Some(status) => format!("{} | {}", status, help),
        None => help.to_string(),
    };

    let footer = Paragraph::new(footer_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use portify_core::{ConnectionState, Protocol};
    use ratatui::backend::TestBackend;
    use std::time::Duration;

    #[test]
    fn test_draw_lists_records() {
        let mut app = App::new(Duration::from_secs(2), true);
        app.set_records(vec![PortRecord {
            pid: 4242,
            process_name: "redis-server".into(),
            port: 6379,
            protocol: Protocol::Tcp,
            state: ConnectionState::Listen,
            local_address: "127.0.0.1:6379".into(),
            remote_address: None,
            cpu_percent: Some(0.5),
            memory_mb: None,
        }]);

        let mut terminal = Terminal::new(TestBackend::new(140, 12)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();

        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("redis-server"));
        assert!(rendered.contains("Redis"));
        assert!(rendered.contains("N/A"));
        assert!(rendered.contains("1 connections, 1 listening"));
    }
}
