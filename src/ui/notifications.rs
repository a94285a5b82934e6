//! Operation history overlay
//!
//! Every create, delete, attach and detach leaves an entry here, newest
//! first. Failed entries carry the backend message.

use super::{centered_rect, truncate_string};
use crate::app::App;
use crate::notification::{Notification, NotificationStatus};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};
use std::time::Duration;

fn status_color(status: &NotificationStatus) -> Color {
    match status {
        NotificationStatus::InProgress => Color::Yellow,
        NotificationStatus::Success => Color::Green,
        NotificationStatus::Error(_) => Color::Red,
    }
}

fn outcome(notif: &Notification) -> String {
    match &notif.status {
        NotificationStatus::InProgress => notif.operation_type.present_participle().to_string(),
        NotificationStatus::Success => format!("done in {}", notif.duration_display()),
        NotificationStatus::Error(err) => err.clone(),
    }
}

fn to_row(notif: &Notification) -> Row<'static> {
    let color = status_color(&notif.status);
    Row::new(vec![
        Cell::from(format!(" {}", notif.status.icon())).style(Style::default().fg(color)),
        Cell::from(format_age(notif.created_at.elapsed()))
            .style(Style::default().fg(Color::DarkGray)),
        Cell::from(format!(
            "{} {}",
            notif.operation_type.display_name(),
            notif.resource_type
        )),
        Cell::from(truncate_string(&notif.subject, 36)),
        Cell::from(truncate_string(&outcome(notif), 60)).style(Style::default().fg(color)),
    ])
}

pub fn render(f: &mut Frame, app: &App) {
    let history = &app.store.notifications;
    let popup_area = centered_rect(80, 70, f.area());
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Operations ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let summary = Line::from(vec![
        Span::styled(
            format!(" {} ok", history.success_count()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} failed", history.error_count()),
            Style::default().fg(Color::Red),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} running", history.in_progress_count()),
            Style::default().fg(Color::Yellow),
        ),
    ]);
    f.render_widget(Paragraph::new(summary), chunks[0]);

    if history.notifications.is_empty() {
        f.render_widget(
            Paragraph::new("Nothing has happened yet")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            chunks[1],
        );
    } else {
        let header = Row::new(["", "AGE", "OPERATION", "SUBJECT", "RESULT"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
        let table = Table::new(
            history.notifications.iter().map(to_row),
            [
                Constraint::Length(3),
                Constraint::Length(6),
                Constraint::Length(22),
                Constraint::Min(16),
                Constraint::Min(20),
            ],
        )
        .header(header)
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );

        let mut state = TableState::default();
        state.select(Some(app.notifications_selected));
        f.render_stateful_widget(table, chunks[1], &mut state);
    }

    let help = Line::from(vec![
        Span::styled("j/k", Style::default().fg(Color::Yellow)),
        Span::styled(" move  ", Style::default().fg(Color::DarkGray)),
        Span::styled("C", Style::default().fg(Color::Yellow)),
        Span::styled(" clear  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::styled(" close", Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(
        Paragraph::new(help).alignment(Alignment::Center),
        chunks[2],
    );
}

/// Compact age: `5s`, `2m`, `3h`
fn format_age(elapsed: Duration) -> String {
    match elapsed.as_secs() {
        s if s < 60 => format!("{}s", s),
        s if s < 3600 => format!("{}m", s / 60),
        s => format!("{}h", s / 3600),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::OperationType;

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::from_secs(5)), "5s");
        assert_eq!(format_age(Duration::from_secs(125)), "2m");
        assert_eq!(format_age(Duration::from_secs(7200)), "2h");
    }

    #[test]
    fn test_outcome_shows_backend_message() {
        let mut notif = Notification::new(OperationType::Delete, "file", "file-1");
        notif.set_error("No such file".to_string());
        assert_eq!(outcome(&notif), "No such file");
    }
}
