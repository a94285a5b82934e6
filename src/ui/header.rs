//! Header Component
//!
//! Displays endpoint, session and view information.

use crate::app::App;
use crate::api::ListOrder;
use crate::VERSION;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" vstui v{} ", VERSION),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    // Row 1: Endpoint and session
    let api = app.store.api();
    let (session_label, session_color) = if api.has_token() {
        ("API key set", Color::Green)
    } else {
        ("no API key", Color::Yellow)
    };
    let endpoint_line = Line::from(vec![
        Span::styled(" Endpoint: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            api.base_url(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Session: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            session_label,
            Style::default()
                .fg(session_color)
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    f.render_widget(Paragraph::new(endpoint_line), rows[0]);

    // Row 2: Current view and count
    let view_info = if let Some(resource) = app.current_resource() {
        Line::from(vec![
            Span::styled(" View: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                &resource.display_name,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled("Count: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", app.filtered_items.len()),
                Style::default().fg(Color::White),
            ),
            if app.items.len() != app.filtered_items.len() {
                Span::styled(
                    format!(" (filtered from {})", app.items.len()),
                    Style::default().fg(Color::DarkGray),
                )
            } else {
                Span::raw("")
            },
        ])
    } else {
        Line::from(vec![Span::styled(
            " No view selected",
            Style::default().fg(Color::Red),
        )])
    };
    f.render_widget(Paragraph::new(view_info), rows[1]);

    // Row 3: Paging and cache
    let order = match app.pagination.order {
        ListOrder::Desc => "newest first",
        ListOrder::Asc => "oldest first",
    };
    let stats = app.store.cache_stats();
    let paging_line = Line::from(vec![
        Span::styled(" Page: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{}", app.pagination.current_page),
            Style::default().fg(Color::White),
        ),
        Span::styled(format!(" ({})", order), Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled("Cache: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{} hits / {} misses", stats.hits, stats.misses),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(paging_line), rows[2]);

    // Row 4: Help hint
    let help_line = Line::from(vec![
        Span::styled(
            " ?:help  ::cmd  /:filter  F:facets  Tab:switch  q:quit",
            Style::default().fg(Color::DarkGray),
        ),
        if app.readonly {
            Span::styled(
                "  [READ-ONLY]",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw("")
        },
    ]);
    f.render_widget(Paragraph::new(help_line), rows[3]);
}
