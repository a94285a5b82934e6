//! Column picker
//!
//! Show or hide table columns of the current view. Non-hideable columns
//! (the id) are listed but locked.

use super::centered_rect;
use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

fn key_hint(key: &'static str, action: &'static str) -> [Span<'static>; 2] {
    [
        Span::styled(key, Style::default().fg(Color::Yellow)),
        Span::styled(action, Style::default().fg(Color::DarkGray)),
    ]
}

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let Some(state) = app.column_config_state.as_ref() else {
        return;
    };
    let Some(resource) = app.current_resource() else {
        return;
    };

    let popup_area = centered_rect(55, 60, area);
    f.render_widget(Clear, popup_area);

    let shown = state.columns.iter().filter(|c| c.visible).count();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            format!(
                " Columns: {} ({}/{} shown) ",
                resource.display_name,
                shown,
                state.columns.len()
            ),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let rows: Vec<Row> = state
        .columns
        .iter()
        .map(|item| {
            let def = resource.columns.iter().find(|c| c.id == item.id);
            let mark = match (item.hideable, item.visible) {
                (false, _) => Span::styled(" ■ ", Style::default().fg(Color::DarkGray)),
                (true, true) => Span::styled(" ✓ ", Style::default().fg(Color::Green)),
                (true, false) => Span::styled(" · ", Style::default().fg(Color::DarkGray)),
            };
            let text = if item.visible {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Row::new(vec![
                Line::from(mark),
                Line::from(Span::styled(item.header.clone(), text)),
                Line::from(Span::styled(
                    def.map(|d| d.json_path.clone()).unwrap_or_default(),
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(Span::styled(
                    def.map(|d| d.width.to_string()).unwrap_or_default(),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Min(12),
            Constraint::Length(5),
        ],
    )
    .header(
        Row::new(vec!["", "Header", "Field", "Width"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    )
    .row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    let mut table_state = TableState::default();
    table_state.select(Some(state.selected));
    f.render_stateful_widget(table, chunks[0], &mut table_state);

    let mut hint = vec![Span::raw(" ")];
    for (key, action) in [
        ("j/k", ":move "),
        ("Space", ":show/hide "),
        ("Enter", ":save "),
        ("Esc", ":discard"),
    ] {
        hint.extend(key_hint(key, action));
    }
    f.render_widget(Paragraph::new(Line::from(hint)), chunks[1]);
}
