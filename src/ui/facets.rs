//! Facet filter overlay

use super::centered_rect;
use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, app: &App) {
    let popup_area = centered_rect(40, 50, f.area());
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Filters ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let items: Vec<ListItem> = app
        .facet_entries()
        .into_iter()
        .map(|(facet, value, label)| {
            let checked = app.is_facet_selected(&facet, &value);
            let (checkbox, style) = if checked {
                ("[x]", Style::default().fg(Color::Green))
            } else {
                ("[ ]", Style::default().fg(Color::DarkGray))
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {} ", checkbox), style),
                Span::raw(label),
            ]))
        })
        .collect();

    let list = List::new(items).highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );
    let mut state = ListState::default();
    state.select(Some(app.facet_cursor));
    f.render_stateful_widget(list, chunks[0], &mut state);

    let help = Line::from(Span::styled(
        " Space:toggle  r:reset  Enter/Esc:close",
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(Paragraph::new(help), chunks[1]);
}
