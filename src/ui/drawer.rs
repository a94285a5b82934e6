//! Member Files Drawer
//!
//! Every file, marked when it belongs to the open vector store. Add and
//! remove hints grey out when the selected file cannot take them.

use super::truncate_string;
use crate::app::App;
use crate::resource::format_bytes;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

fn drawer_area(area: Rect) -> Rect {
    let width = (area.width / 2).max(40).min(area.width);
    Rect::new(area.x + area.width - width, area.y, width, area.height)
}

fn hint(key: &'static str, label: &'static str, enabled: bool) -> Vec<Span<'static>> {
    let (key_style, label_style) = if enabled {
        (
            Style::default().fg(Color::Yellow),
            Style::default().fg(Color::Gray),
        )
    } else {
        (
            Style::default().fg(Color::DarkGray),
            Style::default().fg(Color::DarkGray),
        )
    };
    vec![
        Span::styled(key, key_style),
        Span::styled(format!(":{}  ", label), label_style),
    ]
}

pub fn render(f: &mut Frame, app: &App) {
    let drawer = &app.drawer;
    let area = drawer_area(f.area());
    f.render_widget(Clear, area);

    let title = match &drawer.store {
        Some(store) => format!(" {} ", truncate_string(&store.name, 40)),
        None => " Vector Store ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Type and member count
            Constraint::Length(1),
            Constraint::Min(1),    // Files
            Constraint::Length(1), // Hints
        ])
        .split(inner);

    let kind = drawer
        .store
        .as_ref()
        .map(|s| s.kind.as_str())
        .unwrap_or("-");
    let summary = Line::from(vec![
        Span::styled(" Type: ", Style::default().fg(Color::DarkGray)),
        Span::styled(kind, Style::default().fg(Color::White)),
        Span::styled("  Members: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{}", drawer.member_count()),
            Style::default().fg(Color::White),
        ),
        if drawer.loading {
            Span::styled("  loading...", Style::default().fg(Color::Yellow))
        } else {
            Span::raw("")
        },
    ]);
    f.render_widget(Paragraph::new(summary), chunks[0]);

    if drawer.files.is_empty() {
        let empty = Paragraph::new(Span::styled(
            " No files uploaded yet",
            Style::default().fg(Color::DarkGray),
        ));
        f.render_widget(empty, chunks[2]);
    } else {
        let items: Vec<ListItem> = drawer
            .files
            .iter()
            .map(|file| {
                let (marker, marker_style) = if drawer.is_pending(&file.id) {
                    ("↻", Style::default().fg(Color::Yellow))
                } else if drawer.is_member(&file.id) {
                    ("●", Style::default().fg(Color::Green))
                } else {
                    ("○", Style::default().fg(Color::DarkGray))
                };
                let name = if file.filename.is_empty() {
                    file.id.as_str()
                } else {
                    file.filename.as_str()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!(" {} ", marker), marker_style),
                    Span::raw(format!("{:<32}", truncate_string(name, 30))),
                    Span::styled(
                        format!("{:>10}", format_bytes(file.bytes)),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items).highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );
        let mut state = ListState::default();
        state.select(Some(drawer.selected));
        f.render_stateful_widget(list, chunks[2], &mut state);
    }

    let selected = drawer.selected_file().map(|f| f.id.as_str());
    let can_add = !app.readonly && selected.is_some_and(|id| drawer.can_add(id));
    let can_remove = !app.readonly && selected.is_some_and(|id| drawer.can_remove(id));

    let mut hints = vec![Span::raw(" ")];
    hints.extend(hint("a", "add", can_add));
    hints.extend(hint("r", "remove", can_remove));
    hints.extend(hint("R", "reload", true));
    hints.extend(hint("Esc", "close", true));
    f.render_widget(Paragraph::new(Line::from(hints)), chunks[3]);
}
