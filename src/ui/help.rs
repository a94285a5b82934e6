//! Help Overlay
//!
//! Shows keyboard shortcuts and help information.

use super::centered_rect;
use crate::app::App;
use crate::resource::View;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn section(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)))
}

fn key(keys: &'static str, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", keys), Style::default().fg(Color::Yellow)),
        Span::raw(what),
    ])
}

fn destructive(keys: &'static str, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", keys), Style::default().fg(Color::Red)),
        Span::raw(what),
    ])
}

pub fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    let popup_area = centered_rect(70, 85, area);

    f.render_widget(Clear, popup_area);

    let mut help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section("Navigation"),
        key("j/k, ↑/↓", "Move up/down"),
        key("gg / G", "Go to top / bottom"),
        key("Ctrl+d/u", "Page down/up"),
        key("[ / ]", "Previous/next page"),
        key("o", "Toggle newest/oldest first"),
        key("Tab", "Switch files / vector stores"),
        Line::from(""),
        section("Views"),
        key("Enter/d", "View details"),
        key("R", "Refresh, bypassing the cache"),
        key("F1-F8", "Sort by column (again to reverse)"),
        key("F12", "Clear sort"),
        key("v", "Configure columns"),
        key("n", "Notification history"),
        Line::from(""),
        section("Filtering"),
        key("/", "Search by name or id"),
        key("F", "Facet filters"),
        key("r", "Reset all filters"),
        key("Esc", "Clear search"),
        Line::from(""),
        section("Actions"),
        key("c", "Create"),
        destructive("x/Delete", "Delete selected (asks first)"),
    ];

    match app.view {
        View::Files => help_text.push(key("u", "Batch upload")),
        View::VectorStores => help_text.push(key("f", "Manage member files")),
    }

    help_text.extend([
        Line::from(""),
        section("Commands"),
        key(":", "Enter command mode"),
        key("?/Esc", "Close help"),
        key("q", "Quit application"),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Help ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left);

    f.render_widget(paragraph, popup_area);
}
