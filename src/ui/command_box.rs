//! `:` command palette
//!
//! One-line prompt with the selected completion ghosted after the cursor,
//! and the matching commands listed underneath with what they do.

use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
    Frame,
};

const MAX_SUGGESTIONS: usize = 8;

/// Typed text followed by the untyped rest of the completion
fn prompt_line<'a>(typed: &'a str, completion: Option<&'a str>) -> Line<'a> {
    let mut spans = vec![
        Span::styled(":", Style::default().fg(Color::Cyan)),
        Span::styled(typed, Style::default().fg(Color::White)),
    ];
    if let Some(rest) = completion.and_then(|c| c.strip_prefix(typed)) {
        spans.push(Span::styled(rest, Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

pub fn render(f: &mut Frame, app: &App) {
    let area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(MAX_SUGGESTIONS as u16 + 4),
        ])
        .split(f.area())[1];
    f.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let prompt = Paragraph::new(prompt_line(
        &app.command_text,
        app.command_preview.as_deref(),
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Span::styled(
                " Command ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(prompt, chunks[0]);

    let rows = app
        .command_suggestions
        .iter()
        .take(MAX_SUGGESTIONS)
        .enumerate()
        .map(|(i, cmd)| {
            let name_style = if i == app.command_suggestion_selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Row::new(vec![
                Line::from(Span::styled(format!(" {}", cmd), name_style)),
                Line::from(Span::styled(
                    describe_command(cmd),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        });

    let title = match app.command_suggestions.len() {
        0 => " No matching command ".to_string(),
        n => format!(" {} matches  ↑/↓ select  Tab complete ", n),
    };
    let table = Table::new(rows, [Constraint::Length(22), Constraint::Min(10)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(title, Style::default().fg(Color::DarkGray))),
    );
    f.render_widget(table, chunks[1]);
}

/// One-line description shown next to a suggestion
fn describe_command(cmd: &str) -> &'static str {
    match cmd {
        "files" => "Switch to the files view",
        "vector_stores" | "vs" => "Switch to the vector stores view",
        "notifications" => "Open the operation history",
        "notifications clear" => "Clear the operation history",
        "refresh" => "Refetch the current view",
        "reset" => "Clear search and facet filters",
        "columns" => "Choose visible columns",
        "facets" => "Filter by purpose, status or type",
        "quit" => "Exit vstui",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_every_builtin_command_is_described() {
        for cmd in ["files", "vs", "vector_stores", "refresh", "quit", "notifications clear"] {
            assert!(!describe_command(cmd).is_empty(), "{}", cmd);
        }
        assert_eq!(describe_command("bogus"), "");
    }

    #[test]
    fn test_prompt_ghosts_rest_of_completion() {
        assert_eq!(text(&prompt_line("ref", Some("refresh"))), [":", "ref", "resh"]);
        // Substring matches are not prefixes: nothing to ghost
        assert_eq!(text(&prompt_line("res", Some("refresh"))), [":", "res"]);
        assert_eq!(text(&prompt_line("", None)), [":", ""]);
    }
}
