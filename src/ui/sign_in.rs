//! Sign-in prompt
//!
//! Shown after the backend rejected the API key. Input is masked.

use super::centered_rect;
use crate::app::App;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Masked rendering of a secret
pub(crate) fn mask(secret: &str) -> String {
    "•".repeat(secret.chars().count())
}

pub fn render(f: &mut Frame, app: &App) {
    let popup_area = centered_rect(50, 30, f.area());
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(
            " Sign in ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));

    let lines = vec![
        Line::from(""),
        Line::from("Your session has ended. Enter an API key to continue."),
        Line::from(""),
        Line::from(vec![
            Span::styled("API key: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}_", mask(&app.sign_in_input)),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Enter: sign in  Esc: quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    f.render_widget(
        Paragraph::new(lines).block(block).alignment(Alignment::Center),
        popup_area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_hides_every_char() {
        assert_eq!(mask(""), "");
        assert_eq!(mask("sk-é1"), "•••••");
    }
}
