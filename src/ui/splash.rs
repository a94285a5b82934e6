//! Splash Screen
//!
//! Loading screen shown during initialization, and the screen shown
//! instead of the console when no endpoint is configured.

use crate::config::{ENV_API_KEY, ENV_ENDPOINT};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

/// Splash screen state
pub struct SplashState {
    message: String,
    completed_steps: usize,
    total_steps: usize,
}

impl SplashState {
    pub fn new() -> Self {
        Self {
            message: "Initializing...".to_string(),
            completed_steps: 0,
            total_steps: 4,
        }
    }

    pub fn set_message(&mut self, message: &str) {
        self.message = message.to_string();
    }

    pub fn complete_step(&mut self) {
        self.completed_steps = (self.completed_steps + 1).min(self.total_steps);
    }

    fn progress(&self) -> f64 {
        self.completed_steps as f64 / self.total_steps as f64
    }
}

impl Default for SplashState {
    fn default() -> Self {
        Self::new()
    }
}

fn logo() -> Vec<Line<'static>> {
    let art = [
        "            _         _ ",
        " __   _____| |_ _   _(_)",
        " \\ \\ / / __| __| | | | |",
        "  \\ V /\\__ \\ |_| |_| | |",
        "   \\_/ |___/\\__|\\__,_|_|",
    ];
    let mut lines: Vec<Line<'static>> = art
        .iter()
        .map(|l| Line::from(Span::styled(*l, Style::default().fg(Color::Cyan))))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Files and vector stores from your terminal",
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )));
    lines
}

fn center_box(area: Rect, height: u16) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Length(height),
            Constraint::Percentage(30),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .split(chunks[1])[1]
}

pub fn render(f: &mut Frame, state: &SplashState) {
    let center = center_box(f.area(), 12);

    let logo_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = logo_block.inner(center);
    f.render_widget(logo_block, center);

    let inner_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(inner);

    f.render_widget(
        Paragraph::new(logo()).alignment(Alignment::Center),
        inner_chunks[0],
    );

    let progress = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan))
        .percent((state.progress() * 100.0) as u16)
        .label(Span::styled(
            &state.message,
            Style::default().fg(Color::White),
        ));

    f.render_widget(progress, inner_chunks[1]);
}

/// Shown when no endpoint is configured; any key exits
pub fn render_env_required(f: &mut Frame) {
    let center = center_box(f.area(), 18);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(
            " Environment required ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));

    let code = Style::default().fg(Color::Cyan);
    let mut lines = logo();
    lines.extend([
        Line::from(""),
        Line::from("No API endpoint is configured. Set it with one of:"),
        Line::from(""),
        Line::from(Span::styled(
            format!("export {}=https://api.example.com/v1", ENV_ENDPOINT),
            code,
        )),
        Line::from(Span::styled("vstui --endpoint https://api.example.com/v1", code)),
        Line::from(""),
        Line::from(format!(
            "Optionally set {} or pass --api-key for authenticated backends.",
            ENV_API_KEY
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to exit",
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    f.render_widget(
        Paragraph::new(lines).block(block).alignment(Alignment::Center),
        center,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_caps_at_total() {
        let mut state = SplashState::new();
        for _ in 0..10 {
            state.complete_step();
        }
        assert_eq!(state.progress(), 1.0);
    }
}
