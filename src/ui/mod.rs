//! Terminal User Interface rendering module
//!
//! This module handles all UI rendering for vstui using the ratatui framework.
//! The files and vector stores views share one table renderer driven by the
//! view definitions in the resource registry.
//!
//! # Architecture
//!
//! - [`splash`] - Startup splash screen and endpoint-required screen
//! - `header` - Header bar with endpoint, session and cache info
//! - `help` - Help overlay showing keybindings
//! - `dialog` - Create, delete and batch upload dialogs
//! - `drawer` - Member files of one vector store
//! - `sign_in` - API key prompt after the session ended
//! - `command_box` - Command mode input (`:` key)
//! - `notifications` - Notification history panel
//!
//! # Virtual Scrolling
//!
//! The table rendering uses virtual scrolling for performance with large datasets.
//! Only visible rows are rendered, with a scrollbar indicating position.
//!
//! # JSON Highlighting
//!
//! The describe view provides syntax highlighting for JSON output:
//! - Keys in cyan
//! - Strings in green
//! - Numbers in light blue
//! - Booleans in magenta
//! - Null values in dark gray

mod column_config;
mod command_box;
mod dialog;
mod drawer;
mod facets;
mod header;
mod help;
mod notifications;
mod sign_in;
pub mod splash;

use crate::app::{App, Mode};
use crate::notification::NotificationStatus;
use crate::resource::{extract_json_value, get_color_for_value, ColumnDef};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Table, TableState,
    },
    Frame,
};

pub fn render(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Header (multi-line)
            Constraint::Min(1),    // Main content (table or describe)
            Constraint::Length(1), // Footer/crumb
        ])
        .split(f.area());

    header::render(f, app, chunks[0]);

    match app.mode {
        Mode::Describe => render_describe_view(f, app, chunks[1]),
        _ => render_main_content(f, app, chunks[1]),
    }

    render_crumb(f, app, chunks[2]);

    // Overlays
    match app.mode {
        Mode::Help => help::render(f, app),
        Mode::Warning | Mode::Dialog => dialog::render(f, app),
        Mode::Command => command_box::render(f, app),
        Mode::Notifications => notifications::render(f, app),
        Mode::ColumnConfig => column_config::render(f, app, f.area()),
        Mode::Facets => facets::render(f, app),
        Mode::SignIn => sign_in::render(f, app),
        _ => {},
    }
}

fn render_main_content(f: &mut Frame, app: &mut App, area: Rect) {
    let show_filter = app.filter_active || !app.filter_text.is_empty();

    if show_filter {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(area);

        render_filter_bar(f, app, chunks[0]);
        render_dynamic_table(f, app, chunks[1]);
    } else {
        render_dynamic_table(f, app, area);
    }
}

fn render_filter_bar(f: &mut Frame, app: &App, area: Rect) {
    let cursor_style = if app.filter_active {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let filter_display = if app.filter_active {
        format!("/{}_", app.filter_text)
    } else {
        format!("/{}", app.filter_text)
    };

    let paragraph = Paragraph::new(Line::from(vec![Span::styled(filter_display, cursor_style)]));
    f.render_widget(paragraph, area);
}

/// Build the table title: name, counts, facets and page
fn table_title(app: &App, display_name: &str) -> String {
    let count = app.filtered_items.len();
    let total = app.items.len();

    let facet_info = match app.active_facet_count() {
        0 => String::new(),
        n => format!(" [{} facet{}]", n, if n == 1 { "" } else { "s" }),
    };

    let page_info = if app.pagination.has_more || app.pagination.current_page > 1 {
        format!(
            " pg.{}{}",
            app.pagination.current_page,
            if app.pagination.has_more { "+" } else { "" }
        )
    } else {
        String::new()
    };

    if count == total {
        format!(" {}[{}]{}{} ", display_name, count, facet_info, page_info)
    } else {
        format!(
            " {}[{}/{}]{}{} ",
            display_name, count, total, facet_info, page_info
        )
    }
}

/// Render dynamic table based on current view definition
/// Uses virtual scrolling for performance with large datasets
fn render_dynamic_table(f: &mut Frame, app: &mut App, area: Rect) {
    let Some(resource) = app.current_resource() else {
        let msg = Paragraph::new("Unknown view").style(Style::default().fg(Color::Red));
        f.render_widget(msg, area);
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            table_title(app, &resource.display_name),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    if app.filtered_items.is_empty() {
        let message = if app.loading {
            "Loading..."
        } else if app.items.is_empty() {
            "Nothing here yet. Press c to create one."
        } else {
            "No rows match the current filters"
        };
        let empty = Paragraph::new(Span::styled(message, Style::default().fg(Color::DarkGray)))
            .alignment(Alignment::Center);
        f.render_widget(empty, inner_area);
        return;
    }

    // Calculate viewport - account for header row
    let visible_height = (inner_area.height as usize).saturating_sub(1);
    app.update_viewport(visible_height);
    app.ensure_visible();

    let total_items = app.filtered_items.len();
    let needs_scrollbar = total_items > visible_height;

    let table_area = if needs_scrollbar {
        Rect {
            width: inner_area.width.saturating_sub(1),
            ..inner_area
        }
    } else {
        inner_area
    };

    let range = app.visible_range();
    let hidden_columns = app.config.get_hidden_columns(app.view.key());

    // Keep original indices so F-key sorting lines up with the definition
    let visible_columns: Vec<(usize, &ColumnDef)> = resource
        .columns
        .iter()
        .enumerate()
        .filter(|(_, col)| !col.hideable || !hidden_columns.contains(&col.id))
        .collect();

    let header_cells: Vec<Cell> = visible_columns
        .iter()
        .map(|(orig_idx, col)| {
            let header_text = if app.sort_column == Some(*orig_idx) {
                let indicator = if app.sort_ascending { "▲" } else { "▼" };
                format!(" {} {}", col.header, indicator)
            } else {
                format!(" {}", col.header)
            };
            Cell::from(header_text).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        })
        .collect();

    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app.filtered_items[range.clone()]
        .iter()
        .map(|item| {
            let cells = visible_columns.iter().map(|(_, col)| {
                let value = extract_json_value(item, &col.json_path);
                let style = get_cell_style(&value, col);
                let display_value = format_cell_value(&value, col);
                Cell::from(format!(" {}", truncate_string(&display_value, 38))).style(style)
            });
            Row::new(cells)
        })
        .collect();

    let widths: Vec<Constraint> = visible_columns
        .iter()
        .map(|(_, col)| Constraint::Percentage(col.width))
        .collect();

    let table = Table::new(rows, widths).header(header).row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = TableState::default();
    if app.selected >= range.start && app.selected < range.end {
        state.select(Some(app.selected - range.start));
    }

    f.render_stateful_widget(table, table_area, &mut state);

    if needs_scrollbar {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .symbols(symbols::scrollbar::VERTICAL)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));

        let mut scrollbar_state = ScrollbarState::new(total_items.saturating_sub(visible_height))
            .position(app.scroll_offset);

        f.render_stateful_widget(scrollbar, inner_area, &mut scrollbar_state);
    }
}

/// Get cell style based on value and column definition
fn get_cell_style(value: &str, col: &ColumnDef) -> Style {
    if let Some(ref color_map_name) = col.color_map {
        if let Some([r, g, b]) = get_color_for_value(color_map_name, value) {
            return Style::default().fg(Color::Rgb(r, g, b));
        }
    }
    Style::default()
}

/// Format cell value, marking files the backend is still working on
fn format_cell_value(value: &str, col: &ColumnDef) -> String {
    if col.color_map.as_deref() == Some("file_status") && value == "pending" {
        return format!("{} ↻", value);
    }
    value.to_string()
}

/// Truncate string for display (Unicode-safe)
pub(crate) fn truncate_string(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count > max_len {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

fn render_describe_view(f: &mut Frame, app: &App, area: Rect) {
    let json = app
        .selected_item_json()
        .unwrap_or_else(|| "No item selected".to_string());

    let lines: Vec<Line> = json.lines().map(highlight_json_line).collect();
    let total_lines = lines.len();

    let title = if let Some(resource) = app.current_resource() {
        format!(" {} Details ", resource.display_name)
    } else {
        " Details ".to_string()
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

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let visible_lines = inner_area.height as usize;
    let max_scroll = total_lines.saturating_sub(visible_lines);
    let scroll = app.describe_scroll.min(max_scroll);

    let paragraph = Paragraph::new(lines).scroll((scroll as u16, 0));
    f.render_widget(paragraph, inner_area);

    if total_lines > visible_lines {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));
        let mut scrollbar_state = ScrollbarState::new(max_scroll + visible_lines).position(scroll);
        f.render_stateful_widget(scrollbar, inner_area, &mut scrollbar_state);
    }
}

/// Apply JSON syntax highlighting to a single line
fn highlight_json_line(line: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = line.chars().peekable();
    let mut current = String::new();
    let mut is_key = true;

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if !current.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut current)));
                }

                let mut string_content = String::from("\"");
                while let Some(next_c) = chars.next() {
                    string_content.push(next_c);
                    if next_c == '"' {
                        break;
                    }
                    if next_c == '\\' {
                        if let Some(escaped) = chars.next() {
                            string_content.push(escaped);
                        }
                    }
                }

                let style = if is_key {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default().fg(Color::Green)
                };
                spans.push(Span::styled(string_content, style));
            },
            ':' => {
                current.push(c);
                spans.push(Span::styled(
                    std::mem::take(&mut current),
                    Style::default().fg(Color::White),
                ));
                is_key = false;
            },
            ',' => {
                if !current.is_empty() {
                    let style = get_json_value_style(&current);
                    spans.push(Span::styled(std::mem::take(&mut current), style));
                }
                spans.push(Span::styled(",", Style::default().fg(Color::White)));
                is_key = true;
            },
            '{' | '}' | '[' | ']' => {
                if !current.is_empty() {
                    let style = get_json_value_style(&current);
                    spans.push(Span::styled(std::mem::take(&mut current), style));
                }
                spans.push(Span::styled(
                    c.to_string(),
                    Style::default().fg(Color::Yellow),
                ));
                if c == '{' || c == '[' {
                    is_key = c == '{';
                }
            },
            ' ' | '\t' => {
                if !current.is_empty() {
                    let style = get_json_value_style(&current);
                    spans.push(Span::styled(std::mem::take(&mut current), style));
                }
                spans.push(Span::raw(c.to_string()));
            },
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        let style = get_json_value_style(&current);
        spans.push(Span::styled(current, style));
    }

    Line::from(spans)
}

/// Get style for JSON values (numbers, booleans, null)
fn get_json_value_style(value: &str) -> Style {
    let trimmed = value.trim();
    if trimmed == "null" {
        Style::default().fg(Color::DarkGray)
    } else if trimmed == "true" || trimmed == "false" {
        Style::default().fg(Color::Magenta)
    } else if trimmed.parse::<f64>().is_ok() {
        Style::default().fg(Color::LightBlue)
    } else {
        Style::default().fg(Color::White)
    }
}

/// Keys available in the current view, shown when nothing else is
fn shortcuts_hint(app: &App) -> String {
    let mut hints = vec!["c:create", "x:delete"];
    match app.view {
        crate::resource::View::Files => hints.push("u:upload"),
        crate::resource::View::VectorStores => hints.push("f:files"),
    }
    hints.push("Tab:switch");
    if app.pagination.current_page > 1 {
        hints.push("[:prev");
    }
    if app.pagination.has_more {
        hints.push("]:next");
    }
    hints.join(" ")
}

fn render_crumb(f: &mut Frame, app: &App, area: Rect) {
    let crumb_display = app.get_breadcrumb().join(" > ");
    let notifications = &app.store.notifications;
    let toast = notifications.current_toast();

    let notification_indicator = {
        let in_progress = notifications.in_progress_count();
        if in_progress > 0 {
            format!(" [↻{}]", in_progress)
        } else if !notifications.notifications.is_empty() {
            " [n]".to_string()
        } else {
            String::new()
        }
    };

    let status_text = if let Some(err) = &app.error_message {
        format!("Error: {}", err)
    } else if let Some(notif) = toast {
        notif.toast_message()
    } else if app.loading {
        "Loading...".to_string()
    } else if app.mode == Mode::Describe {
        "j/k: scroll | q/d/Esc: back".to_string()
    } else if app.filter_active {
        "Type to filter | Enter: apply | Esc: clear".to_string()
    } else {
        shortcuts_hint(app)
    };

    let style = if app.error_message.is_some() {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else if let Some(notif) = toast {
        match notif.status {
            NotificationStatus::Success => Style::default().fg(Color::Green),
            NotificationStatus::Error(_) => Style::default().fg(Color::Red),
            NotificationStatus::InProgress => Style::default().fg(Color::Yellow),
        }
    } else if app.loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let indicator_style = if notifications.in_progress_count() > 0 {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let crumb = Line::from(vec![
        Span::styled(
            format!("<{}>", crumb_display),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::raw(" "),
        Span::styled(status_text, style),
        Span::styled(notification_indicator, indicator_style),
    ]);

    f.render_widget(Paragraph::new(crumb), area);
}

/// Centered popup area, as percentages of `r`
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
