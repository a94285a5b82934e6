//! Dialog Components
//!
//! Warning, delete confirmation, create forms and batch upload.

use super::{centered_rect, drawer, truncate_string};
use crate::api::{FilePurpose, VectorStoreType};
use crate::app::{App, Mode};
use crate::dialog::{FilesDialog, VectorStoresDialog};
use crate::form::{FieldError, SourceTab, StoreField};
use crate::resource::{extract_json_value, format_bytes, View};
use crate::upload::UploadStatus;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, app: &App) {
    if app.mode == Mode::Warning {
        render_warning_dialog(f, app);
        return;
    }

    match app.view {
        View::Files => match app.files_dialog.open_dialog() {
            Some(FilesDialog::Create) => render_file_form(f, app),
            Some(FilesDialog::Delete) => render_confirm_dialog(f, app),
            Some(FilesDialog::BatchUpload) => render_batch_dialog(f, app),
            None => {},
        },
        View::VectorStores => match app.stores_dialog.open_dialog() {
            Some(VectorStoresDialog::Create) => render_store_form(f, app),
            Some(VectorStoresDialog::Delete) => render_confirm_dialog(f, app),
            Some(VectorStoresDialog::ListFiles) => drawer::render(f, app),
            None => {},
        },
    }
}

fn popup_block(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            title,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
}

fn pending_line(pending: bool) -> Line<'static> {
    if pending {
        Line::from(Span::styled(
            "Working...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from("")
    }
}

fn field_error(error: &Option<FieldError>, field: &str) -> Line<'static> {
    match error {
        Some(e) if e.field == field => Line::from(Span::styled(
            format!("  {}", e.message),
            Style::default().fg(Color::Red),
        )),
        _ => Line::from(""),
    }
}

fn input_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let value_style = if focused {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::styled(format!(" {:<10}", label), Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{}{}", value, cursor), value_style),
    ])
}

fn render_confirm_dialog(f: &mut Frame, app: &App) {
    let (label, pending) = match app.view {
        View::Files => ("file", app.files_dialog.is_pending()),
        View::VectorStores => ("vector store", app.stores_dialog.is_pending()),
    };
    let name = app
        .dialog_target()
        .and_then(|item| {
            let field = &app.current_resource()?.name_field;
            let value = extract_json_value(item, field);
            (value != "-").then_some(value)
        })
        .or_else(|| {
            let row = match app.view {
                View::Files => app.files_dialog.current_row(),
                View::VectorStores => app.stores_dialog.current_row(),
            };
            row.map(str::to_string)
        })
        .unwrap_or_default();

    let popup_area = centered_rect(50, 25, f.area());
    f.render_widget(Clear, popup_area);

    let block = popup_block(" Confirm Delete ", Color::Red);
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let content_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(2),
        ])
        .split(inner);

    let message = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("Delete {} \"{}\"?", label, truncate_string(&name, 40)),
            Style::default().fg(Color::White),
        )),
        Line::from(Span::styled(
            "This cannot be undone.",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(message, content_chunks[0]);

    f.render_widget(
        Paragraph::new(pending_line(pending)).alignment(Alignment::Center),
        content_chunks[1],
    );

    let yes_style = if app.confirm_yes {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let no_style = if !app.confirm_yes {
        Style::default()
            .fg(Color::Black)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let buttons = Line::from(vec![
        Span::raw("  "),
        Span::styled(" Yes (y) ", yes_style),
        Span::raw("    "),
        Span::styled(" No (n) ", no_style),
        Span::raw("  "),
    ]);

    f.render_widget(
        Paragraph::new(buttons).alignment(Alignment::Center),
        content_chunks[2],
    );
}

fn purpose_line(selected: FilePurpose) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!(" {:<10}", "Purpose"),
        Style::default().fg(Color::DarkGray),
    )];
    for purpose in FilePurpose::ALL {
        let style = if purpose == selected {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", purpose.label()), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn render_file_form(f: &mut Frame, app: &App) {
    let form = &app.file_form;
    let popup_area = centered_rect(60, 40, f.area());
    f.render_widget(Clear, popup_area);

    let block = popup_block(" Upload File ", Color::Cyan);
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let tab_span = |tab: SourceTab| {
        let style = if form.tab == tab {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(format!(" {} ", tab.label()), style)
    };

    let (label, field) = match form.tab {
        SourceTab::File => ("Path", "file"),
        SourceTab::Url => ("URL", "url"),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(format!(" {:<10}", "Source"), Style::default().fg(Color::DarkGray)),
            tab_span(SourceTab::File),
            Span::raw(" "),
            tab_span(SourceTab::Url),
        ]),
        Line::from(""),
        purpose_line(form.purpose),
        Line::from(""),
        input_line(label, &form.input, true),
        field_error(&form.error, field),
        pending_line(app.files_dialog.is_pending()),
        Line::from(Span::styled(
            " Tab: source  ↑/↓: purpose  Enter: upload  Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    f.render_widget(Paragraph::new(lines), inner);
}

fn render_store_form(f: &mut Frame, app: &App) {
    let form = &app.store_form;
    let popup_area = centered_rect(50, 35, f.area());
    f.render_widget(Clear, popup_area);

    let block = popup_block(" Create Vector Store ", Color::Cyan);
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let type_focused = form.focus == StoreField::Type;
    let type_spans: Vec<Span> = [VectorStoreType::Text, VectorStoreType::Image]
        .into_iter()
        .map(|kind| {
            let marker = if form.kind == kind { "(•)" } else { "( )" };
            let style = if form.kind == kind && type_focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else if form.kind == kind {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(format!("{} {}  ", marker, kind.as_str()), style)
        })
        .collect();

    let mut type_line = vec![Span::styled(
        format!(" {:<10}", "Type"),
        Style::default().fg(Color::DarkGray),
    )];
    type_line.extend(type_spans);

    let lines = vec![
        Line::from(""),
        input_line("Name", &form.name, form.focus == StoreField::Name),
        field_error(&form.error, "name"),
        Line::from(type_line),
        Line::from(""),
        pending_line(app.stores_dialog.is_pending()),
        Line::from(Span::styled(
            " Tab: next field  Space: type  Enter: create  Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    f.render_widget(Paragraph::new(lines), inner);
}

fn status_style(status: &UploadStatus) -> Style {
    match status {
        UploadStatus::Pending => Style::default().fg(Color::DarkGray),
        UploadStatus::Uploading => Style::default().fg(Color::Yellow),
        UploadStatus::Success => Style::default().fg(Color::Green),
        UploadStatus::Error(_) => Style::default().fg(Color::Red),
    }
}

fn render_batch_dialog(f: &mut Frame, app: &App) {
    let batch = &app.batch;
    let popup_area = centered_rect(70, 70, f.area());
    f.render_widget(Clear, popup_area);

    let title = if batch.is_running() {
        " Batch Upload (running) ".to_string()
    } else if batch.finished_at().is_some() {
        format!(
            " Batch Upload ({} ok, {} failed) ",
            batch.success_count(),
            batch.error_count()
        )
    } else {
        " Batch Upload ".to_string()
    };
    let block = popup_block(&title, Color::Cyan);
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Purpose
            Constraint::Length(1), // Path input
            Constraint::Length(1), // Error
            Constraint::Min(1),    // Queue
            Constraint::Length(1), // Help
        ])
        .split(inner);

    f.render_widget(Paragraph::new(purpose_line(batch.purpose)), chunks[0]);
    f.render_widget(
        Paragraph::new(input_line("Add path", &app.batch_input, !batch.is_running())),
        chunks[1],
    );
    if let Some(err) = &app.error_message {
        f.render_widget(
            Paragraph::new(Span::styled(format!("  {}", err), Style::default().fg(Color::Red))),
            chunks[2],
        );
    }

    render_upload_queue(f, app, chunks[3]);

    let help = if batch.is_running() {
        " Uploading one file at a time..."
    } else {
        " Enter: add path (empty: start)  Tab: purpose  Del: remove  Ctrl+s: start  Esc: close"
    };
    f.render_widget(
        Paragraph::new(Span::styled(help, Style::default().fg(Color::DarkGray))),
        chunks[4],
    );
}

fn render_upload_queue(f: &mut Frame, app: &App, area: Rect) {
    let items = app.batch.items();
    if items.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No files queued",
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(Alignment::Center);
        f.render_widget(empty, area);
        return;
    }

    let rows: Vec<ListItem> = items
        .iter()
        .map(|item| {
            let status = match &item.status {
                UploadStatus::Error(msg) => format!("failed: {}", msg),
                other => other.label().to_string(),
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!(" {:<36}", truncate_string(&item.file_name(), 34))),
                Span::styled(
                    format!("{:>10}  ", format_bytes(item.size)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(status, status_style(&item.status)),
            ]))
        })
        .collect();

    let list = List::new(rows).highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );
    let mut state = ListState::default();
    if !app.batch.is_running() {
        state.select(Some(app.batch_selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn render_warning_dialog(f: &mut Frame, app: &App) {
    let Some(message) = &app.warning_message else {
        return;
    };

    let popup_area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, popup_area);

    let block = popup_block(" Warning ", Color::Yellow);
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter or Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(content).alignment(Alignment::Center);
    f.render_widget(paragraph, inner);
}
