//! Event Handling
//!
//! Keyboard and event handling for vstui.

use crate::app::{App, Mode};
use crate::dialog::{FilesDialog, VectorStoresDialog};
use crate::form::StoreField;
use crate::resource::View;
use anyhow::Result;
use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use std::time::{Duration, Instant};

/// Handle events, returns true if app should quit
pub async fn handle_events(app: &mut App) -> Result<bool> {
    if poll(Duration::from_millis(100))? {
        if let Event::Key(key) = read()? {
            let quit = handle_key_event(app, key.code, key.modifiers).await?;
            app.check_session();
            return Ok(quit);
        }
    }
    Ok(false)
}

pub async fn handle_key_event(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Result<bool> {
    // Global quit shortcut
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(true);
    }

    match app.mode {
        Mode::Normal => handle_normal_mode(app, code, modifiers).await,
        Mode::Command => handle_command_mode(app, code, modifiers).await,
        Mode::Help => handle_help_mode(app, code),
        Mode::Warning => handle_warning_mode(app, code),
        Mode::Describe => handle_describe_mode(app, code, modifiers),
        Mode::Notifications => handle_notifications_mode(app, code),
        Mode::ColumnConfig => handle_column_config_mode(app, code),
        Mode::Facets => handle_facets_mode(app, code),
        Mode::Dialog => handle_dialog_mode(app, code, modifiers).await,
        Mode::SignIn => handle_sign_in_mode(app, code, modifiers).await,
    }
}

async fn handle_normal_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Result<bool> {
    // Double-g goes to top
    if code == KeyCode::Char('g') {
        if let Some((KeyCode::Char('g'), time)) = app.last_key_press {
            if time.elapsed() < Duration::from_millis(1000) {
                app.go_to_top();
                app.last_key_press = None;
                return Ok(false);
            }
        }
        app.last_key_press = Some((code, Instant::now()));
        return Ok(false);
    }

    app.last_key_press = None;

    // Handle filter input first
    if app.filter_active {
        match code {
            KeyCode::Esc => {
                app.clear_filter();
            },
            KeyCode::Enter => {
                app.filter_active = false;
            },
            KeyCode::Backspace => {
                app.filter_text.pop();
                app.apply_filter();
            },
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                app.filter_text.push(c);
                app.apply_filter();
            },
            _ => {},
        }
        return Ok(false);
    }

    match code {
        KeyCode::Char('q') => return Ok(true),

        // Navigation - vim style + accessible alternatives
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.previous(),
        KeyCode::Home => app.go_to_top(),
        KeyCode::End | KeyCode::Char('G') => app.go_to_bottom(),
        KeyCode::PageDown => app.page_down(10),
        KeyCode::PageUp => app.page_up(10),
        KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.page_down(10);
        },
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.page_up(10);
        },

        // Sorting with F1-F8
        KeyCode::F(n @ 1..=8) => {
            app.sort_by_column((n - 1) as usize);
        },
        KeyCode::F(12) => {
            app.clear_sort();
        },

        // Pagination
        KeyCode::Char(']') => {
            app.next_page().await?;
        },
        KeyCode::Char('[') => {
            app.prev_page().await?;
        },
        KeyCode::Char('o') => {
            app.toggle_order().await?;
        },

        // Refresh bypasses the cache
        KeyCode::Char('R') => {
            app.reset_pagination();
            app.force_refresh().await?;
        },

        // Switch between files and vector stores
        KeyCode::Tab => {
            let next = app.view.toggled();
            app.switch_view(next).await?;
        },

        KeyCode::Enter | KeyCode::Char('d') => {
            app.enter_describe_mode().await;
        },

        KeyCode::Char('/') => {
            app.filter_active = true;
        },
        KeyCode::Char('F') => {
            app.enter_facets_mode();
        },
        KeyCode::Char('r') => {
            app.reset_filters();
        },
        KeyCode::Char('v') => {
            app.enter_column_config_mode();
        },
        KeyCode::Char('n') => {
            app.enter_notifications_mode();
        },
        KeyCode::Char(':') => {
            app.enter_command_mode();
        },
        KeyCode::Char('?') => {
            app.enter_help_mode();
        },

        // Writes
        KeyCode::Char('c') => {
            app.open_create_dialog();
        },
        KeyCode::Char('x') | KeyCode::Delete => {
            app.open_delete_dialog();
        },
        KeyCode::Char('u') => {
            app.open_batch_dialog();
        },
        KeyCode::Char('f') => {
            app.open_drawer().await?;
        },

        _ => {},
    }

    Ok(false)
}

async fn handle_command_mode(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Result<bool> {
    match code {
        KeyCode::Esc => {
            app.exit_mode();
        },
        KeyCode::Enter => {
            app.exit_mode();
            return execute_command(app).await;
        },
        KeyCode::Backspace => {
            app.command_text.pop();
            app.update_command_suggestions();
        },
        KeyCode::Tab | KeyCode::Right => {
            app.apply_suggestion();
        },
        KeyCode::Down => {
            app.next_suggestion();
        },
        KeyCode::Up => {
            app.prev_suggestion();
        },
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_text.push(c);
            app.update_command_suggestions();
        },
        _ => {},
    }
    Ok(false)
}

/// Run the typed command (or the highlighted suggestion)
async fn execute_command(app: &mut App) -> Result<bool> {
    let command_text = match &app.command_preview {
        Some(preview) if app.command_text.is_empty() || preview.contains(&app.command_text) => {
            preview.clone()
        }
        _ => app.command_text.clone(),
    };

    let parts: Vec<&str> = command_text.split_whitespace().collect();
    let Some(&cmd) = parts.first() else {
        return Ok(false);
    };

    match cmd {
        "q" | "quit" => return Ok(true),
        "notifications" => {
            if parts.get(1) == Some(&"clear") {
                app.clear_notifications();
            } else {
                app.enter_notifications_mode();
            }
        },
        "refresh" => {
            app.reset_pagination();
            app.force_refresh().await?;
        },
        "reset" => app.reset_filters(),
        "columns" => app.enter_column_config_mode(),
        "facets" => app.enter_facets_mode(),
        _ => match View::parse(cmd) {
            Some(view) => app.switch_view(view).await?,
            None => app.error_message = Some(format!("Unknown command: {}", cmd)),
        },
    }

    Ok(false)
}

fn handle_help_mode(app: &mut App, code: KeyCode) -> Result<bool> {
    if matches!(
        code,
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Enter
    ) {
        app.exit_mode();
    }
    Ok(false)
}

fn handle_warning_mode(app: &mut App, code: KeyCode) -> Result<bool> {
    if matches!(code, KeyCode::Esc | KeyCode::Enter) {
        app.warning_message = None;
        app.exit_mode();
    }
    Ok(false)
}

fn handle_describe_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Result<bool> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace => {
            app.exit_mode();
        },
        KeyCode::Char('j') | KeyCode::Down => {
            app.describe_scroll = app.describe_scroll.saturating_add(1);
        },
        KeyCode::Char('k') | KeyCode::Up => {
            app.describe_scroll = app.describe_scroll.saturating_sub(1);
        },
        KeyCode::PageDown => {
            app.describe_scroll = app.describe_scroll.saturating_add(10);
        },
        KeyCode::PageUp => {
            app.describe_scroll = app.describe_scroll.saturating_sub(10);
        },
        KeyCode::Char('d') => {
            if modifiers.contains(KeyModifiers::CONTROL) {
                app.describe_scroll = app.describe_scroll.saturating_add(10);
            } else {
                app.exit_mode();
            }
        },
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.describe_scroll = app.describe_scroll.saturating_sub(10);
        },
        KeyCode::Char('g') | KeyCode::Home => {
            app.describe_scroll = 0;
        },
        KeyCode::Char('G') | KeyCode::End => {
            app.describe_scroll_to_bottom(30); // Approximate visible lines
        },
        _ => {},
    }
    Ok(false)
}

fn handle_notifications_mode(app: &mut App, code: KeyCode) -> Result<bool> {
    let count = app.store.notifications.notifications.len();
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('n') => app.exit_mode(),
        KeyCode::Char('j') | KeyCode::Down => {
            if count > 0 {
                app.notifications_selected = (app.notifications_selected + 1).min(count - 1);
            }
        },
        KeyCode::Char('k') | KeyCode::Up => {
            app.notifications_selected = app.notifications_selected.saturating_sub(1);
        },
        KeyCode::Char('C') => {
            app.clear_notifications();
            app.notifications_selected = 0;
        },
        _ => {},
    }
    Ok(false)
}

fn handle_column_config_mode(app: &mut App, code: KeyCode) -> Result<bool> {
    match code {
        KeyCode::Esc => app.cancel_column_config(),
        KeyCode::Enter => app.apply_column_config(),
        KeyCode::Char(' ') => app.toggle_column_visibility(),
        KeyCode::Char('j') | KeyCode::Down => {
            if let Some(ref mut state) = app.column_config_state {
                if !state.columns.is_empty() {
                    state.selected = (state.selected + 1).min(state.columns.len() - 1);
                }
            }
        },
        KeyCode::Char('k') | KeyCode::Up => {
            if let Some(ref mut state) = app.column_config_state {
                state.selected = state.selected.saturating_sub(1);
            }
        },
        _ => {},
    }
    Ok(false)
}

fn handle_facets_mode(app: &mut App, code: KeyCode) -> Result<bool> {
    let count = app.facet_entries().len();
    match code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('F') => app.exit_mode(),
        KeyCode::Char(' ') => app.toggle_facet_at_cursor(),
        KeyCode::Char('r') => app.reset_filters(),
        KeyCode::Char('j') | KeyCode::Down => {
            if count > 0 {
                app.facet_cursor = (app.facet_cursor + 1).min(count - 1);
            }
        },
        KeyCode::Char('k') | KeyCode::Up => {
            app.facet_cursor = app.facet_cursor.saturating_sub(1);
        },
        _ => {},
    }
    Ok(false)
}

// =========================================================================
// Dialogs
// =========================================================================

async fn handle_dialog_mode(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Result<bool> {
    match app.view {
        View::Files => match app.files_dialog.open_dialog() {
            Some(FilesDialog::Create) => handle_file_form(app, code, modifiers),
            Some(FilesDialog::Delete) => handle_confirm(app, code),
            Some(FilesDialog::BatchUpload) => handle_batch(app, code, modifiers),
            None => app.exit_mode(),
        },
        View::VectorStores => match app.stores_dialog.open_dialog() {
            Some(VectorStoresDialog::Create) => handle_store_form(app, code, modifiers),
            Some(VectorStoresDialog::Delete) => handle_confirm(app, code),
            Some(VectorStoresDialog::ListFiles) => handle_drawer(app, code).await?,
            None => app.exit_mode(),
        },
    }
    Ok(false)
}

fn handle_confirm(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
            app.close_dialog();
        },
        KeyCode::Left | KeyCode::Char('h') => {
            app.confirm_yes = true;
        },
        KeyCode::Right | KeyCode::Char('l') => {
            app.confirm_yes = false;
        },
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.queue_delete();
        },
        KeyCode::Enter => {
            if app.confirm_yes {
                app.queue_delete();
            } else {
                app.close_dialog();
            }
        },
        _ => {},
    }
}

fn handle_file_form(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        KeyCode::Esc => app.close_dialog(),
        KeyCode::Enter => app.queue_file_form(),
        KeyCode::Tab => app.file_form.toggle_tab(),
        KeyCode::Up | KeyCode::Down => app.file_form.cycle_purpose(),
        KeyCode::Backspace => app.file_form.pop_char(),
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            app.file_form.push_char(c);
        },
        _ => {},
    }
}

fn handle_store_form(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        KeyCode::Esc => app.close_dialog(),
        KeyCode::Enter => app.queue_store_form(),
        KeyCode::Tab | KeyCode::Down | KeyCode::Up => app.store_form.next_field(),
        KeyCode::Left | KeyCode::Right if app.store_form.focus == StoreField::Type => {
            app.store_form.kind = app.store_form.kind.toggled();
        },
        KeyCode::Backspace => app.store_form.pop_char(),
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            app.store_form.push_char(c);
        },
        _ => {},
    }
}

fn handle_batch(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    let running = app.batch.is_running();
    match code {
        KeyCode::Esc => app.close_dialog(),
        _ if running => {},
        KeyCode::Enter => app.batch_submit_input(),
        KeyCode::Tab => app.batch.purpose = app.batch.purpose.cycle(),
        KeyCode::Down => {
            let count = app.batch.items().len();
            if count > 0 {
                app.batch_selected = (app.batch_selected + 1).min(count - 1);
            }
        },
        KeyCode::Up => {
            app.batch_selected = app.batch_selected.saturating_sub(1);
        },
        KeyCode::Delete => app.batch_remove_selected(),
        KeyCode::Char('s') if modifiers.contains(KeyModifiers::CONTROL) => app.start_batch(),
        KeyCode::Backspace => {
            app.batch_input.pop();
        },
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            app.batch_input.push(c);
        },
        _ => {},
    }
}

async fn handle_drawer(app: &mut App, code: KeyCode) -> Result<()> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.close_dialog();
        },
        KeyCode::Char('j') | KeyCode::Down => app.drawer.next(),
        KeyCode::Char('k') | KeyCode::Up => app.drawer.previous(),
        KeyCode::Char('a') => app.queue_drawer_add(),
        KeyCode::Char('r') | KeyCode::Delete => app.queue_drawer_remove(),
        KeyCode::Char('R') => app.reload_drawer().await?,
        _ => {},
    }
    Ok(())
}

async fn handle_sign_in_mode(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Result<bool> {
    match code {
        KeyCode::Esc => return Ok(true),
        KeyCode::Enter => app.sign_in().await?,
        KeyCode::Backspace => {
            app.sign_in_input.pop();
        },
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            app.sign_in_input.push(c);
        },
        _ => {},
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::query::Store;
    use crate::session::connect;

    fn test_app() -> App {
        let (api, session) = connect("http://127.0.0.1:9", None, Duration::from_secs(1)).unwrap();
        App::new(
            Store::new(api, Duration::from_secs(300)),
            session,
            Config::default(),
            View::Files,
            false,
        )
    }

    async fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key_event(app, code, KeyModifiers::NONE).await.unwrap()
    }

    #[tokio::test]
    async fn test_filter_typing() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('/')).await;
        press(&mut app, KeyCode::Char('a')).await;
        press(&mut app, KeyCode::Char('b')).await;
        assert_eq!(app.filter_text, "ab");
        press(&mut app, KeyCode::Esc).await;
        assert!(app.filter_text.is_empty());
        assert!(!app.filter_active);
    }

    #[tokio::test]
    async fn test_create_form_keys() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('c')).await;
        assert_eq!(app.mode, Mode::Dialog);
        assert!(app.files_dialog.is_open(FilesDialog::Create));

        press(&mut app, KeyCode::Tab).await;
        press(&mut app, KeyCode::Char('x')).await;
        // Invalid URL never reaches the network
        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.file_form.error.as_ref().unwrap().field, "url");
        assert!(app.files_dialog.is_open(FilesDialog::Create));

        press(&mut app, KeyCode::Esc).await;
        assert_eq!(app.mode, Mode::Normal);
    }

    #[tokio::test]
    async fn test_confirmed_delete_is_queued_with_guard_held() {
        let mut app = test_app();
        app.set_rows(crate::resource::PaginatedResult {
            items: vec![serde_json::json!({"id": "file-1", "filename": "a.txt"})],
            first_id: None,
            last_id: None,
            has_more: false,
        });
        press(&mut app, KeyCode::Char('x')).await;
        press(&mut app, KeyCode::Char('y')).await;

        // Nothing sent yet: the pending dialog is drawn first
        assert!(app.has_queued());
        assert!(app.files_dialog.is_pending());
        press(&mut app, KeyCode::Esc).await;
        assert!(app.files_dialog.is_open(FilesDialog::Delete));

        // A second confirm does not queue another write
        press(&mut app, KeyCode::Char('y')).await;
        assert!(app.has_queued());
    }

    #[tokio::test]
    async fn test_batch_requires_files() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('u')).await;
        assert!(app.files_dialog.is_open(FilesDialog::BatchUpload));
        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.error_message.as_deref(), Some("Select at least one file"));
        assert!(!app.batch.is_running());
    }

    #[tokio::test]
    async fn test_sign_in_escape_quits() {
        let mut app = test_app();
        app.mode = Mode::SignIn;
        press(&mut app, KeyCode::Char('k')).await;
        assert_eq!(app.sign_in_input, "k");
        assert!(press(&mut app, KeyCode::Esc).await);
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_from_any_mode() {
        let mut app = test_app();
        app.mode = Mode::Help;
        let quit = handle_key_event(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL)
            .await
            .unwrap();
        assert!(quit);
    }
}
