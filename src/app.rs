//! Application State
//!
//! Central application state management for vstui.

use crate::api::{
    format_api_error, ApiError, AttachFile, File, FileCreateParams, ListOrder, ListParams,
    VectorStore, VectorStoreCreateParams,
};
use crate::config::Config;
use crate::dialog::{DialogController, FilesDialog, VectorStoresDialog};
use crate::form::{FileForm, VectorStoreForm};
use crate::query::cache::{FILES, VECTOR_STORES};
use crate::query::{QueryKey, Store};
use crate::resource::{
    extract_json_value, fetch_rows, get_resource, to_row, PaginatedResult, ResourceDef, View,
};
use crate::session::SessionTeardown;
use crate::upload::BatchUpload;
use anyhow::Result;
use crossterm::event::KeyCode;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

// =========================================================================
// Configuration Constants
// =========================================================================

/// Default viewport height (will be updated during render based on terminal size)
const DEFAULT_VIEWPORT_HEIGHT: usize = 20;

/// Page size used by the member drawer's file list
const DRAWER_PAGE_SIZE: u32 = 100;

/// Description attached to files without a filename
pub const UNTITLED_FILE: &str = "Untitled file";

const READONLY_WARNING: &str = "Read-only mode: write operations are disabled";

/// Application modes
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Normal,        // Viewing list
    Command,       // : command input
    Help,          // ? help popup
    Warning,       // Warning/info dialog (OK only)
    Describe,      // Viewing JSON details of selected item
    Notifications, // Notifications history panel
    ColumnConfig,  // Column visibility configuration
    Facets,        // Faceted filter selection
    Dialog,        // A view dialog is open (create, delete, upload, member drawer)
    SignIn,        // Credentials rejected, asking for a new API key
}

/// State for column configuration overlay
#[derive(Debug, Clone)]
pub struct ColumnConfigState {
    /// List of columns with visibility status
    pub columns: Vec<ColumnConfigItem>,
    /// Currently selected column index
    pub selected: usize,
}

/// Single column configuration item
#[derive(Debug, Clone)]
pub struct ColumnConfigItem {
    pub id: String,
    /// Column header name
    pub header: String,
    /// Whether the column is visible
    pub visible: bool,
    pub hideable: bool,
}

/// Cursor pagination state
#[derive(Debug, Clone)]
pub struct PaginationState {
    /// Cursor the current page was requested with
    pub after: Option<String>,
    /// Cursors of the pages before this one
    pub cursor_stack: Vec<Option<String>>,
    pub current_page: usize,
    pub has_more: bool,
    pub last_id: Option<String>,
    pub order: ListOrder,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            after: None,
            cursor_stack: Vec::new(),
            current_page: 1,
            has_more: false,
            last_id: None,
            order: ListOrder::default(),
        }
    }
}

/// Member files drawer of one vector store
#[derive(Debug, Clone, Default)]
pub struct DrawerState {
    pub store: Option<VectorStore>,
    /// Every file, members or not
    pub files: Vec<File>,
    /// Ids of files attached to the store
    pub members: HashSet<String>,
    pub selected: usize,
    /// File whose attach/detach is in flight
    pub pending_file: Option<String>,
    pub loading: bool,
}

impl DrawerState {
    pub fn is_member(&self, file_id: &str) -> bool {
        self.members.contains(file_id)
    }

    pub fn can_add(&self, file_id: &str) -> bool {
        self.pending_file.is_none() && !self.is_member(file_id)
    }

    pub fn can_remove(&self, file_id: &str) -> bool {
        self.pending_file.is_none() && self.is_member(file_id)
    }

    pub fn is_pending(&self, file_id: &str) -> bool {
        self.pending_file.as_deref() == Some(file_id)
    }

    pub fn selected_file(&self) -> Option<&File> {
        self.files.get(self.selected)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn next(&mut self) {
        if !self.files.is_empty() {
            self.selected = (self.selected + 1).min(self.files.len() - 1);
        }
    }

    pub fn previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

/// Description sent when attaching `file` to a store
pub fn attach_description(file: &File) -> String {
    if file.filename.trim().is_empty() {
        UNTITLED_FILE.to_string()
    } else {
        file.filename.clone()
    }
}

fn row_id<'a>(item: &'a Value, field: &str) -> &'a str {
    item.get(field).and_then(Value::as_str).unwrap_or_default()
}

/// A write queued by a key press. It runs on the next frame, after the
/// dialog has been drawn in its pending state.
#[derive(Debug, Clone)]
pub enum Mutation {
    Delete { view: View, id: String },
    CreateFile(FileCreateParams),
    CreateStore(VectorStoreCreateParams),
    Attach { store_id: String, file: File },
    Detach { store_id: String, file_id: String },
}

impl Mutation {
    /// True when the files dialog owns the pending guard
    fn on_files(&self) -> bool {
        match self {
            Self::Delete { view, .. } => *view == View::Files,
            Self::CreateFile(_) => true,
            Self::CreateStore(_) | Self::Attach { .. } | Self::Detach { .. } => false,
        }
    }
}

/// Main application state
pub struct App {
    // Data access
    pub store: Store,
    pub session: Arc<SessionTeardown>,

    // Current list view
    pub view: View,

    // Dynamic data storage (JSON rows)
    pub items: Vec<Value>,
    pub filtered_items: Vec<Value>,

    // Navigation state
    pub selected: usize,
    pub mode: Mode,
    pub filter_text: String,
    pub filter_active: bool,

    // Faceted filters: facet id -> selected values
    pub facet_filters: HashMap<String, HashSet<String>>,
    pub facet_cursor: usize,

    // Command input
    pub command_text: String,
    pub command_suggestions: Vec<String>,
    pub command_suggestion_selected: usize,
    pub command_preview: Option<String>,

    // Sorting
    pub sort_column: Option<usize>,
    pub sort_ascending: bool,

    // UI state
    pub loading: bool,
    pub error_message: Option<String>,
    pub describe_scroll: usize,
    pub describe_data: Option<Value>,

    // Persistent configuration
    pub config: Config,

    // Key press tracking
    pub last_key_press: Option<(KeyCode, Instant)>,

    // Read-only mode
    pub readonly: bool,

    // Warning message
    pub warning_message: Option<String>,

    // Pagination
    pub pagination: PaginationState,

    // Notifications panel
    pub notifications_selected: usize,

    // Virtual scrolling
    pub viewport_height: usize,
    pub scroll_offset: usize,

    // Column configuration state
    pub column_config_state: Option<ColumnConfigState>,

    // Dialogs
    pub files_dialog: DialogController<FilesDialog>,
    pub stores_dialog: DialogController<VectorStoresDialog>,
    pub confirm_yes: bool,
    pub file_form: FileForm,
    pub store_form: VectorStoreForm,
    pub batch: BatchUpload,
    pub batch_input: String,
    pub batch_selected: usize,
    pub drawer: DrawerState,
    queued: Option<Mutation>,

    // Sign-in prompt
    pub sign_in_input: String,
}

impl App {
    pub fn new(
        store: Store,
        session: Arc<SessionTeardown>,
        config: Config,
        view: View,
        readonly: bool,
    ) -> Self {
        Self {
            store,
            session,
            view,
            items: Vec::new(),
            filtered_items: Vec::new(),
            selected: 0,
            mode: Mode::Normal,
            filter_text: String::new(),
            filter_active: false,
            facet_filters: HashMap::new(),
            facet_cursor: 0,
            command_text: String::new(),
            command_suggestions: Vec::new(),
            command_suggestion_selected: 0,
            command_preview: None,
            sort_column: None,
            sort_ascending: true,
            loading: false,
            error_message: None,
            describe_scroll: 0,
            describe_data: None,
            config,
            last_key_press: None,
            readonly,
            warning_message: None,
            pagination: PaginationState::default(),
            notifications_selected: 0,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            scroll_offset: 0,
            column_config_state: None,
            files_dialog: DialogController::new(),
            stores_dialog: DialogController::new(),
            confirm_yes: false,
            file_form: FileForm::default(),
            store_form: VectorStoreForm::default(),
            batch: BatchUpload::new(),
            batch_input: String::new(),
            batch_selected: 0,
            drawer: DrawerState::default(),
            queued: None,
            sign_in_input: String::new(),
        }
    }

    // =========================================================================
    // View Definition Access
    // =========================================================================

    pub fn current_resource(&self) -> Option<&'static ResourceDef> {
        get_resource(self.view.key())
    }

    pub fn get_available_commands(&self) -> Vec<String> {
        let mut commands: Vec<String> = View::ALL.iter().map(|v| v.key().to_string()).collect();
        commands.push("vs".to_string());
        commands.push("notifications".to_string());
        commands.push("notifications clear".to_string());
        commands.push("refresh".to_string());
        commands.push("reset".to_string());
        commands.push("columns".to_string());
        commands.push("facets".to_string());
        commands.push("quit".to_string());
        commands.sort();
        commands
    }

    // =========================================================================
    // Data Fetching
    // =========================================================================

    pub fn list_params(&self) -> ListParams {
        ListParams {
            limit: Some(self.config.page_size),
            order: Some(self.pagination.order),
            after: self.pagination.after.clone(),
            ..Default::default()
        }
    }

    pub async fn refresh_current(&mut self) -> Result<()> {
        self.loading = true;
        self.error_message = None;

        let params = self.list_params();
        let result = fetch_rows(self.view, &self.store, &params).await;

        match result {
            Ok(page) => self.set_rows(page),
            Err(e) => self.show_fetch_error(&e),
        }

        self.loading = false;
        Ok(())
    }

    /// Replace the table rows with a freshly fetched page
    pub fn set_rows(&mut self, page: PaginatedResult) {
        let prev_selected = self.selected;
        self.items = page.items;
        self.pagination.has_more = page.has_more;
        self.pagination.last_id = page.last_id;
        self.apply_filter();

        self.selected = if prev_selected < self.filtered_items.len() {
            prev_selected
        } else {
            0
        };
    }

    fn show_fetch_error(&mut self, error: &ApiError) {
        if error.is_unauthorized() {
            return;
        }
        tracing::warn!("Failed to load {}: {}", self.view, error);
        self.error_message = Some(format_api_error(error));
        self.items.clear();
        self.filtered_items.clear();
        self.selected = 0;
    }

    /// Refetch the current view, bypassing the cache
    pub async fn force_refresh(&mut self) -> Result<()> {
        let prefix = match self.view {
            View::Files => QueryKey::new([FILES]),
            View::VectorStores => QueryKey::new([VECTOR_STORES]),
        };
        self.store.invalidate(&prefix);
        self.refresh_current().await
    }

    pub async fn next_page(&mut self) -> Result<()> {
        if !self.pagination.has_more {
            return Ok(());
        }
        let Some(cursor) = self.pagination.last_id.clone() else {
            return Ok(());
        };

        let current = self.pagination.after.replace(cursor);
        self.pagination.cursor_stack.push(current);
        self.pagination.current_page += 1;
        self.selected = 0;

        self.refresh_current().await
    }

    pub async fn prev_page(&mut self) -> Result<()> {
        let Some(cursor) = self.pagination.cursor_stack.pop() else {
            return Ok(());
        };

        self.pagination.after = cursor;
        self.pagination.current_page = self.pagination.current_page.saturating_sub(1).max(1);
        self.selected = 0;

        self.refresh_current().await
    }

    pub fn reset_pagination(&mut self) {
        let order = self.pagination.order;
        self.pagination = PaginationState {
            order,
            ..Default::default()
        };
    }

    /// Flip asc/desc and start again from the first page
    pub async fn toggle_order(&mut self) -> Result<()> {
        let order = self.pagination.order.toggled();
        self.pagination = PaginationState {
            order,
            ..Default::default()
        };
        self.selected = 0;
        self.refresh_current().await
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    pub fn apply_filter(&mut self) {
        let filter = self.filter_text.to_lowercase();
        let Some(resource) = self.current_resource() else {
            self.filtered_items = self.items.clone();
            return;
        };

        let facets: Vec<(&str, &HashSet<String>)> = resource
            .facets
            .iter()
            .filter_map(|facet| {
                self.facet_filters
                    .get(&facet.id)
                    .filter(|values| !values.is_empty())
                    .map(|values| (facet.json_path.as_str(), values))
            })
            .collect();

        self.filtered_items = self
            .items
            .iter()
            .filter(|item| {
                let matches_search = filter.is_empty()
                    || resource.search_fields.iter().any(|field| {
                        extract_json_value(item, field)
                            .to_lowercase()
                            .contains(&filter)
                    });
                let matches_facets = facets
                    .iter()
                    .all(|(path, values)| values.contains(&extract_json_value(item, path)));
                matches_search && matches_facets
            })
            .cloned()
            .collect();

        if self.selected >= self.filtered_items.len() && !self.filtered_items.is_empty() {
            self.selected = self.filtered_items.len() - 1;
        }
        self.scroll_offset = 0;

        // Re-apply sort if active
        if self.sort_column.is_some() {
            self.apply_sort();
        }
    }

    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
        self.apply_filter();
    }

    /// Clear the search box and every facet
    pub fn reset_filters(&mut self) {
        self.facet_filters.clear();
        self.clear_filter();
    }

    /// Flattened (facet id, value, label) entries of the current view
    pub fn facet_entries(&self) -> Vec<(String, String, String)> {
        let Some(resource) = self.current_resource() else {
            return Vec::new();
        };
        resource
            .facets
            .iter()
            .flat_map(|facet| {
                facet.values.iter().map(move |v| {
                    (
                        facet.id.clone(),
                        v.value.clone(),
                        format!("{}: {}", facet.label, v.label),
                    )
                })
            })
            .collect()
    }

    pub fn is_facet_selected(&self, facet: &str, value: &str) -> bool {
        self.facet_filters
            .get(facet)
            .is_some_and(|values| values.contains(value))
    }

    pub fn toggle_facet_at_cursor(&mut self) {
        let Some((facet, value, _)) = self.facet_entries().into_iter().nth(self.facet_cursor)
        else {
            return;
        };
        let values = self.facet_filters.entry(facet).or_default();
        if !values.remove(&value) {
            values.insert(value);
        }
        self.apply_filter();
    }

    pub fn active_facet_count(&self) -> usize {
        self.facet_filters.values().map(HashSet::len).sum()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn selected_item(&self) -> Option<&Value> {
        self.filtered_items.get(self.selected)
    }

    /// Id of the selected row
    pub fn selected_id(&self) -> Option<String> {
        let resource = self.current_resource()?;
        let id = extract_json_value(self.selected_item()?, &resource.id_field);
        (id != "-").then_some(id)
    }

    pub fn selected_item_json(&self) -> Option<String> {
        if let Some(ref data) = self.describe_data {
            return serde_json::to_string_pretty(data).ok();
        }
        self.selected_item()
            .and_then(|item| serde_json::to_string_pretty(item).ok())
    }

    pub fn describe_line_count(&self) -> usize {
        self.selected_item_json()
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }

    pub fn describe_scroll_to_bottom(&mut self, visible_lines: usize) {
        let total = self.describe_line_count();
        self.describe_scroll = total.saturating_sub(visible_lines);
    }

    pub fn next(&mut self) {
        if !self.filtered_items.is_empty() {
            self.selected = (self.selected + 1).min(self.filtered_items.len() - 1);
        }
    }

    pub fn previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn go_to_top(&mut self) {
        self.selected = 0;
    }

    pub fn go_to_bottom(&mut self) {
        if !self.filtered_items.is_empty() {
            self.selected = self.filtered_items.len() - 1;
        }
    }

    pub fn page_down(&mut self, page_size: usize) {
        if !self.filtered_items.is_empty() {
            self.selected = (self.selected + page_size).min(self.filtered_items.len() - 1);
        }
    }

    pub fn page_up(&mut self, page_size: usize) {
        self.selected = self.selected.saturating_sub(page_size);
    }

    pub async fn switch_view(&mut self, view: View) -> Result<()> {
        if self.view == view {
            return Ok(());
        }

        self.view = view;
        self.selected = 0;
        self.filter_text.clear();
        self.filter_active = false;
        self.facet_filters.clear();
        self.sort_column = None;
        self.scroll_offset = 0;
        self.mode = Mode::Normal;
        self.pagination = PaginationState::default();

        if let Err(e) = self.config.set_last_view(view.key()) {
            tracing::warn!("Failed to save view to config: {}", e);
        }

        self.refresh_current().await
    }

    pub fn get_breadcrumb(&self) -> Vec<String> {
        let mut path = vec![self.view.key().to_string()];
        if self.stores_dialog.is_open(VectorStoresDialog::ListFiles) {
            if let Some(store) = &self.drawer.store {
                path.push(store.name.clone());
            }
        }
        path
    }

    // =========================================================================
    // Mode Transitions
    // =========================================================================

    pub fn enter_command_mode(&mut self) {
        self.mode = Mode::Command;
        self.command_text.clear();
        self.command_suggestions = self.get_available_commands();
        self.command_suggestion_selected = 0;
        self.command_preview = None;
    }

    pub fn update_command_suggestions(&mut self) {
        let input = self.command_text.to_lowercase();
        let all_commands = self.get_available_commands();

        if input.is_empty() {
            self.command_suggestions = all_commands;
        } else {
            self.command_suggestions = all_commands
                .into_iter()
                .filter(|cmd| cmd.contains(&input))
                .collect();
        }

        if self.command_suggestion_selected >= self.command_suggestions.len() {
            self.command_suggestion_selected = 0;
        }

        self.update_preview();
    }

    fn update_preview(&mut self) {
        self.command_preview = self
            .command_suggestions
            .get(self.command_suggestion_selected)
            .cloned();
    }

    pub fn next_suggestion(&mut self) {
        if !self.command_suggestions.is_empty() {
            self.command_suggestion_selected =
                (self.command_suggestion_selected + 1) % self.command_suggestions.len();
            self.update_preview();
        }
    }

    pub fn prev_suggestion(&mut self) {
        if !self.command_suggestions.is_empty() {
            if self.command_suggestion_selected == 0 {
                self.command_suggestion_selected = self.command_suggestions.len() - 1;
            } else {
                self.command_suggestion_selected -= 1;
            }
            self.update_preview();
        }
    }

    pub fn apply_suggestion(&mut self) {
        if let Some(preview) = &self.command_preview {
            self.command_text = preview.clone();
            self.update_command_suggestions();
        }
    }

    pub fn enter_help_mode(&mut self) {
        self.mode = Mode::Help;
    }

    /// Show JSON details; vector stores are re-read through `retrieve`
    pub async fn enter_describe_mode(&mut self) {
        let Some(item) = self.selected_item().cloned() else {
            return;
        };

        self.mode = Mode::Describe;
        self.describe_scroll = 0;
        self.describe_data = Some(item);

        if self.view == View::VectorStores {
            let Some(id) = self.selected_id() else {
                return;
            };
            match self.store.vector_store(&id).await.and_then(|s| to_row(&s)) {
                Ok(detail) => self.describe_data = Some(detail),
                Err(e) if e.is_unauthorized() => {}
                Err(e) => self.error_message = Some(format_api_error(&e)),
            }
        }
    }

    pub fn show_warning(&mut self, message: &str) {
        self.warning_message = Some(message.to_string());
        self.mode = Mode::Warning;
    }

    pub fn enter_notifications_mode(&mut self) {
        self.notifications_selected = 0;
        self.mode = Mode::Notifications;
    }

    pub fn enter_facets_mode(&mut self) {
        if self.facet_entries().is_empty() {
            return;
        }
        self.facet_cursor = 0;
        self.mode = Mode::Facets;
    }

    pub fn enter_column_config_mode(&mut self) {
        let Some(resource) = self.current_resource() else {
            return;
        };

        let hidden = self.config.get_hidden_columns(self.view.key());

        let columns: Vec<ColumnConfigItem> = resource
            .columns
            .iter()
            .map(|col| ColumnConfigItem {
                id: col.id.clone(),
                header: col.header.clone(),
                visible: !col.hideable || !hidden.contains(&col.id),
                hideable: col.hideable,
            })
            .collect();

        self.column_config_state = Some(ColumnConfigState {
            columns,
            selected: 0,
        });
        self.mode = Mode::ColumnConfig;
    }

    /// Toggle visibility of the currently selected column in column config mode
    pub fn toggle_column_visibility(&mut self) {
        if let Some(ref mut state) = self.column_config_state {
            let visible_count = state.columns.iter().filter(|c| c.visible).count();
            let selected_idx = state.selected;

            if let Some(col) = state.columns.get_mut(selected_idx) {
                if !col.hideable {
                    return;
                }
                // Can't hide the last visible column
                if col.visible && visible_count <= 1 {
                    return;
                }
                col.visible = !col.visible;
            }
        }
    }

    /// Apply column configuration and save to config
    pub fn apply_column_config(&mut self) {
        if let Some(state) = self.column_config_state.take() {
            let hidden: HashSet<String> = state
                .columns
                .iter()
                .filter(|col| !col.visible)
                .map(|col| col.id.clone())
                .collect();

            if let Err(e) = self.config.set_hidden_columns(self.view.key(), hidden) {
                tracing::warn!("Failed to save column config: {}", e);
            }
        }
        self.mode = Mode::Normal;
    }

    /// Cancel column config without saving
    pub fn cancel_column_config(&mut self) {
        self.column_config_state = None;
        self.mode = Mode::Normal;
    }

    pub fn clear_notifications(&mut self) {
        self.store.notifications.clear();
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    pub fn sort_by_column(&mut self, column_index: usize) {
        if self.sort_column == Some(column_index) {
            self.sort_ascending = !self.sort_ascending;
        } else {
            self.sort_column = Some(column_index);
            self.sort_ascending = true;
        }
        self.apply_sort();
    }

    pub fn apply_sort(&mut self) {
        let Some(col_idx) = self.sort_column else {
            return;
        };
        let Some(resource) = self.current_resource() else {
            return;
        };
        let Some(column) = resource.columns.get(col_idx) else {
            return;
        };

        let path = column.sort_key().to_string();
        let ascending = self.sort_ascending;

        self.filtered_items.sort_by(|a, b| {
            let val_a = extract_json_value(a, &path);
            let val_b = extract_json_value(b, &path);

            // Try numeric comparison first
            let cmp = match (val_a.parse::<f64>(), val_b.parse::<f64>()) {
                (Ok(na), Ok(nb)) => na.partial_cmp(&nb).unwrap_or(std::cmp::Ordering::Equal),
                _ => val_a.cmp(&val_b),
            };

            if ascending {
                cmp
            } else {
                cmp.reverse()
            }
        });
    }

    pub fn clear_sort(&mut self) {
        self.sort_column = None;
        self.apply_filter(); // Re-apply filter to restore original order
    }

    pub fn exit_mode(&mut self) {
        self.mode = Mode::Normal;
        self.describe_data = None;
    }

    // =========================================================================
    // Dialogs
    // =========================================================================

    fn guard_readonly(&mut self) -> bool {
        if self.readonly {
            self.show_warning(READONLY_WARNING);
        }
        self.readonly
    }

    /// `c`: create dialog for the current view
    pub fn open_create_dialog(&mut self) {
        if self.guard_readonly() {
            return;
        }
        match self.view {
            View::Files => {
                self.file_form.reset();
                self.files_dialog.open(FilesDialog::Create, None);
            }
            View::VectorStores => {
                self.store_form.reset();
                self.stores_dialog.open(VectorStoresDialog::Create, None);
            }
        }
        self.mode = Mode::Dialog;
    }

    /// `x`/Delete: confirm deletion of the selected row
    pub fn open_delete_dialog(&mut self) {
        if self.guard_readonly() {
            return;
        }
        let Some(id) = self.selected_id() else {
            return;
        };
        match self.view {
            View::Files => self.files_dialog.open(FilesDialog::Delete, Some(id)),
            View::VectorStores => self.stores_dialog.open(VectorStoresDialog::Delete, Some(id)),
        }
        self.confirm_yes = false;
        self.mode = Mode::Dialog;
    }

    /// `u`: batch upload (files view)
    pub fn open_batch_dialog(&mut self) {
        if self.view != View::Files || self.guard_readonly() {
            return;
        }
        if !self.batch.is_running() {
            self.batch.reset();
            self.batch_input.clear();
            self.batch_selected = 0;
        }
        self.files_dialog.open(FilesDialog::BatchUpload, None);
        self.mode = Mode::Dialog;
    }

    /// `f`: member files drawer of the selected vector store
    pub async fn open_drawer(&mut self) -> Result<()> {
        if self.view != View::VectorStores {
            return Ok(());
        }
        let Some(id) = self.selected_id() else {
            return Ok(());
        };
        self.drawer = DrawerState::default();
        self.stores_dialog
            .open(VectorStoresDialog::ListFiles, Some(id));
        self.mode = Mode::Dialog;
        self.reload_drawer().await
    }

    /// Close whichever dialog is open. Refused while its mutation runs.
    pub fn close_dialog(&mut self) {
        let now = Instant::now();
        let closed = match self.view {
            View::Files => {
                let was_batch = self.files_dialog.is_open(FilesDialog::BatchUpload);
                let closed = !self.batch.is_running() && self.files_dialog.close_at(now);
                if closed && was_batch {
                    self.batch.reset();
                }
                closed
            }
            View::VectorStores => self.stores_dialog.close_at(now),
        };
        if closed {
            self.mode = Mode::Normal;
        }
    }

    /// Target row of the open dialog, resolved against the latest rows
    pub fn dialog_target(&self) -> Option<&Value> {
        let field = self.current_resource()?.id_field.as_str();
        match self.view {
            View::Files => self
                .files_dialog
                .resolve_row(&self.items, |item| row_id(item, field)),
            View::VectorStores => self
                .stores_dialog
                .resolve_row(&self.items, |item| row_id(item, field)),
        }
    }

    /// Confirmed delete of the dialog's target row
    pub fn queue_delete(&mut self) {
        let row = match self.view {
            View::Files => self.files_dialog.current_row(),
            View::VectorStores => self.stores_dialog.current_row(),
        };
        if let Some(id) = row.map(str::to_string) {
            self.enqueue(Mutation::Delete {
                view: self.view,
                id,
            });
        }
    }

    /// Validate the file form; a valid form is queued for upload
    pub fn queue_file_form(&mut self) {
        if let Some(params) = self.file_form.submit() {
            self.enqueue(Mutation::CreateFile(params));
        }
    }

    pub fn queue_store_form(&mut self) {
        if let Some(params) = self.store_form.submit() {
            self.enqueue(Mutation::CreateStore(params));
        }
    }

    /// Hold the owning dialog's pending guard and park the write for the
    /// next frame. Refused while another write is queued or running.
    fn enqueue(&mut self, mutation: Mutation) -> bool {
        let busy = if mutation.on_files() {
            self.files_dialog.is_pending()
        } else {
            self.stores_dialog.is_pending()
        };
        if busy || self.queued.is_some() {
            return false;
        }

        self.set_pending(mutation.on_files(), true);
        match &mutation {
            Mutation::Attach { file, .. } => self.drawer.pending_file = Some(file.id.clone()),
            Mutation::Detach { file_id, .. } => self.drawer.pending_file = Some(file_id.clone()),
            _ => {}
        }
        self.queued = Some(mutation);
        true
    }

    fn set_pending(&mut self, files: bool, pending: bool) {
        match (files, pending) {
            (true, true) => self.files_dialog.begin_pending(),
            (true, false) => self.files_dialog.end_pending(),
            (false, true) => self.stores_dialog.begin_pending(),
            (false, false) => self.stores_dialog.end_pending(),
        }
    }

    pub fn has_queued(&self) -> bool {
        self.queued.is_some()
    }

    /// Run the queued write, if any. The pending guard is released on
    /// every outcome.
    pub async fn run_queued(&mut self) -> Result<()> {
        let Some(mutation) = self.queued.take() else {
            return Ok(());
        };
        let files = mutation.on_files();
        let result = self.execute(mutation).await;
        self.set_pending(files, false);
        self.drawer.pending_file = None;
        result
    }

    async fn execute(&mut self, mutation: Mutation) -> Result<()> {
        match mutation {
            Mutation::Delete { view, id } => {
                let outcome = match view {
                    View::Files => self
                        .files_dialog
                        .guard(self.store.delete_file(&id))
                        .await
                        .map(|_| ()),
                    View::VectorStores => self
                        .stores_dialog
                        .guard(self.store.delete_vector_store(&id))
                        .await
                        .map(|_| ()),
                };
                match outcome {
                    Ok(()) => {
                        self.close_dialog();
                        self.refresh_current().await?;
                    }
                    // Already gone; the toast still reports it
                    Err(err) if err.is_not_found() => {
                        self.close_dialog();
                        self.force_refresh().await?;
                    }
                    Err(_) => {}
                }
            }
            Mutation::CreateFile(params) => {
                let outcome = self
                    .files_dialog
                    .guard(self.store.create_file(&params))
                    .await;
                match outcome {
                    Ok(_) => {
                        self.file_form.reset();
                        self.close_dialog();
                        self.refresh_current().await?;
                    }
                    Err(ApiError::Validation { field, message }) => {
                        self.file_form.error = Some(crate::form::FieldError { field, message });
                    }
                    Err(_) => {}
                }
            }
            Mutation::CreateStore(params) => {
                let outcome = self
                    .stores_dialog
                    .guard(self.store.create_vector_store(&params))
                    .await;
                if outcome.is_ok() {
                    self.store_form.reset();
                    self.close_dialog();
                    self.refresh_current().await?;
                }
            }
            Mutation::Attach { store_id, file } => {
                let request = vec![AttachFile {
                    file_id: file.id.clone(),
                    description: attach_description(&file),
                }];
                let outcome = self
                    .stores_dialog
                    .guard(self.store.attach_files(&store_id, request))
                    .await;
                if outcome.is_ok() {
                    self.reload_drawer().await?;
                    self.refresh_current().await?;
                }
            }
            Mutation::Detach { store_id, file_id } => {
                let outcome = self
                    .stores_dialog
                    .guard(self.store.detach_file(&store_id, &file_id))
                    .await;
                if outcome.is_ok() {
                    self.reload_drawer().await?;
                    self.refresh_current().await?;
                }
            }
        }
        Ok(())
    }

    /// Queue the typed path, or start the batch when the input is empty
    pub fn batch_submit_input(&mut self) {
        let input = self.batch_input.trim().to_string();
        if input.is_empty() {
            self.start_batch();
            return;
        }
        match self.batch.add(std::path::Path::new(&input)) {
            Ok(()) => {
                self.batch_input.clear();
                self.error_message = None;
            }
            Err(e) => self.error_message = Some(format_api_error(&e)),
        }
    }

    pub fn start_batch(&mut self) {
        match self.batch.start() {
            Ok(()) => {
                self.error_message = None;
                self.files_dialog.begin_pending();
            }
            Err(e) => self.error_message = Some(format_api_error(&e)),
        }
    }

    pub fn batch_remove_selected(&mut self) {
        if self.batch.remove(self.batch_selected) {
            self.batch_selected = self
                .batch_selected
                .min(self.batch.items().len().saturating_sub(1));
        }
    }

    // =========================================================================
    // Member Drawer
    // =========================================================================

    /// Load the store, all files and the store's members together
    pub async fn reload_drawer(&mut self) -> Result<()> {
        let Some(store_id) = self.stores_dialog.current_row().map(str::to_string) else {
            return Ok(());
        };

        self.drawer.loading = true;
        let files_params = ListParams::with_limit(DRAWER_PAGE_SIZE);
        let members_params = ListParams::with_limit(DRAWER_PAGE_SIZE);
        let result = futures::try_join!(
            self.store.vector_store(&store_id),
            self.store.list_files(&files_params),
            self.store.list_member_files(&store_id, &members_params),
        );
        self.drawer.loading = false;

        match result {
            Ok((store, files, members)) => {
                self.drawer.store = Some(store);
                self.drawer.files = files.data;
                self.drawer.members = members.data.into_iter().map(|m| m.id).collect();
                if self.drawer.selected >= self.drawer.files.len() {
                    self.drawer.selected = self.drawer.files.len().saturating_sub(1);
                }
            }
            Err(e) if e.is_unauthorized() => {}
            Err(e) => self.error_message = Some(format_api_error(&e)),
        }
        Ok(())
    }

    /// Attach the selected file; a no-op when it is already a member
    pub fn queue_drawer_add(&mut self) {
        if self.guard_readonly() {
            return;
        }
        let Some(store_id) = self.stores_dialog.current_row().map(str::to_string) else {
            return;
        };
        let Some(file) = self.drawer.selected_file().cloned() else {
            return;
        };
        if self.drawer.can_add(&file.id) {
            self.enqueue(Mutation::Attach { store_id, file });
        }
    }

    /// Detach the selected file; a no-op when it is not a member
    pub fn queue_drawer_remove(&mut self) {
        if self.guard_readonly() {
            return;
        }
        let Some(store_id) = self.stores_dialog.current_row().map(str::to_string) else {
            return;
        };
        let Some(file_id) = self.drawer.selected_file().map(|f| f.id.clone()) else {
            return;
        };
        if self.drawer.can_remove(&file_id) {
            self.enqueue(Mutation::Detach { store_id, file_id });
        }
    }

    // =========================================================================
    // Frame Tick / Session
    // =========================================================================

    /// Per-frame work: deferred dialog clears, one batch step, auto-close
    pub async fn tick(&mut self, now: Instant) -> Result<()> {
        self.files_dialog.tick(now);
        self.stores_dialog.tick(now);

        if self.mode != Mode::SignIn && self.batch.is_running() {
            self.batch.step(&mut self.store, now).await;
            if !self.batch.is_running() {
                self.files_dialog.end_pending();
                if self.view == View::Files {
                    self.refresh_current().await?;
                }
            }
        } else if self.files_dialog.is_open(FilesDialog::BatchUpload)
            && self.batch.should_auto_close(now)
        {
            if self.files_dialog.close_at(now) && self.view == View::Files {
                self.mode = Mode::Normal;
            }
            self.batch.reset();
        }

        self.check_session();
        Ok(())
    }

    /// Switch to the sign-in prompt once the backend rejected our key
    pub fn check_session(&mut self) {
        if !self.session.take_ended() {
            return;
        }
        if let Err(e) = self.config.clear_api_key() {
            tracing::warn!("Failed to clear stored API key: {}", e);
        }
        self.error_message = None;
        self.sign_in_input.clear();
        self.mode = Mode::SignIn;
    }

    /// Store the entered key and reload the current view
    pub async fn sign_in(&mut self) -> Result<()> {
        let key = self.sign_in_input.trim().to_string();
        if key.is_empty() {
            return Ok(());
        }

        self.store.api().set_token(Some(key.clone()));
        if let Err(e) = self.config.set_api_key(&key) {
            tracing::warn!("Failed to save API key: {}", e);
        }
        self.sign_in_input.clear();
        tracing::info!("Signed in with a new API key");

        self.mode = if self.files_dialog.is_closed() && self.stores_dialog.is_closed() {
            Mode::Normal
        } else {
            Mode::Dialog
        };
        self.force_refresh().await?;
        self.check_session();
        Ok(())
    }

    // =========================================================================
    // Virtual Scrolling
    // =========================================================================

    /// Update the viewport height (called from UI during render)
    pub fn update_viewport(&mut self, height: usize) {
        self.viewport_height = height.max(1);
    }

    /// Ensure the selected item is visible in the viewport
    pub fn ensure_visible(&mut self) {
        if self.filtered_items.is_empty() {
            self.scroll_offset = 0;
            return;
        }

        let visible_height = self.viewport_height;
        let margin = 2; // Keep cursor at least this far from edge

        if self.selected < self.scroll_offset + margin {
            self.scroll_offset = self.selected.saturating_sub(margin);
        } else if self.selected >= self.scroll_offset + visible_height.saturating_sub(margin) {
            self.scroll_offset = self
                .selected
                .saturating_sub(visible_height.saturating_sub(margin + 1));
        }

        // Viewports shorter than the margin
        if self.selected >= self.scroll_offset + visible_height {
            self.scroll_offset = (self.selected + 1).saturating_sub(visible_height);
        }

        let max_offset = self
            .filtered_items
            .len()
            .saturating_sub(self.viewport_height);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    /// Get the range of visible items based on scroll offset and viewport
    pub fn visible_range(&self) -> Range<usize> {
        let start = self.scroll_offset;
        let end = (self.scroll_offset + self.viewport_height).min(self.filtered_items.len());
        start..end
    }

    /// Toast duration from config
    pub fn toast_duration(&self) -> Duration {
        self.store.notifications.toast_duration
    }
}
