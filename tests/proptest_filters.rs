//! Property-based tests using proptest
//!
//! These tests verify the table logic of the console (search, facets,
//! sorting, selection and virtual scrolling) using randomized rows.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::time::Duration;
use vstui::app::App;
use vstui::config::Config;
use vstui::query::Store;
use vstui::resource::{extract_json_value, PaginatedResult, View};
use vstui::session::connect;

const BYTES_COLUMN: usize = 4;
const FILENAME_COLUMN: usize = 1;

/// Generate an arbitrary files-table row
fn arb_file_row() -> impl Strategy<Value = Value> {
    (
        "[a-f0-9]{6}",                // id suffix
        "[A-Za-z][A-Za-z0-9_]{0,12}", // filename stem
        prop_oneof!["txt", "md", "pdf", "PNG"],
        prop_oneof!["file-extract", "retrieval-text", "retrieval-image", "storage"],
        prop_oneof!["success", "processed", "pending"],
        0u64..10_000_000,
        1_600_000_000i64..1_800_000_000,
    )
        .prop_map(|(id, stem, ext, purpose, status, bytes, created_at)| {
            json!({
                "id": format!("file-{}", id),
                "filename": format!("{}.{}", stem, ext),
                "purpose": purpose,
                "purpose_label": purpose,
                "status": status,
                "bytes": bytes,
                "bytes_display": format!("{} B", bytes),
                "created_at": created_at,
                "created_display": created_at.to_string()
            })
        })
}

fn arb_rows() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(arb_file_row(), 0..80)
}

/// Navigation operations on the table
#[derive(Debug, Clone)]
enum NavOp {
    Next,
    Previous,
    Top,
    Bottom,
    PageDown(usize),
    PageUp(usize),
}

fn arb_nav_op() -> impl Strategy<Value = NavOp> {
    prop_oneof![
        Just(NavOp::Next),
        Just(NavOp::Previous),
        Just(NavOp::Top),
        Just(NavOp::Bottom),
        (0usize..40).prop_map(NavOp::PageDown),
        (0usize..40).prop_map(NavOp::PageUp),
    ]
}

fn app_with_rows(rows: Vec<Value>) -> App {
    let (api, session) = connect("http://127.0.0.1:9", None, Duration::from_secs(1)).unwrap();
    let store = Store::new(api, Duration::from_secs(300));
    let mut app = App::new(store, session, Config::default(), View::Files, false);
    app.set_rows(PaginatedResult {
        items: rows,
        first_id: None,
        last_id: None,
        has_more: false,
    });
    app
}

fn ids(rows: &[Value]) -> Vec<String> {
    rows.iter().map(|r| extract_json_value(r, "id")).collect()
}

fn apply_nav(app: &mut App, op: &NavOp) {
    match op {
        NavOp::Next => app.next(),
        NavOp::Previous => app.previous(),
        NavOp::Top => app.go_to_top(),
        NavOp::Bottom => app.go_to_bottom(),
        NavOp::PageDown(n) => app.page_down(*n),
        NavOp::PageUp(n) => app.page_up(*n),
    }
}

proptest! {
    /// Search keeps exactly the rows whose filename or id contains the text
    #[test]
    fn filter_is_exact_subset(rows in arb_rows(), filter in "[a-zA-Z0-9]{0,3}") {
        let mut app = app_with_rows(rows.clone());
        app.filter_text = filter.clone();
        app.apply_filter();

        let needle = filter.to_lowercase();
        let expected: Vec<Value> = rows
            .iter()
            .filter(|r| {
                ["filename", "id"].iter().any(|f| {
                    extract_json_value(r, f).to_lowercase().contains(&needle)
                })
            })
            .cloned()
            .collect();

        prop_assert_eq!(&app.filtered_items, &expected);
        for item in &app.filtered_items {
            prop_assert!(rows.contains(item));
        }
    }

    /// Search is case-insensitive
    #[test]
    fn filter_ignores_case(rows in arb_rows(), filter in "[a-zA-Z0-9]{1,3}") {
        let mut app = app_with_rows(rows);

        app.filter_text = filter.to_lowercase();
        app.apply_filter();
        let lower = ids(&app.filtered_items);

        app.filter_text = filter.to_uppercase();
        app.apply_filter();
        let upper = ids(&app.filtered_items);

        prop_assert_eq!(lower, upper);
    }

    /// Facet values of the same facet are OR-ed, facets are AND-ed with search
    #[test]
    fn facets_narrow_results(rows in arb_rows(), toggles in prop::collection::vec(0usize..6, 0..6)) {
        let mut app = app_with_rows(rows.clone());
        for cursor in toggles {
            app.facet_cursor = cursor;
            app.toggle_facet_at_cursor();
        }

        let purposes = app.facet_filters.get("purpose").cloned().unwrap_or_default();
        let statuses = app.facet_filters.get("status").cloned().unwrap_or_default();
        let accepts = |set: &HashSet<String>, value: String| set.is_empty() || set.contains(&value);

        let expected: Vec<Value> = rows
            .iter()
            .filter(|r| {
                accepts(&purposes, extract_json_value(r, "purpose"))
                    && accepts(&statuses, extract_json_value(r, "status"))
            })
            .cloned()
            .collect();
        prop_assert_eq!(&app.filtered_items, &expected);
    }

    /// Resetting filters shows every row again
    #[test]
    fn reset_restores_all_rows(rows in arb_rows(), filter in "[a-z]{0,4}", cursor in 0usize..6) {
        let mut app = app_with_rows(rows.clone());
        app.filter_text = filter;
        app.filter_active = true;
        app.facet_cursor = cursor;
        app.toggle_facet_at_cursor();

        app.reset_filters();

        prop_assert_eq!(&app.filtered_items, &rows);
        prop_assert_eq!(app.active_facet_count(), 0);
        prop_assert!(!app.filter_active);
    }

    /// Numeric sort orders rows and keeps every row
    #[test]
    fn sort_by_size_is_ordered_permutation(rows in arb_rows(), descending in any::<bool>()) {
        let mut app = app_with_rows(rows.clone());
        app.sort_by_column(BYTES_COLUMN);
        if descending {
            app.sort_by_column(BYTES_COLUMN);
        }

        let sizes: Vec<u64> = app
            .filtered_items
            .iter()
            .map(|r| r["bytes"].as_u64().unwrap())
            .collect();
        for pair in sizes.windows(2) {
            if descending {
                prop_assert!(pair[0] >= pair[1]);
            } else {
                prop_assert!(pair[0] <= pair[1]);
            }
        }

        let mut sorted_ids = ids(&app.filtered_items);
        let mut original_ids = ids(&rows);
        sorted_ids.sort();
        original_ids.sort();
        prop_assert_eq!(sorted_ids, original_ids);
    }

    /// Text sort is lexicographic
    #[test]
    fn sort_by_filename_is_lexicographic(rows in arb_rows()) {
        let mut app = app_with_rows(rows);
        app.sort_by_column(FILENAME_COLUMN);

        let names: Vec<String> = app
            .filtered_items
            .iter()
            .map(|r| extract_json_value(r, "filename"))
            .collect();
        for pair in names.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
    }

    /// Clearing the sort restores the page order
    #[test]
    fn clear_sort_restores_order(rows in arb_rows()) {
        let mut app = app_with_rows(rows.clone());
        app.sort_by_column(BYTES_COLUMN);
        app.clear_sort();
        prop_assert_eq!(&app.filtered_items, &rows);
    }

    /// Selection never leaves the filtered rows
    #[test]
    fn selection_stays_in_bounds(rows in arb_rows(), ops in prop::collection::vec(arb_nav_op(), 0..50)) {
        let mut app = app_with_rows(rows);
        for op in &ops {
            apply_nav(&mut app, op);
            if app.filtered_items.is_empty() {
                prop_assert_eq!(app.selected, 0);
            } else {
                prop_assert!(app.selected < app.filtered_items.len());
            }
        }
    }

    /// Narrowing the filter clamps the selection
    #[test]
    fn filter_clamps_selection(rows in arb_rows(), filter in "[a-z]{1,2}") {
        let mut app = app_with_rows(rows);
        app.go_to_bottom();
        app.filter_text = filter;
        app.apply_filter();
        prop_assert!(app.filtered_items.is_empty() || app.selected < app.filtered_items.len());
    }

    /// The visible window always contains the selected row
    #[test]
    fn visible_range_contains_selection(
        rows in arb_rows(),
        height in 1usize..30,
        ops in prop::collection::vec(arb_nav_op(), 0..50),
    ) {
        let mut app = app_with_rows(rows);
        app.update_viewport(height);
        for op in &ops {
            apply_nav(&mut app, op);
            app.ensure_visible();

            let range = app.visible_range();
            prop_assert!(range.len() <= height);
            if !app.filtered_items.is_empty() {
                prop_assert!(range.contains(&app.selected));
            }
        }
    }
}
