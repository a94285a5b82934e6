//! Integration tests for the API client and data-access layer using wiremock
//!
//! These tests run the resource clients, the cached store and the app's
//! dialog flows against mocked endpoints.

use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio_test::{assert_err, assert_ok};
use vstui::api::{
    ApiClient, ApiError, AttachFile, FileCreateParams, FilePurpose, ListParams,
    VectorStoreCreateParams, VectorStoreType,
};
use vstui::query::Store;
use vstui::session::{connect, SessionTeardown};
use wiremock::matchers::{
    bearer_token, body_json, body_string_contains, header_exists, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn client(server: &MockServer, key: Option<&str>) -> (ApiClient, std::sync::Arc<SessionTeardown>) {
    connect(&server.uri(), key.map(str::to_string), TIMEOUT).unwrap()
}

fn store(server: &MockServer) -> Store {
    let (api, _) = client(server, Some("sk-test"));
    Store::new(api, Duration::from_secs(300))
}

fn file_json(id: &str, filename: &str) -> Value {
    json!({
        "id": id,
        "object": "file",
        "filename": filename,
        "purpose": "retrieval-text",
        "bytes": 3,
        "status": "processed",
        "created_at": 1_700_000_000
    })
}

fn list_json(data: Vec<Value>) -> Value {
    let first = data.first().and_then(|d| d["id"].as_str()).map(str::to_string);
    let last = data.last().and_then(|d| d["id"].as_str()).map(str::to_string);
    json!({
        "object": "list",
        "data": data,
        "first_id": first,
        "last_id": last,
        "has_more": false
    })
}

fn temp_file(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"abc").unwrap();
    path
}

/// Resource clients against the wire
mod client_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_files_sends_bearer_and_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/files"))
            .and(bearer_token("sk-test"))
            .and(query_param("limit", "20"))
            .and(query_param("order", "desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_json(vec![
                file_json("file-1", "a.txt"),
                file_json("file-2", "b.txt"),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = client(&server, Some("sk-test"));
        let params = ListParams {
            limit: Some(20),
            order: Some(vstui::api::ListOrder::Desc),
            ..Default::default()
        };
        let page = assert_ok!(api.files().list(&params).await);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.last_id.as_deref(), Some("file-2"));
        assert_eq!(page.data[0].purpose, FilePurpose::RetrievalText);
    }

    #[tokio::test]
    async fn test_no_token_sends_no_authorization_header() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/vector_stores"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/vector_stores"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_json(vec![])))
            .mount(&server)
            .await;

        let (api, _) = client(&server, None);
        let page = assert_ok!(api.vector_stores().list(&ListParams::default()).await);
        assert!(page.data.is_empty());
    }

    #[tokio::test]
    async fn test_create_file_from_url_is_multipart() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/files"))
            .and(body_string_contains("name=\"purpose\""))
            .and(body_string_contains("storage"))
            .and(body_string_contains("https://example.com/a.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(file_json("file-9", "a.txt")))
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = client(&server, Some("sk-test"));
        let params = FileCreateParams::from_url(FilePurpose::Storage, "https://example.com/a.txt");
        let file = assert_ok!(api.files().create(&params).await);
        assert_eq!(file.id, "file-9");
    }

    #[tokio::test]
    async fn test_create_file_uploads_local_content() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let local = temp_file(&dir, "notes.md");

        Mock::given(method("POST"))
            .and(path("/files"))
            .and(body_string_contains("filename=\"notes.md\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(file_json("file-3", "notes.md")))
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = client(&server, Some("sk-test"));
        let params = FileCreateParams::from_path(FilePurpose::RetrievalText, local);
        assert_ok!(api.files().create(&params).await);
    }

    #[tokio::test]
    async fn test_create_file_without_source_never_hits_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (api, _) = client(&server, Some("sk-test"));
        let err = assert_err!(api.files().create(&FileCreateParams::default()).await);
        assert!(matches!(err, ApiError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_delete_file_returns_receipt() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/files/file-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "file-1",
                "object": "file",
                "deleted": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = client(&server, Some("sk-test"));
        let receipt = assert_ok!(api.files().delete("file-1").await);
        assert!(receipt.deleted);
    }

    #[tokio::test]
    async fn test_attach_and_detach_membership() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/vector_stores/vs_1/files"))
            .and(body_json(json!({
                "files": [{"file_id": "file-1", "description": "a.txt"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "files": [{
                    "id": "file-1",
                    "object": "vector_store.file",
                    "created_at": 1_700_000_000,
                    "vector_store_id": "vs_1",
                    "metadata": {"description": "a.txt", "file_name": "a.txt"}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/vector_stores/vs_1/files/file-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "file-1",
                "object": "vector_store.file.deleted",
                "deleted": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = client(&server, Some("sk-test"));
        let attached = assert_ok!(
            api.vector_stores()
                .attach_files(
                    "vs_1",
                    vec![AttachFile {
                        file_id: "file-1".to_string(),
                        description: "a.txt".to_string(),
                    }],
                )
                .await
        );
        assert_eq!(attached.files[0].vector_store_id, "vs_1");

        let receipt = assert_ok!(api.vector_stores().detach_file("vs_1", "file-1").await);
        assert_eq!(receipt.object, "vector_store.file.deleted");
    }

    #[tokio::test]
    async fn test_backend_error_message_is_verbatim() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/vector_stores/vs_missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"type": "not_found", "message": "No vector store vs_missing"}
            })))
            .mount(&server)
            .await;

        let (api, _) = client(&server, Some("sk-test"));
        let err = assert_err!(api.vector_stores().delete("vs_missing").await);
        assert!(err.is_not_found());
        assert_eq!(vstui::api::format_api_error(&err), "No vector store vs_missing");
    }
}

/// 401 handling
mod session_tests {
    use super::*;

    #[tokio::test]
    async fn test_unauthorized_tears_down_session_once() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/files"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"type": "unauthorized", "message": "bad key"}
            })))
            .mount(&server)
            .await;

        let (api, session) = client(&server, Some("sk-old"));
        let store = Store::new(api, Duration::from_secs(300));

        let err = assert_err!(store.list_files(&ListParams::default()).await);
        assert!(err.is_unauthorized());
        assert!(!store.api().has_token());
        assert!(session.take_ended());
        assert!(!session.take_ended());
    }

    #[tokio::test]
    async fn test_unauthorized_write_leaves_no_toast() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/files/file-1"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let mut store = store(&server);
        assert_err!(store.delete_file("file-1").await);
        assert!(store.notifications.notifications.is_empty());
    }
}

/// Cache and write side effects
mod store_tests {
    use super::*;

    #[tokio::test]
    async fn test_identical_reads_inside_window_hit_network_once() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/files"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(list_json(vec![file_json("file-1", "a.txt")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = store(&server);
        let params = ListParams::with_limit(20);
        let first = assert_ok!(store.list_files(&params).await);
        let second = assert_ok!(store.list_files(&params).await);
        assert_eq!(first, second);
        assert_eq!(store.cache_stats().hits, 1);
    }

    #[tokio::test]
    async fn test_concurrent_identical_reads_share_one_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/files"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(list_json(vec![file_json("file-1", "a.txt")]))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = store(&server);
        let params = ListParams::with_limit(20);
        let (first, second) = tokio::join!(store.list_files(&params), store.list_files(&params));

        assert_eq!(assert_ok!(first), assert_ok!(second));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
        assert_eq!(store.cache_stats().hits, 1);
        assert_eq!(store.cache_stats().misses, 1);
    }

    #[tokio::test]
    async fn test_concurrent_reads_of_different_keys_both_fetch() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/files"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(list_json(vec![]))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(2)
            .mount(&server)
            .await;

        let store = store(&server);
        let small_params = ListParams::with_limit(20);
        let large_params = ListParams::with_limit(50);
        let (small, large) = tokio::join!(
            store.list_files(&small_params),
            store.list_files(&large_params),
        );
        assert_ok!(small);
        assert_ok!(large);
    }

    #[tokio::test]
    async fn test_different_params_are_separate_entries() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_json(vec![])))
            .expect(2)
            .mount(&server)
            .await;

        let store = store(&server);
        assert_ok!(store.list_files(&ListParams::with_limit(20)).await);
        assert_ok!(store.list_files(&ListParams::with_limit(50)).await);
    }

    #[tokio::test]
    async fn test_create_file_invalidates_once_and_notifies_once() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_json(vec![])))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(file_json("file-7", "u.txt")))
            .expect(1)
            .mount(&server)
            .await;

        let mut store = store(&server);
        let params = ListParams::with_limit(20);
        assert_ok!(store.list_files(&params).await);

        let before = store.cache_stats().invalidations;
        let create = FileCreateParams::from_url(FilePurpose::Storage, "https://example.com/u.txt");
        assert_ok!(store.create_file(&create).await);

        assert_eq!(store.cache_stats().invalidations - before, 1);
        assert_eq!(store.notifications.success_count(), 1);
        assert_eq!(store.notifications.notifications.len(), 1);

        // Invalidated list refetches
        assert_ok!(store.list_files(&params).await);
    }

    #[tokio::test]
    async fn test_failed_write_toasts_backend_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/files"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"type": "invalid_request_error", "message": "URL unreachable"}
            })))
            .mount(&server)
            .await;

        let mut store = store(&server);
        let before = store.cache_stats().invalidations;
        let create = FileCreateParams::from_url(FilePurpose::Storage, "https://example.com/u.txt");
        assert_err!(store.create_file(&create).await);

        assert_eq!(store.cache_stats().invalidations, before);
        assert_eq!(store.notifications.error_count(), 1);
        let toast = store.notifications.current_toast().unwrap().toast_message();
        assert!(toast.contains("URL unreachable"));
    }

    #[tokio::test]
    async fn test_create_vector_store_then_list() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/vector_stores"))
            .and(body_json(json!({"name": "Docs", "type": "text"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "vs_1", "name": "Docs"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/vector_stores"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_json(vec![json!({
                "id": "vs_1",
                "object": "vector_store",
                "name": "Docs",
                "type": "text",
                "file_counts": {"total": 0, "completed": 0, "in_progress": 0, "failed": 0, "cancelled": 0},
                "created_at": 1_700_000_000
            })])))
            .mount(&server)
            .await;

        let mut store = store(&server);
        let created = assert_ok!(
            store
                .create_vector_store(&VectorStoreCreateParams {
                    name: "Docs".to_string(),
                    kind: VectorStoreType::Text,
                })
                .await
        );
        assert_eq!(created.id, "vs_1");

        let page = assert_ok!(store.list_vector_stores(&ListParams::default()).await);
        let listed = page.data.iter().find(|s| s.id == created.id).unwrap();
        assert_eq!(listed.name, "Docs");
        assert_eq!(listed.kind, VectorStoreType::Text);
        assert_eq!(listed.file_counts.total, 0);
    }

    #[tokio::test]
    async fn test_empty_store_id_lists_nothing_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let store = store(&server);
        let page = assert_ok!(store.list_member_files("", &ListParams::default()).await);
        assert!(page.data.is_empty());
        assert!(!page.has_more);
    }
}

/// Batch upload
mod batch_tests {
    use super::*;
    use vstui::upload::{BatchUpload, UploadStatus, AUTO_CLOSE_DELAY};

    #[tokio::test]
    async fn test_batch_with_one_failure_settles_every_item() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("POST"))
            .and(path("/files"))
            .and(body_string_contains("filename=\"b.txt\""))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": {"type": "server_error", "message": "disk full"}
            })))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(file_json("file-ok", "x.txt")))
            .expect(2)
            .mount(&server)
            .await;

        let mut store = store(&server);
        let mut batch = BatchUpload::new();
        for name in ["a.txt", "b.txt", "c.txt"] {
            assert_ok!(batch.add(&temp_file(&dir, name)));
        }
        assert_ok!(batch.start());

        // Not finished after the first item, so no close is scheduled
        let now = Instant::now();
        assert!(batch.step(&mut store, now).await);
        assert_eq!(batch.items()[0].status, UploadStatus::Uploading);
        assert!(batch.step(&mut store, now).await);
        assert_eq!(batch.items()[0].status, UploadStatus::Success);
        assert!(batch.finished_at().is_none());
        assert!(!batch.should_auto_close(now + AUTO_CLOSE_DELAY * 10));

        batch.run_to_completion(&mut store).await;

        assert!(!batch.is_running());
        assert!(batch.items().iter().all(|i| i.status.is_terminal()));
        assert_eq!(batch.success_count(), 2);
        assert_eq!(
            batch.items()[1].status,
            UploadStatus::Error("disk full".to_string())
        );

        let finished = batch.finished_at().unwrap();
        assert!(!batch.should_auto_close(finished));
        assert!(batch.should_auto_close(finished + AUTO_CLOSE_DELAY));
    }
}

/// App flows that reach the network
mod app_tests {
    use super::*;
    use vstui::app::{App, Mode};
    use vstui::config::Config;
    use vstui::dialog::{FilesDialog, VectorStoresDialog};
    use vstui::resource::View;

    fn app(server: &MockServer, view: View) -> App {
        let (api, session) = client(server, Some("sk-test"));
        App::new(
            Store::new(api, Duration::from_secs(300)),
            session,
            Config::default(),
            view,
            false,
        )
    }

    #[tokio::test]
    async fn test_delete_failure_releases_dialog_guard() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/files"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(list_json(vec![file_json("file-1", "a.txt")])),
            )
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/files/file-1"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": {"type": "server_error", "message": "try later"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut app = app(&server, View::Files);
        assert_ok!(app.refresh_current().await);
        app.open_delete_dialog();
        assert!(app.files_dialog.is_open(FilesDialog::Delete));

        app.queue_delete();
        assert!(app.files_dialog.is_pending());
        assert_ok!(app.run_queued().await);

        assert!(!app.files_dialog.is_pending());
        assert!(app.files_dialog.is_open(FilesDialog::Delete));
        assert_eq!(app.mode, Mode::Dialog);
        assert_eq!(app.store.notifications.error_count(), 1);

        // Guard released, so the dialog can be dismissed
        app.close_dialog();
        assert_eq!(app.mode, Mode::Normal);
    }

    #[tokio::test]
    async fn test_delete_of_missing_file_closes_and_refetches() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/files"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(list_json(vec![file_json("file-1", "a.txt")])),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_json(vec![])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/files/file-1"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"type": "not_found_error", "message": "No such file: file-1"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut app = app(&server, View::Files);
        assert_ok!(app.refresh_current().await);
        app.open_delete_dialog();
        app.queue_delete();
        assert_ok!(app.run_queued().await);

        assert_eq!(app.mode, Mode::Normal);
        assert!(!app.files_dialog.is_pending());
        assert!(app.items.is_empty());
        assert_eq!(app.store.notifications.error_count(), 1);
        assert_eq!(app.store.notifications.success_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_success_closes_and_refreshes() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/files"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(list_json(vec![file_json("file-1", "a.txt")])),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_json(vec![])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/files/file-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "file-1", "object": "file", "deleted": true
            })))
            .mount(&server)
            .await;

        let mut app = app(&server, View::Files);
        assert_ok!(app.refresh_current().await);
        app.open_delete_dialog();
        app.queue_delete();
        assert_ok!(app.run_queued().await);

        assert_eq!(app.mode, Mode::Normal);
        assert!(app.items.is_empty());
        assert_eq!(app.store.notifications.success_count(), 1);
    }

    #[tokio::test]
    async fn test_drawer_add_attaches_with_filename() {
        let server = MockServer::start().await;
        let store_json = json!({
            "id": "vs_1", "object": "vector_store", "name": "Docs", "type": "text",
            "file_counts": {"total": 1}, "created_at": 1_700_000_000
        });
        let member = |id: &str| json!({"id": id, "object": "vector_store.file", "vector_store_id": "vs_1"});

        Mock::given(method("GET"))
            .and(path("/vector_stores"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_json(vec![store_json.clone()])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/vector_stores/vs_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(store_json.clone()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files"))
            .and(query_param("limit", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_json(vec![
                file_json("file-1", "a.txt"),
                file_json("file-2", "b.txt"),
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/vector_stores/vs_1/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_json(vec![member("file-1")])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/vector_stores/vs_1/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_json(vec![
                member("file-1"),
                member("file-2"),
            ])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/vector_stores/vs_1/files"))
            .and(body_json(json!({
                "files": [{"file_id": "file-2", "description": "b.txt"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "files": [member("file-2")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut app = app(&server, View::VectorStores);
        assert_ok!(app.refresh_current().await);
        assert_ok!(app.open_drawer().await);
        assert!(app.stores_dialog.is_open(VectorStoresDialog::ListFiles));
        assert_eq!(app.drawer.files.len(), 2);
        assert_eq!(app.drawer.member_count(), 1);

        // Already a member: add is a no-op
        app.drawer.selected = 0;
        app.queue_drawer_add();
        assert!(!app.has_queued());

        app.drawer.selected = 1;
        app.queue_drawer_add();
        assert!(app.drawer.is_pending("file-2"));
        assert!(!app.drawer.can_remove("file-1"));
        assert_ok!(app.run_queued().await);
        assert!(app.drawer.is_member("file-2"));
        assert!(app.drawer.pending_file.is_none());
        assert!(!app.stores_dialog.is_pending());
    }

    #[tokio::test]
    async fn test_unauthorized_list_switches_to_sign_in() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/files"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let mut app = app(&server, View::Files);
        assert_ok!(app.refresh_current().await);
        assert!(app.error_message.is_none());

        app.check_session();
        assert_eq!(app.mode, Mode::SignIn);
        assert!(!app.store.api().has_token());
    }
}
