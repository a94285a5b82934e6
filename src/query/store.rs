//! Data-access layer
//!
//! Cache-aware reads and notifying writes over the resource clients.

use super::cache::{
    CacheStats, QueryCache, QueryKey, FILES, MEMBER_FILES, VECTOR_STORE, VECTOR_STORES,
};
use crate::api::files::UploadSource;
use crate::api::{
    format_api_error, ApiClient, ApiError, AttachFile, AttachResult, DeletionReceipt, File,
    FileCreateParams, ListParams, Page, VectorStore, VectorStoreCreateParams, VectorStoreCreated,
    VectorStoreFile,
};
use crate::notification::{NotificationManager, OperationType};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

pub struct Store {
    api: ApiClient,
    cache: Mutex<QueryCache>,
    /// One gate per key with a fetch in flight; identical reads queue on it
    in_flight: Mutex<HashMap<QueryKey, Arc<tokio::sync::Mutex<()>>>>,
    pub notifications: NotificationManager,
}

impl Store {
    pub fn new(api: ApiClient, stale_time: Duration) -> Self {
        Self {
            api,
            cache: Mutex::new(QueryCache::new(stale_time)),
            in_flight: Mutex::new(HashMap::new()),
            notifications: NotificationManager::new(),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.lock_cache().stats()
    }

    fn lock_cache(&self) -> MutexGuard<'_, QueryCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop every cached read under `prefix` (toolbar refresh)
    pub fn invalidate(&self, prefix: &QueryKey) {
        self.lock_cache().invalidate_prefix(prefix);
    }

    // =========================================================================
    // Reads
    // =========================================================================

    fn gate(&self, key: &QueryKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut gates = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        gates.entry(key.clone()).or_default().clone()
    }

    fn release_gate(&self, key: &QueryKey, gate: Arc<tokio::sync::Mutex<()>>) {
        let mut gates = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the map and this caller still hold it: nobody is waiting
        if Arc::strong_count(&gate) <= 2 {
            gates.remove(key);
        }
    }

    /// Cached read. A caller arriving while an identical read is in flight
    /// waits for it and takes its result from the cache.
    async fn read<T, Fut>(&self, key: QueryKey, fetch: Fut) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let gate = self.gate(&key);
        let result = {
            let _running = gate.lock().await;
            self.read_gated(&key, fetch).await
        };
        self.release_gate(&key, gate);
        result
    }

    async fn read_gated<T, Fut>(&self, key: &QueryKey, fetch: Fut) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let cached = self.lock_cache().fresh(key, Instant::now());
        if let Some(value) = cached {
            return Ok(serde_json::from_value(value)?);
        }

        let data = fetch.await?;
        let value = serde_json::to_value(&data)?;
        tracing::debug!("fetched {}", key);
        self.lock_cache().store(key.clone(), value, Instant::now());
        Ok(data)
    }

    pub async fn list_files(&self, params: &ListParams) -> Result<Page<File>, ApiError> {
        self.read(QueryKey::files(params), self.api.files().list(params))
            .await
    }

    pub async fn list_vector_stores(
        &self,
        params: &ListParams,
    ) -> Result<Page<VectorStore>, ApiError> {
        self.read(
            QueryKey::vector_stores(params),
            self.api.vector_stores().list(params),
        )
        .await
    }

    pub async fn vector_store(&self, id: &str) -> Result<VectorStore, ApiError> {
        self.read(
            QueryKey::vector_store(id),
            self.api.vector_stores().retrieve(id),
        )
        .await
    }

    /// Member files of a store; an empty store id yields an empty page
    /// without touching the network
    pub async fn list_member_files(
        &self,
        store_id: &str,
        params: &ListParams,
    ) -> Result<Page<VectorStoreFile>, ApiError> {
        if store_id.is_empty() {
            return Ok(Page {
                object: "list".to_string(),
                data: Vec::new(),
                first_id: None,
                last_id: None,
                has_more: false,
            });
        }

        self.read(
            QueryKey::member_files(store_id, params),
            self.api.vector_stores().list_member_files(store_id, params),
        )
        .await
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Upload one file. Validation failures return before any request.
    pub async fn create_file(&mut self, params: &FileCreateParams) -> Result<File, ApiError> {
        let subject = match params.source()? {
            UploadSource::Url(url) => url,
            UploadSource::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        };

        let id = self
            .notifications
            .create_notification(OperationType::Upload, "file", &subject);
        let result = self.api.files().create(params).await;
        self.settle(id, result, &[QueryKey::new([FILES])], |file| {
            file.id.clone()
        })
    }

    pub async fn delete_file(&mut self, file_id: &str) -> Result<DeletionReceipt, ApiError> {
        let id = self
            .notifications
            .create_notification(OperationType::Delete, "file", file_id);
        let result = self.api.files().delete(file_id).await;
        self.settle(id, result, &[QueryKey::new([FILES])], |receipt| {
            receipt.id.clone()
        })
    }

    pub async fn create_vector_store(
        &mut self,
        params: &VectorStoreCreateParams,
    ) -> Result<VectorStoreCreated, ApiError> {
        if params.name.trim().is_empty() {
            return Err(ApiError::validation("name", "Name is required"));
        }

        let id = self.notifications.create_notification(
            OperationType::Create,
            "vector_store",
            &params.name,
        );
        let result = self.api.vector_stores().create(params).await;
        self.settle(id, result, &[QueryKey::new([VECTOR_STORES])], |created| {
            created.name.clone()
        })
    }

    pub async fn delete_vector_store(
        &mut self,
        store_id: &str,
    ) -> Result<DeletionReceipt, ApiError> {
        let id = self.notifications.create_notification(
            OperationType::Delete,
            "vector_store",
            store_id,
        );
        let result = self.api.vector_stores().delete(store_id).await;
        let result = self.settle(id, result, &[QueryKey::new([VECTOR_STORES])], |receipt| {
            receipt.id.clone()
        });

        if result.is_ok() {
            let mut cache = self.lock_cache();
            cache.remove_prefix(&QueryKey::new([VECTOR_STORE, store_id]));
            cache.remove_prefix(&QueryKey::new([MEMBER_FILES, store_id]));
        }
        result
    }

    pub async fn attach_files(
        &mut self,
        store_id: &str,
        files: Vec<AttachFile>,
    ) -> Result<AttachResult, ApiError> {
        if files.is_empty() {
            return Err(ApiError::validation("files", "Select at least one file"));
        }

        let requested = match files.as_slice() {
            [single] => single.description.clone(),
            many => format!("{} files", many.len()),
        };
        let id = self.notifications.create_notification(
            OperationType::Attach,
            "vector_store_file",
            &requested,
        );
        let result = self.api.vector_stores().attach_files(store_id, files).await;
        self.settle(id, result, &membership_keys(store_id), |attached| {
            match attached.files.as_slice() {
                [single] if !single.metadata.description.is_empty() => {
                    single.metadata.description.clone()
                }
                [_] => requested.clone(),
                many => format!("{} files", many.len()),
            }
        })
    }

    pub async fn detach_file(
        &mut self,
        store_id: &str,
        file_id: &str,
    ) -> Result<DeletionReceipt, ApiError> {
        let id = self.notifications.create_notification(
            OperationType::Detach,
            "vector_store_file",
            file_id,
        );
        let result = self
            .api
            .vector_stores()
            .detach_file(store_id, file_id)
            .await;
        self.settle(id, result, &membership_keys(store_id), |receipt| {
            receipt.id.clone()
        })
    }

    /// Apply a write's side effects: invalidate and toast on success, toast
    /// the backend message on failure. A 401 leaves no toast behind.
    fn settle<T>(
        &mut self,
        notification: Uuid,
        result: Result<T, ApiError>,
        invalidate: &[QueryKey],
        subject: impl FnOnce(&T) -> String,
    ) -> Result<T, ApiError> {
        match result {
            Ok(value) => {
                {
                    let mut cache = self.lock_cache();
                    for prefix in invalidate {
                        cache.invalidate_prefix(prefix);
                    }
                }
                self.notifications
                    .mark_success(notification, Some(subject(&value)));
                Ok(value)
            }
            Err(ApiError::Unauthorized) => {
                self.notifications.dismiss(notification);
                Err(ApiError::Unauthorized)
            }
            Err(e) => {
                tracing::warn!("write failed: {}", e);
                self.notifications
                    .mark_error(notification, format_api_error(&e));
                Err(e)
            }
        }
    }
}

/// Attach/detach change a store's members and its file counts
fn membership_keys(store_id: &str) -> [QueryKey; 3] {
    [
        QueryKey::new([MEMBER_FILES, store_id]),
        QueryKey::new([VECTOR_STORE, store_id]),
        QueryKey::new([VECTOR_STORES]),
    ]
}
