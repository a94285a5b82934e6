//! Vector stores resource client

use super::client::ApiClient;
use super::error::ApiError;
use super::types::{
    AttachFile, AttachFilesRequest, AttachResult, DeletionReceipt, ListParams, Page, VectorStore,
    VectorStoreCreateParams, VectorStoreCreated, VectorStoreFile,
};

const BASE: &str = "vector_stores";

pub struct VectorStoresApi<'a> {
    client: &'a ApiClient,
}

impl<'a> VectorStoresApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `GET /vector_stores`
    pub async fn list(&self, params: &ListParams) -> Result<Page<VectorStore>, ApiError> {
        let url = self.client.url(&[BASE]);
        // The type filter only applies to files
        let params = ListParams {
            kind: None,
            ..params.clone()
        };
        let value = self.client.get(&url, &params.query_pairs()).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `POST /vector_stores`
    pub async fn create(
        &self,
        params: &VectorStoreCreateParams,
    ) -> Result<VectorStoreCreated, ApiError> {
        if params.name.trim().is_empty() {
            return Err(ApiError::validation("name", "Name is required"));
        }

        let url = self.client.url(&[BASE]);
        let body = serde_json::to_value(params)?;
        let value = self.client.post_json(&url, &body).await?;
        let created: VectorStoreCreated = serde_json::from_value(value)?;
        tracing::info!("Created vector store {} ({})", created.id, params.kind);
        Ok(created)
    }

    /// `GET /vector_stores/{id}`
    pub async fn retrieve(&self, id: &str) -> Result<VectorStore, ApiError> {
        let url = self.client.url(&[BASE, id]);
        let value = self.client.get(&url, &[]).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `DELETE /vector_stores/{id}`
    pub async fn delete(&self, id: &str) -> Result<DeletionReceipt, ApiError> {
        let url = self.client.url(&[BASE, id]);
        let value = self.client.delete(&url).await?;
        Ok(serde_json::from_value(value)?)
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// `GET /vector_stores/{id}/files`
    pub async fn list_member_files(
        &self,
        store_id: &str,
        params: &ListParams,
    ) -> Result<Page<VectorStoreFile>, ApiError> {
        let url = self.client.url(&[BASE, store_id, "files"]);
        let params = ListParams {
            kind: None,
            ..params.clone()
        };
        let value = self.client.get(&url, &params.query_pairs()).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `POST /vector_stores/{id}/files`
    pub async fn attach_files(
        &self,
        store_id: &str,
        files: Vec<AttachFile>,
    ) -> Result<AttachResult, ApiError> {
        if files.is_empty() {
            return Err(ApiError::validation("files", "Select at least one file"));
        }

        let url = self.client.url(&[BASE, store_id, "files"]);
        let body = serde_json::to_value(AttachFilesRequest { files })?;
        let value = self.client.post_json(&url, &body).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `DELETE /vector_stores/{id}/files/{file_id}`
    pub async fn detach_file(
        &self,
        store_id: &str,
        file_id: &str,
    ) -> Result<DeletionReceipt, ApiError> {
        let url = self.client.url(&[BASE, store_id, "files", file_id]);
        let value = self.client.delete(&url).await?;
        Ok(serde_json::from_value(value)?)
    }
}
