//! Files resource client

use super::client::ApiClient;
use super::error::ApiError;
use super::types::{DeletionReceipt, File, FileCreateParams, ListParams, Page};
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};

const BASE: &str = "files";

/// Where an upload's content comes from, resolved from [`FileCreateParams`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    Url(String),
    Path(PathBuf),
}

impl FileCreateParams {
    /// Enforce "exactly one of url / file" before anything is sent
    pub fn source(&self) -> Result<UploadSource, ApiError> {
        let url = self.url.as_deref().map(str::trim).filter(|u| !u.is_empty());
        match (url, &self.file) {
            (Some(url), None) => Ok(UploadSource::Url(url.to_string())),
            (None, Some(path)) => Ok(UploadSource::Path(path.clone())),
            (Some(_), Some(_)) => Err(ApiError::validation(
                "file",
                "Provide either a URL or a file, not both",
            )),
            (None, None) => Err(ApiError::validation("file", "Provide a URL or a file")),
        }
    }
}

pub struct FilesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> FilesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `GET /files`
    pub async fn list(&self, params: &ListParams) -> Result<Page<File>, ApiError> {
        let url = self.client.url(&[BASE]);
        let value = self.client.get(&url, &params.query_pairs()).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `POST /files` as multipart: `purpose` plus one of `url` / `file`
    pub async fn create(&self, params: &FileCreateParams) -> Result<File, ApiError> {
        let source = params.source()?;
        let form = Form::new().text("purpose", params.purpose.as_str());

        let form = match source {
            UploadSource::Url(url) => form.text("url", url),
            UploadSource::Path(path) => form.part("file", file_part(&path).await?),
        };

        let url = self.client.url(&[BASE]);
        let value = self.client.post_multipart(&url, form).await?;
        let file: File = serde_json::from_value(value)?;
        tracing::info!("Uploaded file {} ({})", file.id, params.purpose);
        Ok(file)
    }

    /// `DELETE /files/{id}`
    pub async fn delete(&self, id: &str) -> Result<DeletionReceipt, ApiError> {
        let url = self.client.url(&[BASE, id]);
        let value = self.client.delete(&url).await?;
        Ok(serde_json::from_value(value)?)
    }
}

async fn file_part(path: &Path) -> Result<Part, ApiError> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Part::bytes(bytes).file_name(file_name))
}
