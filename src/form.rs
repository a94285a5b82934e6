//! Create Forms
//!
//! Input state and validation for the "upload file" and "create vector
//! store" dialogs. Validation errors stay in the form and are rendered
//! under the offending field.

use crate::api::{ApiError, FileCreateParams, FilePurpose, VectorStoreCreateParams, VectorStoreType};
use std::path::PathBuf;
use url::Url;

/// Where a single-file upload takes its content from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceTab {
    #[default]
    File,
    Url,
}

impl SourceTab {
    pub fn toggled(self) -> Self {
        match self {
            Self::File => Self::Url,
            Self::Url => Self::File,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Url => "URL",
        }
    }
}

/// Field-scoped validation message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn from_api(error: &ApiError) -> Option<Self> {
        match error {
            ApiError::Validation { field, message } => Some(Self {
                field,
                message: message.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileForm {
    pub purpose: FilePurpose,
    pub tab: SourceTab,
    pub input: String,
    pub error: Option<FieldError>,
}

impl FileForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn toggle_tab(&mut self) {
        self.tab = self.tab.toggled();
        self.input.clear();
        self.error = None;
    }

    pub fn cycle_purpose(&mut self) {
        self.purpose = self.purpose.cycle();
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
        self.error = None;
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
        self.error = None;
    }

    /// Build the request, or record the field error and return None
    pub fn submit(&mut self) -> Option<FileCreateParams> {
        match self.validate() {
            Ok(params) => {
                self.error = None;
                Some(params)
            }
            Err(e) => {
                self.error = FieldError::from_api(&e);
                None
            }
        }
    }

    pub fn validate(&self) -> Result<FileCreateParams, ApiError> {
        let value = self.input.trim();
        match self.tab {
            SourceTab::Url => {
                if value.is_empty() {
                    return Err(ApiError::validation("url", "URL is required"));
                }
                let parsed = Url::parse(value)
                    .map_err(|_| ApiError::validation("url", "Enter a valid URL"))?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(ApiError::validation("url", "URL must use http or https"));
                }
                Ok(FileCreateParams::from_url(self.purpose, value))
            }
            SourceTab::File => {
                if value.is_empty() {
                    return Err(ApiError::validation("file", "Select a file"));
                }
                let path = PathBuf::from(value);
                match std::fs::metadata(&path) {
                    Ok(meta) if meta.is_file() => Ok(FileCreateParams::from_path(self.purpose, path)),
                    Ok(_) => Err(ApiError::validation("file", "Not a regular file")),
                    Err(_) => Err(ApiError::validation("file", "File not found")),
                }
            }
        }
    }
}

/// Field with input focus in the vector store form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreField {
    #[default]
    Name,
    Type,
}

#[derive(Debug, Clone, Default)]
pub struct VectorStoreForm {
    pub name: String,
    pub kind: VectorStoreType,
    pub focus: StoreField,
    pub error: Option<FieldError>,
}

impl VectorStoreForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            StoreField::Name => StoreField::Type,
            StoreField::Type => StoreField::Name,
        };
    }

    pub fn push_char(&mut self, c: char) {
        match self.focus {
            StoreField::Name => {
                self.name.push(c);
                self.error = None;
            }
            StoreField::Type if c == ' ' => self.kind = self.kind.toggled(),
            StoreField::Type => {}
        }
    }

    pub fn pop_char(&mut self) {
        if self.focus == StoreField::Name {
            self.name.pop();
            self.error = None;
        }
    }

    pub fn submit(&mut self) -> Option<VectorStoreCreateParams> {
        match self.validate() {
            Ok(params) => {
                self.error = None;
                Some(params)
            }
            Err(e) => {
                self.error = FieldError::from_api(&e);
                None
            }
        }
    }

    pub fn validate(&self) -> Result<VectorStoreCreateParams, ApiError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ApiError::validation("name", "Name is required"));
        }
        Ok(VectorStoreCreateParams {
            name: name.to_string(),
            kind: self.kind,
        })
    }
}
