use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::ApiError;

/// A file handed to an upload accessor. The client never parses its contents.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub contents: Vec<u8>,
}

impl UploadFile {
    pub fn new<N: Into<String>>(file_name: N, mime_type: Option<String>, contents: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type,
            contents,
        }
    }

    /// Read a file from disk, guessing a JSON MIME type from its extension
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let contents = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = if file_name.to_lowercase().ends_with(".json") {
            Some("application/json".to_string())
        } else {
            None
        };

        Ok(Self {
            file_name,
            mime_type,
            contents,
        })
    }

    pub fn size(&self) -> u64 {
        self.contents.len() as u64
    }

    /// Accepted when the name ends in `.json` or the declared MIME type mentions json
    pub fn looks_like_json(&self) -> bool {
        self.file_name.ends_with(".json")
            || self
                .mime_type
                .as_deref()
                .map(|m| m.contains("json"))
                .unwrap_or(false)
    }
}

/// Server verdict for an upload. Fields the server adds beyond these are kept in `details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}
