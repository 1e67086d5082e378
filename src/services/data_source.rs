use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;
use crate::models::{ChatMessage, Host, SummaryPoll, UploadFile, UploadResult, WebAsset};

/// Everything a dashboard view can ask of the scan inventory.
///
/// Implemented by [`LiveDataSource`](super::LiveDataSource) (HTTP) and
/// [`MockDataSource`](super::MockDataSource) (offline fixtures). The variant
/// is chosen once, when the client state is built.
#[async_trait]
pub trait AssetDataSource: Send + Sync {
    async fn list_hosts(&self) -> Result<Vec<Host>, ApiError>;

    /// Look up a host by its ip. Absent hosts fail with `NotFound`.
    async fn get_host(&self, ip: &str) -> Result<Host, ApiError>;

    async fn list_web_assets(&self) -> Result<Vec<WebAsset>, ApiError>;

    /// Look up a web asset by id, or by any domain its certificate covers
    async fn get_web_asset(&self, key: &str) -> Result<WebAsset, ApiError>;

    async fn upload_hosts(&self, file: &UploadFile) -> Result<UploadResult, ApiError>;

    async fn upload_web_assets(&self, file: &UploadFile) -> Result<UploadResult, ApiError>;

    /// Send the whole transcript and return the assistant's reply text unchanged
    async fn send_chat(
        &self,
        messages: &[ChatMessage],
        asset_data: Option<Value>,
    ) -> Result<String, ApiError>;

    /// One check of the security summary for a web asset. Never loops.
    async fn poll_security_summary(&self, key: &str) -> Result<SummaryPoll, ApiError>;

    // Legacy names kept for older call sites

    async fn get_assets(&self) -> Result<Vec<Host>, ApiError> {
        self.list_hosts().await
    }

    async fn get_host_assets(&self) -> Result<Vec<Host>, ApiError> {
        self.list_hosts().await
    }

    async fn get_asset_by_ip(&self, ip: &str) -> Result<Host, ApiError> {
        self.get_host(ip).await
    }

    async fn get_host_asset_by_ip(&self, ip: &str) -> Result<Host, ApiError> {
        self.get_host(ip).await
    }

    async fn get_web_asset_by_domain(&self, domain: &str) -> Result<WebAsset, ApiError> {
        self.get_web_asset(domain).await
    }

    async fn upload_assets(&self, file: &UploadFile) -> Result<UploadResult, ApiError> {
        self.upload_hosts(file).await
    }

    async fn upload_host_assets(&self, file: &UploadFile) -> Result<UploadResult, ApiError> {
        self.upload_hosts(file).await
    }
}

/// Lookup keys must be non-blank; checked before any request or mock state change
pub(crate) fn require_key(key: &str, what: &str) -> Result<(), ApiError> {
    if key.trim().is_empty() {
        return Err(ApiError::validation(format!("{} cannot be empty", what)));
    }
    Ok(())
}

/// Shared validation for chat transcripts, applied by both data sources
pub(crate) fn ensure_transcript(messages: &[ChatMessage]) -> Result<(), ApiError> {
    if messages.is_empty() {
        return Err(ApiError::validation("chat transcript cannot be empty"));
    }
    Ok(())
}
