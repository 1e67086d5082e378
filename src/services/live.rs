use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use super::data_source::{ensure_transcript, require_key, AssetDataSource};
use super::envelope::{
    decode_chat_reply, decode_host, decode_host_list, decode_summary_poll, decode_upload_result,
    decode_web_asset, decode_web_asset_list, BARE_FIRST, NESTED_FIRST,
};
use super::transport::{encode_segment, HttpTransport};
use crate::config::Settings;
use crate::error::ApiError;
use crate::models::{ChatMessage, ChatRequest, Host, SummaryPoll, UploadFile, UploadResult, WebAsset};

pub const HOSTS_ENDPOINT: &str = "/assets/hosts";
pub const HOSTS_UPLOAD_ENDPOINT: &str = "/assets/hosts/upload";
pub const WEB_ENDPOINT: &str = "/assets/web";
pub const WEB_UPLOAD_ENDPOINT: &str = "/assets/web/upload";
pub const CHAT_ENDPOINT: &str = "/chat";

/// Data source backed by the remote scan inventory API
pub struct LiveDataSource {
    transport: HttpTransport,
}

impl LiveDataSource {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        Ok(Self::new(HttpTransport::from_settings(settings)?))
    }

    async fn upload(&self, endpoint: &str, file: &UploadFile) -> Result<UploadResult, ApiError> {
        tracing::info!(
            endpoint,
            file_name = %file.file_name,
            file_size = file.size(),
            "uploading asset file"
        );

        let body = self.transport.post_multipart(endpoint, upload_form(file)?).await?;
        decode_upload_result(&body)
    }
}

/// A 404 on a by-key endpoint means the key is unknown
fn missing_as_not_found(err: ApiError, key: &str) -> ApiError {
    match err {
        ApiError::Http { status: 404, .. } => ApiError::not_found(key),
        other => other,
    }
}

fn upload_form(file: &UploadFile) -> Result<Form, ApiError> {
    let mut part = Part::bytes(file.contents.clone()).file_name(file.file_name.clone());
    if let Some(mime) = &file.mime_type {
        part = part
            .mime_str(mime)
            .map_err(|e| ApiError::validation(format!("Invalid MIME type {}: {}", mime, e)))?;
    }
    Ok(Form::new().part("file", part))
}

pub fn host_endpoint(ip: &str) -> String {
    format!("{}/{}", HOSTS_ENDPOINT, encode_segment(ip))
}

pub fn web_asset_endpoint(key: &str) -> String {
    format!("{}/{}", WEB_ENDPOINT, encode_segment(key))
}

pub fn security_summary_endpoint(key: &str) -> String {
    format!("{}/{}/security-summary", WEB_ENDPOINT, encode_segment(key))
}

#[async_trait]
impl AssetDataSource for LiveDataSource {
    async fn list_hosts(&self) -> Result<Vec<Host>, ApiError> {
        match self.transport.get_json(HOSTS_ENDPOINT).await {
            Ok(body) => decode_host_list(&body, &NESTED_FIRST),
            Err(e) if e.is_transport() => {
                tracing::warn!(
                    endpoint = HOSTS_ENDPOINT,
                    error = %e,
                    "host list request failed, retrying once expecting a bare array"
                );
                let body = self.transport.get_json(HOSTS_ENDPOINT).await?;
                decode_host_list(&body, &BARE_FIRST)
            }
            Err(e) => Err(e),
        }
    }

    async fn get_host(&self, ip: &str) -> Result<Host, ApiError> {
        require_key(ip, "Host IP")?;
        let body = self
            .transport
            .get_json(&host_endpoint(ip))
            .await
            .map_err(|e| missing_as_not_found(e, ip))?;
        decode_host(&body)
    }

    async fn list_web_assets(&self) -> Result<Vec<WebAsset>, ApiError> {
        let body = self.transport.get_json(WEB_ENDPOINT).await?;
        let assets = decode_web_asset_list(&body)?;
        tracing::debug!(count = assets.len(), "fetched web assets");
        Ok(assets)
    }

    async fn get_web_asset(&self, key: &str) -> Result<WebAsset, ApiError> {
        require_key(key, "Web asset key")?;
        let body = self
            .transport
            .get_json(&web_asset_endpoint(key))
            .await
            .map_err(|e| missing_as_not_found(e, key))?;
        decode_web_asset(&body)
    }

    async fn upload_hosts(&self, file: &UploadFile) -> Result<UploadResult, ApiError> {
        self.upload(HOSTS_UPLOAD_ENDPOINT, file).await
    }

    async fn upload_web_assets(&self, file: &UploadFile) -> Result<UploadResult, ApiError> {
        self.upload(WEB_UPLOAD_ENDPOINT, file).await
    }

    async fn send_chat(
        &self,
        messages: &[ChatMessage],
        asset_data: Option<Value>,
    ) -> Result<String, ApiError> {
        ensure_transcript(messages)?;

        let request = ChatRequest {
            messages: messages.to_vec(),
            asset_data,
        };
        let body = self.transport.post_json(CHAT_ENDPOINT, &request).await?;
        let reply = decode_chat_reply(&body)?;
        Ok(reply.content)
    }

    async fn poll_security_summary(&self, key: &str) -> Result<SummaryPoll, ApiError> {
        require_key(key, "Web asset key")?;
        let body = self
            .transport
            .get_json(&security_summary_endpoint(key))
            .await
            .map_err(|e| missing_as_not_found(e, key))?;
        let poll = decode_summary_poll(&body)?;
        tracing::debug!(key, status = %poll.status, "security summary polled");
        Ok(poll)
    }
}
