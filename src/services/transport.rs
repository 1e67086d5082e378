use crate::config::Settings;
use crate::error::ApiError;
use governor::{
    clock::DefaultClock, state::direct::NotKeyed, state::InMemoryState, Quota, RateLimiter,
};
use reqwest::{multipart::Form, Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

const USER_AGENT: &str = concat!("scan-inventory-client/", env!("CARGO_PKG_VERSION"));

/// Percent-encode a key so it can be embedded as one path segment
pub fn encode_segment(key: &str) -> String {
    urlencoding::encode(key).into_owned()
}

/// Rate-limited JSON transport against the scan inventory API.
/// Never retries; every failure is returned to the caller as-is.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl HttpTransport {
    /// Create a new transport rooted at `base_url` (origin plus version prefix)
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        requests_per_second: u32,
    ) -> Result<Self, ApiError> {
        let quota = Quota::per_second(NonZeroU32::new(requests_per_second).ok_or_else(|| {
            ApiError::validation("requests_per_second must be greater than 0")
        })?);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        Self::new(
            settings.api_base_url(),
            settings.http_timeout(),
            settings.rate_limit_requests,
        )
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    pub async fn get_json(&self, endpoint: &str) -> Result<Value, ApiError> {
        let request = self.client.get(self.url_for(endpoint));
        self.send(endpoint, "GET", request).await
    }

    pub async fn post_json<B>(&self, endpoint: &str, body: &B) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.client.post(self.url_for(endpoint)).json(body);
        self.send(endpoint, "POST", request).await
    }

    pub async fn post_multipart(&self, endpoint: &str, form: Form) -> Result<Value, ApiError> {
        let request = self.client.post(self.url_for(endpoint)).multipart(form);
        self.send(endpoint, "POST", request).await
    }

    async fn send(
        &self,
        endpoint: &str,
        method: &str,
        request: RequestBuilder,
    ) -> Result<Value, ApiError> {
        self.rate_limiter.until_ready().await;
        let start_time = Instant::now();

        let response = request.send().await.map_err(|e| {
            tracing::error!(method, endpoint, error = %e, "API request failed");
            ApiError::Network(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                method,
                endpoint,
                status = status.as_u16(),
                duration_ms = start_time.elapsed().as_millis() as u64,
                "API request failed"
            );
            return Err(ApiError::http(status.as_u16(), endpoint));
        }

        let body = response.bytes().await.map_err(|e| {
            tracing::error!(method, endpoint, error = %e, "failed to read response body");
            ApiError::Network(e)
        })?;

        tracing::debug!(
            method,
            endpoint,
            status = status.as_u16(),
            bytes = body.len(),
            duration_ms = start_time.elapsed().as_millis() as u64,
            "API request completed"
        );

        if body.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&body).map_err(|e| {
            ApiError::malformed(format!("{} returned a non-JSON body: {}", endpoint, e))
        })
    }
}
