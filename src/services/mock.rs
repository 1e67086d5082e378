use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::data_source::{ensure_transcript, require_key, AssetDataSource};
use super::envelope::{decode_host_list, decode_web_asset_list, NESTED_FIRST};
use crate::error::ApiError;
use crate::models::{
    ChatMessage, ChatRole, DataCoverage, Host, RiskLevel, SecuritySummary, SummaryEvidence,
    SummaryPoll, UploadFile, UploadResult, WebAsset,
};

const HOSTS_FIXTURE: &str = include_str!("../../fixtures/hosts.json");
const WEB_FIXTURE: &str = include_str!("../../fixtures/web.json");

/// Polls for a key answer `processing` this many times before turning `complete`
pub const MOCK_SUMMARY_READY_AFTER: u32 = 2;

/// Simulated network delay per kind of call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockLatency {
    pub list: Duration,
    pub get: Duration,
    pub upload: Duration,
    pub summary: Duration,
    pub chat: Duration,
}

impl Default for MockLatency {
    fn default() -> Self {
        Self {
            list: Duration::from_millis(500),
            get: Duration::from_millis(300),
            upload: Duration::from_millis(1000),
            summary: Duration::from_millis(300),
            chat: Duration::from_millis(800),
        }
    }
}

impl MockLatency {
    pub fn none() -> Self {
        Self {
            list: Duration::ZERO,
            get: Duration::ZERO,
            upload: Duration::ZERO,
            summary: Duration::ZERO,
            chat: Duration::ZERO,
        }
    }
}

/// Offline stand-in for the scan inventory API.
///
/// Serves fixture data with simulated latency and drives the security summary
/// progression from a per-key attempt counter owned by this instance.
pub struct MockDataSource {
    hosts: Vec<Host>,
    web_assets: Vec<WebAsset>,
    latency: MockLatency,
    poll_attempts: Mutex<HashMap<String, u32>>,
}

impl MockDataSource {
    pub fn new(hosts: Vec<Host>, web_assets: Vec<WebAsset>, latency: MockLatency) -> Self {
        Self {
            hosts,
            web_assets,
            latency,
            poll_attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Build from raw fixture documents in any supported list envelope
    pub fn from_json(hosts: &Value, web_assets: &Value, latency: MockLatency) -> Result<Self, ApiError> {
        Ok(Self::new(
            decode_host_list(hosts, &NESTED_FIRST)?,
            decode_web_asset_list(web_assets)?,
            latency,
        ))
    }

    /// Build from the fixtures bundled with the crate
    pub fn from_fixtures(latency: MockLatency) -> Result<Self, ApiError> {
        let hosts: Value = serde_json::from_str(HOSTS_FIXTURE)
            .map_err(|e| ApiError::internal(format!("bundled host fixture is invalid: {}", e)))?;
        let web_assets: Value = serde_json::from_str(WEB_FIXTURE)
            .map_err(|e| ApiError::internal(format!("bundled web fixture is invalid: {}", e)))?;
        Self::from_json(&hosts, &web_assets, latency)
    }

    /// Return the current attempt number for `key` and advance the counter
    fn next_attempt(&self, key: &str) -> u32 {
        let mut attempts = self.poll_attempts.lock().unwrap_or_else(|p| p.into_inner());
        let counter = attempts.entry(key.to_string()).or_insert(0);
        let current = *counter;
        *counter = counter.saturating_add(1);
        current
    }

    async fn simulate_delay(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    async fn upload(&self, file: &UploadFile) -> Result<UploadResult, ApiError> {
        if !file.looks_like_json() {
            tracing::warn!(file_name = %file.file_name, "rejected non-JSON upload");
            return Err(ApiError::invalid_file_type(&file.file_name));
        }

        self.simulate_delay(self.latency.upload).await;

        Ok(UploadResult {
            success: true,
            message: format!("Successfully uploaded {}", file.file_name),
            uploaded_at: Some(Utc::now()),
            file_size: Some(file.size()),
            details: Map::new(),
        })
    }
}

/// The fixed summary every key settles on once its progression completes
pub fn mock_security_summary(key: &str) -> SecuritySummary {
    SecuritySummary {
        summary: format!(
            "{} presents a valid publicly trusted certificate with modern key material. \
             No critical exposure was observed; hardening opportunities remain around \
             HTTP security headers.",
            key
        ),
        severity: RiskLevel::Low,
        evidence: SummaryEvidence {
            domain: Some(key.to_string()),
            cert_sha256: Some(
                "3f4c2a1b9e8d7c6b5a49382716f5e4d3c2b1a0f9e8d7c6b5a4938271605f4e3d".to_string(),
            ),
            issuer: Some("Let's Encrypt R3".to_string()),
            valid_from: Some("2024-01-15T00:00:00Z".to_string()),
            valid_to: Some("2024-04-14T23:59:59Z".to_string()),
            days_to_expiry: Some(45),
            key_type: Some("RSA".to_string()),
            key_size: Some(2048),
            signature_algorithm: Some("sha256WithRSAEncryption".to_string()),
            san_count: Some(2),
            wildcard: Some(false),
            https_redirect: Some(true),
            waf_cdn_hint: Some("cloudflare".to_string()),
            ct_log_count: Some(3),
        },
        evidence_extras: "Certificate observed in three CT logs; HSTS header not present."
            .to_string(),
        findings: vec![
            "Certificate is valid and trusted by all major browser root stores".to_string(),
            "HTTP requests are redirected to HTTPS".to_string(),
            "Strict-Transport-Security header is missing".to_string(),
        ],
        recommendations: vec![
            "Enable HSTS with a max-age of at least one year".to_string(),
            "Automate certificate renewal at least 30 days before expiry".to_string(),
        ],
        assumptions: vec![
            "The CDN hint is inferred from response headers".to_string(),
        ],
        data_coverage: DataCoverage {
            percentage: 100.0,
            missing_fields: Vec::new(),
        },
    }
}

#[async_trait]
impl AssetDataSource for MockDataSource {
    async fn list_hosts(&self) -> Result<Vec<Host>, ApiError> {
        self.simulate_delay(self.latency.list).await;
        Ok(self.hosts.clone())
    }

    async fn get_host(&self, ip: &str) -> Result<Host, ApiError> {
        require_key(ip, "Host IP")?;
        self.simulate_delay(self.latency.get).await;
        self.hosts
            .iter()
            .find(|h| h.ip == ip)
            .cloned()
            .ok_or_else(|| ApiError::not_found(ip))
    }

    async fn list_web_assets(&self) -> Result<Vec<WebAsset>, ApiError> {
        self.simulate_delay(self.latency.list).await;
        Ok(self.web_assets.clone())
    }

    async fn get_web_asset(&self, key: &str) -> Result<WebAsset, ApiError> {
        require_key(key, "Web asset key")?;
        self.simulate_delay(self.latency.get).await;
        // id matches win over domain membership
        self.web_assets
            .iter()
            .find(|w| w.id == key)
            .or_else(|| self.web_assets.iter().find(|w| w.matches_key(key)))
            .cloned()
            .ok_or_else(|| ApiError::not_found(key))
    }

    async fn upload_hosts(&self, file: &UploadFile) -> Result<UploadResult, ApiError> {
        self.upload(file).await
    }

    async fn upload_web_assets(&self, file: &UploadFile) -> Result<UploadResult, ApiError> {
        self.upload(file).await
    }

    async fn send_chat(
        &self,
        messages: &[ChatMessage],
        asset_data: Option<Value>,
    ) -> Result<String, ApiError> {
        ensure_transcript(messages)?;
        self.simulate_delay(self.latency.chat).await;

        let question = messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or("");
        let context = if asset_data.is_some() {
            " using the attached asset context"
        } else {
            ""
        };

        Ok(format!(
            "This is a simulated assistant reply{} to: \"{}\"",
            context, question
        ))
    }

    async fn poll_security_summary(&self, key: &str) -> Result<SummaryPoll, ApiError> {
        require_key(key, "Web asset key")?;
        let attempt = self.next_attempt(key);
        self.simulate_delay(self.latency.summary).await;

        tracing::debug!(key, attempt, "mock security summary polled");

        if attempt < MOCK_SUMMARY_READY_AFTER {
            Ok(SummaryPoll::processing())
        } else {
            Ok(SummaryPoll::complete(mock_security_summary(key)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SummaryStatus;

    fn source() -> MockDataSource {
        MockDataSource::from_fixtures(MockLatency::none()).unwrap()
    }

    #[tokio::test]
    async fn test_bundled_fixtures_decode() {
        let mock = source();
        assert!(!mock.list_hosts().await.unwrap().is_empty());

        let assets = mock.list_web_assets().await.unwrap();
        assert!(!assets.is_empty());
        assert!(assets.iter().all(|w| !w.domains.is_empty()));
    }

    #[tokio::test]
    async fn test_summary_progression() {
        let mock = source();

        let first = mock.poll_security_summary("example.com").await.unwrap();
        let second = mock.poll_security_summary("example.com").await.unwrap();
        let third = mock.poll_security_summary("example.com").await.unwrap();

        assert_eq!(first.status, SummaryStatus::Processing);
        assert!(first.summary.is_none());
        assert_eq!(second.status, SummaryStatus::Processing);
        assert_eq!(third.status, SummaryStatus::Complete);

        let summary = third.summary.unwrap();
        assert!(!summary.summary.is_empty());
        assert_eq!(summary.evidence.domain.as_deref(), Some("example.com"));
    }

    #[tokio::test]
    async fn test_counters_are_per_key_and_per_instance() {
        let mock = source();
        mock.poll_security_summary("a.example.com").await.unwrap();
        mock.poll_security_summary("a.example.com").await.unwrap();

        let other_key = mock.poll_security_summary("b.example.com").await.unwrap();
        assert_eq!(other_key.status, SummaryStatus::Processing);

        let fresh = source();
        let fresh_poll = fresh.poll_security_summary("a.example.com").await.unwrap();
        assert_eq!(fresh_poll.status, SummaryStatus::Processing);
    }

    #[tokio::test]
    async fn test_blank_keys_are_rejected_without_advancing_counters() {
        let mock = source();

        assert!(matches!(mock.get_host("").await, Err(ApiError::Validation(_))));
        assert!(matches!(mock.get_web_asset(" ").await, Err(ApiError::Validation(_))));
        assert!(matches!(
            mock.poll_security_summary("").await,
            Err(ApiError::Validation(_))
        ));
        assert_eq!(mock.next_attempt(""), 0);
    }

    #[tokio::test]
    async fn test_not_found_carries_the_key() {
        let mock = source();

        let host = mock.get_host("10.255.255.1").await;
        assert!(matches!(host, Err(ApiError::NotFound(ref key)) if key == "10.255.255.1"));

        let asset = mock.get_web_asset("nowhere.example.org").await;
        assert!(matches!(asset, Err(ApiError::NotFound(ref key)) if key == "nowhere.example.org"));
    }

    #[tokio::test]
    async fn test_get_web_asset_prefers_id() {
        let mut assets = source().list_web_assets().await.unwrap();
        // Second asset claims the first asset's id as a domain
        let first_id = assets[0].id.clone();
        assets[1].domains.push(first_id.clone());
        let mock = MockDataSource::new(Vec::new(), assets.clone(), MockLatency::none());

        let found = mock.get_web_asset(&first_id).await.unwrap();
        assert_eq!(found, assets[0]);
    }

    #[tokio::test]
    async fn test_mock_chat_requires_transcript() {
        let mock = source();
        let result = mock.send_chat(&[], None).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));

        let reply = mock
            .send_chat(&[ChatMessage::user("Which hosts are critical?")], None)
            .await
            .unwrap();
        assert!(reply.contains("Which hosts are critical?"));
    }
}
