#![allow(dead_code)]

use scan_inventory_client::{
    config::Settings,
    services::{HttpTransport, LiveDataSource, MockDataSource, MockLatency},
};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::MockServer;

pub const API_PREFIX: &str = "/api/v1";

pub fn hosts_fixture() -> Value {
    serde_json::from_str(include_str!("../../fixtures/hosts.json"))
        .expect("host fixture is valid JSON")
}

pub fn web_fixture() -> Value {
    serde_json::from_str(include_str!("../../fixtures/web.json"))
        .expect("web fixture is valid JSON")
}

/// The raw item array inside a `{data:{items:[...]}}` fixture
pub fn fixture_items(fixture: &Value) -> Vec<Value> {
    fixture["data"]["items"]
        .as_array()
        .cloned()
        .expect("fixture has data.items")
}

/// Settings pointing at `api_url` with fast polling and no mock latency
pub fn test_settings(api_url: &str, use_mock_data: bool) -> Settings {
    Settings {
        api_url: api_url.to_string(),
        api_prefix: API_PREFIX.to_string(),
        use_mock_data,
        mock_latency_enabled: false,
        http_timeout_seconds: 5.0,
        rate_limit_requests: 100,
        poll_interval_ms: 5,
        poll_backoff_factor: 1.0,
        poll_max_interval_ms: 5,
        poll_max_attempts: 5,
        log_level: "error".to_string(),
        log_format: "plain".to_string(),
    }
}

pub fn live_source(server: &MockServer) -> LiveDataSource {
    let transport = HttpTransport::new(
        format!("{}{}", server.uri(), API_PREFIX),
        Duration::from_secs(5),
        100,
    )
    .expect("transport builds");
    LiveDataSource::new(transport)
}

pub fn mock_source() -> MockDataSource {
    MockDataSource::from_fixtures(MockLatency::none()).expect("bundled fixtures decode")
}

/// Path as the server sees it for a client endpoint
pub fn api_path(endpoint: &str) -> String {
    format!("{}{}", API_PREFIX, endpoint)
}

pub fn summary_json(domain: &str) -> Value {
    json!({
        "summary": format!("{} is served with a valid certificate.", domain),
        "severity": "medium",
        "evidence": {
            "domain": domain,
            "issuer": "R3",
            "days_to_expiry": 12,
            "wildcard": false
        },
        "evidence_extras": "",
        "findings": ["Certificate expires in under 30 days"],
        "recommendations": ["Renew the certificate"],
        "assumptions": [],
        "data_coverage": { "percentage": 60.0, "missing_fields": ["key_size"] }
    })
}
