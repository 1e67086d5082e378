//! Pure decoders for the response envelopes the scan inventory API uses.
//!
//! The API is inconsistent about wrapping: list endpoints answer with
//! `{data:{items:[...]}}` or a bare array, record endpoints with
//! `{success,data}` or the bare record. Each endpoint gets a decoder that
//! tries a fixed ordered list of shapes and either yields a fully typed value
//! or fails with [`ApiError::MalformedResponse`].

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::models::{ChatMessage, ChatRole, Host, SecuritySummary, SummaryPoll, SummaryStatus, UploadResult, WebAsset};

/// Shapes a list payload may arrive in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape {
    /// `{ "data": { "items": [T] } }`
    NestedItems,
    /// `[T]`
    BareList,
}

/// Shapes a single-record payload may arrive in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// `{ "success": true, "data": T }`
    SuccessData,
    /// `T`
    Bare,
}

pub const NESTED_FIRST: [ListShape; 2] = [ListShape::NestedItems, ListShape::BareList];
pub const BARE_FIRST: [ListShape; 2] = [ListShape::BareList, ListShape::NestedItems];
const ENVELOPED_RECORD: [RecordShape; 2] = [RecordShape::SuccessData, RecordShape::Bare];
const BARE_RECORD: [RecordShape; 2] = [RecordShape::Bare, RecordShape::SuccessData];

#[derive(Deserialize)]
struct ItemsPage<T> {
    items: Vec<T>,
}

#[derive(Deserialize)]
struct NestedItems<T> {
    data: ItemsPage<T>,
}

#[derive(Deserialize)]
struct SuccessData<T> {
    data: T,
}

#[derive(Deserialize)]
struct SummaryEnvelope {
    status: SummaryStatus,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn try_list<T: DeserializeOwned>(body: &Value, shape: ListShape) -> Result<Vec<T>, serde_json::Error> {
    match shape {
        ListShape::NestedItems => NestedItems::<T>::deserialize(body).map(|n| n.data.items),
        ListShape::BareList => Vec::<T>::deserialize(body),
    }
}

fn try_record<T: DeserializeOwned>(body: &Value, shape: RecordShape) -> Result<T, serde_json::Error> {
    match shape {
        RecordShape::SuccessData => SuccessData::<T>::deserialize(body).map(|e| e.data),
        RecordShape::Bare => T::deserialize(body),
    }
}

/// Text of an `error`/`message` field, if the body carries one
fn failure_text(body: &Value) -> Option<String> {
    body.get("error")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// `{success:false}` is a refusal, never something to decode around
fn reject_unsuccessful(body: &Value, what: &str) -> Result<(), ApiError> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let reason = failure_text(body).unwrap_or_else(|| "no reason given".to_string());
        return Err(ApiError::malformed(format!(
            "{}: server reported success=false ({})",
            what, reason
        )));
    }
    Ok(())
}

/// Decode a list, trying `order` left to right. The last shape's error is reported.
pub fn decode_list<T: DeserializeOwned>(
    body: &Value,
    order: &[ListShape],
    what: &str,
) -> Result<Vec<T>, ApiError> {
    reject_unsuccessful(body, what)?;

    let mut last_error = None;
    for shape in order {
        match try_list(body, *shape) {
            Ok(items) => return Ok(items),
            Err(e) => {
                tracing::debug!(what, shape = ?shape, error = %e, "envelope shape did not match");
                last_error = Some(e);
            }
        }
    }

    Err(ApiError::malformed(match last_error {
        Some(e) => format!("{}: {}", what, e),
        None => format!("{}: no envelope shapes to try", what),
    }))
}

/// Decode a single record, trying `order` left to right
pub fn decode_record<T: DeserializeOwned>(
    body: &Value,
    order: &[RecordShape],
    what: &str,
) -> Result<T, ApiError> {
    reject_unsuccessful(body, what)?;

    let mut last_error = None;
    for shape in order {
        match try_record(body, *shape) {
            Ok(record) => return Ok(record),
            Err(e) => {
                tracing::debug!(what, shape = ?shape, error = %e, "envelope shape did not match");
                last_error = Some(e);
            }
        }
    }

    Err(ApiError::malformed(match last_error {
        Some(e) => format!("{}: {}", what, e),
        None => format!("{}: no envelope shapes to try", what),
    }))
}

pub fn validate_host(host: &Host) -> Result<(), ApiError> {
    if host.ip.trim().is_empty() {
        return Err(ApiError::malformed("host record has an empty ip"));
    }
    Ok(())
}

pub fn validate_web_asset(asset: &WebAsset) -> Result<(), ApiError> {
    if asset.domains.is_empty() {
        return Err(ApiError::malformed(format!(
            "web asset {} covers no domains",
            asset.id
        )));
    }
    Ok(())
}

pub fn decode_host_list(body: &Value, order: &[ListShape]) -> Result<Vec<Host>, ApiError> {
    let hosts: Vec<Host> = decode_list(body, order, "host list")?;
    hosts.iter().try_for_each(validate_host)?;
    Ok(hosts)
}

pub fn decode_web_asset_list(body: &Value) -> Result<Vec<WebAsset>, ApiError> {
    let assets: Vec<WebAsset> = decode_list(body, &NESTED_FIRST, "web asset list")?;
    assets.iter().try_for_each(validate_web_asset)?;
    Ok(assets)
}

pub fn decode_host(body: &Value) -> Result<Host, ApiError> {
    let host: Host = decode_record(body, &ENVELOPED_RECORD, "host")?;
    validate_host(&host)?;
    Ok(host)
}

pub fn decode_web_asset(body: &Value) -> Result<WebAsset, ApiError> {
    let asset: WebAsset = decode_record(body, &ENVELOPED_RECORD, "web asset")?;
    validate_web_asset(&asset)?;
    Ok(asset)
}

/// The reply must be a single assistant message
pub fn decode_chat_reply(body: &Value) -> Result<ChatMessage, ApiError> {
    let reply: ChatMessage = decode_record(body, &ENVELOPED_RECORD, "chat reply")?;
    if reply.role != ChatRole::Assistant {
        return Err(ApiError::malformed(format!(
            "chat reply: expected an assistant message, got role {:?}",
            reply.role
        )));
    }
    Ok(reply)
}

/// Upload verdicts are surfaced as-is, including `success:false`
pub fn decode_upload_result(body: &Value) -> Result<UploadResult, ApiError> {
    let mut last_error = None;
    for shape in BARE_RECORD {
        match try_record::<UploadResult>(body, shape) {
            Ok(result) => return Ok(result),
            Err(e) => last_error = Some(e),
        }
    }
    Err(ApiError::malformed(format!(
        "upload result: {}",
        last_error.map(|e| e.to_string()).unwrap_or_default()
    )))
}

/// Decode one security-summary poll.
///
/// `{status, data?, error?}` is preferred; a bare summary counts as complete.
/// A `complete` status without a decodable summary is malformed. Payloads
/// attached to non-complete states are ignored.
pub fn decode_summary_poll(body: &Value) -> Result<SummaryPoll, ApiError> {
    match SummaryEnvelope::deserialize(body) {
        Ok(envelope) => {
            return match envelope.status {
                SummaryStatus::Complete => {
                    let data = envelope.data.filter(|d| !d.is_null()).ok_or_else(|| {
                        ApiError::malformed("security summary marked complete without data")
                    })?;
                    let summary = SecuritySummary::deserialize(&data).map_err(|e| {
                        ApiError::malformed(format!("security summary: {}", e))
                    })?;
                    Ok(SummaryPoll::complete(summary))
                }
                SummaryStatus::Failed => Ok(SummaryPoll::failed(envelope.error.or(envelope.message))),
                SummaryStatus::Pending => Ok(SummaryPoll::pending()),
                SummaryStatus::Processing => Ok(SummaryPoll::processing()),
            };
        }
        Err(e) => tracing::debug!(error = %e, "summary status envelope did not match"),
    }

    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Ok(SummaryPoll::failed(failure_text(body)));
    }

    SecuritySummary::deserialize(body)
        .map(SummaryPoll::complete)
        .map_err(|e| ApiError::malformed(format!("security summary: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::web_asset::tests::sample_web_asset;
    use serde_json::json;

    fn host_fixture(ip: &str, risk: &str) -> Value {
        json!({
            "ip": ip,
            "location": {
                "city": "Amsterdam",
                "country": "Netherlands",
                "country_code": "NL",
                "coordinates": { "latitude": 52.37, "longitude": 4.9 }
            },
            "autonomous_system": { "asn": 64501, "name": "EXAMPLE-AS", "country_code": "NL" },
            "services": [{ "port": 80, "protocol": "http", "banner": "Apache" }],
            "threat_intelligence": { "security_labels": [], "risk_level": risk }
        })
    }

    fn summary_fixture() -> Value {
        json!({
            "summary": "Certificate is valid and served behind a CDN.",
            "severity": "low",
            "evidence": { "domain": "example.com", "wildcard": false },
            "evidence_extras": "",
            "findings": ["HSTS missing"],
            "recommendations": ["Enable HSTS"],
            "assumptions": [],
            "data_coverage": { "percentage": 92.5, "missing_fields": ["ct_log_count"] }
        })
    }

    #[test]
    fn test_nested_and_bare_host_lists_decode_identically() {
        let hosts = vec![host_fixture("198.51.100.1", "low"), host_fixture("198.51.100.2", "critical")];
        let nested = json!({ "data": { "items": hosts.clone() } });
        let bare = Value::Array(hosts);

        let from_nested = decode_host_list(&nested, &NESTED_FIRST).unwrap();
        let from_bare = decode_host_list(&bare, &NESTED_FIRST).unwrap();

        assert_eq!(from_nested, from_bare);
        assert_eq!(from_nested.len(), 2);
        assert_eq!(from_nested[0].ip, "198.51.100.1");
        assert_eq!(from_nested[1].ip, "198.51.100.2");

        assert_eq!(decode_host_list(&nested, &BARE_FIRST).unwrap(), from_bare);
    }

    #[test]
    fn test_list_with_no_matching_shape_is_malformed() {
        let body = json!({ "data": { "rows": [] } });
        let result = decode_host_list(&body, &NESTED_FIRST);
        assert!(matches!(result, Err(ApiError::MalformedResponse(_))));
    }

    #[test]
    fn test_half_populated_host_is_rejected() {
        let mut broken = host_fixture("198.51.100.3", "high");
        broken.as_object_mut().unwrap().remove("location");
        let body = json!({ "data": { "items": [host_fixture("198.51.100.1", "low"), broken] } });

        let result = decode_host_list(&body, &NESTED_FIRST);
        assert!(matches!(result, Err(ApiError::MalformedResponse(_))));
    }

    #[test]
    fn test_empty_ip_is_rejected() {
        let body = json!([host_fixture("", "low")]);
        assert!(matches!(
            decode_host_list(&body, &NESTED_FIRST),
            Err(ApiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_record_envelope_and_bare_fallback() {
        let host = host_fixture("192.0.2.7", "medium");
        let enveloped = json!({ "success": true, "data": host.clone() });

        let a = decode_host(&enveloped).unwrap();
        let b = decode_host(&host).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.ip, "192.0.2.7");
    }

    #[test]
    fn test_unsuccessful_envelope_is_not_defaulted() {
        let body = json!({ "success": false, "error": "Host not found" });
        match decode_host(&body).unwrap_err() {
            ApiError::MalformedResponse(msg) => assert!(msg.contains("Host not found")),
            other => panic!("Expected MalformedResponse, got {:?}", other),
        }
    }

    #[test]
    fn test_web_asset_without_domains_is_rejected() {
        let body = json!({ "success": true, "data": sample_web_asset("cert-9", &[]) });
        assert!(matches!(decode_web_asset(&body), Err(ApiError::MalformedResponse(_))));

        let list = json!({ "data": { "items": [sample_web_asset("cert-9", &[])] } });
        assert!(matches!(decode_web_asset_list(&list), Err(ApiError::MalformedResponse(_))));
    }

    #[test]
    fn test_web_asset_list_shapes() {
        let assets = vec![sample_web_asset("cert-1", &["example.com"])];
        let nested = json!({ "data": { "items": assets.clone() } });
        let bare = Value::Array(assets);
        assert_eq!(decode_web_asset_list(&nested).unwrap(), decode_web_asset_list(&bare).unwrap());
    }

    #[test]
    fn test_summary_status_envelope() {
        let processing = json!({ "success": true, "status": "processing", "data": {} });
        assert_eq!(decode_summary_poll(&processing).unwrap(), SummaryPoll::processing());

        let pending = json!({ "success": true, "status": "pending" });
        assert_eq!(decode_summary_poll(&pending).unwrap(), SummaryPoll::pending());

        let complete = json!({ "success": true, "status": "complete", "data": summary_fixture() });
        let poll = decode_summary_poll(&complete).unwrap();
        assert_eq!(poll.status, SummaryStatus::Complete);
        let summary = poll.summary.unwrap();
        assert_eq!(summary.evidence.domain.as_deref(), Some("example.com"));
        assert_eq!(summary.data_coverage.percentage, 92.5);
    }

    #[test]
    fn test_summary_complete_without_data_is_malformed() {
        let body = json!({ "success": true, "status": "complete", "data": null });
        assert!(matches!(decode_summary_poll(&body), Err(ApiError::MalformedResponse(_))));

        let partial = json!({ "status": "complete", "data": { "summary": "half" } });
        assert!(matches!(decode_summary_poll(&partial), Err(ApiError::MalformedResponse(_))));
    }

    #[test]
    fn test_summary_failed_carries_error() {
        let body = json!({ "success": false, "status": "failed", "error": "LLM quota exceeded" });
        let poll = decode_summary_poll(&body).unwrap();
        assert_eq!(poll, SummaryPoll::failed(Some("LLM quota exceeded".to_string())));

        let refused = json!({ "success": false, "message": "asset unknown" });
        let poll = decode_summary_poll(&refused).unwrap();
        assert_eq!(poll.status, SummaryStatus::Failed);
        assert_eq!(poll.error.as_deref(), Some("asset unknown"));
    }

    #[test]
    fn test_bare_summary_counts_as_complete() {
        let poll = decode_summary_poll(&summary_fixture()).unwrap();
        assert!(poll.is_terminal());
        assert!(poll.summary.is_some());
    }

    #[test]
    fn test_chat_reply_shapes() {
        let enveloped = json!({ "success": true, "data": { "role": "assistant", "content": "  Keep *this* text.\n" } });
        let reply = decode_chat_reply(&enveloped).unwrap();
        assert_eq!(reply.role, ChatRole::Assistant);
        assert_eq!(reply.content, "  Keep *this* text.\n");

        let bare = json!({ "role": "assistant", "content": "bare" });
        assert_eq!(decode_chat_reply(&bare).unwrap().content, "bare");
    }

    #[test]
    fn test_chat_reply_from_user_role_is_malformed() {
        let echoed = json!({ "success": true, "data": { "role": "user", "content": "hello?" } });
        assert!(matches!(
            decode_chat_reply(&echoed),
            Err(ApiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_upload_result_surfaces_server_verdict() {
        let rejected = json!({ "success": false, "message": "duplicate upload" });
        let result = decode_upload_result(&rejected).unwrap();
        assert!(!result.success);
        assert_eq!(result.message, "duplicate upload");

        let wrapped = json!({ "data": { "success": true, "message": "stored" } });
        assert!(decode_upload_result(&wrapped).unwrap().success);

        assert!(matches!(
            decode_upload_result(&json!("ok")),
            Err(ApiError::MalformedResponse(_))
        ));
    }
}
