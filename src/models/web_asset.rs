use serde::{Deserialize, Serialize};

use super::RiskLevel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebAssetSubject {
    pub common_name: String,
    pub organization: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebAssetIssuer {
    pub common_name: String,
    pub organization: String,
    pub country: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    Active,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidityPeriod {
    pub not_before: String,
    pub not_after: String,
    pub length_days: u32,
    pub status: CertificateStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyInfo {
    pub algorithm: String,
    pub key_size: u32,
    pub public_key_fingerprint: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaType {
    PublicCa,
    CommercialCa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationLevel {
    DomainValidated,
    OrganizationValidated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateAuthority {
    pub name: String,
    #[serde(rename = "type")]
    pub ca_type: CaType,
    pub validation_level: ValidationLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateTransparency {
    pub logs_count: u32,
    pub first_seen: Option<String>,
    #[serde(default)]
    pub logs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationPaths {
    pub apple: bool,
    pub chrome: bool,
    pub microsoft: bool,
    pub mozilla: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub trusted_by_major_browsers: bool,
    pub validation_paths: ValidationPaths,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_issues: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZlintStatus {
    ErrorsPresent,
    NoticesPresent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityAnalysis {
    pub zlint_status: ZlintStatus,
    #[serde(default)]
    pub failed_lints: Vec<String>,
    pub risk_level: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebThreatIntelligence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_mismatch: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspicious_patterns: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageIndicators {
    pub ever_seen_in_scan: bool,
    pub last_seen: String,
}

/// A TLS certificate record and the hostnames it covers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebAsset {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub fingerprint_sha256: String,
    pub fingerprint_sha1: String,
    pub fingerprint_md5: String,
    pub domains: Vec<String>,
    pub subject: WebAssetSubject,
    pub issuer: WebAssetIssuer,
    pub validity_period: ValidityPeriod,
    pub key_info: KeyInfo,
    pub certificate_authority: CertificateAuthority,
    pub certificate_transparency: CertificateTransparency,
    pub validation: Validation,
    pub security_analysis: SecurityAnalysis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat_intelligence: Option<WebThreatIntelligence>,
    pub usage_indicators: UsageIndicators,
}

impl WebAsset {
    /// A key identifies the asset either by `id` or by any covered domain
    pub fn matches_key(&self, key: &str) -> bool {
        self.id == key || self.domains.iter().any(|d| d == key)
    }
}
