use serde::{Deserialize, Serialize};

use super::RiskLevel;

/// Server-side lifecycle of an AI security summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStatus {
    Pending,
    Processing,
    Complete,
    Failed,
}

impl SummaryStatus {
    /// `complete` and `failed` end the lifecycle; polling further changes nothing
    pub fn is_terminal(self) -> bool {
        matches!(self, SummaryStatus::Complete | SummaryStatus::Failed)
    }
}

impl std::fmt::Display for SummaryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryStatus::Pending => write!(f, "pending"),
            SummaryStatus::Processing => write!(f, "processing"),
            SummaryStatus::Complete => write!(f, "complete"),
            SummaryStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Certificate and edge facts the summary was derived from. Every field may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryEvidence {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub cert_sha256: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub valid_from: Option<String>,
    #[serde(default)]
    pub valid_to: Option<String>,
    #[serde(default)]
    pub days_to_expiry: Option<i64>,
    #[serde(default)]
    pub key_type: Option<String>,
    #[serde(default)]
    pub key_size: Option<u32>,
    #[serde(default)]
    pub signature_algorithm: Option<String>,
    #[serde(default)]
    pub san_count: Option<u32>,
    #[serde(default)]
    pub wildcard: Option<bool>,
    #[serde(default)]
    pub https_redirect: Option<bool>,
    #[serde(default)]
    pub waf_cdn_hint: Option<String>,
    #[serde(default)]
    pub ct_log_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataCoverage {
    pub percentage: f64,
    #[serde(default)]
    pub missing_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecuritySummary {
    pub summary: String,
    pub severity: RiskLevel,
    pub evidence: SummaryEvidence,
    #[serde(default)]
    pub evidence_extras: String,
    #[serde(default)]
    pub findings: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub assumptions: Vec<String>,
    pub data_coverage: DataCoverage,
}

/// Result of one summary check. `summary` is present exactly when `status` is complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryPoll {
    pub status: SummaryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SecuritySummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SummaryPoll {
    pub fn pending() -> Self {
        Self {
            status: SummaryStatus::Pending,
            summary: None,
            error: None,
        }
    }

    pub fn processing() -> Self {
        Self {
            status: SummaryStatus::Processing,
            summary: None,
            error: None,
        }
    }

    pub fn complete(summary: SecuritySummary) -> Self {
        Self {
            status: SummaryStatus::Complete,
            summary: Some(summary),
            error: None,
        }
    }

    pub fn failed(error: Option<String>) -> Self {
        Self {
            status: SummaryStatus::Failed,
            summary: None,
            error,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
