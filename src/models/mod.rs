pub mod chat;
pub mod host;
pub mod summary;
pub mod upload;
pub mod web_asset;

// Re-export commonly used types
pub use chat::*;
pub use host::*;
pub use summary::*;
pub use upload::*;
pub use web_asset::*;

use serde::{Deserialize, Serialize};

/// Fixed ordered risk scale shared by hosts, web assets, vulnerabilities and summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Critical => write!(f, "critical"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn test_risk_level_wire_format() {
        let level: RiskLevel = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(level, RiskLevel::Critical);
        assert_eq!(level.to_string(), "critical");
        assert!(serde_json::from_str::<RiskLevel>("\"severe\"").is_err());
    }
}
