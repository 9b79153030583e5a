use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a price alert relative to its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    Above,
    Below,
}

impl AlertCondition {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "above" => Some(Self::Above),
            "below" => Some(Self::Below),
            _ => None,
        }
    }

    /// Boundary is inclusive in both directions.
    pub fn is_met(self, price: f64, threshold: f64) -> bool {
        match self {
            Self::Above => price >= threshold,
            Self::Below => price <= threshold,
        }
    }
}

impl fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Above => write!(f, "above"),
            Self::Below => write!(f, "below"),
        }
    }
}

/// A user-registered price alert. `triggered` flips to true exactly once;
/// the alert is never evaluated again afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    pub user_id: i64,
    pub symbol: String,
    pub condition: AlertCondition,
    pub threshold: f64,
    pub created_at: DateTime<Utc>,
    pub triggered: bool,
}

#[cfg(test)]
mod tests {
    use super::AlertCondition;

    #[test]
    fn parses_conditions_case_insensitively() {
        assert_eq!(AlertCondition::parse("above"), Some(AlertCondition::Above));
        assert_eq!(AlertCondition::parse("BELOW"), Some(AlertCondition::Below));
        assert_eq!(AlertCondition::parse("sideways"), None);
    }

    #[test]
    fn above_triggers_at_exact_threshold() {
        assert!(AlertCondition::Above.is_met(50_000.0, 50_000.0));
        assert!(AlertCondition::Above.is_met(50_001.0, 50_000.0));
        assert!(!AlertCondition::Above.is_met(49_999.0, 50_000.0));
    }

    #[test]
    fn below_triggers_at_exact_threshold() {
        assert!(AlertCondition::Below.is_met(50_000.0, 50_000.0));
        assert!(AlertCondition::Below.is_met(49_999.0, 50_000.0));
        assert!(!AlertCondition::Below.is_met(50_001.0, 50_000.0));
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&AlertCondition::Above).unwrap(),
            "\"above\""
        );
        let parsed: AlertCondition = serde_json::from_str("\"below\"").unwrap();
        assert_eq!(parsed, AlertCondition::Below);
    }
}
