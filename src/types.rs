use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

/// Risk band assigned by the service.
///
/// Labels outside the four known bands are kept as [`RiskLevel::Other`] rather than
/// rejected; the service decides which bands exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
    Other(String),
}

impl RiskLevel {
    /// Band for a 0-100 score: [0,30) low, [30,60) medium, [60,80) high, 80 and up critical.
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=29 => RiskLevel::Low,
            30..=59 => RiskLevel::Medium,
            60..=79 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
            RiskLevel::Other(label) => label,
        }
    }
}

impl From<&str> for RiskLevel {
    fn from(label: &str) -> Self {
        match label {
            "low" => RiskLevel::Low,
            "medium" => RiskLevel::Medium,
            "high" => RiskLevel::High,
            "critical" => RiskLevel::Critical,
            other => RiskLevel::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RiskLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(RiskLevel::from(label.as_str()))
    }
}

/// List matches and classification behind a score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningDetails {
    pub sanctions_hit: bool,
    pub pep_hit: bool,
    pub watchlist_hit: bool,
    /// Lists consulted, in the order the service reports them
    pub checked_lists: Vec<String>,
    /// wallet, contract, exchange, mixer, ens, iban, ...
    pub address_type: String,
    /// Fields this crate does not model, carried through unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Successful answer from `POST /v1/screen`.
///
/// Taken as the service sends it; the client does not re-check score ranges or whether
/// `risk_level` agrees with `score`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub score: u32,
    #[serde(rename = "risk")]
    pub risk_level: RiskLevel,
    pub chain: String,
    /// Canonical form of the input, e.g. an ENS name resolved to its hex address
    #[serde(rename = "resolved")]
    pub resolved_address: String,
    /// Processing time reported by the service, kept as sent (integer or fractional)
    pub latency_ms: serde_json::Number,
    pub details: ScreeningDetails,
    /// Fields this crate does not model, carried through unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScreeningResult {
    /// Service-side latency as a [`Duration`], if it is a usable non-negative number.
    pub fn latency(&self) -> Option<Duration> {
        let millis = self.latency_ms.as_f64()?;
        Duration::try_from_secs_f64(millis / 1000.0).ok()
    }
}
