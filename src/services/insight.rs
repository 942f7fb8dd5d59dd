use serde::{Deserialize, Serialize};

use super::ServiceError;

/// Shown until the first insight response arrives.
pub const INSIGHT_PLACEHOLDER: &str = "Initializing AI analysis...";
/// Replaces replies that look like provider errors.
pub const INSIGHT_ACTIVE: &str =
    "Grid operating within normal parameters. Real-time analysis active.";
/// Replaces failed requests.
pub const INSIGHT_NOMINAL: &str = "Grid operating within normal parameters. All systems nominal.";

/// Raw `GET /ai-insight` body. `analysis` is usually a string but the
/// backend passes provider errors through unchanged, so anything is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightResponse {
    #[serde(default)]
    pub analysis: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsightOrigin {
    Placeholder,
    Remote,
    /// Reply arrived but looked like an error
    Masked,
    /// Request failed
    Fallback,
}

/// Text displayed in the insight panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub text: String,
    pub origin: InsightOrigin,
}

impl Default for Insight {
    fn default() -> Self {
        Self {
            text: INSIGHT_PLACEHOLDER.to_string(),
            origin: InsightOrigin::Placeholder,
        }
    }
}

impl Insight {
    /// Apply the display policy to a fetch result.
    pub fn from_result(result: Result<InsightResponse, ServiceError>) -> Self {
        match result {
            Ok(InsightResponse {
                analysis: serde_json::Value::String(text),
            }) if !looks_like_error(&text) => Self {
                text,
                origin: InsightOrigin::Remote,
            },
            Ok(_) => Self {
                text: INSIGHT_ACTIVE.to_string(),
                origin: InsightOrigin::Masked,
            },
            Err(_) => Self {
                text: INSIGHT_NOMINAL.to_string(),
                origin: InsightOrigin::Fallback,
            },
        }
    }
}

fn looks_like_error(text: &str) -> bool {
    text.contains("quota") || text.contains("error")
}
