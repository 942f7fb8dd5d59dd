//! Backend collaborators of the dashboard.
//!
//! Each collaborator is a trait so controllers can be driven by mocks in tests;
//! [`HttpBackend`] implements all of them against the grid backend's REST API.
//! Failures surface as [`ServiceError`] here and are turned into local
//! fallbacks by the callers, never shown to the user.

pub mod assessment;
pub mod chargers;
pub mod http;
pub mod insight;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::ScenarioParams;

pub use assessment::{Assessment, FallbackScorer, ResultSource, ScenarioResult, ScenarioResultAdapter};
pub use chargers::{demo_chargers, AddressInfo, Charger};
pub use http::HttpBackend;
pub use insight::{Insight, InsightOrigin, InsightResponse};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
}

/// Periodic text insight about the live grid.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InsightSource: Send + Sync {
    async fn fetch_insight(&self) -> Result<InsightResponse, ServiceError>;
}

/// Fire-and-forget node switching.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NodeControl: Send + Sync {
    async fn toggle_node(&self, node_id: &str) -> Result<(), ServiceError>;
}

/// Points of interest for the charger map.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChargerDirectory: Send + Sync {
    async fn fetch_chargers(&self) -> Result<Vec<Charger>, ServiceError>;
}

/// Resilience assessment of a completed scenario.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssessmentService: Send + Sync {
    async fn analyze(&self, params: &ScenarioParams) -> Result<Assessment, ServiceError>;
}
