//! Scenario resilience assessment with a local fallback.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

use super::AssessmentService;
use crate::domain::ScenarioParams;

/// Scores drawn by the fallback, upper bound exclusive.
pub const FALLBACK_SCORE_RANGE: Range<u32> = 70..95;

pub const FALLBACK_RECOMMENDATION: &str = "Based on your scenario configuration, the grid shows strong resilience. \
Consider increasing battery storage during peak solar hours to maximize renewable energy utilization.";

/// `POST /simulation/analyze` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub resilience_score: f64,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultSource {
    Remote,
    Fallback,
}

/// Assessment merged with the scenario it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub params: ScenarioParams,
    pub resilience_score: f64,
    pub recommendation: String,
    pub source: ResultSource,
}

/// Source of fallback scores. Seeded for reproducible runs, OS-seeded otherwise.
pub struct FallbackScorer {
    rng: Mutex<StdRng>,
}

impl FallbackScorer {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    pub fn score(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(FALLBACK_SCORE_RANGE) as f64
    }

    pub fn fallback(&self, params: ScenarioParams) -> ScenarioResult {
        ScenarioResult {
            params,
            resilience_score: self.score(),
            recommendation: FALLBACK_RECOMMENDATION.to_string(),
            source: ResultSource::Fallback,
        }
    }
}

/// Requests a remote assessment and substitutes the fallback on any failure.
pub struct ScenarioResultAdapter {
    service: Arc<dyn AssessmentService>,
    scorer: FallbackScorer,
}

impl ScenarioResultAdapter {
    pub fn new(service: Arc<dyn AssessmentService>, fallback_seed: Option<u64>) -> Self {
        Self {
            service,
            scorer: FallbackScorer::new(fallback_seed),
        }
    }

    pub async fn assess(&self, params: ScenarioParams) -> ScenarioResult {
        match self.service.analyze(&params).await {
            Ok(assessment) => {
                info!(
                    score = assessment.resilience_score,
                    "scenario assessment received"
                );
                ScenarioResult {
                    params,
                    resilience_score: assessment.resilience_score,
                    recommendation: assessment.recommendation,
                    source: ResultSource::Remote,
                }
            }
            Err(e) => {
                warn!(error = %e, "scenario assessment failed, using local fallback");
                self.scorer.fallback(params)
            }
        }
    }
}
