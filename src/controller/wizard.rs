use tokio::sync::RwLock;
use tracing::{debug, info};

use super::sequence::RequestSequencer;
use crate::domain::{percent, ScenarioError, ScenarioParams, ScenarioState, WizardStep};
use crate::services::{ScenarioResult, ScenarioResultAdapter};
use crate::simulation::{simulate, LoadProfileSample, ProfileSummary};

#[derive(Debug, Clone, Default)]
struct WizardState {
    scenario: ScenarioState,
    result: Option<ScenarioResult>,
    assessing: bool,
}

/// Five-step scenario wizard. Entering the results step requests an
/// assessment of the scenario as it stood when the step was entered.
pub struct ScenarioWizard {
    state: RwLock<WizardState>,
    adapter: ScenarioResultAdapter,
    assessments: RequestSequencer,
}

impl ScenarioWizard {
    pub fn new(adapter: ScenarioResultAdapter) -> Self {
        Self {
            state: RwLock::new(WizardState::default()),
            adapter,
            assessments: RequestSequencer::new(),
        }
    }

    pub async fn state(&self) -> ScenarioState {
        self.state.read().await.scenario
    }

    pub async fn step(&self) -> WizardStep {
        self.state.read().await.scenario.step
    }

    pub async fn params(&self) -> ScenarioParams {
        self.state.read().await.scenario.params
    }

    pub async fn set_ev_adoption(&self, value: i64) -> Result<(), ScenarioError> {
        let value = percent("ev_adoption_percent", value)?;
        self.state.write().await.scenario.params.ev_adoption_percent = value;
        Ok(())
    }

    pub async fn set_solar_adoption(&self, value: i64) -> Result<(), ScenarioError> {
        let value = percent("solar_adoption_percent", value)?;
        self.state.write().await.scenario.params.solar_adoption_percent = value;
        Ok(())
    }

    pub async fn set_battery_capacity(&self, value: i64) -> Result<(), ScenarioError> {
        let value = percent("battery_capacity_percent", value)?;
        self.state.write().await.scenario.params.battery_capacity_percent = value;
        Ok(())
    }

    pub async fn set_climate_stress(&self, enabled: bool) {
        self.state.write().await.scenario.params.climate_stress_enabled = enabled;
    }

    /// Advance one step. Moving into the results step triggers an assessment;
    /// its result is kept only if no later assessment or restart happened
    /// while it was in flight.
    pub async fn next(&self) -> WizardStep {
        self.move_to(WizardStep::next).await
    }

    pub async fn back(&self) -> WizardStep {
        self.move_to(WizardStep::back).await
    }

    /// Jump straight to `step`. Landing on the results step from any other
    /// step assesses exactly like `next` does.
    pub async fn go_to(&self, step: WizardStep) -> WizardStep {
        self.move_to(|_| step).await
    }

    async fn move_to(&self, target: impl FnOnce(WizardStep) -> WizardStep) -> WizardStep {
        let (step, pending) = {
            let mut state = self.state.write().await;
            let from = state.scenario.step;
            let to = target(from);
            state.scenario.step = to;
            let pending = if to.is_final() && !from.is_final() {
                state.result = None;
                state.assessing = true;
                Some((self.assessments.issue(), state.scenario.params))
            } else {
                None
            };
            (to, pending)
        };
        debug!(%step, "wizard moved");

        if let Some((ticket, params)) = pending {
            let result = self.adapter.assess(params).await;
            let mut state = self.state.write().await;
            if self.assessments.is_current(ticket) {
                info!(
                    score = result.resilience_score,
                    source = ?result.source,
                    "scenario result ready"
                );
                state.result = Some(result);
                state.assessing = false;
            } else {
                debug!(ticket = ticket.number(), "discarding superseded scenario result");
            }
        }
        step
    }

    /// Return to the first step with default inputs. Any in-flight
    /// assessment is dropped when it completes.
    pub async fn restart(&self) {
        let mut state = self.state.write().await;
        self.assessments.invalidate();
        *state = WizardState::default();
        debug!("wizard restarted");
    }

    /// True while the latest assessment has not come back yet.
    pub async fn assessing(&self) -> bool {
        self.state.read().await.assessing
    }

    pub async fn result(&self) -> Option<ScenarioResult> {
        self.state.read().await.result.clone()
    }

    /// Hourly profile for the current inputs.
    pub async fn profile(&self) -> Vec<LoadProfileSample> {
        simulate(&self.params().await)
    }

    pub async fn summary(&self) -> ProfileSummary {
        ProfileSummary::from_profile(&self.profile().await)
    }
}
