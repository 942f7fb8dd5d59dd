use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use thiserror::Error;
use validator::Validate;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("{field} must be within 0..=100, got {value}")]
    OutOfRange { field: &'static str, value: i64 },
    #[error("invalid scenario: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// The four policy inputs of the what-if scenario. Field names match the
/// assessment request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ScenarioParams {
    #[validate(range(min = 0, max = 100))]
    pub ev_adoption_percent: u8,
    #[validate(range(min = 0, max = 100))]
    pub solar_adoption_percent: u8,
    #[validate(range(min = 0, max = 100))]
    pub battery_capacity_percent: u8,
    pub climate_stress_enabled: bool,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            ev_adoption_percent: 10,
            solar_adoption_percent: 5,
            battery_capacity_percent: 0,
            climate_stress_enabled: false,
        }
    }
}

impl ScenarioParams {
    pub fn new(ev: u8, solar: u8, battery: u8, climate_stress: bool) -> Result<Self, ScenarioError> {
        let params = Self {
            ev_adoption_percent: ev,
            solar_adoption_percent: solar,
            battery_capacity_percent: battery,
            climate_stress_enabled: climate_stress,
        };
        params.validate()?;
        Ok(params)
    }
}

/// Convert raw slider input into a percent, rejecting anything outside 0..=100.
pub fn percent(field: &'static str, value: i64) -> Result<u8, ScenarioError> {
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= 100)
        .ok_or(ScenarioError::OutOfRange { field, value })
}

/// Steps of the scenario wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum WizardStep {
    #[strum(serialize = "EV")]
    Ev = 1,
    Solar = 2,
    Storage = 3,
    Climate = 4,
    Results = 5,
}

impl WizardStep {
    pub const FIRST: WizardStep = WizardStep::Ev;
    pub const FINAL: WizardStep = WizardStep::Results;

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Ev),
            2 => Some(Self::Solar),
            3 => Some(Self::Storage),
            4 => Some(Self::Climate),
            5 => Some(Self::Results),
            _ => None,
        }
    }

    /// Following step; stays put on the final one.
    pub fn next(self) -> Self {
        Self::from_number(self.number() + 1).unwrap_or(self)
    }

    /// Previous step; stays put on the first one.
    pub fn back(self) -> Self {
        Self::from_number(self.number().saturating_sub(1)).unwrap_or(self)
    }

    pub fn is_final(self) -> bool {
        self == Self::FINAL
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        Self::FIRST
    }
}

/// Scenario inputs plus the wizard position. Mutated only by user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScenarioState {
    pub params: ScenarioParams,
    pub step: WizardStep,
}
