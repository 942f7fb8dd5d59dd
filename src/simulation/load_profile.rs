//! # Scenario Load Profile
//!
//! Synthesizes a 24-hour load and generation curve from the four scenario
//! inputs. The model is stateless per hour: the battery has no state of charge,
//! it only shaves peaks above 60 and fills valleys below 20.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::domain::ScenarioParams;

pub const HOURS_PER_DAY: u8 = 24;

const BASE_LOAD: f64 = 50.0;
const BASE_AMPLITUDE: f64 = 30.0;
const EV_EVENING_LOAD: f64 = 40.0;
const EV_IDLE_LOAD: f64 = 10.0;
const SOLAR_PEAK: f64 = 60.0;
const BATTERY_CHARGE_BELOW: f64 = 20.0;
const BATTERY_DISCHARGE_ABOVE: f64 = 60.0;
const CLIMATE_MULTIPLIER: f64 = 1.5;
const CLIMATE_AFTERNOON_EXTRA: f64 = 20.0;

/// One hour of the simulated profile. All values are non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadProfileSample {
    pub hour: u8,
    /// Axis label, e.g. `"18:00"`
    pub label: String,
    pub base_load: f64,
    pub ev_load: f64,
    pub solar_generation: f64,
    /// Load after solar offset and battery action
    pub net_load: f64,
    /// Unmanaged load (base + EV) for before/after comparison
    pub original_load: f64,
}

/// Diurnal phase shared by base load and sun factor, peaking at hour 12 and
/// crossing zero at hours 6 and 18.
fn diurnal(hour: f64) -> f64 {
    ((hour - 6.0) / 12.0 * PI).sin()
}

fn base_load(hour: u8, climate_stress: bool) -> f64 {
    let mut load = BASE_LOAD + BASE_AMPLITUDE * diurnal(hour as f64);
    if climate_stress {
        load *= CLIMATE_MULTIPLIER;
        if hour > 12 && hour < 16 {
            load += CLIMATE_AFTERNOON_EXTRA;
        }
    }
    load
}

fn ev_load(hour: u8, ev_percent: f64) -> f64 {
    let demand = if hour > 17 && hour < 22 {
        EV_EVENING_LOAD
    } else {
        EV_IDLE_LOAD
    };
    ev_percent / 100.0 * demand
}

fn solar_generation(hour: u8, solar_percent: f64) -> f64 {
    let sun = if hour > 6 && hour < 18 {
        diurnal(hour as f64)
    } else {
        0.0
    };
    solar_percent / 100.0 * sun * SOLAR_PEAK
}

/// Positive when discharging, negative when charging.
fn battery_action(net_load: f64, battery_percent: f64) -> f64 {
    if battery_percent <= 0.0 {
        return 0.0;
    }
    let magnitude = battery_percent / 2.0;
    if net_load < BATTERY_CHARGE_BELOW {
        -magnitude
    } else if net_load > BATTERY_DISCHARGE_ABOVE {
        magnitude
    } else {
        0.0
    }
}

/// Profile sample for a single hour.
pub fn simulate_hour(params: &ScenarioParams, hour: u8) -> LoadProfileSample {
    let base = base_load(hour, params.climate_stress_enabled);
    let ev = ev_load(hour, params.ev_adoption_percent as f64);
    let solar = solar_generation(hour, params.solar_adoption_percent as f64);

    let net = base + ev - solar;
    let action = battery_action(net, params.battery_capacity_percent as f64);

    LoadProfileSample {
        hour,
        label: format!("{hour}:00"),
        base_load: base.max(0.0),
        ev_load: ev.max(0.0),
        solar_generation: solar.max(0.0),
        net_load: (net - action).max(0.0),
        original_load: (base + ev).max(0.0),
    }
}

/// The full 24-hour profile, hour 0 first.
pub fn simulate(params: &ScenarioParams) -> Vec<LoadProfileSample> {
    (0..HOURS_PER_DAY)
        .map(|hour| simulate_hour(params, hour))
        .collect()
}
