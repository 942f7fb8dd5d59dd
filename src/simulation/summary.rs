use serde::{Deserialize, Serialize};

use super::load_profile::LoadProfileSample;

/// Reference grid capacity drawn on the stress-test chart.
pub const GRID_CAPACITY_REFERENCE: f64 = 100.0;

/// Headline numbers for a simulated day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub peak_net_load: f64,
    pub peak_net_hour: u8,
    pub peak_original_load: f64,
    /// How much the managed peak sits below the unmanaged peak, in percent
    pub peak_reduction_percent: f64,
    /// Sum of hourly solar generation (one sample per hour)
    pub solar_energy: f64,
    pub ev_energy: f64,
    /// Hours whose managed load exceeds the capacity reference
    pub hours_over_capacity: usize,
}

impl ProfileSummary {
    pub fn from_profile(profile: &[LoadProfileSample]) -> Self {
        let mut peak_net_load = 0.0;
        let mut peak_net_hour = 0;
        let mut peak_original_load: f64 = 0.0;
        let mut solar_energy = 0.0;
        let mut ev_energy = 0.0;
        let mut hours_over_capacity = 0;

        for sample in profile {
            if sample.net_load > peak_net_load {
                peak_net_load = sample.net_load;
                peak_net_hour = sample.hour;
            }
            peak_original_load = peak_original_load.max(sample.original_load);
            solar_energy += sample.solar_generation;
            ev_energy += sample.ev_load;
            if sample.net_load > GRID_CAPACITY_REFERENCE {
                hours_over_capacity += 1;
            }
        }

        let peak_reduction_percent = if peak_original_load > 0.0 {
            (peak_original_load - peak_net_load) / peak_original_load * 100.0
        } else {
            0.0
        };

        Self {
            peak_net_load,
            peak_net_hour,
            peak_original_load,
            peak_reduction_percent,
            solar_energy,
            ev_energy,
            hours_over_capacity,
        }
    }
}
