use serde::{Deserialize, Serialize};

/// EV charger point of interest in the OpenChargeMap shape used by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charger {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "AddressInfo")]
    pub address: AddressInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressInfo {
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "Title", default)]
    pub title: String,
}

impl Charger {
    pub fn new(id: i64, latitude: f64, longitude: f64, title: &str) -> Self {
        Self {
            id,
            address: AddressInfo {
                latitude,
                longitude,
                title: title.to_string(),
            },
        }
    }

    /// Map marker position as `(lat, lon)`
    pub fn position(&self) -> (f64, f64) {
        (self.address.latitude, self.address.longitude)
    }
}

/// Shown when the charger list cannot be fetched.
pub fn demo_chargers() -> Vec<Charger> {
    vec![
        Charger::new(1, 40.7128, -74.0060, "Downtown Charger"),
        Charger::new(2, 40.7589, -73.9851, "Times Square Station"),
    ]
}
