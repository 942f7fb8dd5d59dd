//! # Scenario Simulation
//!
//! Deterministic what-if model behind the scenario wizard.
//!
//! ## Components
//!
//! - **Load profile**: 24 hourly samples of base load, EV charging, solar
//!   generation and battery-managed net load for a set of scenario inputs
//! - **Summary**: peak, offset and overload figures derived from a profile
//!
//! ## Usage
//!
//! ```rust
//! use grid_dashboard::domain::ScenarioParams;
//! use grid_dashboard::simulation::{simulate, ProfileSummary};
//!
//! let params = ScenarioParams::new(40, 30, 20, false).unwrap();
//! let profile = simulate(&params);
//! assert_eq!(profile.len(), 24);
//!
//! let summary = ProfileSummary::from_profile(&profile);
//! assert!(summary.peak_net_load <= summary.peak_original_load);
//! ```

pub mod load_profile;
pub mod summary;

pub use load_profile::{simulate, simulate_hour, LoadProfileSample, HOURS_PER_DAY};
pub use summary::{ProfileSummary, GRID_CAPACITY_REFERENCE};
