pub mod config;
pub mod controller;
pub mod domain;
pub mod feed;
pub mod history;
pub mod layout;
pub mod services;
pub mod simulation;
pub mod telemetry;
