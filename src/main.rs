use anyhow::{Context, Result};
use grid_dashboard::{config, controller, simulation, telemetry};
use config::Config;
use telemetry::init_tracing;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }
    init_tracing();

    let cfg = Config::load().context("loading configuration")?;
    info!(
        backend = %cfg.backend.base_url,
        feed = %cfg.backend.ws_url,
        "starting grid dashboard"
    );

    let app_state = controller::AppState::new(cfg).context("building application state")?;

    let params = app_state.wizard.params().await;
    let summary = simulation::ProfileSummary::from_profile(&simulation::simulate(&params));
    info!(
        ?params,
        peak_net_load = summary.peak_net_load,
        peak_net_hour = summary.peak_net_hour,
        hours_over_capacity = summary.hours_over_capacity,
        "default scenario profile"
    );

    let cancel = CancellationToken::new();
    let tasks = controller::spawn_controller_tasks(&app_state, cancel.clone());

    telemetry::shutdown_signal().await;
    cancel.cancel();
    for task in tasks {
        if let Err(e) = task.await {
            warn!(error = %e, "task ended abnormally");
        }
    }

    if let Some(overview) = app_state.dashboard.overview().await {
        info!(?overview, "last grid overview");
    }
    warn!("shutdown complete");
    Ok(())
}
