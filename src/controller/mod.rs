pub mod dashboard;
pub mod sequence;
pub mod wizard;

use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::feed::TelemetryFeed;
use crate::layout::TopologyLayoutEngine;
use crate::services::{HttpBackend, ScenarioResultAdapter};

pub use dashboard::{DashboardController, DashboardView};
pub use sequence::{RequestSequencer, RequestTicket};
pub use wizard::ScenarioWizard;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub dashboard: Arc<DashboardController>,
    pub wizard: Arc<ScenarioWizard>,
}

impl AppState {
    pub fn new(cfg: Config) -> Result<Self> {
        let backend = Arc::new(HttpBackend::new(
            &cfg.backend.base_url,
            cfg.backend.http_timeout(),
        )?);

        let dashboard = Arc::new(DashboardController::new(
            TopologyLayoutEngine::new(&cfg.layout),
            cfg.dashboard.history_capacity,
            backend.clone(),
            backend.clone(),
            backend.clone(),
        ));
        let wizard = Arc::new(ScenarioWizard::new(ScenarioResultAdapter::new(
            backend,
            cfg.scenario.fallback_seed,
        )));

        Ok(Self {
            cfg,
            dashboard,
            wizard,
        })
    }
}

/// Start the feed consumer, the insight poller and the one-shot charger load.
/// Every task stops when `cancel` fires.
pub fn spawn_controller_tasks(state: &AppState, cancel: CancellationToken) -> Vec<JoinHandle<()>> {
    let mut tasks = Vec::with_capacity(3);

    let (mut snapshots, feed) =
        TelemetryFeed::new(state.cfg.backend.ws_url.clone()).spawn(cancel.clone());
    let dashboard = state.dashboard.clone();
    tasks.push(tokio::spawn(async move {
        while let Some(snapshot) = snapshots.recv().await {
            dashboard.apply_snapshot(snapshot).await;
        }
        match feed.await {
            Ok(Ok(summary)) => info!(?summary, "telemetry consumer stopped"),
            Ok(Err(e)) => warn!(error = %e, "telemetry feed stopped"),
            Err(e) => warn!(error = %e, "telemetry feed task panicked"),
        }
    }));

    let dashboard = state.dashboard.clone();
    let every = state.cfg.dashboard.insight_poll_interval();
    tasks.push(tokio::spawn(dashboard.insight_loop(every, cancel.clone())));

    let dashboard = state.dashboard.clone();
    tasks.push(tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            chargers = dashboard.load_chargers() => info!(count = chargers.len(), "chargers loaded"),
        }
    }));

    tasks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_rejects_bad_backend_url() {
        let mut cfg = Config::default();
        cfg.backend.base_url = "not a url".to_string();
        assert!(AppState::new(cfg).is_err());
    }

    #[tokio::test]
    async fn test_tasks_stop_on_cancel() {
        let mut cfg = Config::default();
        // Nothing listens on the discard port, so every backend call fails fast.
        cfg.backend.base_url = "http://127.0.0.1:9".to_string();
        cfg.backend.ws_url = "ws://127.0.0.1:9/ws".to_string();
        let state = AppState::new(cfg).unwrap();

        let cancel = CancellationToken::new();
        let tasks = spawn_controller_tasks(&state, cancel.clone());
        cancel.cancel();
        for task in tasks {
            task.await.unwrap();
        }
        assert!(state.dashboard.overview().await.is_none());
    }
}
