use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::sequence::RequestSequencer;
use crate::domain::{GridOverview, GridSnapshot};
use crate::history::{HistoryRingBuffer, HistorySample};
use crate::layout::{TopologyLayout, TopologyLayoutEngine};
use crate::services::{demo_chargers, Charger, ChargerDirectory, Insight, InsightSource, NodeControl};

/// Everything the live dashboard renders.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    pub snapshot: Option<Arc<GridSnapshot>>,
    pub layout: TopologyLayout,
    pub history: HistoryRingBuffer,
    pub insight: Insight,
    pub chargers: Vec<Charger>,
}

pub struct DashboardController {
    engine: TopologyLayoutEngine,
    insight_source: Arc<dyn InsightSource>,
    node_control: Arc<dyn NodeControl>,
    charger_directory: Arc<dyn ChargerDirectory>,
    view: RwLock<DashboardView>,
    insight_seq: RequestSequencer,
}

impl DashboardController {
    pub fn new(
        engine: TopologyLayoutEngine,
        history_capacity: usize,
        insight_source: Arc<dyn InsightSource>,
        node_control: Arc<dyn NodeControl>,
        charger_directory: Arc<dyn ChargerDirectory>,
    ) -> Self {
        Self {
            engine,
            insight_source,
            node_control,
            charger_directory,
            view: RwLock::new(DashboardView {
                history: HistoryRingBuffer::new(history_capacity),
                ..DashboardView::default()
            }),
            insight_seq: RequestSequencer::new(),
        }
    }

    /// Replace the current snapshot. Layout and history sample are derived
    /// from the same instance and published in one write.
    pub async fn apply_snapshot(&self, snapshot: GridSnapshot) {
        let snapshot = Arc::new(snapshot);
        let layout = self.engine.layout(&snapshot);
        let sample = HistorySample::from_snapshot(&snapshot, Local::now());

        debug!(
            nodes = layout.nodes.len(),
            edges = layout.edges.len(),
            dropped_links = layout.dropped_links,
            total_load = snapshot.total_load,
            total_generation = snapshot.total_generation,
            "snapshot applied"
        );
        if snapshot.leak_detected {
            warn!(
                total_load = snapshot.total_load,
                total_generation = snapshot.total_generation,
                "leak detected"
            );
        }

        let mut view = self.view.write().await;
        view.layout = layout;
        view.history.push(sample);
        view.snapshot = Some(snapshot);
    }

    /// Fetch one insight and apply it unless a newer poll was issued meanwhile.
    pub async fn poll_insight(&self) -> Option<Insight> {
        let ticket = self.insight_seq.issue();
        let insight = Insight::from_result(self.insight_source.fetch_insight().await);

        let mut view = self.view.write().await;
        if !self.insight_seq.is_current(ticket) {
            debug!(ticket = ticket.number(), "discarding superseded insight");
            return None;
        }
        view.insight = insight.clone();
        Some(insight)
    }

    /// Poll the insight endpoint every `every`, starting immediately. Polls are
    /// not awaited by the loop, so a slow response never delays the next tick.
    pub async fn insight_loop(self: Arc<Self>, every: Duration, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(every.max(Duration::from_secs(1)));
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let this = self.clone();
                    tokio::spawn(async move {
                        this.poll_insight().await;
                    });
                }
            }
        }
        debug!("insight loop stopped");
    }

    /// Fire-and-forget node toggle. Failures are logged only.
    pub async fn toggle_node(&self, node_id: &str) {
        match self.node_control.toggle_node(node_id).await {
            Ok(()) => info!(node_id, "toggle sent"),
            Err(e) => warn!(node_id, error = %e, "toggle failed"),
        }
    }

    /// Load the charger list once, falling back to the demo set.
    pub async fn load_chargers(&self) -> Vec<Charger> {
        let chargers = match self.charger_directory.fetch_chargers().await {
            Ok(chargers) => chargers,
            Err(e) => {
                warn!(error = %e, "charger list unavailable, using demo chargers");
                demo_chargers()
            }
        };
        self.view.write().await.chargers = chargers.clone();
        chargers
    }

    pub async fn view(&self) -> DashboardView {
        self.view.read().await.clone()
    }

    pub async fn layout(&self) -> TopologyLayout {
        self.view.read().await.layout.clone()
    }

    pub async fn history(&self) -> Vec<HistorySample> {
        self.view.read().await.history.to_vec()
    }

    pub async fn insight(&self) -> Insight {
        self.view.read().await.insight.clone()
    }

    pub async fn overview(&self) -> Option<GridOverview> {
        self.view
            .read()
            .await
            .snapshot
            .as_ref()
            .map(|s| s.overview())
    }
}
