use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// Role of a node in the grid topology
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NodeCategory {
    Source,
    Consumer,
    Storage,
    #[serde(other)]
    Other,
}

impl Default for NodeCategory {
    fn default() -> Self {
        Self::Other
    }
}

/// Operational status reported for a node
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NodeStatus {
    Active,
    Inactive,
    Fault,
    #[serde(other)]
    Other,
}

impl Default for NodeStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// Status of a transmission link
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LinkStatus {
    Active,
    Broken,
    #[serde(other)]
    Other,
}

impl Default for LinkStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// A grid node as delivered by the telemetry feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub category: NodeCategory,
    #[serde(default)]
    pub status: NodeStatus,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default, deserialize_with = "non_negative")]
    pub generation: f64,
    #[serde(default, deserialize_with = "non_negative")]
    pub load: f64,
}

impl Node {
    /// Geographic coordinate as `(lat, lon)` when both parts are present,
    /// finite and non-zero. Zero is the feed's marker for "unknown".
    pub fn usable_coordinate(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon))
                if lat.is_finite() && lon.is_finite() && lat != 0.0 && lon != 0.0 =>
            {
                Some((lat, lon))
            }
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == NodeStatus::Active
    }
}

/// A link between two nodes of the same snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(default)]
    pub status: LinkStatus,
}

impl Link {
    pub fn is_active(&self) -> bool {
        self.status == LinkStatus::Active
    }
}

/// Full grid state pushed by the telemetry feed. Each snapshot replaces the
/// previous one wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default, deserialize_with = "non_negative")]
    pub total_load: f64,
    #[serde(default, deserialize_with = "non_negative")]
    pub total_generation: f64,
    #[serde(default, deserialize_with = "unit_interval")]
    pub efficiency: f64,
    #[serde(default)]
    pub leak_detected: bool,
    #[serde(default)]
    pub timestamp: Option<f64>,
}

impl GridSnapshot {
    /// Decode one telemetry frame.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Counts used by the dashboard header.
    pub fn overview(&self) -> GridOverview {
        let mut overview = GridOverview {
            node_count: self.nodes.len(),
            active_nodes: 0,
            sources: 0,
            consumers: 0,
            active_links: self.links.iter().filter(|l| l.is_active()).count(),
            total_load: self.total_load,
            total_generation: self.total_generation,
            efficiency_percent: self.efficiency * 100.0,
            leak_detected: self.leak_detected,
        };
        for node in &self.nodes {
            if node.is_active() {
                overview.active_nodes += 1;
            }
            match node.category {
                NodeCategory::Source => overview.sources += 1,
                NodeCategory::Consumer => overview.consumers += 1,
                _ => {}
            }
        }
        overview
    }
}

/// Aggregate metrics derived from a snapshot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GridOverview {
    pub node_count: usize,
    pub active_nodes: usize,
    pub sources: usize,
    pub consumers: usize,
    pub active_links: usize,
    pub total_load: f64,
    pub total_generation: f64,
    pub efficiency_percent: f64,
    pub leak_detected: bool,
}

fn non_negative<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    Ok(if value.is_finite() { value.max(0.0) } else { 0.0 })
}

fn unit_interval<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    Ok(if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: &str = r#"{
        "total_load": 850.0,
        "total_generation": 900.0,
        "efficiency": 0.94,
        "leak_detected": false,
        "timestamp": 1700000000.5,
        "nodes": [
            {"id": "gen1", "type": "source", "name": "Main Power Plant", "voltage": 0.0,
             "load": 0.0, "generation": 1000.0, "status": "active", "lat": 38.9, "lon": -77.0},
            {"id": "cons1", "type": "consumer", "name": "Residential District",
             "load": 200.0, "generation": 0.0, "status": "inactive", "lat": null, "lon": null},
            {"id": "bat1", "type": "storage", "name": "Battery Park",
             "load": -5.0, "generation": 3.0, "status": "fault"}
        ],
        "links": [
            {"id": "l1", "source_id": "gen1", "target_id": "cons1", "capacity": 1000,
             "current_load": 0.0, "status": "active"},
            {"id": "l2", "source_id": "gen1", "target_id": "bat1", "capacity": 10, "status": "broken"}
        ]
    }"#;

    #[test]
    fn test_decode_telemetry_frame() {
        let snapshot = GridSnapshot::from_json(FRAME).unwrap();

        assert_eq!(snapshot.nodes.len(), 3);
        assert_eq!(snapshot.links.len(), 2);
        assert_eq!(snapshot.nodes[0].category, NodeCategory::Source);
        assert_eq!(snapshot.nodes[1].status, NodeStatus::Inactive);
        assert_eq!(snapshot.nodes[1].lat, None);
        assert_eq!(snapshot.nodes[2].category, NodeCategory::Storage);
        assert_eq!(snapshot.links[1].status, LinkStatus::Broken);
        assert_eq!(snapshot.timestamp, Some(1700000000.5));
    }

    #[test]
    fn test_negative_values_clamped() {
        let snapshot = GridSnapshot::from_json(FRAME).unwrap();
        assert_eq!(snapshot.nodes[2].load, 0.0);
        assert_eq!(snapshot.nodes[2].generation, 3.0);
    }

    #[test]
    fn test_unknown_enum_values_decode_as_other() {
        let raw = r#"{"nodes": [{"id": "x", "type": "substation", "status": "maintenance"}],
                      "links": [{"id": "l", "source_id": "x", "target_id": "y", "status": "sagging"}],
                      "total_load": 0, "total_generation": 0, "efficiency": 3.5, "leak_detected": true}"#;
        let snapshot = GridSnapshot::from_json(raw).unwrap();

        assert_eq!(snapshot.nodes[0].category, NodeCategory::Other);
        assert_eq!(snapshot.nodes[0].status, NodeStatus::Other);
        assert_eq!(snapshot.links[0].status, LinkStatus::Other);
        assert_eq!(snapshot.efficiency, 1.0);
    }

    #[test]
    fn test_node_without_type_keeps_frame() {
        let raw = r#"{"nodes": [{"id": "gen1", "type": "source", "lat": 38.9, "lon": -77.0},
                                {"id": "mystery", "load": 12.0}],
                      "links": [], "total_load": 12, "total_generation": 20, "efficiency": 0.6}"#;
        let snapshot = GridSnapshot::from_json(raw).unwrap();

        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.nodes[1].category, NodeCategory::Other);
        assert_eq!(snapshot.nodes[1].load, 12.0);
        assert_eq!(snapshot.overview().sources, 1);
    }

    #[test]
    fn test_usable_coordinate() {
        let mut node = GridSnapshot::from_json(FRAME).unwrap().nodes.remove(0);
        assert_eq!(node.usable_coordinate(), Some((38.9, -77.0)));

        node.lat = Some(0.0);
        assert_eq!(node.usable_coordinate(), None);

        node.lat = Some(38.9);
        node.lon = None;
        assert_eq!(node.usable_coordinate(), None);

        node.lon = Some(f64::NAN);
        assert_eq!(node.usable_coordinate(), None);
    }

    #[test]
    fn test_overview_counts() {
        let overview = GridSnapshot::from_json(FRAME).unwrap().overview();

        assert_eq!(overview.node_count, 3);
        assert_eq!(overview.active_nodes, 1);
        assert_eq!(overview.sources, 1);
        assert_eq!(overview.consumers, 1);
        assert_eq!(overview.active_links, 1);
        assert!((overview.efficiency_percent - 94.0).abs() < 1e-9);
    }

    #[test]
    fn test_category_display_roundtrip() {
        assert_eq!(NodeCategory::Consumer.to_string(), "consumer");
        assert_eq!("source".parse::<NodeCategory>().unwrap(), NodeCategory::Source);
    }
}
