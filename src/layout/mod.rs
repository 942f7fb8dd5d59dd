//! # Topology Layout
//!
//! Turns a grid snapshot into canvas positions for the topology graph.
//!
//! ## Pipeline
//!
//! 1. **Projection** (`projection`): geographic coordinates are normalized
//!    onto the canvas; nodes without coordinates go to a district grid and the
//!    primary generator is pinned to its feature position.
//! 2. **Collision** (`collision`): positions are pushed apart greedily, in node
//!    order, until every pair is at least the minimum distance apart or the
//!    attempt budget runs out.
//! 3. **Edge routing**: links are kept only when both endpoints exist in the
//!    snapshot.
//!
//! Layout is a pure function of the snapshot. Nothing is carried between calls.

pub mod collision;
pub mod projection;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub use collision::{CollisionResolver, Placement, MAX_ATTEMPTS, MIN_DISTANCE};
pub use projection::{CoordinateProjector, GeoBounds, FEATURE_POSITION};

use crate::domain::{GridSnapshot, NodeCategory, NodeStatus};

/// Well-known id of the main power plant.
pub const PRIMARY_GENERATOR_ID: &str = "gen1";

/// Point on the layout canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn distance_to(&self, other: Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub min_distance: f64,
    pub max_attempts: u32,
    pub primary_generator_id: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_distance: MIN_DISTANCE,
            max_attempts: MAX_ATTEMPTS,
            primary_generator_id: PRIMARY_GENERATOR_ID.to_string(),
        }
    }
}

/// A node with its final position and the data shown on its card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedNode {
    pub id: String,
    pub name: String,
    pub category: NodeCategory,
    pub status: NodeStatus,
    pub generation: f64,
    pub load: f64,
    pub position: Position,
    pub converged: bool,
}

/// A link whose endpoints are both present in the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutedEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyLayout {
    /// Nodes in snapshot order
    pub nodes: Vec<PlacedNode>,
    pub edges: Vec<RoutedEdge>,
    /// Links dropped because an endpoint was missing
    pub dropped_links: usize,
}

impl TopologyLayout {
    pub fn position_of(&self, id: &str) -> Option<Position> {
        self.nodes.iter().find(|n| n.id == id).map(|n| n.position)
    }

    /// Node id to position map.
    pub fn positions(&self) -> HashMap<&str, Position> {
        self.nodes
            .iter()
            .map(|n| (n.id.as_str(), n.position))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct TopologyLayoutEngine {
    projector: CoordinateProjector,
    resolver: CollisionResolver,
}

impl Default for TopologyLayoutEngine {
    fn default() -> Self {
        Self::new(&LayoutConfig::default())
    }
}

impl TopologyLayoutEngine {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            projector: CoordinateProjector::new(config.primary_generator_id.clone()),
            resolver: CollisionResolver::new(config.min_distance, config.max_attempts),
        }
    }

    /// Compute positions and routed edges for `snapshot`.
    pub fn layout(&self, snapshot: &GridSnapshot) -> TopologyLayout {
        let initial = self.projector.project(&snapshot.nodes);
        let placements = self.resolver.resolve(&initial);

        let nodes: Vec<PlacedNode> = snapshot
            .nodes
            .iter()
            .zip(placements)
            .map(|(node, placement)| PlacedNode {
                id: node.id.clone(),
                name: node.name.clone(),
                category: node.category,
                status: node.status,
                generation: node.generation,
                load: node.load,
                position: placement.position,
                converged: placement.converged,
            })
            .collect();

        let known: HashSet<&str> = snapshot.nodes.iter().map(|n| n.id.as_str()).collect();
        let mut edges = Vec::with_capacity(snapshot.links.len());
        let mut dropped_links = 0;
        for link in &snapshot.links {
            if known.contains(link.source_id.as_str()) && known.contains(link.target_id.as_str()) {
                edges.push(RoutedEdge {
                    id: link.id.clone(),
                    source: link.source_id.clone(),
                    target: link.target_id.clone(),
                    active: link.is_active(),
                });
            } else {
                debug!(
                    link = %link.id,
                    source = %link.source_id,
                    target = %link.target_id,
                    "link references unknown node, skipping"
                );
                dropped_links += 1;
            }
        }

        TopologyLayout {
            nodes,
            edges,
            dropped_links,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Link, LinkStatus, Node};

    fn node(id: &str, category: NodeCategory, coord: Option<(f64, f64)>) -> Node {
        Node {
            id: id.to_string(),
            name: format!("Node {id}"),
            category,
            status: NodeStatus::Active,
            lat: coord.map(|c| c.0),
            lon: coord.map(|c| c.1),
            generation: 0.0,
            load: 10.0,
        }
    }

    fn link(id: &str, source: &str, target: &str, status: LinkStatus) -> Link {
        Link {
            id: id.to_string(),
            source_id: source.to_string(),
            target_id: target.to_string(),
            status,
        }
    }

    fn reference_snapshot() -> GridSnapshot {
        GridSnapshot {
            nodes: vec![
                node("gen1", NodeCategory::Source, Some((38.9, -77.0))),
                node("sol1", NodeCategory::Source, Some((38.95, -77.05))),
                node("cons1", NodeCategory::Consumer, None),
                node("cons2", NodeCategory::Consumer, None),
                node("cons3", NodeCategory::Consumer, None),
            ],
            links: vec![
                link("l1", "gen1", "cons1", LinkStatus::Active),
                link("l2", "gen1", "cons2", LinkStatus::Broken),
                link("l3", "gen1", "ghost", LinkStatus::Active),
            ],
            total_load: 850.0,
            total_generation: 900.0,
            efficiency: 0.94,
            leak_detected: false,
            timestamp: None,
        }
    }

    #[test]
    fn test_reference_grid_layout() {
        let layout = TopologyLayoutEngine::default().layout(&reference_snapshot());

        assert_eq!(layout.nodes.len(), 5);
        assert_eq!(layout.position_of("gen1"), Some(FEATURE_POSITION));
        // sol1 is the north-west corner of the bounding box
        assert_eq!(layout.position_of("sol1"), Some(Position { x: 0.0, y: 0.0 }));
        assert_eq!(
            layout.position_of("cons1"),
            Some(projection::fallback_slot(2))
        );
        assert!(layout.nodes.iter().all(|n| n.converged));
    }

    #[test]
    fn test_dangling_links_are_dropped() {
        let layout = TopologyLayoutEngine::default().layout(&reference_snapshot());

        assert_eq!(layout.edges.len(), 2);
        assert_eq!(layout.dropped_links, 1);
        assert!(layout.edges[0].active);
        assert!(!layout.edges[1].active);
        assert!(layout.edges.iter().all(|e| e.id != "l3"));
    }

    #[test]
    fn test_layout_is_idempotent() {
        let engine = TopologyLayoutEngine::default();
        let snapshot = reference_snapshot();
        assert_eq!(engine.layout(&snapshot), engine.layout(&snapshot));
    }

    #[test]
    fn test_positions_map_covers_every_node() {
        let layout = TopologyLayoutEngine::default().layout(&reference_snapshot());
        let positions = layout.positions();
        assert_eq!(positions.len(), 5);
        assert_eq!(positions["gen1"], FEATURE_POSITION);
    }

    #[test]
    fn test_all_pairs_separated() {
        let layout = TopologyLayoutEngine::default().layout(&reference_snapshot());
        for (i, a) in layout.nodes.iter().enumerate() {
            for b in layout.nodes.iter().skip(i + 1) {
                assert!(a.position.distance_to(b.position) >= MIN_DISTANCE);
            }
        }
    }

    #[test]
    fn test_custom_primary_generator() {
        let config = LayoutConfig {
            primary_generator_id: "sol1".to_string(),
            ..LayoutConfig::default()
        };
        let layout = TopologyLayoutEngine::new(&config).layout(&reference_snapshot());
        assert_eq!(layout.position_of("sol1"), Some(FEATURE_POSITION));
        assert_ne!(layout.position_of("gen1"), Some(FEATURE_POSITION));
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = GridSnapshot {
            nodes: vec![],
            links: vec![link("l1", "a", "b", LinkStatus::Active)],
            total_load: 0.0,
            total_generation: 0.0,
            efficiency: 0.0,
            leak_detected: false,
            timestamp: None,
        };
        let layout = TopologyLayoutEngine::default().layout(&snapshot);
        assert!(layout.nodes.is_empty());
        assert!(layout.edges.is_empty());
        assert_eq!(layout.dropped_links, 1);
    }
}
