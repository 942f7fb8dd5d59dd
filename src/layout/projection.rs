//! Geographic projection of grid nodes onto the layout canvas.
//!
//! Nodes with a usable coordinate are normalized into a 1000 x 800 area with
//! north up. Nodes without one are parked on a four-column district grid below
//! the map so they never collide with the geographic cluster by default.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::Position;
use crate::domain::Node;

/// Width of the geographic area in canvas units.
pub const CANVAS_WIDTH: f64 = 1000.0;
/// Height of the geographic area in canvas units.
pub const CANVAS_HEIGHT: f64 = 800.0;
/// Smallest range (degrees) used on either axis.
pub const MIN_RANGE_DEG: f64 = 0.005;

pub const FALLBACK_COLUMNS: usize = 4;
pub const FALLBACK_COLUMN_WIDTH: f64 = 320.0;
pub const FALLBACK_ROW_HEIGHT: f64 = 250.0;
pub const FALLBACK_OFFSET_Y: f64 = 1500.0;

/// Where the primary generator is drawn regardless of its coordinates.
pub const FEATURE_POSITION: Position = Position { x: -250.0, y: 300.0 };

/// Latitude/longitude extent of the nodes being projected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Default for GeoBounds {
    /// Washington DC area, where the reference grid is located
    fn default() -> Self {
        Self {
            min_lat: 38.9,
            max_lat: 38.95,
            min_lon: -77.05,
            max_lon: -77.0,
        }
    }
}

impl GeoBounds {
    /// Bounds over nodes with a usable coordinate, or the default box when
    /// there are none.
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let coords: Vec<(f64, f64)> = nodes.iter().filter_map(Node::usable_coordinate).collect();
        if coords.is_empty() {
            return Self::default();
        }

        let lat = coords
            .iter()
            .map(|(lat, _)| *lat)
            .minmax_by(|a, b| a.total_cmp(b))
            .into_option();
        let lon = coords
            .iter()
            .map(|(_, lon)| *lon)
            .minmax_by(|a, b| a.total_cmp(b))
            .into_option();

        match (lat, lon) {
            (Some((min_lat, max_lat)), Some((min_lon, max_lon))) => Self {
                min_lat,
                max_lat,
                min_lon,
                max_lon,
            },
            _ => Self::default(),
        }
    }

    pub fn lat_range(&self) -> f64 {
        (self.max_lat - self.min_lat).max(MIN_RANGE_DEG)
    }

    pub fn lon_range(&self) -> f64 {
        (self.max_lon - self.min_lon).max(MIN_RANGE_DEG)
    }
}

/// Maps nodes to their initial canvas positions.
#[derive(Debug, Clone)]
pub struct CoordinateProjector {
    primary_generator_id: String,
}

impl CoordinateProjector {
    pub fn new(primary_generator_id: impl Into<String>) -> Self {
        Self {
            primary_generator_id: primary_generator_id.into(),
        }
    }

    /// One position per node, in input order.
    pub fn project(&self, nodes: &[Node]) -> Vec<Position> {
        let bounds = GeoBounds::from_nodes(nodes);
        nodes
            .iter()
            .enumerate()
            .map(|(index, node)| self.project_node(&bounds, index, node))
            .collect()
    }

    fn project_node(&self, bounds: &GeoBounds, index: usize, node: &Node) -> Position {
        if node.id == self.primary_generator_id {
            return FEATURE_POSITION;
        }

        match node.usable_coordinate() {
            Some((lat, lon)) => Position {
                x: (lon - bounds.min_lon) / bounds.lon_range() * CANVAS_WIDTH,
                y: (bounds.max_lat - lat) / bounds.lat_range() * CANVAS_HEIGHT,
            },
            None => fallback_slot(index),
        }
    }
}

/// Cell of the district grid for the node at `index` in iteration order.
pub fn fallback_slot(index: usize) -> Position {
    let col = index % FALLBACK_COLUMNS;
    let row = index / FALLBACK_COLUMNS;
    Position {
        x: col as f64 * FALLBACK_COLUMN_WIDTH,
        y: row as f64 * FALLBACK_ROW_HEIGHT + FALLBACK_OFFSET_Y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NodeCategory, NodeStatus};
    use proptest::prelude::*;
    use rstest::rstest;

    fn node(id: &str, lat: Option<f64>, lon: Option<f64>) -> Node {
        Node {
            id: id.to_string(),
            name: id.to_string(),
            category: NodeCategory::Consumer,
            status: NodeStatus::Active,
            lat,
            lon,
            generation: 0.0,
            load: 0.0,
        }
    }

    #[test]
    fn test_corners_map_to_canvas_edges() {
        let nodes = vec![
            node("nw", Some(39.0), Some(-77.2)),
            node("se", Some(38.8), Some(-77.0)),
        ];
        let positions = CoordinateProjector::new("gen1").project(&nodes);

        assert!((positions[0].x - 0.0).abs() < 1e-9);
        assert!((positions[0].y - 0.0).abs() < 1e-9);
        assert!((positions[1].x - CANVAS_WIDTH).abs() < 1e-9);
        assert!((positions[1].y - CANVAS_HEIGHT).abs() < 1e-9);
    }

    #[test]
    fn test_default_bounds_without_coordinates() {
        let nodes = vec![node("a", None, None), node("b", Some(0.0), Some(0.0))];
        assert_eq!(GeoBounds::from_nodes(&nodes), GeoBounds::default());
    }

    #[test]
    fn test_zero_coordinates_excluded_from_bounds() {
        let nodes = vec![
            node("a", Some(40.0), Some(-74.0)),
            node("b", Some(0.0), Some(-73.0)),
            node("c", Some(40.1), Some(-74.1)),
        ];
        let bounds = GeoBounds::from_nodes(&nodes);
        assert_eq!(bounds.min_lat, 40.0);
        assert_eq!(bounds.max_lat, 40.1);
        assert_eq!(bounds.min_lon, -74.1);
        assert_eq!(bounds.max_lon, -74.0);
    }

    #[test]
    fn test_identical_coordinates_use_minimum_range() {
        let nodes = vec![
            node("a", Some(40.0), Some(-74.0)),
            node("b", Some(40.0), Some(-74.0)),
        ];
        let bounds = GeoBounds::from_nodes(&nodes);
        assert_eq!(bounds.lat_range(), MIN_RANGE_DEG);
        assert_eq!(bounds.lon_range(), MIN_RANGE_DEG);

        let positions = CoordinateProjector::new("gen1").project(&nodes);
        assert!(positions.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
        assert_eq!(positions[0], Position { x: 0.0, y: 0.0 });
    }

    #[rstest]
    #[case(0, 0.0, 1500.0)]
    #[case(3, 960.0, 1500.0)]
    #[case(4, 0.0, 1750.0)]
    #[case(9, 320.0, 2000.0)]
    fn test_fallback_grid(#[case] index: usize, #[case] x: f64, #[case] y: f64) {
        assert_eq!(fallback_slot(index), Position { x, y });
    }

    #[test]
    fn test_fallback_uses_full_iteration_index() {
        let nodes = vec![
            node("geo", Some(40.0), Some(-74.0)),
            node("a", None, None),
            node("b", None, None),
        ];
        let positions = CoordinateProjector::new("gen1").project(&nodes);
        assert_eq!(positions[1], fallback_slot(1));
        assert_eq!(positions[2], fallback_slot(2));
    }

    #[test]
    fn test_primary_generator_is_pinned() {
        let nodes = vec![
            node("gen1", Some(38.9), Some(-77.0)),
            node("other", Some(38.95), Some(-77.05)),
            node("gen1-like", None, None),
        ];
        let positions = CoordinateProjector::new("gen1").project(&nodes);
        assert_eq!(positions[0], FEATURE_POSITION);
        assert_ne!(positions[2], FEATURE_POSITION);
    }

    proptest! {
        #[test]
        fn prop_ranges_never_below_minimum(
            coords in prop::collection::vec((-89.0f64..89.0, -179.0f64..179.0), 0..20)
        ) {
            let nodes: Vec<Node> = coords
                .iter()
                .enumerate()
                .map(|(i, (lat, lon))| node(&format!("n{i}"), Some(*lat), Some(*lon)))
                .collect();
            let bounds = GeoBounds::from_nodes(&nodes);
            prop_assert!(bounds.lat_range() >= MIN_RANGE_DEG);
            prop_assert!(bounds.lon_range() >= MIN_RANGE_DEG);

            let positions = CoordinateProjector::new("gen1").project(&nodes);
            prop_assert_eq!(positions.len(), nodes.len());
            for p in positions {
                prop_assert!(p.x.is_finite() && p.y.is_finite());
            }
        }
    }
}
