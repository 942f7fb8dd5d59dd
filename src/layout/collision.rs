//! Greedy collision avoidance.
//!
//! Nodes are placed one at a time in input order. Each new node is compared
//! only against positions that are already final; the first conflict found
//! pushes the node radially away from the conflicting one and the scan starts
//! over. Earlier nodes never move again, so the result depends on input order.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::Position;

/// Minimum distance between node centers.
pub const MIN_DISTANCE: f64 = 260.0;
/// Pushes allowed per node before it is accepted as-is.
pub const MAX_ATTEMPTS: u32 = 15;
/// Extra distance added on top of the overlap when pushing.
pub const PUSH_BUFFER: f64 = 50.0;
/// Radians per input index used when two centers coincide.
pub const COINCIDENT_ANGLE_STEP: f64 = 1.5;

/// Final position of one node plus how it got there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub position: Position,
    /// Number of pushes applied.
    pub attempts: u32,
    /// False when the attempt budget ran out with a conflict remaining.
    pub converged: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct CollisionResolver {
    pub min_distance: f64,
    pub max_attempts: u32,
    pub push_buffer: f64,
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self {
            min_distance: MIN_DISTANCE,
            max_attempts: MAX_ATTEMPTS,
            push_buffer: PUSH_BUFFER,
        }
    }
}

impl CollisionResolver {
    pub fn new(min_distance: f64, max_attempts: u32) -> Self {
        Self {
            min_distance,
            max_attempts,
            ..Self::default()
        }
    }

    /// Resolve `initial` positions in order. The output has one placement per
    /// input, at the same index.
    pub fn resolve(&self, initial: &[Position]) -> Vec<Placement> {
        let mut placed: Vec<Position> = Vec::with_capacity(initial.len());
        let mut placements = Vec::with_capacity(initial.len());

        for (index, start) in initial.iter().enumerate() {
            let mut position = *start;
            let mut attempts = 0;

            while attempts < self.max_attempts {
                let Some(anchor) = self.first_conflict(&placed, position) else {
                    break;
                };
                position = self.push_away(index, anchor, position);
                attempts += 1;
            }

            let converged = self.first_conflict(&placed, position).is_none();
            if !converged {
                trace!(index, attempts, x = position.x, y = position.y, "collision budget exhausted");
            }

            placed.push(position);
            placements.push(Placement {
                position,
                attempts,
                converged,
            });
        }

        placements
    }

    fn first_conflict(&self, placed: &[Position], position: Position) -> Option<Position> {
        placed
            .iter()
            .copied()
            .find(|p| p.distance_to(position) < self.min_distance)
    }

    fn push_away(&self, index: usize, anchor: Position, position: Position) -> Position {
        let dx = position.x - anchor.x;
        let dy = position.y - anchor.y;
        let dist = dx.hypot(dy);

        let angle = if dist < 1.0 {
            index as f64 * COINCIDENT_ANGLE_STEP
        } else {
            dy.atan2(dx)
        };
        let step = self.min_distance - dist + self.push_buffer;

        Position {
            x: position.x + angle.cos() * step,
            y: position.y + angle.sin() * step,
        }
    }
}
