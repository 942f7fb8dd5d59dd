//! Sliding window of recent load/generation readings for the live chart.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::domain::GridSnapshot;

/// 20 historical samples plus the newest one.
pub const DEFAULT_HISTORY_CAPACITY: usize = 21;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    /// Wall-clock label, `HH:MM:SS`
    pub time: String,
    pub load: f64,
    pub generation: f64,
}

impl HistorySample {
    pub fn from_snapshot(snapshot: &GridSnapshot, at: DateTime<Local>) -> Self {
        Self {
            time: at.format("%H:%M:%S").to_string(),
            load: snapshot.total_load,
            generation: snapshot.total_generation,
        }
    }
}

/// Bounded FIFO of history samples. The only removal is eviction of the
/// oldest entry when a push would exceed capacity.
#[derive(Debug, Clone)]
pub struct HistoryRingBuffer {
    samples: VecDeque<HistorySample>,
    capacity: usize,
}

impl Default for HistoryRingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryRingBuffer {
    /// A capacity of zero is raised to one so the newest sample is always kept.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: HistorySample) {
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&HistorySample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistorySample> {
        self.samples.iter()
    }

    /// Samples oldest first, ready for charting.
    pub fn to_vec(&self) -> Vec<HistorySample> {
        self.samples.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn sample(n: usize) -> HistorySample {
        HistorySample {
            time: format!("t{n}"),
            load: n as f64,
            generation: n as f64 * 2.0,
        }
    }

    #[test]
    fn test_fills_up_to_capacity() {
        let mut history = HistoryRingBuffer::default();
        for i in 0..21 {
            history.push(sample(i));
        }
        assert_eq!(history.len(), 21);
        assert_eq!(history.iter().next().unwrap().time, "t0");
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut history = HistoryRingBuffer::default();
        for i in 0..25 {
            history.push(sample(i));
        }
        assert_eq!(history.len(), 21);
        assert_eq!(history.iter().next().unwrap().time, "t4");
        assert_eq!(history.latest().unwrap().time, "t24");
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut history = HistoryRingBuffer::new(0);
        history.push(sample(1));
        history.push(sample(2));
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().unwrap().time, "t2");
    }

    #[test]
    fn test_sample_from_snapshot() {
        let snapshot = GridSnapshot {
            nodes: vec![],
            links: vec![],
            total_load: 850.5,
            total_generation: 910.0,
            efficiency: 0.93,
            leak_detected: false,
            timestamp: None,
        };
        let at = Local.with_ymd_and_hms(2024, 6, 1, 14, 5, 9).unwrap();
        let sample = HistorySample::from_snapshot(&snapshot, at);

        assert_eq!(sample.time, "14:05:09");
        assert_eq!(sample.load, 850.5);
        assert_eq!(sample.generation, 910.0);
    }

    proptest! {
        #[test]
        fn prop_keeps_most_recent_in_order(pushes in 0usize..200, capacity in 1usize..40) {
            let mut history = HistoryRingBuffer::new(capacity);
            for i in 0..pushes {
                history.push(sample(i));
            }
            prop_assert!(history.len() <= capacity);
            prop_assert_eq!(history.len(), pushes.min(capacity));

            let expected: Vec<String> = (pushes.saturating_sub(capacity)..pushes)
                .map(|i| format!("t{i}"))
                .collect();
            let actual: Vec<String> = history.iter().map(|s| s.time.clone()).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
