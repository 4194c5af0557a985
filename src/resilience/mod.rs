//! Resilience of the graph under node loss

pub mod percolation;

pub use percolation::{measure_after_removal, PercolationSimulator};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Remaining largest-component percentage below which the graph counts as broken
pub const CRITICAL_THRESHOLD_PCT: f64 = 50.0;

/// Connectivity left after removing a set of nodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentMeasurement {
    pub largest_component_size: usize,
    /// Percentage of the original node count
    pub largest_component_pct: f64,
    pub num_components: usize,
}

/// Random-failure aggregate for one removal percentage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomFailureOutcome {
    /// Mean largest-component size across trials
    pub largest_component_size: f64,
    /// Mean largest-component percentage across trials
    pub largest_component_pct: f64,
    /// Population standard deviation of the percentage across trials
    pub std: f64,
    /// Per-trial percentages the aggregate was computed from
    #[serde(skip)]
    pub trial_pcts: Vec<f64>,
}

/// Both resilience curves and their critical points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResilienceReport {
    pub targeted_attack: BTreeMap<u32, ComponentMeasurement>,
    pub random_failure: BTreeMap<u32, RandomFailureOutcome>,
    pub critical_point_targeted: Option<u32>,
    pub critical_point_random: Option<u32>,
}

/// First percentage, in ascending order, whose remaining largest component
/// drops below [`CRITICAL_THRESHOLD_PCT`]
pub fn critical_point(curve: impl IntoIterator<Item = (u32, f64)>) -> Option<u32> {
    curve
        .into_iter()
        .find(|&(_, pct)| pct < CRITICAL_THRESHOLD_PCT)
        .map(|(removed, _)| removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_point_is_first_entry_below_half() {
        let curve = vec![(1, 99.0), (5, 93.0), (10, 61.0), (20, 38.0)];
        assert_eq!(critical_point(curve), Some(20));
    }

    #[test]
    fn test_exactly_half_is_not_critical() {
        assert_eq!(critical_point(vec![(1, 80.0), (5, 50.0)]), None);
        assert_eq!(critical_point(vec![(1, 49.9), (5, 20.0)]), Some(1));
    }

    #[test]
    fn test_no_crossing_gives_none() {
        assert_eq!(critical_point(Vec::new()), None);
        assert_eq!(critical_point(vec![(1, 99.0), (20, 75.0)]), None);
    }
}
