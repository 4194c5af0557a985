//! Label propagation for community detection.
//!
//! Near-linear algorithm where every node repeatedly adopts the most common
//! label among its neighbours. Fast but approximate.

use crate::community::{renumber, CommunityDetector, Partition};
use crate::error::{AnalysisError, Result};
use crate::graph::CompressedGraph;
use rand::prelude::*;
use std::collections::BTreeMap;

/// Seeded asynchronous label propagation
#[derive(Debug, Clone)]
pub struct LabelPropagation {
    max_iter: usize,
    seed: u64,
}

impl LabelPropagation {
    pub fn new() -> Self {
        Self {
            max_iter: 100,
            seed: 0,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Seed for the visiting order
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for LabelPropagation {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityDetector for LabelPropagation {
    fn name(&self) -> &'static str {
        "label propagation"
    }

    fn best_partition(&self, graph: &CompressedGraph) -> Result<Partition> {
        let n = graph.node_count;
        if n == 0 {
            return Err(AnalysisError::InsufficientSample(
                "cannot partition an empty graph".to_string(),
            ));
        }

        let mut labels: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut order: Vec<usize> = (0..n).collect();

        for iteration in 0..self.max_iter {
            order.shuffle(&mut rng);
            let mut changed = false;

            for &node in &order {
                let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
                for neighbor in graph.neighbor_set(node) {
                    *counts.entry(labels[neighbor as usize]).or_default() += 1;
                }
                let Some(&top) = counts.values().max() else {
                    continue;
                };

                // keep the current label when it is among the most common
                if counts.get(&labels[node]) == Some(&top) {
                    continue;
                }
                if let Some((&label, _)) = counts.iter().find(|(_, &count)| count == top) {
                    labels[node] = label;
                    changed = true;
                }
            }

            if !changed {
                log::debug!("Label propagation converged after {} iterations", iteration + 1);
                break;
            }
        }

        let labels = renumber(&labels);
        Ok((0..n).map(|node| (graph.label(node), labels[node])).collect())
    }
}
