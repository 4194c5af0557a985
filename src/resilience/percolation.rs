//! Percolation under targeted and random node removal

use crate::config::PercolationConfig;
use crate::error::{AnalysisError, Result};
use crate::graph::algorithms::component_sizes;
use crate::graph::CompressedGraph;
use crate::resilience::{
    critical_point, ComponentMeasurement, RandomFailureOutcome, ResilienceReport,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Number of nodes removed at `pct` percent of `original`, rounded down
pub fn removal_count(original: usize, pct: u32) -> usize {
    original * pct as usize / 100
}

/// Largest weak component after removing `removed` from the graph.
///
/// Removal is applied to an alive-mask over the shared graph; the graph
/// itself is never modified. An empty graph measures as all zeros.
pub fn measure_after_removal(graph: &CompressedGraph, removed: &[u32]) -> ComponentMeasurement {
    let original = graph.node_count;
    if original == 0 {
        return ComponentMeasurement {
            largest_component_size: 0,
            largest_component_pct: 0.0,
            num_components: 0,
        };
    }

    let mut alive = vec![true; original];
    for &node in removed {
        alive[node as usize] = false;
    }

    let sizes = component_sizes(graph, Some(&alive));
    let largest = sizes.first().copied().unwrap_or(0);

    ComponentMeasurement {
        largest_component_size: largest,
        largest_component_pct: largest as f64 / original as f64 * 100.0,
        num_components: sizes.len(),
    }
}

/// Uniform random removal order of `count` distinct nodes out of `n`.
///
/// Every prefix is itself a uniform sample without replacement.
pub fn removal_order(trial_seed: u64, n: usize, count: usize) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(trial_seed);
    rand::seq::index::sample(&mut rng, n, count.min(n))
        .into_iter()
        .map(|node| node as u32)
        .collect()
}

/// Removal simulator over a fixed ascending percentage schedule
#[derive(Debug, Clone)]
pub struct PercolationSimulator {
    schedule: Vec<u32>,
    num_trials: usize,
    seed: u64,
}

impl PercolationSimulator {
    pub fn new(config: &PercolationConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            schedule: config.schedule.clone(),
            num_trials: config.num_trials,
            seed,
        })
    }

    pub fn schedule(&self) -> &[u32] {
        &self.schedule
    }

    /// Ranking length needed to cover the largest percentage in the schedule
    pub fn ranking_size(&self, original: usize) -> usize {
        let max_pct = self.schedule.last().copied().unwrap_or(0);
        removal_count(original, max_pct)
    }

    /// Seeds of the random-failure trials, drawn in trial order
    pub fn trial_seeds(&self) -> Vec<u64> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.num_trials).map(|_| rng.gen()).collect()
    }

    /// Remove the highest-ranked nodes first.
    ///
    /// `ranking` lists node labels, highest rank first. If it is shorter than
    /// a bucket requires, the whole ranking is removed for that bucket.
    pub fn targeted_attack(
        &self,
        graph: &CompressedGraph,
        ranking: &[u64],
    ) -> Result<BTreeMap<u32, ComponentMeasurement>> {
        log::info!("Simulating targeted attack");

        let index = graph.index_map();
        let ranked = ranking
            .iter()
            .map(|label| index.get(label).copied().ok_or(AnalysisError::UnknownNode(*label)))
            .collect::<Result<Vec<u32>>>()?;

        let original = graph.node_count;
        let results = self
            .schedule
            .par_iter()
            .map(|&pct| {
                let count = removal_count(original, pct);
                if count > ranked.len() {
                    log::warn!(
                        "Ranking covers {} nodes but {}% needs {}",
                        ranked.len(),
                        pct,
                        count
                    );
                }
                let measurement = measure_after_removal(graph, &ranked[..count.min(ranked.len())]);
                log::debug!(
                    "  Targeted {}%: {:.1}% remains in {} components",
                    pct,
                    measurement.largest_component_pct,
                    measurement.num_components
                );
                (pct, measurement)
            })
            .collect();

        log::info!("  Targeted attack complete");
        Ok(results)
    }

    /// Remove uniformly random nodes, averaged over independent trials.
    ///
    /// Each trial draws one seeded removal order and removes its prefix for
    /// every percentage, so trials are independent of each other and each
    /// trial's curve is non-increasing.
    pub fn random_failure(&self, graph: &CompressedGraph) -> BTreeMap<u32, RandomFailureOutcome> {
        log::info!("Simulating random failure ({} trials)", self.num_trials);

        let original = graph.node_count;
        let max_count = self.ranking_size(original);

        // trial_results[trial][bucket]
        let trial_results: Vec<Vec<ComponentMeasurement>> = self
            .trial_seeds()
            .into_par_iter()
            .map(|trial_seed| {
                let order = removal_order(trial_seed, original, max_count);
                self.schedule
                    .iter()
                    .map(|&pct| measure_after_removal(graph, &order[..removal_count(original, pct)]))
                    .collect()
            })
            .collect();

        let results = self
            .schedule
            .iter()
            .enumerate()
            .map(|(bucket, &pct)| {
                let sizes: Vec<f64> = trial_results
                    .iter()
                    .map(|trial| trial[bucket].largest_component_size as f64)
                    .collect();
                let pcts: Vec<f64> = trial_results
                    .iter()
                    .map(|trial| trial[bucket].largest_component_pct)
                    .collect();

                let outcome = RandomFailureOutcome {
                    largest_component_size: sizes.iter().mean(),
                    largest_component_pct: pcts.iter().mean(),
                    std: pcts.iter().population_std_dev(),
                    trial_pcts: pcts,
                };
                log::debug!(
                    "  Random {}%: {:.1}% ± {:.2} remains",
                    pct,
                    outcome.largest_component_pct,
                    outcome.std
                );
                (pct, outcome)
            })
            .collect();

        log::info!("  Random failure complete");
        results
    }

    /// Run both policies and locate their critical points
    pub fn run(&self, graph: &CompressedGraph, ranking: &[u64]) -> Result<ResilienceReport> {
        let targeted_attack = self.targeted_attack(graph, ranking)?;
        let random_failure = self.random_failure(graph);

        let critical_point_targeted = critical_point(
            targeted_attack
                .iter()
                .map(|(&pct, m)| (pct, m.largest_component_pct)),
        );
        let critical_point_random = critical_point(
            random_failure
                .iter()
                .map(|(&pct, o)| (pct, o.largest_component_pct)),
        );

        Ok(ResilienceReport {
            targeted_attack,
            random_failure,
            critical_point_targeted,
            critical_point_random,
        })
    }
}
