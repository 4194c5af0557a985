//! Approximate community detection at scale
//!
//! A degree-biased sample of the largest component is partitioned by a
//! [`CommunityDetector`], and the partition is then extended to every node of
//! the full component by [`CommunityPropagator`].
//!
//! Modularity is the standard Newman score on the undirected view:
//!
//! ```text
//! Q = Σ_c [ L_c / m - (D_c / 2m)^2 ]
//! ```
//!
//! where `L_c` counts edges inside community `c` and `D_c` sums its degrees.

pub mod sampling;
pub mod propagation;
pub mod louvain;
pub mod label_prop;

pub use label_prop::LabelPropagation;
pub use louvain::Louvain;
pub use propagation::CommunityPropagator;
pub use sampling::DegreeBiasedSampler;

use crate::config::{CommunityConfig, DetectorKind};
use crate::error::{AnalysisError, Result};
use crate::graph::algorithms::largest_component;
use crate::graph::CompressedGraph;
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Community id per node label
pub type Partition = BTreeMap<u64, usize>;

/// Capability interface for community detection algorithms
pub trait CommunityDetector: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Partition every node of `graph` into communities
    fn best_partition(&self, graph: &CompressedGraph) -> Result<Partition>;

    /// Quality of `partition` over `graph`
    fn modularity(&self, graph: &CompressedGraph, partition: &Partition) -> Result<f64> {
        modularity(graph, partition)
    }
}

/// Newman modularity of a partition, computed on the undirected view.
///
/// Every node must carry an assignment; a graph without edges has no
/// defined modularity.
pub fn modularity(graph: &CompressedGraph, partition: &Partition) -> Result<f64> {
    let undirected;
    let graph = if graph.directed {
        undirected = graph.to_undirected();
        &undirected
    } else {
        graph
    };

    let m = graph.edge_count() as f64;
    if m == 0.0 {
        return Err(AnalysisError::DegenerateGraph(
            "modularity is undefined for a graph without edges".to_string(),
        ));
    }

    let communities = (0..graph.node_count)
        .map(|node| {
            let label = graph.label(node);
            partition
                .get(&label)
                .copied()
                .ok_or(AnalysisError::UnknownNode(label))
        })
        .collect::<Result<Vec<usize>>>()?;

    // internal edge endpoints and degree sum per community
    let mut internal: BTreeMap<usize, f64> = BTreeMap::new();
    let mut degree_sum: BTreeMap<usize, f64> = BTreeMap::new();
    for node in 0..graph.node_count {
        let community = communities[node];
        *degree_sum.entry(community).or_default() += graph.degree(node) as f64;
        let inside = graph
            .outgoing_edges(node)
            .iter()
            .filter(|&&other| communities[other as usize] == community)
            .count();
        *internal.entry(community).or_default() += inside as f64;
    }

    Ok(degree_sum
        .iter()
        .map(|(community, &degrees)| {
            let links = internal.get(community).copied().unwrap_or(0.0) / 2.0;
            links / m - (degrees / (2.0 * m)).powi(2)
        })
        .sum())
}

/// Renumber community ids to 0..k in order of first appearance
pub(crate) fn renumber(labels: &[usize]) -> Vec<usize> {
    let mut mapping: BTreeMap<usize, usize> = BTreeMap::new();
    let mut next = 0;
    labels
        .iter()
        .map(|&label| {
            *mapping.entry(label).or_insert_with(|| {
                next += 1;
                next - 1
            })
        })
        .collect()
}

/// Summary of a propagated partition, written to `communities.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityResult {
    pub num_communities: usize,
    pub modularity: f64,
    /// Sizes sorted largest first
    pub community_sizes: Vec<usize>,
    pub largest_community_size: usize,
    pub smallest_community_size: usize,
    pub sampling_method: String,
    pub sampling_rate: f64,
}

impl CommunityResult {
    pub fn summarize(partition: &Partition, modularity: f64, sampling_rate: f64) -> Self {
        let community_sizes: Vec<usize> = partition
            .values()
            .counts()
            .into_values()
            .sorted_unstable_by(|a, b| b.cmp(a))
            .collect();

        Self {
            num_communities: community_sizes.len(),
            modularity,
            largest_community_size: community_sizes.first().copied().unwrap_or(0),
            smallest_community_size: community_sizes.last().copied().unwrap_or(0),
            community_sizes,
            sampling_method: format!("probabilistic ({:.0}%)", sampling_rate * 100.0),
            sampling_rate,
        }
    }
}

/// Build the detector named by the configuration
pub fn detector_for(config: &CommunityConfig, seed: u64) -> Box<dyn CommunityDetector> {
    match config.detector {
        DetectorKind::Louvain => Box::new(
            Louvain::new()
                .with_max_iter(config.max_iterations)
                .with_resolution(config.resolution)
                .with_max_levels(config.max_levels),
        ),
        DetectorKind::LabelPropagation => Box::new(
            LabelPropagation::new()
                .with_max_iter(config.max_iterations)
                .with_seed(seed),
        ),
    }
}

/// Detect communities over the largest weak component of `graph`.
///
/// The component is viewed as undirected, sampled with degree bias, the
/// sample is partitioned, and the partition is propagated back to the whole
/// component.
pub fn detect_communities(
    graph: &CompressedGraph,
    config: &CommunityConfig,
    seed: u64,
) -> Result<(Partition, CommunityResult)> {
    log::info!("Detecting communities");
    config.validate()?;

    let component = largest_component(graph).to_undirected();
    log::info!("  Largest component: {} nodes", component.node_count);

    let sampler = DegreeBiasedSampler::new(config.sampling_rate)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let sampled = sampler.sample(&component, &mut rng)?;
    if component.node_count > 0 {
        log::info!(
            "  Sampled: {} nodes ({:.1}%)",
            sampled.node_count,
            sampled.node_count as f64 / component.node_count as f64 * 100.0
        );
    }

    let detector = detector_for(config, seed);
    let propagator = CommunityPropagator::new(detector.as_ref());
    let (partition, result) = propagator.run(&component, &sampled, config.sampling_rate)?;

    log::info!("  Found {} communities", result.num_communities);
    log::info!("  Modularity: {:.3}", result.modularity);

    Ok((partition, result))
}
