//! Extension of a sample partition to the full graph

use crate::community::{CommunityDetector, CommunityResult, Partition};
use crate::error::{AnalysisError, Result};
use crate::graph::CompressedGraph;
use rayon::prelude::*;
use std::cmp::Reverse;

/// Runs a detector on a sampled subgraph and extends its partition to every
/// node of the full graph.
pub struct CommunityPropagator<'a> {
    detector: &'a dyn CommunityDetector,
}

impl<'a> CommunityPropagator<'a> {
    pub fn new(detector: &'a dyn CommunityDetector) -> Self {
        Self { detector }
    }

    /// Partition the sample with the detector, then propagate
    pub fn run(
        &self,
        full: &CompressedGraph,
        sampled: &CompressedGraph,
        sampling_rate: f64,
    ) -> Result<(Partition, CommunityResult)> {
        ensure_non_empty(sampled)?;
        log::info!("  Running {} on {} sampled nodes", self.detector.name(), sampled.node_count);
        let sampled_partition = self.detector.best_partition(sampled)?;
        self.propagate(full, sampled, &sampled_partition, sampling_rate)
    }

    /// Extend `sampled_partition` to `full` and score it on the unsampled graph
    pub fn propagate(
        &self,
        full: &CompressedGraph,
        sampled: &CompressedGraph,
        sampled_partition: &Partition,
        sampling_rate: f64,
    ) -> Result<(Partition, CommunityResult)> {
        let partition = propagate_partition(full, sampled, sampled_partition)?;
        let modularity = self.detector.modularity(full, &partition)?;
        let result = CommunityResult::summarize(&partition, modularity, sampling_rate);
        Ok((partition, result))
    }
}

fn ensure_non_empty(sampled: &CompressedGraph) -> Result<()> {
    if sampled.node_count == 0 {
        return Err(AnalysisError::InsufficientSample(
            "sampled subgraph is empty; raise the sampling rate".to_string(),
        ));
    }
    Ok(())
}

/// Assign every node of `full` to a community.
///
/// Sampled nodes keep their community. An unsampled node joins the community
/// of its sampled neighbour with the most sampled neighbours of its own; ties
/// go to the neighbour with the lowest label. Unsampled nodes with no sampled
/// neighbour each get a fresh community id from a counter starting above the
/// largest id in the sample partition, handed out in node order.
pub fn propagate_partition(
    full: &CompressedGraph,
    sampled: &CompressedGraph,
    sampled_partition: &Partition,
) -> Result<Partition> {
    ensure_non_empty(sampled)?;

    let index = full.index_map();
    let mut in_sample = vec![false; full.node_count];
    let mut partition = Partition::new();

    for &label in &sampled.node_ids {
        let node = *index.get(&label).ok_or(AnalysisError::UnknownNode(label))?;
        let community = *sampled_partition
            .get(&label)
            .ok_or(AnalysisError::UnknownNode(label))?;
        in_sample[node as usize] = true;
        partition.insert(label, community);
    }

    // sampled-neighbour count of each sampled node, measured in the full graph
    let anchor_weight: Vec<usize> = (0..full.node_count)
        .into_par_iter()
        .map(|node| {
            if !in_sample[node] {
                return 0;
            }
            full.neighbor_set(node)
                .iter()
                .filter(|&&n| in_sample[n as usize])
                .count()
        })
        .collect();

    let anchors: Vec<Option<u32>> = (0..full.node_count)
        .into_par_iter()
        .map(|node| {
            if in_sample[node] {
                return None;
            }
            full.neighbor_set(node)
                .into_iter()
                .filter(|&n| in_sample[n as usize])
                .max_by_key(|&n| (anchor_weight[n as usize], Reverse(full.label(n as usize))))
        })
        .collect();

    let mut next_community = sampled_partition.values().max().map_or(0, |&max| max + 1);
    let mut isolated = 0usize;

    for node in 0..full.node_count {
        if in_sample[node] {
            continue;
        }
        let community = match anchors[node] {
            Some(anchor) => partition[&full.label(anchor as usize)],
            None => {
                isolated += 1;
                next_community += 1;
                next_community - 1
            }
        };
        partition.insert(full.label(node), community);
    }

    log::debug!(
        "Propagated {} sampled assignments to {} nodes ({} without sampled neighbours)",
        sampled.node_count,
        full.node_count,
        isolated
    );

    Ok(partition)
}
