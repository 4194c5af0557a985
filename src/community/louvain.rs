//! Louvain algorithm for community detection.
//!
//! Multi-level greedy modularity optimisation (Blondel et al. 2008):
//!
//! 1. **Local moving**: start with every node alone and repeatedly move each
//!    node to the neighbouring community with the highest modularity gain.
//! 2. **Aggregation**: collapse communities into single weighted nodes;
//!    internal edges become self-loops.
//! 3. Repeat on the aggregated graph until modularity stops improving.
//!
//! Nodes are visited in index order and candidate communities in id order,
//! so the result is deterministic for a given graph.

use crate::community::{renumber, CommunityDetector, Partition};
use crate::error::{AnalysisError, Result};
use crate::graph::CompressedGraph;
use std::collections::BTreeMap;

/// Louvain community detection algorithm
#[derive(Debug, Clone)]
pub struct Louvain {
    /// Resolution parameter (gamma)
    resolution: f64,
    /// Maximum passes of local moving per level
    max_iter: usize,
    /// Maximum levels of aggregation
    max_levels: usize,
    /// Minimum modularity improvement to continue
    min_modularity_gain: f64,
}

/// Weighted graph at one aggregation level
struct Level {
    n: usize,
    edges: Vec<(usize, usize, f64)>,
    self_loops: Vec<f64>,
}

impl Level {
    fn total_weight(&self) -> f64 {
        self.edges.iter().map(|&(_, _, w)| w).sum::<f64>() + self.self_loops.iter().sum::<f64>()
    }

    fn degrees(&self) -> Vec<f64> {
        let mut degrees: Vec<f64> = self.self_loops.iter().map(|&sl| 2.0 * sl).collect();
        for &(i, j, w) in &self.edges {
            degrees[i] += w;
            degrees[j] += w;
        }
        degrees
    }
}

impl Louvain {
    pub fn new() -> Self {
        Self {
            resolution: 1.0,
            max_iter: 100,
            max_levels: 10,
            min_modularity_gain: 1e-7,
        }
    }

    /// Higher values produce smaller communities
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_max_levels(mut self, levels: usize) -> Self {
        self.max_levels = levels;
        self
    }

    fn level_modularity(&self, level: &Level, communities: &[usize]) -> f64 {
        let m = level.total_weight();
        if m == 0.0 {
            return 0.0;
        }

        let degrees = level.degrees();
        let mut inside: BTreeMap<usize, f64> = BTreeMap::new();
        let mut totals: BTreeMap<usize, f64> = BTreeMap::new();

        for (node, &degree) in degrees.iter().enumerate() {
            *totals.entry(communities[node]).or_default() += degree;
            *inside.entry(communities[node]).or_default() += level.self_loops[node];
        }
        for &(i, j, w) in &level.edges {
            if communities[i] == communities[j] {
                *inside.entry(communities[i]).or_default() += w;
            }
        }

        totals
            .iter()
            .map(|(c, &tot)| inside[c] / m - self.resolution * (tot / (2.0 * m)).powi(2))
            .sum()
    }

    /// Returns the community of every node and whether any node moved
    fn local_moving(&self, level: &Level) -> (Vec<usize>, bool) {
        let n = level.n;
        let m = level.total_weight();
        let mut communities: Vec<usize> = (0..n).collect();
        if m == 0.0 {
            return (communities, false);
        }

        let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        for &(i, j, w) in &level.edges {
            adjacency[i].push((j, w));
            adjacency[j].push((i, w));
        }

        let degrees = level.degrees();
        let mut community_totals = degrees.clone();
        let mut any_moved = false;

        let gain = |links: f64, total: f64, degree: f64| {
            links / m - self.resolution * total * degree / (2.0 * m * m)
        };

        for _ in 0..self.max_iter {
            let mut moved = false;

            for node in 0..n {
                let current = communities[node];
                let degree = degrees[node];
                community_totals[current] -= degree;

                let mut links: BTreeMap<usize, f64> = BTreeMap::new();
                for &(neighbor, w) in &adjacency[node] {
                    *links.entry(communities[neighbor]).or_default() += w;
                }

                let mut best = current;
                let mut best_gain = gain(
                    links.get(&current).copied().unwrap_or(0.0),
                    community_totals[current],
                    degree,
                );
                for (&candidate, &weight) in &links {
                    let g = gain(weight, community_totals[candidate], degree);
                    if g > best_gain {
                        best_gain = g;
                        best = candidate;
                    }
                }

                community_totals[best] += degree;
                if best != current {
                    communities[node] = best;
                    moved = true;
                    any_moved = true;
                }
            }

            if !moved {
                break;
            }
        }

        (communities, any_moved)
    }

    /// Collapse each community (ids already compact) into one node
    fn aggregate(&self, level: &Level, communities: &[usize]) -> Level {
        let n = communities.iter().max().map_or(0, |&c| c + 1);
        let mut self_loops = vec![0.0; n];
        for (node, &sl) in level.self_loops.iter().enumerate() {
            self_loops[communities[node]] += sl;
        }

        let mut weights: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for &(i, j, w) in &level.edges {
            let (ci, cj) = (communities[i], communities[j]);
            if ci == cj {
                self_loops[ci] += w;
            } else {
                *weights.entry((ci.min(cj), ci.max(cj))).or_default() += w;
            }
        }

        Level {
            n,
            edges: weights.into_iter().map(|((i, j), w)| (i, j, w)).collect(),
            self_loops,
        }
    }
}

impl Default for Louvain {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityDetector for Louvain {
    fn name(&self) -> &'static str {
        "louvain"
    }

    fn best_partition(&self, graph: &CompressedGraph) -> Result<Partition> {
        let n = graph.node_count;
        if n == 0 {
            return Err(AnalysisError::InsufficientSample(
                "cannot partition an empty graph".to_string(),
            ));
        }

        let mut edges = Vec::new();
        for src in 0..n {
            for dst in graph.neighbor_set(src) {
                if src < dst as usize {
                    edges.push((src, dst as usize, 1.0));
                }
            }
        }

        let mut level = Level {
            n,
            edges,
            self_loops: vec![0.0; n],
        };

        // membership[original node] = node at the current level
        let mut membership: Vec<usize> = (0..n).collect();
        let mut best_modularity = self.level_modularity(&level, &membership);

        for depth in 0..self.max_levels {
            let (communities, moved) = self.local_moving(&level);
            if !moved {
                break;
            }

            let modularity = self.level_modularity(&level, &communities);
            if modularity - best_modularity < self.min_modularity_gain {
                break;
            }
            best_modularity = modularity;

            let compact = renumber(&communities);
            for member in membership.iter_mut() {
                *member = compact[*member];
            }

            level = self.aggregate(&level, &compact);
            log::debug!(
                "Louvain level {}: {} communities, modularity {:.4}",
                depth,
                level.n,
                modularity
            );
        }

        let labels = renumber(&membership);
        Ok((0..n).map(|node| (graph.label(node), labels[node])).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community::modularity;
    use crate::graph::GraphBuilder;

    #[test]
    fn test_two_triangles_joined_by_bridge() {
        let graph = GraphBuilder::from_edges(
            false,
            &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3), (2, 3)],
        );
        let partition = Louvain::new().best_partition(&graph).unwrap();

        assert_eq!(partition[&0], partition[&1]);
        assert_eq!(partition[&1], partition[&2]);
        assert_eq!(partition[&3], partition[&4]);
        assert_eq!(partition[&4], partition[&5]);
        assert_ne!(partition[&0], partition[&3]);
    }

    #[test]
    fn test_disconnected_pairs_stay_apart() {
        let graph = GraphBuilder::from_edges(false, &[(0, 1), (2, 3)]);
        let partition = Louvain::new().best_partition(&graph).unwrap();

        assert_eq!(partition[&0], partition[&1]);
        assert_eq!(partition[&2], partition[&3]);
        assert_ne!(partition[&0], partition[&2]);
    }

    #[test]
    fn test_edgeless_graph_gives_singletons() {
        let mut builder = GraphBuilder::with_capacity(false, 3);
        for id in [4, 5, 6] {
            builder.add_node(id);
        }
        let partition = Louvain::new().best_partition(&builder.build()).unwrap();

        assert_eq!(partition.len(), 3);
        assert_eq!(partition.values().collect::<Vec<_>>(), vec![&0, &1, &2]);
    }

    #[test]
    fn test_partition_beats_single_community() {
        // Four 5-cliques chained in a ring by single edges
        let mut edges = Vec::new();
        for block in 0..4u64 {
            let base = block * 10;
            for a in 0..5 {
                for b in (a + 1)..5 {
                    edges.push((base + a, base + b));
                }
            }
            edges.push((base + 4, ((block + 1) % 4) * 10));
        }
        let graph = GraphBuilder::from_edges(false, &edges);
        let louvain = Louvain::new();
        let partition = louvain.best_partition(&graph).unwrap();

        let q = modularity(&graph, &partition).unwrap();
        assert!(q > 0.5);
        assert_eq!(partition.values().max(), Some(&3));
    }

    #[test]
    fn test_resolution_controls_community_size() {
        let graph = GraphBuilder::from_edges(
            false,
            &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3), (2, 3)],
        );

        let coarse = Louvain::new().with_resolution(0.01).best_partition(&graph).unwrap();
        assert!(coarse.values().all(|&c| c == 0));

        let fine = Louvain::new().with_resolution(1.0).best_partition(&graph).unwrap();
        assert_eq!(fine.values().max(), Some(&1));
    }

    #[test]
    fn test_single_level_stops_before_aggregating() {
        // Four 5-cliques in a ring; one level already isolates each clique
        let mut edges = Vec::new();
        for block in 0..4u64 {
            let base = block * 10;
            for a in 0..5 {
                for b in (a + 1)..5 {
                    edges.push((base + a, base + b));
                }
            }
            edges.push((base + 4, ((block + 1) % 4) * 10));
        }
        let graph = GraphBuilder::from_edges(false, &edges);

        let partition = Louvain::new().with_max_levels(1).best_partition(&graph).unwrap();
        assert_eq!(partition.values().max(), Some(&3));
        assert_eq!(partition[&0], partition[&4]);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let graph = GraphBuilder::from_edges(
            false,
            &[(0, 1), (1, 2), (2, 3), (3, 0), (3, 4), (4, 5), (5, 6), (6, 4)],
        );
        let a = Louvain::new().best_partition(&graph).unwrap();
        let b = Louvain::new().best_partition(&graph).unwrap();
        assert_eq!(a, b);
    }
}
