//! Degree, PageRank and betweenness providers

use crate::centrality::{CentralityTable, NodeScores};
use crate::config::CentralityConfig;
use crate::error::Result;
use crate::graph::CompressedGraph;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::VecDeque;

/// Compute degree, PageRank and sampled betweenness for every node
pub fn compute_centralities(
    graph: &CompressedGraph,
    config: &CentralityConfig,
    seed: u64,
) -> Result<CentralityTable> {
    log::info!("Computing centrality metrics");
    config.validate()?;

    log::info!("  Degree centrality");
    let degrees: Vec<usize> = (0..graph.node_count).map(|n| graph.degree(n)).collect();

    log::info!("  PageRank (alpha = {})", config.pagerank_alpha);
    let ranks = pagerank(
        graph,
        config.pagerank_alpha,
        config.pagerank_max_iter,
        config.pagerank_tolerance,
    );

    let k = config.betweenness_k_samples.min(graph.node_count);
    log::info!("  Betweenness centrality ({} sampled sources)", k);
    let mut rng = StdRng::seed_from_u64(seed);
    let sources = sample_sources(graph.node_count, k, &mut rng);
    let between = betweenness(graph, &sources);

    let scores = (0..graph.node_count)
        .map(|n| NodeScores {
            node: graph.label(n),
            degree: degrees[n],
            pagerank: ranks[n],
            betweenness: between[n],
        })
        .collect();

    CentralityTable::from_scores(scores)
}

/// Power-iteration PageRank.
///
/// Rank mass of nodes without out-edges is spread uniformly. Iteration stops
/// once the L1 change drops below `tolerance * n`; if `max_iter` is reached
/// first the last iterate is returned with a warning.
pub fn pagerank(graph: &CompressedGraph, alpha: f64, max_iter: usize, tolerance: f64) -> Vec<f64> {
    let n = graph.node_count;
    if n == 0 {
        return Vec::new();
    }

    let uniform = 1.0 / n as f64;
    let out_degree: Vec<usize> = (0..n).map(|node| graph.out_degree(node)).collect();
    let mut ranks = vec![uniform; n];

    for iteration in 0..max_iter {
        let dangling: f64 = (0..n)
            .filter(|&node| out_degree[node] == 0)
            .map(|node| ranks[node])
            .sum();
        let base = (alpha * dangling + (1.0 - alpha)) * uniform;

        let next: Vec<f64> = (0..n)
            .into_par_iter()
            .map(|node| {
                let inflow: f64 = graph
                    .incoming_edges(node)
                    .iter()
                    .map(|&src| ranks[src as usize] / out_degree[src as usize] as f64)
                    .sum();
                base + alpha * inflow
            })
            .collect();

        let delta: f64 = next.iter().zip(&ranks).map(|(a, b)| (a - b).abs()).sum();
        ranks = next;

        if delta < n as f64 * tolerance {
            log::debug!("PageRank converged after {} iterations", iteration + 1);
            return ranks;
        }
    }

    log::warn!("PageRank did not converge within {} iterations", max_iter);
    ranks
}

const SOURCE_CHUNK: usize = 64;

/// Draw `k` distinct BFS sources; all nodes in order when `k >= n`
pub fn sample_sources(n: usize, k: usize, rng: &mut StdRng) -> Vec<usize> {
    if k >= n {
        return (0..n).collect();
    }
    let mut sources = rand::seq::index::sample(rng, n, k).into_vec();
    sources.sort_unstable();
    sources
}

/// Brandes betweenness accumulated from the given sources.
///
/// Scores are normalised by `1 / ((n-1)(n-2))` and rescaled by `n / k` when
/// only `k` of the `n` nodes act as sources. Edges are followed in their
/// direction; undirected graphs store both directions.
pub fn betweenness(graph: &CompressedGraph, sources: &[usize]) -> Vec<f64> {
    let n = graph.node_count;
    if n == 0 || sources.is_empty() {
        return vec![0.0; n];
    }

    // Fixed chunks summed in order keep the result independent of scheduling
    let partials: Vec<Vec<f64>> = sources
        .par_chunks(SOURCE_CHUNK)
        .map(|chunk| {
            let mut acc = vec![0.0; n];
            for &source in chunk {
                accumulate_from_source(graph, source, &mut acc);
            }
            acc
        })
        .collect();

    let mut scores = vec![0.0; n];
    for partial in partials {
        scores.iter_mut().zip(partial).for_each(|(x, y)| *x += y);
    }

    if n > 2 {
        let scale = n as f64 / sources.len() as f64 / ((n - 1) * (n - 2)) as f64;
        scores.iter_mut().for_each(|s| *s *= scale);
    }

    scores
}

fn accumulate_from_source(graph: &CompressedGraph, source: usize, acc: &mut [f64]) {
    let n = graph.node_count;
    let mut order = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<u32>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut dist = vec![u32::MAX; n];
    let mut queue = VecDeque::new();

    sigma[source] = 1.0;
    dist[source] = 0;
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        order.push(v);
        for &w in graph.outgoing_edges(v) {
            let w = w as usize;
            if dist[w] == u32::MAX {
                dist[w] = dist[v] + 1;
                queue.push_back(w);
            }
            if dist[w] == dist[v] + 1 {
                sigma[w] += sigma[v];
                predecessors[w].push(v as u32);
            }
        }
    }

    let mut delta = vec![0.0f64; n];
    while let Some(w) = order.pop() {
        for &v in &predecessors[w] {
            let v = v as usize;
            delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
        }
        if w != source {
            acc[w] += delta[w];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    #[test]
    fn test_pagerank_sums_to_one_and_favours_hub() {
        let graph = GraphBuilder::from_edges(false, &[(0, 1), (0, 2), (0, 3), (0, 4), (1, 2)]);
        let ranks = pagerank(&graph, 0.85, 100, 1e-6);
        let hub = graph.index_map()[&0] as usize;

        assert!((ranks.iter().sum::<f64>() - 1.0).abs() < 1e-6);
        assert!(ranks.iter().enumerate().all(|(n, &r)| n == hub || r < ranks[hub]));
    }

    #[test]
    fn test_pagerank_handles_dangling_nodes() {
        let graph = GraphBuilder::from_edges(true, &[(1, 2), (2, 3)]);
        let ranks = pagerank(&graph, 0.85, 100, 1e-9);

        assert!((ranks.iter().sum::<f64>() - 1.0).abs() < 1e-6);
        let map = graph.index_map();
        assert!(ranks[map[&3] as usize] > ranks[map[&1] as usize]);
    }

    #[test]
    fn test_betweenness_of_path_centre() {
        // Path 1-2-3: the centre lies on the only shortest path between the ends
        let graph = GraphBuilder::from_edges(false, &[(1, 2), (2, 3)]);
        let sources: Vec<usize> = (0..graph.node_count).collect();
        let scores = betweenness(&graph, &sources);
        let map = graph.index_map();

        assert!((scores[map[&2] as usize] - 1.0).abs() < 1e-12);
        assert_eq!(scores[map[&1] as usize], 0.0);
        assert_eq!(scores[map[&3] as usize], 0.0);
    }

    #[test]
    fn test_betweenness_of_star_leaves_is_zero() {
        let graph = GraphBuilder::from_edges(false, &[(0, 1), (0, 2), (0, 3), (0, 4)]);
        let sources: Vec<usize> = (0..graph.node_count).collect();
        let scores = betweenness(&graph, &sources);
        let centre = graph.index_map()[&0] as usize;

        assert!((scores[centre] - 1.0).abs() < 1e-12);
        assert!(scores.iter().enumerate().all(|(n, &s)| n == centre || s == 0.0));
    }

    #[test]
    fn test_source_sampling_is_seeded() {
        let a = sample_sources(100, 10, &mut StdRng::seed_from_u64(3));
        let b = sample_sources(100, 10, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
        assert_eq!(sample_sources(5, 10, &mut StdRng::seed_from_u64(3)), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_compute_centralities_builds_full_table() {
        let graph = GraphBuilder::from_edges(true, &[(1, 2), (2, 3), (3, 1), (3, 4)]);
        let table = compute_centralities(&graph, &CentralityConfig::default(), 1).unwrap();

        assert_eq!(table.len(), 4);
        assert!(table.records().iter().any(|r| r.pagerank_norm == 1.0));
    }
}
