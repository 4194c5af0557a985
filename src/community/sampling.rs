//! Degree-biased probabilistic node sampling

use crate::config::validate_sampling_rate;
use crate::error::{AnalysisError, Result};
use crate::graph::CompressedGraph;
use rand::Rng;

/// Importance sampler that favours high-degree nodes.
///
/// Node `n` is kept with probability `rate * f / (1 + f)` where
/// `f = degree(n) / mean_degree`. The realised inclusion fraction is not
/// guaranteed to equal `rate`; its expectation is the mean of those
/// probabilities.
#[derive(Debug, Clone, Copy)]
pub struct DegreeBiasedSampler {
    rate: f64,
}

impl DegreeBiasedSampler {
    /// Rate must lie in (0, 1]
    pub fn new(rate: f64) -> Result<Self> {
        validate_sampling_rate(rate)?;
        Ok(Self { rate })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Inclusion probability of every node
    pub fn inclusion_probabilities(&self, graph: &CompressedGraph) -> Result<Vec<f64>> {
        let mean_degree = graph.mean_degree();
        if mean_degree <= 0.0 {
            return Err(AnalysisError::DegenerateGraph(format!(
                "mean degree is zero over {} nodes; sampling is undefined",
                graph.node_count
            )));
        }

        Ok((0..graph.node_count)
            .map(|node| {
                let degree_factor = graph.degree(node) as f64 / mean_degree;
                self.rate * degree_factor / (1.0 + degree_factor)
            })
            .collect())
    }

    /// Draw one uniform value per node, in node order, and flag the kept nodes
    pub fn sample_mask<R: Rng + ?Sized>(
        &self,
        graph: &CompressedGraph,
        rng: &mut R,
    ) -> Result<Vec<bool>> {
        let probabilities = self.inclusion_probabilities(graph)?;
        Ok(probabilities
            .into_iter()
            .map(|p| rng.gen::<f64>() < p)
            .collect())
    }

    /// Subgraph induced by the sampled nodes
    pub fn sample<R: Rng + ?Sized>(
        &self,
        graph: &CompressedGraph,
        rng: &mut R,
    ) -> Result<CompressedGraph> {
        let mask = self.sample_mask(graph, rng)?;
        Ok(graph.induced_subgraph(&mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ring(n: u64) -> CompressedGraph {
        let edges: Vec<(u64, u64)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
        GraphBuilder::from_edges(false, &edges)
    }

    #[test]
    fn test_same_seed_gives_same_sample() {
        let graph = GraphBuilder::from_edges(
            false,
            &[(0, 1), (0, 2), (0, 3), (1, 2), (3, 4), (4, 5), (5, 6), (6, 0)],
        );
        let sampler = DegreeBiasedSampler::new(0.8).unwrap();

        let a = sampler.sample(&graph, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = sampler.sample(&graph, &mut StdRng::seed_from_u64(99)).unwrap();

        assert_eq!(a.node_ids, b.node_ids);
        assert_eq!(a.edges, b.edges);
    }

    #[test]
    fn test_uniform_degree_fraction_converges_to_expectation() {
        let graph = ring(200);
        let sampler = DegreeBiasedSampler::new(0.8).unwrap();
        // Uniform degree: every node has factor 1, so p = rate / 2
        let expected = 0.4;

        let runs = 200;
        let total: f64 = (0..runs)
            .map(|seed| {
                let mask = sampler
                    .sample_mask(&graph, &mut StdRng::seed_from_u64(seed))
                    .unwrap();
                mask.iter().filter(|&&kept| kept).count() as f64 / graph.node_count as f64
            })
            .sum();

        assert!((total / runs as f64 - expected).abs() < 0.01);
    }

    #[test]
    fn test_high_degree_nodes_are_favoured() {
        let graph = GraphBuilder::from_edges(false, &[(0, 1), (0, 2), (0, 3), (0, 4), (0, 5)]);
        let probabilities = DegreeBiasedSampler::new(1.0)
            .unwrap()
            .inclusion_probabilities(&graph)
            .unwrap();
        let hub = graph.index_map()[&0] as usize;

        // mean degree 10/6; hub factor 3, leaf factor 0.6
        assert!((probabilities[hub] - 0.75).abs() < 1e-12);
        assert!(probabilities
            .iter()
            .enumerate()
            .all(|(n, &p)| n == hub || (p - 0.375).abs() < 1e-12));
    }

    #[test]
    fn test_sample_keeps_only_edges_between_sampled_nodes() {
        let graph = ring(50);
        let sampler = DegreeBiasedSampler::new(1.0).unwrap();
        let mask = sampler.sample_mask(&graph, &mut StdRng::seed_from_u64(4)).unwrap();
        let sampled = sampler.sample(&graph, &mut StdRng::seed_from_u64(4)).unwrap();

        let expected_edges = (0..50)
            .filter(|&i| mask[i] && mask[(i + 1) % 50])
            .count();
        assert_eq!(sampled.node_count, mask.iter().filter(|&&k| k).count());
        assert_eq!(sampled.edge_count(), expected_edges);
    }

    #[test]
    fn test_edgeless_graph_is_degenerate() {
        let mut builder = GraphBuilder::with_capacity(false, 3);
        for id in 0..3 {
            builder.add_node(id);
        }
        let graph = builder.build();
        let sampler = DegreeBiasedSampler::new(0.5).unwrap();

        assert!(matches!(
            sampler.sample(&graph, &mut StdRng::seed_from_u64(0)),
            Err(AnalysisError::DegenerateGraph(_))
        ));
    }

    #[test]
    fn test_rate_outside_unit_interval_is_rejected() {
        assert!(matches!(
            DegreeBiasedSampler::new(0.0),
            Err(AnalysisError::InvalidConfiguration(_))
        ));
        assert!(DegreeBiasedSampler::new(1.01).is_err());
    }
}
