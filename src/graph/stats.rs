//! Fundamental graph properties

use crate::graph::algorithms::{
    approximate_diameter, largest_component, strongly_connected_component_count,
    weakly_connected_components,
};
use crate::graph::CompressedGraph;
use serde::{Deserialize, Serialize};

/// Whole-graph summary written to `basic_stats.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicMetrics {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub density: f64,
    pub is_directed: bool,
    pub weakly_connected_components: usize,
    /// Only reported for directed graphs
    pub strongly_connected_components: Option<usize>,
    pub lcc_nodes: usize,
    pub lcc_fraction: f64,
    /// Double-sweep lower bound over the largest component
    pub diameter_lcc: Option<u32>,
}

/// Edge density: m / (n(n-1)) when directed, twice that when undirected
pub fn density(graph: &CompressedGraph) -> f64 {
    let n = graph.node_count as f64;
    if graph.node_count <= 1 {
        return 0.0;
    }
    let possible = n * (n - 1.0);
    let m = graph.edge_count() as f64;
    if graph.directed {
        m / possible
    } else {
        2.0 * m / possible
    }
}

/// Compute the basic metrics of a graph
pub fn compute_basic_metrics(graph: &CompressedGraph) -> BasicMetrics {
    log::info!("Computing basic metrics");

    let components = weakly_connected_components(graph);
    let lcc_nodes = components.first().map_or(0, |c| c.len());
    let lcc = largest_component(graph);
    let diameter_lcc = approximate_diameter(&lcc);
    if let Some(diameter) = diameter_lcc {
        log::info!("  Approximate diameter: {}", diameter);
    }

    BasicMetrics {
        num_nodes: graph.node_count,
        num_edges: graph.edge_count(),
        density: density(graph),
        is_directed: graph.directed,
        weakly_connected_components: components.len(),
        strongly_connected_components: graph
            .directed
            .then(|| strongly_connected_component_count(graph)),
        lcc_nodes,
        lcc_fraction: if graph.node_count == 0 {
            0.0
        } else {
            lcc_nodes as f64 / graph.node_count as f64
        },
        diameter_lcc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    #[test]
    fn test_basic_metrics_of_star_plus_pair() {
        let graph = GraphBuilder::from_edges(false, &[(0, 1), (0, 2), (0, 3), (10, 11)]);
        let metrics = compute_basic_metrics(&graph);

        assert_eq!(metrics.num_nodes, 6);
        assert_eq!(metrics.num_edges, 4);
        assert!((metrics.density - 8.0 / 30.0).abs() < 1e-12);
        assert_eq!(metrics.weakly_connected_components, 2);
        assert_eq!(metrics.strongly_connected_components, None);
        assert_eq!(metrics.lcc_nodes, 4);
        assert_eq!(metrics.diameter_lcc, Some(2));
    }
}
