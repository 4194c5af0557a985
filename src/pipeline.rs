//! End-to-end analysis run over a loaded graph

use crate::centrality::compute::compute_centralities;
use crate::centrality::CentralityTable;
use crate::community::{detect_communities, CommunityResult, Partition};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::graph::properties::{compute_network_properties, NetworkProperties};
use crate::graph::stats::{compute_basic_metrics, BasicMetrics};
use crate::graph::CompressedGraph;
use crate::power::{classify, ClassificationRecord};
use crate::resilience::{PercolationSimulator, ResilienceReport};
use crate::storage::AnalysisResults;

/// Stages that can be skipped from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct StageSelection {
    pub skip_community: bool,
    pub skip_properties: bool,
    pub skip_robustness: bool,
}

/// Owned output of every stage that ran
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub basic: BasicMetrics,
    pub centrality: CentralityTable,
    pub power_structure: ClassificationRecord,
    pub communities: Option<(Partition, CommunityResult)>,
    pub properties: Option<NetworkProperties>,
    pub resilience: Option<ResilienceReport>,
}

impl AnalysisOutput {
    /// Borrowed view for the storage layer
    pub fn as_results(&self) -> AnalysisResults<'_> {
        AnalysisResults {
            basic: &self.basic,
            centrality: &self.centrality,
            power_structure: &self.power_structure,
            communities: self.communities.as_ref().map(|(_, result)| result),
            properties: self.properties.as_ref(),
            resilience: self.resilience.as_ref(),
        }
    }
}

/// Run every selected stage in order
pub fn run_analysis(
    graph: &CompressedGraph,
    config: &AnalysisConfig,
    stages: StageSelection,
) -> Result<AnalysisOutput> {
    config.validate()?;

    let basic = compute_basic_metrics(graph);
    log::info!(
        "Graph: {} nodes, {} edges, density {:.6}",
        basic.num_nodes,
        basic.num_edges,
        basic.density
    );

    let centrality = compute_centralities(graph, &config.centrality, config.seed)?;
    let power_structure = classify(&centrality, &config.power_structure)?;

    let communities = if stages.skip_community {
        log::info!("Community detection skipped");
        None
    } else {
        Some(detect_communities(graph, &config.community, config.seed)?)
    };

    let properties = if stages.skip_properties {
        log::info!("Network properties skipped");
        None
    } else {
        Some(compute_network_properties(graph, &config.properties, config.seed)?)
    };

    let resilience = if stages.skip_robustness {
        log::info!("Robustness analysis skipped");
        None
    } else {
        let simulator = PercolationSimulator::new(&config.percolation, config.seed)?;
        let ranking = centrality.ranking_by_pagerank(simulator.ranking_size(graph.node_count));
        Some(simulator.run(graph, &ranking)?)
    };

    Ok(AnalysisOutput {
        basic,
        centrality,
        power_structure,
        communities,
        properties,
        resilience,
    })
}
