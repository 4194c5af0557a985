//! Results persistence module

use crate::centrality::CentralityTable;
use crate::community::CommunityResult;
use crate::graph::properties::NetworkProperties;
use crate::graph::stats::BasicMetrics;
use crate::power::ClassificationRecord;
use crate::resilience::ResilienceReport;
use anyhow::Result;
use serde::Serialize;
use serde_json::{json, to_string_pretty};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Everything one analysis run produces
pub struct AnalysisResults<'a> {
    pub basic: &'a BasicMetrics,
    pub centrality: &'a CentralityTable,
    pub power_structure: &'a ClassificationRecord,
    pub communities: Option<&'a CommunityResult>,
    pub properties: Option<&'a NetworkProperties>,
    pub resilience: Option<&'a ResilienceReport>,
}

/// Save analysis results under `<output_dir>/metrics`
pub fn save_results(results: &AnalysisResults<'_>, output_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let metrics_dir = output_dir.as_ref().join("metrics");
    log::info!("Saving results to {}", metrics_dir.display());

    fs::create_dir_all(&metrics_dir)?;

    save_json(results.basic, &metrics_dir.join("basic_stats.json"))?;
    save_centrality_csv(results.centrality, &metrics_dir.join("centrality.csv"))?;
    save_json(results.power_structure, &metrics_dir.join("power_structure.json"))?;
    if let Some(communities) = results.communities {
        save_json(communities, &metrics_dir.join("communities.json"))?;
    }
    if let Some(properties) = results.properties {
        save_json(properties, &metrics_dir.join("network_properties.json"))?;
    }
    if let Some(resilience) = results.resilience {
        save_json(resilience, &metrics_dir.join("robustness.json"))?;
    }
    save_summary(results, &metrics_dir.join("summary.json"))?;

    log::info!("Results saved successfully");

    Ok(metrics_dir)
}

fn save_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(value)?.as_bytes())?;
    log::info!("Saved: {}", path.display());
    Ok(())
}

/// One row per node, in table order
fn save_centrality_csv(table: &CentralityTable, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(
        writer,
        "node,degree,pagerank,betweenness,degree_norm,pagerank_norm,betweenness_norm"
    )?;
    for r in table.records() {
        writeln!(
            writer,
            "{},{},{},{},{},{},{}",
            r.node, r.degree, r.pagerank, r.betweenness, r.degree_norm, r.pagerank_norm, r.betweenness_norm
        )?;
    }
    writer.flush()?;
    log::info!("Saved: {}", path.display());
    Ok(())
}

/// Headline numbers across every stage that ran
fn save_summary(results: &AnalysisResults<'_>, path: &Path) -> Result<()> {
    let top_influencer = results.centrality.ranking_by_pagerank(1).first().copied();
    let power = results.power_structure;

    let summary = json!({
        "network": {
            "nodes": results.basic.num_nodes,
            "edges": results.basic.num_edges,
            "density": results.basic.density,
            "lcc_fraction": results.basic.lcc_fraction,
        },
        "power_structure": {
            "top_influencer": top_influencer,
            "hidden_influencers": power.hidden_influencers.len(),
            "information_brokers": power.information_brokers.len(),
            "power_hubs": power.power_hubs.len(),
        },
        "communities": results.communities.map(|c| json!({
            "found": c.num_communities,
            "modularity": c.modularity,
            "largest": c.largest_community_size,
        })),
        "network_properties": results.properties.map(|p| json!({
            "power_law_exponent": p.power_law.power_law_exponent,
            "is_scale_free": p.power_law.is_scale_free,
            "small_world_sigma": p.small_world.sigma,
            "is_small_world": p.small_world.is_small_world,
        })),
        "robustness": results.resilience.map(robustness_summary),
    });

    save_json(&summary, path)
}

/// Critical points plus what remains at the largest scheduled removal
fn robustness_summary(report: &ResilienceReport) -> serde_json::Value {
    let targeted = report.targeted_attack.last_key_value();
    let random = report.random_failure.last_key_value();

    json!({
        "critical_point_targeted": report.critical_point_targeted,
        "critical_point_random": report.critical_point_random,
        "max_removal_pct": targeted.map(|(&pct, _)| pct),
        "targeted_remaining_pct": targeted.map(|(_, m)| m.largest_component_pct),
        "random_remaining_pct": random.map(|(_, o)| o.largest_component_pct),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::centrality::NodeScores;
    use crate::graph::stats::compute_basic_metrics;
    use crate::graph::GraphBuilder;
    use crate::power::classify;
    use crate::config::{PercolationConfig, PowerStructureConfig};
    use crate::resilience::PercolationSimulator;

    #[test]
    fn test_save_results_writes_metric_files() {
        let graph = GraphBuilder::from_edges(true, &[(1, 2), (2, 3), (3, 1)]);
        let basic = compute_basic_metrics(&graph);
        let table = CentralityTable::from_scores(vec![
            NodeScores { node: 1, degree: 2, pagerank: 0.4, betweenness: 0.1 },
            NodeScores { node: 2, degree: 2, pagerank: 0.3, betweenness: 0.0 },
            NodeScores { node: 3, degree: 2, pagerank: 0.3, betweenness: 0.0 },
        ])
        .unwrap();
        let power = classify(&table, &PowerStructureConfig::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let results = AnalysisResults {
            basic: &basic,
            centrality: &table,
            power_structure: &power,
            communities: None,
            properties: None,
            resilience: None,
        };
        let metrics_dir = save_results(&results, dir.path()).unwrap();

        assert!(metrics_dir.join("basic_stats.json").exists());
        assert!(metrics_dir.join("power_structure.json").exists());
        assert!(!metrics_dir.join("communities.json").exists());
        assert!(!metrics_dir.join("robustness.json").exists());

        let csv = fs::read_to_string(metrics_dir.join("centrality.csv")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("node,degree,pagerank"));
        assert!(lines[1].starts_with("1,2,0.4,"));

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(metrics_dir.join("summary.json")).unwrap()).unwrap();
        assert_eq!(summary["power_structure"]["top_influencer"], 1);
        assert!(summary["communities"].is_null());
        assert!(summary["network_properties"].is_null());
        assert!(!metrics_dir.join("network_properties.json").exists());
    }

    #[test]
    fn test_robustness_summary_reports_last_removal() {
        let graph = GraphBuilder::from_edges(false, &(0..99u64).map(|i| (i, i + 1)).collect::<Vec<_>>());
        let simulator = PercolationSimulator::new(&PercolationConfig::default(), 4).unwrap();
        let ranking: Vec<u64> = (0..100).step_by(5).collect();
        let report = simulator.run(&graph, &ranking).unwrap();

        let summary = robustness_summary(&report);

        assert_eq!(summary["max_removal_pct"], 20);
        assert_eq!(
            summary["targeted_remaining_pct"].as_f64(),
            Some(report.targeted_attack[&20].largest_component_pct)
        );
        assert_eq!(
            summary["random_remaining_pct"].as_f64(),
            Some(report.random_failure[&20].largest_component_pct)
        );
        // every fifth node removed leaves runs of four
        assert_eq!(summary["targeted_remaining_pct"].as_f64(), Some(4.0));
    }
}
