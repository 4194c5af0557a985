use network_structure_analyzer::config::AnalysisConfig;
use network_structure_analyzer::data::load_edge_list;
use network_structure_analyzer::pipeline::{run_analysis, StageSelection};
use network_structure_analyzer::storage::save_results;
use std::fmt::Write as _;
use std::fs;

/// Three dense groups of 15 senders with a handful of cross-group messages
fn clustered_edge_list() -> String {
    let mut text = String::from("# sender recipient\n");
    for group in 0..3u64 {
        let base = group * 100;
        for a in 0..15u64 {
            for b in 0..15u64 {
                if a != b && (a + b) % 3 != 0 {
                    writeln!(text, "{} {}", base + a, base + b).unwrap();
                }
            }
        }
    }
    for (src, dst) in [(0, 100), (100, 200), (200, 0), (5, 105), (105, 205)] {
        writeln!(text, "{} {}", src, dst).unwrap();
    }
    text
}

#[test]
fn test_full_pipeline_writes_every_record() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("edges.txt");
    fs::write(&input, clustered_edge_list()).unwrap();

    let graph = load_edge_list(&input, true).unwrap();
    assert_eq!(graph.node_count, 45);

    let mut config = AnalysisConfig::default();
    config.percolation.num_trials = 3;
    let output = run_analysis(&graph, &config, StageSelection::default()).unwrap();

    assert_eq!(output.basic.num_nodes, 45);
    assert_eq!(output.basic.weakly_connected_components, 1);
    assert_eq!(output.centrality.len(), 45);

    let (partition, communities) = output.communities.as_ref().unwrap();
    assert_eq!(partition.len(), 45);
    assert_eq!(communities.num_communities, communities.community_sizes.len());
    assert_eq!(communities.community_sizes.iter().sum::<usize>(), 45);
    assert_eq!(communities.sampling_method, "probabilistic (80%)");

    let report = output.resilience.as_ref().unwrap();
    let keys: Vec<u32> = report.targeted_attack.keys().copied().collect();
    assert_eq!(keys, vec![1, 5, 10, 20]);
    assert_eq!(report.random_failure.len(), 4);

    let properties = output.properties.as_ref().unwrap();
    assert_eq!(properties.power_law.xmin, 18);
    assert!(properties.small_world.clustering_coeff > properties.small_world.clustering_random);
    assert!(properties.small_world.sigma.is_some());

    let metrics_dir = save_results(&output.as_results(), dir.path().join("out")).unwrap();
    for name in [
        "basic_stats.json",
        "centrality.csv",
        "power_structure.json",
        "communities.json",
        "robustness.json",
        "network_properties.json",
        "summary.json",
    ] {
        assert!(metrics_dir.join(name).exists(), "missing {}", name);
    }

    let robustness: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(metrics_dir.join("robustness.json")).unwrap()).unwrap();
    assert!(robustness["targeted_attack"]["20"]["largest_component_pct"].is_number());
    assert!(robustness["random_failure"]["5"]["std"].is_number());

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(metrics_dir.join("summary.json")).unwrap()).unwrap();
    assert!(summary["network_properties"]["power_law_exponent"].is_number());
    assert!(summary["network_properties"]["is_small_world"].is_boolean());
    assert_eq!(summary["robustness"]["max_removal_pct"], 20);
    assert_eq!(
        summary["robustness"]["targeted_remaining_pct"].as_f64(),
        Some(report.targeted_attack[&20].largest_component_pct)
    );
    assert!(summary["robustness"]["random_remaining_pct"].is_number());
}

#[test]
fn test_pipeline_is_reproducible_for_a_seed() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("edges.txt");
    fs::write(&input, clustered_edge_list()).unwrap();
    let graph = load_edge_list(&input, true).unwrap();

    let config = AnalysisConfig::default();
    let a = run_analysis(&graph, &config, StageSelection::default()).unwrap();
    let b = run_analysis(&graph, &config, StageSelection::default()).unwrap();

    assert_eq!(a.communities, b.communities);
    assert_eq!(a.properties, b.properties);
    assert_eq!(a.resilience, b.resilience);
    assert_eq!(a.power_structure, b.power_structure);
}

#[test]
fn test_skipped_stages_write_no_records() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("edges.txt");
    fs::write(&input, "1 2\n2 3\n3 4\n4 1\n").unwrap();
    let graph = load_edge_list(&input, false).unwrap();

    let stages = StageSelection {
        skip_community: true,
        skip_properties: true,
        skip_robustness: true,
    };
    let output = run_analysis(&graph, &AnalysisConfig::default(), stages).unwrap();
    assert!(output.communities.is_none());
    assert!(output.properties.is_none());
    assert!(output.resilience.is_none());

    let metrics_dir = save_results(&output.as_results(), dir.path()).unwrap();
    assert!(metrics_dir.join("basic_stats.json").exists());
    assert!(!metrics_dir.join("communities.json").exists());
    assert!(!metrics_dir.join("robustness.json").exists());
    assert!(!metrics_dir.join("network_properties.json").exists());
}

#[test]
fn test_invalid_sampling_rate_is_rejected() {
    let graph = network_structure_analyzer::graph::GraphBuilder::from_edges(false, &[(1, 2)]);
    let mut config = AnalysisConfig::default();
    config.community.sampling_rate = 0.0;

    let err = run_analysis(&graph, &config, StageSelection::default()).unwrap_err();
    assert!(matches!(
        err,
        network_structure_analyzer::AnalysisError::InvalidConfiguration(_)
    ));
}
