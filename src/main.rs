use anyhow::Result;
use clap::Parser;
use network_structure_analyzer::config::{validate_sampling_rate, AnalysisConfig};
use network_structure_analyzer::data::load_edge_list;
use network_structure_analyzer::pipeline::{run_analysis, StageSelection};
use network_structure_analyzer::storage;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "network-structure-analyzer",
    about = "Community, resilience and power-structure analysis of communication graphs"
)]
struct Cli {
    /// Path to a whitespace-separated edge list
    #[clap(long)]
    input: PathBuf,

    /// Output directory for results
    #[clap(long, default_value = "outputs")]
    output_dir: PathBuf,

    /// Optional YAML configuration file
    #[clap(long)]
    config: Option<PathBuf>,

    /// Treat the edge list as undirected
    #[clap(long)]
    undirected: bool,

    /// Override the random seed
    #[clap(long)]
    seed: Option<u64>,

    /// Override the community sampling rate (0.0-1.0]
    #[clap(long)]
    sampling_rate: Option<f64>,

    /// Skip community detection
    #[clap(long)]
    skip_community: bool,

    /// Skip scale-free and small-world analysis
    #[clap(long)]
    skip_properties: bool,

    /// Skip robustness analysis
    #[clap(long)]
    skip_robustness: bool,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            AnalysisConfig::from_yaml_file(path)?
        }
        None => AnalysisConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(rate) = args.sampling_rate {
        validate_sampling_rate(rate)?;
        config.community.sampling_rate = rate;
    }

    log::info!("Starting network structure analysis");
    log::info!("Input: {}", args.input.display());
    log::info!("Output: {}", args.output_dir.display());

    let graph = load_edge_list(&args.input, !args.undirected)?;

    let stages = StageSelection {
        skip_community: args.skip_community,
        skip_properties: args.skip_properties,
        skip_robustness: args.skip_robustness,
    };
    let output = run_analysis(&graph, &config, stages)?;

    let metrics_dir = storage::save_results(&output.as_results(), &args.output_dir)?;

    log::info!("Network: {} nodes, {} edges", output.basic.num_nodes, output.basic.num_edges);
    log::info!(
        "Largest component: {:.1}%",
        output.basic.lcc_fraction * 100.0
    );
    log::info!(
        "Power structure: {} hidden influencers, {} information brokers, {} power hubs",
        output.power_structure.hidden_influencers.len(),
        output.power_structure.information_brokers.len(),
        output.power_structure.power_hubs.len()
    );
    if let Some((_, communities)) = &output.communities {
        log::info!(
            "Communities: {} found, modularity {:.3}, largest {} nodes",
            communities.num_communities,
            communities.modularity,
            communities.largest_community_size
        );
    }
    if let Some(properties) = &output.properties {
        log::info!(
            "Power-law exponent: {:.2}, small-world sigma: {}",
            properties.power_law.power_law_exponent,
            properties
                .small_world
                .sigma
                .map_or_else(|| "N/A".to_string(), |s| format!("{:.2}", s))
        );
    }
    if let Some(report) = &output.resilience {
        log::info!(
            "Critical points: targeted {:?}, random {:?}",
            report.critical_point_targeted,
            report.critical_point_random
        );
        if let (Some((pct, targeted)), Some((_, random))) = (
            report.targeted_attack.last_key_value(),
            report.random_failure.last_key_value(),
        ) {
            log::info!("{}% targeted removal: {:.1}% remains", pct, targeted.largest_component_pct);
            log::info!("{}% random removal: {:.1}% remains", pct, random.largest_component_pct);
        }
    }

    log::info!("Analysis complete. Results saved to {}", metrics_dir.display());

    Ok(())
}
