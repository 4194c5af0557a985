//! Configuration management for the network structure analyzer

use crate::error::{AnalysisError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration; every field has a default so partial YAML files work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Seed for every random draw in a run
    pub seed: u64,

    pub community: CommunityConfig,

    pub centrality: CentralityConfig,

    pub power_structure: PowerStructureConfig,

    pub percolation: PercolationConfig,

    pub properties: PropertiesConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            community: CommunityConfig::default(),
            centrality: CentralityConfig::default(),
            power_structure: PowerStructureConfig::default(),
            percolation: PercolationConfig::default(),
            properties: PropertiesConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load a YAML configuration file and validate it
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Config file not found: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&text)
            .with_context(|| format!("Malformed config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section
    pub fn validate(&self) -> Result<()> {
        self.community.validate()?;
        self.centrality.validate()?;
        self.power_structure.validate()?;
        self.percolation.validate()?;
        self.properties.validate()
    }
}

/// Community detection algorithm run on the sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    Louvain,
    LabelPropagation,
}

/// Sampling and community detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityConfig {
    /// Target inclusion fraction for degree-biased sampling, in (0, 1]
    pub sampling_rate: f64,

    pub detector: DetectorKind,

    /// Iteration cap for the detector's local moving phase
    pub max_iterations: usize,

    /// Louvain resolution; higher values produce smaller communities
    pub resolution: f64,

    /// Louvain aggregation levels
    pub max_levels: usize,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            sampling_rate: 0.8,
            detector: DetectorKind::Louvain,
            max_iterations: 100,
            resolution: 1.0,
            max_levels: 10,
        }
    }
}

impl CommunityConfig {
    pub fn validate(&self) -> Result<()> {
        validate_sampling_rate(self.sampling_rate)?;
        if self.max_iterations == 0 {
            return Err(AnalysisError::config("max_iterations must be at least 1"));
        }
        if !(self.resolution > 0.0) {
            return Err(AnalysisError::config("resolution must be positive"));
        }
        if self.max_levels == 0 {
            return Err(AnalysisError::config("max_levels must be at least 1"));
        }
        Ok(())
    }
}

/// Sampling rate must lie in (0, 1]
pub fn validate_sampling_rate(rate: f64) -> Result<()> {
    if !(rate > 0.0 && rate <= 1.0) {
        return Err(AnalysisError::config(format!(
            "sampling rate must be in (0, 1], got {}",
            rate
        )));
    }
    Ok(())
}

/// Settings for the centrality providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CentralityConfig {
    /// PageRank damping factor
    pub pagerank_alpha: f64,

    pub pagerank_max_iter: usize,

    /// Per-node convergence tolerance (scaled by node count)
    pub pagerank_tolerance: f64,

    /// Number of sampled BFS sources for approximate betweenness
    pub betweenness_k_samples: usize,
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            pagerank_alpha: 0.85,
            pagerank_max_iter: 100,
            pagerank_tolerance: 1.0e-6,
            betweenness_k_samples: 1000,
        }
    }
}

impl CentralityConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.pagerank_alpha > 0.0 && self.pagerank_alpha < 1.0) {
            return Err(AnalysisError::config("pagerank_alpha must be in (0, 1)"));
        }
        if self.pagerank_tolerance <= 0.0 || self.pagerank_max_iter == 0 {
            return Err(AnalysisError::config(
                "pagerank tolerance and iteration cap must be positive",
            ));
        }
        if self.betweenness_k_samples == 0 {
            return Err(AnalysisError::config("betweenness_k_samples must be at least 1"));
        }
        Ok(())
    }
}

/// Thresholds and caps for power-structure classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerStructureConfig {
    /// Hidden influencers are drawn from this many top-PageRank nodes
    pub top_pagerank: usize,

    /// Minimum `degree_rank - pagerank_rank` (exclusive)
    pub rank_difference_threshold: f64,

    pub max_hidden_influencers: usize,

    /// Betweenness quantile a broker must reach
    pub betweenness_quantile: f64,

    pub max_information_brokers: usize,

    /// Minimum normalised degree, PageRank and betweenness for a power hub
    pub power_hub_threshold: f64,

    /// Uncapped when `None`
    pub max_power_hubs: Option<usize>,
}

impl Default for PowerStructureConfig {
    fn default() -> Self {
        Self {
            top_pagerank: 100,
            rank_difference_threshold: 50.0,
            max_hidden_influencers: 20,
            betweenness_quantile: 0.9,
            max_information_brokers: 20,
            power_hub_threshold: 0.8,
            max_power_hubs: None,
        }
    }
}

impl PowerStructureConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.rank_difference_threshold >= 0.0) {
            return Err(AnalysisError::config(
                "rank_difference_threshold must be non-negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.betweenness_quantile) {
            return Err(AnalysisError::config("betweenness_quantile must be in [0, 1]"));
        }
        if !(self.power_hub_threshold >= 0.0) {
            return Err(AnalysisError::config("power_hub_threshold must be non-negative"));
        }
        Ok(())
    }
}

/// Removal schedule and trial count for percolation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PercolationConfig {
    /// Removal percentages, strictly ascending, each within 0..=100
    pub schedule: Vec<u32>,

    /// Independent trials per percentage for random failure
    pub num_trials: usize,
}

impl Default for PercolationConfig {
    fn default() -> Self {
        Self {
            schedule: vec![1, 5, 10, 20],
            num_trials: 5,
        }
    }
}

impl PercolationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.schedule.is_empty() {
            return Err(AnalysisError::config("percentage schedule is empty"));
        }
        if self.schedule.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AnalysisError::config(
                "percentage schedule must be strictly ascending",
            ));
        }
        if self.schedule.iter().any(|&p| p > 100) {
            return Err(AnalysisError::config("percentages must not exceed 100"));
        }
        if self.num_trials == 0 {
            return Err(AnalysisError::config("num_trials must be at least 1"));
        }
        Ok(())
    }
}

/// Scale-free and small-world settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertiesConfig {
    /// BFS sources for the average path length; every node when the
    /// component is no larger than this
    pub path_length_sources: usize,
}

impl Default for PropertiesConfig {
    fn default() -> Self {
        Self {
            path_length_sources: 1000,
        }
    }
}

impl PropertiesConfig {
    pub fn validate(&self) -> Result<()> {
        if self.path_length_sources == 0 {
            return Err(AnalysisError::config("path_length_sources must be at least 1"));
        }
        Ok(())
    }
}
