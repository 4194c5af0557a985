//! Power-structure classification over a centrality table
//!
//! Three independent filters over the same table, which may overlap:
//!
//! - **Hidden influencers**: among the top nodes by PageRank, those ranked far
//!   higher by PageRank than by degree.
//! - **Information brokers**: nodes at or above a betweenness quantile,
//!   ordered by betweenness per unit of degree.
//! - **Power hubs**: nodes high on every normalised metric.

use crate::centrality::{CentralityRecord, CentralityTable};
use crate::config::PowerStructureConfig;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A classified node together with the scores that selected it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedNode {
    pub node: u64,
    pub degree: usize,
    pub pagerank: f64,
    pub betweenness: f64,
    pub degree_norm: f64,
    pub pagerank_norm: f64,
    pub betweenness_norm: f64,
    pub pagerank_rank: usize,
    pub degree_rank: usize,
    /// `degree_rank - pagerank_rank`; positive when PageRank outranks degree
    pub rank_difference: i64,
    /// `betweenness / (degree + 1)`
    pub brokerage_score: f64,
}

/// Classification record written to `power_structure.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub hidden_influencers: Vec<ClassifiedNode>,
    pub information_brokers: Vec<ClassifiedNode>,
    pub power_hubs: Vec<ClassifiedNode>,
}

/// Descending competition ranks ("1224" ranking): tied values share the
/// best rank and the following rank is skipped
pub fn competition_ranks(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let mut ranks = vec![0; values.len()];
    for (position, &row) in order.iter().enumerate() {
        ranks[row] = if position > 0 && values[order[position - 1]] == values[row] {
            ranks[order[position - 1]]
        } else {
            position + 1
        };
    }
    ranks
}

/// Quantile with linear interpolation between closest ranks
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Classify the nodes of `table` into the three power categories
pub fn classify(table: &CentralityTable, config: &PowerStructureConfig) -> Result<ClassificationRecord> {
    log::info!("Identifying power structure");
    config.validate()?;

    let records = table.records();
    let pageranks: Vec<f64> = records.iter().map(|r| r.pagerank).collect();
    let degrees: Vec<f64> = records.iter().map(|r| r.degree as f64).collect();
    let betweenness: Vec<f64> = records.iter().map(|r| r.betweenness).collect();

    let pagerank_rank = competition_ranks(&pageranks);
    let degree_rank = competition_ranks(&degrees);
    let rows: Vec<ClassifiedNode> = records
        .iter()
        .enumerate()
        .map(|(i, record)| classified(record, pagerank_rank[i], degree_rank[i]))
        .collect();

    let by_pagerank = table.order_by_pagerank();

    let hidden_influencers: Vec<ClassifiedNode> = by_pagerank
        .iter()
        .take(config.top_pagerank)
        .map(|&i| &rows[i])
        .filter(|row| row.rank_difference as f64 > config.rank_difference_threshold)
        .take(config.max_hidden_influencers)
        .cloned()
        .collect();

    let mut information_brokers: Vec<ClassifiedNode> = match quantile(&betweenness, config.betweenness_quantile) {
        Some(cutoff) => rows.iter().filter(|row| row.betweenness >= cutoff).cloned().collect(),
        None => Vec::new(),
    };
    information_brokers.sort_by(|a, b| b.brokerage_score.total_cmp(&a.brokerage_score));
    information_brokers.truncate(config.max_information_brokers);

    let threshold = config.power_hub_threshold;
    let power_hubs: Vec<ClassifiedNode> = by_pagerank
        .iter()
        .map(|&i| &rows[i])
        .filter(|row| {
            row.degree_norm >= threshold
                && row.pagerank_norm >= threshold
                && row.betweenness_norm >= threshold
        })
        .take(config.max_power_hubs.unwrap_or(usize::MAX))
        .cloned()
        .collect();

    log::info!("  Hidden influencers: {}", hidden_influencers.len());
    log::info!("  Information brokers: {}", information_brokers.len());
    log::info!("  Power hubs: {}", power_hubs.len());

    Ok(ClassificationRecord {
        hidden_influencers,
        information_brokers,
        power_hubs,
    })
}

fn classified(record: &CentralityRecord, pagerank_rank: usize, degree_rank: usize) -> ClassifiedNode {
    ClassifiedNode {
        node: record.node,
        degree: record.degree,
        pagerank: record.pagerank,
        betweenness: record.betweenness,
        degree_norm: record.degree_norm,
        pagerank_norm: record.pagerank_norm,
        betweenness_norm: record.betweenness_norm,
        pagerank_rank,
        degree_rank,
        rank_difference: degree_rank as i64 - pagerank_rank as i64,
        brokerage_score: record.betweenness / (record.degree as f64 + 1.0),
    }
}
