//! Per-node centrality scores and their normalised forms

pub mod compute;

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// Raw centrality scores for one node, as produced upstream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeScores {
    pub node: u64,
    pub degree: usize,
    pub pagerank: f64,
    pub betweenness: f64,
}

/// One row of the centrality table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityRecord {
    pub node: u64,
    pub degree: usize,
    pub pagerank: f64,
    pub betweenness: f64,
    pub degree_norm: f64,
    pub pagerank_norm: f64,
    pub betweenness_norm: f64,
}

/// Immutable table of centrality records.
///
/// Normalised columns are divided by the column maximum, computed once over
/// the full node set at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityTable {
    records: Vec<CentralityRecord>,
}

impl CentralityTable {
    /// Build the table and normalise every column by its maximum.
    ///
    /// A column whose maximum is not positive normalises to zero.
    pub fn from_scores(scores: Vec<NodeScores>) -> Result<Self> {
        if scores.is_empty() {
            return Err(AnalysisError::DegenerateGraph(
                "centrality table has no nodes".to_string(),
            ));
        }

        let max_degree = scores.iter().map(|s| s.degree).max().unwrap_or(0) as f64;
        let max_pagerank = column_max(scores.iter().map(|s| s.pagerank));
        let max_betweenness = column_max(scores.iter().map(|s| s.betweenness));

        for (name, max) in [
            ("degree", max_degree),
            ("pagerank", max_pagerank),
            ("betweenness", max_betweenness),
        ] {
            if max <= 0.0 {
                log::warn!("Column {} has no positive value; normalising to zero", name);
            }
        }

        let records = scores
            .into_iter()
            .map(|s| CentralityRecord {
                node: s.node,
                degree: s.degree,
                pagerank: s.pagerank,
                betweenness: s.betweenness,
                degree_norm: normalise(s.degree as f64, max_degree),
                pagerank_norm: normalise(s.pagerank, max_pagerank),
                betweenness_norm: normalise(s.betweenness, max_betweenness),
            })
            .collect();

        Ok(Self { records })
    }

    pub fn records(&self) -> &[CentralityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Row positions ordered by descending PageRank; ties keep table order
    pub fn order_by_pagerank(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.records.len()).collect();
        order.sort_by(|&a, &b| self.records[b].pagerank.total_cmp(&self.records[a].pagerank));
        order
    }

    /// Node labels of the `limit` highest-PageRank nodes, highest first
    pub fn ranking_by_pagerank(&self, limit: usize) -> Vec<u64> {
        self.order_by_pagerank()
            .into_iter()
            .take(limit)
            .map(|row| self.records[row].node)
            .collect()
    }
}

fn column_max(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::NEG_INFINITY, f64::max)
}

fn normalise(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        value / max
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(node: u64, degree: usize, pagerank: f64, betweenness: f64) -> NodeScores {
        NodeScores { node, degree, pagerank, betweenness }
    }

    #[test]
    fn test_normalisation_divides_by_column_max() {
        let table = CentralityTable::from_scores(vec![
            scores(1, 4, 0.5, 0.2),
            scores(2, 2, 0.25, 0.0),
            scores(3, 1, 0.25, 0.1),
        ])
        .unwrap();

        let first = &table.records()[0];
        assert_eq!(first.degree_norm, 1.0);
        assert_eq!(first.pagerank_norm, 1.0);
        assert_eq!(first.betweenness_norm, 1.0);
        assert_eq!(table.records()[1].degree_norm, 0.5);
        assert_eq!(table.records()[2].betweenness_norm, 0.5);
    }

    #[test]
    fn test_zero_column_normalises_to_zero() {
        let table =
            CentralityTable::from_scores(vec![scores(1, 1, 0.5, 0.0), scores(2, 1, 0.5, 0.0)])
                .unwrap();
        assert!(table.records().iter().all(|r| r.betweenness_norm == 0.0));
    }

    #[test]
    fn test_empty_table_is_degenerate() {
        assert!(matches!(
            CentralityTable::from_scores(Vec::new()),
            Err(AnalysisError::DegenerateGraph(_))
        ));
    }

    #[test]
    fn test_ranking_by_pagerank_is_descending_and_stable() {
        let table = CentralityTable::from_scores(vec![
            scores(10, 1, 0.1, 0.0),
            scores(20, 1, 0.4, 0.0),
            scores(30, 1, 0.1, 0.0),
            scores(40, 1, 0.4, 0.0),
        ])
        .unwrap();

        assert_eq!(table.ranking_by_pagerank(3), vec![20, 40, 10]);
    }
}
