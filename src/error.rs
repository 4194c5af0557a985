//! Error types for the analysis core

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors raised synchronously by the analysis core.
///
/// None of these are retried internally; the caller decides whether to
/// re-invoke with a different seed or parameter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Mean degree is zero (or the graph is empty), so degree-biased
    /// sampling and normalisation are undefined
    #[error("degenerate graph: {0}")]
    DegenerateGraph(String),

    /// The sampled subgraph cannot support community detection
    #[error("insufficient sample: {0}")]
    InsufficientSample(String),

    /// A parameter is outside its valid domain
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A node label referenced by an input is not present in the graph
    #[error("unknown node {0}")]
    UnknownNode(u64),
}

impl AnalysisError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        AnalysisError::InvalidConfiguration(msg.into())
    }
}
