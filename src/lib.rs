//! Structural analysis of large communication graphs: community structure,
//! resilience to node loss, and latent power structure

pub mod centrality;
pub mod community;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod pipeline;
pub mod power;
pub mod resilience;
pub mod storage;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
