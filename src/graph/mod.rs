//! Labelled CSR graphs, their construction, components, summary metrics and
//! scale-free / small-world properties

pub mod algorithms;
pub mod builder;
pub mod compressed;
pub mod properties;
pub mod stats;

pub use builder::GraphBuilder;
pub use compressed::CompressedGraph;
pub use properties::NetworkProperties;
pub use stats::BasicMetrics;
