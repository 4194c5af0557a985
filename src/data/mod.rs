//! Input loading

pub mod edgelist;

pub use edgelist::load_edge_list;
