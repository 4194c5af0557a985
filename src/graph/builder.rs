//! Graph construction module

use crate::graph::compressed::pack_adjacency;
use crate::graph::CompressedGraph;
use std::collections::HashMap;

/// Builder for incrementally constructing a CompressedGraph from labelled edges
pub struct GraphBuilder {
    /// Whether the resulting graph is directed
    directed: bool,

    /// Mapping from external labels to node indices
    id_to_index: HashMap<u64, u32>,

    /// External label per node index
    node_ids: Vec<u64>,

    /// Outgoing adjacency per node (both directions when undirected)
    outgoing: Vec<Vec<u32>>,

    /// Incoming adjacency per node (directed only)
    incoming: Vec<Vec<u32>>,

    /// Self-loops encountered and discarded
    dropped_self_loops: usize,
}

impl GraphBuilder {
    /// Create a new graph builder with the given node capacity
    pub fn with_capacity(directed: bool, capacity: usize) -> Self {
        Self {
            directed,
            id_to_index: HashMap::with_capacity(capacity),
            node_ids: Vec::with_capacity(capacity),
            outgoing: Vec::with_capacity(capacity),
            incoming: Vec::with_capacity(if directed { capacity } else { 0 }),
            dropped_self_loops: 0,
        }
    }

    /// Build a graph straight from a list of labelled edges
    pub fn from_edges(directed: bool, edges: &[(u64, u64)]) -> CompressedGraph {
        let mut builder = Self::with_capacity(directed, edges.len());
        for &(src, dst) in edges {
            builder.add_edge(src, dst);
        }
        builder.build()
    }

    /// Get or create the node index for an external label
    pub fn add_node(&mut self, id: u64) -> u32 {
        if let Some(&idx) = self.id_to_index.get(&id) {
            return idx;
        }

        let idx = self.node_ids.len() as u32;
        self.id_to_index.insert(id, idx);
        self.node_ids.push(id);
        self.outgoing.push(Vec::new());
        if self.directed {
            self.incoming.push(Vec::new());
        }

        idx
    }

    /// Add an edge between two labelled nodes, creating them as needed.
    ///
    /// Self-loops register the node but contribute no edge.
    pub fn add_edge(&mut self, src_id: u64, dst_id: u64) {
        let src = self.add_node(src_id);
        let dst = self.add_node(dst_id);

        if src == dst {
            self.dropped_self_loops += 1;
            return;
        }

        self.outgoing[src as usize].push(dst);
        if self.directed {
            self.incoming[dst as usize].push(src);
        } else {
            self.outgoing[dst as usize].push(src);
        }
    }

    /// Number of nodes registered so far
    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    /// Build the compressed graph; duplicate edges collapse into one
    pub fn build(mut self) -> CompressedGraph {
        if self.dropped_self_loops > 0 {
            log::debug!("Dropped {} self-loops", self.dropped_self_loops);
        }

        for list in self.outgoing.iter_mut().chain(self.incoming.iter_mut()) {
            list.sort_unstable();
            list.dedup();
        }

        let (offsets, edges) = pack_adjacency(self.outgoing);
        let (in_offsets, in_edges) = if self.directed {
            pack_adjacency(self.incoming)
        } else {
            (Vec::new(), Vec::new())
        };

        CompressedGraph {
            node_count: self.node_ids.len(),
            directed: self.directed,
            offsets,
            edges,
            in_offsets,
            in_edges,
            node_ids: self.node_ids,
        }
    }
}
