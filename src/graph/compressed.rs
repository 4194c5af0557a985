//! Memory-efficient graph representation

use std::collections::HashMap;
use std::mem;
use serde::{Serialize, Deserialize};

/// Compressed sparse representation of a directed or undirected graph.
///
/// Nodes are addressed by dense `u32` indices; `node_ids[i]` carries the
/// external integer label of node `i`. For undirected graphs every edge is
/// stored in both adjacency lists and the incoming arrays stay empty.
/// Adjacency lists are kept sorted so membership tests can binary search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressedGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// Whether edges are directed
    pub directed: bool,

    /// Offset array: offsets[i] to offsets[i+1] defines the out-edge range for node i
    pub offsets: Vec<u32>,

    /// Edge array: concatenated lists of target nodes
    pub edges: Vec<u32>,

    /// Incoming offsets (directed graphs only)
    pub in_offsets: Vec<u32>,

    /// Incoming edge sources (directed graphs only)
    pub in_edges: Vec<u32>,

    /// External label for every node index
    pub node_ids: Vec<u64>,
}

impl CompressedGraph {
    /// Create a graph with no nodes
    pub fn empty(directed: bool) -> Self {
        Self {
            node_count: 0,
            directed,
            offsets: vec![0],
            edges: Vec::new(),
            in_offsets: if directed { vec![0] } else { Vec::new() },
            in_edges: Vec::new(),
            node_ids: Vec::new(),
        }
    }

    /// Get outgoing edges for a node (all neighbours when undirected)
    pub fn outgoing_edges(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.edges[start..end]
    }

    /// Get incoming edges for a node (all neighbours when undirected)
    pub fn incoming_edges(&self, node: usize) -> &[u32] {
        if !self.directed {
            return self.outgoing_edges(node);
        }
        let start = self.in_offsets[node] as usize;
        let end = self.in_offsets[node + 1] as usize;
        &self.in_edges[start..end]
    }

    /// Check if there's an edge from src to dst
    pub fn has_edge(&self, src: usize, dst: u32) -> bool {
        self.outgoing_edges(src).binary_search(&dst).is_ok()
    }

    /// Get out-degree of a node
    pub fn out_degree(&self, node: usize) -> usize {
        (self.offsets[node + 1] - self.offsets[node]) as usize
    }

    /// Degree of a node: in + out for directed graphs
    pub fn degree(&self, node: usize) -> usize {
        if self.directed {
            self.out_degree(node) + self.incoming_edges(node).len()
        } else {
            self.out_degree(node)
        }
    }

    /// Number of edges (each undirected edge counted once)
    pub fn edge_count(&self) -> usize {
        if self.directed {
            self.edges.len()
        } else {
            self.edges.len() / 2
        }
    }

    /// Mean degree over all nodes, zero for an empty graph
    pub fn mean_degree(&self) -> f64 {
        if self.node_count == 0 {
            return 0.0;
        }
        let total: usize = (0..self.node_count).map(|n| self.degree(n)).sum();
        total as f64 / self.node_count as f64
    }

    /// Sorted, deduplicated neighbours of a node ignoring edge direction
    pub fn neighbor_set(&self, node: usize) -> Vec<u32> {
        let out = self.outgoing_edges(node);
        if !self.directed {
            return out.to_vec();
        }

        let inc = self.incoming_edges(node);
        let mut merged = Vec::with_capacity(out.len() + inc.len());
        let (mut i, mut j) = (0, 0);
        while i < out.len() && j < inc.len() {
            match out[i].cmp(&inc[j]) {
                std::cmp::Ordering::Less => {
                    merged.push(out[i]);
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    merged.push(inc[j]);
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    merged.push(out[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        merged.extend_from_slice(&out[i..]);
        merged.extend_from_slice(&inc[j..]);
        merged
    }

    /// External label of a node index
    pub fn label(&self, node: usize) -> u64 {
        self.node_ids[node]
    }

    /// Lookup table from external label to node index
    pub fn index_map(&self) -> HashMap<u64, u32> {
        self.node_ids
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx as u32))
            .collect()
    }

    /// Build the subgraph induced by the nodes whose `keep` flag is set.
    ///
    /// Node order is preserved, so adjacency lists stay sorted.
    pub fn induced_subgraph(&self, keep: &[bool]) -> CompressedGraph {
        let mut orig_to_sub = vec![u32::MAX; self.node_count];
        let mut node_ids = Vec::new();
        for node in 0..self.node_count {
            if keep[node] {
                orig_to_sub[node] = node_ids.len() as u32;
                node_ids.push(self.node_ids[node]);
            }
        }

        let (offsets, edges) = pack_adjacency(self.remap_lists(keep, &orig_to_sub, false));
        let (in_offsets, in_edges) = if self.directed {
            pack_adjacency(self.remap_lists(keep, &orig_to_sub, true))
        } else {
            (Vec::new(), Vec::new())
        };

        CompressedGraph {
            node_count: node_ids.len(),
            directed: self.directed,
            offsets,
            edges,
            in_offsets,
            in_edges,
            node_ids,
        }
    }

    fn remap_lists(&self, keep: &[bool], orig_to_sub: &[u32], incoming: bool) -> Vec<Vec<u32>> {
        (0..self.node_count)
            .filter(|&node| keep[node])
            .map(|node| {
                let list = if incoming {
                    self.incoming_edges(node)
                } else {
                    self.outgoing_edges(node)
                };
                list.iter()
                    .filter(|&&target| keep[target as usize])
                    .map(|&target| orig_to_sub[target as usize])
                    .collect()
            })
            .collect()
    }

    /// Undirected view of the graph; a plain copy when already undirected
    pub fn to_undirected(&self) -> CompressedGraph {
        if !self.directed {
            return self.clone();
        }

        let lists = (0..self.node_count).map(|n| self.neighbor_set(n)).collect();
        let (offsets, edges) = pack_adjacency(lists);

        CompressedGraph {
            node_count: self.node_count,
            directed: false,
            offsets,
            edges,
            in_offsets: Vec::new(),
            in_edges: Vec::new(),
            node_ids: self.node_ids.clone(),
        }
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let index_arrays = (self.offsets.capacity()
            + self.edges.capacity()
            + self.in_offsets.capacity()
            + self.in_edges.capacity())
            * mem::size_of::<u32>();
        let ids = self.node_ids.capacity() * mem::size_of::<u64>();

        base + index_arrays + ids
    }
}

/// Flatten per-node adjacency lists into an (offsets, edges) CSR pair
pub(crate) fn pack_adjacency(lists: Vec<Vec<u32>>) -> (Vec<u32>, Vec<u32>) {
    let edge_count: usize = lists.iter().map(|list| list.len()).sum();
    let mut offsets = Vec::with_capacity(lists.len() + 1);
    let mut edges = Vec::with_capacity(edge_count);

    offsets.push(0);
    for list in lists {
        edges.extend_from_slice(&list);
        offsets.push(edges.len() as u32);
    }

    (offsets, edges)
}

#[cfg(test)]
mod tests {
    use crate::graph::builder::GraphBuilder;

    #[test]
    fn test_has_edge_follows_direction() {
        let graph = GraphBuilder::from_edges(true, &[(1, 2), (2, 3)]);
        let map = graph.index_map();
        let (one, two) = (map[&1], map[&2]);

        assert!(graph.has_edge(one as usize, two));
        assert!(!graph.has_edge(two as usize, one));

        let undirected = graph.to_undirected();
        assert!(undirected.has_edge(two as usize, one));
    }

    #[test]
    fn test_memory_usage_grows_with_edges() {
        let small = GraphBuilder::from_edges(false, &[(1, 2)]);
        let edges: Vec<(u64, u64)> = (0..100).map(|i| (i, i + 1)).collect();
        let large = GraphBuilder::from_edges(false, &edges);

        assert!(large.memory_usage() > small.memory_usage());
        assert!(large.memory_usage() >= 200 * std::mem::size_of::<u32>());
    }

    #[test]
    fn test_directed_degree_counts_both_directions() {
        let graph = GraphBuilder::from_edges(true, &[(1, 2), (2, 3), (3, 1), (1, 3)]);
        let map = graph.index_map();
        let one = map[&1] as usize;

        assert_eq!(graph.out_degree(one), 2);
        assert_eq!(graph.degree(one), 3);
        assert_eq!(graph.edge_count(), 4);
        // 3 -> 1 and 1 -> 3 collapse into a single neighbour
        assert_eq!(graph.neighbor_set(one).len(), 2);
    }

    #[test]
    fn test_induced_subgraph_keeps_only_internal_edges() {
        let graph = GraphBuilder::from_edges(false, &[(10, 20), (20, 30), (30, 40)]);
        let map = graph.index_map();
        let mut keep = vec![false; graph.node_count];
        keep[map[&20] as usize] = true;
        keep[map[&30] as usize] = true;
        keep[map[&40] as usize] = true;

        let sub = graph.induced_subgraph(&keep);

        assert_eq!(sub.node_count, 3);
        assert_eq!(sub.edge_count(), 2);
        assert!(!sub.node_ids.contains(&10));
        // Source untouched
        assert_eq!(graph.node_count, 4);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_to_undirected_merges_reciprocal_edges() {
        let graph = GraphBuilder::from_edges(true, &[(1, 2), (2, 1), (2, 3)]);
        let undirected = graph.to_undirected();

        assert!(!undirected.directed);
        assert_eq!(undirected.edge_count(), 2);
        assert!((undirected.mean_degree() - 4.0 / 3.0).abs() < 1e-12);
    }
}
