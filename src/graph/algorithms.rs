//! Graph algorithms for connectivity analysis

use crate::graph::CompressedGraph;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;
use std::collections::{HashMap, VecDeque};

/// Sizes of the weakly connected components among the nodes flagged alive.
///
/// Edge direction is ignored. Removed nodes (`alive[n] == false`) and every
/// edge touching them are skipped without materialising a copy of the graph,
/// so the canonical graph is never mutated. Sizes are sorted descending.
pub fn component_sizes(graph: &CompressedGraph, alive: Option<&[bool]>) -> Vec<usize> {
    let is_alive = |node: usize| alive.map_or(true, |mask| mask[node]);
    let labels = union_alive_edges(graph, alive);

    let mut sizes: HashMap<u32, usize> = HashMap::new();
    for (node, &root) in labels.iter().enumerate() {
        if is_alive(node) {
            *sizes.entry(root).or_default() += 1;
        }
    }

    let mut sizes: Vec<usize> = sizes.into_values().collect();
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    sizes
}

/// Weakly connected components as member lists, largest first.
///
/// Equal-sized components are ordered by their smallest member index.
pub fn weakly_connected_components(graph: &CompressedGraph) -> Vec<Vec<u32>> {
    let labels = union_alive_edges(graph, None);

    let mut groups: HashMap<u32, Vec<u32>> = HashMap::new();
    for (node, &root) in labels.iter().enumerate() {
        groups.entry(root).or_default().push(node as u32);
    }

    let mut components: Vec<Vec<u32>> = groups.into_values().collect();
    components.sort_by(|a, b| b.len().cmp(&a.len()).then(a[0].cmp(&b[0])));
    components
}

fn union_alive_edges(graph: &CompressedGraph, alive: Option<&[bool]>) -> Vec<u32> {
    let is_alive = |node: usize| alive.map_or(true, |mask| mask[node]);
    let mut sets = UnionFind::<u32>::new(graph.node_count);

    for src in 0..graph.node_count {
        if !is_alive(src) {
            continue;
        }
        for &dst in graph.outgoing_edges(src) {
            if is_alive(dst as usize) {
                sets.union(src as u32, dst);
            }
        }
    }

    sets.into_labeling()
}

/// Subgraph induced by the largest weakly connected component
pub fn largest_component(graph: &CompressedGraph) -> CompressedGraph {
    let components = weakly_connected_components(graph);
    let Some(largest) = components.first() else {
        return graph.clone();
    };

    let mut keep = vec![false; graph.node_count];
    for &node in largest {
        keep[node as usize] = true;
    }

    log::info!(
        "Largest component: {} of {} nodes ({:.1}%)",
        largest.len(),
        graph.node_count,
        largest.len() as f64 / graph.node_count as f64 * 100.0
    );

    graph.induced_subgraph(&keep)
}

/// Number of strongly connected components (equals the weak count when undirected)
pub fn strongly_connected_component_count(graph: &CompressedGraph) -> usize {
    let mut digraph: DiGraph<(), ()> = DiGraph::with_capacity(graph.node_count, graph.edges.len());
    for _ in 0..graph.node_count {
        digraph.add_node(());
    }
    for src in 0..graph.node_count {
        for &dst in graph.outgoing_edges(src) {
            digraph.add_edge(NodeIndex::new(src), NodeIndex::new(dst as usize), ());
        }
    }

    tarjan_scc(&digraph).len()
}

/// Hop distances from `source` ignoring edge direction; unreachable nodes are `None`
pub fn bfs_distances(graph: &CompressedGraph, source: usize) -> Vec<Option<u32>> {
    let mut distances = vec![None; graph.node_count];
    let mut queue = VecDeque::new();

    distances[source] = Some(0);
    queue.push_back(source);

    while let Some(node) = queue.pop_front() {
        let next = distances[node].map_or(0, |d| d + 1);
        for neighbor in graph.neighbor_set(node) {
            let neighbor = neighbor as usize;
            if distances[neighbor].is_none() {
                distances[neighbor] = Some(next);
                queue.push_back(neighbor);
            }
        }
    }

    distances
}

/// Double-sweep lower bound on the diameter of a connected graph
pub fn approximate_diameter(graph: &CompressedGraph) -> Option<u32> {
    if graph.node_count == 0 {
        return None;
    }

    let farthest = |source: usize| -> (usize, u32) {
        bfs_distances(graph, source)
            .into_iter()
            .enumerate()
            .filter_map(|(node, dist)| dist.map(|d| (node, d)))
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .unwrap_or((source, 0))
    };

    let (far_node, _) = farthest(0);
    let (_, eccentricity) = farthest(far_node);
    Some(eccentricity)
}
