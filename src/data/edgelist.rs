//! Edge-list file handling for graph data

use crate::graph::{CompressedGraph, GraphBuilder};
use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Load a whitespace-separated integer edge list.
///
/// Each line holds `source target`; blank lines and lines starting with `#`
/// are skipped. Extra columns after the target are ignored.
pub fn load_edge_list(path: impl AsRef<Path>, directed: bool) -> Result<CompressedGraph> {
    let path = path.as_ref();
    log::info!("Reading edge list: {}", path.display());

    if !path.exists() {
        return Err(anyhow!("File not found: {}", path.display()));
    }

    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut builder = GraphBuilder::with_capacity(directed, 1024);
    let mut edge_lines = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (src, dst) = parse_edge(trimmed)
            .with_context(|| format!("{}:{}: malformed edge `{}`", path.display(), line_no + 1, trimmed))?;
        builder.add_edge(src, dst);
        edge_lines += 1;
    }

    log::info!("Processed {} edge lines over {} nodes", edge_lines, builder.node_count());
    let graph = builder.build();
    log::info!(
        "Built {} graph with {} nodes and {} edges",
        if directed { "directed" } else { "undirected" },
        graph.node_count,
        graph.edge_count()
    );
    log::info!(
        "Graph memory usage: {:.2} MB",
        graph.memory_usage() as f64 / (1024.0 * 1024.0)
    );

    Ok(graph)
}

fn parse_edge(line: &str) -> Result<(u64, u64)> {
    let mut fields = line.split_whitespace();
    let src = fields.next().ok_or_else(|| anyhow!("missing source"))?.parse()?;
    let dst = fields.next().ok_or_else(|| anyhow!("missing target"))?.parse()?;
    Ok((src, dst))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_skips_comments_and_blank_lines() {
        let file = write_file("# sender receiver\n1 2\n\n2 3\n  # indented comment\n3 1 17\n");
        let graph = load_edge_list(file.path(), true).unwrap();

        assert_eq!(graph.node_count, 3);
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.directed);
    }

    #[test]
    fn test_undirected_load_merges_reciprocal_edges() {
        let file = write_file("10 20\n20 10\n20 30\n");
        let graph = load_edge_list(file.path(), false).unwrap();

        assert_eq!(graph.node_count, 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_malformed_line_is_an_error() {
        let file = write_file("1 2\n3 x\n");
        let err = load_edge_list(file.path(), true).unwrap_err();
        assert!(format!("{:#}", err).contains(":2:"));

        let file = write_file("7\n");
        assert!(load_edge_list(file.path(), true).is_err());
    }

    #[test]
    fn test_loaded_graph_reports_csr_memory() {
        let file = write_file("1 2\n2 3\n3 4\n4 1\n");
        let graph = load_edge_list(file.path(), true).unwrap();

        // out and in CSR: 5 offsets and 4 targets each, plus 4 labels
        let arrays = 2 * (5 + 4) * std::mem::size_of::<u32>() + 4 * std::mem::size_of::<u64>();
        assert!(graph.memory_usage() >= arrays);
    }

    #[test]
    fn test_missing_file() {
        assert!(load_edge_list("/nonexistent/edges.txt", true).is_err());
    }
}
