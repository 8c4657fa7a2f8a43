//! Graph assembly from notes and their resolved links.

use std::collections::HashSet;

use crate::models::{GraphData, GraphEdge, GraphNode};

/// Build the nodes/edges view.
///
/// Emits one node per note and one edge per link whose source is among the
/// given notes. Targets are not filtered: a note may link to a note outside
/// the selected vault. The link relation already holds unique
/// `(source, target)` pairs, so no further deduplication happens here.
pub fn build_graph(nodes: Vec<GraphNode>, links: impl IntoIterator<Item = GraphEdge>) -> GraphData {
    let sources: HashSet<i64> = nodes.iter().map(|n| n.id).collect();
    let edges = links
        .into_iter()
        .filter(|edge| sources.contains(&edge.source))
        .collect();
    GraphData { nodes, edges }
}
