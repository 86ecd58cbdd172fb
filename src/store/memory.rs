//! In-memory adjacency graph.

use std::collections::BTreeMap;

use crate::ingest::{IngestResult, Relations};
use crate::types::{CapabilityId, PaperReference};
use super::{GraphStore, Neighbor};

/// In-memory capability graph.
///
/// Uses BTreeMap for deterministic iteration order; each adjacency list is
/// sorted by neighbor id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCapabilityGraph {
    /// Node -> outgoing neighbors.
    adjacency: BTreeMap<CapabilityId, Vec<Neighbor>>,
    /// Distinct relations.
    relation_count: usize,
    /// Directed or co-occurrence.
    directed: bool,
}

impl InMemoryCapabilityGraph {
    /// Create an empty directed graph.
    pub fn new() -> Self {
        Self {
            directed: true,
            ..Self::default()
        }
    }

    /// Create an empty undirected graph.
    pub fn undirected() -> Self {
        Self::default()
    }

    /// Build the adjacency structure for an ingestion result.
    pub fn from_ingest(result: &IngestResult) -> Self {
        let mut graph = match result.relations() {
            Relations::Directed { edges, .. } => {
                let mut graph = Self::new();
                for edge in edges {
                    graph.add_edge(
                        edge.source.clone(),
                        edge.target.clone(),
                        edge.papers.to_references(),
                    );
                }
                graph
            }
            Relations::CoOccurrence { capability_pairs, .. } => {
                let mut graph = Self::undirected();
                for pair in capability_pairs {
                    let refs: Vec<_> = pair
                        .papers
                        .iter()
                        .map(|name| PaperReference::new(name.as_str(), None))
                        .collect();
                    graph.add_edge(pair.a.clone(), pair.b.clone(), refs);
                }
                graph
            }
        };
        graph.sort_neighbors();

        tracing::debug!(
            nodes = graph.node_count(),
            relations = graph.relation_count,
            directed = graph.directed,
            "graph built"
        );
        graph
    }

    /// Add a relation. Undirected graphs record it in both directions.
    ///
    /// Call [`sort_neighbors`](Self::sort_neighbors) after a batch of
    /// insertions to restore id order.
    pub fn add_edge(
        &mut self,
        source: CapabilityId,
        target: CapabilityId,
        papers: Vec<PaperReference>,
    ) {
        self.relation_count += 1;

        if !self.directed {
            self.adjacency.entry(target.clone()).or_default().push(Neighbor {
                id: source.clone(),
                papers: papers.clone(),
            });
        } else {
            self.adjacency.entry(target.clone()).or_default();
        }

        self.adjacency
            .entry(source)
            .or_default()
            .push(Neighbor { id: target, papers });
    }

    /// Sort every adjacency list by neighbor id.
    pub fn sort_neighbors(&mut self) {
        for neighbors in self.adjacency.values_mut() {
            neighbors.sort_by(|a, b| a.id.cmp(&b.id));
        }
    }

    /// All node ids, in order.
    pub fn nodes(&self) -> impl Iterator<Item = &CapabilityId> {
        self.adjacency.keys()
    }
}

impl GraphStore for InMemoryCapabilityGraph {
    fn contains(&self, id: &str) -> bool {
        self.adjacency.contains_key(id)
    }

    fn neighbors(&self, id: &str) -> &[Neighbor] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    fn edge_count(&self) -> usize {
        self.relation_count
    }

    fn is_directed(&self) -> bool {
        self.directed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ingest;
    use crate::types::Row;
    use serde_json::json;

    fn ids(graph: &InMemoryCapabilityGraph, id: &str) -> Vec<String> {
        graph.neighbors(id).iter().map(|n| n.id.to_string()).collect()
    }

    #[test]
    fn test_directed_adjacency() {
        let rows = vec![
            Row::from_pairs([("paper_name", json!("p1")), ("Edges", json!("[['a', 'c'], ['a', 'b']]"))]),
            Row::from_pairs([("paper_name", json!("p2")), ("Edges", json!("[['b', 'c']]"))]),
        ];
        let graph = InMemoryCapabilityGraph::from_ingest(&ingest(&rows));

        assert!(graph.is_directed());
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(ids(&graph, "a"), vec!["b", "c"]);
        assert!(graph.contains("c"));
        assert!(graph.neighbors("c").is_empty());
        assert_eq!(graph.neighbors("a")[0].papers[0].name, "p1");
    }

    #[test]
    fn test_co_occurrence_is_traversable_both_ways() {
        let rows = vec![Row::from_pairs([
            ("paper_name", json!("p1")),
            ("capability", json!("['x', 'y']")),
        ])];
        let graph = InMemoryCapabilityGraph::from_ingest(&ingest(&rows));

        assert!(!graph.is_directed());
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(ids(&graph, "x"), vec!["y"]);
        assert_eq!(ids(&graph, "y"), vec!["x"]);
        assert_eq!(graph.neighbors("y")[0].papers[0].url, None);
    }

    #[test]
    fn test_separator_in_name_keeps_nodes_intact() {
        let rows = vec![Row::from_pairs([
            ("paper_name", json!("p1")),
            ("capability", json!("['a|', 'b']")),
        ])];
        let dataset = ingest(&rows);
        let graph = InMemoryCapabilityGraph::from_ingest(&dataset);

        let nodes: Vec<_> = graph.nodes().map(CapabilityId::as_str).collect();
        assert_eq!(nodes, vec!["a|", "b"]);
        for node in graph.nodes() {
            assert!(dataset.capability_stats().contains_key(node));
        }
        assert_eq!(ids(&graph, "a|"), vec!["b"]);
    }

    #[test]
    fn test_unknown_node_has_no_neighbors() {
        let graph = InMemoryCapabilityGraph::new();
        assert!(!graph.contains("ghost"));
        assert!(graph.neighbors("ghost").is_empty());
        assert_eq!(graph.edge_count(), 0);
    }
}
