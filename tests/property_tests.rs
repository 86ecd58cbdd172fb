//! Property tests for normalization, ingestion, path search and views.

use std::collections::{BTreeSet, VecDeque};

use capability_graph::{
    compute_view, ingest, normalize_capability_name, search_paths, CapabilityId,
    ExplorationPolicy, GraphStore, InMemoryCapabilityGraph, IngestResult, Row, SearchPolicy,
    SearchToken,
};
use proptest::prelude::*;
use serde_json::json;

const NODES: usize = 8;

fn node(i: usize) -> String {
    format!("n{i}")
}

/// One row per edge, each with its own paper.
fn edge_rows(edges: &[(usize, usize)]) -> Vec<Row> {
    edges
        .iter()
        .enumerate()
        .map(|(i, (s, t))| {
            Row::from_pairs([
                ("paper_name", json!(format!("p{i}"))),
                ("capability", json!(format!("['{}', '{}']", node(*s), node(*t)))),
                ("Edges", json!(format!("[['{}', '{}']]", node(*s), node(*t)))),
            ])
        })
        .collect()
}

fn edges_strategy() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0..NODES, 0..NODES), 1..24)
}

/// Hop distance from `start` to `end` by plain BFS, if reachable.
fn hop_distance(graph: &InMemoryCapabilityGraph, start: &str, end: &str) -> Option<usize> {
    let mut seen = BTreeSet::from([start.to_string()]);
    let mut queue = VecDeque::from([(start.to_string(), 0usize)]);
    while let Some((current, dist)) = queue.pop_front() {
        for n in graph.neighbors(&current) {
            if n.id.as_str() == end {
                return Some(dist + 1);
            }
            if seen.insert(n.id.to_string()) {
                queue.push_back((n.id.to_string(), dist + 1));
            }
        }
    }
    None
}

fn build(edges: &[(usize, usize)]) -> (IngestResult, InMemoryCapabilityGraph) {
    let dataset = ingest(&edge_rows(edges));
    let graph = InMemoryCapabilityGraph::from_ingest(&dataset);
    (dataset, graph)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    // ─────────────────────────────────────────────────────────────────────
    // Normalizer
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn normalization_is_idempotent(raw in "[a-zA-Z '\"\t]{0,24}") {
        let once = normalize_capability_name(&raw);
        prop_assert_eq!(normalize_capability_name(&once), once);
    }

    #[test]
    fn normalization_ignores_case_and_quotes(word in "[a-z]{1,10}( [a-z]{1,10})?") {
        let variants = [
            word.to_uppercase(),
            format!("  '{word}' "),
            format!("\"{word}\""),
            format!("{word} Capability"),
        ];
        let expected = normalize_capability_name(&word);
        for variant in &variants {
            prop_assert_eq!(&normalize_capability_name(variant), &expected);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Ingestion
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn edge_set_is_order_independent(
        (edges, shuffled) in edges_strategy().prop_flat_map(|edges| {
            let rows = edge_rows(&edges);
            (Just(rows.clone()), Just(rows).prop_shuffle())
        })
    ) {
        let a = ingest(&edges);
        let b = ingest(&shuffled);
        prop_assert_eq!(a.edges(), b.edges());
        prop_assert_eq!(a.capability_stats(), b.capability_stats());
        prop_assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn edge_endpoints_have_stats(edges in edges_strategy()) {
        let (dataset, _) = build(&edges);
        for edge in dataset.edges() {
            prop_assert!(edge.source != edge.target);
            prop_assert!(dataset.capability_stats().contains_key(edge.source.as_str()));
            prop_assert!(dataset.capability_stats().contains_key(edge.target.as_str()));
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Path search
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn first_path_is_minimal(edges in edges_strategy(), s in 0..NODES, t in 0..NODES) {
        prop_assume!(s != t);
        let (_, graph) = build(&edges);
        let (start, end) = (node(s), node(t));
        prop_assume!(graph.contains(&start) && graph.contains(&end));

        let report = search_paths(&graph, &start, &end, &SearchPolicy::default(), &SearchToken::unbounded());
        match hop_distance(&graph, &start, &end) {
            Some(hops) if hops + 1 <= 5 => {
                prop_assert!(!report.paths.is_empty());
                prop_assert_eq!(report.paths[0].len(), hops + 1);
            }
            _ => prop_assert!(report.paths.is_empty()),
        }
    }

    #[test]
    fn paths_are_valid_simple_walks(edges in edges_strategy(), s in 0..NODES, t in 0..NODES) {
        prop_assume!(s != t);
        let (_, graph) = build(&edges);
        let (start, end) = (node(s), node(t));

        let report = search_paths(&graph, &start, &end, &SearchPolicy::default(), &SearchToken::unbounded());
        for path in &report.paths {
            let nodes: Vec<&str> = path.nodes().map(CapabilityId::as_str).collect();
            prop_assert_eq!(nodes.first().copied(), Some(start.as_str()));
            prop_assert_eq!(nodes.last().copied(), Some(end.as_str()));
            prop_assert!(path.steps()[0].papers.is_empty());

            let distinct: BTreeSet<&str> = nodes.iter().copied().collect();
            prop_assert_eq!(distinct.len(), nodes.len());

            for pair in path.steps().windows(2) {
                let next = graph
                    .neighbors(pair[0].node.as_str())
                    .iter()
                    .find(|n| n.id == pair[1].node);
                prop_assert!(next.is_some());
                prop_assert_eq!(&next.map(|n| n.papers.clone()).unwrap_or_default(), &pair[1].papers);
            }
        }
    }

    #[test]
    fn signatures_unique_and_bounded(
        edges in edges_strategy(),
        s in 0..NODES,
        t in 0..NODES,
        max_paths in 0usize..6,
        max_depth in 2usize..7,
    ) {
        prop_assume!(s != t);
        let (_, graph) = build(&edges);
        let policy = SearchPolicy::default().with_limits(max_paths, max_depth);

        let report = search_paths(&graph, &node(s), &node(t), &policy, &SearchToken::unbounded());
        prop_assert!(report.paths.len() <= max_paths);

        let signatures: BTreeSet<String> = report.paths.iter().map(|p| p.signature()).collect();
        prop_assert_eq!(signatures.len(), report.paths.len());
    }

    #[test]
    fn missing_endpoint_is_empty(edges in edges_strategy(), s in 0..NODES) {
        let (_, graph) = build(&edges);
        let policy = SearchPolicy::default();
        let token = SearchToken::unbounded();

        prop_assert!(search_paths(&graph, "missing", &node(s), &policy, &token).paths.is_empty());
        prop_assert!(search_paths(&graph, &node(s), "missing", &policy, &token).paths.is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Exploration
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn expansion_is_monotone(
        edges in edges_strategy(),
        a in 0..NODES,
        b in 0..NODES,
        min_frequency in 0u64..3,
        min_connections in 0usize..3,
    ) {
        let (dataset, _) = build(&edges);
        let policy = ExplorationPolicy {
            min_frequency,
            min_connections,
            ..ExplorationPolicy::default()
        };
        let one: BTreeSet<CapabilityId> = [CapabilityId::new(node(a))].into();
        let two: BTreeSet<CapabilityId> = [CapabilityId::new(node(a)), CapabilityId::new(node(b))].into();

        let before = compute_view(&dataset, None, &one, &policy);
        let after = compute_view(&dataset, None, &two, &policy);
        prop_assert!(after.includes(&before));
    }
}
