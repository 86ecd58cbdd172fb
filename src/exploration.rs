//! Incremental reveal of the capability graph.
//!
//! The view starts from a single seed capability and grows as the consumer
//! expands nodes. Growth is monotone: with fixed thresholds, expanding
//! another node never hides anything that was visible before.
//!
//! [`ViewMode::Full`] bypasses the reveal and shows every candidate node
//! with every qualifying edge between candidates.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ingest::IngestResult;
use crate::policy::{ExplorationPolicy, ViewMode};
use crate::types::{CapabilityId, Link, PairKey};

/// Summary numbers for a view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewStats {
    /// Visible nodes.
    pub node_count: usize,
    /// Visible edges.
    pub edge_count: usize,
    /// Highest frequency among visible nodes (0 when empty).
    pub max_frequency: u64,
}

/// What the renderer should draw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphView {
    /// Visible capability ids.
    pub nodes: BTreeSet<CapabilityId>,
    /// Visible relation keys.
    pub edges: BTreeSet<PairKey>,
    /// Summary numbers.
    pub stats: ViewStats,
}

impl GraphView {
    fn assemble(dataset: &IngestResult, nodes: BTreeSet<CapabilityId>, edges: BTreeSet<PairKey>) -> Self {
        let stats = ViewStats {
            node_count: nodes.len(),
            edge_count: edges.len(),
            max_frequency: nodes
                .iter()
                .map(|id| dataset.frequency(id.as_str()))
                .max()
                .unwrap_or(0),
        };
        Self { nodes, edges, stats }
    }

    /// Whether nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Whether every node and edge of `other` is also in this view.
    pub fn includes(&self, other: &GraphView) -> bool {
        self.nodes.is_superset(&other.nodes) && self.edges.is_superset(&other.edges)
    }
}

/// Capabilities with frequency at or above `min_frequency`.
pub fn candidates(dataset: &IngestResult, min_frequency: u64) -> BTreeSet<&CapabilityId> {
    dataset
        .capability_stats()
        .iter()
        .filter(|(_, count)| **count >= min_frequency)
        .map(|(id, _)| id)
        .collect()
}

/// Highest-frequency candidate; ties go to the smallest id.
pub fn choose_seed(dataset: &IngestResult, min_frequency: u64) -> Option<CapabilityId> {
    dataset
        .ranked_capabilities()
        .into_iter()
        .find(|(_, count)| *count >= min_frequency)
        .map(|(id, _)| id.clone())
}

fn is_candidate(dataset: &IngestResult, id: &str, min_frequency: u64) -> bool {
    dataset
        .capability_stats()
        .get(id)
        .is_some_and(|count| *count >= min_frequency)
}

fn qualifying_links<'a>(dataset: &'a IngestResult, min_connections: usize) -> impl Iterator<Item = Link<'a>> {
    dataset
        .links()
        .into_iter()
        .filter(move |link| link.strength >= min_connections)
}

/// Exploration view for a seed and an expanded set.
///
/// With nothing expanded only the seed is shown. Otherwise every qualifying
/// edge touching an expanded node is shown, and the visible nodes are the
/// expanded set plus those edges' endpoints, restricted to candidates.
pub fn compute_view(
    dataset: &IngestResult,
    seed: Option<&CapabilityId>,
    expanded: &BTreeSet<CapabilityId>,
    policy: &ExplorationPolicy,
) -> GraphView {
    let candidates = candidates(dataset, policy.min_frequency);

    if expanded.is_empty() {
        let nodes = seed
            .filter(|id| candidates.contains(id))
            .cloned()
            .into_iter()
            .collect();
        return GraphView::assemble(dataset, nodes, BTreeSet::new());
    }

    let mut touched: BTreeSet<&str> = expanded.iter().map(CapabilityId::as_str).collect();
    let mut edges = BTreeSet::new();
    for link in qualifying_links(dataset, policy.min_connections) {
        if expanded.contains(link.source) || expanded.contains(link.target) {
            touched.insert(link.source);
            touched.insert(link.target);
            edges.insert(link.key);
        }
    }

    let nodes = candidates
        .into_iter()
        .filter(|id| touched.contains(id.as_str()))
        .cloned()
        .collect();
    GraphView::assemble(dataset, nodes, edges)
}

/// Every candidate node and every qualifying edge between candidates.
pub fn compute_full_view(dataset: &IngestResult, policy: &ExplorationPolicy) -> GraphView {
    let min = policy.min_frequency;
    let edges = qualifying_links(dataset, policy.min_connections)
        .filter(|link| is_candidate(dataset, link.source, min) && is_candidate(dataset, link.target, min))
        .map(|link| link.key)
        .collect();
    let nodes = candidates(dataset, min).into_iter().cloned().collect();
    GraphView::assemble(dataset, nodes, edges)
}

/// View restricted to `subset`: its candidates and the qualifying edges
/// among them. An empty subset yields an empty view.
pub fn compute_subset_view(
    dataset: &IngestResult,
    subset: &BTreeSet<CapabilityId>,
    policy: &ExplorationPolicy,
) -> GraphView {
    let nodes: BTreeSet<CapabilityId> = candidates(dataset, policy.min_frequency)
        .into_iter()
        .filter(|id| subset.contains(*id))
        .cloned()
        .collect();
    let edges = qualifying_links(dataset, policy.min_connections)
        .filter(|link| nodes.contains(link.source) && nodes.contains(link.target))
        .map(|link| link.key)
        .collect();
    GraphView::assemble(dataset, nodes, edges)
}

/// The selection plus every capability joined to a selected one by a
/// relation in either direction.
pub fn related_capabilities(dataset: &IngestResult, selection: &[CapabilityId]) -> BTreeSet<CapabilityId> {
    let mut related: BTreeSet<CapabilityId> = selection.iter().cloned().collect();
    for link in dataset.links() {
        if selection.iter().any(|s| s.as_str() == link.source) {
            related.insert(CapabilityId::new(link.target));
        }
        if selection.iter().any(|s| s.as_str() == link.target) {
            related.insert(CapabilityId::new(link.source));
        }
    }
    related
}

/// Seed, expanded set and thresholds for one dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationState {
    seed: Option<CapabilityId>,
    expanded: BTreeSet<CapabilityId>,
    policy: ExplorationPolicy,
}

impl ExplorationState {
    /// Fresh state with the given thresholds.
    pub fn new(policy: ExplorationPolicy) -> Self {
        Self {
            seed: None,
            expanded: BTreeSet::new(),
            policy,
        }
    }

    /// Current seed.
    pub fn seed(&self) -> Option<&CapabilityId> {
        self.seed.as_ref()
    }

    /// Expanded capabilities.
    pub fn expanded(&self) -> &BTreeSet<CapabilityId> {
        &self.expanded
    }

    /// Current thresholds.
    pub fn policy(&self) -> &ExplorationPolicy {
        &self.policy
    }

    /// Replace the thresholds. Seed and expanded set are kept.
    pub fn set_policy(&mut self, policy: ExplorationPolicy) {
        self.policy = policy;
    }

    /// Pick a seed if none is set and a candidate exists.
    pub fn choose_seed(&mut self, dataset: &IngestResult) -> Option<&CapabilityId> {
        if self.seed.is_none() {
            self.seed = choose_seed(dataset, self.policy.min_frequency);
            if let Some(seed) = &self.seed {
                tracing::debug!(seed = %seed, "exploration seed chosen");
            }
        }
        self.seed.as_ref()
    }

    /// Mark a capability as expanded. Returns `false` if it already was.
    pub fn expand(&mut self, id: CapabilityId) -> bool {
        self.expanded.insert(id)
    }

    /// Forget seed and expansions; thresholds are kept.
    pub fn reset(&mut self) {
        self.seed = None;
        self.expanded.clear();
    }

    /// View for the current mode, choosing a seed first when exploring.
    pub fn view(&mut self, dataset: &IngestResult) -> GraphView {
        match self.policy.mode {
            ViewMode::Full => compute_full_view(dataset, &self.policy),
            ViewMode::Exploration => {
                self.choose_seed(dataset);
                compute_view(dataset, self.seed.as_ref(), &self.expanded, &self.policy)
            }
        }
    }
}
