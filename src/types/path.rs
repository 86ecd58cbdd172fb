//! Path types returned by the path finder.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use super::capability::{CapabilityId, PaperReference};
use super::edge::PairKey;

/// Separator used when building path signatures.
const SIGNATURE_SEPARATOR: &str = "->";

/// One step of a path: the capability reached and the papers of the edge
/// used to reach it. The first step of every path has no papers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    /// Capability at this step.
    pub node: CapabilityId,
    /// Evidence of the edge leading here.
    pub papers: Vec<PaperReference>,
}

impl PathStep {
    /// The starting step of a path.
    pub fn start(node: CapabilityId) -> Self {
        Self { node, papers: Vec::new() }
    }

    /// A step reached through an edge with the given evidence.
    pub fn via(node: CapabilityId, papers: Vec<PaperReference>) -> Self {
        Self { node, papers }
    }
}

/// An ordered walk through the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityPath {
    steps: Vec<PathStep>,
}

impl CapabilityPath {
    /// Wrap a step sequence.
    pub fn new(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    /// Steps in walk order.
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Number of nodes on the path.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the path has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of edges traversed.
    pub fn hops(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Node ids in walk order.
    pub fn nodes(&self) -> impl Iterator<Item = &CapabilityId> {
        self.steps.iter().map(|s| &s.node)
    }

    /// First node, if any.
    pub fn start(&self) -> Option<&CapabilityId> {
        self.steps.first().map(|s| &s.node)
    }

    /// Last node, if any.
    pub fn end(&self) -> Option<&CapabilityId> {
        self.steps.last().map(|s| &s.node)
    }

    /// Node sequence joined with `->`. Two paths are duplicates iff their
    /// signatures are equal.
    pub fn signature(&self) -> String {
        signature_of(&self.steps)
    }

    /// Consume into the raw step list.
    pub fn into_steps(self) -> Vec<PathStep> {
        self.steps
    }
}

pub(crate) fn signature_of(steps: &[PathStep]) -> String {
    steps
        .iter()
        .map(|s| s.node.as_str())
        .collect::<Vec<_>>()
        .join(SIGNATURE_SEPARATOR)
}

/// Nodes and directed edges covered by a set of paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSubgraph {
    /// Every node on any path.
    pub nodes: BTreeSet<CapabilityId>,
    /// Directed keys of consecutive steps.
    pub edges: BTreeSet<PairKey>,
}

impl PathSubgraph {
    /// Collect the union of the given paths.
    pub fn from_paths(paths: &[CapabilityPath]) -> Self {
        let mut subgraph = Self::default();
        for path in paths {
            subgraph.nodes.extend(path.nodes().cloned());
            for pair in path.steps().windows(2) {
                subgraph
                    .edges
                    .insert(PairKey::directed(pair[0].node.as_str(), pair[1].node.as_str()));
            }
        }
        subgraph
    }
}
