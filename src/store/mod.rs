//! Graph model backends.
//!
//! A store is an immutable adjacency structure built once per ingestion
//! result. The path finder only reads it, so a store can be shared across
//! threads behind an `Arc` and swapped wholesale when a new dataset loads.

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::types::{CapabilityId, PaperReference};

/// One traversable step out of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Capability reached.
    pub id: CapabilityId,
    /// Evidence of the relation used to reach it.
    pub papers: Vec<PaperReference>,
}

/// Trait for graph model backends.
///
/// Implementations must return neighbors in a deterministic order so that
/// repeated searches over the same dataset produce identical results.
pub trait GraphStore: Send + Sync {
    /// Whether the node takes part in at least one relation.
    fn contains(&self, id: &str) -> bool;

    /// Outgoing neighbors of a node (both directions in co-occurrence mode).
    /// Unknown ids have no neighbors.
    fn neighbors(&self, id: &str) -> &[Neighbor];

    /// Number of nodes.
    fn node_count(&self) -> usize;

    /// Number of distinct relations.
    fn edge_count(&self) -> usize;

    /// Whether relations are directed.
    fn is_directed(&self) -> bool;
}

pub use memory::InMemoryCapabilityGraph;
