//! Edge types for the capability graph.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use super::capability::{CapabilityId, Evidence};

/// Separator used in pair keys. Not expected to occur in capability text.
pub const PAIR_KEY_SEPARATOR: &str = "|||";

/// String key for a pair of capabilities, usable as a map key.
///
/// Keys are for display and set membership only. They cannot be split
/// back into ids, since the separator may occur inside a name.
///
/// Directed keys keep `source|||target` order; unordered keys sort the two
/// ids first so both orientations produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairKey(String);

impl PairKey {
    /// Key for the ordered pair `source -> target`.
    pub fn directed(source: &str, target: &str) -> Self {
        Self(format!("{source}{PAIR_KEY_SEPARATOR}{target}"))
    }

    /// Key for the unordered pair `{a, b}`.
    pub fn unordered(a: &str, b: &str) -> Self {
        if a <= b {
            Self::directed(a, b)
        } else {
            Self::directed(b, a)
        }
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Directed relationship between two capabilities.
///
/// Implements `Ord` for deterministic ordering: (source, target).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Source capability.
    pub source: CapabilityId,
    /// Target capability.
    pub target: CapabilityId,
    /// Papers in which this relationship was observed.
    pub papers: Evidence,
}

impl Edge {
    /// Create an edge with no evidence yet.
    pub fn new(source: CapabilityId, target: CapabilityId) -> Self {
        Self {
            source,
            target,
            papers: Evidence::new(),
        }
    }

    /// Directed pair key of this edge.
    pub fn key(&self) -> PairKey {
        PairKey::directed(self.source.as_str(), self.target.as_str())
    }

    /// Number of distinct supporting papers.
    pub fn strength(&self) -> usize {
        self.papers.len()
    }
}

impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.source
            .cmp(&other.source)
            .then_with(|| self.target.cmp(&other.target))
    }
}

/// Undirected co-occurrence of two capabilities on the same rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairEdge {
    /// Lexicographically smaller endpoint.
    pub a: CapabilityId,
    /// Lexicographically larger endpoint.
    pub b: CapabilityId,
    /// Names of papers mentioning both capabilities.
    pub papers: BTreeSet<String>,
}

impl PairEdge {
    /// Create a pair edge, canonicalizing endpoint order.
    pub fn new(x: CapabilityId, y: CapabilityId) -> Self {
        let (a, b) = if x <= y { (x, y) } else { (y, x) };
        Self {
            a,
            b,
            papers: BTreeSet::new(),
        }
    }

    /// Canonical pair key.
    pub fn key(&self) -> PairKey {
        PairKey::unordered(self.a.as_str(), self.b.as_str())
    }
}

/// Borrowed, mode-independent view of one relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link<'a> {
    /// Key used by renderers (directed or unordered, per mode).
    pub key: PairKey,
    /// First endpoint (source in directed mode).
    pub source: &'a str,
    /// Second endpoint (target in directed mode).
    pub target: &'a str,
    /// Evidence count.
    pub strength: usize,
}
