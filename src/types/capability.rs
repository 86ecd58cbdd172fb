//! Capability identity and paper evidence.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Frequency above which a capability counts as high-frequency.
pub const HIGH_FREQUENCY_THRESHOLD: u64 = 500;

/// Frequency above which a capability counts as mid-frequency.
pub const MEDIUM_FREQUENCY_THRESHOLD: u64 = 100;

/// Identifier of a capability: its normalized name.
///
/// Construct through [`crate::normalize::normalize_capability_name`] or
/// [`CapabilityId::normalized`]; `new` trusts its input and is meant for
/// values that are already canonical.
///
/// Implements `Borrow<str>` so maps keyed by `CapabilityId` can be queried
/// with a plain `&str`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityId(String);

impl CapabilityId {
    /// Wrap an already-normalized name.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Normalize a raw name. Returns `None` when it normalizes to empty.
    pub fn normalized(raw: &str) -> Option<Self> {
        let id = crate::normalize::normalize_capability_name(raw);
        if id.is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CapabilityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CapabilityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CapabilityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Coarse frequency band of a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FrequencyTier {
    /// At most [`MEDIUM_FREQUENCY_THRESHOLD`] references.
    Low,
    /// More than [`MEDIUM_FREQUENCY_THRESHOLD`], at most [`HIGH_FREQUENCY_THRESHOLD`].
    Medium,
    /// More than [`HIGH_FREQUENCY_THRESHOLD`] references.
    High,
}

impl FrequencyTier {
    /// Classify a frequency count.
    pub fn of(count: u64) -> Self {
        if count > HIGH_FREQUENCY_THRESHOLD {
            Self::High
        } else if count > MEDIUM_FREQUENCY_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for FrequencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// A paper supporting a capability or a relationship.
///
/// Identity for deduplication is `name` alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaperReference {
    /// Paper identifier as given in the source row.
    pub name: String,
    /// Link to the paper, if the row carried one.
    pub url: Option<String>,
}

impl PaperReference {
    /// Create a new paper reference.
    pub fn new(name: impl Into<String>, url: Option<String>) -> Self {
        Self { name: name.into(), url }
    }

    /// Human-facing name: drops a `.txt` suffix and a leading
    /// `ABC123_`-style archive prefix.
    pub fn display_name(&self) -> String {
        static PREFIX: OnceLock<regex_lite::Regex> = OnceLock::new();
        let prefix = PREFIX.get_or_init(|| {
            regex_lite::Regex::new(r"^[A-Z]+\d+_").expect("static pattern is valid")
        });

        let without_ext = self.name.replacen(".txt", "", 1);
        prefix.replace(&without_ext, "").into_owned()
    }
}

/// Set of papers backing an edge, deduplicated by name.
///
/// The first URL recorded for a name wins. Iteration is ordered by name,
/// so two evidence sets built from the same observations in any order
/// compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PaperReference>", into = "Vec<PaperReference>")]
pub struct Evidence {
    papers: BTreeMap<String, Option<String>>,
}

impl Evidence {
    /// Create an empty evidence set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a paper. Returns `false` when a paper with the same name was
    /// already present (its URL is kept).
    pub fn insert(&mut self, name: &str, url: Option<&str>) -> bool {
        if self.papers.contains_key(name) {
            return false;
        }
        self.papers.insert(name.to_string(), url.map(str::to_string));
        true
    }

    /// Number of distinct papers.
    pub fn len(&self) -> usize {
        self.papers.len()
    }

    /// Whether no paper supports this edge.
    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    /// Whether a paper with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.papers.contains_key(name)
    }

    /// Paper names, ordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.papers.keys().map(String::as_str)
    }

    /// Papers as owned references, ordered by name.
    pub fn to_references(&self) -> Vec<PaperReference> {
        self.papers
            .iter()
            .map(|(name, url)| PaperReference::new(name.clone(), url.clone()))
            .collect()
    }
}

impl From<Vec<PaperReference>> for Evidence {
    fn from(papers: Vec<PaperReference>) -> Self {
        let mut evidence = Evidence::new();
        for paper in papers {
            evidence.insert(&paper.name, paper.url.as_deref());
        }
        evidence
    }
}

impl From<Evidence> for Vec<PaperReference> {
    fn from(evidence: Evidence) -> Self {
        evidence.to_references()
    }
}
