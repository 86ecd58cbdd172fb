//! # capability-graph
//!
//! Capability graphs from noisy paper metadata.
//!
//! The crate answers one question:
//!
//! > Given a table of papers and the capabilities they mention, how are
//! > those capabilities connected?
//!
//! ## Core Contract
//!
//! 1. Normalize free-text capability names into stable identifiers
//! 2. Ingest rows into frequency counts, paper indices and one relation set
//!    (explicit directed edges, or inferred co-occurrence pairs)
//! 3. Find a shortest path and bounded alternatives between two capabilities,
//!    under cancellation and timeout
//! 4. Reveal the graph incrementally from a seed capability
//!
//! ## Architecture
//!
//! ```text
//! Rows → Normalizer → IngestBuilder → IngestResult → InMemoryCapabilityGraph
//!                                          ↓                    ↓
//!                                  ExplorationState        PathFinder
//!                                          ↓                    ↓
//!                                      GraphView          SearchReport
//! ```
//!
//! [`Session`] owns one dataset at a time and ties these together.
//!
//! ## Determinism Guarantees
//!
//! - Same rows (in any order) → identical relation set and fingerprint
//! - Edge ordering is canonical (source, target)
//! - Neighbor ordering is canonical (by capability id), so path search
//!   results are reproducible

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod policy;
pub mod store;
pub mod normalize;
pub mod ingest;
pub mod finder;
pub mod exploration;
pub mod canonical;
pub mod session;

// Re-exports
pub use types::{
    CapabilityId, PaperReference, Evidence, FrequencyTier,
    Edge, PairEdge, PairKey, Link,
    PathStep, CapabilityPath, PathSubgraph,
    Row, RowError,
};
pub use normalize::{
    normalize_capability_name, parse_capability_list, parse_edge_list,
    ListFallback, Normalizer, ParseError,
};
pub use ingest::{
    ingest, IngestBuilder, IngestConfig, IngestMode, IngestResult, IngestStats,
    Ingestor, RelationMode, Relations, RowSchema,
};
pub use store::{GraphStore, InMemoryCapabilityGraph, Neighbor};
pub use finder::{search_paths, PathFinder, SearchOutcome, SearchReport, SearchToken};
pub use exploration::{
    compute_view, compute_full_view, related_capabilities,
    ExplorationState, GraphView, ViewStats,
};
pub use policy::{ExplorationPolicy, SearchPolicy, ViewMode};
pub use session::{Session, SessionConfig};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};

/// Version of the serialized ingestion result layout.
pub const CAPABILITY_GRAPH_SCHEMA_VERSION: &str = "1.0.0";

/// Default search policy version.
pub const DEFAULT_SEARCH_POLICY_VERSION: &str = "path_search_v1";
