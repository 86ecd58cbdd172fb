//! Core types for the capability graph.

pub mod capability;
pub mod edge;
pub mod path;
pub mod row;

pub use capability::{
    CapabilityId, PaperReference, Evidence, FrequencyTier,
    HIGH_FREQUENCY_THRESHOLD, MEDIUM_FREQUENCY_THRESHOLD,
};
pub use edge::{Edge, PairEdge, PairKey, Link, PAIR_KEY_SEPARATOR};
pub use path::{PathStep, CapabilityPath, PathSubgraph};
pub use row::{Row, RowError};
