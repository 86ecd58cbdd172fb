//! SearchPolicy v1: bounded shortest path plus supplementary simple paths.
//!
//! All parameters are integers so `params_hash` is stable across platforms.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use crate::canonical::canonical_hash_hex;
use crate::DEFAULT_SEARCH_POLICY_VERSION;
use super::env_or;

/// Path search policy version 1.
///
/// ## Parameters
///
/// - `max_paths`: Maximum number of paths returned
/// - `max_depth`: Node-count bound for supplementary paths
/// - `bfs_max_nodes`: Partial BFS paths are abandoned at this many nodes
/// - `bfs_max_iterations`: Dequeue cap for the shortest-path search
/// - `timeout_ms`: Wall-clock budget for one search
/// - `defer_ms`: Delay before the search body runs, giving the host a turn
///   to show a "searching" state (0 = a single cooperative yield)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPolicy {
    /// Policy version identifier.
    pub version: String,
    /// Maximum number of paths returned.
    pub max_paths: usize,
    /// Maximum nodes on a supplementary path.
    pub max_depth: usize,
    /// Maximum nodes on a shortest-path candidate.
    pub bfs_max_nodes: usize,
    /// Maximum BFS dequeue operations.
    pub bfs_max_iterations: usize,
    /// Search timeout in milliseconds.
    pub timeout_ms: u64,
    /// Deferral before the search body runs, in milliseconds.
    pub defer_ms: u64,
}

impl SearchPolicy {
    /// Get the policy ID.
    pub fn policy_id(&self) -> &str {
        &self.version
    }

    /// Deterministic hash of the policy parameters.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(self)
    }

    /// Search timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Deferral before the search body.
    pub fn defer(&self) -> Duration {
        Duration::from_millis(self.defer_ms)
    }

    /// Same policy with different result bounds.
    pub fn with_limits(mut self, max_paths: usize, max_depth: usize) -> Self {
        self.max_paths = max_paths;
        self.max_depth = max_depth;
        self
    }

    /// Build a policy from environment variables.
    ///
    /// Reads `CAPGRAPH_MAX_PATHS`, `CAPGRAPH_MAX_DEPTH`, `CAPGRAPH_TIMEOUT_MS`
    /// and `CAPGRAPH_DEFER_MS`. Unset or unparsable values keep the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_paths: env_or("CAPGRAPH_MAX_PATHS", defaults.max_paths),
            max_depth: env_or("CAPGRAPH_MAX_DEPTH", defaults.max_depth),
            timeout_ms: env_or("CAPGRAPH_TIMEOUT_MS", defaults.timeout_ms),
            defer_ms: env_or("CAPGRAPH_DEFER_MS", defaults.defer_ms),
            ..defaults
        }
    }

    /// Create an immediate policy for testing (no deferral).
    #[cfg(test)]
    pub fn immediate() -> Self {
        Self {
            defer_ms: 0,
            ..Self::default()
        }
    }
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            version: DEFAULT_SEARCH_POLICY_VERSION.to_string(),
            max_paths: 10,
            max_depth: 4,
            bfs_max_nodes: 5,
            bfs_max_iterations: 1000,
            timeout_ms: 5000,
            defer_ms: 100,
        }
    }
}
