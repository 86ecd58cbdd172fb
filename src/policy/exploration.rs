//! Thresholds and mode for view generation.

use std::fmt;

use serde::{Deserialize, Serialize};
use super::env_or;

/// How the view is revealed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Seed first, then grow by expansion.
    #[default]
    Exploration,
    /// Every node and edge that passes the thresholds.
    Full,
}

impl ViewMode {
    /// Parse view mode from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "exploration" | "explore" => Some(Self::Exploration),
            "full" | "all" => Some(Self::Full),
            _ => None,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exploration => write!(f, "exploration"),
            Self::Full => write!(f, "full"),
        }
    }
}

/// View thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationPolicy {
    /// Minimum frequency for a node to be a candidate.
    pub min_frequency: u64,
    /// Minimum evidence count for an edge to be drawn.
    pub min_connections: usize,
    /// Reveal mode.
    pub mode: ViewMode,
}

impl ExplorationPolicy {
    /// Build from environment variables.
    ///
    /// Reads `CAPGRAPH_MIN_FREQUENCY`, `CAPGRAPH_MIN_CONNECTIONS` and
    /// `CAPGRAPH_MODE` (`exploration` or `full`).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let mode = match std::env::var("CAPGRAPH_MODE") {
            Ok(raw) => ViewMode::from_str(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "CAPGRAPH_MODE not recognized, using default");
                defaults.mode
            }),
            Err(_) => defaults.mode,
        };
        Self {
            min_frequency: env_or("CAPGRAPH_MIN_FREQUENCY", defaults.min_frequency),
            min_connections: env_or("CAPGRAPH_MIN_CONNECTIONS", defaults.min_connections),
            mode,
        }
    }
}

impl Default for ExplorationPolicy {
    fn default() -> Self {
        Self {
            min_frequency: 1,
            min_connections: 0,
            mode: ViewMode::Exploration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_mode_from_str() {
        assert_eq!(ViewMode::from_str("FULL"), Some(ViewMode::Full));
        assert_eq!(ViewMode::from_str("explore"), Some(ViewMode::Exploration));
        assert_eq!(ViewMode::from_str("sideways"), None);
    }

    #[test]
    fn test_defaults_admit_everything_referenced() {
        let policy = ExplorationPolicy::default();
        assert_eq!(policy.min_frequency, 1);
        assert_eq!(policy.min_connections, 0);
        assert_eq!(policy.mode, ViewMode::Exploration);
    }
}
