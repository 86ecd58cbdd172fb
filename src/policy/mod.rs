//! Search and view policy definitions.

pub mod search;
pub mod exploration;

pub use search::SearchPolicy;
pub use exploration::{ExplorationPolicy, ViewMode};

/// Read and parse an environment variable, falling back to `default`.
pub(crate) fn env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key = key, value = %raw, default = %default, "unparsable setting, using default");
            default
        }),
        Err(_) => default,
    }
}
