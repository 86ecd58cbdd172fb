//! Capability Graph command-line front end
//!
//! Loads a JSON array of row objects, prints the ingestion summary, the
//! ranked capabilities and the first exploration view, and optionally runs
//! a path search between two capabilities. Results go to stdout as JSON;
//! logs go to stderr.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `CAPGRAPH_MAX_PATHS`, `CAPGRAPH_MAX_DEPTH`, `CAPGRAPH_TIMEOUT_MS`,
//!   `CAPGRAPH_DEFER_MS`: path search policy
//! - `CAPGRAPH_MIN_FREQUENCY`, `CAPGRAPH_MIN_CONNECTIONS`, `CAPGRAPH_MODE`:
//!   view thresholds and mode
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! ## Usage
//!
//! ```bash
//! capgraph rows.json
//! capgraph rows.json "natural language understanding" reasoning
//! ```

use std::path::PathBuf;

use serde_json::json;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use capability_graph::normalize::normalize_capability_name;
use capability_graph::{FrequencyTier, Row, Session, SessionConfig, CAPABILITY_GRAPH_SCHEMA_VERSION};

/// Failures of the command-line front end.
#[derive(Debug, thiserror::Error)]
enum CliError {
    /// Wrong arguments.
    #[error("usage: capgraph <rows.json> [start end]")]
    Usage,
    /// Row file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Row file is not a JSON array of objects.
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Output could not be encoded.
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Initialize the tracing subscriber with JSON or pretty format, on stderr
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "capgraph=info,capability_graph=info".into());

    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .flatten_event(true),
            )
            .init();
    }
}

fn read_rows(path: PathBuf) -> Result<Vec<Row>, CliError> {
    let text = std::fs::read_to_string(&path).map_err(|source| CliError::Read {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Decode { path, source })
}

async fn run() -> Result<(), CliError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (path, endpoints) = match args.as_slice() {
        [path] => (PathBuf::from(path), None),
        [path, start, end] => (
            PathBuf::from(path),
            Some((normalize_capability_name(start), normalize_capability_name(end))),
        ),
        _ => return Err(CliError::Usage),
    };

    let config = SessionConfig::from_env();
    info!(
        search_policy = %config.search.policy_id(),
        params_hash = %config.search.params_hash(),
        mode = %config.exploration.mode,
        "Starting capgraph"
    );

    let rows = read_rows(path)?;
    let session = Session::new(config);
    let dataset = session.load(&rows);

    let ranked: Vec<_> = dataset
        .ranked_capabilities()
        .into_iter()
        .map(|(id, count)| json!({ "id": id, "count": count, "tier": FrequencyTier::of(count).to_string() }))
        .collect();

    let mut output = json!({
        "schemaVersion": CAPABILITY_GRAPH_SCHEMA_VERSION,
        "fingerprint": dataset.fingerprint(),
        "stats": dataset.stats(),
        "capabilities": ranked,
        "view": session.view(),
    });

    if let Some((start, end)) = endpoints {
        let report = session.find_paths(&start, &end).await;
        output["search"] = serde_json::to_value(&report)?;
        output["pathSubgraph"] = serde_json::to_value(session.path_subgraph())?;
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "capgraph failed");
        eprintln!("{e}");
        std::process::exit(1);
    }
}
