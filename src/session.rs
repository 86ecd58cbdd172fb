//! Session state: the loaded dataset, its graph and the consumer's view.
//!
//! A [`Session`] is shared behind an `Arc` by whatever front end drives it.
//! Loading a dataset replaces the graph wholesale and resets exploration,
//! selection and the last search result. Searches already in flight keep
//! the graph snapshot they started with.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::exploration::{compute_subset_view, related_capabilities, ExplorationState, GraphView};
use crate::finder::{PathFinder, SearchOutcome, SearchReport};
use crate::ingest::{IngestConfig, IngestResult, Ingestor};
use crate::policy::{ExplorationPolicy, SearchPolicy};
use crate::store::InMemoryCapabilityGraph;
use crate::types::{CapabilityId, CapabilityPath, PathSubgraph, Row};

/// Maximum number of simultaneously selected capabilities.
pub const MAX_SELECTION: usize = 2;

/// Everything a session is configured with.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Ingestion settings.
    pub ingest: IngestConfig,
    /// Path search settings.
    pub search: SearchPolicy,
    /// View thresholds and mode.
    pub exploration: ExplorationPolicy,
}

impl SessionConfig {
    /// Policies from `CAPGRAPH_*` environment variables, default ingestion.
    pub fn from_env() -> Self {
        Self {
            ingest: IngestConfig::default(),
            search: SearchPolicy::from_env(),
            exploration: ExplorationPolicy::from_env(),
        }
    }
}

/// Owner of one dataset at a time.
pub struct Session {
    ingestor: Ingestor,
    dataset: RwLock<Arc<IngestResult>>,
    finder: PathFinder<InMemoryCapabilityGraph>,
    exploration: Mutex<ExplorationState>,
    selection: Mutex<Vec<CapabilityId>>,
    found: Mutex<Vec<CapabilityPath>>,
}

impl Session {
    /// Create a session with no dataset.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            ingestor: Ingestor::new(config.ingest),
            dataset: RwLock::new(Arc::new(IngestResult::empty())),
            finder: PathFinder::new(Arc::new(InMemoryCapabilityGraph::new()), config.search),
            exploration: Mutex::new(ExplorationState::new(config.exploration)),
            selection: Mutex::new(Vec::new()),
            found: Mutex::new(Vec::new()),
        }
    }

    /// Ingest rows and make them the current dataset.
    pub fn load(&self, rows: &[Row]) -> Arc<IngestResult> {
        let dataset = Arc::new(self.ingestor.ingest(rows));
        let graph = Arc::new(InMemoryCapabilityGraph::from_ingest(&dataset));

        *self.dataset.write() = dataset.clone();
        self.finder.replace_graph(graph);
        self.exploration.lock().reset();
        self.selection.lock().clear();
        self.found.lock().clear();

        tracing::info!(
            fingerprint = %dataset.fingerprint(),
            capabilities = dataset.capability_stats().len(),
            "dataset loaded"
        );
        dataset
    }

    /// Current dataset.
    pub fn dataset(&self) -> Arc<IngestResult> {
        self.dataset.read().clone()
    }

    /// Current graph snapshot.
    pub fn graph(&self) -> Arc<InMemoryCapabilityGraph> {
        self.finder.graph()
    }

    /// The path finder.
    pub fn finder(&self) -> &PathFinder<InMemoryCapabilityGraph> {
        &self.finder
    }

    /// Replace the search policy for later searches.
    pub fn set_search_policy(&self, policy: SearchPolicy) {
        self.finder.set_policy(policy);
    }

    // ── Paths ──────────────────────────────────────────────────────────

    /// Search for paths and remember them for [`path_subgraph`](Self::path_subgraph).
    ///
    /// A busy result leaves the remembered paths untouched.
    pub async fn find_paths(&self, start: &str, end: &str) -> SearchReport {
        let report = self.finder.find_paths_report(start, end).await;
        if report.outcome != SearchOutcome::Busy {
            *self.found.lock() = report.paths.clone();
        }
        report
    }

    /// Search between the two selected capabilities, if exactly two are selected.
    pub async fn find_selected_paths(&self) -> Option<SearchReport> {
        let (start, end) = match self.selection.lock().as_slice() {
            [a, b] => (a.clone(), b.clone()),
            _ => return None,
        };
        Some(self.find_paths(start.as_str(), end.as_str()).await)
    }

    /// Ask the in-flight search to stop.
    pub fn cancel_search(&self) {
        self.finder.cancel();
    }

    /// Whether a search is in flight.
    pub fn is_searching(&self) -> bool {
        self.finder.is_searching()
    }

    /// Paths from the last completed search.
    pub fn found_paths(&self) -> Vec<CapabilityPath> {
        self.found.lock().clone()
    }

    /// Nodes and directed steps of the last search's paths.
    pub fn path_subgraph(&self) -> PathSubgraph {
        PathSubgraph::from_paths(&self.found.lock())
    }

    // ── Exploration ────────────────────────────────────────────────────

    /// Mark a capability as expanded.
    pub fn expand(&self, id: &str) -> bool {
        self.exploration.lock().expand(CapabilityId::new(id))
    }

    /// View for the current exploration state.
    pub fn view(&self) -> GraphView {
        let dataset = self.dataset();
        self.exploration.lock().view(&dataset)
    }

    /// Copy of the exploration state.
    pub fn exploration(&self) -> ExplorationState {
        self.exploration.lock().clone()
    }

    /// Replace view thresholds; seed and expansions are kept.
    pub fn set_exploration_policy(&self, policy: ExplorationPolicy) {
        self.exploration.lock().set_policy(policy);
    }

    // ── Selection ──────────────────────────────────────────────────────

    /// Select or deselect a capability. Returns whether it is now selected.
    ///
    /// Selecting beyond [`MAX_SELECTION`] drops the oldest selection.
    pub fn toggle_selection(&self, id: &str) -> bool {
        let mut selection = self.selection.lock();
        if let Some(index) = selection.iter().position(|s| s.as_str() == id) {
            selection.remove(index);
            return false;
        }
        if selection.len() >= MAX_SELECTION {
            selection.remove(0);
        }
        selection.push(CapabilityId::new(id));
        true
    }

    /// Selected capabilities, oldest first.
    pub fn selection(&self) -> Vec<CapabilityId> {
        self.selection.lock().clone()
    }

    /// Drop the selection and the last search result.
    pub fn clear_selection(&self) {
        self.selection.lock().clear();
        self.found.lock().clear();
    }

    /// Whether anything is selected.
    pub fn has_selection(&self) -> bool {
        !self.selection.lock().is_empty()
    }

    /// Whether exactly two capabilities are selected.
    pub fn can_find_path(&self) -> bool {
        self.selection.lock().len() == MAX_SELECTION
    }

    /// Selection plus its direct neighbors in either direction.
    pub fn related(&self) -> BTreeSet<CapabilityId> {
        let selection = self.selection();
        if selection.is_empty() {
            return BTreeSet::new();
        }
        related_capabilities(&self.dataset(), &selection)
    }

    /// View restricted to [`related`](Self::related), or the regular view
    /// when nothing is selected.
    pub fn related_view(&self) -> GraphView {
        let related = self.related();
        if related.is_empty() {
            return self.view();
        }
        let policy = self.exploration.lock().policy().clone();
        compute_subset_view(&self.dataset(), &related, &policy)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::GraphStore;
    use serde_json::json;

    fn rows(edges: &str) -> Vec<Row> {
        vec![Row::from_pairs([
            ("paper_name", json!("p1")),
            ("capability", json!("['a', 'b', 'c']")),
            ("Edges", json!(edges)),
        ])]
    }

    fn session() -> Session {
        Session::new(SessionConfig {
            search: SearchPolicy::immediate(),
            ..SessionConfig::default()
        })
    }

    #[tokio::test]
    async fn test_load_and_search() {
        let s = session();
        s.load(&rows("[['a', 'b'], ['b', 'c']]"));

        let report = s.find_paths("a", "c").await;
        assert_eq!(report.outcome, SearchOutcome::Completed);
        assert_eq!(s.found_paths().len(), 1);

        let subgraph = s.path_subgraph();
        assert_eq!(subgraph.nodes.len(), 3);
        assert_eq!(subgraph.edges.len(), 2);
    }

    #[tokio::test]
    async fn test_load_resets_state() {
        let s = session();
        s.load(&rows("[['a', 'b']]"));
        s.view();
        s.expand("a");
        s.toggle_selection("a");
        s.find_paths("a", "b").await;

        s.load(&rows("[['b', 'c']]"));
        assert!(s.exploration().seed().is_none());
        assert!(s.exploration().expanded().is_empty());
        assert!(!s.has_selection());
        assert!(s.found_paths().is_empty());
        assert!(s.find_paths("a", "b").await.paths.is_empty());
    }

    #[tokio::test]
    async fn test_in_flight_search_keeps_snapshot() {
        let s = Session::new(SessionConfig {
            search: SearchPolicy {
                defer_ms: 50,
                ..SearchPolicy::default()
            },
            ..SessionConfig::default()
        });
        s.load(&rows("[['a', 'b']]"));

        let (report, _) = tokio::join!(s.find_paths("a", "b"), async {
            s.load(&rows("[['b', 'c']]"));
        });
        assert_eq!(report.paths.len(), 1);
        assert!(!s.graph().neighbors("b").is_empty());
    }

    #[tokio::test]
    async fn test_selection_toggle() {
        let s = session();
        s.load(&rows("[['a', 'b'], ['b', 'c']]"));

        assert!(s.toggle_selection("a"));
        assert!(!s.can_find_path());
        assert!(s.find_selected_paths().await.is_none());
        assert!(s.toggle_selection("c"));
        assert!(s.can_find_path());

        let report = s.find_selected_paths().await.unwrap();
        assert_eq!(report.paths[0].signature(), "a->b->c");

        assert!(s.toggle_selection("b"));
        let selected: Vec<_> = s.selection().iter().map(|id| id.to_string()).collect();
        assert_eq!(selected, vec!["c", "b"]);

        assert!(!s.toggle_selection("c"));
        assert_eq!(s.selection().len(), 1);
    }

    #[test]
    fn test_related_view() {
        let s = session();
        s.load(&rows("[['a', 'b'], ['b', 'c']]"));
        s.toggle_selection("a");

        let related: Vec<_> = s.related().into_iter().map(|id| id.to_string()).collect();
        assert_eq!(related, vec!["a", "b"]);
        assert_eq!(s.related_view().stats.edge_count, 1);

        s.clear_selection();
        assert_eq!(s.related_view().stats.node_count, 1);
    }
}
