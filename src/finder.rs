//! Deterministic path finder.
//!
//! Finds a shortest path between two capabilities, then a bounded set of
//! alternative simple paths, under cooperative cancellation and a
//! wall-clock timeout.
//!
//! ## Algorithm
//!
//! 1. Breadth-first search from `start`. A node is enqueued at most once,
//!    partial paths stop growing at `bfs_max_nodes` nodes, and the search
//!    gives up after `bfs_max_iterations` dequeues. The path found is the
//!    first result.
//! 2. If a shortest path exists and `max_paths` is not reached, a
//!    depth-first search runs from each direct neighbor of `start`, bounded
//!    by `min(max_depth, shortest.len() + 2)` nodes. Completed paths are
//!    accepted only if their node signature is new.
//! 3. Results are returned in discovery order, at most `max_paths`.
//!
//! ## Interruption
//!
//! Cancellation and timeout share one [`SearchToken`], checked on every BFS
//! iteration and every DFS call. An interrupted search returns whatever it
//! has collected so far.
//!
//! ## Concurrency
//!
//! A [`PathFinder`] runs at most one search at a time. A call that arrives
//! while another is in flight returns an empty [`SearchOutcome::Busy`]
//! report immediately. Each search works on the graph snapshot taken when
//! it started, so replacing the graph never disturbs a running search.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::policy::SearchPolicy;
use crate::store::GraphStore;
use crate::types::{CapabilityPath, PathStep};
use crate::types::path::signature_of;

/// Why a search stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    /// The caller cancelled.
    Cancelled,
    /// The deadline passed.
    TimedOut,
}

/// Cooperative stop signal for one search.
///
/// Cancellation is an explicit flag set from outside; timeout is the same
/// token reporting itself stopped once its deadline has passed.
#[derive(Debug, Clone)]
pub struct SearchToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl SearchToken {
    /// Token that stops when `cancelled` is set or `timeout` elapses.
    pub fn new(cancelled: Arc<AtomicBool>, timeout: Duration) -> Self {
        Self {
            cancelled,
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Token with no deadline.
    pub fn unbounded() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: None,
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Current interruption, if any. Cancellation wins over timeout.
    pub fn interruption(&self) -> Option<Interruption> {
        if self.cancelled.load(Ordering::Acquire) {
            return Some(Interruption::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Interruption::TimedOut),
            _ => None,
        }
    }
}

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Search ran to completion.
    Completed,
    /// Endpoints are not connected within the BFS bound.
    NoPath,
    /// Another search was in flight; nothing was done.
    Busy,
    /// Start or end is not in the graph.
    MissingEndpoint,
    /// The graph has no relations.
    EmptyGraph,
    /// Cancelled by the caller.
    Cancelled,
    /// Deadline passed.
    TimedOut,
    /// BFS dequeue cap reached before the target.
    IterationLimit,
}

impl SearchOutcome {
    /// Whether the search was cut short by its token.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Cancelled | Self::TimedOut)
    }
}

impl From<Interruption> for SearchOutcome {
    fn from(i: Interruption) -> Self {
        match i {
            Interruption::Cancelled => Self::Cancelled,
            Interruption::TimedOut => Self::TimedOut,
        }
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Completed => "completed",
            Self::NoPath => "no_path",
            Self::Busy => "busy",
            Self::MissingEndpoint => "missing_endpoint",
            Self::EmptyGraph => "empty_graph",
            Self::Cancelled => "cancelled",
            Self::TimedOut => "timed_out",
            Self::IterationLimit => "iteration_limit",
        };
        f.write_str(s)
    }
}

/// Paths found plus how the search ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Paths in discovery order, shortest first.
    pub paths: Vec<CapabilityPath>,
    /// How the search ended.
    pub outcome: SearchOutcome,
    /// Time spent in the search body.
    pub elapsed_ms: u64,
}

impl SearchReport {
    fn empty(outcome: SearchOutcome) -> Self {
        Self {
            paths: Vec::new(),
            outcome,
            elapsed_ms: 0,
        }
    }
}

enum Shortest {
    Found(Vec<PathStep>),
    Exhausted,
    IterationLimit,
    Interrupted,
}

/// State of one search over one graph snapshot.
struct Search<'a, S: GraphStore + ?Sized> {
    graph: &'a S,
    end: &'a str,
    policy: &'a SearchPolicy,
    token: &'a SearchToken,
    depth_bound: usize,
    paths: Vec<CapabilityPath>,
    signatures: BTreeSet<String>,
    interrupted: Option<Interruption>,
}

impl<'a, S: GraphStore + ?Sized> Search<'a, S> {
    fn check(&mut self) -> bool {
        if self.interrupted.is_none() {
            self.interrupted = self.token.interruption();
        }
        self.interrupted.is_some()
    }

    fn shortest(&mut self, start: &'a str) -> Shortest {
        let graph = self.graph;
        let mut queue: VecDeque<(&'a str, Vec<PathStep>)> = VecDeque::new();
        queue.push_back((start, vec![PathStep::start(start.into())]));
        let mut visited: BTreeSet<&'a str> = BTreeSet::from([start]);
        let mut iterations = 0;

        while !queue.is_empty() {
            if iterations >= self.policy.bfs_max_iterations {
                tracing::debug!(iterations, "BFS iteration cap reached");
                return Shortest::IterationLimit;
            }
            iterations += 1;

            if self.check() {
                return Shortest::Interrupted;
            }

            let Some((current, path)) = queue.pop_front() else {
                break;
            };

            if current == self.end && path.len() > 1 {
                return Shortest::Found(path);
            }

            if path.len() >= self.policy.bfs_max_nodes {
                continue;
            }

            for neighbor in graph.neighbors(current) {
                if visited.insert(neighbor.id.as_str()) {
                    let mut next = path.clone();
                    next.push(PathStep::via(neighbor.id.clone(), neighbor.papers.clone()));
                    queue.push_back((neighbor.id.as_str(), next));
                }
            }
        }
        Shortest::Exhausted
    }

    /// Returns `true` when the whole search must stop.
    fn dfs(&mut self, current: &'a str, path: &mut Vec<PathStep>, visited: &BTreeSet<&'a str>) -> bool {
        if self.check() {
            return true;
        }

        if path.len() > self.depth_bound {
            return false;
        }

        if current == self.end && path.len() > 1 {
            if self.signatures.insert(signature_of(path)) {
                self.paths.push(CapabilityPath::new(path.clone()));
            }
            return self.paths.len() >= self.policy.max_paths;
        }

        if visited.contains(current) {
            return false;
        }

        let mut branch = visited.clone();
        branch.insert(current);

        let graph = self.graph;
        for neighbor in graph.neighbors(current) {
            path.push(PathStep::via(neighbor.id.clone(), neighbor.papers.clone()));
            let stop = self.dfs(neighbor.id.as_str(), path, &branch);
            path.pop();
            if stop {
                return true;
            }
        }
        false
    }

    fn supplementary(&mut self, start: &'a str) {
        let graph = self.graph;
        let visited: BTreeSet<&'a str> = BTreeSet::from([start]);

        for neighbor in graph.neighbors(start) {
            let mut path = vec![
                PathStep::start(start.into()),
                PathStep::via(neighbor.id.clone(), neighbor.papers.clone()),
            ];
            if self.dfs(neighbor.id.as_str(), &mut path, &visited) {
                break;
            }
        }
    }
}

/// Run one search over a graph, without the single-flight guard.
///
/// Missing endpoints and an empty graph yield an empty report; they are
/// never errors.
pub fn search_paths<S: GraphStore + ?Sized>(
    graph: &S,
    start: &str,
    end: &str,
    policy: &SearchPolicy,
    token: &SearchToken,
) -> SearchReport {
    let started = Instant::now();

    if graph.edge_count() == 0 {
        return SearchReport::empty(SearchOutcome::EmptyGraph);
    }
    if !graph.contains(start) || !graph.contains(end) {
        tracing::debug!(start, end, "endpoint not in graph");
        return SearchReport::empty(SearchOutcome::MissingEndpoint);
    }

    let mut search = Search {
        graph,
        end,
        policy,
        token,
        depth_bound: policy.max_depth,
        paths: Vec::new(),
        signatures: BTreeSet::new(),
        interrupted: None,
    };

    let mut outcome = match search.shortest(start) {
        Shortest::Found(path) => {
            search.signatures.insert(signature_of(&path));
            search.depth_bound = policy.max_depth.min(path.len() + 2);
            search.paths.push(CapabilityPath::new(path));
            if search.paths.len() < policy.max_paths {
                search.supplementary(start);
            }
            SearchOutcome::Completed
        }
        Shortest::Exhausted => SearchOutcome::NoPath,
        Shortest::IterationLimit => SearchOutcome::IterationLimit,
        Shortest::Interrupted => SearchOutcome::Completed,
    };

    if let Some(interruption) = search.interrupted {
        tracing::info!(?interruption, found = search.paths.len(), "path search interrupted");
        outcome = interruption.into();
    }

    let mut paths = search.paths;
    paths.truncate(policy.max_paths);

    SearchReport {
        paths,
        outcome,
        elapsed_ms: started.elapsed().as_millis() as u64,
    }
}

/// Clears the in-flight flag when a search ends, however it ends.
struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Single-flight path finder over a replaceable graph snapshot.
pub struct PathFinder<S: GraphStore> {
    graph: RwLock<Arc<S>>,
    policy: RwLock<SearchPolicy>,
    searching: AtomicBool,
    cancel_flag: Mutex<Arc<AtomicBool>>,
}

impl<S: GraphStore> PathFinder<S> {
    /// Create a path finder.
    pub fn new(graph: Arc<S>, policy: SearchPolicy) -> Self {
        Self {
            graph: RwLock::new(graph),
            policy: RwLock::new(policy),
            searching: AtomicBool::new(false),
            cancel_flag: Mutex::new(Arc::new(AtomicBool::new(false))),
        }
    }

    /// Current graph snapshot.
    pub fn graph(&self) -> Arc<S> {
        self.graph.read().clone()
    }

    /// Replace the graph. Running searches keep their snapshot.
    pub fn replace_graph(&self, graph: Arc<S>) {
        *self.graph.write() = graph;
    }

    /// Current policy.
    pub fn policy(&self) -> SearchPolicy {
        self.policy.read().clone()
    }

    /// Replace the policy for subsequent searches.
    pub fn set_policy(&self, policy: SearchPolicy) {
        *self.policy.write() = policy;
    }

    /// Whether a search is in flight.
    pub fn is_searching(&self) -> bool {
        self.searching.load(Ordering::Acquire)
    }

    /// Ask the in-flight search to stop at its next check.
    ///
    /// Has no effect on searches started afterwards.
    pub fn cancel(&self) {
        self.cancel_flag.lock().store(true, Ordering::Release);
        tracing::info!("path search cancellation requested");
    }

    fn try_begin(&self) -> Option<(InFlight<'_>, Arc<AtomicBool>)> {
        self.searching
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        let cancelled = Arc::new(AtomicBool::new(false));
        *self.cancel_flag.lock() = cancelled.clone();
        Some((InFlight { flag: &self.searching }, cancelled))
    }

    fn run(graph: &S, policy: &SearchPolicy, start: &str, end: &str, cancelled: Arc<AtomicBool>) -> SearchReport {
        let token = SearchToken::new(cancelled, policy.timeout());

        tracing::info!(
            start,
            end,
            max_paths = policy.max_paths,
            max_depth = policy.max_depth,
            "path search started"
        );
        let report = search_paths(graph, start, end, policy, &token);
        tracing::info!(
            outcome = %report.outcome,
            paths = report.paths.len(),
            elapsed_ms = report.elapsed_ms,
            "path search finished"
        );
        report
    }

    /// Search immediately on the calling thread.
    pub fn search(&self, start: &str, end: &str) -> SearchReport {
        let Some((_in_flight, cancelled)) = self.try_begin() else {
            tracing::info!(start, end, "path search already in flight");
            return SearchReport::empty(SearchOutcome::Busy);
        };
        let (graph, policy) = (self.graph(), self.policy());
        Self::run(graph.as_ref(), &policy, start, end, cancelled)
    }

    /// Search after giving the host one scheduling turn.
    ///
    /// The graph snapshot and policy are taken first. The search body then
    /// waits `defer_ms` (or yields once when it is 0) and runs to completion
    /// without further suspension. A cancel during the wait stops the search
    /// at its first check.
    pub async fn find_paths_report(&self, start: &str, end: &str) -> SearchReport {
        let Some((_in_flight, cancelled)) = self.try_begin() else {
            tracing::info!(start, end, "path search already in flight");
            return SearchReport::empty(SearchOutcome::Busy);
        };

        let (graph, policy) = (self.graph(), self.policy());
        if policy.defer_ms == 0 {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(policy.defer()).await;
        }

        Self::run(graph.as_ref(), &policy, start, end, cancelled)
    }

    /// Paths from `start` to `end`, shortest first; empty on any early exit.
    pub async fn find_paths(&self, start: &str, end: &str) -> Vec<CapabilityPath> {
        self.find_paths_report(start, end).await.paths
    }
}
