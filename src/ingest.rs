//! Ingestion pipeline: raw rows to capability statistics and relations.
//!
//! ## Pipeline
//!
//! ```text
//! rows → IngestBuilder::add_row (per row, recoverable) → IngestBuilder::finish → IngestResult
//! ```
//!
//! The builder is the only mutable state and lives for exactly one
//! [`Ingestor::ingest`] call. The frozen [`IngestResult`] is immutable.
//!
//! ## Relation modes
//!
//! - **Directed**: rows carry an explicit edge cell (`[['a', 'b'], ...]`);
//!   every observation is merged into one [`Edge`] per ordered pair.
//! - **CoOccurrence**: no edge cell; every unordered pair of distinct
//!   capabilities on the same row becomes one [`PairEdge`], keyed by its two
//!   endpoints.
//!
//! Exactly one mode is active per result.
//!
//! ## Failure model
//!
//! A bad field never aborts ingestion. It is logged, counted in
//! [`IngestStats::skipped_fields`], and that field's contribution is dropped.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use crate::normalize::Normalizer;
use crate::types::{
    CapabilityId, Edge, Link, PairEdge, PairKey, PaperReference, Row, RowError,
};

/// Relation mode of an ingestion result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationMode {
    /// Explicit directed edges.
    Directed,
    /// Inferred undirected co-occurrence.
    CoOccurrence,
}

impl fmt::Display for RelationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directed => write!(f, "directed"),
            Self::CoOccurrence => write!(f, "co_occurrence"),
        }
    }
}

/// Requested relation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestMode {
    /// Directed if any row carries the edge field, co-occurrence otherwise.
    #[default]
    Auto,
    /// Always directed.
    Directed,
    /// Always co-occurrence.
    CoOccurrence,
}

impl IngestMode {
    /// Resolve against a concrete row set.
    pub fn resolve(self, rows: &[Row], schema: &RowSchema) -> RelationMode {
        match self {
            Self::Directed => RelationMode::Directed,
            Self::CoOccurrence => RelationMode::CoOccurrence,
            Self::Auto => {
                if rows.iter().any(|r| r.has_field(&schema.edge_field)) {
                    RelationMode::Directed
                } else {
                    RelationMode::CoOccurrence
                }
            }
        }
    }
}

/// Field names of the source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSchema {
    /// Paper identifier fields, in order of preference.
    pub paper_fields: Vec<String>,
    /// Paper URL field.
    pub url_field: String,
    /// Capability list field.
    pub capability_field: String,
    /// Explicit edge list field.
    pub edge_field: String,
}

impl Default for RowSchema {
    fn default() -> Self {
        Self {
            paper_fields: vec!["paper_name".to_string(), "actual_file_name".to_string()],
            url_field: "url".to_string(),
            capability_field: "capability".to_string(),
            edge_field: "Edges".to_string(),
        }
    }
}

/// Ingestion configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestConfig {
    /// Source field names.
    pub schema: RowSchema,
    /// Relation mode.
    pub mode: IngestMode,
    /// Cell parser.
    pub normalizer: Normalizer,
}

/// Counters collected during one ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestStats {
    /// Rows consumed.
    pub total_rows: usize,
    /// Rows with a non-empty edge cell.
    pub rows_with_edges: usize,
    /// Directed observations before merging.
    pub raw_edge_observations: usize,
    /// Distinct relations after merging (edges or pairs).
    pub merged_relations: usize,
    /// Distinct capabilities.
    pub capability_count: usize,
    /// Fields dropped because they were unusable.
    pub skipped_fields: usize,
}

/// Relations of an ingestion result; one variant per mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Relations {
    /// Directed edges.
    #[serde(rename_all = "camelCase")]
    Directed {
        /// Merged edges, ordered by (source, target).
        edges: Vec<Edge>,
        /// First URL seen per capability.
        capability_urls: BTreeMap<CapabilityId, String>,
    },
    /// Co-occurrence pairs.
    #[serde(rename_all = "camelCase")]
    CoOccurrence {
        /// Pair key to co-mentioning paper names.
        capability_pair_map: BTreeMap<PairKey, BTreeSet<String>>,
        /// Pairs with their endpoints, ordered by (a, b). Traversal reads
        /// these, never the keys.
        capability_pairs: Vec<PairEdge>,
    },
}

impl Relations {
    /// Mode of these relations.
    pub fn mode(&self) -> RelationMode {
        match self {
            Self::Directed { .. } => RelationMode::Directed,
            Self::CoOccurrence { .. } => RelationMode::CoOccurrence,
        }
    }

    /// Number of distinct relations.
    pub fn len(&self) -> usize {
        match self {
            Self::Directed { edges, .. } => edges.len(),
            Self::CoOccurrence { capability_pairs, .. } => capability_pairs.len(),
        }
    }

    /// Whether there are no relations.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single directed observation, before merging.
#[derive(Debug, Clone)]
struct EdgeObservation {
    source: CapabilityId,
    target: CapabilityId,
    paper: Option<String>,
    url: Option<String>,
}

/// Mutable accumulator for one ingestion.
#[derive(Debug)]
pub struct IngestBuilder {
    schema: RowSchema,
    normalizer: Normalizer,
    mode: RelationMode,
    capability_stats: BTreeMap<CapabilityId, u64>,
    paper_capability_map: BTreeMap<CapabilityId, Vec<PaperReference>>,
    capability_urls: BTreeMap<CapabilityId, String>,
    observations: Vec<EdgeObservation>,
    pairs: BTreeMap<(CapabilityId, CapabilityId), PairEdge>,
    stats: IngestStats,
}

impl IngestBuilder {
    /// Create a builder for a resolved mode.
    pub fn new(config: &IngestConfig, mode: RelationMode) -> Self {
        Self {
            schema: config.schema.clone(),
            normalizer: config.normalizer,
            mode,
            capability_stats: BTreeMap::new(),
            paper_capability_map: BTreeMap::new(),
            capability_urls: BTreeMap::new(),
            observations: Vec::new(),
            pairs: BTreeMap::new(),
            stats: IngestStats::default(),
        }
    }

    /// Fold one row into the accumulator.
    pub fn add_row(&mut self, row: &Row) {
        self.stats.total_rows += 1;
        let row_index = self.stats.total_rows - 1;

        let paper = row.first_label(&self.schema.paper_fields);
        let url = row.label(&self.schema.url_field);

        let capabilities = match self.capabilities_of(row) {
            Ok(caps) => caps,
            Err(e) => {
                self.skip(row_index, &e);
                Vec::new()
            }
        };

        for id in &capabilities {
            self.record_capability(id, paper.as_deref(), url.as_deref());
        }

        match self.mode {
            RelationMode::Directed => {
                if let Err(e) = self.record_edges(row, paper.as_deref(), url.as_deref()) {
                    self.skip(row_index, &e);
                }
            }
            RelationMode::CoOccurrence => {
                self.record_pairs(&capabilities, paper.as_deref());
            }
        }
    }

    fn skip(&mut self, row_index: usize, error: &RowError) {
        self.stats.skipped_fields += 1;
        tracing::warn!(row = row_index, error = %error, "skipping unusable field");
    }

    /// Distinct normalized capabilities of a row, in first-seen order.
    fn capabilities_of(&self, row: &Row) -> Result<Vec<CapabilityId>, RowError> {
        let Some(cell) = row.text(&self.schema.capability_field)? else {
            return Ok(Vec::new());
        };

        let mut seen = BTreeSet::new();
        Ok(self
            .normalizer
            .capability_list(cell)
            .iter()
            .filter_map(|raw| CapabilityId::normalized(raw))
            .filter(|id| seen.insert(id.clone()))
            .collect())
    }

    fn record_capability(&mut self, id: &CapabilityId, paper: Option<&str>, url: Option<&str>) {
        *self.capability_stats.entry(id.clone()).or_insert(0) += 1;

        let papers = self.paper_capability_map.entry(id.clone()).or_default();
        if let Some(name) = paper {
            if !papers.iter().any(|p| p.name == name) {
                papers.push(PaperReference::new(name, url.map(str::to_string)));
            }
        }

        if let Some(url) = url {
            self.capability_urls
                .entry(id.clone())
                .or_insert_with(|| url.to_string());
        }
    }

    fn record_edges(
        &mut self,
        row: &Row,
        paper: Option<&str>,
        url: Option<&str>,
    ) -> Result<(), RowError> {
        let Some(cell) = row.text(&self.schema.edge_field)? else {
            return Ok(());
        };
        self.stats.rows_with_edges += 1;

        for (source, target) in self.normalizer.edge_list(cell) {
            let (Some(source), Some(target)) =
                (CapabilityId::normalized(&source), CapabilityId::normalized(&target))
            else {
                continue;
            };
            if source == target {
                continue;
            }
            self.observations.push(EdgeObservation {
                source,
                target,
                paper: paper.map(str::to_string),
                url: url.map(str::to_string),
            });
        }
        Ok(())
    }

    fn record_pairs(&mut self, capabilities: &[CapabilityId], paper: Option<&str>) {
        for (i, a) in capabilities.iter().enumerate() {
            for b in &capabilities[i + 1..] {
                let pair = PairEdge::new(a.clone(), b.clone());
                let pair = self
                    .pairs
                    .entry((pair.a.clone(), pair.b.clone()))
                    .or_insert(pair);
                if let Some(name) = paper {
                    pair.papers.insert(name.to_string());
                }
            }
        }
    }

    /// Freeze into an immutable result.
    pub fn finish(mut self) -> IngestResult {
        self.stats.raw_edge_observations = self.observations.len();

        let relations = match self.mode {
            RelationMode::Directed => {
                let mut merged: BTreeMap<(CapabilityId, CapabilityId), Edge> = BTreeMap::new();
                for obs in self.observations {
                    let edge = merged
                        .entry((obs.source.clone(), obs.target.clone()))
                        .or_insert_with(|| Edge::new(obs.source, obs.target));
                    if let Some(name) = obs.paper.as_deref() {
                        edge.papers.insert(name, obs.url.as_deref());
                    }
                }

                // Edge endpoints always have a stats entry, even if no
                // capability cell mentioned them.
                for (source, target) in merged.keys() {
                    self.capability_stats.entry(source.clone()).or_insert(0);
                    self.capability_stats.entry(target.clone()).or_insert(0);
                }

                Relations::Directed {
                    edges: merged.into_values().collect(),
                    capability_urls: self.capability_urls,
                }
            }
            RelationMode::CoOccurrence => {
                let capability_pairs: Vec<PairEdge> = self.pairs.into_values().collect();
                let mut capability_pair_map: BTreeMap<PairKey, BTreeSet<String>> = BTreeMap::new();
                for pair in &capability_pairs {
                    capability_pair_map
                        .entry(pair.key())
                        .or_default()
                        .extend(pair.papers.iter().cloned());
                }
                Relations::CoOccurrence {
                    capability_pair_map,
                    capability_pairs,
                }
            }
        };

        self.stats.merged_relations = relations.len();
        self.stats.capability_count = self.capability_stats.len();

        IngestResult {
            capability_stats: self.capability_stats,
            paper_capability_map: self.paper_capability_map,
            relations,
            stats: self.stats,
        }
    }
}

/// Frozen output of one ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResult {
    capability_stats: BTreeMap<CapabilityId, u64>,
    paper_capability_map: BTreeMap<CapabilityId, Vec<PaperReference>>,
    #[serde(flatten)]
    relations: Relations,
    #[serde(rename = "ingestStats")]
    stats: IngestStats,
}

/// Fingerprint input: only order-independent content.
#[derive(Serialize)]
struct FingerprintInput<'a> {
    mode: RelationMode,
    capability_stats: &'a BTreeMap<CapabilityId, u64>,
    relations: Vec<(&'a str, &'a str, Vec<&'a str>)>,
}

impl IngestResult {
    /// An empty directed result.
    pub fn empty() -> Self {
        Self {
            capability_stats: BTreeMap::new(),
            paper_capability_map: BTreeMap::new(),
            relations: Relations::Directed {
                edges: Vec::new(),
                capability_urls: BTreeMap::new(),
            },
            stats: IngestStats::default(),
        }
    }

    /// Capability id to frequency.
    pub fn capability_stats(&self) -> &BTreeMap<CapabilityId, u64> {
        &self.capability_stats
    }

    /// Frequency of a capability (0 if unknown).
    pub fn frequency(&self, id: &str) -> u64 {
        self.capability_stats.get(id).copied().unwrap_or(0)
    }

    /// Capability id to the papers referencing it.
    pub fn paper_capability_map(&self) -> &BTreeMap<CapabilityId, Vec<PaperReference>> {
        &self.paper_capability_map
    }

    /// Papers referencing a capability, in first-seen order.
    pub fn papers_for(&self, id: &str) -> &[PaperReference] {
        self.paper_capability_map
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First URL seen for a capability (directed mode only).
    pub fn capability_url(&self, id: &str) -> Option<&str> {
        match &self.relations {
            Relations::Directed { capability_urls, .. } => {
                capability_urls.get(id).map(String::as_str)
            }
            Relations::CoOccurrence { .. } => None,
        }
    }

    /// Relations in whichever mode is active.
    pub fn relations(&self) -> &Relations {
        &self.relations
    }

    /// Active relation mode.
    pub fn mode(&self) -> RelationMode {
        self.relations.mode()
    }

    /// Directed edges (empty in co-occurrence mode).
    pub fn edges(&self) -> &[Edge] {
        match &self.relations {
            Relations::Directed { edges, .. } => edges,
            Relations::CoOccurrence { .. } => &[],
        }
    }

    /// Co-occurrence pairs (empty in directed mode).
    pub fn capability_pairs(&self) -> &[PairEdge] {
        match &self.relations {
            Relations::CoOccurrence { capability_pairs, .. } => capability_pairs,
            Relations::Directed { .. } => &[],
        }
    }

    /// Pair map keyed by [`PairKey`] (co-occurrence mode only).
    pub fn capability_pair_map(&self) -> Option<&BTreeMap<PairKey, BTreeSet<String>>> {
        match &self.relations {
            Relations::CoOccurrence { capability_pair_map, .. } => Some(capability_pair_map),
            Relations::Directed { .. } => None,
        }
    }

    /// Every relation as a borrowed link, in key order.
    pub fn links(&self) -> Vec<Link<'_>> {
        match &self.relations {
            Relations::Directed { edges, .. } => edges
                .iter()
                .map(|e| Link {
                    key: e.key(),
                    source: e.source.as_str(),
                    target: e.target.as_str(),
                    strength: e.strength(),
                })
                .collect(),
            Relations::CoOccurrence { capability_pairs, .. } => capability_pairs
                .iter()
                .map(|pair| Link {
                    key: pair.key(),
                    source: pair.a.as_str(),
                    target: pair.b.as_str(),
                    strength: pair.papers.len(),
                })
                .collect(),
        }
    }

    /// Capabilities sorted by frequency descending, ties by id.
    pub fn ranked_capabilities(&self) -> Vec<(&CapabilityId, u64)> {
        let mut ranked: Vec<_> = self
            .capability_stats
            .iter()
            .map(|(id, count)| (id, *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }

    /// Counters from the ingestion run.
    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    /// Whether no capability was found.
    pub fn is_empty(&self) -> bool {
        self.capability_stats.is_empty()
    }

    /// Deterministic content fingerprint.
    ///
    /// Covers the mode, capability frequencies, relation endpoints and
    /// paper names. Row order does not affect it.
    pub fn fingerprint(&self) -> String {
        let relations: Vec<(&str, &str, Vec<&str>)> = match &self.relations {
            Relations::Directed { edges, .. } => edges
                .iter()
                .map(|e| (e.source.as_str(), e.target.as_str(), e.papers.names().collect()))
                .collect(),
            Relations::CoOccurrence { capability_pairs, .. } => capability_pairs
                .iter()
                .map(|p| (p.a.as_str(), p.b.as_str(), p.papers.iter().map(String::as_str).collect()))
                .collect(),
        };
        canonical_hash_hex(&FingerprintInput {
            mode: self.mode(),
            capability_stats: &self.capability_stats,
            relations,
        })
    }
}

/// Runs ingestion with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Ingestor {
    config: IngestConfig,
}

impl Ingestor {
    /// Create an ingestor.
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Ingest a finite row sequence.
    pub fn ingest(&self, rows: &[Row]) -> IngestResult {
        let mode = self.config.mode.resolve(rows, &self.config.schema);
        let mut builder = IngestBuilder::new(&self.config, mode);
        for row in rows {
            builder.add_row(row);
        }
        let result = builder.finish();

        let stats = result.stats();
        tracing::info!(
            mode = %mode,
            total_rows = stats.total_rows,
            rows_with_edges = stats.rows_with_edges,
            raw_edge_observations = stats.raw_edge_observations,
            merged_relations = stats.merged_relations,
            capabilities = stats.capability_count,
            skipped_fields = stats.skipped_fields,
            "ingestion complete"
        );
        result
    }
}

/// Ingest rows with the default configuration.
pub fn ingest(rows: &[Row]) -> IngestResult {
    Ingestor::default().ingest(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(paper: &str, caps: &str, edges: Option<&str>) -> Row {
        let mut r = Row::from_pairs([("paper_name", json!(paper)), ("capability", json!(caps))]);
        if let Some(e) = edges {
            r.set("Edges", json!(e));
        }
        r
    }

    #[test]
    fn test_frequency_and_paper_dedup() {
        let rows = vec![
            row("p1", "['NLP', 'Reasoning']", None),
            row("p1", "['nlp']", None),
            row("p2", "'NLP Capability'", None),
        ];
        let result = ingest(&rows);

        assert_eq!(result.frequency("nlp"), 3);
        assert_eq!(result.frequency("reasoning"), 1);
        let papers: Vec<_> = result.papers_for("nlp").iter().map(|p| p.name.as_str()).collect();
        assert_eq!(papers, vec!["p1", "p2"]);
    }

    #[test]
    fn test_duplicate_capability_in_row_counts_once() {
        let result = ingest(&[row("p1", "['a', 'A', 'a capability']", None)]);
        assert_eq!(result.frequency("a"), 1);
    }

    #[test]
    fn test_auto_mode_directed_when_edge_field_present() {
        let rows = vec![
            row("p1", "['a', 'b']", Some("[['a', 'b']]")),
            row("p2", "['a']", None),
        ];
        let result = ingest(&rows);
        assert_eq!(result.mode(), RelationMode::Directed);
        assert_eq!(result.edges().len(), 1);
    }

    #[test]
    fn test_auto_mode_co_occurrence_without_edge_field() {
        let rows = vec![row("p1", "['a', 'b', 'c']", None), row("p2", "['b', 'a']", None)];
        let result = ingest(&rows);

        assert_eq!(result.mode(), RelationMode::CoOccurrence);
        let pairs = result.capability_pairs();
        assert_eq!(pairs.len(), 3);
        let ab = &pairs[0];
        assert_eq!((ab.a.as_str(), ab.b.as_str()), ("a", "b"));
        assert_eq!(ab.papers.iter().collect::<Vec<_>>(), vec!["p1", "p2"]);
    }

    #[test]
    fn test_edges_merge_papers_by_name() {
        let mut r1 = row("p1", "a", Some("[['A', 'B']]"));
        r1.set("url", json!("http://first"));
        let mut r2 = row("p1", "a", Some("A, B"));
        r2.set("url", json!("http://second"));
        let r3 = row("p2", "a", Some("[['a capability', 'b']]"));

        let result = ingest(&[r1, r2, r3]);
        let edges = result.edges();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].strength(), 2);
        let refs = edges[0].papers.to_references();
        assert_eq!(refs[0].url.as_deref(), Some("http://first"));
        assert_eq!(result.stats().raw_edge_observations, 3);
    }

    #[test]
    fn test_edge_endpoints_get_stats_entries() {
        let result = ingest(&[row("p1", "x", Some("[['a', 'b']]"))]);
        assert_eq!(result.frequency("a"), 0);
        assert!(result.capability_stats().contains_key("a"));
        assert!(result.capability_stats().contains_key("b"));
    }

    #[test]
    fn test_bad_field_does_not_abort() {
        let bad = Row::from_pairs([("paper_name", json!("p0")), ("capability", json!(7)), ("Edges", json!(["a"]))]);
        let rows = vec![bad, row("p1", "['a']", Some("[['a', 'b']]"))];
        let result = ingest(&rows);

        assert_eq!(result.stats().total_rows, 2);
        assert_eq!(result.stats().skipped_fields, 2);
        assert_eq!(result.frequency("a"), 1);
        assert_eq!(result.edges().len(), 1);
    }

    #[test]
    fn test_missing_paper_still_counts_capability() {
        let r = Row::from_pairs([("capability", json!("planning"))]);
        let result = ingest(&[r]);
        assert_eq!(result.frequency("planning"), 1);
        assert!(result.papers_for("planning").is_empty());
    }

    #[test]
    fn test_alternate_paper_field_and_url() {
        let r = Row::from_pairs([
            ("actual_file_name", json!("ACL1_x.txt")),
            ("url", json!("http://x")),
            ("capability", json!("planning")),
            ("Edges", json!("")),
        ]);
        let result = ingest(&[r]);
        assert_eq!(result.papers_for("planning")[0].name, "ACL1_x.txt");
        assert_eq!(result.capability_url("planning"), Some("http://x"));
        assert_eq!(result.stats().rows_with_edges, 0);
    }

    #[test]
    fn test_ranked_capabilities() {
        let rows = vec![
            row("p1", "['b', 'a']", None),
            row("p2", "['b', 'c']", None),
        ];
        let result = ingest(&rows);
        let ranked: Vec<_> = result.ranked_capabilities().into_iter().map(|(id, n)| (id.as_str(), n)).collect();
        assert_eq!(ranked, vec![("b", 2), ("a", 1), ("c", 1)]);
    }

    #[test]
    fn test_fingerprint_ignores_row_order() {
        let rows = vec![
            row("p1", "['a', 'b']", Some("[['a', 'b'], ['b', 'c']]")),
            row("p2", "['c']", Some("[['a', 'b']]")),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();

        assert_eq!(ingest(&rows).fingerprint(), ingest(&reversed).fingerprint());
    }

    #[test]
    fn test_serialized_shape_directed() {
        let result = ingest(&[row("p1", "a", Some("[['a', 'b']]"))]);
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("capabilityStats").is_some());
        assert!(json.get("paperCapabilityMap").is_some());
        assert_eq!(json["edges"][0]["source"], "a");
        assert_eq!(json["edges"][0]["papers"][0]["name"], "p1");
        assert!(json.get("capabilityPairMap").is_none());
        assert!(json.get("capabilityPairs").is_none());
    }

    #[test]
    fn test_serialized_shape_co_occurrence() {
        let result = ingest(&[row("p1", "['a', 'b']", None)]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["capabilityPairMap"]["a|||b"], json!(["p1"]));
        assert_eq!(json["capabilityPairs"][0]["a"], "a");
        assert_eq!(json["capabilityPairs"][0]["b"], "b");
        assert_eq!(json["capabilityPairs"][0]["papers"], json!(["p1"]));
        assert!(json.get("edges").is_none());
    }

    #[test]
    fn test_pair_endpoints_survive_separator_in_names() {
        let result = ingest(&[row("p1", "['a|', 'b']", None)]);

        let pair = &result.capability_pairs()[0];
        assert_eq!((pair.a.as_str(), pair.b.as_str()), ("a|", "b"));
        for link in result.links() {
            assert!(result.capability_stats().contains_key(link.source));
            assert!(result.capability_stats().contains_key(link.target));
        }
    }

    #[test]
    fn test_distinct_pairs_with_colliding_keys_stay_apart() {
        let rows = vec![row("p1", "['a|', 'b']", None), row("p2", "['a', '|b']", None)];
        let result = ingest(&rows);

        assert_eq!(result.capability_pairs().len(), 2);
        assert_ne!(
            ingest(&rows[..1]).fingerprint(),
            ingest(&rows[1..]).fingerprint()
        );
    }
}
