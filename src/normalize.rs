//! Capability name normalization and field parsing.
//!
//! ## Purpose
//!
//! Source rows are spreadsheet cells written by hand. The same capability
//! shows up as `Reasoning`, `'reasoning'` or `reasoning capability`, and
//! list-valued cells are Python-style literals such as `['NLP', 'code']`.
//! This module turns those cells into canonical identifiers and lists.
//!
//! ## Canonical Name Specification
//!
//! ```text
//! normalize(raw) = trim(strip_suffix(collapse_ws(strip_quotes(lower(trim(raw))))))
//! ```
//!
//! Where:
//! - `strip_quotes`: remove every `'` and `"` character
//! - `collapse_ws`: runs of whitespace become a single space
//! - `strip_suffix`: remove trailing `capability` tokens (repeatedly)
//!
//! Normalization is idempotent.
//!
//! ## Pseudo-array decoding
//!
//! Bracket-delimited cells are decoded by swapping single quotes for double
//! quotes and parsing the result as JSON. That is a heuristic over untrusted
//! input; when it fails, a [`ListFallback`] decides what the cell means.

use std::sync::OnceLock;

use serde_json::Value;

/// Error decoding a bracket-delimited cell.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Cell is not of the form `[...]`.
    #[error("Value is not bracket-delimited")]
    NotBracketed,
    /// Cell looked like a list but did not decode.
    #[error("Pseudo-array decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// What a bracket-delimited capability cell means when it fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListFallback {
    /// Treat the whole cell as a single capability.
    #[default]
    WholeString,
    /// Strip the brackets, split on commas, trim quotes off each token.
    SplitOnComma,
}

/// Normalize a raw capability name to its identifier.
///
/// Returns an empty string for blank input.
///
/// # Example
///
/// ```rust
/// use capability_graph::normalize::normalize_capability_name;
///
/// assert_eq!(normalize_capability_name("  'Reasoning Capability' "), "reasoning");
/// assert_eq!(normalize_capability_name("Multi   Step\tPlanning"), "multi step planning");
/// ```
pub fn normalize_capability_name(raw: &str) -> String {
    static WHITESPACE: OnceLock<regex_lite::Regex> = OnceLock::new();
    static SUFFIX: OnceLock<regex_lite::Regex> = OnceLock::new();
    // `\s` is ASCII-only in regex-lite; the class adds the Unicode spaces.
    let whitespace = WHITESPACE.get_or_init(|| {
        regex_lite::Regex::new(
            r"[\s\u{85}\u{A0}\u{1680}\u{2000}-\u{200A}\u{2028}\u{2029}\u{202F}\u{205F}\u{3000}\u{FEFF}]+",
        )
        .expect("static pattern is valid")
    });
    let suffix = SUFFIX.get_or_init(|| {
        regex_lite::Regex::new(r"(?:capability\s*)+$").expect("static pattern is valid")
    });

    let lowered = raw.trim().to_lowercase();
    let unquoted: String = lowered.chars().filter(|c| *c != '\'' && *c != '"').collect();
    let collapsed = whitespace.replace_all(&unquoted, " ");

    suffix.replace(&collapsed, "").trim().to_string()
}

/// Whether a cell is of the form `[...]`, with no surrounding whitespace.
pub fn is_bracketed(raw: &str) -> bool {
    raw.len() >= 2 && raw.starts_with('[') && raw.ends_with(']')
}

/// Decode a bracket-delimited cell as a JSON list after quote substitution.
pub fn decode_pseudo_array(raw: &str) -> Result<Vec<Value>, ParseError> {
    if !is_bracketed(raw) {
        return Err(ParseError::NotBracketed);
    }
    let substituted = raw.replace('\'', "\"");
    Ok(serde_json::from_str::<Vec<Value>>(&substituted)?)
}

/// Text of a decoded list element: strings as-is, numbers rendered.
fn element_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Split on commas and trim surrounding quotes from each token.
fn split_quoted(inner: &str) -> Vec<String> {
    inner
        .split(',')
        .map(|token| {
            token
                .trim()
                .trim_start_matches(['\'', '"'])
                .trim_end_matches(['\'', '"'])
                .to_string()
        })
        .collect()
}

/// Cell parser with a configurable fallback heuristic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalizer {
    /// Fallback for capability cells that look like lists but do not decode.
    pub list_fallback: ListFallback,
}

impl Normalizer {
    /// Create a normalizer with the given fallback.
    pub fn new(list_fallback: ListFallback) -> Self {
        Self { list_fallback }
    }

    /// Parse a capability cell into raw capability strings.
    ///
    /// Non-bracketed cells are one capability. An empty cell is no
    /// capability at all.
    pub fn capability_list(&self, raw: &str) -> Vec<String> {
        if raw.is_empty() {
            return Vec::new();
        }
        if !is_bracketed(raw) {
            return vec![raw.to_string()];
        }

        match decode_pseudo_array(raw) {
            Ok(items) => items.iter().filter_map(element_text).collect(),
            Err(e) => {
                tracing::debug!(error = %e, cell = raw, fallback = ?self.list_fallback, "capability list fallback");
                match self.list_fallback {
                    ListFallback::WholeString => vec![raw.to_string()],
                    ListFallback::SplitOnComma => {
                        let inner = &raw[1..raw.len() - 1];
                        if inner.trim().is_empty() {
                            Vec::new()
                        } else {
                            split_quoted(inner)
                        }
                    }
                }
            }
        }
    }

    /// Parse an edge cell into raw `(source, target)` pairs.
    ///
    /// Pairs whose sides normalize to empty, or to the same id, are dropped.
    pub fn edge_list(&self, raw: &str) -> Vec<(String, String)> {
        let candidates = match decode_pseudo_array(raw) {
            Ok(items) => items.iter().filter_map(decode_pair).collect(),
            Err(ParseError::NotBracketed) => comma_pair(raw),
            Err(e) => {
                tracing::debug!(error = %e, cell = raw, "edge list fallback to comma split");
                comma_pair(raw)
            }
        };

        candidates
            .into_iter()
            .filter(|(source, target)| is_valid_pair(source, target))
            .collect()
    }
}

fn decode_pair(value: &Value) -> Option<(String, String)> {
    match value {
        Value::Array(pair) if pair.len() == 2 => {
            let source = element_text(&pair[0])?;
            let target = element_text(&pair[1])?;
            Some((source, target))
        }
        _ => None,
    }
}

fn comma_pair(raw: &str) -> Vec<(String, String)> {
    let mut parts = raw.split(',').map(str::trim);
    match (parts.next(), parts.next()) {
        (Some(source), Some(target)) => vec![(source.to_string(), target.to_string())],
        _ => Vec::new(),
    }
}

fn is_valid_pair(source: &str, target: &str) -> bool {
    let source = normalize_capability_name(source);
    let target = normalize_capability_name(target);
    !source.is_empty() && !target.is_empty() && source != target
}

/// Parse a capability cell with the default fallback.
///
/// ```rust
/// use capability_graph::normalize::parse_capability_list;
///
/// assert_eq!(parse_capability_list("['NLP', 'reasoning']"), vec!["NLP", "reasoning"]);
/// assert_eq!(parse_capability_list("planning"), vec!["planning"]);
/// ```
pub fn parse_capability_list(raw: &str) -> Vec<String> {
    Normalizer::default().capability_list(raw)
}

/// Parse an edge cell with the default normalizer.
pub fn parse_edge_list(raw: &str) -> Vec<(String, String)> {
    Normalizer::default().edge_list(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_quotes_case_and_suffix() {
        assert_eq!(normalize_capability_name("  'Reasoning Capability' "), "reasoning");
        assert_eq!(normalize_capability_name("\"Planning\""), "planning");
        assert_eq!(normalize_capability_name("REASONING"), "reasoning");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_capability_name("multi \t\n step   planning"), "multi step planning");
    }

    #[test]
    fn test_normalize_collapses_unicode_whitespace() {
        assert_eq!(normalize_capability_name("tool\u{A0}\u{2003}use"), "tool use");
        assert_eq!(normalize_capability_name("\u{3000}planning\u{A0}capability"), "planning");
    }

    #[test]
    fn test_normalize_blank() {
        assert_eq!(normalize_capability_name(""), "");
        assert_eq!(normalize_capability_name("   "), "");
        assert_eq!(normalize_capability_name("''"), "");
        assert_eq!(normalize_capability_name("capability"), "");
    }

    #[test]
    fn test_normalize_repeated_suffix_is_idempotent() {
        let once = normalize_capability_name("tool use capability capability");
        assert_eq!(once, "tool use");
        assert_eq!(normalize_capability_name(&once), once);

        let glued = normalize_capability_name("capabilitycapability");
        assert_eq!(glued, "");
    }

    #[test]
    fn test_normalize_quote_exposed_whitespace() {
        assert_eq!(normalize_capability_name("' spaced'"), "spaced");
    }

    #[test]
    fn test_capability_list_pseudo_array() {
        assert_eq!(parse_capability_list("['NLP', 'reasoning']"), vec!["NLP", "reasoning"]);
        assert_eq!(parse_capability_list("[\"a\", 3]"), vec!["a", "3"]);
        assert!(parse_capability_list("[]").is_empty());
    }

    #[test]
    fn test_capability_list_plain_and_empty() {
        assert_eq!(parse_capability_list("code generation"), vec!["code generation"]);
        assert!(parse_capability_list("").is_empty());
    }

    #[test]
    fn test_padded_list_is_not_bracketed() {
        assert!(!is_bracketed(" ['a']"));
        assert!(!is_bracketed("['a'] "));
        assert_eq!(parse_capability_list(" ['a', 'b']"), vec![" ['a', 'b']"]);
        assert!(matches!(decode_pseudo_array(" ['a']"), Err(ParseError::NotBracketed)));
    }

    #[test]
    fn test_capability_list_decode_failure_whole_string() {
        // The apostrophe breaks quote substitution.
        let cell = "['children's stories', 'math']";
        assert_eq!(parse_capability_list(cell), vec![cell]);
    }

    #[test]
    fn test_capability_list_decode_failure_split_on_comma() {
        let normalizer = Normalizer::new(ListFallback::SplitOnComma);
        let cell = "['children's stories', 'math']";
        assert_eq!(
            normalizer.capability_list(cell),
            vec!["children's stories", "math"]
        );
    }

    #[test]
    fn test_edge_list_pairs() {
        let pairs = parse_edge_list("[['NLP', 'Reasoning'], ['code', 'math']]");
        assert_eq!(
            pairs,
            vec![
                ("NLP".to_string(), "Reasoning".to_string()),
                ("code".to_string(), "math".to_string()),
            ]
        );
    }

    #[test]
    fn test_edge_list_skips_malformed_elements() {
        let pairs = parse_edge_list("[['a', 'b', 'c'], ['d'], 'e', ['f', 'g']]");
        assert_eq!(pairs, vec![("f".to_string(), "g".to_string())]);
    }

    #[test]
    fn test_edge_list_comma_fallback() {
        assert_eq!(
            parse_edge_list("planning, reasoning, extra"),
            vec![("planning".to_string(), "reasoning".to_string())]
        );
        assert!(parse_edge_list("lonely").is_empty());
    }

    #[test]
    fn test_edge_list_decode_failure_uses_comma_split() {
        let pairs = parse_edge_list("[['it's', 'b']]");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].1, "'b']]");
    }

    #[test]
    fn test_edge_list_drops_self_loops_and_blanks() {
        assert!(parse_edge_list("[['Reasoning', 'reasoning capability']]").is_empty());
        assert!(parse_edge_list("[['', 'x']]").is_empty());
        assert!(parse_edge_list("a, ").is_empty());
    }

    #[test]
    fn test_decode_pseudo_array_errors() {
        assert!(matches!(decode_pseudo_array("abc"), Err(ParseError::NotBracketed)));
        assert!(matches!(decode_pseudo_array("[abc]"), Err(ParseError::Decode(_))));
    }
}
