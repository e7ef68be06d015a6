//! Pipe-delimited dependency triple parsing.
//!
//! The dependencies end hook and the treebank_triples mode both emit
//! line-oriented, `|`-separated output whose trailing field identifies the
//! sentence. This module folds such output into the per-sentence result
//! map, which is also where the xml output kind stores its documents.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

/// Per-sentence results, keyed by sentence id in first-encountered order.
pub type ResultMap = IndexMap<String, SentenceResult>;

#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct SentenceResult {
    /// One entry per dependency relation, in tool output order, with the
    /// trailing sentence-id field already removed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub triples: Vec<Vec<String>>,
    /// Raw per-sentence XML, present for the xml and treebank_triples kinds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml: Option<String>,
}

/// Fold `raw` triple output into `result`, creating entries lazily so the
/// treebank phase can overlay triples onto a map already holding XML. With
/// `strip_id` the trailing field is a generated file path and is reduced to
/// its stem to join with xml-phase keys.
pub fn read_triples(raw: &str, result: &mut ResultMap, strip_id: bool) {
    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields: Vec<String> = line.split('|').map(str::to_string).collect();
        // split always yields at least one field, so the id is never absent
        let id = fields.pop().unwrap_or_default();
        if fields.is_empty() {
            // Upstream bug surface: a line without a separator. Keep the
            // whole line as the id with an empty triple rather than crash.
            warn!(line = %line, "triple line without field separator");
        }
        let id = if strip_id { file_stem(&id) } else { id };
        result.entry(id).or_default().triples.push(fields);
    }
}

fn file_stem(path: &str) -> String {
    std::path::Path::new(path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
