//! The chunking engine.
//!
//! Four strategies share a common configuration type, a canonical
//! subtree-serialization routine, and a post-processing pass. Each strategy
//! lives in its own module and exposes a single `chunk(tree, config, ...)`
//! function; [`auto::select_strategy`] is the only thing that chooses among
//! them.

mod auto;
mod content_aware;
mod hierarchical;
mod sliding_window;

pub use auto::select_strategy;

use crate::error::{Error, Result};
use crate::handlers::Handler;
use crate::parser::{ElementId, ParsedTree};
use crate::schema::SchemaRecord;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use xmlscope_core::{StructuredValue, TagPath};

/// Which chunking algorithm to run. `Auto` resolves to one of the other
/// three before any chunk is produced, per [`auto::select_strategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Hierarchical,
    SlidingWindow,
    ContentAware,
    Auto,
}

/// Tunables shared by every strategy. Defaults match the fixed values this
/// pipeline has always used.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkingConfig {
    pub max_chunk_size: usize,
    pub min_chunk_size: usize,
    pub overlap_size: usize,
    pub preserve_hierarchy: bool,
    pub include_ancestors: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 2000,
            min_chunk_size: 500,
            overlap_size: 100,
            preserve_hierarchy: true,
            include_ancestors: true,
        }
    }
}

impl ChunkingConfig {
    pub fn builder() -> ChunkingConfigBuilder {
        ChunkingConfigBuilder::default()
    }

    /// Build a config from a dynamic source (e.g. a host's own config file
    /// deserialized into `StructuredValue`s). Statically-typed Rust call
    /// sites should use [`ChunkingConfig::builder`] instead, which cannot
    /// produce an unknown key.
    pub fn from_map(entries: &[(String, StructuredValue)]) -> Result<Self> {
        let mut config = ChunkingConfig::default();
        for (key, value) in entries {
            match key.as_str() {
                "max_chunk_size" => config.max_chunk_size = expect_usize(key, value)?,
                "min_chunk_size" => config.min_chunk_size = expect_usize(key, value)?,
                "overlap_size" => config.overlap_size = expect_usize(key, value)?,
                "preserve_hierarchy" => config.preserve_hierarchy = expect_bool(key, value)?,
                "include_ancestors" => config.include_ancestors = expect_bool(key, value)?,
                other => return Err(Error::BadConfig(other.to_string())),
            }
        }
        Ok(config)
    }
}

fn expect_usize(key: &str, value: &StructuredValue) -> Result<usize> {
    match value {
        StructuredValue::Number(n) if *n >= 0.0 => Ok(*n as usize),
        _ => Err(Error::BadConfig(format!("{key} expects a non-negative number"))),
    }
}

fn expect_bool(key: &str, value: &StructuredValue) -> Result<bool> {
    match value {
        StructuredValue::Bool(b) => Ok(*b),
        _ => Err(Error::BadConfig(format!("{key} expects a boolean"))),
    }
}

#[derive(Debug, Default)]
pub struct ChunkingConfigBuilder {
    config: ChunkingConfig,
}

impl ChunkingConfigBuilder {
    pub fn max_chunk_size(mut self, v: usize) -> Self {
        self.config.max_chunk_size = v;
        self
    }

    pub fn min_chunk_size(mut self, v: usize) -> Self {
        self.config.min_chunk_size = v;
        self
    }

    pub fn overlap_size(mut self, v: usize) -> Self {
        self.config.overlap_size = v;
        self
    }

    pub fn preserve_hierarchy(mut self, v: bool) -> Self {
        self.config.preserve_hierarchy = v;
        self
    }

    pub fn include_ancestors(mut self, v: bool) -> Self {
        self.config.include_ancestors = v;
        self
    }

    pub fn build(self) -> ChunkingConfig {
        self.config
    }
}

/// A bounded substring of the source document annotated with structural
/// context, emitted by every strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub content: String,
    /// Tag-name path from the document root to this chunk's smallest common
    /// ancestor.
    pub element_path: Vec<String>,
    pub start_line: u32,
    pub end_line: u32,
    /// Distinct tag names covered by this chunk, in first-appearance order.
    pub elements_included: Vec<String>,
    pub parent_context: Option<String>,
    pub metadata: Vec<(String, StructuredValue)>,
    pub token_estimate: usize,
}

/// Top-level entry point used by the façade: resolve `strategy` (running
/// [`auto::select_strategy`] first if it is [`Strategy::Auto`]) and run it.
pub fn chunk(
    tree: &ParsedTree,
    schema: &SchemaRecord,
    handler: &dyn Handler,
    analysis_type_name: &str,
    strategy: Strategy,
    config: &ChunkingConfig,
) -> Result<Vec<Chunk>> {
    let resolved = match strategy {
        Strategy::Auto => select_strategy(tree, schema, handler, analysis_type_name),
        other => other,
    };

    let chunks = match resolved {
        Strategy::Hierarchical => hierarchical::chunk(tree, config),
        Strategy::SlidingWindow => sliding_window::chunk(tree, config),
        Strategy::ContentAware => content_aware::chunk(tree, handler, config),
        Strategy::Auto => return Err(Error::NoApplicableStrategy),
    };

    Ok(post_process(chunks))
}

/// Reconstruct a canonical XML-text rendering of the subtree rooted at
/// `id`: attributes and children in original order, self-closing empty
/// elements. This is what lets every `Chunk.content` round-trip through the
/// parser — content is always a re-serialization of real parsed nodes,
/// never a raw byte slice that could split a tag.
pub(crate) fn serialize_subtree(tree: &ParsedTree, id: ElementId) -> String {
    let element = tree.element(id);
    let mut out = String::new();
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }

    let children = tree.children_of(id);
    if children.is_empty() && element.text.is_empty() {
        out.push_str("/>");
        return out;
    }
    out.push('>');
    out.push_str(&escape_text(&element.text));
    for &child in children {
        out.push_str(&serialize_subtree(tree, child));
    }
    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
    out
}

pub(crate) fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

pub(crate) fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

/// `max(1, ceil(len(content) / 4))`.
pub(crate) fn token_estimate(content: &str) -> usize {
    ((content.len() + 3) / 4).max(1)
}

/// `"chunk_" + index + "_" + first 8 hex chars of SHA-256(content)`.
pub(crate) fn chunk_id(index: usize, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let digest = hasher.finalize();
    let hex = digest.iter().map(|b| format!("{b:02x}")).collect::<String>();
    format!("chunk_{index}_{}", &hex[..8])
}

/// Ancestor tag path from the document root down to (but not including)
/// `id` itself — used for `element_path`.
pub(crate) fn ancestor_path(tree: &ParsedTree, id: ElementId) -> Vec<String> {
    let mut path = Vec::new();
    let mut current = tree.element(id).parent;
    while let Some(parent_id) = current {
        path.push(tree.element(parent_id).tag.clone());
        current = tree.element(parent_id).parent;
    }
    path.reverse();
    path
}

/// The smallest common ancestor path shared by every id in `ids`: the
/// longest prefix their individual [`ancestor_path`]s agree on. A buffer
/// can legitimately mix a shallow sibling with elements recovered from a
/// deeper, already-finished recursion, so the common ancestor of the whole
/// chunk is not always the ancestor path of its first element — folding
/// [`xmlscope_core::TagPath::common_ancestor`] across all of them is what
/// spec.md §4.5.1 means by "the smallest common ancestor path".
pub(crate) fn common_ancestor_path(tree: &ParsedTree, ids: &[ElementId]) -> Vec<String> {
    let mut paths = ids.iter().map(|&id| TagPath::from_segments(ancestor_path(tree, id)));
    let Some(first) = paths.next() else {
        return Vec::new();
    };
    paths.fold(first, |acc, next| acc.common_ancestor(&next)).segments().to_vec()
}

/// Ancestor open-tag snippet (e.g. `<root><section>`), used for
/// `parent_context` when `ChunkingConfig::include_ancestors` is set.
pub(crate) fn parent_context(tree: &ParsedTree, id: ElementId) -> Option<String> {
    let path = ancestor_path(tree, id);
    if path.is_empty() {
        return None;
    }
    Some(path.iter().map(|tag| format!("<{tag}>")).collect::<Vec<_>>().join(""))
}

/// Dedup consecutive empty-content chunks, then assign `token_estimate` and
/// `chunk_id` in final source-order position.
fn post_process(mut chunks: Vec<Chunk>) -> Vec<Chunk> {
    chunks.retain(|c| !c.content.is_empty());
    for (index, chunk) in chunks.iter_mut().enumerate() {
        chunk.token_estimate = token_estimate(&chunk.content).max(1);
        chunk.chunk_id = chunk_id(index, &chunk.content);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_bytes;

    #[test]
    fn serialize_subtree_round_trips_through_parser() {
        let tree = parse_bytes(br#"<root><a x="1">hi</a><b/></root>"#).unwrap();
        let rendered = serialize_subtree(&tree, tree.root());
        let reparsed = parse_bytes(rendered.as_bytes()).unwrap();
        assert_eq!(reparsed.root_element().tag, "root");
        assert_eq!(reparsed.len(), tree.len());
    }

    #[test]
    fn token_estimate_rounds_up() {
        assert_eq!(token_estimate("abcd"), 1);
        assert_eq!(token_estimate("abcde"), 2);
        assert_eq!(token_estimate(""), 1);
    }

    #[test]
    fn common_ancestor_path_of_a_single_id_is_its_ancestor_path() {
        let tree = parse_bytes(br#"<root><a><b/></a></root>"#).unwrap();
        let b = tree.children_of(tree.children_of(tree.root())[0])[0];
        assert_eq!(common_ancestor_path(&tree, &[b]), vec!["root".to_string(), "a".to_string()]);
    }

    #[test]
    fn common_ancestor_path_ignores_a_sibling_recovered_from_a_deeper_recursion() {
        // root -> [p, A -> [A1, A2], r]; a buffer holding [A1, A2, r] must
        // report "root" as the common ancestor, not "root/A" (A1's own
        // ancestor path) just because A1 happens to be first in the slice.
        let tree = parse_bytes(br#"<root><p/><A><A1/><A2/></A><r/></root>"#).unwrap();
        let root_children = tree.children_of(tree.root());
        let a = root_children[1];
        let r = root_children[2];
        let a_children = tree.children_of(a).to_vec();
        let ids = [a_children[0], a_children[1], r];
        assert_eq!(common_ancestor_path(&tree, &ids), vec!["root".to_string()]);
    }

    #[test]
    fn chunk_id_is_stable_for_same_content() {
        assert_eq!(chunk_id(0, "hello"), chunk_id(0, "hello"));
        assert_ne!(chunk_id(0, "hello"), chunk_id(0, "world"));
        assert!(chunk_id(3, "hello").starts_with("chunk_3_"));
    }

    #[test]
    fn from_map_rejects_unknown_key() {
        let err = ChunkingConfig::from_map(&[("bogus".to_string(), StructuredValue::Bool(true))])
            .unwrap_err();
        assert!(matches!(err, Error::BadConfig(ref k) if k == "bogus"));
    }
}
