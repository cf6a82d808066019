//! The handler contract, and the built-in dialect handlers.
//!
//! Every handler is a value implementing [`Handler`]; registration order
//! (established by [`crate::registry::HandlerRegistry`]) determines
//! tie-breaking, not any runtime type hierarchy.

mod ant;
mod atom;
mod generic;
mod hibernate;
mod ivy;
mod kml;
mod log4j;
mod pom;
mod rss;
mod s1000d;
mod spring;
mod struts;

pub use ant::AntBuildHandler;
pub use atom::AtomFeedHandler;
pub use generic::GenericHandler;
pub use hibernate::HibernateMappingHandler;
pub use ivy::IvyHandler;
pub use kml::KmlHandler;
pub use log4j::Log4jConfigHandler;
pub use pom::MavenPomHandler;
pub use rss::RssFeedHandler;
pub use s1000d::S1000dHandler;
pub use spring::SpringBeansHandler;
pub use struts::StrutsConfigHandler;

use crate::parser::{ElementId, ParsedTree};
use serde::{Deserialize, Serialize};
use std::path::Path;
use xmlscope_core::StructuredValue;

/// Prefix -> URI namespace map, as produced by [`crate::schema::inspect`]
/// and [`ParsedTree::namespace_map`].
pub type NamespaceMap = [(String, String)];

/// A reference to an element within a specific `ParsedTree` (the tree
/// itself is always passed alongside, so this is just the index).
pub type ElementRef = ElementId;

/// Detection result produced by [`Handler::detect_type`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTypeInfo {
    pub type_name: String,
    pub confidence: f64,
    pub version: Option<String>,
    pub schema_uri: Option<String>,
    pub metadata: Vec<(String, String)>,
}

impl DocumentTypeInfo {
    pub fn new(type_name: impl Into<String>, confidence: f64) -> Self {
        Self {
            type_name: type_name.into(),
            confidence,
            version: None,
            schema_uri: None,
            metadata: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Full analysis produced by [`Handler::analyze`]. Composes
/// [`DocumentTypeInfo`] by value rather than flattening/inheriting it,
/// so a consumer never has to guess which fields live on which layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecializedAnalysis {
    pub doc_type: DocumentTypeInfo,
    pub key_findings: StructuredValue,
    pub structured_data: StructuredValue,
    pub ai_use_cases: Vec<String>,
    /// Metric name -> value in [0, 1].
    pub quality_metrics: Vec<(String, f64)>,
    pub file_path: String,
    pub handler_used: String,
    pub namespaces: Vec<(String, String)>,
}

impl SpecializedAnalysis {
    pub fn type_name(&self) -> &str {
        &self.doc_type.type_name
    }

    pub fn confidence(&self) -> f64 {
        self.doc_type.confidence
    }
}

/// The four-operation handler contract, plus an optional content-aware
/// chunking hook.
pub trait Handler: Send + Sync {
    /// Stable name used for registry dispatch and `handler_used`.
    fn name(&self) -> &str;

    /// Must not mutate `tree`; must return within O(tree size).
    fn can_handle(&self, tree: &ParsedTree, namespaces: &NamespaceMap) -> (bool, f64);

    /// Called only after `can_handle` returned true.
    fn detect_type(&self, tree: &ParsedTree, namespaces: &NamespaceMap) -> DocumentTypeInfo;

    /// Must populate `type_name`/`confidence` consistent with `detect_type`.
    fn analyze(&self, tree: &ParsedTree, file_path: &Path) -> SpecializedAnalysis;

    /// Stateless structural extraction, reused by `analyze` and by the
    /// content-aware chunker.
    fn extract_key_data(&self, tree: &ParsedTree) -> StructuredValue;

    /// Handler-declared "section root" hint for content-aware chunking.
    /// Default: no hint, which makes content-aware chunking fall back to
    /// treating top-level children as section roots.
    fn section_roots(&self, _tree: &ParsedTree) -> Vec<ElementRef> {
        Vec::new()
    }
}

/// Shared helper: does any element in `tree` have local tag `tag`?
pub(crate) fn has_descendant_tag(tree: &ParsedTree, tag: &str) -> bool {
    tree.iter_depth_first().any(|id| tree.element(id).tag == tag)
}

/// Shared helper: first element (depth-first) with local tag `tag`.
pub(crate) fn find_first(tree: &ParsedTree, tag: &str) -> Option<ElementId> {
    tree.iter_depth_first().find(|&id| tree.element(id).tag == tag)
}

/// Shared helper: all elements (depth-first) with local tag `tag`.
pub(crate) fn find_all(tree: &ParsedTree, tag: &str) -> Vec<ElementId> {
    tree.iter_depth_first()
        .filter(|&id| tree.element(id).tag == tag)
        .collect()
}

/// Shared helper: does `namespaces` contain a URI matching `needle`
/// (substring match, since versioned schema URIs commonly vary by suffix)?
pub(crate) fn namespaces_contain(namespaces: &NamespaceMap, needle: &str) -> bool {
    namespaces.iter().any(|(_, uri)| uri.contains(needle))
}
