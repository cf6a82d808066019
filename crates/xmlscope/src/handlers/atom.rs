//! Atom (RFC 4287) feed handler.

use super::{find_all, find_first, namespaces_contain, DocumentTypeInfo, ElementRef, Handler, NamespaceMap, SpecializedAnalysis};
use crate::parser::ParsedTree;
use std::path::Path;
use xmlscope_core::StructuredValue;

const ATOM_NAMESPACE: &str = "www.w3.org/2005/Atom";

#[derive(Debug, Default)]
pub struct AtomFeedHandler;

impl Handler for AtomFeedHandler {
    fn name(&self) -> &str {
        "Atom Feed"
    }

    fn can_handle(&self, tree: &ParsedTree, namespaces: &NamespaceMap) -> (bool, f64) {
        if tree.root_element().tag != "feed" {
            return (false, 0.0);
        }
        if namespaces_contain(namespaces, ATOM_NAMESPACE) {
            return (true, 0.97);
        }
        if !find_all(tree, "entry").is_empty() {
            return (true, 0.75);
        }
        (false, 0.0)
    }

    fn detect_type(&self, tree: &ParsedTree, namespaces: &NamespaceMap) -> DocumentTypeInfo {
        DocumentTypeInfo::new("Atom Feed", self.can_handle(tree, namespaces).1)
    }

    fn analyze(&self, tree: &ParsedTree, file_path: &Path) -> SpecializedAnalysis {
        let doc_type = self.detect_type(tree, tree.namespace_map());
        let entries = find_all(tree, "entry");
        let mut key_findings = StructuredValue::map();
        key_findings.insert(
            "feed_title",
            find_first(tree, "title")
                .map(|id| tree.element(id).text.trim().to_string())
                .unwrap_or_default(),
        );
        key_findings.insert("entry_count", entries.len());

        SpecializedAnalysis {
            doc_type,
            key_findings,
            structured_data: self.extract_key_data(tree),
            ai_use_cases: vec!["content aggregation".to_string()],
            quality_metrics: vec![],
            file_path: file_path.display().to_string(),
            handler_used: "Atom Feed".to_string(),
            namespaces: tree.namespace_map().to_vec(),
        }
    }

    fn extract_key_data(&self, tree: &ParsedTree) -> StructuredValue {
        let entries: Vec<StructuredValue> = find_all(tree, "entry")
            .into_iter()
            .map(|entry_id| {
                let mut entry = StructuredValue::map();
                for child in tree.children_of(entry_id) {
                    let el = tree.element(*child);
                    if matches!(el.tag.as_str(), "title" | "id" | "updated") {
                        entry.insert(el.tag.clone(), el.text.trim().to_string());
                    }
                }
                entry
            })
            .collect();
        let mut data = StructuredValue::map();
        data.insert("entries", StructuredValue::List(entries));
        data
    }

    fn section_roots(&self, tree: &ParsedTree) -> Vec<ElementRef> {
        find_all(tree, "entry")
    }
}
