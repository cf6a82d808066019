//! S1000D data module / publication module handler.
//!
//! S1000D documents are the dialect that drives the parser's ICN entity
//! whitelist; `tree.entity_metadata()` carries whatever the parser already
//! extracted, so this handler only needs to surface it.

use super::{has_descendant_tag, find_first, DocumentTypeInfo, Handler, NamespaceMap, SpecializedAnalysis};
use crate::parser::ParsedTree;
use std::path::Path;
use xmlscope_core::StructuredValue;

const S1000D_ROOT_TAGS: &[&str] = &["dmodule", "pm", "dml", "dmlist", "pmc"];

#[derive(Debug, Default)]
pub struct S1000dHandler;

impl Handler for S1000dHandler {
    fn name(&self) -> &str {
        "S1000D"
    }

    fn can_handle(&self, tree: &ParsedTree, _namespaces: &NamespaceMap) -> (bool, f64) {
        let root_tag = tree.root_element().tag.as_str();
        if S1000D_ROOT_TAGS.contains(&root_tag) {
            return (true, 0.95);
        }
        if has_descendant_tag(tree, "dmIdent") || has_descendant_tag(tree, "idstatus") {
            return (true, 0.8);
        }
        (false, 0.0)
    }

    fn detect_type(&self, tree: &ParsedTree, namespaces: &NamespaceMap) -> DocumentTypeInfo {
        let mut info = DocumentTypeInfo::new("S1000D", self.can_handle(tree, namespaces).1);
        if let Some(issue_info) = find_first(tree, "dmStatus").and_then(|id| {
            tree.element(id).attribute("issueNumber").map(str::to_string)
        }) {
            info = info.with_version(issue_info);
        }
        for (name, system_id) in tree.entity_metadata() {
            info.metadata.push((name.clone(), system_id.clone()));
        }
        info
    }

    fn analyze(&self, tree: &ParsedTree, file_path: &Path) -> SpecializedAnalysis {
        let doc_type = self.detect_type(tree, &[]);
        let mut key_findings = StructuredValue::map();
        key_findings.insert(
            "icn_reference_count",
            tree.entity_metadata().len(),
        );
        key_findings.insert(
            "has_dm_ident",
            has_descendant_tag(tree, "dmIdent"),
        );

        SpecializedAnalysis {
            doc_type,
            key_findings,
            structured_data: self.extract_key_data(tree),
            ai_use_cases: vec![
                "technical-publication retrieval".to_string(),
                "illustrated-parts-catalog indexing".to_string(),
            ],
            quality_metrics: vec![],
            file_path: file_path.display().to_string(),
            handler_used: "S1000D".to_string(),
            namespaces: Vec::new(),
        }
    }

    fn extract_key_data(&self, tree: &ParsedTree) -> StructuredValue {
        let icns: Vec<StructuredValue> = tree
            .entity_metadata()
            .iter()
            .map(|(name, system_id)| {
                let mut entry = StructuredValue::map();
                entry.insert("name", name.clone());
                entry.insert("system_id", system_id.clone());
                entry
            })
            .collect();
        let mut data = StructuredValue::map();
        data.insert("icn_entities", StructuredValue::List(icns));
        data
    }
}
