//! The fallback handler: always matches, at a fixed confidence, for
//! documents no specialized handler claims.

use super::{DocumentTypeInfo, Handler, NamespaceMap, SpecializedAnalysis};
use crate::parser::ParsedTree;
use crate::schema;
use std::path::Path;
use xmlscope_core::StructuredValue;

/// Confidence the registry falls back to when no handler positively
/// matches.
pub const GENERIC_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Default)]
pub struct GenericHandler;

impl Handler for GenericHandler {
    fn name(&self) -> &str {
        "Generic XML"
    }

    fn can_handle(&self, _tree: &ParsedTree, _namespaces: &NamespaceMap) -> (bool, f64) {
        (true, GENERIC_CONFIDENCE)
    }

    fn detect_type(&self, _tree: &ParsedTree, _namespaces: &NamespaceMap) -> DocumentTypeInfo {
        DocumentTypeInfo::new("Generic XML", GENERIC_CONFIDENCE)
    }

    fn analyze(&self, tree: &ParsedTree, file_path: &Path) -> SpecializedAnalysis {
        let record = schema::inspect(tree);
        let mut key_findings = StructuredValue::map();
        key_findings.insert("root_tag", record.root_tag.clone());
        key_findings.insert("total_elements", record.total_elements);
        key_findings.insert("max_depth", record.max_depth);
        key_findings.insert(
            "distinct_tag_count",
            record.distinct_tag_list.len(),
        );

        SpecializedAnalysis {
            doc_type: DocumentTypeInfo::new("Generic XML", GENERIC_CONFIDENCE),
            key_findings,
            structured_data: self.extract_key_data(tree),
            ai_use_cases: vec![
                "full-text search indexing".to_string(),
                "structural diffing".to_string(),
            ],
            quality_metrics: vec![("structure_confidence".to_string(), GENERIC_CONFIDENCE)],
            file_path: file_path.display().to_string(),
            handler_used: "Generic XML".to_string(),
            namespaces: record.namespace_map,
        }
    }

    fn extract_key_data(&self, tree: &ParsedTree) -> StructuredValue {
        let record = schema::inspect(tree);
        let mut data = StructuredValue::map();
        data.insert(
            "distinct_tags",
            StructuredValue::List(
                record
                    .distinct_tag_list
                    .into_iter()
                    .map(StructuredValue::from)
                    .collect(),
            ),
        );
        data
    }
}
