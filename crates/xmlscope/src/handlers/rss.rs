//! RSS 2.0 feed handler.

use super::{find_all, find_first, DocumentTypeInfo, ElementRef, Handler, NamespaceMap, SpecializedAnalysis};
use crate::parser::ParsedTree;
use std::path::Path;
use xmlscope_core::StructuredValue;

#[derive(Debug, Default)]
pub struct RssFeedHandler;

impl Handler for RssFeedHandler {
    fn name(&self) -> &str {
        "RSS Feed"
    }

    fn can_handle(&self, tree: &ParsedTree, _namespaces: &NamespaceMap) -> (bool, f64) {
        let root = tree.root_element();
        if root.tag != "rss" {
            return (false, 0.0);
        }
        let item_count = find_all(tree, "item").len();
        let version_2 = root.attribute("version").map(|v| v.starts_with('2')).unwrap_or(false);
        match (version_2, item_count > 0) {
            (true, true) => (true, 0.97),
            (true, false) => (true, 0.85),
            (false, true) => (true, 0.8),
            (false, false) => (true, 0.6),
        }
    }

    fn detect_type(&self, tree: &ParsedTree, namespaces: &NamespaceMap) -> DocumentTypeInfo {
        let mut info = DocumentTypeInfo::new("RSS Feed", self.can_handle(tree, namespaces).1);
        if let Some(version) = tree.root_element().attribute("version") {
            info = info.with_version(version);
        }
        info
    }

    fn analyze(&self, tree: &ParsedTree, file_path: &Path) -> SpecializedAnalysis {
        let doc_type = self.detect_type(tree, &[]);
        let items = find_all(tree, "item");
        let mut key_findings = StructuredValue::map();
        key_findings.insert(
            "channel_title",
            find_first(tree, "title")
                .map(|id| tree.element(id).text.trim().to_string())
                .unwrap_or_default(),
        );
        key_findings.insert("item_count", items.len());

        SpecializedAnalysis {
            doc_type,
            key_findings,
            structured_data: self.extract_key_data(tree),
            ai_use_cases: vec![
                "content aggregation".to_string(),
                "per-article chunked embedding".to_string(),
            ],
            quality_metrics: vec![],
            file_path: file_path.display().to_string(),
            handler_used: "RSS Feed".to_string(),
            namespaces: Vec::new(),
        }
    }

    fn extract_key_data(&self, tree: &ParsedTree) -> StructuredValue {
        let items: Vec<StructuredValue> = find_all(tree, "item")
            .into_iter()
            .map(|item_id| {
                let mut entry = StructuredValue::map();
                for child in tree.children_of(item_id) {
                    let el = tree.element(*child);
                    if matches!(el.tag.as_str(), "title" | "link" | "pubDate" | "guid") {
                        entry.insert(el.tag.clone(), el.text.trim().to_string());
                    }
                }
                entry
            })
            .collect();
        let mut data = StructuredValue::map();
        data.insert("items", StructuredValue::List(items));
        data
    }

    fn section_roots(&self, tree: &ParsedTree) -> Vec<ElementRef> {
        find_all(tree, "item")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_bytes;

    const SAMPLE: &[u8] = br#"<rss version="2.0"><channel>
        <title>Example</title>
        <item><title>One</title><link>http://a</link></item>
        <item><title>Two</title><link>http://b</link></item>
        <item><title>Three</title><link>http://c</link></item>
    </channel></rss>"#;

    #[test]
    fn matches_rss2_feed_with_items_at_high_confidence() {
        let tree = parse_bytes(SAMPLE).unwrap();
        let (matched, confidence) = RssFeedHandler.can_handle(&tree, &[]);
        assert!(matched);
        assert!(confidence >= 0.95);
    }

    #[test]
    fn section_roots_are_the_items() {
        let tree = parse_bytes(SAMPLE).unwrap();
        assert_eq!(RssFeedHandler.section_roots(&tree).len(), 3);
    }
}
