//! Apache Ivy `ivy.xml` dependency-descriptor handler.

use super::{find_all, find_first, DocumentTypeInfo, Handler, NamespaceMap, SpecializedAnalysis};
use crate::parser::ParsedTree;
use std::path::Path;
use xmlscope_core::StructuredValue;

#[derive(Debug, Default)]
pub struct IvyHandler;

impl Handler for IvyHandler {
    fn name(&self) -> &str {
        "Apache Ivy"
    }

    fn can_handle(&self, tree: &ParsedTree, _namespaces: &NamespaceMap) -> (bool, f64) {
        if tree.root_element().tag != "ivy-module" {
            return (false, 0.0);
        }
        let has_info = find_first(tree, "info").is_some();
        (true, if has_info { 0.95 } else { 0.8 })
    }

    fn detect_type(&self, tree: &ParsedTree, namespaces: &NamespaceMap) -> DocumentTypeInfo {
        let version = tree.root_element().attribute("version").map(str::to_string);
        let mut info = DocumentTypeInfo::new("Apache Ivy", self.can_handle(tree, namespaces).1);
        if let Some(v) = version {
            info = info.with_version(v);
        }
        info
    }

    fn analyze(&self, tree: &ParsedTree, file_path: &Path) -> SpecializedAnalysis {
        let doc_type = self.detect_type(tree, &[]);
        let mut key_findings = StructuredValue::map();
        key_findings.insert("dependency_count", find_all(tree, "dependency").len());
        key_findings.insert("configuration_count", find_all(tree, "conf").len());

        SpecializedAnalysis {
            doc_type,
            key_findings,
            structured_data: self.extract_key_data(tree),
            ai_use_cases: vec!["dependency graph construction".to_string()],
            quality_metrics: vec![],
            file_path: file_path.display().to_string(),
            handler_used: "Apache Ivy".to_string(),
            namespaces: Vec::new(),
        }
    }

    fn extract_key_data(&self, tree: &ParsedTree) -> StructuredValue {
        let deps: Vec<StructuredValue> = find_all(tree, "dependency")
            .into_iter()
            .map(|id| {
                let el = tree.element(id);
                let mut entry = StructuredValue::map();
                entry.insert("org", el.attribute("org").unwrap_or("").to_string());
                entry.insert("name", el.attribute("name").unwrap_or("").to_string());
                entry.insert("rev", el.attribute("rev").unwrap_or("").to_string());
                entry
            })
            .collect();
        let mut data = StructuredValue::map();
        data.insert("dependencies", StructuredValue::List(deps));
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_bytes;

    #[test]
    fn matches_ivy_module_root() {
        let tree = parse_bytes(
            br#"<ivy-module version="2.0"><info org="acme" module="demo"/>
                <dependencies><dependency org="org.a" name="b" rev="1.0"/></dependencies>
            </ivy-module>"#,
        )
        .unwrap();
        let (matched, confidence) = IvyHandler.can_handle(&tree, &[]);
        assert!(matched);
        assert!(confidence >= 0.9);
    }
}
