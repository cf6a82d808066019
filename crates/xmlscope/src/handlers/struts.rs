//! Apache Struts configuration handler (`struts-config.xml` / `struts.xml`).

use super::{find_all, DocumentTypeInfo, Handler, NamespaceMap, SpecializedAnalysis};
use crate::parser::ParsedTree;
use std::path::Path;
use xmlscope_core::StructuredValue;

#[derive(Debug, Default)]
pub struct StrutsConfigHandler;

impl Handler for StrutsConfigHandler {
    fn name(&self) -> &str {
        "Struts Configuration"
    }

    fn can_handle(&self, tree: &ParsedTree, _namespaces: &NamespaceMap) -> (bool, f64) {
        match tree.root_element().tag.as_str() {
            "struts-config" => (true, 0.95),
            "struts" if !find_all(tree, "package").is_empty() => (true, 0.9),
            _ => (false, 0.0),
        }
    }

    fn detect_type(&self, tree: &ParsedTree, namespaces: &NamespaceMap) -> DocumentTypeInfo {
        let version = if tree.root_element().tag == "struts-config" { "1.x" } else { "2.x" };
        DocumentTypeInfo::new("Struts Configuration", self.can_handle(tree, namespaces).1)
            .with_version(version)
    }

    fn analyze(&self, tree: &ParsedTree, file_path: &Path) -> SpecializedAnalysis {
        let doc_type = self.detect_type(tree, &[]);
        let mut key_findings = StructuredValue::map();
        key_findings.insert(
            "action_count",
            find_all(tree, "action").len() + find_all(tree, "action-mapping").len(),
        );

        SpecializedAnalysis {
            doc_type,
            key_findings,
            structured_data: self.extract_key_data(tree),
            ai_use_cases: vec!["MVC routing migration analysis".to_string()],
            quality_metrics: vec![],
            file_path: file_path.display().to_string(),
            handler_used: "Struts Configuration".to_string(),
            namespaces: Vec::new(),
        }
    }

    fn extract_key_data(&self, tree: &ParsedTree) -> StructuredValue {
        let mut data = StructuredValue::map();
        data.insert("package_count", find_all(tree, "package").len());
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_bytes;

    #[test]
    fn matches_struts1_config_root() {
        let tree = parse_bytes(br#"<struts-config><action-mappings/></struts-config>"#).unwrap();
        assert_eq!(StrutsConfigHandler.can_handle(&tree, &[]), (true, 0.95));
    }

    #[test]
    fn matches_struts2_config_with_packages() {
        let tree = parse_bytes(br#"<struts><package name="default"/></struts>"#).unwrap();
        assert_eq!(StrutsConfigHandler.can_handle(&tree, &[]), (true, 0.9));
    }
}
