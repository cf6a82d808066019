//! Hibernate ORM `*.hbm.xml` mapping handler.

use super::{find_all, DocumentTypeInfo, Handler, NamespaceMap, SpecializedAnalysis};
use crate::parser::ParsedTree;
use std::path::Path;
use xmlscope_core::StructuredValue;

#[derive(Debug, Default)]
pub struct HibernateMappingHandler;

impl Handler for HibernateMappingHandler {
    fn name(&self) -> &str {
        "Hibernate Mapping"
    }

    fn can_handle(&self, tree: &ParsedTree, _namespaces: &NamespaceMap) -> (bool, f64) {
        if tree.root_element().tag != "hibernate-mapping" {
            return (false, 0.0);
        }
        (true, 0.95)
    }

    fn detect_type(&self, tree: &ParsedTree, namespaces: &NamespaceMap) -> DocumentTypeInfo {
        DocumentTypeInfo::new("Hibernate Mapping", self.can_handle(tree, namespaces).1)
    }

    fn analyze(&self, tree: &ParsedTree, file_path: &Path) -> SpecializedAnalysis {
        let doc_type = self.detect_type(tree, &[]);
        let classes = find_all(tree, "class");
        let mut key_findings = StructuredValue::map();
        key_findings.insert("class_count", classes.len());
        key_findings.insert("property_count", find_all(tree, "property").len());

        SpecializedAnalysis {
            doc_type,
            key_findings,
            structured_data: self.extract_key_data(tree),
            ai_use_cases: vec!["ORM schema migration analysis".to_string()],
            quality_metrics: vec![],
            file_path: file_path.display().to_string(),
            handler_used: "Hibernate Mapping".to_string(),
            namespaces: Vec::new(),
        }
    }

    fn extract_key_data(&self, tree: &ParsedTree) -> StructuredValue {
        let classes: Vec<StructuredValue> = find_all(tree, "class")
            .into_iter()
            .map(|id| {
                let el = tree.element(id);
                let mut entry = StructuredValue::map();
                entry.insert("name", el.attribute("name").unwrap_or("").to_string());
                entry.insert("table", el.attribute("table").unwrap_or("").to_string());
                entry
            })
            .collect();
        let mut data = StructuredValue::map();
        data.insert("classes", StructuredValue::List(classes));
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_bytes;

    #[test]
    fn matches_hibernate_mapping_root() {
        let tree = parse_bytes(
            br#"<hibernate-mapping><class name="com.example.User" table="users">
                <property name="email"/>
            </class></hibernate-mapping>"#,
        )
        .unwrap();
        assert_eq!(HibernateMappingHandler.can_handle(&tree, &[]), (true, 0.95));
    }
}
