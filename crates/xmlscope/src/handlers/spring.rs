//! Spring Framework `beans.xml` handler.

use super::{find_all, namespaces_contain, DocumentTypeInfo, Handler, NamespaceMap, SpecializedAnalysis};
use crate::parser::ParsedTree;
use std::path::Path;
use xmlscope_core::StructuredValue;

const SPRING_BEANS_NAMESPACE: &str = "springframework.org/schema/beans";

#[derive(Debug, Default)]
pub struct SpringBeansHandler;

impl Handler for SpringBeansHandler {
    fn name(&self) -> &str {
        "Spring Beans"
    }

    fn can_handle(&self, tree: &ParsedTree, namespaces: &NamespaceMap) -> (bool, f64) {
        if tree.root_element().tag != "beans" {
            return (false, 0.0);
        }
        if namespaces_contain(namespaces, SPRING_BEANS_NAMESPACE) {
            return (true, 0.95);
        }
        if !find_all(tree, "bean").is_empty() {
            return (true, 0.7);
        }
        (false, 0.0)
    }

    fn detect_type(&self, tree: &ParsedTree, namespaces: &NamespaceMap) -> DocumentTypeInfo {
        DocumentTypeInfo::new("Spring Beans", self.can_handle(tree, namespaces).1)
    }

    fn analyze(&self, tree: &ParsedTree, file_path: &Path) -> SpecializedAnalysis {
        let doc_type = self.detect_type(tree, tree.namespace_map());
        let beans = find_all(tree, "bean");
        let mut key_findings = StructuredValue::map();
        key_findings.insert("bean_count", beans.len());
        key_findings.insert(
            "singleton_count",
            beans
                .iter()
                .filter(|&&id| tree.element(id).attribute("scope") != Some("prototype"))
                .count(),
        );

        SpecializedAnalysis {
            doc_type,
            key_findings,
            structured_data: self.extract_key_data(tree),
            ai_use_cases: vec!["dependency-injection graph analysis".to_string()],
            quality_metrics: vec![],
            file_path: file_path.display().to_string(),
            handler_used: "Spring Beans".to_string(),
            namespaces: tree.namespace_map().to_vec(),
        }
    }

    fn extract_key_data(&self, tree: &ParsedTree) -> StructuredValue {
        let beans: Vec<StructuredValue> = find_all(tree, "bean")
            .into_iter()
            .map(|id| {
                let el = tree.element(id);
                let mut entry = StructuredValue::map();
                entry.insert("id", el.attribute("id").unwrap_or("").to_string());
                entry.insert("class", el.attribute("class").unwrap_or("").to_string());
                entry
            })
            .collect();
        let mut data = StructuredValue::map();
        data.insert("beans", StructuredValue::List(beans));
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_bytes;

    #[test]
    fn matches_beans_root_with_spring_namespace() {
        let tree = parse_bytes(
            br#"<beans xmlns="http://www.springframework.org/schema/beans">
                <bean id="a" class="com.example.A"/>
            </beans>"#,
        )
        .unwrap();
        let (matched, confidence) = SpringBeansHandler.can_handle(&tree, tree.namespace_map());
        assert!(matched);
        assert!(confidence >= 0.9);
    }
}
