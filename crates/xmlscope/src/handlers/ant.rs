//! Apache Ant `build.xml` handler.

use super::{find_all, find_first, DocumentTypeInfo, Handler, NamespaceMap, SpecializedAnalysis};
use crate::parser::ParsedTree;
use std::path::Path;
use xmlscope_core::StructuredValue;

#[derive(Debug, Default)]
pub struct AntBuildHandler;

impl Handler for AntBuildHandler {
    fn name(&self) -> &str {
        "Ant Build"
    }

    fn can_handle(&self, tree: &ParsedTree, _namespaces: &NamespaceMap) -> (bool, f64) {
        let root = tree.root_element();
        if root.tag != "project" {
            return (false, 0.0);
        }
        // A Maven POM also roots at <project>; the deciding signal is the
        // absence of <modelVersion> alongside the presence of Ant's
        // distinctive <target>/<taskdef> children and a "default" attribute.
        if find_first(tree, "modelVersion").is_some() {
            return (false, 0.0);
        }
        let target_count = find_all(tree, "target").len();
        if target_count == 0 {
            return (false, 0.0);
        }
        let has_default_attr = root.attribute("default").is_some();
        let confidence = if has_default_attr { 0.92 } else { 0.8 };
        (true, confidence)
    }

    fn detect_type(&self, tree: &ParsedTree, namespaces: &NamespaceMap) -> DocumentTypeInfo {
        let mut info = DocumentTypeInfo::new("Apache Ant", self.can_handle(tree, namespaces).1);
        if let Some(name) = tree.root_element().attribute("name") {
            info.metadata.push(("project_name".to_string(), name.to_string()));
        }
        info
    }

    fn analyze(&self, tree: &ParsedTree, file_path: &Path) -> SpecializedAnalysis {
        let doc_type = self.detect_type(tree, &[]);
        let mut key_findings = StructuredValue::map();
        key_findings.insert("target_count", find_all(tree, "target").len());
        key_findings.insert(
            "default_target",
            tree.root_element().attribute("default").unwrap_or("").to_string(),
        );

        SpecializedAnalysis {
            doc_type,
            key_findings,
            structured_data: self.extract_key_data(tree),
            ai_use_cases: vec!["build-script migration".to_string(), "CI pipeline analysis".to_string()],
            quality_metrics: vec![],
            file_path: file_path.display().to_string(),
            handler_used: "Apache Ant".to_string(),
            namespaces: Vec::new(),
        }
    }

    fn extract_key_data(&self, tree: &ParsedTree) -> StructuredValue {
        let targets: Vec<StructuredValue> = find_all(tree, "target")
            .into_iter()
            .map(|id| tree.element(id).attribute("name").unwrap_or("").into())
            .collect();
        let mut data = StructuredValue::map();
        data.insert("targets", StructuredValue::List(targets));
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_bytes;

    #[test]
    fn matches_ant_build_with_targets_and_default_attr() {
        let tree = parse_bytes(
            br#"<project name="demo" default="build">
                <target name="build"/>
                <target name="clean"/>
            </project>"#,
        )
        .unwrap();
        let handler = AntBuildHandler;
        let (matched, confidence) = handler.can_handle(&tree, &[]);
        assert!(matched);
        assert!(confidence >= 0.9);
    }

    #[test]
    fn does_not_shadow_maven_pom() {
        let tree = parse_bytes(
            br#"<project><modelVersion>4.0.0</modelVersion><target/></project>"#,
        )
        .unwrap();
        assert_eq!(AntBuildHandler.can_handle(&tree, &[]).0, false);
    }
}
