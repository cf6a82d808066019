//! Maven POM (`pom.xml`) handler.

use super::{find_all, find_first, namespaces_contain, DocumentTypeInfo, Handler, NamespaceMap, SpecializedAnalysis};
use crate::parser::ParsedTree;
use std::path::Path;
use xmlscope_core::StructuredValue;

const MAVEN_NAMESPACE_HINT: &str = "maven.apache.org/POM";

#[derive(Debug, Default)]
pub struct MavenPomHandler;

impl Handler for MavenPomHandler {
    fn name(&self) -> &str {
        "Maven POM"
    }

    fn can_handle(&self, tree: &ParsedTree, namespaces: &NamespaceMap) -> (bool, f64) {
        let root = tree.root_element();
        if root.tag != "project" {
            return (false, 0.0);
        }
        let has_model_version = find_first(tree, "modelVersion").is_some();
        let has_maven_ns = namespaces_contain(namespaces, MAVEN_NAMESPACE_HINT);

        match (has_model_version, has_maven_ns) {
            (true, true) => (true, 0.98),
            (true, false) => (true, 0.9),
            (false, true) => (true, 0.75),
            (false, false) => (false, 0.0),
        }
    }

    fn detect_type(&self, tree: &ParsedTree, _namespaces: &NamespaceMap) -> DocumentTypeInfo {
        let version = find_first(tree, "modelVersion")
            .map(|id| tree.element(id).text.trim().to_string());
        let mut info = DocumentTypeInfo::new("Maven POM", self.can_handle(tree, &[]).1);
        if let Some(v) = version {
            info = info.with_version(v);
        }
        info
    }

    fn analyze(&self, tree: &ParsedTree, file_path: &Path) -> SpecializedAnalysis {
        let (_, confidence) = self.can_handle(tree, &[]);
        let doc_type = self.detect_type(tree, &[]);
        let structured_data = self.extract_key_data(tree);

        let mut key_findings = StructuredValue::map();
        key_findings.insert(
            "group_id",
            find_first(tree, "groupId")
                .map(|id| tree.element(id).text.trim().to_string())
                .unwrap_or_default(),
        );
        key_findings.insert(
            "artifact_id",
            find_first(tree, "artifactId")
                .map(|id| tree.element(id).text.trim().to_string())
                .unwrap_or_default(),
        );
        let dependency_count = find_all(tree, "dependency").len();
        key_findings.insert("dependency_count", dependency_count);
        let plugin_count = find_all(tree, "plugin").len();
        key_findings.insert("plugin_count", plugin_count);
        let module_count = find_all(tree, "module").len();
        key_findings.insert("module_count", module_count);

        SpecializedAnalysis {
            doc_type,
            key_findings,
            structured_data,
            ai_use_cases: vec![
                "dependency graph construction".to_string(),
                "build-tooling migration assistance".to_string(),
                "vulnerable-dependency scanning".to_string(),
            ],
            quality_metrics: vec![("structure_confidence".to_string(), confidence)],
            file_path: file_path.display().to_string(),
            handler_used: "Maven POM".to_string(),
            namespaces: Vec::new(),
        }
    }

    fn extract_key_data(&self, tree: &ParsedTree) -> StructuredValue {
        let mut data = StructuredValue::map();
        let dependencies: Vec<StructuredValue> = find_all(tree, "dependency")
            .into_iter()
            .map(|dep_id| {
                let mut entry = StructuredValue::map();
                for child in tree.children_of(dep_id) {
                    let element = tree.element(*child);
                    if matches!(element.tag.as_str(), "groupId" | "artifactId" | "version" | "scope") {
                        entry.insert(element.tag.clone(), element.text.trim().to_string());
                    }
                }
                entry
            })
            .collect();
        data.insert("dependencies", StructuredValue::List(dependencies));
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_bytes;

    const SAMPLE: &[u8] = br#"<project>
        <modelVersion>4.0.0</modelVersion>
        <groupId>com.example</groupId>
        <artifactId>demo</artifactId>
        <dependencies>
            <dependency><groupId>org.a</groupId><artifactId>b</artifactId><version>1.0</version></dependency>
        </dependencies>
    </project>"#;

    #[test]
    fn matches_project_with_model_version_at_high_confidence() {
        let tree = parse_bytes(SAMPLE).unwrap();
        let handler = MavenPomHandler;
        let (matched, confidence) = handler.can_handle(&tree, &[]);
        assert!(matched);
        assert!(confidence >= 0.9);
    }

    #[test]
    fn does_not_match_non_project_root() {
        let tree = parse_bytes(b"<thing/>").unwrap();
        let handler = MavenPomHandler;
        assert_eq!(handler.can_handle(&tree, &[]).0, false);
    }

    #[test]
    fn analyze_extracts_dependency_count() {
        let tree = parse_bytes(SAMPLE).unwrap();
        let handler = MavenPomHandler;
        let analysis = handler.analyze(&tree, Path::new("pom.xml"));
        assert_eq!(
            analysis.key_findings.get("dependency_count"),
            Some(&StructuredValue::Number(1.0))
        );
    }
}
