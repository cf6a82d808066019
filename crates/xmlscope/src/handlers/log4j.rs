//! Log4j configuration handler (classic log4j 1.x `log4j:configuration`
//! and log4j2's `Configuration` root).

use super::{find_all, DocumentTypeInfo, Handler, NamespaceMap, SpecializedAnalysis};
use crate::parser::ParsedTree;
use std::path::Path;
use xmlscope_core::StructuredValue;

#[derive(Debug, Default)]
pub struct Log4jConfigHandler;

impl Handler for Log4jConfigHandler {
    fn name(&self) -> &str {
        "Log4j Configuration"
    }

    fn can_handle(&self, tree: &ParsedTree, _namespaces: &NamespaceMap) -> (bool, f64) {
        let root_tag = tree.root_element().tag.as_str();
        let is_classic = root_tag == "configuration" && !find_all(tree, "appender").is_empty();
        let is_log4j2 = root_tag == "Configuration"
            && (!find_all(tree, "Appenders").is_empty() || !find_all(tree, "Loggers").is_empty());
        match (is_classic, is_log4j2) {
            (true, _) => (true, 0.9),
            (_, true) => (true, 0.9),
            _ => (false, 0.0),
        }
    }

    fn detect_type(&self, tree: &ParsedTree, namespaces: &NamespaceMap) -> DocumentTypeInfo {
        let version = if tree.root_element().tag == "Configuration" { "2.x" } else { "1.x" };
        DocumentTypeInfo::new("Log4j Configuration", self.can_handle(tree, namespaces).1)
            .with_version(version)
    }

    fn analyze(&self, tree: &ParsedTree, file_path: &Path) -> SpecializedAnalysis {
        let doc_type = self.detect_type(tree, &[]);
        let appender_count = find_all(tree, "appender").len() + find_all(tree, "Appender").len();
        let mut key_findings = StructuredValue::map();
        key_findings.insert("appender_count", appender_count);
        key_findings.insert(
            "logger_count",
            find_all(tree, "logger").len() + find_all(tree, "Logger").len(),
        );

        SpecializedAnalysis {
            doc_type,
            key_findings,
            structured_data: self.extract_key_data(tree),
            ai_use_cases: vec!["logging-pipeline migration".to_string()],
            quality_metrics: vec![],
            file_path: file_path.display().to_string(),
            handler_used: "Log4j Configuration".to_string(),
            namespaces: Vec::new(),
        }
    }

    fn extract_key_data(&self, tree: &ParsedTree) -> StructuredValue {
        let mut data = StructuredValue::map();
        data.insert(
            "appender_count",
            find_all(tree, "appender").len() + find_all(tree, "Appender").len(),
        );
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_bytes;

    #[test]
    fn matches_classic_log4j_configuration() {
        let tree = parse_bytes(
            br#"<configuration><appender name="console"/><logger name="root"/></configuration>"#,
        )
        .unwrap();
        assert_eq!(Log4jConfigHandler.can_handle(&tree, &[]), (true, 0.9));
    }

    #[test]
    fn matches_log4j2_configuration() {
        let tree = parse_bytes(
            br#"<Configuration><Appenders><Console name="c"/></Appenders><Loggers/></Configuration>"#,
        )
        .unwrap();
        assert_eq!(Log4jConfigHandler.can_handle(&tree, &[]), (true, 0.9));
    }
}
