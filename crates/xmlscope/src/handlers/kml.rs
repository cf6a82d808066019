//! Keyhole Markup Language (KML) handler.

use super::{find_all, namespaces_contain, DocumentTypeInfo, Handler, NamespaceMap, SpecializedAnalysis};
use crate::parser::ParsedTree;
use std::path::Path;
use xmlscope_core::StructuredValue;

const KML_NAMESPACE: &str = "opengis.net/kml";

#[derive(Debug, Default)]
pub struct KmlHandler;

impl Handler for KmlHandler {
    fn name(&self) -> &str {
        "KML"
    }

    fn can_handle(&self, tree: &ParsedTree, namespaces: &NamespaceMap) -> (bool, f64) {
        if tree.root_element().tag != "kml" {
            return (false, 0.0);
        }
        if namespaces_contain(namespaces, KML_NAMESPACE) {
            return (true, 0.97);
        }
        if !find_all(tree, "Placemark").is_empty() {
            return (true, 0.85);
        }
        (true, 0.6)
    }

    fn detect_type(&self, tree: &ParsedTree, namespaces: &NamespaceMap) -> DocumentTypeInfo {
        DocumentTypeInfo::new("KML", self.can_handle(tree, namespaces).1)
    }

    fn analyze(&self, tree: &ParsedTree, file_path: &Path) -> SpecializedAnalysis {
        let doc_type = self.detect_type(tree, tree.namespace_map());
        let placemarks = find_all(tree, "Placemark");
        let mut key_findings = StructuredValue::map();
        key_findings.insert("placemark_count", placemarks.len());
        key_findings.insert("folder_count", find_all(tree, "Folder").len());
        key_findings.insert(
            "geometry_counts",
            {
                let mut m = StructuredValue::map();
                m.insert("Point", find_all(tree, "Point").len());
                m.insert("LineString", find_all(tree, "LineString").len());
                m.insert("Polygon", find_all(tree, "Polygon").len());
                m
            },
        );

        SpecializedAnalysis {
            doc_type,
            key_findings,
            structured_data: self.extract_key_data(tree),
            ai_use_cases: vec![
                "geospatial search indexing".to_string(),
                "map-layer summarization".to_string(),
            ],
            quality_metrics: vec![],
            file_path: file_path.display().to_string(),
            handler_used: "KML".to_string(),
            namespaces: tree.namespace_map().to_vec(),
        }
    }

    fn extract_key_data(&self, tree: &ParsedTree) -> StructuredValue {
        let placemarks: Vec<StructuredValue> = find_all(tree, "Placemark")
            .into_iter()
            .map(|id| {
                let mut entry = StructuredValue::map();
                for child in tree.children_of(id) {
                    let el = tree.element(*child);
                    if matches!(el.tag.as_str(), "name" | "description") {
                        entry.insert(el.tag.clone(), el.text.trim().to_string());
                    }
                }
                entry
            })
            .collect();
        let mut data = StructuredValue::map();
        data.insert("placemarks", StructuredValue::List(placemarks));
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_bytes;

    #[test]
    fn matches_kml_root_with_namespace() {
        let tree = parse_bytes(
            br#"<kml xmlns="http://www.opengis.net/kml/2.2"><Document>
                <Placemark><name>A</name><Point><coordinates>0,0</coordinates></Point></Placemark>
            </Document></kml>"#,
        )
        .unwrap();
        let (matched, confidence) = KmlHandler.can_handle(&tree, tree.namespace_map());
        assert!(matched);
        assert!(confidence >= 0.95);
    }
}
