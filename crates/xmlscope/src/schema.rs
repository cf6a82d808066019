//! The schema inspector.
//!
//! A single pure operation, [`inspect`], walking a [`ParsedTree`] once to
//! compute structural metrics.

use crate::parser::ParsedTree;
use serde::{Deserialize, Serialize};

/// Structural summary of a parsed document. Pure function of `ParsedTree`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRecord {
    pub root_tag: String,
    pub total_elements: usize,
    pub max_depth: usize,
    /// Prefix -> URI, default namespace keyed by `""`.
    pub namespace_map: Vec<(String, String)>,
    /// Tag names in first-seen (document) order, each appearing once.
    pub distinct_tag_list: Vec<String>,
    /// Attribute name -> occurrence count across the whole tree, in
    /// first-seen order.
    pub attribute_frequency_map: Vec<(String, usize)>,
}

/// Walk `tree` and compute its [`SchemaRecord`].
pub fn inspect(tree: &ParsedTree) -> SchemaRecord {
    let root_tag = tree.root_element().tag.clone();
    let mut total_elements = 0usize;
    let mut max_depth = 0usize;
    let mut distinct_tags: Vec<String> = Vec::new();
    let mut attribute_counts: Vec<(String, usize)> = Vec::new();

    let mut stack: Vec<(crate::parser::ElementId, usize)> = vec![(tree.root(), 1)];
    while let Some((id, depth)) = stack.pop() {
        total_elements += 1;
        max_depth = max_depth.max(depth);

        let element = tree.element(id);
        if !distinct_tags.iter().any(|t| t == &element.tag) {
            distinct_tags.push(element.tag.clone());
        }
        for (name, _) in &element.attributes {
            match attribute_counts.iter_mut().find(|(n, _)| n == name) {
                Some((_, count)) => *count += 1,
                None => attribute_counts.push((name.clone(), 1)),
            }
        }

        for &child in tree.children_of(id).iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    SchemaRecord {
        root_tag,
        total_elements,
        max_depth,
        namespace_map: tree.namespace_map().to_vec(),
        distinct_tag_list: distinct_tags,
        attribute_frequency_map: attribute_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_bytes;

    #[test]
    fn single_element_has_depth_one() {
        let tree = parse_bytes(b"<root/>").unwrap();
        let record = inspect(&tree);
        assert_eq!(record.max_depth, 1);
        assert_eq!(record.total_elements, 1);
        assert_eq!(record.root_tag, "root");
    }

    #[test]
    fn nested_elements_compute_depth_and_counts() {
        let tree = parse_bytes(
            b"<root><a><b/></a><a id=\"2\"/></root>",
        )
        .unwrap();
        let record = inspect(&tree);
        assert_eq!(record.max_depth, 3);
        assert_eq!(record.total_elements, 4);
        assert_eq!(record.distinct_tag_list, vec!["root", "a", "b"]);
        assert_eq!(
            record.attribute_frequency_map.iter().find(|(n, _)| n == "id"),
            Some(&("id".to_string(), 1))
        );
    }
}
