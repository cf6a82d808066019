//! Auto-selection policy: pick a concrete strategy from a document's
//! detected dialect and structural shape, without requiring the caller to
//! know anything about chunking internals.

use super::Strategy;
use crate::handlers::Handler;
use crate::parser::ParsedTree;
use crate::schema::SchemaRecord;

/// Dialects whose documents are configuration-shaped (deeply nested,
/// dependency/target graphs) and so chunk best along element boundaries.
const CONFIGURATION_LIKE_DIALECTS: &[&str] = &[
    "Maven POM",
    "Apache Ant",
    "Spring Beans",
    "Hibernate Mapping",
    "Log4j Configuration",
    "Apache Ivy",
    "Struts Configuration",
];

/// Documents at or below this depth or element count are considered small
/// enough that a flat sliding window is simpler and just as effective as
/// hierarchical grouping.
const SHALLOW_DEPTH_THRESHOLD: usize = 3;
const SMALL_ELEMENT_COUNT_THRESHOLD: usize = 20;

/// Resolve [`Strategy::Auto`] to one of the three concrete strategies.
/// Order of checks matters: configuration dialects win outright, then
/// shallow/small documents fall to sliding-window, then handlers that
/// declare section roots get content-aware, and anything else defaults to
/// hierarchical.
pub fn select_strategy(
    tree: &ParsedTree,
    schema: &SchemaRecord,
    handler: &dyn Handler,
    type_name: &str,
) -> Strategy {
    if CONFIGURATION_LIKE_DIALECTS.contains(&type_name) {
        return Strategy::Hierarchical;
    }
    if schema.max_depth <= SHALLOW_DEPTH_THRESHOLD || schema.total_elements <= SMALL_ELEMENT_COUNT_THRESHOLD {
        return Strategy::SlidingWindow;
    }
    // A handler "exposes section-root hints" if it declares at least one
    // for this document; Generic's default empty `section_roots` means it
    // never qualifies here.
    if !handler.section_roots(tree).is_empty() {
        return Strategy::ContentAware;
    }
    Strategy::Hierarchical
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{GenericHandler, MavenPomHandler, RssFeedHandler};
    use crate::parser::parse_bytes;
    use crate::schema;

    #[test]
    fn configuration_dialect_always_picks_hierarchical() {
        let tree = parse_bytes(b"<project><modelVersion>4.0.0</modelVersion></project>").unwrap();
        let record = schema::inspect(&tree);
        assert_eq!(
            select_strategy(&tree, &record, &MavenPomHandler, "Maven POM"),
            Strategy::Hierarchical
        );
    }

    #[test]
    fn shallow_document_picks_sliding_window() {
        let tree = parse_bytes(b"<root><a/><b/></root>").unwrap();
        let record = schema::inspect(&tree);
        assert_eq!(
            select_strategy(&tree, &record, &GenericHandler, "Generic XML"),
            Strategy::SlidingWindow
        );
    }

    #[test]
    fn deep_document_defaults_to_hierarchical_without_section_roots() {
        let mut doc = String::from("<root>");
        for _ in 0..30 {
            doc.push_str("<level><inner/></level>");
        }
        doc.push_str("</root>");
        let tree = parse_bytes(doc.as_bytes()).unwrap();
        let record = schema::inspect(&tree);
        assert!(record.total_elements > SMALL_ELEMENT_COUNT_THRESHOLD);
        assert_eq!(
            select_strategy(&tree, &record, &RssFeedHandler, "Unrecognized"),
            Strategy::Hierarchical
        );
    }

    #[test]
    fn deep_document_with_section_roots_picks_content_aware() {
        let items: String = (0..25).map(|i| format!("<item id=\"{i}\"><inner/></item>")).collect();
        let doc = format!("<rss version=\"2.0\"><channel>{items}</channel></rss>");
        let tree = parse_bytes(doc.as_bytes()).unwrap();
        let record = schema::inspect(&tree);
        assert!(record.total_elements > SMALL_ELEMENT_COUNT_THRESHOLD);
        assert_eq!(
            select_strategy(&tree, &record, &RssFeedHandler, "RSS Feed"),
            Strategy::ContentAware
        );
    }
}
