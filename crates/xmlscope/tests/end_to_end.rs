//! End-to-end scenarios exercising the public façade
//! (`analyze_schema`, `analyze`, `chunk`) against fixture files and
//! inline documents.

use std::path::{Path, PathBuf};

use xmlscope::{analyze, analyze_schema, chunk, Error, Strategy};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

/// A Maven POM is detected at high confidence and its auto-selected
/// strategy is hierarchical, since build-tool dialects always win that
/// check outright.
#[test]
fn maven_pom_is_detected_and_chunked_hierarchically() {
    let path = fixture("pom.xml");

    let analysis = analyze(&path).unwrap();
    assert_eq!(analysis.type_name(), "Maven POM");
    assert!(analysis.confidence() >= 0.9);
    assert_eq!(
        analysis.key_findings.get("dependency_count"),
        Some(&xmlscope_core::StructuredValue::Number(2.0))
    );

    let schema = analyze_schema(&path).unwrap();
    assert_eq!(schema.root_tag, "project");

    let chunks = chunk(&path, Strategy::Auto, &Default::default()).unwrap();
    assert!(!chunks.is_empty());
    assert!(chunks.iter().any(|c| c.content.contains("commons-lang3")));
}

/// An RSS 2.0 feed with three items is detected as an RSS Feed at high
/// confidence, and every item survives into the chunk set produced by
/// the auto-selected (content-aware) strategy.
#[test]
fn rss_feed_is_detected_and_every_item_survives_chunking() {
    let path = fixture("rss_feed.xml");

    let analysis = analyze(&path).unwrap();
    assert_eq!(analysis.type_name(), "RSS Feed");
    assert!(analysis.confidence() >= 0.95);
    assert_eq!(
        analysis.key_findings.get("item_count"),
        Some(&xmlscope_core::StructuredValue::Number(3.0))
    );

    let chunks = chunk(&path, Strategy::Auto, &Default::default()).unwrap();
    assert!(!chunks.is_empty());
    assert!(chunks.iter().any(|c| c.content.contains("First Post")));
    assert!(chunks.iter().any(|c| c.content.contains("Second Post")));
    assert!(chunks.iter().any(|c| c.content.contains("Third Post")));
}

/// A document carrying an external-entity declaration is rejected by the
/// parser before any tree is built, never reaching handler dispatch.
#[test]
fn xxe_document_is_rejected_with_external_entity_reason() {
    let path = fixture("xxe_attack.xml");
    let err = analyze_schema(&path).unwrap_err();
    match err {
        Error::SecurityRejected { reason, .. } => assert_eq!(reason, "external-entity"),
        other => panic!("expected SecurityRejected, got {other:?}"),
    }
}

/// An empty file is malformed, not a crash or a silently-empty schema.
#[test]
fn empty_file_is_malformed() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("xmlscope-empty-{}.xml", std::process::id()));
    std::fs::write(&path, b"").unwrap();

    let result = analyze_schema(&path);
    std::fs::remove_file(&path).ok();

    match result.unwrap_err() {
        Error::Malformed { .. } => {}
        other => panic!("expected Malformed, got {other:?}"),
    }
}

/// A small KML document with several placemarks is detected as KML, and
/// its shallow depth routes the auto strategy to a sliding window rather
/// than hierarchical or content-aware chunking.
#[test]
fn kml_document_is_detected_and_uses_sliding_window_chunking() {
    let path = fixture("placemarks.kml");

    let schema = analyze_schema(&path).unwrap();
    assert_eq!(schema.root_tag, "kml");
    assert_eq!(schema.max_depth, 4);

    let analysis = analyze(&path).unwrap();
    assert_eq!(analysis.type_name(), "KML");
    assert!(analysis.confidence() >= 0.95);
    assert_eq!(
        analysis.key_findings.get("placemark_count"),
        Some(&xmlscope_core::StructuredValue::Number(6.0))
    );

    let chunks = chunk(&path, Strategy::Auto, &Default::default()).unwrap();
    assert!(!chunks.is_empty());
    assert!(chunks.iter().any(|c| c.content.contains("Site 1")));
}

/// Oversized input is rejected by a metadata check alone, before the file
/// contents are ever read.
#[test]
fn oversized_file_is_rejected_without_reading_its_contents() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("xmlscope-oversized-{}.xml", std::process::id()));
    std::fs::write(&path, b"<root/>").unwrap();

    let err = xmlscope::parser::parse(&path, Some(3)).unwrap_err();
    std::fs::remove_file(&path).ok();

    match err {
        Error::FileTooLarge { size, max_bytes } => {
            assert_eq!(max_bytes, 3);
            assert!(size > max_bytes);
        }
        other => panic!("expected FileTooLarge, got {other:?}"),
    }
}

/// A document the registry has no dedicated handler for still gets a
/// result, via the Generic fallback at confidence 0.5.
#[test]
fn unrecognized_dialect_falls_back_to_generic() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("xmlscope-generic-{}.xml", std::process::id()));
    std::fs::write(&path, b"<widgets><widget id=\"1\"/><widget id=\"2\"/></widgets>").unwrap();

    let analysis = analyze(&path);
    std::fs::remove_file(&path).ok();

    let analysis = analysis.unwrap();
    assert_eq!(analysis.type_name(), "Generic XML");
    assert!((analysis.confidence() - 0.5).abs() < f64::EPSILON);
}
