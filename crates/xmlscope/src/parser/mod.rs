//! The safe parser.
//!
//! `parse` is the only operation in this crate allowed to raise: every
//! error taxonomy member that originates here is defined in
//! [`crate::error::Error`].

mod security;
pub mod tree;

pub use tree::{Element, ElementId, ParsedTree};

use crate::error::{Error, LineColumn, Result};
use std::path::Path;

/// Default byte ceiling enforced by [`parse`] when the caller does not
/// supply one: 100 MiB.
pub const DEFAULT_MAX_BYTES: u64 = 100 * 1024 * 1024;

/// Parse the file at `path` into an immutable [`ParsedTree`], rejecting
/// entity expansion, external entities, external DTDs, and oversized
/// input. `max_bytes` of `None` uses [`DEFAULT_MAX_BYTES`].
pub fn parse(path: &Path, max_bytes: Option<u64>) -> Result<ParsedTree> {
    let max_bytes = max_bytes.unwrap_or(DEFAULT_MAX_BYTES);

    let metadata = std::fs::metadata(path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(path.to_path_buf())
        } else {
            Error::Unreadable(path.to_path_buf())
        }
    })?;

    if metadata.len() > max_bytes {
        return Err(Error::FileTooLarge {
            size: metadata.len(),
            max_bytes,
        });
    }

    let raw = std::fs::read(path).map_err(|_| Error::Unreadable(path.to_path_buf()))?;
    parse_bytes(&raw)
}

/// Parse an already-loaded byte buffer. Exposed so tests and embedding
/// hosts can exercise the security pipeline without touching the
/// filesystem; [`parse`] is the façade entry point used by the top-level
/// crate functions.
pub fn parse_bytes(raw: &[u8]) -> Result<ParsedTree> {
    if raw.is_empty() {
        return Err(Error::Malformed {
            message: "empty document".to_string(),
            at: None,
        });
    }

    let decoded = decode_to_utf8(raw)?;
    let sanitized = security::sanitize(decoded.as_bytes())?;
    let text = std::str::from_utf8(&sanitized.bytes).map_err(|_| Error::Malformed {
        message: "document is not valid UTF-8 after sanitization".to_string(),
        at: None,
    })?;

    if text.trim().is_empty() {
        return Err(Error::Malformed {
            message: "empty document".to_string(),
            at: None,
        });
    }

    let opts = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };

    let doc = roxmltree::Document::parse_with_options(text, opts).map_err(|err| {
        let at = text_pos_of(text, err.pos());
        Error::Malformed {
            message: err.to_string(),
            at: Some(at),
        }
    })?;

    build_tree(&doc, sanitized.entity_metadata)
}

fn text_pos_of(_text: &str, pos: roxmltree::TextPos) -> LineColumn {
    LineColumn {
        line: pos.row,
        column: pos.col,
    }
}

/// Decode the input to UTF-8, honoring a UTF-16 BOM and stripping a UTF-8
/// BOM if present. Mismatches between a declared XML encoding and the
/// observed bytes are treated as `Malformed`.
fn decode_to_utf8(raw: &[u8]) -> Result<String> {
    if raw.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return std::str::from_utf8(&raw[3..])
            .map(str::to_string)
            .map_err(|_| Error::Malformed {
                message: "invalid UTF-8 after BOM".to_string(),
                at: None,
            });
    }
    if raw.starts_with(&[0xFF, 0xFE]) {
        return decode_utf16(&raw[2..], true);
    }
    if raw.starts_with(&[0xFE, 0xFF]) {
        return decode_utf16(&raw[2..], false);
    }
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|_| Error::Malformed {
            message: "document is not UTF-8 and carries no recognized BOM".to_string(),
            at: None,
        })
}

fn decode_utf16(bytes: &[u8], little_endian: bool) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Error::Malformed {
            message: "UTF-16 document has an odd number of trailing bytes".to_string(),
            at: None,
        });
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| {
            if little_endian {
                u16::from_le_bytes([chunk[0], chunk[1]])
            } else {
                u16::from_be_bytes([chunk[0], chunk[1]])
            }
        })
        .collect();
    String::from_utf16(&units).map_err(|_| Error::Malformed {
        message: "invalid UTF-16 sequence".to_string(),
        at: None,
    })
}

fn build_tree(doc: &roxmltree::Document, entity_metadata: Vec<(String, String)>) -> Result<ParsedTree> {
    let root_node = doc.root_element();

    let namespace_map: Vec<(String, String)> = root_node
        .namespaces()
        .map(|ns| (ns.name().unwrap_or("").to_string(), ns.uri().to_string()))
        .collect();

    let mut elements = Vec::new();
    let root_id = build_element(doc, root_node, None, &mut elements);

    Ok(ParsedTree::new(elements, root_id, namespace_map, entity_metadata))
}

fn build_element(
    doc: &roxmltree::Document,
    node: roxmltree::Node,
    parent: Option<ElementId>,
    elements: &mut Vec<Element>,
) -> ElementId {
    let attributes: Vec<(String, String)> = node
        .attributes()
        .map(|attr| (attr.name().to_string(), attr.value().to_string()))
        .collect();

    let mut own_text = String::new();
    for child in node.children() {
        if child.is_text() {
            if let Some(t) = child.text() {
                own_text.push_str(t);
            }
        }
    }

    let tag_pos = doc.text_pos_at(node.range().start);
    let (line, column) = (Some(tag_pos.row), Some(tag_pos.col));

    let id = elements.len();
    elements.push(Element {
        tag: node.tag_name().name().to_string(),
        namespace_uri: node.tag_name().namespace().map(str::to_string),
        attributes,
        children: Vec::new(),
        parent,
        text: own_text,
        line,
        column,
    });

    let mut child_ids = Vec::new();
    for child in node.children() {
        if child.is_element() {
            child_ids.push(build_element(doc, child, Some(id), elements));
        }
    }
    elements[id].children = child_ids;

    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_is_malformed() {
        let err = parse_bytes(b"").unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn whitespace_only_buffer_is_malformed() {
        let err = parse_bytes(b"   \n\t  ").unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn simple_document_parses_into_tree() {
        let tree = parse_bytes(b"<root><child a=\"1\">text</child></root>").unwrap();
        assert_eq!(tree.root_element().tag, "root");
        assert_eq!(tree.len(), 2);
        let child = tree.element(tree.children_of(tree.root())[0]);
        assert_eq!(child.tag, "child");
        assert_eq!(child.attribute("a"), Some("1"));
        assert_eq!(child.text, "text");
    }

    #[test]
    fn utf8_bom_is_tolerated() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"<root/>");
        let tree = parse_bytes(&bytes).unwrap();
        assert_eq!(tree.root_element().tag, "root");
    }

    #[test]
    fn xxe_document_is_rejected_before_tree_is_returned() {
        let doc = br#"<!DOCTYPE root [<!ENTITY xxe SYSTEM "file:///etc/passwd">]><root>&xxe;</root>"#;
        let err = parse_bytes(doc).unwrap_err();
        assert!(matches!(err, Error::SecurityRejected { reason: "external-entity", .. }));
    }
}
