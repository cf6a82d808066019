//! Sliding-window chunking: serialize the whole tree once, then slide a
//! `max_chunk_size`-character window forward by
//! `max_chunk_size - overlap_size` until the document is exhausted.

use super::{escape_attr, escape_text, Chunk, ChunkingConfig};
use crate::parser::{ElementId, ParsedTree};

pub fn chunk(tree: &ParsedTree, config: &ChunkingConfig) -> Vec<Chunk> {
    let mut spans = Vec::new();
    let mut full_text = String::new();
    render(tree, tree.root(), &mut full_text, &mut spans);

    if full_text.is_empty() {
        return Vec::new();
    }

    let step = config.max_chunk_size.saturating_sub(config.overlap_size).max(1);

    let mut windows: Vec<(usize, usize)> = Vec::new();
    let mut start = 0usize;
    loop {
        let remaining = full_text.len() - start;
        if remaining < config.min_chunk_size && !windows.is_empty() {
            // Residual shorter than min_chunk_size: extend the previous
            // window backward instead of emitting a tiny tail window.
            if let Some(last) = windows.last_mut() {
                last.1 = full_text.len();
                last.0 = last.0.min(full_text.len().saturating_sub(config.max_chunk_size));
            }
            break;
        }

        let end = (start + config.max_chunk_size).min(full_text.len());
        windows.push((start, end));
        if end >= full_text.len() {
            break;
        }
        start += step;
    }

    windows
        .into_iter()
        .map(|(start, end)| build_chunk(tree, &full_text, &spans, start, end))
        .collect()
}

/// Render the subtree rooted at `id` into `out`, recording each visited
/// element's `(id, start, end)` byte span as it goes. Mirrors
/// `serialize_subtree`'s shape exactly so offsets always line up with the
/// text actually produced.
fn render(tree: &ParsedTree, id: ElementId, out: &mut String, spans: &mut Vec<(ElementId, usize, usize)>) {
    let start = out.len();
    let element = tree.element(id);

    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }

    let children = tree.children_of(id).to_vec();
    if children.is_empty() && element.text.is_empty() {
        out.push_str("/>");
    } else {
        out.push('>');
        out.push_str(&escape_text(&element.text));
        for child in children {
            render(tree, child, out, spans);
        }
        out.push_str("</");
        out.push_str(&element.tag);
        out.push('>');
    }

    spans.push((id, start, out.len()));
}

fn build_chunk(
    tree: &ParsedTree,
    full_text: &str,
    spans: &[(ElementId, usize, usize)],
    start: usize,
    end: usize,
) -> Chunk {
    let content = full_text[start..end].to_string();

    let intersecting: Vec<ElementId> = spans
        .iter()
        .filter(|(_, s, e)| *s < end && *e > start)
        .map(|(id, _, _)| *id)
        .collect();

    let mut elements_included: Vec<String> = Vec::new();
    let mut start_line = u32::MAX;
    let mut end_line = 0u32;
    for &id in &intersecting {
        let el = tree.element(id);
        if !elements_included.iter().any(|t| t == &el.tag) {
            elements_included.push(el.tag.clone());
        }
        if let Some(line) = el.line {
            start_line = start_line.min(line);
            end_line = end_line.max(line);
        }
    }
    if start_line == u32::MAX {
        start_line = 0;
    }

    // Smallest-span intersecting element stands in for "the element this
    // window is inside of"; its ancestor chain is the element_path.
    let innermost = intersecting
        .iter()
        .copied()
        .min_by_key(|&id| spans.iter().find(|(i, _, _)| *i == id).map(|(_, s, e)| e - s).unwrap_or(usize::MAX));
    let element_path = innermost.map(|id| super::ancestor_path(tree, id)).unwrap_or_default();

    Chunk {
        chunk_id: String::new(),
        content,
        element_path,
        start_line,
        end_line,
        elements_included,
        parent_context: None,
        metadata: Vec::new(),
        token_estimate: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_bytes;

    #[test]
    fn short_document_is_a_single_window() {
        let tree = parse_bytes(b"<root><a/><b/></root>").unwrap();
        let config = ChunkingConfig::default();
        let chunks = chunk(&tree, &config);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn windows_overlap_by_configured_amount() {
        let body: String = (0..50).map(|i| format!("<item id=\"{i}\">value-{i}</item>")).collect();
        let doc = format!("<root>{body}</root>");
        let tree = parse_bytes(doc.as_bytes()).unwrap();
        let config = ChunkingConfig::builder()
            .max_chunk_size(200)
            .min_chunk_size(50)
            .overlap_size(40)
            .build();
        let chunks = chunk(&tree, &config);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let overlap_a_tail = &a.content[a.content.len().saturating_sub(config.overlap_size)..];
            assert!(b.content.starts_with(overlap_a_tail) || b.content.contains(overlap_a_tail));
        }
    }

    #[test]
    fn every_window_respects_max_chunk_size() {
        let body: String = (0..80).map(|i| format!("<item id=\"{i}\">value-{i}</item>")).collect();
        let doc = format!("<root>{body}</root>");
        let tree = parse_bytes(doc.as_bytes()).unwrap();
        let config = ChunkingConfig::builder().max_chunk_size(300).overlap_size(30).build();
        let chunks = chunk(&tree, &config);
        for c in &chunks {
            assert!(c.content.len() <= config.max_chunk_size);
        }
    }
}
