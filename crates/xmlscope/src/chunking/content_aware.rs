//! Content-aware chunking: group elements by the selected handler's
//! declared section roots (or, absent a hint, by the document's top-level
//! children), then run the hierarchical algorithm independently within
//! each group so that a group never crosses a chunk boundary unless it is
//! alone bigger than `max_chunk_size`.

use super::{common_ancestor_path, parent_context, serialize_subtree, Chunk, ChunkingConfig};
use crate::handlers::Handler;
use crate::parser::{ElementId, ParsedTree};

pub fn chunk(tree: &ParsedTree, handler: &dyn Handler, config: &ChunkingConfig) -> Vec<Chunk> {
    let section_roots = handler.section_roots(tree);
    let groups: Vec<ElementId> = if section_roots.is_empty() {
        // No hint: same root-omission hazard as the hierarchical strategy.
        // Absorb the whole document as one group when it fits — which
        // keeps the root's own tag/attributes in the output — and only
        // fall back to grouping by top-level children (losing that outer
        // frame, same as before) once the document alone overflows a
        // single chunk.
        if serialize_subtree(tree, tree.root()).len() <= config.max_chunk_size {
            vec![tree.root()]
        } else {
            tree.children_of(tree.root()).to_vec()
        }
    } else {
        // The handler names the elements it wants grouped (e.g. `<item>`),
        // but its siblings under the same parent (e.g. a channel's
        // `<title>`) are still part of the document and must land in some
        // chunk too, or content-aware chunking would silently drop them
        // and violate the partition invariant. Use the declared roots'
        // parent's full child list instead of the roots alone, so every
        // sibling gets its own group while items keep their individual
        // buffering/flushing behavior below.
        tree.element(section_roots[0])
            .parent
            .map(|parent| tree.children_of(parent).to_vec())
            .unwrap_or(section_roots)
    };

    let mut chunks = Vec::new();
    let mut group_buffer: Vec<ElementId> = Vec::new();
    let mut group_len = 0usize;

    for &group_root in &groups {
        let group_text_len = serialize_subtree(tree, group_root).len();

        if group_text_len > config.max_chunk_size {
            flush_group(tree, config, &mut group_buffer, &mut chunks);
            chunks.push(build_chunk(tree, config, &[group_root]));
            group_len = 0;
            continue;
        }

        if !group_buffer.is_empty() && group_len + group_text_len > config.max_chunk_size {
            flush_group(tree, config, &mut group_buffer, &mut chunks);
            group_len = 0;
        }
        group_buffer.push(group_root);
        group_len += group_text_len;
    }
    flush_group(tree, config, &mut group_buffer, &mut chunks);

    chunks
}

fn flush_group(tree: &ParsedTree, config: &ChunkingConfig, buffer: &mut Vec<ElementId>, chunks: &mut Vec<Chunk>) {
    if buffer.is_empty() {
        return;
    }
    let ids = std::mem::take(buffer);
    chunks.push(build_chunk(tree, config, &ids));
}

fn build_chunk(tree: &ParsedTree, config: &ChunkingConfig, ids: &[ElementId]) -> Chunk {
    let content: String = ids.iter().map(|&id| serialize_subtree(tree, id)).collect();

    let mut elements_included: Vec<String> = Vec::new();
    let mut start_line = u32::MAX;
    let mut end_line = 0u32;
    for &id in ids {
        for descendant in subtree_ids(tree, id) {
            let el = tree.element(descendant);
            if !elements_included.iter().any(|t| t == &el.tag) {
                elements_included.push(el.tag.clone());
            }
            if let Some(line) = el.line {
                start_line = start_line.min(line);
                end_line = end_line.max(line);
            }
        }
    }
    if start_line == u32::MAX {
        start_line = 0;
    }

    let element_path = common_ancestor_path(tree, ids);
    let context = if config.include_ancestors {
        parent_context(tree, ids[0])
    } else {
        None
    };

    Chunk {
        chunk_id: String::new(),
        content,
        element_path,
        start_line,
        end_line,
        elements_included,
        parent_context: context,
        metadata: Vec::new(),
        token_estimate: 0,
    }
}

fn subtree_ids(tree: &ParsedTree, root: ElementId) -> Vec<ElementId> {
    let mut ids = vec![root];
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        for &child in tree.children_of(id) {
            ids.push(child);
            stack.push(child);
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::RssFeedHandler;
    use crate::parser::parse_bytes;

    #[test]
    fn one_chunk_per_section_root_when_items_are_large() {
        let items: String = (0..3)
            .map(|i| format!(r#"<item><title>Item {i}</title><description>{}</description></item>"#, "z".repeat(900)))
            .collect();
        let doc = format!(r#"<rss version="2.0"><channel><title>Feed</title>{items}</channel></rss>"#);
        let tree = parse_bytes(doc.as_bytes()).unwrap();
        let handler = RssFeedHandler;
        let config = ChunkingConfig::builder().max_chunk_size(1000).build();
        let chunks = chunk(&tree, &handler, &config);

        let item_chunks = chunks
            .iter()
            .filter(|c| c.elements_included.iter().any(|t| t == "item"))
            .count();
        assert_eq!(item_chunks, 3);
    }

    #[test]
    fn channel_level_siblings_of_section_roots_still_get_a_chunk() {
        // Regression: section_roots() only names <item>, but <title> is a
        // sibling under the same <channel> and must not be dropped.
        let doc = br#"<rss version="2.0"><channel>
            <title>Feed</title>
            <item><title>One</title></item>
            <item><title>Two</title></item>
            <item><title>Three</title></item>
        </channel></rss>"#;
        let tree = parse_bytes(doc).unwrap();
        let handler = RssFeedHandler;
        let config = ChunkingConfig::default();
        let chunks = chunk(&tree, &handler, &config);

        let total_items: usize = chunks.iter().map(|c| c.content.matches("<item").count()).sum();
        assert_eq!(total_items, 3);
        let has_feed_title_chunk = chunks.iter().any(|c| c.content.contains("Feed"));
        assert!(has_feed_title_chunk, "channel <title> must land in some chunk");
    }

    #[test]
    fn falls_back_to_top_level_children_without_section_roots() {
        use crate::handlers::GenericHandler;
        let tree = parse_bytes(b"<root><a/><b/><c/></root>").unwrap();
        let handler = GenericHandler;
        let config = ChunkingConfig::default();
        let chunks = chunk(&tree, &handler, &config);
        assert_eq!(chunks.len(), 1);
        for tag in ["a", "b", "c"] {
            assert!(chunks[0].elements_included.iter().any(|t| t == tag));
        }
    }
}
