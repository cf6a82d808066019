//! Hierarchical chunking: a depth-first walk that absorbs whole subtrees
//! into a buffer while they fit, and only recurses into a subtree once it
//! alone would overflow `max_chunk_size`.

use super::{common_ancestor_path, parent_context, serialize_subtree, Chunk, ChunkingConfig};
use crate::parser::{ElementId, ParsedTree};

pub fn chunk(tree: &ParsedTree, config: &ChunkingConfig) -> Vec<Chunk> {
    let mut builder = Builder {
        tree,
        config,
        chunks: Vec::new(),
        buffer: Vec::new(),
    };
    // Visit the true root, not just its children: the root element's own
    // tag, attributes, and text are otherwise never absorbed into any
    // buffer and vanish from the chunked output entirely. `visit` already
    // knows how to absorb a whole subtree when it fits and recurse into
    // children when it doesn't, so this is the same decision applied
    // uniformly at every depth, root included.
    builder.visit(tree.root());
    builder.flush();
    merge_undersized_chunks(builder.chunks, config)
}

struct Builder<'a> {
    tree: &'a ParsedTree,
    config: &'a ChunkingConfig,
    chunks: Vec<Chunk>,
    buffer: Vec<ElementId>,
}

impl<'a> Builder<'a> {
    fn buffer_len(&self) -> usize {
        self.buffer.iter().map(|&id| serialize_subtree(self.tree, id).len()).sum()
    }

    fn visit(&mut self, id: ElementId) {
        let subtree_len = serialize_subtree(self.tree, id).len();

        if subtree_len > self.config.max_chunk_size {
            // The subtree alone overflows: flush what we have, then
            // recurse instead of absorbing it whole.
            self.flush();
            for &child in self.tree.children_of(id) {
                self.visit(child);
            }
            return;
        }

        if !self.buffer.is_empty() && self.buffer_len() + subtree_len > self.config.max_chunk_size {
            self.flush();
        }
        self.buffer.push(id);
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let ids = std::mem::take(&mut self.buffer);
        self.chunks.push(build_chunk(self.tree, self.config, &ids));
    }
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

/// Merge any chunk below `min_chunk_size` into its predecessor, provided
/// the combination still fits under `max_chunk_size`. A document whose
/// very first chunk is undersized is left alone — there is no predecessor
/// to merge into, and a document entirely smaller than `min_chunk_size`
/// is expected to produce a single short chunk.
fn merge_undersized_chunks(chunks: Vec<Chunk>, config: &ChunkingConfig) -> Vec<Chunk> {
    let mut merged: Vec<Chunk> = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        if let Some(prev) = merged.last_mut() {
            if chunk.content.len() < config.min_chunk_size
                && prev.content.len() + chunk.content.len() <= config.max_chunk_size
            {
                prev.content.push_str(&chunk.content);
                prev.end_line = prev.end_line.max(chunk.end_line);
                for tag in chunk.elements_included {
                    if !prev.elements_included.iter().any(|t| t == &tag) {
                        prev.elements_included.push(tag);
                    }
                }
                continue;
            }
        }
        merged.push(chunk);
    }
    merged
}
