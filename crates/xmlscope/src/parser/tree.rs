//! The immutable, arena-backed parsed tree (`ParsedTree`) produced by the parser and
//! consumed by every downstream component.

/// Index into a `ParsedTree`'s element arena.
pub type ElementId = usize;

/// One XML element: a local tag, optional namespace URI, ordered
/// attributes, ordered children, and concatenated text payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub namespace_uri: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<ElementId>,
    pub parent: Option<ElementId>,
    /// Concatenated text and tail content directly owned by this element
    /// (not including descendant text).
    pub text: String,
    /// 1-based line of the opening tag, when the source span was available.
    pub line: Option<u32>,
    /// 1-based column of the opening tag, when the source span was available.
    pub column: Option<u32>,
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// An immutable in-memory representation of a single parsed XML document.
///
/// `ParsedTree` is a value: cloning is a deep copy, and nothing borrows the
/// original byte buffer, so records derived from it may safely outlive the
/// call that produced it — though a derived record should not outlive the
/// tree it was computed from unless the caller deep-copies it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTree {
    elements: Vec<Element>,
    root: ElementId,
    /// Namespace prefix -> URI, as declared at the document root. The
    /// default namespace (if any) is keyed by the empty string.
    namespace_map: Vec<(String, String)>,
    /// Metadata extracted by the parser itself before the tree was built
    /// (currently: the S1000D entity whitelist extraction), in declaration
    /// order.
    entity_metadata: Vec<(String, String)>,
}

impl ParsedTree {
    pub(crate) fn new(
        elements: Vec<Element>,
        root: ElementId,
        namespace_map: Vec<(String, String)>,
        entity_metadata: Vec<(String, String)>,
    ) -> Self {
        Self {
            elements,
            root,
            namespace_map,
            entity_metadata,
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id]
    }

    pub fn root_element(&self) -> &Element {
        &self.elements[self.root]
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn namespace_map(&self) -> &[(String, String)] {
        &self.namespace_map
    }

    pub fn entity_metadata(&self) -> &[(String, String)] {
        &self.entity_metadata
    }

    /// Depth-first iterator over every element, root first.
    pub fn iter_depth_first(&self) -> DepthFirstIter<'_> {
        DepthFirstIter {
            tree: self,
            stack: vec![self.root],
        }
    }

    /// All elements directly beneath `id`, in document order.
    pub fn children_of(&self, id: ElementId) -> &[ElementId] {
        &self.elements[id].children
    }
}

/// Pre-order depth-first traversal over a `ParsedTree`.
pub struct DepthFirstIter<'a> {
    tree: &'a ParsedTree,
    stack: Vec<ElementId>,
}

impl<'a> Iterator for DepthFirstIter<'a> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        let id = self.stack.pop()?;
        let children = &self.tree.elements[id].children;
        for &child in children.iter().rev() {
            self.stack.push(child);
        }
        Some(id)
    }
}

#[cfg(test)]
pub(crate) fn single_element_tree(tag: &str) -> ParsedTree {
    let el = Element {
        tag: tag.to_string(),
        namespace_uri: None,
        attributes: Vec::new(),
        children: Vec::new(),
        parent: None,
        text: String::new(),
        line: Some(1),
        column: Some(1),
    };
    ParsedTree::new(vec![el], 0, Vec::new(), Vec::new())
}
