//! Element path helper shared by the schema inspector and chunking engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A slash-separated path of tag names from the document root down to some
/// element, e.g. `project/dependencies/dependency`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagPath(Vec<String>);

impl TagPath {
    pub fn root() -> Self {
        TagPath(Vec::new())
    }

    pub fn from_segments(segments: impl IntoIterator<Item = String>) -> Self {
        TagPath(segments.into_iter().collect())
    }

    pub fn pushed(&self, tag: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(tag.into());
        TagPath(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// The longest common prefix of `self` and `other`.
    pub fn common_ancestor(&self, other: &TagPath) -> TagPath {
        let shared = self
            .0
            .iter()
            .zip(other.0.iter())
            .take_while(|(a, b)| a == b)
            .count();
        TagPath(self.0[..shared].to_vec())
    }
}

impl fmt::Display for TagPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_ancestor_of_siblings() {
        let a = TagPath::from_segments(["project".into(), "dependencies".into(), "a".into()]);
        let b = TagPath::from_segments(["project".into(), "dependencies".into(), "b".into()]);
        assert_eq!(a.common_ancestor(&b).to_string(), "project/dependencies");
    }

    #[test]
    fn common_ancestor_of_disjoint_paths_is_root() {
        let a = TagPath::from_segments(["x".into()]);
        let b = TagPath::from_segments(["y".into()]);
        assert_eq!(a.common_ancestor(&b), TagPath::root());
    }

    #[test]
    fn display_formats_with_slashes() {
        let p = TagPath::from_segments(["a".into(), "b".into()]);
        assert_eq!(p.to_string(), "a/b");
    }
}
