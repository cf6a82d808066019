//! The handler registry.
//!
//! Unlike a hot-reloadable plugin host, the set of dialects this crate
//! understands is fixed at build time, so the registry is a plain `Vec`
//! assembled once and never mutated after that: no `RwLock`, no handle
//! caching, no unregister path. A host that wants to add handlers does so
//! through [`HandlerRegistry::builder`] before the registry is frozen;
//! after that point it is read-only dispatch.

use crate::handlers::{
    AntBuildHandler, AtomFeedHandler, GenericHandler, Handler, HibernateMappingHandler,
    IvyHandler, KmlHandler, Log4jConfigHandler, MavenPomHandler, NamespaceMap, RssFeedHandler,
    S1000dHandler, SpringBeansHandler, StrutsConfigHandler,
};
use crate::parser::ParsedTree;

/// A fixed, ordered collection of [`Handler`]s. Built once via
/// [`HandlerRegistry::with_builtin_handlers`] or [`HandlerRegistry::builder`]
/// and then used only for [`HandlerRegistry::select`].
pub struct HandlerRegistry {
    handlers: Vec<Box<dyn Handler>>,
}

impl HandlerRegistry {
    /// The built-in dialect handlers, in the fixed declared order used for
    /// tie-breaking. `GenericHandler` is always last: every other handler
    /// gets first refusal before the fallback claims a document.
    pub fn with_builtin_handlers() -> Self {
        HandlerRegistry::builder()
            .with(Box::new(S1000dHandler))
            .with(Box::new(MavenPomHandler))
            .with(Box::new(IvyHandler))
            .with(Box::new(SpringBeansHandler))
            .with(Box::new(HibernateMappingHandler))
            .with(Box::new(Log4jConfigHandler))
            .with(Box::new(StrutsConfigHandler))
            .with(Box::new(AntBuildHandler))
            .with(Box::new(KmlHandler))
            .with(Box::new(RssFeedHandler))
            .with(Box::new(AtomFeedHandler))
            .with(Box::new(GenericHandler))
            .build()
    }

    /// Start from an empty registry; a host embedding this crate can append
    /// its own handlers ahead of (or instead of) the built-in set before
    /// calling `build`.
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder { handlers: Vec::new() }
    }

    /// Run every handler's `can_handle` in registration order and return
    /// the one that claims the document with the highest confidence.
    /// Ties go to whichever handler was registered first. If nothing
    /// positively matches, the caller gets whatever the last handler in
    /// the registry reports (by convention, `GenericHandler` at 0.5, which
    /// never refuses).
    pub fn select(&self, tree: &ParsedTree, namespaces: &NamespaceMap) -> (&dyn Handler, f64) {
        let mut best: Option<(&dyn Handler, f64)> = None;
        for handler in &self.handlers {
            let (matched, confidence) = handler.can_handle(tree, namespaces);
            if !matched {
                continue;
            }
            match best {
                Some((_, best_confidence)) if confidence <= best_confidence => {}
                _ => best = Some((handler.as_ref(), confidence)),
            }
        }
        best.unwrap_or_else(|| {
            let fallback = self
                .handlers
                .last()
                .expect("registry always carries at least the generic fallback handler");
            let (_, confidence) = fallback.can_handle(tree, namespaces);
            (fallback.as_ref(), confidence)
        })
    }

    /// Handlers in registration order, for diagnostics and host introspection.
    pub fn handlers(&self) -> &[Box<dyn Handler>] {
        &self.handlers
    }
}

/// Builder for [`HandlerRegistry`]; appends handlers in call order and then
/// freezes them into a read-only registry.
pub struct HandlerRegistryBuilder {
    handlers: Vec<Box<dyn Handler>>,
}

impl HandlerRegistryBuilder {
    pub fn with(mut self, handler: Box<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry { handlers: self.handlers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_bytes;

    #[test]
    fn maven_pom_outranks_generic_fallback() {
        let registry = HandlerRegistry::with_builtin_handlers();
        let tree = parse_bytes(
            br#"<project><modelVersion>4.0.0</modelVersion><groupId>com.example</groupId>
                <artifactId>demo</artifactId></project>"#,
        )
        .unwrap();
        let (handler, confidence) = registry.select(&tree, &[]);
        assert_eq!(handler.name(), "Maven POM");
        assert!(confidence > 0.5);
    }

    #[test]
    fn unrecognized_document_falls_back_to_generic() {
        let registry = HandlerRegistry::with_builtin_handlers();
        let tree = parse_bytes(b"<widget-catalog><widget/></widget-catalog>").unwrap();
        let (handler, confidence) = registry.select(&tree, &[]);
        assert_eq!(handler.name(), "Generic XML");
        assert_eq!(confidence, 0.5);
    }

    #[test]
    fn empty_builder_still_dispatches_via_last_handler_as_fallback() {
        let registry = HandlerRegistry::builder()
            .with(Box::new(GenericHandler))
            .build();
        let tree = parse_bytes(b"<anything/>").unwrap();
        let (handler, _) = registry.select(&tree, &[]);
        assert_eq!(handler.name(), "Generic XML");
    }
}
