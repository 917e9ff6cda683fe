//! Hierarchical entity ids.
//!
//! Every step addresses its entity with a colon-separated path such as
//! `nodes:node1:relationships:[0]:source_operations:full.op`. The builder
//! keeps the path as a stack of segments; scopes are guards that pop their
//! segment when dropped, so an early return or `?` never leaks a segment.

use std::ops::{Deref, DerefMut};

/// Separator between entity id segments.
pub const SEPARATOR: &str = ":";

/// Stack of entity id segments.
#[derive(Debug, Default)]
pub struct EntityIdBuilder {
    segments: Vec<String>,
}

/// Scope guard returned by [`EntityIdBuilder::extend`] and
/// [`EntityIdBuilder::prepend_before_last`].
///
/// Dereferences to the builder so scopes nest naturally.
#[derive(Debug)]
pub struct EntityIdScope<'a> {
    builder: &'a mut EntityIdBuilder,
    index: usize,
}

impl EntityIdBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Pushes `segment` for the lifetime of the returned scope.
    pub fn extend(&mut self, segment: impl Into<String>) -> EntityIdScope<'_> {
        let index = self.segments.len();
        self.segments.push(segment.into());
        EntityIdScope {
            builder: self,
            index,
        }
    }

    /// Inserts `segment` right before the current last segment for the
    /// lifetime of the returned scope. On an empty stack it is pushed.
    pub fn prepend_before_last(&mut self, segment: impl Into<String>) -> EntityIdScope<'_> {
        let index = self.segments.len().saturating_sub(1);
        self.segments.insert(index, segment.into());
        EntityIdScope {
            builder: self,
            index,
        }
    }

    /// Current joined path, or the empty string when no scope is open.
    #[must_use]
    pub fn current_path(&self) -> String {
        self.segments.join(SEPARATOR)
    }

    /// Path of `leaf` under the current scope, without opening a scope.
    #[must_use]
    pub fn child_path(&self, leaf: &str) -> String {
        if self.segments.is_empty() {
            leaf.to_string()
        } else {
            format!("{}{SEPARATOR}{leaf}", self.current_path())
        }
    }

    /// Number of open segments.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl Deref for EntityIdScope<'_> {
    type Target = EntityIdBuilder;

    fn deref(&self) -> &Self::Target {
        self.builder
    }
}

impl DerefMut for EntityIdScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.builder
    }
}

impl Drop for EntityIdScope<'_> {
    fn drop(&mut self) {
        // Inner scopes borrow this one mutably, so they are gone by now and
        // our segment is back at the index it was inserted at.
        if self.index < self.builder.segments.len() {
            self.builder.segments.remove(self.index);
        }
    }
}

/// Formats a list position segment, e.g. `[3]`.
#[must_use]
pub fn index_segment(index: usize) -> String {
    format!("[{index}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path() {
        let builder = EntityIdBuilder::new();
        assert_eq!(builder.current_path(), "");
        assert_eq!(builder.child_path("description"), "description");
    }

    #[test]
    fn test_nested_scopes_pop_in_order() {
        let mut builder = EntityIdBuilder::new();
        {
            let mut nodes = builder.extend("nodes");
            {
                let node = nodes.extend("node1");
                assert_eq!(node.current_path(), "nodes:node1");
                assert_eq!(node.child_path("properties"), "nodes:node1:properties");
            }
            assert_eq!(nodes.current_path(), "nodes");
        }
        assert_eq!(builder.current_path(), "");
        assert_eq!(builder.depth(), 0);
    }

    #[test]
    fn test_prepend_before_last() {
        let mut builder = EntityIdBuilder::new();
        let mut rels = builder.extend("relationships");
        let mut new_index = rels.extend(index_segment(2));
        {
            let moved = new_index.prepend_before_last(index_segment(0));
            assert_eq!(moved.current_path(), "relationships:[0]:[2]");
        }
        assert_eq!(new_index.current_path(), "relationships:[2]");
    }

    #[test]
    fn test_scope_popped_on_early_return() {
        fn fails(builder: &mut EntityIdBuilder) -> Result<(), String> {
            let scope = builder.extend("outputs");
            Err(scope.current_path())
        }

        let mut builder = EntityIdBuilder::new();
        assert_eq!(fails(&mut builder), Err(String::from("outputs")));
        assert_eq!(builder.current_path(), "");
    }
}
