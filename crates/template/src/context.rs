//! The scope stack placeholders are resolved against.

use crate::value::Value;

/// An ordered stack of scopes.
///
/// Scopes are borrowed for the duration of a render; the stack itself is
/// cheap to clone and sections push onto a copy of it. Resolution visits
/// scopes from the innermost (most recently pushed) to the outermost.
#[derive(Debug, Clone, Default)]
pub struct ContextStack<'a> {
    // outermost first
    scopes: Vec<&'a Value>,
}

impl<'a> ContextStack<'a> {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    /// Creates a stack holding a single scope.
    pub fn with_root(scope: &'a Value) -> Self {
        Self {
            scopes: vec![scope],
        }
    }

    /// Creates a stack from scopes listed innermost first.
    pub fn from_innermost<I>(scopes: I) -> Self
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut scopes: Vec<&'a Value> = scopes.into_iter().collect();
        scopes.reverse();
        Self { scopes }
    }

    /// Pushes `scope` as the new innermost scope.
    pub fn push(&mut self, scope: &'a Value) {
        self.scopes.push(scope);
    }

    /// Returns a copy of this stack with `scope` pushed as innermost.
    pub fn pushed(&self, scope: &'a Value) -> Self {
        let mut next = self.clone();
        next.push(scope);
        next
    }

    /// The innermost scope, if any.
    pub fn innermost(&self) -> Option<&'a Value> {
        self.scopes.last().copied()
    }

    /// Iterates scopes from innermost to outermost.
    pub fn iter(&self) -> impl Iterator<Item = &'a Value> + '_ {
        self.scopes.iter().rev().copied()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_innermost_order() {
        let inner = Value::map([("name", "inner")]);
        let outer = Value::map([("name", "outer")]);
        let stack = ContextStack::from_innermost([&inner, &outer]);

        let order: Vec<_> = stack.iter().collect();
        assert_eq!(order, vec![&inner, &outer]);
        assert_eq!(stack.innermost(), Some(&inner));
    }

    #[test]
    fn test_push_makes_scope_innermost() {
        let root = Value::map([("a", 1)]);
        let item = Value::from("item");
        let stack = ContextStack::with_root(&root);
        let pushed = stack.pushed(&item);

        assert_eq!(stack.len(), 1);
        assert_eq!(pushed.len(), 2);
        assert_eq!(pushed.innermost(), Some(&item));
        assert_eq!(pushed.iter().last(), Some(&root));
    }

    #[test]
    fn test_empty_stack() {
        let stack = ContextStack::new();
        assert!(stack.is_empty());
        assert!(stack.innermost().is_none());
    }
}
