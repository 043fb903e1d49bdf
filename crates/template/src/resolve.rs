//! Placeholder name resolution against a [`ContextStack`].
//!
//! [`PathResolver`] is the engine's default: a name is a `.`-separated path whose
//! first segment is looked up through the scopes and whose remaining segments
//! walk into the value found. [`ExactKeyResolver`] decorates another resolver
//! so that build properties with literal dots in their names (`project.version`)
//! are found as single keys before any path walking happens.

use crate::context::ContextStack;
use crate::value::Value;
use std::borrow::Cow;
use std::fmt::Debug;

/// Resolves a placeholder name to a value.
pub trait NameResolver: Send + Sync + Debug {
    /// Returns the value `name` refers to, or `None` when no scope provides it.
    fn resolve<'a>(&self, name: &str, scopes: &ContextStack<'a>) -> Option<Cow<'a, Value>>;
}

/// Resolves names as nested-property paths.
///
/// `.` alone names the innermost scope. For `a.b.c`, the innermost scope that
/// has `a` provides the starting value and `b`, `c` are then looked up inside
/// it. Once the first segment is found the search does not fall back to outer
/// scopes, even if a later segment is missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver;

impl NameResolver for PathResolver {
    fn resolve<'a>(&self, name: &str, scopes: &ContextStack<'a>) -> Option<Cow<'a, Value>> {
        if name == "." {
            return scopes.innermost().map(Cow::Borrowed);
        }

        let mut segments = name.split('.');
        let first = segments.next()?;
        let mut current = scopes
            .iter()
            .find_map(|scope| descend(Cow::Borrowed(scope), first))?;

        for segment in segments {
            current = descend(current, segment)?;
        }
        log::trace!("Resolved '{}' by nested path", name);
        Some(current)
    }
}

/// Looks up a full name as a single map key before delegating.
///
/// Every scope is visited from innermost to outermost; the first map holding a
/// key equal to the whole name wins. Only if no scope has such a key is the
/// wrapped resolver consulted.
#[derive(Debug, Clone, Default)]
pub struct ExactKeyResolver<R = PathResolver> {
    fallback: R,
}

impl<R: NameResolver> ExactKeyResolver<R> {
    pub fn new(fallback: R) -> Self {
        Self { fallback }
    }

    pub fn fallback(&self) -> &R {
        &self.fallback
    }
}

impl<R: NameResolver> NameResolver for ExactKeyResolver<R> {
    fn resolve<'a>(&self, name: &str, scopes: &ContextStack<'a>) -> Option<Cow<'a, Value>> {
        for scope in scopes.iter() {
            if let Value::Map(map) = scope {
                if let Some(value) = map.get(name) {
                    log::trace!("Resolved '{}' by exact key", name);
                    return Some(Cow::Borrowed(value));
                }
            }
        }
        self.fallback.resolve(name, scopes)
    }
}

fn descend<'a>(value: Cow<'a, Value>, segment: &str) -> Option<Cow<'a, Value>> {
    if segment.is_empty() {
        return None;
    }
    match value {
        Cow::Borrowed(Value::Map(map)) => map.get(segment).map(Cow::Borrowed),
        Cow::Borrowed(Value::List(items)) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index))
            .map(Cow::Borrowed),
        Cow::Borrowed(other) => other.child(segment).map(Cow::Owned),
        Cow::Owned(owned) => owned.child(segment).map(Cow::Owned),
    }
}
