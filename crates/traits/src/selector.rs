//! Include/exclude matching for resource registration.

use crate::context::BuildError;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Decides which files under a source root are resources.
///
/// Patterns are globs over the path relative to the source root. `*` stops at
/// directory separators and `**` spans them. Without includes every file is
/// selected; excludes always win.
#[derive(Debug, Clone)]
pub struct ResourceSelector {
    includes: Option<GlobSet>,
    excludes: GlobSet,
}

impl ResourceSelector {
    /// # Errors
    ///
    /// Returns `BuildError::Pattern` for the first pattern that fails to compile.
    pub fn new(includes: &[String], excludes: &[String]) -> Result<Self, BuildError> {
        let includes = if includes.is_empty() {
            None
        } else {
            Some(build_set(includes)?)
        };
        Ok(Self {
            includes,
            excludes: build_set(excludes)?,
        })
    }

    pub fn matches(&self, relative: &Path) -> bool {
        let included = self
            .includes
            .as_ref()
            .is_none_or(|includes| includes.is_match(relative));
        included && !self.excludes.is_match(relative)
    }
}

fn build_set(patterns: &[String]) -> Result<GlobSet, BuildError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| BuildError::Pattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| BuildError::Pattern {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(includes: &[&str], excludes: &[&str]) -> ResourceSelector {
        let owned = |p: &[&str]| p.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        ResourceSelector::new(&owned(includes), &owned(excludes)).unwrap()
    }

    #[test]
    fn test_no_includes_selects_everything() {
        let s = selector(&[], &[]);
        assert!(s.matches(Path::new("a.txt")));
        assert!(s.matches(Path::new("deep/nested/b.bin")));
    }

    #[test]
    fn test_double_star_spans_directories() {
        let s = selector(&["**/*.properties"], &[]);
        assert!(s.matches(Path::new("app.properties")));
        assert!(s.matches(Path::new("config/env/app.properties")));
        assert!(!s.matches(Path::new("app.xml")));
    }

    #[test]
    fn test_single_star_stays_in_directory() {
        let s = selector(&["config/*.xml"], &[]);
        assert!(s.matches(Path::new("config/a.xml")));
        assert!(!s.matches(Path::new("config/nested/a.xml")));
    }

    #[test]
    fn test_excludes_win() {
        let s = selector(&["**/*"], &["**/*.bak", "secret/**"]);
        assert!(s.matches(Path::new("a.txt")));
        assert!(!s.matches(Path::new("a.txt.bak")));
        assert!(!s.matches(Path::new("secret/key.pem")));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = ResourceSelector::new(&["[".to_string()], &[]);
        match result {
            Err(BuildError::Pattern { pattern, .. }) => assert_eq!(pattern, "["),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
