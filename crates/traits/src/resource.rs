//! Value types describing resources as they move through a build context.
//!
//! A resource starts as a [`ResourceDescriptor`] produced by input registration,
//! becomes a [`ProcessableResource`] once the build context accepts it for this
//! run, and is finally bound to an [`OutputHandle`] naming the file it produces.

use std::path::{Path, PathBuf};

/// The include/exclude selection applied when registering inputs.
///
/// Patterns are globs relative to `source_dir`, written with `/` separators.
/// An empty include list selects every file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSelection {
    pub source_dir: PathBuf,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

impl InputSelection {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            includes: Vec::new(),
            excludes: Vec::new(),
        }
    }

    pub fn with_includes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes = patterns.into_iter().map(Into::into).collect();
        self
    }
}

/// One registered source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceDescriptor {
    path: PathBuf,
    relative_path: PathBuf,
}

impl ResourceDescriptor {
    /// Creates a descriptor from the file's absolute path and its path relative
    /// to the source root it was registered from.
    pub fn new(path: impl Into<PathBuf>, relative_path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            relative_path: relative_path.into(),
        }
    }

    /// Absolute path of the source file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the source file relative to its source root.
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }
}

/// A resource the build context has accepted for processing in this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessableResource {
    descriptor: ResourceDescriptor,
}

impl ProcessableResource {
    pub fn new(descriptor: ResourceDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    pub fn path(&self) -> &Path {
        self.descriptor.path()
    }
}

/// An output file bound to the input that produces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputHandle {
    input: PathBuf,
    path: PathBuf,
}

impl OutputHandle {
    pub fn new(input: impl Into<PathBuf>, path: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            path: path.into(),
        }
    }

    /// The source file this output was associated with.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// The output file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
