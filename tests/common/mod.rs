#![allow(dead_code)]

pub mod fixtures;

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// A temporary source tree and an empty target directory next to it.
pub struct ResourceTree {
    pub dir: TempDir,
}

impl ResourceTree {
    pub fn new() -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join("src"))?;
        Ok(Self { dir })
    }

    /// Creates a tree holding `files`, given as (path relative to the source root, content).
    pub fn with_files(files: &[(&str, &[u8])]) -> std::io::Result<Self> {
        let tree = Self::new()?;
        for (relative, content) in files {
            tree.add(relative, content)?;
        }
        Ok(tree)
    }

    pub fn add(&self, relative: &str, content: &[u8]) -> std::io::Result<()> {
        let path = self.source().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)
    }

    pub fn source(&self) -> PathBuf {
        self.dir.path().join("src")
    }

    pub fn target(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    pub fn read_output(&self, relative: &str) -> std::io::Result<Vec<u8>> {
        fs::read(self.target().join(relative))
    }

    pub fn output_exists(&self, relative: &str) -> bool {
        self.target().join(relative).exists()
    }

    /// Every file under the target directory, relative and with `/` separators, sorted.
    pub fn output_files(&self) -> Vec<String> {
        let mut files = Vec::new();
        collect_files(&self.target(), &self.target(), &mut files);
        files.sort();
        files
    }
}

fn collect_files(root: &Path, dir: &Path, files: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, files);
        } else if let Ok(relative) = path.strip_prefix(root) {
            files.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }
}
