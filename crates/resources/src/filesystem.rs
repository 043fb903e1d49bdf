//! Filesystem-based build context for native platforms.
//!
//! Inputs are registered by walking the source tree on disk. Every registered
//! input is processed on every run; this context does no change detection.

use log::{debug, trace};
use sift_traits::{
    BuildContext, BuildError, InputSelection, OutputHandle, ProcessableResource,
    ResourceDescriptor, ResourceSelector,
};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use walkdir::WalkDir;

/// A build context reading inputs from and writing outputs to the local
/// filesystem.
///
/// Symbolic links inside the source tree are followed. Output directories are
/// created on demand when an output stream is opened.
#[derive(Debug, Default)]
pub struct FilesystemBuildContext {
    associations: Mutex<BTreeMap<PathBuf, Vec<PathBuf>>>,
}

impl FilesystemBuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the outputs associated with `input` during this context's lifetime.
    pub fn associated_outputs(&self, input: &Path) -> Vec<PathBuf> {
        self.associations
            .lock()
            .ok()
            .and_then(|a| a.get(input).cloned())
            .unwrap_or_default()
    }
}

impl BuildContext for FilesystemBuildContext {
    fn register_inputs(
        &self,
        selection: &InputSelection,
    ) -> Result<Vec<ResourceDescriptor>, BuildError> {
        let root = std::path::absolute(&selection.source_dir)
            .map_err(|e| BuildError::io(&selection.source_dir, e))?;
        if !root.is_dir() {
            debug!("Source directory '{}' does not exist, nothing to register", root.display());
            return Ok(Vec::new());
        }

        let selector = ResourceSelector::new(&selection.includes, &selection.excludes)?;
        let mut registered = Vec::new();
        for entry in WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| BuildError::Walk {
                path: e.path().map_or_else(|| root.clone(), Path::to_path_buf),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&root) else {
                continue;
            };
            if selector.matches(relative) {
                trace!("Registered input '{}'", relative.display());
                registered.push(ResourceDescriptor::new(entry.path(), relative));
            }
        }
        debug!("Registered {} input(s) under '{}'", registered.len(), root.display());
        Ok(registered)
    }

    fn process(&self, descriptor: ResourceDescriptor) -> Result<ProcessableResource, BuildError> {
        Ok(ProcessableResource::new(descriptor))
    }

    fn associate_output(
        &self,
        input: &ProcessableResource,
        output: &Path,
    ) -> Result<OutputHandle, BuildError> {
        let mut associations = self
            .associations
            .lock()
            .map_err(|_| BuildError::Unavailable("association lock poisoned".to_string()))?;
        let outputs = associations.entry(input.path().to_path_buf()).or_default();
        if !outputs.iter().any(|p| p == output) {
            outputs.push(output.to_path_buf());
        }
        Ok(OutputHandle::new(input.path(), output))
    }

    fn new_output_stream(
        &self,
        output: &OutputHandle,
    ) -> Result<Box<dyn Write + Send>, BuildError> {
        let path = output.path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }
        let file = File::create(path).map_err(|e| BuildError::io(path, e))?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn discard_output(&self, output: &OutputHandle) -> Result<(), BuildError> {
        match fs::remove_file(output.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BuildError::io(output.path(), e)),
        }
    }

    fn name(&self) -> &'static str {
        "FilesystemBuildContext"
    }
}
