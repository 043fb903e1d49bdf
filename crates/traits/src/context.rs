//! The `BuildContext` trait abstracting the incremental build engine.
//!
//! The resource pipeline never walks directories or opens output files on its
//! own; it asks a build context to register inputs, to associate outputs with
//! them and to open the streams it reads from and writes to. This keeps change
//! detection and output bookkeeping with the build engine.

use crate::resource::{InputSelection, OutputHandle, ProcessableResource, ResourceDescriptor};
use crate::selector::ResourceSelector;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Error type for build context operations.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("Failed to walk '{}': {message}", path.display())]
    Walk { path: PathBuf, message: String },

    #[error("Build context unavailable: {0}")]
    Unavailable(String),
}

impl BuildError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }
}

/// A trait for the build engine that owns input registration and output
/// association.
///
/// Implementations decide which inputs need processing; files unchanged since
/// a previous run may be left out of the registered sets entirely.
///
/// # Implementations
///
/// - `FilesystemBuildContext` (sift-resources): walks the source tree on disk
/// - [`InMemoryBuildContext`]: pre-populated inputs, outputs captured in memory
pub trait BuildContext: Send + Sync + Debug {
    /// Registers every input matching `selection`.
    fn register_inputs(
        &self,
        selection: &InputSelection,
    ) -> Result<Vec<ResourceDescriptor>, BuildError>;

    /// Accepts a registered input for processing in this run.
    fn process(&self, descriptor: ResourceDescriptor) -> Result<ProcessableResource, BuildError>;

    /// Registers the inputs matching `selection` and accepts all of them for
    /// processing.
    fn register_and_process_inputs(
        &self,
        selection: &InputSelection,
    ) -> Result<Vec<ProcessableResource>, BuildError> {
        self.register_inputs(selection)?
            .into_iter()
            .map(|descriptor| self.process(descriptor))
            .collect()
    }

    /// Binds `output` to `input` so the build engine knows which input produced it.
    fn associate_output(
        &self,
        input: &ProcessableResource,
        output: &Path,
    ) -> Result<OutputHandle, BuildError>;

    /// Opens the content of an input for reading.
    fn open_input(&self, input: &ProcessableResource) -> Result<Box<dyn Read + Send>, BuildError> {
        let file = File::open(input.path()).map_err(|e| BuildError::io(input.path(), e))?;
        Ok(Box::new(file))
    }

    /// Opens a fresh byte sink for an associated output, truncating previous content.
    fn new_output_stream(&self, output: &OutputHandle)
    -> Result<Box<dyn Write + Send>, BuildError>;

    /// Removes whatever was written for `output`. Used when producing it failed.
    fn discard_output(&self, output: &OutputHandle) -> Result<(), BuildError>;

    /// Returns a human-readable name for this context (for logging/debugging).
    fn name(&self) -> &'static str;
}

type SharedStore = Arc<RwLock<BTreeMap<PathBuf, Vec<u8>>>>;

/// A build context whose inputs and outputs live in memory.
///
/// Inputs must be added before use. Every stored input under the selection's
/// source directory that passes its include/exclude patterns is registered.
/// This is the simplest context and is meant for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryBuildContext {
    inputs: RwLock<BTreeMap<PathBuf, Vec<u8>>>,
    outputs: SharedStore,
    associations: RwLock<BTreeMap<PathBuf, Vec<PathBuf>>>,
}

impl InMemoryBuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an input file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Unavailable` if the internal lock is poisoned.
    pub fn add_input(&self, path: impl Into<PathBuf>, data: Vec<u8>) -> Result<(), BuildError> {
        let mut inputs = self
            .inputs
            .write()
            .map_err(|_| BuildError::Unavailable("input store lock poisoned".to_string()))?;
        inputs.insert(path.into(), data);
        Ok(())
    }

    /// Returns the bytes written for `path`, if any.
    pub fn output(&self, path: &Path) -> Option<Vec<u8>> {
        self.outputs.read().ok()?.get(path).cloned()
    }

    /// Returns every output path written so far, sorted.
    pub fn output_paths(&self) -> Vec<PathBuf> {
        self.outputs
            .read()
            .map(|o| o.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the outputs associated with `input`.
    pub fn associated_outputs(&self, input: &Path) -> Vec<PathBuf> {
        self.associations
            .read()
            .ok()
            .and_then(|a| a.get(input).cloned())
            .unwrap_or_default()
    }
}

impl BuildContext for InMemoryBuildContext {
    fn register_inputs(
        &self,
        selection: &InputSelection,
    ) -> Result<Vec<ResourceDescriptor>, BuildError> {
        let selector = ResourceSelector::new(&selection.includes, &selection.excludes)?;
        let inputs = self
            .inputs
            .read()
            .map_err(|_| BuildError::Unavailable("input store lock poisoned".to_string()))?;
        Ok(inputs
            .keys()
            .filter_map(|path| {
                let relative = path.strip_prefix(&selection.source_dir).ok()?;
                selector
                    .matches(relative)
                    .then(|| ResourceDescriptor::new(path, relative))
            })
            .collect())
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
            .write()
            .map_err(|_| BuildError::Unavailable("association lock poisoned".to_string()))?;
        let outputs = associations.entry(input.path().to_path_buf()).or_default();
        if !outputs.iter().any(|p| p == output) {
            outputs.push(output.to_path_buf());
        }
        Ok(OutputHandle::new(input.path(), output))
    }

    fn open_input(&self, input: &ProcessableResource) -> Result<Box<dyn Read + Send>, BuildError> {
        let inputs = self
            .inputs
            .read()
            .map_err(|_| BuildError::Unavailable("input store lock poisoned".to_string()))?;
        let data = inputs.get(input.path()).cloned().ok_or_else(|| {
            BuildError::io(input.path(), io::Error::from(io::ErrorKind::NotFound))
        })?;
        Ok(Box::new(Cursor::new(data)))
    }

    fn new_output_stream(
        &self,
        output: &OutputHandle,
    ) -> Result<Box<dyn Write + Send>, BuildError> {
        let mut outputs = self
            .outputs
            .write()
            .map_err(|_| BuildError::Unavailable("output store lock poisoned".to_string()))?;
        outputs.insert(output.path().to_path_buf(), Vec::new());
        Ok(Box::new(MemoryOutput {
            path: output.path().to_path_buf(),
            store: Arc::clone(&self.outputs),
        }))
    }

    fn discard_output(&self, output: &OutputHandle) -> Result<(), BuildError> {
        let mut outputs = self
            .outputs
            .write()
            .map_err(|_| BuildError::Unavailable("output store lock poisoned".to_string()))?;
        outputs.remove(output.path());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "InMemoryBuildContext"
    }
}

/// Byte sink appending straight into the shared output store.
struct MemoryOutput {
    path: PathBuf,
    store: SharedStore,
}

impl Write for MemoryOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut outputs = self
            .store
            .write()
            .map_err(|_| io::Error::other("output store lock poisoned"))?;
        outputs
            .entry(self.path.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
