//! Run configuration loaded from JSON.

use crate::builder::ProcessorBuilder;
use crate::error::SiftError;
use serde::Deserialize;
use sift_resources::{ProcessMode, ProcessRequest, ProcessSummary};
use sift_template::{Delimiters, MissingValue, RendererConfig, Value};
use sift_traits::BuildContext;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Describes one resource processing run.
///
/// ```json
/// {
///   "sourceDirectory": "src/main/resources",
///   "targetDirectory": "target/classes",
///   "excludes": ["**/*.bak"],
///   "properties": { "project.version": "1.2.3" }
/// }
/// ```
///
/// Resources are filtered when `properties` is present and copied byte for
/// byte otherwise.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResourcesConfig {
    pub source_directory: PathBuf,
    pub target_directory: PathBuf,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
    /// Encoding label for filtered resources. UTF-8 when unset.
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub properties: Option<Value>,
    #[serde(default)]
    pub delimiters: Delimiters,
    #[serde(default)]
    pub missing_values: MissingValue,
}

impl ResourcesConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SiftError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SiftError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            SiftError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read configuration from '{}': {}", path.display(), e),
            ))
        })?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<(), SiftError> {
        if self.source_directory.as_os_str().is_empty() {
            return Err(SiftError::Config("sourceDirectory must not be empty".to_string()));
        }
        if self.target_directory.as_os_str().is_empty() {
            return Err(SiftError::Config("targetDirectory must not be empty".to_string()));
        }
        if let Some(properties) = &self.properties
            && properties.as_map().is_none()
        {
            return Err(SiftError::Config("properties must be a JSON object".to_string()));
        }
        Ok(())
    }

    pub fn request(&self) -> ProcessRequest {
        ProcessRequest {
            source_dir: self.source_directory.clone(),
            target_dir: self.target_directory.clone(),
            includes: self.includes.clone(),
            excludes: self.excludes.clone(),
            encoding: self.encoding.clone(),
        }
    }

    pub fn renderer_config(&self) -> RendererConfig {
        RendererConfig {
            delimiters: self.delimiters.clone(),
            missing_values: self.missing_values,
        }
    }

    pub fn mode(&self) -> ProcessMode<'_> {
        ProcessMode::from_properties(self.properties.as_ref())
    }

    /// Runs against the local filesystem.
    pub fn run(&self) -> Result<ProcessSummary, SiftError> {
        self.execute(ProcessorBuilder::new())
    }

    /// Runs against the given build context.
    pub fn run_in(&self, context: Arc<dyn BuildContext>) -> Result<ProcessSummary, SiftError> {
        self.execute(ProcessorBuilder::new().with_context(context))
    }

    fn execute(&self, builder: ProcessorBuilder) -> Result<ProcessSummary, SiftError> {
        let processor = builder.with_renderer_config(self.renderer_config()).build();
        Ok(processor.process(&self.request(), &self.mode())?)
    }
}
