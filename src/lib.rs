//! sift: copies build resources into an output tree, optionally rendering
//! them as templates against build properties.
//!
//! The work is split across the workspace crates and re-exported here:
//!
//! - `sift-traits`: the `BuildContext` abstraction over the build engine
//! - `sift-template`: the template engine and the resource renderer
//! - `sift-resources`: the processor, encodings and the filesystem context
//!
//! Most callers describe a run with a [`ResourcesConfig`] or assemble a
//! processor with the [`ProcessorBuilder`].

pub mod builder;
pub mod config;
pub mod error;

pub use builder::ProcessorBuilder;
pub use config::ResourcesConfig;
pub use error::SiftError;

pub use sift_resources::{
    FilesystemBuildContext, InMemoryBuildContext, ProcessError, ProcessMode, ProcessRequest,
    ProcessSummary, ResourcesProcessor, TextEncoding, derive_output_path,
};
pub use sift_template::{
    ContextStack, Delimiters, MissingValue, PropertyMap, PropertyObject, RendererConfig,
    ResourceRenderer, TemplateError, Value,
};
pub use sift_traits::{BuildContext, BuildError};
