//! Resource pipeline for builds.
//!
//! Copies resources from a source tree into a target tree, or renders them as
//! templates against build properties on the way.
//!
//! ## Key Abstractions
//!
//! - [`ResourcesProcessor`]: the entry point, driven by a [`ProcessRequest`] and a [`ProcessMode`]
//! - [`FilesystemBuildContext`]: the `BuildContext` for trees on the local disk
//! - [`TextEncoding`]: decoding and encoding of filtered resources
//! - [`derive_output_path`]: maps a source file into the target tree
//!
//! For convenience, the in-memory build context from sift-traits is re-exported:
//! [`InMemoryBuildContext`].

pub mod encoding;
pub mod error;
mod filesystem;
pub mod paths;
pub mod processor;

pub use encoding::{EncodingWriter, TextEncoding};
pub use error::ProcessError;
pub use filesystem::FilesystemBuildContext;
pub use paths::derive_output_path;
pub use processor::{ProcessMode, ProcessRequest, ProcessSummary, ResourcesProcessor};

pub use sift_traits::{InMemoryBuildContext, ResourceSelector};
