//! Template rendering for build resources.
//!
//! This crate provides a small mustache-style engine and the renderer the
//! resource pipeline uses on top of it.
//!
//! ## Key Abstractions
//!
//! - **`TemplateEngine`**: compiles text with a delimiter pair into a `CompiledTemplate`
//! - **`NameResolver`**: maps placeholder names to values (`PathResolver`, `ExactKeyResolver`)
//! - **`Stringifier`** / **`ValueEncoder`**: turn resolved values into output text
//! - **`ResourceRenderer`**: the engine configured for build resources
//! - **`ContextStack`**: the scopes a render resolves names against
//!
//! ## Example
//!
//! ```
//! use sift_template::{ContextStack, ResourceRenderer, Value};
//!
//! let properties = Value::map([("project.version", "1.2.3")]);
//! let out = ResourceRenderer::default()
//!     .render_to_string("version.txt", "v${project.version}", &ContextStack::with_root(&properties))
//!     .unwrap();
//! assert_eq!(out, "v1.2.3");
//! ```

pub mod ast;
pub mod context;
pub mod engine;
pub mod error;
pub mod format;
mod parser;
pub mod renderer;
pub mod resolve;
pub mod sink;
pub mod value;

// --- Public API ---
pub use ast::{Delimiters, Node};
pub use context::ContextStack;
pub use engine::{CompiledTemplate, EngineBuilder, MissingValue, TemplateEngine};
pub use error::TemplateError;
pub use format::{HtmlEscape, NaturalText, PortablePaths, Stringifier, ValueEncoder, Verbatim};
pub use parser::parse_template;
pub use renderer::{RendererConfig, ResourceRenderer};
pub use resolve::{ExactKeyResolver, NameResolver, PathResolver};
pub use sink::TextSink;
pub use value::{PropertyMap, PropertyObject, Value};
