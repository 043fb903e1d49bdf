//! The renderer used for build resources.
//!
//! It configures the generic engine with four changes: `${`/`}` delimiters,
//! exact-key-first name resolution, verbatim output with no escaping, and
//! path values rendered with `/` separators. Missing values fail the render
//! unless configured otherwise.

use crate::ast::Delimiters;
use crate::context::ContextStack;
use crate::engine::{CompiledTemplate, MissingValue, TemplateEngine};
use crate::error::TemplateError;
use crate::format::{PortablePaths, Verbatim};
use crate::resolve::{ExactKeyResolver, PathResolver};
use crate::sink::TextSink;
use serde::Deserialize;

/// Renderer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RendererConfig {
    pub delimiters: Delimiters,
    pub missing_values: MissingValue,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::property(),
            missing_values: MissingValue::Fail,
        }
    }
}

/// Renders resource templates against build properties.
///
/// Holds only immutable configuration and can be shared across threads.
#[derive(Debug, Clone)]
pub struct ResourceRenderer {
    engine: TemplateEngine,
}

impl Default for ResourceRenderer {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

impl ResourceRenderer {
    pub fn new(config: RendererConfig) -> Self {
        let engine = TemplateEngine::builder()
            .delimiters(config.delimiters)
            .resolver(ExactKeyResolver::new(PathResolver))
            .stringifier(PortablePaths)
            .encoder(Verbatim)
            .missing_values(config.missing_values)
            .build();
        Self { engine }
    }

    pub fn engine(&self) -> &TemplateEngine {
        &self.engine
    }

    pub fn compile(&self, name: &str, source: &str) -> Result<CompiledTemplate, TemplateError> {
        self.engine.compile(name, source)
    }

    /// Compiles `source` and executes it into `out` in a single pass.
    pub fn render(
        &self,
        name: &str,
        source: &str,
        scopes: &ContextStack<'_>,
        out: &mut dyn TextSink,
    ) -> Result<(), TemplateError> {
        self.compile(name, source)?.execute(out, scopes)
    }

    pub fn render_to_string(
        &self,
        name: &str,
        source: &str,
        scopes: &ContextStack<'_>,
    ) -> Result<String, TemplateError> {
        let mut out = String::new();
        self.render(name, source, scopes, &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use serde_json::json;
    use std::path::PathBuf;

    fn render(source: &str, root: &Value) -> Result<String, TemplateError> {
        ResourceRenderer::default().render_to_string("test", source, &ContextStack::with_root(root))
    }

    #[test]
    fn test_dotted_property_is_a_single_key() {
        let root = Value::from(json!({ "project.version": "1.2.3" }));
        assert_eq!(render("v${project.version}", &root).unwrap(), "v1.2.3");
    }

    #[test]
    fn test_nested_path_fallback() {
        let root = Value::from(json!({ "a": { "b": "x" } }));
        assert_eq!(render("${a.b}", &root).unwrap(), "x");
    }

    #[test]
    fn test_innermost_scope_wins() {
        let inner = Value::from(json!({ "name": "inner" }));
        let outer = Value::from(json!({ "name": "outer" }));
        let stack = ContextStack::from_innermost([&inner, &outer]);
        let out = ResourceRenderer::default()
            .render_to_string("test", "${name}", &stack)
            .unwrap();
        assert_eq!(out, "inner");
    }

    #[test]
    fn test_path_values_use_forward_slashes() {
        let root = Value::map([("basedir", Value::Path(PathBuf::from(r"C:\a\b")))]);
        assert_eq!(render("${basedir}/lib", &root).unwrap(), "C:/a/b/lib");
    }

    #[test]
    fn test_values_are_not_escaped() {
        let root = Value::map([("markup", r#"<tag attr="1"> & more"#)]);
        assert_eq!(render("${markup}", &root).unwrap(), r#"<tag attr="1"> & more"#);
    }

    #[test]
    fn test_unresolved_placeholder_fails_by_default() {
        let root = Value::from(json!({ "known": 1 }));
        let err = render("${unknown.key}", &root).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::Unresolved { ref name, .. } if name == "unknown.key"
        ));
    }

    #[test]
    fn test_empty_missing_values_apply_to_both_tiers() {
        let renderer = ResourceRenderer::new(RendererConfig {
            missing_values: MissingValue::Empty,
            ..RendererConfig::default()
        });
        let root = Value::from(json!({ "a": { "b": "x" } }));
        let out = renderer
            .render_to_string("test", "[${dotted.key}][${a.c}][${a.b}]", &ContextStack::with_root(&root))
            .unwrap();
        assert_eq!(out, "[][][x]");
    }

    #[test]
    fn test_mustache_braces_are_plain_text() {
        let root = Value::from(json!({ "x": "1" }));
        assert_eq!(render("{{x}} ${x}", &root).unwrap(), "{{x}} 1");
    }

    #[test]
    fn test_custom_delimiters() {
        let renderer = ResourceRenderer::new(RendererConfig {
            delimiters: Delimiters::new("@", "@"),
            ..RendererConfig::default()
        });
        let root = Value::from(json!({ "project.name": "sift" }));
        let out = renderer
            .render_to_string("test", "name=@project.name@ ${HOME}", &ContextStack::with_root(&root))
            .unwrap();
        assert_eq!(out, "name=sift ${HOME}");
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: RendererConfig = serde_json::from_str(r#"{ "missingValues": "empty" }"#).unwrap();
        assert_eq!(config.missing_values, MissingValue::Empty);
        assert_eq!(config.delimiters, Delimiters::property());
    }
}
