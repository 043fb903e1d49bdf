//! A mustache-style template engine with pluggable hooks.
//!
//! The engine compiles text with a configurable delimiter pair and executes the
//! result against a [`ContextStack`]. Name resolution, stringification, value
//! encoding and the treatment of missing values are all configured on the
//! engine and shared by every template it compiles.

use crate::ast::{Delimiters, Node};
use crate::context::ContextStack;
use crate::error::TemplateError;
use crate::format::{HtmlEscape, NaturalText, Stringifier, ValueEncoder};
use crate::parser::parse_template;
use crate::resolve::{NameResolver, PathResolver};
use crate::sink::TextSink;
use crate::value::Value;
use serde::Deserialize;
use std::sync::Arc;

/// What to do when a placeholder resolves to nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingValue {
    /// Fail the render with [`TemplateError::Unresolved`].
    #[default]
    Fail,
    /// Emit nothing for the placeholder.
    Empty,
}

#[derive(Debug)]
struct EngineSettings {
    delimiters: Delimiters,
    resolver: Box<dyn NameResolver>,
    stringifier: Box<dyn Stringifier>,
    encoder: Box<dyn ValueEncoder>,
    missing_values: MissingValue,
}

/// Compiles templates. Cheap to clone; configuration is immutable once built.
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    settings: Arc<EngineSettings>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        EngineBuilder::new().build()
    }
}

impl TemplateEngine {
    /// Creates an engine with the classic mustache configuration: `{{`/`}}`
    /// delimiters, nested-path resolution, HTML escaping and missing values
    /// rendered as empty text.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn delimiters(&self) -> &Delimiters {
        &self.settings.delimiters
    }

    pub fn missing_values(&self) -> MissingValue {
        self.settings.missing_values
    }

    /// Compiles `source`. `name` identifies the template in error messages.
    pub fn compile(&self, name: &str, source: &str) -> Result<CompiledTemplate, TemplateError> {
        let nodes = parse_template(name, source, &self.settings.delimiters)?;
        Ok(CompiledTemplate {
            name: name.to_string(),
            nodes,
            settings: Arc::clone(&self.settings),
        })
    }
}

/// Configures a [`TemplateEngine`].
#[derive(Debug)]
pub struct EngineBuilder {
    delimiters: Delimiters,
    resolver: Box<dyn NameResolver>,
    stringifier: Box<dyn Stringifier>,
    encoder: Box<dyn ValueEncoder>,
    missing_values: MissingValue,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::mustache(),
            resolver: Box::new(PathResolver),
            stringifier: Box::new(NaturalText),
            encoder: Box::new(HtmlEscape),
            missing_values: MissingValue::Empty,
        }
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    pub fn resolver(mut self, resolver: impl NameResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn stringifier(mut self, stringifier: impl Stringifier + 'static) -> Self {
        self.stringifier = Box::new(stringifier);
        self
    }

    pub fn encoder(mut self, encoder: impl ValueEncoder + 'static) -> Self {
        self.encoder = Box::new(encoder);
        self
    }

    pub fn missing_values(mut self, missing_values: MissingValue) -> Self {
        self.missing_values = missing_values;
        self
    }

    pub fn build(self) -> TemplateEngine {
        TemplateEngine {
            settings: Arc::new(EngineSettings {
                delimiters: self.delimiters,
                resolver: self.resolver,
                stringifier: self.stringifier,
                encoder: self.encoder,
                missing_values: self.missing_values,
            }),
        }
    }
}

/// An executable template.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    name: String,
    nodes: Vec<Node>,
    settings: Arc<EngineSettings>,
}

impl CompiledTemplate {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Renders the template into `out`. Flushing or closing the sink is left
    /// to the caller. On error, `out` holds whatever was rendered before it.
    pub fn execute(
        &self,
        out: &mut dyn TextSink,
        scopes: &ContextStack<'_>,
    ) -> Result<(), TemplateError> {
        self.render_nodes(&self.nodes, scopes, out)
    }

    /// Renders the template into a new `String`.
    pub fn execute_to_string(&self, scopes: &ContextStack<'_>) -> Result<String, TemplateError> {
        let mut out = String::new();
        self.execute(&mut out, scopes)?;
        Ok(out)
    }

    fn render_nodes(
        &self,
        nodes: &[Node],
        scopes: &ContextStack<'_>,
        out: &mut dyn TextSink,
    ) -> Result<(), TemplateError> {
        for node in nodes {
            match node {
                Node::Text(text) => out.write_text(text)?,
                Node::Variable { name, line } => self.render_variable(name, *line, scopes, out)?,
                Node::Section {
                    name,
                    inverted,
                    children,
                    ..
                } => {
                    let value = self.settings.resolver.resolve(name, scopes);
                    let truthy = value.as_deref().is_some_and(Value::is_truthy);
                    if *inverted {
                        if !truthy {
                            self.render_nodes(children, scopes, out)?;
                        }
                        continue;
                    }
                    match value.as_deref() {
                        Some(Value::List(items)) => {
                            for item in items {
                                self.render_nodes(children, &scopes.pushed(item), out)?;
                            }
                        }
                        Some(scope) if truthy => {
                            self.render_nodes(children, &scopes.pushed(scope), out)?;
                        }
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    fn render_variable(
        &self,
        name: &str,
        line: usize,
        scopes: &ContextStack<'_>,
        out: &mut dyn TextSink,
    ) -> Result<(), TemplateError> {
        match self.settings.resolver.resolve(name, scopes) {
            Some(value) => {
                let text = self.settings.stringifier.stringify(&value);
                self.settings.encoder.encode(&text, out)?;
                Ok(())
            }
            None => match self.settings.missing_values {
                MissingValue::Fail => Err(TemplateError::Unresolved {
                    template: self.name.clone(),
                    name: name.to_string(),
                    line,
                }),
                MissingValue::Empty => {
                    log::debug!(
                        "Placeholder '{}' in '{}' (line {}) is unresolved, rendering empty",
                        name,
                        self.name,
                        line
                    );
                    Ok(())
                }
            },
        }
    }
}
