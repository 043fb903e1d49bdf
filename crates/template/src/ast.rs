//! Defines the compiled form of a template.
use serde::Deserialize;

/// The open/close marker pair that delimits tags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

impl Delimiters {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// `${` / `}`, the build-property interpolation syntax.
    pub fn property() -> Self {
        Self::new("${", "}")
    }

    /// `{{` / `}}`, the classic mustache syntax.
    pub fn mustache() -> Self {
        Self::new("{{", "}}")
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::property()
    }
}

/// A node of a compiled template.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text, emitted unchanged.
    Text(String),
    /// An interpolated placeholder.
    Variable { name: String, line: usize },
    /// A block rendered depending on the value of `name`.
    Section {
        name: String,
        inverted: bool,
        line: usize,
        children: Vec<Node>,
    },
}
