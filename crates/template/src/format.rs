//! Turning resolved values into output text.
//!
//! Two hooks run for every interpolation: a [`Stringifier`] converts the value
//! to text, then a [`ValueEncoder`] writes that text to the sink, escaping it
//! or not.

use crate::sink::TextSink;
use crate::value::Value;
use std::fmt::Debug;
use std::io;

/// Converts a resolved value to text.
pub trait Stringifier: Send + Sync + Debug {
    fn stringify(&self, value: &Value) -> String;
}

/// Writes interpolated text to the output.
pub trait ValueEncoder: Send + Sync + Debug {
    fn encode(&self, text: &str, out: &mut dyn TextSink) -> io::Result<()>;
}

/// Every value in its natural text form.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalText;

impl Stringifier for NaturalText {
    fn stringify(&self, value: &Value) -> String {
        value.to_string()
    }
}

/// Like [`NaturalText`], but path values always use `/` as separator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortablePaths;

impl Stringifier for PortablePaths {
    fn stringify(&self, value: &Value) -> String {
        match value {
            Value::Path(path) => path.to_string_lossy().replace('\\', "/"),
            other => other.to_string(),
        }
    }
}

/// Escapes text for inclusion in HTML. The generic engine's default.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEscape;

impl ValueEncoder for HtmlEscape {
    fn encode(&self, text: &str, out: &mut dyn TextSink) -> io::Result<()> {
        let mut start = 0;
        for (i, c) in text.char_indices() {
            let entity = match c {
                '&' => "&amp;",
                '<' => "&lt;",
                '>' => "&gt;",
                '"' => "&quot;",
                '\'' => "&#39;",
                _ => continue,
            };
            out.write_text(&text[start..i])?;
            out.write_text(entity)?;
            start = i + c.len_utf8();
        }
        out.write_text(&text[start..])
    }
}

/// Writes text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl ValueEncoder for Verbatim {
    fn encode(&self, text: &str, out: &mut dyn TextSink) -> io::Result<()> {
        out.write_text(text)
    }
}
