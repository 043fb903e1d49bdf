//! Compiles template text into a tree of [`Node`]s.
//!
//! Tag scanning uses `nom` with the delimiters supplied at compile time, so the
//! same parser serves `${name}` and `{{name}}` dialects.
use crate::ast::{Delimiters, Node};
use crate::error::TemplateError;
use nom::{
    IResult, Parser,
    bytes::complete::{tag, take_until},
    error::Error as NomError,
    sequence::delimited,
};

type ScanResult<'a, O> = IResult<&'a str, O, NomError<&'a str>>;

/// What a single tag means once its body is classified.
#[derive(Debug, PartialEq)]
enum Tag<'a> {
    Variable(&'a str),
    SectionStart { name: &'a str, inverted: bool },
    SectionEnd(&'a str),
    Comment,
}

/// An open section waiting for its end tag.
struct Frame {
    name: String,
    inverted: bool,
    line: usize,
    children: Vec<Node>,
}

/// Parses `source` into nodes. `template` names the source in error messages.
pub fn parse_template(
    template: &str,
    source: &str,
    delimiters: &Delimiters,
) -> Result<Vec<Node>, TemplateError> {
    let parse_error = |line: usize, message: String| TemplateError::Parse {
        template: template.to_string(),
        line,
        message,
    };

    if delimiters.open.is_empty() || delimiters.close.is_empty() {
        return Err(parse_error(1, "delimiters must not be empty".to_string()));
    }

    let mut root: Vec<Node> = Vec::new();
    let mut open_sections: Vec<Frame> = Vec::new();
    let mut rest = source;
    let mut line = 1;

    loop {
        let (after_text, text) = match text_before_tag(rest, &delimiters.open) {
            Ok(found) => found,
            Err(_) => {
                push_text(current_children(&mut root, &mut open_sections), rest);
                break;
            }
        };
        push_text(current_children(&mut root, &mut open_sections), text);
        line += count_lines(text);

        let (after_tag, body) = tag_body(after_text, delimiters).map_err(|_| {
            parse_error(
                line,
                format!("unclosed tag: missing '{}'", delimiters.close),
            )
        })?;
        let tag_line = line;
        line += count_lines(body);
        rest = after_tag;

        match classify(body).map_err(|message| parse_error(tag_line, message))? {
            Tag::Comment => {}
            Tag::Variable(name) => {
                current_children(&mut root, &mut open_sections).push(Node::Variable {
                    name: name.to_string(),
                    line: tag_line,
                });
            }
            Tag::SectionStart { name, inverted } => open_sections.push(Frame {
                name: name.to_string(),
                inverted,
                line: tag_line,
                children: Vec::new(),
            }),
            Tag::SectionEnd(name) => {
                let frame = open_sections.pop().ok_or_else(|| {
                    parse_error(tag_line, format!("unexpected section end '{}'", name))
                })?;
                if frame.name != name {
                    return Err(parse_error(
                        tag_line,
                        format!(
                            "section end '{}' does not match section '{}' opened at line {}",
                            name, frame.name, frame.line
                        ),
                    ));
                }
                current_children(&mut root, &mut open_sections).push(Node::Section {
                    name: frame.name,
                    inverted: frame.inverted,
                    line: frame.line,
                    children: frame.children,
                });
            }
        }
    }

    if let Some(frame) = open_sections.pop() {
        return Err(parse_error(
            frame.line,
            format!("section '{}' is never closed", frame.name),
        ));
    }

    Ok(root)
}

fn text_before_tag<'a>(input: &'a str, open: &str) -> ScanResult<'a, &'a str> {
    take_until(open).parse(input)
}

fn tag_body<'a>(input: &'a str, delimiters: &Delimiters) -> ScanResult<'a, &'a str> {
    delimited(
        tag(delimiters.open.as_str()),
        take_until(delimiters.close.as_str()),
        tag(delimiters.close.as_str()),
    )
    .parse(input)
}

fn classify(body: &str) -> Result<Tag<'_>, String> {
    let body = body.trim();
    let mut chars = body.chars();
    let (sigil, name) = match chars.next() {
        Some(c @ ('#' | '^' | '/' | '!' | '&' | '>' | '=')) => (Some(c), chars.as_str().trim()),
        _ => (None, body),
    };

    match sigil {
        Some('!') => return Ok(Tag::Comment),
        Some('>') => return Err(format!("partials are not supported: '{}'", body)),
        Some('=') => return Err(format!("delimiter changes are not supported: '{}'", body)),
        _ => {}
    }

    if name.is_empty() {
        return Err("empty tag".to_string());
    }

    Ok(match sigil {
        Some('#') => Tag::SectionStart {
            name,
            inverted: false,
        },
        Some('^') => Tag::SectionStart {
            name,
            inverted: true,
        },
        Some('/') => Tag::SectionEnd(name),
        _ => Tag::Variable(name),
    })
}

fn current_children<'n>(root: &'n mut Vec<Node>, open: &'n mut [Frame]) -> &'n mut Vec<Node> {
    match open.last_mut() {
        Some(frame) => &mut frame.children,
        None => root,
    }
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    match nodes.last_mut() {
        Some(Node::Text(previous)) => previous.push_str(text),
        _ => nodes.push(Node::Text(text.to_string())),
    }
}

fn count_lines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}
