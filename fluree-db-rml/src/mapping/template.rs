//! String templates with `{reference}` placeholders
//!
//! A template such as `http://ex.org/person/{id}` is parsed once into literal
//! text segments and reference segments. Backslash escapes (`\{`, `\}`, `\\`)
//! produce literal braces and backslashes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RmlError, RmlResult};

/// One piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Literal text copied into the output unchanged
    Text(String),
    /// Placeholder replaced by the values of a reference expression
    Reference(String),
}

/// A parsed string template
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template string
    ///
    /// Fails on unterminated placeholders, nested or stray closing braces,
    /// empty placeholders, and dangling escapes.
    pub fn parse(template: impl Into<String>) -> RmlResult<Self> {
        let source = template.into();
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut reference: Option<String> = None;
        let mut chars = source.chars();

        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    let escaped = chars.next().ok_or_else(|| {
                        RmlError::InvalidTemplate(format!("dangling escape in '{}'", source))
                    })?;
                    match reference.as_mut() {
                        Some(r) => r.push(escaped),
                        None => text.push(escaped),
                    }
                }
                '{' => {
                    if reference.is_some() {
                        return Err(RmlError::InvalidTemplate(format!(
                            "nested '{{' in '{}'",
                            source
                        )));
                    }
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    reference = Some(String::new());
                }
                '}' => match reference.take() {
                    Some(r) if r.is_empty() => {
                        return Err(RmlError::InvalidTemplate(format!(
                            "empty placeholder in '{}'",
                            source
                        )));
                    }
                    Some(r) => segments.push(Segment::Reference(r)),
                    None => {
                        return Err(RmlError::InvalidTemplate(format!(
                            "unmatched '}}' in '{}'",
                            source
                        )));
                    }
                },
                _ => match reference.as_mut() {
                    Some(r) => r.push(c),
                    None => text.push(c),
                },
            }
        }

        if reference.is_some() {
            return Err(RmlError::InvalidTemplate(format!(
                "unterminated placeholder in '{}'",
                source
            )));
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Ok(Self { source, segments })
    }

    /// The original template string
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Parsed segments in order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Reference expressions used by the template, in placeholder order
    pub fn references(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Reference(r) => Some(r.as_str()),
                Segment::Text(_) => None,
            })
            .collect()
    }
}

impl TryFrom<String> for Template {
    type Error = RmlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Template::parse(value)
    }
}

impl From<Template> for String {
    fn from(template: Template) -> Self {
        template.source
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
