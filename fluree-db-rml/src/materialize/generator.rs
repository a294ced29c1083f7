//! Term generation
//!
//! [`TermGenerator`] evaluates a single term map against a single record and
//! produces zero or more RDF terms. It has no knowledge of joins; reference
//! object maps are resolved by the join resolver.

use oxiri::Iri;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::RdfTerm;
use crate::error::{RmlError, RmlResult};
use crate::function::{FunctionInvoker, FunctionRegistry};
use crate::mapping::{Segment, Template, TermMap, TermMapValue, TermType};
use crate::source::Record;

/// Characters kept verbatim when a value is substituted into an IRI template
///
/// Everything outside the RFC 3986 unreserved set is percent-encoded.
const IRI_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Blank node scope for the triples map at a declaration position
///
/// Blank nodes generated from the same value under the same scope are the
/// same node; different triples maps never share blank nodes.
pub fn blank_node_scope(position: usize) -> String {
    format!("tm{}", position)
}

/// Evaluates term maps against records
#[derive(Debug, Clone)]
pub struct TermGenerator<'a> {
    functions: FunctionInvoker<'a>,
    base_iri: Option<Iri<String>>,
}

impl<'a> TermGenerator<'a> {
    /// Create a generator dispatching functions through `functions`
    pub fn new(functions: &'a FunctionRegistry) -> Self {
        Self {
            functions: FunctionInvoker::new(functions),
            base_iri: None,
        }
    }

    /// Resolve relative IRIs against a base
    pub fn with_base_iri(mut self, base_iri: &str) -> RmlResult<Self> {
        let base = Iri::parse(base_iri.to_string())
            .map_err(|e| RmlError::Config(format!("invalid base IRI '{}': {}", base_iri, e)))?;
        self.base_iri = Some(base);
        Ok(self)
    }

    /// Generate the terms of `term_map` for `record`
    ///
    /// Absent data yields an empty vector. Errors are only raised by
    /// function term maps (unknown identifier or failed invocation).
    pub fn generate(
        &self,
        term_map: &TermMap,
        record: &dyn Record,
        scope: &str,
    ) -> RmlResult<Vec<RdfTerm>> {
        match &term_map.value {
            TermMapValue::Constant(value) => Ok(vec![self.constant_term(term_map, value, scope)]),
            TermMapValue::Reference(reference) => Ok(record
                .get(reference)
                .into_iter()
                .filter_map(|value| self.make_term(term_map, value, scope))
                .collect()),
            TermMapValue::Template(template) => Ok(expand(template, record, term_map.term_type)
                .into_iter()
                .filter_map(|value| self.make_term(term_map, value, scope))
                .collect()),
            TermMapValue::Function(function) => {
                let values = self
                    .functions
                    .call(function, |param| self.lexical_values(param, record, scope))?;
                Ok(values
                    .into_iter()
                    .filter_map(|value| self.make_term(term_map, value, scope))
                    .collect())
            }
        }
    }

    /// Generate terms and keep only their lexical forms
    pub fn lexical_values(
        &self,
        term_map: &TermMap,
        record: &dyn Record,
        scope: &str,
    ) -> RmlResult<Vec<String>> {
        Ok(self
            .generate(term_map, record, scope)?
            .into_iter()
            .map(|term| match term {
                RdfTerm::Iri(v) | RdfTerm::BlankNode(v) => v,
                RdfTerm::Literal { value, .. } => value,
            })
            .collect())
    }

    fn constant_term(&self, term_map: &TermMap, value: &str, scope: &str) -> RdfTerm {
        match term_map.term_type {
            TermType::Iri => RdfTerm::Iri(
                self.resolve_iri(value)
                    .unwrap_or_else(|| value.to_string()),
            ),
            TermType::BlankNode => RdfTerm::BlankNode(blank_node_label(scope, value)),
            TermType::Literal => RdfTerm::literal(
                value,
                term_map.datatype.clone(),
                term_map.language.clone(),
            ),
        }
    }

    fn make_term(&self, term_map: &TermMap, value: String, scope: &str) -> Option<RdfTerm> {
        match term_map.term_type {
            TermType::Iri => match self.resolve_iri(&value) {
                Some(iri) => Some(RdfTerm::Iri(iri)),
                None => {
                    tracing::debug!(value = %value, "dropping value that is not a valid IRI");
                    None
                }
            },
            TermType::BlankNode => Some(RdfTerm::BlankNode(blank_node_label(scope, &value))),
            TermType::Literal => Some(RdfTerm::literal(
                value,
                term_map.datatype.clone(),
                term_map.language.clone(),
            )),
        }
    }

    /// Absolute IRIs pass through; relative ones resolve against the base
    fn resolve_iri(&self, value: &str) -> Option<String> {
        if Iri::parse(value).is_ok() {
            return Some(value.to_string());
        }
        let base = self.base_iri.as_ref()?;
        base.resolve(value).ok().map(Iri::into_inner)
    }
}

/// Expand a template into every combination of its placeholder values
///
/// If any placeholder has no value the result is empty. Combinations vary
/// the last placeholder fastest. Values are percent-encoded when the
/// template produces IRIs.
pub fn expand(template: &Template, record: &dyn Record, term_type: TermType) -> Vec<String> {
    let mut results = vec![String::new()];
    for segment in template.segments() {
        match segment {
            Segment::Text(text) => {
                for result in &mut results {
                    result.push_str(text);
                }
            }
            Segment::Reference(reference) => {
                let values = record.get(reference);
                if values.is_empty() {
                    return Vec::new();
                }
                let values: Vec<String> = if term_type.is_iri() {
                    values.iter().map(|v| iri_safe(v)).collect()
                } else {
                    values
                };
                let mut next = Vec::with_capacity(results.len() * values.len());
                for prefix in &results {
                    for value in &values {
                        let mut combined = String::with_capacity(prefix.len() + value.len());
                        combined.push_str(prefix);
                        combined.push_str(value);
                        next.push(combined);
                    }
                }
                results = next;
            }
        }
    }
    results
}

/// Percent-encode a value for substitution into an IRI
pub fn iri_safe(value: &str) -> String {
    utf8_percent_encode(value, IRI_SAFE).to_string()
}

/// Build a blank node label that is valid N-Triples and unique per scope
///
/// ASCII alphanumerics are kept; every other byte becomes `_XX`.
fn blank_node_label(scope: &str, value: &str) -> String {
    let mut label = String::with_capacity(scope.len() + 1 + value.len());
    label.push_str(scope);
    label.push('-');
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() {
            label.push(byte as char);
        } else {
            label.push_str(&format!("_{:02X}", byte));
        }
    }
    label
}
