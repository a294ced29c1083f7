//! Materialized RDF terms
//!
//! [`RdfTerm`] is the value the engine emits for subjects, predicates,
//! objects and graphs. Its `Display` form is the N-Triples/N-Quads rendering
//! and doubles as the canonical key used for deduplication and ordering.

use std::fmt;

use fluree_vocab::{rdf, xsd};

/// Materialized RDF term
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RdfTerm {
    /// An IRI
    Iri(String),
    /// A blank node with local label
    BlankNode(String),
    /// A literal with optional datatype and language
    ///
    /// Construct through [`RdfTerm::literal`] so that `xsd:string` is folded
    /// into the plain form and language-tagged values carry `rdf:langString`.
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl RdfTerm {
    /// Create an IRI term
    pub fn iri(iri: impl Into<String>) -> Self {
        RdfTerm::Iri(iri.into())
    }

    /// Create a blank node term
    pub fn blank_node(label: impl Into<String>) -> Self {
        RdfTerm::BlankNode(label.into())
    }

    /// Create a plain string literal
    pub fn string(value: impl Into<String>) -> Self {
        RdfTerm::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    /// Create a typed literal
    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self::literal(value, Some(datatype.into()), None)
    }

    /// Create a language-tagged string
    pub fn lang_string(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Self::literal(value, None, Some(lang.into()))
    }

    /// Create a literal, normalizing its datatype
    ///
    /// A language tag wins over any datatype and forces `rdf:langString`.
    /// An explicit `xsd:string` datatype is equivalent to a plain literal.
    pub fn literal(
        value: impl Into<String>,
        datatype: Option<String>,
        language: Option<String>,
    ) -> Self {
        let value = value.into();
        match language {
            Some(lang) => RdfTerm::Literal {
                value,
                datatype: Some(rdf::LANG_STRING.to_string()),
                language: Some(lang),
            },
            None => RdfTerm::Literal {
                value,
                datatype: datatype.filter(|dt| !xsd::is_string(dt)),
                language: None,
            },
        }
    }

    /// Check if this is an IRI
    pub fn is_iri(&self) -> bool {
        matches!(self, RdfTerm::Iri(_))
    }

    /// Check if this is a blank node
    pub fn is_blank_node(&self) -> bool {
        matches!(self, RdfTerm::BlankNode(_))
    }

    /// Check if this is a literal
    pub fn is_literal(&self) -> bool {
        matches!(self, RdfTerm::Literal { .. })
    }

    /// Get as IRI string if this is an IRI
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            RdfTerm::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// The lexical form: IRI string, blank node label, or literal value
    pub fn lexical(&self) -> &str {
        match self {
            RdfTerm::Iri(iri) => iri,
            RdfTerm::BlankNode(label) => label,
            RdfTerm::Literal { value, .. } => value,
        }
    }

    /// Canonical N-Triples rendering
    pub fn to_canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RdfTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfTerm::Iri(iri) => write_iri(f, iri),
            RdfTerm::BlankNode(label) => write!(f, "_:{}", label),
            RdfTerm::Literal {
                value,
                datatype,
                language,
            } => {
                f.write_str("\"")?;
                write_escaped_literal(f, value)?;
                f.write_str("\"")?;
                match (language, datatype) {
                    (Some(lang), _) => write!(f, "@{}", lang),
                    (None, Some(dt)) => {
                        f.write_str("^^")?;
                        write_iri(f, dt)
                    }
                    (None, None) => Ok(()),
                }
            }
        }
    }
}

fn write_iri(f: &mut fmt::Formatter<'_>, iri: &str) -> fmt::Result {
    f.write_str("<")?;
    for c in iri.chars() {
        match c {
            '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' => {
                write!(f, "\\u{:04X}", c as u32)?
            }
            c if c <= ' ' => write!(f, "\\u{:04X}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str(">")
}

fn write_escaped_literal(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    for c in value.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\u{:04X}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    Ok(())
}
