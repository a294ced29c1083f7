//! RML execution error types

use thiserror::Error;

use crate::source::SourceError;

/// Boxed error returned by registered function implementations
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// RML execution errors
///
/// Absent data (missing reference values, unmatched joins, templates with an
/// empty placeholder) is never reported through this type: it simply produces
/// no term.
#[derive(Debug, Error)]
pub enum RmlError {
    /// Malformed or incomplete rule graph (fatal for the whole run)
    #[error("Rule graph error in {triples_map}: {message}")]
    RuleGraph { triples_map: String, message: String },

    /// Invalid template syntax
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// A logical source could not be opened or read
    #[error("Source access error in {triples_map}{}: {source}", at_record(.record))]
    SourceAccess {
        triples_map: String,
        record: Option<usize>,
        #[source]
        source: SourceError,
    },

    /// Function identifier is not registered
    #[error("Unknown function: {function}")]
    UnknownFunction { function: String },

    /// A registered function raised an error
    #[error("Function {function} failed: {source}")]
    FunctionExecution {
        function: String,
        #[source]
        source: BoxError,
    },

    /// The run was cancelled through its cancellation flag
    #[error("Execution cancelled")]
    Cancelled,

    /// Invalid executor configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

fn at_record(record: &Option<usize>) -> String {
    match record {
        Some(idx) => format!(" at record {}", idx),
        None => String::new(),
    }
}

impl RmlError {
    /// Create a rule graph error
    pub fn rule_graph(triples_map: impl Into<String>, message: impl Into<String>) -> Self {
        RmlError::RuleGraph {
            triples_map: triples_map.into(),
            message: message.into(),
        }
    }

    /// Create a source access error
    pub fn source_access(
        triples_map: impl Into<String>,
        record: Option<usize>,
        source: SourceError,
    ) -> Self {
        RmlError::SourceAccess {
            triples_map: triples_map.into(),
            record,
            source,
        }
    }

    /// Whether this error only affects a single term map evaluation
    pub fn is_function_error(&self) -> bool {
        matches!(
            self,
            RmlError::UnknownFunction { .. } | RmlError::FunctionExecution { .. }
        )
    }
}

/// Result type for RML operations
pub type RmlResult<T> = Result<T, RmlError>;
