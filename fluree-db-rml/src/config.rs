//! Executor configuration
//!
//! All fields have defaults, so an empty JSON object is a valid config.

use serde::{Deserialize, Serialize};

use crate::error::{RmlError, RmlResult};

/// What to do when a function used by a subject map fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SubjectErrorPolicy {
    /// Skip the record, record a diagnostic and continue
    #[default]
    SkipRecord,
    /// Stop the triples map and discard its quads
    AbortTriplesMap,
}

/// What to do when a logical source cannot be opened or read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SourceErrorPolicy {
    /// Fail the whole run with a source access error
    ///
    /// `execute` returns only the error: quads already collected from other
    /// triples maps are dropped along with the rest of the run. Use
    /// [`SkipTriplesMap`](Self::SkipTriplesMap) to confine a source failure to
    /// the triples map reading it.
    #[default]
    Fail,
    /// Discard the failing triples map's quads and continue with the next one
    ///
    /// Quads from every other triples map are kept and the failure is
    /// recorded as a diagnostic in the execution report.
    SkipTriplesMap,
}

/// Executor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExecutorConfig {
    /// Base IRI for resolving relative IRIs (relative values are dropped if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_iri: Option<String>,

    /// Policy for function failures while generating subjects
    pub subject_function_errors: SubjectErrorPolicy,

    /// Policy for logical sources that cannot be read
    pub source_errors: SourceErrorPolicy,

    /// Deduplicate the output store (bag semantics when false)
    pub remove_duplicates: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            base_iri: None,
            subject_function_errors: SubjectErrorPolicy::default(),
            source_errors: SourceErrorPolicy::default(),
            remove_duplicates: true,
        }
    }
}

impl ExecutorConfig {
    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> RmlResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RmlError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> RmlResult<()> {
        if let Some(base) = &self.base_iri {
            oxiri::Iri::parse(base.as_str())
                .map_err(|e| RmlError::Config(format!("invalid base IRI '{}': {}", base, e)))?;
        }
        Ok(())
    }

    /// Set the base IRI
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = Some(base_iri.into());
        self
    }

    /// Set the subject function error policy
    pub fn with_subject_function_errors(mut self, policy: SubjectErrorPolicy) -> Self {
        self.subject_function_errors = policy;
        self
    }

    /// Set the source error policy
    pub fn with_source_errors(mut self, policy: SourceErrorPolicy) -> Self {
        self.source_errors = policy;
        self
    }

    /// Enable or disable deduplication
    pub fn with_remove_duplicates(mut self, remove_duplicates: bool) -> Self {
        self.remove_duplicates = remove_duplicates;
        self
    }
}
