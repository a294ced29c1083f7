//! In-memory record provider
//!
//! Holds named sources of pre-materialized records. Useful for embedding the
//! engine behind a reader that has already decoded its input, and for tests.

use std::collections::HashMap;

use super::{Record, RecordIter, RecordProvider, SourceError};
use crate::mapping::LogicalSource;

/// A record backed by a map from reference expression to ordered values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryRecord {
    values: HashMap<String, Vec<String>>,
}

impl MemoryRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from single-valued `(reference, value)` pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (k, v) in pairs {
            record.push(k, v);
        }
        record
    }

    /// Append a value for a reference (repeated calls build a multi-valued reference)
    pub fn push(&mut self, reference: impl Into<String>, value: impl Into<String>) {
        self.values
            .entry(reference.into())
            .or_default()
            .push(value.into());
    }

    /// Builder form of [`push`](Self::push)
    pub fn with(mut self, reference: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(reference, value);
        self
    }

    /// Set all values for a reference at once
    pub fn with_values<V: Into<String>>(
        mut self,
        reference: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.values
            .insert(reference.into(), values.into_iter().map(Into::into).collect());
        self
    }
}

impl Record for MemoryRecord {
    fn get(&self, reference: &str) -> Vec<String> {
        self.values.get(reference).cloned().unwrap_or_default()
    }
}

/// Provider serving records from memory, keyed by the logical source's `source` name
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    sources: HashMap<String, Vec<MemoryRecord>>,
}

impl MemoryProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the records for a named source
    pub fn insert(&mut self, source: impl Into<String>, records: Vec<MemoryRecord>) {
        self.sources.insert(source.into(), records);
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_source(mut self, source: impl Into<String>, records: Vec<MemoryRecord>) -> Self {
        self.insert(source, records);
        self
    }
}

impl RecordProvider for MemoryProvider {
    fn open_source(&self, source: &LogicalSource) -> Result<RecordIter<'_>, SourceError> {
        let records = self
            .sources
            .get(&source.source)
            .ok_or_else(|| SourceError::NotFound(source.source.clone()))?;

        Ok(Box::new(records.iter().map(|r| {
            Ok::<_, SourceError>(Box::new(r.clone()) as Box<dyn Record>)
        })))
    }
}
