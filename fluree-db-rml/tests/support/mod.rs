//! Shared fixtures for fluree-db-rml integration tests

// Each integration test crate uses a different subset of these helpers.
#![allow(dead_code)]

pub mod span_capture;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use fluree_db_rml::{
    BoxError, CancellationFlag, Executor, FunctionArgs, FunctionRegistry, LogicalSource,
    MemoryProvider, MemoryRecord, ObjectMap, PredicateObjectMap, RecordIter,
    RecordProvider, ReferenceFormulation, SourceError, SubjectMap, TriplesMap,
};

pub const EX: &str = "http://example.org/";

/// `http://example.org/{local}`
pub fn ex(local: &str) -> String {
    format!("{}{}", EX, local)
}

pub fn csv(source: &str) -> LogicalSource {
    LogicalSource::new(source, ReferenceFormulation::Csv)
}

pub fn json(source: &str, iterator: &str) -> LogicalSource {
    LogicalSource::new(source, ReferenceFormulation::JsonPath).with_iterator(iterator)
}

pub fn row(pairs: &[(&str, &str)]) -> MemoryRecord {
    MemoryRecord::from_pairs(pairs.iter().copied())
}

/// Students with ids and names
pub fn students() -> Vec<MemoryRecord> {
    vec![
        row(&[("ID", "10"), ("Name", "Venus")]),
        row(&[("ID", "20"), ("Name", "Mars")]),
    ]
}

/// `ex:Person` triples map: `person/{id}` typed `ex:Person` with `ex:name`
pub fn person_map(source: &str) -> TriplesMap {
    TriplesMap::new("ex:PersonMap", csv(source))
        .with_subject_map(
            SubjectMap::template(format!("{}person/{{id}}", EX))
                .unwrap()
                .with_class(ex("Person")),
        )
        .with_predicate_object_map(PredicateObjectMap::predicate(
            ex("name"),
            ObjectMap::reference("name"),
        ))
}

pub fn executor(provider: impl RecordProvider + 'static) -> Executor {
    Executor::new(Arc::new(provider), Arc::new(FunctionRegistry::new()))
}

pub fn executor_with_functions(
    provider: impl RecordProvider + 'static,
    functions: FunctionRegistry,
) -> Executor {
    Executor::new(Arc::new(provider), Arc::new(functions))
}

/// Registry with `ex:toUpper` (param `in`), `ex:concat` (params `a`, `b`)
/// and `ex:explode` (always fails)
pub fn test_functions() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    registry.register(ex("toUpper"), |args: &FunctionArgs| -> Result<Vec<String>, BoxError> {
        Ok(args.get("in").iter().map(|v| v.to_uppercase()).collect())
    });
    registry.register(ex("concat"), |args: &FunctionArgs| -> Result<Vec<String>, BoxError> {
        match (args.first("a"), args.first("b")) {
            (Some(a), Some(b)) => Ok(vec![format!("{}{}", a, b)]),
            _ => Ok(Vec::new()),
        }
    });
    registry.register(ex("explode"), |_: &FunctionArgs| -> Result<Vec<String>, BoxError> {
        Err("exploded".into())
    });
    registry
}

/// Provider wrapper counting how often each source is opened
#[derive(Debug, Clone, Default)]
pub struct CountingProvider {
    inner: MemoryProvider,
    opens: Arc<Mutex<HashMap<String, usize>>>,
}

impl CountingProvider {
    pub fn new(inner: MemoryProvider) -> Self {
        Self {
            inner,
            opens: Arc::default(),
        }
    }

    pub fn opens(&self, source: &str) -> usize {
        self.opens.lock().unwrap().get(source).copied().unwrap_or(0)
    }
}

impl RecordProvider for CountingProvider {
    fn open_source(&self, source: &LogicalSource) -> Result<RecordIter<'_>, SourceError> {
        *self
            .opens
            .lock()
            .unwrap()
            .entry(source.source.clone())
            .or_default() += 1;
        self.inner.open_source(source)
    }
}

/// Provider whose named source fails after yielding `ok_records` records
#[derive(Debug, Clone)]
pub struct FailingProvider {
    inner: MemoryProvider,
    failing_source: String,
    ok_records: usize,
}

impl FailingProvider {
    pub fn new(inner: MemoryProvider, failing_source: &str, ok_records: usize) -> Self {
        Self {
            inner,
            failing_source: failing_source.to_string(),
            ok_records,
        }
    }
}

impl RecordProvider for FailingProvider {
    fn open_source(&self, source: &LogicalSource) -> Result<RecordIter<'_>, SourceError> {
        let records = self.inner.open_source(source)?;
        if source.source != self.failing_source {
            return Ok(records);
        }
        let ok = self.ok_records;
        Ok(Box::new(records.take(ok).chain(std::iter::once(Err(
            SourceError::Read(format!("corrupt input after {} records", ok)),
        )))))
    }
}

/// Provider that raises a cancellation flag once `after` records were yielded
#[derive(Debug, Clone)]
pub struct CancellingProvider {
    inner: MemoryProvider,
    flag: CancellationFlag,
    after: usize,
    yielded: Arc<AtomicUsize>,
}

impl CancellingProvider {
    pub fn new(inner: MemoryProvider, flag: CancellationFlag, after: usize) -> Self {
        Self {
            inner,
            flag,
            after,
            yielded: Arc::default(),
        }
    }

    pub fn yielded(&self) -> usize {
        self.yielded.load(Ordering::SeqCst)
    }
}

impl RecordProvider for CancellingProvider {
    fn open_source(&self, source: &LogicalSource) -> Result<RecordIter<'_>, SourceError> {
        let records = self.inner.open_source(source)?;
        Ok(Box::new(records.map(move |record| {
            if self.yielded.fetch_add(1, Ordering::SeqCst) + 1 >= self.after {
                self.flag.cancel();
            }
            record
        })))
    }
}
