//! Referencing object map resolution
//!
//! A referencing object map produces the subjects of a parent triples map
//! whose join keys equal the child record's. Parent sources are scanned at
//! most once per run: the first lookup against a parent builds an index for
//! every parent key layout the rule graph uses, and the index is read-only
//! after that.
//!
//! Join keys are the ordered values of each referenced expression; a record
//! with no value for any join reference has no key and never matches.

use rustc_hash::FxHashMap;

use crate::cancel::CancellationFlag;
use crate::error::{RmlError, RmlResult};
use crate::mapping::{RefObjectMap, RuleGraph, TriplesMap};
use crate::materialize::{blank_node_scope, RdfTerm, TermGenerator};
use crate::report::Diagnostic;
use crate::source::{Record, RecordProvider};

/// Ordered parent references forming a join key
type KeyLayout = Vec<String>;

/// One value list per join reference
type JoinKey = Vec<Vec<String>>;

/// Parent subjects by key, for one layout
type KeyIndex = FxHashMap<JoinKey, Vec<RdfTerm>>;

/// Indexes built from one pass over a parent triples map's source
#[derive(Debug, Default)]
struct ParentIndex {
    by_layout: FxHashMap<KeyLayout, KeyIndex>,
    records: usize,
}

impl ParentIndex {
    fn lookup(&self, layout: &[String], key: &[Vec<String>]) -> &[RdfTerm] {
        self.by_layout
            .get(layout)
            .and_then(|index| index.get(key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Resolves referencing object maps against parent triples maps
pub struct JoinResolver<'a> {
    graph: &'a RuleGraph,
    provider: &'a dyn RecordProvider,
    cancel: Option<CancellationFlag>,
    indexes: FxHashMap<String, ParentIndex>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> JoinResolver<'a> {
    /// Create a resolver over a rule graph and record provider
    pub fn new(graph: &'a RuleGraph, provider: &'a dyn RecordProvider) -> Self {
        Self {
            graph,
            provider,
            cancel: None,
            indexes: FxHashMap::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Observe a cancellation flag while scanning parent sources
    pub fn with_cancellation(mut self, cancel: Option<CancellationFlag>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Parent subjects joined to `record` through `rom`
    ///
    /// `child` is the triples map owning the referencing object map. Without
    /// join conditions, a parent sharing the child's logical source yields
    /// the parent subject of the child record itself; any other parent
    /// yields all of its subjects.
    pub fn resolve(
        &mut self,
        rom: &RefObjectMap,
        child: &TriplesMap,
        record: &dyn Record,
        generator: &TermGenerator<'_>,
    ) -> RmlResult<Vec<RdfTerm>> {
        let (position, parent) = self.parent(rom, child)?;

        if !rom.has_conditions() && parent.logical_source == child.logical_source {
            let subject_map = parent
                .subject_map
                .as_ref()
                .ok_or_else(|| RmlError::rule_graph(&parent.iri, "missing subject map"))?;
            return generator.generate(&subject_map.term_map, record, &blank_node_scope(position));
        }

        let key = match child_key(rom, record) {
            Some(key) => key,
            None => return Ok(Vec::new()),
        };

        let layout = rom.parent_key_layout();
        let covered = self
            .indexes
            .get(&parent.iri)
            .is_some_and(|index| index.by_layout.contains_key(&layout));
        if !covered {
            let index = self.build_index(position, parent, &layout, generator)?;
            self.indexes.insert(parent.iri.clone(), index);
        }

        Ok(self
            .indexes
            .get(&parent.iri)
            .map(|index| index.lookup(&layout, &key).to_vec())
            .unwrap_or_default())
    }

    /// Whether the index for a parent triples map has been built
    pub fn is_indexed(&self, parent: &str) -> bool {
        self.indexes.contains_key(parent)
    }

    /// Take diagnostics recorded while building parent indexes
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn parent(&self, rom: &RefObjectMap, child: &TriplesMap) -> RmlResult<(usize, &'a TriplesMap)> {
        let graph = self.graph;
        graph
            .position(&rom.parent_triples_map)
            .and_then(|pos| graph.triples_maps().get(pos).map(|tm| (pos, tm)))
            .ok_or_else(|| {
                RmlError::rule_graph(
                    &child.iri,
                    format!("unknown parent TriplesMap {}", rom.parent_triples_map),
                )
            })
    }

    fn build_index(
        &mut self,
        position: usize,
        parent: &TriplesMap,
        requested: &[String],
        generator: &TermGenerator<'_>,
    ) -> RmlResult<ParentIndex> {
        let _span = tracing::debug_span!("build_join_index", parent = %parent.iri).entered();

        let source = parent
            .logical_source
            .as_ref()
            .ok_or_else(|| RmlError::rule_graph(&parent.iri, "missing logical source"))?;
        let subject_map = parent
            .subject_map
            .as_ref()
            .ok_or_else(|| RmlError::rule_graph(&parent.iri, "missing subject map"))?;

        // Layouts from the rule graph, plus any requested by a map outside it
        let mut layouts = self.graph.parent_key_layouts(&parent.iri);
        if !layouts.iter().any(|l| l.as_slice() == requested) {
            layouts.push(requested.to_vec());
        }
        let scope = blank_node_scope(position);
        let mut index = ParentIndex::default();
        for layout in &layouts {
            index.by_layout.insert(layout.clone(), KeyIndex::default());
        }

        let records = self
            .provider
            .open_source(source)
            .map_err(|e| RmlError::source_access(&parent.iri, None, e))?;

        for (idx, record) in records.enumerate() {
            if self.cancel.as_ref().is_some_and(CancellationFlag::is_cancelled) {
                return Err(RmlError::Cancelled);
            }
            let record = record.map_err(|e| RmlError::source_access(&parent.iri, Some(idx), e))?;
            index.records += 1;

            let subjects = match generator.generate(&subject_map.term_map, &*record, &scope) {
                Ok(subjects) => subjects,
                Err(e) if e.is_function_error() => {
                    tracing::warn!(
                        parent = %parent.iri,
                        record = idx,
                        error = %e,
                        "Failed to generate parent subject, skipping record"
                    );
                    self.diagnostics.push(Diagnostic::new(&parent.iri, Some(idx), e));
                    continue;
                }
                Err(e) => return Err(e),
            };
            if subjects.is_empty() {
                continue;
            }

            for layout in &layouts {
                let Some(key) = record_key(layout.iter().map(String::as_str), &*record) else {
                    continue;
                };
                if let Some(by_key) = index.by_layout.get_mut(layout) {
                    by_key.entry(key).or_default().extend(subjects.iter().cloned());
                }
            }
        }

        tracing::debug!(
            parent = %parent.iri,
            records = index.records,
            layouts = layouts.len(),
            "Built parent index for referencing object maps"
        );
        Ok(index)
    }
}

fn child_key(rom: &RefObjectMap, record: &dyn Record) -> Option<JoinKey> {
    record_key(rom.child_references().into_iter(), record)
}

/// Ordered value lists for each reference; `None` if any is empty
fn record_key<'r>(
    references: impl Iterator<Item = &'r str>,
    record: &dyn Record,
) -> Option<JoinKey> {
    let mut key = Vec::new();
    for reference in references {
        let values = record.get(reference);
        if values.is_empty() {
            return None;
        }
        key.push(values);
    }
    Some(key)
}
