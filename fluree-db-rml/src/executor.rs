//! Rule graph execution
//!
//! The [`Executor`] drives term generation over every selected triples map
//! and collects the resulting quads. Execution is single-threaded and
//! deterministic: triples maps run in declaration order, records in
//! provider order, predicate-object maps in declaration order.
//!
//! Each triples map writes into its own staged store which is merged into
//! the output only once the triples map completes, so a triples map that is
//! abandoned under a skip policy leaves no partial output behind.

use std::sync::Arc;

use fluree_vocab::{rdf, rr};

use crate::cancel::CancellationFlag;
use crate::config::{ExecutorConfig, SourceErrorPolicy, SubjectErrorPolicy};
use crate::error::{RmlError, RmlResult};
use crate::function::FunctionRegistry;
use crate::join::JoinResolver;
use crate::mapping::{ObjectMap, RuleGraph, TermMap, TriplesMap};
use crate::materialize::{blank_node_scope, RdfTerm, TermGenerator};
use crate::report::{Diagnostic, ExecutionReport, TriplesMapStats, TriplesMapStatus};
use crate::source::{Record, RecordProvider};
use crate::store::{Quad, QuadStore};

/// Output of [`Executor::execute_with_report`]
#[derive(Debug)]
pub struct Execution {
    pub store: QuadStore,
    pub report: ExecutionReport,
}

/// Executes rule graphs against a record provider
#[derive(Clone)]
pub struct Executor {
    provider: Arc<dyn RecordProvider>,
    functions: Arc<FunctionRegistry>,
    config: ExecutorConfig,
    cancel: Option<CancellationFlag>,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("functions", &self.functions.len())
            .field("config", &self.config)
            .field("cancellable", &self.cancel.is_some())
            .finish_non_exhaustive()
    }
}

/// A triples map failure, with the record it happened at
struct Failure {
    record: Option<usize>,
    error: RmlError,
}

impl From<RmlError> for Failure {
    fn from(error: RmlError) -> Self {
        let record = match &error {
            RmlError::SourceAccess { record, .. } => *record,
            _ => None,
        };
        Self { record, error }
    }
}

/// Per-triples-map state while records are processed
struct TriplesMapRun<'r> {
    tm: &'r TriplesMap,
    scope: String,
    staged: QuadStore,
    stats: TriplesMapStats,
    diagnostics: Vec<Diagnostic>,
    remove_duplicates: bool,
}

impl TriplesMapRun<'_> {
    fn emit(&mut self, quad: Quad) {
        self.stats.quads += 1;
        if self.remove_duplicates {
            self.staged.add(quad);
        } else {
            self.staged.push(quad);
        }
    }

    /// Generate terms, recording function failures instead of failing
    fn terms(
        &mut self,
        generator: &TermGenerator<'_>,
        term_map: &TermMap,
        record: &dyn Record,
        idx: usize,
    ) -> RmlResult<Vec<RdfTerm>> {
        match generator.generate(term_map, record, &self.scope) {
            Ok(terms) => Ok(terms),
            Err(e) if e.is_function_error() => {
                self.function_failed(idx, e);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    fn function_failed(&mut self, idx: usize, error: RmlError) {
        tracing::warn!(
            triples_map = %self.tm.iri,
            record = idx,
            error = %error,
            "Function failed, term map produced no terms"
        );
        self.diagnostics
            .push(Diagnostic::new(&self.tm.iri, Some(idx), error));
    }

    /// Graph terms for a set of graph maps (`None` is the default graph)
    fn graphs(
        &mut self,
        generator: &TermGenerator<'_>,
        graph_maps: &[TermMap],
        record: &dyn Record,
        idx: usize,
        graphs: &mut Vec<Option<RdfTerm>>,
    ) -> RmlResult<()> {
        for graph_map in graph_maps {
            for term in self.terms(generator, graph_map, record, idx)? {
                let graph = match term.as_iri() {
                    Some(rr::DEFAULT_GRAPH) => None,
                    _ => Some(term),
                };
                if !graphs.contains(&graph) {
                    graphs.push(graph);
                }
            }
        }
        Ok(())
    }
}

impl Executor {
    /// Create an executor with the default configuration
    pub fn new(provider: Arc<dyn RecordProvider>, functions: Arc<FunctionRegistry>) -> Self {
        Self {
            provider,
            functions,
            config: ExecutorConfig::default(),
            cancel: None,
        }
    }

    /// Use a configuration
    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Observe a cancellation flag between records
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// The active configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Execute a rule graph
    ///
    /// `filter` restricts execution to the named triples maps (parents of
    /// selected referencing object maps are still consulted for joins).
    pub fn execute(&self, graph: &RuleGraph, filter: Option<&[String]>) -> RmlResult<QuadStore> {
        Ok(self.execute_with_report(graph, filter)?.store)
    }

    /// Execute a rule graph and report per-triples-map statistics
    pub fn execute_with_report(
        &self,
        graph: &RuleGraph,
        filter: Option<&[String]>,
    ) -> RmlResult<Execution> {
        self.config.validate()?;
        graph.validate()?;
        let positions = graph.select(filter)?;

        let _span = tracing::info_span!("rml_execute", triples_maps = positions.len()).entered();

        let mut generator = TermGenerator::new(&self.functions);
        if let Some(base) = &self.config.base_iri {
            generator = generator.with_base_iri(base)?;
        }
        let mut resolver =
            JoinResolver::new(graph, self.provider.as_ref()).with_cancellation(self.cancel.clone());

        let mut store = QuadStore::new();
        let mut report = ExecutionReport::default();

        for position in positions {
            let Some(tm) = graph.triples_maps().get(position) else {
                continue;
            };
            let mut run = TriplesMapRun {
                tm,
                scope: blank_node_scope(position),
                staged: QuadStore::new(),
                stats: TriplesMapStats::new(&tm.iri),
                diagnostics: Vec::new(),
                remove_duplicates: self.config.remove_duplicates,
            };

            let outcome = self.run_triples_map(&mut run, &generator, &mut resolver);
            run.diagnostics.extend(resolver.take_diagnostics());

            match outcome {
                Ok(()) => {
                    if self.config.remove_duplicates {
                        store.merge(run.staged);
                    } else {
                        store.extend(run.staged);
                    }
                }
                Err(failure) if self.skips(&failure.error) => {
                    tracing::warn!(
                        triples_map = %tm.iri,
                        record = ?failure.record,
                        error = %failure.error,
                        "Skipping triples map"
                    );
                    run.stats.status = TriplesMapStatus::Skipped;
                    run.diagnostics
                        .push(Diagnostic::new(&tm.iri, failure.record, failure.error));
                }
                Err(failure) => return Err(failure.error),
            }

            report.diagnostics.append(&mut run.diagnostics);
            report.triples_maps.push(run.stats);
        }

        if self.config.remove_duplicates {
            store.remove_duplicates();
        }

        tracing::info!(
            quads = store.len(),
            triples_maps = report.triples_maps.len(),
            diagnostics = report.diagnostics.len(),
            "RML execution finished"
        );

        Ok(Execution { store, report })
    }

    /// Whether a triples map failure is absorbed by the configured policies
    fn skips(&self, error: &RmlError) -> bool {
        match error {
            RmlError::SourceAccess { .. } => {
                self.config.source_errors == SourceErrorPolicy::SkipTriplesMap
            }
            // Only subject generation escalates function errors
            e if e.is_function_error() => {
                self.config.subject_function_errors == SubjectErrorPolicy::AbortTriplesMap
            }
            _ => false,
        }
    }

    fn run_triples_map(
        &self,
        run: &mut TriplesMapRun<'_>,
        generator: &TermGenerator<'_>,
        resolver: &mut JoinResolver<'_>,
    ) -> Result<(), Failure> {
        let tm = run.tm;
        let _span = tracing::debug_span!("triples_map", iri = %tm.iri).entered();

        let source = tm
            .logical_source
            .as_ref()
            .ok_or_else(|| RmlError::rule_graph(&tm.iri, "missing logical source"))?;
        let subject_map = tm
            .subject_map
            .as_ref()
            .ok_or_else(|| RmlError::rule_graph(&tm.iri, "missing subject map"))?;
        let rdf_type = RdfTerm::iri(rdf::TYPE);

        let records = self
            .provider
            .open_source(source)
            .map_err(|e| RmlError::source_access(&tm.iri, None, e))?;

        for (idx, record) in records.enumerate() {
            if self.cancel.as_ref().is_some_and(CancellationFlag::is_cancelled) {
                return Err(RmlError::Cancelled.into());
            }
            let record = record.map_err(|e| RmlError::source_access(&tm.iri, Some(idx), e))?;
            let record = &*record;
            run.stats.records += 1;

            let subjects = match generator.generate(&subject_map.term_map, record, &run.scope) {
                Ok(subjects) => subjects,
                Err(e) if e.is_function_error() => match self.config.subject_function_errors {
                    SubjectErrorPolicy::SkipRecord => {
                        run.function_failed(idx, e);
                        run.stats.skipped_records += 1;
                        continue;
                    }
                    SubjectErrorPolicy::AbortTriplesMap => {
                        return Err(Failure {
                            record: Some(idx),
                            error: e,
                        })
                    }
                },
                Err(e) => return Err(e.into()),
            };
            if subjects.is_empty() {
                tracing::debug!(triples_map = %tm.iri, record = idx, "No subject, skipping record");
                run.stats.skipped_records += 1;
                continue;
            }

            let mut subject_graphs = Vec::new();
            run.graphs(generator, &subject_map.graph_maps, record, idx, &mut subject_graphs)?;

            for subject in &subjects {
                for class in &subject_map.classes {
                    for graph in graph_set(!subject_map.graph_maps.is_empty(), &subject_graphs) {
                        run.emit(Quad::new(
                            subject.clone(),
                            rdf_type.clone(),
                            RdfTerm::iri(class.as_str()),
                            graph,
                        ));
                    }
                }
            }

            for pom in &tm.predicate_object_maps {
                let mut predicates = Vec::new();
                for predicate_map in &pom.predicate_maps {
                    predicates.extend(run.terms(generator, predicate_map, record, idx)?);
                }
                if predicates.is_empty() {
                    continue;
                }

                let mut objects = Vec::new();
                for object_map in &pom.object_maps {
                    match object_map {
                        ObjectMap::Term(term_map) => {
                            objects.extend(run.terms(generator, term_map, record, idx)?);
                        }
                        ObjectMap::RefObjectMap(rom) => {
                            match resolver.resolve(rom, tm, record, generator) {
                                Ok(terms) => objects.extend(terms),
                                Err(e) if e.is_function_error() => run.function_failed(idx, e),
                                Err(e) => return Err(e.into()),
                            }
                        }
                    }
                }
                if objects.is_empty() {
                    continue;
                }

                let mut graphs = subject_graphs.clone();
                run.graphs(generator, &pom.graph_maps, record, idx, &mut graphs)?;
                let declared = !subject_map.graph_maps.is_empty() || !pom.graph_maps.is_empty();
                let graphs = graph_set(declared, &graphs);
                if graphs.is_empty() {
                    continue;
                }

                for subject in &subjects {
                    for predicate in &predicates {
                        for object in &objects {
                            for graph in &graphs {
                                run.emit(Quad::new(
                                    subject.clone(),
                                    predicate.clone(),
                                    object.clone(),
                                    graph.clone(),
                                ));
                            }
                        }
                    }
                }
            }
        }

        tracing::debug!(
            triples_map = %tm.iri,
            records = run.stats.records,
            skipped = run.stats.skipped_records,
            quads = run.stats.quads,
            "Triples map complete"
        );
        Ok(())
    }
}

/// Graphs a quad goes to
///
/// Without graph maps that is the default graph. Declared graph maps that
/// generated nothing leave the quad with no graph at all.
fn graph_set(declared: bool, graphs: &[Option<RdfTerm>]) -> Vec<Option<RdfTerm>> {
    if !declared {
        vec![None]
    } else {
        graphs.to_vec()
    }
}
