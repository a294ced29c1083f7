//! RML execution engine for Fluree DB
//!
//! This crate executes an RML rule graph (a set of TriplesMaps) against
//! record-oriented sources and produces a deduplicated set of RDF quads.
//! Parsing the rule graph and decoding source formats happen elsewhere: the
//! engine consumes an in-memory [`RuleGraph`] and reads records through the
//! [`RecordProvider`] boundary.
//!
//! # Key Features
//!
//! - **Term generation**: constants, references, templates (with IRI-safe
//!   percent-encoding) and function calls, multi-valued throughout
//! - **Joins**: referencing object maps resolved through a per-parent key
//!   index built once per run
//! - **Graph maps**: named graphs on subject maps and predicate-object maps
//! - **Deterministic output**: a [`QuadStore`] with a canonical ordering
//!   independent of insertion order
//! - **Pluggable functions**: an explicit [`FunctionRegistry`] handed to the
//!   executor
//!
//! # Usage
//!
//! Build a [`RuleGraph`], wrap a provider (for example [`MemoryProvider`])
//! and a function registry in an [`Executor`], then call
//! [`Executor::execute`].

pub mod cancel;
pub mod config;
pub mod error;
pub mod executor;
pub mod function;
pub mod join;
pub mod mapping;
pub mod materialize;
pub mod report;
pub mod source;
pub mod store;

pub use cancel::CancellationFlag;
pub use config::{ExecutorConfig, SourceErrorPolicy, SubjectErrorPolicy};
pub use error::{BoxError, RmlError, RmlResult};
pub use executor::{Execution, Executor};
pub use function::{FunctionArgs, FunctionInvoker, FunctionRegistry, RmlFunction};
pub use join::JoinResolver;
pub use mapping::{
    FunctionParameter, FunctionValue, JoinCondition, LogicalSource, ObjectMap,
    PredicateObjectMap, RefObjectMap, ReferenceFormulation, RuleGraph, SubjectMap, Template,
    TermMap, TermMapValue, TermType, TriplesMap,
};
pub use materialize::{RdfTerm, TermGenerator};
pub use report::{Diagnostic, ExecutionReport, TriplesMapStats, TriplesMapStatus};
pub use source::{MemoryProvider, MemoryRecord, Record, RecordIter, RecordProvider, SourceError};
pub use store::{Quad, QuadStore};
