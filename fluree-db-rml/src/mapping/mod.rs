//! RML rule model
//!
//! In-memory representation of an already-parsed rule graph: TriplesMaps,
//! logical sources, term maps, referencing object maps and templates. These
//! structures are produced by an external loader and read by the executor.

mod ref_object_map;
mod rule_graph;
mod template;
mod term_map;
mod triples_map;

pub use ref_object_map::{JoinCondition, RefObjectMap};
pub use rule_graph::RuleGraph;
pub use template::{Segment, Template};
pub use term_map::{
    FunctionParameter, FunctionValue, ObjectMap, PredicateObjectMap, TermMap, TermMapValue,
    TermType,
};
pub use triples_map::{LogicalSource, ReferenceFormulation, SubjectMap, TriplesMap};
