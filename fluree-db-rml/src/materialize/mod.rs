//! Term materialization
//!
//! Generates RDF terms from record values according to term maps.

mod generator;
mod term;

pub use generator::{blank_node_scope, expand, iri_safe, TermGenerator};
pub use term::RdfTerm;
