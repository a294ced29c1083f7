//! RML TriplesMap, LogicalSource and SubjectMap structures

use serde::{Deserialize, Serialize};

use super::{PredicateObjectMap, RefObjectMap, TermMap};
use crate::error::RmlResult;

/// How reference expressions are interpreted by the record provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceFormulation {
    /// Row-based: references are column names
    Csv,
    /// Path-based over JSON documents
    JsonPath,
    /// Path-based over XML documents
    XPath,
    /// Query-based: references are result columns
    Sql,
    /// Any other formulation, identified by IRI
    Other(String),
}

/// Logical source of a TriplesMap
///
/// Two triples maps share a logical source when these descriptors are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicalSource {
    /// Source identifier (path, table name, endpoint...)
    pub source: String,
    /// Reference formulation tag
    pub reference_formulation: ReferenceFormulation,
    /// Record boundary expression (e.g. `$.people[*]`)
    pub iterator: Option<String>,
    /// Query to run against the source, for query-based formulations
    pub query: Option<String>,
}

impl LogicalSource {
    /// Create a logical source without iterator or query
    pub fn new(source: impl Into<String>, reference_formulation: ReferenceFormulation) -> Self {
        Self {
            source: source.into(),
            reference_formulation,
            iterator: None,
            query: None,
        }
    }

    /// Set the iterator expression
    pub fn with_iterator(mut self, iterator: impl Into<String>) -> Self {
        self.iterator = Some(iterator.into());
        self
    }

    /// Set the query
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

/// Subject map
///
/// A term map restricted to IRIs and blank nodes, plus the classes every
/// generated subject is typed with and the graphs its quads go to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectMap {
    pub term_map: TermMap,
    /// `rdf:type` classes materialized per generated subject
    pub classes: Vec<String>,
    /// Graph maps applied to every quad of this subject
    pub graph_maps: Vec<TermMap>,
}

impl SubjectMap {
    /// Create a subject map from a term map
    pub fn new(term_map: TermMap) -> Self {
        Self {
            term_map,
            classes: Vec::new(),
            graph_maps: Vec::new(),
        }
    }

    /// Template subject map generating IRIs
    pub fn template(template: impl Into<String>) -> RmlResult<Self> {
        Ok(Self::new(TermMap::template(template)?))
    }

    /// Reference subject map generating IRIs
    pub fn reference(reference: impl Into<String>) -> Self {
        Self::new(TermMap::reference(reference))
    }

    /// Constant subject map
    pub fn constant(iri: impl Into<String>) -> Self {
        Self::new(TermMap::constant(iri))
    }

    /// Add a class
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Add a graph map
    pub fn with_graph_map(mut self, graph_map: TermMap) -> Self {
        self.graph_maps.push(graph_map);
        self
    }

    /// Generate blank nodes instead of IRIs
    pub fn blank_node(mut self) -> Self {
        self.term_map = self.term_map.blank_node();
        self
    }
}

/// One mapping rule: a logical source, a subject map and predicate-object maps
///
/// The logical source and subject map are optional only because rule graphs
/// are materialized externally and may be incomplete; execution rejects a
/// triples map missing either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriplesMap {
    /// TriplesMap identity (usually an IRI)
    pub iri: String,
    pub logical_source: Option<LogicalSource>,
    pub subject_map: Option<SubjectMap>,
    pub predicate_object_maps: Vec<PredicateObjectMap>,
}

impl TriplesMap {
    /// Create a TriplesMap over a logical source, with no subject map yet
    pub fn new(iri: impl Into<String>, logical_source: LogicalSource) -> Self {
        Self {
            iri: iri.into(),
            logical_source: Some(logical_source),
            subject_map: None,
            predicate_object_maps: Vec::new(),
        }
    }

    /// Set the subject map
    pub fn with_subject_map(mut self, subject_map: SubjectMap) -> Self {
        self.subject_map = Some(subject_map);
        self
    }

    /// Append a predicate-object map
    pub fn with_predicate_object_map(mut self, pom: PredicateObjectMap) -> Self {
        self.predicate_object_maps.push(pom);
        self
    }

    /// All referencing object maps across predicate-object maps
    pub fn ref_object_maps(&self) -> impl Iterator<Item = &RefObjectMap> {
        self.predicate_object_maps
            .iter()
            .flat_map(PredicateObjectMap::ref_object_maps)
    }
}
