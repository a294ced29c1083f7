//! RML term map structures
//!
//! Term maps define how RDF terms are generated from records. Every term map
//! carries exactly one value source (constant, reference, template, or
//! function) plus a term type and optional literal metadata.

use serde::{Deserialize, Serialize};

use super::{RefObjectMap, Template};
use crate::error::RmlResult;

/// RML term type
///
/// Specifies whether a term map generates IRIs, blank nodes, or literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TermType {
    /// Generate an IRI (default for subject, predicate and graph maps)
    #[default]
    Iri,
    /// Generate a blank node
    BlankNode,
    /// Generate a literal
    Literal,
}

impl TermType {
    /// Check if this term type produces IRIs
    pub fn is_iri(&self) -> bool {
        matches!(self, TermType::Iri)
    }
}

/// The value source of a term map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TermMapValue {
    /// A fixed value, independent of the record
    Constant(String),
    /// A single reference expression evaluated against the record
    Reference(String),
    /// A template with embedded reference placeholders
    Template(Template),
    /// The output of a registered function
    Function(FunctionValue),
}

/// A term map: value source + term type + literal metadata
///
/// `datatype` and `language` are only consulted when `term_type` is
/// [`TermType::Literal`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermMap {
    pub value: TermMapValue,
    pub term_type: TermType,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl TermMap {
    fn with_value(value: TermMapValue) -> Self {
        Self {
            value,
            term_type: TermType::Iri,
            datatype: None,
            language: None,
        }
    }

    /// Constant term map (IRI unless changed)
    pub fn constant(value: impl Into<String>) -> Self {
        Self::with_value(TermMapValue::Constant(value.into()))
    }

    /// Reference term map (IRI unless changed)
    pub fn reference(reference: impl Into<String>) -> Self {
        Self::with_value(TermMapValue::Reference(reference.into()))
    }

    /// Template term map (IRI unless changed)
    ///
    /// Fails if the template string is malformed.
    pub fn template(template: impl Into<String>) -> RmlResult<Self> {
        Ok(Self::with_value(TermMapValue::Template(Template::parse(
            template,
        )?)))
    }

    /// Function term map (IRI unless changed)
    pub fn function(function: FunctionValue) -> Self {
        Self::with_value(TermMapValue::Function(function))
    }

    /// Set the term type
    pub fn with_term_type(mut self, term_type: TermType) -> Self {
        self.term_type = term_type;
        self
    }

    /// Generate literals
    pub fn literal(self) -> Self {
        self.with_term_type(TermType::Literal)
    }

    /// Generate blank nodes
    pub fn blank_node(self) -> Self {
        self.with_term_type(TermType::BlankNode)
    }

    /// Generate typed literals
    pub fn with_datatype(mut self, datatype: impl Into<String>) -> Self {
        self.term_type = TermType::Literal;
        self.datatype = Some(datatype.into());
        self
    }

    /// Generate language-tagged literals
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.term_type = TermType::Literal;
        self.language = Some(language.into());
        self
    }

}

/// A function invocation used as a term map value
///
/// Each parameter is itself a term map evaluated against the same record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionValue {
    /// Function identifier (usually an IRI)
    pub function: String,
    /// Parameter bindings in declaration order
    pub parameters: Vec<FunctionParameter>,
}

impl FunctionValue {
    /// Create a function value with no parameters
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            parameters: Vec::new(),
        }
    }

    /// Add a required parameter
    pub fn with_parameter(mut self, name: impl Into<String>, value: TermMap) -> Self {
        self.parameters.push(FunctionParameter::new(name, value));
        self
    }

    /// Add an optional parameter
    pub fn with_optional_parameter(mut self, name: impl Into<String>, value: TermMap) -> Self {
        self.parameters
            .push(FunctionParameter::new(name, value).optional());
        self
    }
}

/// One named function parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionParameter {
    /// Parameter name (usually an IRI)
    pub name: String,
    /// Term map producing the parameter's values
    pub value: TermMap,
    /// Whether an empty binding prevents invocation
    pub required: bool,
}

impl FunctionParameter {
    /// Create a required parameter
    pub fn new(name: impl Into<String>, value: TermMap) -> Self {
        Self {
            name: name.into(),
            value,
            required: true,
        }
    }

    /// Mark the parameter as optional
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Predicate-object map
///
/// Every predicate map is paired with every object map (cross-product
/// semantics). Graph maps add to the subject map's graphs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredicateObjectMap {
    pub predicate_maps: Vec<TermMap>,
    pub object_maps: Vec<ObjectMap>,
    pub graph_maps: Vec<TermMap>,
}

impl PredicateObjectMap {
    /// Create a predicate-object map with one predicate map and one object map
    pub fn new(predicate_map: TermMap, object_map: ObjectMap) -> Self {
        Self {
            predicate_maps: vec![predicate_map],
            object_maps: vec![object_map],
            graph_maps: Vec::new(),
        }
    }

    /// Shortcut for a constant predicate IRI
    pub fn predicate(predicate: impl Into<String>, object_map: ObjectMap) -> Self {
        Self::new(TermMap::constant(predicate), object_map)
    }

    /// Add another predicate map
    pub fn with_predicate_map(mut self, predicate_map: TermMap) -> Self {
        self.predicate_maps.push(predicate_map);
        self
    }

    /// Add another object map
    pub fn with_object_map(mut self, object_map: ObjectMap) -> Self {
        self.object_maps.push(object_map);
        self
    }

    /// Add a graph map
    pub fn with_graph_map(mut self, graph_map: TermMap) -> Self {
        self.graph_maps.push(graph_map);
        self
    }

    /// Referencing object maps in this predicate-object map
    pub fn ref_object_maps(&self) -> impl Iterator<Item = &RefObjectMap> {
        self.object_maps.iter().filter_map(ObjectMap::as_ref_object_map)
    }
}

/// Object map
///
/// Either a plain term map or a reference to another triples map's subjects
/// correlated through a join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ObjectMap {
    /// Object generated from the current record
    Term(TermMap),
    /// Object taken from the subjects of a parent triples map
    RefObjectMap(RefObjectMap),
}

impl ObjectMap {
    /// Reference object map producing literals
    pub fn reference(reference: impl Into<String>) -> Self {
        ObjectMap::Term(TermMap::reference(reference).literal())
    }

    /// Reference object map producing typed literals
    pub fn reference_typed(reference: impl Into<String>, datatype: impl Into<String>) -> Self {
        ObjectMap::Term(TermMap::reference(reference).with_datatype(datatype))
    }

    /// Reference object map producing IRIs
    pub fn reference_iri(reference: impl Into<String>) -> Self {
        ObjectMap::Term(TermMap::reference(reference))
    }

    /// Constant IRI object map
    pub fn constant_iri(iri: impl Into<String>) -> Self {
        ObjectMap::Term(TermMap::constant(iri))
    }

    /// Constant literal object map
    pub fn constant_literal(value: impl Into<String>) -> Self {
        ObjectMap::Term(TermMap::constant(value).literal())
    }

    /// Template object map producing IRIs
    pub fn template(template: impl Into<String>) -> RmlResult<Self> {
        Ok(ObjectMap::Term(TermMap::template(template)?))
    }

    /// Function object map producing literals
    pub fn function(function: FunctionValue) -> Self {
        ObjectMap::Term(TermMap::function(function).literal())
    }

    /// Referencing object map
    pub fn parent(ref_object_map: RefObjectMap) -> Self {
        ObjectMap::RefObjectMap(ref_object_map)
    }

    /// Get the RefObjectMap if this is a reference
    pub fn as_ref_object_map(&self) -> Option<&RefObjectMap> {
        match self {
            ObjectMap::RefObjectMap(ref_map) => Some(ref_map),
            ObjectMap::Term(_) => None,
        }
    }
}

impl From<TermMap> for ObjectMap {
    fn from(term_map: TermMap) -> Self {
        ObjectMap::Term(term_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_map_defaults() {
        let tm = TermMap::reference("name");
        assert_eq!(tm.term_type, TermType::Iri);
        assert_eq!(tm.value, TermMapValue::Reference("name".into()));

        let tm = TermMap::constant("http://ex.org/p").blank_node();
        assert_eq!(tm.term_type, TermType::BlankNode);
        assert_eq!(tm.value, TermMapValue::Constant("http://ex.org/p".into()));
    }

    #[test]
    fn test_literal_metadata_implies_literal() {
        let tm =
            TermMap::reference("age").with_datatype("http://www.w3.org/2001/XMLSchema#integer");
        assert_eq!(tm.term_type, TermType::Literal);

        let tm = TermMap::reference("label").with_language("en");
        assert_eq!(tm.term_type, TermType::Literal);
        assert_eq!(tm.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_function_parameters() {
        let f = FunctionValue::new("http://ex.org/fn/concat")
            .with_parameter("a", TermMap::reference("first").literal())
            .with_optional_parameter("b", TermMap::template("{x}-{y}").unwrap().literal());
        let tm = TermMap::function(f);
        assert_eq!(tm.term_type, TermType::Iri);

        if let TermMapValue::Function(f) = &tm.value {
            assert!(f.parameters[0].required);
            assert!(!f.parameters[1].required);
        } else {
            panic!("expected function value");
        }
    }

    #[test]
    fn test_object_map_constructors() {
        let om = ObjectMap::reference("name");
        assert!(om.as_ref_object_map().is_none());
        assert!(matches!(om, ObjectMap::Term(ref tm) if tm.term_type == TermType::Literal));

        let om = ObjectMap::template("http://ex.org/{id}").unwrap();
        assert!(matches!(om, ObjectMap::Term(ref tm) if tm.term_type == TermType::Iri));

        let om = ObjectMap::parent(RefObjectMap::new("<#Parent>", "pid", "id"));
        assert_eq!(
            om.as_ref_object_map().map(|rom| rom.parent_triples_map.as_str()),
            Some("<#Parent>")
        );
    }

    #[test]
    fn test_pom_cross_product_shape() {
        let pom = PredicateObjectMap::predicate("http://ex.org/p", ObjectMap::reference("a"))
            .with_predicate_map(TermMap::constant("http://ex.org/q"))
            .with_object_map(ObjectMap::parent(RefObjectMap::without_conditions("<#P>")));
        assert_eq!(pom.predicate_maps.len(), 2);
        assert_eq!(pom.object_maps.len(), 2);
        assert_eq!(pom.ref_object_maps().count(), 1);
    }
}
