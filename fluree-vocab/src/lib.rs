//! RDF and RML Vocabulary Constants
//!
//! This crate provides a centralized location for the vocabulary IRIs used by
//! the mapping engine.
//!
//! # Organization
//!
//! Constants are organized by vocabulary:
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `xsd` - XSD vocabulary (http://www.w3.org/2001/XMLSchema#)
//! - `rr` - R2RML vocabulary (http://www.w3.org/ns/r2rml#)

/// RDF vocabulary constants
pub mod rdf {
    /// RDF namespace
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    /// rdf:langString IRI
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

/// XSD vocabulary constants
pub mod xsd {
    /// XSD namespace
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";

    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// xsd:decimal IRI
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";

    /// xsd:double IRI
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// xsd:date IRI
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";

    /// xsd:dateTime IRI
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

    /// Check if a datatype IRI is xsd:string
    #[inline]
    pub fn is_string(datatype_iri: &str) -> bool {
        datatype_iri == STRING
    }
}

/// R2RML vocabulary constants (https://www.w3.org/TR/r2rml/)
pub mod rr {
    /// R2RML namespace
    pub const NS: &str = "http://www.w3.org/ns/r2rml#";

    /// rr:defaultGraph - graph map value denoting the default graph
    pub const DEFAULT_GRAPH: &str = "http://www.w3.org/ns/r2rml#defaultGraph";
}
