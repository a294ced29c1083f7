//! RML RefObjectMap structures
//!
//! RefObjectMaps define references between TriplesMap definitions,
//! enabling joins across logical sources.

use serde::{Deserialize, Serialize};

/// Reference to another TriplesMap with join conditions
///
/// A RefObjectMap allows one TriplesMap to reference subjects generated
/// by another TriplesMap, creating relationships between entities from
/// different sources.
///
/// # Example RML
///
/// ```turtle
/// <#RouteMapping> a rr:TriplesMap ;
///     rr:predicateObjectMap [
///         rr:predicate ex:airline ;
///         rr:objectMap [
///             rr:parentTriplesMap <#AirlineMapping> ;
///             rr:joinCondition [
///                 rr:child "airline_id" ;
///                 rr:parent "id"
///             ]
///         ]
///     ] .
/// ```
///
/// For each route record, the objects are the subjects of every airline
/// record whose `id` values equal the route's `airline_id` values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefObjectMap {
    /// Identity of the parent TriplesMap
    pub parent_triples_map: String,
    /// Join conditions, compared tuple-wise in order
    pub join_conditions: Vec<JoinCondition>,
}

impl RefObjectMap {
    /// Create a new RefObjectMap with a single join condition
    pub fn new(
        parent_triples_map: impl Into<String>,
        child_reference: impl Into<String>,
        parent_reference: impl Into<String>,
    ) -> Self {
        Self {
            parent_triples_map: parent_triples_map.into(),
            join_conditions: vec![JoinCondition::new(child_reference, parent_reference)],
        }
    }

    /// Create a RefObjectMap with multiple join conditions (composite key)
    pub fn with_conditions(
        parent_triples_map: impl Into<String>,
        conditions: Vec<JoinCondition>,
    ) -> Self {
        Self {
            parent_triples_map: parent_triples_map.into(),
            join_conditions: conditions,
        }
    }

    /// Create a RefObjectMap without join conditions
    pub fn without_conditions(parent_triples_map: impl Into<String>) -> Self {
        Self::with_conditions(parent_triples_map, Vec::new())
    }

    /// Get all child references used in join conditions
    pub fn child_references(&self) -> Vec<&str> {
        self.join_conditions
            .iter()
            .map(|jc| jc.child.as_str())
            .collect()
    }

    /// Parent references as owned strings (join index layout key)
    pub fn parent_key_layout(&self) -> Vec<String> {
        self.join_conditions
            .iter()
            .map(|jc| jc.parent.clone())
            .collect()
    }

    /// Check if this RefObjectMap has any join conditions
    pub fn has_conditions(&self) -> bool {
        !self.join_conditions.is_empty()
    }
}

/// A single join condition
///
/// The values the child reference yields on the child record must equal the
/// values the parent reference yields on the parent record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinCondition {
    /// Reference evaluated on the current (child) TriplesMap's records
    pub child: String,
    /// Reference evaluated on the parent TriplesMap's records
    pub parent: String,
}

impl JoinCondition {
    /// Create a new join condition
    pub fn new(child: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            child: child.into(),
            parent: parent.into(),
        }
    }
}
