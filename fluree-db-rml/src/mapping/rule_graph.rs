//! Rule graph: the ordered set of TriplesMaps to execute
//!
//! Provides declaration-ordered access, lookup by identity, and the parent
//! key layouts the join resolver indexes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{ObjectMap, TermMap, TermType, TriplesMap};
use crate::error::{RmlError, RmlResult};

/// Complete rule graph
///
/// Holds every TriplesMap in declaration order. The graph is read-only while
/// an execution runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<TriplesMap>", into = "Vec<TriplesMap>")]
pub struct RuleGraph {
    /// TriplesMap definitions in declaration order
    triples_maps: Vec<TriplesMap>,

    /// Index: TriplesMap IRI → position (first declaration wins)
    by_iri: HashMap<String, usize>,
}

impl RuleGraph {
    /// Create a rule graph from TriplesMap definitions in declaration order
    pub fn new(triples_maps: Vec<TriplesMap>) -> Self {
        let mut graph = Self::default();

        for tm in triples_maps {
            graph.add_triples_map(tm);
        }

        graph
    }

    /// Append a TriplesMap and update indexes
    pub fn add_triples_map(&mut self, tm: TriplesMap) {
        let position = self.triples_maps.len();

        self.by_iri.entry(tm.iri.clone()).or_insert(position);
        self.triples_maps.push(tm);
    }

    /// Get a TriplesMap by IRI
    pub fn get(&self, iri: &str) -> Option<&TriplesMap> {
        self.position(iri).map(|idx| &self.triples_maps[idx])
    }

    /// Declaration position of a TriplesMap
    pub fn position(&self, iri: &str) -> Option<usize> {
        self.by_iri.get(iri).copied()
    }

    /// TriplesMaps in declaration order
    pub fn triples_maps(&self) -> &[TriplesMap] {
        &self.triples_maps
    }

    /// Get the number of TriplesMap definitions
    pub fn len(&self) -> usize {
        self.triples_maps.len()
    }

    /// Check if the rule graph is empty
    pub fn is_empty(&self) -> bool {
        self.triples_maps.is_empty()
    }

    /// Distinct parent key layouts (ordered parent references) joined against a parent
    ///
    /// Layouts appear in first-use order across the whole graph, so a single
    /// pass over the parent's source can build every index it needs.
    pub fn parent_key_layouts(&self, parent_tm_iri: &str) -> Vec<Vec<String>> {
        let mut layouts: Vec<Vec<String>> = Vec::new();
        for rom in self
            .triples_maps
            .iter()
            .flat_map(TriplesMap::ref_object_maps)
            .filter(|rom| rom.parent_triples_map == parent_tm_iri)
        {
            let layout = rom.parent_key_layout();
            if !layouts.contains(&layout) {
                layouts.push(layout);
            }
        }
        layouts
    }

    /// Resolve an optional TriplesMap filter into declaration positions
    ///
    /// `None` selects every TriplesMap. Filter entries are kept in rule-graph
    /// declaration order regardless of the order they were given in.
    pub fn select(&self, filter: Option<&[String]>) -> RmlResult<Vec<usize>> {
        match filter {
            None => Ok((0..self.triples_maps.len()).collect()),
            Some(iris) => {
                let mut positions = Vec::with_capacity(iris.len());
                for iri in iris {
                    let idx = self
                        .position(iri)
                        .ok_or_else(|| RmlError::rule_graph(iri.as_str(), "unknown TriplesMap"))?;
                    positions.push(idx);
                }
                positions.sort_unstable();
                positions.dedup();
                Ok(positions)
            }
        }
    }

    /// Check the rule graph is complete enough to execute
    ///
    /// Rejects missing logical sources or subject maps, literal subjects,
    /// non-IRI predicate and graph maps, duplicate identities, and references
    /// to unknown parent TriplesMaps.
    pub fn validate(&self) -> RmlResult<()> {
        for (idx, tm) in self.triples_maps.iter().enumerate() {
            if self.by_iri.get(&tm.iri) != Some(&idx) {
                return Err(RmlError::rule_graph(&tm.iri, "duplicate TriplesMap identity"));
            }

            if tm.logical_source.is_none() {
                return Err(RmlError::rule_graph(&tm.iri, "missing logical source"));
            }

            let subject_map = tm
                .subject_map
                .as_ref()
                .ok_or_else(|| RmlError::rule_graph(&tm.iri, "missing subject map"))?;

            if subject_map.term_map.term_type == TermType::Literal {
                return Err(RmlError::rule_graph(
                    &tm.iri,
                    "subject map cannot generate literals",
                ));
            }
            check_iri_maps(&tm.iri, "graph map", &subject_map.graph_maps)?;

            for pom in &tm.predicate_object_maps {
                if pom.predicate_maps.is_empty() {
                    return Err(RmlError::rule_graph(
                        &tm.iri,
                        "predicate-object map without predicate map",
                    ));
                }
                check_iri_maps(&tm.iri, "predicate map", &pom.predicate_maps)?;
                check_iri_maps(&tm.iri, "graph map", &pom.graph_maps)?;

                for om in &pom.object_maps {
                    if let ObjectMap::RefObjectMap(rom) = om {
                        if self.get(&rom.parent_triples_map).is_none() {
                            return Err(RmlError::rule_graph(
                                &tm.iri,
                                format!("unknown parent TriplesMap {}", rom.parent_triples_map),
                            ));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn check_iri_maps(tm_iri: &str, what: &str, maps: &[TermMap]) -> RmlResult<()> {
    match maps.iter().find(|m| m.term_type != TermType::Iri) {
        Some(_) => Err(RmlError::rule_graph(
            tm_iri,
            format!("{} must generate IRIs", what),
        )),
        None => Ok(()),
    }
}

impl From<Vec<TriplesMap>> for RuleGraph {
    fn from(triples_maps: Vec<TriplesMap>) -> Self {
        RuleGraph::new(triples_maps)
    }
}

impl From<RuleGraph> for Vec<TriplesMap> {
    fn from(graph: RuleGraph) -> Self {
        graph.triples_maps
    }
}

impl FromIterator<TriplesMap> for RuleGraph {
    fn from_iter<T: IntoIterator<Item = TriplesMap>>(iter: T) -> Self {
        RuleGraph::new(iter.into_iter().collect())
    }
}
