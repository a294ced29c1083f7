//! Quad collection
//!
//! [`QuadStore`] keeps quads in insertion order. Identity is the canonical
//! N-Quads rendering of the four terms, looked up in a hash set, so
//! [`QuadStore::add`] never scans the store.

use std::fmt;

use rustc_hash::FxHashSet;

use crate::materialize::RdfTerm;

/// A subject/predicate/object triple in a graph
///
/// `graph: None` is the default graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quad {
    pub subject: RdfTerm,
    pub predicate: RdfTerm,
    pub object: RdfTerm,
    pub graph: Option<RdfTerm>,
}

impl Quad {
    /// Create a quad
    pub fn new(
        subject: RdfTerm,
        predicate: RdfTerm,
        object: RdfTerm,
        graph: Option<RdfTerm>,
    ) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph,
        }
    }

    /// Create a quad in the default graph
    pub fn triple(subject: RdfTerm, predicate: RdfTerm, object: RdfTerm) -> Self {
        Self::new(subject, predicate, object, None)
    }

    /// Canonical N-Quads line (without trailing newline)
    pub fn canonical_key(&self) -> String {
        self.to_string()
    }

    fn sort_key(&self) -> (String, String, String, Option<String>) {
        (
            self.subject.to_canonical(),
            self.predicate.to_canonical(),
            self.object.to_canonical(),
            self.graph.as_ref().map(RdfTerm::to_canonical),
        )
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if let Some(graph) = &self.graph {
            write!(f, " {}", graph)?;
        }
        f.write_str(" .")
    }
}

/// Insertion-ordered collection of quads
#[derive(Debug, Clone, Default)]
pub struct QuadStore {
    quads: Vec<Quad>,
    keys: FxHashSet<String>,
    has_duplicates: bool,
}

impl QuadStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a quad unless a structurally equal one is present
    ///
    /// Returns `true` if the quad was inserted.
    pub fn add(&mut self, quad: Quad) -> bool {
        if self.keys.insert(quad.canonical_key()) {
            self.quads.push(quad);
            true
        } else {
            false
        }
    }

    /// Append a quad even if it is already present (bag semantics)
    pub fn push(&mut self, quad: Quad) {
        if !self.keys.insert(quad.canonical_key()) {
            self.has_duplicates = true;
        }
        self.quads.push(quad);
    }

    /// Drop every quad structurally equal to an earlier one
    ///
    /// Keeps first occurrences in insertion order. Idempotent.
    pub fn remove_duplicates(&mut self) {
        if !self.has_duplicates {
            return;
        }
        let mut seen = FxHashSet::default();
        self.quads.retain(|q| seen.insert(q.canonical_key()));
        self.has_duplicates = false;
    }

    /// Add every quad of `other` with [`add`](Self::add) semantics
    ///
    /// Returns the number of quads inserted.
    pub fn merge(&mut self, other: QuadStore) -> usize {
        let mut inserted = 0;
        for quad in other.quads {
            if self.add(quad) {
                inserted += 1;
            }
        }
        inserted
    }

    /// Append every quad of `other` with [`push`](Self::push) semantics
    pub fn extend(&mut self, other: QuadStore) {
        for quad in other.quads {
            self.push(quad);
        }
    }

    /// Check if a structurally equal quad is present
    pub fn contains(&self, quad: &Quad) -> bool {
        self.keys.contains(&quad.canonical_key())
    }

    /// Quads ordered by subject, predicate, object, then graph
    ///
    /// Terms compare by canonical form and the default graph sorts first,
    /// so the order is independent of insertion order.
    pub fn to_canonical_ordering(&self) -> Vec<&Quad> {
        let mut keyed: Vec<_> = self.quads.iter().map(|q| (q.sort_key(), q)).collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.into_iter().map(|(_, q)| q).collect()
    }

    /// Canonical ordering rendered as N-Quads, one line per quad
    pub fn to_sorted_string(&self) -> String {
        let mut out = String::new();
        for quad in self.to_canonical_ordering() {
            out.push_str(&quad.to_string());
            out.push('\n');
        }
        out
    }

    /// Number of quads (including duplicates kept by `push`)
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Iterate quads in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Quad> {
        self.quads.iter()
    }

    /// Get all quads (consuming the store)
    pub fn into_quads(self) -> Vec<Quad> {
        self.quads
    }
}

impl IntoIterator for QuadStore {
    type Item = Quad;
    type IntoIter = std::vec::IntoIter<Quad>;

    fn into_iter(self) -> Self::IntoIter {
        self.quads.into_iter()
    }
}

impl FromIterator<Quad> for QuadStore {
    fn from_iter<I: IntoIterator<Item = Quad>>(iter: I) -> Self {
        let mut store = QuadStore::new();
        for quad in iter {
            store.add(quad);
        }
        store
    }
}
