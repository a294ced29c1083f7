//! Execution report
//!
//! Collected alongside the quad store by
//! [`Executor::execute_with_report`](crate::executor::Executor::execute_with_report).

use crate::error::RmlError;

/// Outcome of one triples map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriplesMapStatus {
    /// All records were processed and the quads kept
    Completed,
    /// The triples map was abandoned and its quads discarded
    Skipped,
}

/// Counters for one triples map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriplesMapStats {
    pub triples_map: String,
    /// Records read from the logical source
    pub records: usize,
    /// Records that produced no subject or whose subject generation failed
    pub skipped_records: usize,
    /// Quads emitted before deduplication
    pub quads: usize,
    pub status: TriplesMapStatus,
}

impl TriplesMapStats {
    pub(crate) fn new(triples_map: impl Into<String>) -> Self {
        Self {
            triples_map: triples_map.into(),
            records: 0,
            skipped_records: 0,
            quads: 0,
            status: TriplesMapStatus::Completed,
        }
    }
}

/// A recoverable error observed during execution
#[derive(Debug)]
pub struct Diagnostic {
    pub triples_map: String,
    /// Zero-based record position, if the error is tied to a record
    pub record: Option<usize>,
    pub error: RmlError,
}

impl Diagnostic {
    pub(crate) fn new(
        triples_map: impl Into<String>,
        record: Option<usize>,
        error: RmlError,
    ) -> Self {
        Self {
            triples_map: triples_map.into(),
            record,
            error,
        }
    }
}

/// Per-run statistics and diagnostics
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// One entry per executed triples map, in execution order
    pub triples_maps: Vec<TriplesMapStats>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ExecutionReport {
    /// Stats for a triples map
    pub fn stats(&self, triples_map: &str) -> Option<&TriplesMapStats> {
        self.triples_maps.iter().find(|s| s.triples_map == triples_map)
    }

    /// Triples maps that were skipped
    pub fn skipped_triples_maps(&self) -> impl Iterator<Item = &str> {
        self.triples_maps
            .iter()
            .filter(|s| s.status == TriplesMapStatus::Skipped)
            .map(|s| s.triples_map.as_str())
    }

    /// Total quads emitted before deduplication
    pub fn emitted_quads(&self) -> usize {
        self.triples_maps.iter().map(|s| s.quads).sum()
    }

    /// Check if no diagnostics were recorded
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_queries() {
        let mut done = TriplesMapStats::new("ex:A");
        done.quads = 3;
        let mut skipped = TriplesMapStats::new("ex:B");
        skipped.quads = 2;
        skipped.status = TriplesMapStatus::Skipped;

        let report = ExecutionReport {
            triples_maps: vec![done, skipped],
            diagnostics: vec![Diagnostic::new("ex:B", Some(1), RmlError::Cancelled)],
        };

        assert_eq!(report.stats("ex:A").map(|s| s.quads), Some(3));
        assert!(report.stats("ex:C").is_none());
        assert_eq!(report.skipped_triples_maps().collect::<Vec<_>>(), vec!["ex:B"]);
        assert_eq!(report.emitted_quads(), 5);
        assert!(!report.is_clean());
    }
}
