//! Record provider boundary
//!
//! The engine never reads raw bytes itself. A [`RecordProvider`] turns a
//! [`LogicalSource`] into a lazy, forward-only sequence of [`Record`]s, and a
//! record answers reference expressions with ordered string values. The
//! reference syntax (column name, path query, result column) is opaque to the
//! engine and resolved entirely by the provider.
//!
//! New source formats are added by implementing these two traits; the
//! executor never changes.

mod memory;

pub use memory::{MemoryProvider, MemoryRecord};

use thiserror::Error;

use crate::mapping::LogicalSource;

/// A single record (row, node, result tuple) yielded by a provider
pub trait Record {
    /// Evaluate a reference expression against this record
    ///
    /// Returns the values in document order. An empty vector means the
    /// reference is absent or null for this record.
    fn get(&self, reference: &str) -> Vec<String>;
}

/// Lazy record sequence for one opened logical source
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<Box<dyn Record>, SourceError>> + 'a>;

/// Opens logical sources as record sequences
///
/// Opening the same source again restarts the sequence from the beginning;
/// the engine relies on this when a source is both iterated for its own
/// triples map and scanned as a join parent.
pub trait RecordProvider: Send + Sync {
    /// Open a logical source
    fn open_source(&self, source: &LogicalSource) -> Result<RecordIter<'_>, SourceError>;
}

/// Errors raised by record providers
#[derive(Debug, Error)]
pub enum SourceError {
    /// The logical source does not exist
    #[error("Source not found: {0}")]
    NotFound(String),

    /// The source exists but could not be read or decoded
    #[error("Read error: {0}")]
    Read(String),

    /// Underlying I/O failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
