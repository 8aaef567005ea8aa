//! PMS flat-file storage.
//!
//! This crate persists the patient snapshot as a single JSON document keyed by
//! patient id, matching the shape served by the REST API. The store works on
//! whole snapshots: `load` hands the caller the current state, the caller
//! mutates its copy, and `save` writes the replacement. There is no partial
//! write path and no locking; single-writer use is assumed.
//!
//! Records are stored without their id (the map key carries it), and with
//! derived attributes included, so a stored snapshot is directly servable.

mod store;

pub use store::{sorted_by, PatientStore, Snapshot, SortField, SortOrder};

/// Errors that can occur during snapshot storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading the snapshot file failed
    #[error("failed to read patient file: {0}")]
    FileRead(std::io::Error),

    /// Writing the snapshot file failed
    #[error("failed to write patient file: {0}")]
    FileWrite(std::io::Error),

    /// Serialising the snapshot failed
    #[error("failed to serialise snapshot: {0}")]
    Serialization(serde_json::Error),

    /// The snapshot file exists but does not parse as a snapshot
    #[error("failed to deserialise snapshot: {0}")]
    Deserialization(serde_json::Error),

    /// An unsupported sort field was requested
    #[error("invalid sort field '{0}', select from: height, weight, bmi")]
    InvalidSortField(String),

    /// An unsupported sort order was requested
    #[error("invalid sort order '{0}', select between asc and desc")]
    InvalidSortOrder(String),
}
