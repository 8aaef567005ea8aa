//! Snapshot store implementation.

use crate::StoreError;
use pms_core::PatientRecord;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The full patient snapshot: record keyed by patient id.
pub type Snapshot = BTreeMap<String, PatientRecord>;

/// File-backed store for the patient snapshot.
///
/// The store is bound to one file path at construction. A missing file reads
/// as an empty snapshot, so first use needs no setup step.
#[derive(Debug, Clone)]
pub struct PatientStore {
    path: PathBuf,
}

impl PatientStore {
    /// Creates a store bound to the given snapshot file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot file path this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the current snapshot.
    ///
    /// A missing file yields an empty snapshot. Records are re-validated on
    /// the way in by their serde implementations, so a hand-edited file with
    /// out-of-bound text fields is rejected as a deserialisation error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::FileRead` or `StoreError::Deserialization`.
    pub fn load(&self) -> Result<Snapshot, StoreError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "snapshot file absent, starting empty");
            return Ok(Snapshot::new());
        }
        let contents = std::fs::read_to_string(&self.path).map_err(StoreError::FileRead)?;
        serde_json::from_str(&contents).map_err(StoreError::Deserialization)
    }

    /// Writes a replacement snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` or `StoreError::FileWrite`.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let contents =
            serde_json::to_string_pretty(snapshot).map_err(StoreError::Serialization)?;
        std::fs::write(&self.path, contents).map_err(StoreError::FileWrite)?;
        tracing::debug!(
            path = %self.path.display(),
            patients = snapshot.len(),
            "snapshot saved"
        );
        Ok(())
    }
}

/// A field the snapshot can be sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Height,
    Weight,
    Bmi,
}

impl SortField {
    fn key(self, record: &PatientRecord) -> f64 {
        match self {
            SortField::Height => record.height,
            SortField::Weight => record.weight,
            SortField::Bmi => record.bmi,
        }
    }
}

impl FromStr for SortField {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "height" => Ok(SortField::Height),
            "weight" => Ok(SortField::Weight),
            "bmi" => Ok(SortField::Bmi),
            other => Err(StoreError::InvalidSortField(other.to_owned())),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(StoreError::InvalidSortOrder(other.to_owned())),
        }
    }
}

/// Returns the snapshot's records sorted by the given field.
///
/// Ids are not part of the result; like a stored record, a sorted listing is
/// record-shaped only.
pub fn sorted_by(snapshot: &Snapshot, field: SortField, order: SortOrder) -> Vec<PatientRecord> {
    let mut records: Vec<PatientRecord> = snapshot.values().cloned().collect();
    records.sort_by(|a, b| {
        let ordering = field.key(a).total_cmp(&field.key(b));
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    records
}
