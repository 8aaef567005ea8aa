//! # PMS core
//!
//! The validation and derived-attribute model for patient records.
//!
//! This crate is pure: it performs no I/O, holds no shared state and exposes
//! two operations to its callers (the HTTP and storage layers):
//!
//! - [`validate_new`] — turn an untyped field mapping into a validated
//!   [`PatientRecord`], derived attributes included.
//! - [`validate_update`] — merge a partial update into an existing record and
//!   re-validate the result in full.
//!
//! Failures are [`ValidationFailure`]s carrying every violated constraint;
//! the caller maps them onto its own transport-level error representation.

#![warn(rust_2018_idioms)]

pub mod bmi;
mod error;
mod patient;
mod validation;

pub use bmi::Verdict;
pub use error::{ValidationFailure, Violation, ViolationKind};
pub use patient::{Address, Gender, PatientName, PatientRecord};
pub use validation::{validate_new, validate_update, RawFields};
