//! Patient record domain types.
//!
//! A [`PatientRecord`] can only be obtained through validation (see
//! [`crate::validate_new`] and [`crate::validate_update`]), so holding one is
//! proof that every constraint held at construction time and that the derived
//! attributes are consistent with the stored height and weight.
//!
//! The record carries no identifier: the id is owned by the caller and used as
//! the storage key, never validated or stored by this crate.

use crate::bmi::Verdict;
use pms_types::{BoundedText, NonEmptyText};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A patient name, at most 50 characters, stored uppercased.
pub type PatientName = BoundedText<50>;

/// Patient gender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Others,
}

impl Gender {
    /// Convert to the wire format string.
    pub fn to_wire(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Others => "others",
        }
    }

    /// Parse from the wire format string.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "others" => Some(Gender::Others),
            _ => None,
        }
    }
}

/// A postal address nested inside a patient record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub city: String,
    pub state: String,
    pub pin: String,
}

/// A fully validated patient record, derived attributes included.
///
/// Immutable by convention: updates go through [`crate::validate_update`],
/// which builds a fresh record from the merged fields rather than mutating in
/// place, so no partially-valid intermediate state is ever observable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Patient name, uppercased during validation.
    pub name: PatientName,
    /// City where the patient lives.
    pub city: NonEmptyText,
    /// Age in years, strictly between 0 and 120.
    pub age: u32,
    /// Patient gender.
    pub gender: Gender,
    /// Height in metres, strictly positive.
    pub height: f64,
    /// Weight in kilograms, strictly positive.
    pub weight: f64,
    /// Contact email, syntax-checked when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact details keyed by label. The key `emergency` is reserved and
    /// required for patients older than 60.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub contact_details: BTreeMap<String, String>,
    /// Known allergies, at most 5 entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<Vec<String>>,
    /// Postal address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    /// Body-mass index, derived from weight and height.
    pub bmi: f64,
    /// Categorical verdict derived from `bmi`.
    pub verdict: Verdict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_wire_round_trip() {
        for gender in [Gender::Male, Gender::Female, Gender::Others] {
            assert_eq!(Gender::from_wire(gender.to_wire()), Some(gender));
        }
        assert_eq!(Gender::from_wire("unknown"), None);
    }

    #[test]
    fn gender_serialises_lowercase() {
        let json = serde_json::to_string(&Gender::Others).expect("serialise");
        assert_eq!(json, "\"others\"");
    }
}
