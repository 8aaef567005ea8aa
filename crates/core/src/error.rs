//! Validation failure taxonomy.
//!
//! Validation never short-circuits: a failed validation carries every violated
//! constraint so callers can report all offending fields in one pass.

use serde::Serialize;

/// The kind of constraint a field violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    /// A required field was absent (or explicitly null).
    MissingField,
    /// The raw value had the wrong JSON type for the field.
    WrongType,
    /// A numeric value fell outside the permitted range.
    OutOfRange,
    /// A text or list value exceeded its maximum length.
    LengthExceeded,
    /// A text value was empty or whitespace-only where content is required.
    EmptyValue,
    /// The value is not a member of the field's enumeration.
    BadEnumValue,
    /// The value does not match the field's required format.
    BadFormat,
    /// A constraint spanning more than one field was violated.
    CrossField,
}

/// A single violated constraint, identifying the offending field and a
/// human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// The offending field, dotted for nested fields (e.g. `address.pin`).
    pub field: String,
    /// The kind of constraint violated.
    pub kind: ViolationKind,
    /// Human-readable reason suitable for returning to an end user.
    pub message: String,
}

/// A failed validation, carrying every violated constraint.
///
/// All validation failures are recoverable by the caller; none are fatal to
/// the process.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("validation failed: {}", fmt_violations(.violations))]
pub struct ValidationFailure {
    /// Every violated constraint, in field-evaluation order.
    pub violations: Vec<Violation>,
}

impl ValidationFailure {
    /// Returns true if any violation names the given field.
    pub fn mentions(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn fmt_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_all_violations() {
        let failure = ValidationFailure {
            violations: vec![
                Violation {
                    field: "age".into(),
                    kind: ViolationKind::OutOfRange,
                    message: "age must be strictly between 0 and 120".into(),
                },
                Violation {
                    field: "gender".into(),
                    kind: ViolationKind::BadEnumValue,
                    message: "gender must be one of: male, female, others".into(),
                },
            ],
        };

        let rendered = failure.to_string();
        assert!(rendered.contains("age: age must be strictly between 0 and 120"));
        assert!(rendered.contains("gender: gender must be one of"));
    }

    #[test]
    fn kind_serialises_as_kebab_case() {
        let json = serde_json::to_string(&ViolationKind::CrossField).expect("serialise");
        assert_eq!(json, "\"cross-field\"");
    }
}
