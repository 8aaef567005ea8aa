//! Record validation.
//!
//! Turns untyped field mappings into fully validated [`PatientRecord`]s.
//! Validation is all-or-nothing and never short-circuits: every field is
//! evaluated and every violated constraint is reported, so callers get
//! complete diagnostics in one pass. The cross-field rule runs only once all
//! per-field rules have passed, since it depends on already-validated values.
//!
//! Normalisation (uppercasing the name) happens only after the raw value has
//! passed its checks; the normalised value is what ends up in the record.

use crate::bmi;
use crate::error::{ValidationFailure, Violation, ViolationKind};
use crate::patient::{Address, Gender, PatientName, PatientRecord};
use pms_types::NonEmptyText;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Untyped field mapping, as handed over by the transport layer.
pub type RawFields = Map<String, Value>;

/// Maximum number of allergy entries.
const MAX_ALLERGIES: usize = 5;

/// Age above which an emergency contact becomes mandatory.
const EMERGENCY_CONTACT_AGE: u32 = 60;

/// Validates raw fields into a new [`PatientRecord`].
///
/// All per-field constraints are evaluated and their failures aggregated.
/// The cross-field emergency-contact rule is evaluated only if every
/// per-field rule passed. On success the returned record carries freshly
/// computed derived attributes.
///
/// # Errors
///
/// Returns a [`ValidationFailure`] enumerating every violated constraint.
pub fn validate_new(raw: &RawFields) -> Result<PatientRecord, ValidationFailure> {
    let mut out = Violations::default();

    let name = require_str(raw, "name", &mut out).and_then(|s| check_name(s, &mut out));
    let city = require_str(raw, "city", &mut out).and_then(|s| check_city(s, &mut out));
    let age = require_int(raw, "age", &mut out).and_then(|n| check_age(n, &mut out));
    let gender = require_str(raw, "gender", &mut out).and_then(|s| check_gender(s, &mut out));
    let height = require_float(raw, "height", &mut out)
        .and_then(|v| check_positive(v, "height", &mut out));
    let weight = require_float(raw, "weight", &mut out)
        .and_then(|v| check_positive(v, "weight", &mut out));
    let email = check_email(raw, &mut out);
    let contact_details = check_contact_details(raw, &mut out);
    let allergies = check_allergies(raw, &mut out);
    let address = check_address(raw, &mut out);

    // Cross-field rule, evaluated only after all per-field rules pass.
    if out.is_empty() {
        if let Some(age) = age {
            if age > EMERGENCY_CONTACT_AGE && !contact_details.contains_key("emergency") {
                out.push(
                    "contact_details",
                    ViolationKind::CrossField,
                    format!(
                        "patients older than {} must have an emergency contact",
                        EMERGENCY_CONTACT_AGE
                    ),
                );
            }
        }
    }

    match (name, city, age, gender, height, weight) {
        (Some(name), Some(city), Some(age), Some(gender), Some(height), Some(weight))
            if out.is_empty() =>
        {
            let bmi_value = bmi::bmi(weight, height);
            Ok(PatientRecord {
                name,
                city,
                age,
                gender,
                height,
                weight,
                email,
                contact_details,
                allergies,
                address,
                bmi: bmi_value,
                verdict: bmi::verdict(bmi_value),
            })
        }
        _ => {
            let failure = out.into_failure();
            tracing::debug!(violations = failure.violations.len(), "patient validation failed");
            Err(failure)
        }
    }
}

/// Validates a partial update against an existing record.
///
/// Fields present in `raw_update` replace the corresponding fields of
/// `existing`; absent fields are left unchanged; an explicit `null` clears an
/// optional field. The merged result is re-validated in full (per-field
/// rules, cross-field rule, derived-attribute recompute), so a record that
/// was valid before the update is re-verified valid after it. Unknown keys in
/// the update (including `id`) are ignored.
///
/// # Errors
///
/// Returns a [`ValidationFailure`] enumerating every constraint the merged
/// record violates.
pub fn validate_update(
    existing: &PatientRecord,
    raw_update: &RawFields,
) -> Result<PatientRecord, ValidationFailure> {
    let mut merged = record_to_raw(existing);

    for (field, value) in raw_update {
        if value.is_null() {
            merged.remove(field);
        } else {
            merged.insert(field.clone(), value.clone());
        }
    }

    validate_new(&merged)
}

/// Rebuilds the raw field mapping for an existing record.
///
/// Derived attributes are deliberately left out: they are recomputed from the
/// merged fields, never carried over.
fn record_to_raw(record: &PatientRecord) -> RawFields {
    let mut raw = RawFields::new();
    raw.insert("name".into(), Value::String(record.name.as_str().to_owned()));
    raw.insert("city".into(), Value::String(record.city.as_str().to_owned()));
    raw.insert("age".into(), Value::from(record.age));
    raw.insert("gender".into(), Value::String(record.gender.to_wire().to_owned()));
    raw.insert("height".into(), Value::from(record.height));
    raw.insert("weight".into(), Value::from(record.weight));
    if let Some(email) = &record.email {
        raw.insert("email".into(), Value::String(email.clone()));
    }
    if !record.contact_details.is_empty() {
        let details: Map<String, Value> = record
            .contact_details
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        raw.insert("contact_details".into(), Value::Object(details));
    }
    if let Some(allergies) = &record.allergies {
        let items = allergies.iter().cloned().map(Value::String).collect();
        raw.insert("allergies".into(), Value::Array(items));
    }
    if let Some(address) = &record.address {
        let mut nested = Map::new();
        nested.insert("city".into(), Value::String(address.city.clone()));
        nested.insert("state".into(), Value::String(address.state.clone()));
        nested.insert("pin".into(), Value::String(address.pin.clone()));
        raw.insert("address".into(), Value::Object(nested));
    }
    raw
}

/// Aggregates violations during a validation pass.
#[derive(Default)]
struct Violations(Vec<Violation>);

impl Violations {
    fn push(&mut self, field: impl Into<String>, kind: ViolationKind, message: impl Into<String>) {
        self.0.push(Violation {
            field: field.into(),
            kind,
            message: message.into(),
        });
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_failure(self) -> ValidationFailure {
        ValidationFailure { violations: self.0 }
    }
}

fn require_str<'a>(raw: &'a RawFields, field: &str, out: &mut Violations) -> Option<&'a str> {
    match raw.get(field) {
        None | Some(Value::Null) => {
            out.push(field, ViolationKind::MissingField, format!("{field} is required"));
            None
        }
        Some(Value::String(s)) => Some(s),
        Some(_) => {
            out.push(field, ViolationKind::WrongType, format!("{field} must be a string"));
            None
        }
    }
}

fn require_int(raw: &RawFields, field: &str, out: &mut Violations) -> Option<i64> {
    match raw.get(field) {
        None | Some(Value::Null) => {
            out.push(field, ViolationKind::MissingField, format!("{field} is required"));
            None
        }
        Some(Value::Number(n)) if n.as_i64().is_some() => n.as_i64(),
        Some(_) => {
            out.push(field, ViolationKind::WrongType, format!("{field} must be an integer"));
            None
        }
    }
}

fn require_float(raw: &RawFields, field: &str, out: &mut Violations) -> Option<f64> {
    match raw.get(field) {
        None | Some(Value::Null) => {
            out.push(field, ViolationKind::MissingField, format!("{field} is required"));
            None
        }
        Some(Value::Number(n)) if n.as_f64().is_some() => n.as_f64(),
        Some(_) => {
            out.push(field, ViolationKind::WrongType, format!("{field} must be a number"));
            None
        }
    }
}

fn check_name(raw_name: &str, out: &mut Violations) -> Option<PatientName> {
    let len = raw_name.chars().count();
    if len > PatientName::max_len() {
        out.push(
            "name",
            ViolationKind::LengthExceeded,
            format!(
                "name exceeds maximum length of {} characters (got {len})",
                PatientName::max_len()
            ),
        );
        return None;
    }

    // Normalised only after the raw value passes its checks. Uppercasing can
    // lengthen some scripts, so the bound is re-checked on the result.
    match PatientName::new(raw_name.to_uppercase()) {
        Ok(name) => Some(name),
        Err(_) => {
            out.push(
                "name",
                ViolationKind::LengthExceeded,
                format!(
                    "name exceeds maximum length of {} characters after normalisation",
                    PatientName::max_len()
                ),
            );
            None
        }
    }
}

fn check_city(raw_city: &str, out: &mut Violations) -> Option<NonEmptyText> {
    match NonEmptyText::new(raw_city) {
        Ok(city) => Some(city),
        Err(_) => {
            out.push("city", ViolationKind::EmptyValue, "city cannot be empty");
            None
        }
    }
}

fn check_age(raw_age: i64, out: &mut Violations) -> Option<u32> {
    if raw_age > 0 && raw_age < 120 {
        Some(raw_age as u32)
    } else {
        out.push(
            "age",
            ViolationKind::OutOfRange,
            "age must be strictly between 0 and 120",
        );
        None
    }
}

fn check_gender(raw_gender: &str, out: &mut Violations) -> Option<Gender> {
    match Gender::from_wire(raw_gender) {
        Some(gender) => Some(gender),
        None => {
            out.push(
                "gender",
                ViolationKind::BadEnumValue,
                "gender must be one of: male, female, others",
            );
            None
        }
    }
}

fn check_positive(value: f64, field: &str, out: &mut Violations) -> Option<f64> {
    if value > 0.0 {
        Some(value)
    } else {
        out.push(
            field,
            ViolationKind::OutOfRange,
            format!("{field} must be strictly positive"),
        );
        None
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern"))
}

fn check_email(raw: &RawFields, out: &mut Violations) -> Option<String> {
    match raw.get("email") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => {
            if email_regex().is_match(s) {
                Some(s.clone())
            } else {
                out.push(
                    "email",
                    ViolationKind::BadFormat,
                    "email is not a valid email address",
                );
                None
            }
        }
        Some(_) => {
            out.push("email", ViolationKind::WrongType, "email must be a string");
            None
        }
    }
}

fn check_contact_details(raw: &RawFields, out: &mut Violations) -> BTreeMap<String, String> {
    match raw.get("contact_details") {
        None | Some(Value::Null) => BTreeMap::new(),
        Some(Value::Object(map)) => {
            let mut details = BTreeMap::new();
            for (key, value) in map {
                match value {
                    Value::String(s) => {
                        details.insert(key.clone(), s.clone());
                    }
                    _ => out.push(
                        format!("contact_details.{key}"),
                        ViolationKind::WrongType,
                        "contact detail values must be strings",
                    ),
                }
            }
            details
        }
        Some(_) => {
            out.push(
                "contact_details",
                ViolationKind::WrongType,
                "contact_details must be a mapping of strings to strings",
            );
            BTreeMap::new()
        }
    }
}

fn check_allergies(raw: &RawFields, out: &mut Violations) -> Option<Vec<String>> {
    match raw.get("allergies") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => {
            if items.len() > MAX_ALLERGIES {
                out.push(
                    "allergies",
                    ViolationKind::LengthExceeded,
                    format!(
                        "allergies exceeds maximum length of {} entries (got {})",
                        MAX_ALLERGIES,
                        items.len()
                    ),
                );
                return None;
            }
            let mut allergies = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => allergies.push(s.clone()),
                    _ => {
                        out.push(
                            "allergies",
                            ViolationKind::WrongType,
                            "allergies entries must be strings",
                        );
                        return None;
                    }
                }
            }
            Some(allergies)
        }
        Some(_) => {
            out.push(
                "allergies",
                ViolationKind::WrongType,
                "allergies must be an array of strings",
            );
            None
        }
    }
}

fn check_address(raw: &RawFields, out: &mut Violations) -> Option<Address> {
    match raw.get("address") {
        None | Some(Value::Null) => None,
        Some(Value::Object(nested)) => {
            let city = require_nested_str(nested, "city", out);
            let state = require_nested_str(nested, "state", out);
            let pin = require_nested_str(nested, "pin", out);
            match (city, state, pin) {
                (Some(city), Some(state), Some(pin)) => Some(Address { city, state, pin }),
                _ => None,
            }
        }
        Some(_) => {
            out.push(
                "address",
                ViolationKind::WrongType,
                "address must be an object with city, state and pin",
            );
            None
        }
    }
}

fn require_nested_str(
    nested: &Map<String, Value>,
    field: &str,
    out: &mut Violations,
) -> Option<String> {
    let dotted = format!("address.{field}");
    match nested.get(field) {
        None | Some(Value::Null) => {
            out.push(dotted, ViolationKind::MissingField, format!("address.{field} is required"));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            out.push(dotted, ViolationKind::WrongType, format!("address.{field} must be a string"));
            None
        }
    }
}
