//! Declarative validation for registration drafts
//!
//! Every field has one rule function in [`rules`]. Rules receive the whole
//! draft, so a dependent field (the government ID) always sees the current
//! value of the field it depends on. A field reports at most one error: the
//! first check it fails.

pub mod rules;

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::record::{Draft, Field, RegistrationRecord};

/// Error code for a missing required value.
pub const ERROR_CODE_REQUIRED: &str = "required";
/// Error code for a value below its minimum length.
pub const ERROR_CODE_TOO_SHORT: &str = "too_short";
/// Error code for a value with the wrong shape.
pub const ERROR_CODE_INVALID_FORMAT: &str = "invalid_format";
/// Error code for a value outside its allowed set.
pub const ERROR_CODE_NOT_ONE_OF: &str = "not_one_of";
/// Error code for an age that is not a positive whole number.
pub const ERROR_CODE_NOT_POSITIVE_INTEGER: &str = "not_positive_integer";

/// A single field's validation failure
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    /// Stable identifier for programmatic handling.
    pub code: &'static str,
    /// Helper text shown next to the field.
    pub message: String,
}

impl FieldError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn required(message: impl Into<String>) -> Self {
        Self::new(ERROR_CODE_REQUIRED, message)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Field errors keyed by field, in declaration order
#[derive(Error, Clone, Debug, Default, PartialEq, Eq)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct ValidationErrors {
    errors: BTreeMap<Field, FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the first error for `field`; later errors for the same field are ignored.
    pub fn insert(&mut self, field: Field, error: FieldError) {
        self.errors.entry(field).or_insert(error);
    }

    /// Keep the value of a successful rule, or record its error.
    pub fn capture<T>(&mut self, field: Field, outcome: Result<T, FieldError>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(error) => {
                self.insert(field, error);
                None
            }
        }
    }

    pub fn get(&self, field: Field) -> Option<&FieldError> {
        self.errors.get(&field)
    }

    pub fn message(&self, field: Field) -> Option<&str> {
        self.get(field).map(|error| error.message.as_str())
    }

    pub fn contains(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn remove(&mut self, field: Field) -> Option<FieldError> {
        self.errors.remove(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.errors.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldError)> {
        self.errors.iter().map(|(field, error)| (*field, error))
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Fold another set of errors into this one.
    pub fn extend(&mut self, other: ValidationErrors) {
        for (field, error) in other.errors {
            self.insert(field, error);
        }
    }
}

/// Validate the whole draft, producing the typed record when every rule passes.
pub fn validate(draft: &Draft) -> Result<RegistrationRecord, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = errors.capture(Field::Name, rules::name(draft));
    let dob = errors.capture(Field::Dob, rules::dob(draft));
    let sex = errors.capture(Field::Sex, rules::sex(draft));
    let mobile = errors.capture(Field::Mobile, rules::mobile(draft));
    let gov_id_type = errors.capture(Field::GovIdType, rules::gov_id_type(draft));
    let gov_id = errors.capture(Field::GovId, rules::gov_id(draft));
    let pin_code = errors.capture(Field::PinCode, rules::pin_code(draft));

    match (name, dob, sex, mobile, gov_id_type, gov_id, pin_code) {
        (
            Some(name),
            Some(dob),
            Some(sex),
            Some(mobile),
            Some(gov_id_type),
            Some(gov_id),
            Some(pin_code),
        ) if errors.is_empty() => Ok(RegistrationRecord {
            name,
            dob,
            sex,
            mobile,
            gov_id_type,
            gov_id,
            address: rules::free_text(draft, Field::Address),
            state: rules::free_text(draft, Field::State),
            city: rules::free_text(draft, Field::City),
            country: rules::free_text(draft, Field::Country),
            pin_code,
        }),
        _ => Err(errors),
    }
}

/// Validate only `fields`. Rules still see the full draft.
pub fn validate_fields(draft: &Draft, fields: &[Field]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for &field in fields {
        if let Some(error) = rules::check(field, draft) {
            errors.insert(field, error);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
