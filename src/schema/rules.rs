//! Per-field rule functions
//!
//! Each rule returns the typed value the record stores for that field, or
//! the first check the field fails.

use crate::record::{Draft, Field, GovIdType, Sex};

use super::{
    FieldError, ERROR_CODE_INVALID_FORMAT, ERROR_CODE_NOT_ONE_OF, ERROR_CODE_NOT_POSITIVE_INTEGER,
    ERROR_CODE_TOO_SHORT,
};

pub const NAME_MIN_CHARS: usize = 3;
pub const MOBILE_DIGITS: usize = 10;
pub const AADHAR_DIGITS: usize = 12;
pub const PAN_CHARS: usize = 10;
pub const PIN_CODE_DIGITS: usize = 6;

const AGE_MESSAGE: &str = "Age should be a positive number";

/// Run the rule for `field`, keeping only its error.
pub fn check(field: Field, draft: &Draft) -> Option<FieldError> {
    match field {
        Field::Name => name(draft).err(),
        Field::Dob => dob(draft).err(),
        Field::Sex => sex(draft).err(),
        Field::Mobile => mobile(draft).err(),
        Field::GovIdType => gov_id_type(draft).err(),
        Field::GovId => gov_id(draft).err(),
        Field::PinCode => pin_code(draft).err(),
        Field::Address | Field::State | Field::City | Field::Country => None,
    }
}

pub fn name(draft: &Draft) -> Result<String, FieldError> {
    let name = draft
        .trimmed(Field::Name)
        .ok_or_else(|| FieldError::required("Name is a required field"))?;

    if name.chars().count() < NAME_MIN_CHARS {
        return Err(FieldError::new(
            ERROR_CODE_TOO_SHORT,
            format!("Name must contain at least {} characters", NAME_MIN_CHARS),
        ));
    }
    Ok(name.to_string())
}

/// Age in whole years. Accepts `"42"` as well as `"42.0"`.
pub fn dob(draft: &Draft) -> Result<u32, FieldError> {
    let raw = draft
        .trimmed(Field::Dob)
        .ok_or_else(|| FieldError::required("Age is a required field"))?;

    parse_age(raw).ok_or_else(|| FieldError::new(ERROR_CODE_NOT_POSITIVE_INTEGER, AGE_MESSAGE))
}

fn parse_age(raw: &str) -> Option<u32> {
    if let Ok(age) = raw.parse::<u32>() {
        return (age > 0).then_some(age);
    }

    let number = raw.parse::<f64>().ok()?;
    let whole = number.is_finite() && number.fract() == 0.0;
    if whole && number > 0.0 && number <= f64::from(u32::MAX) {
        Some(number as u32)
    } else {
        None
    }
}

pub fn sex(draft: &Draft) -> Result<Sex, FieldError> {
    let raw = draft
        .trimmed(Field::Sex)
        .ok_or_else(|| FieldError::required("Sex is a required field"))?;

    Sex::from_wire(raw)
        .ok_or_else(|| FieldError::new(ERROR_CODE_NOT_ONE_OF, "Sex must be one of: male, female"))
}

/// Optional; when present it must be exactly ten digits.
pub fn mobile(draft: &Draft) -> Result<Option<String>, FieldError> {
    let Some(raw) = draft.trimmed(Field::Mobile) else {
        return Ok(None);
    };

    if is_digits(raw, MOBILE_DIGITS) {
        Ok(Some(raw.to_string()))
    } else {
        Err(FieldError::new(
            ERROR_CODE_INVALID_FORMAT,
            format!("Mobile number must be {} numeric characters", MOBILE_DIGITS),
        ))
    }
}

pub fn gov_id_type(draft: &Draft) -> Result<Option<GovIdType>, FieldError> {
    let Some(raw) = draft.trimmed(Field::GovIdType) else {
        return Ok(None);
    };

    GovIdType::from_wire(raw)
        .map(Some)
        .ok_or_else(|| FieldError::new(ERROR_CODE_NOT_ONE_OF, "ID type must be one of: aadhar, pan"))
}

/// Required and shaped by the current ID type. With no recognised type the
/// ID is not required and its text is kept as entered.
pub fn gov_id(draft: &Draft) -> Result<Option<String>, FieldError> {
    let raw = draft.trimmed(Field::GovId);
    let kind = draft.trimmed(Field::GovIdType).and_then(GovIdType::from_wire);

    let Some(kind) = kind else {
        return Ok(raw.map(str::to_string));
    };
    let raw = raw.ok_or_else(|| FieldError::required("Govt ID is a required field"))?;

    match kind {
        GovIdType::Aadhar => {
            if !is_digits(raw, AADHAR_DIGITS) {
                return Err(FieldError::new(
                    ERROR_CODE_INVALID_FORMAT,
                    format!("Aadhar card must be of {} numeric characters", AADHAR_DIGITS),
                ));
            }
            if raw.starts_with(['0', '1']) {
                return Err(FieldError::new(
                    ERROR_CODE_INVALID_FORMAT,
                    "Aadhar card number must not start from 0 or 1",
                ));
            }
        }
        GovIdType::Pan => {
            let alphanumeric = raw.chars().all(|c| c.is_ascii_alphanumeric());
            if !alphanumeric || raw.len() != PAN_CHARS {
                return Err(FieldError::new(
                    ERROR_CODE_INVALID_FORMAT,
                    format!("Pan card must be of {} alphanumeric characters", PAN_CHARS),
                ));
            }
        }
    }
    Ok(Some(raw.to_string()))
}

/// Optional; when present it must be six digits without a leading zero.
pub fn pin_code(draft: &Draft) -> Result<Option<String>, FieldError> {
    let Some(raw) = draft.trimmed(Field::PinCode) else {
        return Ok(None);
    };

    if raw.starts_with('0') {
        return Err(FieldError::new(
            ERROR_CODE_INVALID_FORMAT,
            "Pin code should not start with 0",
        ));
    }
    if !is_digits(raw, PIN_CODE_DIGITS) {
        return Err(FieldError::new(
            ERROR_CODE_INVALID_FORMAT,
            format!("Pin code must be {} numeric characters", PIN_CODE_DIGITS),
        ));
    }
    Ok(Some(raw.to_string()))
}

/// Address, state, city and country carry no constraint.
pub fn free_text(draft: &Draft, field: Field) -> Option<String> {
    draft.trimmed(field).map(str::to_string)
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ERROR_CODE_REQUIRED;

    fn draft(field: Field, value: &str) -> Draft {
        Draft::new().with(field, value)
    }

    #[test]
    fn test_age_parsing() {
        assert_eq!(dob(&draft(Field::Dob, "42")), Ok(42));
        assert_eq!(dob(&draft(Field::Dob, " 7 ")), Ok(7));
        assert_eq!(dob(&draft(Field::Dob, "42.0")), Ok(42));

        for bad in ["0", "-3", "4.5", "abc", "1e400", "NaN"] {
            let error = dob(&draft(Field::Dob, bad)).unwrap_err();
            assert_eq!(error.code, ERROR_CODE_NOT_POSITIVE_INTEGER, "age {:?}", bad);
        }

        assert_eq!(dob(&Draft::new()).unwrap_err().code, ERROR_CODE_REQUIRED);
    }

    #[test]
    fn test_sex_must_be_known_value() {
        assert_eq!(sex(&draft(Field::Sex, "male")), Ok(Sex::Male));
        assert_eq!(sex(&draft(Field::Sex, "other")).unwrap_err().code, ERROR_CODE_NOT_ONE_OF);
    }

    #[test]
    fn test_mobile_is_optional_but_exact() {
        assert_eq!(mobile(&Draft::new()), Ok(None));
        assert_eq!(
            mobile(&draft(Field::Mobile, "9876543210")),
            Ok(Some("9876543210".to_string()))
        );
        assert!(mobile(&draft(Field::Mobile, "987654321")).is_err());
        assert!(mobile(&draft(Field::Mobile, "98765432100")).is_err());
        assert!(mobile(&draft(Field::Mobile, "98765abcde")).is_err());
    }

    #[test]
    fn test_pan_format() {
        let with_pan = |id: &str| Draft::new().with(Field::GovIdType, "pan").with(Field::GovId, id);

        assert_eq!(gov_id(&with_pan("ABCDE1234F")), Ok(Some("ABCDE1234F".to_string())));
        assert!(gov_id(&with_pan("ABCDE1234")).is_err());
        assert!(gov_id(&with_pan("ABCDE-234F")).is_err());
        assert_eq!(
            gov_id(&Draft::new().with(Field::GovIdType, "pan")).unwrap_err().code,
            ERROR_CODE_REQUIRED
        );
    }

    #[test]
    fn test_aadhar_rejects_non_digits() {
        let draft = Draft::new()
            .with(Field::GovIdType, "aadhar")
            .with(Field::GovId, "23456789012a");
        assert_eq!(
            gov_id(&draft).unwrap_err().message,
            "Aadhar card must be of 12 numeric characters"
        );
    }

    #[test]
    fn test_pin_code_shape() {
        assert_eq!(pin_code(&draft(Field::PinCode, "560001")), Ok(Some("560001".to_string())));
        assert_eq!(
            pin_code(&draft(Field::PinCode, "56000")).unwrap_err().message,
            "Pin code must be 6 numeric characters"
        );
        assert!(pin_code(&draft(Field::PinCode, "5600a1")).is_err());
    }

    #[test]
    fn test_free_text_fields_never_fail() {
        for field in [Field::Address, Field::State, Field::City, Field::Country] {
            assert!(check(field, &draft(field, "anything at all")).is_none());
        }
    }
}
