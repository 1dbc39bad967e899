//! Typed field descriptors
//!
//! Each field kind encapsulates one validation rule. Rules run only when a
//! value is present; `null` and absent are the same thing. Validation
//! returns the value to bind, so kinds that normalize (phone numbers
//! arriving as integers) hand back the canonical form.

use chrono::{Local, NaiveDate};
use serde_json::Value;

use super::error::FieldError;

/// Wire format for date-valued fields
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Oldest accepted birthday, in approximate years
const MAX_AGE_YEARS: i64 = 70;

/// Gender codes accepted by the gender rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Unknown = 0,
    Male = 1,
    Female = 2,
}

impl Gender {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Gender::Unknown),
            1 => Some(Gender::Male),
            2 => Some(Gender::Female),
            _ => None,
        }
    }
}

/// One validation rule family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free-form text
    Char,
    /// Text containing an `@`
    Email,
    /// Eleven digits starting with `7`; integers normalize to text
    Phone,
    /// Date string in `dd.mm.yyyy` form
    Date,
    /// Date at most ~70 years in the past
    Birthday,
    /// Integer gender code
    Gender,
    /// Non-empty list of integer client ids
    ClientIds,
    /// Opaque container, re-validated by the business layer
    Arguments,
}

/// A single field's constraints within a request schema
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Carried on the schema but consulted by no rule; absent values are
    /// always acceptable on optional fields whatever this says.
    pub nullable: bool,
}

impl FieldSpec {
    pub fn new(name: &'static str, kind: FieldKind, required: bool, nullable: bool) -> Self {
        Self {
            name,
            kind,
            required,
            nullable,
        }
    }

    /// Run this field's rule over a raw value. `None` and JSON `null` both
    /// mean the field was absent. On success the returned value is the
    /// normalized form to bind into the validated request, or `None` for an
    /// acceptably absent field.
    pub fn validate(&self, raw: Option<&Value>) -> Result<Option<Value>, FieldError> {
        let value = match raw {
            None | Some(Value::Null) => {
                if self.required {
                    return Err(FieldError::Required);
                }
                // The list rule has no absent-but-optional state: it runs
                // even when the value is missing and rejects it.
                if self.kind == FieldKind::ClientIds {
                    return Err(FieldError::ClientIdsNotAList);
                }
                return Ok(None);
            }
            Some(value) => value,
        };

        let bound = match self.kind {
            FieldKind::Char => validate_char(value)?,
            FieldKind::Email => validate_email(value)?,
            FieldKind::Phone => validate_phone(value)?,
            FieldKind::Date => validate_date(value)?,
            FieldKind::Birthday => validate_birthday(value, Local::now().date_naive())?,
            FieldKind::Gender => validate_gender(value)?,
            FieldKind::ClientIds => validate_client_ids(value)?,
            FieldKind::Arguments => value.clone(),
        };
        Ok(Some(bound))
    }
}

fn validate_char(value: &Value) -> Result<Value, FieldError> {
    match value {
        Value::String(_) => Ok(value.clone()),
        _ => Err(FieldError::NotAString),
    }
}

fn validate_email(value: &Value) -> Result<Value, FieldError> {
    let checked = validate_char(value)?;
    if checked.as_str().is_some_and(|s| s.contains('@')) {
        Ok(checked)
    } else {
        Err(FieldError::InvalidEmail)
    }
}

fn validate_phone(value: &Value) -> Result<Value, FieldError> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                return Err(FieldError::PhoneNotStringOrInt);
            }
        }
        _ => return Err(FieldError::PhoneNotStringOrInt),
    };

    if text.chars().count() == 11 && text.starts_with('7') {
        Ok(Value::String(text))
    } else {
        Err(FieldError::InvalidPhone)
    }
}

fn parse_date(value: &Value) -> Result<NaiveDate, FieldError> {
    let text = value.as_str().ok_or(FieldError::DateNotAString)?;
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| FieldError::InvalidDateFormat)
}

fn validate_date(value: &Value) -> Result<Value, FieldError> {
    parse_date(value)?;
    Ok(value.clone())
}

fn validate_birthday(value: &Value, today: NaiveDate) -> Result<Value, FieldError> {
    let birthday = parse_date(value)?;
    // Whole years via floor division by 365 days, leap drift and all.
    let age = (today - birthday).num_days().div_euclid(365);
    if age > MAX_AGE_YEARS {
        return Err(FieldError::BirthdayOutOfRange);
    }
    Ok(value.clone())
}

fn validate_gender(value: &Value) -> Result<Value, FieldError> {
    let code = value.as_i64().ok_or(FieldError::GenderNotAnInt)?;
    match Gender::from_code(code) {
        Some(_) => Ok(value.clone()),
        None => Err(FieldError::InvalidGender),
    }
}

fn validate_client_ids(value: &Value) -> Result<Value, FieldError> {
    let items = match value {
        Value::Array(items) if !items.is_empty() => items,
        _ => return Err(FieldError::ClientIdsNotAList),
    };
    if items.iter().any(|item| item.as_i64().is_none()) {
        return Err(FieldError::ClientIdsElementNotAnInt);
    }
    Ok(value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn optional(kind: FieldKind) -> FieldSpec {
        FieldSpec::new("field", kind, false, true)
    }

    fn required(kind: FieldKind) -> FieldSpec {
        FieldSpec::new("field", kind, true, false)
    }

    #[test]
    fn test_required_absent_fails() {
        let spec = required(FieldKind::Char);
        assert_eq!(spec.validate(None), Err(FieldError::Required));
        assert_eq!(spec.validate(Some(&Value::Null)), Err(FieldError::Required));
    }

    #[test]
    fn test_optional_absent_passes_empty() {
        let spec = optional(FieldKind::Char);
        assert_eq!(spec.validate(None), Ok(None));
        assert_eq!(spec.validate(Some(&Value::Null)), Ok(None));
    }

    #[test]
    fn test_char_accepts_strings_only() {
        let spec = optional(FieldKind::Char);
        assert_eq!(
            spec.validate(Some(&json!("hello"))),
            Ok(Some(json!("hello")))
        );
        assert_eq!(spec.validate(Some(&json!(123))), Err(FieldError::NotAString));
        assert_eq!(
            spec.validate(Some(&json!(["a"]))),
            Err(FieldError::NotAString)
        );
    }

    #[test]
    fn test_email_requires_at_sign() {
        let spec = optional(FieldKind::Email);
        assert_eq!(spec.validate(Some(&json!("a@b.c"))), Ok(Some(json!("a@b.c"))));
        assert_eq!(
            spec.validate(Some(&json!("nobody.example"))),
            Err(FieldError::InvalidEmail)
        );
        assert_eq!(spec.validate(Some(&json!(42))), Err(FieldError::NotAString));
    }

    #[test]
    fn test_phone_accepts_string_and_int() {
        let spec = optional(FieldKind::Phone);
        assert_eq!(
            spec.validate(Some(&json!("79175002040"))),
            Ok(Some(json!("79175002040")))
        );
        // Integers normalize to their decimal string form.
        assert_eq!(
            spec.validate(Some(&json!(79175002040u64))),
            Ok(Some(json!("79175002040")))
        );
    }

    #[test]
    fn test_phone_shape() {
        let spec = optional(FieldKind::Phone);
        assert_eq!(
            spec.validate(Some(&json!("89175002040"))),
            Err(FieldError::InvalidPhone)
        );
        assert_eq!(
            spec.validate(Some(&json!("7917500204"))),
            Err(FieldError::InvalidPhone)
        );
        assert_eq!(
            spec.validate(Some(&json!(7.5))),
            Err(FieldError::PhoneNotStringOrInt)
        );
        assert_eq!(
            spec.validate(Some(&json!(true))),
            Err(FieldError::PhoneNotStringOrInt)
        );
    }

    #[test]
    fn test_date_format() {
        let spec = optional(FieldKind::Date);
        assert_eq!(
            spec.validate(Some(&json!("20.07.2017"))),
            Ok(Some(json!("20.07.2017")))
        );
        assert_eq!(
            spec.validate(Some(&json!("2017-07-20"))),
            Err(FieldError::InvalidDateFormat)
        );
        assert_eq!(
            spec.validate(Some(&json!("32.01.2017"))),
            Err(FieldError::InvalidDateFormat)
        );
        assert_eq!(
            spec.validate(Some(&json!(20072017))),
            Err(FieldError::DateNotAString)
        );
    }

    #[test]
    fn test_birthday_age_limit() {
        let today = NaiveDate::from_ymd_opt(2017, 7, 20).unwrap();
        assert!(validate_birthday(&json!("20.07.2000"), today).is_ok());
        assert_eq!(
            validate_birthday(&json!("01.01.1940"), today),
            Err(FieldError::BirthdayOutOfRange)
        );
        // Exactly 70 approximate years is still acceptable; the rule
        // rejects strictly greater.
        assert!(validate_birthday(&json!("21.08.1947"), today).is_ok());
    }

    #[test]
    fn test_gender_codes() {
        let spec = optional(FieldKind::Gender);
        for code in 0..=2 {
            assert_eq!(spec.validate(Some(&json!(code))), Ok(Some(json!(code))));
        }
        assert_eq!(
            spec.validate(Some(&json!(5))),
            Err(FieldError::InvalidGender)
        );
        assert_eq!(
            spec.validate(Some(&json!(-1))),
            Err(FieldError::InvalidGender)
        );
        assert_eq!(
            spec.validate(Some(&json!("1"))),
            Err(FieldError::GenderNotAnInt)
        );
        assert_eq!(
            spec.validate(Some(&json!(true))),
            Err(FieldError::GenderNotAnInt)
        );
    }

    #[test]
    fn test_client_ids_list() {
        let spec = required(FieldKind::ClientIds);
        assert_eq!(
            spec.validate(Some(&json!([1, 2, 3]))),
            Ok(Some(json!([1, 2, 3])))
        );
        assert_eq!(
            spec.validate(Some(&json!([]))),
            Err(FieldError::ClientIdsNotAList)
        );
        assert_eq!(
            spec.validate(Some(&json!([1, "2"]))),
            Err(FieldError::ClientIdsElementNotAnInt)
        );
        assert_eq!(
            spec.validate(Some(&json!("1,2"))),
            Err(FieldError::ClientIdsNotAList)
        );
    }

    #[test]
    fn test_client_ids_absent_still_rejected_when_optional() {
        let spec = FieldSpec::new("client_ids", FieldKind::ClientIds, false, false);
        assert_eq!(spec.validate(None), Err(FieldError::ClientIdsNotAList));
    }

    #[test]
    fn test_arguments_accepts_anything() {
        let spec = required(FieldKind::Arguments);
        assert_eq!(spec.validate(Some(&json!({}))), Ok(Some(json!({}))));
        assert_eq!(spec.validate(Some(&json!("xx"))), Ok(Some(json!("xx"))));
        assert_eq!(spec.validate(Some(&json!([1]))), Ok(Some(json!([1]))));
    }

    #[test]
    fn test_gender_enum_round_trip() {
        assert_eq!(Gender::from_code(0), Some(Gender::Unknown));
        assert_eq!(Gender::from_code(1), Some(Gender::Male));
        assert_eq!(Gender::from_code(2), Some(Gender::Female));
        assert_eq!(Gender::from_code(3), None);
    }

    proptest! {
        #[test]
        fn prop_eleven_digit_sevens_validate(tail in "[0-9]{10}") {
            let phone = format!("7{}", tail);
            let spec = optional(FieldKind::Phone);
            prop_assert_eq!(
                spec.validate(Some(&json!(phone.clone()))),
                Ok(Some(json!(phone)))
            );
        }

        #[test]
        fn prop_wrong_length_phones_fail(phone in "7[0-9]{0,9}|7[0-9]{11,14}") {
            let spec = optional(FieldKind::Phone);
            prop_assert_eq!(
                spec.validate(Some(&json!(phone))),
                Err(FieldError::InvalidPhone)
            );
        }

        #[test]
        fn prop_formatted_dates_parse(y in 1900i32..2100, m in 1u32..13, d in 1u32..29) {
            let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
            let text = date.format(DATE_FORMAT).to_string();
            prop_assert!(validate_date(&json!(text)).is_ok());
        }
    }
}
