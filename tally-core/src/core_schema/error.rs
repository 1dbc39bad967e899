//! Validation failure reasons

use thiserror::Error;

/// Why one field failed its rule. The display form is the message that
/// ends up in the per-field error map returned to callers, so the exact
/// wording is part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("field is required")]
    Required,

    #[error("value must be a string")]
    NotAString,

    #[error("invalid email")]
    InvalidEmail,

    #[error("phone must be string or int")]
    PhoneNotStringOrInt,

    #[error("invalid phone")]
    InvalidPhone,

    #[error("date must be string")]
    DateNotAString,

    #[error("invalid date format")]
    InvalidDateFormat,

    #[error("invalid birthday")]
    BirthdayOutOfRange,

    #[error("gender must be int")]
    GenderNotAnInt,

    #[error("invalid gender")]
    InvalidGender,

    #[error("client_ids must be non-empty list")]
    ClientIdsNotAList,

    #[error("client_ids must contain ints")]
    ClientIdsElementNotAnInt,
}
