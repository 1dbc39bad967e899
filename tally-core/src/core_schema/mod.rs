//! Declarative request validation
//!
//! Typed field kinds composed into named request schemas; binding raw
//! input to a schema yields validated values or a per-field error map.
//! All fields are always checked, so one bad field never hides another.

mod error;
mod field;
mod request;

pub use error::FieldError;
pub use field::{FieldKind, FieldSpec, Gender, DATE_FORMAT};
pub use request::{RequestSchema, ValidatedRequest};
