//! Request schemas and the binding validator

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use super::field::{FieldKind, FieldSpec};

/// An ordered set of field constraints describing one request shape.
/// Built once at startup and shared read-only across calls.
#[derive(Debug, Clone)]
pub struct RequestSchema {
    name: &'static str,
    fields: Vec<FieldSpec>,
}

impl RequestSchema {
    fn new(name: &'static str, fields: Vec<FieldSpec>) -> Self {
        Self { name, fields }
    }

    /// Outer envelope carried by every method call
    pub fn method_call() -> Self {
        Self::new(
            "method_call",
            vec![
                FieldSpec::new("account", FieldKind::Char, false, true),
                FieldSpec::new("login", FieldKind::Char, true, true),
                FieldSpec::new("token", FieldKind::Char, true, true),
                FieldSpec::new("arguments", FieldKind::Arguments, true, true),
                FieldSpec::new("method", FieldKind::Char, true, false),
            ],
        )
    }

    /// Arguments of the `online_score` method
    pub fn online_score() -> Self {
        Self::new(
            "online_score",
            vec![
                FieldSpec::new("first_name", FieldKind::Char, false, true),
                FieldSpec::new("last_name", FieldKind::Char, false, true),
                FieldSpec::new("email", FieldKind::Email, false, true),
                FieldSpec::new("phone", FieldKind::Phone, false, true),
                FieldSpec::new("birthday", FieldKind::Birthday, false, true),
                FieldSpec::new("gender", FieldKind::Gender, false, true),
            ],
        )
    }

    /// Arguments of the `clients_interests` method
    pub fn clients_interests() -> Self {
        Self::new(
            "clients_interests",
            vec![
                FieldSpec::new("client_ids", FieldKind::ClientIds, true, false),
                FieldSpec::new("date", FieldKind::Date, false, true),
            ],
        )
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Bind raw input to this schema, running every field's rule and
    /// collecting failures instead of stopping at the first one.
    pub fn bind(&self, data: &Map<String, Value>) -> ValidatedRequest {
        let mut values = HashMap::new();
        let mut errors = BTreeMap::new();

        for spec in &self.fields {
            match spec.validate(data.get(spec.name)) {
                Ok(Some(value)) => {
                    values.insert(spec.name, value);
                }
                Ok(None) => {}
                Err(reason) => {
                    errors.insert(spec.name.to_string(), reason.to_string());
                }
            }
        }

        ValidatedRequest { values, errors }
    }
}

/// Outcome of binding one input object to a schema
#[derive(Debug)]
pub struct ValidatedRequest {
    values: HashMap<&'static str, Value>,
    errors: BTreeMap<String, String>,
}

impl ValidatedRequest {
    /// True iff every required field was present and every present field
    /// passed its rule
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Field name to failure message, for every field that failed
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// The bound value for `name`, if the field arrived non-null and valid
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// True iff the field arrived with a non-null value
    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn str_value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn int_value(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }
}
