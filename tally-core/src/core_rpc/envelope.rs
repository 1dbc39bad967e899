//! Wire-level response envelope
//!
//! Status codes, their default messages, and the response shaping shared
//! by every reply the service emits: successes carry `response`, errors
//! carry `error`, both carry `code`.

use serde_json::{json, Value};

pub const OK: u16 = 200;
pub const BAD_REQUEST: u16 = 400;
pub const FORBIDDEN: u16 = 403;
pub const NOT_FOUND: u16 = 404;
pub const INVALID_REQUEST: u16 = 422;
pub const INTERNAL_ERROR: u16 = 500;

/// Default message for an error status
pub fn status_message(code: u16) -> &'static str {
    match code {
        BAD_REQUEST => "Bad Request",
        FORBIDDEN => "Forbidden",
        NOT_FOUND => "Not Found",
        INVALID_REQUEST => "Invalid Request",
        INTERNAL_ERROR => "Internal Server Error",
        _ => "Unknown Error",
    }
}

fn is_error(code: u16) -> bool {
    matches!(
        code,
        BAD_REQUEST | FORBIDDEN | NOT_FOUND | INVALID_REQUEST | INTERNAL_ERROR
    )
}

fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Wrap a handler payload into the outer response envelope. Empty error
/// payloads fall back to the status's default message.
pub fn wire_response(payload: Value, code: u16) -> Value {
    if is_error(code) {
        let error = if is_empty_payload(&payload) {
            Value::String(status_message(code).to_string())
        } else {
            payload
        };
        json!({ "error": error, "code": code })
    } else {
        json!({ "response": payload, "code": code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        assert_eq!(status_message(FORBIDDEN), "Forbidden");
        assert_eq!(status_message(INVALID_REQUEST), "Invalid Request");
        assert_eq!(status_message(999), "Unknown Error");
    }

    #[test]
    fn test_success_envelope() {
        let wrapped = wire_response(json!({"score": 3.0}), OK);
        assert_eq!(wrapped, json!({"response": {"score": 3.0}, "code": 200}));
    }

    #[test]
    fn test_error_envelope_keeps_payload() {
        let wrapped = wire_response(json!({"phone": "invalid phone"}), INVALID_REQUEST);
        assert_eq!(
            wrapped,
            json!({"error": {"phone": "invalid phone"}, "code": 422})
        );
    }

    #[test]
    fn test_empty_error_payload_falls_back_to_default() {
        for payload in [Value::Null, json!(""), json!({}), json!([])] {
            let wrapped = wire_response(payload, NOT_FOUND);
            assert_eq!(wrapped, json!({"error": "Not Found", "code": 404}));
        }
    }

    #[test]
    fn test_forbidden_string_payload() {
        let wrapped = wire_response(json!("Forbidden"), FORBIDDEN);
        assert_eq!(wrapped, json!({"error": "Forbidden", "code": 403}));
    }
}
