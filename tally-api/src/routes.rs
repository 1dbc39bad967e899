//! The single wire route
//!
//! Everything rides one POST endpoint: the body is parsed as JSON,
//! wrapped into a dispatch envelope together with the request headers,
//! and the dispatcher's `(payload, code)` result is shaped into the
//! response envelope. Unknown paths get the same envelope with a 404.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tally_core::core_rpc::{
    wire_response, MethodDispatcher, RequestContext, BAD_REQUEST, INTERNAL_ERROR, NOT_FOUND,
};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Build the service router around a shared dispatcher
pub fn build_router(dispatcher: Arc<MethodDispatcher>) -> Router {
    Router::new()
        .route("/method", post(handle_method))
        .fallback(not_found)
        .with_state(dispatcher)
}

async fn handle_method(
    State(dispatcher): State<Arc<MethodDispatcher>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut ctx = RequestContext::new(request_id(&headers));

    let parsed: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(err) => {
            warn!(request_id = %ctx.request_id, error = %err, "unparseable request body");
            return reply(Value::Null, BAD_REQUEST);
        }
    };

    info!(request_id = %ctx.request_id, body = %parsed, "handling /method");

    let envelope = json!({ "body": parsed, "headers": headers_value(&headers) });
    let (payload, code) = match dispatcher.handle(&envelope, &mut ctx).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(request_id = %ctx.request_id, error = %err, "method handler failed");
            (Value::Null, INTERNAL_ERROR)
        }
    };

    info!(
        request_id = %ctx.request_id,
        code,
        has = ?ctx.has,
        nclients = ?ctx.nclients,
        "request complete"
    );
    reply(payload, code)
}

async fn not_found() -> Response {
    reply(Value::Null, NOT_FOUND)
}

fn reply(payload: Value, code: u16) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(wire_response(payload, code))).into_response()
}

/// Callers may supply their own correlation id; otherwise mint one
fn request_id(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string())
}

fn headers_value(headers: &HeaderMap) -> Value {
    let map: serde_json::Map<String, Value> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.to_string(), Value::String(v.to_string())))
        })
        .collect();
    Value::Object(map)
}
