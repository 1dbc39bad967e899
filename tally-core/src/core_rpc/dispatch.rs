//! Method dispatch
//!
//! One linear pipeline per call: envelope shape check, outer schema
//! binding, the auth gate, then the method-specific handler with its own
//! argument schema and cross-field rules. Validation and auth outcomes
//! are ordinary `(payload, status)` results; only store failures on the
//! plain lookup path surface as errors.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::core_auth::{check_auth, Role};
use crate::core_schema::{RequestSchema, ValidatedRequest, DATE_FORMAT};
use crate::core_score::{get_interests, get_score, ScoreError, ScoreQuery};
use crate::core_store::Store;

use super::context::RequestContext;
use super::envelope::{status_message, FORBIDDEN, INVALID_REQUEST, OK};

/// Method name for the score lookup
pub const METHOD_ONLINE_SCORE: &str = "online_score";
/// Method name for the interests lookup
pub const METHOD_CLIENTS_INTERESTS: &str = "clients_interests";

/// Score every admin call reports without consulting the store
const ADMIN_SCORE: i64 = 42;

/// Fatal dispatch failures; the transport maps these to an internal error
#[derive(Debug, Error)]
pub enum MethodError {
    #[error(transparent)]
    Score(#[from] ScoreError),
}

/// Routes one method call end to end.
///
/// Owns the immutable request schemas and the store handle; safe to share
/// across concurrent calls.
pub struct MethodDispatcher {
    store: Arc<dyn Store>,
    envelope_schema: RequestSchema,
    score_schema: RequestSchema,
    interests_schema: RequestSchema,
}

impl MethodDispatcher {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            envelope_schema: RequestSchema::method_call(),
            score_schema: RequestSchema::online_score(),
            interests_schema: RequestSchema::clients_interests(),
        }
    }

    /// Handle one envelope, returning the payload and status to put on
    /// the wire. `Err` means a store failure the transport must convert
    /// into an internal-error response.
    pub async fn handle(
        &self,
        envelope: &Value,
        ctx: &mut RequestContext,
    ) -> Result<(Value, u16), MethodError> {
        let Some(body) = envelope.get("body").and_then(Value::as_object) else {
            return Ok((json!({ "error": "Invalid request" }), INVALID_REQUEST));
        };

        let call = self.envelope_schema.bind(body);
        if !call.is_valid() {
            debug!(
                request_id = %ctx.request_id,
                schema = self.envelope_schema.name(),
                errors = ?call.errors(),
                "envelope validation failed"
            );
            return Ok((errors_payload(&call), INVALID_REQUEST));
        }

        let login = call.str_value("login").unwrap_or_default();
        let token = call.str_value("token").unwrap_or_default();
        let account = call.str_value("account");
        let role = Role::from_login(login);

        if !check_auth(role, account, login, token) {
            debug!(request_id = %ctx.request_id, login, "authentication failed");
            return Ok((
                Value::String(status_message(FORBIDDEN).to_string()),
                FORBIDDEN,
            ));
        }

        let arguments = call.get("arguments").cloned().unwrap_or(Value::Null);

        match call.str_value("method").unwrap_or_default() {
            METHOD_ONLINE_SCORE => self.online_score(&arguments, role, ctx).await,
            METHOD_CLIENTS_INTERESTS => self.clients_interests(&arguments, ctx).await,
            other => {
                debug!(request_id = %ctx.request_id, method = other, "unknown method");
                Ok((json!({ "error": "Invalid request" }), INVALID_REQUEST))
            }
        }
    }

    async fn online_score(
        &self,
        arguments: &Value,
        role: Role,
        ctx: &mut RequestContext,
    ) -> Result<(Value, u16), MethodError> {
        let Some(args) = arguments.as_object() else {
            return Ok((json!({ "error": "Invalid arguments" }), INVALID_REQUEST));
        };

        let parsed = self.score_schema.bind(args);
        if !parsed.is_valid() {
            debug!(
                request_id = %ctx.request_id,
                schema = self.score_schema.name(),
                errors = ?parsed.errors(),
                "argument validation failed"
            );
            return Ok((errors_payload(&parsed), INVALID_REQUEST));
        }

        // At least one pair must arrive complete, or there is nothing
        // meaningful to score.
        let pairs = [
            ("phone", "email"),
            ("first_name", "last_name"),
            ("gender", "birthday"),
        ];
        if !pairs.iter().any(|(a, b)| parsed.has(a) && parsed.has(b)) {
            return Ok((json!({ "error": "Invalid arguments" }), INVALID_REQUEST));
        }

        ctx.has = Some(
            args.iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(name, _)| name.clone())
                .collect(),
        );

        if role.is_admin() {
            return Ok((json!({ "score": ADMIN_SCORE }), OK));
        }

        let query = ScoreQuery {
            phone: parsed.str_value("phone").map(str::to_string),
            email: parsed.str_value("email").map(str::to_string),
            first_name: parsed.str_value("first_name").map(str::to_string),
            last_name: parsed.str_value("last_name").map(str::to_string),
            birthday: parsed
                .str_value("birthday")
                .and_then(|raw| NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()),
            gender: parsed.int_value("gender"),
        };
        let score = get_score(self.store.as_ref(), &query).await;
        Ok((json!({ "score": score }), OK))
    }

    async fn clients_interests(
        &self,
        arguments: &Value,
        ctx: &mut RequestContext,
    ) -> Result<(Value, u16), MethodError> {
        let Some(args) = arguments.as_object() else {
            return Ok((json!({ "error": "Invalid arguments" }), INVALID_REQUEST));
        };

        let parsed = self.interests_schema.bind(args);
        if !parsed.is_valid() {
            debug!(
                request_id = %ctx.request_id,
                schema = self.interests_schema.name(),
                errors = ?parsed.errors(),
                "argument validation failed"
            );
            return Ok((errors_payload(&parsed), INVALID_REQUEST));
        }

        let ids: Vec<i64> = parsed
            .get("client_ids")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default();
        ctx.nclients = Some(ids.len());

        let mut interests = Map::new();
        for id in ids {
            let found = get_interests(self.store.as_ref(), id).await?;
            interests.insert(id.to_string(), json!(found));
        }
        Ok((Value::Object(interests), OK))
    }
}

fn errors_payload(request: &ValidatedRequest) -> Value {
    json!(request.errors())
}
