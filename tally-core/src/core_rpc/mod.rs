//! JSON method-call pipeline
//!
//! The wire envelope (status codes and response shaping), the per-call
//! diagnostic context, and the dispatcher tying validation, auth, and the
//! business handlers together.

mod context;
mod dispatch;
mod envelope;

pub use context::RequestContext;
pub use dispatch::{
    MethodDispatcher, MethodError, METHOD_CLIENTS_INTERESTS, METHOD_ONLINE_SCORE,
};
pub use envelope::{
    status_message, wire_response, BAD_REQUEST, FORBIDDEN, INTERNAL_ERROR, INVALID_REQUEST,
    NOT_FOUND, OK,
};
