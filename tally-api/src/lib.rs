//! HTTP surface for the scoring service
//!
//! One POST route carries every method call; the dispatcher and store
//! live in `tally-core`.

pub mod routes;
pub mod server;

pub use routes::build_router;
