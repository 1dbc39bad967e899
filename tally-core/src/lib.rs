pub mod config;
pub mod core_auth;
pub mod core_rpc;
pub mod core_schema;
pub mod core_score;
pub mod core_store;
pub mod logging;

pub use config::Config;
pub use core_rpc::{MethodDispatcher, RequestContext};
pub use core_store::{MemoryStore, RemoteStore, Store};
