//! Per-call diagnostic side-channel

/// Mutable context owned by the transport for one call; the dispatcher
/// records observability facts into it as the call progresses. Nothing in
/// here reaches the end user.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Correlates log lines belonging to one wire request
    pub request_id: String,
    /// For `online_score`: argument names that arrived non-null
    pub has: Option<Vec<String>>,
    /// For `clients_interests`: how many client ids the call carried
    pub nclients: Option<usize>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            ..Default::default()
        }
    }
}
