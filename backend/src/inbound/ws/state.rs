//! Shared WebSocket adapter state.
//!
//! The streaming endpoint depends on the ingestion port rather than the
//! service, so sessions can be driven by deterministic doubles in tests.

use std::sync::Arc;

use crate::domain::ports::LocationIngestion;

/// Dependency bundle for WebSocket sessions.
#[derive(Clone)]
pub struct WsState {
    pub ingestion: Arc<dyn LocationIngestion>,
}

impl WsState {
    /// Construct state from explicit port implementations.
    pub fn new(ingestion: Arc<dyn LocationIngestion>) -> Self {
        Self { ingestion }
    }
}
