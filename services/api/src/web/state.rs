//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use wellbeing_core::insights::JournalInsightsFlow;
use wellbeing_core::ports::DatabaseService;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub insights: JournalInsightsFlow,
    /// Cancelled when the server begins shutting down; long-running work watches it.
    pub shutdown: CancellationToken,
}

//=========================================================================================
// Per-Request Identity
//=========================================================================================

/// The authenticated caller, inserted into request extensions by `require_auth`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);
