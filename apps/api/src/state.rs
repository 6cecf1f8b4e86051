use crate::config::Config;
use crate::enhance::EnhanceClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Full runtime config; handlers currently only need the enhance client,
    /// but limits and flags will come from here.
    #[allow(dead_code)]
    pub config: Config,
    pub enhancer: EnhanceClient,
}
