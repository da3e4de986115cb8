//! Client for the Akamai Content Control Utility (CCU) purge APIs.
//!
//! Collect urls with [`PurgeBatcher::add`], then send them in API-sized
//! batches with [`PurgeBatcher::purge`] or [`PurgeBatcher::purge_all`].
//! The legacy CCUAPI SOAP service, the v2 REST API and the EdgeGrid-signed
//! v3 REST API are supported.

pub use ccu_purge::*;

/// environment-based configuration
pub mod config {
    pub use ccu_config::{AppConfig, EnvSource, ProcessEnv, env, maybe_env, require_env};
}

/// EdgeGrid credentials, `.edgerc` parsing and request signing
pub mod edgegrid {
    pub use ccu_edgegrid::*;
}

/// subscriber setup
pub mod logging {
    pub use ccu_logging::*;
}
