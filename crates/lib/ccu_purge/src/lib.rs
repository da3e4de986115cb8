//! Batched cache purges against the Akamai CCU APIs.
//!
//! ```no_run
//! # async fn run() -> ccu_purge::Result<()> {
//! use ccu_config::AppConfig as _;
//! use ccu_purge::{Config, PurgeBatcher};
//!
//! let config = Config::from_environment()?;
//! let mut batcher = PurgeBatcher::from_config(&config)?;
//! batcher.add(vec!["https://www.example.com/", "https://www.example.com/about/"])?;
//! for outcome in batcher.purge_all().await? {
//!     println!("{} targets purged", outcome.count());
//! }
//! # Ok(())
//! # }
//! ```

mod api;
mod batcher;
mod config;
mod credentials;
mod error;
mod metrics;
mod models;
mod options;
mod queue;
mod target;

#[cfg(any(test, feature = "testing"))]
pub use api::mock::MockBackend;
pub use batcher::PurgeBatcher;
pub use config::Config;
pub use credentials::{Credentials, PasswordCredentials};
pub use error::{Error, Result};
pub use metrics::PurgeMetrics;
pub use models::{
    BatchOutcome, CcuapiResult, CcuapiResultClass, PurgeResponse, PurgeResult, PurgeStatus,
    QueueLength, RestPurgeResponse,
};
pub use options::{Action, ApiVersion, ContentType, Network, OptionOverrides, PurgeOptions};
pub use queue::{BatchLimit, PendingQueue};
pub use target::{AbsoluteUrl, PurgeInput, Target};
