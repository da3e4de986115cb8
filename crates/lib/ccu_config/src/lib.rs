mod env;

pub use env::{EnvSource, ProcessEnv, env, maybe_env, require_env};

use anyhow::Result;

/// The main config trait for the purge client and its helper crates.
///
/// Every config can be read from the process environment, or from any other
/// [`EnvSource`], which is what the tests use.
pub trait AppConfig: Sized {
    fn from_env_source(source: &dyn EnvSource) -> Result<Self>;

    fn from_environment() -> Result<Self> {
        Self::from_env_source(&ProcessEnv)
    }

    /// config built from an empty environment, so only defaults apply.
    #[cfg(feature = "testing")]
    fn test_config() -> Result<Self> {
        Self::from_env_source(&std::collections::HashMap::<String, String>::new())
    }
}
