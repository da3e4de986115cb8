use anyhow::{Context as _, Result, anyhow};
use std::{
    borrow::Borrow,
    collections::HashMap,
    env::VarError,
    error::Error,
    hash::{BuildHasher, Hash},
    str::FromStr,
};
use tracing::trace;

/// Where configuration variables are looked up.
pub trait EnvSource {
    fn var(&self, name: &str) -> Result<Option<String>>;
}

/// the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Result<Option<String>> {
        match std::env::var(name) {
            Ok(content) => Ok(Some(content)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(anyhow!("configuration variable {} is not UTF-8", name)),
        }
    }
}

impl<K, V, S> EnvSource for HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<str>,
    S: BuildHasher,
{
    fn var(&self, name: &str) -> Result<Option<String>> {
        Ok(self.get(name).map(|value| value.as_ref().to_owned()))
    }
}

pub fn env<T>(source: &dyn EnvSource, var: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Error + Send + Sync + 'static,
{
    Ok(maybe_env(source, var)?.unwrap_or(default))
}

pub fn require_env<T>(source: &dyn EnvSource, var: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Error + Send + Sync + 'static,
{
    maybe_env(source, var)?.with_context(|| anyhow!("configuration variable {} is missing", var))
}

/// Read and parse an optional variable.
///
/// Empty values count as unset, so `AKAMAI_CCU_HOST=` in a deployment file
/// doesn't turn into an empty host.
pub fn maybe_env<T>(source: &dyn EnvSource, var: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Error + Send + Sync + 'static,
{
    match source.var(var)? {
        Some(content) if !content.trim().is_empty() => Ok(content
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("failed to parse configuration variable {var}"))?),
        _ => {
            trace!("optional configuration variable {} is not set", var);
            Ok(None)
        }
    }
}
