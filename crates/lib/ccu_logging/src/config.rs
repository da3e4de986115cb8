use crate::LogFormat;
use ccu_config::{AppConfig, EnvSource, maybe_env};

pub(crate) const LOG_FILTER_VAR: &str = "AKAMAI_CCU_LOG";
pub(crate) const DEFAULT_DIRECTIVES: &str = "akamai_ccu=info,ccu_purge=info,ccu_edgegrid=info";

#[derive(Debug, Clone)]
pub struct Config {
    pub format: LogFormat,

    /// `EnvFilter` directives, e.g. `ccu_purge=debug`.
    pub filter: String,
}

impl AppConfig for Config {
    fn from_env_source(source: &dyn EnvSource) -> anyhow::Result<Self> {
        Ok(Self {
            format: maybe_env(source, "AKAMAI_CCU_LOG_FORMAT")?.unwrap_or_default(),
            filter: maybe_env(source, LOG_FILTER_VAR)?
                .unwrap_or_else(|| DEFAULT_DIRECTIVES.to_string()),
        })
    }

    #[cfg(feature = "testing")]
    fn test_config() -> anyhow::Result<Self> {
        Ok(Self {
            format: LogFormat::Pretty,
            filter: "trace".into(),
        })
    }
}
