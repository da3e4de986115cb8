use crate::options::{Action, ApiVersion, ContentType, Network, OptionOverrides};
use ccu_config::{AppConfig, EnvSource, env, maybe_env};
use std::{fmt, path::PathBuf, time::Duration};
use url::Url;

#[derive(Clone)]
pub struct Config {
    pub api_version: ApiVersion,

    /// SOAP endpoint of the legacy CCUAPI.
    pub ccuapi_endpoint: Url,

    /// Host of the v2 REST API, typically only overwritten for testing.
    pub v2_api_host: Url,

    /// CCUAPI / v2 login.
    pub username: Option<String>,
    pub password: Option<String>,

    /// v3 EdgeGrid key set.
    pub host: Option<String>,
    pub client_token: Option<String>,
    pub client_secret: Option<String>,
    pub access_token: Option<String>,

    /// Fallback credentials file, and the section to read from it.
    pub edgerc_path: Option<PathBuf>,
    pub edgerc_section: String,

    pub notification_email: Option<String>,

    // default purge options, on top of the per-API defaults.
    pub action: Option<Action>,
    pub content_type: Option<ContentType>,
    pub network: Option<Network>,

    /// Override the v3 byte limit per request.
    pub max_batch_bytes: Option<usize>,

    /// how long `purge_all` waits after being rate limited.
    pub rate_limit_delay: Duration,

    pub request_timeout: Duration,
}

impl Config {
    pub fn option_overrides(&self) -> OptionOverrides {
        OptionOverrides {
            action: self.action,
            content_type: self.content_type,
            network: self.network,
            notification_email: self.notification_email.clone(),
        }
    }
}

impl AppConfig for Config {
    fn from_env_source(source: &dyn EnvSource) -> anyhow::Result<Self> {
        let edgerc_path = match maybe_env::<PathBuf>(source, "AKAMAI_EDGERC")? {
            Some(path) => Some(path),
            None => maybe_env::<PathBuf>(source, "HOME")?.map(|home| home.join(".edgerc")),
        };

        Ok(Self {
            api_version: env(source, "AKAMAI_CCU_API_VERSION", ApiVersion::default())?,
            ccuapi_endpoint: env(
                source,
                "AKAMAI_CCUAPI_ENDPOINT",
                "https://ccuapi.akamai.com/soap/servlet/soap/purge".parse()?,
            )?,
            v2_api_host: env(
                source,
                "AKAMAI_CCU_V2_API_HOST",
                "https://api.ccu.akamai.com".parse()?,
            )?,
            username: maybe_env(source, "AKAMAI_CCUAPI_USERNAME")?,
            password: maybe_env(source, "AKAMAI_CCUAPI_PASSWORD")?,
            host: maybe_env(source, "AKAMAI_CCU_HOST")?,
            client_token: maybe_env(source, "AKAMAI_CCU_CLIENT_TOKEN")?,
            client_secret: maybe_env(source, "AKAMAI_CCU_CLIENT_SECRET")?,
            access_token: maybe_env(source, "AKAMAI_CCU_ACCESS_TOKEN")?,
            edgerc_path,
            edgerc_section: env(source, "AKAMAI_EDGERC_SECTION", "default".to_string())?,
            notification_email: maybe_env(source, "AKAMAI_CCUAPI_NOTIFICATION_EMAIL")?,
            action: maybe_env(source, "AKAMAI_CCU_ACTION")?,
            content_type: maybe_env(source, "AKAMAI_CCU_TYPE")?,
            network: maybe_env(source, "AKAMAI_CCU_NETWORK")?,
            max_batch_bytes: maybe_env(source, "AKAMAI_CCU_MAX_BATCH_BYTES")?,
            rate_limit_delay: Duration::from_secs(env(
                source,
                "AKAMAI_CCU_RATE_LIMIT_DELAY_SECONDS",
                60,
            )?),
            request_timeout: Duration::from_secs(env(
                source,
                "AKAMAI_CCU_REQUEST_TIMEOUT_SECONDS",
                30,
            )?),
        })
    }
}

// credentials must never end up in logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");

        f.debug_struct("Config")
            .field("api_version", &self.api_version)
            .field("ccuapi_endpoint", &self.ccuapi_endpoint.as_str())
            .field("v2_api_host", &self.v2_api_host.as_str())
            .field("username", &self.username)
            .field("password", &redacted(&self.password))
            .field("host", &self.host)
            .field("client_token", &redacted(&self.client_token))
            .field("client_secret", &redacted(&self.client_secret))
            .field("access_token", &redacted(&self.access_token))
            .field("edgerc_path", &self.edgerc_path)
            .field("edgerc_section", &self.edgerc_section)
            .field("notification_email", &self.notification_email)
            .field("action", &self.action)
            .field("content_type", &self.content_type)
            .field("network", &self.network)
            .field("max_batch_bytes", &self.max_batch_bytes)
            .field("rate_limit_delay", &self.rate_limit_delay)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
