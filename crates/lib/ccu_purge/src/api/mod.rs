mod ccuapi;
#[cfg(any(test, feature = "testing"))]
pub mod mock;
mod rest;

use crate::{
    Config,
    credentials::Credentials,
    error::{Error, Result},
    models::{PurgeResult, PurgeStatus, QueueLength},
    options::{ApiVersion, PurgeOptions},
    target::Target,
};
use http::{
    HeaderMap, HeaderValue,
    header::{ACCEPT, USER_AGENT},
};
use reqwest::StatusCode;
use std::time::Duration;

pub(crate) use ccuapi::CcuapiClient;
pub(crate) use rest::{V2Client, V3Client};

const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// How the batcher has to treat a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResponseKind {
    Accepted,
    RateLimited,
    Failed,
}

/// "try again later" responses per API.
pub(crate) fn rate_limit_statuses(api: ApiVersion) -> &'static [StatusCode] {
    const V2: &[StatusCode] = &[StatusCode::INSUFFICIENT_STORAGE];
    const V3: &[StatusCode] = &[StatusCode::INSUFFICIENT_STORAGE, StatusCode::TOO_MANY_REQUESTS];

    match api {
        ApiVersion::Ccuapi => &[],
        ApiVersion::V2 => V2,
        ApiVersion::V3 => V3,
    }
}

pub(crate) trait PurgeBackend {
    fn api_version(&self) -> ApiVersion;

    /// Send one batch. Any HTTP response is `Ok`, only transport errors fail.
    fn submit(
        &self,
        batch: &[Target],
        options: &PurgeOptions,
    ) -> impl Future<Output = Result<PurgeResult>> + Send;

    fn classify(&self, result: &PurgeResult) -> ResponseKind {
        if result.status.is_success() {
            ResponseKind::Accepted
        } else if rate_limit_statuses(self.api_version()).contains(&result.status) {
            ResponseKind::RateLimited
        } else {
            ResponseKind::Failed
        }
    }

    fn check_status(&self, _reference: &str) -> impl Future<Output = Result<PurgeStatus>> + Send {
        let api = self.api_version();
        async move {
            Err(Error::UnsupportedOperation {
                operation: "check_status",
                api,
            })
        }
    }

    fn check_queue_length(&self) -> impl Future<Output = Result<QueueLength>> + Send {
        let api = self.api_version();
        async move {
            Err(Error::UnsupportedOperation {
                operation: "check_queue_length",
                api,
            })
        }
    }
}

#[derive(Debug)]
pub(crate) enum Backend {
    Ccuapi(CcuapiClient),
    V2(V2Client),
    V3(V3Client),
    #[cfg(any(test, feature = "testing"))]
    Mock(mock::MockBackend),
}

impl Backend {
    pub(crate) fn from_config(api: ApiVersion, config: &Config, credentials: Credentials) -> Result<Self> {
        let client = http_client(config.request_timeout)?;

        match (api, credentials) {
            (ApiVersion::Ccuapi, Credentials::Password(credentials)) => Ok(Self::Ccuapi(
                CcuapiClient::new(client, config.ccuapi_endpoint.clone(), credentials),
            )),
            (ApiVersion::V2, Credentials::Password(credentials)) => Ok(Self::V2(V2Client::new(
                client,
                config.v2_api_host.clone(),
                credentials,
            ))),
            (ApiVersion::V3, Credentials::EdgeGrid(credentials)) => {
                Ok(Self::V3(V3Client::new(client, credentials)?))
            }
            (api, _) => Err(Error::Configuration(format!(
                "the {api} API can't be used with the given credentials"
            ))),
        }
    }
}

impl PurgeBackend for Backend {
    fn api_version(&self) -> ApiVersion {
        match self {
            Self::Ccuapi(backend) => backend.api_version(),
            Self::V2(backend) => backend.api_version(),
            Self::V3(backend) => backend.api_version(),
            #[cfg(any(test, feature = "testing"))]
            Self::Mock(backend) => backend.api_version(),
        }
    }

    async fn submit(&self, batch: &[Target], options: &PurgeOptions) -> Result<PurgeResult> {
        match self {
            Self::Ccuapi(backend) => backend.submit(batch, options).await,
            Self::V2(backend) => backend.submit(batch, options).await,
            Self::V3(backend) => backend.submit(batch, options).await,
            #[cfg(any(test, feature = "testing"))]
            Self::Mock(backend) => backend.submit(batch, options).await,
        }
    }

    fn classify(&self, result: &PurgeResult) -> ResponseKind {
        match self {
            Self::Ccuapi(backend) => backend.classify(result),
            Self::V2(backend) => backend.classify(result),
            Self::V3(backend) => backend.classify(result),
            #[cfg(any(test, feature = "testing"))]
            Self::Mock(backend) => backend.classify(result),
        }
    }

    async fn check_status(&self, reference: &str) -> Result<PurgeStatus> {
        match self {
            Self::Ccuapi(backend) => backend.check_status(reference).await,
            Self::V2(backend) => backend.check_status(reference).await,
            Self::V3(backend) => backend.check_status(reference).await,
            #[cfg(any(test, feature = "testing"))]
            Self::Mock(backend) => backend.check_status(reference).await,
        }
    }

    async fn check_queue_length(&self) -> Result<QueueLength> {
        match self {
            Self::Ccuapi(backend) => backend.check_queue_length().await,
            Self::V2(backend) => backend.check_queue_length().await,
            Self::V3(backend) => backend.check_queue_length().await,
            #[cfg(any(test, feature = "testing"))]
            Self::Mock(backend) => backend.check_queue_length().await,
        }
    }
}

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(APP_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Ok(reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ApiVersion::Ccuapi, 507, false)]
    #[test_case(ApiVersion::V2, 507, true)]
    #[test_case(ApiVersion::V2, 429, false)]
    #[test_case(ApiVersion::V3, 507, true)]
    #[test_case(ApiVersion::V3, 429, true)]
    #[test_case(ApiVersion::V3, 403, false)]
    fn test_rate_limit_statuses(api: ApiVersion, status: u16, rate_limited: bool) {
        let status = StatusCode::from_u16(status).unwrap();
        assert_eq!(rate_limit_statuses(api).contains(&status), rate_limited);
    }
}
