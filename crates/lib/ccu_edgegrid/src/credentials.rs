use anyhow::{Context as _, Result};
use std::fmt;
use url::Url;

/// One API client's EdgeGrid key set.
#[derive(Clone, PartialEq, Eq)]
pub struct EdgeGridCredentials {
    /// API host, e.g. `akab-xxxx.purge.akamaiapis.net`.
    pub host: String,
    pub client_token: String,
    pub client_secret: String,
    pub access_token: String,
    /// how many bytes of a POST body go into the content hash.
    pub max_body: usize,
}

impl EdgeGridCredentials {
    pub const DEFAULT_MAX_BODY: usize = 131_072;

    pub fn new(
        host: impl Into<String>,
        client_token: impl Into<String>,
        client_secret: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            client_token: client_token.into(),
            client_secret: client_secret.into(),
            access_token: access_token.into(),
            max_body: Self::DEFAULT_MAX_BODY,
        }
    }

    /// Base url for API calls.
    ///
    /// Hosts from `.edgerc` files come without scheme, so we default to https.
    /// A host with an explicit scheme is used as-is, which the tests rely on.
    pub fn base_url(&self) -> Result<Url> {
        let host = self.host.trim().trim_end_matches('/');
        let url = if host.starts_with("https://") || host.starts_with("http://") {
            host.parse()
        } else {
            format!("https://{host}").parse()
        };
        url.with_context(|| format!("invalid EdgeGrid host {host:?}"))
    }
}

impl fmt::Debug for EdgeGridCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeGridCredentials")
            .field("host", &self.host)
            .field("client_token", &"<redacted>")
            .field("client_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("max_body", &self.max_body)
            .finish()
    }
}
