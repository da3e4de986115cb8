use crate::EdgeGridCredentials;
use anyhow::{Result, anyhow};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac as _};
use http::{HeaderMap, HeaderName, HeaderValue, Method, header::AUTHORIZATION};
use sha2::{Digest as _, Sha256};
use tracing::trace;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "EG1-HMAC-SHA256";

/// Adds the EdgeGrid `Authorization` header to outgoing requests.
#[derive(Debug, Clone)]
pub struct EdgeGridSigner {
    credentials: EdgeGridCredentials,
    headers_to_sign: Vec<HeaderName>,
}

impl EdgeGridSigner {
    pub fn new(credentials: EdgeGridCredentials) -> Self {
        Self {
            credentials,
            headers_to_sign: Vec::new(),
        }
    }

    /// include these request headers in the signature.
    pub fn with_headers_to_sign(mut self, headers: impl IntoIterator<Item = HeaderName>) -> Self {
        self.headers_to_sign.extend(headers);
        self
    }

    pub fn credentials(&self) -> &EdgeGridCredentials {
        &self.credentials
    }

    pub fn sign(&self, request: &mut reqwest::Request) -> Result<()> {
        let timestamp = format_timestamp(Utc::now());
        let nonce = new_nonce();

        let body = request.body().and_then(|body| body.as_bytes()).unwrap_or_default();

        let authorization = self.authorization(
            request.method(),
            request.url(),
            request.headers(),
            body,
            &timestamp,
            &nonce,
        )?;

        request
            .headers_mut()
            .insert(AUTHORIZATION, HeaderValue::from_str(&authorization)?);
        Ok(())
    }

    pub(crate) fn authorization(
        &self,
        method: &Method,
        url: &Url,
        headers: &HeaderMap,
        body: &[u8],
        timestamp: &str,
        nonce: &str,
    ) -> Result<String> {
        let auth_prefix = format!(
            "{ALGORITHM} client_token={};access_token={};timestamp={timestamp};nonce={nonce};",
            self.credentials.client_token, self.credentials.access_token,
        );

        let host = url
            .host_str()
            .ok_or_else(|| anyhow!("cannot sign request without host: {url}"))?
            .to_lowercase();
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host,
        };

        let path_and_query = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };

        let canonical_headers = self.canonicalize_headers(headers);
        let content_hash = self.content_hash(method, body);

        let data_to_sign = [
            method.as_str(),
            url.scheme(),
            host.as_str(),
            path_and_query.as_str(),
            canonical_headers.as_str(),
            content_hash.as_str(),
            auth_prefix.as_str(),
        ]
        .join("\t");
        trace!(%method, %url, "signing request");

        let signing_key = hmac_base64(self.credentials.client_secret.as_bytes(), timestamp.as_bytes())?;
        let signature = hmac_base64(signing_key.as_bytes(), data_to_sign.as_bytes())?;

        Ok(format!("{auth_prefix}signature={signature}"))
    }

    fn canonicalize_headers(&self, headers: &HeaderMap) -> String {
        self.headers_to_sign
            .iter()
            .filter_map(|name| {
                let value = headers.get(name)?.to_str().ok()?;
                Some(format!(
                    "{}:{}",
                    name.as_str().to_lowercase(),
                    value.split_whitespace().collect::<Vec<_>>().join(" ")
                ))
            })
            .collect::<Vec<_>>()
            .join("\t")
    }

    // only POST bodies are hashed, and only up to `max_body` bytes.
    fn content_hash(&self, method: &Method, body: &[u8]) -> String {
        if method != Method::POST || body.is_empty() {
            return String::new();
        }
        let body = &body[..body.len().min(self.credentials.max_body)];
        STANDARD.encode(Sha256::digest(body))
    }
}

fn hmac_base64(key: &[u8], data: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|err| anyhow!("invalid HMAC key: {err}"))?;
    mac.update(data);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

pub(crate) fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H:%M:%S+0000").to_string()
}

/// random UUIDv4-formatted nonce.
pub(crate) fn new_nonce() -> String {
    let mut bytes: [u8; 16] = rand::random();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    format!(
        "{}-{}-{}-{}-{}",
        hex::encode(&bytes[0..4]),
        hex::encode(&bytes[4..6]),
        hex::encode(&bytes[6..8]),
        hex::encode(&bytes[8..10]),
        hex::encode(&bytes[10..16]),
    )
}
