//! The legacy CCUAPI SOAP service.
//!
//! Only the single `purgeRequest` RPC is used, so the envelope is written
//! by hand instead of going through a WSDL toolchain.

use super::{PurgeBackend, ResponseKind};
use crate::{
    credentials::PasswordCredentials,
    error::Result,
    models::{CcuapiResult, PurgeResponse, PurgeResult},
    options::{ApiVersion, PurgeOptions},
    target::Target,
};
use http::header::{ACCEPT, CONTENT_TYPE};
use regex::Regex;
use std::{collections::HashMap, sync::LazyLock};
use tracing::instrument;
use url::Url;

static RESULT_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"<(?:[\w-]+:)?(resultCode|resultMsg|sessionID|estTime|uriIndex)\b[^>]*?(?:/>|>([^<]*)</)",
    )
    .expect("static regex is valid")
});

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#x([0-9a-fA-F]+)|#([0-9]+)|(lt|gt|quot|apos|amp));")
        .expect("static regex is valid")
});

#[derive(Debug)]
pub(crate) struct CcuapiClient {
    client: reqwest::Client,
    endpoint: Url,
    credentials: PasswordCredentials,
}

impl CcuapiClient {
    pub(crate) fn new(client: reqwest::Client, endpoint: Url, credentials: PasswordCredentials) -> Self {
        Self {
            client,
            endpoint,
            credentials,
        }
    }
}

impl PurgeBackend for CcuapiClient {
    fn api_version(&self) -> ApiVersion {
        ApiVersion::Ccuapi
    }

    #[instrument(skip_all, fields(targets = batch.len()))]
    async fn submit(&self, batch: &[Target], options: &PurgeOptions) -> Result<PurgeResult> {
        let envelope = purge_request_envelope(&self.credentials, &options.to_ccuapi_options(), batch);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header(ACCEPT, "text/xml")
            .header("soapaction", "\"\"")
            .body(envelope)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let response = parse_purge_result(&body).map(PurgeResponse::Ccuapi);

        Ok(PurgeResult {
            status,
            body,
            response,
        })
    }

    /// A 200 response can still carry a rejected request in its result code.
    fn classify(&self, result: &PurgeResult) -> ResponseKind {
        if result.status.is_success() && result.ccuapi().is_some_and(CcuapiResult::is_accepted) {
            ResponseKind::Accepted
        } else {
            ResponseKind::Failed
        }
    }
}

/// `purgeRequest(name, pwd, network, opt[], uri[])`, the network parameter
/// is deprecated and has to be empty.
pub(crate) fn purge_request_envelope(
    credentials: &PasswordCredentials,
    options: &[String],
    targets: &[Target],
) -> String {
    let mut envelope = String::from(concat!(
        r#"<?xml version="1.0" encoding="UTF-8"?>"#,
        r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/""#,
        r#" xmlns:soapenc="http://schemas.xmlsoap.org/soap/encoding/""#,
        r#" xmlns:xsd="http://www.w3.org/2001/XMLSchema""#,
        r#" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance""#,
        r#" xmlns:pur="http://www.akamai.com/purge">"#,
        r#"<soapenv:Body>"#,
        r#"<pur:purgeRequest soapenv:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">"#,
    ));

    envelope.push_str(&format!(
        r#"<name xsi:type="xsd:string">{}</name><pwd xsi:type="xsd:string">{}</pwd><network xsi:type="xsd:string"></network>"#,
        escape_xml(&credentials.username),
        escape_xml(&credentials.password),
    ));
    write_string_array(&mut envelope, "opt", options.iter().map(String::as_str));
    write_string_array(&mut envelope, "uri", targets.iter().map(Target::as_str));

    envelope.push_str("</pur:purgeRequest></soapenv:Body></soapenv:Envelope>");
    envelope
}

fn write_string_array<'a>(out: &mut String, name: &str, items: impl ExactSizeIterator<Item = &'a str>) {
    out.push_str(&format!(
        r#"<{name} xsi:type="soapenc:Array" soapenc:arrayType="xsd:string[{}]">"#,
        items.len()
    ));
    for item in items {
        out.push_str(r#"<item xsi:type="xsd:string">"#);
        out.push_str(&escape_xml(item));
        out.push_str("</item>");
    }
    out.push_str(&format!("</{name}>"));
}

pub(crate) fn parse_purge_result(body: &str) -> Option<CcuapiResult> {
    let mut fields: HashMap<&str, &str> = HashMap::new();
    for captures in RESULT_FIELD.captures_iter(body) {
        let name = captures.get(1)?.as_str();
        let value = captures.get(2).map_or("", |m| m.as_str().trim());
        fields.entry(name).or_insert(value);
    }

    let number = |name: &str| -> Option<i64> { fields.get(name)?.parse().ok() };

    Some(CcuapiResult {
        result_code: number("resultCode")?.try_into().ok()?,
        result_msg: unescape_xml(fields.get("resultMsg").copied().unwrap_or_default()),
        session_id: fields
            .get("sessionID")
            .filter(|value| !value.is_empty())
            .map(|value| value.to_string()),
        est_time: number("estTime"),
        uri_index: number("uriIndex"),
    })
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Decodes the predefined entities and character references in one pass, so
/// `&amp;lt;` stays `&lt;`. Unknown entities are kept as they are.
fn unescape_xml(value: &str) -> String {
    ENTITY
        .replace_all(value, |captures: &regex::Captures<'_>| {
            let decoded = if let Some(hex) = captures.get(1) {
                u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
            } else if let Some(decimal) = captures.get(2) {
                decimal.as_str().parse().ok().and_then(char::from_u32)
            } else {
                match captures.get(3).map(|m| m.as_str()) {
                    Some("lt") => Some('<'),
                    Some("gt") => Some('>'),
                    Some("quot") => Some('"'),
                    Some("apos") => Some('\''),
                    Some("amp") => Some('&'),
                    _ => None,
                }
            };
            decoded.map_or_else(|| captures[0].to_string(), String::from)
        })
        .into_owned()
}
