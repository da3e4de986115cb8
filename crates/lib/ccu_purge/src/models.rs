use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Body of a v2 / v3 purge response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestPurgeResponse {
    #[serde(default)]
    pub http_status: Option<u16>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub estimated_seconds: Option<u64>,
    #[serde(default)]
    pub purge_id: Option<String>,
    #[serde(default)]
    pub support_id: Option<String>,
    /// v2 only, where to poll for the purge status
    #[serde(default)]
    pub progress_uri: Option<String>,
    #[serde(default)]
    pub ping_after_seconds: Option<u64>,
}

/// Result of a CCUAPI `purgeRequest` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CcuapiResult {
    pub result_code: u32,
    pub result_msg: String,
    pub session_id: Option<String>,
    pub est_time: Option<i64>,
    pub uri_index: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CcuapiResultClass {
    /// 1xx
    Success,
    /// 2xx, the request was still accepted
    Warning,
    /// 3xx
    BadRequest,
    /// 4xx, only Akamai customer care can help
    ContactSupport,
    Unknown,
}

impl CcuapiResult {
    pub fn class(&self) -> CcuapiResultClass {
        match self.result_code {
            100..=199 => CcuapiResultClass::Success,
            200..=299 => CcuapiResultClass::Warning,
            300..=399 => CcuapiResultClass::BadRequest,
            400..=499 => CcuapiResultClass::ContactSupport,
            _ => CcuapiResultClass::Unknown,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(
            self.class(),
            CcuapiResultClass::Success | CcuapiResultClass::Warning
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeResponse {
    Rest(RestPurgeResponse),
    Ccuapi(CcuapiResult),
}

/// One response of the purge API, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeResult {
    pub status: StatusCode,
    /// raw response body
    pub body: String,
    /// `body`, decoded, when it had the expected format
    pub response: Option<PurgeResponse>,
}

impl PurgeResult {
    pub fn rest(&self) -> Option<&RestPurgeResponse> {
        match self.response {
            Some(PurgeResponse::Rest(ref response)) => Some(response),
            _ => None,
        }
    }

    pub fn ccuapi(&self) -> Option<&CcuapiResult> {
        match self.response {
            Some(PurgeResponse::Ccuapi(ref result)) => Some(result),
            _ => None,
        }
    }
}

/// What a single batch submission did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// nothing was pending, no request was sent
    Empty,
    Purged { result: PurgeResult, count: usize },
    /// the batch is back at the front of the pending queue
    RateLimited { result: PurgeResult, requeued: usize },
}

impl BatchOutcome {
    /// how many targets were accepted by the API
    pub fn count(&self) -> usize {
        match self {
            Self::Purged { count, .. } => *count,
            Self::Empty | Self::RateLimited { .. } => 0,
        }
    }

    pub fn result(&self) -> Option<&PurgeResult> {
        match self {
            Self::Purged { result, .. } | Self::RateLimited { result, .. } => Some(result),
            Self::Empty => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// v2 purge status, from the `progressUri` of a purge response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeStatus {
    #[serde(default)]
    pub http_status: Option<u16>,
    #[serde(default)]
    pub purge_id: Option<String>,
    /// `In-Progress` or `Done`
    #[serde(default)]
    pub purge_status: Option<String>,
    #[serde(default)]
    pub submitted_by: Option<String>,
    #[serde(default)]
    pub submission_time: Option<String>,
    #[serde(default)]
    pub completion_time: Option<String>,
    #[serde(default)]
    pub original_estimated_seconds: Option<u64>,
    #[serde(default)]
    pub original_queue_length: Option<u64>,
    #[serde(default)]
    pub ping_after_seconds: Option<u64>,
    #[serde(default)]
    pub progress_uri: Option<String>,
    #[serde(default)]
    pub support_id: Option<String>,
}

impl PurgeStatus {
    pub fn is_done(&self) -> bool {
        self.purge_status.as_deref() == Some("Done")
    }
}

/// v2 queue length.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueLength {
    #[serde(default)]
    pub http_status: Option<u16>,
    pub queue_length: u64,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub support_id: Option<String>,
}
