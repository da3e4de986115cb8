use super::PurgeBackend;
use crate::{
    error::{Error, Result},
    models::{PurgeResponse, PurgeResult, PurgeStatus, QueueLength, RestPurgeResponse},
    options::{ApiVersion, PurgeOptions},
    target::Target,
};
use reqwest::StatusCode;
use std::collections::VecDeque;
use tokio::sync::Mutex;

const ACCEPTED_BODY: &str = r#"{"httpStatus":201,"detail":"Request accepted","estimatedSeconds":5,"purgeId":"mock-purge-id","supportId":"mock-support-id"}"#;

/// Records every submitted batch and answers with queued responses.
///
/// Once the queued responses run out, every batch is accepted.
#[derive(Debug)]
pub struct MockBackend {
    api: ApiVersion,
    responses: Mutex<VecDeque<(StatusCode, String)>>,
    pub submitted: Mutex<Vec<Vec<Target>>>,
    pub queue_length: Mutex<Option<QueueLength>>,
}

impl MockBackend {
    pub fn new(api: ApiVersion) -> Self {
        Self {
            api,
            responses: Mutex::default(),
            submitted: Mutex::default(),
            queue_length: Mutex::default(),
        }
    }

    pub async fn push_response(&self, status: StatusCode, body: impl Into<String>) {
        self.responses.lock().await.push_back((status, body.into()));
    }

    pub async fn submitted(&self) -> Vec<Vec<Target>> {
        self.submitted.lock().await.clone()
    }

    /// only the v2 API has status and queue endpoints
    fn require_v2(&self, operation: &'static str) -> Result<()> {
        if self.api == ApiVersion::V2 {
            Ok(())
        } else {
            Err(Error::UnsupportedOperation {
                operation,
                api: self.api,
            })
        }
    }
}

impl PurgeBackend for MockBackend {
    fn api_version(&self) -> ApiVersion {
        self.api
    }

    async fn submit(&self, batch: &[Target], _options: &PurgeOptions) -> Result<PurgeResult> {
        self.submitted.lock().await.push(batch.to_vec());

        let (status, body) = self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| (StatusCode::CREATED, ACCEPTED_BODY.to_string()));

        let response = serde_json::from_str::<RestPurgeResponse>(&body)
            .ok()
            .map(PurgeResponse::Rest);

        Ok(PurgeResult {
            status,
            body,
            response,
        })
    }

    async fn check_status(&self, reference: &str) -> Result<PurgeStatus> {
        self.require_v2("check_status")?;
        Ok(PurgeStatus {
            http_status: Some(200),
            purge_id: reference.rsplit('/').next().map(ToString::to_string),
            purge_status: Some("Done".into()),
            progress_uri: Some(reference.to_string()),
            ..Default::default()
        })
    }

    async fn check_queue_length(&self) -> Result<QueueLength> {
        self.require_v2("check_queue_length")?;
        Ok(self.queue_length.lock().await.clone().unwrap_or_default())
    }
}
