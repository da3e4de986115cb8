use super::PurgeBackend;
use crate::{
    credentials::PasswordCredentials,
    error::{Error, Result},
    models::{PurgeResponse, PurgeResult, PurgeStatus, QueueLength, RestPurgeResponse},
    options::{Action, ApiVersion, ContentType, Network, PurgeOptions},
    target::Target,
};
use ccu_edgegrid::{EdgeGridCredentials, EdgeGridSigner};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};
use url::Url;

const V2_QUEUE_PATH: &str = "/ccu/v2/queues/default";

/// Keep every response, parse the body when it's the usual purge JSON.
async fn read_result(response: reqwest::Response) -> Result<PurgeResult> {
    let status = response.status();
    let body = response.text().await?;
    let response = serde_json::from_str::<RestPurgeResponse>(&body)
        .ok()
        .map(PurgeResponse::Rest);

    Ok(PurgeResult {
        status,
        body,
        response,
    })
}

/// For the read-only endpoints, anything but success is an error.
async fn read_json<T>(response: reqwest::Response) -> Result<T>
where
    T: DeserializeOwned,
{
    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(Error::PurgeRequestFailed { status, body })
    }
}

#[derive(Serialize)]
struct V2PurgeRequest<'a> {
    objects: &'a [Target],
    action: Action,
    #[serde(rename = "type")]
    content_type: ContentType,
    domain: Network,
}

#[derive(Debug)]
pub(crate) struct V2Client {
    client: reqwest::Client,
    api_host: Url,
    credentials: PasswordCredentials,
}

impl V2Client {
    pub(crate) fn new(client: reqwest::Client, api_host: Url, credentials: PasswordCredentials) -> Self {
        Self {
            client,
            api_host,
            credentials,
        }
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
    }
}

impl PurgeBackend for V2Client {
    fn api_version(&self) -> ApiVersion {
        ApiVersion::V2
    }

    #[instrument(skip_all, fields(targets = batch.len()))]
    async fn submit(&self, batch: &[Target], options: &PurgeOptions) -> Result<PurgeResult> {
        let response = self
            .client
            .post(self.api_host.join(V2_QUEUE_PATH)?)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .json(&V2PurgeRequest {
                objects: batch,
                action: options.action,
                content_type: options.content_type,
                domain: options.network,
            })
            .send()
            .await?;

        read_result(response).await
    }

    /// `reference` is the `progressUri` of an earlier purge response.
    ///
    /// It has to resolve to the API host, the request carries our credentials.
    #[instrument(skip(self))]
    async fn check_status(&self, reference: &str) -> Result<PurgeStatus> {
        let url = self.api_host.join(reference)?;
        if url.origin() != self.api_host.origin() {
            return Err(Error::UnsupportedInput(format!(
                "status reference {reference:?} points outside of the API host"
            )));
        }

        let response = self.get(url).send().await?;
        read_json(response).await
    }

    #[instrument(skip(self))]
    async fn check_queue_length(&self) -> Result<QueueLength> {
        let response = self.get(self.api_host.join(V2_QUEUE_PATH)?).send().await?;
        let queue_length: QueueLength = read_json(response).await?;
        debug!(queue_length = queue_length.queue_length, "fetched purge queue length");
        Ok(queue_length)
    }
}

#[derive(Serialize)]
struct V3PurgeRequest<'a> {
    objects: &'a [Target],
}

#[derive(Debug)]
pub(crate) struct V3Client {
    client: reqwest::Client,
    base_url: Url,
    signer: EdgeGridSigner,
}

impl V3Client {
    pub(crate) fn new(client: reqwest::Client, credentials: EdgeGridCredentials) -> Result<Self> {
        Ok(Self {
            client,
            base_url: credentials.base_url()?,
            signer: EdgeGridSigner::new(credentials),
        })
    }
}

impl PurgeBackend for V3Client {
    fn api_version(&self) -> ApiVersion {
        ApiVersion::V3
    }

    // https://techdocs.akamai.com/purge-cache/reference/api
    #[instrument(skip_all, fields(targets = batch.len(), action = %options.action, network = %options.network))]
    async fn submit(&self, batch: &[Target], options: &PurgeOptions) -> Result<PurgeResult> {
        let url = self.base_url.join(&format!(
            "/ccu/v3/{}/{}/{}",
            options.action,
            options.v3_content_type(),
            options.network
        ))?;

        let mut request = self
            .client
            .post(url)
            .json(&V3PurgeRequest { objects: batch })
            .build()?;
        self.signer.sign(&mut request)?;

        let response = self.client.execute(request).await?;
        read_result(response).await
    }
}
