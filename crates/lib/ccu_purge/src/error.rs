use crate::{options::ApiVersion, target::Target};
use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("unsupported purge input: {0}")]
    UnsupportedInput(String),
    /// Any non-success response that isn't rate limiting.
    ///
    /// The batch was already taken from the pending queue and is not put back.
    #[error("purge request failed with {status}: {body}")]
    PurgeRequestFailed { status: StatusCode, body: String },
    #[error("{operation} is not supported by the {api} API")]
    UnsupportedOperation {
        operation: &'static str,
        api: ApiVersion,
    },
    /// The target was taken off the pending queue, it can't be sent with
    /// this limit at all.
    #[error("target of {target_len} bytes can never fit into a batch of {limit} bytes")]
    TargetTooLarge {
        target: Target,
        target_len: usize,
        limit: usize,
    },
    #[error("Invalid API url: {0}")]
    InvalidApiUrl(#[from] url::ParseError),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// return the HTTP status code of any error inside, if there is any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::PurgeRequestFailed { status, .. } => Some(*status),
            Self::Http(error) => error.status(),
            _ => None,
        }
    }
}
