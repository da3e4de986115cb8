use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The CCU API flavour a batcher talks to.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    /// legacy SOAP service
    Ccuapi,
    /// REST, JSON bodies, basic auth
    V2,
    /// REST, JSON bodies, EdgeGrid auth
    #[default]
    V3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Remove,
    Invalidate,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Arl,
    Cpcode,
    Url,
    Tag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Staging,
    Production,
}

/// Parameters applied to every batch of one batcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeOptions {
    pub action: Action,
    pub content_type: ContentType,
    pub network: Network,
    /// legacy CCUAPI notification address, ignored by the REST APIs.
    pub notification_email: Option<String>,
}

/// Caller-supplied options, unset fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    pub action: Option<Action>,
    pub content_type: Option<ContentType>,
    pub network: Option<Network>,
    pub notification_email: Option<String>,
}

impl OptionOverrides {
    pub fn action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn network(mut self, network: Network) -> Self {
        self.network = Some(network);
        self
    }

    pub fn notification_email(mut self, email: impl Into<String>) -> Self {
        self.notification_email = Some(email.into());
        self
    }
}

impl PurgeOptions {
    pub fn defaults_for(api: ApiVersion) -> Self {
        match api {
            ApiVersion::Ccuapi | ApiVersion::V2 => Self {
                action: Action::Remove,
                content_type: ContentType::Arl,
                network: Network::Production,
                notification_email: None,
            },
            ApiVersion::V3 => Self {
                action: Action::Invalidate,
                content_type: ContentType::Url,
                network: Network::Production,
                notification_email: None,
            },
        }
    }

    pub fn merge(mut self, overrides: &OptionOverrides) -> Self {
        if let Some(action) = overrides.action {
            self.action = action;
        }
        if let Some(content_type) = overrides.content_type {
            self.content_type = content_type;
        }
        if let Some(network) = overrides.network {
            self.network = network;
        }
        if let Some(ref email) = overrides.notification_email {
            self.notification_email = Some(email.clone());
        }
        self
    }

    /// reject combinations the given API can't express.
    pub fn validate(&self, api: ApiVersion) -> Result<()> {
        let (actions, content_types): (&[Action], &[ContentType]) = match api {
            ApiVersion::Ccuapi | ApiVersion::V2 => (
                &[Action::Remove, Action::Invalidate],
                &[ContentType::Arl, ContentType::Cpcode],
            ),
            // `arl` targets are plain urls in v3
            ApiVersion::V3 => (
                &[Action::Invalidate, Action::Delete],
                &[
                    ContentType::Url,
                    ContentType::Arl,
                    ContentType::Cpcode,
                    ContentType::Tag,
                ],
            ),
        };

        if !actions.contains(&self.action) {
            return Err(Error::Configuration(format!(
                "action `{}` is not supported by the {api} API",
                self.action
            )));
        }
        if !content_types.contains(&self.content_type) {
            return Err(Error::Configuration(format!(
                "content type `{}` is not supported by the {api} API",
                self.content_type
            )));
        }
        Ok(())
    }

    /// CCUAPI expects its options as `key=value` strings.
    pub fn to_ccuapi_options(&self) -> Vec<String> {
        let mut options = vec![
            format!("action={}", self.action),
            format!("type={}", self.content_type),
            format!("domain={}", self.network),
        ];
        if let Some(ref email) = self.notification_email {
            options.push(format!("email-notification-name={email}"));
        }
        options
    }

    /// the `{type}` segment of the v3 purge path.
    pub(crate) fn v3_content_type(&self) -> &'static str {
        match self.content_type {
            ContentType::Arl | ContentType::Url => "url",
            ContentType::Cpcode => "cpcode",
            ContentType::Tag => "tag",
        }
    }
}
