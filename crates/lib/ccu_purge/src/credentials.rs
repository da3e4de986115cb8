use crate::{
    Config,
    error::{Error, Result},
    options::ApiVersion,
};
use ccu_edgegrid::{EdgeGridCredentials, Edgerc};
use std::fmt;
use tracing::debug;

/// username / password for the CCUAPI and v2 APIs.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for PasswordCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Password(PasswordCredentials),
    EdgeGrid(EdgeGridCredentials),
}

impl Credentials {
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Password(PasswordCredentials {
            username: username.into(),
            password: password.into(),
        })
    }

    fn fits(&self, api: ApiVersion) -> bool {
        matches!(
            (self, api),
            (Self::Password(_), ApiVersion::Ccuapi | ApiVersion::V2)
                | (Self::EdgeGrid(_), ApiVersion::V3)
        )
    }

    /// Every field is set to something other than whitespace.
    pub fn is_complete(&self) -> bool {
        let fields = match self {
            Self::Password(credentials) => vec![&credentials.username, &credentials.password],
            Self::EdgeGrid(credentials) => vec![
                &credentials.host,
                &credentials.client_token,
                &credentials.client_secret,
                &credentials.access_token,
            ],
        };
        fields.into_iter().all(|value| !value.trim().is_empty())
    }

    /// Find credentials for `api`.
    ///
    /// An explicit value wins, then the config, then the `.edgerc` file.
    /// Sources with only partial credentials are skipped.
    pub fn resolve(api: ApiVersion, explicit: Option<Credentials>, config: &Config) -> Result<Self> {
        if let Some(credentials) = explicit {
            if !credentials.fits(api) {
                return Err(Error::Configuration(format!(
                    "the {api} API can't be used with the given credentials"
                )));
            }
            if credentials.is_complete() {
                return Ok(credentials);
            }
            debug!(%api, "ignoring incomplete explicit credentials");
        }

        let providers: [(&str, Provider); 2] = [("config", from_config), ("edgerc", from_edgerc)];
        for (name, provider) in providers {
            match provider(api, config)? {
                Some(credentials) if credentials.is_complete() => {
                    debug!(source = name, %api, "resolved purge credentials");
                    return Ok(credentials);
                }
                Some(_) => debug!(source = name, %api, "skipping incomplete purge credentials"),
                None => {}
            }
        }

        Err(Error::Configuration(match api {
            ApiVersion::Ccuapi | ApiVersion::V2 => format!(
                "no username and password configured for the {api} API, \
                 set AKAMAI_CCUAPI_USERNAME and AKAMAI_CCUAPI_PASSWORD"
            ),
            ApiVersion::V3 => "no EdgeGrid credentials configured for the v3 API, \
                 set AKAMAI_CCU_HOST, AKAMAI_CCU_CLIENT_TOKEN, AKAMAI_CCU_CLIENT_SECRET \
                 and AKAMAI_CCU_ACCESS_TOKEN, or provide an edgerc file"
                .to_string(),
        }))
    }
}

impl From<PasswordCredentials> for Credentials {
    fn from(credentials: PasswordCredentials) -> Self {
        Self::Password(credentials)
    }
}

impl From<EdgeGridCredentials> for Credentials {
    fn from(credentials: EdgeGridCredentials) -> Self {
        Self::EdgeGrid(credentials)
    }
}

type Provider = fn(ApiVersion, &Config) -> Result<Option<Credentials>>;

fn from_config(api: ApiVersion, config: &Config) -> Result<Option<Credentials>> {
    Ok(match api {
        ApiVersion::Ccuapi | ApiVersion::V2 => match (&config.username, &config.password) {
            (Some(username), Some(password)) => Some(Credentials::password(username, password)),
            _ => None,
        },
        ApiVersion::V3 => match (
            &config.host,
            &config.client_token,
            &config.client_secret,
            &config.access_token,
        ) {
            (Some(host), Some(client_token), Some(client_secret), Some(access_token)) => Some(
                EdgeGridCredentials::new(host, client_token, client_secret, access_token).into(),
            ),
            _ => None,
        },
    })
}

fn from_edgerc(api: ApiVersion, config: &Config) -> Result<Option<Credentials>> {
    let Some(ref path) = config.edgerc_path else {
        return Ok(None);
    };
    if !path.is_file() {
        debug!(path = %path.display(), "no edgerc file");
        return Ok(None);
    }

    let edgerc = Edgerc::from_path(path).map_err(|err| Error::Configuration(format!("{err:#}")))?;
    let section_name = &config.edgerc_section;

    let Some(section) = edgerc.section(section_name) else {
        debug!(path = %path.display(), section = section_name, "edgerc section not found");
        return Ok(None);
    };

    Ok(match api {
        ApiVersion::Ccuapi | ApiVersion::V2 => match (section.get("username"), section.get("password")) {
            (Some(username), Some(password)) => Some(Credentials::password(username, password)),
            _ => None,
        },
        ApiVersion::V3 => match edgerc.credentials(section_name) {
            Ok(credentials) => Some(credentials.into()),
            Err(err) => {
                debug!(?err, "incomplete EdgeGrid credentials in edgerc");
                None
            }
        },
    })
}
