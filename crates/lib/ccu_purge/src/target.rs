use crate::error::{Error, Result};
use serde::Serialize;
use std::{fmt, str::FromStr};

/// A single url, ARL, cpcode or cache tag to invalidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bytes this target adds to a JSON `objects` list, including the separator.
    pub fn encoded_len(&self) -> usize {
        serde_json::to_string(&self.0).map_or(self.0.len() + 2, |encoded| encoded.len()) + 1
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::UnsupportedInput("empty purge target".into()));
        }
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(Error::UnsupportedInput(format!(
                "purge target {s:?} contains whitespace or control characters"
            )));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Target {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for Target {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Anything that knows its canonical absolute url, typically a model object
/// of the host application.
pub trait AbsoluteUrl {
    fn absolute_url(&self) -> String;
}

impl<T: AbsoluteUrl + ?Sized> AbsoluteUrl for &T {
    fn absolute_url(&self) -> String {
        (**self).absolute_url()
    }
}

/// Everything [`PurgeBatcher::add`](crate::PurgeBatcher::add) accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeInput {
    Url(String),
    Urls(Vec<String>),
    /// urls already resolved from [`AbsoluteUrl`] objects
    Resolved(Vec<String>),
    /// no input at all, always rejected
    Absent,
}

impl PurgeInput {
    pub fn object(object: &impl AbsoluteUrl) -> Self {
        Self::Resolved(vec![object.absolute_url()])
    }

    /// Resolve a whole collection, in iteration order.
    pub fn objects<I>(objects: I) -> Self
    where
        I: IntoIterator,
        I::Item: AbsoluteUrl,
    {
        Self::Resolved(objects.into_iter().map(|o| o.absolute_url()).collect())
    }

    /// Validate all urls, so that a bad one leaves the queue untouched.
    pub(crate) fn into_targets(self) -> Result<Vec<Target>> {
        let urls = match self {
            Self::Url(url) => vec![url],
            Self::Urls(urls) | Self::Resolved(urls) => urls,
            Self::Absent => {
                return Err(Error::UnsupportedInput(
                    "add a url, a list of urls, or objects with an absolute url".into(),
                ));
            }
        };

        urls.iter().map(|url| url.parse()).collect()
    }
}

impl From<&str> for PurgeInput {
    fn from(url: &str) -> Self {
        Self::Url(url.to_string())
    }
}

impl From<String> for PurgeInput {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}

impl From<&String> for PurgeInput {
    fn from(url: &String) -> Self {
        Self::Url(url.clone())
    }
}

impl From<Vec<String>> for PurgeInput {
    fn from(urls: Vec<String>) -> Self {
        Self::Urls(urls)
    }
}

impl From<Vec<&str>> for PurgeInput {
    fn from(urls: Vec<&str>) -> Self {
        Self::Urls(urls.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for PurgeInput {
    fn from(urls: &[&str]) -> Self {
        Self::Urls(urls.iter().map(|url| url.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PurgeInput {
    fn from(urls: [&str; N]) -> Self {
        Self::Urls(urls.iter().map(|url| url.to_string()).collect())
    }
}

impl<T: Into<PurgeInput>> From<Option<T>> for PurgeInput {
    fn from(input: Option<T>) -> Self {
        input.map_or(Self::Absent, Into::into)
    }
}
