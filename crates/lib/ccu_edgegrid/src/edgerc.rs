//! Reader for `.edgerc` credential files.
//!
//! ```text
//! [default]
//! host = akab-xxxx.purge.akamaiapis.net
//! client_token = akab-...
//! client_secret = ...
//! access_token = akab-...
//! ```

use crate::EdgeGridCredentials;
use anyhow::{Context as _, Result, bail};
use std::{collections::HashMap, fmt, fs, path::Path};
use tracing::debug;

/// The key/value pairs of one `[section]`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EdgercSection(HashMap<String, String>);

impl EdgercSection {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

// values are secrets, only the keys are shown.
impl fmt::Debug for EdgercSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.0.keys().collect();
        keys.sort();
        f.debug_tuple("EdgercSection").field(&keys).finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Edgerc {
    sections: HashMap<String, EdgercSection>,
}

impl Edgerc {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("could not read edgerc file {}", path.display()))?;
        let edgerc = Self::parse(&content)
            .with_context(|| format!("invalid edgerc file {}", path.display()))?;
        debug!(path = %path.display(), sections = edgerc.sections.len(), "loaded edgerc");
        Ok(edgerc)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut sections: HashMap<String, EdgercSection> = HashMap::new();
        let mut current: Option<String> = None;

        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let name = name.trim().to_string();
                sections.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                bail!("line {}: expected `key = value`", idx + 1);
            };
            let Some(ref section) = current else {
                bail!("line {}: value outside of a [section]", idx + 1);
            };

            sections
                .entry(section.clone())
                .or_default()
                .0
                .insert(key.trim().to_string(), unquote(value.trim()).to_string());
        }

        Ok(Self { sections })
    }

    pub fn section(&self, name: &str) -> Option<&EdgercSection> {
        self.sections.get(name)
    }

    /// EdgeGrid credentials from the given section, all four keys are required.
    pub fn credentials(&self, name: &str) -> Result<EdgeGridCredentials> {
        let Some(section) = self.section(name) else {
            bail!("section [{name}] not found in edgerc");
        };

        let required = |key: &str| {
            section
                .get(key)
                .map(str::to_string)
                .with_context(|| format!("edgerc section [{name}] is missing {key}"))
        };

        let mut credentials = EdgeGridCredentials::new(
            required("host")?,
            required("client_token")?,
            required("client_secret")?,
            required("access_token")?,
        );

        if let Some(max_body) = section.get("max_body") {
            credentials.max_body = max_body
                .parse()
                .with_context(|| format!("invalid max_body in edgerc section [{name}]"))?;
        }

        Ok(credentials)
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const EDGERC: &str = r#"
# purge credentials
[default]
host = akab-host-xxx.purge.akamaiapis.net
client_token = akab-client-token
client_secret = "c2VjcmV0=="
access_token = akab-access-token

[legacy]
; only used for the old SOAP api
username = ccuapi_user
password = 1234567

[broken]
host = akab-other-host.purge.akamaiapis.net
max_body = lots
"#;

    #[test]
    fn test_parse_credentials() -> Result<()> {
        let edgerc = Edgerc::parse(EDGERC)?;
        let credentials = edgerc.credentials("default")?;

        assert_eq!(credentials.host, "akab-host-xxx.purge.akamaiapis.net");
        assert_eq!(credentials.client_token, "akab-client-token");
        assert_eq!(credentials.client_secret, "c2VjcmV0==");
        assert_eq!(credentials.access_token, "akab-access-token");
        assert_eq!(credentials.max_body, EdgeGridCredentials::DEFAULT_MAX_BODY);
        Ok(())
    }

    #[test]
    fn test_other_keys() -> Result<()> {
        let edgerc = Edgerc::parse(EDGERC)?;
        let legacy = edgerc.section("legacy").unwrap();
        assert_eq!(legacy.get("username"), Some("ccuapi_user"));
        assert_eq!(legacy.get("password"), Some("1234567"));
        assert!(edgerc.credentials("legacy").is_err());
        Ok(())
    }

    #[test]
    fn test_missing_section() -> Result<()> {
        let edgerc = Edgerc::parse(EDGERC)?;
        assert!(edgerc.section("nope").is_none());
        assert!(edgerc.credentials("nope").is_err());
        Ok(())
    }

    #[test]
    fn test_incomplete_section() -> Result<()> {
        let edgerc = Edgerc::parse(EDGERC)?;
        let err = edgerc.credentials("broken").unwrap_err();
        assert!(err.to_string().contains("client_token"));
        Ok(())
    }

    #[test]
    fn test_value_outside_section() {
        assert!(Edgerc::parse("host = foo\n[default]\n").is_err());
    }

    #[test]
    fn test_garbage_line() {
        assert!(Edgerc::parse("[default]\nhost\n").is_err());
    }

    #[test]
    fn test_from_path() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(EDGERC.as_bytes())?;

        let edgerc = Edgerc::from_path(file.path())?;
        assert!(edgerc.section("default").is_some());
        Ok(())
    }

    #[test]
    fn test_debug_hides_values() -> Result<()> {
        let edgerc = Edgerc::parse(EDGERC)?;
        let debug = format!("{edgerc:?}");
        assert!(debug.contains("client_secret"));
        assert!(!debug.contains("c2VjcmV0"));
        Ok(())
    }
}
