//! Container registry coordinates and credentials.
//!
//! Both come from the CI platform's variable store, never from `geezer.toml`:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `CONTAINER_REGISTRY_URL` | registry host component of the image tag |
//! | `CONTAINER_REGISTRY` | namespace (user or organization) |
//! | `CONTAINER_REGISTRY_USER` | login user |
//! | `CONTAINER_REGISTRY_PASS` | login password or token |

use std::fmt;

use secrecy::SecretString;

pub const REGISTRY_URL_VAR: &str = "CONTAINER_REGISTRY_URL";
pub const REGISTRY_NAMESPACE_VAR: &str = "CONTAINER_REGISTRY";
pub const REGISTRY_USER_VAR: &str = "CONTAINER_REGISTRY_USER";
pub const REGISTRY_PASS_VAR: &str = "CONTAINER_REGISTRY_PASS";

/// Where the image is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCoordinates {
    pub url: String,
    pub namespace: String,
}

impl RegistryCoordinates {
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> crate::Result<Self> {
        Ok(Self {
            url: required(&lookup, REGISTRY_URL_VAR)?,
            namespace: required(&lookup, REGISTRY_NAMESPACE_VAR)?,
        })
    }

    /// Shell-variable form, expanded by the CI job's shell at run time.
    pub fn placeholders() -> Self {
        Self {
            url: format!("${{{REGISTRY_URL_VAR}}}"),
            namespace: format!("${{{REGISTRY_NAMESPACE_VAR}}}"),
        }
    }

    /// `<url>/<namespace>/<binary>:latest`
    pub fn image_tag(&self, binary: &str) -> String {
        format!(
            "{url}/{namespace}/{binary}:latest",
            url = self.url.trim_end_matches('/'),
            namespace = self.namespace.trim_matches('/'),
        )
    }
}

/// Login credentials for the registry host.
#[derive(Clone)]
pub struct RegistryCredentials {
    pub user: String,
    pub password: SecretString,
}

impl fmt::Debug for RegistryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryCredentials")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl RegistryCredentials {
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> crate::Result<Self> {
        Ok(Self {
            user: required(&lookup, REGISTRY_USER_VAR)?,
            password: SecretString::from(required(&lookup, REGISTRY_PASS_VAR)?),
        })
    }
}

fn env_lookup(key: &str) -> Option<String> {
    // arch-lint: allow(no-silent-result-drop) reason="an unset variable is reported as MissingEnvVar by the caller"
    std::env::var(key).ok()
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> crate::Result<String> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| crate::Error::MissingEnvVar(key.to_owned()))
}
