use std::env;
use std::fmt;

use crate::errors::{GatewayError, Result};

pub const REGION_VAR: &str = "GATEWAY_REGION";
pub const ACCESS_KEY_VAR: &str = "GATEWAY_ACCESS_KEY_ID";
pub const SECRET_KEY_VAR: &str = "GATEWAY_SECRET_ACCESS_KEY";
pub const ENDPOINT_URL_VAR: &str = "GATEWAY_ENDPOINT_URL";

/// How a service handle gets built, decided only by which overrides are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionPath {
    /// Ambient region and ambient credentials.
    Ambient,
    /// Explicit region, ambient credentials.
    RegionOnly,
    /// Ambient region, explicit credentials.
    KeysOnly,
    /// Explicit region and explicit credentials.
    RegionAndKeys,
}

impl ConstructionPath {
    #[must_use]
    pub fn uses_explicit_region(self) -> bool {
        matches!(self, ConstructionPath::RegionOnly | ConstructionPath::RegionAndKeys)
    }

    #[must_use]
    pub fn uses_explicit_keys(self) -> bool {
        matches!(self, ConstructionPath::KeysOnly | ConstructionPath::RegionAndKeys)
    }
}

/// Optional overrides used when building a service handle.
///
/// Empty strings count as absent. Anything left unset falls back to the
/// ambient environment through a [`CredentialResolver`](super::credentials::CredentialResolver).
#[derive(Clone, Default)]
pub struct ConnectionParams {
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub endpoint_url: Option<String>,
}

impl ConnectionParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Reads overrides from the `GATEWAY_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if only one half of the key pair is set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a caller-supplied variable source.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if only one half of the key pair is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let params = Self {
            region: lookup(REGION_VAR),
            access_key: lookup(ACCESS_KEY_VAR),
            secret_key: lookup(SECRET_KEY_VAR),
            endpoint_url: lookup(ENDPOINT_URL_VAR),
        };
        params.construction_path()?;
        Ok(params)
    }

    #[must_use]
    pub fn region(&self) -> Option<&str> {
        non_empty(self.region.as_deref())
    }

    #[must_use]
    pub fn endpoint_url(&self) -> Option<&str> {
        non_empty(self.endpoint_url.as_deref())
    }

    /// The explicit key pair, if both halves are present.
    #[must_use]
    pub fn keys(&self) -> Option<(&str, &str)> {
        match (
            non_empty(self.access_key.as_deref()),
            non_empty(self.secret_key.as_deref()),
        ) {
            (Some(access), Some(secret)) => Some((access, secret)),
            _ => None,
        }
    }

    /// Picks the construction path.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when exactly one of access key / secret key is given.
    pub fn construction_path(&self) -> Result<ConstructionPath> {
        let has_access = non_empty(self.access_key.as_deref()).is_some();
        let has_secret = non_empty(self.secret_key.as_deref()).is_some();
        if has_access != has_secret {
            let missing = if has_access { "secret key" } else { "access key" };
            return Err(GatewayError::InvalidConfig(format!(
                "access key and secret key must be given together ({missing} is missing)"
            )));
        }

        Ok(match (self.region().is_some(), has_access) {
            (false, false) => ConstructionPath::Ambient,
            (true, false) => ConstructionPath::RegionOnly,
            (false, true) => ConstructionPath::KeysOnly,
            (true, true) => ConstructionPath::RegionAndKeys,
        })
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
