//! Ambient credential and region resolution.
//!
//! Handle construction never reads the environment directly. When a caller
//! leaves the key pair or the region unset, it asks a [`CredentialResolver`].
//! Credentials come back as a provider rather than a snapshot, so expiring
//! ambient credentials (instance metadata, ECS, web identity) keep refreshing
//! for the life of the handle.

use async_trait::async_trait;
use aws_config::Region;
use aws_config::default_provider::credentials::DefaultCredentialsChain;
use aws_config::default_provider::region::DefaultRegionChain;
use aws_credential_types::Credentials;
use aws_credential_types::provider::SharedCredentialsProvider;

#[async_trait]
pub trait CredentialResolver: Send + Sync {
    /// A provider for the ambient environment's credentials, or `None` if no
    /// source is configured. The handle asks it once up front and keeps it.
    async fn resolve_credentials(&self) -> Option<SharedCredentialsProvider>;

    /// Region from the ambient environment, or `None` if nothing is configured.
    async fn resolve_region(&self) -> Option<Region>;
}

/// The AWS default provider chains: environment variables, shared profile
/// files, web identity, ECS and EC2 instance metadata.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultChainResolver;

#[async_trait]
impl CredentialResolver for DefaultChainResolver {
    async fn resolve_credentials(&self) -> Option<SharedCredentialsProvider> {
        let chain = DefaultCredentialsChain::builder().build().await;
        Some(SharedCredentialsProvider::new(chain))
    }

    async fn resolve_region(&self) -> Option<Region> {
        DefaultRegionChain::builder().build().region().await
    }
}

/// Fixed answers, for embedding applications that manage credentials
/// themselves and for tests that must not touch the network.
#[derive(Debug, Default, Clone)]
pub struct StaticResolver {
    credentials: Option<Credentials>,
    region: Option<Region>,
}

impl StaticResolver {
    #[must_use]
    pub fn new(credentials: Option<Credentials>, region: Option<Region>) -> Self {
        Self {
            credentials,
            region,
        }
    }

    /// A resolver that knows nothing, as on a host with no AWS configuration.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_keys(access_key: &str, secret_key: &str) -> Self {
        Self {
            credentials: Some(static_credentials(access_key, secret_key)),
            region: None,
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(Region::new(region.into()));
        self
    }
}

#[async_trait]
impl CredentialResolver for StaticResolver {
    async fn resolve_credentials(&self) -> Option<SharedCredentialsProvider> {
        self.credentials.clone().map(SharedCredentialsProvider::new)
    }

    async fn resolve_region(&self) -> Option<Region> {
        self.region.clone()
    }
}

pub(crate) fn static_credentials(access_key: &str, secret_key: &str) -> Credentials {
    Credentials::new(access_key, secret_key, None, None, "aws-gateway-static")
}
