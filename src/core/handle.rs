use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sdk_dynamodb::error::DisplayErrorContext;
use tracing::{debug, error, info};

use super::config::{ConnectionParams, ConstructionPath};
use super::credentials::{CredentialResolver, DefaultChainResolver, static_credentials};
use crate::errors::{GatewayError, Result, Service};

/// A service handle built from an [`SdkConfig`].
///
/// Every gateway in this crate follows the same shape: built once from
/// connection parameters, then used to obtain resource references.
pub trait Gateway: Sized {
    const SERVICE: Service;

    fn from_sdk_config(config: &SdkConfig) -> Self;
}

/// Builds a gateway, falling back to the AWS default provider chain for
/// anything `params` leaves unset.
///
/// # Errors
///
/// `InvalidConfig` for a partial key pair, `Credentials` when no key pair is
/// given and none can be resolved from the environment.
pub async fn connect<G: Gateway>(params: &ConnectionParams) -> Result<G> {
    connect_with(params, &DefaultChainResolver).await
}

/// Builds a gateway with an explicit ambient resolver.
///
/// # Errors
///
/// See [`connect`].
pub async fn connect_with<G: Gateway>(
    params: &ConnectionParams,
    resolver: &dyn CredentialResolver,
) -> Result<G> {
    let config = sdk_config(G::SERVICE, params, resolver).await?;
    Ok(G::from_sdk_config(&config))
}

/// Assembles the shared SDK configuration for one of the four construction paths.
///
/// # Errors
///
/// See [`connect`].
pub async fn sdk_config(
    service: Service,
    params: &ConnectionParams,
    resolver: &dyn CredentialResolver,
) -> Result<SdkConfig> {
    let path = params.construction_path()?;

    let credentials = match params.keys() {
        Some((access_key, secret_key)) => {
            SharedCredentialsProvider::new(static_credentials(access_key, secret_key))
        }
        None => ambient_credentials(service, resolver).await?,
    };

    let region = match params.region() {
        Some(region) => Some(Region::new(region.to_string())),
        None => resolver.resolve_region().await,
    };

    let mut builder = SdkConfig::builder()
        .behavior_version(BehaviorVersion::latest())
        .credentials_provider(credentials);
    builder.set_region(region.clone());
    if let Some(endpoint_url) = params.endpoint_url() {
        builder.set_endpoint_url(Some(endpoint_url.to_string()));
    }

    log_construction(service, path, region.as_ref(), params.endpoint_url());
    Ok(builder.build())
}

/// Asks the resolver for a provider and checks that it yields credentials
/// now. The provider itself goes on the handle, so later calls get refreshed
/// credentials rather than this first answer.
async fn ambient_credentials(
    service: Service,
    resolver: &dyn CredentialResolver,
) -> Result<SharedCredentialsProvider> {
    let missing = |detail: String| {
        error!(%service, "No Credentials Found for AWS: {}", detail);
        GatewayError::Credentials(format!(
            "no explicit keys were given for {service} and the ambient environment has none ({detail})"
        ))
    };

    let provider = resolver
        .resolve_credentials()
        .await
        .ok_or_else(|| missing("no credential source configured".to_string()))?;
    provider
        .provide_credentials()
        .await
        .map_err(|e| missing(DisplayErrorContext(&e).to_string()))?;
    debug!(%service, "Resolved ambient AWS credentials");
    Ok(provider)
}

fn log_construction(
    service: Service,
    path: ConstructionPath,
    region: Option<&Region>,
    endpoint_url: Option<&str>,
) {
    info!(
        %service,
        ?path,
        region = region.map_or("<sdk default>", |r| r.as_ref()),
        endpoint_url = endpoint_url.unwrap_or("<aws>"),
        "Creating service handle"
    );
}
