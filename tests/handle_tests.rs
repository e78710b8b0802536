use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use aws_config::Region;
use aws_credential_types::Credentials;
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{self, ProvideCredentials, SharedCredentialsProvider};
use aws_gateway::core::handle::sdk_config;
use aws_gateway::core::{StaticResolver, connect_with};
use aws_gateway::dynamodb::DocumentStore;
use aws_gateway::sqs::QueueService;
use aws_gateway::{ConnectionParams, CredentialResolver, GatewayError, Service};

/// Resolver that counts how often the ambient environment is consulted.
#[derive(Default)]
struct CountingResolver {
    credential_calls: AtomicUsize,
    region_calls: AtomicUsize,
}

#[async_trait]
impl CredentialResolver for CountingResolver {
    async fn resolve_credentials(&self) -> Option<SharedCredentialsProvider> {
        self.credential_calls.fetch_add(1, Ordering::SeqCst);
        Some(SharedCredentialsProvider::new(Credentials::new(
            "AMBIENTKEY",
            "ambient-secret",
            None,
            None,
            "test",
        )))
    }

    async fn resolve_region(&self) -> Option<Region> {
        self.region_calls.fetch_add(1, Ordering::SeqCst);
        Some(Region::new("ambient-region-1"))
    }
}

async fn access_key_of(config: &aws_config::SdkConfig) -> String {
    config
        .credentials_provider()
        .expect("credentials provider should be set")
        .provide_credentials()
        .await
        .expect("static credentials always resolve")
        .access_key_id()
        .to_string()
}

#[tokio::test]
async fn test_ambient_path_uses_resolver_for_both() {
    let resolver = CountingResolver::default();
    let config = sdk_config(Service::DynamoDb, &ConnectionParams::new(), &resolver)
        .await
        .unwrap();

    assert_eq!(config.region().map(|r| r.as_ref()), Some("ambient-region-1"));
    assert_eq!(access_key_of(&config).await, "AMBIENTKEY");
    assert_eq!(resolver.credential_calls.load(Ordering::SeqCst), 1);
    assert_eq!(resolver.region_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_region_only_falls_back_to_ambient_credentials() {
    let resolver = CountingResolver::default();
    let params = ConnectionParams::new().with_region("eu-central-1");
    let config = sdk_config(Service::S3, &params, &resolver).await.unwrap();

    assert_eq!(config.region().map(|r| r.as_ref()), Some("eu-central-1"));
    assert_eq!(access_key_of(&config).await, "AMBIENTKEY");
    assert_eq!(resolver.credential_calls.load(Ordering::SeqCst), 1);
    assert_eq!(resolver.region_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_keys_only_uses_ambient_region() {
    let resolver = CountingResolver::default();
    let params = ConnectionParams::new().with_credentials("EXPLICITKEY", "explicit-secret");
    let config = sdk_config(Service::Sns, &params, &resolver).await.unwrap();

    assert_eq!(config.region().map(|r| r.as_ref()), Some("ambient-region-1"));
    assert_eq!(access_key_of(&config).await, "EXPLICITKEY");
    assert_eq!(resolver.credential_calls.load(Ordering::SeqCst), 0);
    assert_eq!(resolver.region_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_region_and_keys_never_consult_resolver() {
    let resolver = CountingResolver::default();
    let params = ConnectionParams::new()
        .with_region("us-west-2")
        .with_credentials("EXPLICITKEY", "explicit-secret");
    let config = sdk_config(Service::Sqs, &params, &resolver).await.unwrap();

    assert_eq!(config.region().map(|r| r.as_ref()), Some("us-west-2"));
    assert_eq!(access_key_of(&config).await, "EXPLICITKEY");
    assert_eq!(resolver.credential_calls.load(Ordering::SeqCst), 0);
    assert_eq!(resolver.region_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_endpoint_override_is_applied() {
    let params = ConnectionParams::new()
        .with_region("us-east-1")
        .with_credentials("test", "test")
        .with_endpoint_url("http://localhost:4566");
    let config = sdk_config(Service::S3, &params, &StaticResolver::empty())
        .await
        .unwrap();

    assert_eq!(config.endpoint_url(), Some("http://localhost:4566"));
}

#[tokio::test]
async fn test_partial_keys_rejected_before_resolution() {
    let resolver = CountingResolver::default();
    let params = ConnectionParams {
        access_key: Some("AKIDEXAMPLE".to_string()),
        ..ConnectionParams::default()
    };

    let result = connect_with::<DocumentStore>(&params, &resolver).await;

    assert!(matches!(result, Err(GatewayError::InvalidConfig(_))));
    assert_eq!(resolver.credential_calls.load(Ordering::SeqCst), 0);
    assert_eq!(resolver.region_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_no_ambient_credentials_is_credentials_error() {
    let params = ConnectionParams::new().with_region("us-east-1");
    let result = QueueService::connect_with(&params, &StaticResolver::empty()).await;

    assert!(matches!(result, Err(GatewayError::Credentials(_))));
}

#[tokio::test]
async fn test_static_resolver_supplies_ambient_values() {
    let resolver = StaticResolver::with_keys("STATICKEY", "static-secret").with_region("sa-east-1");
    let config = sdk_config(Service::DynamoDb, &ConnectionParams::new(), &resolver)
        .await
        .unwrap();

    assert_eq!(config.region().map(|r| r.as_ref()), Some("sa-east-1"));
    assert_eq!(access_key_of(&config).await, "STATICKEY");
}

/// Hands out short-lived credentials with a fresh key on every call, like an
/// instance-metadata source would after each expiry.
#[derive(Debug, Clone, Default)]
struct RotatingProvider {
    calls: Arc<AtomicUsize>,
}

impl ProvideCredentials for RotatingProvider {
    fn provide_credentials<'a>(&'a self) -> provider::future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        provider::future::ProvideCredentials::ready(Ok(Credentials::new(
            format!("ROTATED{call}"),
            "rotating-secret",
            Some("session".to_string()),
            Some(SystemTime::now() + Duration::from_secs(60)),
            "rotating",
        )))
    }
}

struct RotatingResolver {
    provider: RotatingProvider,
}

#[async_trait]
impl CredentialResolver for RotatingResolver {
    async fn resolve_credentials(&self) -> Option<SharedCredentialsProvider> {
        Some(SharedCredentialsProvider::new(self.provider.clone()))
    }

    async fn resolve_region(&self) -> Option<Region> {
        Some(Region::new("us-east-1"))
    }
}

#[tokio::test]
async fn test_ambient_credentials_are_fetched_again_on_each_request() {
    let provider = RotatingProvider::default();
    let resolver = RotatingResolver {
        provider: provider.clone(),
    };
    let config = sdk_config(Service::Sqs, &ConnectionParams::new(), &resolver)
        .await
        .unwrap();

    // One call to check credentials exist while the handle is built.
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

    assert_eq!(access_key_of(&config).await, "ROTATED2");
    assert_eq!(access_key_of(&config).await, "ROTATED3");
    assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
}

#[derive(Debug)]
struct EmptyChain;

impl ProvideCredentials for EmptyChain {
    fn provide_credentials<'a>(&'a self) -> provider::future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        provider::future::ProvideCredentials::ready(Err(CredentialsError::not_loaded(
            "no providers in chain provided credentials",
        )))
    }
}

struct EmptyChainResolver;

#[async_trait]
impl CredentialResolver for EmptyChainResolver {
    async fn resolve_credentials(&self) -> Option<SharedCredentialsProvider> {
        Some(SharedCredentialsProvider::new(EmptyChain))
    }

    async fn resolve_region(&self) -> Option<Region> {
        None
    }
}

#[tokio::test]
async fn test_provider_with_nothing_to_give_fails_at_construction() {
    let result = DocumentStore::connect_with(&ConnectionParams::new(), &EmptyChainResolver).await;

    match result {
        Err(GatewayError::Credentials(message)) => {
            assert!(message.contains("no providers in chain"), "{message}");
        }
        other => panic!("Unexpected result: {:?}", other.map(|_| ())),
    }
}
