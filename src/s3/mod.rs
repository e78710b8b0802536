//! Object-store gateway: buckets, object transfer and presigned URLs on S3.

pub mod bucket;

use std::collections::VecDeque;
use std::time::Duration;

use aws_config::SdkConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use futures::stream::{self, BoxStream, StreamExt};
use tracing::info;

use crate::core::classify::{Classify, report};
use crate::core::{ConnectionParams, CredentialResolver, Gateway};
use crate::errors::{GatewayError, Result, Service};

pub use bucket::{Bucket, default_download_path};

/// Lifetime of a presigned URL when the caller does not choose one.
pub const DEFAULT_PRESIGN_TTL: Duration = Duration::from_secs(900);

/// The one region that rejects an explicit location constraint.
const DEFAULT_BUCKET_REGION: &str = "us-east-1";

/// Location constraint to send when creating a bucket in `region`.
#[must_use]
pub fn location_constraint(region: Option<&str>) -> Option<BucketLocationConstraint> {
    region
        .filter(|r| !r.is_empty() && *r != DEFAULT_BUCKET_REGION)
        .map(BucketLocationConstraint::from)
}

/// Service handle for S3.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    client: Client,
}

impl Gateway for ObjectStore {
    const SERVICE: Service = Service::S3;

    /// Custom endpoints (LocalStack, MinIO) get path-style addressing, since
    /// `<bucket>.localhost` rarely resolves.
    fn from_sdk_config(config: &SdkConfig) -> Self {
        let s3_config = aws_sdk_s3::config::Builder::from(config)
            .force_path_style(config.endpoint_url().is_some())
            .build();
        Self::from_client(Client::from_conf(s3_config))
    }
}

impl ObjectStore {
    /// # Errors
    ///
    /// See [`crate::core::connect`].
    pub async fn connect(params: &ConnectionParams) -> Result<Self> {
        crate::core::connect(params).await
    }

    /// # Errors
    ///
    /// See [`crate::core::connect`].
    pub async fn connect_with(
        params: &ConnectionParams,
        resolver: &dyn CredentialResolver,
    ) -> Result<Self> {
        crate::core::connect_with(params, resolver).await
    }

    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// A reference to `name`. No request is made.
    #[must_use]
    pub fn bucket(&self, name: &str) -> Bucket {
        Bucket::new(self.client.clone(), name)
    }

    /// Names of all buckets owned by the caller, following continuation
    /// tokens page by page. Nothing is requested until the stream is polled;
    /// each call starts a new listing.
    pub fn bucket_names(&self) -> BoxStream<'static, Result<String>> {
        let pages = self.client.list_buckets().into_paginator().send();
        stream::unfold((pages, VecDeque::new()), |(mut pages, mut names)| async move {
            loop {
                if let Some(name) = names.pop_front() {
                    return Some((Ok(name), (pages, names)));
                }
                match pages.next().await? {
                    Ok(page) => names.extend(
                        page.buckets
                            .unwrap_or_default()
                            .into_iter()
                            .filter_map(|bucket| bucket.name),
                    ),
                    Err(e) => {
                        let err = Err::<String, _>(e).classify(Service::S3, "list_buckets");
                        return Some((err, (pages, names)));
                    }
                }
            }
        })
        .boxed()
    }

    /// Creates a bucket, in `region` when one is given.
    ///
    /// # Errors
    ///
    /// Returns whatever `CreateBucket` returns.
    pub async fn create_bucket(&self, name: &str, region: Option<&str>) -> Result<Bucket> {
        info!(bucket = name, region = region.unwrap_or(""), "Creating bucket");
        let configuration = location_constraint(region).map(|constraint| {
            CreateBucketConfiguration::builder()
                .location_constraint(constraint)
                .build()
        });

        self.client
            .create_bucket()
            .bucket(name)
            .set_create_bucket_configuration(configuration)
            .send()
            .await
            .classify(Service::S3, "create_bucket")?;
        Ok(self.bucket(name))
    }

    /// Signs a GET for `bucket_name/key` valid for `ttl`. The object is not
    /// checked for existence.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `ttl` is zero or longer than seven days.
    pub async fn presigned_url(&self, bucket_name: &str, key: &str, ttl: Duration) -> Result<String> {
        info!(bucket = bucket_name, key, ttl_secs = ttl.as_secs(), "Generating presigned URL");
        if ttl.is_zero() {
            return Err(report(GatewayError::InvalidConfig(
                "presign TTL must be longer than zero".to_string(),
            )));
        }
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|e| report(GatewayError::InvalidConfig(format!("presign TTL {ttl:?}: {e}"))))?;

        let request = self
            .client
            .get_object()
            .bucket(bucket_name)
            .key(key)
            .presigned(presigning)
            .await
            .classify(Service::S3, "presign_get_object")?;
        Ok(request.uri().to_string())
    }
}
