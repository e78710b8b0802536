use std::time::Duration;

use aws_gateway::core::StaticResolver;
use aws_gateway::s3::{DEFAULT_PRESIGN_TTL, ObjectStore};
use aws_gateway::{ConnectionParams, GatewayError};

async fn offline_store() -> ObjectStore {
    let params = ConnectionParams::new()
        .with_region("us-east-1")
        .with_credentials("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY");
    ObjectStore::connect_with(&params, &StaticResolver::empty())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_presigned_url_carries_ttl_and_target() {
    let store = offline_store().await;
    let url = store
        .presigned_url("report-bucket", "monthly/summary.pdf", DEFAULT_PRESIGN_TTL)
        .await
        .unwrap();

    assert!(url.starts_with("https://"), "{url}");
    assert!(url.contains("report-bucket"), "{url}");
    assert!(url.contains("monthly/summary.pdf"), "{url}");
    assert!(url.contains("X-Amz-Expires=900"), "{url}");
    assert!(url.contains("X-Amz-Signature="), "{url}");
}

#[tokio::test]
async fn test_presigned_url_custom_ttl() {
    let store = offline_store().await;
    let url = store
        .presigned_url("report-bucket", "a.txt", Duration::from_secs(60))
        .await
        .unwrap();

    assert!(url.contains("X-Amz-Expires=60"), "{url}");
}

#[tokio::test]
async fn test_presigned_url_rejects_bad_ttl() {
    let store = offline_store().await;

    let too_long = store
        .presigned_url("report-bucket", "a.txt", Duration::from_secs(8 * 24 * 60 * 60))
        .await;
    assert!(matches!(too_long, Err(GatewayError::InvalidConfig(_))));

    let zero = store
        .presigned_url("report-bucket", "a.txt", Duration::ZERO)
        .await;
    assert!(matches!(zero, Err(GatewayError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_bucket_reference_needs_no_request() {
    let store = offline_store().await;
    let bucket = store.bucket("does-not-exist-anywhere");
    assert_eq!(bucket.name(), "does-not-exist-anywhere");
}
