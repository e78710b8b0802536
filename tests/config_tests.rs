use std::collections::HashMap;

use aws_gateway::core::config::{
    ACCESS_KEY_VAR, ENDPOINT_URL_VAR, REGION_VAR, SECRET_KEY_VAR,
};
use aws_gateway::{ConnectionParams, ConstructionPath, GatewayError};

#[test]
fn test_construction_path_table() {
    let cases = [
        (ConnectionParams::new(), ConstructionPath::Ambient),
        (
            ConnectionParams::new().with_region("eu-west-1"),
            ConstructionPath::RegionOnly,
        ),
        (
            ConnectionParams::new().with_credentials("AKIDEXAMPLE", "secret"),
            ConstructionPath::KeysOnly,
        ),
        (
            ConnectionParams::new()
                .with_region("eu-west-1")
                .with_credentials("AKIDEXAMPLE", "secret"),
            ConstructionPath::RegionAndKeys,
        ),
    ];

    for (params, expected) in cases {
        assert_eq!(params.construction_path().unwrap(), expected, "{params:?}");
    }
}

#[test]
fn test_empty_strings_count_as_absent() {
    let params = ConnectionParams {
        region: Some(String::new()),
        access_key: Some(" ".to_string()),
        secret_key: Some(String::new()),
        endpoint_url: Some(String::new()),
    };
    assert_eq!(params.construction_path().unwrap(), ConstructionPath::Ambient);
    assert_eq!(params.region(), None);
    assert_eq!(params.keys(), None);
    assert_eq!(params.endpoint_url(), None);
}

#[test]
fn test_partial_credentials_rejected() {
    let only_access = ConnectionParams {
        access_key: Some("AKIDEXAMPLE".to_string()),
        ..ConnectionParams::default()
    };
    let only_secret = ConnectionParams {
        secret_key: Some("secret".to_string()),
        region: Some("us-west-2".to_string()),
        ..ConnectionParams::default()
    };

    for params in [only_access, only_secret] {
        match params.construction_path() {
            Err(GatewayError::InvalidConfig(msg)) => assert!(msg.contains("together")),
            other => panic!("Expected InvalidConfig, got {other:?}"),
        }
    }
}

#[test]
fn test_path_helpers() {
    assert!(ConstructionPath::RegionOnly.uses_explicit_region());
    assert!(!ConstructionPath::RegionOnly.uses_explicit_keys());
    assert!(ConstructionPath::KeysOnly.uses_explicit_keys());
    assert!(ConstructionPath::RegionAndKeys.uses_explicit_region());
    assert!(!ConstructionPath::Ambient.uses_explicit_region());
}

#[test]
fn test_from_lookup_reads_gateway_vars() {
    let vars: HashMap<&str, &str> = [
        (REGION_VAR, "ap-southeast-2"),
        (ACCESS_KEY_VAR, "AKIDEXAMPLE"),
        (SECRET_KEY_VAR, "secret"),
        (ENDPOINT_URL_VAR, "http://localhost:4566"),
    ]
    .into_iter()
    .collect();

    let params = ConnectionParams::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();

    assert_eq!(params.region(), Some("ap-southeast-2"));
    assert_eq!(params.keys(), Some(("AKIDEXAMPLE", "secret")));
    assert_eq!(params.endpoint_url(), Some("http://localhost:4566"));
}

#[test]
fn test_from_lookup_rejects_half_a_key_pair() {
    let result = ConnectionParams::from_lookup(|name| {
        (name == ACCESS_KEY_VAR).then(|| "AKIDEXAMPLE".to_string())
    });
    assert!(matches!(result, Err(GatewayError::InvalidConfig(_))));
}

#[test]
fn test_debug_redacts_secret_key() {
    let params = ConnectionParams::new().with_credentials("AKIDEXAMPLE", "super-secret-value");
    let rendered = format!("{params:?}");
    assert!(rendered.contains("AKIDEXAMPLE"));
    assert!(rendered.contains("<redacted>"));
    assert!(!rendered.contains("super-secret-value"));
}
