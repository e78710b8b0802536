//! aws-gateway - thin gateways over the AWS SDK for DynamoDB, S3, SNS and SQS,
//! plus helpers for functions triggered by S3 events.
//!
//! Every gateway has the same shape:
//! 1. Build a service handle from [`ConnectionParams`], falling back to the
//!    ambient AWS environment for anything left unset
//! 2. Obtain a resource reference (table, bucket, topic, queue) from the handle
//! 3. Issue operations against the reference
//!
//! Each operation is one SDK call. Failures are classified into
//! [`GatewayError`], logged where they happen and returned; nothing is retried
//! beyond what the SDK itself does.
//!
//! # Example
//!
//! ```no_run
//! use aws_gateway::ConnectionParams;
//! use aws_gateway::sqs::{QueueService, ReceiveOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     aws_gateway::setup_logging();
//!
//!     let params = ConnectionParams::new().with_region("eu-west-1");
//!     let sqs = QueueService::connect(&params).await?;
//!     let queue = sqs.queue("ingest-jobs").await?;
//!
//!     for message in queue.receive(&ReceiveOptions::default()).await? {
//!         println!("{}", message.body);
//!         queue.delete(&message).await?;
//!     }
//!
//!     Ok(())
//! }
//! ```
pub mod core;
pub mod dynamodb;
pub mod errors;
pub mod lambda;
pub mod s3;
pub mod sns;
pub mod sqs;
pub mod utils;

pub use crate::core::{ConnectionParams, ConstructionPath, CredentialResolver, Gateway};
pub use errors::{GatewayError, Result, Service};

/// Configure structured logging with JSON output.
///
/// Honours `RUST_LOG` and defaults to `info`. Calling it more than once is
/// harmless; only the first call installs a subscriber.
///
/// # Example
///
/// ```
/// aws_gateway::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
