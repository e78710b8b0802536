//! Error translation shared by every gateway operation.
//!
//! Each SDK result goes through [`Classify::classify`], which maps the
//! service's error code onto [`GatewayError`], logs the failure, and hands
//! it back to the caller. Nothing is retried or swallowed here.

use aws_sdk_dynamodb::config::http::HttpResponse;
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use tracing::{error, warn};

use crate::errors::{GatewayError, Result, Service};
use crate::utils::truncate::truncate_for_log;

const DYNAMODB_NOT_FOUND: &[&str] = &["ResourceNotFoundException"];
const S3_NOT_FOUND: &[&str] = &["NoSuchKey", "NoSuchBucket", "NotFound", "404"];
const SNS_NOT_FOUND: &[&str] = &["NotFound"];
const SQS_NOT_FOUND: &[&str] = &[
    "AWS.SimpleQueueService.NonExistentQueue",
    "QueueDoesNotExist",
];

/// Error codes that mean "the target does not exist" for `service`.
#[must_use]
pub fn not_found_codes(service: Service) -> &'static [&'static str] {
    match service {
        Service::DynamoDb => DYNAMODB_NOT_FOUND,
        Service::S3 => S3_NOT_FOUND,
        Service::Sns => SNS_NOT_FOUND,
        Service::Sqs => SQS_NOT_FOUND,
    }
}

/// The object store reports some misses only through the HTTP status.
fn status_means_not_found(service: Service, status: Option<u16>) -> bool {
    service == Service::S3 && status == Some(404)
}

/// Maps an error code and HTTP status onto the error taxonomy.
#[must_use]
pub fn classify(
    service: Service,
    operation: &'static str,
    code: Option<&str>,
    status: Option<u16>,
    description: &str,
) -> GatewayError {
    let message = truncate_for_log(description);
    let not_found = code.is_some_and(|c| not_found_codes(service).contains(&c))
        || status_means_not_found(service, status);

    if not_found {
        GatewayError::NotFound {
            service,
            operation,
            message,
        }
    } else {
        GatewayError::Transport {
            service,
            operation,
            code: code.map(str::to_string),
            message,
        }
    }
}

/// Logs an already-classified failure at the point it was detected.
pub(crate) fn report(err: GatewayError) -> GatewayError {
    match &err {
        GatewayError::NotFound {
            service, operation, ..
        } => warn!(%service, operation, "{}", err),
        GatewayError::Transport {
            service,
            operation,
            code,
            ..
        } => error!(
            %service,
            operation,
            code = code.as_deref().unwrap_or(""),
            "{}",
            err
        ),
        _ => error!("{}", err),
    }
    err
}

/// Builds, logs and returns a transport failure that did not come from an
/// SDK call (body streaming, presigning setup and the like).
pub(crate) fn fail(
    service: Service,
    operation: &'static str,
    err: impl std::fmt::Display,
) -> GatewayError {
    report(GatewayError::Transport {
        service,
        operation,
        code: None,
        message: truncate_for_log(&err.to_string()),
    })
}

pub trait Classify<T> {
    /// Translates an SDK failure into a logged [`GatewayError`].
    ///
    /// # Errors
    ///
    /// `NotFound` or `Transport`, depending on the service's error code table.
    fn classify(self, service: Service, operation: &'static str) -> Result<T>;
}

impl<T, E> Classify<T> for std::result::Result<T, SdkError<E, HttpResponse>>
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    fn classify(self, service: Service, operation: &'static str) -> Result<T> {
        self.map_err(|err| {
            let status = err.raw_response().map(|r| r.status().as_u16());
            let description = DisplayErrorContext(&err).to_string();
            report(classify(
                service,
                operation,
                err.code(),
                status,
                &description,
            ))
        })
    }
}
