use std::fmt;

use thiserror::Error;

/// AWS service a gateway talks to. Used to pick the error-code table and to tag logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    DynamoDb,
    S3,
    Sns,
    Sqs,
}

impl Service {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Service::DynamoDb => "dynamodb",
            Service::S3 => "s3",
            Service::Sns => "sns",
            Service::Sqs => "sqs",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("No AWS credentials could be resolved: {0}")]
    Credentials(String),

    #[error("Invalid gateway configuration: {0}")]
    InvalidConfig(String),

    #[error("{service} {operation}: resource not found: {message}")]
    NotFound {
        service: Service,
        operation: &'static str,
        message: String,
    },

    #[error("{service} {operation} failed ({}): {message}", .code.as_deref().unwrap_or("no error code"))]
    Transport {
        service: Service,
        operation: &'static str,
        code: Option<String>,
        message: String,
    },

    #[error("Malformed trigger event: {0}")]
    MalformedEvent(String),

    #[error("Local file I/O failed: {0}")]
    Io(String),
}

impl GatewayError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound { .. })
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(error: std::io::Error) -> Self {
        GatewayError::Io(error.to_string())
    }
}

// SDK builders fail when a required field is missing; that is always a caller mistake.
impl From<aws_sdk_dynamodb::error::BuildError> for GatewayError {
    fn from(error: aws_sdk_dynamodb::error::BuildError) -> Self {
        GatewayError::InvalidConfig(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
