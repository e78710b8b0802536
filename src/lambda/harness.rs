use std::future::Future;

use lambda_runtime::{Context, Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};

/// Runs a function handler in-process with `payload` and a default context.
///
/// Useful for exercising a handler without the Lambda runtime API. A failure
/// is logged and returned unchanged.
///
/// # Errors
///
/// Whatever the handler returns.
pub async fn invoke_local<F, Fut, R>(handler: F, payload: Value) -> Result<R, Error>
where
    F: FnOnce(LambdaEvent<Value>) -> Fut,
    Fut: Future<Output = Result<R, Error>>,
{
    let event = LambdaEvent::new(payload, Context::default());
    info!("Invoking function handler locally");
    handler(event).await.inspect_err(|e| {
        error!("Lambda failed due to error: {}", e);
    })
}
