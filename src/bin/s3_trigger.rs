// Lambda entry point for functions subscribed to S3 object-created events.

use aws_gateway::lambda::object_ref_from_s3_event;
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde_json::{Value, json};
use tracing::info;

async fn function_handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let object = object_ref_from_s3_event(&event.payload)?;
    let key = object.decoded_key()?;
    info!(bucket = %object.bucket, key = %key, "Received object-created event");

    Ok(json!({
        "bucket": object.bucket,
        "key": key,
    }))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    aws_gateway::setup_logging();
    run(service_fn(function_handler)).await?;
    Ok(())
}
