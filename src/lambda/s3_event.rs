use percent_encoding::percent_decode_str;
use serde_json::Value;
use tracing::error;

use crate::errors::{GatewayError, Result};

/// Bucket and key of the object that triggered a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3ObjectRef {
    pub bucket: String,
    /// The key as it appears in the event, still URL-encoded.
    pub key: String,
}

impl S3ObjectRef {
    /// The key with the event's URL encoding removed (`+` for spaces, `%XX` escapes).
    ///
    /// # Errors
    ///
    /// Returns `MalformedEvent` if the escapes do not decode to UTF-8.
    ///
    /// # Examples
    ///
    /// ```
    /// use aws_gateway::lambda::S3ObjectRef;
    ///
    /// let object = S3ObjectRef {
    ///     bucket: "uploads".to_string(),
    ///     key: "reports/q1+summary%282%29.pdf".to_string(),
    /// };
    /// assert_eq!(object.decoded_key().unwrap(), "reports/q1 summary(2).pdf");
    /// ```
    pub fn decoded_key(&self) -> Result<String> {
        let plus_decoded = self.key.replace('+', " ");
        percent_decode_str(&plus_decoded)
            .decode_utf8()
            .map(|s| s.into_owned())
            .map_err(|e| malformed(&format!("object key {:?} is not valid UTF-8: {e}", self.key)))
    }
}

/// `Records[0].s3.<section>.<field>`, if it is a non-empty string.
fn first_record_field<'a>(event: &'a Value, section: &str, field: &str) -> Option<&'a str> {
    event
        .get("Records")
        .and_then(Value::as_array)
        .and_then(|records| records.first())
        .and_then(|record| record.get("s3"))
        .and_then(|s3| s3.get(section))
        .and_then(|section| section.get(field))
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

fn malformed(message: &str) -> GatewayError {
    error!("{}", message);
    GatewayError::MalformedEvent(message.to_string())
}

/// Bucket name of the object-created event that triggered the function.
///
/// # Errors
///
/// Returns `MalformedEvent` if there is no first record or it has no bucket name.
///
/// # Examples
///
/// ```
/// use aws_gateway::lambda::bucket_name_from_s3_event;
/// use serde_json::json;
///
/// let event = json!({"Records": [{"s3": {"bucket": {"name": "uploads"}, "object": {"key": "a.txt"}}}]});
/// assert_eq!(bucket_name_from_s3_event(&event).unwrap(), "uploads");
/// assert!(bucket_name_from_s3_event(&json!({"Records": []})).is_err());
/// ```
pub fn bucket_name_from_s3_event(event: &Value) -> Result<String> {
    first_record_field(event, "bucket", "name")
        .map(str::to_string)
        .ok_or_else(|| malformed("Event did not have a bucket name; cannot process event"))
}

/// Object key of the object-created event that triggered the function.
///
/// # Errors
///
/// Returns `MalformedEvent` if there is no first record or it has no object key.
pub fn object_key_from_s3_event(event: &Value) -> Result<String> {
    first_record_field(event, "object", "key")
        .map(str::to_string)
        .ok_or_else(|| malformed("Event did not have an object key; cannot process event"))
}

/// Bucket and key together.
///
/// # Errors
///
/// Returns `MalformedEvent` if either field is missing.
pub fn object_ref_from_s3_event(event: &Value) -> Result<S3ObjectRef> {
    Ok(S3ObjectRef {
        bucket: bucket_name_from_s3_event(event)?,
        key: object_key_from_s3_event(event)?,
    })
}
