//! Function-platform helpers: trigger-event field extraction and local invocation.

pub mod harness;
pub mod s3_event;

pub use harness::invoke_local;
pub use s3_event::{
    S3ObjectRef, bucket_name_from_s3_event, object_key_from_s3_event, object_ref_from_s3_event,
};
