use std::path::{Path, PathBuf};

use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier, ServerSideEncryption};
use tracing::{info, warn};

use crate::core::classify::{Classify, fail, report};
use crate::errors::{GatewayError, Result, Service};

/// `DeleteObjects` accepts at most this many keys per call.
pub const DELETE_OBJECTS_LIMIT: usize = 1000;

/// Where `download` writes when the caller gives no path: `./<key>`.
///
/// Built from the string so a key with a leading `/` stays under the current
/// directory; `Path::join` would replace the base with it.
#[must_use]
pub fn default_download_path(key: &str) -> PathBuf {
    PathBuf::from(format!("./{key}"))
}

/// Reference to one S3 bucket. Holding one says nothing about whether the
/// bucket exists; the first operation finds out.
#[derive(Debug, Clone)]
pub struct Bucket {
    client: Client,
    name: String,
}

impl Bucket {
    pub(crate) fn new(client: Client, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Deletes the bucket, first clearing its objects when `force` is set.
    ///
    /// Clearing is best-effort; if any object survives, the service rejects
    /// the bucket delete and that error is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if listing objects or the `DeleteBucket` call fails.
    pub async fn delete(self, force: bool) -> Result<()> {
        if force {
            self.delete_all_objects().await?;
        }
        info!(bucket = %self.name, "Deleting bucket");
        self.client
            .delete_bucket()
            .bucket(&self.name)
            .send()
            .await
            .classify(Service::S3, "delete_bucket")?;
        Ok(())
    }

    /// Deletes every object in the bucket and returns how many keys were removed.
    ///
    /// Per-key failures reported by `DeleteObjects` are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a `ListObjectsV2` or `DeleteObjects` call fails outright.
    pub async fn delete_all_objects(&self) -> Result<usize> {
        let mut keys = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.name)
            .into_paginator()
            .send();
        while let Some(page) = pages.next().await {
            let page = page.classify(Service::S3, "list_objects_v2")?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );
        }

        let mut removed = 0;
        for chunk in keys.chunks(DELETE_OBJECTS_LIMIT) {
            let objects = chunk
                .iter()
                .map(|key| ObjectIdentifier::builder().key(key).build())
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let delete = Delete::builder()
                .set_objects(Some(objects))
                .quiet(true)
                .build()?;

            let output = self
                .client
                .delete_objects()
                .bucket(&self.name)
                .delete(delete)
                .send()
                .await
                .classify(Service::S3, "delete_objects")?;

            for failure in output.errors() {
                warn!(
                    bucket = %self.name,
                    key = failure.key().unwrap_or(""),
                    code = failure.code().unwrap_or(""),
                    "Object was not deleted: {}",
                    failure.message().unwrap_or("")
                );
            }
            removed += chunk.len() - output.errors().len();
        }

        info!(bucket = %self.name, removed, "Cleared bucket");
        Ok(removed)
    }

    /// Uploads a local file to `key`. When `encryption` names an algorithm
    /// (`AES256`, `aws:kms`, ...), it is sent as the object's server-side
    /// encryption setting.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, otherwise whatever `PutObject` returns.
    pub async fn upload(
        &self,
        key: &str,
        local_path: impl AsRef<Path>,
        encryption: Option<&str>,
    ) -> Result<()> {
        let local_path = local_path.as_ref();
        info!(bucket = %self.name, key, path = %local_path.display(), "Uploading file");

        let body = ByteStream::from_path(local_path).await.map_err(|e| {
            report(GatewayError::Io(format!(
                "cannot read {}: {e}",
                local_path.display()
            )))
        })?;

        self.client
            .put_object()
            .bucket(&self.name)
            .key(key)
            .body(body)
            .set_server_side_encryption(encryption.map(ServerSideEncryption::from))
            .send()
            .await
            .classify(Service::S3, "put_object")?;
        Ok(())
    }

    /// Downloads `key` to `local_path`, or to `./<key>` when no path is given,
    /// creating parent directories as needed. Returns the path written.
    ///
    /// # Errors
    ///
    /// `NotFound` if the object does not exist, `Io` if the file cannot be written.
    pub async fn download(&self, key: &str, local_path: Option<&Path>) -> Result<PathBuf> {
        let target = local_path.map_or_else(|| default_download_path(key), Path::to_path_buf);
        info!(bucket = %self.name, key, path = %target.display(), "Downloading file");

        let output = self
            .client
            .get_object()
            .bucket(&self.name)
            .key(key)
            .send()
            .await
            .classify(Service::S3, "get_object")?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| fail(Service::S3, "get_object", e))?
            .into_bytes();

        write_file(&target, &data)
            .await
            .map_err(|e| report(GatewayError::Io(format!("cannot write {}: {e}", target.display()))))?;
        Ok(target)
    }
}

async fn write_file(target: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(target, data).await
}
