use std::collections::HashMap;

use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, PutRequest, TableStatus, WriteRequest};
use tracing::{debug, info, warn};

use crate::core::Classify;
use crate::core::classify::fail;
use crate::errors::{Result, Service};

/// One item, exactly as the SDK represents it.
pub type Record = HashMap<String, AttributeValue>;

/// `BatchWriteItem` accepts at most this many requests per call.
pub const BATCH_WRITE_LIMIT: usize = 25;

/// How many times unprocessed items from one chunk are sent again.
pub const MAX_UNPROCESSED_RESUBMITS: usize = 5;

/// Whether a table exists, and whether it has finished provisioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableState {
    pub exists: bool,
    pub active: bool,
}

impl TableState {
    #[must_use]
    pub fn absent() -> Self {
        Self {
            exists: false,
            active: false,
        }
    }

    /// State of a table the service described; only `ACTIVE` counts as ready.
    #[must_use]
    pub fn from_status(status: Option<&TableStatus>) -> Self {
        Self {
            exists: true,
            active: matches!(status, Some(TableStatus::Active)),
        }
    }
}

/// Reference to one DynamoDB table.
#[derive(Debug, Clone)]
pub struct Table {
    client: Client,
    name: String,
    status: Option<TableStatus>,
}

impl Table {
    pub(crate) fn new(client: Client, name: impl Into<String>, status: Option<TableStatus>) -> Self {
        Self {
            client,
            name: name.into(),
            status,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Status as of the call that produced this reference.
    #[must_use]
    pub fn status(&self) -> Option<&TableStatus> {
        self.status.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> TableState {
        TableState::from_status(self.status())
    }

    /// # Errors
    ///
    /// Returns an error if the `DeleteTable` call fails.
    pub async fn delete(self) -> Result<()> {
        info!(table = %self.name, "Deleting table");
        self.client
            .delete_table()
            .table_name(&self.name)
            .send()
            .await
            .classify(Service::DynamoDb, "delete_table")?;
        Ok(())
    }

    /// Inserts or replaces one item.
    ///
    /// # Errors
    ///
    /// Returns an error if the `PutItem` call fails.
    pub async fn put(&self, record: Record) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.name)
            .set_item(Some(record))
            .send()
            .await
            .classify(Service::DynamoDb, "put_item")?;
        Ok(())
    }

    /// Inserts or replaces many items through `BatchWriteItem`.
    ///
    /// Items are sent in chunks of [`BATCH_WRITE_LIMIT`]. Items the service
    /// reports as unprocessed are sent again, up to
    /// [`MAX_UNPROCESSED_RESUBMITS`] times per chunk.
    ///
    /// # Errors
    ///
    /// Returns an error if a batch call fails or items are still unprocessed
    /// after the last resubmit.
    pub async fn put_batch<I>(&self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = Record>,
    {
        let requests = records
            .into_iter()
            .map(|record| -> Result<WriteRequest> {
                let put = PutRequest::builder().set_item(Some(record)).build()?;
                Ok(WriteRequest::builder().put_request(put).build())
            })
            .collect::<Result<Vec<_>>>()?;

        let total = requests.len();
        for chunk in requests.chunks(BATCH_WRITE_LIMIT) {
            self.write_chunk(chunk.to_vec()).await?;
        }

        info!(table = %self.name, records = total, "Batch inserted records");
        Ok(total)
    }

    async fn write_chunk(&self, mut pending: Vec<WriteRequest>) -> Result<()> {
        for attempt in 0..=MAX_UNPROCESSED_RESUBMITS {
            if attempt > 0 {
                debug!(
                    table = %self.name,
                    attempt,
                    unprocessed = pending.len(),
                    "Resubmitting unprocessed batch items"
                );
            }
            let output = self
                .client
                .batch_write_item()
                .request_items(self.name.clone(), pending)
                .send()
                .await
                .classify(Service::DynamoDb, "batch_write_item")?;

            pending = output
                .unprocessed_items
                .and_then(|mut unprocessed| unprocessed.remove(&self.name))
                .unwrap_or_default();
            if pending.is_empty() {
                return Ok(());
            }
        }

        Err(fail(
            Service::DynamoDb,
            "batch_write_item",
            format!(
                "{} items in {} still unprocessed after {MAX_UNPROCESSED_RESUBMITS} resubmits",
                pending.len(),
                self.name
            ),
        ))
    }

    /// Removes the item identified by `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the `DeleteItem` call fails.
    pub async fn delete_record(&self, key: Record) -> Result<()> {
        self.client
            .delete_item()
            .table_name(&self.name)
            .set_key(Some(key))
            .send()
            .await
            .classify(Service::DynamoDb, "delete_item")?;
        Ok(())
    }

    /// Fetches the item identified by `key`, if there is one.
    ///
    /// # Errors
    ///
    /// Returns an error if the `GetItem` call fails.
    pub async fn get(&self, key: Record) -> Result<Option<Record>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.name)
            .set_key(Some(key))
            .send()
            .await
            .classify(Service::DynamoDb, "get_item")?;
        Ok(output.item)
    }

    /// Fetches each key in turn; keys with no item are skipped.
    ///
    /// # Errors
    ///
    /// Returns the first `GetItem` failure.
    pub async fn get_many<I>(&self, keys: I) -> Result<Vec<Record>>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut found = Vec::new();
        for key in keys {
            match self.get(key).await? {
                Some(item) => found.push(item),
                None => warn!(table = %self.name, "No item for requested key"),
            }
        }
        Ok(found)
    }
}
