use std::future::Future;

use tracing::{error, info};

use super::{Queue, ReceiveOptions, ReceivedMessage};
use crate::errors::Result;

/// Outcome of one [`QueueConsumer::poll_once`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConsumeSummary {
    pub received: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Receives batches from a queue and hands each message to a handler.
///
/// A message is deleted only after its handler succeeds. Failed messages
/// stay on the queue and come back once their visibility timeout expires.
#[derive(Debug, Clone)]
pub struct QueueConsumer {
    queue: Queue,
    options: ReceiveOptions,
}

impl QueueConsumer {
    #[must_use]
    pub fn new(queue: Queue) -> Self {
        Self {
            queue,
            options: ReceiveOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ReceiveOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Runs one receive and processes the batch in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the receive itself fails. Handler failures are
    /// logged and counted, not returned.
    pub async fn poll_once<F, Fut>(&self, handler: F) -> Result<ConsumeSummary>
    where
        F: Fn(ReceivedMessage) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let messages = self.queue.receive(&self.options).await?;
        let mut summary = ConsumeSummary {
            received: messages.len(),
            ..ConsumeSummary::default()
        };

        for message in messages {
            let message_id = message.message_id.clone().unwrap_or_default();
            match handler(message.clone()).await {
                Ok(()) => match self.queue.delete(&message).await {
                    Ok(()) => summary.deleted += 1,
                    Err(_) => summary.failed += 1,
                },
                Err(e) => {
                    error!(
                        queue = %self.queue.name(),
                        message_id = %message_id,
                        "Message handler failed: {:#}",
                        e
                    );
                    summary.failed += 1;
                }
            }
        }

        info!(
            queue = %self.queue.name(),
            received = summary.received,
            deleted = summary.deleted,
            failed = summary.failed,
            "Finished polling queue"
        );
        Ok(summary)
    }
}
