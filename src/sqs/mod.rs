//! Queue gateway: queue lookup, send, long-poll receive and delete on SQS.

pub mod consumer;

use std::collections::HashMap;

use aws_config::SdkConfig;
use aws_sdk_sqs::Client;
use aws_sdk_sqs::types::{Message, MessageSystemAttributeName};
use futures::stream::{self, BoxStream, StreamExt};
use tracing::{debug, info, warn};

use crate::core::classify::Classify;
use crate::core::{ConnectionParams, CredentialResolver, Gateway};
use crate::errors::{Result, Service};

pub use consumer::{ConsumeSummary, QueueConsumer};

pub const DEFAULT_MAX_MESSAGES: i32 = 10;
pub const DEFAULT_WAIT_SECONDS: i32 = 20;

/// Parameters for one long-poll receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveOptions {
    pub max_messages: i32,
    pub wait_seconds: i32,
    /// System attributes to return with each message; `"All"` for every one.
    pub attribute_names: Vec<String>,
}

impl Default for ReceiveOptions {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
            wait_seconds: DEFAULT_WAIT_SECONDS,
            attribute_names: vec!["All".to_string()],
        }
    }
}

impl ReceiveOptions {
    #[must_use]
    pub fn with_max_messages(mut self, max_messages: i32) -> Self {
        self.max_messages = max_messages;
        self
    }

    #[must_use]
    pub fn with_wait_seconds(mut self, wait_seconds: i32) -> Self {
        self.wait_seconds = wait_seconds;
        self
    }

    #[must_use]
    pub fn with_attribute_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attribute_names = names.into_iter().map(Into::into).collect();
        self
    }

    fn system_attribute_names(&self) -> Vec<MessageSystemAttributeName> {
        self.attribute_names
            .iter()
            .map(|name| MessageSystemAttributeName::from(name.as_str()))
            .collect()
    }
}

/// A message taken off a queue, with what is needed to delete it later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub queue_url: String,
    pub message_id: Option<String>,
    pub receipt_handle: String,
    pub body: String,
    pub attributes: HashMap<String, String>,
}

impl ReceivedMessage {
    fn from_sdk(queue_url: &str, message: Message) -> Option<Self> {
        let Some(receipt_handle) = message.receipt_handle else {
            warn!(queue = queue_url, "Received a message without a receipt handle; skipping");
            return None;
        };
        let attributes = message
            .attributes
            .unwrap_or_default()
            .into_iter()
            .map(|(name, value)| (name.as_str().to_string(), value))
            .collect();

        Some(Self {
            queue_url: queue_url.to_string(),
            message_id: message.message_id,
            receipt_handle,
            body: message.body.unwrap_or_default(),
            attributes,
        })
    }
}

/// Service handle for SQS.
#[derive(Debug, Clone)]
pub struct QueueService {
    client: Client,
}

impl Gateway for QueueService {
    const SERVICE: Service = Service::Sqs;

    fn from_sdk_config(config: &SdkConfig) -> Self {
        Self::from_client(Client::new(config))
    }
}

impl QueueService {
    /// # Errors
    ///
    /// See [`crate::core::connect`].
    pub async fn connect(params: &ConnectionParams) -> Result<Self> {
        crate::core::connect(params).await
    }

    /// # Errors
    ///
    /// See [`crate::core::connect`].
    pub async fn connect_with(
        params: &ConnectionParams,
        resolver: &dyn CredentialResolver,
    ) -> Result<Self> {
        crate::core::connect_with(params, resolver).await
    }

    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Looks a queue up by name (not ARN).
    ///
    /// # Errors
    ///
    /// `NotFound` if no queue has that name.
    pub async fn queue(&self, queue_name: &str) -> Result<Queue> {
        let output = self
            .client
            .get_queue_url()
            .queue_name(queue_name)
            .send()
            .await
            .classify(Service::Sqs, "get_queue_url")?;
        let url = output.queue_url.unwrap_or_default();
        debug!(queue = queue_name, url = %url, "Resolved queue URL");
        Ok(Queue {
            client: self.client.clone(),
            name: queue_name.to_string(),
            url,
        })
    }

    /// URLs of every queue visible to this handle, page by page.
    pub fn queue_urls(&self) -> BoxStream<'static, Result<String>> {
        let pages = self.client.list_queues().into_paginator().items().send();
        stream::unfold(pages, |mut pages| async move {
            let next = pages.next().await?;
            Some((next.classify(Service::Sqs, "list_queues"), pages))
        })
        .boxed()
    }
}

/// Reference to one SQS queue.
#[derive(Debug, Clone)]
pub struct Queue {
    client: Client,
    name: String,
    url: String,
}

impl Queue {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Enqueues one message and returns its id.
    ///
    /// # Errors
    ///
    /// Returns whatever `SendMessage` returns.
    pub async fn send(&self, body: &str) -> Result<Option<String>> {
        let output = self
            .client
            .send_message()
            .queue_url(&self.url)
            .message_body(body)
            .send()
            .await
            .classify(Service::Sqs, "send_message")?;
        Ok(output.message_id)
    }

    /// Long-polls for up to `options.max_messages` messages, waiting at most
    /// `options.wait_seconds` when the queue is empty.
    ///
    /// # Errors
    ///
    /// Returns whatever `ReceiveMessage` returns.
    pub async fn receive(&self, options: &ReceiveOptions) -> Result<Vec<ReceivedMessage>> {
        debug!(
            queue = %self.name,
            max_messages = options.max_messages,
            wait_seconds = options.wait_seconds,
            "Receiving messages"
        );
        let output = self
            .client
            .receive_message()
            .queue_url(&self.url)
            .max_number_of_messages(options.max_messages)
            .wait_time_seconds(options.wait_seconds)
            .set_message_system_attribute_names(Some(options.system_attribute_names()))
            .send()
            .await
            .classify(Service::Sqs, "receive_message")?;

        let messages: Vec<_> = output
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|message| ReceivedMessage::from_sdk(&self.url, message))
            .collect();
        info!(queue = %self.name, count = messages.len(), "Received messages");
        Ok(messages)
    }

    /// Removes one received message so it is not redelivered.
    ///
    /// # Errors
    ///
    /// Returns whatever `DeleteMessage` returns.
    pub async fn delete(&self, message: &ReceivedMessage) -> Result<()> {
        self.client
            .delete_message()
            .queue_url(&self.url)
            .receipt_handle(&message.receipt_handle)
            .send()
            .await
            .classify(Service::Sqs, "delete_message")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receive_defaults() {
        let options = ReceiveOptions::default();
        assert_eq!(options.max_messages, 10);
        assert_eq!(options.wait_seconds, 20);
        assert_eq!(options.attribute_names, vec!["All".to_string()]);
        assert_eq!(
            options.system_attribute_names(),
            vec![MessageSystemAttributeName::All]
        );
    }

    #[test]
    fn message_without_receipt_handle_is_dropped() {
        let message = Message::builder().body("hello").build();
        assert!(ReceivedMessage::from_sdk("https://queue", message).is_none());
    }

    #[test]
    fn message_fields_are_carried_over() {
        let message = Message::builder()
            .message_id("m-1")
            .receipt_handle("rh-1")
            .body("hello")
            .attributes(MessageSystemAttributeName::ApproximateReceiveCount, "1")
            .build();

        let received = ReceivedMessage::from_sdk("https://queue", message).unwrap();

        assert_eq!(received.queue_url, "https://queue");
        assert_eq!(received.message_id.as_deref(), Some("m-1"));
        assert_eq!(received.receipt_handle, "rh-1");
        assert_eq!(received.body, "hello");
        assert_eq!(
            received.attributes.get("ApproximateReceiveCount").map(String::as_str),
            Some("1")
        );
    }
}
