//! Notification gateway: topic references and publishing on SNS.

use aws_config::SdkConfig;
use aws_sdk_sns::Client;
use futures::stream::{self, BoxStream, StreamExt};
use tracing::{debug, info};

use crate::core::classify::Classify;
use crate::core::{ConnectionParams, CredentialResolver, Gateway};
use crate::errors::{Result, Service};

/// Service handle for SNS.
#[derive(Debug, Clone)]
pub struct NotificationService {
    client: Client,
}

impl Gateway for NotificationService {
    const SERVICE: Service = Service::Sns;

    fn from_sdk_config(config: &SdkConfig) -> Self {
        Self::from_client(Client::new(config))
    }
}

impl NotificationService {
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

    /// A reference to the topic with this ARN. No request is made, so a
    /// missing topic only shows up on the first publish.
    #[must_use]
    pub fn topic(&self, topic_arn: &str) -> Topic {
        Topic {
            client: self.client.clone(),
            arn: topic_arn.to_string(),
        }
    }

    /// ARNs of every topic visible to this handle, page by page.
    pub fn topic_arns(&self) -> BoxStream<'static, Result<String>> {
        let pages = self.client.list_topics().into_paginator().items().send();
        stream::unfold(pages, |mut pages| async move {
            loop {
                match pages.next().await? {
                    Ok(topic) => match topic.topic_arn {
                        Some(arn) => return Some((Ok(arn), pages)),
                        None => continue,
                    },
                    Err(e) => {
                        return Some((Err::<String, _>(e).classify(Service::Sns, "list_topics"), pages));
                    }
                }
            }
        })
        .boxed()
    }
}

/// Reference to one SNS topic.
#[derive(Debug, Clone)]
pub struct Topic {
    client: Client,
    arn: String,
}

impl Topic {
    #[must_use]
    pub fn arn(&self) -> &str {
        &self.arn
    }

    /// Publishes one message and returns the id SNS assigned to it. Acceptance
    /// by the service is the only delivery confirmation.
    ///
    /// # Errors
    ///
    /// Returns whatever `Publish` returns, `NotFound` for an unknown topic.
    pub async fn publish(&self, subject: &str, body: &str) -> Result<Option<String>> {
        info!(topic = %self.arn, subject, "Publishing notification");
        let output = self
            .client
            .publish()
            .topic_arn(&self.arn)
            .subject(subject)
            .message(body)
            .send()
            .await
            .classify(Service::Sns, "publish")?;
        debug!(topic = %self.arn, message_id = output.message_id.as_deref().unwrap_or(""), "Published");
        Ok(output.message_id)
    }
}
