//! Document-store gateway: table lifecycle and item reads/writes on DynamoDB.

pub mod schema;
pub mod table;

use aws_config::SdkConfig;
use aws_sdk_dynamodb::Client;
use futures::stream::{self, BoxStream, StreamExt};
use tracing::info;

use crate::core::classify::Classify;
use crate::core::{ConnectionParams, CredentialResolver, Gateway};
use crate::errors::{GatewayError, Result, Service};

pub use schema::{KeySpec, TableSpec};
pub use table::{Record, Table, TableState};

/// Service handle for DynamoDB.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    client: Client,
}

impl Gateway for DocumentStore {
    const SERVICE: Service = Service::DynamoDb;

    fn from_sdk_config(config: &SdkConfig) -> Self {
        Self::from_client(Client::new(config))
    }
}

impl DocumentStore {
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

    /// Looks a table up by name.
    ///
    /// # Errors
    ///
    /// `NotFound` if the table does not exist, `Transport` for anything else.
    pub async fn table(&self, name: &str) -> Result<Table> {
        let output = self
            .client
            .describe_table()
            .table_name(name)
            .send()
            .await
            .classify(Service::DynamoDb, "describe_table")?;
        let status = output.table.and_then(|t| t.table_status);
        Ok(Table::new(self.client.clone(), name, status))
    }

    /// Every table name visible to this handle, fetched page by page as the
    /// stream is polled. Each call starts a new listing.
    pub fn table_names(&self) -> BoxStream<'static, Result<String>> {
        let pages = self.client.list_tables().into_paginator().items().send();
        stream::unfold(pages, |mut pages| async move {
            let next = pages.next().await?;
            Some((next.classify(Service::DynamoDb, "list_tables"), pages))
        })
        .boxed()
    }

    /// Creates a table. Creation is asynchronous on the service side; use
    /// [`check_exists_and_active`](Self::check_exists_and_active) to wait for it.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for a bad key spec, otherwise whatever `CreateTable` returns.
    pub async fn create_table(&self, spec: &TableSpec) -> Result<Table> {
        let key_schema = spec.key_schema()?;
        let attribute_definitions = spec.attribute_definitions()?;
        let throughput = spec.provisioned_throughput()?;

        info!(
            table = %spec.name,
            rcu = spec.read_capacity,
            wcu = spec.write_capacity,
            "Creating table"
        );
        info!(table = %spec.name, ?key_schema, ?attribute_definitions, "Table key layout");

        let output = self
            .client
            .create_table()
            .table_name(&spec.name)
            .set_key_schema(Some(key_schema))
            .set_attribute_definitions(Some(attribute_definitions))
            .provisioned_throughput(throughput)
            .send()
            .await
            .classify(Service::DynamoDb, "create_table")?;

        let status = output.table_description.and_then(|t| t.table_status);
        Ok(Table::new(self.client.clone(), spec.name.clone(), status))
    }

    /// Distinguishes a missing table from one that exists but is still provisioning.
    ///
    /// # Errors
    ///
    /// Any failure other than the table being absent.
    pub async fn check_exists_and_active(&self, name: &str) -> Result<TableState> {
        match self.table(name).await {
            Ok(table) => Ok(table.state()),
            Err(GatewayError::NotFound { .. }) => Ok(TableState::absent()),
            Err(e) => Err(e),
        }
    }
}
