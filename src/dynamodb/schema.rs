use aws_sdk_dynamodb::types::{
    AttributeDefinition, KeySchemaElement, KeyType, ProvisionedThroughput, ScalarAttributeType,
};
use serde::{Deserialize, Serialize};

use crate::errors::{GatewayError, Result};

pub const DEFAULT_READ_CAPACITY: i64 = 15;
pub const DEFAULT_WRITE_CAPACITY: i64 = 5;

/// One key attribute: its name and scalar type code (`S`, `N` or `B`).
///
/// Deserializes from `{"name": "id", "type": "S"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySpec {
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: String,
}

impl KeySpec {
    pub fn new(name: impl Into<String>, attribute_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute_type: attribute_type.into(),
        }
    }

    fn scalar_type(&self) -> Result<ScalarAttributeType> {
        match self.attribute_type.as_str() {
            code @ ("S" | "N" | "B") => Ok(ScalarAttributeType::from(code)),
            other => Err(GatewayError::InvalidConfig(format!(
                "key attribute {} has type {other:?}; expected S, N or B",
                self.name
            ))),
        }
    }
}

/// Everything needed to create a table with provisioned throughput.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    pub name: String,
    pub partition_key: KeySpec,
    #[serde(default)]
    pub sort_key: Option<KeySpec>,
    #[serde(default = "default_read_capacity")]
    pub read_capacity: i64,
    #[serde(default = "default_write_capacity")]
    pub write_capacity: i64,
}

fn default_read_capacity() -> i64 {
    DEFAULT_READ_CAPACITY
}

fn default_write_capacity() -> i64 {
    DEFAULT_WRITE_CAPACITY
}

impl TableSpec {
    pub fn new(name: impl Into<String>, partition_key: KeySpec) -> Self {
        Self {
            name: name.into(),
            partition_key,
            sort_key: None,
            read_capacity: DEFAULT_READ_CAPACITY,
            write_capacity: DEFAULT_WRITE_CAPACITY,
        }
    }

    #[must_use]
    pub fn with_sort_key(mut self, sort_key: KeySpec) -> Self {
        self.sort_key = Some(sort_key);
        self
    }

    #[must_use]
    pub fn with_capacity(mut self, read_capacity: i64, write_capacity: i64) -> Self {
        self.read_capacity = read_capacity;
        self.write_capacity = write_capacity;
        self
    }

    /// Key attributes in schema order: partition key first, then the sort key.
    fn keys(&self) -> impl Iterator<Item = (&KeySpec, KeyType)> {
        std::iter::once((&self.partition_key, KeyType::Hash))
            .chain(self.sort_key.iter().map(|key| (key, KeyType::Range)))
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` if a key name is missing.
    pub fn key_schema(&self) -> Result<Vec<KeySchemaElement>> {
        self.keys()
            .map(|(key, key_type)| -> Result<KeySchemaElement> {
                Ok(KeySchemaElement::builder()
                    .attribute_name(&key.name)
                    .key_type(key_type)
                    .build()?)
            })
            .collect()
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` for an unsupported attribute type.
    pub fn attribute_definitions(&self) -> Result<Vec<AttributeDefinition>> {
        self.keys()
            .map(|(key, _)| -> Result<AttributeDefinition> {
                Ok(AttributeDefinition::builder()
                    .attribute_name(&key.name)
                    .attribute_type(key.scalar_type()?)
                    .build()?)
            })
            .collect()
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` if either capacity is not positive.
    pub fn provisioned_throughput(&self) -> Result<ProvisionedThroughput> {
        if self.read_capacity < 1 || self.write_capacity < 1 {
            return Err(GatewayError::InvalidConfig(format!(
                "capacity units must be positive (rcu={}, wcu={})",
                self.read_capacity, self.write_capacity
            )));
        }
        Ok(ProvisionedThroughput::builder()
            .read_capacity_units(self.read_capacity)
            .write_capacity_units(self.write_capacity)
            .build()?)
    }
}
