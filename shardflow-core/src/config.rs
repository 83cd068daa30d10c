//! Serializable settings for a hash repartition.
//!
//! A [`RepartitionConfig`] names its key columns by index or by field name,
//! so it can be written before the schema is known and shipped to workers
//! with [`to_bytes`](RepartitionConfig::to_bytes).

use arrow::datatypes::Schema;
use serde::{Deserialize, Serialize};

use crate::error::{ProcessorError, Result};
use crate::port::DEFAULT_PORT_CAPACITY;

/// A key column, by position or by field name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyColumn {
    Index(usize),
    Name(String),
}

impl From<usize> for KeyColumn {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for KeyColumn {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for KeyColumn {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl std::fmt::Display for KeyColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{index}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

fn default_port_capacity() -> usize {
    DEFAULT_PORT_CAPACITY
}

/// How to spread a stream over `num_outputs` outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepartitionConfig {
    pub num_outputs: usize,
    pub key_columns: Vec<KeyColumn>,
    /// Slots per port between the stages.
    #[serde(default = "default_port_capacity")]
    pub port_capacity: usize,
}

impl RepartitionConfig {
    pub fn new<K>(num_outputs: usize, key_columns: impl IntoIterator<Item = K>) -> Self
    where
        K: Into<KeyColumn>,
    {
        Self {
            num_outputs,
            key_columns: key_columns.into_iter().map(Into::into).collect(),
            port_capacity: DEFAULT_PORT_CAPACITY,
        }
    }

    pub fn with_port_capacity(mut self, port_capacity: usize) -> Self {
        self.port_capacity = port_capacity;
        self
    }

    /// Check settings that do not depend on the schema.
    ///
    /// Output count and key columns are checked when the splitting stage is
    /// built against a schema.
    pub fn validate(&self) -> Result<()> {
        if self.port_capacity == 0 {
            return Err(ProcessorError::config("port capacity must be at least 1"));
        }
        Ok(())
    }

    /// Map every key column to its index in `schema`.
    ///
    /// Indices pass through unchanged. Unknown names are a
    /// [`ProcessorError::Config`].
    pub fn resolve_key_columns(&self, schema: &Schema) -> Result<Vec<usize>> {
        self.key_columns
            .iter()
            .map(|key| match key {
                KeyColumn::Index(index) => Ok(*index),
                KeyColumn::Name(name) => schema.index_of(name).map_err(|_| {
                    ProcessorError::config(format!(
                        "unknown key column {name:?}, schema has fields {:?}",
                        schema.fields().iter().map(|f| f.name()).collect::<Vec<_>>()
                    ))
                }),
            })
            .collect()
    }

    pub fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(data: &[u8]) -> anyhow::Result<Self> {
        Ok(bincode::deserialize(data)?)
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
