//! # Key-Value Capabilities
//!
//! The narrow set of primitives the storage proxy needs from a backing store.
//!
//! Every record is a flat hash of string fields under a single key:
//! - read all fields of a key
//! - write a batch of fields (overwrite), or a single field only if it is absent
//! - test key existence
//! - delete a key
//! - list keys under a namespace prefix
//!
//! Redis satisfies these natively (`HGETALL`, `HSET`, `HSETNX`, `EXISTS`, `DEL`, `KEYS`),
//! see [`crate::database::RedisStore`]. [`MemoryStore`] is the in-process stand-in used
//! for local runs and tests.
use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

pub type Fields = HashMap<String, String>;

/// Failure reported by a backing store, carrying the backend's own message.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Backend(String),
}

#[async_trait]
pub trait FieldReader: Send + Sync {
    /// Empty map when the key does not exist.
    async fn get_all_fields(&self, key: &str) -> Result<Fields, StoreError>;
}

#[async_trait]
pub trait FieldWriter: Send + Sync {
    async fn set_fields(&self, key: &str, fields: &[(String, String)]) -> Result<(), StoreError>;

    /// Returns `false` without writing when `field` is already present.
    async fn set_field_if_absent(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait KeyExists: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait KeyDeleter: Send + Sync {
    /// Number of keys removed, `0` when nothing was there.
    async fn delete(&self, key: &str) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait KeyLister: Send + Sync {
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

pub trait KeyValueStore: FieldReader + FieldWriter + KeyExists + KeyDeleter + KeyLister {}

impl<T> KeyValueStore for T where T: FieldReader + FieldWriter + KeyExists + KeyDeleter + KeyLister {}

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Fields>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FieldReader for MemoryStore {
    async fn get_all_fields(&self, key: &str) -> Result<Fields, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl FieldWriter for MemoryStore {
    async fn set_fields(&self, key: &str, fields: &[(String, String)]) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records.entry(key.to_string()).or_default();

        for (field, value) in fields {
            record.insert(field.clone(), value.clone());
        }

        Ok(())
    }

    async fn set_field_if_absent(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        let record = records.entry(key.to_string()).or_default();

        if record.contains_key(field) {
            return Ok(false);
        }

        record.insert(field.to_string(), value.to_string());
        Ok(true)
    }
}

#[async_trait]
impl KeyExists for MemoryStore {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.records.read().await.contains_key(key))
    }
}

#[async_trait]
impl KeyDeleter for MemoryStore {
    async fn delete(&self, key: &str) -> Result<u64, StoreError> {
        Ok(self.records.write().await.remove(key).map_or(0, |_| 1))
    }
}

#[async_trait]
impl KeyLister for MemoryStore {
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}
