//! # Redis
//!
//! RAM database holding every record of the service.
//!
//! ## Layout
//!
//! - Recipes: one hash per recipe under `RECIPE_<id>`, fields `id`, `name`, `preptime`,
//!   `difficulty`, `vegetarian`
//! - Ratings: one hash per rated recipe under `RATE_<id>`, one field per rating keyed by
//!   the Unix timestamp of the write
//! - Tokens: `TOKEN_<hash>`, only existence matters
//!
//! ## Consistency
//!
//! Every entity write is a single `HSET` round trip, so a failed write never leaves a
//! half-written record. Existence checks and the writes that depend on them are separate
//! round trips with no `WATCH`/`MULTI`, which makes concurrent creates of the same id
//! last-write-wins. Deleting a recipe and its ratings takes two `DEL`s.
use std::time::Duration;

use async_trait::async_trait;
use redis::{
    AsyncCommands, Client, RedisError,
    aio::{ConnectionManager, ConnectionManagerConfig},
};

use crate::store::{
    FieldReader, FieldWriter, Fields, KeyDeleter, KeyExists, KeyLister, StoreError,
};

impl From<RedisError> for StoreError {
    fn from(err: RedisError) -> Self {
        StoreError::Backend(format!("redis: {err}"))
    }
}

pub async fn init_redis(
    redis_url: &str,
    retries: usize,
    timeout: Duration,
) -> Result<ConnectionManager, RedisError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(retries)
        .set_connection_timeout(timeout);

    let client = Client::open(redis_url)?;

    client.get_connection_manager_with_config(config).await
}

/// [`ConnectionManager`] is multiplexed and reconnects on its own, each call works on a
/// cheap clone of it.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }

    pub async fn connect(
        redis_url: &str,
        retries: usize,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        Ok(Self::new(init_redis(redis_url, retries, timeout).await?))
    }
}

#[async_trait]
impl FieldReader for RedisStore {
    async fn get_all_fields(&self, key: &str) -> Result<Fields, StoreError> {
        let mut connection = self.connection.clone();
        let fields: Fields = connection.hgetall(key).await?;

        Ok(fields)
    }
}

#[async_trait]
impl FieldWriter for RedisStore {
    async fn set_fields(&self, key: &str, fields: &[(String, String)]) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let _: () = connection.hset_multiple(key, fields).await?;

        Ok(())
    }

    async fn set_field_if_absent(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();
        let written: bool = connection.hset_nx(key, field, value).await?;

        Ok(written)
    }
}

#[async_trait]
impl KeyExists for RedisStore {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();
        let exists: bool = connection.exists(key).await?;

        Ok(exists)
    }
}

#[async_trait]
impl KeyDeleter for RedisStore {
    async fn delete(&self, key: &str) -> Result<u64, StoreError> {
        let mut connection = self.connection.clone();
        let removed: u64 = connection.del(key).await?;

        Ok(removed)
    }
}

#[async_trait]
impl KeyLister for RedisStore {
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut connection = self.connection.clone();
        let keys: Vec<String> = connection.keys(format!("{prefix}*")).await?;

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use redis::ErrorKind;

    use super::*;

    #[test]
    fn test_redis_error_becomes_backend_failure() {
        let err: StoreError = RedisError::from((ErrorKind::IoError, "connection refused")).into();

        let StoreError::Backend(detail) = err;
        assert!(detail.starts_with("redis: "), "{detail}");
        assert!(detail.contains("connection refused"), "{detail}");
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_url() {
        let err = RedisStore::connect("not a url", 0, Duration::from_millis(10))
            .await
            .err()
            .unwrap();

        assert!(err.to_string().starts_with("redis: "));
    }
}
