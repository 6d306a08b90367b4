//! Redis 键值存储实现
//!
//! 与文件存储使用相同的键，便于多终端共享一台 Redis 调试。

use crate::error::StorageError;
use crate::traits::KeyValueStore;
use redis::AsyncCommands;

/// Redis 键值存储
pub struct RedisKeyValueStore {
    client: redis::Client,
    namespace: Option<String>,
}

impl RedisKeyValueStore {
    pub fn new(client: redis::Client) -> Self {
        Self {
            client,
            namespace: None,
        }
    }

    pub fn connect(redis_url: &str) -> Result<Self, StorageError> {
        let client =
            redis::Client::open(redis_url).map_err(|err| StorageError::new(err.to_string()))?;
        Ok(Self::new(client))
    }

    /// 所有键加上 `<namespace>:` 前缀。
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespace = if namespace.is_empty() {
            None
        } else {
            Some(namespace)
        };
        self
    }

    fn full_key(&self, key: &str) -> String {
        match &self.namespace {
            Some(namespace) => format!("{}:{}", namespace, key),
            None => key.to_string(),
        }
    }

    fn strip_namespace(&self, key: String) -> Option<String> {
        match &self.namespace {
            Some(namespace) => key
                .strip_prefix(namespace.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .map(str::to_string),
            None => Some(key),
        }
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, StorageError> {
        self.client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|err| StorageError::new(err.to_string()))
    }
}

#[async_trait::async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut connection = self.connection().await?;
        let data: Option<String> = connection.get(self.full_key(key)).await?;
        Ok(data)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut connection = self.connection().await?;
        connection
            .set::<_, _, ()>(self.full_key(key), value)
            .await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut connection = self.connection().await?;
        connection.del::<_, ()>(self.full_key(key)).await?;
        Ok(())
    }

    async fn all_keys(&self) -> Result<Vec<String>, StorageError> {
        let mut connection = self.connection().await?;
        let pattern = self.full_key("*");
        let mut cursor: u64 = 0;
        let mut items = Vec::new();
        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut connection)
                .await?;
            items.extend(keys.into_iter().filter_map(|key| self.strip_namespace(key)));
            if next_cursor == 0 {
                break;
            }
            cursor = next_cursor;
        }
        Ok(items)
    }

    async fn multi_get(
        &self,
        keys: &[String],
    ) -> Result<Vec<(String, Option<String>)>, StorageError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut connection = self.connection().await?;
        let full_keys: Vec<String> = keys.iter().map(|key| self.full_key(key)).collect();
        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&full_keys)
            .query_async(&mut connection)
            .await?;
        Ok(keys.iter().cloned().zip(values).collect())
    }

    async fn multi_remove(&self, keys: &[String]) -> Result<(), StorageError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut connection = self.connection().await?;
        let full_keys: Vec<String> = keys.iter().map(|key| self.full_key(key)).collect();
        connection.del::<_, ()>(full_keys).await?;
        Ok(())
    }
}
