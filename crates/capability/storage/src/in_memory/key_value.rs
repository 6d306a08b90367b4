//! 键值存储内存实现

use crate::error::StorageError;
use crate::traits::KeyValueStore;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// 键值内存存储
pub struct InMemoryKeyValueStore {
    items: RwLock<BTreeMap<String, String>>,
}

impl InMemoryKeyValueStore {
    /// 创建新的键值存储
    pub fn new() -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
        }
    }

    /// 获取键数量（用于测试）
    pub fn len(&self) -> usize {
        self.items.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self
            .items
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        items.remove(key);
        Ok(())
    }

    async fn all_keys(&self) -> Result<Vec<String>, StorageError> {
        let items = self
            .items
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(items.keys().cloned().collect())
    }

    async fn multi_remove(&self, keys: &[String]) -> Result<(), StorageError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        for key in keys {
            items.remove(key);
        }
        Ok(())
    }
}
