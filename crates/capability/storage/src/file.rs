//! JSON 文件键值存储
//!
//! 整个存储是一个 JSON 对象（键 -> 字符串值）。写入先落临时文件再重命名，
//! 持久化成功后才更新内存副本。

use crate::error::StorageError;
use crate::traits::KeyValueStore;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// JSON 文件存储
pub struct JsonFileKeyValueStore {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl JsonFileKeyValueStore {
    /// 打开存储文件；文件不存在时从空存储开始。
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let items = match tokio::fs::read_to_string(&path).await {
            Ok(data) if data.trim().is_empty() => BTreeMap::new(),
            Ok(data) => serde_json::from_str(&data).map_err(|err| {
                StorageError::new(format!("store file {} is corrupt: {}", path.display(), err))
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(path = %path.display(), keys = items.len(), "store file opened");
        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let data = serde_json::to_string_pretty(items)?;
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);
        tokio::fs::write(&temp, data).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl KeyValueStore for JsonFileKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().await;
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().await;
        let mut next = items.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next).await?;
        *items = next;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.multi_remove(&[key.to_string()]).await
    }

    async fn all_keys(&self) -> Result<Vec<String>, StorageError> {
        let items = self.items.lock().await;
        Ok(items.keys().cloned().collect())
    }

    async fn multi_remove(&self, keys: &[String]) -> Result<(), StorageError> {
        let mut items = self.items.lock().await;
        if !keys.iter().any(|key| items.contains_key(key)) {
            return Ok(());
        }
        let mut next = items.clone();
        for key in keys {
            next.remove(key);
        }
        self.persist(&next).await?;
        *items = next;
        Ok(())
    }
}
