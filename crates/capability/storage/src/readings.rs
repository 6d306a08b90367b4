//! 待提交读数仓库（基于键值存储）
//!
//! 每个设施一个键，值为 `{"readings": [...]}`。解析失败的键按空处理并记录告警，
//! 不阻断其它键的读取。

use crate::error::StorageError;
use crate::keys::{READING_KEY_ROOT, ensure_facility, is_facility_reading_key, reading_key};
use crate::models::{StoredReading, StoredReadings};
use crate::traits::{KeyValueStore, ReadingRepository};
use domain::{FacilityContext, PendingReading};
use std::sync::Arc;

/// 基于键值存储的读数仓库
pub struct KvReadingRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KvReadingRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 属于该设施的全部读数键（不含名称更长的其它设施）。
    async fn facility_keys(&self, ctx: &FacilityContext) -> Result<Vec<String>, StorageError> {
        let keys = self
            .store
            .keys_with_prefix(&reading_key(&ctx.facility_name))
            .await?;
        Ok(keys
            .into_iter()
            .filter(|key| is_facility_reading_key(key, &ctx.facility_name))
            .collect())
    }

    fn decode(key: &str, data: &str) -> Vec<PendingReading> {
        match serde_json::from_str::<StoredReadings>(data) {
            Ok(stored) => stored.readings.into_iter().map(PendingReading::from).collect(),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "stored readings unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    async fn write(&self, key: &str, readings: &[PendingReading]) -> Result<(), StorageError> {
        let payload = StoredReadings {
            readings: readings.iter().map(StoredReading::from).collect(),
        };
        let data = serde_json::to_string(&payload)?;
        self.store.set_item(key, &data).await
    }
}

#[async_trait::async_trait]
impl ReadingRepository for KvReadingRepository {
    async fn save(
        &self,
        ctx: &FacilityContext,
        readings: &[PendingReading],
    ) -> Result<(), StorageError> {
        ensure_facility(ctx)?;
        self.write(&reading_key(&ctx.facility_name), readings).await
    }

    async fn upsert(
        &self,
        ctx: &FacilityContext,
        readings: &[PendingReading],
    ) -> Result<Vec<PendingReading>, StorageError> {
        ensure_facility(ctx)?;
        let mut merged = self.load(ctx).await?;
        for reading in readings {
            match merged
                .iter_mut()
                .find(|item| item.instrument_template_id == reading.instrument_template_id)
            {
                Some(existing) => *existing = reading.clone(),
                None => merged.push(reading.clone()),
            }
        }
        self.write(&reading_key(&ctx.facility_name), &merged).await?;
        Ok(merged)
    }

    async fn load(&self, ctx: &FacilityContext) -> Result<Vec<PendingReading>, StorageError> {
        ensure_facility(ctx)?;
        let key = reading_key(&ctx.facility_name);
        let Some(data) = self.store.get_item(&key).await? else {
            return Ok(Vec::new());
        };
        Ok(Self::decode(&key, &data))
    }

    async fn load_all(&self, ctx: &FacilityContext) -> Result<Vec<PendingReading>, StorageError> {
        ensure_facility(ctx)?;
        let keys = self.facility_keys(ctx).await?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut readings = Vec::new();
        for (key, data) in self.store.multi_get(&keys).await? {
            if let Some(data) = data {
                readings.extend(Self::decode(&key, &data));
            }
        }
        Ok(readings)
    }

    async fn clear(&self, prefix: &str) -> Result<usize, StorageError> {
        if prefix.is_empty() {
            return Err(StorageError::new("clear prefix required"));
        }
        let keys = self.store.keys_with_prefix(prefix).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        self.store.multi_remove(&keys).await?;
        tracing::debug!(prefix = %prefix, removed = keys.len(), "reading keys cleared");
        Ok(keys.len())
    }

    async fn clear_facility(&self, ctx: &FacilityContext) -> Result<usize, StorageError> {
        ensure_facility(ctx)?;
        let keys = self.facility_keys(ctx).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        self.store.multi_remove(&keys).await?;
        tracing::debug!(facility = %ctx.facility_name, removed = keys.len(), "facility reading keys cleared");
        Ok(keys.len())
    }

    async fn clear_all(&self) -> Result<usize, StorageError> {
        self.clear(READING_KEY_ROOT).await
    }

    async fn remove_templates(
        &self,
        ctx: &FacilityContext,
        template_ids: &[String],
    ) -> Result<usize, StorageError> {
        ensure_facility(ctx)?;
        if template_ids.is_empty() {
            return Ok(0);
        }
        let keys = self.facility_keys(ctx).await?;
        let mut removed = 0;
        for (key, data) in self.store.multi_get(&keys).await? {
            let Some(data) = data else {
                continue;
            };
            let readings = Self::decode(&key, &data);
            let remaining: Vec<PendingReading> = readings
                .iter()
                .filter(|reading| !template_ids.contains(&reading.instrument_template_id))
                .cloned()
                .collect();
            let dropped = readings.len() - remaining.len();
            if dropped == 0 {
                continue;
            }
            removed += dropped;
            if remaining.is_empty() {
                self.store.remove_item(&key).await?;
            } else {
                self.write(&key, &remaining).await?;
            }
        }
        Ok(removed)
    }
}
