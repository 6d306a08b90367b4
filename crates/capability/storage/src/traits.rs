//! 存储接口 Trait 定义
//!
//! - KeyValueStore：底层键值存储（get/set/multi-get/multi-remove/枚举键）
//! - ReadingRepository：按设施分区的待提交读数
//! - InspectionRepository：按设施分区的巡检图片
//!
//! 设计原则：
//! - 仓库接口显式接收 FacilityContext
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use async_trait::async_trait;
use domain::{FacilityContext, InspectionImage, PendingReading};

/// 键值存储接口
///
/// 单用户单设备，写入不做并发协调，键级别后写覆盖。
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// 列出全部键
    async fn all_keys(&self) -> Result<Vec<String>, StorageError>;

    /// 批量读取，结果顺序与输入键一致
    async fn multi_get(
        &self,
        keys: &[String],
    ) -> Result<Vec<(String, Option<String>)>, StorageError> {
        let mut items = Vec::with_capacity(keys.len());
        for key in keys {
            items.push((key.clone(), self.get_item(key).await?));
        }
        Ok(items)
    }

    /// 批量删除
    async fn multi_remove(&self, keys: &[String]) -> Result<(), StorageError> {
        for key in keys {
            self.remove_item(key).await?;
        }
        Ok(())
    }

    /// 列出以指定前缀开头的键（排序后返回）
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys: Vec<String> = self
            .all_keys()
            .await?
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect();
        keys.sort();
        Ok(keys)
    }
}

/// 待提交读数仓库
#[async_trait]
pub trait ReadingRepository: Send + Sync {
    /// 覆盖写入设施键
    async fn save(
        &self,
        ctx: &FacilityContext,
        readings: &[PendingReading],
    ) -> Result<(), StorageError>;

    /// 按模板 id 合并写入（同模板后写覆盖），返回合并后的列表
    async fn upsert(
        &self,
        ctx: &FacilityContext,
        readings: &[PendingReading],
    ) -> Result<Vec<PendingReading>, StorageError>;

    /// 读取设施键
    async fn load(&self, ctx: &FacilityContext) -> Result<Vec<PendingReading>, StorageError>;

    /// 读取所有匹配设施前缀的键并展开
    async fn load_all(&self, ctx: &FacilityContext) -> Result<Vec<PendingReading>, StorageError>;

    /// 删除所有以 prefix 开头的键，返回删除数量
    async fn clear(&self, prefix: &str) -> Result<usize, StorageError>;

    /// 删除设施前缀下的全部读数键
    async fn clear_facility(&self, ctx: &FacilityContext) -> Result<usize, StorageError>;

    /// 删除所有设施的读数键
    async fn clear_all(&self) -> Result<usize, StorageError>;

    /// 从设施前缀下的键中移除指定模板的读数，返回移除条数
    async fn remove_templates(
        &self,
        ctx: &FacilityContext,
        template_ids: &[String],
    ) -> Result<usize, StorageError>;
}

/// 巡检图片仓库
#[async_trait]
pub trait InspectionRepository: Send + Sync {
    /// 不存在或无法解析时返回 None
    async fn load(&self, ctx: &FacilityContext)
    -> Result<Option<Vec<InspectionImage>>, StorageError>;

    async fn save(
        &self,
        ctx: &FacilityContext,
        images: &[InspectionImage],
    ) -> Result<(), StorageError>;
}
