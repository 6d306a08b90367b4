//! 巡检图片仓库（基于键值存储）

use crate::error::StorageError;
use crate::keys::{ensure_facility, inspection_key};
use crate::models::StoredInspection;
use crate::traits::{InspectionRepository, KeyValueStore};
use domain::{FacilityContext, InspectionImage};
use std::sync::Arc;

/// 基于键值存储的巡检仓库
pub struct KvInspectionRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KvInspectionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl InspectionRepository for KvInspectionRepository {
    async fn load(
        &self,
        ctx: &FacilityContext,
    ) -> Result<Option<Vec<InspectionImage>>, StorageError> {
        ensure_facility(ctx)?;
        let key = inspection_key(&ctx.facility_name);
        let Some(data) = self.store.get_item(&key).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<Vec<StoredInspection>>(&data) {
            Ok(stored) => Ok(Some(stored.into_iter().map(InspectionImage::from).collect())),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "stored inspections unreadable");
                Ok(None)
            }
        }
    }

    async fn save(
        &self,
        ctx: &FacilityContext,
        images: &[InspectionImage],
    ) -> Result<(), StorageError> {
        ensure_facility(ctx)?;
        let stored: Vec<StoredInspection> = images.iter().map(StoredInspection::from).collect();
        let data = serde_json::to_string(&stored)?;
        self.store
            .set_item(&inspection_key(&ctx.facility_name), &data)
            .await
    }
}
