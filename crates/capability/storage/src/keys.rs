//! 存储键与设施作用域校验
//!
//! 所有本地数据按设施名分区：
//! - 读数：`@instrument_readings_<设施>`
//! - 巡检：`@inspection_images_<设施>`

use crate::error::StorageError;
use domain::FacilityContext;

/// 读数键前缀（不含设施名），用于“清空全部”。
pub const READING_KEY_ROOT: &str = "@instrument_readings";

/// 读数键前缀。
pub const READING_KEY_PREFIX: &str = "@instrument_readings_";

/// 同一设施附加键的分隔符：`@instrument_readings_<设施>:<后缀>`。
pub const READING_KEY_SEPARATOR: char = ':';

/// 巡检键前缀。
pub const INSPECTION_KEY_PREFIX: &str = "@inspection_images_";

/// 设施读数键。
pub fn reading_key(facility_name: &str) -> String {
    format!("{}{}", READING_KEY_PREFIX, facility_name)
}

/// 键是否属于该设施：等于设施读数键，或以设施读数键加分隔符开头。
///
/// 单纯的前缀匹配会把 "Dam 2" 的键算进 "Dam"。
pub fn is_facility_reading_key(key: &str, facility_name: &str) -> bool {
    match key.strip_prefix(reading_key(facility_name).as_str()) {
        Some(rest) => rest.is_empty() || rest.starts_with(READING_KEY_SEPARATOR),
        None => false,
    }
}

/// 设施巡检键。
pub fn inspection_key(facility_name: &str) -> String {
    format!("{}{}", INSPECTION_KEY_PREFIX, facility_name)
}

/// 验证设施名非空
///
/// 防止空设施名把数据写进所有设施共享的前缀键。
pub fn ensure_facility(ctx: &FacilityContext) -> Result<(), StorageError> {
    if ctx.facility_name.trim().is_empty() {
        return Err(StorageError::new("facility name required"));
    }
    Ok(())
}
