//! 完整性检查：哪些模板还没有待提交读数。

use domain::{InstrumentTemplate, PendingReading};
use std::collections::HashSet;

/// 没有被任何待提交读数覆盖的模板自定义名称（模板顺序，去重）。
///
/// 按自定义名称匹配，同名模板会互相覆盖。
pub fn missing_instruments(
    templates: &[InstrumentTemplate],
    readings: &[PendingReading],
) -> Vec<String> {
    let covered: HashSet<&str> = readings
        .iter()
        .map(|reading| reading.custom_name.as_str())
        .collect();
    let mut seen = HashSet::new();
    templates
        .iter()
        .map(|template| template.custom_name.as_str())
        .filter(|name| !covered.contains(name))
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}
