//! 读数标准化
//!
//! 现场输入允许逗号作小数点（`12,5`），远端只接受点号（`12.5`）。
//! 本模块负责输入清洗、失焦格式化、传输前规范化和阈值比较。

use domain::{InstrumentParameter, PendingReading, ReadingBatch};

/// 规范化错误。
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum NormalizeError {
    #[error("not a number: {0}")]
    NotANumber(String),
}

/// 阈值级别。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdLevel {
    Attention,
    Alert,
}

impl std::fmt::Display for ThresholdLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThresholdLevel::Attention => f.write_str("attention"),
            ThresholdLevel::Alert => f.write_str("alert"),
        }
    }
}

/// 读数超过阈值时的提示。
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdWarning {
    pub level: ThresholdLevel,
    pub threshold: f64,
    pub message: String,
}

/// 输入清洗：只保留数字和第一个小数分隔符，小数部分截到两位。
pub fn sanitize_input(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut separator_seen = false;
    for c in text.chars() {
        if c.is_ascii_digit() {
            cleaned.push(c);
        } else if (c == ',' || c == '.') && !separator_seen {
            separator_seen = true;
            cleaned.push(c);
        }
    }

    let int_len = cleaned.chars().take_while(char::is_ascii_digit).count();
    if int_len == 0 {
        return cleaned;
    }
    let (int_part, rest) = cleaned.split_at(int_len);
    let mut result = int_part.to_string();
    let mut rest = rest.chars();
    if let Some(sep) = rest.next() {
        result.push(sep);
        result.extend(rest.take(2));
    }
    result
}

/// 传输前规范化：第一个逗号替换为点号。
pub fn to_transmission(text: &str) -> String {
    text.replacen(',', ".", 1)
}

/// 严格解析（整段必须是数字，允许首尾空白）；空白文本不是数字。
pub fn parse_number(text: &str) -> Result<f64, NormalizeError> {
    let canonical = to_transmission(text.trim());
    canonical
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| NormalizeError::NotANumber(text.to_string()))
}

/// 失焦格式化：保留两位小数，用逗号显示；空文本或非数字原样返回。
pub fn format_for_display(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    match parse_number(text) {
        Ok(value) => format!("{:.2}", value).replacen('.', ",", 1),
        Err(_) => text.to_string(),
    }
}

/// 宽松解析：取开头最长的合法数字前缀，逗号按小数点处理。
pub fn parse_decimal(text: &str) -> Option<f64> {
    let canonical = to_transmission(text);
    let trimmed = canonical.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    trimmed[..end].parse::<f64>().ok()
}

/// 阈值比较：先判断告警，再判断关注。无法解析的值或阈值不产生提示。
pub fn check_thresholds(value: &str, parameter: &InstrumentParameter) -> Option<ThresholdWarning> {
    let number = parse_decimal(value)?;

    if let Some(alert) = parse_decimal(&parameter.alert_value) {
        if number > alert {
            return Some(ThresholdWarning {
                level: ThresholdLevel::Alert,
                threshold: alert,
                message: format!("value greater than alert value: {}", alert),
            });
        }
    }
    if let Some(attention) = parse_decimal(&parameter.attention_value) {
        if number > attention {
            return Some(ThresholdWarning {
                level: ThresholdLevel::Attention,
                threshold: attention,
                message: format!("value greater than attention value: {}", attention),
            });
        }
    }
    None
}

/// 对一条读数的全部值做传输规范化。
pub fn normalize_reading(reading: &PendingReading) -> PendingReading {
    let mut normalized = reading.clone();
    for value in normalized.values.values_mut() {
        *value = to_transmission(value);
    }
    normalized
}

/// 规范化整批读数，保持顺序。
pub fn normalize_batch(readings: &[PendingReading]) -> ReadingBatch {
    ReadingBatch::new(readings.iter().map(normalize_reading).collect())
}
