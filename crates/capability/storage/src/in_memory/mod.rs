//! 内存存储实现模块
//!
//! 用于测试和 `DAM_STORE_BACKEND=memory` 的一次性会话。

pub mod key_value;

pub use key_value::*;
