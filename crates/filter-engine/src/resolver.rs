//! 键解析器
//!
//! 每次求值时在记录上构建一次名称到值的索引，之后的查找为 O(1)。
//! 名称精确匹配、区分大小写；同名键按首次出现为准，与从前向后的线性查找结果一致。

use crate::error::{FilterError, Result};
use crate::value::{Key, Value};
use std::collections::HashMap;

/// 记录上的键索引，借用记录中的值
#[derive(Debug, Clone, Default)]
pub struct KeyIndex<'a> {
    entries: HashMap<&'a str, &'a Value>,
}

impl<'a> KeyIndex<'a> {
    /// 在记录上构建索引
    pub fn build(record: &'a [Key]) -> Self {
        let mut entries = HashMap::with_capacity(record.len());
        for key in record {
            entries.entry(key.name()).or_insert(key.value());
        }
        Self { entries }
    }

    /// 解析键名，不存在时返回 KeyNotFound
    pub fn resolve(&self, name: &str) -> Result<&'a Value> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| FilterError::KeyNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// 索引中不同键名的数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
