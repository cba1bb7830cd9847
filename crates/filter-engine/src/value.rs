//! 值与键模型
//!
//! `Value` 是封闭的四元标签联合，类型身份只由变体决定，不携带任何转换元数据。
//! `Key` 是一个具名的值槽位，名称在构造时固定，值可以整体替换。

use crate::error::Result;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 类型化的值
///
/// JSON 形式为无标签标量：`true`/`false` 为布尔，整数为整数，
/// 带小数或指数的数字为浮点，字符串为文本。
/// 超出 i64 范围的整数字面量在反序列化时报错，不会悄悄变成浮点；
/// 超过 u64 范围的整数已被 JSON 解析器读成浮点，无法区分。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// 获取值的类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Boolean(_) => "boolean",
        }
    }

    /// 是否为数值类型（整数或浮点）
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Float(_))
    }

    /// 两个值是否属于同一变体
    pub fn same_type(&self, other: &Value) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean, integer, float or string")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Boolean(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Value, E> {
        i64::try_from(v)
            .map(Value::Integer)
            .map_err(|_| E::custom(format!("整数超出 i64 范围: {}", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::Text(v))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            // Debug 格式保留小数点，便于和整数区分
            Self::Float(v) => write!(f, "{:?}", v),
            Self::Text(v) => write!(f, "\"{}\"", v),
            Self::Boolean(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// 具名值槽位，记录的组成单元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    name: String,
    value: Value,
}

impl Key {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// 整体替换当前值，新值可以是任意变体
    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.value = value.into();
    }
}

/// 从 JSON 对象构建记录
///
/// 输入形如 `{"a": 15, "price": 2.5, "tier": "gold", "vip": true}`，
/// 返回的键按名称排序。
pub fn record_from_json(json: &str) -> Result<Vec<Key>> {
    let map: BTreeMap<String, Value> = serde_json::from_str(json)?;
    Ok(map
        .into_iter()
        .map(|(name, value)| Key { name, value })
        .collect())
}
